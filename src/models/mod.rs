// src/models/mod.rs

pub mod comparison;
pub mod core;

pub use comparison::{BusinessFlags, ComparisonRecord, NamespaceComparison};
pub use core::{EntityRecord, MatchHit, Namespace, SideMetadata};
