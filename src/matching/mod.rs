// src/matching/mod.rs

pub mod comparison;
pub mod extraction;
pub mod rules;
pub mod tokens;
