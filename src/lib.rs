// src/lib.rs - healthcare entity name comparison engine
//
// Layers, bottom to top: lexicon (the alias tables), matching (tokenizer,
// extractor, comparator, rules), features (the classifier input contract),
// scoring (the per-pair and per-candidate pipelines). geo supplies location
// context, models holds the shared record types.

pub mod features;
pub mod geo;
pub mod lexicon;
pub mod matching;
pub mod models;
pub mod scoring;
pub mod utils;

use thiserror::Error;

/// Errors surfaced by collaborators of the engine. The comparison pipeline
/// itself is infallible; failures come from geography lookups and the
/// statistical classifier.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("geography lookup failed: {0}")]
    Collaborator(String),

    #[error("classifier error: {0}")]
    Classifier(String),
}

pub use features::{build_feature_vector, FeatureVector, FEATURE_COLUMNS};
pub use geo::{GeoLookup, GeoRow, StaticGeoTable};
pub use lexicon::Lexicon;
pub use matching::comparison::RecordComparator;
pub use matching::extraction::EntityExtractor;
pub use models::{ComparisonRecord, EntityRecord, SideMetadata};
pub use scoring::{CandidateSummary, Classifier, ScoreOutcome, ScoringEngine};
