// src/utils/constants.rs

/// Sentinel score returned when the rule layer concludes two names refer to the same entity.
pub const SAME_ENTITY_SCORE: f64 = 0.999;

/// Sentinel score returned when the rule layer concludes two names refer to different entities.
pub const DIFFERENT_ENTITY_SCORE: f64 = 0.001;

/// Residual similarity above which two names are considered identical once their
/// shared entity keywords are removed.
pub const ENTITY_OVERLAP_SIMILARITY_THRESHOLD: f64 = 0.90;

/// Residual similarity above which the medical-entity wording is treated as the
/// only difference between two names.
pub const MEDICAL_SOLE_DIFF_THRESHOLD: f64 = 0.98;

/// Maximum Levenshtein distance for a single token to count as the same word.
pub const SINGLE_WORD_EDIT_DISTANCE: usize = 1;

/// Maximum Levenshtein distance for a token to be read as a misspelling of "hospital".
pub const HOSPITAL_EDIT_DISTANCE: usize = 2;
