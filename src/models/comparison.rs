// src/models/comparison.rs - pairwise comparison record types

use serde::Serialize;
use std::collections::BTreeSet;

/// Overlap and residual signals for one namespace of a pair comparison.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NamespaceComparison {
    pub s1_categories: BTreeSet<String>,
    pub s2_categories: BTreeSet<String>,
    /// Categories matched on both sides.
    pub overlap: BTreeSet<String>,
    /// Symmetric difference of the two category sets.
    pub differences: BTreeSet<String>,
    /// Substrings matched on side one for the overlapping categories.
    pub s1_keywords: BTreeSet<String>,
    /// Substrings matched on side two for the overlapping categories.
    pub s2_keywords: BTreeSet<String>,
    /// Side one with its overlap keywords removed, whitespace collapsed.
    pub s1_residual: String,
    /// Side two with its overlap keywords removed, whitespace collapsed.
    pub s2_residual: String,
    /// Fuzzy similarity of the two residuals.
    pub residual_similarity: f64,
}

/// Boolean rule inputs derived from a comparison, computed once per pair.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct BusinessFlags {
    /// The specialty difference set is non-empty.
    pub mismatched_specialty: bool,
    /// The department difference set is non-empty.
    pub mismatched_department: bool,
    /// One side names a department while the other names no specialty (or the
    /// reverse), and the department or specialty sets disagree.
    pub dept_vs_specialty: bool,
    /// Both sides matched at least one medical entity type.
    pub dual_medical_entities: bool,
    /// Medical-entity wording is the only thing separating the two names.
    pub medical_entities_sole_diff: bool,
    /// Entity sets agree exactly, are non-empty, and the overlap residuals are
    /// nearly identical.
    pub entity_overlap_string_sim: bool,
}

/// Full pairwise comparison of two extracted records. Built fresh for every
/// pair and never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRecord {
    pub string_one: String,
    pub string_two: String,
    /// Fuzzy similarity of the two full strings.
    pub full_similarity: f64,
    pub total: NamespaceComparison,
    pub medical: NamespaceComparison,
    pub department: NamespaceComparison,
    pub specialty: NamespaceComparison,
    /// Side one with its own medical-entity matches removed.
    pub s1_no_medical: String,
    /// Side two with its own medical-entity matches removed.
    pub s2_no_medical: String,
    /// Fuzzy similarity of the two medical-stripped strings.
    pub no_medical_similarity: f64,
    pub flags: BusinessFlags,
}

impl ComparisonRecord {
    /// Combined count of entity categories matched across both sides.
    pub fn total_entity_count(&self) -> usize {
        self.total.s1_categories.len() + self.total.s2_categories.len()
    }
}
