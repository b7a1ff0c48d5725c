// src/models/core.rs - core data types for entity extraction

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// The three independent lexicon namespaces. Hospital detection is a separate
/// matcher whose hits are folded into the medical namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Namespace {
    Medical,
    Department,
    Specialty,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Medical => write!(f, "medical"),
            Namespace::Department => write!(f, "department"),
            Namespace::Specialty => write!(f, "specialty"),
        }
    }
}

/// One lexicon category matched inside a source string. The matched text is
/// verbatim source text, not the canonical alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchHit {
    pub category: String,
    pub namespace: Namespace,
    pub matched: String,
}

impl MatchHit {
    pub fn new(category: impl Into<String>, namespace: Namespace, matched: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            namespace,
            matched: matched.into(),
        }
    }
}

/// Everything extracted from a single normalized name string.
///
/// `mapping` holds exactly one matched substring per category. When a category
/// matches more than one distinct substring the last match wins, so earlier
/// substrings for that category are dropped.
#[derive(Debug, Clone, Default)]
pub struct EntityRecord {
    pub source: String,
    pub mapping: HashMap<String, String>,
    pub medical_entities: BTreeSet<String>,
    pub department_entities: BTreeSet<String>,
    pub specialty_entities: BTreeSet<String>,
    pub total_entities: BTreeSet<String>,
}

impl EntityRecord {
    pub fn categories(&self, namespace: Namespace) -> &BTreeSet<String> {
        match namespace {
            Namespace::Medical => &self.medical_entities,
            Namespace::Department => &self.department_entities,
            Namespace::Specialty => &self.specialty_entities,
        }
    }

    /// Matched substrings for the given categories, in category order.
    pub fn substrings_for(&self, categories: &BTreeSet<String>) -> Vec<String> {
        categories
            .iter()
            .filter_map(|c| self.mapping.get(c).cloned())
            .collect()
    }
}

/// Optional per-side metadata supplied alongside a name string. Consumed by
/// the geographic rules (via `location_id`) and the metadata overlap features.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SideMetadata {
    #[serde(default)]
    pub location_id: Option<i64>,
    #[serde(default)]
    pub org_ids: Option<Vec<String>>,
    #[serde(default)]
    pub location_types: Option<Vec<String>>,
    #[serde(default)]
    pub phone_numbers: Option<Vec<String>>,
}
