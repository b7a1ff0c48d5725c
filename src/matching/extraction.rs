// src/matching/extraction.rs - turn one raw name into an EntityRecord

use log::trace;
use std::sync::Arc;

use crate::lexicon::Lexicon;
use crate::matching::tokens::{detect_hospital, match_namespace};
use crate::models::{EntityRecord, MatchHit, Namespace};
use crate::utils::strings::normalize_name;

/// Runs the token matcher across all namespaces (plus hospital detection) for
/// a single string. Holds only the shared lexicon, so it is cheap to clone and
/// safe to use from any number of threads.
#[derive(Clone)]
pub struct EntityExtractor {
    lexicon: Arc<Lexicon>,
}

impl EntityExtractor {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Extract every lexicon hit from a raw name. Hospital hits are folded
    /// into the medical namespace, and the total set is the union across all
    /// three namespaces.
    pub fn extract(&self, raw: &str) -> EntityRecord {
        let normalized = normalize_name(raw);

        let mut hits: Vec<MatchHit> = Vec::new();
        hits.extend(match_namespace(&normalized, &self.lexicon, Namespace::Medical));
        hits.extend(match_namespace(&normalized, &self.lexicon, Namespace::Department));
        hits.extend(match_namespace(&normalized, &self.lexicon, Namespace::Specialty));
        if let Some(hospital) = detect_hospital(&normalized) {
            hits.push(hospital);
        }

        trace!("Extracted {} hit(s) from \"{}\"", hits.len(), normalized);

        let mut record = EntityRecord {
            source: normalized,
            ..Default::default()
        };

        for hit in hits {
            match hit.namespace {
                Namespace::Medical => record.medical_entities.insert(hit.category.clone()),
                Namespace::Department => record.department_entities.insert(hit.category.clone()),
                Namespace::Specialty => record.specialty_entities.insert(hit.category.clone()),
            };
            record.total_entities.insert(hit.category.clone());
            // Last match wins when a category matched more than one substring.
            record.mapping.insert(hit.category, hit.matched);
        }

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> EntityExtractor {
        EntityExtractor::new(Arc::new(Lexicon::builtin()))
    }

    #[test]
    fn test_extract_specialty_record() {
        let record = extractor().extract("UPENN Urology");
        assert_eq!(record.source, "upenn urology");
        assert!(record.specialty_entities.contains("urology"));
        assert_eq!(record.mapping.get("urology").unwrap(), "urology");
        assert!(record.total_entities.contains("urology"));
        assert!(record.medical_entities.is_empty());
    }

    #[test]
    fn test_hospital_folds_into_medical() {
        let record = extractor().extract("Emory Decatur Hospital");
        assert!(record.medical_entities.contains("hospital"));
        assert!(record.total_entities.contains("hospital"));
    }

    #[test]
    fn test_union_across_namespaces() {
        let record = extractor().extract("Mercy Medical Center Emergency Room Cardiology");
        assert!(record.medical_entities.contains("medical center"));
        assert!(record.department_entities.contains("emergency room"));
        assert!(record.specialty_entities.contains("cardiology"));
        assert_eq!(
            record.total_entities.len(),
            record.medical_entities.len()
                + record.department_entities.len()
                + record.specialty_entities.len()
        );
    }

    #[test]
    fn test_empty_string_extracts_nothing() {
        let record = extractor().extract("");
        assert!(record.total_entities.is_empty());
        assert!(record.mapping.is_empty());
    }
}
