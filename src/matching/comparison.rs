// src/matching/comparison.rs - derive a ComparisonRecord from a pair of names

use std::collections::BTreeSet;

use crate::matching::extraction::EntityExtractor;
use crate::models::{BusinessFlags, ComparisonRecord, EntityRecord, NamespaceComparison};
use crate::utils::constants::{ENTITY_OVERLAP_SIMILARITY_THRESHOLD, MEDICAL_SOLE_DIFF_THRESHOLD};
use crate::utils::strings::{fuzz_sim, remove_substrings};

/// Builds comparison records: per-namespace overlap and difference sets, the
/// residual strings left after shared keywords are removed, and the boolean
/// rule flags derived from all of it.
#[derive(Clone)]
pub struct RecordComparator {
    extractor: EntityExtractor,
}

impl RecordComparator {
    pub fn new(extractor: EntityExtractor) -> Self {
        Self { extractor }
    }

    pub fn extractor(&self) -> &EntityExtractor {
        &self.extractor
    }

    /// Extract both sides and compare them.
    pub fn compare(&self, string_one: &str, string_two: &str) -> ComparisonRecord {
        let r1 = self.extractor.extract(string_one);
        let r2 = self.extractor.extract(string_two);
        self.compare_records(&r1, &r2)
    }

    /// Compare two already-extracted records.
    pub fn compare_records(&self, r1: &EntityRecord, r2: &EntityRecord) -> ComparisonRecord {
        let total = namespace_comparison(r1, r2, &r1.total_entities, &r2.total_entities);
        let medical = namespace_comparison(r1, r2, &r1.medical_entities, &r2.medical_entities);
        let department =
            namespace_comparison(r1, r2, &r1.department_entities, &r2.department_entities);
        let specialty =
            namespace_comparison(r1, r2, &r1.specialty_entities, &r2.specialty_entities);

        // Fifth residual variant: each side minus its own medical matches,
        // shared or not. Detects pairs where the medical-entity wording is the
        // only thing that differs.
        let s1_no_medical =
            remove_substrings(&r1.source, &r1.substrings_for(&r1.medical_entities));
        let s2_no_medical =
            remove_substrings(&r2.source, &r2.substrings_for(&r2.medical_entities));
        let no_medical_similarity = fuzz_sim(&s1_no_medical, &s2_no_medical);

        let dept_vs_specialty = ((!r1.department_entities.is_empty()
            && r2.specialty_entities.is_empty())
            || (!r2.department_entities.is_empty() && r1.specialty_entities.is_empty()))
            && (r1.department_entities != r2.department_entities
                || r1.specialty_entities != r2.specialty_entities);

        let flags = BusinessFlags {
            mismatched_specialty: !specialty.differences.is_empty(),
            mismatched_department: !department.differences.is_empty(),
            dept_vs_specialty,
            dual_medical_entities: !r1.medical_entities.is_empty()
                && !r2.medical_entities.is_empty(),
            medical_entities_sole_diff: no_medical_similarity > MEDICAL_SOLE_DIFF_THRESHOLD,
            entity_overlap_string_sim: total.differences.is_empty()
                && (!total.s1_categories.is_empty() || !total.s2_categories.is_empty())
                && total.residual_similarity > ENTITY_OVERLAP_SIMILARITY_THRESHOLD,
        };

        ComparisonRecord {
            string_one: r1.source.clone(),
            string_two: r2.source.clone(),
            full_similarity: fuzz_sim(&r1.source, &r2.source),
            total,
            medical,
            department,
            specialty,
            s1_no_medical,
            s2_no_medical,
            no_medical_similarity,
            flags,
        }
    }
}

fn namespace_comparison(
    r1: &EntityRecord,
    r2: &EntityRecord,
    set1: &BTreeSet<String>,
    set2: &BTreeSet<String>,
) -> NamespaceComparison {
    let overlap: BTreeSet<String> = set1.intersection(set2).cloned().collect();
    let differences: BTreeSet<String> = set1.symmetric_difference(set2).cloned().collect();

    let s1_keywords: BTreeSet<String> = overlap
        .iter()
        .filter_map(|c| r1.mapping.get(c).cloned())
        .collect();
    let s2_keywords: BTreeSet<String> = overlap
        .iter()
        .filter_map(|c| r2.mapping.get(c).cloned())
        .collect();

    let s1_residual = remove_substrings(
        &r1.source,
        &s1_keywords.iter().cloned().collect::<Vec<_>>(),
    );
    let s2_residual = remove_substrings(
        &r2.source,
        &s2_keywords.iter().cloned().collect::<Vec<_>>(),
    );
    let residual_similarity = fuzz_sim(&s1_residual, &s2_residual);

    NamespaceComparison {
        s1_categories: set1.clone(),
        s2_categories: set2.clone(),
        overlap,
        differences,
        s1_keywords,
        s2_keywords,
        s1_residual,
        s2_residual,
        residual_similarity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;
    use std::sync::Arc;

    fn comparator() -> RecordComparator {
        RecordComparator::new(EntityExtractor::new(Arc::new(Lexicon::builtin())))
    }

    #[test]
    fn test_specialty_mismatch_flag() {
        let record = comparator().compare(
            "advanced healthcare urology",
            "advanced healthcare neurology",
        );
        assert!(record.flags.mismatched_specialty);
        assert!(record.specialty.differences.contains("urology"));
        assert!(record.specialty.differences.contains("neurology"));
    }

    #[test]
    fn test_department_mismatch_flag() {
        let record = comparator().compare(
            "advanced healthcare emergency room",
            "advanced healthcare ambulatory surgical center",
        );
        assert!(record.flags.mismatched_department);
    }

    #[test]
    fn test_overlap_residuals() {
        let record = comparator().compare("upenn urology", "upenn urology associates");
        assert!(record.specialty.overlap.contains("urology"));
        assert_eq!(record.specialty.s1_residual, "upenn");
        assert_eq!(record.specialty.s2_residual, "upenn associates");
        // Both sides matched exactly {urology}, but the residuals are far
        // apart so the overlap-similarity flag must not fire.
        assert!(record.total.differences.is_empty());
        assert!(!record.flags.entity_overlap_string_sim);
    }

    #[test]
    fn test_medical_sole_diff() {
        let record = comparator().compare("emory decatur medical center", "emory decatur hospital");
        assert_eq!(record.s1_no_medical, "emory decatur");
        assert_eq!(record.s2_no_medical, "emory decatur");
        assert!(record.flags.medical_entities_sole_diff);
        assert!(record.flags.dual_medical_entities);
        assert!(!record.flags.mismatched_department);
        assert!(!record.flags.mismatched_specialty);
    }

    #[test]
    fn test_entity_overlap_string_sim() {
        let record = comparator().compare(
            "nyu departmen of nephrolog",
            "nyu department of nephrology",
        );
        assert!(record.total.differences.is_empty());
        assert!(record.flags.entity_overlap_string_sim);
        assert!(!record.flags.mismatched_department);
    }

    #[test]
    fn test_dept_vs_specialty_flag() {
        // Side one names a department while side two names no specialty, and
        // the department sets disagree.
        let record = comparator().compare("mercy outpatient", "mercy clinic");
        assert!(record.flags.dept_vs_specialty);

        // A specialty on the other side suppresses this particular flag; the
        // mismatched department and specialty flags cover that case instead.
        let record = comparator().compare("mercy outpatient", "mercy cardiology");
        assert!(!record.flags.dept_vs_specialty);
        assert!(record.flags.mismatched_department);
        assert!(record.flags.mismatched_specialty);
    }

    #[test]
    fn test_no_flags_for_plain_names() {
        let record = comparator().compare("cleveland clinic", "cleveland clinic main campus");
        assert!(!record.flags.mismatched_department);
        assert!(!record.flags.mismatched_specialty);
        assert!(!record.flags.dual_medical_entities);
    }
}
