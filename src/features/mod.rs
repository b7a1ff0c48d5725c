// src/features/mod.rs - fixed feature vector handed to the classifier
//
// The column list is a wire contract: the classifier was fitted against these
// names in this order, and a silent reordering would corrupt every score
// without raising an error. Anything that changes here has to change in the
// model artifact as well.

use serde::Serialize;

use crate::models::{ComparisonRecord, SideMetadata};
use crate::utils::strings::{
    char_gram_diff_ratio, fuzz_sim, positional_token_similarity, roland_score, token_overlap,
    trigram_similarity, word_diff_similarity,
};

pub const FEATURE_COLUMNS: [&str; 24] = [
    "overall_sim",
    "overall_fuzz_sim",
    "overall_roland",
    "token_overlap_1",
    "token_overlap_2",
    "word_diff_fuzz_sim_s1",
    "word_diff_fuzz_sim_s2",
    "char_diff_bigrams",
    "char_diff_trigrams",
    "dept_vs_specialty_flag",
    "count_entity_differences",
    "count_entity_overlap",
    "count_common_medical_entities",
    "count_diff_medical_elements",
    "count_diff_department_elements",
    "s1_token_1_sim",
    "s1_token_2_sim",
    "s1_token_3_sim",
    "s2_token_1_sim",
    "s2_token_2_sim",
    "s2_token_3_sim",
    "org_id_overlap",
    "location_types_overlap",
    "phone_numbers_overlap",
];

/// Feature values in `FEATURE_COLUMNS` order. Non-finite values are clamped
/// to zero at construction so downstream math never sees a NaN.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    fn new(mut values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), FEATURE_COLUMNS.len());
        for v in &mut values {
            if !v.is_finite() {
                *v = 0.0;
            }
        }
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn columns() -> &'static [&'static str] {
        &FEATURE_COLUMNS
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        FEATURE_COLUMNS
            .iter()
            .position(|c| *c == column)
            .map(|i| self.values[i])
    }

    /// (name, value) pairs, for logging and JSON export.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_COLUMNS.iter().copied().zip(self.values.iter().copied())
    }
}

/// Build the feature vector for a pair. The strings are the geography-stripped
/// names; the entity counts come from the comparison record, which was built
/// from the names before stripping.
pub fn build_feature_vector(
    record: &ComparisonRecord,
    s1: &str,
    s2: &str,
    meta1: &SideMetadata,
    meta2: &SideMetadata,
) -> FeatureVector {
    let (word_diff_s1, word_diff_s2) = word_diff_similarity(s1, s2);

    FeatureVector::new(vec![
        trigram_similarity(s1, s2),
        fuzz_sim(s1, s2),
        roland_score(s1, s2) as f64,
        token_overlap(s1, s2),
        token_overlap(s2, s1),
        word_diff_s1,
        word_diff_s2,
        char_gram_diff_ratio(s1, s2, 2),
        char_gram_diff_ratio(s1, s2, 3),
        if record.flags.dept_vs_specialty { 1.0 } else { 0.0 },
        record.total.differences.len() as f64,
        record.total.overlap.len() as f64,
        record.medical.overlap.len() as f64,
        record.medical.differences.len() as f64,
        record.department.differences.len() as f64,
        positional_token_similarity(s1, s2, 0),
        positional_token_similarity(s1, s2, 1),
        positional_token_similarity(s1, s2, 2),
        positional_token_similarity(s2, s1, 0),
        positional_token_similarity(s2, s1, 1),
        positional_token_similarity(s2, s1, 2),
        metadata_overlap(meta1.org_ids.as_deref(), meta2.org_ids.as_deref()),
        metadata_overlap(meta1.location_types.as_deref(), meta2.location_types.as_deref()),
        metadata_overlap(meta1.phone_numbers.as_deref(), meta2.phone_numbers.as_deref()),
    ])
}

/// Count of common elements across both lists over their combined length.
/// Missing metadata on either side scores zero.
fn metadata_overlap(m1: Option<&[String]>, m2: Option<&[String]>) -> f64 {
    let (Some(m1), Some(m2)) = (m1, m2) else {
        return 0.0;
    };
    let total = m1.len() + m2.len();
    if total == 0 {
        return 0.0;
    }
    let common = m1.iter().filter(|m| m2.contains(m)).count()
        + m2.iter().filter(|m| m1.contains(m)).count();
    common as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;
    use crate::matching::comparison::RecordComparator;
    use crate::matching::extraction::EntityExtractor;
    use std::sync::Arc;

    fn record(s1: &str, s2: &str) -> ComparisonRecord {
        RecordComparator::new(EntityExtractor::new(Arc::new(Lexicon::builtin()))).compare(s1, s2)
    }

    #[test]
    fn test_vector_matches_column_contract() {
        let rec = record("cleveland clinic", "cleveland clinic cardiology");
        let vector = build_feature_vector(
            &rec,
            "cleveland clinic",
            "cleveland clinic cardiology",
            &SideMetadata::default(),
            &SideMetadata::default(),
        );
        assert_eq!(vector.values().len(), FEATURE_COLUMNS.len());
        for (name, value) in vector.named() {
            assert!(value.is_finite(), "{name} is not finite");
        }
    }

    #[test]
    fn test_identical_strings_saturate_similarities() {
        let rec = record("mercy clinic", "mercy clinic");
        let vector = build_feature_vector(
            &rec,
            "mercy clinic",
            "mercy clinic",
            &SideMetadata::default(),
            &SideMetadata::default(),
        );
        assert_eq!(vector.get("overall_fuzz_sim"), Some(1.0));
        assert_eq!(vector.get("overall_roland"), Some(100.0));
        assert_eq!(vector.get("token_overlap_1"), Some(1.0));
        assert_eq!(vector.get("char_diff_bigrams"), Some(0.0));
    }

    #[test]
    fn test_entity_counts_flow_through() {
        let rec = record(
            "advanced healthcare urology",
            "advanced healthcare neurology",
        );
        let vector = build_feature_vector(
            &rec,
            &rec.string_one,
            &rec.string_two,
            &SideMetadata::default(),
            &SideMetadata::default(),
        );
        assert_eq!(vector.get("count_entity_differences"), Some(2.0));
        assert_eq!(vector.get("count_entity_overlap"), Some(0.0));
    }

    #[test]
    fn test_metadata_overlap_ratios() {
        let rec = record("a clinic", "a clinic");
        let meta1 = SideMetadata {
            phone_numbers: Some(vec!["8163475000".to_string()]),
            ..Default::default()
        };
        let meta2 = SideMetadata {
            phone_numbers: Some(vec![
                "8163475000".to_string(),
                "9999999999".to_string(),
            ]),
            ..Default::default()
        };
        let vector =
            build_feature_vector(&rec, "a clinic", "a clinic", &meta1, &meta2);
        // One shared number counted from both directions over three entries.
        assert!((vector.get("phone_numbers_overlap").unwrap() - 2.0 / 3.0).abs() < 1e-9);
        // Missing metadata on either side scores zero.
        assert_eq!(vector.get("org_id_overlap"), Some(0.0));
    }

    #[test]
    fn test_unknown_column_lookup() {
        let rec = record("a", "b");
        let vector = build_feature_vector(
            &rec,
            "a",
            "b",
            &SideMetadata::default(),
            &SideMetadata::default(),
        );
        assert!(vector.get("no_such_feature").is_none());
    }
}
