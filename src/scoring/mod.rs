// src/scoring/mod.rs - pair scoring pipeline and candidate aggregation
//
// Pipeline per pair: fast path for identical strings, entity extraction and
// comparison, the deterministic rule layer, then geography stripping and
// feature scoring through the classifier for whatever the rules could not
// decide. Every comparison is a pure function over the immutable lexicon and
// geo table, so callers can fan out across threads freely.

use log::{debug, warn};
use serde::Serialize;
use std::sync::Arc;

use crate::features::{build_feature_vector, FeatureVector, FEATURE_COLUMNS};
use crate::geo::GeoLookup;
use crate::lexicon::Lexicon;
use crate::matching::comparison::RecordComparator;
use crate::matching::extraction::EntityExtractor;
use crate::matching::rules::{self, strip_geo_tokens, RuleContext, Verdict};
use crate::models::SideMetadata;
use crate::utils::constants::{DIFFERENT_ENTITY_SCORE, SAME_ENTITY_SCORE};
use crate::utils::strings::{collapse_whitespace, normalize_name};
use crate::EngineError;

/// External statistical model consulted for pairs the rules leave open.
pub trait Classifier: Send + Sync {
    /// The feature columns the model was fitted against, in order.
    fn feature_columns(&self) -> Vec<String>;

    /// Probability in [0, 1] that the pair names the same entity.
    fn score(&self, features: &FeatureVector) -> Result<f64, EngineError>;
}

/// The result of scoring one pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreOutcome {
    /// A rule concluded the names refer to the same entity.
    Same { rule: &'static str, score: f64 },
    /// A rule concluded the names refer to different entities.
    Different { rule: &'static str, score: f64 },
    /// The classifier scored the pair.
    Model { score: f64 },
    /// Rules were inconclusive and no classifier is configured.
    Unscored,
    /// One of the inputs was absent; no guess is made.
    Indeterminate,
}

impl ScoreOutcome {
    pub fn score(&self) -> Option<f64> {
        match self {
            ScoreOutcome::Same { score, .. }
            | ScoreOutcome::Different { score, .. }
            | ScoreOutcome::Model { score } => Some(*score),
            ScoreOutcome::Unscored | ScoreOutcome::Indeterminate => None,
        }
    }
}

/// Aggregated result of scoring one record against a candidate list.
#[derive(Debug, Default, Serialize)]
pub struct CandidateSummary {
    pub mean_score: Option<f64>,
    pub max_score: Option<f64>,
    /// One entry per comparison, `None` where the pair failed or was unscored.
    pub all_scores: Vec<Option<f64>>,
}

pub struct ScoringEngine {
    comparator: RecordComparator,
    geo: Arc<dyn GeoLookup>,
    classifier: Option<Arc<dyn Classifier>>,
}

impl ScoringEngine {
    pub fn new(lexicon: Arc<Lexicon>, geo: Arc<dyn GeoLookup>) -> Self {
        Self {
            comparator: RecordComparator::new(EntityExtractor::new(lexicon)),
            geo,
            classifier: None,
        }
    }

    /// Attach the statistical classifier. The model's feature columns must
    /// agree with `FEATURE_COLUMNS` exactly; a silent mismatch would corrupt
    /// every score, so it is rejected here instead.
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Result<Self, EngineError> {
        let model_columns = classifier.feature_columns();
        let expected: Vec<String> = FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect();
        if model_columns != expected {
            return Err(EngineError::Classifier(format!(
                "feature column mismatch: model expects {model_columns:?}"
            )));
        }
        self.classifier = Some(classifier);
        Ok(self)
    }

    pub fn comparator(&self) -> &RecordComparator {
        &self.comparator
    }

    /// Score one pair of names. Absent inputs yield `Indeterminate`; rule
    /// verdicts carry the sentinel scores; everything else goes through the
    /// classifier when one is configured.
    pub fn score_pair(
        &self,
        s1: Option<&str>,
        s2: Option<&str>,
        meta1: &SideMetadata,
        meta2: &SideMetadata,
    ) -> Result<ScoreOutcome, EngineError> {
        let (Some(s1), Some(s2)) = (s1, s2) else {
            return Ok(ScoreOutcome::Indeterminate);
        };

        let n1 = normalize_name(s1);
        let n2 = normalize_name(s2);
        if n1 == n2 {
            return Ok(ScoreOutcome::Same {
                rule: "identical_strings",
                score: SAME_ENTITY_SCORE,
            });
        }

        let record = self.comparator.compare(&n1, &n2);
        let ctx = RuleContext {
            record: &record,
            meta1,
            meta2,
            geo: self.geo.as_ref(),
        };
        if let Some(verdict) = rules::evaluate(&ctx) {
            debug!("Rule verdict for (\"{n1}\", \"{n2}\"): {verdict:?}");
            return Ok(match verdict {
                Verdict::Same(rule) => ScoreOutcome::Same {
                    rule,
                    score: SAME_ENTITY_SCORE,
                },
                Verdict::Different(rule) => ScoreOutcome::Different {
                    rule,
                    score: DIFFERENT_ENTITY_SCORE,
                },
            });
        }

        let g1 = strip_geo_tokens(&n1, meta1, self.geo.as_ref());
        let g2 = strip_geo_tokens(&n2, meta2, self.geo.as_ref());

        match &self.classifier {
            Some(classifier) => {
                let features = build_feature_vector(&record, &g1, &g2, meta1, meta2);
                let score = classifier.score(&features)?;
                Ok(ScoreOutcome::Model { score })
            }
            None => Ok(ScoreOutcome::Unscored),
        }
    }

    /// Feature vector for a pair, with geography stripped, bypassing the rule
    /// layer. Intended for exporting training data.
    pub fn features_for_pair(
        &self,
        s1: &str,
        s2: &str,
        meta1: &SideMetadata,
        meta2: &SideMetadata,
    ) -> FeatureVector {
        let n1 = normalize_name(s1);
        let n2 = normalize_name(s2);
        let record = self.comparator.compare(&n1, &n2);
        let g1 = strip_geo_tokens(&n1, meta1, self.geo.as_ref());
        let g2 = strip_geo_tokens(&n2, meta2, self.geo.as_ref());
        build_feature_vector(&record, &g1, &g2, meta1, meta2)
    }

    /// Score one record string against every candidate, isolating per-pair
    /// failures so one bad comparison never aborts the batch. When truthset
    /// names are supplied, terms shared with a candidate are stripped from
    /// both sides first, and the raw unstripped comparisons are appended as
    /// well.
    pub fn score_against_candidates(
        &self,
        record_name: &str,
        candidates: &[String],
        record_meta: &SideMetadata,
        candidate_meta: &SideMetadata,
        truthset: &[String],
    ) -> CandidateSummary {
        let mut all_scores = Vec::new();

        for candidate in candidates {
            let (stripped_record, stripped_candidate) =
                apply_truthset_terms(record_name, candidate, truthset);

            // A record fully consumed by truthset terms is the known entity.
            if stripped_record.is_empty() && !record_name.is_empty() {
                all_scores.push(Some(1.0));
                continue;
            }

            let outcome = self.score_pair(
                Some(&stripped_record),
                Some(&stripped_candidate),
                record_meta,
                candidate_meta,
            );
            match outcome {
                Ok(outcome) => all_scores.push(outcome.score()),
                Err(e) => {
                    warn!("Scoring failed for candidate \"{candidate}\": {e}");
                    all_scores.push(None);
                }
            }
        }

        if !truthset.is_empty() {
            let raw = self.score_against_candidates(
                record_name,
                candidates,
                record_meta,
                candidate_meta,
                &[],
            );
            all_scores.extend(raw.all_scores);
        }

        let finite: Vec<f64> = all_scores.iter().flatten().copied().collect();
        let mean_score = if finite.is_empty() {
            None
        } else {
            Some(finite.iter().sum::<f64>() / finite.len() as f64)
        };
        let max_score = finite.iter().copied().fold(None, |acc: Option<f64>, s| {
            Some(acc.map_or(s, |a| a.max(s)))
        });

        CandidateSummary {
            mean_score,
            max_score,
            all_scores,
        }
    }
}

/// Remove every truthset term present in both strings from both strings.
fn apply_truthset_terms(record: &str, candidate: &str, truthset: &[String]) -> (String, String) {
    let mut record = normalize_name(record);
    let mut candidate = normalize_name(candidate);

    for known in truthset {
        for term in known.to_lowercase().split_whitespace() {
            if record.contains(term) && candidate.contains(term) {
                record = collapse_whitespace(&record.replace(term, " "));
                candidate = collapse_whitespace(&candidate.replace(term, " "));
            }
        }
    }

    (record, candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{GeoRow, StaticGeoTable};

    fn engine() -> ScoringEngine {
        let geo = StaticGeoTable::new(
            vec![GeoRow {
                location_id: 1,
                city: Some("Decatur".to_string()),
                state: Some("GA".to_string()),
                street: None,
            }],
            vec![1],
        );
        ScoringEngine::new(Arc::new(Lexicon::builtin()), Arc::new(geo))
    }

    struct FixedClassifier(f64);

    impl Classifier for FixedClassifier {
        fn feature_columns(&self) -> Vec<String> {
            FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect()
        }

        fn score(&self, _features: &FeatureVector) -> Result<f64, EngineError> {
            Ok(self.0)
        }
    }

    struct FailingClassifier;

    impl Classifier for FailingClassifier {
        fn feature_columns(&self) -> Vec<String> {
            FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect()
        }

        fn score(&self, _features: &FeatureVector) -> Result<f64, EngineError> {
            Err(EngineError::Classifier("inference backend down".to_string()))
        }
    }

    struct WrongColumnsClassifier;

    impl Classifier for WrongColumnsClassifier {
        fn feature_columns(&self) -> Vec<String> {
            vec!["some_other_feature".to_string()]
        }

        fn score(&self, _features: &FeatureVector) -> Result<f64, EngineError> {
            Ok(0.5)
        }
    }

    #[test]
    fn test_identical_strings_fast_path() {
        let outcome = engine()
            .score_pair(
                Some("Cleveland Clinic"),
                Some("cleveland  CLINIC"),
                &SideMetadata::default(),
                &SideMetadata::default(),
            )
            .unwrap();
        assert_eq!(
            outcome,
            ScoreOutcome::Same {
                rule: "identical_strings",
                score: 0.999
            }
        );
    }

    #[test]
    fn test_missing_input_is_indeterminate() {
        let outcome = engine()
            .score_pair(
                None,
                Some("cleveland clinic"),
                &SideMetadata::default(),
                &SideMetadata::default(),
            )
            .unwrap();
        assert_eq!(outcome, ScoreOutcome::Indeterminate);
        assert_eq!(outcome.score(), None);
    }

    #[test]
    fn test_rule_verdict_scores() {
        let outcome = engine()
            .score_pair(
                Some("advanced healthcare urology"),
                Some("advanced healthcare neurology"),
                &SideMetadata::default(),
                &SideMetadata::default(),
            )
            .unwrap();
        assert_eq!(outcome.score(), Some(0.001));

        let outcome = engine()
            .score_pair(
                Some("northside medical center"),
                Some("northside hospital"),
                &SideMetadata::default(),
                &SideMetadata::default(),
            )
            .unwrap();
        assert_eq!(outcome.score(), Some(0.999));
    }

    #[test]
    fn test_unscored_without_classifier() {
        let outcome = engine()
            .score_pair(
                Some("cleveland clinic"),
                Some("random string of ohio"),
                &SideMetadata::default(),
                &SideMetadata::default(),
            )
            .unwrap();
        assert_eq!(outcome, ScoreOutcome::Unscored);
    }

    #[test]
    fn test_classifier_scores_ambiguous_pair() {
        let engine = engine()
            .with_classifier(Arc::new(FixedClassifier(0.42)))
            .unwrap();
        let outcome = engine
            .score_pair(
                Some("cleveland clinic"),
                Some("random string of ohio"),
                &SideMetadata::default(),
                &SideMetadata::default(),
            )
            .unwrap();
        assert_eq!(outcome, ScoreOutcome::Model { score: 0.42 });
    }

    #[test]
    fn test_column_contract_enforced() {
        let result = engine().with_classifier(Arc::new(WrongColumnsClassifier));
        assert!(matches!(result, Err(EngineError::Classifier(_))));
    }

    #[test]
    fn test_candidate_batch_isolates_failures() {
        let engine = engine()
            .with_classifier(Arc::new(FailingClassifier))
            .unwrap();
        let candidates = vec![
            "cleveland clinic".to_string(),      // identical, fast path
            "random string of ohio".to_string(), // classifier fails
            "mercy hospital".to_string(),        // classifier fails
        ];
        let summary = engine.score_against_candidates(
            "Cleveland Clinic",
            &candidates,
            &SideMetadata::default(),
            &SideMetadata::default(),
            &[],
        );
        assert_eq!(summary.all_scores.len(), 3);
        assert_eq!(summary.all_scores[0], Some(0.999));
        assert_eq!(summary.all_scores[1], None);
        assert_eq!(summary.max_score, Some(0.999));
        assert!(summary.mean_score.is_some());
    }

    #[test]
    fn test_truthset_consumes_record() {
        let engine = engine();
        let summary = engine.score_against_candidates(
            "upenn",
            &["upenn neurology department".to_string()],
            &SideMetadata::default(),
            &SideMetadata::default(),
            &["upenn health".to_string()],
        );
        // Stripped comparison scores 1.0, and the raw comparison is appended.
        assert_eq!(summary.all_scores[0], Some(1.0));
        assert_eq!(summary.all_scores.len(), 2);
        assert_eq!(summary.max_score, Some(1.0));
    }

    #[test]
    fn test_apply_truthset_terms() {
        let (r, c) = apply_truthset_terms(
            "mercy tacoma clinic",
            "mercy tacoma cardiology",
            &["mercy health tacoma".to_string()],
        );
        assert_eq!(r, "clinic");
        assert_eq!(c, "cardiology");
    }
}
