// src/matching/rules.rs - deterministic same/different verdicts
//
// The rules run over a finished ComparisonRecord in a fixed order: every
// DIFFERENT rule first, then every SAME rule, first match wins. Anything the
// rules cannot decide falls through to feature scoring. Geographic and
// hospital lookups that fail or miss evaluate as false, never as evidence of
// sameness.

use log::warn;

use crate::geo::GeoLookup;
use crate::models::{ComparisonRecord, SideMetadata};
use crate::utils::strings::{collapse_whitespace, sorted_word_diff, sorted_words, word_subset};

/// A rule verdict, tagged with the name of the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Different(&'static str),
    Same(&'static str),
}

/// Everything a predicate rule may consult.
pub struct RuleContext<'a> {
    pub record: &'a ComparisonRecord,
    pub meta1: &'a SideMetadata,
    pub meta2: &'a SideMetadata,
    pub geo: &'a dyn GeoLookup,
}

struct NamedRule {
    name: &'static str,
    predicate: fn(&RuleContext) -> bool,
}

static DIFFERENT_RULES: &[NamedRule] = &[
    NamedRule {
        name: "mismatched_specialty",
        predicate: |ctx| ctx.record.flags.mismatched_specialty,
    },
    NamedRule {
        name: "mismatched_department",
        predicate: |ctx| ctx.record.flags.mismatched_department,
    },
    NamedRule {
        name: "department_vs_specialty",
        predicate: |ctx| ctx.record.flags.dept_vs_specialty,
    },
];

static SAME_RULES: &[NamedRule] = &[
    NamedRule {
        name: "geo_tokens_only_diff",
        predicate: |ctx| bothsides_hospital(ctx) && geo_tokens_explain_diff(ctx),
    },
    NamedRule {
        name: "dual_hospital_medical_entities",
        predicate: |ctx| bothsides_hospital(ctx) && ctx.record.flags.dual_medical_entities,
    },
    NamedRule {
        name: "medical_entities_sole_diff",
        predicate: |ctx| ctx.record.flags.medical_entities_sole_diff,
    },
    NamedRule {
        name: "entity_overlap_high_similarity",
        predicate: |ctx| ctx.record.flags.entity_overlap_string_sim,
    },
    NamedRule {
        name: "hospital_name_subset",
        predicate: |ctx| {
            bothsides_hospital(ctx)
                && ctx.record.total.differences.is_empty()
                && word_subset(&ctx.record.string_one, &ctx.record.string_two)
        },
    },
];

/// Evaluate the ordered rule lists. The first matching DIFFERENT rule wins,
/// then the first matching SAME rule, else `None`.
pub fn evaluate(ctx: &RuleContext) -> Option<Verdict> {
    for rule in DIFFERENT_RULES {
        if (rule.predicate)(ctx) {
            return Some(Verdict::Different(rule.name));
        }
    }
    for rule in SAME_RULES {
        if (rule.predicate)(ctx) {
            return Some(Verdict::Same(rule.name));
        }
    }
    None
}

/// Both sides carry a location id and both locations are hospitals. Lookup
/// errors and unknown ids count as "not a hospital".
fn bothsides_hospital(ctx: &RuleContext) -> bool {
    let check = |meta: &SideMetadata| -> bool {
        let Some(location_id) = meta.location_id else {
            return false;
        };
        match ctx.geo.is_hospital_location(location_id) {
            Ok(is_hospital) => is_hospital,
            Err(e) => {
                warn!("Hospital lookup failed for location {location_id}: {e}");
                false
            }
        }
    };
    check(ctx.meta1) && check(ctx.meta2)
}

/// True when the word-level symmetric difference of the two names equals the
/// geographic tokens of side one's location, either one geo phrase or all of
/// them together.
fn geo_tokens_explain_diff(ctx: &RuleContext) -> bool {
    let Some(location_id) = ctx.meta1.location_id else {
        return false;
    };
    let geotags = match ctx.geo.geo_tokens(location_id) {
        Ok(Some(tags)) if !tags.is_empty() => tags,
        Ok(_) => return false,
        Err(e) => {
            warn!("Geo token lookup failed for location {location_id}: {e}");
            return false;
        }
    };

    let diff = sorted_word_diff(&ctx.record.string_one, &ctx.record.string_two);
    if diff.is_empty() {
        return false;
    }

    if geotags.iter().any(|tag| sorted_words(tag) == diff) {
        return true;
    }
    sorted_words(&geotags.join(" ")) == diff
}

/// Remove a side's own geographic tokens from its name before feature
/// scoring, so that address wording does not pollute the residual features.
pub fn strip_geo_tokens(name: &str, meta: &SideMetadata, geo: &dyn GeoLookup) -> String {
    let Some(location_id) = meta.location_id else {
        return name.to_string();
    };
    let geotags = match geo.geo_tokens(location_id) {
        Ok(Some(tags)) => tags,
        Ok(None) => return name.to_string(),
        Err(e) => {
            warn!("Geo token lookup failed for location {location_id}: {e}");
            return name.to_string();
        }
    };

    let mut stripped = name.to_string();
    for tag in &geotags {
        if !tag.is_empty() && stripped.contains(tag.as_str()) {
            stripped = stripped.replace(tag.as_str(), " ");
        }
    }
    collapse_whitespace(&stripped)
}
