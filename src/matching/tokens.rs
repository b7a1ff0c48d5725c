// src/matching/tokens.rs - lexicon-driven fuzzy token matching
//
// For each category the strategies run in a fixed order and the first positive
// result is accepted: exact alias containment, single-word edit distance,
// multi-word sliding-window edit distance, then (specialties only) the suffix
// heuristics. Hospital detection is its own matcher. Categories are never
// mutually exclusive: one substring may satisfy several of them.

use log::debug;
use regex::Regex;
use std::collections::BTreeMap;
use strsim::levenshtein;

use crate::lexicon::Lexicon;
use crate::models::{MatchHit, Namespace};
use crate::utils::constants::{HOSPITAL_EDIT_DISTANCE, SINGLE_WORD_EDIT_DISTANCE};

/// Stems whose truncated "log" form is a substring of another specialty and
/// would cross-match. Those specialties only match via the exact paths.
const AMBIGUOUS_LOG_STEMS: [&str; 2] = ["urolog", "neurolog"];

/// Run the matcher for one lexicon namespace against a normalized string.
pub fn match_namespace(normalized: &str, lexicon: &Lexicon, namespace: Namespace) -> Vec<MatchHit> {
    if normalized.is_empty() {
        return Vec::new();
    }
    match namespace {
        Namespace::Medical => {
            match_alias_categories(normalized, lexicon.medical_entities(), Namespace::Medical)
        }
        Namespace::Department => {
            match_alias_categories(normalized, lexicon.departments(), Namespace::Department)
        }
        Namespace::Specialty => match_specialties(normalized, lexicon),
    }
}

/// Alias-table matching for the medical and department namespaces.
fn match_alias_categories(
    normalized: &str,
    table: &BTreeMap<String, Vec<String>>,
    namespace: Namespace,
) -> Vec<MatchHit> {
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    let mut hits = Vec::new();

    for (category, aliases) in table {
        if let Some(matched) = match_category(normalized, &tokens, category, aliases) {
            hits.push(MatchHit::new(category.clone(), namespace, matched));
        }
    }

    hits
}

/// Strategy chain for a single aliased category. Returns the matched source
/// substring from the first strategy that fires.
fn match_category(
    normalized: &str,
    tokens: &[&str],
    category: &str,
    aliases: &[String],
) -> Option<String> {
    // 1. Word-bounded literal containment of the canonical name or any alias.
    if let Some(matched) = exact_alias_containment(normalized, category, aliases) {
        return Some(matched);
    }

    let canonical_words: Vec<&str> = category.split_whitespace().collect();

    // 2. Single-word categories tolerate one edit against any token.
    if canonical_words.len() == 1 {
        if let Some(matched) = single_word_edit_match(tokens, category) {
            return Some(matched);
        }
    }

    // 3. Multi-word categories slide a window over the tokens; every aligned
    //    word must be within one edit for the window to count.
    if canonical_words.len() > 1 {
        if let Some(matched) = multi_word_edit_match(tokens, &canonical_words) {
            return Some(matched);
        }
    }

    None
}

fn exact_alias_containment(normalized: &str, category: &str, aliases: &[String]) -> Option<String> {
    let candidates = std::iter::once(category).chain(aliases.iter().map(|a| a.as_str()));
    for alias in candidates {
        if alias.is_empty() {
            continue;
        }
        if let Ok(re) = Regex::new(&format!(r"\b{}\b", regex::escape(alias))) {
            if let Some(m) = re.find(normalized) {
                return Some(m.as_str().to_string());
            }
        }
    }
    None
}

fn single_word_edit_match(tokens: &[&str], canonical: &str) -> Option<String> {
    tokens
        .iter()
        .find(|token| levenshtein(token, canonical) <= SINGLE_WORD_EDIT_DISTANCE)
        .map(|token| token.to_string())
}

fn multi_word_edit_match(tokens: &[&str], canonical_words: &[&str]) -> Option<String> {
    let width = canonical_words.len();
    if tokens.len() < width {
        return None;
    }
    for window in tokens.windows(width) {
        let all_close = window
            .iter()
            .zip(canonical_words)
            .all(|(token, word)| levenshtein(token, word) <= SINGLE_WORD_EDIT_DISTANCE);
        if all_close {
            return Some(window.join(" "));
        }
    }
    None
}

/// Specialty matching over the root-word list plus the suffix heuristics.
pub fn match_specialties(normalized: &str, lexicon: &Lexicon) -> Vec<MatchHit> {
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    let mut hits: Vec<MatchHit> = Vec::new();
    let mut push = |category: &str, matched: &str| {
        hits.push(MatchHit::new(category, Namespace::Specialty, matched));
    };

    for entry in lexicon.specialty_entries() {
        let root = entry.category.as_str();

        // Word-bounded containment of the root itself.
        if let Ok(re) = Regex::new(&format!(r"\b{}\b", regex::escape(root))) {
            if let Some(m) = re.find(normalized) {
                push(root, m.as_str());
                continue;
            }
        }

        // One-edit token match, guarded on the first character so that sibling
        // fields a single edit apart do not swallow each other's typos.
        if let Some(token) = tokens.iter().find(|t| {
            levenshtein(t, root) <= SINGLE_WORD_EDIT_DISTANCE
                && t.chars().next() == root.chars().next()
        }) {
            push(root, token);
            continue;
        }

        let Some(stem) = entry.stem.as_deref() else {
            continue;
        };

        // Exact practitioner forms of the root: "cardiologist", "cardiologists".
        let logist = format!("{stem}logist");
        let logists = format!("{stem}logists");
        if let Some(token) = tokens.iter().find(|t| **t == logist || **t == logists) {
            push(root, token);
            continue;
        }

        // A token carrying "logy" whose prefix is exactly one edit from the
        // stem. Exactly one, not at most one: a distance of zero is already
        // covered by the containment path above.
        if let Some(token) = tokens.iter().find(|t| {
            t.find("logy")
                .map(|idx| levenshtein(&t[..idx], stem) == 1)
                .unwrap_or(false)
        }) {
            push(root, token);
            continue;
        }

        // Truncated forms such as "nephrolog". The ambiguous stems are skipped
        // because their truncations appear inside other fields' names.
        let log_form = format!("{stem}log");
        if !AMBIGUOUS_LOG_STEMS.contains(&log_form.as_str()) {
            if let Some(token) = tokens.iter().find(|t| t.contains(&log_form)) {
                push(root, token);
                continue;
            }
        }
    }

    // Fixed prefix/suffix rules for common specialties.
    for token in &tokens {
        if token.starts_with('a') && token.ends_with("sia") {
            push("anesthesiology", token);
        }
        if token.contains("obgyn") || token.contains("ob-gyn") || *token == "ob" || *token == "gyn"
        {
            push("obgyn", token);
        }
        if token.starts_with("ortho") {
            push("orthopedic", token);
        }
        if token.starts_with("pedi") {
            push("pediatric", token);
        }
        if token.starts_with("geri") {
            push("geriatric", token);
        }
        if token.starts_with("endos") {
            push("endoscopy", token);
        }
        if token.starts_with("cardio") {
            push("cardiology", token);
        }
        if token.starts_with("pulmon") {
            push("pulmonology", token);
        }
        if *token == "ent" || token.starts_with("otorhino") {
            push("ent", token);
        }
    }

    debug!(
        "Specialty matcher found {} hit(s) in \"{}\"",
        hits.len(),
        normalized
    );
    hits
}

/// Detect the word "hospital" or a close misspelling of it.
pub fn detect_hospital(normalized: &str) -> Option<MatchHit> {
    for token in normalized.split_whitespace() {
        if token == "hospital"
            || token == "hospt"
            || levenshtein(token, "hospital") <= HOSPITAL_EDIT_DISTANCE
        {
            return Some(MatchHit::new("hospital", Namespace::Medical, token));
        }
    }
    None
}
