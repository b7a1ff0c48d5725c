// src/utils/strings.rs - shared string normalization and similarity helpers

use regex::Regex;
use std::collections::HashSet;
use strsim::normalized_levenshtein;

/// Lowercase a raw name and collapse all runs of whitespace to single spaces.
pub fn normalize_name(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapse whitespace without changing case.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized edit-distance similarity in [0, 1]. Two empty strings are identical.
pub fn fuzz_sim(s1: &str, s2: &str) -> f64 {
    if s1 == s2 {
        return 1.0;
    }
    normalized_levenshtein(s1, s2)
}

/// Character n-grams over the words of a string, with each word padded as
/// "  word " so that word starts and ends produce their own grams.
pub fn find_ngrams(text: &str, number: usize) -> HashSet<String> {
    let mut ngrams = HashSet::new();
    if text.is_empty() {
        return ngrams;
    }

    for word in text.to_lowercase().split(|c: char| !c.is_alphanumeric()) {
        let word = word.trim();
        if word.is_empty() {
            continue;
        }
        let padded: Vec<char> = format!("  {} ", word).chars().collect();
        if padded.len() < number {
            continue;
        }
        for window in padded.windows(number) {
            ngrams.insert(window.iter().collect());
        }
    }

    ngrams
}

/// Jaccard similarity of the n-gram sets of two strings. 0 means completely
/// different, 1 means equal.
pub fn ngram_similarity(text1: &str, text2: &str, number: usize) -> f64 {
    let ngrams1 = find_ngrams(text1, number);
    let ngrams2 = find_ngrams(text2, number);

    let num_unique = ngrams1.union(&ngrams2).count();
    if num_unique == 0 {
        return 0.0;
    }
    let num_equal = ngrams1.intersection(&ngrams2).count();
    num_equal as f64 / num_unique as f64
}

/// Trigram-set Jaccard similarity of two whole strings.
pub fn trigram_similarity(text1: &str, text2: &str) -> f64 {
    ngram_similarity(text1, text2, 3)
}

/// Integer percentage of words shared between two strings relative to the
/// total word count across both, counted from both directions.
pub fn roland_score(s1: &str, s2: &str) -> i64 {
    let words1: Vec<&str> = s1.split_whitespace().collect();
    let words2: Vec<&str> = s2.split_whitespace().collect();
    let total_words = words1.len() + words2.len();
    if total_words == 0 {
        return 0;
    }

    let set1: HashSet<&str> = words1.iter().copied().collect();
    let set2: HashSet<&str> = words2.iter().copied().collect();
    let count_of_syncs = words1.iter().filter(|w| set2.contains(*w)).count()
        + words2.iter().filter(|w| set1.contains(*w)).count();

    (100.0 * count_of_syncs as f64 / total_words as f64).round() as i64
}

/// Fraction of s1's tokens that appear anywhere in s2.
pub fn token_overlap(s1: &str, s2: &str) -> f64 {
    let t1: Vec<&str> = s1.split_whitespace().collect();
    if t1.is_empty() {
        return 0.0;
    }
    let t2: HashSet<&str> = s2.split_whitespace().collect();
    t1.iter().filter(|t| t2.contains(*t)).count() as f64 / t1.len() as f64
}

/// Max trigram similarity between the n-th token of s1 and every token of s2.
/// Returns 0 when s1 has fewer than n + 1 tokens.
pub fn positional_token_similarity(s1: &str, s2: &str, n: usize) -> f64 {
    let t1: Vec<&str> = s1.split_whitespace().collect();
    if n >= t1.len() {
        return 0.0;
    }
    s2.split_whitespace()
        .map(|t| trigram_similarity(t1[n], t))
        .fold(0.0, f64::max)
}

/// Average similarity between the words unique to each side and the full word
/// set of the other side. Returned as (s1 direction, s2 direction), where the
/// s1 direction measures how well s2-only words resemble s1's vocabulary.
pub fn word_diff_similarity(s1: &str, s2: &str) -> (f64, f64) {
    let s1_words: HashSet<&str> = s1.split_whitespace().collect();
    let s2_words: HashSet<&str> = s2.split_whitespace().collect();

    let avg_sim = |diffs: Vec<&&str>, other: &HashSet<&str>| -> f64 {
        if diffs.is_empty() || other.is_empty() {
            return 0.0;
        }
        let sum: f64 = diffs
            .iter()
            .map(|d| other.iter().map(|w| fuzz_sim(d, w)).fold(0.0, f64::max))
            .sum();
        sum / diffs.len() as f64
    };

    let s2_only: Vec<&&str> = s2_words.difference(&s1_words).collect();
    let s1_only: Vec<&&str> = s1_words.difference(&s2_words).collect();

    (avg_sim(s2_only, &s1_words), avg_sim(s1_only, &s2_words))
}

fn char_grams(s: &str, n: usize) -> HashSet<String> {
    let chars: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
    let mut grams = HashSet::new();
    if chars.len() >= n {
        for window in chars.windows(n) {
            grams.insert(window.iter().collect());
        }
    }
    grams
}

/// Ratio of differing character n-grams to shared character n-grams between
/// two strings, spaces removed. Falls back to the raw difference count when
/// nothing is shared.
pub fn char_gram_diff_ratio(s1: &str, s2: &str, n: usize) -> f64 {
    let grams1 = char_grams(s1, n);
    let grams2 = char_grams(s2, n);

    let diff = grams1.symmetric_difference(&grams2).count();
    let inter = 2 * grams1.intersection(&grams2).count();
    if inter > 0 {
        diff as f64 / inter as f64
    } else {
        diff as f64
    }
}

/// Remove every occurrence of the given substrings from a string via literal
/// substitution, longest substring first, then collapse whitespace. Longest
/// first keeps a shorter fragment from splitting a longer match it overlaps.
pub fn remove_substrings(string: &str, substrings: &[String]) -> String {
    let mut parts: Vec<&String> = substrings.iter().filter(|s| !s.is_empty()).collect();
    if parts.is_empty() {
        return string.trim().to_string();
    }
    parts.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let pattern = parts
        .iter()
        .map(|s| regex::escape(s))
        .collect::<Vec<_>>()
        .join("|");
    match Regex::new(&pattern) {
        Ok(re) => collapse_whitespace(&re.replace_all(string, "")),
        Err(_) => string.trim().to_string(),
    }
}

/// The symmetric-difference word set of two strings, sorted and space-joined.
pub fn sorted_word_diff(s1: &str, s2: &str) -> String {
    let w1: HashSet<&str> = s1.split_whitespace().collect();
    let w2: HashSet<&str> = s2.split_whitespace().collect();
    let mut diff: Vec<&str> = w1.symmetric_difference(&w2).copied().collect();
    diff.sort_unstable();
    diff.join(" ")
}

/// Sort the words of a phrase and space-join them.
pub fn sorted_words(phrase: &str) -> String {
    let mut words: Vec<&str> = phrase.split_whitespace().collect();
    words.sort_unstable();
    words.join(" ")
}

/// True when every word of one string appears in the other.
pub fn word_subset(s1: &str, s2: &str) -> bool {
    let w1: HashSet<&str> = s1.split_whitespace().collect();
    let w2: HashSet<&str> = s2.split_whitespace().collect();
    w1.is_subset(&w2) || w2.is_subset(&w1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Cleveland   Clinic "), "cleveland clinic");
        assert_eq!(normalize_name("UPENN Urology"), "upenn urology");
    }

    #[test]
    fn test_ngram_similarity_bounds() {
        assert_eq!(ngram_similarity("", "", 3), 0.0);
        assert!((ngram_similarity("clinic", "clinic", 3) - 1.0).abs() < f64::EPSILON);
        assert!(ngram_similarity("cardiology", "cardiologist", 3) > 0.4);
    }

    #[test]
    fn test_roland_score() {
        assert_eq!(roland_score("emory decatur hospital", "emory decatur hospital"), 100);
        assert_eq!(roland_score("alpha beta", "gamma delta"), 0);
        // 2 shared words on each side out of 5 total words
        assert_eq!(roland_score("emory decatur", "emory decatur hospital"), 80);
    }

    #[test]
    fn test_token_overlap_directional() {
        assert!((token_overlap("emory decatur", "emory decatur hospital") - 1.0).abs() < 1e-9);
        assert!((token_overlap("emory decatur hospital", "emory decatur") - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(token_overlap("", "anything"), 0.0);
    }

    #[test]
    fn test_positional_token_similarity_out_of_range() {
        assert_eq!(positional_token_similarity("one two", "one two", 5), 0.0);
        assert!(positional_token_similarity("urology clinic", "urology associates", 0) > 0.9);
    }

    #[test]
    fn test_remove_substrings_basic() {
        let out = remove_substrings("emory decatur medical center", &["medical center".to_string()]);
        assert_eq!(out, "emory decatur");
    }

    #[test]
    fn test_remove_substrings_overlapping() {
        // The longer alias wins so the shorter fragment cannot split it first.
        let out = remove_substrings(
            "cardiology associates",
            &["cardiolog".to_string(), "cardiology".to_string()],
        );
        assert_eq!(out, "associates");
    }

    #[test]
    fn test_remove_substrings_empty_list() {
        assert_eq!(remove_substrings("unchanged name", &[]), "unchanged name");
    }

    #[test]
    fn test_sorted_word_diff() {
        assert_eq!(
            sorted_word_diff("mercy hospital tacoma", "mercy hospital"),
            "tacoma"
        );
        assert_eq!(sorted_word_diff("a b", "a b"), "");
    }

    #[test]
    fn test_word_subset() {
        assert!(word_subset("emory decatur", "emory decatur hospital"));
        assert!(!word_subset("emory oncology", "emory cardiology"));
    }

    #[test]
    fn test_char_gram_diff_ratio_identical() {
        assert_eq!(char_gram_diff_ratio("same name", "same name", 2), 0.0);
        assert!(char_gram_diff_ratio("abc", "xyz", 2) > 0.0);
    }

    #[test]
    fn test_word_diff_similarity_no_diffs() {
        let (a, b) = word_diff_similarity("same words", "same words");
        assert_eq!(a, 0.0);
        assert_eq!(b, 0.0);
    }

    #[test]
    fn test_word_diff_similarity_misspelling() {
        // "nephrolog" should look very close to "nephrology" on the other side.
        let (s1_dir, _) = word_diff_similarity("nyu nephrology", "nyu nephrolog");
        assert!(s1_dir > 0.85);
    }
}
