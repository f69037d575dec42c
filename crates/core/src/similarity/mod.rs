//! Title similarity scoring.
//!
//! Catalog titles scraped from streaming pages rarely match the search API
//! verbatim: punctuation, casing, subtitle fragments and partial wording all
//! differ. This module blends four signals into one score in [0, 1]:
//! character-level edit distance, Jaro similarity, contiguous-substring
//! containment and token overlap. All sub-scores are computed on normalized
//! forms of the inputs.

/// Weight of the edit-distance sub-score in the blend.
const EDIT_WEIGHT: f32 = 0.3;
/// Weight of the Jaro sub-score in the blend.
const JARO_WEIGHT: f32 = 0.3;
/// Weight of the substring-containment sub-score in the blend.
const SUBSTRING_WEIGHT: f32 = 0.2;
/// Weight of the word-overlap sub-score in the blend.
const WORD_WEIGHT: f32 = 0.2;

/// Normalize a title for comparison: lowercase, strip everything that is not
/// a word character or whitespace, collapse whitespace runs, trim.
///
/// Idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(s: &str) -> String {
    let filtered: String = s
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Overall similarity between two titles, in [0, 1].
///
/// Titles that normalize to the same string score exactly 1.0, bypassing the
/// blend so identical titles never lose to floating point noise. Otherwise
/// the result is `0.3 * edit + 0.3 * jaro + 0.2 * substring + 0.2 * words`,
/// computed on the normalized forms. The weights are fixed; changing them
/// changes every cached confidence value.
pub fn similarity(a: &str, b: &str) -> f32 {
    let na = normalize(a);
    let nb = normalize(b);

    if na == nb {
        return 1.0;
    }

    EDIT_WEIGHT * edit_similarity(&na, &nb)
        + JARO_WEIGHT * jaro_similarity(&na, &nb)
        + SUBSTRING_WEIGHT * substring_score(&na, &nb)
        + WORD_WEIGHT * word_overlap_score(&na, &nb)
}

/// Edit-distance similarity: `1 - levenshtein(a, b) / max(len)`.
fn edit_similarity(a: &str, b: &str) -> f32 {
    let a_len = a.chars().count();
    let b_len = b.chars().count();
    let max_len = a_len.max(b_len);
    if max_len == 0 {
        return 1.0;
    }

    1.0 - levenshtein_distance(a, b) as f32 / max_len as f32
}

/// Levenshtein edit distance with unit insert/delete/substitute costs.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Two-row DP over the classic matrix.
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0usize; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = if a_char == b_char { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_chars.len()]
}

/// Standard Jaro similarity.
///
/// Matching window is `floor(max(len) / 2) - 1`. Returns 0.0 when either
/// string is empty or no characters match within the window.
pub fn jaro_similarity(a: &str, b: &str) -> f32 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() || b_chars.is_empty() {
        return 0.0;
    }

    let window = (a_chars.len().max(b_chars.len()) / 2).saturating_sub(1);

    let mut a_matched = vec![false; a_chars.len()];
    let mut b_matched = vec![false; b_chars.len()];
    let mut matches = 0usize;

    for (i, a_char) in a_chars.iter().enumerate() {
        let lo = i.saturating_sub(window);
        let hi = (i + window + 1).min(b_chars.len());
        for j in lo..hi {
            if !b_matched[j] && b_chars[j] == *a_char {
                a_matched[i] = true;
                b_matched[j] = true;
                matches += 1;
                break;
            }
        }
    }

    if matches == 0 {
        return 0.0;
    }

    // Transpositions: matched characters that appear in a different order.
    let a_seq: Vec<char> = a_chars
        .iter()
        .zip(&a_matched)
        .filter(|(_, m)| **m)
        .map(|(c, _)| *c)
        .collect();
    let b_seq: Vec<char> = b_chars
        .iter()
        .zip(&b_matched)
        .filter(|(_, m)| **m)
        .map(|(c, _)| *c)
        .collect();
    let transpositions = a_seq.iter().zip(&b_seq).filter(|(x, y)| x != y).count();

    let m = matches as f32;
    (m / a_chars.len() as f32
        + m / b_chars.len() as f32
        + (m - transpositions as f32 / 2.0) / m)
        / 3.0
}

/// Substring-containment score.
///
/// Full containment of the shorter string in the longer scores a flat 0.8;
/// otherwise the longest common contiguous substring is measured against the
/// longer string's length.
pub fn substring_score(a: &str, b: &str) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };

    if longer.contains(shorter) {
        return 0.8;
    }

    let max_len = longer.chars().count();
    longest_common_substring(a, b) as f32 / max_len as f32
}

/// Length of the longest common contiguous substring (in chars).
fn longest_common_substring(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    // suffix[j] = length of the common suffix ending at a[i], b[j].
    let mut suffix = vec![0usize; b_chars.len() + 1];
    let mut longest = 0usize;

    for a_char in &a_chars {
        // Walk right-to-left so suffix[j] still holds the previous row's value.
        for j in (0..b_chars.len()).rev() {
            if b_chars[j] == *a_char {
                suffix[j + 1] = suffix[j] + 1;
                longest = longest.max(suffix[j + 1]);
            } else {
                suffix[j + 1] = 0;
            }
        }
    }

    longest
}

/// Word-overlap score: Jaccard index over tokens longer than one character.
///
/// Both token sets empty scores 1.0, exactly one empty scores 0.0.
pub fn word_overlap_score(a: &str, b: &str) -> f32 {
    use std::collections::HashSet;

    let a_tokens: HashSet<&str> = a.split(' ').filter(|t| t.chars().count() > 1).collect();
    let b_tokens: HashSet<&str> = b.split(' ').filter(|t| t.chars().count() > 1).collect();

    match (a_tokens.is_empty(), b_tokens.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        _ => {}
    }

    let intersection = a_tokens.intersection(&b_tokens).count();
    let union = a_tokens.union(&b_tokens).count();

    intersection as f32 / union as f32
}
