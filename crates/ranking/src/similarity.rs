//! Per-field string similarity.

use std::collections::HashSet;

/// Similarity of two field values in `[0, 1]`, case-insensitive.
///
/// 1. equal ⇒ `1.0`
/// 2. one contains the other ⇒ `0.7 + 0.2 * shorter/longer`
/// 3. otherwise `0.7 * token_overlap + 0.3 * edit_similarity`
///
/// Blank input on either side scores `0.0`.
pub fn similarity(a: &str, b: &str) -> f32 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    if a.contains(&b) || b.contains(&a) {
        let (la, lb) = (a.chars().count(), b.chars().count());
        let ratio = la.min(lb) as f32 / la.max(lb) as f32;
        return 0.7 + 0.2 * ratio;
    }

    0.7 * token_overlap(&a, &b) + 0.3 * edit_similarity(&a, &b)
}

/// Jaccard ratio of whitespace-separated tokens.
pub fn token_overlap(a: &str, b: &str) -> f32 {
    let left: HashSet<&str> = a.split_whitespace().collect();
    let right: HashSet<&str> = b.split_whitespace().collect();
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f32 / union as f32
}

/// `1 - levenshtein / max_len`, counted in characters.
pub fn edit_similarity(a: &str, b: &str) -> f32 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    let distance = strsim::levenshtein(a, b);
    (1.0 - distance as f32 / longest as f32).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn exact_match_ignores_case_and_padding() {
        assert_eq!(similarity("Pressure Vessel", " pressure vessel "), 1.0);
    }

    #[test]
    fn containment_scales_with_length_ratio() {
        // "pe" in "no.1 pe": 2 of 7 chars
        assert!(approx(similarity("PE", "No.1 PE"), 0.7 + 0.2 * 2.0 / 7.0));
        // Hangul counts by character, not byte
        assert!(approx(similarity("베젤", "압력베젤"), 0.8));
    }

    #[test]
    fn disjoint_strings_score_low() {
        let s = similarity("centrifugal pump", "heat exchanger tube");
        assert!(s < 0.3, "{s}");
    }

    #[test]
    fn partial_token_overlap_blends() {
        let a = "no.1 pe reactor";
        let b = "no.1 pe vessel";
        let expected = 0.7 * (2.0 / 4.0) + 0.3 * edit_similarity(a, b);
        assert!(approx(similarity(a, b), expected));
    }

    #[test]
    fn blank_scores_zero() {
        assert_eq!(similarity("", "pump"), 0.0);
        assert_eq!(similarity("pump", "   "), 0.0);
    }

    #[test]
    fn edit_similarity_bounds() {
        assert_eq!(edit_similarity("abc", "abc"), 1.0);
        assert_eq!(edit_similarity("abc", "xyz"), 0.0);
        assert!(approx(edit_similarity("kitten", "sitting"), 1.0 - 3.0 / 7.0));
    }
}
