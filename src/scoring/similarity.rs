use std::collections::HashSet;

/// Jaccard similarity over the sets of words longer than three characters.
///
/// Deliberately a plain set-overlap heuristic: it keeps fragmentation
/// scoring deterministic and cheap. Case-insensitive; punctuation splits
/// words.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let set_a = word_set(a);
    let set_b = word_set(b);

    if set_a.is_empty() && set_b.is_empty() {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    intersection as f64 / union as f64
}

fn word_set(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 3)
        .map(|w| w.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_texts() {
        let text = "acquisition of hospital cleaning supplies";
        assert_eq!(jaccard_similarity(text, text), 1.0);
    }

    #[test]
    fn test_disjoint_texts() {
        assert_eq!(
            jaccard_similarity("road paving works", "software licenses"),
            0.0
        );
    }

    #[test]
    fn test_short_words_ignored()  {
        // "of", "the", "for" are all <= 3 chars and never counted.
        assert_eq!(jaccard_similarity("of the for a an", "to in at on"), 0.0);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            jaccard_similarity("CLEANING Supplies", "cleaning supplies"),
            1.0
        );
    }

    #[test]
    fn test_partial_overlap() {
        // Sets: {cleaning, supplies, january} and {cleaning, supplies, february}
        // intersection 2, union 4.
        let sim = jaccard_similarity(
            "cleaning supplies january",
            "cleaning supplies february",
        );
        assert!((sim - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_punctuation_splits_words() {
        assert_eq!(
            jaccard_similarity("supplies,cleaning", "supplies cleaning"),
            1.0
        );
    }
}
