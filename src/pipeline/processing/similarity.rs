use std::collections::HashSet;

use super::normalize::TextNormalizer;

/// Title and venue similarity over normalized text
#[derive(Debug, Clone, Default)]
pub struct SimilarityScorer {
    normalizer: TextNormalizer,
}

impl SimilarityScorer {
    pub fn new(normalizer: TextNormalizer) -> Self {
        Self { normalizer }
    }

    /// Jaccard overlap of normalized title tokens, 0 when either side normalizes to nothing
    pub fn title_similarity(&self, a: &str, b: &str) -> f64 {
        let a = self.normalizer.normalize(a);
        let b = self.normalizer.normalize(b);
        jaccard_similarity(&a, &b)
    }

    /// Levenshtein ratio of normalized venue names, 0 when either venue is absent
    pub fn venue_similarity(&self, a: Option<&str>, b: Option<&str>) -> f64 {
        let (a, b) = match (a, b) {
            (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => (a, b),
            _ => return 0.0,
        };

        let a = self.normalizer.normalize(a);
        let b = self.normalizer.normalize(b);
        levenshtein_similarity(&a, &b)
    }
}

/// |A ∩ B| / |A ∪ B| over space-separated tokens
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let tokens_a: HashSet<&str> = a.split(' ').filter(|t| !t.is_empty()).collect();
    let tokens_b: HashSet<&str> = b.split(' ').filter(|t| !t.is_empty()).collect();

    let union = tokens_a.union(&tokens_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = tokens_a.intersection(&tokens_b).count();

    intersection as f64 / union as f64
}

/// Edit distance with unit insert/delete/substitute costs, over chars
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// 1 - distance / longer length; two empty strings are identical
pub fn levenshtein_similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_similarity_ignores_stop_words_and_order() {
        let scorer = SimilarityScorer::default();
        let sim = scorer.title_similarity("Salsa Party Friday", "Friday Salsa Night");
        assert_eq!(sim, 1.0);
    }

    #[test]
    fn title_similarity_is_symmetric() {
        let scorer = SimilarityScorer::default();
        let pairs = [
            ("Bachata Sensual Sunday", "Sunday Bachata"),
            ("Kizomba at Södra", "Urban Kiz Södra"),
            ("Salsa", ""),
        ];
        for (a, b) in pairs {
            assert_eq!(scorer.title_similarity(a, b), scorer.title_similarity(b, a));
        }
    }

    #[test]
    fn title_self_similarity_is_one() {
        let scorer = SimilarityScorer::default();
        assert_eq!(scorer.title_similarity("Cuban Salsa Rueda", "Cuban Salsa Rueda"), 1.0);
    }

    #[test]
    fn title_similarity_zero_when_normalized_empty() {
        let scorer = SimilarityScorer::default();
        assert_eq!(scorer.title_similarity("The Party", "The Party"), 0.0);
        assert_eq!(scorer.title_similarity("", "Salsa"), 0.0);
    }

    #[test]
    fn partial_title_overlap() {
        let scorer = SimilarityScorer::default();
        // {salsa, friday} vs {salsa, saturday}: 1 / 3
        let sim = scorer.title_similarity("Salsa Friday", "Salsa Saturday");
        assert!((sim - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn venue_similarity_tolerates_spelling() {
        let scorer = SimilarityScorer::default();
        let sim = scorer.venue_similarity(Some("Club Havana"), Some("Klubb Havana"));
        // "club havana" -> "klubb havana": substitute c->k, insert b
        assert!((sim - (1.0 - 2.0 / 12.0)).abs() < 1e-12);
        assert!(sim > 0.8);
    }

    #[test]
    fn venue_similarity_absent_is_zero() {
        let scorer = SimilarityScorer::default();
        assert_eq!(scorer.venue_similarity(None, Some("Club Havana")), 0.0);
        assert_eq!(scorer.venue_similarity(Some("Club Havana"), None), 0.0);
        assert_eq!(scorer.venue_similarity(Some(""), Some("Club Havana")), 0.0);
    }

    #[test]
    fn venue_similarity_both_normalize_empty_is_one() {
        let scorer = SimilarityScorer::default();
        assert_eq!(scorer.venue_similarity(Some("The"), Some("🎉")), 1.0);
    }

    #[test]
    fn venue_similarity_is_symmetric() {
        let scorer = SimilarityScorer::default();
        let a = Some("Dansens Hus");
        let b = Some("Dansenshus Stockholm");
        assert_eq!(scorer.venue_similarity(a, b), scorer.venue_similarity(b, a));
    }

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("malmö", "malmo"), 1);
        assert_eq!(levenshtein_similarity("", ""), 1.0);
        assert_eq!(levenshtein_similarity("abc", ""), 0.0);
    }

    #[test]
    fn jaccard_bounds() {
        assert_eq!(jaccard_similarity("a b", "c d"), 0.0);
        assert_eq!(jaccard_similarity("a b", "b a"), 1.0);
        assert_eq!(jaccard_similarity("", "a"), 0.0);
    }
}
