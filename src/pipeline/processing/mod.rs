pub mod cluster;
pub mod confidence;
pub mod duplicate;
pub mod merge;
pub mod normalize;
pub mod similarity;

#[cfg(test)]
pub(crate) mod fixtures;

pub use cluster::{ClusterStrategy, Clusterer, DuplicateGroup};
pub use confidence::ConfidenceScorer;
pub use duplicate::DuplicateDetector;
pub use merge::{FieldMerger, MergedRecord};
pub use normalize::TextNormalizer;
pub use similarity::SimilarityScorer;

/// Present and non-empty, without trimming
pub(crate) fn has_text(value: Option<&str>) -> bool {
    value.map_or(false, |v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_text_rejects_absent_and_empty_only() {
        assert!(!has_text(None));
        assert!(!has_text(Some("")));
        assert!(has_text(Some(" ")));
        assert!(has_text(Some("Club Havana")));
    }
}
