use tracing::debug;

use super::has_text;
use super::similarity::SimilarityScorer;
use crate::config::DedupConfig;
use crate::domain::{RawEventItem, SimilarityMatch};

/// Decides whether two raw reports describe the same occurrence.
///
/// Two cheap gates run first: the city must match exactly and the start times
/// must lie within the configured window. Only pairs passing both are scored.
/// Description, price and organizer never take part in the decision.
#[derive(Debug, Clone)]
pub struct DuplicateDetector {
    scorer: SimilarityScorer,
    time_window_millis: i64,
    title_threshold: f64,
    venue_threshold: f64,
}

impl DuplicateDetector {
    pub fn new(scorer: SimilarityScorer, config: &DedupConfig) -> Self {
        Self {
            scorer,
            time_window_millis: config.time_window_millis(),
            title_threshold: config.title_similarity_threshold,
            venue_threshold: config.venue_similarity_threshold,
        }
    }

    pub fn are_duplicates(&self, e1: &RawEventItem, e2: &RawEventItem) -> SimilarityMatch {
        if e1.city != e2.city {
            return SimilarityMatch::gated();
        }

        if !self.starts_are_close(e1, e2) {
            return SimilarityMatch::gated();
        }

        let title_similarity = self.scorer.title_similarity(&e1.title, &e2.title);
        let venue_similarity = self
            .scorer
            .venue_similarity(e1.venue_name.as_deref(), e2.venue_name.as_deref());

        let both_have_venue = has_text(e1.venue_name.as_deref()) && has_text(e2.venue_name.as_deref());
        let is_duplicate = title_similarity > self.title_threshold
            || (venue_similarity > self.venue_threshold && both_have_venue);

        debug!(
            left = %e1.id,
            right = %e2.id,
            title_similarity,
            venue_similarity,
            is_duplicate,
            "Compared raw events"
        );

        SimilarityMatch {
            title_similarity,
            venue_similarity,
            is_duplicate,
        }
    }

    /// Unparsable start times never count as close
    fn starts_are_close(&self, e1: &RawEventItem, e2: &RawEventItem) -> bool {
        match e1.start_date_time.abs_diff_millis(&e2.start_date_time) {
            Some(diff) => diff <= self.time_window_millis,
            None => false,
        }
    }
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new(SimilarityScorer::default(), &DedupConfig::default())
    }
}
