use chrono::{DateTime, Utc};

use super::merge::MergedRecord;
use crate::config::DedupConfig;
use crate::domain::{ConfidenceBreakdown, DeduplicatedEvent};

pub const VENUE_POINTS: i32 = 25;
pub const DATE_TIME_POINTS: i32 = 15;
pub const SOURCE_URL_POINTS: i32 = 10;
pub const MULTI_SOURCE_BONUS: i32 = 20;
pub const STALENESS_PENALTY: i32 = -20;
pub const THIN_DESCRIPTION_PENALTY: i32 = -15;

const MAX_SCORE: i32 = 100;

/// Assigns an explainable 0-100 trust score to merged records.
///
/// Each rule contributes independently:
///
/// | rule | condition | points |
/// |---|---|---|
/// | venue | non-blank venue name | +25 |
/// | date/time | start time present | +15 |
/// | source URL | non-blank URL | +10 |
/// | multi-source | two or more distinct sources | +20 |
/// | staleness | newest sighting older than the staleness window | -20 |
/// | thin description | missing or shorter than the minimum once trimmed | -15 |
///
/// The sum is clamped to [0, 100]; the breakdown keeps each unclamped contribution.
#[derive(Debug, Clone)]
pub struct ConfidenceScorer {
    staleness_days: i64,
    description_min_chars: usize,
}

impl ConfidenceScorer {
    pub fn new(config: &DedupConfig) -> Self {
        Self {
            staleness_days: config.staleness_days,
            description_min_chars: config.description_min_chars,
        }
    }

    pub fn score(
        &self,
        record: &MergedRecord,
        source_count: usize,
        now: DateTime<Utc>,
    ) -> (u8, ConfidenceBreakdown) {
        let event = &record.event;
        let mut breakdown = ConfidenceBreakdown::default();

        if non_blank(event.venue_name.as_deref()) {
            breakdown.has_venue = VENUE_POINTS;
        }
        if event.start_date_time.is_present() {
            breakdown.has_date_time = DATE_TIME_POINTS;
        }
        if non_blank(event.source_url.as_deref()) {
            breakdown.has_source_url = SOURCE_URL_POINTS;
        }
        if source_count >= 2 {
            breakdown.multiple_sources_bonus = MULTI_SOURCE_BONUS;
        }
        if self.is_stale(record.newest_last_seen, now) {
            breakdown.staleness_penalty = STALENESS_PENALTY;
        }
        let description_len = event
            .description
            .as_deref()
            .map_or(0, |d| d.trim().chars().count());
        if description_len < self.description_min_chars {
            breakdown.description_penalty = THIN_DESCRIPTION_PENALTY;
        }

        let total = breakdown.raw_sum().clamp(0, MAX_SCORE);
        breakdown.total = total;

        (total as u8, breakdown)
    }

    /// More than `staleness_days` fractional days since the last sighting.
    /// An unknown sighting time is never stale.
    pub fn is_stale(&self, last_seen: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last_seen {
            Some(seen) => days_between(seen, now) > self.staleness_days as f64,
            None => false,
        }
    }

    /// Score a merged record and seal it into its final, read-only form
    pub fn finalize(&self, record: MergedRecord, now: DateTime<Utc>) -> DeduplicatedEvent {
        let (confidence_score, confidence_breakdown) = self.score(&record, record.sources.len(), now);
        let is_stale = self.is_stale(record.newest_last_seen, now);

        DeduplicatedEvent {
            event: record.event,
            confidence_score,
            confidence_breakdown,
            is_stale,
            sources: record.sources,
            raw_event_ids: record.raw_event_ids,
            dedupe_group_id: record.dedupe_group_id,
            oldest_last_seen: record.oldest_last_seen,
            newest_last_seen: record.newest_last_seen,
        }
    }
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::new(&DedupConfig::default())
    }
}

fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / (1000.0 * 60.0 * 60.0 * 24.0)
}

fn non_blank(value: Option<&str>) -> bool {
    value.map_or(false, |v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventSource, EventTimestamp, RawEventItem};
    use crate::pipeline::processing::fixtures::raw_event;
    use crate::pipeline::processing::merge::FieldMerger;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
    }

    fn merged(events: &[&RawEventItem]) -> MergedRecord {
        FieldMerger::default().merge(events).unwrap()
    }

    #[test]
    fn bare_single_source_event_clamps_to_zero() {
        let mut event = raw_event("a", "Salsa", "2025-03-14T20:00:00Z");
        event.last_seen_at = EventTimestamp::from_datetime(now() - Duration::days(1));
        let record = merged(&[&event]);

        let (score, breakdown) = ConfidenceScorer::default().score(&record, 1, now());
        assert_eq!(score, 0);
        assert_eq!(breakdown.has_date_time, 15);
        assert_eq!(breakdown.description_penalty, -15);
        assert_eq!(breakdown.total, 0);
    }

    #[test]
    fn fully_corroborated_event_scores_seventy() {
        let mut a = raw_event("a", "Salsa", "2025-03-14T20:00:00Z");
        a.venue_name = Some("Club Havana".to_string());
        a.source_url = Some("https://facebook.com/events/1".to_string());
        a.description = Some("Two rooms, live band at midnight, beginner class at 20:00.".to_string());
        a.last_seen_at = EventTimestamp::from_datetime(now());
        let mut b = raw_event("b", "Salsa", "2025-03-14T20:00:00Z");
        b.source = EventSource::Website;
        b.last_seen_at = EventTimestamp::from_datetime(now());
        let record = merged(&[&a, &b]);

        let (score, breakdown) = ConfidenceScorer::default().score(&record, record.sources.len(), now());
        assert_eq!(breakdown.multiple_sources_bonus, 20);
        assert_eq!(breakdown.staleness_penalty, 0);
        assert_eq!(breakdown.description_penalty, 0);
        assert_eq!(score, 70);
        assert_eq!(breakdown.total, 70);
    }

    #[test]
    fn fifteen_days_unseen_is_stale_and_penalized() {
        let mut event = raw_event("a", "Salsa", "2025-03-14T20:00:00Z");
        event.venue_name = Some("Club Havana".to_string());
        event.last_seen_at = EventTimestamp::from_datetime(now() - Duration::days(15));
        let scorer = ConfidenceScorer::default();
        let deduped = scorer.finalize(merged(&[&event]), now());

        assert!(deduped.is_stale);
        assert_eq!(deduped.confidence_breakdown.staleness_penalty, -20);
        // 25 + 15 - 20 - 15
        assert_eq!(deduped.confidence_breakdown.raw_sum(), 5);
        assert_eq!(deduped.confidence_score, 5);
    }

    #[test]
    fn staleness_boundary_is_strict() {
        let scorer = ConfidenceScorer::default();
        assert!(!scorer.is_stale(Some(now() - Duration::days(10)), now()));
        assert!(scorer.is_stale(Some(now() - Duration::days(10) - Duration::seconds(1)), now()));
        assert!(!scorer.is_stale(None, now()));
    }

    #[test]
    fn whitespace_only_fields_do_not_count() {
        let mut event = raw_event("a", "Salsa", "2025-03-14T20:00:00Z");
        event.venue_name = Some("   ".to_string());
        event.source_url = Some(" ".to_string());
        event.description = Some(format!("   {}   ", "x".repeat(29)));
        let record = merged(&[&event]);

        let (_, breakdown) = ConfidenceScorer::default().score(&record, 1, now());
        assert_eq!(breakdown.has_venue, 0);
        assert_eq!(breakdown.has_source_url, 0);
        assert_eq!(breakdown.description_penalty, -15);
    }

    #[test]
    fn score_always_equals_total_and_stays_in_range() {
        let scorer = ConfidenceScorer::default();
        let mut event = raw_event("a", "Salsa", "2025-03-14T20:00:00Z");
        for venue in [None, Some("Club Havana")] {
            for url in [None, Some("https://example.com")] {
                for description in [None, Some("A long enough description of the social evening.")] {
                    for days_ago in [0, 30] {
                        event.venue_name = venue.map(str::to_string);
                        event.source_url = url.map(str::to_string);
                        event.description = description.map(str::to_string);
                        event.last_seen_at = EventTimestamp::from_datetime(
                            now() - Duration::days(days_ago),
                        );
                        let record = merged(&[&event]);
                        for sources in [1, 3] {
                            let (score, breakdown) = scorer.score(&record, sources, now());
                            assert!(score <= 100);
                            assert_eq!(score as i32, breakdown.total);
                            assert_eq!(breakdown.total, breakdown.raw_sum().clamp(0, 100));
                        }
                    }
                }
            }
        }
    }
}
