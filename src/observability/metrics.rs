//! Metrics for the deduplication engine
//!
//! Names follow Prometheus conventions. Recording goes through the `metrics`
//! facade, so every helper is a no-op until a recorder is installed
//! (the CLI installs a Prometheus one behind `--metrics`).

use std::fmt;

/// Every metric the engine records, so call sites never spell names by hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Batch metrics
    BatchesProcessed,
    BatchesFailed,
    BatchSize,
    BatchDuration,

    // Clustering metrics
    GroupsFormed,
    RecordsMergedAway,

    // Scoring metrics
    ConfidenceScore,
    StaleEvents,
    LowConfidenceEvents,
    TimestampParseFailures,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::BatchesProcessed => "event_dedup_batches_processed_total",
            MetricName::BatchesFailed => "event_dedup_batches_failed_total",
            MetricName::BatchSize => "event_dedup_batch_size",
            MetricName::BatchDuration => "event_dedup_batch_duration_seconds",

            MetricName::GroupsFormed => "event_dedup_groups_formed_total",
            MetricName::RecordsMergedAway => "event_dedup_records_merged_away_total",

            MetricName::ConfidenceScore => "event_dedup_confidence_score",
            MetricName::StaleEvents => "event_dedup_stale_events_total",
            MetricName::LowConfidenceEvents => "event_dedup_low_confidence_events_total",
            MetricName::TimestampParseFailures => "event_dedup_timestamp_parse_failures_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub mod dedup {
    use super::MetricName;

    /// Record a completed batch with its input size and wall time
    pub fn batch_processed(size: usize, duration_secs: f64) {
        ::metrics::counter!(MetricName::BatchesProcessed.as_str()).increment(1);
        ::metrics::histogram!(MetricName::BatchSize.as_str()).record(size as f64);
        ::metrics::histogram!(MetricName::BatchDuration.as_str()).record(duration_secs);
    }

    pub fn batch_failed() {
        ::metrics::counter!(MetricName::BatchesFailed.as_str()).increment(1);
    }

    /// Record clustering output: groups formed and records folded into another group
    pub fn groups_formed(groups: usize, merged_away: usize) {
        ::metrics::counter!(MetricName::GroupsFormed.as_str()).increment(groups as u64);
        ::metrics::counter!(MetricName::RecordsMergedAway.as_str()).increment(merged_away as u64);
    }

    pub fn confidence_score_recorded(score: u8) {
        ::metrics::histogram!(MetricName::ConfidenceScore.as_str()).record(score as f64);
    }

    pub fn stale_event() {
        ::metrics::counter!(MetricName::StaleEvents.as_str()).increment(1);
    }

    pub fn low_confidence_event() {
        ::metrics::counter!(MetricName::LowConfidenceEvents.as_str()).increment(1);
    }

    pub fn timestamp_parse_failures(count: usize) {
        if count > 0 {
            ::metrics::counter!(MetricName::TimestampParseFailures.as_str())
                .increment(count as u64);
        }
    }
}
