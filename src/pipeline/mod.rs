pub mod processing;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Instant;
use tracing::{error, info, warn};

use crate::config::DedupConfig;
use crate::domain::{DeduplicatedEvent, RawEventItem, SimilarityMatch};
use crate::error::{DedupError, Result};
use crate::observability::metrics;
use processing::{
    ClusterStrategy, Clusterer, ConfidenceScorer, DuplicateDetector, DuplicateGroup, FieldMerger,
    SimilarityScorer, TextNormalizer,
};

/// Summary of one deduplication run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DedupStats {
    pub strategy: ClusterStrategy,
    pub input_events: usize,
    pub groups: usize,
    /// Raw events folded into a group anchored by another event
    pub merged_away: usize,
    pub stale_events: usize,
    pub low_confidence_events: usize,
    pub unparsable_timestamps: usize,
    /// Hex SHA-256 over the input ids in input order, newline separated
    pub input_digest: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DedupReport {
    pub generated_at: DateTime<Utc>,
    pub stats: DedupStats,
    pub events: Vec<DeduplicatedEvent>,
}

/// Runs cluster, merge and score over one immutable batch.
///
/// A batch either completes or fails as a whole: the first merge error aborts
/// the run and no partial output is returned.
#[derive(Debug, Clone)]
pub struct DedupPipeline {
    config: DedupConfig,
    clusterer: Clusterer,
    merger: FieldMerger,
    scorer: ConfidenceScorer,
}

impl DedupPipeline {
    pub fn new(config: DedupConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config))
    }

    fn assemble(config: DedupConfig) -> Self {
        let normalizer = TextNormalizer::from_config(&config);
        let detector = DuplicateDetector::new(SimilarityScorer::new(normalizer), &config);

        Self {
            clusterer: Clusterer::new(detector, config.strategy),
            merger: FieldMerger::new(&config),
            scorer: ConfidenceScorer::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    pub fn strategy(&self) -> ClusterStrategy {
        self.clusterer.strategy()
    }

    /// Pairwise verdict for two raw events, exactly as clustering sees it
    pub fn compare(&self, a: &RawEventItem, b: &RawEventItem) -> SimilarityMatch {
        self.clusterer.detector().are_duplicates(a, b)
    }

    pub fn cluster<'a>(&self, events: &'a [RawEventItem]) -> Vec<DuplicateGroup<'a>> {
        self.clusterer.cluster(events)
    }

    pub fn run(&self, events: &[RawEventItem]) -> Result<DedupReport> {
        self.run_at(events, Utc::now())
    }

    /// `run` with an injected clock, so staleness is reproducible
    pub fn run_at(&self, events: &[RawEventItem], now: DateTime<Utc>) -> Result<DedupReport> {
        let started = Instant::now();
        let span = tracing::info_span!("dedup_batch", strategy = %self.strategy(), input = events.len());
        let _enter = span.enter();

        let unparsable_timestamps = count_unparsable(events);
        metrics::dedup::timestamp_parse_failures(unparsable_timestamps);

        let groups = self.cluster(events);
        let deduplicated = match self.process_groups(&groups, now) {
            Ok(events) => events,
            Err(e) => {
                error!("Deduplication batch failed: {}", e);
                metrics::dedup::batch_failed();
                return Err(e);
            }
        };

        let merged_away = events.len() - groups.len();
        metrics::dedup::groups_formed(groups.len(), merged_away);

        let threshold = self.config.low_confidence_threshold;
        let stale_events = deduplicated.iter().filter(|e| e.is_stale).count();
        let low_confidence_events = deduplicated
            .iter()
            .filter(|e| e.confidence_score < threshold)
            .count();

        let stats = DedupStats {
            strategy: self.strategy(),
            input_events: events.len(),
            groups: groups.len(),
            merged_away,
            stale_events,
            low_confidence_events,
            unparsable_timestamps,
            input_digest: input_digest(events),
        };

        metrics::dedup::batch_processed(events.len(), started.elapsed().as_secs_f64());
        info!(
            groups = stats.groups,
            merged_away = stats.merged_away,
            stale = stats.stale_events,
            low_confidence = stats.low_confidence_events,
            "Deduplication batch finished"
        );

        Ok(DedupReport {
            generated_at: now,
            stats,
            events: deduplicated,
        })
    }

    /// Merge and score already-formed groups, in group order
    pub fn process_groups(
        &self,
        groups: &[DuplicateGroup<'_>],
        now: DateTime<Utc>,
    ) -> Result<Vec<DeduplicatedEvent>> {
        let mut out = Vec::with_capacity(groups.len());
        for group in groups {
            let merged = self.merger.merge(group)?;
            let event = self.scorer.finalize(merged, now);

            metrics::dedup::confidence_score_recorded(event.confidence_score);
            if event.is_stale {
                metrics::dedup::stale_event();
            }
            if event.confidence_score < self.config.low_confidence_threshold {
                metrics::dedup::low_confidence_event();
            }

            out.push(event);
        }
        Ok(out)
    }

    /// Rebuild the groups behind previously deduplicated output: one group per
    /// output event, drawn from the raw batch by id in input order.
    pub fn regroup<'a>(
        raw: &'a [RawEventItem],
        deduplicated: &[DeduplicatedEvent],
    ) -> Result<Vec<DuplicateGroup<'a>>> {
        let mut used = vec![false; raw.len()];
        let mut groups = Vec::with_capacity(deduplicated.len());

        for event in deduplicated {
            let mut positions = Vec::with_capacity(event.raw_event_ids.len());
            for id in &event.raw_event_ids {
                let position = (0..raw.len())
                    .find(|&i| !used[i] && raw[i].id == *id)
                    .ok_or_else(|| {
                        DedupError::InvalidArgument(format!(
                            "group {} references raw event {} not present in the batch",
                            event.dedupe_group_id, id
                        ))
                    })?;
                used[position] = true;
                positions.push(position);
            }
            positions.sort_unstable();
            groups.push(positions.into_iter().map(|i| &raw[i]).collect());
        }

        Ok(groups)
    }
}

impl Default for DedupPipeline {
    fn default() -> Self {
        Self::assemble(DedupConfig::default())
    }
}

fn count_unparsable(events: &[RawEventItem]) -> usize {
    let mut count = 0;
    for event in events {
        if event.start_date_time.parsed().is_none() {
            warn!(
                raw_id = %event.id,
                start = %event.start_date_time,
                "Unparsable start time; event will not match by time"
            );
            count += 1;
        }
        if event.last_seen_at.parsed().is_none() {
            count += 1;
        }
    }
    count
}

pub fn input_digest(events: &[RawEventItem]) -> String {
    let mut hasher = Sha256::new();
    for (i, event) in events.iter().enumerate() {
        if i > 0 {
            hasher.update(b"\n");
        }
        hasher.update(event.id.as_bytes());
    }
    hex::encode(hasher.finalize())
}
