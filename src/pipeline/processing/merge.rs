use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashSet;
use tracing::{debug, warn};

use super::has_text;
use crate::config::DedupConfig;
use crate::domain::{EventSource, EventTimestamp, RawEventItem};
use crate::error::{DedupError, Result};

/// One duplicate group collapsed into a single record, before scoring
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergedRecord {
    /// The canonical member's fields with the best optional values folded in
    pub event: RawEventItem,
    pub sources: Vec<EventSource>,
    pub raw_event_ids: Vec<String>,
    pub dedupe_group_id: String,
    pub oldest_last_seen: Option<DateTime<Utc>>,
    pub newest_last_seen: Option<DateTime<Utc>>,
}

/// Collapses a duplicate group into one consolidated record
#[derive(Debug, Clone)]
pub struct FieldMerger {
    description_min_chars: usize,
}

impl FieldMerger {
    pub fn new(config: &DedupConfig) -> Self {
        Self {
            description_min_chars: config.description_min_chars,
        }
    }

    pub fn merge(&self, group: &[&RawEventItem]) -> Result<MergedRecord> {
        if group.is_empty() {
            return Err(DedupError::InvalidArgument(
                "cannot merge an empty event group".to_string(),
            ));
        }

        let canonical = self.canonical(group);
        let mut event = canonical.clone();

        if let Some(v) = first_text(group, |e| e.venue_name.as_deref()) {
            event.venue_name = Some(v);
        }
        if let Some(v) = first_text(group, |e| e.address.as_deref()) {
            event.address = Some(v);
        }
        if let Some(v) = longest_text(group, |e| e.description.as_deref()) {
            event.description = Some(v);
        }
        if let Some(v) = first_text(group, |e| e.source_url.as_deref()) {
            event.source_url = Some(v);
        }
        if let Some(v) = first_text(group, |e| e.price.as_deref()) {
            event.price = Some(v);
        }
        if let Some(v) = first_text(group, |e| e.organizer.as_deref()) {
            event.organizer = Some(v);
        }
        if let Some(v) = first_end_time(group) {
            event.end_date_time = Some(v);
        }

        let mut seen = HashSet::new();
        let sources: Vec<EventSource> = group
            .iter()
            .map(|e| e.source)
            .filter(|s| seen.insert(*s))
            .collect();

        let raw_event_ids: Vec<String> = group.iter().map(|e| e.id.clone()).collect();
        let dedupe_group_id = group_id(&raw_event_ids);

        let mut last_seen = Vec::with_capacity(group.len());
        for member in group {
            match member.last_seen_at.parsed() {
                Some(dt) => last_seen.push(dt),
                None => warn!(
                    raw_id = %member.id,
                    last_seen_at = %member.last_seen_at,
                    "Unparsable last-seen timestamp; ignored for freshness"
                ),
            }
        }

        debug!(
            group_id = %dedupe_group_id,
            canonical = %canonical.id,
            members = group.len(),
            "Merged duplicate group"
        );

        Ok(MergedRecord {
            event,
            sources,
            raw_event_ids,
            dedupe_group_id,
            oldest_last_seen: last_seen.iter().min().copied(),
            newest_last_seen: last_seen.iter().max().copied(),
        })
    }

    /// How many optional fields a report fills in, weighted by usefulness
    pub fn completeness_score(&self, event: &RawEventItem) -> u32 {
        let mut score = 0;
        if has_text(event.venue_name.as_deref()) {
            score += 3;
        }
        if has_text(event.address.as_deref()) {
            score += 2;
        }
        if event
            .description
            .as_deref()
            .map_or(false, |d| d.chars().count() >= self.description_min_chars)
        {
            score += 4;
        }
        if has_text(event.source_url.as_deref()) {
            score += 2;
        }
        if has_text(event.price.as_deref()) {
            score += 1;
        }
        if has_text(event.organizer.as_deref()) {
            score += 1;
        }
        if event.end_date_time.as_ref().map_or(false, |t| t.is_present()) {
            score += 1;
        }
        score
    }

    /// Highest completeness wins; ties go to the earliest member
    fn canonical<'a>(&self, group: &[&'a RawEventItem]) -> &'a RawEventItem {
        let mut ranked = group.to_vec();
        ranked.sort_by_key(|e| Reverse(self.completeness_score(e)));
        ranked[0]
    }
}

impl Default for FieldMerger {
    fn default() -> Self {
        Self::new(&DedupConfig::default())
    }
}

/// `group-` followed by the sorted member ids joined with `-`
pub fn group_id(raw_event_ids: &[String]) -> String {
    let mut sorted: Vec<&str> = raw_event_ids.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    format!("group-{}", sorted.join("-"))
}

fn first_text<F>(group: &[&RawEventItem], field: F) -> Option<String>
where
    F: Fn(&RawEventItem) -> Option<&str>,
{
    group
        .iter()
        .filter_map(|e| field(e))
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

fn longest_text<F>(group: &[&RawEventItem], field: F) -> Option<String>
where
    F: Fn(&RawEventItem) -> Option<&str>,
{
    let mut best: Option<&str> = None;
    for value in group.iter().filter_map(|e| field(e)).filter(|v| !v.is_empty()) {
        if best.map_or(true, |b| value.chars().count() > b.chars().count()) {
            best = Some(value);
        }
    }
    best.map(str::to_string)
}

fn first_end_time(group: &[&RawEventItem]) -> Option<EventTimestamp> {
    group
        .iter()
        .filter_map(|e| e.end_date_time.as_ref())
        .find(|t| t.is_present())
        .cloned()
}
