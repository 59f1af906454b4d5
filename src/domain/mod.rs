use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

mod timestamp;

pub use timestamp::EventTimestamp;

/// Where a raw event report was scraped from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    Facebook,
    Instagram,
    Whatsapp,
    Website,
}

impl EventSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSource::Facebook => "facebook",
            EventSource::Instagram => "instagram",
            EventSource::Whatsapp => "whatsapp",
            EventSource::Website => "website",
        }
    }

    /// Human-readable label used by listings
    pub fn display_name(&self) -> &'static str {
        match self {
            EventSource::Facebook => "Facebook",
            EventSource::Instagram => "Instagram",
            EventSource::Whatsapp => "WhatsApp",
            EventSource::Website => "Website",
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DanceType {
    Salsa,
    Bachata,
    Kizomba,
}

impl DanceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DanceType::Salsa => "Salsa",
            DanceType::Bachata => "Bachata",
            DanceType::Kizomba => "Kizomba",
        }
    }
}

impl fmt::Display for DanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DanceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "salsa" => Ok(DanceType::Salsa),
            "bachata" => Ok(DanceType::Bachata),
            "kizomba" => Ok(DanceType::Kizomba),
            other => Err(format!("unknown dance type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EventCategory {
    Social,
    Class,
    Congress,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Social => "Social",
            EventCategory::Class => "Class",
            EventCategory::Congress => "Congress",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "social" => Ok(EventCategory::Social),
            "class" => Ok(EventCategory::Class),
            "congress" => Ok(EventCategory::Congress),
            other => Err(format!("unknown event category '{}'", other)),
        }
    }
}

/// One source's report of an event, as produced by ingestion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawEventItem {
    /// Unique per source and scrape
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub dance_types: Vec<DanceType>,
    pub category: EventCategory,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub start_date_time: EventTimestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date_time: Option<EventTimestamp>,
    pub source: EventSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Freshness marker: when the scraper last saw this report
    pub last_seen_at: EventTimestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Itemized confidence contributions. `total` is the clamped overall score;
/// the individual fields keep their unclamped values for display.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceBreakdown {
    pub has_venue: i32,
    pub has_date_time: i32,
    pub has_source_url: i32,
    pub multiple_sources_bonus: i32,
    pub staleness_penalty: i32,
    pub description_penalty: i32,
    pub total: i32,
}

impl ConfidenceBreakdown {
    /// Sum of the individual contributions before clamping
    pub fn raw_sum(&self) -> i32 {
        self.has_venue
            + self.has_date_time
            + self.has_source_url
            + self.multiple_sources_bonus
            + self.staleness_penalty
            + self.description_penalty
    }
}

/// A merged, scored event standing for one duplicate group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeduplicatedEvent {
    #[serde(flatten)]
    pub event: RawEventItem,
    pub confidence_score: u8,
    pub confidence_breakdown: ConfidenceBreakdown,
    pub is_stale: bool,
    /// Distinct contributing sources in first-occurrence order
    pub sources: Vec<EventSource>,
    pub raw_event_ids: Vec<String>,
    pub dedupe_group_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oldest_last_seen: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newest_last_seen: Option<DateTime<Utc>>,
}

/// Result of comparing two raw events. Computed on demand, never stored.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityMatch {
    pub title_similarity: f64,
    pub venue_similarity: f64,
    pub is_duplicate: bool,
}

impl SimilarityMatch {
    /// The verdict for pairs that fail the city or time-window gate
    pub fn gated() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_event_reads_camel_case_json() {
        let value = json!({
            "id": "fb-1",
            "title": "Salsa Party Friday",
            "danceTypes": ["Salsa"],
            "category": "Social",
            "city": "Stockholm",
            "venueName": "Club Havana",
            "startDateTime": "2025-03-14T20:00:00Z",
            "source": "facebook",
            "lastSeenAt": "2025-03-10T08:00:00Z"
        });

        let event: RawEventItem = serde_json::from_value(value).unwrap();
        assert_eq!(event.source, EventSource::Facebook);
        assert_eq!(event.venue_name.as_deref(), Some("Club Havana"));
        assert!(event.start_date_time.parsed().is_some());
        assert!(event.description.is_none());
    }

    #[test]
    fn unparsable_timestamp_is_kept_not_rejected() {
        let value = json!({
            "id": "ws-9",
            "title": "Kizomba Social",
            "category": "Social",
            "city": "Malmö",
            "startDateTime": "next friday-ish",
            "source": "website",
            "lastSeenAt": "2025-03-10T08:00:00Z"
        });

        let event: RawEventItem = serde_json::from_value(value).unwrap();
        assert!(event.start_date_time.parsed().is_none());
        assert_eq!(event.start_date_time.raw(), "next friday-ish");

        let back = serde_json::to_value(&event).unwrap();
        assert_eq!(back["startDateTime"], "next friday-ish");
    }

    #[test]
    fn breakdown_raw_sum_ignores_total() {
        let breakdown = ConfidenceBreakdown {
            has_venue: 25,
            has_date_time: 15,
            description_penalty: -15,
            total: 99,
            ..Default::default()
        };
        assert_eq!(breakdown.raw_sum(), 25);
    }

    #[test]
    fn filter_values_parse_case_insensitively() {
        assert_eq!("bachata".parse::<DanceType>(), Ok(DanceType::Bachata));
        assert_eq!(" Congress ".parse::<EventCategory>(), Ok(EventCategory::Congress));
        assert!("tango".parse::<DanceType>().is_err());
    }
}
