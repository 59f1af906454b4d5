use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// A timestamp as reported by a source, kept verbatim alongside its parsed form.
///
/// Sources disagree on formats and sometimes send garbage. An unparsable value is
/// not an error: `parsed()` returns `None` and every date comparison treats the
/// value as failing its predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTimestamp {
    raw: String,
    parsed: Option<DateTime<Utc>>,
}

impl EventTimestamp {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let parsed = parse_timestamp(&raw);
        Self { raw, parsed }
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self {
            raw: dt.to_rfc3339(),
            parsed: Some(dt),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn parsed(&self) -> Option<DateTime<Utc>> {
        self.parsed
    }

    /// Present means a non-blank raw value, whether or not it parses
    pub fn is_present(&self) -> bool {
        !self.raw.trim().is_empty()
    }

    /// Absolute distance in milliseconds; `None` if either side failed to parse
    pub fn abs_diff_millis(&self, other: &EventTimestamp) -> Option<i64> {
        match (self.parsed, other.parsed) {
            (Some(a), Some(b)) => Some((a - b).num_milliseconds().abs()),
            _ => None,
        }
    }

    /// Chronological order with unparsable values after every parsable one
    pub fn cmp_chronological(&self, other: &EventTimestamp) -> Ordering {
        match (self.parsed, other.parsed) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl fmt::Display for EventTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<DateTime<Utc>> for EventTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

impl Serialize for EventTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for EventTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(EventTimestamp::new(raw))
    }
}

/// RFC 3339 first, then offset-less ISO-ish forms read as UTC
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
