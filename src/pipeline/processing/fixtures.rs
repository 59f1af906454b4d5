use crate::domain::{EventCategory, EventSource, EventTimestamp, RawEventItem};

/// A bare Stockholm report from Facebook with only the required fields filled
pub(crate) fn raw_event(id: &str, title: &str, start: &str) -> RawEventItem {
    RawEventItem {
        id: id.to_string(),
        title: title.to_string(),
        dance_types: vec![],
        category: EventCategory::Social,
        city: "Stockholm".to_string(),
        venue_name: None,
        address: None,
        start_date_time: EventTimestamp::new(start),
        end_date_time: None,
        source: EventSource::Facebook,
        source_url: None,
        last_seen_at: EventTimestamp::new("2025-03-10T08:00:00Z"),
        price: None,
        organizer: None,
        description: None,
    }
}

pub(crate) fn from_source(id: &str, title: &str, start: &str, source: EventSource) -> RawEventItem {
    RawEventItem {
        source,
        ..raw_event(id, title, start)
    }
}
