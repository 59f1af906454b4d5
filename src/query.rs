//! Read-side helpers for consumers of deduplicated output: exact-match filters,
//! free-text search and chronological ordering. Nothing here mutates events.

use serde::{Deserialize, Serialize};

use crate::domain::{DanceType, DeduplicatedEvent, EventCategory};

/// AND-combined listing filter; `None` means "all"
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventFilter {
    pub city: Option<String>,
    pub dance_type: Option<DanceType>,
    pub category: Option<EventCategory>,
    pub show_low_confidence: bool,
}

impl EventFilter {
    pub fn matches(&self, event: &DeduplicatedEvent, low_confidence_threshold: u8) -> bool {
        if let Some(city) = &self.city {
            if event.event.city != *city {
                return false;
            }
        }
        if let Some(dance_type) = self.dance_type {
            if !event.event.dance_types.contains(&dance_type) {
                return false;
            }
        }
        if let Some(category) = self.category {
            if event.event.category != category {
                return false;
            }
        }
        if !self.show_low_confidence && event.confidence_score < low_confidence_threshold {
            return false;
        }
        true
    }
}

pub fn filter_events<'a>(
    events: &'a [DeduplicatedEvent],
    filter: &EventFilter,
    low_confidence_threshold: u8,
) -> Vec<&'a DeduplicatedEvent> {
    events
        .iter()
        .filter(|e| filter.matches(e, low_confidence_threshold))
        .collect()
}

/// Case-insensitive substring search over title, venue, city, organizer,
/// description, dance types and category. A blank query matches everything.
pub fn search_events<'a, I>(events: I, query: &str) -> Vec<&'a DeduplicatedEvent>
where
    I: IntoIterator<Item = &'a DeduplicatedEvent>,
{
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return events.into_iter().collect();
    }

    events
        .into_iter()
        .filter(|e| matches_query(e, &needle))
        .collect()
}

fn matches_query(event: &DeduplicatedEvent, needle: &str) -> bool {
    let raw = &event.event;
    let contains = |text: &str| text.to_lowercase().contains(needle);

    contains(raw.title.as_str())
        || raw.venue_name.as_deref().map_or(false, contains)
        || contains(raw.city.as_str())
        || raw.organizer.as_deref().map_or(false, contains)
        || raw.description.as_deref().map_or(false, contains)
        || raw.dance_types.iter().any(|d| contains(d.as_str()))
        || contains(raw.category.as_str())
}

/// Earliest start first; stable, with unparsable starts last
pub fn sort_by_start(events: &mut [&DeduplicatedEvent]) {
    events.sort_by(|a, b| {
        a.event
            .start_date_time
            .cmp_chronological(&b.event.start_date_time)
    });
}

pub fn filter_and_sort<'a>(
    events: &'a [DeduplicatedEvent],
    filter: &EventFilter,
    low_confidence_threshold: u8,
) -> Vec<&'a DeduplicatedEvent> {
    let mut filtered = filter_events(events, filter, low_confidence_threshold);
    sort_by_start(&mut filtered);
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConfidenceBreakdown, EventSource};
    use crate::pipeline::processing::fixtures::raw_event;

    fn deduplicated(id: &str, title: &str, start: &str, score: u8) -> DeduplicatedEvent {
        let mut event = raw_event(id, title, start);
        event.dance_types = vec![DanceType::Salsa];
        DeduplicatedEvent {
            event,
            confidence_score: score,
            confidence_breakdown: ConfidenceBreakdown {
                total: score as i32,
                ..Default::default()
            },
            is_stale: false,
            sources: vec![EventSource::Facebook],
            raw_event_ids: vec![id.to_string()],
            dedupe_group_id: format!("group-{}", id),
            oldest_last_seen: None,
            newest_last_seen: None,
        }
    }

    #[test]
    fn filters_combine_with_and() {
        let mut gothenburg = deduplicated("b", "Bachata Night", "2025-03-15T20:00:00Z", 80);
        gothenburg.event.city = "Gothenburg".to_string();
        gothenburg.event.dance_types = vec![DanceType::Bachata];
        let events = vec![
            deduplicated("a", "Salsa Friday", "2025-03-14T20:00:00Z", 80),
            gothenburg,
            deduplicated("c", "Salsa Low", "2025-03-14T21:00:00Z", 10),
        ];

        let filter = EventFilter {
            city: Some("Stockholm".to_string()),
            dance_type: Some(DanceType::Salsa),
            ..Default::default()
        };
        let ids: Vec<_> = filter_events(&events, &filter, 50).iter().map(|e| e.event.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);

        let everything = EventFilter {
            show_low_confidence: true,
            ..Default::default()
        };
        assert_eq!(filter_events(&events, &everything, 50).len(), 3);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let mut with_venue = deduplicated("a", "Friday Social", "2025-03-14T20:00:00Z", 80);
        with_venue.event.venue_name = Some("Club Havana".to_string());
        let events = vec![with_venue, deduplicated("b", "Kizomba Flow", "2025-03-14T20:00:00Z", 80)];

        assert_eq!(search_events(&events, "HAVANA").len(), 1);
        assert_eq!(search_events(&events, "salsa").len(), 2);
        assert_eq!(search_events(&events, "stockholm").len(), 2);
        assert_eq!(search_events(&events, "social").len(), 2);
        assert_eq!(search_events(&events, "   ").len(), 2);
        assert!(search_events(&events, "tango").is_empty());
    }

    #[test]
    fn sort_puts_unparsable_last() {
        let events = vec![
            deduplicated("late", "Salsa", "2025-03-15T20:00:00Z", 80),
            deduplicated("bad", "Salsa", "someday", 80),
            deduplicated("early", "Salsa", "2025-03-14T20:00:00Z", 80),
        ];

        let sorted = filter_and_sort(&events, &EventFilter::default(), 50);
        let ids: Vec<_> = sorted.iter().map(|e| e.event.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late", "bad"]);
    }
}
