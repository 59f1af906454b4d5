//! Default thresholds used when no configuration file overrides them.
//! `DedupConfig::default()` is built from these; nothing else should read them directly.

/// Start times further apart than this never describe the same event
pub const TIME_WINDOW_HOURS: i64 = 2;

/// Upper bound accepted for a configured time window (one year)
pub const MAX_TIME_WINDOW_HOURS: i64 = 24 * 365;

/// Title Jaccard similarity must be strictly above this to merge on title alone
pub const TITLE_SIMILARITY_THRESHOLD: f64 = 0.6;

/// Venue Levenshtein similarity must be strictly above this to merge on venue alone
pub const VENUE_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Days without a sighting before an event counts as stale
pub const STALENESS_DAYS: i64 = 10;

/// Descriptions shorter than this (trimmed) count as thin
pub const DESCRIPTION_MIN_CHARS: usize = 30;

/// Scores below this are hidden by listings unless low-confidence is requested
pub const LOW_CONFIDENCE_THRESHOLD: u8 = 50;

// Generic dance/event vocabulary plus function words; these carry no identity.
pub const STOP_WORDS: &[&str] = &[
    "party", "social", "dance", "dancing", "night", "event", "workshop", "class", "lesson",
    "congress", "festival", "the", "a", "an", "and", "or", "at", "in", "on", "with",
];

pub fn default_stop_words() -> Vec<String> {
    STOP_WORDS.iter().map(|w| w.to_string()).collect()
}
