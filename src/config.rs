use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants;
use crate::error::{DedupError, Result};
use crate::pipeline::processing::cluster::ClusterStrategy;

/// Environment variable naming the TOML file to load
pub const CONFIG_PATH_ENV: &str = "EVENT_DEDUP_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dedup: DedupConfig,
}

/// Thresholds and vocabulary for one deduplication engine.
///
/// Every stage receives this by reference; nothing reads module-level globals,
/// so tests can tighten or loosen a single knob without touching the rest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DedupConfig {
    /// Maximum start-time distance for two reports to be compared at all
    pub time_window_hours: i64,
    pub title_similarity_threshold: f64,
    pub venue_similarity_threshold: f64,
    pub staleness_days: i64,
    pub description_min_chars: usize,
    /// Listing cut-off; does not influence scoring
    pub low_confidence_threshold: u8,
    pub stop_words: Vec<String>,
    pub strategy: ClusterStrategy,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            time_window_hours: constants::TIME_WINDOW_HOURS,
            title_similarity_threshold: constants::TITLE_SIMILARITY_THRESHOLD,
            venue_similarity_threshold: constants::VENUE_SIMILARITY_THRESHOLD,
            staleness_days: constants::STALENESS_DAYS,
            description_min_chars: constants::DESCRIPTION_MIN_CHARS,
            low_confidence_threshold: constants::LOW_CONFIDENCE_THRESHOLD,
            stop_words: constants::default_stop_words(),
            strategy: ClusterStrategy::default(),
        }
    }
}

impl DedupConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0..=constants::MAX_TIME_WINDOW_HOURS).contains(&self.time_window_hours) {
            return Err(DedupError::Config(format!(
                "time_window_hours must be within [0, {}] (got {})",
                constants::MAX_TIME_WINDOW_HOURS,
                self.time_window_hours
            )));
        }
        for (name, value) in [
            ("title_similarity_threshold", self.title_similarity_threshold),
            ("venue_similarity_threshold", self.venue_similarity_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DedupError::Config(format!(
                    "{} must be within [0, 1] (got {})",
                    name, value
                )));
            }
        }
        if self.staleness_days < 0 {
            return Err(DedupError::Config(format!(
                "staleness_days must not be negative (got {})",
                self.staleness_days
            )));
        }
        if self.low_confidence_threshold > 100 {
            return Err(DedupError::Config(format!(
                "low_confidence_threshold must be within [0, 100] (got {})",
                self.low_confidence_threshold
            )));
        }
        Ok(())
    }

    /// Saturates instead of overflowing for configs that skipped `validate`
    pub fn time_window_millis(&self) -> i64 {
        self.time_window_hours.saturating_mul(60 * 60 * 1000)
    }
}

impl Config {
    /// Load and validate a TOML file with a `[dedup]` table
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            DedupError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&content)?;
        config.dedup.validate()?;
        Ok(config)
    }

    /// Resolve the config file from `EVENT_DEDUP_CONFIG`, falling back to defaults
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::load(path.trim()),
            _ => Ok(Self::default()),
        }
    }
}
