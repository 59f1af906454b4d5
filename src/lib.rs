//! Deduplication engine for dance event listings scraped from several sources.
//!
//! Raw reports are clustered into duplicate groups, each group is merged into one
//! canonical record, and the record gets an explainable confidence score.

pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod logging;
pub mod observability;
pub mod pipeline;
pub mod query;

pub use config::{Config, DedupConfig};
pub use domain::{
    ConfidenceBreakdown, DanceType, DeduplicatedEvent, EventCategory, EventSource, EventTimestamp,
    RawEventItem, SimilarityMatch,
};
pub use error::{DedupError, Result};
pub use pipeline::processing::ClusterStrategy;
pub use pipeline::{DedupPipeline, DedupReport, DedupStats};
