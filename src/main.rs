use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use event_dedup::config::Config;
use event_dedup::domain::{DanceType, EventCategory, RawEventItem};
use event_dedup::logging;
use event_dedup::pipeline::DedupPipeline;
use event_dedup::query::{self, EventFilter};
use event_dedup::ClusterStrategy;

#[derive(Parser)]
#[command(name = "event-dedup")]
#[command(about = "Deduplicate, merge and score dance event listings from several sources")]
#[command(version = "0.1.0")]
struct Cli {
    /// TOML config with a [dedup] table (defaults to $EVENT_DEDUP_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deduplicate a JSON array of raw events and emit the report
    Run {
        #[arg(long)]
        input: PathBuf,
        /// Write the report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Override the configured clustering strategy (anchor or transitive)
        #[arg(long)]
        strategy: Option<ClusterStrategy>,
        /// Evaluate staleness at this RFC 3339 instant instead of the current time
        #[arg(long)]
        now: Option<String>,
        /// Print Prometheus metrics to stderr after the run
        #[arg(long)]
        metrics: bool,
    },
    /// Show the duplicate verdict for two raw events of a batch
    Compare {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        left: String,
        #[arg(long)]
        right: String,
    },
    /// Deduplicate, then filter, search and list events by start time
    List {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        dance_type: Option<DanceType>,
        #[arg(long)]
        category: Option<EventCategory>,
        #[arg(long)]
        show_low_confidence: bool,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        now: Option<String>,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::from_env().context("Failed to load config from environment")?,
    };

    match cli.command {
        Commands::Run {
            input,
            output,
            strategy,
            now,
            metrics,
        } => {
            let handle = if metrics {
                Some(
                    metrics_exporter_prometheus::PrometheusBuilder::new()
                        .install_recorder()
                        .context("Failed to install Prometheus recorder")?,
                )
            } else {
                None
            };

            let mut dedup = config.dedup;
            if let Some(strategy) = strategy {
                dedup.strategy = strategy;
            }
            let pipeline = DedupPipeline::new(dedup)?;
            let events = read_events(&input)?;
            let now = parse_now(now.as_deref())?;

            let span = tracing::info_span!("run", input = %input.display());
            let _enter = span.enter();
            let report = pipeline.run_at(&events, now)?;
            let json = serde_json::to_string_pretty(&report)?;

            match output {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("Failed to write report to {}", path.display()))?;
                    info!(output = %path.display(), "Report written");
                    eprintln!("\n📊 Deduplication Results:");
                    eprintln!("   Strategy: {}", report.stats.strategy);
                    eprintln!("   Raw events: {}", report.stats.input_events);
                    eprintln!("   Groups: {}", report.stats.groups);
                    eprintln!("   Merged away: {}", report.stats.merged_away);
                    eprintln!("   Stale: {}", report.stats.stale_events);
                    eprintln!("   Low confidence: {}", report.stats.low_confidence_events);
                    eprintln!("   Output file: {}", path.display());
                }
                None => println!("{}", json),
            }

            if let Some(handle) = handle {
                eprintln!("{}", handle.render());
            }
        }
        Commands::Compare { input, left, right } => {
            let pipeline = DedupPipeline::new(config.dedup)?;
            let events = read_events(&input)?;
            let a = find_event(&events, &left)?;
            let b = find_event(&events, &right)?;

            let verdict = pipeline.compare(a, b);
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        }
        Commands::List {
            input,
            city,
            dance_type,
            category,
            show_low_confidence,
            search,
            now,
        } => {
            let threshold = config.dedup.low_confidence_threshold;
            let pipeline = DedupPipeline::new(config.dedup)?;
            let events = read_events(&input)?;
            let report = pipeline.run_at(&events, parse_now(now.as_deref())?)?;

            let filter = EventFilter {
                city,
                dance_type,
                category,
                show_low_confidence,
            };
            let filtered = query::filter_events(&report.events, &filter, threshold);
            let mut listed = query::search_events(filtered, search.as_deref().unwrap_or(""));
            query::sort_by_start(&mut listed);

            for event in &listed {
                let stale = if event.is_stale { " ⚠️ stale" } else { "" };
                println!(
                    "{}  {:<40} {:<20} {:>3}  [{}]{}",
                    event.event.start_date_time,
                    event.event.title,
                    event.event.venue_name.as_deref().unwrap_or("-"),
                    event.confidence_score,
                    event
                        .sources
                        .iter()
                        .map(|s| s.display_name())
                        .collect::<Vec<_>>()
                        .join(", "),
                    stale
                );
            }
            eprintln!("\n✅ {} of {} events listed", listed.len(), report.events.len());
        }
    }

    Ok(())
}

fn read_events(path: &Path) -> Result<Vec<RawEventItem>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input batch {}", path.display()))?;
    let events: Vec<RawEventItem> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse input batch {}", path.display()))?;
    info!(count = events.len(), "Loaded raw events");
    Ok(events)
}

fn find_event<'a>(events: &'a [RawEventItem], id: &str) -> Result<&'a RawEventItem> {
    events
        .iter()
        .find(|e| e.id == id)
        .ok_or_else(|| anyhow!("No raw event with id '{}' in the batch", id))
}

fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(value) => Ok(DateTime::parse_from_rfc3339(value)
            .with_context(|| format!("Invalid --now timestamp '{}'", value))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}
