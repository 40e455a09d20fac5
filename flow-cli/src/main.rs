//! flow - similarity-driven playlist sequencing
//!
//! Reads a JSON item list, optionally enriches it from remote catalogs,
//! orders it with the chosen strategy and writes the result.
//!
//! Settings resolve in this order: command-line flags, environment
//! variables, config file, compiled defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use flow_common::config::{ConfigResolver, FailurePolicy, SequencingConfig, TomlConfig};
use flow_en::{enrich_collection, CatalogEnricher};
use flow_sq::{MoodBandConfig, SequenceOptions, Sequencer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

mod io;

use io::OutputFormat;

/// Command-line arguments for flow
#[derive(Parser, Debug)]
#[command(name = "flow")]
#[command(about = "Order a music collection so that neighbouring tracks flow into each other")]
#[command(version)]
struct Args {
    /// JSON item list (array or {"items": [...]}); stdin when absent or "-"
    input: Option<PathBuf>,

    /// Sequencing strategy: tag-overlap, embedding or mood
    #[arg(short, long, env = "FLOW_STRATEGY")]
    strategy: Option<String>,

    /// Keep tracks by the same primary author apart
    #[arg(long)]
    separate_authors: bool,

    /// Allow same-author neighbours even when the config file separates them
    #[arg(long, conflicts_with = "separate_authors")]
    no_separate_authors: bool,

    /// Skip the coarse valence pass of the mood strategy
    #[arg(long)]
    no_coarse_banding: bool,

    /// Maximum items per coarse mood band
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Maximum valence spread of a fine mood band
    #[arg(long)]
    band_width: Option<f64>,

    /// Sequence with the attributes already present in the input
    #[arg(long)]
    skip_enrichment: bool,

    /// On enrichment failure: abort, or treat the attribute as empty
    #[arg(long, value_name = "POLICY")]
    on_enrichment_error: Option<FailurePolicy>,

    /// Output file; stdout when absent or "-"
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Config file (overrides FLOW_CONFIG and the default location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (overrides the config file)
    #[arg(long, env = "FLOW_LOG")]
    log_level: Option<String>,
}

impl Args {
    /// Merge flags over configured sequencing defaults
    fn sequence_options(&self, defaults: &SequencingConfig) -> SequenceOptions {
        SequenceOptions {
            strategy: self
                .strategy
                .clone()
                .unwrap_or_else(|| defaults.strategy.clone()),
            separate_authors: !self.no_separate_authors
                && (self.separate_authors || defaults.separate_authors),
            mood: MoodBandConfig {
                coarse_banding: defaults.coarse_banding && !self.no_coarse_banding,
                chunk_size: self.chunk_size.unwrap_or(defaults.chunk_size),
                band_width: self.band_width.unwrap_or(defaults.band_width),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing; the filter is swapped once the config file is read
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let initial = env_filter
        .unwrap_or_else(|| EnvFilter::new(args.log_level.as_deref().unwrap_or("info")));
    let (filter, filter_handle) = reload::Layer::new(initial);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = TomlConfig::load_or_default(&ConfigResolver::new(args.config.clone()));
    if !from_env && args.log_level.is_none() {
        if let Err(e) = filter_handle.reload(EnvFilter::new(&config.logging.level)) {
            warn!("Cannot apply configured log level {}: {}", config.logging.level, e);
        }
    }

    let options = args.sequence_options(&config.sequencing);
    let sequencer = Sequencer::from_key(&options.strategy, options.mood)
        .context("Invalid sequencing options")?;

    let mut items = io::read_items(args.input.as_deref()).context("Failed to read items")?;
    info!(
        items = items.len(),
        strategy = %sequencer.kind(),
        separate_authors = options.separate_authors,
        "Loaded collection"
    );

    if args.skip_enrichment {
        info!("Enrichment skipped, using attributes from input");
    } else {
        let enricher = CatalogEnricher::from_config(&config.enrichment)
            .context("Failed to initialize catalog clients")?;
        let policy = args.on_enrichment_error.unwrap_or(config.enrichment.on_failure);
        let total = items.len();

        let summary = enrich_collection(&sequencer, &enricher, &mut items, policy, |index, text| {
            info!(item = index + 1, total, "{}", text);
        })
        .await
        .context("Enrichment failed")?;

        if !summary.is_clean() {
            warn!(
                failures = summary.failures.len(),
                "Some attributes could not be retrieved and were treated as empty"
            );
        }
    }

    let ordered = sequencer
        .sequence(items, options.separate_authors)
        .context("Sequencing failed")?;

    let rendered = io::render(&ordered, args.format, &sequencer)?;
    io::write_output(args.output.as_deref(), &rendered).context("Failed to write output")?;

    info!(items = ordered.len(), "Sequence written");
    Ok(())
}
