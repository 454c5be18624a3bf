//! CLI entry point for the taxi insights pipeline.
//!
//! Provides subcommands for enriching raw GPS/taxi CSVs through the inference
//! oracle, recomputing aggregate metrics over the stored corpus, and querying
//! enriched records by label.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::path::Path;
use taxi_insights::{
    batch::{BatchProgress, enrich_gps_in_batches, enrich_trips_in_batches},
    config::Config,
    enrich::EnrichmentEngine,
    loader::{load_gps_points, load_trip_records},
    metrics::compute_aggregates,
    oracle::OpenAiOracle,
    store::CsvStore,
};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "taxi_insights")]
#[command(about = "Enrich taxi fleet data with classification labels and aggregate metrics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum RecordKind {
    Gps,
    Trips,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich raw CSVs through the oracle, persist them, and aggregate
    Process {
        /// Raw GPS points CSV
        #[arg(long)]
        gps: Option<String>,

        /// Raw taxi trips CSV
        #[arg(long)]
        trips: Option<String>,

        /// Directory holding the enriched corpus and metrics
        #[arg(short, long, default_value = "data")]
        data_dir: String,

        /// Records per batch (overrides BATCH_SIZE from the environment)
        #[arg(short, long)]
        batch_size: Option<usize>,
    },
    /// Recompute aggregate metrics from the stored corpus
    Aggregate {
        /// Directory holding the enriched corpus and metrics
        #[arg(short, long, default_value = "data")]
        data_dir: String,
    },
    /// Query enriched records by classification label
    Query {
        /// Which corpus to read
        #[arg(value_enum)]
        kind: RecordKind,

        /// Label to filter on (area for GPS, trip length for trips)
        #[arg(short, long)]
        label: Option<String>,

        /// Maximum rows to print
        #[arg(long, default_value_t = 1000)]
        limit: usize,

        /// Directory holding the enriched corpus and metrics
        #[arg(short, long, default_value = "data")]
        data_dir: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/taxi_insights.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("taxi_insights.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            gps,
            trips,
            data_dir,
            batch_size,
        } => {
            process(gps.as_deref(), trips.as_deref(), &data_dir, batch_size).await?;
        }
        Commands::Aggregate { data_dir } => {
            let store = CsvStore::open(&data_dir)?;
            let metrics = compute_aggregates(&store)?;
            let saved = store.save_metrics(&metrics)?;
            info!(saved, "Aggregate metrics recomputed");
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
        Commands::Query {
            kind,
            label,
            limit,
            data_dir,
        } => {
            let store = CsvStore::open(&data_dir)?;
            match kind {
                RecordKind::Gps => {
                    let mut rows = store.load_gps(label.as_deref())?;
                    rows.truncate(limit);
                    info!(rows = rows.len(), "GPS query complete");
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                }
                RecordKind::Trips => {
                    let mut rows = store.load_trips(label.as_deref())?;
                    rows.truncate(limit);
                    info!(rows = rows.len(), "Trip query complete");
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                }
            }
        }
    }

    Ok(())
}

/// Runs the full pipeline: load raw CSVs, enrich in sequential batches,
/// persist the enriched records, then recompute and persist metrics.
#[tracing::instrument(skip(gps_path, trips_path, batch_size), fields(data_dir))]
async fn process(
    gps_path: Option<&str>,
    trips_path: Option<&str>,
    data_dir: &str,
    batch_size: Option<usize>,
) -> Result<()> {
    let config = Config::from_env()?;
    let batch_size = batch_size.unwrap_or(config.batch_size);

    let oracle = OpenAiOracle::new(&config)?;
    let engine = EnrichmentEngine::new(oracle);
    let store = CsvStore::open(data_dir)?;

    if let Some(path) = gps_path {
        let records = load_gps_points(path)?;
        let mut progress = BatchProgress::for_records(records.len(), batch_size);
        info!(
            records = records.len(),
            batches = progress.total,
            batch_size,
            "Enriching GPS points"
        );

        let enriched = enrich_gps_in_batches(&engine, &records, batch_size, &mut progress).await;
        let saved = store.save_gps(&enriched)?;
        info!(saved, "GPS points persisted");
    }

    if let Some(path) = trips_path {
        let records = load_trip_records(path)?;
        let mut progress = BatchProgress::for_records(records.len(), batch_size);
        info!(
            records = records.len(),
            batches = progress.total,
            batch_size,
            "Enriching taxi trips"
        );

        let enriched = enrich_trips_in_batches(&engine, &records, batch_size, &mut progress).await;
        let saved = store.save_trips(&enriched)?;
        info!(saved, "Taxi trips persisted");
    }

    let metrics = compute_aggregates(&store)?;
    let saved = store.save_metrics(&metrics)?;
    info!(saved, "Aggregate metrics persisted");
    println!("{}", serde_json::to_string_pretty(&metrics)?);

    Ok(())
}
