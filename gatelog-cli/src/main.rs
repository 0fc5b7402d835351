// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  gatelog — API gateway access-log pipeline
//
//  Write path: NDJSON file → batch ingestor → partitioned store
//  Read path:  store → paginated cursor → CSV export / metrics
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::{Parser, Subcommand};
use gatelog_core::config::PipelineConfig;
use gatelog_core::error::GatelogError;
use gatelog_pipeline::export::ExportService;
use gatelog_pipeline::ingest::BatchIngestor;
use gatelog_store::driver::LogStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "gatelog", version, about = "API gateway access-log ingestion and CSV export")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "/etc/gatelog/gatelog.yaml")]
    config: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a newline-delimited JSON access-log file into the store
    Ingest { path: String },
    /// Export all records for one service id
    ExportService { service: String },
    /// Export all records for one consumer id
    ExportConsumer { consumer: String },
    /// Export latency averages for one service id
    ExportMetrics { service: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .init();

    if let Err(e) = run(cli).await {
        error!(error = %e, "Command failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = if cli.config.exists() {
        PipelineConfig::load(&cli.config)?
    } else {
        PipelineConfig::default()
    };

    match cli.command {
        Command::Ingest { path } => {
            let path = require_arg(path, "path")?;
            let store = connect_store(&config).await?;
            BatchIngestor::new(store, config.ingest)
                .parse(Path::new(&path))
                .await?;
        }
        Command::ExportService { service } => {
            let service = require_arg(service, "service")?;
            let store = connect_store(&config).await?;
            ExportService::new(store, config.export)
                .export_by_service(&service)
                .await?;
        }
        Command::ExportConsumer { consumer } => {
            let consumer = require_arg(consumer, "consumer")?;
            let store = connect_store(&config).await?;
            ExportService::new(store, config.export)
                .export_by_consumer(&consumer)
                .await?;
        }
        Command::ExportMetrics { service } => {
            let service = require_arg(service, "service")?;
            let store = connect_store(&config).await?;
            ExportService::new(store, config.export)
                .export_metrics_by_service(&service)
                .await?;
        }
    }

    Ok(())
}

/// Reject empty positional arguments before any store connection is made.
fn require_arg(value: String, name: &'static str) -> Result<String, GatelogError> {
    if value.is_empty() {
        return Err(GatelogError::EmptyArgument(name));
    }
    Ok(value)
}

#[cfg(feature = "dynamodb")]
async fn connect_store(config: &PipelineConfig) -> anyhow::Result<Arc<dyn LogStore>> {
    let store = gatelog_store::dynamodb::DynamoStore::connect(&config.store).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "dynamodb"))]
async fn connect_store(_config: &PipelineConfig) -> anyhow::Result<Arc<dyn LogStore>> {
    anyhow::bail!("built without a store driver; enable the `dynamodb` feature")
}
