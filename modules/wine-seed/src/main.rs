use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use wine_common::config::{DEFAULT_LINK_CONCURRENCY, DEFAULT_MONGODB_URI, DEFAULT_SOURCE};
use wine_common::{RegionCleanup, SeedConfig};
use wine_store::{audit, Pipeline, SourceBatch, WineStore};

#[derive(Parser, Debug)]
#[command(
    name = "wine-seed",
    about = "Rebuild the wine database from a JSON dump of tastings"
)]
struct Cli {
    /// JSON file holding an array of tasting records
    #[arg(long, env = "WINE_SOURCE", default_value = DEFAULT_SOURCE)]
    source: PathBuf,

    /// MongoDB connection string; the path names the database
    #[arg(long, env = "MONGODB_URI", default_value = DEFAULT_MONGODB_URI)]
    mongodb_uri: String,

    /// Database name, overriding the one in the connection string
    #[arg(long, env = "WINE_DATABASE")]
    database: Option<String>,

    /// Maximum concurrent per-taster link updates
    #[arg(long, env = "WINE_LINK_CONCURRENCY", default_value_t = DEFAULT_LINK_CONCURRENCY)]
    link_concurrency: usize,

    /// How null regions are cleaned up: full | first-element
    #[arg(long, env = "WINE_REGION_CLEANUP", default_value_t = RegionCleanup::Full)]
    region_cleanup: RegionCleanup,

    /// Also normalize regions and points on tastings without a taster
    #[arg(long, env = "WINE_NORMALIZE_UNLINKED")]
    normalize_unlinked: bool,

    /// Parse the source file and exit without touching the database
    #[arg(long)]
    check: bool,

    /// Audit the built collections after seeding
    #[arg(long)]
    verify: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn seed_config(&self) -> SeedConfig {
        SeedConfig {
            mongodb_uri: self.mongodb_uri.clone(),
            database: self.database.clone(),
            source_path: self.source.clone(),
            link_concurrency: self.link_concurrency,
            region_cleanup: self.region_cleanup,
            normalize_unlinked: self.normalize_unlinked,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    if let Err(e) = init_tracing(cli.json_logs) {
        eprintln!("Failed to initialize logging: {e:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::from(exit_status(&run(&cli).await))
}

/// Log a failed run once and map it to the process exit status.
fn exit_status(outcome: &Result<()>) -> u8 {
    match outcome {
        Ok(()) => 0,
        Err(e) => {
            error!("Seed run failed: {e:#}");
            1
        }
    }
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new("wine_seed=info,wine_store=info,wine_common=info")
    })?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

async fn run(cli: &Cli) -> Result<()> {
    let config = cli.seed_config();
    config.validate()?;
    config.log_redacted();

    // Parse before connecting so malformed input never reaches the database.
    let batch = SourceBatch::load(&config.source_path)?;
    if cli.check {
        let tasters = batch.expected_taster_counts();
        println!(
            "{}: {} tastings, {} named tasters",
            batch.path().display(),
            batch.len(),
            tasters.len()
        );
        return Ok(());
    }

    let store = WineStore::connect(&config.mongodb_uri, config.database.as_deref())
        .await
        .context("Failed to connect to MongoDB")?;

    let pipeline = Pipeline::new(store.clone(), config.clone());
    let report = pipeline.run(&batch).await.context("Seed pipeline failed")?;
    println!("{report}");

    if cli.verify {
        let audit = audit(&store, config.region_cleanup).await?.into_result()?;
        info!(tasters = audit.tasters_checked, "Verification passed");
        println!("Verified {} tasters, no violations", audit.tasters_checked);
    }

    Ok(())
}
