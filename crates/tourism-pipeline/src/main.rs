//! Tourism Pipeline CLI
//!
//! Seeds the store, trains models, refreshes forecasts and exports history.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tourism_domain::{Clock, SystemClock};
use tourism_forecast::ForecastConfig;
use tourism_persistence::DuckDbStore;
use tourism_pipeline::{DAILY_HORIZON_DAYS, GeneratorConfig, Pipeline, SyntheticGenerator};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tourism-pipeline")]
#[command(about = "Batch jobs for the tourism analytics store")]
struct Args {
    /// DuckDB database file
    #[arg(long, env = "DATABASE_PATH", default_value = "data/tourism.duckdb")]
    database: PathBuf,

    /// Directory for model snapshots
    #[arg(long, env = "MODEL_DIR", default_value = "data/models")]
    model_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate synthetic records ending yesterday
    Seed {
        /// Number of days to generate
        #[arg(long, default_value_t = 365)]
        days: u32,

        /// Relative noise on arrival counts (0 for none)
        #[arg(long, default_value_t = 0.0)]
        noise: f64,

        /// RNG seed for reproducible noise
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Regenerate forecasts for every island
    Daily {
        /// Forecast horizon in days
        #[arg(long, default_value_t = DAILY_HORIZON_DAYS)]
        horizon: usize,
    },

    /// Train forecast models on the full history
    Train,

    /// Export forecast history to Parquet
    Export {
        /// Output file
        #[arg(short, long, default_value = "forecasts.parquet")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("tourism_pipeline=info".parse()?),
        )
        .init();

    let args = Args::parse();

    if let Some(parent) = args.database.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let store = Arc::new(
        DuckDbStore::open(&args.database)
            .with_context(|| format!("opening {}", args.database.display()))?,
    );
    info!(database = %args.database.display(), "Opened store");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let config = ForecastConfig {
        model_dir: Some(args.model_dir.clone()),
        ..ForecastConfig::default()
    };
    let pipeline = Pipeline::new(store, Arc::clone(&clock), config);

    match args.command {
        Command::Seed { days, noise, seed } => {
            let config = GeneratorConfig {
                end: clock.today(),
                days,
                noise,
            };
            let dataset = SyntheticGenerator::seeded(config, seed).generate();
            let report = pipeline.seed(&dataset).await?;
            info!(
                "Seeded {} arrivals, {} occupancy and {} indicator rows",
                report.arrivals, report.occupancy, report.indicators
            );
        }
        Command::Daily { horizon } => {
            let produced = pipeline.run_daily(horizon).await?;
            let total: usize = produced.iter().map(|(_, days)| days).sum();
            info!("Wrote {} forecast days across {} islands", total, produced.len());
        }
        Command::Train => {
            let trained = pipeline.train().await;
            info!("Trained {} models: {}", trained.len(), trained.join(", "));
        }
        Command::Export { output } => {
            let path = pipeline.export(output).await?;
            info!("Forecast history written to {}", path.display());
        }
    }

    Ok(())
}
