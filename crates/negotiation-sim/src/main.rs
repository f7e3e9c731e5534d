use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use negotiation_sim::{run_batch, CliOverrides, SimConfig};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed of the first run
    #[arg(long)]
    seed: Option<u64>,

    /// Round cap per run
    #[arg(long)]
    rounds: Option<u32>,

    /// Number of runs, seeded seed..seed+runs
    #[arg(long)]
    runs: Option<u32>,

    /// Comma-separated agent names
    #[arg(long, value_delimiter = ',')]
    agents: Option<Vec<String>>,

    /// Print the full reports as JSON
    #[arg(long)]
    json: bool,

    /// Write the ledger checkpoint of the first run here
    #[arg(long)]
    checkpoint: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = SimConfig::load(args.config.as_deref())?;
    config.apply_env()?;
    CliOverrides {
        seed: args.seed,
        max_rounds: args.rounds,
        runs: args.runs,
        agents: args.agents.clone(),
    }
    .apply(&mut config);
    config.validate().context("Invalid simulation config")?;

    info!(
        agents = config.agents.len(),
        items = config.catalog.len(),
        seed = config.seed,
        runs = config.runs,
        max_rounds = config.max_rounds,
        policy = %config.repetition_policy,
        "Negotiation simulation starting"
    );

    let outcomes = run_batch(&config).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        for outcome in &outcomes {
            println!("seed {}: {}", outcome.seed, outcome.report.status_line());
            for session in outcome.ledger.sessions() {
                println!("  {}", session.status_line());
            }
        }
    }

    if let (Some(path), Some(first)) = (&args.checkpoint, outcomes.first()) {
        first
            .ledger
            .save(path)
            .context(format!("Failed to write checkpoint {}", path.display()))?;
        info!(path = %path.display(), seed = first.seed, "Ledger checkpoint written");
    }

    Ok(())
}
