//! Batch runner: one simulation per seed, each on tokio's blocking pool.

use anyhow::{Context, Result};
use negotiation::{Ledger, SeededSelector, Simulation, SimulationReport};
use serde::Serialize;
use tracing::info;

use crate::config::SimConfig;

/// Result of one seeded run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub seed: u64,
    pub report: SimulationReport,
    #[serde(skip)]
    pub ledger: Ledger,
}

/// Run a single simulation synchronously.
pub fn run_once(config: &SimConfig, seed: u64) -> Result<RunOutcome> {
    let mut sim = Simulation::new(
        config.agents.iter().cloned(),
        config.catalog_items(),
        config.repetition_policy,
        SeededSelector::new(seed),
    );
    let report = sim
        .run(config.max_rounds)
        .context(format!("Simulation with seed {seed} failed"))?;
    Ok(RunOutcome {
        seed,
        report,
        ledger: sim.into_ledger(),
    })
}

/// Run every configured seed concurrently. Outcomes come back in seed order.
pub async fn run_batch(config: &SimConfig) -> Result<Vec<RunOutcome>> {
    let handles: Vec<_> = config
        .seeds()
        .map(|seed| {
            let config = config.clone();
            tokio::task::spawn_blocking(move || run_once(&config, seed))
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        let outcome = handle.await.context("Simulation task panicked")??;
        info!(seed = outcome.seed, summary = %outcome.report.status_line(), "Run complete");
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use negotiation::StopReason;

    #[test]
    fn test_run_once_is_reproducible() {
        let config = SimConfig::default();
        let a = run_once(&config, 3).unwrap();
        let b = run_once(&config, 3).unwrap();
        assert_eq!(a.report, b.report);
        assert_eq!(a.ledger, b.ledger);
    }

    #[tokio::test]
    async fn test_run_batch_keeps_seed_order() {
        let config = SimConfig {
            runs: 4,
            seed: 10,
            max_rounds: 500,
            ..SimConfig::default()
        };
        let outcomes = run_batch(&config).await.unwrap();
        let seeds: Vec<u64> = outcomes.iter().map(|o| o.seed).collect();
        assert_eq!(seeds, vec![10, 11, 12, 13]);
        for outcome in &outcomes {
            assert_eq!(outcome.report.stop_reason, StopReason::AllEnded);
        }
    }

    #[test]
    fn test_outcome_json_omits_ledger() {
        let outcome = run_once(&SimConfig::default(), 1).unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["seed"], 1);
        assert!(json.get("ledger").is_none());
        assert!(json["report"]["sessions"].is_array());
    }
}
