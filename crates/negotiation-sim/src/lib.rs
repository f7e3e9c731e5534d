//! Driver for seeded negotiation simulations: configuration loading and a
//! batch runner on tokio's blocking pool.

pub mod config;
pub mod runner;

pub use config::{CatalogEntry, CliOverrides, SimConfig};
pub use runner::{run_batch, run_once, RunOutcome};
