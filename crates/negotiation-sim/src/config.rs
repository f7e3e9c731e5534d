use anyhow::{bail, Context, Result};
use negotiation::{Item, RepetitionPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// One catalog entry as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl CatalogEntry {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

/// Simulation settings.
///
/// Precedence, lowest first: defaults, TOML file, `NEGOTIATION_*`
/// environment variables, CLI flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Agent names; every pair negotiates.
    pub agents: Vec<String>,
    pub catalog: Vec<CatalogEntry>,
    /// Round cap per run.
    pub max_rounds: u32,
    /// Seed of the first run; run `k` uses `seed + k`.
    pub seed: u64,
    pub runs: u32,
    pub repetition_policy: RepetitionPolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            agents: vec!["Alice".into(), "Bob".into()],
            catalog: vec![
                CatalogEntry::new("Electric Engine", "An engine that works with electricity"),
                CatalogEntry::new("Diesel Engine", "An engine that works with fuel"),
                CatalogEntry::new("Hydrogen Engine", "An engine that works with hydrogen"),
            ],
            max_rounds: 50,
            seed: 42,
            runs: 1,
            repetition_policy: RepetitionPolicy::Exact,
        }
    }
}

impl SimConfig {
    /// Load a TOML config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
        let config: SimConfig =
            toml::from_str(&content).context("Failed to parse simulation config TOML")?;
        Ok(config)
    }

    /// Defaults, or the file at `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply `NEGOTIATION_SEED`, `NEGOTIATION_MAX_ROUNDS` and
    /// `NEGOTIATION_RUNS` from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Same as [`SimConfig::apply_env`] with an explicit lookup.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("NEGOTIATION_SEED") {
            self.seed = raw
                .trim()
                .parse()
                .context(format!("NEGOTIATION_SEED is not a valid seed: {raw}"))?;
        }
        if let Some(raw) = lookup("NEGOTIATION_MAX_ROUNDS") {
            self.max_rounds = raw
                .trim()
                .parse()
                .context(format!("NEGOTIATION_MAX_ROUNDS is not a valid round count: {raw}"))?;
        }
        if let Some(raw) = lookup("NEGOTIATION_RUNS") {
            self.runs = raw
                .trim()
                .parse()
                .context(format!("NEGOTIATION_RUNS is not a valid run count: {raw}"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let distinct: HashSet<&str> = self.agents.iter().map(String::as_str).collect();
        if distinct.len() < 2 {
            bail!("at least two distinct agents are required, got {}", distinct.len());
        }
        if distinct.len() != self.agents.len() {
            bail!("agent names must be unique");
        }
        if self.catalog.is_empty() {
            bail!("catalog must contain at least one item");
        }
        let mut names = HashSet::new();
        for entry in &self.catalog {
            if !names.insert(entry.name.as_str()) {
                bail!("duplicate catalog item: {}", entry.name);
            }
        }
        if self.max_rounds == 0 {
            bail!("max_rounds must be greater than zero");
        }
        if self.runs == 0 {
            bail!("runs must be greater than zero");
        }
        Ok(())
    }

    pub fn catalog_items(&self) -> Vec<Item> {
        self.catalog
            .iter()
            .map(|entry| Item::new(entry.name.as_str(), entry.description.as_str()))
            .collect()
    }

    /// Seeds of every run, in run order.
    pub fn seeds(&self) -> impl Iterator<Item = u64> {
        let first = self.seed;
        (0..u64::from(self.runs)).map(move |k| first.wrapping_add(k))
    }
}

/// Values given on the command line; `None` leaves the config untouched.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub seed: Option<u64>,
    pub max_rounds: Option<u32>,
    pub runs: Option<u32>,
    pub agents: Option<Vec<String>>,
}

impl CliOverrides {
    pub fn apply(&self, config: &mut SimConfig) {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(rounds) = self.max_rounds {
            config.max_rounds = rounds;
        }
        if let Some(runs) = self.runs {
            config.runs = runs;
        }
        if let Some(agents) = &self.agents {
            config.agents = agents
                .iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect();
        }
    }
}
