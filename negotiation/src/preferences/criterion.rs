//! Ordinal domains: criterion names and rating values.

use serde::{Deserialize, Serialize};

/// Evaluation criterion an agent can rate an item on.
///
/// Carries no order of its own; each agent ranks criteria privately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionName {
    ProductionCost,
    Consumption,
    Durability,
    EnvironmentImpact,
    Noise,
}

impl CriterionName {
    /// Every criterion, in declaration order.
    pub const ALL: [CriterionName; 5] = [
        Self::ProductionCost,
        Self::Consumption,
        Self::Durability,
        Self::EnvironmentImpact,
        Self::Noise,
    ];
}

impl std::fmt::Display for CriterionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProductionCost => write!(f, "production_cost"),
            Self::Consumption => write!(f, "consumption"),
            Self::Durability => write!(f, "durability"),
            Self::EnvironmentImpact => write!(f, "environment_impact"),
            Self::Noise => write!(f, "noise"),
        }
    }
}

/// Five-level ordinal rating, `VeryBad < Bad < Average < Good < VeryGood`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    VeryBad,
    Bad,
    Average,
    Good,
    VeryGood,
}

impl Value {
    /// Every value, worst first.
    pub const ALL: [Value; 5] = [
        Self::VeryBad,
        Self::Bad,
        Self::Average,
        Self::Good,
        Self::VeryGood,
    ];

    /// Ordinal score, 0 for `VeryBad` up to 4 for `VeryGood`.
    pub fn score(self) -> u32 {
        match self {
            Self::VeryBad => 0,
            Self::Bad => 1,
            Self::Average => 2,
            Self::Good => 3,
            Self::VeryGood => 4,
        }
    }

    /// `Good` or `VeryGood`.
    pub fn is_good(self) -> bool {
        self >= Self::Good
    }

    /// `Bad` or `VeryBad`.
    pub fn is_bad(self) -> bool {
        self <= Self::Bad
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VeryBad => write!(f, "very_bad"),
            Self::Bad => write!(f, "bad"),
            Self::Average => write!(f, "average"),
            Self::Good => write!(f, "good"),
            Self::VeryGood => write!(f, "very_good"),
        }
    }
}
