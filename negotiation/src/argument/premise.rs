//! Premises: the factual claims an argument is built from.

use serde::{Deserialize, Serialize};

use crate::error::{NegotiationError, NegotiationResult};
use crate::preferences::{CriterionName, Value};

/// "This item rates `value` on `criterion`."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RatingPremise {
    pub criterion: CriterionName,
    pub value: Value,
}

impl RatingPremise {
    pub fn new(criterion: CriterionName, value: Value) -> Self {
        Self { criterion, value }
    }
}

impl std::fmt::Display for RatingPremise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.criterion, self.value)
    }
}

/// Either side of a ranking comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparable {
    Criterion(CriterionName),
    Value(Value),
}

impl From<CriterionName> for Comparable {
    fn from(criterion: CriterionName) -> Self {
        Self::Criterion(criterion)
    }
}

impl From<Value> for Comparable {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl std::fmt::Display for Comparable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Criterion(c) => write!(f, "{}", c),
            Self::Value(v) => write!(f, "{}", v),
        }
    }
}

/// Kind-checked ordering between two criteria or two values.
///
/// The variant is the kind tag, so a criterion can never be compared with a
/// value once the premise exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RankingPremise {
    /// `better` is ranked above `worse` in the speaker's criterion order.
    Criterion {
        better: CriterionName,
        worse: CriterionName,
    },
    /// `better` exceeds `worse` on the rating scale.
    Value { better: Value, worse: Value },
}

impl RankingPremise {
    /// Build a ranking over two comparables, failing with `TypeMismatch`
    /// when one is a criterion and the other a value.
    pub fn new(
        better: impl Into<Comparable>,
        worse: impl Into<Comparable>,
    ) -> NegotiationResult<Self> {
        match (better.into(), worse.into()) {
            (Comparable::Criterion(better), Comparable::Criterion(worse)) => {
                Ok(Self::Criterion { better, worse })
            }
            (Comparable::Value(better), Comparable::Value(worse)) => {
                Ok(Self::Value { better, worse })
            }
            (better, worse) => Err(NegotiationError::TypeMismatch {
                better: better.to_string(),
                worse: worse.to_string(),
            }),
        }
    }

    pub fn criteria(better: CriterionName, worse: CriterionName) -> Self {
        Self::Criterion { better, worse }
    }

    pub fn values(better: Value, worse: Value) -> Self {
        Self::Value { better, worse }
    }

    pub fn better(&self) -> Comparable {
        match *self {
            Self::Criterion { better, .. } => Comparable::Criterion(better),
            Self::Value { better, .. } => Comparable::Value(better),
        }
    }

    pub fn worse(&self) -> Comparable {
        match *self {
            Self::Criterion { worse, .. } => Comparable::Criterion(worse),
            Self::Value { worse, .. } => Comparable::Value(worse),
        }
    }

    /// The preferred criterion, when this ranks criteria.
    pub fn better_criterion(&self) -> Option<CriterionName> {
        match *self {
            Self::Criterion { better, .. } => Some(better),
            Self::Value { .. } => None,
        }
    }
}

impl std::fmt::Display for RankingPremise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} > {}", self.better(), self.worse())
    }
}

/// Borrowed view of one premise, in argument order (rating first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Premise<'a> {
    Rating(&'a RatingPremise),
    Ranking(&'a RankingPremise),
}

impl std::fmt::Display for Premise<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rating(p) => write!(f, "{}", p),
            Self::Ranking(p) => write!(f, "{}", p),
        }
    }
}
