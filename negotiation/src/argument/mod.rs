//! Argument model: a typed, comparable claim for or against an item.
//!
//! An argument has a polarity, a subject item and at most one premise of
//! each kind:
//!
//! ```text
//! single premise:  "on C this item is V"
//! two premises:    "on C this item is V, and C outranks C2"
//!                  "on C this item is V, and V outranks the V2 you claimed"
//! ```
//!
//! Equality is structural (derived): polarity, item, rating premise and
//! ranking premise must all match, including presence of the ranking.

pub mod premise;

use serde::{Deserialize, Serialize};

use crate::error::NegotiationResult;
use crate::preferences::{CriterionName, Item, Value};

pub use premise::{Comparable, Premise, RankingPremise, RatingPremise};

/// A claim for (`in_favor`) or against an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Argument {
    in_favor: bool,
    item: Item,
    rating: Option<RatingPremise>,
    ranking: Option<RankingPremise>,
}

/// Canonical read of an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentParts<'a> {
    pub in_favor: bool,
    pub item: &'a Item,
    pub rating: Option<&'a RatingPremise>,
    pub ranking: Option<&'a RankingPremise>,
}

impl Argument {
    /// Ungrounded argument with no premise yet.
    pub fn new(in_favor: bool, item: Item) -> Self {
        Self {
            in_favor,
            item,
            rating: None,
            ranking: None,
        }
    }

    /// Single-premise argument: "on `criterion` this item is `value`".
    pub fn rating(in_favor: bool, item: Item, criterion: CriterionName, value: Value) -> Self {
        Self::new(in_favor, item).with_rating(criterion, value)
    }

    /// Supportive single-premise argument.
    pub fn support(item: Item, criterion: CriterionName, value: Value) -> Self {
        Self::rating(true, item, criterion, value)
    }

    /// Opposing single-premise argument.
    pub fn attack(item: Item, criterion: CriterionName, value: Value) -> Self {
        Self::rating(false, item, criterion, value)
    }

    /// Set (or overwrite) the rating premise.
    pub fn with_rating(mut self, criterion: CriterionName, value: Value) -> Self {
        self.rating = Some(RatingPremise::new(criterion, value));
        self
    }

    /// Set (or overwrite) the ranking premise. Fails with `TypeMismatch`
    /// when `better` and `worse` are of different kinds.
    pub fn with_ranking(
        self,
        better: impl Into<Comparable>,
        worse: impl Into<Comparable>,
    ) -> NegotiationResult<Self> {
        Ok(self.with_ranking_premise(RankingPremise::new(better, worse)?))
    }

    /// Set (or overwrite) an already kind-checked ranking premise.
    pub fn with_ranking_premise(mut self, ranking: RankingPremise) -> Self {
        self.ranking = Some(ranking);
        self
    }

    pub fn in_favor(&self) -> bool {
        self.in_favor
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn rating_premise(&self) -> Option<&RatingPremise> {
        self.rating.as_ref()
    }

    pub fn ranking_premise(&self) -> Option<&RankingPremise> {
        self.ranking.as_ref()
    }

    /// Criterion of the rating premise, if grounded.
    pub fn criterion(&self) -> Option<CriterionName> {
        self.rating.map(|r| r.criterion)
    }

    /// Whether the rating premise is set.
    pub fn is_grounded(&self) -> bool {
        self.rating.is_some()
    }

    pub fn decompose(&self) -> ArgumentParts<'_> {
        ArgumentParts {
            in_favor: self.in_favor,
            item: &self.item,
            rating: self.rating.as_ref(),
            ranking: self.ranking.as_ref(),
        }
    }

    /// Premises in order, rating first.
    pub fn premises(&self) -> impl Iterator<Item = Premise<'_>> {
        self.rating
            .iter()
            .map(Premise::Rating)
            .chain(self.ranking.iter().map(Premise::Ranking))
    }
}

impl std::fmt::Display for Argument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let polarity = if self.in_favor { "" } else { "not " };
        let premises: Vec<String> = self.premises().map(|p| p.to_string()).collect();
        write!(f, "ARGUE({}{} <= {})", polarity, self.item, premises.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NegotiationError;

    fn electric() -> Item {
        Item::new("Electric Engine", "An engine that works with electricity")
    }

    fn diesel() -> Item {
        Item::new("Diesel Engine", "An engine that works with fuel")
    }

    #[test]
    fn test_rating_builder_is_single_premise() {
        let arg = Argument::support(electric(), CriterionName::Durability, Value::VeryGood);
        let parts = arg.decompose();
        assert!(parts.in_favor);
        assert_eq!(parts.item, &electric());
        assert_eq!(
            parts.rating,
            Some(&RatingPremise::new(CriterionName::Durability, Value::VeryGood))
        );
        assert_eq!(parts.ranking, None);
        assert_eq!(arg.premises().count(), 1);
    }

    #[test]
    fn test_ranking_overwrites() {
        let arg = Argument::attack(electric(), CriterionName::Noise, Value::Bad)
            .with_ranking(CriterionName::Noise, CriterionName::Durability)
            .unwrap()
            .with_ranking(CriterionName::Noise, CriterionName::Consumption)
            .unwrap();
        assert_eq!(
            arg.ranking_premise(),
            Some(&RankingPremise::criteria(
                CriterionName::Noise,
                CriterionName::Consumption
            ))
        );
        assert_eq!(arg.premises().count(), 2);
    }

    #[test]
    fn test_ranking_type_mismatch() {
        let err = Argument::attack(electric(), CriterionName::Noise, Value::Bad)
            .with_ranking(CriterionName::Noise, Value::Good)
            .unwrap_err();
        assert!(matches!(err, NegotiationError::TypeMismatch { .. }));
    }

    #[test]
    fn test_ungrounded_has_no_premises() {
        let arg = Argument::new(false, electric());
        assert!(!arg.is_grounded());
        assert_eq!(arg.rating_premise(), None);
        assert_eq!(arg.ranking_premise(), None);
        assert_eq!(arg.criterion(), None);
    }

    #[test]
    fn test_equality_reflexive() {
        let arg = Argument::attack(electric(), CriterionName::Noise, Value::Bad)
            .with_ranking(CriterionName::Noise, CriterionName::Durability)
            .unwrap();
        assert_eq!(arg, arg.clone());
    }

    #[test]
    fn test_equality_distinguishes_every_component() {
        let base = Argument::support(electric(), CriterionName::Durability, Value::Good);

        let polarity = Argument::attack(electric(), CriterionName::Durability, Value::Good);
        let item = Argument::support(diesel(), CriterionName::Durability, Value::Good);
        let criterion = Argument::support(electric(), CriterionName::Noise, Value::Good);
        let value = Argument::support(electric(), CriterionName::Durability, Value::VeryGood);
        let with_ranking = base
            .clone()
            .with_ranking(CriterionName::Durability, CriterionName::Noise)
            .unwrap();

        for other in [&polarity, &item, &criterion, &value, &with_ranking] {
            assert_ne!(&base, other);
            assert_ne!(other, &base);
        }
    }

    #[test]
    fn test_equality_compares_rankings() {
        let a = Argument::support(electric(), CriterionName::Durability, Value::Good)
            .with_ranking(CriterionName::Durability, CriterionName::Noise)
            .unwrap();
        let b = Argument::support(electric(), CriterionName::Durability, Value::Good)
            .with_ranking(CriterionName::Durability, CriterionName::Consumption)
            .unwrap();
        let c = Argument::support(electric(), CriterionName::Durability, Value::Good)
            .with_ranking(CriterionName::Durability, CriterionName::Noise)
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_display() {
        let arg = Argument::attack(diesel(), CriterionName::Noise, Value::VeryBad)
            .with_ranking(CriterionName::Noise, CriterionName::Durability)
            .unwrap();
        assert_eq!(
            arg.to_string(),
            "ARGUE(not Diesel Engine <= noise=very_bad, noise > durability)"
        );
        let arg = Argument::support(diesel(), CriterionName::Noise, Value::Good);
        assert_eq!(arg.to_string(), "ARGUE(Diesel Engine <= noise=good)");
    }
}
