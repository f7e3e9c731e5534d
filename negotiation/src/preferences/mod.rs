//! Private agent preferences: criterion ranking and item ratings.
//!
//! The negotiation core only sees the [`PreferenceProvider`] trait. The
//! table-backed [`Preferences`] is what the simulation hands each agent.

pub mod criterion;
pub mod item;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::selector::Selector;

pub use criterion::{CriterionName, Value};
pub use item::Item;

/// Read access to one agent's private preferences.
pub trait PreferenceProvider {
    /// How this agent rates `item` on `criterion`.
    fn rating_of(&self, item: &Item, criterion: CriterionName) -> Value;

    /// Criteria from most to least important. Total order, no ties.
    fn criteria_in_preference_order(&self) -> &[CriterionName];

    /// Whether `better` is ranked strictly above `worse`.
    fn is_preferred_criterion(&self, better: CriterionName, worse: CriterionName) -> bool {
        let order = self.criteria_in_preference_order();
        let rank = |c: CriterionName| order.iter().position(|x| *x == c);
        match (rank(better), rank(worse)) {
            (Some(b), Some(w)) => b < w,
            _ => false,
        }
    }

    /// This agent's favorite among `items`.
    fn most_preferred<'a>(&self, items: &'a [Item]) -> Option<&'a Item>;

    /// Whether `item` ranks within the best 10% of `items`.
    fn is_among_top_decile(&self, item: &Item, items: &[Item]) -> bool;
}

/// Table-backed preferences: a criterion ranking plus one rating per
/// (item, criterion).
///
/// Unrated pairs read as [`Value::Average`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    criteria: Vec<CriterionName>,
    ratings: HashMap<String, HashMap<CriterionName, Value>>,
}

impl Preferences {
    /// Create preferences with the given criterion ranking, most important first.
    pub fn new(criteria: Vec<CriterionName>) -> Self {
        Self {
            criteria,
            ratings: HashMap::new(),
        }
    }

    /// Builder form of [`Preferences::set_rating`].
    pub fn with_rating(mut self, item: &Item, criterion: CriterionName, value: Value) -> Self {
        self.set_rating(item, criterion, value);
        self
    }

    pub fn set_rating(&mut self, item: &Item, criterion: CriterionName, value: Value) {
        self.ratings
            .entry(item.name().to_string())
            .or_default()
            .insert(criterion, value);
    }

    /// Random preferences: shuffled criterion ranking and one drawn value per
    /// (item, criterion).
    pub fn generate<S: Selector>(catalog: &[Item], selector: &mut S) -> Self {
        let mut criteria = CriterionName::ALL.to_vec();
        selector.shuffle(&mut criteria);

        let mut preferences = Self::new(criteria.clone());
        for item in catalog {
            for criterion in &criteria {
                let value = selector
                    .pick(&Value::ALL)
                    .copied()
                    .unwrap_or(Value::Average);
                preferences.set_rating(item, *criterion, value);
            }
        }
        preferences
    }

    /// Weighted score: each rating counts `n - rank` times, where rank 0 is
    /// the most important criterion.
    pub fn score(&self, item: &Item) -> u32 {
        let n = self.criteria.len() as u32;
        self.criteria
            .iter()
            .enumerate()
            .map(|(rank, criterion)| self.rating_of(item, *criterion).score() * (n - rank as u32))
            .sum()
    }
}

impl PreferenceProvider for Preferences {
    fn rating_of(&self, item: &Item, criterion: CriterionName) -> Value {
        self.ratings
            .get(item.name())
            .and_then(|row| row.get(&criterion))
            .copied()
            .unwrap_or(Value::Average)
    }

    fn criteria_in_preference_order(&self) -> &[CriterionName] {
        &self.criteria
    }

    fn most_preferred<'a>(&self, items: &'a [Item]) -> Option<&'a Item> {
        let mut best: Option<(&Item, u32)> = None;
        for item in items {
            let score = self.score(item);
            // Ties keep the earlier catalog entry.
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((item, score));
            }
        }
        best.map(|(item, _)| item)
    }

    fn is_among_top_decile(&self, item: &Item, items: &[Item]) -> bool {
        if !items.contains(item) {
            return false;
        }
        let mut ranked: Vec<&Item> = items.iter().collect();
        ranked.sort_by(|a, b| self.score(b).cmp(&self.score(a)));
        let cutoff = items.len().div_ceil(10).max(1);
        ranked.iter().take(cutoff).any(|candidate| *candidate == item)
    }
}
