//! Counter-argument search: attack, defend, counter-propose or concede.
//!
//! Given the argument a peer just made, the searching agent scans its own
//! private preferences for the strongest reply it has not already made in
//! this session.
//!
//! # Supportive incoming argument ("E is V on C")
//!
//! ```text
//! 1. attack on a bad criterion C2 ranked above C     (not E <= C2=own, C2 > C)
//! 2. attack on C with a lower own value              (not E <= C=own, V > own)
//! 3. counter-propose own favorite F, once per session
//!    or support F when it rates higher than V on C   (F <= C=ownF, ownF > V)
//! 4. concede
//! ```
//!
//! # Opposing incoming argument ("not E: C is V and C2 outranks C")
//!
//! ```text
//! 1. defend on a good criterion C3 ranked above C2   (E <= C3=own, C3 > C2)
//! 2. defend on any good criterion not yet used       (E <= C=own)
//! 3. concede
//! ```
//!
//! Candidates are always tried in the searcher's criterion order and the
//! first fresh one wins. The search only reads the ledger, so repeated calls
//! on the same state return the same outcome.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::argument::{Argument, RankingPremise, RatingPremise};
use crate::error::{NegotiationError, NegotiationResult};
use crate::ledger::Ledger;
use crate::preferences::{CriterionName, Item, PreferenceProvider, Value};

/// Result of a counter-argument search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Reply with this argument.
    CounterArgument(Argument),
    /// Stop arguing and put the searcher's favorite item on the table.
    ProposeOwnTop(Item),
    /// Nothing left to say.
    Concede,
}

impl std::fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CounterArgument(argument) => write!(f, "counter_argument {}", argument),
            Self::ProposeOwnTop(item) => write!(f, "propose_own_top {}", item),
            Self::Concede => write!(f, "concede"),
        }
    }
}

/// One agent's view for searching replies in one session.
pub struct CounterArgumentSearch<'a, P: PreferenceProvider + ?Sized> {
    searcher: &'a str,
    peer: &'a str,
    catalog: &'a [Item],
    preferences: &'a P,
    ledger: &'a Ledger,
}

impl<'a, P: PreferenceProvider + ?Sized> CounterArgumentSearch<'a, P> {
    pub fn new(
        searcher: &'a str,
        peer: &'a str,
        catalog: &'a [Item],
        preferences: &'a P,
        ledger: &'a Ledger,
    ) -> Self {
        Self {
            searcher,
            peer,
            catalog,
            preferences,
            ledger,
        }
    }

    /// Find the reply to `incoming`. Fails with `Ungrounded` when the
    /// incoming argument has no rating premise.
    pub fn search(&self, incoming: &Argument) -> NegotiationResult<SearchOutcome> {
        let parts = incoming.decompose();
        let rating = parts.rating.ok_or_else(|| NegotiationError::Ungrounded {
            item: parts.item.name().to_string(),
        })?;

        let outcome = if parts.in_favor {
            self.rebut_support(parts.item, rating)?
        } else {
            self.defend(parts.item, rating, parts.ranking)?
        };
        debug!(
            searcher = self.searcher,
            peer = self.peer,
            %incoming,
            %outcome,
            "Counter-argument search"
        );
        Ok(outcome)
    }

    fn rebut_support(
        &self,
        item: &Item,
        claim: &RatingPremise,
    ) -> NegotiationResult<SearchOutcome> {
        let prefs = self.preferences;

        // 1. A criterion we weigh more than the peer's, on which the item is bad.
        for &criterion in prefs.criteria_in_preference_order() {
            let own = prefs.rating_of(item, criterion);
            if criterion == claim.criterion
                || !own.is_bad()
                || !prefs.is_preferred_criterion(criterion, claim.criterion)
            {
                continue;
            }
            let candidate = Argument::attack(item.clone(), criterion, own)
                .with_ranking_premise(RankingPremise::criteria(criterion, claim.criterion));
            if self.is_fresh(&candidate)? {
                return Ok(SearchOutcome::CounterArgument(candidate));
            }
        }

        // 2. Same criterion, we rate it lower.
        let own = prefs.rating_of(item, claim.criterion);
        if own < claim.value {
            let candidate = Argument::attack(item.clone(), claim.criterion, own)
                .with_ranking_premise(RankingPremise::values(claim.value, own));
            if self.is_fresh(&candidate)? {
                return Ok(SearchOutcome::CounterArgument(candidate));
            }
        }

        // 3. Our own favorite.
        if let Some(favorite) = prefs.most_preferred(self.catalog) {
            if favorite != item {
                if !self.ledger.has_been_proposed(self.searcher, self.peer, favorite)? {
                    return Ok(SearchOutcome::ProposeOwnTop(favorite.clone()));
                }
                let ours = prefs.rating_of(favorite, claim.criterion);
                if ours > claim.value {
                    let candidate = Argument::support(favorite.clone(), claim.criterion, ours)
                        .with_ranking_premise(RankingPremise::values(ours, claim.value));
                    if self.is_fresh(&candidate)? {
                        return Ok(SearchOutcome::CounterArgument(candidate));
                    }
                }
            }
        }

        Ok(SearchOutcome::Concede)
    }

    fn defend(
        &self,
        item: &Item,
        claim: &RatingPremise,
        ranking: Option<&RankingPremise>,
    ) -> NegotiationResult<SearchOutcome> {
        // Without a criterion ranking the attacked criterion is the bar to clear.
        let bar = ranking
            .and_then(RankingPremise::better_criterion)
            .unwrap_or(claim.criterion);
        let strengths = self.strengths(item);

        // 1. A good criterion ranked even higher than theirs.
        for &(criterion, own) in &strengths {
            if criterion == bar || !self.preferences.is_preferred_criterion(criterion, bar) {
                continue;
            }
            let candidate = Argument::support(item.clone(), criterion, own)
                .with_ranking_premise(RankingPremise::criteria(criterion, bar));
            if self.is_fresh(&candidate)? {
                return Ok(SearchOutcome::CounterArgument(candidate));
            }
        }

        // 2. Any good criterion we have not used yet.
        for &(criterion, own) in &strengths {
            let candidate = Argument::support(item.clone(), criterion, own);
            if self.is_fresh(&candidate)? {
                return Ok(SearchOutcome::CounterArgument(candidate));
            }
        }

        Ok(SearchOutcome::Concede)
    }

    /// Criteria on which the searcher rates `item` good or very good, most
    /// important first.
    fn strengths(&self, item: &Item) -> Vec<(CriterionName, Value)> {
        self.preferences
            .criteria_in_preference_order()
            .iter()
            .map(|&c| (c, self.preferences.rating_of(item, c)))
            .filter(|(_, v)| v.is_good())
            .collect()
    }

    fn is_fresh(&self, candidate: &Argument) -> NegotiationResult<bool> {
        Ok(!self
            .ledger
            .is_already_used(self.searcher, self.peer, candidate)?)
    }
}

/// Strongest unused single-premise supportive argument for `item`: the
/// searcher's top-ranked good criterion not yet argued in this session.
pub fn strongest_support<P: PreferenceProvider + ?Sized>(
    speaker: &str,
    peer: &str,
    item: &Item,
    preferences: &P,
    ledger: &Ledger,
) -> NegotiationResult<Option<Argument>> {
    for &criterion in preferences.criteria_in_preference_order() {
        let own = preferences.rating_of(item, criterion);
        if !own.is_good() {
            continue;
        }
        let candidate = Argument::support(item.clone(), criterion, own);
        if !ledger.is_already_used(speaker, peer, &candidate)? {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}
