//! Negotiation Ledger: session bookkeeping for every pair of a cohort.
//!
//! Sessions are pre-allocated when the ledger is built from the cohort's
//! agent list. Every operation is addressed by an unordered pair and fails
//! with `UnknownPair` when that pair was never allocated; sessions are never
//! created implicitly and never deleted.
//!
//! The ledger does not deduplicate on write. [`Ledger::is_already_used`] is
//! the read gate callers consult before recording a new argument.

pub mod checkpoint;
pub mod session;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::argument::Argument;
use crate::error::{NegotiationError, NegotiationResult};
use crate::preferences::Item;

pub use checkpoint::LedgerCheckpoint;
pub use session::{AgentId, ExchangeRecord, NegotiationSession, PairKey, SessionPhase};

/// How two arguments are matched when checking for repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepetitionPolicy {
    /// Full structural equality, rated value included.
    #[default]
    Exact,
    /// Same as `Exact` but the rated value is ignored: one claim per
    /// (polarity, item, criterion, ranking).
    CriterionOnly,
}

impl RepetitionPolicy {
    pub fn matches(self, recorded: &Argument, candidate: &Argument) -> bool {
        match self {
            Self::Exact => recorded == candidate,
            Self::CriterionOnly => {
                recorded.in_favor() == candidate.in_favor()
                    && recorded.item() == candidate.item()
                    && recorded.criterion() == candidate.criterion()
                    && recorded.ranking_premise() == candidate.ranking_premise()
            }
        }
    }
}

impl std::fmt::Display for RepetitionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::CriterionOnly => write!(f, "criterion_only"),
        }
    }
}

/// Read-only digest of one session, used in reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub pair: PairKey,
    pub phase: SessionPhase,
    pub initiator: Option<AgentId>,
    pub accepted_item: Option<String>,
    pub arguments: usize,
}

/// Owner of every negotiation session of a cohort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    sessions: BTreeMap<PairKey, NegotiationSession>,
    policy: RepetitionPolicy,
}

impl Ledger {
    /// Pre-allocate an empty session for every unordered pair of `agents`.
    pub fn new<I, S>(agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_policy(agents, RepetitionPolicy::default())
    }

    pub fn with_policy<I, S>(agents: I, policy: RepetitionPolicy) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let agents: Vec<String> = agents
            .into_iter()
            .map(Into::into)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut sessions = BTreeMap::new();
        for (i, a) in agents.iter().enumerate() {
            for b in &agents[i + 1..] {
                let key = PairKey::new(a, b);
                sessions.insert(key.clone(), NegotiationSession::new(key));
            }
        }
        debug!(agents = agents.len(), sessions = sessions.len(), %policy, "Ledger allocated");

        Self { sessions, policy }
    }

    pub(crate) fn from_sessions(
        sessions: Vec<NegotiationSession>,
        policy: RepetitionPolicy,
    ) -> Self {
        let sessions = sessions
            .into_iter()
            .map(|s| (s.pair().clone(), s))
            .collect();
        Self { sessions, policy }
    }

    /// Normalized key for a pair, whichever order the agents are given in.
    pub fn get_tuple(a: &str, b: &str) -> PairKey {
        PairKey::new(a, b)
    }

    pub fn policy(&self) -> RepetitionPolicy {
        self.policy
    }

    pub fn session(&self, a: &str, b: &str) -> NegotiationResult<&NegotiationSession> {
        self.sessions
            .get(&PairKey::new(a, b))
            .ok_or_else(|| NegotiationError::unknown_pair(a, b))
    }

    fn session_mut(&mut self, a: &str, b: &str) -> NegotiationResult<&mut NegotiationSession> {
        self.sessions
            .get_mut(&PairKey::new(a, b))
            .ok_or_else(|| NegotiationError::unknown_pair(a, b))
    }

    pub fn sessions(&self) -> impl Iterator<Item = &NegotiationSession> {
        self.sessions.values()
    }

    /// Record `initiator` as the opener. Later calls are no-ops.
    pub fn start_negotiation(&mut self, initiator: &str, peer: &str) -> NegotiationResult<()> {
        if self.session_mut(initiator, peer)?.start(initiator) {
            debug!(initiator, peer, "Negotiation started");
        }
        Ok(())
    }

    pub fn has_started(&self, a: &str, b: &str) -> NegotiationResult<bool> {
        Ok(self.session(a, b)?.initiator().is_some())
    }

    pub fn phase(&self, a: &str, b: &str) -> NegotiationResult<SessionPhase> {
        Ok(self.session(a, b)?.phase())
    }

    /// Append `(speaker, argument)` to the exchange log.
    ///
    /// No deduplication happens here; ungrounded arguments are rejected.
    pub fn record_argument(
        &mut self,
        speaker: &str,
        peer: &str,
        argument: Argument,
    ) -> NegotiationResult<()> {
        if !argument.is_grounded() {
            return Err(NegotiationError::Ungrounded {
                item: argument.item().name().to_string(),
            });
        }
        let session = self.session_mut(speaker, peer)?;
        debug!(speaker, peer, %argument, "Argument recorded");
        session.push_argument(speaker, argument);
        Ok(())
    }

    /// Whether an argument matching `argument` (per the ledger's repetition
    /// policy) was already recorded in this session, by either side.
    pub fn is_already_used(
        &self,
        a: &str,
        b: &str,
        argument: &Argument,
    ) -> NegotiationResult<bool> {
        let policy = self.policy;
        Ok(self
            .session(a, b)?
            .exchange_log()
            .iter()
            .any(|record| policy.matches(&record.argument, argument)))
    }

    /// Overwrite `agent`'s standing offer.
    pub fn record_proposal(
        &mut self,
        agent: &str,
        peer: &str,
        item: Item,
    ) -> NegotiationResult<()> {
        self.session_mut(agent, peer)?.set_proposal(agent, item);
        Ok(())
    }

    pub fn get_proposal(&self, agent: &str, peer: &str) -> NegotiationResult<Option<&Item>> {
        Ok(self.session(agent, peer)?.proposal_of(agent))
    }

    /// Whether `item` is the standing offer of either participant.
    pub fn has_been_proposed(
        &self,
        agent: &str,
        peer: &str,
        item: &Item,
    ) -> NegotiationResult<bool> {
        Ok(self
            .session(agent, peer)?
            .standing_offers()
            .any(|(_, offered)| offered == item))
    }

    pub fn set_accepted_item(&mut self, a: &str, b: &str, item: Item) -> NegotiationResult<()> {
        let session = self.session_mut(a, b)?;
        info!(pair = %session.pair(), item = %item, "Item accepted");
        session.set_accepted(item);
        Ok(())
    }

    pub fn get_accepted_item(&self, a: &str, b: &str) -> NegotiationResult<Option<&Item>> {
        Ok(self.session(a, b)?.accepted_item())
    }

    /// Add `agent`'s termination vote. Voting twice changes nothing.
    pub fn vote_to_end(&mut self, agent: &str, peer: &str) -> NegotiationResult<()> {
        let session = self.session_mut(agent, peer)?;
        if session.vote(agent) && session.is_ended() {
            info!(pair = %session.pair(), "Negotiation ended");
        }
        Ok(())
    }

    pub fn is_ended(&self, a: &str, b: &str) -> NegotiationResult<bool> {
        Ok(self.session(a, b)?.is_ended())
    }

    /// Whether every allocated session has ended.
    pub fn all_ended(&self) -> bool {
        self.sessions.values().all(NegotiationSession::is_ended)
    }

    pub fn summaries(&self) -> Vec<SessionSummary> {
        self.sessions
            .values()
            .map(|s| SessionSummary {
                pair: s.pair().clone(),
                phase: s.phase(),
                initiator: s.initiator().map(str::to_string),
                accepted_item: s.accepted_item().map(|i| i.name().to_string()),
                arguments: s.exchange_log().len(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::{CriterionName, Value};

    fn ledger() -> Ledger {
        Ledger::new(["Alice", "Bob", "Hugo"])
    }

    fn electric() -> Item {
        Item::new("Electric Engine", "An engine that works with electricity")
    }

    fn diesel() -> Item {
        Item::new("Diesel Engine", "An engine that works with fuel")
    }

    #[test]
    fn test_preallocates_every_pair() {
        let ledger = ledger();
        assert_eq!(ledger.sessions().count(), 3);
        for (a, b) in [("Alice", "Bob"), ("Bob", "Hugo"), ("Hugo", "Alice")] {
            assert_eq!(ledger.phase(a, b).unwrap(), SessionPhase::NotStarted);
        }
    }

    #[test]
    fn test_duplicate_agents_collapse() {
        let ledger = Ledger::new(["Alice", "Bob", "Alice"]);
        assert_eq!(ledger.sessions().count(), 1);
    }

    #[test]
    fn test_unknown_pair() {
        let mut ledger = ledger();
        let err = ledger.start_negotiation("Alice", "Zed").unwrap_err();
        assert!(matches!(err, NegotiationError::UnknownPair { .. }));
        assert!(ledger.has_started("Alice", "Alice").is_err());
        assert!(ledger.is_ended("Zed", "Bob").is_err());
        assert!(ledger.sessions().all(|s| s.initiator().is_none()));
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut ledger = ledger();
        assert!(!ledger.has_started("Alice", "Bob").unwrap());
        ledger.start_negotiation("Bob", "Alice").unwrap();
        ledger.start_negotiation("Alice", "Bob").unwrap();
        assert!(ledger.has_started("Alice", "Bob").unwrap());
        assert_eq!(ledger.session("Alice", "Bob").unwrap().initiator(), Some("Bob"));
        assert!(!ledger.has_started("Alice", "Hugo").unwrap());
    }

    #[test]
    fn test_pair_order_independence() {
        let mut ledger = ledger();
        assert_eq!(Ledger::get_tuple("Alice", "Bob"), Ledger::get_tuple("Bob", "Alice"));

        ledger.record_proposal("Bob", "Alice", diesel()).unwrap();
        assert_eq!(ledger.get_proposal("Bob", "Alice").unwrap(), Some(&diesel()));
        assert!(ledger.has_been_proposed("Alice", "Bob", &diesel()).unwrap());

        ledger.set_accepted_item("Bob", "Alice", diesel()).unwrap();
        assert_eq!(
            ledger.get_accepted_item("Alice", "Bob").unwrap(),
            Some(&diesel())
        );
    }

    #[test]
    fn test_non_repetition() {
        let mut ledger = ledger();
        let arg = Argument::attack(electric(), CriterionName::Noise, Value::Bad)
            .with_ranking(CriterionName::Noise, CriterionName::Durability)
            .unwrap();
        assert!(!ledger.is_already_used("Alice", "Bob", &arg).unwrap());

        ledger.record_argument("Alice", "Bob", arg.clone()).unwrap();

        // Structurally equal but separately built.
        let twin = Argument::attack(electric(), CriterionName::Noise, Value::Bad)
            .with_ranking(CriterionName::Noise, CriterionName::Durability)
            .unwrap();
        assert!(ledger.is_already_used("Bob", "Alice", &twin).unwrap());

        let single = Argument::attack(electric(), CriterionName::Noise, Value::Bad);
        assert!(!ledger.is_already_used("Alice", "Bob", &single).unwrap());
        let other_value = Argument::attack(electric(), CriterionName::Noise, Value::VeryBad)
            .with_ranking(CriterionName::Noise, CriterionName::Durability)
            .unwrap();
        assert!(!ledger.is_already_used("Alice", "Bob", &other_value).unwrap());

        // Sessions are independent.
        assert!(!ledger.is_already_used("Alice", "Hugo", &twin).unwrap());
    }

    #[test]
    fn test_record_does_not_dedup() {
        let mut ledger = ledger();
        let arg = Argument::support(electric(), CriterionName::Durability, Value::Good);
        ledger.record_argument("Alice", "Bob", arg.clone()).unwrap();
        ledger.record_argument("Alice", "Bob", arg).unwrap();
        assert_eq!(ledger.session("Alice", "Bob").unwrap().exchange_log().len(), 2);
    }

    #[test]
    fn test_ungrounded_rejected() {
        let mut ledger = ledger();
        let err = ledger
            .record_argument("Alice", "Bob", Argument::new(true, electric()))
            .unwrap_err();
        assert!(matches!(err, NegotiationError::Ungrounded { .. }));
    }

    #[test]
    fn test_criterion_only_policy() {
        let mut ledger = Ledger::with_policy(["Alice", "Bob"], RepetitionPolicy::CriterionOnly);
        ledger
            .record_argument(
                "Alice",
                "Bob",
                Argument::support(electric(), CriterionName::Durability, Value::Good),
            )
            .unwrap();
        let stronger = Argument::support(electric(), CriterionName::Durability, Value::VeryGood);
        assert!(ledger.is_already_used("Alice", "Bob", &stronger).unwrap());
        let other = Argument::support(electric(), CriterionName::Noise, Value::Good);
        assert!(!ledger.is_already_used("Alice", "Bob", &other).unwrap());
    }

    #[test]
    fn test_proposal_overwrites() {
        let mut ledger = ledger();
        ledger.record_proposal("Alice", "Bob", electric()).unwrap();
        ledger.record_proposal("Alice", "Bob", diesel()).unwrap();
        assert_eq!(ledger.get_proposal("Alice", "Bob").unwrap(), Some(&diesel()));
        assert!(!ledger.has_been_proposed("Alice", "Bob", &electric()).unwrap());
        assert_eq!(ledger.get_proposal("Bob", "Alice").unwrap(), None);
    }

    #[test]
    fn test_termination_votes() {
        let mut ledger = ledger();
        ledger.start_negotiation("Alice", "Bob").unwrap();

        ledger.vote_to_end("Bob", "Alice").unwrap();
        ledger.vote_to_end("Bob", "Alice").unwrap();
        let session = ledger.session("Alice", "Bob").unwrap();
        assert_eq!(session.termination_votes().len(), 1);
        assert!(!ledger.is_ended("Alice", "Bob").unwrap());

        ledger.vote_to_end("Alice", "Bob").unwrap();
        assert!(ledger.is_ended("Bob", "Alice").unwrap());
        assert_eq!(ledger.phase("Alice", "Bob").unwrap(), SessionPhase::Ended);
        assert!(!ledger.all_ended());
    }

    #[test]
    fn test_summaries() {
        let mut ledger = Ledger::new(["Bob", "Alice"]);
        ledger.start_negotiation("Bob", "Alice").unwrap();
        ledger.set_accepted_item("Alice", "Bob", diesel()).unwrap();
        let summaries = ledger.summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].pair, PairKey::new("Alice", "Bob"));
        assert_eq!(summaries[0].initiator.as_deref(), Some("Bob"));
        assert_eq!(summaries[0].accepted_item.as_deref(), Some("Diesel Engine"));
        assert_eq!(summaries[0].phase, SessionPhase::Active);
    }
}
