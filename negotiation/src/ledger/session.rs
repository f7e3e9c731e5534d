//! Per-pair negotiation session: phase, exchange log and standing offers.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::argument::Argument;
use crate::preferences::Item;

/// Agent identifier.
pub type AgentId = String;

/// Unordered pair of agents, stored lexicographically so `(A, B)` and
/// `(B, A)` address the same session.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    first: AgentId,
    second: AgentId,
}

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            first: first.to_string(),
            second: second.to_string(),
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    pub fn contains(&self, agent: &str) -> bool {
        self.first == agent || self.second == agent
    }

    /// The other participant, if `agent` is one of the two.
    pub fn peer_of(&self, agent: &str) -> Option<&str> {
        if self.first == agent {
            Some(&self.second)
        } else if self.second == agent {
            Some(&self.first)
        } else {
            None
        }
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}<->{}", self.first, self.second)
    }
}

/// Protocol phase of a session. `Ended` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Pre-allocated, nobody has proposed yet.
    NotStarted,
    /// An initiator has opened the negotiation.
    Active,
    /// Both participants voted to end.
    Ended,
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ended)
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::Active => write!(f, "active"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

/// One entry of the exchange log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub speaker: AgentId,
    pub argument: Argument,
}

/// Full negotiation state between two agents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationSession {
    pair: PairKey,
    initiator: Option<AgentId>,
    exchange_log: Vec<ExchangeRecord>,
    proposed_by: BTreeMap<AgentId, Item>,
    accepted_item: Option<Item>,
    termination_votes: BTreeSet<AgentId>,
}

impl NegotiationSession {
    pub fn new(pair: PairKey) -> Self {
        Self {
            pair,
            initiator: None,
            exchange_log: Vec::new(),
            proposed_by: BTreeMap::new(),
            accepted_item: None,
            termination_votes: BTreeSet::new(),
        }
    }

    pub fn pair(&self) -> &PairKey {
        &self.pair
    }

    pub fn initiator(&self) -> Option<&str> {
        self.initiator.as_deref()
    }

    pub fn exchange_log(&self) -> &[ExchangeRecord] {
        &self.exchange_log
    }

    pub fn proposal_of(&self, agent: &str) -> Option<&Item> {
        self.proposed_by.get(agent)
    }

    /// Standing offers of both participants.
    pub fn standing_offers(&self) -> impl Iterator<Item = (&str, &Item)> {
        self.proposed_by.iter().map(|(a, i)| (a.as_str(), i))
    }

    pub fn accepted_item(&self) -> Option<&Item> {
        self.accepted_item.as_ref()
    }

    pub fn termination_votes(&self) -> &BTreeSet<AgentId> {
        &self.termination_votes
    }

    pub fn phase(&self) -> SessionPhase {
        if self.is_ended() {
            SessionPhase::Ended
        } else if self.initiator.is_some() {
            SessionPhase::Active
        } else {
            SessionPhase::NotStarted
        }
    }

    pub fn is_ended(&self) -> bool {
        self.termination_votes.contains(self.pair.first())
            && self.termination_votes.contains(self.pair.second())
    }

    /// First caller wins; later calls leave the initiator untouched.
    pub(crate) fn start(&mut self, initiator: &str) -> bool {
        if self.initiator.is_some() {
            return false;
        }
        self.initiator = Some(initiator.to_string());
        true
    }

    pub(crate) fn push_argument(&mut self, speaker: &str, argument: Argument) {
        self.exchange_log.push(ExchangeRecord {
            speaker: speaker.to_string(),
            argument,
        });
    }

    pub(crate) fn set_proposal(&mut self, agent: &str, item: Item) {
        self.proposed_by.insert(agent.to_string(), item);
    }

    pub(crate) fn set_accepted(&mut self, item: Item) {
        self.accepted_item = Some(item);
    }

    /// Insert a vote. Agents outside the pair are ignored so the set never
    /// exceeds two members.
    pub(crate) fn vote(&mut self, agent: &str) -> bool {
        if !self.pair.contains(agent) {
            return false;
        }
        self.termination_votes.insert(agent.to_string())
    }

    /// Compact status line.
    pub fn status_line(&self) -> String {
        format!(
            "[{}] {} | {} arguments | accepted={}",
            self.phase(),
            self.pair,
            self.exchange_log.len(),
            self.accepted_item
                .as_ref()
                .map(|i| i.name())
                .unwrap_or("-")
        )
    }
}
