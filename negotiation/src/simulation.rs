//! Round-based scheduler for a cohort of negotiating agents.
//!
//! Each round delivers the messages sent during the previous one, then
//! activates every agent once in an order drawn from the [`Selector`]. The
//! ledger is lent to one agent at a time.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::error::NegotiationResult;
use crate::ledger::{Ledger, RepetitionPolicy, SessionSummary};
use crate::mailbox::{DeliveredMessage, MessageService};
use crate::preferences::{Item, Preferences};
use crate::protocol::NegotiatingAgent;
use crate::registry::{Role, RoleRegistry};
use crate::selector::{SeededSelector, Selector};

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every session reached `Ended`.
    AllEnded,
    /// No message in flight and nothing left to open.
    Quiescent,
    /// The round cap was hit first.
    RoundLimit,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AllEnded => write!(f, "all_ended"),
            Self::Quiescent => write!(f, "quiescent"),
            Self::RoundLimit => write!(f, "round_limit"),
        }
    }
}

/// Outcome of a simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub rounds: u32,
    pub stop_reason: StopReason,
    pub sessions: Vec<SessionSummary>,
    pub transcript: Vec<DeliveredMessage>,
}

impl SimulationReport {
    /// Sessions that ended with an agreed item.
    pub fn agreements(&self) -> usize {
        self.sessions
            .iter()
            .filter(|s| s.phase.is_terminal() && s.accepted_item.is_some())
            .count()
    }

    pub fn status_line(&self) -> String {
        format!(
            "{} rounds ({}), {}/{} sessions agreed, {} messages",
            self.rounds,
            self.stop_reason,
            self.agreements(),
            self.sessions.len(),
            self.transcript.len()
        )
    }
}

/// A cohort of agents, their shared ledger and the transport between them.
pub struct Simulation<S: Selector = SeededSelector> {
    agents: Vec<NegotiatingAgent>,
    ledger: Ledger,
    mailbox: MessageService,
    registry: RoleRegistry,
    selector: S,
    round: u32,
}

impl<S: Selector> Simulation<S> {
    /// Cohort with preferences drawn from `selector`. Duplicate names are
    /// dropped, keeping the first.
    pub fn new<I, N>(
        names: I,
        catalog: Vec<Item>,
        policy: RepetitionPolicy,
        mut selector: S,
    ) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let mut seen = HashSet::new();
        let agents = names
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| seen.insert(name.clone()))
            .map(|name| {
                let preferences = Preferences::generate(&catalog, &mut selector);
                NegotiatingAgent::new(name, catalog.clone(), preferences)
            })
            .collect();
        Self::from_agents(agents, policy, selector)
    }

    /// Cohort of pre-built agents.
    pub fn from_agents(
        agents: Vec<NegotiatingAgent>,
        policy: RepetitionPolicy,
        selector: S,
    ) -> Self {
        let ledger = Ledger::with_policy(agents.iter().map(|a| a.id().to_string()), policy);
        let mut registry = RoleRegistry::new();
        registry.add_role(Role::EngineNegotiator);
        for agent in &agents {
            registry.attach_role(Role::EngineNegotiator, agent.id());
        }
        debug!(agents = agents.len(), "Simulation created");

        Self {
            agents,
            ledger,
            mailbox: MessageService::new(),
            registry,
            selector,
            round: 0,
        }
    }

    pub fn agents(&self) -> &[NegotiatingAgent] {
        &self.agents
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Run one round: deliver, then activate every agent once.
    pub fn step(&mut self) -> NegotiationResult<()> {
        self.round += 1;
        let span = info_span!("round", round = self.round);
        let _guard = span.enter();

        self.mailbox.dispatch(self.round);

        let mut order: Vec<usize> = (0..self.agents.len()).collect();
        self.selector.shuffle(&mut order);
        for index in order {
            self.agents[index].step(&mut self.ledger, &self.registry, &mut self.mailbox)?;
        }
        Ok(())
    }

    /// Step until every session ends, nothing moves any more, or
    /// `max_rounds` rounds have run in total.
    pub fn run(&mut self, max_rounds: u32) -> NegotiationResult<SimulationReport> {
        let mut stop_reason = StopReason::RoundLimit;
        while self.round < max_rounds {
            self.step()?;
            if self.ledger.all_ended() {
                stop_reason = StopReason::AllEnded;
                break;
            }
            if self.mailbox.in_flight() == 0 {
                stop_reason = StopReason::Quiescent;
                break;
            }
        }

        let report = self.report(stop_reason);
        info!(
            rounds = report.rounds,
            stop_reason = %report.stop_reason,
            agreements = report.agreements(),
            "Simulation finished"
        );
        Ok(report)
    }

    fn report(&self, stop_reason: StopReason) -> SimulationReport {
        SimulationReport {
            rounds: self.round,
            stop_reason,
            sessions: self.ledger.summaries(),
            transcript: self.mailbox.transcript().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::SessionPhase;
    use crate::protocol::Performative;
    use crate::selector::FirstSelector;

    fn engines() -> Vec<Item> {
        vec![
            Item::new("Electric Engine", "An engine that works with electricity"),
            Item::new("Diesel Engine", "An engine that works with fuel"),
            Item::new("Hydrogen Engine", "An engine that works with hydrogen"),
        ]
    }

    #[test]
    fn test_identical_preferences_agree_directly() {
        // FirstSelector gives every agent the same preferences, so the
        // first proposal is everyone's favorite.
        let mut sim = Simulation::new(
            ["Alice", "Bob"],
            engines(),
            RepetitionPolicy::Exact,
            FirstSelector,
        );
        let report = sim.run(10).unwrap();

        assert_eq!(report.stop_reason, StopReason::AllEnded);
        assert_eq!(report.agreements(), 1);
        let performatives: Vec<Performative> = report
            .transcript
            .iter()
            .map(|d| d.message.performative)
            .collect();
        assert_eq!(
            performatives,
            vec![
                Performative::Propose,
                Performative::Accept,
                Performative::Commit,
                Performative::Commit,
            ]
        );
        // The closing COMMIT is read in round five.
        assert_eq!(report.rounds, 5);
    }

    #[test]
    fn test_messages_have_one_round_latency() {
        let mut sim = Simulation::new(
            ["Alice", "Bob"],
            engines(),
            RepetitionPolicy::Exact,
            FirstSelector,
        );
        sim.step().unwrap();
        assert!(sim.ledger().has_started("Alice", "Bob").unwrap());
        // The opening proposal is still in flight after the first round.
        assert_eq!(sim.mailbox.transcript().len(), 0);
        sim.step().unwrap();
        assert_eq!(sim.mailbox.transcript().len(), 1);
        assert_eq!(sim.mailbox.transcript()[0].round, 2);
    }

    #[test]
    fn test_duplicate_names_are_dropped() {
        let sim = Simulation::new(
            ["Alice", "Bob", "Alice"],
            engines(),
            RepetitionPolicy::Exact,
            FirstSelector,
        );
        assert_eq!(sim.agents().len(), 2);
        assert_eq!(sim.ledger().sessions().count(), 1);
    }

    #[test]
    fn test_single_agent_is_quiescent() {
        let mut sim = Simulation::new(["Alice"], engines(), RepetitionPolicy::Exact, FirstSelector);
        let report = sim.run(10).unwrap();
        // No pairs at all, so every (zero) session has ended.
        assert_eq!(report.stop_reason, StopReason::AllEnded);
        assert_eq!(report.rounds, 1);
        assert!(report.sessions.is_empty());
    }

    #[test]
    fn test_empty_catalog_is_quiescent() {
        let mut sim = Simulation::new(
            ["Alice", "Bob"],
            Vec::new(),
            RepetitionPolicy::Exact,
            FirstSelector,
        );
        let report = sim.run(10).unwrap();
        assert_eq!(report.stop_reason, StopReason::Quiescent);
        assert_eq!(report.sessions[0].phase, SessionPhase::NotStarted);
    }

    #[test]
    fn test_round_limit() {
        let mut sim = Simulation::new(
            ["Alice", "Bob"],
            engines(),
            RepetitionPolicy::Exact,
            FirstSelector,
        );
        let report = sim.run(2).unwrap();
        assert_eq!(report.stop_reason, StopReason::RoundLimit);
        assert_eq!(report.rounds, 2);
        assert_eq!(report.agreements(), 0);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let run = |seed| {
            Simulation::new(
                ["Alice", "Bob", "Carol"],
                engines(),
                RepetitionPolicy::Exact,
                SeededSelector::new(seed),
            )
            .run(200)
            .unwrap()
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn test_report_status_line() {
        let mut sim = Simulation::new(
            ["Alice", "Bob"],
            engines(),
            RepetitionPolicy::Exact,
            FirstSelector,
        );
        let report = sim.run(10).unwrap();
        assert_eq!(
            report.status_line(),
            "5 rounds (all_ended), 1/1 sessions agreed, 4 messages"
        );
    }
}
