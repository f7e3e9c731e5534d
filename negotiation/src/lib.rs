//! Argumentation-based pairwise negotiation
//!
//! Agents holding private preferences over a shared catalog negotiate in
//! pairs until they agree on one item. Instead of bare offers they exchange
//! arguments: claims for or against an item, grounded in ratings and in the
//! relative importance of criteria.
//!
//! # Components
//!
//! - [`argument`]: typed premises and arguments, with structural equality
//! - [`ledger`]: per-pair sessions, exchange logs, standing offers and
//!   termination votes, plus JSON checkpoints
//! - [`search`]: counter-argument search (attack, defend, counter-propose
//!   or concede)
//! - [`protocol`]: messages and the per-agent state machine
//! - [`simulation`]: round-based scheduler over a [`mailbox`] and a
//!   [`registry`], with preferences drawn from a [`selector`]
//!
//! # Usage
//!
//! ```no_run
//! use negotiation::{Item, RepetitionPolicy, SeededSelector, Simulation};
//!
//! let catalog = vec![
//!     Item::new("Electric Engine", "An engine that works with electricity"),
//!     Item::new("Diesel Engine", "An engine that works with fuel"),
//! ];
//! let selector = SeededSelector::new(42);
//! let mut sim = Simulation::new(["Alice", "Bob"], catalog, RepetitionPolicy::Exact, selector);
//! let report = sim.run(50)?;
//! println!("{}", report.status_line());
//! # Ok::<(), negotiation::NegotiationError>(())
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod argument;
pub mod error;
pub mod ledger;
pub mod mailbox;
pub mod preferences;
pub mod protocol;
pub mod registry;
pub mod search;
pub mod selector;
pub mod simulation;

pub use argument::{Argument, RankingPremise, RatingPremise};
pub use error::{CheckpointError, NegotiationError, NegotiationResult};
pub use ledger::{Ledger, LedgerCheckpoint, PairKey, RepetitionPolicy, SessionPhase, SessionSummary};
pub use mailbox::{DeliveredMessage, MessageService};
pub use preferences::{CriterionName, Item, PreferenceProvider, Preferences, Value};
pub use protocol::{Message, NegotiatingAgent, Performative};
pub use registry::{Role, RoleRegistry};
pub use search::{CounterArgumentSearch, SearchOutcome};
pub use selector::{FirstSelector, SeededSelector, Selector};
pub use simulation::{Simulation, SimulationReport, StopReason};
