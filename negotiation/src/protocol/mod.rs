//! Negotiation protocol: wire messages and the per-agent state machine.

pub mod machine;
pub mod message;

pub use machine::NegotiatingAgent;
pub use message::{Message, MessageContent, Performative, ITEM_TOPIC};
