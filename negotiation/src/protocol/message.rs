//! Messages exchanged between negotiating agents.

use serde::{Deserialize, Serialize};

use crate::argument::Argument;
use crate::ledger::AgentId;
use crate::preferences::Item;

/// Speech-act tag of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Performative {
    Propose,
    Accept,
    AskWhy,
    Argue,
    Commit,
    QueryRef,
    InformRef,
}

impl std::fmt::Display for Performative {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Propose => write!(f, "PROPOSE"),
            Self::Accept => write!(f, "ACCEPT"),
            Self::AskWhy => write!(f, "ASK_WHY"),
            Self::Argue => write!(f, "ARGUE"),
            Self::Commit => write!(f, "COMMIT"),
            Self::QueryRef => write!(f, "QUERY_REF"),
            Self::InformRef => write!(f, "INFORM_REF"),
        }
    }
}

/// Payload of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MessageContent {
    Item(Item),
    Argument(Argument),
    Topic(String),
}

impl std::fmt::Display for MessageContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Item(item) => write!(f, "{}", item),
            Self::Argument(argument) => write!(f, "{}", argument),
            Self::Topic(topic) => write!(f, "{}", topic),
        }
    }
}

/// Topic of the QUERY_REF sent when an agent gives up defending.
pub const ITEM_TOPIC: &str = "item";

/// A message from one agent to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub from: AgentId,
    pub to: AgentId,
    pub performative: Performative,
    pub content: MessageContent,
}

impl Message {
    pub fn new(
        from: impl Into<AgentId>,
        to: impl Into<AgentId>,
        performative: Performative,
        content: MessageContent,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            performative,
            content,
        }
    }

    pub fn propose(from: &str, to: &str, item: Item) -> Self {
        Self::new(from, to, Performative::Propose, MessageContent::Item(item))
    }

    pub fn accept(from: &str, to: &str, item: Item) -> Self {
        Self::new(from, to, Performative::Accept, MessageContent::Item(item))
    }

    pub fn ask_why(from: &str, to: &str, item: Item) -> Self {
        Self::new(from, to, Performative::AskWhy, MessageContent::Item(item))
    }

    pub fn argue(from: &str, to: &str, argument: Argument) -> Self {
        Self::new(from, to, Performative::Argue, MessageContent::Argument(argument))
    }

    pub fn commit(from: &str, to: &str, item: Item) -> Self {
        Self::new(from, to, Performative::Commit, MessageContent::Item(item))
    }

    pub fn query_ref(from: &str, to: &str, topic: &str) -> Self {
        Self::new(
            from,
            to,
            Performative::QueryRef,
            MessageContent::Topic(topic.to_string()),
        )
    }

    pub fn inform_ref(from: &str, to: &str, item: Item) -> Self {
        Self::new(from, to, Performative::InformRef, MessageContent::Item(item))
    }

    pub fn item(&self) -> Option<&Item> {
        match &self.content {
            MessageContent::Item(item) => Some(item),
            _ => None,
        }
    }

    pub fn argument(&self) -> Option<&Argument> {
        match &self.content {
            MessageContent::Argument(argument) => Some(argument),
            _ => None,
        }
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {}: {}({})",
            self.from, self.to, self.performative, self.content
        )
    }
}
