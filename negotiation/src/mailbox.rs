//! In-memory message transport with one-round latency.
//!
//! Messages sent during a round sit in `pending` until the scheduler calls
//! [`MessageService::dispatch`] at the start of the next round. Delivery is
//! in send order, so each recipient sees a given sender's messages in order.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ledger::AgentId;
use crate::protocol::Message;

/// A message together with the round it was delivered in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveredMessage {
    pub round: u32,
    pub message: Message,
}

/// Mailbox service shared by a cohort.
#[derive(Debug, Default)]
pub struct MessageService {
    pending: Vec<Message>,
    inboxes: HashMap<AgentId, VecDeque<Message>>,
    transcript: Vec<DeliveredMessage>,
}

impl MessageService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message for delivery at the next dispatch.
    pub fn send(&mut self, message: Message) {
        debug!(%message, "Message queued");
        self.pending.push(message);
    }

    /// Deliver everything queued so far. Returns the number delivered.
    pub fn dispatch(&mut self, round: u32) -> usize {
        let delivered = self.pending.len();
        for message in self.pending.drain(..) {
            self.transcript.push(DeliveredMessage {
                round,
                message: message.clone(),
            });
            self.inboxes
                .entry(message.to.clone())
                .or_default()
                .push_back(message);
        }
        if delivered > 0 {
            debug!(round, delivered, "Messages dispatched");
        }
        delivered
    }

    /// Drain `agent`'s inbox.
    pub fn receive_new_messages(&mut self, agent: &str) -> Vec<Message> {
        self.inboxes
            .get_mut(agent)
            .map(|inbox| inbox.drain(..).collect())
            .unwrap_or_default()
    }

    /// Messages queued or delivered but not yet read.
    pub fn in_flight(&self) -> usize {
        self.pending.len() + self.inboxes.values().map(VecDeque::len).sum::<usize>()
    }

    /// Every delivered message, in delivery order.
    pub fn transcript(&self) -> &[DeliveredMessage] {
        &self.transcript
    }

    pub fn into_transcript(self) -> Vec<DeliveredMessage> {
        self.transcript
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::Item;

    fn diesel() -> Item {
        Item::new("Diesel Engine", "An engine that works with fuel")
    }

    #[test]
    fn test_one_round_latency() {
        let mut mailbox = MessageService::new();
        mailbox.send(Message::propose("Alice", "Bob", diesel()));
        assert!(mailbox.receive_new_messages("Bob").is_empty());
        assert_eq!(mailbox.in_flight(), 1);

        assert_eq!(mailbox.dispatch(2), 1);
        let inbox = mailbox.receive_new_messages("Bob");
        assert_eq!(inbox, vec![Message::propose("Alice", "Bob", diesel())]);
        assert!(mailbox.receive_new_messages("Bob").is_empty());
        assert_eq!(mailbox.in_flight(), 0);
    }

    #[test]
    fn test_in_order_per_sender() {
        let mut mailbox = MessageService::new();
        mailbox.send(Message::propose("Alice", "Bob", diesel()));
        mailbox.send(Message::commit("Alice", "Bob", diesel()));
        mailbox.send(Message::accept("Hugo", "Alice", diesel()));
        mailbox.dispatch(1);

        let bob = mailbox.receive_new_messages("Bob");
        assert_eq!(bob.len(), 2);
        assert_eq!(bob[0], Message::propose("Alice", "Bob", diesel()));
        assert_eq!(bob[1], Message::commit("Alice", "Bob", diesel()));
        assert_eq!(mailbox.receive_new_messages("Alice").len(), 1);
    }

    #[test]
    fn test_transcript_records_rounds() {
        let mut mailbox = MessageService::new();
        mailbox.send(Message::propose("Alice", "Bob", diesel()));
        mailbox.dispatch(1);
        mailbox.send(Message::accept("Bob", "Alice", diesel()));
        mailbox.dispatch(2);
        let rounds: Vec<u32> = mailbox.transcript().iter().map(|d| d.round).collect();
        assert_eq!(rounds, vec![1, 2]);
        assert_eq!(mailbox.into_transcript().len(), 2);
    }
}
