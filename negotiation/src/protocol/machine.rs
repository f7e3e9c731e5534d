//! Negotiation state machine: how an agent answers each performative.
//!
//! ```text
//! PROPOSE(i)     top decile & favorite  → ACCEPT(i)
//!                top decile             → PROPOSE(favorite)
//!                otherwise              → ASK_WHY(i)
//! ASK_WHY(i)     strongest support      → ARGUE(arg)  | QUERY_REF when none left
//! ARGUE(arg)     counter-argument       → ARGUE(arg')
//!                own top                → PROPOSE(favorite)
//!                concede                → ACCEPT(..)  | QUERY_REF("item")
//! ACCEPT(i)                             → COMMIT(i)
//! COMMIT(i)      vote; not yet ended    → COMMIT(i)
//! QUERY_REF(_)                          → INFORM_REF(favorite)
//! INFORM_REF(i)                         → ACCEPT(i)
//! ```
//!
//! Sessions run `NotStarted → Active → Ended`; anything addressed to an
//! ended session is dropped.

use tracing::{debug, warn};

use super::message::{Message, Performative, ITEM_TOPIC};
use crate::argument::Argument;
use crate::error::NegotiationResult;
use crate::ledger::{AgentId, Ledger};
use crate::mailbox::MessageService;
use crate::preferences::{Item, PreferenceProvider, Preferences};
use crate::registry::{Role, RoleRegistry};
use crate::search::{strongest_support, CounterArgumentSearch, SearchOutcome};

/// An agent negotiating over a shared catalog with its private preferences.
#[derive(Debug, Clone)]
pub struct NegotiatingAgent<P = Preferences> {
    id: AgentId,
    catalog: Vec<Item>,
    preferences: P,
}

impl<P: PreferenceProvider> NegotiatingAgent<P> {
    pub fn new(id: impl Into<AgentId>, catalog: Vec<Item>, preferences: P) -> Self {
        Self {
            id: id.into(),
            catalog,
            preferences,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn catalog(&self) -> &[Item] {
        &self.catalog
    }

    pub fn preferences(&self) -> &P {
        &self.preferences
    }

    /// Most preferred catalog item.
    pub fn favorite(&self) -> Option<&Item> {
        self.preferences.most_preferred(&self.catalog)
    }

    /// One activation: answer every delivered message, then open a
    /// negotiation with every registered peer that is still silent and not
    /// started. Replies are queued on `mailbox` for the next round. A message
    /// that fails is logged and skipped; the rest of the inbox is still
    /// answered.
    pub fn step(
        &self,
        ledger: &mut Ledger,
        registry: &RoleRegistry,
        mailbox: &mut MessageService,
    ) -> NegotiationResult<()> {
        let mut silent = registry.peers_with_role(&self.id, Role::EngineNegotiator);

        for message in mailbox.receive_new_messages(&self.id) {
            silent.retain(|peer| *peer != message.from);
            match self.respond(&message, ledger) {
                Ok(replies) => replies.into_iter().for_each(|reply| mailbox.send(reply)),
                Err(e) => {
                    warn!(agent = %self.id, %message, error = %e, "Failed to handle message");
                }
            }
        }

        for peer in &silent {
            if let Some(message) = self.open(peer, ledger)? {
                mailbox.send(message);
            }
        }
        Ok(())
    }

    /// Start a negotiation with `peer` by proposing our favorite, unless the
    /// session has already started.
    pub fn open(&self, peer: &str, ledger: &mut Ledger) -> NegotiationResult<Option<Message>> {
        if ledger.has_started(&self.id, peer)? {
            return Ok(None);
        }
        let Some(favorite) = self.favorite().cloned() else {
            return Ok(None);
        };
        ledger.start_negotiation(&self.id, peer)?;
        Ok(Some(self.propose(peer, favorite, ledger)?))
    }

    /// Replies to one inbound message.
    pub fn respond(
        &self,
        message: &Message,
        ledger: &mut Ledger,
    ) -> NegotiationResult<Vec<Message>> {
        if message.to != self.id {
            warn!(agent = %self.id, %message, "Message addressed to another agent");
            return Ok(Vec::new());
        }
        let peer = message.from.as_str();
        if ledger.is_ended(&self.id, peer)? {
            debug!(agent = %self.id, %message, "Session ended, message dropped");
            return Ok(Vec::new());
        }
        debug!(agent = %self.id, %message, "Handling message");

        let reply = match message.performative {
            Performative::Propose => match self.expect_item(message) {
                Some(item) => Some(self.on_propose(peer, item, ledger)?),
                None => None,
            },
            Performative::AskWhy => match self.expect_item(message) {
                Some(item) => Some(self.on_ask_why(peer, item, ledger)?),
                None => None,
            },
            Performative::Argue => match message.argument() {
                Some(argument) if argument.is_grounded() => {
                    Some(self.on_argue(peer, argument, ledger)?)
                }
                _ => {
                    warn!(agent = %self.id, %message, "ARGUE without a grounded argument");
                    None
                }
            },
            Performative::Accept => match self.expect_item(message) {
                Some(item) => {
                    ledger.set_accepted_item(&self.id, peer, item.clone())?;
                    Some(Message::commit(&self.id, peer, item.clone()))
                }
                None => None,
            },
            Performative::Commit => match self.expect_item(message) {
                Some(item) => self.on_commit(peer, item, ledger)?,
                None => None,
            },
            Performative::QueryRef => match self.favorite().cloned() {
                Some(favorite) => {
                    ledger.record_proposal(&self.id, peer, favorite.clone())?;
                    Some(Message::inform_ref(&self.id, peer, favorite))
                }
                None => None,
            },
            Performative::InformRef => self
                .expect_item(message)
                .map(|item| Message::accept(&self.id, peer, item.clone())),
        };

        Ok(reply.into_iter().collect())
    }

    fn on_propose(
        &self,
        peer: &str,
        item: &Item,
        ledger: &mut Ledger,
    ) -> NegotiationResult<Message> {
        if self.preferences.is_among_top_decile(item, &self.catalog) {
            match self.favorite().cloned() {
                Some(favorite) if &favorite == item => {
                    return Ok(Message::accept(&self.id, peer, item.clone()));
                }
                // Our favorite is offered at most once per session.
                Some(favorite) if !ledger.has_been_proposed(&self.id, peer, &favorite)? => {
                    return self.propose(peer, favorite, ledger);
                }
                _ => {}
            }
        }
        Ok(Message::ask_why(&self.id, peer, item.clone()))
    }

    fn on_ask_why(
        &self,
        peer: &str,
        item: &Item,
        ledger: &mut Ledger,
    ) -> NegotiationResult<Message> {
        match strongest_support(&self.id, peer, item, &self.preferences, ledger)? {
            Some(argument) => self.argue(peer, argument, ledger),
            None => Ok(Message::query_ref(&self.id, peer, ITEM_TOPIC)),
        }
    }

    fn on_argue(
        &self,
        peer: &str,
        incoming: &Argument,
        ledger: &mut Ledger,
    ) -> NegotiationResult<Message> {
        let outcome =
            CounterArgumentSearch::new(&self.id, peer, &self.catalog, &self.preferences, ledger)
                .search(incoming)?;

        match outcome {
            SearchOutcome::CounterArgument(argument) => self.argue(peer, argument, ledger),
            SearchOutcome::ProposeOwnTop(item) => self.propose(peer, item, ledger),
            SearchOutcome::Concede if incoming.in_favor() => {
                Ok(Message::accept(&self.id, peer, incoming.item().clone()))
            }
            SearchOutcome::Concede => match ledger.get_proposal(peer, &self.id)? {
                Some(offer) => Ok(Message::accept(&self.id, peer, offer.clone())),
                None => Ok(Message::query_ref(&self.id, peer, ITEM_TOPIC)),
            },
        }
    }

    fn on_commit(
        &self,
        peer: &str,
        item: &Item,
        ledger: &mut Ledger,
    ) -> NegotiationResult<Option<Message>> {
        if ledger.get_accepted_item(&self.id, peer)?.is_none() {
            ledger.set_accepted_item(&self.id, peer, item.clone())?;
        }
        ledger.vote_to_end(&self.id, peer)?;
        if ledger.is_ended(&self.id, peer)? {
            return Ok(None);
        }
        Ok(Some(Message::commit(&self.id, peer, item.clone())))
    }

    /// PROPOSE `item`, registering it as our standing offer.
    fn propose(&self, peer: &str, item: Item, ledger: &mut Ledger) -> NegotiationResult<Message> {
        ledger.record_proposal(&self.id, peer, item.clone())?;
        Ok(Message::propose(&self.id, peer, item))
    }

    /// ARGUE `argument`, recording it in the exchange log.
    fn argue(
        &self,
        peer: &str,
        argument: Argument,
        ledger: &mut Ledger,
    ) -> NegotiationResult<Message> {
        ledger.record_argument(&self.id, peer, argument.clone())?;
        Ok(Message::argue(&self.id, peer, argument))
    }

    fn expect_item<'m>(&self, message: &'m Message) -> Option<&'m Item> {
        let item = message.item();
        if item.is_none() {
            warn!(agent = %self.id, %message, "Expected an item");
        }
        item
    }
}
