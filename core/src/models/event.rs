//! Market event log
//!
//! Events record everything observable that happened during a session, in
//! order, for replay and audit. They carry ids rather than snapshots; the
//! authoritative state lives in [`MarketState`](crate::MarketState).

use serde::{Deserialize, Serialize};

use crate::models::chemical::Chemical;

/// A single observable market event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// A team posted a buy or sell listing
    ListingCreated {
        pass: u64,
        listing_id: String,
        team_id: String,
        chemical: Chemical,
    },

    /// A team opened a negotiation with an initial offer
    NegotiationInitiated {
        pass: u64,
        negotiation_id: String,
        initiator_id: String,
        responder_id: String,
        chemical: Chemical,
    },

    /// A party countered with new terms
    OfferCountered {
        pass: u64,
        negotiation_id: String,
        actor_id: String,
        quantity: f64,
        price: f64,
    },

    /// A party accepted the latest offer; the trade executed
    NegotiationAccepted {
        pass: u64,
        negotiation_id: String,
        actor_id: String,
    },

    /// A party walked away; nothing moved
    NegotiationRejected {
        pass: u64,
        negotiation_id: String,
        actor_id: String,
    },

    /// A party posted a non-binding displeasure signal
    ReactionPosted {
        pass: u64,
        negotiation_id: String,
        intensity: u8,
    },

    /// Chemicals and funds changed hands
    TradeExecuted {
        pass: u64,
        negotiation_id: String,
        seller_id: String,
        buyer_id: String,
        chemical: Chemical,
        quantity: f64,
        price: f64,
    },

    /// An NPC pass completed
    NpcPass {
        pass: u64,
        actions_taken: usize,
        responses_taken: usize,
    },
}

impl Event {
    /// Pass number the event occurred in
    pub fn pass(&self) -> u64 {
        match self {
            Event::ListingCreated { pass, .. }
            | Event::NegotiationInitiated { pass, .. }
            | Event::OfferCountered { pass, .. }
            | Event::NegotiationAccepted { pass, .. }
            | Event::NegotiationRejected { pass, .. }
            | Event::ReactionPosted { pass, .. }
            | Event::TradeExecuted { pass, .. }
            | Event::NpcPass { pass, .. } => *pass,
        }
    }
}

/// Append-only, ordered event log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// All events in insertion order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events recorded during one pass
    pub fn events_for_pass(&self, pass: u64) -> Vec<&Event> {
        self.events.iter().filter(|e| e.pass() == pass).collect()
    }
}
