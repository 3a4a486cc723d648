//! Negotiation model
//!
//! A negotiation is a bilateral, turn-taking offer/counter-offer exchange
//! and the only entity that can change ownership of chemicals and funds.
//!
//! # Lifecycle
//!
//! ```text
//! pending --counter--> pending   (appends an offer, flips last_offer_by)
//! pending --accept---> accepted  (terminal; executes the trade)
//! pending --reject---> rejected  (terminal; nothing moves)
//! ```
//!
//! Both terminal states are immutable: no further offers, reactions, or
//! status changes are accepted.
//!
//! # Roles
//!
//! The negotiation `type` describes the *initiator's* stance and is fixed at
//! creation: for `Buy` the initiator is the buyer and the responder the
//! seller; for `Sell` the reverse. The role assignment never changes even
//! though price and quantity move across offers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::chemical::Chemical;

/// Maximum reaction intensity
pub const MAX_REACTION_INTENSITY: u8 = 100;

/// The initiator's stance, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NegotiationType {
    /// Initiator wants to buy; responder is the seller
    Buy,
    /// Initiator wants to sell; responder is the buyer
    Sell,
}

/// Negotiation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NegotiationStatus {
    /// Open: either party (except whoever made the latest offer) may act
    Pending,

    /// Terminal: the trade executed against the latest offer
    Accepted {
        /// Pass number when accepted
        pass: u64,
    },

    /// Terminal: one side walked away; nothing moved
    Rejected {
        /// Pass number when rejected
        pass: u64,
    },
}

/// A single price/quantity proposal in the offer sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    /// Gallons proposed
    pub quantity: f64,

    /// Dollars per gallon proposed
    pub price: f64,

    /// Team that proposed this offer
    pub proposed_by: String,
}

impl Offer {
    /// Total value of the offer (quantity × price)
    pub fn total(&self) -> f64 {
        self.quantity * self.price
    }
}

/// A non-binding displeasure signal attached to a negotiation
///
/// Agents use reactions to signal how far apart the parties are without
/// altering the terms on the table. Reactions never change status or turn
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    /// Intensity in [0, 100]
    pub intensity: u8,

    /// Pass number when posted
    pub pass: u64,
}

/// Errors raised by negotiation state transitions
#[derive(Debug, Error, PartialEq)]
pub enum NegotiationError {
    #[error("Negotiation is no longer pending")]
    NotPending,

    #[error("Party {actor} may not respond to its own latest offer")]
    OwnLatestOffer { actor: String },

    #[error("{actor} is not a party to this negotiation")]
    NotAParty { actor: String },

    #[error("Offer must have positive finite quantity and non-negative finite price")]
    InvalidOffer,
}

/// A bilateral offer/counter-offer exchange
///
/// # Example
/// ```
/// use chemtrade_core_rs::{Chemical, Negotiation, NegotiationType, Offer};
///
/// let n = Negotiation::new(
///     "TEAM_B".to_string(),
///     "TEAM_A".to_string(),
///     Chemical::C,
///     NegotiationType::Buy,
///     Offer { quantity: 100.0, price: 5.0, proposed_by: "TEAM_B".to_string() },
///     None,
///     0,
/// );
/// assert!(n.is_pending());
/// assert_eq!(n.buyer_id(), "TEAM_B");
/// assert_eq!(n.seller_id(), "TEAM_A");
/// assert_eq!(n.round(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Negotiation {
    /// Unique negotiation identifier (UUID)
    id: String,

    /// Team that opened the negotiation (fixed)
    initiator_id: String,

    /// Team the negotiation was opened against (fixed)
    responder_id: String,

    /// Chemical under negotiation
    chemical: Chemical,

    /// Initiator's stance (fixed)
    kind: NegotiationType,

    /// Append-only ordered offer sequence; never empty
    offers: Vec<Offer>,

    /// Current status
    status: NegotiationStatus,

    /// Team that appended the most recent offer
    last_offer_by: String,

    /// Listing that prompted this negotiation, if any
    listing_id: Option<String>,

    /// Non-binding reactions
    reactions: Vec<Reaction>,

    /// Pass number when opened (for deterministic ordering)
    opened_pass: u64,
}

impl Negotiation {
    /// Open a new pending negotiation with an initial offer
    ///
    /// `initial_offer.proposed_by` is overwritten with the initiator id;
    /// `last_offer_by` starts as the initiator.
    pub fn new(
        initiator_id: String,
        responder_id: String,
        chemical: Chemical,
        kind: NegotiationType,
        mut initial_offer: Offer,
        listing_id: Option<String>,
        opened_pass: u64,
    ) -> Self {
        initial_offer.proposed_by = initiator_id.clone();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            last_offer_by: initiator_id.clone(),
            initiator_id,
            responder_id,
            chemical,
            kind,
            offers: vec![initial_offer],
            status: NegotiationStatus::Pending,
            listing_id,
            reactions: Vec::new(),
            opened_pass,
        }
    }

    /// Negotiation identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Initiating team
    pub fn initiator_id(&self) -> &str {
        &self.initiator_id
    }

    /// Responding team
    pub fn responder_id(&self) -> &str {
        &self.responder_id
    }

    /// Chemical under negotiation
    pub fn chemical(&self) -> Chemical {
        self.chemical
    }

    /// Initiator's stance
    pub fn kind(&self) -> NegotiationType {
        self.kind
    }

    /// Current status
    pub fn status(&self) -> NegotiationStatus {
        self.status
    }

    /// Team that appended the most recent offer
    pub fn last_offer_by(&self) -> &str {
        &self.last_offer_by
    }

    /// Listing back-reference, if the negotiation was prompted by one
    pub fn listing_id(&self) -> Option<&str> {
        self.listing_id.as_deref()
    }

    /// Full offer history, oldest first
    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    /// Reactions posted so far
    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    /// Pass number when the negotiation was opened
    pub fn opened_pass(&self) -> u64 {
        self.opened_pass
    }

    /// The offer currently on the table
    pub fn latest_offer(&self) -> &Offer {
        // offers is never empty: constructed with one and append-only
        self.offers.last().expect("negotiation has no offers")
    }

    /// Number of offers exchanged so far (round 1 = the opening offer)
    pub fn round(&self) -> usize {
        self.offers.len()
    }

    /// Whether the negotiation is still open
    pub fn is_pending(&self) -> bool {
        self.status == NegotiationStatus::Pending
    }

    /// Whether `team_id` is one of the two fixed parties
    pub fn is_party(&self, team_id: &str) -> bool {
        self.initiator_id == team_id || self.responder_id == team_id
    }

    /// The buying team, derived from the fixed role assignment
    pub fn buyer_id(&self) -> &str {
        match self.kind {
            NegotiationType::Buy => &self.initiator_id,
            NegotiationType::Sell => &self.responder_id,
        }
    }

    /// The selling team, derived from the fixed role assignment
    pub fn seller_id(&self) -> &str {
        match self.kind {
            NegotiationType::Buy => &self.responder_id,
            NegotiationType::Sell => &self.initiator_id,
        }
    }

    /// The other party relative to `team_id`, if `team_id` is a party
    pub fn counterparty_of(&self, team_id: &str) -> Option<&str> {
        if self.initiator_id == team_id {
            Some(&self.responder_id)
        } else if self.responder_id == team_id {
            Some(&self.initiator_id)
        } else {
            None
        }
    }

    /// Whether `team_id` may respond right now
    ///
    /// True only while pending, for a party that did not make the latest
    /// offer.
    pub fn can_respond(&self, team_id: &str) -> bool {
        self.is_pending() && self.is_party(team_id) && self.last_offer_by != team_id
    }

    /// Guard shared by every response transition
    fn check_response(&self, actor: &str) -> Result<(), NegotiationError> {
        if !self.is_party(actor) {
            return Err(NegotiationError::NotAParty {
                actor: actor.to_string(),
            });
        }
        if !self.is_pending() {
            return Err(NegotiationError::NotPending);
        }
        if self.last_offer_by == actor {
            return Err(NegotiationError::OwnLatestOffer {
                actor: actor.to_string(),
            });
        }
        Ok(())
    }

    /// Append a counter-offer and flip the turn
    ///
    /// Fails if the negotiation is terminal, if `actor` made the latest
    /// offer, or if the proposal is malformed.
    pub fn append_offer(
        &mut self,
        actor: &str,
        quantity: f64,
        price: f64,
    ) -> Result<(), NegotiationError> {
        self.check_response(actor)?;
        if !quantity.is_finite() || quantity <= 0.0 || !price.is_finite() || price < 0.0 {
            return Err(NegotiationError::InvalidOffer);
        }
        self.offers.push(Offer {
            quantity,
            price,
            proposed_by: actor.to_string(),
        });
        self.last_offer_by = actor.to_string();
        Ok(())
    }

    /// Transition to `accepted`
    ///
    /// The caller (exchange engine) performs the actual transfer before
    /// invoking this; the same preconditions as `append_offer` apply.
    pub fn mark_accepted(&mut self, actor: &str, pass: u64) -> Result<(), NegotiationError> {
        self.check_response(actor)?;
        self.status = NegotiationStatus::Accepted { pass };
        Ok(())
    }

    /// Transition to `rejected`; nothing moves
    pub fn mark_rejected(&mut self, actor: &str, pass: u64) -> Result<(), NegotiationError> {
        self.check_response(actor)?;
        self.status = NegotiationStatus::Rejected { pass };
        Ok(())
    }

    /// Append a non-binding reaction
    ///
    /// Intensity is capped at [`MAX_REACTION_INTENSITY`]. Allowed only while
    /// pending; never changes status or `last_offer_by`.
    pub fn add_reaction(&mut self, intensity: u8, pass: u64) -> Result<(), NegotiationError> {
        if !self.is_pending() {
            return Err(NegotiationError::NotPending);
        }
        self.reactions.push(Reaction {
            intensity: intensity.min(MAX_REACTION_INTENSITY),
            pass,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn negotiation(kind: NegotiationType) -> Negotiation {
        Negotiation::new(
            "TEAM_B".to_string(),
            "TEAM_A".to_string(),
            Chemical::C,
            kind,
            Offer {
                quantity: 100.0,
                price: 5.0,
                proposed_by: "TEAM_B".to_string(),
            },
            None,
            0,
        )
    }

    #[test]
    fn test_roles_fixed_by_type() {
        let buy = negotiation(NegotiationType::Buy);
        assert_eq!(buy.buyer_id(), "TEAM_B");
        assert_eq!(buy.seller_id(), "TEAM_A");

        let sell = negotiation(NegotiationType::Sell);
        assert_eq!(sell.buyer_id(), "TEAM_A");
        assert_eq!(sell.seller_id(), "TEAM_B");
    }

    #[test]
    fn test_cannot_respond_to_own_latest_offer() {
        let mut n = negotiation(NegotiationType::Buy);
        assert!(!n.can_respond("TEAM_B"));
        let err = n.append_offer("TEAM_B", 100.0, 5.5).unwrap_err();
        assert!(matches!(err, NegotiationError::OwnLatestOffer { .. }));
    }

    #[test]
    fn test_counter_flips_turn() {
        let mut n = negotiation(NegotiationType::Buy);
        n.append_offer("TEAM_A", 100.0, 6.0).unwrap();
        assert_eq!(n.last_offer_by(), "TEAM_A");
        assert_eq!(n.round(), 2);
        assert_eq!(n.latest_offer().price, 6.0);
        assert!(n.can_respond("TEAM_B"));
        assert!(!n.can_respond("TEAM_A"));
    }

    #[test]
    fn test_terminal_states_are_immutable() {
        let mut n = negotiation(NegotiationType::Buy);
        n.mark_rejected("TEAM_A", 1).unwrap();

        assert_eq!(n.append_offer("TEAM_B", 1.0, 1.0), Err(NegotiationError::NotPending));
        assert_eq!(n.mark_accepted("TEAM_B", 2), Err(NegotiationError::NotPending));
        assert_eq!(n.add_reaction(10, 2), Err(NegotiationError::NotPending));
    }

    #[test]
    fn test_non_party_rejected() {
        let mut n = negotiation(NegotiationType::Sell);
        let err = n.append_offer("TEAM_X", 10.0, 1.0).unwrap_err();
        assert!(matches!(err, NegotiationError::NotAParty { .. }));
    }

    #[test]
    fn test_invalid_offer_rejected() {
        let mut n = negotiation(NegotiationType::Buy);
        assert_eq!(
            n.append_offer("TEAM_A", 0.0, 5.0),
            Err(NegotiationError::InvalidOffer)
        );
        assert_eq!(
            n.append_offer("TEAM_A", 10.0, -1.0),
            Err(NegotiationError::InvalidOffer)
        );
        assert_eq!(n.round(), 1); // Nothing appended
    }

    #[test]
    fn test_reaction_capped_and_neutral() {
        let mut n = negotiation(NegotiationType::Buy);
        n.add_reaction(250, 1).unwrap();
        assert_eq!(n.reactions()[0].intensity, MAX_REACTION_INTENSITY);
        // Turn order untouched
        assert_eq!(n.last_offer_by(), "TEAM_B");
        assert!(n.is_pending());
    }
}
