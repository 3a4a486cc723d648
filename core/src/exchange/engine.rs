//! Market operations
//!
//! Every function follows the same shape: resolve and validate everything
//! first, then mutate. Acceptance is the only operation that moves
//! chemicals and funds, and it moves both or neither.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::chemical::Chemical;
use crate::models::inventory::InventoryError;
use crate::models::listing::{Listing, ListingDirection};
use crate::models::negotiation::{Negotiation, NegotiationError, NegotiationType, Offer};
use crate::models::state::MarketState;
use crate::models::team::TeamError;

/// Errors raised by market operations
#[derive(Debug, Error, PartialEq)]
pub enum ExchangeError {
    #[error("Negotiation {id} not found")]
    NegotiationNotFound { id: String },

    #[error("Team {id} not found")]
    TeamNotFound { id: String },

    #[error("Listing {id} not found or closed")]
    ListingNotFound { id: String },

    #[error("Negotiation is no longer pending")]
    NotPending,

    #[error("Party {actor} may not respond to its own latest offer")]
    OwnLatestOffer { actor: String },

    #[error("{actor} is not a party to this negotiation")]
    NotAParty { actor: String },

    #[error("A team cannot negotiate with itself")]
    SelfNegotiation,

    #[error("A pending negotiation for {chemical} already exists between {team_a} and {team_b}")]
    DuplicatePending {
        team_a: String,
        team_b: String,
        chemical: Chemical,
    },

    #[error("Offer must have positive finite quantity and non-negative finite price")]
    InvalidOffer,

    #[error("Seller holds {available} gal of {chemical}, trade needs {requested}")]
    InsufficientInventory {
        chemical: Chemical,
        requested: f64,
        available: f64,
    },

    #[error("Buyer holds ${available}, trade needs ${required}")]
    InsufficientFunds { required: f64, available: f64 },
}

impl From<NegotiationError> for ExchangeError {
    fn from(err: NegotiationError) -> Self {
        match err {
            NegotiationError::NotPending => ExchangeError::NotPending,
            NegotiationError::OwnLatestOffer { actor } => ExchangeError::OwnLatestOffer { actor },
            NegotiationError::NotAParty { actor } => ExchangeError::NotAParty { actor },
            NegotiationError::InvalidOffer => ExchangeError::InvalidOffer,
        }
    }
}

impl From<TeamError> for ExchangeError {
    fn from(err: TeamError) -> Self {
        match err {
            TeamError::InsufficientFunds {
                required,
                available,
            } => ExchangeError::InsufficientFunds {
                required,
                available,
            },
            TeamError::Inventory(InventoryError::Insufficient {
                chemical,
                requested,
                available,
            }) => ExchangeError::InsufficientInventory {
                chemical,
                requested,
                available,
            },
            TeamError::Inventory(InventoryError::InvalidQuantity { .. }) => {
                ExchangeError::InvalidOffer
            }
        }
    }
}

/// Record of an executed trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeReceipt {
    /// Negotiation the trade settled
    pub negotiation_id: String,

    /// Team that received chemicals and paid funds
    pub buyer_id: String,

    /// Team that shipped chemicals and received funds
    pub seller_id: String,

    /// Chemical traded
    pub chemical: Chemical,

    /// Gallons transferred
    pub quantity: f64,

    /// Dollars per gallon
    pub price: f64,

    /// Total funds transferred (quantity × price)
    pub total: f64,
}

fn validate_offer_terms(quantity: f64, price: f64) -> Result<(), ExchangeError> {
    if !quantity.is_finite() || quantity <= 0.0 || !price.is_finite() || price < 0.0 {
        return Err(ExchangeError::InvalidOffer);
    }
    Ok(())
}

/// Post a buy or sell listing
///
/// # Arguments
/// * `state` - The market to post into
/// * `team_id` - Posting team
/// * `chemical` - Chemical advertised
/// * `direction` - Buy or sell
/// * `quantity` - Optional gallons on offer or wanted
/// * `price_bound` - Optional asking price (sell) or price ceiling (buy)
/// * `pass` - Current pass number
///
/// # Returns
/// The new listing id. Listings are advertisements only; they reserve
/// nothing, so no inventory or funds check happens here.
pub fn create_listing(
    state: &mut MarketState,
    team_id: &str,
    chemical: Chemical,
    direction: ListingDirection,
    quantity: Option<f64>,
    price_bound: Option<f64>,
    pass: u64,
) -> Result<String, ExchangeError> {
    if state.get_team(team_id).is_none() {
        return Err(ExchangeError::TeamNotFound {
            id: team_id.to_string(),
        });
    }
    if let Some(q) = quantity {
        if !q.is_finite() || q <= 0.0 {
            return Err(ExchangeError::InvalidOffer);
        }
    }
    if let Some(p) = price_bound {
        if !p.is_finite() || p < 0.0 {
            return Err(ExchangeError::InvalidOffer);
        }
    }

    let listing = Listing::new(
        team_id.to_string(),
        chemical,
        direction,
        quantity,
        price_bound,
        pass,
    );
    let id = listing.id().to_string();
    state.create_listing(listing);
    Ok(id)
}

/// Open a negotiation with an initial offer
///
/// # Arguments
/// * `state` - The market
/// * `initiator_id` - Team opening the negotiation
/// * `responder_id` - Team being approached
/// * `chemical` - Chemical under negotiation
/// * `kind` - Initiator's stance (buy or sell)
/// * `quantity` / `price` - Initial offer terms
/// * `listing_id` - Listing that prompted this, if any
/// * `pass` - Current pass number
///
/// # Returns
/// The new negotiation id. At most one pending negotiation may exist
/// between the same pair of teams for the same chemical, in either
/// direction.
#[allow(clippy::too_many_arguments)]
pub fn initiate_negotiation(
    state: &mut MarketState,
    initiator_id: &str,
    responder_id: &str,
    chemical: Chemical,
    kind: NegotiationType,
    quantity: f64,
    price: f64,
    listing_id: Option<String>,
    pass: u64,
) -> Result<String, ExchangeError> {
    if initiator_id == responder_id {
        return Err(ExchangeError::SelfNegotiation);
    }
    if state.get_team(initiator_id).is_none() {
        return Err(ExchangeError::TeamNotFound {
            id: initiator_id.to_string(),
        });
    }
    if state.get_team(responder_id).is_none() {
        return Err(ExchangeError::TeamNotFound {
            id: responder_id.to_string(),
        });
    }
    validate_offer_terms(quantity, price)?;
    if state.has_pending_between(initiator_id, responder_id, chemical) {
        return Err(ExchangeError::DuplicatePending {
            team_a: initiator_id.to_string(),
            team_b: responder_id.to_string(),
            chemical,
        });
    }
    if let Some(ref id) = listing_id {
        match state.get_listing(id) {
            Some(listing) if listing.is_open() => {}
            _ => return Err(ExchangeError::ListingNotFound { id: id.clone() }),
        }
    }

    let negotiation = Negotiation::new(
        initiator_id.to_string(),
        responder_id.to_string(),
        chemical,
        kind,
        Offer {
            quantity,
            price,
            proposed_by: initiator_id.to_string(),
        },
        listing_id,
        pass,
    );
    let id = negotiation.id().to_string();
    state.add_negotiation(negotiation);
    Ok(id)
}

/// Counter the latest offer with new terms
///
/// Only the party who did not make the latest offer may counter; turn
/// order flips on success.
pub fn counter_offer(
    state: &mut MarketState,
    negotiation_id: &str,
    actor: &str,
    quantity: f64,
    price: f64,
) -> Result<(), ExchangeError> {
    let negotiation =
        state
            .get_negotiation_mut(negotiation_id)
            .ok_or_else(|| ExchangeError::NegotiationNotFound {
                id: negotiation_id.to_string(),
            })?;
    negotiation.append_offer(actor, quantity, price)?;
    Ok(())
}

/// Accept the latest offer and execute the trade
///
/// # Arguments
/// * `state` - The market
/// * `negotiation_id` - Pending negotiation to settle
/// * `actor` - Accepting party (must not hold the latest offer)
/// * `pass` - Current pass number
///
/// # Returns
/// A [`TradeReceipt`] on success. The seller must hold the full quantity
/// and the buyer the full payment at acceptance time; otherwise the call
/// fails and the negotiation stays pending with nothing moved. On success
/// chemicals and funds transfer atomically, the negotiation closes, and a
/// linked listing (if any) closes with it.
pub fn accept_offer(
    state: &mut MarketState,
    negotiation_id: &str,
    actor: &str,
    pass: u64,
) -> Result<TradeReceipt, ExchangeError> {
    // Validation phase: no mutation until every check passes.
    let (buyer_id, seller_id, chemical, quantity, price, listing_id) = {
        let negotiation =
            state
                .get_negotiation(negotiation_id)
                .ok_or_else(|| ExchangeError::NegotiationNotFound {
                    id: negotiation_id.to_string(),
                })?;
        if !negotiation.is_party(actor) {
            return Err(ExchangeError::NotAParty {
                actor: actor.to_string(),
            });
        }
        if !negotiation.is_pending() {
            return Err(ExchangeError::NotPending);
        }
        if negotiation.last_offer_by() == actor {
            return Err(ExchangeError::OwnLatestOffer {
                actor: actor.to_string(),
            });
        }
        let offer = negotiation.latest_offer();
        (
            negotiation.buyer_id().to_string(),
            negotiation.seller_id().to_string(),
            negotiation.chemical(),
            offer.quantity,
            offer.price,
            negotiation.listing_id().map(String::from),
        )
    };

    let total = quantity * price;

    let seller = state
        .get_team(&seller_id)
        .ok_or_else(|| ExchangeError::TeamNotFound {
            id: seller_id.clone(),
        })?;
    if !seller.has_inventory(chemical, quantity) {
        return Err(ExchangeError::InsufficientInventory {
            chemical,
            requested: quantity,
            available: seller.inventory().get(chemical),
        });
    }
    let buyer = state
        .get_team(&buyer_id)
        .ok_or_else(|| ExchangeError::TeamNotFound {
            id: buyer_id.clone(),
        })?;
    if !buyer.can_afford(total) {
        return Err(ExchangeError::InsufficientFunds {
            required: total,
            available: buyer.funds(),
        });
    }

    // Transfer phase: the checks above guarantee these succeed.
    {
        let buyer = state
            .get_team_mut(&buyer_id)
            .ok_or_else(|| ExchangeError::TeamNotFound {
                id: buyer_id.clone(),
            })?;
        buyer.adjust_funds(-total)?;
        buyer.adjust_inventory(chemical, quantity)?;
    }
    {
        let seller = state
            .get_team_mut(&seller_id)
            .ok_or_else(|| ExchangeError::TeamNotFound {
                id: seller_id.clone(),
            })?;
        seller.adjust_inventory(chemical, -quantity)?;
        seller.adjust_funds(total)?;
    }

    let negotiation =
        state
            .get_negotiation_mut(negotiation_id)
            .ok_or_else(|| ExchangeError::NegotiationNotFound {
                id: negotiation_id.to_string(),
            })?;
    negotiation.mark_accepted(actor, pass)?;

    if let Some(ref id) = listing_id {
        state.close_listing(id);
    }

    Ok(TradeReceipt {
        negotiation_id: negotiation_id.to_string(),
        buyer_id,
        seller_id,
        chemical,
        quantity,
        price,
        total,
    })
}

/// Reject the latest offer, closing the negotiation
///
/// Nothing moves; the same turn-order rules as acceptance apply.
pub fn reject_offer(
    state: &mut MarketState,
    negotiation_id: &str,
    actor: &str,
    pass: u64,
) -> Result<(), ExchangeError> {
    let negotiation =
        state
            .get_negotiation_mut(negotiation_id)
            .ok_or_else(|| ExchangeError::NegotiationNotFound {
                id: negotiation_id.to_string(),
            })?;
    negotiation.mark_rejected(actor, pass)?;
    Ok(())
}

/// Post a non-binding reaction to a pending negotiation
///
/// Either party may react at any time while the negotiation is pending,
/// regardless of whose turn it is. Status and turn order are untouched.
pub fn post_reaction(
    state: &mut MarketState,
    negotiation_id: &str,
    actor: &str,
    intensity: u8,
    pass: u64,
) -> Result<(), ExchangeError> {
    let negotiation =
        state
            .get_negotiation_mut(negotiation_id)
            .ok_or_else(|| ExchangeError::NegotiationNotFound {
                id: negotiation_id.to_string(),
            })?;
    if !negotiation.is_party(actor) {
        return Err(ExchangeError::NotAParty {
            actor: actor.to_string(),
        });
    }
    negotiation.add_reaction(intensity, pass)?;
    Ok(())
}
