//! Market listing model
//!
//! A listing is a public, non-binding market entry expressing intent to buy
//! or sell a chemical. The source system carried two overlapping shapes (a
//! bare advertisement and a priced listing); here they are unified into one
//! entity with an optional quantity and an optional price bound.
//!
//! A listing stays visible until cancelled, accepted (via the negotiation it
//! prompted), or implicitly superseded. The market does not enforce global
//! uniqueness per team/chemical/direction at this layer.

use serde::{Deserialize, Serialize};

use crate::models::chemical::Chemical;

/// Whether a listing wants to buy or sell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingDirection {
    /// Standing buy order; `price_bound` is the maximum price offered
    Buy,
    /// Standing sell offer; `price_bound` is the minimum price asked
    Sell,
}

/// A public market entry
///
/// # Example
/// ```
/// use chemtrade_core_rs::{Chemical, Listing, ListingDirection};
///
/// let listing = Listing::new(
///     "TEAM_A".to_string(),
///     Chemical::C,
///     ListingDirection::Sell,
///     Some(100.0),
///     Some(4.50), // min price
///     0,
/// );
/// assert!(listing.is_open());
/// assert_eq!(listing.chemical(), Chemical::C);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// Unique listing identifier (UUID)
    id: String,

    /// Owning team
    team_id: String,

    /// Chemical being advertised
    chemical: Chemical,

    /// Buy or sell
    direction: ListingDirection,

    /// Advertised quantity in gallons (None for an open-ended advertisement)
    quantity: Option<f64>,

    /// Price bound in dollars per gallon: minimum for sells, maximum for buys
    price_bound: Option<f64>,

    /// Whether the listing is still visible on the market
    open: bool,

    /// Pass number when the listing was created (for deterministic ordering)
    created_pass: u64,
}

impl Listing {
    /// Create a new open listing with a fresh UUID
    pub fn new(
        team_id: String,
        chemical: Chemical,
        direction: ListingDirection,
        quantity: Option<f64>,
        price_bound: Option<f64>,
        created_pass: u64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            team_id,
            chemical,
            direction,
            quantity,
            price_bound,
            open: true,
            created_pass,
        }
    }

    /// Listing identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Owning team identifier
    pub fn team_id(&self) -> &str {
        &self.team_id
    }

    /// Advertised chemical
    pub fn chemical(&self) -> Chemical {
        self.chemical
    }

    /// Buy or sell
    pub fn direction(&self) -> ListingDirection {
        self.direction
    }

    /// Advertised quantity, if any
    pub fn quantity(&self) -> Option<f64> {
        self.quantity
    }

    /// Price bound, if any (min price for sells, max price for buys)
    pub fn price_bound(&self) -> Option<f64> {
        self.price_bound
    }

    /// Whether the listing is still open
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Pass number when the listing was created
    pub fn created_pass(&self) -> u64 {
        self.created_pass
    }

    /// Close the listing (cancelled or consumed by an accepted negotiation)
    pub fn close(&mut self) {
        self.open = false;
    }
}
