//! Team model
//!
//! A team owns an inventory of raw chemicals and a funds balance in
//! dollars. Funds and inventory change hands only through an accepted
//! negotiation (see the exchange module); this model enforces the local
//! invariants (no negative funds, no negative inventory) at the call site.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::chemical::Chemical;
use crate::models::inventory::{Inventory, InventoryError};

/// Tolerance used when checking funds against a required amount.
pub const FUNDS_EPSILON: f64 = 1e-9;

/// Errors that can occur during team balance operations
#[derive(Debug, Error, PartialEq)]
pub enum TeamError {
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: f64, available: f64 },

    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

/// A team participating in the trading simulation
///
/// # Example
/// ```
/// use chemtrade_core_rs::{Chemical, Inventory, Team};
///
/// let mut team = Team::new("TEAM_A".to_string(), Inventory::uniform(1000.0), 5000.0);
/// assert_eq!(team.funds(), 5000.0);
///
/// team.adjust_funds(-600.0).unwrap();
/// team.adjust_inventory(Chemical::C, 100.0).unwrap();
/// assert_eq!(team.funds(), 4400.0);
/// assert_eq!(team.inventory().get(Chemical::C), 1100.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Unique team identifier (e.g. "TEAM_A")
    id: String,

    /// Chemical holdings (gallons)
    inventory: Inventory,

    /// Funds balance (dollars); never negative
    funds: f64,
}

impl Team {
    /// Create a new team
    ///
    /// # Panics
    /// Panics if `funds` is negative or non-finite.
    pub fn new(id: String, inventory: Inventory, funds: f64) -> Self {
        assert!(
            funds.is_finite() && funds >= 0.0,
            "funds must be non-negative and finite"
        );
        Self {
            id,
            inventory,
            funds,
        }
    }

    /// Team identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Read-only view of the team's inventory
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Current funds balance (dollars)
    pub fn funds(&self) -> f64 {
        self.funds
    }

    /// Check whether the team can cover a payment
    pub fn can_afford(&self, amount: f64) -> bool {
        self.funds + FUNDS_EPSILON >= amount
    }

    /// Check whether the team holds at least `quantity` gallons of a chemical
    pub fn has_inventory(&self, chemical: Chemical, quantity: f64) -> bool {
        self.inventory.has(chemical, quantity)
    }

    /// Apply a signed funds delta
    ///
    /// A negative delta that would take the balance below zero is rejected
    /// and leaves the balance unchanged.
    pub fn adjust_funds(&mut self, delta: f64) -> Result<(), TeamError> {
        if delta < 0.0 && !self.can_afford(-delta) {
            return Err(TeamError::InsufficientFunds {
                required: -delta,
                available: self.funds,
            });
        }
        self.funds = (self.funds + delta).max(0.0);
        Ok(())
    }

    /// Apply a signed inventory delta for one chemical
    ///
    /// A negative delta that would take the holding below zero is rejected
    /// and leaves the inventory unchanged.
    pub fn adjust_inventory(&mut self, chemical: Chemical, delta: f64) -> Result<(), TeamError> {
        if delta >= 0.0 {
            self.inventory.add(chemical, delta);
        } else {
            self.inventory.try_remove(chemical, -delta)?;
        }
        Ok(())
    }
}
