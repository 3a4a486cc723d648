//! Inventory model
//!
//! An inventory maps each of the four chemicals to a non-negative quantity
//! in gallons. Inventories are owned by teams and mutated only as a side
//! effect of an accepted trade or a production run; this core never lets a
//! quantity go negative.
//!
//! Quantities are f64 because the production solver returns fractional
//! optimal plans; comparisons use an explicit tolerance.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::chemical::Chemical;

/// Tolerance used when checking a removal against the available quantity.
pub const QUANTITY_EPSILON: f64 = 1e-9;

/// Errors that can occur during inventory operations
#[derive(Debug, Error, PartialEq)]
pub enum InventoryError {
    #[error("Insufficient {chemical}: requested {requested}, available {available}")]
    Insufficient {
        chemical: Chemical,
        requested: f64,
        available: f64,
    },

    #[error("Quantity must be non-negative and finite, got {value}")]
    InvalidQuantity { value: f64 },
}

/// Per-team chemical holdings (gallons)
///
/// # Example
/// ```
/// use chemtrade_core_rs::{Chemical, Inventory};
///
/// let mut inv = Inventory::uniform(1000.0);
/// assert_eq!(inv.get(Chemical::C), 1000.0);
///
/// inv.add(Chemical::C, 50.0);
/// assert_eq!(inv.get(Chemical::C), 1050.0);
///
/// inv.try_remove(Chemical::C, 1050.0).unwrap();
/// assert_eq!(inv.get(Chemical::C), 0.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    c: f64,
    n: f64,
    d: f64,
    q: f64,
}

impl Inventory {
    /// Create an empty inventory (all chemicals at zero)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create an inventory with the same quantity of every chemical
    pub fn uniform(quantity: f64) -> Self {
        Self {
            c: quantity,
            n: quantity,
            d: quantity,
            q: quantity,
        }
    }

    /// Create an inventory from explicit per-chemical quantities
    pub fn from_quantities(c: f64, n: f64, d: f64, q: f64) -> Self {
        Self { c, n, d, q }
    }

    /// Quantity of a chemical (gallons)
    pub fn get(&self, chemical: Chemical) -> f64 {
        match chemical {
            Chemical::C => self.c,
            Chemical::N => self.n,
            Chemical::D => self.d,
            Chemical::Q => self.q,
        }
    }

    /// Set the quantity of a chemical directly
    ///
    /// # Panics
    /// Panics if `quantity` is negative or non-finite.
    pub fn set(&mut self, chemical: Chemical, quantity: f64) {
        assert!(
            quantity.is_finite() && quantity >= 0.0,
            "quantity must be non-negative and finite"
        );
        *self.slot_mut(chemical) = quantity;
    }

    /// Add gallons of a chemical
    ///
    /// # Panics
    /// Panics if `quantity` is negative or non-finite.
    pub fn add(&mut self, chemical: Chemical, quantity: f64) {
        assert!(
            quantity.is_finite() && quantity >= 0.0,
            "quantity must be non-negative and finite"
        );
        *self.slot_mut(chemical) += quantity;
    }

    /// Remove gallons of a chemical, rejecting removals that would go negative
    ///
    /// Removals within `QUANTITY_EPSILON` of the available amount clamp to
    /// zero rather than leaving a tiny negative residue.
    pub fn try_remove(&mut self, chemical: Chemical, quantity: f64) -> Result<(), InventoryError> {
        if !quantity.is_finite() || quantity < 0.0 {
            return Err(InventoryError::InvalidQuantity { value: quantity });
        }
        let available = self.get(chemical);
        if quantity > available + QUANTITY_EPSILON {
            return Err(InventoryError::Insufficient {
                chemical,
                requested: quantity,
                available,
            });
        }
        *self.slot_mut(chemical) = (available - quantity).max(0.0);
        Ok(())
    }

    /// Check whether at least `quantity` gallons of a chemical are held
    pub fn has(&self, chemical: Chemical, quantity: f64) -> bool {
        self.get(chemical) + QUANTITY_EPSILON >= quantity
    }

    /// Total gallons across all chemicals
    pub fn total(&self) -> f64 {
        self.c + self.n + self.d + self.q
    }

    /// Whether every quantity is finite and non-negative
    ///
    /// The solver refuses malformed inventories (non-finite or negative
    /// values); strategies decline to act when that happens.
    pub fn is_valid(&self) -> bool {
        Chemical::ALL
            .iter()
            .all(|&ch| self.get(ch).is_finite() && self.get(ch) >= 0.0)
    }

    /// Copy of this inventory with `delta` more gallons of one chemical
    ///
    /// Used by the shadow-price finite difference (baseline vs. baseline+1).
    pub fn with_added(&self, chemical: Chemical, delta: f64) -> Self {
        let mut copy = self.clone();
        *copy.slot_mut(chemical) += delta;
        copy
    }

    fn slot_mut(&mut self, chemical: Chemical) -> &mut f64 {
        match chemical {
            Chemical::C => &mut self.c,
            Chemical::N => &mut self.n,
            Chemical::D => &mut self.d,
            Chemical::Q => &mut self.q,
        }
    }
}
