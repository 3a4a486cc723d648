//! Shadow prices
//!
//! The shadow price of a chemical is the marginal revenue of one more
//! gallon of it: re-solve the production plan with the inventory perturbed
//! by +1 gallon and take the profit difference. A binding input carries a
//! positive shadow price; a slack input carries zero. The finite-difference
//! value matches the LP dual exactly while the extra gallon does not change
//! which constraints bind, which is the regime NPC strategies trade in.

use serde::{Deserialize, Serialize};

use crate::models::chemical::Chemical;
use crate::models::inventory::Inventory;
use crate::solver::production::{solve, ProductionPlan, SolverError};

/// Per-chemical marginal revenue, dollars per gallon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowPrices {
    /// Values in `Chemical::ALL` order
    values: [f64; 4],
}

impl ShadowPrices {
    /// Shadow price of one chemical
    pub fn get(&self, chemical: Chemical) -> f64 {
        self.values[index_of(chemical)]
    }

    /// The chemical with the highest shadow price (the bottleneck)
    ///
    /// Ties resolve to the earliest chemical in `Chemical::ALL` order.
    pub fn highest(&self) -> (Chemical, f64) {
        let mut best = (Chemical::ALL[0], self.values[0]);
        for (i, &chemical) in Chemical::ALL.iter().enumerate().skip(1) {
            if self.values[i] > best.1 {
                best = (chemical, self.values[i]);
            }
        }
        best
    }

    /// The chemical with the lowest shadow price (the most dispensable)
    ///
    /// Ties resolve to the earliest chemical in `Chemical::ALL` order.
    pub fn lowest(&self) -> (Chemical, f64) {
        let mut best = (Chemical::ALL[0], self.values[0]);
        for (i, &chemical) in Chemical::ALL.iter().enumerate().skip(1) {
            if self.values[i] < best.1 {
                best = (chemical, self.values[i]);
            }
        }
        best
    }

    /// Iterate (chemical, shadow price) pairs in `Chemical::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (Chemical, f64)> + '_ {
        Chemical::ALL
            .iter()
            .enumerate()
            .map(move |(i, &chemical)| (chemical, self.values[i]))
    }
}

fn index_of(chemical: Chemical) -> usize {
    match chemical {
        Chemical::C => 0,
        Chemical::N => 1,
        Chemical::D => 2,
        Chemical::Q => 3,
    }
}

/// Compute shadow prices for an inventory
///
/// # Arguments
/// * `inventory` - Available chemicals in gallons
///
/// # Returns
/// The four shadow prices, or [`SolverError::MalformedInventory`] if the
/// inventory is invalid.
///
/// # Example
/// ```
/// use chemtrade_core_rs::{solver, Chemical, Inventory};
///
/// let shadows = solver::shadow_prices(&Inventory::uniform(1000.0)).unwrap();
/// assert!((shadows.get(Chemical::C) - 56.0).abs() < 1e-3);
/// assert!((shadows.get(Chemical::N) - 240.0).abs() < 1e-3);
/// assert_eq!(shadows.get(Chemical::D), 0.0);
/// assert_eq!(shadows.get(Chemical::Q), 0.0);
/// ```
pub fn shadow_prices(inventory: &Inventory) -> Result<ShadowPrices, SolverError> {
    let base = solve(inventory)?;
    shadow_prices_with_base(inventory, &base)
}

/// Compute shadow prices reusing an already-solved base plan
///
/// Callers that hold the current plan (the NPC runner does) avoid one
/// redundant solve per refresh.
pub fn shadow_prices_with_base(
    inventory: &Inventory,
    base: &ProductionPlan,
) -> Result<ShadowPrices, SolverError> {
    let mut values = [0.0; 4];
    for (i, &chemical) in Chemical::ALL.iter().enumerate() {
        let perturbed = solve(&inventory.with_added(chemical, 1.0))?;
        // Floating-point noise can dip a hair below zero; more inventory
        // never lowers revenue.
        values[i] = (perturbed.profit - base.profit).max(0.0);
    }
    Ok(ShadowPrices { values })
}
