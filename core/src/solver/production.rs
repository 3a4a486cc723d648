//! Linear production planning
//!
//! The plant makes two products from four chemical inputs:
//!
//! ```text
//! Deicer  (sells $100/gal):  0.50 C + 0.30 N + 0.20 D
//! Solvent (sells  $60/gal):  0.25 N + 0.35 D + 0.40 Q
//! ```
//!
//! Maximizing revenue subject to inventory is a two-variable linear
//! program, so the optimum lies on a vertex of the feasible polygon. We
//! enumerate every pairwise intersection of the six constraint lines (four
//! inventory rows plus the two non-negativity axes), keep the feasible
//! ones, and take the most profitable. The origin is always feasible, so a
//! plan always exists for a valid inventory.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::chemical::Chemical;
use crate::models::inventory::Inventory;

/// Gallons of each input per gallon of Deicer, in `Chemical::ALL` order
pub const DEICER_INPUTS: [f64; 4] = [0.5, 0.3, 0.2, 0.0];

/// Gallons of each input per gallon of Solvent, in `Chemical::ALL` order
pub const SOLVENT_INPUTS: [f64; 4] = [0.0, 0.25, 0.35, 0.4];

/// Sale price of Deicer, dollars per gallon
pub const DEICER_SALE_PRICE: f64 = 100.0;

/// Sale price of Solvent, dollars per gallon
pub const SOLVENT_SALE_PRICE: f64 = 60.0;

/// Determinants smaller than this treat the constraint pair as parallel
const PARALLEL_EPSILON: f64 = 1e-9;

/// Slack allowed when testing a vertex against the constraints
const FEASIBILITY_TOLERANCE: f64 = 1e-5;

/// Errors raised by the optimizer
#[derive(Debug, Error, PartialEq)]
pub enum SolverError {
    #[error("Inventory contains a negative or non-finite quantity")]
    MalformedInventory,
}

/// The revenue-optimal production mix for one inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionPlan {
    /// Gallons of Deicer to produce
    pub deicer: f64,

    /// Gallons of Solvent to produce
    pub solvent: f64,

    /// Revenue of the plan in dollars
    pub profit: f64,

    /// Chemicals the plan consumes
    pub consumed: Inventory,
}

impl ProductionPlan {
    /// Inventory left over after executing the plan
    ///
    /// Clamped at zero per chemical; binding inputs come out exactly empty
    /// up to floating-point noise.
    pub fn surplus(&self, inventory: &Inventory) -> Inventory {
        let mut surplus = Inventory::empty();
        for &chemical in Chemical::ALL.iter() {
            let left = inventory.get(chemical) - self.consumed.get(chemical);
            surplus.set(chemical, left.max(0.0));
        }
        surplus
    }
}

/// Compute the revenue-optimal production plan for an inventory
///
/// # Arguments
/// * `inventory` - Available chemicals in gallons
///
/// # Returns
/// The optimal [`ProductionPlan`], or [`SolverError::MalformedInventory`]
/// if any quantity is negative or non-finite. Ties between equally
/// profitable vertices resolve to the first one found in the fixed
/// enumeration order, so results are deterministic.
///
/// # Example
/// ```
/// use chemtrade_core_rs::{solver, Inventory};
///
/// let plan = solver::solve(&Inventory::uniform(1000.0)).unwrap();
/// assert!((plan.deicer - 2000.0).abs() < 1e-6);
/// assert!((plan.solvent - 1600.0).abs() < 1e-6);
/// assert!((plan.profit - 296_000.0).abs() < 1e-3);
/// ```
pub fn solve(inventory: &Inventory) -> Result<ProductionPlan, SolverError> {
    if !inventory.is_valid() {
        return Err(SolverError::MalformedInventory);
    }

    // Each row is (a, b, rhs) for the half-plane a*d + b*s <= rhs.
    let mut constraints = [(0.0, 0.0, 0.0); 6];
    for (i, &chemical) in Chemical::ALL.iter().enumerate() {
        constraints[i] = (DEICER_INPUTS[i], SOLVENT_INPUTS[i], inventory.get(chemical));
    }
    constraints[4] = (-1.0, 0.0, 0.0); // d >= 0
    constraints[5] = (0.0, -1.0, 0.0); // s >= 0

    let mut best: Option<(f64, f64, f64)> = None;

    for i in 0..constraints.len() {
        for j in (i + 1)..constraints.len() {
            let (a1, b1, r1) = constraints[i];
            let (a2, b2, r2) = constraints[j];

            let det = a1 * b2 - a2 * b1;
            if det.abs() < PARALLEL_EPSILON {
                continue;
            }

            let d = (r1 * b2 - r2 * b1) / det;
            let s = (a1 * r2 - a2 * r1) / det;

            let feasible = constraints
                .iter()
                .all(|&(a, b, r)| a * d + b * s <= r + FEASIBILITY_TOLERANCE);
            if !feasible {
                continue;
            }

            // Tolerance can admit vertices a hair below zero
            let d = d.max(0.0);
            let s = s.max(0.0);

            let profit = DEICER_SALE_PRICE * d + SOLVENT_SALE_PRICE * s;
            match best {
                Some((best_profit, _, _)) if profit <= best_profit => {}
                _ => best = Some((profit, d, s)),
            }
        }
    }

    // The origin vertex (rows 5 and 6) is always feasible
    let (profit, deicer, solvent) = best.expect("feasible region is never empty");

    let mut consumed = Inventory::empty();
    for (i, &chemical) in Chemical::ALL.iter().enumerate() {
        consumed.set(chemical, DEICER_INPUTS[i] * deicer + SOLVENT_INPUTS[i] * solvent);
    }

    Ok(ProductionPlan {
        deicer,
        solvent,
        profit,
        consumed,
    })
}
