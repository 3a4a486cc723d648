//! Production optimizer
//!
//! Solves the two-product linear program (how many gallons of Deicer and
//! Solvent to make from a fixed inventory) by enumerating constraint-line
//! intersections, and derives per-chemical shadow prices by finite
//! differences. Both are pure functions of an inventory; nothing here
//! touches market state.

mod production;
mod shadow;

pub use production::{
    solve, ProductionPlan, SolverError, DEICER_INPUTS, DEICER_SALE_PRICE, SOLVENT_INPUTS,
    SOLVENT_SALE_PRICE,
};
pub use shadow::{shadow_prices, shadow_prices_with_base, ShadowPrices};
