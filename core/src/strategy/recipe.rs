//! Recipe-balancing strategy
//!
//! Commits once, at construction, to whichever product its starting
//! inventory ratio best supports, then trades every chemical toward that
//! recipe's exact input ratio. Classification is purely stoichiometric:
//! a chemical is in deficit or excess relative to the target ratio, not
//! relative to shadow prices. Its one negotiating tic: it never accepts a
//! first offer, always issuing exactly one opening counter before it will
//! evaluate acceptance.

use crate::models::chemical::Chemical;
use crate::models::inventory::Inventory;
use crate::models::negotiation::NegotiationType;
use crate::solver::{DEICER_INPUTS, SOLVENT_INPUTS};
use crate::strategy::{
    MarketAction, NegotiationResponse, ResponseKind, StrategyContext, TradingStrategy,
};

/// Which recipe the strategy rebalances toward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Specialization {
    Deicer,
    Solvent,
}

/// Holdings within this fraction of target are considered balanced
const BALANCE_TOLERANCE: f64 = 0.05;

/// Gallons per trade when the listing does not say
const DEFAULT_QUANTITY: f64 = 50.0;

/// Asking price floor when shadow prices carry no signal
const MIN_PRICE: f64 = 1.0;

pub struct RecipeBalancingStrategy {
    specialization: Specialization,
}

impl RecipeBalancingStrategy {
    /// Pick the specialization from the starting inventory
    ///
    /// Capacity of a recipe is the bottleneck quotient min(holding/input)
    /// over its positive inputs; the recipe with the larger capacity wins,
    /// Deicer on a tie.
    pub fn new(starting_inventory: &Inventory) -> Self {
        let deicer = recipe_capacity(starting_inventory, &DEICER_INPUTS);
        let solvent = recipe_capacity(starting_inventory, &SOLVENT_INPUTS);
        let specialization = if deicer >= solvent {
            Specialization::Deicer
        } else {
            Specialization::Solvent
        };
        Self { specialization }
    }

    /// Fixed specialization chosen at construction
    pub fn specialization(&self) -> Specialization {
        self.specialization
    }

    fn targets(&self) -> &'static [f64; 4] {
        match self.specialization {
            Specialization::Deicer => &DEICER_INPUTS,
            Specialization::Solvent => &SOLVENT_INPUTS,
        }
    }

    /// Signed imbalance per chemical: positive means deficit (need more),
    /// negative means excess. Target gallons are the recipe share of the
    /// total currently held.
    fn imbalances(&self, inventory: &Inventory) -> [f64; 4] {
        let total = inventory.total();
        let targets = self.targets();
        let mut out = [0.0; 4];
        for (i, &chemical) in Chemical::ALL.iter().enumerate() {
            out[i] = total * targets[i] - inventory.get(chemical);
        }
        out
    }
}

/// Units of the recipe producible from an inventory
fn recipe_capacity(inventory: &Inventory, inputs: &[f64; 4]) -> f64 {
    let mut capacity = f64::INFINITY;
    for (i, &chemical) in Chemical::ALL.iter().enumerate() {
        if inputs[i] > 0.0 {
            capacity = capacity.min(inventory.get(chemical) / inputs[i]);
        }
    }
    if capacity.is_finite() {
        capacity
    } else {
        0.0
    }
}

impl TradingStrategy for RecipeBalancingStrategy {
    fn decide_trade(&mut self, ctx: &mut StrategyContext<'_>) -> Option<MarketAction> {
        let shadow = ctx.shadow?;
        let imbalances = self.imbalances(ctx.inventory);
        let total = ctx.inventory.total();
        if total <= 0.0 {
            return None;
        }
        let tolerance = total * BALANCE_TOLERANCE;

        // Worst deficit first.
        let mut deficit: Option<(Chemical, f64)> = None;
        let mut excess: Option<(Chemical, f64)> = None;
        for (i, &chemical) in Chemical::ALL.iter().enumerate() {
            let gap = imbalances[i];
            if gap > tolerance && deficit.map_or(true, |(_, g)| gap > g) {
                deficit = Some((chemical, gap));
            }
            if gap < -tolerance && excess.map_or(true, |(_, g)| gap < g) {
                excess = Some((chemical, gap));
            }
        }

        if let Some((chemical, gap)) = deficit {
            let willing = (shadow.get(chemical) * 1.1).max(MIN_PRICE);
            if let Some(listing) = ctx.sell_listings(chemical).first() {
                if let Some(ask) = listing.price_bound() {
                    let quantity = listing.quantity().unwrap_or(gap).min(gap);
                    if ask <= willing && ctx.funds >= ask * quantity {
                        return Some(MarketAction::InitiateNegotiation {
                            responder_id: listing.team_id().to_string(),
                            chemical,
                            kind: NegotiationType::Buy,
                            quantity,
                            price: ask,
                            listing_id: Some(listing.id().to_string()),
                        });
                    }
                }
            }
            if ctx.funds > 0.0 {
                return Some(MarketAction::CreateBuyOrder {
                    chemical,
                    quantity: Some(gap.min(DEFAULT_QUANTITY * 4.0)),
                    max_price: willing,
                });
            }
        }

        if let Some((chemical, gap)) = excess {
            let surplus = -gap;
            return Some(MarketAction::CreateOffer {
                chemical,
                quantity: surplus.min(ctx.holding(chemical)),
                asking_price: (shadow.get(chemical) * 0.9).max(MIN_PRICE),
            });
        }

        None
    }

    fn respond_to_negotiations(
        &mut self,
        ctx: &mut StrategyContext<'_>,
    ) -> Option<NegotiationResponse> {
        let shadow = ctx.shadow?;
        let negotiation = ctx.negotiations.first()?;
        let offer = negotiation.latest_offer();
        let chemical = negotiation.chemical();
        let selling = negotiation.seller_id() == ctx.team_id;

        let index = Chemical::ALL
            .iter()
            .position(|&c| c == chemical)
            .unwrap_or(0);
        let gap = self.imbalances(ctx.inventory)[index];
        let wants_more = gap > 0.0;

        // First offers are never accepted outright; open with exactly one
        // counter nudged toward our side of the price.
        if negotiation.round() == 1 {
            let price = if selling {
                offer.price * 1.1
            } else {
                (offer.price * 0.9).max(0.01)
            };
            return Some(NegotiationResponse {
                negotiation_id: negotiation.id().to_string(),
                kind: ResponseKind::Counter {
                    quantity: offer.quantity,
                    price,
                },
                react_intensity: None,
            });
        }

        let willing = (shadow.get(chemical) * 1.1).max(MIN_PRICE);
        let acceptable = if selling {
            // Only sell what the ratio says we hold too much of
            !wants_more
                && offer.price >= (shadow.get(chemical) * 0.9).max(MIN_PRICE * 0.5)
                && ctx.inventory.has(chemical, offer.quantity)
        } else {
            wants_more && offer.price <= willing && ctx.funds >= offer.total()
        };

        if acceptable {
            return Some(NegotiationResponse {
                negotiation_id: negotiation.id().to_string(),
                kind: ResponseKind::Accept,
                react_intensity: None,
            });
        }

        Some(NegotiationResponse {
            negotiation_id: negotiation.id().to_string(),
            kind: ResponseKind::Reject,
            react_intensity: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::negotiation::{Negotiation, Offer};
    use crate::rng::DeterministicRng;
    use crate::solver;

    #[test]
    fn test_specialization_follows_starting_ratio() {
        // Heavy C favors Deicer (Solvent uses no C at all)
        let deicer_heavy = Inventory::from_quantities(1000.0, 300.0, 200.0, 0.0);
        assert_eq!(
            RecipeBalancingStrategy::new(&deicer_heavy).specialization(),
            Specialization::Deicer
        );

        // Heavy Q favors Solvent (Deicer uses no Q at all)
        let solvent_heavy = Inventory::from_quantities(0.0, 250.0, 350.0, 1000.0);
        assert_eq!(
            RecipeBalancingStrategy::new(&solvent_heavy).specialization(),
            Specialization::Solvent
        );
    }

    #[test]
    fn test_never_accepts_a_first_offer() {
        let inventory = Inventory::uniform(500.0);
        let mut strategy = RecipeBalancingStrategy::new(&inventory);
        let shadows = solver::shadow_prices(&inventory).unwrap();
        let mut rng = DeterministicRng::new(9);

        // A dream offer: someone selling the deficit chemical for pennies
        let negotiation = Negotiation::new(
            "TEAM_B".to_string(),
            "TEAM_A".to_string(),
            Chemical::C,
            NegotiationType::Sell,
            Offer {
                quantity: 100.0,
                price: 0.05,
                proposed_by: "TEAM_B".to_string(),
            },
            None,
            0,
        );
        let negotiations = vec![negotiation];
        let mut ctx = StrategyContext {
            team_id: "TEAM_A",
            inventory: &inventory,
            funds: 100_000.0,
            shadow: Some(&shadows),
            plan: None,
            listings: &[],
            negotiations: &negotiations,
            pass: 1,
            rng: &mut rng,
        };
        let response = strategy.respond_to_negotiations(&mut ctx).unwrap();
        assert!(matches!(response.kind, ResponseKind::Counter { .. }));
    }
}
