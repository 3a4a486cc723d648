//! Bottleneck-elimination strategy
//!
//! Reads the shadow-price vector as a diagnosis: the chemical with the
//! highest shadow price is the production bottleneck, the one with the
//! lowest is dead weight. Pays well over shadow to acquire the bottleneck
//! and lets the excess go for as little as 70-90% of its shadow price.
//! Acceptance bands depend on which class the negotiated chemical falls
//! into; chemicals in neither class draw a reject after one counter.

use crate::models::negotiation::NegotiationType;
use crate::strategy::{
    MarketAction, NegotiationResponse, ResponseKind, StrategyContext, TradingStrategy,
};

/// Gallons per trade when the listing does not say
const DEFAULT_QUANTITY: f64 = 50.0;

/// Asking price floor for excess with a zero shadow price
const SCRAP_PRICE: f64 = 1.0;

pub struct BottleneckEliminationStrategy {
    variability: f64,
}

impl BottleneckEliminationStrategy {
    pub fn new(variability: f64) -> Self {
        Self { variability }
    }

    /// Ceiling paid for the bottleneck chemical: 150%+ of shadow
    fn bottleneck_ceiling(&self, shadow: f64) -> f64 {
        shadow * (1.5 + 0.5 * self.variability)
    }

    /// Floor accepted for the excess chemical: 70-90% of shadow
    fn excess_floor(&self, shadow: f64, rng: &mut crate::rng::DeterministicRng) -> f64 {
        shadow * rng.range_f64(0.7, 0.9)
    }
}

impl TradingStrategy for BottleneckEliminationStrategy {
    fn decide_trade(&mut self, ctx: &mut StrategyContext<'_>) -> Option<MarketAction> {
        let shadow = ctx.shadow?;
        let (bottleneck, high) = shadow.highest();
        let (excess, low) = shadow.lowest();
        if high <= 0.0 {
            // Nothing binds; there is no bottleneck to eliminate.
            return None;
        }

        // Acquire the bottleneck, from a listing if one is in budget.
        let ceiling = self.bottleneck_ceiling(high);
        if let Some(listing) = ctx.sell_listings(bottleneck).first() {
            if let Some(ask) = listing.price_bound() {
                let quantity = listing.quantity().unwrap_or(DEFAULT_QUANTITY);
                if ask <= ceiling && ctx.funds >= ask * quantity {
                    return Some(MarketAction::InitiateNegotiation {
                        responder_id: listing.team_id().to_string(),
                        chemical: bottleneck,
                        kind: NegotiationType::Buy,
                        quantity,
                        price: ask,
                        listing_id: Some(listing.id().to_string()),
                    });
                }
            }
        }

        // Alternate between advertising the need and shedding the excess.
        if ctx.rng.chance(0.5) && ctx.funds > 0.0 {
            return Some(MarketAction::CreateBuyOrder {
                chemical: bottleneck,
                quantity: Some(DEFAULT_QUANTITY),
                max_price: ceiling,
            });
        }
        let held = ctx.holding(excess);
        if excess != bottleneck && held > 0.0 {
            return Some(MarketAction::CreateOffer {
                chemical: excess,
                quantity: held.min(DEFAULT_QUANTITY * 2.0),
                asking_price: low.max(SCRAP_PRICE),
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
        let chemical_shadow = shadow.get(chemical);
        let selling = negotiation.seller_id() == ctx.team_id;

        let (bottleneck, high) = shadow.highest();
        let (excess, _) = shadow.lowest();
        if high <= 0.0 {
            return None;
        }

        // Band selection keys on the classification of the chemical under
        // negotiation, not on generic margins.
        if !selling && chemical == bottleneck {
            let ceiling = self.bottleneck_ceiling(chemical_shadow);
            if offer.price <= ceiling && ctx.funds >= offer.total() {
                return Some(NegotiationResponse {
                    negotiation_id: negotiation.id().to_string(),
                    kind: ResponseKind::Accept,
                    react_intensity: None,
                });
            }
            return Some(NegotiationResponse {
                negotiation_id: negotiation.id().to_string(),
                kind: ResponseKind::Counter {
                    quantity: offer.quantity,
                    price: ceiling.max(0.01),
                },
                react_intensity: None,
            });
        }

        if selling && chemical == excess {
            let floor = self.excess_floor(chemical_shadow, ctx.rng).max(SCRAP_PRICE * 0.5);
            if offer.price >= floor && ctx.inventory.has(chemical, offer.quantity) {
                return Some(NegotiationResponse {
                    negotiation_id: negotiation.id().to_string(),
                    kind: ResponseKind::Accept,
                    react_intensity: None,
                });
            }
            if negotiation.round() < 3 {
                return Some(NegotiationResponse {
                    negotiation_id: negotiation.id().to_string(),
                    kind: ResponseKind::Counter {
                        quantity: offer.quantity,
                        price: floor.max(0.01),
                    },
                    react_intensity: None,
                });
            }
        }

        // Outside both classes the trade does nothing for the bottleneck.
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
    use crate::models::chemical::Chemical;
    use crate::models::inventory::Inventory;
    use crate::rng::DeterministicRng;
    use crate::solver;

    #[test]
    fn test_no_action_when_nothing_binds() {
        let mut strategy = BottleneckEliminationStrategy::new(0.5);
        let inventory = Inventory::empty();
        let shadows = solver::shadow_prices(&inventory).unwrap();
        let mut rng = DeterministicRng::new(5);
        let mut ctx = StrategyContext {
            team_id: "TEAM_A",
            inventory: &inventory,
            funds: 1000.0,
            shadow: Some(&shadows),
            plan: None,
            listings: &[],
            negotiations: &[],
            pass: 1,
            rng: &mut rng,
        };
        // Empty inventory: every shadow is the profit of one free gallon,
        // which unlocks no production on its own, so nothing binds.
        assert!(strategy.decide_trade(&mut ctx).is_none());
    }

    #[test]
    fn test_targets_highest_shadow_chemical() {
        let mut strategy = BottleneckEliminationStrategy::new(0.0);
        let inventory = Inventory::uniform(1000.0);
        let shadows = solver::shadow_prices(&inventory).unwrap();
        assert_eq!(shadows.highest().0, Chemical::N);
        let mut rng = DeterministicRng::new(5);
        let mut ctx = StrategyContext {
            team_id: "TEAM_A",
            inventory: &inventory,
            funds: 100_000.0,
            shadow: Some(&shadows),
            plan: None,
            listings: &[],
            negotiations: &[],
            pass: 1,
            rng: &mut rng,
        };
        match strategy.decide_trade(&mut ctx) {
            Some(MarketAction::CreateBuyOrder {
                chemical,
                max_price,
                ..
            }) => {
                assert_eq!(chemical, Chemical::N);
                // 150% of the N shadow price of 240
                assert!((max_price - 360.0).abs() < 1e-3);
            }
            Some(MarketAction::CreateOffer { chemical, .. }) => {
                // The coin flip may shed the excess instead
                assert_eq!(chemical, shadows.lowest().0);
            }
            other => panic!("expected a listing, got {:?}", other),
        }
    }
}
