//! Beginner strategy
//!
//! Deliberately generous: overpays for chemicals against a flat notion of
//! fair value, never checks its own funds before proposing a buy, and
//! undersells at 80% of the lesser of the counterparty's bid and its own
//! shadow price. Always counters the first offer it receives before it
//! will consider accepting anything.

use crate::models::chemical::Chemical;
use crate::strategy::{
    MarketAction, NegotiationResponse, ResponseKind, StrategyContext, TradingStrategy,
};

/// Flat per-gallon "fair value" the Beginner anchors its buying on
const BASE_FAIR_VALUE: f64 = 3.0;

/// Gallons per buy order
const BUY_ORDER_QUANTITY: f64 = 100.0;

pub struct BeginnerStrategy {
    variability: f64,
}

impl BeginnerStrategy {
    pub fn new(variability: f64) -> Self {
        Self { variability }
    }

    /// 80% of the lesser of the counterparty's price and own shadow
    fn sell_price(&self, counterparty_price: f64, shadow: f64) -> f64 {
        0.8 * counterparty_price.min(shadow)
    }
}

impl TradingStrategy for BeginnerStrategy {
    fn decide_trade(&mut self, ctx: &mut StrategyContext<'_>) -> Option<MarketAction> {
        let shadow = ctx.shadow?;

        // Sell into an open buy listing first, at 80% of the lesser of the
        // bid and own shadow price.
        for &chemical in Chemical::ALL.iter() {
            if ctx.holding(chemical) <= 0.0 {
                continue;
            }
            if let Some(listing) = ctx.buy_listings(chemical).first() {
                if let Some(bid) = listing.price_bound() {
                    let quantity = listing
                        .quantity()
                        .unwrap_or(BUY_ORDER_QUANTITY)
                        .min(ctx.holding(chemical));
                    if quantity > 0.0 {
                        return Some(MarketAction::AcceptBuyOrder {
                            listing_id: listing.id().to_string(),
                            quantity,
                            price: self.sell_price(bid, shadow.get(chemical)),
                        });
                    }
                }
            }
        }

        // Otherwise post a generous buy order, funds unchecked.
        let pick = (ctx.rng.next_u64() % Chemical::ALL.len() as u64) as usize;
        let chemical = Chemical::ALL[pick];
        let markup = ctx.rng.range_f64(1.5, 2.0);
        // Variability widens the quantity, not the markup
        let quantity = BUY_ORDER_QUANTITY * (1.0 + self.variability);
        Some(MarketAction::CreateBuyOrder {
            chemical,
            quantity: Some(quantity),
            max_price: BASE_FAIR_VALUE * markup,
        })
    }

    fn respond_to_negotiations(
        &mut self,
        ctx: &mut StrategyContext<'_>,
    ) -> Option<NegotiationResponse> {
        let shadow = ctx.shadow?;
        let negotiation = ctx.negotiations.first()?;
        let offer = negotiation.latest_offer();
        let selling = negotiation.seller_id() == ctx.team_id;

        // Round one always draws a counter, never an acceptance.
        if negotiation.round() == 1 {
            let price = if selling {
                self.sell_price(offer.price, shadow.get(negotiation.chemical()))
            } else {
                // Buying: counter above the ask. Generous.
                offer.price * 1.1
            };
            return Some(NegotiationResponse {
                negotiation_id: negotiation.id().to_string(),
                kind: ResponseKind::Counter {
                    quantity: offer.quantity,
                    price: price.max(0.01),
                },
                react_intensity: None,
            });
        }

        if selling {
            let floor = self.sell_price(offer.price, shadow.get(negotiation.chemical()));
            if offer.price >= floor && ctx.inventory.has(negotiation.chemical(), offer.quantity) {
                return Some(NegotiationResponse {
                    negotiation_id: negotiation.id().to_string(),
                    kind: ResponseKind::Accept,
                    react_intensity: None,
                });
            }
        } else if offer.price <= BASE_FAIR_VALUE * 2.0 {
            // Buying: anything under double fair value looks great. Funds
            // are deliberately not checked here; the engine converts an
            // unaffordable accept into a reject.
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
    use crate::models::inventory::Inventory;
    use crate::rng::DeterministicRng;

    #[test]
    fn test_declines_without_shadow_prices() {
        let mut strategy = BeginnerStrategy::new(0.5);
        let inventory = Inventory::uniform(100.0);
        let mut rng = DeterministicRng::new(1);
        let mut ctx = StrategyContext {
            team_id: "TEAM_A",
            inventory: &inventory,
            funds: 1000.0,
            shadow: None,
            plan: None,
            listings: &[],
            negotiations: &[],
            pass: 1,
            rng: &mut rng,
        };
        assert!(strategy.decide_trade(&mut ctx).is_none());
        assert!(strategy.respond_to_negotiations(&mut ctx).is_none());
    }

    #[test]
    fn test_buy_order_price_within_generous_band() {
        let mut strategy = BeginnerStrategy::new(0.0);
        let inventory = Inventory::uniform(100.0);
        let shadows = crate::solver::shadow_prices(&inventory).unwrap();
        let mut rng = DeterministicRng::new(7);
        let mut ctx = StrategyContext {
            team_id: "TEAM_A",
            inventory: &inventory,
            funds: 0.0, // Funds are irrelevant to the Beginner
            shadow: Some(&shadows),
            plan: None,
            listings: &[],
            negotiations: &[],
            pass: 1,
            rng: &mut rng,
        };
        match strategy.decide_trade(&mut ctx) {
            Some(MarketAction::CreateBuyOrder { max_price, .. }) => {
                assert!(max_price >= BASE_FAIR_VALUE * 1.5);
                assert!(max_price <= BASE_FAIR_VALUE * 2.0);
            }
            other => panic!("expected a buy order, got {:?}", other),
        }
    }
}
