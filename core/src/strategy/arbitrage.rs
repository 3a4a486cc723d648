//! Shadow-price arbitrage strategy
//!
//! Trades the gap between listed prices and the team's own shadow prices.
//! Buys whenever an ask undercuts shadow by more than the margin, sells
//! whenever a bid exceeds shadow by more than the margin, and otherwise
//! sometimes posts a listing priced just inside its shadow to tempt the
//! market across the spread. Variability widens the margin.

use crate::models::chemical::Chemical;
use crate::models::negotiation::NegotiationType;
use crate::strategy::{
    MarketAction, NegotiationResponse, ResponseKind, StrategyContext, TradingStrategy,
};

/// Margin before variability widening
const BASE_MARGIN: f64 = 0.1;

/// Chance per pass of posting a listing when no arbitrage exists
const IDLE_LISTING_CHANCE: f64 = 0.3;

/// Gallons per opportunistic trade when the listing does not say
const DEFAULT_QUANTITY: f64 = 50.0;

/// Rounds of countering before walking away
const MAX_COUNTER_ROUNDS: usize = 4;

pub struct ShadowPriceArbitrageStrategy {
    margin: f64,
}

impl ShadowPriceArbitrageStrategy {
    pub fn new(variability: f64) -> Self {
        Self {
            margin: BASE_MARGIN * (1.0 + variability),
        }
    }

    /// Highest price worth paying for a chemical
    fn buy_ceiling(&self, shadow: f64) -> f64 {
        shadow * (1.0 - self.margin)
    }

    /// Lowest price worth selling a chemical at
    fn sell_floor(&self, shadow: f64) -> f64 {
        shadow * (1.0 + self.margin)
    }
}

impl TradingStrategy for ShadowPriceArbitrageStrategy {
    fn decide_trade(&mut self, ctx: &mut StrategyContext<'_>) -> Option<MarketAction> {
        let shadow = ctx.shadow?;

        // Undervalued asks: buy.
        for &chemical in Chemical::ALL.iter() {
            let ceiling = self.buy_ceiling(shadow.get(chemical));
            if ceiling <= 0.0 {
                continue;
            }
            if let Some(listing) = ctx.sell_listings(chemical).first() {
                if let Some(ask) = listing.price_bound() {
                    let quantity = listing.quantity().unwrap_or(DEFAULT_QUANTITY);
                    if ask < ceiling && ctx.funds >= ask * quantity {
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
        }

        // Overvalued bids: sell.
        for &chemical in Chemical::ALL.iter() {
            if ctx.holding(chemical) <= 0.0 {
                continue;
            }
            let floor = self.sell_floor(shadow.get(chemical));
            if let Some(listing) = ctx.buy_listings(chemical).first() {
                if let Some(bid) = listing.price_bound() {
                    if bid > floor {
                        let quantity = listing
                            .quantity()
                            .unwrap_or(DEFAULT_QUANTITY)
                            .min(ctx.holding(chemical));
                        return Some(MarketAction::AcceptBuyOrder {
                            listing_id: listing.id().to_string(),
                            quantity,
                            price: bid,
                        });
                    }
                }
            }
        }

        // No spread to capture: occasionally post a listing a hair inside
        // the shadow price and wait for the market to come to it.
        if !ctx.rng.chance(IDLE_LISTING_CHANCE) {
            return None;
        }
        let (bottleneck, high) = shadow.highest();
        if high > 0.0 && ctx.funds > 0.0 {
            return Some(MarketAction::CreateBuyOrder {
                chemical: bottleneck,
                quantity: Some(DEFAULT_QUANTITY),
                max_price: self.buy_ceiling(high),
            });
        }
        let (excess, low) = shadow.lowest();
        let held = ctx.holding(excess);
        if held > 0.0 {
            return Some(MarketAction::CreateOffer {
                chemical: excess,
                quantity: held.min(DEFAULT_QUANTITY),
                asking_price: self.sell_floor(low).max(1.0),
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
        let chemical_shadow = shadow.get(negotiation.chemical());
        let selling = negotiation.seller_id() == ctx.team_id;

        let acceptable = if selling {
            offer.price > self.sell_floor(chemical_shadow)
                && ctx.inventory.has(negotiation.chemical(), offer.quantity)
        } else {
            offer.price < self.buy_ceiling(chemical_shadow) && ctx.funds >= offer.total()
        };

        if acceptable {
            return Some(NegotiationResponse {
                negotiation_id: negotiation.id().to_string(),
                kind: ResponseKind::Accept,
                react_intensity: None,
            });
        }

        if negotiation.round() < MAX_COUNTER_ROUNDS {
            let price = if selling {
                self.sell_floor(chemical_shadow).max(0.01)
            } else {
                self.buy_ceiling(chemical_shadow).max(0.01)
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
    use crate::models::listing::{Listing, ListingDirection};
    use crate::rng::DeterministicRng;
    use crate::solver;

    #[test]
    fn test_buys_ask_below_shadow_minus_margin() {
        let mut strategy = ShadowPriceArbitrageStrategy::new(0.0);
        let inventory = Inventory::uniform(1000.0);
        let shadows = solver::shadow_prices(&inventory).unwrap();
        // N shadow is 240; an ask of 10 is deep inside the margin
        let listings = vec![Listing::new(
            "TEAM_B".to_string(),
            Chemical::N,
            ListingDirection::Sell,
            Some(20.0),
            Some(10.0),
            0,
        )];
        let mut rng = DeterministicRng::new(11);
        let mut ctx = StrategyContext {
            team_id: "TEAM_A",
            inventory: &inventory,
            funds: 10_000.0,
            shadow: Some(&shadows),
            plan: None,
            listings: &listings,
            negotiations: &[],
            pass: 1,
            rng: &mut rng,
        };
        match strategy.decide_trade(&mut ctx) {
            Some(MarketAction::InitiateNegotiation {
                chemical,
                kind,
                price,
                ..
            }) => {
                assert_eq!(chemical, Chemical::N);
                assert_eq!(kind, NegotiationType::Buy);
                assert_eq!(price, 10.0);
            }
            other => panic!("expected a buy initiation, got {:?}", other),
        }
    }

    #[test]
    fn test_ignores_ask_inside_margin() {
        let mut strategy = ShadowPriceArbitrageStrategy::new(0.0);
        let inventory = Inventory::uniform(1000.0);
        let shadows = solver::shadow_prices(&inventory).unwrap();
        // C shadow is 56; margin 10% puts the ceiling at 50.4
        let listings = vec![Listing::new(
            "TEAM_B".to_string(),
            Chemical::C,
            ListingDirection::Sell,
            Some(20.0),
            Some(55.0),
            0,
        )];
        let mut rng = DeterministicRng::new(11);
        let mut ctx = StrategyContext {
            team_id: "TEAM_A",
            inventory: &inventory,
            funds: 10_000.0,
            shadow: Some(&shadows),
            plan: None,
            listings: &listings,
            negotiations: &[],
            pass: 1,
            rng: &mut rng,
        };
        // The only possible action is the probabilistic idle listing
        match strategy.decide_trade(&mut ctx) {
            None
            | Some(MarketAction::CreateBuyOrder { .. })
            | Some(MarketAction::CreateOffer { .. }) => {}
            other => panic!("must not trade against the listed ask, got {:?}", other),
        }
    }
}
