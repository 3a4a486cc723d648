//! Novice strategy
//!
//! Flat thresholds, no optimizer dependency: sell any holding above 50
//! gallons as long as the price is at least $2.00/gal, buy any chemical
//! the team holds less than 500 gallons of at up to $5.00/gal. Prefers
//! trading against an existing listing over posting a new one.

use crate::models::chemical::Chemical;
use crate::models::negotiation::NegotiationType;
use crate::strategy::{
    MarketAction, NegotiationResponse, ResponseKind, StrategyContext, TradingStrategy,
};

/// Keep this much of every chemical; sell anything above it
const SELL_ABOVE: f64 = 50.0;

/// Buy chemicals the team holds less of than this
const BUY_BELOW: f64 = 500.0;

/// Minimum acceptable sale price, dollars per gallon
const MIN_SELL_PRICE: f64 = 2.0;

/// Maximum acceptable purchase price, dollars per gallon
const MAX_BUY_PRICE: f64 = 5.0;

/// Rounds of countering before the Novice walks away
const MAX_COUNTER_ROUNDS: usize = 3;

pub struct NoviceStrategy;

impl NoviceStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoviceStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl TradingStrategy for NoviceStrategy {
    fn decide_trade(&mut self, ctx: &mut StrategyContext<'_>) -> Option<MarketAction> {
        // No thresholds depend on the solver, but the shared contract is
        // that an unevaluable inventory means no action at all.
        ctx.shadow?;

        // Sell into the best open bid for anything held above the floor.
        for &chemical in Chemical::ALL.iter() {
            let excess = ctx.holding(chemical) - SELL_ABOVE;
            if excess <= 0.0 {
                continue;
            }
            if let Some(listing) = ctx.buy_listings(chemical).first() {
                if let Some(bid) = listing.price_bound() {
                    if bid >= MIN_SELL_PRICE {
                        let quantity = listing.quantity().unwrap_or(excess).min(excess);
                        return Some(MarketAction::AcceptBuyOrder {
                            listing_id: listing.id().to_string(),
                            quantity,
                            price: bid,
                        });
                    }
                }
            }
        }

        // Buy from the cheapest open ask for anything held below the cap.
        for &chemical in Chemical::ALL.iter() {
            let wanted = BUY_BELOW - ctx.holding(chemical);
            if wanted <= 0.0 {
                continue;
            }
            if let Some(listing) = ctx.sell_listings(chemical).first() {
                if let Some(ask) = listing.price_bound() {
                    if ask <= MAX_BUY_PRICE && ctx.funds >= ask * wanted.min(SELL_ABOVE) {
                        let quantity = listing.quantity().unwrap_or(wanted).min(wanted);
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

        // No listing to trade against: post one of our own.
        for &chemical in Chemical::ALL.iter() {
            let excess = ctx.holding(chemical) - SELL_ABOVE;
            if excess > 0.0 {
                return Some(MarketAction::CreateOffer {
                    chemical,
                    quantity: excess,
                    asking_price: MIN_SELL_PRICE,
                });
            }
        }
        for &chemical in Chemical::ALL.iter() {
            let wanted = BUY_BELOW - ctx.holding(chemical);
            if wanted > 0.0 {
                return Some(MarketAction::CreateBuyOrder {
                    chemical,
                    quantity: Some(wanted),
                    max_price: MAX_BUY_PRICE,
                });
            }
        }

        None
    }

    fn respond_to_negotiations(
        &mut self,
        ctx: &mut StrategyContext<'_>,
    ) -> Option<NegotiationResponse> {
        ctx.shadow?;
        let negotiation = ctx.negotiations.first()?;
        let offer = negotiation.latest_offer();
        let chemical = negotiation.chemical();
        let selling = negotiation.seller_id() == ctx.team_id;

        let acceptable = if selling {
            offer.price >= MIN_SELL_PRICE
                && ctx.holding(chemical) - offer.quantity >= SELL_ABOVE
        } else {
            offer.price <= MAX_BUY_PRICE
                && ctx.holding(chemical) < BUY_BELOW
                && ctx.funds >= offer.total()
        };

        if acceptable {
            return Some(NegotiationResponse {
                negotiation_id: negotiation.id().to_string(),
                kind: ResponseKind::Accept,
                react_intensity: None,
            });
        }

        if negotiation.round() < MAX_COUNTER_ROUNDS {
            // Counter straight at the threshold; the Novice knows exactly
            // one price.
            let price = if selling { MIN_SELL_PRICE } else { MAX_BUY_PRICE };
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
