//! Expert strategy
//!
//! Plays the full optimizer. Buys chemicals whose shadow price clears a
//! threshold and that the team is short of, sells only the surplus the
//! optimal plan would leave unconsumed, and negotiates on a five-round
//! concession schedule: each round it counters with a price interpolated
//! further from its own optimum toward the counterparty's latest offer,
//! never crossing a walk-away bound of 85%-115% of shadow depending on
//! role, with an escalating reaction signal as the rounds grind on.
//!
//! Its shadow prices are cached and only recomputed from the context
//! after every second completed trade, the one piece of cross-pass state
//! any strategy carries.

use crate::models::chemical::Chemical;
use crate::models::negotiation::NegotiationType;
use crate::solver::ShadowPrices;
use crate::strategy::{
    MarketAction, NegotiationResponse, ResponseKind, StrategyContext, TradingStrategy,
};

/// Completed trades between shadow-price refreshes
const REFRESH_EVERY_TRADES: u32 = 2;

/// Concession schedule length
const MAX_ROUNDS: usize = 5;

/// Shadow price a chemical must clear before it is worth chasing
const BUY_SHADOW_THRESHOLD: f64 = 10.0;

/// Gallons of plan surplus worth selling
const SURPLUS_THRESHOLD: f64 = 10.0;

/// Buyer optimum and walk-away as multiples of shadow; the seller's are
/// the mirror image
const BUYER_OPTIMUM: f64 = 0.85;
const BUYER_WALKAWAY: f64 = 1.15;

pub struct ExpertStrategy {
    variability: f64,
    cached_shadow: Option<ShadowPrices>,
    trades_since_refresh: u32,
}

impl ExpertStrategy {
    pub fn new(variability: f64) -> Self {
        Self {
            variability,
            cached_shadow: None,
            trades_since_refresh: 0,
        }
    }

    /// Refresh the cache from the context when due, then hand it out
    fn shadow(&mut self, fresh: &ShadowPrices) -> &ShadowPrices {
        if self.cached_shadow.is_none() || self.trades_since_refresh >= REFRESH_EVERY_TRADES {
            self.cached_shadow = Some(fresh.clone());
            self.trades_since_refresh = 0;
        }
        self.cached_shadow.as_ref().expect("cache was just filled")
    }

    /// Price to counter with on round `r`: interpolate from own optimum
    /// toward the counterparty, clamped to the walk-away bound
    fn concession_price(own_optimum: f64, walkaway: f64, counterparty: f64, round: usize) -> f64 {
        let compromise = (round.min(MAX_ROUNDS) as f64 - 1.0) / (MAX_ROUNDS as f64 - 1.0);
        let target = own_optimum + compromise * (counterparty - own_optimum);
        if own_optimum <= walkaway {
            target.clamp(own_optimum, walkaway)
        } else {
            target.clamp(walkaway, own_optimum)
        }
    }

    /// Reaction intensity grows with the remaining price gap and the round
    fn react_intensity(gap_ratio: f64, round: usize) -> u8 {
        (gap_ratio.abs() * 40.0 * round as f64).min(100.0) as u8
    }
}

impl TradingStrategy for ExpertStrategy {
    fn decide_trade(&mut self, ctx: &mut StrategyContext<'_>) -> Option<MarketAction> {
        let fresh = ctx.shadow?;
        let plan = ctx.plan?;
        let shadow = self.shadow(fresh).clone();

        // Buy leg: the scarcest high-value chemical.
        let mean_holding = ctx.inventory.total() / Chemical::ALL.len() as f64;
        let mut target: Option<(Chemical, f64)> = None;
        for &chemical in Chemical::ALL.iter() {
            let value = shadow.get(chemical);
            if value > BUY_SHADOW_THRESHOLD
                && ctx.holding(chemical) < mean_holding
                && target.map_or(true, |(_, v)| value > v)
            {
                target = Some((chemical, value));
            }
        }
        if let Some((chemical, value)) = target {
            let optimum = value * BUYER_OPTIMUM;
            let walkaway = value * BUYER_WALKAWAY;
            if let Some(listing) = ctx.sell_listings(chemical).first() {
                if let Some(ask) = listing.price_bound() {
                    let quantity = listing.quantity().unwrap_or(mean_holding).max(1.0);
                    if ask <= walkaway && ctx.funds >= optimum.min(ask) * quantity {
                        // Open at our optimum, not their ask
                        return Some(MarketAction::InitiateNegotiation {
                            responder_id: listing.team_id().to_string(),
                            chemical,
                            kind: NegotiationType::Buy,
                            quantity,
                            price: optimum.min(ask),
                            listing_id: Some(listing.id().to_string()),
                        });
                    }
                }
            }
            if ctx.funds > 0.0 {
                return Some(MarketAction::CreateBuyOrder {
                    chemical,
                    quantity: None,
                    max_price: optimum,
                });
            }
        }

        // Sell leg: the plan's unconsumed surplus.
        let surplus = plan.surplus(ctx.inventory);
        let mut sale: Option<(Chemical, f64)> = None;
        for &chemical in Chemical::ALL.iter() {
            let extra = surplus.get(chemical);
            if extra > SURPLUS_THRESHOLD && sale.map_or(true, |(_, e)| extra > e) {
                sale = Some((chemical, extra));
            }
        }
        if let Some((chemical, extra)) = sale {
            let value = shadow.get(chemical);
            let floor = (value * BUYER_OPTIMUM).max(1.0);
            if let Some(listing) = ctx.buy_listings(chemical).first() {
                if let Some(bid) = listing.price_bound() {
                    if bid >= floor {
                        let quantity = listing.quantity().unwrap_or(extra).min(extra);
                        return Some(MarketAction::AcceptBuyOrder {
                            listing_id: listing.id().to_string(),
                            quantity,
                            price: bid,
                        });
                    }
                }
            }
            return Some(MarketAction::CreateOffer {
                chemical,
                quantity: extra,
                asking_price: (value * BUYER_WALKAWAY).max(1.0),
            });
        }

        None
    }

    fn respond_to_negotiations(
        &mut self,
        ctx: &mut StrategyContext<'_>,
    ) -> Option<NegotiationResponse> {
        let fresh = ctx.shadow?;
        let shadow = self.shadow(fresh).clone();
        let negotiation = ctx.negotiations.first()?;
        let offer = negotiation.latest_offer();
        let chemical = negotiation.chemical();
        let selling = negotiation.seller_id() == ctx.team_id;
        let value = shadow.get(chemical);

        if selling && value <= 0.0 && !ctx.inventory.has(chemical, offer.quantity) {
            return Some(NegotiationResponse {
                negotiation_id: negotiation.id().to_string(),
                kind: ResponseKind::Reject,
                react_intensity: None,
            });
        }

        // Variability jitters the optimum by a few percent either way.
        let jitter = 1.0 + self.variability * ctx.rng.range_f64(-0.05, 0.05);
        let (optimum, walkaway) = if selling {
            (value * (2.0 - BUYER_OPTIMUM) * jitter, value * (2.0 - BUYER_WALKAWAY))
        } else {
            (value * BUYER_OPTIMUM * jitter, value * BUYER_WALKAWAY)
        };

        let round = negotiation.round();
        let target = Self::concession_price(optimum, walkaway, offer.price, round);

        let within_target = if selling {
            offer.price >= target
        } else {
            offer.price <= target
        };
        let within_walkaway = if selling {
            offer.price >= walkaway
        } else {
            offer.price <= walkaway
        };
        let can_honor = if selling {
            ctx.inventory.has(chemical, offer.quantity)
        } else {
            ctx.funds >= offer.total()
        };

        if within_target && can_honor {
            return Some(NegotiationResponse {
                negotiation_id: negotiation.id().to_string(),
                kind: ResponseKind::Accept,
                react_intensity: None,
            });
        }

        if round >= MAX_ROUNDS {
            // Last word: take anything inside the walk-away bound.
            let kind = if within_walkaway && can_honor {
                ResponseKind::Accept
            } else {
                ResponseKind::Reject
            };
            return Some(NegotiationResponse {
                negotiation_id: negotiation.id().to_string(),
                kind,
                react_intensity: None,
            });
        }

        let gap_ratio = (offer.price - target) / value.max(0.01);
        Some(NegotiationResponse {
            negotiation_id: negotiation.id().to_string(),
            kind: ResponseKind::Counter {
                quantity: offer.quantity,
                price: target.max(0.01),
            },
            react_intensity: Some(Self::react_intensity(gap_ratio, round)),
        })
    }

    fn on_trade_completed(&mut self) {
        self.trades_since_refresh += 1;
    }
}
