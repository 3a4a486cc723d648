//! NPC trading strategies
//!
//! Each skill level is one [`TradingStrategy`] implementation. The runner
//! hands every strategy the same read view ([`StrategyContext`]) and asks
//! two questions per pass: "do you want to make a market move?"
//! ([`TradingStrategy::decide_trade`]) and "do you want to respond to one
//! of your open negotiations?"
//! ([`TradingStrategy::respond_to_negotiations`]). Each answer is at most
//! one action; strategies never batch and never block.
//!
//! Strategies are stateless apart from constructor-injected parameters
//! (variability, RecipeBalancing's specialization) and the Expert's
//! shadow-price cache. All randomness flows through the context's
//! deterministic RNG, so a seeded session replays identically.

mod arbitrage;
mod beginner;
mod bottleneck;
mod expert;
mod novice;
mod recipe;

pub use arbitrage::ShadowPriceArbitrageStrategy;
pub use beginner::BeginnerStrategy;
pub use bottleneck::BottleneckEliminationStrategy;
pub use expert::ExpertStrategy;
pub use novice::NoviceStrategy;
pub use recipe::RecipeBalancingStrategy;

use crate::models::chemical::Chemical;
use crate::models::inventory::Inventory;
use crate::models::listing::{Listing, ListingDirection};
use crate::models::negotiation::{Negotiation, NegotiationType};
use crate::models::npc::{NpcAgent, SkillLevel};
use crate::rng::DeterministicRng;
use crate::solver::{ProductionPlan, ShadowPrices};

/// Read view a strategy decides from
///
/// The runner builds one context per NPC per pass. `listings` excludes the
/// NPC's own listings; `negotiations` is pre-filtered to pending
/// negotiations the NPC may respond to (it is a party and did not make the
/// latest offer). `shadow` and `plan` are `None` when the solver could not
/// evaluate the NPC's inventory, in which case every strategy declines to
/// act.
pub struct StrategyContext<'a> {
    /// Team the deciding NPC trades for
    pub team_id: &'a str,

    /// The NPC team's current inventory
    pub inventory: &'a Inventory,

    /// The NPC team's current funds
    pub funds: f64,

    /// Shadow prices of the NPC's inventory, if the solver succeeded
    pub shadow: Option<&'a ShadowPrices>,

    /// Optimal production plan for the NPC's inventory, if the solver
    /// succeeded
    pub plan: Option<&'a ProductionPlan>,

    /// Open listings from other teams, oldest first
    pub listings: &'a [Listing],

    /// Pending negotiations this NPC may respond to, oldest first
    pub negotiations: &'a [Negotiation],

    /// Current pass number
    pub pass: u64,

    /// Session RNG
    pub rng: &'a mut DeterministicRng,
}

impl<'a> StrategyContext<'a> {
    /// Gallons of one chemical the NPC currently holds
    pub fn holding(&self, chemical: Chemical) -> f64 {
        self.inventory.get(chemical)
    }

    /// Open sell listings for a chemical, cheapest first
    pub fn sell_listings(&self, chemical: Chemical) -> Vec<&Listing> {
        let mut found: Vec<&Listing> = self
            .listings
            .iter()
            .filter(|l| {
                l.is_open()
                    && l.chemical() == chemical
                    && l.direction() == ListingDirection::Sell
            })
            .collect();
        found.sort_by(|a, b| {
            let pa = a.price_bound().unwrap_or(f64::INFINITY);
            let pb = b.price_bound().unwrap_or(f64::INFINITY);
            pa.partial_cmp(&pb)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id().cmp(b.id()))
        });
        found
    }

    /// Open buy listings for a chemical, highest bid first
    pub fn buy_listings(&self, chemical: Chemical) -> Vec<&Listing> {
        let mut found: Vec<&Listing> = self
            .listings
            .iter()
            .filter(|l| {
                l.is_open()
                    && l.chemical() == chemical
                    && l.direction() == ListingDirection::Buy
            })
            .collect();
        found.sort_by(|a, b| {
            let pa = a.price_bound().unwrap_or(0.0);
            let pb = b.price_bound().unwrap_or(0.0);
            pb.partial_cmp(&pa)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id().cmp(b.id()))
        });
        found
    }
}

/// A single market move proposed by `decide_trade`
#[derive(Debug, Clone, PartialEq)]
pub enum MarketAction {
    /// Open a negotiation with another team
    InitiateNegotiation {
        responder_id: String,
        chemical: Chemical,
        kind: NegotiationType,
        quantity: f64,
        price: f64,
        listing_id: Option<String>,
    },

    /// Post a buy listing (wanted ad)
    CreateBuyOrder {
        chemical: Chemical,
        quantity: Option<f64>,
        max_price: f64,
    },

    /// Post a priced sell listing
    CreateOffer {
        chemical: Chemical,
        quantity: f64,
        asking_price: f64,
    },

    /// Sell into another team's open buy listing at its bid
    AcceptBuyOrder {
        listing_id: String,
        quantity: f64,
        price: f64,
    },
}

/// How to respond to one pending negotiation
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseKind {
    /// Accept the latest offer as it stands
    Accept,
    /// Propose new terms
    Counter { quantity: f64, price: f64 },
    /// Walk away
    Reject,
}

/// A single negotiation response proposed by `respond_to_negotiations`
#[derive(Debug, Clone, PartialEq)]
pub struct NegotiationResponse {
    /// Negotiation being answered
    pub negotiation_id: String,

    /// The response itself
    pub kind: ResponseKind,

    /// Optional non-binding displeasure signal to post alongside
    pub react_intensity: Option<u8>,
}

/// One NPC skill level's decision logic
///
/// Both methods return at most one action, or `None` when nothing is
/// warranted this pass. A strategy must return `None` rather than fail
/// when `ctx.shadow` is unavailable.
pub trait TradingStrategy: Send {
    /// Propose at most one market move
    fn decide_trade(&mut self, ctx: &mut StrategyContext<'_>) -> Option<MarketAction>;

    /// Respond to at most one pending negotiation
    fn respond_to_negotiations(
        &mut self,
        ctx: &mut StrategyContext<'_>,
    ) -> Option<NegotiationResponse>;

    /// Notification that a trade involving this NPC's team settled
    ///
    /// Only the Expert uses this (its shadow-price cache refreshes every
    /// two completed trades); the default is a no-op.
    fn on_trade_completed(&mut self) {}
}

/// Build the strategy implementation for an NPC
///
/// # Arguments
/// * `agent` - The NPC configuration (skill level and variability)
/// * `starting_inventory` - Inventory at construction time; fixes
///   RecipeBalancing's one-time specialization
pub fn build_strategy(agent: &NpcAgent, starting_inventory: &Inventory) -> Box<dyn TradingStrategy> {
    match agent.skill {
        SkillLevel::Beginner => Box::new(BeginnerStrategy::new(agent.variability)),
        SkillLevel::Novice => Box::new(NoviceStrategy::new()),
        SkillLevel::ShadowPriceArbitrage => {
            Box::new(ShadowPriceArbitrageStrategy::new(agent.variability))
        }
        SkillLevel::BottleneckElimination => {
            Box::new(BottleneckEliminationStrategy::new(agent.variability))
        }
        SkillLevel::RecipeBalancing => {
            Box::new(RecipeBalancingStrategy::new(starting_inventory))
        }
        SkillLevel::Expert => Box::new(ExpertStrategy::new(agent.variability)),
    }
}
