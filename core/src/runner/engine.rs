//! NPC runner
//!
//! Drives every active NPC through one decision round per pass:
//!
//! ```text
//! For each pass:
//! 1. Throttle check (PassClock; denied passes do nothing)
//! 2. For each active NPC, in config order:
//!    a. Solve the team's production plan and shadow prices
//!    b. Ask the strategy for one market action; apply it
//!    c. Ask the strategy for one negotiation response; apply it
//! 3. Log a pass summary event
//! ```
//!
//! Failures degrade, never abort: a solver failure hands the strategy an
//! empty context (it declines to act), a resource-insufficient accept is
//! converted into a reject, and any protocol error from the exchange
//! engine simply costs the NPC its action for the pass.
//!
//! # Example
//!
//! ```
//! use chemtrade_core_rs::{
//!     Inventory, MarketState, NpcAgent, NpcEngineConfig, NpcRunner, SkillLevel, Team,
//! };
//!
//! let config = NpcEngineConfig {
//!     rng_seed: 42,
//!     min_pass_interval_secs: 10,
//!     npcs: vec![NpcAgent::new(
//!         "npc-1".to_string(),
//!         "TEAM_A".to_string(),
//!         SkillLevel::Novice,
//!         0.0,
//!     )],
//! };
//! let mut state = MarketState::new(vec![
//!     Team::new("TEAM_A".to_string(), Inventory::uniform(1000.0), 10_000.0),
//!     Team::new("TEAM_B".to_string(), Inventory::uniform(1000.0), 10_000.0),
//! ]);
//! let mut runner = NpcRunner::new(config).unwrap();
//!
//! let result = runner.process_pass(&mut state, 0).unwrap();
//! assert!(result.ran);
//! let throttled = runner.process_pass(&mut state, 5).unwrap();
//! assert!(!throttled.ran);
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::PassClock;
use crate::exchange::{self, ExchangeError};
use crate::models::event::{Event, EventLog};
use crate::models::listing::{Listing, ListingDirection};
use crate::models::negotiation::{Negotiation, NegotiationType};
use crate::models::npc::NpcAgent;
use crate::models::state::MarketState;
use crate::rng::DeterministicRng;
use crate::solver;
use crate::strategy::{
    build_strategy, MarketAction, NegotiationResponse, ResponseKind, StrategyContext,
    TradingStrategy,
};

/// Default minimum seconds between passes
pub const DEFAULT_PASS_INTERVAL_SECS: u64 = 10;

/// Complete runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcEngineConfig {
    /// Seed for the session RNG
    pub rng_seed: u64,

    /// Minimum seconds between passes
    pub min_pass_interval_secs: u64,

    /// Every NPC in the session, processed in this order
    pub npcs: Vec<NpcAgent>,
}

impl NpcEngineConfig {
    /// Configuration with the default pass interval and no NPCs
    pub fn new(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            min_pass_interval_secs: DEFAULT_PASS_INTERVAL_SECS,
            npcs: Vec::new(),
        }
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<(), RunnerError> {
        let mut seen = HashSet::new();
        for npc in &self.npcs {
            if !seen.insert(npc.id.as_str()) {
                return Err(RunnerError::InvalidConfig(format!(
                    "duplicate NPC id: {}",
                    npc.id
                )));
            }
            if npc.id.is_empty() || npc.team_id.is_empty() {
                return Err(RunnerError::InvalidConfig(
                    "NPC and team ids must be non-empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Errors raised by the runner
#[derive(Debug, Error, PartialEq)]
pub enum RunnerError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Snapshot validation failed: {0}")]
    SnapshotValidation(String),

    #[error("Snapshot config hash mismatch: expected {expected}, got {actual}")]
    ConfigMismatch { expected: String, actual: String },
}

/// Per-pass summary counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassResult {
    /// Whether the pass ran or was throttled away
    pub ran: bool,

    /// Pass number (unchanged when throttled)
    pub pass: u64,

    /// Market actions applied
    pub actions_applied: usize,

    /// Negotiation responses applied
    pub responses_applied: usize,

    /// Trades executed by acceptances this pass
    pub trades_executed: usize,

    /// Listings posted this pass
    pub listings_posted: usize,

    /// Active NPCs skipped (unknown team)
    pub npcs_skipped: usize,
}

/// Drives all NPC strategies against a market
pub struct NpcRunner {
    config: NpcEngineConfig,
    strategies: HashMap<String, Box<dyn TradingStrategy>>,
    rng: DeterministicRng,
    clock: PassClock,
    events: EventLog,
    passes: u64,
}

impl NpcRunner {
    /// Create a runner from a validated configuration
    pub fn new(config: NpcEngineConfig) -> Result<Self, RunnerError> {
        config.validate()?;
        let rng = DeterministicRng::new(config.rng_seed);
        let clock = PassClock::new(config.min_pass_interval_secs);
        Ok(Self {
            config,
            strategies: HashMap::new(),
            rng,
            clock,
            events: EventLog::new(),
            passes: 0,
        })
    }

    /// The runner configuration
    pub fn config(&self) -> &NpcEngineConfig {
        &self.config
    }

    /// Event log accumulated so far
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Passes that have actually run
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// The session RNG (read-only; useful for snapshot assertions)
    pub fn rng(&self) -> &DeterministicRng {
        &self.rng
    }

    pub(crate) fn clock(&self) -> &PassClock {
        &self.clock
    }

    pub(crate) fn restore_parts(
        config: NpcEngineConfig,
        rng: DeterministicRng,
        clock: PassClock,
        passes: u64,
    ) -> Result<Self, RunnerError> {
        config.validate()?;
        Ok(Self {
            config,
            strategies: HashMap::new(),
            rng,
            clock,
            events: EventLog::new(),
            passes,
        })
    }

    /// Run one NPC pass if the throttle allows it
    ///
    /// # Arguments
    /// * `state` - The market to act on
    /// * `now_secs` - Caller-supplied clock reading in seconds
    ///
    /// # Returns
    /// A [`PassResult`]; `ran` is false when the pass was throttled and
    /// nothing happened.
    pub fn process_pass(
        &mut self,
        state: &mut MarketState,
        now_secs: u64,
    ) -> Result<PassResult, RunnerError> {
        if !self.clock.try_begin_pass(now_secs) {
            return Ok(PassResult {
                ran: false,
                pass: self.passes,
                ..PassResult::default()
            });
        }

        self.passes += 1;
        let pass = self.passes;
        let mut result = PassResult {
            ran: true,
            pass,
            ..PassResult::default()
        };

        let npcs: Vec<NpcAgent> = self.config.npcs.clone();
        for npc in npcs.iter().filter(|n| n.active) {
            if state.get_team(&npc.team_id).is_none() {
                result.npcs_skipped += 1;
                continue;
            }
            self.ensure_strategy(npc, state);

            if let Some(action) = self.decide(npc, state, pass) {
                self.apply_market_action(state, npc, action, pass, &mut result);
            }
            if let Some(response) = self.respond(npc, state, pass) {
                self.apply_response(state, npc, response, pass, &mut result);
            }
        }

        self.events.push(Event::NpcPass {
            pass,
            actions_taken: result.actions_applied,
            responses_taken: result.responses_applied,
        });
        Ok(result)
    }

    fn ensure_strategy(&mut self, npc: &NpcAgent, state: &MarketState) {
        if self.strategies.contains_key(&npc.id) {
            return;
        }
        if let Some(team) = state.get_team(&npc.team_id) {
            self.strategies
                .insert(npc.id.clone(), build_strategy(npc, team.inventory()));
        }
    }

    /// Ask one strategy for a market action
    fn decide(&mut self, npc: &NpcAgent, state: &MarketState, pass: u64) -> Option<MarketAction> {
        let (inventory, funds) = {
            let team = state.get_team(&npc.team_id)?;
            (team.inventory().clone(), team.funds())
        };
        let plan = solver::solve(&inventory).ok();
        let shadow = plan
            .as_ref()
            .and_then(|p| solver::shadow_prices_with_base(&inventory, p).ok());

        let listings: Vec<Listing> = state
            .all_open_listings()
            .into_iter()
            .filter(|l| l.team_id() != npc.team_id)
            .cloned()
            .collect();
        let negotiations = self.respondable_negotiations(state, &npc.team_id);

        let strategy = self.strategies.get_mut(&npc.id)?;
        let mut ctx = StrategyContext {
            team_id: &npc.team_id,
            inventory: &inventory,
            funds,
            shadow: shadow.as_ref(),
            plan: plan.as_ref(),
            listings: &listings,
            negotiations: &negotiations,
            pass,
            rng: &mut self.rng,
        };
        strategy.decide_trade(&mut ctx)
    }

    /// Ask one strategy for a negotiation response
    fn respond(
        &mut self,
        npc: &NpcAgent,
        state: &MarketState,
        pass: u64,
    ) -> Option<NegotiationResponse> {
        let (inventory, funds) = {
            let team = state.get_team(&npc.team_id)?;
            (team.inventory().clone(), team.funds())
        };
        let plan = solver::solve(&inventory).ok();
        let shadow = plan
            .as_ref()
            .and_then(|p| solver::shadow_prices_with_base(&inventory, p).ok());

        let negotiations = self.respondable_negotiations(state, &npc.team_id);
        if negotiations.is_empty() {
            return None;
        }

        let strategy = self.strategies.get_mut(&npc.id)?;
        let mut ctx = StrategyContext {
            team_id: &npc.team_id,
            inventory: &inventory,
            funds,
            shadow: shadow.as_ref(),
            plan: plan.as_ref(),
            listings: &[],
            negotiations: &negotiations,
            pass,
            rng: &mut self.rng,
        };
        strategy.respond_to_negotiations(&mut ctx)
    }

    /// Pending negotiations the team holds the turn in, oldest first
    fn respondable_negotiations(&self, state: &MarketState, team_id: &str) -> Vec<Negotiation> {
        state
            .pending_negotiations_for(team_id)
            .into_iter()
            .filter(|n| n.can_respond(team_id))
            .cloned()
            .collect()
    }

    fn apply_market_action(
        &mut self,
        state: &mut MarketState,
        npc: &NpcAgent,
        action: MarketAction,
        pass: u64,
        result: &mut PassResult,
    ) {
        match action {
            MarketAction::InitiateNegotiation {
                responder_id,
                chemical,
                kind,
                quantity,
                price,
                listing_id,
            } => {
                if let Ok(id) = exchange::initiate_negotiation(
                    state,
                    &npc.team_id,
                    &responder_id,
                    chemical,
                    kind,
                    quantity,
                    price,
                    listing_id,
                    pass,
                ) {
                    self.events.push(Event::NegotiationInitiated {
                        pass,
                        negotiation_id: id,
                        initiator_id: npc.team_id.clone(),
                        responder_id,
                        chemical,
                    });
                    result.actions_applied += 1;
                }
            }
            MarketAction::CreateBuyOrder {
                chemical,
                quantity,
                max_price,
            } => {
                if let Ok(id) = exchange::create_listing(
                    state,
                    &npc.team_id,
                    chemical,
                    ListingDirection::Buy,
                    quantity,
                    Some(max_price),
                    pass,
                ) {
                    self.events.push(Event::ListingCreated {
                        pass,
                        listing_id: id,
                        team_id: npc.team_id.clone(),
                        chemical,
                    });
                    result.actions_applied += 1;
                    result.listings_posted += 1;
                }
            }
            MarketAction::CreateOffer {
                chemical,
                quantity,
                asking_price,
            } => {
                if let Ok(id) = exchange::create_listing(
                    state,
                    &npc.team_id,
                    chemical,
                    ListingDirection::Sell,
                    Some(quantity),
                    Some(asking_price),
                    pass,
                ) {
                    self.events.push(Event::ListingCreated {
                        pass,
                        listing_id: id,
                        team_id: npc.team_id.clone(),
                        chemical,
                    });
                    result.actions_applied += 1;
                    result.listings_posted += 1;
                }
            }
            MarketAction::AcceptBuyOrder {
                listing_id,
                quantity,
                price,
            } => {
                // Selling into a buy listing opens a sell negotiation with
                // the listing's owner at the proposed terms.
                let (owner, chemical) = match state.get_listing(&listing_id) {
                    Some(listing) if listing.is_open() => {
                        (listing.team_id().to_string(), listing.chemical())
                    }
                    _ => return,
                };
                if let Ok(id) = exchange::initiate_negotiation(
                    state,
                    &npc.team_id,
                    &owner,
                    chemical,
                    NegotiationType::Sell,
                    quantity,
                    price,
                    Some(listing_id),
                    pass,
                ) {
                    self.events.push(Event::NegotiationInitiated {
                        pass,
                        negotiation_id: id,
                        initiator_id: npc.team_id.clone(),
                        responder_id: owner,
                        chemical,
                    });
                    result.actions_applied += 1;
                }
            }
        }
    }

    fn apply_response(
        &mut self,
        state: &mut MarketState,
        npc: &NpcAgent,
        response: NegotiationResponse,
        pass: u64,
        result: &mut PassResult,
    ) {
        let NegotiationResponse {
            negotiation_id,
            kind,
            react_intensity,
        } = response;

        if let Some(intensity) = react_intensity {
            if exchange::post_reaction(state, &negotiation_id, &npc.team_id, intensity, pass)
                .is_ok()
            {
                self.events.push(Event::ReactionPosted {
                    pass,
                    negotiation_id: negotiation_id.clone(),
                    intensity,
                });
            }
        }

        match kind {
            ResponseKind::Accept => {
                match exchange::accept_offer(state, &negotiation_id, &npc.team_id, pass) {
                    Ok(receipt) => {
                        self.events.push(Event::NegotiationAccepted {
                            pass,
                            negotiation_id: negotiation_id.clone(),
                            actor_id: npc.team_id.clone(),
                        });
                        self.events.push(Event::TradeExecuted {
                            pass,
                            negotiation_id,
                            seller_id: receipt.seller_id.clone(),
                            buyer_id: receipt.buyer_id.clone(),
                            chemical: receipt.chemical,
                            quantity: receipt.quantity,
                            price: receipt.price,
                        });
                        result.responses_applied += 1;
                        result.trades_executed += 1;
                        self.notify_trade(&receipt.buyer_id, &receipt.seller_id);
                    }
                    Err(
                        ExchangeError::InsufficientInventory { .. }
                        | ExchangeError::InsufficientFunds { .. },
                    ) => {
                        // An accept the team cannot honor becomes a reject.
                        if exchange::reject_offer(state, &negotiation_id, &npc.team_id, pass)
                            .is_ok()
                        {
                            self.events.push(Event::NegotiationRejected {
                                pass,
                                negotiation_id,
                                actor_id: npc.team_id.clone(),
                            });
                            result.responses_applied += 1;
                        }
                    }
                    Err(_) => {}
                }
            }
            ResponseKind::Counter { quantity, price } => {
                if exchange::counter_offer(state, &negotiation_id, &npc.team_id, quantity, price)
                    .is_ok()
                {
                    self.events.push(Event::OfferCountered {
                        pass,
                        negotiation_id,
                        actor_id: npc.team_id.clone(),
                        quantity,
                        price,
                    });
                    result.responses_applied += 1;
                }
            }
            ResponseKind::Reject => {
                if exchange::reject_offer(state, &negotiation_id, &npc.team_id, pass).is_ok() {
                    self.events.push(Event::NegotiationRejected {
                        pass,
                        negotiation_id,
                        actor_id: npc.team_id.clone(),
                    });
                    result.responses_applied += 1;
                }
            }
        }
    }

    /// Let the strategies of both trading teams know a trade settled
    fn notify_trade(&mut self, buyer_id: &str, seller_id: &str) {
        for npc in &self.config.npcs {
            if npc.team_id == buyer_id || npc.team_id == seller_id {
                if let Some(strategy) = self.strategies.get_mut(&npc.id) {
                    strategy.on_trade_completed();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inventory::Inventory;
    use crate::models::npc::SkillLevel;
    use crate::models::team::Team;

    fn runner_with(skill: SkillLevel) -> (NpcRunner, MarketState) {
        let config = NpcEngineConfig {
            rng_seed: 99,
            min_pass_interval_secs: 10,
            npcs: vec![NpcAgent::new(
                "npc-1".to_string(),
                "TEAM_A".to_string(),
                skill,
                0.5,
            )],
        };
        let state = MarketState::new(vec![
            Team::new("TEAM_A".to_string(), Inventory::uniform(1000.0), 50_000.0),
            Team::new("TEAM_B".to_string(), Inventory::uniform(1000.0), 50_000.0),
        ]);
        (NpcRunner::new(config).unwrap(), state)
    }

    #[test]
    fn test_duplicate_npc_ids_rejected() {
        let mut config = NpcEngineConfig::new(1);
        config.npcs = vec![
            NpcAgent::new("npc-1".into(), "TEAM_A".into(), SkillLevel::Novice, 0.0),
            NpcAgent::new("npc-1".into(), "TEAM_B".into(), SkillLevel::Expert, 0.0),
        ];
        assert!(matches!(
            NpcRunner::new(config),
            Err(RunnerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_throttled_pass_changes_nothing() {
        let (mut runner, mut state) = runner_with(SkillLevel::Novice);
        let first = runner.process_pass(&mut state, 100).unwrap();
        assert!(first.ran);

        let funds_before = state.total_funds();
        let throttled = runner.process_pass(&mut state, 105).unwrap();
        assert!(!throttled.ran);
        assert_eq!(throttled.actions_applied, 0);
        assert_eq!(state.total_funds(), funds_before);
        assert_eq!(runner.passes(), 1);
    }

    #[test]
    fn test_unknown_team_is_skipped_not_fatal() {
        let config = NpcEngineConfig {
            rng_seed: 1,
            min_pass_interval_secs: 0,
            npcs: vec![NpcAgent::new(
                "npc-ghost".to_string(),
                "NO_SUCH_TEAM".to_string(),
                SkillLevel::Expert,
                0.0,
            )],
        };
        let mut state = MarketState::new(vec![Team::new(
            "TEAM_A".to_string(),
            Inventory::uniform(100.0),
            1000.0,
        )]);
        let mut runner = NpcRunner::new(config).unwrap();
        let result = runner.process_pass(&mut state, 0).unwrap();
        assert!(result.ran);
        assert_eq!(result.npcs_skipped, 1);
    }

    #[test]
    fn test_funds_conserved_across_passes() {
        let config = NpcEngineConfig {
            rng_seed: 7,
            min_pass_interval_secs: 0,
            npcs: vec![
                NpcAgent::new("npc-1".into(), "TEAM_A".into(), SkillLevel::Expert, 0.2),
                NpcAgent::new("npc-2".into(), "TEAM_B".into(), SkillLevel::Novice, 0.8),
            ],
        };
        let mut state = MarketState::new(vec![
            Team::new(
                "TEAM_A".to_string(),
                Inventory::from_quantities(2000.0, 100.0, 500.0, 800.0),
                50_000.0,
            ),
            Team::new(
                "TEAM_B".to_string(),
                Inventory::from_quantities(50.0, 900.0, 900.0, 100.0),
                50_000.0,
            ),
        ]);
        let total_before = state.total_funds();
        let mut runner = NpcRunner::new(config).unwrap();
        for now in 0..20 {
            runner.process_pass(&mut state, now).unwrap();
        }
        assert!((state.total_funds() - total_before).abs() < 1e-6);
    }
}
