//! Chemical Trading Core - Rust Engine
//!
//! Economic core of a multi-team chemical-trading simulation with
//! deterministic execution.
//!
//! # Architecture
//!
//! - **models**: Domain types (Chemical, Inventory, Team, Listing,
//!   Negotiation, NPC agents, market state, events)
//! - **solver**: Linear production planning and shadow prices
//! - **exchange**: Trade execution (listings, negotiations, settlement)
//! - **strategy**: The six NPC trading strategies
//! - **runner**: NPC processing passes and session checkpointing
//! - **clock**: Pass throttling
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All quantities are gallons, all prices dollars per gallon (f64 with
//!    explicit epsilons)
//! 2. Negotiation acceptance is the only path that moves chemicals and
//!    funds, and it moves both atomically
//! 3. All randomness is deterministic (seeded RNG)

// Module declarations
pub mod clock;
pub mod exchange;
pub mod models;
pub mod rng;
pub mod runner;
pub mod solver;
pub mod strategy;

// Re-exports for convenience
pub use clock::PassClock;
pub use exchange::{
    accept_offer, counter_offer, create_listing, initiate_negotiation, post_reaction,
    reject_offer, ExchangeError, TradeReceipt,
};
pub use models::{
    chemical::{Chemical, Product},
    event::{Event, EventLog},
    inventory::{Inventory, InventoryError},
    listing::{Listing, ListingDirection},
    negotiation::{Negotiation, NegotiationError, NegotiationStatus, NegotiationType, Offer},
    npc::{NpcAgent, SkillLevel},
    state::MarketState,
    team::{Team, TeamError},
};
pub use rng::DeterministicRng;
pub use runner::{NpcEngineConfig, NpcRunner, PassResult, RunnerError, SessionSnapshot};
pub use solver::{ProductionPlan, ShadowPrices, SolverError};
pub use strategy::{
    build_strategy, MarketAction, NegotiationResponse, ResponseKind, StrategyContext,
    TradingStrategy,
};
