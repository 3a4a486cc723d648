//! Domain models
//!
//! Pure data types for the chemical market: chemicals and products,
//! inventories, teams, listings, negotiations, NPC agents, the market
//! state container, and the event log. Behaviour that crosses entity
//! boundaries (trades, NPC decisions) lives in the `exchange`, `solver`,
//! `strategy`, and `runner` modules.

pub mod chemical;
pub mod event;
pub mod inventory;
pub mod listing;
pub mod negotiation;
pub mod npc;
pub mod state;
pub mod team;

pub use chemical::{Chemical, Product};
pub use event::{Event, EventLog};
pub use inventory::{Inventory, InventoryError, QUANTITY_EPSILON};
pub use listing::{Listing, ListingDirection};
pub use negotiation::{
    Negotiation, NegotiationError, NegotiationStatus, NegotiationType, Offer, Reaction,
    MAX_REACTION_INTENSITY,
};
pub use npc::{NpcAgent, SkillLevel};
pub use state::MarketState;
pub use team::{Team, TeamError, FUNDS_EPSILON};
