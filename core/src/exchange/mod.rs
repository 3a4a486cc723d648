//! Trade execution engine
//!
//! Free functions over `&mut MarketState` that implement every market
//! operation: posting listings, opening negotiations, countering,
//! accepting (which executes the trade), rejecting, and reacting. All
//! preconditions are checked before any state changes, so a failed call
//! leaves the market exactly as it was.

mod engine;

pub use engine::{
    accept_offer, counter_offer, create_listing, initiate_negotiation, post_reaction,
    reject_offer, ExchangeError, TradeReceipt,
};
