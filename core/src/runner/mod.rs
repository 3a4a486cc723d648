//! NPC processing passes
//!
//! The runner is the counterpart of a scheduler tick loop: an embedding
//! application calls [`NpcRunner::process_pass`] on whatever cadence it
//! likes (a background loop, an HTTP hook) and the runner throttles,
//! decides, and applies at most one market action and one negotiation
//! response per active NPC, all through the exchange engine.

mod checkpoint;
mod engine;

pub use checkpoint::{compute_config_hash, validate_snapshot, SessionSnapshot};
pub use engine::{NpcEngineConfig, NpcRunner, PassResult, RunnerError};
