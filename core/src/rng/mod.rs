//! Deterministic random number generation
//!
//! Uses the xorshift64* algorithm for fast, deterministic random draws.
//! CRITICAL: All randomness in NPC decision-making MUST go through this
//! module so that a seeded run is exactly reproducible.

mod xorshift;

pub use xorshift::DeterministicRng;
