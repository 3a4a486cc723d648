//! xorshift64* random number generator
//!
//! A fast, high-quality PRNG that is deterministic and suitable for
//! simulation purposes.
//!
//! # Determinism
//!
//! Same seed → same sequence of random numbers. This is CRITICAL for:
//! - Debugging (reproduce an exact NPC trading session)
//! - Testing (verify strategy behavior)
//! - Session snapshots (resume mid-run without divergence)

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// NPC strategies draw price jitter, quantity spreads, and listing
/// probabilities from this generator. The state is serializable so a
/// session snapshot can capture and resume the exact stream position.
///
/// # Example
/// ```
/// use chemtrade_core_rs::DeterministicRng;
///
/// let mut rng = DeterministicRng::new(12345);
/// let p = rng.next_f64();           // [0.0, 1.0)
/// let price = rng.range_f64(2.0, 5.0); // [2.0, 5.0)
/// assert!(p >= 0.0 && p < 1.0);
/// assert!(price >= 2.0 && price < 5.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeterministicRng {
    /// Internal state (64-bit)
    state: u64,
}

impl DeterministicRng {
    /// Create a new RNG with given seed
    ///
    /// # Arguments
    /// * `seed` - Initial seed value (u64). A zero seed is remapped to 1
    ///   (xorshift requirement).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    ///
    /// Advances the internal state and returns a random value.
    pub fn next_u64(&mut self) -> u64 {
        // xorshift64* algorithm
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate random f64 in range [0.0, 1.0)
    ///
    /// # Example
    /// ```
    /// use chemtrade_core_rs::DeterministicRng;
    ///
    /// let mut rng = DeterministicRng::new(12345);
    /// let probability = rng.next_f64();
    /// assert!(probability >= 0.0 && probability < 1.0);
    /// ```
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next_u64();
        // Convert to [0.0, 1.0) using the top 53 bits
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Generate random f64 in range [min, max)
    ///
    /// Used for price jitter (e.g. "150–200% of fair value" draws).
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        assert!(min < max, "min must be less than max");
        min + self.next_f64() * (max - min)
    }

    /// Bernoulli draw: returns true with probability `p`
    ///
    /// `p` is clamped to [0.0, 1.0].
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p.clamp(0.0, 1.0)
    }

    /// Get current RNG state (for session snapshots/replay)
    ///
    /// A generator recreated via `DeterministicRng::new(state)` continues
    /// the exact same stream.
    pub fn get_state(&self) -> u64 {
        self.state
    }
}
