//! Session checkpointing
//!
//! Snapshots capture everything needed to resume a trading session:
//! the full market state, the RNG, the pass clock and counter, and a
//! digest of the runner configuration so a snapshot can only be restored
//! against the configuration that produced it.
//!
//! Strategy-internal state (the Expert's shadow cache, RecipeBalancing's
//! specialization) is rebuilt lazily from the restored inventories on the
//! first pass after a restore.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::clock::PassClock;
use crate::models::state::MarketState;
use crate::rng::DeterministicRng;
use crate::runner::engine::{NpcEngineConfig, NpcRunner, RunnerError};

/// Complete session snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Teams, listings, and negotiations
    pub state: MarketState,

    /// Session RNG, mid-sequence
    pub rng: DeterministicRng,

    /// Pass throttle state
    pub clock: PassClock,

    /// Passes that have run
    pub passes: u64,

    /// SHA256 digest of the runner configuration
    pub config_hash: String,
}

/// Compute a deterministic SHA256 digest of a configuration
///
/// Serializes through `serde_json::Value` with recursively sorted object
/// keys so the digest is stable regardless of map iteration order.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, RunnerError> {
    use serde_json::Value;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let value = serde_json::to_value(config)
        .map_err(|e| RunnerError::Serialization(format!("config serialization failed: {}", e)))?;
    let json = serde_json::to_string(&canonicalize(value))
        .map_err(|e| RunnerError::Serialization(format!("config serialization failed: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Validate a snapshot's internal consistency
///
/// Checks funds conservation against the expected total and referential
/// integrity of every negotiation's parties.
pub fn validate_snapshot(
    snapshot: &SessionSnapshot,
    expected_total_funds: f64,
) -> Result<(), RunnerError> {
    let total = snapshot.state.total_funds();
    if (total - expected_total_funds).abs() > 1e-6 {
        return Err(RunnerError::SnapshotValidation(format!(
            "funds conservation violated: expected {}, got {}",
            expected_total_funds, total
        )));
    }

    for team in snapshot.state.teams() {
        if !team.funds().is_finite() || team.funds() < 0.0 {
            return Err(RunnerError::SnapshotValidation(format!(
                "team {} has invalid funds {}",
                team.id(),
                team.funds()
            )));
        }
        if !team.inventory().is_valid() {
            return Err(RunnerError::SnapshotValidation(format!(
                "team {} has an invalid inventory",
                team.id()
            )));
        }
    }

    for team in snapshot.state.teams() {
        for negotiation in snapshot.state.pending_negotiations_for(team.id()) {
            let other = negotiation
                .counterparty_of(team.id())
                .unwrap_or_default()
                .to_string();
            if snapshot.state.get_team(&other).is_none() {
                return Err(RunnerError::SnapshotValidation(format!(
                    "negotiation {} references unknown team {}",
                    negotiation.id(),
                    other
                )));
            }
        }
    }

    Ok(())
}

impl NpcRunner {
    /// Capture the session for later resumption
    pub fn snapshot(&self, state: &MarketState) -> Result<SessionSnapshot, RunnerError> {
        Ok(SessionSnapshot {
            state: state.clone(),
            rng: self.rng().clone(),
            clock: self.clock().clone(),
            passes: self.passes(),
            config_hash: compute_config_hash(self.config())?,
        })
    }

    /// Rebuild a runner and market from a snapshot
    ///
    /// Fails if `config` does not hash to the digest stored in the
    /// snapshot.
    pub fn restore(
        config: NpcEngineConfig,
        snapshot: SessionSnapshot,
    ) -> Result<(NpcRunner, MarketState), RunnerError> {
        let expected = compute_config_hash(&config)?;
        if expected != snapshot.config_hash {
            return Err(RunnerError::ConfigMismatch {
                expected,
                actual: snapshot.config_hash,
            });
        }
        let runner =
            NpcRunner::restore_parts(config, snapshot.rng, snapshot.clock, snapshot.passes)?;
        Ok((runner, snapshot.state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inventory::Inventory;
    use crate::models::npc::{NpcAgent, SkillLevel};
    use crate::models::team::Team;

    fn config() -> NpcEngineConfig {
        NpcEngineConfig {
            rng_seed: 4,
            min_pass_interval_secs: 0,
            npcs: vec![NpcAgent::new(
                "npc-1".into(),
                "TEAM_A".into(),
                SkillLevel::ShadowPriceArbitrage,
                0.3,
            )],
        }
    }

    fn market() -> MarketState {
        MarketState::new(vec![
            Team::new("TEAM_A".to_string(), Inventory::uniform(500.0), 10_000.0),
            Team::new("TEAM_B".to_string(), Inventory::uniform(500.0), 10_000.0),
        ])
    }

    #[test]
    fn test_config_hash_is_stable() {
        let a = compute_config_hash(&config()).unwrap();
        let b = compute_config_hash(&config()).unwrap();
        assert_eq!(a, b);

        let mut other = config();
        other.rng_seed = 5;
        assert_ne!(a, compute_config_hash(&other).unwrap());
    }

    #[test]
    fn test_restore_rejects_mismatched_config() {
        let mut state = market();
        let mut runner = NpcRunner::new(config()).unwrap();
        runner.process_pass(&mut state, 0).unwrap();
        let snapshot = runner.snapshot(&state).unwrap();

        let mut other = config();
        other.rng_seed = 1234;
        assert!(matches!(
            NpcRunner::restore(other, snapshot),
            Err(RunnerError::ConfigMismatch { .. })
        ));
    }

    #[test]
    fn test_snapshot_round_trip_preserves_session() {
        let mut state = market();
        let mut runner = NpcRunner::new(config()).unwrap();
        for now in 0..5 {
            runner.process_pass(&mut state, now).unwrap();
        }
        let total_funds = state.total_funds();
        let snapshot = runner.snapshot(&state).unwrap();
        validate_snapshot(&snapshot, total_funds).unwrap();

        let (restored_runner, restored_state) =
            NpcRunner::restore(config(), snapshot).unwrap();
        assert_eq!(restored_runner.passes(), runner.passes());
        assert_eq!(
            restored_runner.rng().get_state(),
            runner.rng().get_state()
        );
        assert!((restored_state.total_funds() - total_funds).abs() < 1e-9);
    }
}
