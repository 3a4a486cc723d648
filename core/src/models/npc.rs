//! NPC agent model
//!
//! An NPC agent binds a team to a trading skill level. The behavioural
//! logic itself lives in the `strategy` module; this type is the pure
//! configuration record.

use serde::{Deserialize, Serialize};

/// Trading skill ladder, from naive to near-optimal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillLevel {
    /// Overpays for everything, ignores funds, undersells
    Beginner,
    /// Simple quantity/price heuristics, no optimization
    Novice,
    /// Trades on the gap between listed prices and shadow prices
    ShadowPriceArbitrage,
    /// Targets the binding constraint, sheds the slackest input
    BottleneckElimination,
    /// Specializes towards one recipe's input ratio
    RecipeBalancing,
    /// Plans against the full production optimum, negotiates in rounds
    Expert,
}

impl SkillLevel {
    /// All skill levels, in ladder order
    pub const ALL: [SkillLevel; 6] = [
        SkillLevel::Beginner,
        SkillLevel::Novice,
        SkillLevel::ShadowPriceArbitrage,
        SkillLevel::BottleneckElimination,
        SkillLevel::RecipeBalancing,
        SkillLevel::Expert,
    ];
}

/// An automated trader bound to one team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcAgent {
    /// Unique agent identifier
    pub id: String,

    /// Team the agent trades on behalf of
    pub team_id: String,

    /// Skill level (selects the strategy implementation)
    pub skill: SkillLevel,

    /// Behavioural noise in [0.0, 1.0]; widens price bands and drives
    /// probabilistic choices
    pub variability: f64,

    /// Inactive agents are skipped during passes
    pub active: bool,
}

impl NpcAgent {
    /// Create an active agent; variability is clamped to [0.0, 1.0]
    pub fn new(id: String, team_id: String, skill: SkillLevel, variability: f64) -> Self {
        Self {
            id,
            team_id,
            skill,
            variability: variability.clamp(0.0, 1.0),
            active: true,
        }
    }
}
