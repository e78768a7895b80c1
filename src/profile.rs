//! Difficulty tiers and the per-agent skill scalars derived from them.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use anyhow::bail;
use rand::Rng;

/// Largest aiming offset, in pixels per axis, of an agent with zero accuracy.
pub const MAX_AIM_OFFSET: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DifficultyTier {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 3] = [
        DifficultyTier::Easy,
        DifficultyTier::Medium,
        DifficultyTier::Hard,
    ];

    /// Reaction time range, in seconds.
    pub fn reaction_time_range(self) -> RangeInclusive<f32> {
        match self {
            DifficultyTier::Easy => 0.30..=0.50,
            DifficultyTier::Medium => 0.15..=0.25,
            DifficultyTier::Hard => 0.08..=0.15,
        }
    }

    pub fn accuracy_range(self) -> RangeInclusive<f32> {
        match self {
            DifficultyTier::Easy => 0.35..=0.45,
            DifficultyTier::Medium => 0.55..=0.65,
            DifficultyTier::Hard => 0.80..=0.90,
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DifficultyTier::Easy => "easy",
            DifficultyTier::Medium => "medium",
            DifficultyTier::Hard => "hard",
        };
        f.write_str(name)
    }
}

impl FromStr for DifficultyTier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(DifficultyTier::Easy),
            "medium" => Ok(DifficultyTier::Medium),
            "hard" => Ok(DifficultyTier::Hard),
            other => bail!("unknown difficulty '{other}' (expected easy, medium or hard)"),
        }
    }
}

/// Name and skill of one simulated player. Fixed for the agent's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentProfile {
    name: String,
    tier: DifficultyTier,
    reaction_time: Duration,
    accuracy: f32,
}

impl AgentProfile {
    /// Draw reaction time and accuracy once from the tier's ranges.
    pub fn new(name: impl Into<String>, tier: DifficultyTier, rng: &mut impl Rng) -> Self {
        let reaction_secs = rng.gen_range(tier.reaction_time_range());
        let accuracy = rng.gen_range(tier.accuracy_range());
        Self {
            name: name.into(),
            tier,
            reaction_time: Duration::from_secs_f32(reaction_secs),
            accuracy,
        }
    }

    /// Profile with explicit scalars. `accuracy` is clamped to `[0, 1]`.
    pub fn with_scalars(
        name: impl Into<String>,
        tier: DifficultyTier,
        reaction_time: Duration,
        accuracy: f32,
    ) -> Self {
        Self {
            name: name.into(),
            tier,
            reaction_time,
            accuracy: accuracy.clamp(0.0, 1.0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tier(&self) -> DifficultyTier {
        self.tier
    }

    pub fn reaction_time(&self) -> Duration {
        self.reaction_time
    }

    pub fn accuracy(&self) -> f32 {
        self.accuracy
    }

    /// Bound of the per-axis aiming offset: `50 * (1 - accuracy)`.
    pub fn max_aim_offset(&self) -> f32 {
        MAX_AIM_OFFSET * (1.0 - self.accuracy)
    }

    /// Uniform per-axis aiming offset within `±max_aim_offset()`.
    ///
    /// The unit draw is scaled by the bound, so for the same random sequence a more accurate
    /// profile never lands further from the target.
    pub fn aim_offset(&self, rng: &mut impl Rng) -> (f32, f32) {
        let bound = self.max_aim_offset();
        let ux: f32 = rng.gen_range(-1.0..=1.0);
        let uy: f32 = rng.gen_range(-1.0..=1.0);
        (ux * bound, uy * bound)
    }
}
