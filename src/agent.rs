use std::fmt;

use rand::Rng;

use crate::policy::{Policy, PolicyKind};
use crate::profile::{AgentProfile, DifficultyTier};

/// A simulated player: its skill profile and the policy driving it.
pub struct Agent {
    pub profile: AgentProfile,
    pub policy: Box<dyn Policy>,
}

impl Agent {
    /// Build the agent for `kind`, named after it, drawing its skill from `tier`.
    pub fn new(kind: PolicyKind, tier: DifficultyTier, rng: &mut impl Rng) -> Agent {
        Agent {
            profile: AgentProfile::new(kind.name(), tier, rng),
            policy: kind.build(),
        }
    }

    pub fn with_profile(profile: AgentProfile, policy: Box<dyn Policy>) -> Agent {
        Agent { profile, policy }
    }

    pub fn name(&self) -> &str {
        self.profile.name()
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("profile", &self.profile)
            .field("policy", &self.policy.kind())
            .finish()
    }
}

impl PartialEq for Agent {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Agent {}
