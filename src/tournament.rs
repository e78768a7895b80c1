//! Sequential tournaments: one match per registered agent, ranked by final score.
//!
//! Matches never overlap. Before each match the environment statistics are reset; between
//! two matches a cooldown pause is observed. If the operator aborts, the running match is
//! finalized, the remaining ones are skipped and the standings cover the matches played.

use std::fmt;
use std::time::Duration;

use rand::Rng;
use tracing::{info, instrument};

use crate::agent::Agent;
use crate::cancellation::CancellationToken;
use crate::environment::Environment;
use crate::game_interface::{FrameSource, InputDevice, Reporter, Vision};
use crate::match_runner::{run_match, MatchOutcome, MatchSettings, MatchState};
use crate::policy::PolicyKind;
use crate::profile::DifficultyTier;
use crate::stats::MatchStats;

pub struct Tournament {
    agents: Vec<Agent>,
    cooldown: Duration,
}

impl Tournament {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            agents: vec![],
            cooldown,
        }
    }

    /// One agent per policy kind, in the order given.
    pub fn with_kinds(
        kinds: &[PolicyKind],
        tier: DifficultyTier,
        cooldown: Duration,
        rng: &mut impl Rng,
    ) -> Self {
        let mut tournament = Self::new(cooldown);
        for kind in kinds {
            tournament.add_agent(Agent::new(*kind, tier, rng));
        }
        tournament
    }

    /// Register an agent. Registration order breaks score ties.
    pub fn add_agent(&mut self, agent: Agent) {
        self.agents.push(agent);
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    #[instrument(skip_all, fields(agents = self.agents.len()))]
    pub fn run<C, V, I>(
        &mut self,
        env: &mut Environment<C, V, I>,
        reporter: &mut dyn Reporter,
        settings: &MatchSettings,
        cancel: &CancellationToken,
    ) -> Vec<Standing>
    where
        C: FrameSource,
        V: Vision,
        I: InputDevice,
    {
        let mut outcomes = Vec::with_capacity(self.agents.len());
        let count = self.agents.len();

        for (index, agent) in self.agents.iter_mut().enumerate() {
            info!("{} is now playing", agent.name());
            env.reset();
            let outcome = run_match(agent, env, reporter, settings, cancel);
            let interrupted = outcome.state == MatchState::Interrupted;
            outcomes.push(outcome);

            if interrupted {
                info!("tournament interrupted, skipping remaining matches");
                break;
            }
            if index + 1 < count && cancel.wait(self.cooldown).is_err() {
                info!("tournament interrupted during cooldown");
                break;
            }
        }

        let standings = rank_results(outcomes);
        for standing in &standings {
            info!(%standing);
        }
        standings
    }
}

/// Final position of one agent.
#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    /// 1-based.
    pub rank: usize,
    pub agent: String,
    pub stats: MatchStats,
    pub state: MatchState,
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}. {:<10} | Score: {:4} | K/D: {}/{}",
            self.rank,
            self.agent.to_uppercase(),
            self.stats.score,
            self.stats.kills,
            self.stats.deaths
        )
    }
}

/// Rank by descending score. Equal scores keep the order of `outcomes`.
pub fn rank_results(mut outcomes: Vec<MatchOutcome>) -> Vec<Standing> {
    // sort_by is stable
    outcomes.sort_by(|a, b| b.stats.score.cmp(&a.stats.score));
    outcomes
        .into_iter()
        .enumerate()
        .map(|(i, outcome)| Standing {
            rank: i + 1,
            agent: outcome.agent,
            stats: outcome.stats,
            state: outcome.state,
        })
        .collect()
}
