//! # Ai Battle Sim
//!
//! Simulated first-person-shooter players driven by pluggable decision policies.
//!
//! It provides:
//! - Decision strategies behind the [`Policy`](crate::policy::Policy) trait
//! - An [`Environment`](crate::environment::Environment) adapter that samples game state and
//!   executes actions with human-like timing (reaction time, aim jitter, key holds)
//! - A fixed-tick match loop ([`run_match`](crate::match_runner::run_match)) with periodic
//!   and final reports
//! - Sequential [`Tournament`](crate::tournament::Tournament)s ranked by score
//!
//! Every match is a single cooperative sample → decide → act loop. All delays are
//! cancellable through a [`CancellationToken`](crate::cancellation::CancellationToken), so an
//! operator abort is honoured within one sub-delay and still yields a final report.
//!
//! # Documentation Overview
//!
//! - For the capabilities the simulator is built against (capture, vision, input,
//!   reporting), see [`game_interface`].
//! - For opponent detection and the distance estimate, see [`vision`].
//! - For configuring tick rate, report interval, cooldown and randomness, see
//!   [`Configuration`](crate::configuration::Configuration).
//!
//! # Usage Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use ai_battle_sim::prelude::*;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let config = Configuration::new().with_seed(Some(7));
//! let seed = config.seed_or_random();
//! let mut rng = ChaCha8Rng::seed_from_u64(seed);
//!
//! let mut env = Environment::new(
//!     SyntheticCapture::new(config.screen(), seed),
//!     ColorVision::seeded(seed),
//!     DryRunInput,
//!     seed,
//! );
//! let mut reporter = ConsoleReporter::new(config.verbose());
//! let settings = config.match_settings(Duration::from_secs(60));
//! let cancel = CancellationToken::new();
//!
//! let mut tournament = Tournament::with_kinds(
//!     &PolicyKind::ALL,
//!     DifficultyTier::Hard,
//!     config.cooldown(),
//!     &mut rng,
//! );
//! for standing in tournament.run(&mut env, &mut reporter, &settings, &cancel) {
//!     println!("{standing}");
//! }
//! ```

pub mod action;
pub mod agent;
pub mod cancellation;
pub mod configuration;
pub mod devices;
pub mod environment;
pub mod errors;
pub mod game_interface;
pub mod game_state;
pub mod logger;
pub mod match_runner;
pub mod policy;
pub mod profile;
pub mod report;
pub mod stats;
pub mod tournament;
pub mod vision;

pub use anyhow;

/// Commonly used types and traits for quick access.
///
/// ```rust
/// use ai_battle_sim::prelude::*;
/// ```
pub mod prelude {
    pub use crate::action::{Action, ActionKind, Key};
    pub use crate::agent::Agent;
    pub use crate::cancellation::CancellationToken;
    pub use crate::configuration::Configuration;
    pub use crate::devices::{DryRunInput, RecordingInput, SyntheticCapture};
    pub use crate::environment::Environment;
    pub use crate::game_interface::{FrameSource, InputDevice, Reporter, Vision};
    pub use crate::game_state::GameState;
    pub use crate::match_runner::{run_match, MatchOutcome, MatchSettings, MatchState};
    pub use crate::policy::{Policy, PolicyKind};
    pub use crate::profile::{AgentProfile, DifficultyTier};
    pub use crate::report::ConsoleReporter;
    pub use crate::stats::MatchStats;
    pub use crate::tournament::{Standing, Tournament};
    pub use crate::vision::ColorVision;
}
