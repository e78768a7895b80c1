//! Config for the simulator behaviors
//!
//! Configuration can be created programmatically using [`Configuration::new()`] or by reading
//! environment variables using [`Configuration::from_env()`].
//!
//! # Environment Variables
//!
//! All values are optional. Flags are enabled by the (case-insensitive) value `"true"`;
//! unparsable numbers are ignored with a warning.
//!
//! - `ARENA_VERBOSE` — Print match progress to stdout (default: `true`)
//! - `ARENA_LOG` — Enable logging to a file (default: `false`)
//! - `ARENA_LOG_DIR` — Directory of the log file (default: current directory)
//! - `ARENA_TICK_MS` — Target interval between two ticks (default: `33`)
//! - `ARENA_REPORT_SECS` — Interval between two periodic stat reports (default: `5`)
//! - `ARENA_COOLDOWN_SECS` — Pause between two tournament matches (default: `5`)
//! - `ARENA_TIME_SCALE` — Multiplier applied to every simulated delay, at most `1000`
//!   (default: `1.0`)
//! - `ARENA_SEED` — Seed of every random source (default: drawn from entropy)
//! - `ARENA_SCREEN` — Logical capture resolution as `WIDTHxHEIGHT`, each side at most
//!   `16384` (default: `1920x1080`)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};
use tracing::warn;

use crate::environment::MAX_TIME_SCALE;
use crate::match_runner::MatchSettings;

/// Largest accepted screen side, in pixels.
pub const MAX_SCREEN_SIDE: u32 = 16_384;

/// Configuration for simulator behaviors.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub(crate) verbose: bool,
    pub(crate) log: bool,
    pub(crate) log_dir: PathBuf,
    pub(crate) tick_interval: Duration,
    pub(crate) report_interval: Duration,
    pub(crate) cooldown: Duration,
    pub(crate) time_scale: f32,
    pub(crate) seed: Option<u64>,
    pub(crate) screen: ScreenSize,
}

/// Logical capture resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl FromStr for ScreenSize {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| anyhow!("expected WIDTHxHEIGHT, got '{s}'"))?;
        let width = width.trim().parse().context("invalid screen width")?;
        let height = height.trim().parse().context("invalid screen height")?;
        if width == 0 || height == 0 {
            return Err(anyhow!("screen size must not be empty"));
        }
        if width > MAX_SCREEN_SIDE || height > MAX_SCREEN_SIDE {
            return Err(anyhow!(
                "screen size {width}x{height} exceeds {MAX_SCREEN_SIDE}x{MAX_SCREEN_SIDE}"
            ));
        }
        Ok(ScreenSize { width, height })
    }
}

impl Configuration {
    /// Create a new configuration with default parameters.
    ///
    /// By default:
    /// - Match progress is printed to stdout.
    /// - Logging to file is disabled.
    /// - Ticks target 33 ms (about 30 per second), stats are reported every 5 seconds.
    /// - Tournament matches are separated by a 5 second cooldown.
    /// - Simulated delays (reaction time, key holds, trigger pulses) run in real time.
    /// - Random sources are seeded from entropy.
    /// - Frames are 1920x1080.
    pub fn new() -> Self {
        Self {
            verbose: true,
            log: false,
            log_dir: PathBuf::from("."),
            tick_interval: Duration::from_millis(33),
            report_interval: Duration::from_secs(5),
            cooldown: Duration::from_secs(5),
            time_scale: 1.0,
            seed: None,
            screen: ScreenSize::default(),
        }
    }

    /// Create configuration from environment variables (see module documentation).
    ///
    /// Any unset variable results in the default value for its field.
    pub fn from_env() -> Self {
        fn get_env_flag(var: &str, default: bool) -> bool {
            match std::env::var(var) {
                Ok(val) => val.eq_ignore_ascii_case("true"),
                Err(_) => default,
            }
        }

        fn get_env_parsed<T: FromStr>(var: &str) -> Option<T> {
            let raw = std::env::var(var).ok()?;
            match raw.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("ignoring invalid value '{raw}' for {var}");
                    None
                }
            }
        }

        let defaults = Self::new();
        Self {
            verbose: get_env_flag("ARENA_VERBOSE", defaults.verbose),
            log: get_env_flag("ARENA_LOG", defaults.log),
            log_dir: std::env::var("ARENA_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            tick_interval: get_env_parsed("ARENA_TICK_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.tick_interval),
            report_interval: get_env_parsed("ARENA_REPORT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.report_interval),
            cooldown: get_env_parsed("ARENA_COOLDOWN_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cooldown),
            time_scale: get_env_parsed::<f32>("ARENA_TIME_SCALE")
                .filter(|scale| {
                    let valid = valid_time_scale(*scale);
                    if !valid {
                        warn!("ignoring ARENA_TIME_SCALE={scale}, expected 0 to {MAX_TIME_SCALE}");
                    }
                    valid
                })
                .unwrap_or(defaults.time_scale),
            seed: get_env_parsed("ARENA_SEED"),
            screen: get_env_parsed("ARENA_SCREEN").unwrap_or(defaults.screen),
        }
    }

    /// Enable or disable progress output.
    pub fn with_verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    /// Enable or disable logging to file.
    pub fn with_log(mut self, value: bool) -> Self {
        self.log = value;
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }

    /// Pause between two tournament matches.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Multiply every simulated delay by `scale`. `0.0` runs actions instantly.
    ///
    /// Values outside `[0, MAX_TIME_SCALE]` are ignored.
    pub fn with_time_scale(mut self, scale: f32) -> Self {
        if valid_time_scale(scale) {
            self.time_scale = scale;
        }
        self
    }

    /// Seed every random source. `None` draws from entropy.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_screen(mut self, screen: ScreenSize) -> Self {
        self.screen = screen;
        self
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn log(&self) -> bool {
        self.log
    }

    pub fn log_dir(&self) -> &std::path::Path {
        &self.log_dir
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    /// The configured seed, or a fresh one from entropy.
    pub fn seed_or_random(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    /// Settings of a match lasting `duration`.
    pub fn match_settings(&self, duration: Duration) -> MatchSettings {
        MatchSettings::new(duration)
            .with_tick_interval(self.tick_interval)
            .with_report_interval(self.report_interval)
    }
}

fn valid_time_scale(scale: f32) -> bool {
    (0.0..=MAX_TIME_SCALE).contains(&scale)
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}
