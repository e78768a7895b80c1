//! The fixed-tick sample → decide → act loop.
//!
//! A match goes `Idle -> Running -> {Completed, Interrupted}`. It completes when the
//! configured wall-clock duration (or the optional tick budget) is exhausted, and is
//! interrupted when the [`CancellationToken`] fires. Both ends produce exactly one final
//! report.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, trace, warn};

use crate::agent::Agent;
use crate::cancellation::CancellationToken;
use crate::environment::Environment;
use crate::game_interface::{FrameSource, InputDevice, Reporter, Vision};
use crate::stats::MatchStats;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSettings {
    pub duration: Duration,
    pub tick_interval: Duration,
    pub report_interval: Duration,
    /// Optional bound on the number of ticks, on top of `duration`.
    pub max_ticks: Option<u64>,
}

impl MatchSettings {
    /// `duration` long match at ~30 ticks per second, reporting every 5 seconds.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            tick_interval: Duration::from_millis(33),
            report_interval: Duration::from_secs(5),
            max_ticks: None,
        }
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    /// Number of ticks between two periodic reports, at least 1.
    pub fn report_every(&self) -> u64 {
        if self.tick_interval.is_zero() {
            return 1;
        }
        let ratio = self.report_interval.as_nanos() / self.tick_interval.as_nanos();
        u64::try_from(ratio).unwrap_or(u64::MAX).max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    Idle,
    Running,
    Completed,
    Interrupted,
}

impl fmt::Display for MatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchState::Idle => "idle",
            MatchState::Running => "running",
            MatchState::Completed => "completed",
            MatchState::Interrupted => "interrupted",
        };
        f.write_str(name)
    }
}

/// Final report of one match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub agent: String,
    /// `Completed` or `Interrupted`.
    pub state: MatchState,
    pub stats: MatchStats,
    /// Ticks started, including skipped ones.
    pub ticks: u64,
    /// Ticks lost to capture failures.
    pub skipped_ticks: u64,
    pub elapsed: Duration,
}

/// Play one match with `agent` against `env`.
///
/// Statistics are not reset here: the caller decides whether `env` starts fresh.
#[instrument(skip_all, fields(agent = agent.name()))]
pub fn run_match<C, V, I>(
    agent: &mut Agent,
    env: &mut Environment<C, V, I>,
    reporter: &mut dyn Reporter,
    settings: &MatchSettings,
    cancel: &CancellationToken,
) -> MatchOutcome
where
    C: FrameSource,
    V: Vision,
    I: InputDevice,
{
    let mut state = MatchState::Idle;
    trace!(%state, ?settings);

    let start = Instant::now();
    let end = start.checked_add(settings.duration);
    let report_every = settings.report_every();
    let mut ticks = 0u64;
    let mut skipped_ticks = 0u64;
    state = MatchState::Running;
    info!(duration = ?settings.duration, "match started");

    while state == MatchState::Running {
        if cancel.is_cancelled() {
            state = MatchState::Interrupted;
            break;
        }
        if start.elapsed() >= settings.duration
            || settings.max_ticks.is_some_and(|max| ticks >= max)
        {
            state = MatchState::Completed;
            break;
        }

        match env.sample() {
            Ok(snapshot) => {
                let action = agent.policy.decide(&snapshot);
                debug!(tick = ticks, kind = %action.kind, "decided");
                if env.apply(&action, &agent.profile, cancel).is_err() {
                    ticks += 1;
                    state = MatchState::Interrupted;
                    break;
                }
            }
            Err(e) => {
                skipped_ticks += 1;
                warn!("tick {ticks} skipped: {e}");
            }
        }

        if ticks % report_every == 0 {
            reporter.log_stats(agent.name(), start.elapsed(), &env.stats());
        }
        ticks += 1;

        let next_tick = tick_deadline(start, settings.tick_interval, ticks);
        let deadline = match (next_tick, end) {
            (Some(tick), Some(end)) => Some(tick.min(end)),
            (tick, end) => tick.or(end),
        };
        let waited = match deadline {
            Some(deadline) => cancel.wait_until(deadline),
            None => cancel.wait(settings.tick_interval),
        };
        if waited.is_err() {
            state = MatchState::Interrupted;
        }
    }

    let outcome = MatchOutcome {
        agent: agent.name().to_owned(),
        state,
        stats: env.stats(),
        ticks,
        skipped_ticks,
        elapsed: start.elapsed(),
    };
    info!(%state, ticks, skipped_ticks, stats = %outcome.stats, "match finished");
    reporter.save_match_report(&outcome);
    outcome
}

/// `start + interval * ticks`, `None` on overflow.
fn tick_deadline(start: Instant, interval: Duration, ticks: u64) -> Option<Instant> {
    let ticks = u32::try_from(ticks).ok()?;
    start.checked_add(interval.checked_mul(ticks)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_every_five_seconds_at_thirty_hertz() {
        let settings = MatchSettings::new(Duration::from_secs(600));
        assert_eq!(settings.report_every(), 151);
        assert_eq!(
            settings
                .clone()
                .with_report_interval(Duration::ZERO)
                .report_every(),
            1
        );
        assert_eq!(
            settings.with_tick_interval(Duration::ZERO).report_every(),
            1
        );
    }

    #[test]
    fn deadlines_do_not_overflow() {
        let start = Instant::now();
        assert!(tick_deadline(start, Duration::from_millis(33), 10).is_some());
        assert!(tick_deadline(start, Duration::MAX, 2).is_none());
        assert!(tick_deadline(start, Duration::from_millis(1), u64::MAX).is_none());
    }
}
