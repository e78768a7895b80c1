//! The environment adapter: builds [`GameState`] snapshots from the capture and vision
//! capabilities, executes [`Action`]s through the input capability and owns the match
//! statistics.
//!
//! # Execution order
//!
//! For each action: movement steps (keys pressed together, held, released), then the
//! engagement (stance keys pressed, aim, fire-stance keys pressed, fire, everything
//! released), then the default behaviour
//! of the action kind (retreat, patrol and reload hold a key; every other kind adds nothing).
//!
//! Every delay goes through the [`CancellationToken`], scaled by the configured time scale.
//! Every key pressed during [`Environment::apply`] is released before it returns, even when
//! cancelled. Input failures are logged and skipped.

use std::time::{Duration, SystemTime};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace, warn};

use crate::action::{Action, ActionKind, Engagement, Key};
use crate::cancellation::CancellationToken;
use crate::errors::{CaptureError, Cancelled, InjectionError};
use crate::game_interface::{FrameSource, InputDevice, Vision};
use crate::game_state::{GameState, OpponentSighting, ScreenPoint};
use crate::profile::AgentProfile;
use crate::stats::MatchStats;
use crate::vision::estimate_distance;

/// Time taken to move the aim point.
pub const AIM_DURATION: Duration = Duration::from_millis(100);
/// Delay after each trigger pulse.
pub const FIRE_INTERVAL: Duration = Duration::from_millis(100);
pub const RETREAT_HOLD: Duration = Duration::from_millis(300);
pub const RELOAD_HOLD: Duration = Duration::from_millis(100);
const PATROL_KEYS: [Key; 3] = [Key::Forward, Key::Left, Key::Right];
/// Patrol key hold range, in seconds.
const PATROL_HOLD_SECS: std::ops::RangeInclusive<f32> = 0.2..=0.5;
/// Largest accepted delay multiplier.
pub const MAX_TIME_SCALE: f32 = 1_000.0;

pub struct Environment<C, V, I> {
    capture: C,
    vision: V,
    input: I,
    rng: ChaCha8Rng,
    stats: MatchStats,
    held: Vec<Key>,
    time_scale: f32,
}

impl<C: FrameSource, V: Vision, I: InputDevice> Environment<C, V, I> {
    /// `seed` drives aim jitter and patrol movement.
    pub fn new(capture: C, vision: V, input: I, seed: u64) -> Self {
        Self {
            capture,
            vision,
            input,
            rng: ChaCha8Rng::seed_from_u64(seed),
            stats: MatchStats::default(),
            held: vec![],
            time_scale: 1.0,
        }
    }

    /// Multiply every delay by `scale` (`0.0`: no waiting at all), clamped to
    /// `[0, MAX_TIME_SCALE]`. NaN counts as `0.0`.
    pub fn with_time_scale(mut self, scale: f32) -> Self {
        self.time_scale = if scale.is_nan() {
            0.0
        } else {
            scale.clamp(0.0, MAX_TIME_SCALE)
        };
        self
    }

    /// Capture a frame and turn it into a snapshot.
    ///
    /// Kill feed events seen on the frame are recorded before the snapshot is built, so its
    /// kill rate already accounts for them.
    pub fn sample(&mut self) -> Result<GameState, CaptureError> {
        let frame = self.capture.capture_frame()?;

        for event in self.vision.detect_events(&frame) {
            debug!(?event, "kill feed");
            self.stats.record(event);
        }

        let opponent = self.vision.detect_opponent(&frame).map(|bbox| OpponentSighting {
            position: bbox.center(),
            distance: estimate_distance(&bbox),
            velocity: self.vision.estimate_velocity(&frame, &bbox),
        });

        let state = GameState {
            timestamp: SystemTime::now(),
            opponent,
            health: self.vision.estimate_health(&frame).min(100),
            ammo: self.vision.estimate_ammo(&frame),
            cover_nearby: self.vision.estimate_cover(&frame),
            recent_kill_rate: self.stats.kill_rate(),
        };
        trace!(?state);
        Ok(state)
    }

    /// Execute `action` for the agent described by `profile`.
    ///
    /// Returns `Err(Cancelled)` if `cancel` fired mid-way; the remaining steps are skipped
    /// and held keys are released.
    pub fn apply(
        &mut self,
        action: &Action,
        profile: &AgentProfile,
        cancel: &CancellationToken,
    ) -> Result<(), Cancelled> {
        trace!(kind = %action.kind, agent = profile.name(), "apply");
        let result = self.execute(action, profile, cancel);
        self.release_all();
        result
    }

    pub fn stats(&self) -> MatchStats {
        self.stats
    }

    /// Zero the statistics for a new match.
    pub fn reset(&mut self) {
        self.stats = MatchStats::default();
    }

    /// Keys currently pressed. Empty outside of [`apply`](Self::apply).
    pub fn held_keys(&self) -> &[Key] {
        &self.held
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    fn execute(
        &mut self,
        action: &Action,
        profile: &AgentProfile,
        cancel: &CancellationToken,
    ) -> Result<(), Cancelled> {
        for step in &action.movement {
            self.hold(&step.keys, step.hold, cancel)?;
        }

        if let Some(engagement) = &action.engagement {
            self.engage(engagement, profile, cancel)?;
        }

        match action.kind {
            ActionKind::Retreat { direction } => self.hold(&[direction], RETREAT_HOLD, cancel),
            ActionKind::Patrol(_) => {
                let key = *PATROL_KEYS
                    .choose(&mut self.rng)
                    .unwrap_or(&Key::Forward);
                let hold = Duration::from_secs_f32(self.rng.gen_range(PATROL_HOLD_SECS));
                self.hold(&[key], hold, cancel)
            }
            ActionKind::Reload => self.hold(&[Key::Reload], RELOAD_HOLD, cancel),
            _ => Ok(()),
        }
    }

    fn engage(
        &mut self,
        engagement: &Engagement,
        profile: &AgentProfile,
        cancel: &CancellationToken,
    ) -> Result<(), Cancelled> {
        self.press(&engagement.stance);
        self.aim_at(engagement.target, profile, cancel)?;
        self.press(&engagement.fire_stance);
        self.pulse_fire(engagement.burst, FIRE_INTERVAL, cancel)?;
        self.release(&engagement.fire_stance);
        self.release(&engagement.stance);
        Ok(())
    }

    /// Wait the reaction time, then glide to `target` plus the accuracy jitter.
    fn aim_at(
        &mut self,
        target: ScreenPoint,
        profile: &AgentProfile,
        cancel: &CancellationToken,
    ) -> Result<(), Cancelled> {
        self.pause(profile.reaction_time(), cancel)?;
        let (dx, dy) = profile.aim_offset(&mut self.rng);
        let aim = target.offset(dx, dy);
        let glide = self.scaled(AIM_DURATION);
        self.inject("aim", |input| input.move_aim_to(aim, glide));
        cancel.wait(glide)
    }

    fn pulse_fire(
        &mut self,
        pulses: u32,
        interval: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), Cancelled> {
        for _ in 0..pulses {
            self.inject("fire", |input| input.fire_pulse());
            self.pause(interval, cancel)?;
        }
        Ok(())
    }

    /// Press `keys`, wait, release them. Released even if the wait is cancelled.
    fn hold(
        &mut self,
        keys: &[Key],
        duration: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), Cancelled> {
        self.press(keys);
        let waited = self.pause(duration, cancel);
        self.release(keys);
        waited
    }

    fn press(&mut self, keys: &[Key]) {
        for &key in keys {
            if self.held.contains(&key) {
                continue;
            }
            if self.inject("press", |input| input.press_key(key)) {
                self.held.push(key);
            }
        }
    }

    /// Release `keys` in reverse order. A key whose release failed stays tracked.
    fn release(&mut self, keys: &[Key]) {
        for &key in keys.iter().rev() {
            let Some(pos) = self.held.iter().position(|k| *k == key) else {
                continue;
            };
            if self.inject("release", |input| input.release_key(key)) {
                self.held.remove(pos);
            }
        }
    }

    /// Last chance release of everything still held.
    fn release_all(&mut self) {
        while let Some(key) = self.held.pop() {
            if let Err(e) = self.input.release_key(key) {
                warn!("could not release '{key}', giving up: {e}");
            }
        }
    }

    fn inject(
        &mut self,
        what: &str,
        f: impl FnOnce(&mut I) -> Result<(), InjectionError>,
    ) -> bool {
        match f(&mut self.input) {
            Ok(()) => true,
            Err(e) => {
                warn!("{what} failed: {e}");
                false
            }
        }
    }

    /// Saturates instead of overflowing.
    fn scaled(&self, duration: Duration) -> Duration {
        Duration::try_from_secs_f32(duration.as_secs_f32() * self.time_scale)
            .unwrap_or(Duration::MAX)
    }

    fn pause(&self, duration: Duration, cancel: &CancellationToken) -> Result<(), Cancelled> {
        cancel.wait(self.scaled(duration))
    }
}
