//! In-crate stand-ins for the capture and input layers.
//!
//! Real screen grabbing and OS-level input injection are not part of this crate.
//! [`SyntheticCapture`] renders frames with an occasional red opponent silhouette so the
//! detection path has something to find, [`DryRunInput`] only traces what it would inject
//! and [`RecordingInput`] keeps every event for inspection.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use crate::action::Key;
use crate::configuration::ScreenSize;
use crate::errors::{CaptureError, InjectionError};
use crate::game_interface::{FrameSource, InputDevice};
use crate::game_state::ScreenPoint;
use crate::vision::{BoundingBox, Frame};

const SILHOUETTE_RED: [u8; 3] = [200, 30, 30];

/// Blank frames, with a red box of random size and position on a fraction of them.
#[derive(Debug, Clone)]
pub struct SyntheticCapture {
    screen: ScreenSize,
    opponent_probability: f64,
    rng: ChaCha8Rng,
}

impl SyntheticCapture {
    pub fn new(screen: ScreenSize, seed: u64) -> Self {
        Self {
            screen,
            opponent_probability: 0.4,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Probability, clamped to `[0, 1]`, that a frame shows an opponent.
    pub fn with_opponent_probability(mut self, probability: f64) -> Self {
        self.opponent_probability = probability.clamp(0.0, 1.0);
        self
    }
}

impl FrameSource for SyntheticCapture {
    fn capture_frame(&mut self) -> Result<Frame, CaptureError> {
        let ScreenSize { width, height } = self.screen;
        let mut frame = Frame::blank(width, height);

        if self.rng.gen_bool(self.opponent_probability) {
            let w = self.rng.gen_range(8..=(width / 8).max(8));
            let h = self.rng.gen_range(16..=(height / 4).max(16));
            let x = self.rng.gen_range(0..width.saturating_sub(w).max(1));
            let y = self.rng.gen_range(0..height.saturating_sub(h).max(1));
            frame.fill_rect(BoundingBox::new(x, y, w, h), SILHOUETTE_RED);
        }
        Ok(frame)
    }
}

/// Accepts every event and only traces it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunInput;

impl InputDevice for DryRunInput {
    fn move_aim_to(
        &mut self,
        target: ScreenPoint,
        duration: Duration,
    ) -> Result<(), InjectionError> {
        trace!(x = target.x, y = target.y, ?duration, "aim");
        Ok(())
    }

    fn fire_pulse(&mut self) -> Result<(), InjectionError> {
        trace!("fire");
        Ok(())
    }

    fn press_key(&mut self, key: Key) -> Result<(), InjectionError> {
        trace!(%key, "press");
        Ok(())
    }

    fn release_key(&mut self, key: Key) -> Result<(), InjectionError> {
        trace!(%key, "release");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    AimMove(ScreenPoint),
    Fire,
    Press(Key),
    Release(Key),
}

/// Records accepted events in order. Presses of rejected keys fail and are not recorded.
#[derive(Debug, Default, Clone)]
pub struct RecordingInput {
    events: Vec<InputEvent>,
    rejected: Vec<Key>,
}

impl RecordingInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every press of `key` fail.
    pub fn rejecting(mut self, key: Key) -> Self {
        self.rejected.push(key);
        self
    }

    pub fn events(&self) -> &[InputEvent] {
        &self.events
    }

    pub fn fire_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, InputEvent::Fire))
            .count()
    }

    /// Keys pressed more often than released.
    pub fn unreleased_keys(&self) -> Vec<Key> {
        let mut down: Vec<Key> = vec![];
        for event in &self.events {
            match event {
                InputEvent::Press(key) => down.push(*key),
                InputEvent::Release(key) => {
                    if let Some(pos) = down.iter().rposition(|k| k == key) {
                        down.remove(pos);
                    }
                }
                _ => {}
            }
        }
        down
    }
}

impl InputDevice for RecordingInput {
    fn move_aim_to(
        &mut self,
        target: ScreenPoint,
        _duration: Duration,
    ) -> Result<(), InjectionError> {
        self.events.push(InputEvent::AimMove(target));
        Ok(())
    }

    fn fire_pulse(&mut self) -> Result<(), InjectionError> {
        self.events.push(InputEvent::Fire);
        Ok(())
    }

    fn press_key(&mut self, key: Key) -> Result<(), InjectionError> {
        if self.rejected.contains(&key) {
            return Err(InjectionError::Rejected {
                input: format!("press {key}"),
                reason: "key is blocked".to_owned(),
            });
        }
        self.events.push(InputEvent::Press(key));
        Ok(())
    }

    fn release_key(&mut self, key: Key) -> Result<(), InjectionError> {
        self.events.push(InputEvent::Release(key));
        Ok(())
    }
}
