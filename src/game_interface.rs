//! Capability traits the simulation is built against.
//!
//! Screen capture, image analysis, input injection and reporting are external concerns; the
//! [`Environment`](crate::environment::Environment) and the match runner only see them
//! through these narrow interfaces. [`crate::vision::ColorVision`] and [`crate::devices`]
//! provide the in-crate implementations.

use std::time::Duration;

use crate::action::Key;
use crate::errors::{CaptureError, InjectionError};
use crate::game_state::{Ammo, ScreenPoint, Velocity};
use crate::match_runner::MatchOutcome;
use crate::stats::{MatchEvent, MatchStats};
use crate::vision::{BoundingBox, Frame};

/// Produces frames at the logical capture resolution.
pub trait FrameSource {
    /// Must be fast enough to sustain about 30 calls per second.
    fn capture_frame(&mut self) -> Result<Frame, CaptureError>;
}

/// Reads game facts out of a frame.
pub trait Vision {
    /// Bounding box of the most prominent opponent, if any.
    fn detect_opponent(&mut self, frame: &Frame) -> Option<BoundingBox>;

    fn estimate_velocity(&mut self, frame: &Frame, opponent: &BoundingBox) -> Velocity;

    fn estimate_health(&mut self, frame: &Frame) -> u32;

    fn estimate_ammo(&mut self, frame: &Frame) -> Ammo;

    fn estimate_cover(&mut self, frame: &Frame) -> bool;

    /// Kill feed entries that appeared on this frame.
    fn detect_events(&mut self, _frame: &Frame) -> Vec<MatchEvent> {
        vec![]
    }
}

/// Injects keyboard and mouse input.
///
/// Every successful [`press_key`](Self::press_key) is eventually paired with a
/// [`release_key`](Self::release_key) by the caller.
pub trait InputDevice {
    /// Start gliding the aim point to `target` over `duration`. Must not block: the caller
    /// waits for the glide itself.
    fn move_aim_to(&mut self, target: ScreenPoint, duration: Duration)
        -> Result<(), InjectionError>;

    /// One trigger pull.
    fn fire_pulse(&mut self) -> Result<(), InjectionError>;

    fn press_key(&mut self, key: Key) -> Result<(), InjectionError>;

    fn release_key(&mut self, key: Key) -> Result<(), InjectionError>;
}

/// Receives match statistics.
pub trait Reporter {
    /// Periodic snapshot while a match runs.
    fn log_stats(&mut self, agent: &str, elapsed: Duration, stats: &MatchStats);

    /// Called exactly once per match, completed or interrupted.
    fn save_match_report(&mut self, outcome: &MatchOutcome);
}

#[cfg(test)]
mod interface_tests {
    use super::*;

    struct DummyVision;

    impl Vision for DummyVision {
        fn detect_opponent(&mut self, _frame: &Frame) -> Option<BoundingBox> {
            None
        }

        fn estimate_velocity(&mut self, _frame: &Frame, _opponent: &BoundingBox) -> Velocity {
            Velocity::default()
        }

        fn estimate_health(&mut self, _frame: &Frame) -> u32 {
            100
        }

        fn estimate_ammo(&mut self, _frame: &Frame) -> Ammo {
            Ammo::default()
        }

        fn estimate_cover(&mut self, _frame: &Frame) -> bool {
            false
        }
    }

    fn borrow_vision<V: Vision>(vision: &mut V, frame: &Frame) -> Vec<MatchEvent> {
        vision.detect_events(frame)
    }

    #[test]
    fn default_kill_feed_is_empty() {
        let frame = Frame::blank(4, 4);
        let mut vision = DummyVision;
        assert!(borrow_vision(&mut vision, &frame).is_empty());
        assert!(vision.detect_opponent(&frame).is_none());
    }

    struct Counting(u32);

    impl InputDevice for Counting {
        fn move_aim_to(&mut self, _t: ScreenPoint, _d: Duration) -> Result<(), InjectionError> {
            Ok(())
        }

        fn fire_pulse(&mut self) -> Result<(), InjectionError> {
            self.0 += 1;
            Ok(())
        }

        fn press_key(&mut self, _key: Key) -> Result<(), InjectionError> {
            Ok(())
        }

        fn release_key(&mut self, _key: Key) -> Result<(), InjectionError> {
            Ok(())
        }
    }

    #[test]
    fn dyn_input_device() {
        let mut device = Counting(0);
        let dynamic: &mut dyn InputDevice = &mut device;
        dynamic.fire_pulse().unwrap();
        dynamic.fire_pulse().unwrap();
        assert_eq!(device.0, 2);
    }
}
