//! One poll's worth of observed and estimated environment facts.

use std::ops::{Add, Mul};
use std::time::SystemTime;

/// A position on screen, in pixels of the logical capture resolution.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub const ORIGIN: ScreenPoint = ScreenPoint { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Estimated opponent velocity, in pixels per time unit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    pub dx: f32,
    pub dy: f32,
}

impl Mul<f32> for Velocity {
    type Output = Velocity;

    fn mul(self, rhs: f32) -> Velocity {
        Velocity {
            dx: self.dx * rhs,
            dy: self.dy * rhs,
        }
    }
}

impl Add<Velocity> for ScreenPoint {
    type Output = ScreenPoint;

    fn add(self, rhs: Velocity) -> ScreenPoint {
        self.offset(rhs.dx, rhs.dy)
    }
}

/// What is known about the opponent when one was detected this poll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpponentSighting {
    /// Centre of the opponent's bounding box.
    pub position: ScreenPoint,
    /// Estimated distance, always within `[5, 100]`.
    pub distance: f32,
    pub velocity: Velocity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ammo {
    pub clip: u32,
    pub reserve: u32,
}

/// Immutable snapshot produced by [`Environment::sample`](crate::environment::Environment::sample).
///
/// A fresh value is built on every poll; nothing links two snapshots together.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub timestamp: SystemTime,
    /// `None` when detection found nothing large enough to be an opponent.
    pub opponent: Option<OpponentSighting>,
    /// Own health, `0..=100`.
    pub health: u32,
    pub ammo: Ammo,
    pub cover_nearby: bool,
    /// Kills over kills plus deaths for the current match, 0.5 before any engagement.
    pub recent_kill_rate: f32,
}

impl GameState {
    pub fn opponent_visible(&self) -> bool {
        self.opponent.is_some()
    }

    /// Opponent position, or the origin when not detected.
    pub fn opponent_position(&self) -> ScreenPoint {
        self.opponent
            .map(|o| o.position)
            .unwrap_or(ScreenPoint::ORIGIN)
    }

    /// Opponent distance, or `0.0` when not detected.
    pub fn opponent_distance(&self) -> f32 {
        self.opponent.map(|o| o.distance).unwrap_or(0.0)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            timestamp: SystemTime::UNIX_EPOCH,
            opponent: None,
            health: 100,
            ammo: Ammo::default(),
            cover_nearby: false,
            recent_kill_rate: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undetected_opponent_reads_as_sentinels() {
        let state = GameState::default();
        assert!(!state.opponent_visible());
        assert_eq!(state.opponent_position(), ScreenPoint::ORIGIN);
        assert_eq!(state.opponent_distance(), 0.0);
    }

    #[test]
    fn linear_prediction() {
        let predicted = ScreenPoint::new(100.0, 50.0) + Velocity { dx: 5.0, dy: -5.0 } * 0.2;
        assert!((predicted.x - 101.0).abs() < 1e-4);
        assert!((predicted.y - 49.0).abs() < 1e-4);
    }
}
