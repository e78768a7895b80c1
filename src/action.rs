//! Symbolic actions returned by policies.
//!
//! An [`Action`] carries everything the adapter needs to execute it: the symbolic kind and
//! its parameters, optional movement steps and an optional engagement (aim point plus burst).
//! Policies never touch the input layer themselves.

use std::fmt;
use std::time::Duration;

use crate::game_state::ScreenPoint;

/// Keyboard keys the simulation may press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Left,
    Back,
    Right,
    Crouch,
    Walk,
    Reload,
}

impl Key {
    /// Default binding of the key.
    pub fn binding(self) -> &'static str {
        match self {
            Key::Forward => "w",
            Key::Left => "a",
            Key::Back => "s",
            Key::Right => "d",
            Key::Crouch => "ctrl",
            Key::Walk => "shift",
            Key::Reload => "r",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binding())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackStyle {
    /// Close range, long burst.
    Spray,
    /// Long range, short burst.
    Tap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    Moderate,
    Fast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatrolPattern {
    Methodical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationStrategy {
    MapControl,
}

/// The symbolic part of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Attack(AttackStyle),
    Retreat { direction: Key },
    Patrol(PatrolPattern),
    Explore(Speed),
    Rush,
    Rotate(RotationStrategy),
    AggressivePush(Option<Speed>),
    DefensiveStrafe,
    TacticalEngagement,
    Reload,
    /// Accepted and ignored by the adapter.
    Idle,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Attack(AttackStyle::Spray) => write!(f, "attack(spray)"),
            ActionKind::Attack(AttackStyle::Tap) => write!(f, "attack(tap)"),
            ActionKind::Retreat { direction } => write!(f, "retreat({direction})"),
            ActionKind::Patrol(_) => write!(f, "patrol"),
            ActionKind::Explore(_) => write!(f, "explore"),
            ActionKind::Rush => write!(f, "rush"),
            ActionKind::Rotate(_) => write!(f, "rotate"),
            ActionKind::AggressivePush(_) => write!(f, "aggressive_push"),
            ActionKind::DefensiveStrafe => write!(f, "defensive_strafe"),
            ActionKind::TacticalEngagement => write!(f, "tactical_engagement"),
            ActionKind::Reload => write!(f, "reload"),
            ActionKind::Idle => write!(f, "idle"),
        }
    }
}

/// Keys held together for a fixed time, then released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movement {
    pub keys: Vec<Key>,
    pub hold: Duration,
}

impl Movement {
    pub fn new(keys: &[Key], hold: Duration) -> Self {
        Self {
            keys: keys.to_vec(),
            hold,
        }
    }
}

/// Aim at `target` (before accuracy jitter) and fire `burst` pulses.
///
/// `stance` keys are held from before the aim until the last pulse, `fire_stance` keys only
/// around the pulses.
#[derive(Debug, Clone, PartialEq)]
pub struct Engagement {
    pub target: ScreenPoint,
    pub burst: u32,
    pub stance: Vec<Key>,
    pub fire_stance: Vec<Key>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub kind: ActionKind,
    /// Executed in order, before the engagement.
    pub movement: Vec<Movement>,
    pub engagement: Option<Engagement>,
}

impl Action {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            movement: vec![],
            engagement: None,
        }
    }

    pub fn idle() -> Self {
        Self::new(ActionKind::Idle)
    }

    pub fn with_movement(mut self, keys: &[Key], hold: Duration) -> Self {
        self.movement.push(Movement::new(keys, hold));
        self
    }

    pub fn with_engagement(mut self, target: ScreenPoint, burst: u32) -> Self {
        self.engagement = Some(Engagement {
            target,
            burst,
            stance: vec![],
            fire_stance: vec![],
        });
        self
    }

    /// Keys held while aiming and firing. Does nothing without an engagement.
    pub fn holding(mut self, stance: &[Key]) -> Self {
        if let Some(engagement) = self.engagement.as_mut() {
            engagement.stance = stance.to_vec();
        }
        self
    }

    /// Keys held only while the trigger is pulsed. Does nothing without an engagement.
    pub fn holding_while_firing(mut self, keys: &[Key]) -> Self {
        if let Some(engagement) = self.engagement.as_mut() {
            engagement.fire_stance = keys.to_vec();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_chains() {
        let action = Action::new(ActionKind::Rush)
            .with_movement(&[Key::Walk, Key::Forward], Duration::from_millis(150))
            .with_engagement(ScreenPoint::new(10.0, 20.0), 6)
            .holding_while_firing(&[Key::Left]);

        assert_eq!(action.movement.len(), 1);
        let engagement = action.engagement.unwrap();
        assert_eq!(engagement.burst, 6);
        assert!(engagement.stance.is_empty());
        assert_eq!(engagement.fire_stance, vec![Key::Left]);
    }

    #[test]
    fn holding_without_engagement_is_ignored() {
        let action = Action::idle()
            .holding(&[Key::Crouch])
            .holding_while_firing(&[Key::Left]);
        assert!(action.engagement.is_none());
    }

    #[test]
    fn kind_display() {
        assert_eq!(
            ActionKind::Retreat {
                direction: Key::Back
            }
            .to_string(),
            "retreat(s)"
        );
        assert_eq!(ActionKind::Attack(AttackStyle::Tap).to_string(), "attack(tap)");
    }
}
