//! Decision strategies.
//!
//! A [`Policy`] maps a [`GameState`] to an [`Action`] and nothing else: aiming delays,
//! key holds and trigger pulses are carried inside the returned action and executed by the
//! [`Environment`](crate::environment::Environment). Given the same sequence of states, a
//! policy returns the same sequence of actions.
//!
//! # Provided Strategies
//! - [`TacticalPolicy`]: careful, retreats when hurt, sprays up close and taps at range.
//! - [`AdaptivePolicy`]: pushes when the kill rate is good, strafes defensively otherwise.
//! - [`PredictivePolicy`]: uses cover when hurt and leads its shots on the opponent's velocity.
//! - [`AggressivePolicy`]: rushes and fires on the move.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::bail;

use crate::action::{
    Action, ActionKind, AttackStyle, Key, PatrolPattern, RotationStrategy, Speed,
};
use crate::game_state::GameState;

/// Lookahead used to lead shots on a moving opponent, in velocity time units.
pub const PREDICTION_LOOKAHEAD: f32 = 0.2;

/// A decision function.
pub trait Policy: Send {
    fn kind(&self) -> PolicyKind;

    /// Choose the action for this tick.
    fn decide(&mut self, state: &GameState) -> Action;
}

/// The closed set of strategies, selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    Tactical,
    Adaptive,
    Predictive,
    Aggressive,
}

impl PolicyKind {
    /// Registration order used by tournaments.
    pub const ALL: [PolicyKind; 4] = [
        PolicyKind::Tactical,
        PolicyKind::Adaptive,
        PolicyKind::Predictive,
        PolicyKind::Aggressive,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PolicyKind::Tactical => "tactical",
            PolicyKind::Adaptive => "adaptive",
            PolicyKind::Predictive => "predictive",
            PolicyKind::Aggressive => "aggressive",
        }
    }

    pub fn build(self) -> Box<dyn Policy> {
        match self {
            PolicyKind::Tactical => Box::new(TacticalPolicy),
            PolicyKind::Adaptive => Box::new(AdaptivePolicy),
            PolicyKind::Predictive => Box::new(PredictivePolicy),
            PolicyKind::Aggressive => Box::new(AggressivePolicy),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PolicyKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        match PolicyKind::ALL.iter().find(|kind| kind.name() == lower) {
            Some(kind) => Ok(*kind),
            None => bail!("unknown policy '{s}'"),
        }
    }
}

/// Careful and analytical.
#[derive(Debug, Default, Clone, Copy)]
pub struct TacticalPolicy;

impl TacticalPolicy {
    const RETREAT_HEALTH: u32 = 30;
    const CLOSE_RANGE: f32 = 15.0;
    /// Long range shots are aimed this many pixels above the body centre.
    const HEAD_OFFSET: f32 = 60.0;
}

impl Policy for TacticalPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Tactical
    }

    fn decide(&mut self, state: &GameState) -> Action {
        let Some(opponent) = state.opponent else {
            return Action::new(ActionKind::Patrol(PatrolPattern::Methodical));
        };

        if state.health < Self::RETREAT_HEALTH {
            Action::new(ActionKind::Retreat {
                direction: Key::Back,
            })
        } else if opponent.distance < Self::CLOSE_RANGE {
            Action::new(ActionKind::Attack(AttackStyle::Spray))
                .with_engagement(opponent.position, 5)
                .holding(&[Key::Crouch])
        } else {
            Action::new(ActionKind::Attack(AttackStyle::Tap))
                .with_engagement(opponent.position.offset(0.0, -Self::HEAD_OFFSET), 2)
        }
    }
}

/// Balanced; leans on its kill rate.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdaptivePolicy;

impl AdaptivePolicy {
    const PUSH_KILL_RATE: f32 = 0.6;
}

impl Policy for AdaptivePolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Adaptive
    }

    fn decide(&mut self, state: &GameState) -> Action {
        let Some(opponent) = state.opponent else {
            return Action::new(ActionKind::Explore(Speed::Moderate));
        };

        if state.recent_kill_rate > Self::PUSH_KILL_RATE {
            Action::new(ActionKind::AggressivePush(None))
                .with_movement(&[Key::Forward], Duration::from_millis(200))
                .with_engagement(opponent.position, 4)
        } else {
            Action::new(ActionKind::DefensiveStrafe)
                .with_movement(&[Key::Left], Duration::from_millis(150))
                .with_engagement(opponent.position, 3)
        }
    }
}

/// Positions before engaging and leads its shots.
#[derive(Debug, Default, Clone, Copy)]
pub struct PredictivePolicy;

impl PredictivePolicy {
    const COVER_HEALTH: u32 = 50;
}

impl Policy for PredictivePolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Predictive
    }

    fn decide(&mut self, state: &GameState) -> Action {
        let Some(opponent) = state.opponent else {
            return Action::new(ActionKind::Rotate(RotationStrategy::MapControl));
        };

        let mut action = Action::new(ActionKind::TacticalEngagement);
        if state.cover_nearby && state.health < Self::COVER_HEALTH {
            action = action.with_movement(&[Key::Walk, Key::Right], Duration::from_millis(300));
        }

        let predicted = opponent.position + opponent.velocity * PREDICTION_LOOKAHEAD;
        action.with_engagement(predicted, 3)
    }
}

/// Fast and aggressive.
#[derive(Debug, Default, Clone, Copy)]
pub struct AggressivePolicy;

impl Policy for AggressivePolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Aggressive
    }

    fn decide(&mut self, state: &GameState) -> Action {
        match state.opponent {
            Some(opponent) => Action::new(ActionKind::Rush)
                .with_movement(&[Key::Walk, Key::Forward], Duration::from_millis(150))
                .with_engagement(opponent.position, 6)
                .holding_while_firing(&[Key::Left]),
            None => Action::new(ActionKind::AggressivePush(Some(Speed::Fast)))
                .with_movement(&[Key::Forward], Duration::from_millis(400)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::{OpponentSighting, ScreenPoint, Velocity};

    fn sighted(health: u32, distance: f32) -> GameState {
        GameState {
            opponent: Some(OpponentSighting {
                position: ScreenPoint::new(960.0, 540.0),
                distance,
                velocity: Velocity { dx: 5.0, dy: -5.0 },
            }),
            health,
            ..GameState::default()
        }
    }

    #[test]
    fn tactical_branches() {
        let mut policy = TacticalPolicy;

        let retreat = policy.decide(&sighted(20, 50.0));
        assert_eq!(
            retreat.kind,
            ActionKind::Retreat {
                direction: Key::Back
            }
        );
        assert!(retreat.engagement.is_none());

        let spray = policy.decide(&sighted(80, 10.0));
        assert_eq!(spray.kind, ActionKind::Attack(AttackStyle::Spray));
        let engagement = spray.engagement.unwrap();
        assert_eq!(engagement.burst, 5);
        assert_eq!(engagement.stance, vec![Key::Crouch]);

        let tap = policy.decide(&sighted(80, 40.0));
        assert_eq!(tap.kind, ActionKind::Attack(AttackStyle::Tap));
        let engagement = tap.engagement.unwrap();
        assert_eq!(engagement.burst, 2);
        assert_eq!(engagement.target, ScreenPoint::new(960.0, 480.0));

        let patrol = policy.decide(&GameState::default());
        assert_eq!(patrol.kind, ActionKind::Patrol(PatrolPattern::Methodical));
    }

    #[test]
    fn adaptive_follows_kill_rate() {
        let mut policy = AdaptivePolicy;
        let mut state = sighted(80, 40.0);

        state.recent_kill_rate = 0.8;
        let push = policy.decide(&state);
        assert_eq!(push.kind, ActionKind::AggressivePush(None));
        assert_eq!(push.movement[0].keys, vec![Key::Forward]);
        assert_eq!(push.engagement.unwrap().burst, 4);

        // 0.6 is not strictly above the threshold
        state.recent_kill_rate = 0.6;
        let strafe = policy.decide(&state);
        assert_eq!(strafe.kind, ActionKind::DefensiveStrafe);
        assert_eq!(strafe.movement[0].hold, Duration::from_millis(150));

        assert_eq!(
            policy.decide(&GameState::default()).kind,
            ActionKind::Explore(Speed::Moderate)
        );
    }

    #[test]
    fn predictive_leads_target_and_uses_cover() {
        let mut policy = PredictivePolicy;
        let mut state = sighted(40, 40.0);
        state.cover_nearby = true;

        let action = policy.decide(&state);
        assert_eq!(action.kind, ActionKind::TacticalEngagement);
        assert_eq!(action.movement[0].keys, vec![Key::Walk, Key::Right]);
        let target = action.engagement.unwrap().target;
        assert!((target.x - 961.0).abs() < 1e-3);
        assert!((target.y - 539.0).abs() < 1e-3);

        state.health = 90;
        assert!(policy.decide(&state).movement.is_empty());
    }

    #[test]
    fn aggressive_rushes_or_pushes() {
        let mut policy = AggressivePolicy;
        let rush = policy.decide(&sighted(100, 70.0));
        assert_eq!(rush.kind, ActionKind::Rush);
        let engagement = rush.engagement.unwrap();
        assert!(engagement.stance.is_empty());
        assert_eq!(engagement.fire_stance, vec![Key::Left]);

        let push = policy.decide(&GameState::default());
        assert_eq!(push.kind, ActionKind::AggressivePush(Some(Speed::Fast)));
        assert_eq!(push.movement[0].hold, Duration::from_millis(400));
    }

    #[test]
    fn replaying_states_reproduces_actions() {
        let states = vec![
            sighted(20, 50.0),
            GameState::default(),
            sighted(80, 10.0),
            sighted(45, 30.0),
        ];
        for kind in PolicyKind::ALL {
            let first: Vec<_> = {
                let mut policy = kind.build();
                states.iter().map(|s| policy.decide(s)).collect()
            };
            let second: Vec<_> = {
                let mut policy = kind.build();
                states.iter().map(|s| policy.decide(s)).collect()
            };
            assert_eq!(first, second, "{kind} is not deterministic");
        }
    }

    #[test]
    fn kind_parsing() {
        assert_eq!("Aggressive".parse::<PolicyKind>().unwrap(), PolicyKind::Aggressive);
        assert!("all".parse::<PolicyKind>().is_err());
        for kind in PolicyKind::ALL {
            assert_eq!(kind.build().kind(), kind);
        }
    }
}
