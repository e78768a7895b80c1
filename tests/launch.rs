use std::collections::VecDeque;
use std::time::Duration;

use ai_battle_sim::devices::{InputEvent, RecordingInput};
use ai_battle_sim::errors::{CaptureError, InjectionError};
use ai_battle_sim::game_state::{Ammo, ScreenPoint, Velocity};
use ai_battle_sim::prelude::*;
use ai_battle_sim::stats::MatchEvent;
use ai_battle_sim::vision::{BoundingBox, Frame};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn init_test_logger() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .with_test_writer()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

struct BlankCapture;

impl FrameSource for BlankCapture {
    fn capture_frame(&mut self) -> Result<Frame, CaptureError> {
        Ok(Frame::blank(64, 64))
    }
}

/// Fails every other frame, starting with the first.
#[derive(Default)]
struct FlakyCapture {
    calls: u32,
}

impl FrameSource for FlakyCapture {
    fn capture_frame(&mut self) -> Result<Frame, CaptureError> {
        self.calls += 1;
        if self.calls % 2 == 1 {
            Err(CaptureError::Unavailable("alt-tabbed".to_owned()))
        } else {
            Ok(Frame::blank(64, 64))
        }
    }
}

/// Opponent always in sight at mid range; kill feed replayed from a script.
#[derive(Default)]
struct ScriptedVision {
    feed: VecDeque<Vec<MatchEvent>>,
}

impl ScriptedVision {
    fn with_feed(feed: Vec<Vec<MatchEvent>>) -> Self {
        Self { feed: feed.into() }
    }
}

impl Vision for ScriptedVision {
    fn detect_opponent(&mut self, _frame: &Frame) -> Option<BoundingBox> {
        Some(BoundingBox::new(20, 10, 10, 30))
    }

    fn estimate_velocity(&mut self, _frame: &Frame, _opponent: &BoundingBox) -> Velocity {
        Velocity::default()
    }

    fn estimate_health(&mut self, _frame: &Frame) -> u32 {
        80
    }

    fn estimate_ammo(&mut self, _frame: &Frame) -> Ammo {
        Ammo {
            clip: 30,
            reserve: 90,
        }
    }

    fn estimate_cover(&mut self, _frame: &Frame) -> bool {
        false
    }

    fn detect_events(&mut self, _frame: &Frame) -> Vec<MatchEvent> {
        self.feed.pop_front().unwrap_or_default()
    }
}

/// Records input and raises the cancellation flag on the n-th trigger pulse.
struct CancellingInput {
    inner: RecordingInput,
    cancel: CancellationToken,
    cancel_on_pulse: usize,
}

impl InputDevice for CancellingInput {
    fn move_aim_to(
        &mut self,
        target: ScreenPoint,
        duration: Duration,
    ) -> Result<(), InjectionError> {
        self.inner.move_aim_to(target, duration)
    }

    fn fire_pulse(&mut self) -> Result<(), InjectionError> {
        self.inner.fire_pulse()?;
        if self.inner.fire_count() == self.cancel_on_pulse {
            self.cancel.cancel();
        }
        Ok(())
    }

    fn press_key(&mut self, key: Key) -> Result<(), InjectionError> {
        self.inner.press_key(key)
    }

    fn release_key(&mut self, key: Key) -> Result<(), InjectionError> {
        self.inner.release_key(key)
    }
}

#[derive(Default)]
struct RecordingReporter {
    periodic: Vec<(String, MatchStats)>,
    finals: Vec<MatchOutcome>,
}

impl Reporter for RecordingReporter {
    fn log_stats(&mut self, agent: &str, _elapsed: Duration, stats: &MatchStats) {
        self.periodic.push((agent.to_owned(), *stats));
    }

    fn save_match_report(&mut self, outcome: &MatchOutcome) {
        self.finals.push(outcome.clone());
    }
}

fn instant_agent(kind: PolicyKind) -> Agent {
    let profile =
        AgentProfile::with_scalars(kind.name(), DifficultyTier::Hard, Duration::ZERO, 0.85);
    Agent::with_profile(profile, kind.build())
}

fn fast_settings(max_ticks: u64) -> MatchSettings {
    MatchSettings::new(Duration::from_secs(60))
        .with_tick_interval(Duration::ZERO)
        .with_report_interval(Duration::ZERO)
        .with_max_ticks(max_ticks)
}

#[test]
fn zero_duration_match_reports_once() {
    init_test_logger();

    let mut env = Environment::new(BlankCapture, ColorVision::seeded(1), RecordingInput::new(), 1);
    let mut agent = instant_agent(PolicyKind::Tactical);
    let mut reporter = RecordingReporter::default();

    let outcome = run_match(
        &mut agent,
        &mut env,
        &mut reporter,
        &MatchSettings::new(Duration::ZERO),
        &CancellationToken::new(),
    );

    assert_eq!(outcome.state, MatchState::Completed);
    assert_eq!(outcome.ticks, 0);
    assert_eq!(outcome.stats, MatchStats::default());
    assert!(reporter.periodic.is_empty());
    assert_eq!(reporter.finals, vec![outcome]);
    assert!(env.input().events().is_empty());
}

#[test]
fn tick_budget_bounds_the_match() {
    init_test_logger();

    let mut env = Environment::new(
        BlankCapture,
        ScriptedVision::with_feed(vec![vec![MatchEvent::Kill { headshot: true }]]),
        RecordingInput::new(),
        2,
    )
    .with_time_scale(0.0);
    let mut agent = instant_agent(PolicyKind::Adaptive);
    let mut reporter = RecordingReporter::default();

    let outcome = run_match(
        &mut agent,
        &mut env,
        &mut reporter,
        &fast_settings(5),
        &CancellationToken::new(),
    );

    assert_eq!(outcome.state, MatchState::Completed);
    assert_eq!(outcome.ticks, 5);
    assert_eq!(outcome.stats.kills, 1);
    assert_eq!(outcome.stats.headshots, 1);
    assert_eq!(reporter.periodic.len(), 5);
    assert!(reporter.periodic.iter().all(|(name, _)| name == "adaptive"));
    assert_eq!(reporter.finals.len(), 1);
    // kill rate stays at 1.0 after the first kill: five pushes of four pulses
    assert_eq!(env.input().fire_count(), 5 * 4);
    assert!(env.input().unreleased_keys().is_empty());
}

#[test]
fn match_completes_on_wall_clock_and_reports_every_third_tick() {
    init_test_logger();

    let mut env = Environment::new(
        BlankCapture,
        ScriptedVision::default(),
        RecordingInput::new(),
        8,
    )
    .with_time_scale(0.0);
    let mut agent = instant_agent(PolicyKind::Predictive);
    let mut reporter = RecordingReporter::default();
    let settings = MatchSettings::new(Duration::from_millis(40))
        .with_tick_interval(Duration::from_millis(1))
        .with_report_interval(Duration::from_millis(3));
    assert_eq!(settings.report_every(), 3);

    let outcome = run_match(
        &mut agent,
        &mut env,
        &mut reporter,
        &settings,
        &CancellationToken::new(),
    );

    assert_eq!(outcome.state, MatchState::Completed);
    assert!(outcome.elapsed >= settings.duration);
    assert!(outcome.ticks > 0);
    // ticks 0, 3, 6, ... report
    let expected = outcome.ticks.div_ceil(3) as usize;
    assert_eq!(reporter.periodic.len(), expected);
    assert_eq!(reporter.finals.len(), 1);
}

#[test]
fn capture_failures_skip_ticks() {
    init_test_logger();

    let mut env = Environment::new(
        FlakyCapture::default(),
        ScriptedVision::default(),
        RecordingInput::new(),
        3,
    )
    .with_time_scale(0.0);
    let mut agent = instant_agent(PolicyKind::Tactical);
    let mut reporter = RecordingReporter::default();

    let outcome = run_match(
        &mut agent,
        &mut env,
        &mut reporter,
        &fast_settings(4),
        &CancellationToken::new(),
    );

    assert_eq!(outcome.state, MatchState::Completed);
    assert_eq!(outcome.ticks, 4);
    assert_eq!(outcome.skipped_ticks, 2);
    // two taps of two pulses each
    assert_eq!(env.input().fire_count(), 4);
    assert_eq!(reporter.finals.len(), 1);
}

#[test]
fn cancellation_finalizes_and_releases_keys() {
    init_test_logger();

    let cancel = CancellationToken::new();
    let input = CancellingInput {
        inner: RecordingInput::new(),
        cancel: cancel.clone(),
        cancel_on_pulse: 3,
    };
    let mut env = Environment::new(
        BlankCapture,
        ScriptedVision::with_feed(vec![vec![MatchEvent::Kill { headshot: false }]]),
        input,
        4,
    )
    .with_time_scale(0.0);
    let mut agent = instant_agent(PolicyKind::Aggressive);
    let mut reporter = RecordingReporter::default();

    let outcome = run_match(&mut agent, &mut env, &mut reporter, &fast_settings(100), &cancel);

    assert_eq!(outcome.state, MatchState::Interrupted);
    assert_eq!(outcome.ticks, 1);
    assert_eq!(outcome.stats.kills, 1);
    assert_eq!(reporter.finals.len(), 1);
    assert_eq!(reporter.finals[0].stats.kills, 1);

    let recorded = &env.input().inner;
    assert_eq!(recorded.fire_count(), 3);
    assert!(recorded.unreleased_keys().is_empty());
    // the strafe key held while firing was released after the abort
    assert_eq!(
        recorded.events().last(),
        Some(&InputEvent::Release(Key::Left))
    );
    assert!(env.held_keys().is_empty());
}

#[test]
fn tournament_ranks_by_score() {
    init_test_logger();

    let kill = MatchEvent::Kill { headshot: false };
    // first match: 5 kills, second match: 10 kills
    let mut feed = vec![vec![kill]; 5];
    feed.extend(vec![vec![kill, kill]; 5]);

    let mut env = Environment::new(
        BlankCapture,
        ScriptedVision::with_feed(feed),
        RecordingInput::new(),
        5,
    )
    .with_time_scale(0.0);
    let mut reporter = RecordingReporter::default();

    let mut tournament = Tournament::new(Duration::ZERO);
    tournament.add_agent(instant_agent(PolicyKind::Tactical));
    tournament.add_agent(instant_agent(PolicyKind::Adaptive));

    let standings = tournament.run(
        &mut env,
        &mut reporter,
        &fast_settings(5),
        &CancellationToken::new(),
    );

    assert_eq!(standings.len(), 2);
    assert_eq!(standings[0].agent, "adaptive");
    assert_eq!(standings[0].stats.score, 20);
    assert_eq!(standings[1].agent, "tactical");
    assert_eq!(standings[1].stats.score, 10);
    assert_eq!(reporter.finals.len(), 2);
}

#[test]
fn tournament_ties_keep_registration_order() {
    init_test_logger();

    let mut env = Environment::new(
        BlankCapture,
        ScriptedVision::default(),
        RecordingInput::new(),
        6,
    )
    .with_time_scale(0.0);
    let mut reporter = RecordingReporter::default();

    let mut tournament = Tournament::new(Duration::ZERO);
    for kind in [PolicyKind::Predictive, PolicyKind::Tactical, PolicyKind::Aggressive] {
        tournament.add_agent(instant_agent(kind));
    }

    let standings = tournament.run(
        &mut env,
        &mut reporter,
        &fast_settings(2),
        &CancellationToken::new(),
    );

    let names: Vec<_> = standings.iter().map(|s| s.agent.as_str()).collect();
    assert_eq!(names, ["predictive", "tactical", "aggressive"]);
}

#[test]
fn interrupted_tournament_skips_remaining_matches() {
    init_test_logger();

    let mut env = Environment::new(
        BlankCapture,
        ScriptedVision::default(),
        RecordingInput::new(),
        7,
    )
    .with_time_scale(0.0);
    let mut reporter = RecordingReporter::default();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut tournament = Tournament::new(Duration::from_secs(5));
    tournament.add_agent(instant_agent(PolicyKind::Tactical));
    tournament.add_agent(instant_agent(PolicyKind::Adaptive));

    let standings = tournament.run(&mut env, &mut reporter, &fast_settings(10), &cancel);

    assert_eq!(standings.len(), 1);
    assert_eq!(standings[0].state, MatchState::Interrupted);
    assert_eq!(reporter.finals.len(), 1);
    assert_eq!(reporter.finals[0].ticks, 0);
}
