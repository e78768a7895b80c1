//! Operator-facing progress output.

use std::time::Duration;

use tracing::info;

use crate::game_interface::Reporter;
use crate::match_runner::{MatchOutcome, MatchState};
use crate::stats::MatchStats;
use crate::tournament::Standing;

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[39m";

/// Emits every report as a tracing event, and prints it when `verbose` is set.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Reporter for ConsoleReporter {
    fn log_stats(&mut self, agent: &str, elapsed: Duration, stats: &MatchStats) {
        info!(agent, elapsed = elapsed.as_secs(), %stats, "progress");
        if self.verbose {
            println!("{GREEN}{:>5}s{RESET} | {agent} | {stats}", elapsed.as_secs());
        }
    }

    fn save_match_report(&mut self, outcome: &MatchOutcome) {
        info!(
            agent = %outcome.agent,
            state = %outcome.state,
            ticks = outcome.ticks,
            skipped_ticks = outcome.skipped_ticks,
            elapsed = ?outcome.elapsed,
            stats = %outcome.stats,
            "match report"
        );
        if self.verbose {
            println!("{}", format_outcome(outcome));
        }
    }
}

pub fn format_outcome(outcome: &MatchOutcome) -> String {
    let (color, label) = match outcome.state {
        MatchState::Interrupted => (YELLOW, "Match interrupted"),
        _ => (GREEN, "Match completed"),
    };
    format!(
        "{color}{label}:{RESET} {} after {:.1}s ({} ticks, {} skipped) | {}",
        outcome.agent,
        outcome.elapsed.as_secs_f32(),
        outcome.ticks,
        outcome.skipped_ticks,
        outcome.stats
    )
}

/// Print the final rankings of a tournament.
pub fn print_standings(standings: &[Standing]) {
    println!("{}", "=".repeat(50));
    println!("{GREEN}FINAL RANKINGS{RESET}");
    println!("{}", "=".repeat(50));
    for standing in standings {
        println!("{standing}");
    }
}
