use std::time::Duration;

use ai_battle_sim::logger::init_logger;
use ai_battle_sim::prelude::*;
use ai_battle_sim::report::print_standings;
use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ai-battle-sim")]
#[command(about = "Run simulated FPS players, alone or as a tournament")]
struct Cli {
    /// Policy to play, or `all` for a tournament of every policy
    #[arg(long, value_enum)]
    model: Model,
    /// Match duration in seconds
    #[arg(long, default_value_t = 600)]
    match_duration: u64,
    /// Difficulty tier: easy, medium or hard
    #[arg(long, default_value = "medium")]
    difficulty: DifficultyTier,
    /// Seed of every random source (overrides ARENA_SEED)
    #[arg(long)]
    seed: Option<u64>,
    /// Log to a timestamped file (overrides ARENA_LOG)
    #[arg(long)]
    log: bool,
    /// Do not print progress (overrides ARENA_VERBOSE)
    #[arg(long)]
    quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Model {
    Tactical,
    Adaptive,
    Predictive,
    Aggressive,
    All,
}

impl Model {
    fn policy(self) -> Option<PolicyKind> {
        match self {
            Model::Tactical => Some(PolicyKind::Tactical),
            Model::Adaptive => Some(PolicyKind::Adaptive),
            Model::Predictive => Some(PolicyKind::Predictive),
            Model::Aggressive => Some(PolicyKind::Aggressive),
            Model::All => None,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Configuration::from_env();
    if cli.log {
        config = config.with_log(true);
    }
    if cli.quiet {
        config = config.with_verbose(false);
    }
    if cli.seed.is_some() {
        config = config.with_seed(cli.seed);
    }

    if config.log() {
        let path = init_logger(config.log_dir())?;
        if config.verbose() {
            println!("Logging to {}", path.display());
        }
    }

    let seed = config.seed_or_random();
    info!(seed, ?config, "starting");

    let cancel = CancellationToken::new();
    cancel.cancel_on_ctrl_c()?;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut env = Environment::new(
        SyntheticCapture::new(config.screen(), seed),
        ColorVision::seeded(seed.wrapping_add(1)),
        DryRunInput,
        seed.wrapping_add(2),
    )
    .with_time_scale(config.time_scale());
    let settings = config.match_settings(Duration::from_secs(cli.match_duration));
    let mut reporter = ConsoleReporter::new(config.verbose());

    if config.verbose() {
        println!("AI Battle Simulator");
        println!("{}", "=".repeat(50));
    }

    match cli.model.policy() {
        Some(kind) => {
            if config.verbose() {
                println!("Loading {} policy ({})...", kind, cli.difficulty);
            }
            let mut agent = Agent::new(kind, cli.difficulty, &mut rng);
            run_match(&mut agent, &mut env, &mut reporter, &settings, &cancel);
        }
        None => {
            if config.verbose() {
                println!("Starting tournament with all policies...");
            }
            let mut tournament = Tournament::with_kinds(
                &PolicyKind::ALL,
                cli.difficulty,
                config.cooldown(),
                &mut rng,
            );
            let standings = tournament.run(&mut env, &mut reporter, &settings, &cancel);
            if config.verbose() {
                print_standings(&standings);
            }
        }
    }

    if config.verbose() && cancel.is_cancelled() {
        println!("Stopped by user.");
    }
    Ok(())
}
