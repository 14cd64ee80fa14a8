//! Skirmish runner - plays arena matches headless and reports the results.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use skirmish_runner::config::MatchConfig;
use skirmish_runner::game_loop::{run_matches, RunOptions, RunnerError};

/// Run skirmish arena matches without a frontend
#[derive(Parser, Debug)]
#[command(name = "skirmish-runner")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Match config JSON (default: built-in duel)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the player's sensing frames from the first match as JSON lines
    #[arg(short, long)]
    record: Option<PathBuf>,

    /// Number of matches, seeded consecutively
    #[arg(short, long, default_value = "1")]
    matches: usize,

    /// Base seed (default: from the config)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Pace ticks in wall-clock time
    #[arg(long)]
    realtime: bool,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

fn run(args: Args) -> Result<(), RunnerError> {
    let mut config = match &args.config {
        Some(path) => MatchConfig::load(path)?,
        None => MatchConfig::builtin_duel(),
    };
    if let Some(seed) = args.seed {
        config.arena.seed = seed;
    }

    let options = RunOptions {
        realtime: args.realtime,
        record: args.record.is_some(),
    };
    let summaries = run_matches(&config, args.matches, options)?;

    let mut wins = 0;
    for summary in &summaries {
        let outcome = match summary.outcome {
            Some(outcome) => format!("{outcome:?}"),
            None => "timeout".to_string(),
        };
        if matches!(summary.outcome, Some(skirmish_core::enums::Outcome::Won)) {
            wins += 1;
        }
        println!(
            "match {} seed {}: {} after {} ticks ({} shots, {} hits)",
            summary.index, summary.seed, outcome, summary.ticks, summary.shots, summary.hits
        );
    }
    println!("won {wins}/{}", summaries.len());

    if let (Some(path), Some(recording)) = (
        &args.record,
        summaries.first().and_then(|s| s.recording.as_ref()),
    ) {
        recording.save(path)?;
        tracing::info!(path = %path.display(), frames = recording.len(), "recording saved");
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "runner failed");
            ExitCode::FAILURE
        }
    }
}
