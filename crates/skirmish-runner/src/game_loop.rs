//! Headless match loop: runs arena sessions at the fixed tick rate and
//! summarizes how they ended.

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use skirmish_core::catalog::PieceCatalog;
use skirmish_core::constants::{DT, TICK_RATE};
use skirmish_core::enums::{Outcome, SessionPhase};
use skirmish_core::events::ArenaEvent;
use skirmish_sim::recorder::SensingRecorder;
use skirmish_sim::{ArenaSession, RecorderError, SessionError};

use crate::config::{ConfigError, MatchConfig};

/// Nominal duration of one tick at 1x speed.
const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Recorder(#[from] RecorderError),
}

/// How the runner paces and instruments matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Sleep between ticks so a match takes wall-clock time.
    pub realtime: bool,
    /// Record the player's sensing in the first match.
    pub record: bool,
}

/// Result of one match.
#[derive(Debug)]
pub struct MatchSummary {
    pub index: usize,
    pub seed: u64,
    /// `None` when the time limit ran out first.
    pub outcome: Option<Outcome>,
    pub ticks: u64,
    pub shots: usize,
    pub hits: usize,
    pub recording: Option<SensingRecorder>,
}

/// Run `count` matches with consecutive seeds starting at the config's seed.
pub fn run_matches(
    config: &MatchConfig,
    count: usize,
    options: RunOptions,
) -> Result<Vec<MatchSummary>, RunnerError> {
    let catalog = config.load_catalog()?;
    (0..count)
        .map(|index| {
            let record = options.record && index == 0;
            run_match(config, &catalog, index, record, options.realtime)
        })
        .collect()
}

/// Run one match until its outcome is delivered or the time limit passes.
pub fn run_match(
    config: &MatchConfig,
    catalog: &PieceCatalog,
    index: usize,
    record: bool,
    realtime: bool,
) -> Result<MatchSummary, RunnerError> {
    let seed = config.arena.seed.wrapping_add(index as u64);
    let arena = skirmish_sim::ArenaConfig {
        seed,
        ..config.arena
    };
    let mut session = ArenaSession::enter(arena, catalog.clone(), config.build_setup(seed))?;
    if record {
        session.attach_recorder(session.player_id())?;
    }

    let max_ticks = (config.time_limit_secs.max(0.0) * TICK_RATE as f32).ceil() as u64;
    let mut shots = 0;
    let mut hits = 0;
    let mut next_tick_time = Instant::now();

    while session.time().tick < max_ticks {
        let report = session.tick(DT);
        for event in &report.events {
            match event {
                ArenaEvent::ShotFired { .. } => shots += 1,
                ArenaEvent::ProjectileHit { .. } => hits += 1,
                ArenaEvent::SpawnFailed { name, reason } => {
                    warn!(match_index = index, %name, %reason, "ship skipped");
                }
                ArenaEvent::ShipDestroyed { ship, cause } => {
                    debug!(match_index = index, %ship, ?cause, "ship destroyed");
                }
                _ => {}
            }
        }
        if report.phase == SessionPhase::Finished {
            break;
        }

        if realtime {
            next_tick_time += TICK_DURATION;
            let now = Instant::now();
            if next_tick_time > now {
                std::thread::sleep(next_tick_time - now);
            } else if now - next_tick_time > TICK_DURATION * 2 {
                // Too far behind; reset instead of catching up.
                next_tick_time = now;
            }
        }
    }

    let outcome = session.outcome().filter(|_| session.phase() == SessionPhase::Finished);
    let ticks = session.time().tick;
    let recording = session.take_recorder();
    session.exit();

    match outcome {
        Some(outcome) => info!(match_index = index, seed, ?outcome, ticks, shots, hits, "match finished"),
        None => info!(match_index = index, seed, ticks, shots, hits, "match hit the time limit"),
    }

    Ok(MatchSummary {
        index,
        seed,
        outcome,
        ticks,
        shots,
        hits,
        recording,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_duel() -> MatchConfig {
        MatchConfig {
            time_limit_secs: 3.0,
            ..MatchConfig::builtin_duel()
        }
    }

    #[test]
    fn test_match_respects_time_limit_and_records() {
        let summaries = run_matches(
            &short_duel(),
            2,
            RunOptions {
                realtime: false,
                record: true,
            },
        )
        .unwrap();

        assert_eq!(summaries.len(), 2);
        let first = &summaries[0];
        assert!(first.ticks <= 3 * TICK_RATE as u64);
        let recording = first.recording.as_ref().unwrap();
        assert!(!recording.is_empty());
        assert!(recording.len() as u64 <= first.ticks);
        assert!(summaries[1].recording.is_none());
        assert_eq!(summaries[1].seed, first.seed + 1);
    }

    #[test]
    fn test_same_seed_same_match() {
        let config = short_duel();
        let catalog = config.load_catalog().unwrap();
        let a = run_match(&config, &catalog, 0, false, false).unwrap();
        let b = run_match(&config, &catalog, 0, false, false).unwrap();
        assert_eq!(a.ticks, b.ticks);
        assert_eq!(a.shots, b.shots);
        assert_eq!(a.hits, b.hits);
        assert_eq!(a.outcome, b.outcome);
    }

    #[test]
    fn test_tick_duration_constant() {
        let expected_nanos = 1_000_000_000u64 / TICK_RATE as u64;
        assert_eq!(TICK_DURATION.as_nanos(), expected_nanos as u128);
    }
}
