//! Match configuration: arena settings, catalog override, and the ships
//! with the controllers that fly them.

use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use skirmish_core::catalog::PieceCatalog;
use skirmish_core::enums::{ScriptedBehavior, Team};
use skirmish_core::error::CatalogError;
use skirmish_sim::{
    ArenaConfig, ArenaSetup, BlockerSpec, Controller, HazardSpec, HumanInputHandle, LayoutSource,
    ShipEntry, ShipSpec,
};

use crate::policy::PursuitPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse match config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Who flies a configured ship.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerConfig {
    /// A human slot. Headless runs leave it idle.
    Human,
    Scripted {
        #[serde(default)]
        behavior: ScriptedBehavior,
    },
    /// The built-in pursuit policy behind the learned-controller interface.
    Pursuit {
        #[serde(default)]
        turn_toward_aim: bool,
    },
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig::Scripted {
            behavior: ScriptedBehavior::Hunter,
        }
    }
}

impl ControllerConfig {
    /// Instantiate a controller. `seed` feeds scripted randomness.
    pub fn build(&self, seed: u64) -> Controller {
        match *self {
            ControllerConfig::Human => Controller::human(HumanInputHandle::new()),
            ControllerConfig::Scripted { behavior } => Controller::scripted(behavior, seed),
            ControllerConfig::Pursuit { turn_toward_aim } => Controller::Ml(
                skirmish_sim::controller::MlController::new(PursuitPolicy::default())
                    .with_turn_toward_aim(turn_toward_aim),
            ),
        }
    }
}

/// One ship in a match config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipConfig {
    #[serde(flatten)]
    pub spec: ShipSpec,
    #[serde(default)]
    pub controller: ControllerConfig,
}

/// A complete match description, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub arena: ArenaConfig,
    /// Piece catalog JSON merged over the built-in catalog.
    pub catalog_path: Option<PathBuf>,
    /// Simulated seconds after which an undecided match is abandoned.
    pub time_limit_secs: f32,
    pub player: ShipConfig,
    pub opponents: Vec<ShipConfig>,
    pub hazards: Vec<HazardSpec>,
    pub blockers: Vec<BlockerSpec>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::builtin_duel()
    }
}

impl MatchConfig {
    /// Pursuit-policy fighter against a scripted hunter, with a hazard and
    /// two blockers in between.
    pub fn builtin_duel() -> Self {
        Self {
            arena: ArenaConfig::default(),
            catalog_path: None,
            time_limit_secs: 120.0,
            player: ShipConfig {
                spec: ShipSpec {
                    name: "player".into(),
                    team: Team::Friend,
                    layout: LayoutSource::Preset("fighter".into()),
                    position: Vec2::new(0.0, -200.0),
                    rotation: 0.0,
                },
                controller: ControllerConfig::Pursuit {
                    turn_toward_aim: true,
                },
            },
            opponents: vec![ShipConfig {
                spec: ShipSpec {
                    name: "hunter".into(),
                    team: Team::Foe,
                    layout: LayoutSource::Preset("drone".into()),
                    position: Vec2::new(0.0, 200.0),
                    rotation: std::f32::consts::PI,
                },
                controller: ControllerConfig::default(),
            }],
            hazards: vec![HazardSpec {
                position: Vec2::new(-150.0, 0.0),
                velocity: Vec2::new(35.0, 20.0),
                radius: 25.0,
                damage: 8.0,
            }],
            blockers: vec![
                BlockerSpec {
                    position: Vec2::new(120.0, 40.0),
                    radius: 30.0,
                },
                BlockerSpec {
                    position: Vec2::new(-100.0, -60.0),
                    radius: 20.0,
                },
            ],
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = read(path)?;
        Self::from_json(&json)
    }

    /// The built-in catalog, extended by the configured override file.
    pub fn load_catalog(&self) -> Result<PieceCatalog, ConfigError> {
        let mut catalog = PieceCatalog::builtin();
        if let Some(path) = &self.catalog_path {
            catalog.extend(PieceCatalog::from_json(&read(path)?)?);
        }
        Ok(catalog)
    }

    /// Fresh controllers and specs for one match. Scripted seeds derive
    /// from `seed` so every match is reproducible.
    pub fn build_setup(&self, seed: u64) -> ArenaSetup {
        let entry = |ship: &ShipConfig, slot: u64| ShipEntry {
            spec: ship.spec.clone(),
            controller: ship.controller.build(seed.wrapping_add(slot)),
        };
        ArenaSetup {
            player: entry(&self.player, 0),
            opponents: self
                .opponents
                .iter()
                .enumerate()
                .map(|(i, ship)| entry(ship, i as u64 + 1))
                .collect(),
            hazards: self.hazards.clone(),
            blockers: self.blockers.clone(),
        }
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
