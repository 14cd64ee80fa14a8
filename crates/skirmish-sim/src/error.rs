//! Error types of the arena simulation.
//!
//! Conditions that occur during normal play (no aim target, a missing wall
//! intersection, fewer entities than sensing slots) are never errors.

use skirmish_core::error::{CatalogError, LayoutError};
use skirmish_core::types::ShipId;
use thiserror::Error;

/// A physics body could not be created or addressed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    #[error("body has no colliders")]
    NoColliders,
    #[error("invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: f32 },
    #[error("dynamic body needs a positive mass, got {0}")]
    InvalidMass(f32),
    #[error("unknown body handle")]
    UnknownBody,
}

/// A single ship could not be spawned. The session continues without it.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("invalid ship layout: {0}")]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("physics body creation failed: {0}")]
    Physics(#[from] PhysicsError),
    #[error("session has exited")]
    SessionExited,
}

/// The session cannot start or the request addresses nothing.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("arena bounds must be positive, got {width}x{height}")]
    InvalidArena { width: f32, height: f32 },
    #[error("player ship `{name}` cannot enter the arena: {source}")]
    InvalidPlayer {
        name: String,
        #[source]
        source: SpawnError,
    },
    #[error("arena setup failed: {0}")]
    Physics(#[from] PhysicsError),
    #[error("no ship {0} in this session")]
    UnknownShip(ShipId),
    #[error("session has exited")]
    Exited,
}

/// A recording could not be written.
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("failed to write recording: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),
}
