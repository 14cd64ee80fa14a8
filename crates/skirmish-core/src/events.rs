//! Events emitted by the simulation for visualizers and recorders.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::ShipId;

/// Something notable that happened during a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ArenaEvent {
    ShipSpawned {
        ship: ShipId,
        team: Team,
        position: Vec2,
    },
    /// A ship could not be spawned; the session continued without it.
    SpawnFailed { name: String, reason: String },
    ShotFired {
        ship: ShipId,
        mount: usize,
        position: Vec2,
    },
    ProjectileHit {
        shooter: ShipId,
        target: ShipId,
        piece: usize,
        damage: f32,
    },
    HazardContact { ship: ShipId, damage: f32 },
    PieceDestroyed { ship: ShipId, piece: usize },
    ShipDestroyed {
        ship: ShipId,
        cause: DestructionCause,
    },
    /// Outcome decided; delivery follows after the grace delay.
    OutcomeResolved { outcome: Outcome },
    /// Outcome callback fired.
    OutcomeDelivered { outcome: Outcome },
}
