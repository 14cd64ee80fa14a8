//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

use crate::types::ShipId;

/// Friend/foe tag. Ships on the same team never count as enemies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    #[default]
    Friend,
    Foe,
}

impl Team {
    pub fn opposing(self) -> Team {
        match self {
            Team::Friend => Team::Foe,
            Team::Foe => Team::Friend,
        }
    }
}

/// Piece category within a ship layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceCategory {
    /// Armor and hull blocks.
    #[default]
    Structure,
    /// Thrusters and weapons.
    Equipment,
    /// The single mandatory piece; its loss destroys the ship.
    Core,
}

/// Weapon mount state machine phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponPhase {
    /// No aim target.
    #[default]
    Idle,
    /// Turret still slewing toward the target.
    Aiming,
    /// On target and able to fire.
    Ready,
    /// Target outside the firing arc, weapon overheated, or host piece lost.
    Blocked,
    /// A burst is in progress.
    Firing,
    /// Waiting for the reload timer.
    Reloading,
}

/// Ship lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipLifecycle {
    #[default]
    Spawning,
    Active,
    Destroyed,
}

/// Session result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    Lost,
}

/// Session phase (top-level state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Simulating; no outcome yet.
    #[default]
    Active,
    /// Outcome decided, waiting for the grace delay.
    Resolving,
    /// Outcome callback delivered. Simulation keeps running until exit.
    Finished,
    /// Torn down; ticks are no-ops.
    Exited,
}

/// What destroyed a ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DestructionCause {
    Projectile { shooter: ShipId },
    Hazard,
    /// Damage applied directly through the session.
    Direct,
    /// Removed by the session rather than by damage.
    Removed,
}

/// Controller variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerKind {
    Human,
    Scripted,
    Ml,
}

/// Scripted controller behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptedBehavior {
    /// Produces no intents.
    Idle,
    /// Random intents re-rolled on an interval.
    Wander,
    /// Chases and shoots the nearest enemy.
    #[default]
    Hunter,
}
