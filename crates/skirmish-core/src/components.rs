//! ECS components for hecs entities.
//!
//! Components are plain data structs. Game logic lives in systems; the only
//! methods here are read-only aggregates over a ship's pieces.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::catalog::WeaponSpec;
use crate::enums::*;
use crate::types::ShipId;

/// Identity and lifecycle of a ship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipInfo {
    pub id: ShipId,
    pub team: Team,
    /// Whether this is the local player's ship (decides win/loss).
    pub is_player: bool,
    pub name: String,
    pub lifecycle: ShipLifecycle,
}

/// One piece of a ship, exclusively owned by its hull.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Piece {
    pub kind: String,
    pub category: PieceCategory,
    /// Offset from the ship origin, ship-local frame.
    pub offset: Vec2,
    pub rotation: f32,
    pub width: f32,
    pub height: f32,
    pub mass: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub thrust: Option<f32>,
}

impl Piece {
    pub fn is_intact(&self) -> bool {
        self.hp > 0.0
    }
}

/// All pieces of a ship plus the mass properties derived from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hull {
    pub pieces: Vec<Piece>,
    /// Index of the single core piece.
    pub core_index: usize,
    pub mass: f32,
    /// Moment of inertia about the ship origin (world units).
    pub inertia: f32,
    /// Radius of the circle around the ship origin enclosing every piece.
    pub radius: f32,
}

impl Hull {
    /// Sum of remaining piece HP.
    pub fn health(&self) -> f32 {
        self.pieces.iter().map(|p| p.hp.max(0.0)).sum()
    }

    pub fn max_health(&self) -> f32 {
        self.pieces.iter().map(|p| p.max_hp).sum()
    }

    /// Aggregate health in [0, 1].
    pub fn health_fraction(&self) -> f32 {
        let max = self.max_health();
        if max > 0.0 {
            (self.health() / max).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn core(&self) -> &Piece {
        &self.pieces[self.core_index]
    }

    pub fn is_core_destroyed(&self) -> bool {
        !self.core().is_intact()
    }

    /// Total thrust of intact thrusters.
    pub fn thrust(&self) -> f32 {
        self.pieces
            .iter()
            .filter(|p| p.is_intact())
            .filter_map(|p| p.thrust)
            .sum()
    }

    /// Index of the intact piece closest to a ship-local point.
    pub fn nearest_intact_piece(&self, local_point: Vec2) -> Option<usize> {
        self.pieces
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_intact())
            .min_by(|(_, a), (_, b)| {
                a.offset
                    .distance_squared(local_point)
                    .total_cmp(&b.offset.distance_squared(local_point))
            })
            .map(|(i, _)| i)
    }
}

/// Physics-owned motion state, read back after every physics step.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ShipMotion {
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
    pub angular_velocity: f32,
}

/// Aiming, reload, and burst state of one weapon piece.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponMount {
    /// Index of the host piece in the ship's hull.
    pub piece_index: usize,
    pub spec: WeaponSpec,
    /// Mount position, ship-local frame.
    pub offset: Vec2,
    pub phase: WeaponPhase,
    /// Turret angle relative to the ship's forward axis, within ±aim_arc.
    pub turret_angle: f32,
    pub since_last_shot: f32,
    /// Shots left in the current burst.
    pub burst_remaining: u32,
    /// Time until the next shot of the current burst.
    pub burst_timer: f32,
    /// Spin-up level (0.0 - 1.0).
    pub spin: f32,
    pub heat: f32,
    pub overheated: bool,
}

/// Weapon mounts of a ship.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Armament {
    pub mounts: Vec<WeaponMount>,
}

/// Linear motion of entities simulated outside the physics engine.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Kinematics {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// A projectile in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    /// Firing ship; never damaged by, nor threatened by, its own shots.
    pub shooter: ShipId,
    pub damage: f32,
    pub lifetime_secs: f32,
    pub radius: f32,
    /// Position at the start of the current tick (for swept hit tests).
    pub previous_position: Vec2,
}

/// A drifting environmental hazard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub radius: f32,
    /// Damage per contact.
    pub damage: f32,
    /// Remaining contact cooldown per ship.
    pub cooldowns: Vec<(ShipId, f32)>,
}

/// A static circular obstacle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Blocker {
    pub position: Vec2,
    pub radius: f32,
}
