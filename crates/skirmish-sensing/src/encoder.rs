//! Top-level sensing entry point.

use skirmish_core::constants::*;
use skirmish_core::sensing::{SelfSensing, SensingState};
use skirmish_core::types::{
    world_to_local, ArenaBounds, BlockerView, HazardView, ProjectileView, ShipView,
};

use crate::contacts::{compute_blockers_sensing, compute_enemies_sensing, compute_hazards_sensing};
use crate::threats::compute_threat_radar;
use crate::walls::compute_wall_sensing;

/// Everything in the arena a ship can perceive, as plain views.
#[derive(Debug, Clone, Copy)]
pub struct SensingContext<'a> {
    pub bounds: ArenaBounds,
    pub ships: &'a [ShipView],
    pub projectiles: &'a [ProjectileView],
    pub hazards: &'a [HazardView],
    pub blockers: &'a [BlockerView],
}

/// Ship-frame velocities, health and normalized position.
pub fn compute_self_sensing(ship: &ShipView, bounds: &ArenaBounds) -> SelfSensing {
    let local = world_to_local(ship.velocity, ship.rotation);
    let position = bounds.normalize_position(ship.position);
    SelfSensing {
        forward_velocity: (local.y / MAX_SENSED_VELOCITY).clamp(-1.0, 1.0),
        lateral_velocity: (local.x / MAX_SENSED_VELOCITY).clamp(-1.0, 1.0),
        angular_velocity: (ship.angular_velocity / MAX_SENSED_ANGULAR_VELOCITY).clamp(-1.0, 1.0),
        health: ship.health.clamp(0.0, 1.0),
        x: position.x,
        y: position.y,
    }
}

/// Full sensing snapshot of `ship`. Pure: the same inputs always give the
/// same state, and the flattened shape never depends on entity counts.
pub fn compute_sensing(ship: &ShipView, ctx: &SensingContext<'_>) -> SensingState {
    let (enemies, enemy_world) = compute_enemies_sensing(ship, ctx.ships, &ctx.bounds);
    SensingState {
        self_state: compute_self_sensing(ship, &ctx.bounds),
        walls: compute_wall_sensing(ship, &ctx.bounds),
        threats: compute_threat_radar(ship, ctx.projectiles),
        enemies,
        hazards: compute_hazards_sensing(ship, ctx.hazards, &ctx.bounds),
        blockers: compute_blockers_sensing(ship, ctx.blockers, &ctx.bounds),
        enemy_world,
    }
}
