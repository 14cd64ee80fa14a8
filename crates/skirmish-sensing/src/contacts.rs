//! Enemy, hazard and blocker slots.
//!
//! Every section is sorted nearest-first and padded to its fixed slot count.
//! Contacts beyond the slot count are dropped; missing contacts leave
//! zero-filled slots with `present = false`.

use std::f32::consts::PI;

use glam::Vec2;
use skirmish_core::constants::*;
use skirmish_core::sensing::*;
use skirmish_core::types::{
    bearing_from_forward, forward_angle, forward_vector, normalize_angle, ArenaBounds,
    BlockerView, HazardView, ShipView,
};

/// Shared distance/bearing prefix of a contact at world point `target`.
fn contact(ship: &ShipView, target: Vec2, distance: f32, diagonal: f32) -> ContactSensing {
    ContactSensing {
        present: true,
        distance: (distance / diagonal).clamp(0.0, 1.0),
        bearing: bearing_from_forward(ship.rotation, target - ship.position) / PI,
    }
}

/// Relative velocity of a contact resolved along the line of sight.
/// Returns (closing, lateral): closing is positive when the gap shrinks,
/// lateral is positive toward the left of the line of sight.
fn relative_motion(line_of_sight: Vec2, rel_vel: Vec2) -> (f32, f32) {
    let closing = -rel_vel.dot(line_of_sight) / MAX_SENSED_VELOCITY;
    let lateral = rel_vel.dot(line_of_sight.perp()) / MAX_SENSED_VELOCITY;
    (closing.clamp(-1.0, 1.0), lateral.clamp(-1.0, 1.0))
}

/// Indices of `positions` sorted by distance from `origin`, truncated to
/// `slots`. Ties keep input order.
fn nearest_first(origin: Vec2, positions: impl Iterator<Item = Vec2>, slots: usize) -> Vec<usize> {
    let mut order: Vec<(usize, f32)> = positions
        .enumerate()
        .map(|(i, p)| (i, p.distance_squared(origin)))
        .collect();
    order.sort_by(|a, b| a.1.total_cmp(&b.1));
    order.into_iter().take(slots).map(|(i, _)| i).collect()
}

/// Whether `other` counts as an enemy of `ship`.
pub fn is_enemy(ship: &ShipView, other: &ShipView) -> bool {
    other.alive && other.id != ship.id && other.team != ship.team
}

/// Up to [`ENEMY_SLOTS`] nearest living enemies, plus the raw world data of
/// the same slots.
pub fn compute_enemies_sensing(
    ship: &ShipView,
    ships: &[ShipView],
    bounds: &ArenaBounds,
) -> (
    [EnemySensing; ENEMY_SLOTS],
    [EnemyWorldData; ENEMY_SLOTS],
) {
    let mut slots = [EnemySensing::default(); ENEMY_SLOTS];
    let mut world = [EnemyWorldData::default(); ENEMY_SLOTS];
    let diagonal = bounds.diagonal();
    if diagonal <= 0.0 {
        return (slots, world);
    }

    let enemies: Vec<&ShipView> = ships.iter().filter(|s| is_enemy(ship, s)).collect();
    let order = nearest_first(ship.position, enemies.iter().map(|e| e.position), ENEMY_SLOTS);

    for (slot, index) in order.into_iter().enumerate() {
        let enemy = enemies[index];
        let delta = enemy.position - ship.position;
        let distance = delta.length();
        let los = delta.normalize_or_zero();
        let (closing_speed, lateral_speed) = relative_motion(los, enemy.velocity - ship.velocity);
        let enemy_forward = forward_vector(enemy.rotation);
        let (lead_velocity, lead_facing) = lead_values(ship, enemy, delta);

        slots[slot] = EnemySensing {
            contact: contact(ship, enemy.position, distance, diagonal),
            closing_speed,
            lateral_speed,
            facing: enemy_forward.dot(-los).clamp(-1.0, 1.0),
            health: enemy.health.clamp(0.0, 1.0),
            lead_velocity,
            lead_facing,
        };
        world[slot] = EnemyWorldData {
            present: true,
            position: enemy.position,
            velocity: enemy.velocity,
            forward_angle: forward_angle(enemy.rotation),
        };
    }
    (slots, world)
}

/// How far ahead of the enemy's velocity and facing the ship's forward axis
/// points. `offset` is the angle from the line of sight to the ship's
/// forward direction; its sine is multiplied by the across-the-line
/// component of the enemy's unit velocity (or unit facing), so both values
/// are positive when leading, negative when trailing and zero for a
/// stationary or line-of-sight-aligned target.
pub fn lead_values(ship: &ShipView, enemy: &ShipView, delta: Vec2) -> (f32, f32) {
    let los = delta.normalize_or_zero();
    if los == Vec2::ZERO {
        return (0.0, 0.0);
    }
    let across = los.perp();
    let offset = normalize_angle(forward_angle(ship.rotation) - delta.y.atan2(delta.x));
    let aim = offset.sin();

    let moving = enemy.velocity.normalize_or_zero().dot(across);
    let facing = forward_vector(enemy.rotation).dot(across);
    (
        (aim * moving).clamp(-1.0, 1.0),
        (aim * facing).clamp(-1.0, 1.0),
    )
}

/// Up to [`HAZARD_SLOTS`] nearest hazards. Distance is center to center.
pub fn compute_hazards_sensing(
    ship: &ShipView,
    hazards: &[HazardView],
    bounds: &ArenaBounds,
) -> [HazardSensing; HAZARD_SLOTS] {
    let mut slots = [HazardSensing::default(); HAZARD_SLOTS];
    let diagonal = bounds.diagonal();
    if diagonal <= 0.0 {
        return slots;
    }

    let order = nearest_first(ship.position, hazards.iter().map(|h| h.position), HAZARD_SLOTS);
    for (slot, index) in order.into_iter().enumerate() {
        let hazard = &hazards[index];
        let delta = hazard.position - ship.position;
        let (closing_speed, lateral_speed) =
            relative_motion(delta.normalize_or_zero(), hazard.velocity - ship.velocity);
        slots[slot] = HazardSensing {
            contact: contact(ship, hazard.position, delta.length(), diagonal),
            closing_speed,
            lateral_speed,
        };
    }
    slots
}

/// Up to [`BLOCKER_SLOTS`] nearest blockers. Distance is measured to the
/// blocker's surface and is zero when the ship center is inside it.
pub fn compute_blockers_sensing(
    ship: &ShipView,
    blockers: &[BlockerView],
    bounds: &ArenaBounds,
) -> [BlockerSensing; BLOCKER_SLOTS] {
    let mut slots = [BlockerSensing::default(); BLOCKER_SLOTS];
    let diagonal = bounds.diagonal();
    if diagonal <= 0.0 {
        return slots;
    }

    let surface = |b: &BlockerView| (b.position.distance(ship.position) - b.radius).max(0.0);
    let mut order: Vec<(usize, f32)> = blockers.iter().map(surface).enumerate().collect();
    order.sort_by(|a, b| a.1.total_cmp(&b.1));

    for (slot, (index, distance)) in order.into_iter().take(BLOCKER_SLOTS).enumerate() {
        let blocker = &blockers[index];
        slots[slot] = BlockerSensing {
            contact: contact(ship, blocker.position, distance, diagonal),
            radius: (blocker.radius / diagonal).clamp(0.0, 1.0),
        };
    }
    slots
}
