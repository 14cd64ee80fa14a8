//! Conversions between world-space aim points and the ship-local,
//! diagonal-normalized form used by policies and recorded labels.

use glam::Vec2;
use skirmish_core::types::{local_to_world, world_to_local, ArenaBounds, ShipView};

/// Express a world-space point relative to the ship, in its local frame,
/// divided by the arena diagonal.
pub fn encode_aim_point(ship: &ShipView, point: Vec2, bounds: &ArenaBounds) -> Vec2 {
    let diagonal = bounds.diagonal();
    if diagonal <= 0.0 {
        return Vec2::ZERO;
    }
    world_to_local(point - ship.position, ship.rotation) / diagonal
}

/// Inverse of [`encode_aim_point`].
pub fn decode_aim_point(ship: &ShipView, encoded: Vec2, bounds: &ArenaBounds) -> Vec2 {
    ship.position + local_to_world(encoded * bounds.diagonal(), ship.rotation)
}
