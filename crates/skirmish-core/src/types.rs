//! Fundamental geometric and simulation types.
//!
//! World space is Y-up with counterclockwise-positive angles. A ship's
//! *rotation angle* is the angle used to transform between its local frame
//! and world space; its local forward axis is +Y, so the *forward direction
//! angle* (the atan2 angle of the forward vector) is `rotation + π/2`.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::Team;

/// Stable identifier of a ship within one arena session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShipId(pub u32);

impl std::fmt::Display for ShipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ship#{}", self.0)
    }
}

/// Playable rectangle, centered on the world origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaBounds {
    pub width: f32,
    pub height: f32,
}

impl Default for ArenaBounds {
    fn default() -> Self {
        Self {
            width: crate::constants::DEFAULT_ARENA_WIDTH,
            height: crate::constants::DEFAULT_ARENA_HEIGHT,
        }
    }
}

impl ArenaBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Half width and half height.
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Length of the arena diagonal, the normalizer for every sensed distance.
    pub fn diagonal(&self) -> f32 {
        self.width.hypot(self.height)
    }

    /// Whether a point lies strictly inside the rectangle.
    pub fn contains(&self, p: Vec2) -> bool {
        let half = self.half_extents();
        p.x.abs() < half.x && p.y.abs() < half.y
    }

    /// Whether a point lies inside the rectangle grown by `margin` on every side.
    pub fn contains_with_margin(&self, p: Vec2, margin: f32) -> bool {
        let half = self.half_extents() + Vec2::splat(margin);
        p.x.abs() <= half.x && p.y.abs() <= half.y
    }

    /// Position mapped to [-1, 1] on both axes.
    pub fn normalize_position(&self, p: Vec2) -> Vec2 {
        let half = self.half_extents();
        Vec2::new(
            (p.x / half.x).clamp(-1.0, 1.0),
            (p.y / half.y).clamp(-1.0, 1.0),
        )
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.tick += 1;
        self.elapsed_secs += f64::from(dt);
    }
}

/// Normalize an angle to (-π, π].
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    PI - (PI - angle).rem_euclid(TAU)
}

/// Forward direction angle for a rotation angle (local forward is +Y).
#[inline]
pub fn forward_angle(rotation: f32) -> f32 {
    normalize_angle(rotation + FRAC_PI_2)
}

/// Unit vector along the ship's local +Y axis, in world space.
#[inline]
pub fn forward_vector(rotation: f32) -> Vec2 {
    Vec2::new(-rotation.sin(), rotation.cos())
}

/// Unit vector along the ship's local +X axis (its right side), in world space.
#[inline]
pub fn right_vector(rotation: f32) -> Vec2 {
    Vec2::new(rotation.cos(), rotation.sin())
}

/// Rotate a ship-local vector into world space.
#[inline]
pub fn local_to_world(v: Vec2, rotation: f32) -> Vec2 {
    Vec2::from_angle(rotation).rotate(v)
}

/// Rotate a world vector into the ship-local frame.
#[inline]
pub fn world_to_local(v: Vec2, rotation: f32) -> Vec2 {
    Vec2::from_angle(-rotation).rotate(v)
}

/// Angle of `delta` relative to the forward direction of a ship with the
/// given rotation angle. Positive is counterclockwise (to the ship's left).
#[inline]
pub fn bearing_from_forward(rotation: f32, delta: Vec2) -> f32 {
    normalize_angle(delta.y.atan2(delta.x) - forward_angle(rotation))
}

/// Read-only view of a ship, as seen by sensing and controllers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShipView {
    pub id: ShipId,
    pub team: Team,
    pub is_player: bool,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Rotation angle (radians, counterclockwise).
    pub rotation: f32,
    pub angular_velocity: f32,
    /// Aggregate health as a fraction of the ship's maximum (0.0 - 1.0).
    pub health: f32,
    /// Radius of the circle enclosing every piece.
    pub radius: f32,
    pub alive: bool,
}

/// A live projectile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    pub shooter: ShipId,
    pub position: Vec2,
    pub velocity: Vec2,
}

/// A drifting hazard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardView {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
}

/// A static circular blocker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockerView {
    pub position: Vec2,
    pub radius: f32,
}
