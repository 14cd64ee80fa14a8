//! Lead prediction for aiming projectiles at moving ships.
//!
//! Projectiles inherit the shooter's velocity, so every prediction here works
//! on the target's velocity relative to the shooter.

use glam::Vec2;

/// Refinement passes of the iterative lead solution.
const LEAD_ITERATIONS: usize = 3;

/// Lead aim point for a projectile fired now at `projectile_speed`
/// (relative to the shooter) against a target moving at constant velocity.
/// Firing from `shooter_pos` toward the returned point intercepts the target.
///
/// Returns (aim point, estimated flight time). Uses a few fixed-point
/// iterations: predict where the target will be after the current flight
/// time, re-estimate the flight time to that point, repeat.
pub fn calculate_lead_point(
    shooter_pos: Vec2,
    shooter_vel: Vec2,
    target_pos: Vec2,
    target_vel: Vec2,
    projectile_speed: f32,
) -> (Vec2, f32) {
    if projectile_speed <= 0.0 {
        return (target_pos, 0.0);
    }
    let rel_vel = target_vel - shooter_vel;
    let mut flight_time = shooter_pos.distance(target_pos) / projectile_speed;

    for _ in 0..LEAD_ITERATIONS {
        let predicted = target_pos + rel_vel * flight_time;
        flight_time = shooter_pos.distance(predicted) / projectile_speed;
    }

    (target_pos + rel_vel * flight_time, flight_time)
}
