//! Motion systems: intents to impulses, physics read-back, and linear
//! integration of the entities that live outside the physics world.

use std::collections::BTreeMap;

use glam::Vec2;
use hecs::World;

use skirmish_core::components::{Hull, Kinematics, Projectile, ShipInfo, ShipMotion};
use skirmish_core::constants::*;
use skirmish_core::enums::ShipLifecycle;
use skirmish_core::input::Input;
use skirmish_core::types::{bearing_from_forward, local_to_world, ShipId};

use crate::physics::{BodyHandle, PhysicsAdapter};

/// Turn each active ship's input into linear and angular impulses.
pub fn apply_thrust(
    world: &World,
    physics: &mut PhysicsAdapter,
    bodies: &BTreeMap<ShipId, BodyHandle>,
    dt: f32,
) {
    let mut query = world.query::<(&ShipInfo, &Hull, &ShipMotion, &Input)>();
    for (_entity, (info, hull, motion, input)) in query.iter() {
        if info.lifecycle != ShipLifecycle::Active {
            continue;
        }
        let Some(&body) = bodies.get(&info.id) else {
            continue;
        };

        let linear = thrust_impulse(hull, motion, input, dt);
        if linear != Vec2::ZERO {
            let _ = physics.apply_impulse(body, linear);
        }
        let angular = turn_impulse(hull, motion, input, dt);
        if angular != 0.0 {
            let _ = physics.apply_torque_impulse(body, angular);
        }
    }
}

/// World-space linear impulse from the directional intents.
pub fn thrust_impulse(hull: &Hull, motion: &ShipMotion, input: &Input, dt: f32) -> Vec2 {
    let mut local = Vec2::ZERO;
    if input.forward {
        local.y += 1.0;
    }
    if input.back {
        local.y -= BACK_THRUST_FACTOR;
    }
    if input.right {
        local.x += STRAFE_THRUST_FACTOR;
    }
    if input.left {
        local.x -= STRAFE_THRUST_FACTOR;
    }
    local_to_world(local, motion.rotation) * hull.thrust() * dt
}

/// Angular impulse (counterclockwise positive) from the turn intents, or
/// from the turn-toward controller when it is engaged and has a target.
pub fn turn_impulse(hull: &Hull, motion: &ShipMotion, input: &Input, dt: f32) -> f32 {
    let boost = if input.fast_turn {
        FAST_TURN_MULTIPLIER
    } else {
        1.0
    };
    let max_rate = MAX_TURN_RATE * boost;
    let max_delta = TURN_ACCELERATION * boost * dt;
    let omega = motion.angular_velocity;

    let delta = match input.aim_target.filter(|_| input.turn_toward) {
        Some(target) => {
            let error = bearing_from_forward(motion.rotation, target - motion.position);
            let desired = (error * TURN_TOWARD_GAIN).clamp(-max_rate, max_rate);
            (desired - omega).clamp(-max_delta, max_delta)
        }
        None => {
            let direction = match (input.turn_left, input.turn_right) {
                (true, false) => 1.0,
                (false, true) => -1.0,
                _ => 0.0,
            };
            if direction == 0.0 || omega * direction >= max_rate {
                0.0
            } else {
                direction * max_delta.min(max_rate - omega * direction)
            }
        }
    };
    delta * hull.inertia
}

/// Copy body transforms and velocities back into the ship components.
pub fn sync_from_physics(
    world: &mut World,
    physics: &PhysicsAdapter,
    bodies: &BTreeMap<ShipId, BodyHandle>,
) {
    for (_entity, (info, motion)) in world.query_mut::<(&ShipInfo, &mut ShipMotion)>() {
        let Some(&body) = bodies.get(&info.id) else {
            continue;
        };
        if let Some(transform) = physics.world_transform(body) {
            motion.position = transform.position;
            motion.rotation = transform.angle;
        }
        if let Some(velocity) = physics.world_velocity(body) {
            motion.velocity = velocity.linear;
            motion.angular_velocity = velocity.angular;
        }
    }
}

/// Advance projectiles along straight lines and age them.
pub fn integrate_projectiles(world: &mut World, dt: f32) {
    for (_entity, (kinematics, projectile)) in
        world.query_mut::<(&mut Kinematics, &mut Projectile)>()
    {
        projectile.previous_position = kinematics.position;
        kinematics.position += kinematics.velocity * dt;
        projectile.lifetime_secs -= dt;
    }
}
