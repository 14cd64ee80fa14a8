//! Hazard system: drifting circles that bounce off the arena walls and
//! damage and shove any ship they touch.

use std::collections::BTreeMap;

use glam::Vec2;
use hecs::{Entity, World};

use skirmish_core::components::{Hazard, Hull, Kinematics, ShipInfo, ShipMotion};
use skirmish_core::constants::{HAZARD_CONTACT_COOLDOWN_SECS, HAZARD_PUSH_SPEED};
use skirmish_core::enums::{DestructionCause, ShipLifecycle};
use skirmish_core::events::ArenaEvent;
use skirmish_core::types::{world_to_local, ArenaBounds, ShipId};

use super::collision::{apply_damage, is_wrecked, Destruction};
use crate::physics::{BodyHandle, PhysicsAdapter};

struct ShipTarget {
    entity: Entity,
    id: ShipId,
    position: Vec2,
    rotation: f32,
    radius: f32,
    mass: f32,
    wrecked: bool,
}

/// Move hazards, age their cooldowns, and resolve ship contacts.
pub fn run(
    world: &mut World,
    physics: &mut PhysicsAdapter,
    bodies: &BTreeMap<ShipId, BodyHandle>,
    bounds: &ArenaBounds,
    dt: f32,
    events: &mut Vec<ArenaEvent>,
) -> Vec<Destruction> {
    let mut destructions = Vec::new();
    let half = bounds.half_extents();

    let mut hazards = Vec::new();
    for (entity, (kinematics, hazard)) in world.query_mut::<(&mut Kinematics, &mut Hazard)>() {
        drift(kinematics, hazard.radius, half, dt);
        hazard.cooldowns.retain_mut(|(_, remaining)| {
            *remaining -= dt;
            *remaining > 0.0
        });
        hazards.push((entity, kinematics.position, hazard.radius, hazard.damage));
    }
    if hazards.is_empty() {
        return destructions;
    }

    let mut ships: Vec<ShipTarget> = world
        .query::<(&ShipInfo, &ShipMotion, &Hull)>()
        .iter()
        .filter(|(_, (info, _, hull))| info.lifecycle == ShipLifecycle::Active && !is_wrecked(hull))
        .map(|(entity, (info, motion, hull))| ShipTarget {
            entity,
            id: info.id,
            position: motion.position,
            rotation: motion.rotation,
            radius: hull.radius,
            mass: hull.mass,
            wrecked: false,
        })
        .collect();

    for &(hazard_entity, center, radius, damage) in &hazards {
        for ship in ships.iter_mut().filter(|s| !s.wrecked) {
            let offset = ship.position - center;
            if offset.length() >= radius + ship.radius {
                continue;
            }

            let Ok(mut hazard) = world.get::<&mut Hazard>(hazard_entity) else {
                break;
            };
            if hazard.cooldowns.iter().any(|(id, _)| *id == ship.id) {
                continue;
            }
            hazard
                .cooldowns
                .push((ship.id, HAZARD_CONTACT_COOLDOWN_SECS));
            drop(hazard);

            events.push(ArenaEvent::HazardContact {
                ship: ship.id,
                damage,
            });

            let direction = offset.try_normalize().unwrap_or(Vec2::Y);
            if let Some(&body) = bodies.get(&ship.id) {
                let _ = physics.apply_impulse(body, direction * HAZARD_PUSH_SPEED * ship.mass);
            }

            let Ok(mut hull) = world.get::<&mut Hull>(ship.entity) else {
                continue;
            };
            let local = world_to_local(center - ship.position, ship.rotation);
            let Some(piece) = hull.nearest_intact_piece(local) else {
                continue;
            };
            if apply_damage(&mut hull, piece, damage, ship.id, events) {
                ship.wrecked = true;
                destructions.push(Destruction {
                    ship: ship.id,
                    cause: DestructionCause::Hazard,
                });
            }
        }
    }

    destructions
}

/// Integrate one hazard and reflect it off the arena walls.
fn drift(kinematics: &mut Kinematics, radius: f32, half: Vec2, dt: f32) {
    kinematics.position += kinematics.velocity * dt;
    let limit = (half - Vec2::splat(radius)).max(Vec2::ZERO);

    if kinematics.position.x.abs() > limit.x {
        let side = kinematics.position.x.signum();
        kinematics.position.x = side * limit.x;
        kinematics.velocity.x = -side * kinematics.velocity.x.abs();
    }
    if kinematics.position.y.abs() > limit.y {
        let side = kinematics.position.y.signum();
        kinematics.position.y = side * limit.y;
        kinematics.velocity.y = -side * kinematics.velocity.y.abs();
    }
}
