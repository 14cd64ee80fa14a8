//! Projectile collision and piece damage.
//!
//! Projectiles are swept from their previous position to their current one
//! and tested against circles: blockers absorb them, ships take the damage
//! on the intact piece nearest the impact point.

use glam::Vec2;
use hecs::{Entity, World};

use skirmish_core::components::{Blocker, Hull, Kinematics, Projectile, ShipInfo, ShipMotion};
use skirmish_core::enums::{DestructionCause, ShipLifecycle};
use skirmish_core::events::ArenaEvent;
use skirmish_core::types::{world_to_local, ShipId};

/// A ship whose hull was wrecked this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destruction {
    pub ship: ShipId,
    pub cause: DestructionCause,
}

/// Whether a hull no longer counts as a living ship.
pub fn is_wrecked(hull: &Hull) -> bool {
    hull.is_core_destroyed() || hull.health() <= 0.0
}

/// Damage one piece. Emits `PieceDestroyed` when the piece drops to zero and
/// returns whether this damage wrecked the ship.
pub fn apply_damage(
    hull: &mut Hull,
    piece: usize,
    damage: f32,
    ship: ShipId,
    events: &mut Vec<ArenaEvent>,
) -> bool {
    let was_wrecked = is_wrecked(hull);
    let Some(target) = hull.pieces.get_mut(piece) else {
        return false;
    };
    if !target.is_intact() || damage <= 0.0 {
        return false;
    }
    target.hp = (target.hp - damage).max(0.0);
    if !target.is_intact() {
        events.push(ArenaEvent::PieceDestroyed { ship, piece });
    }
    !was_wrecked && is_wrecked(hull)
}

/// Parameter along segment `a -> b` (in [0, 1]) where it first touches the
/// circle, or `None` if it misses. A segment starting inside hits at 0.
pub fn segment_circle_entry(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> Option<f32> {
    let d = b - a;
    let f = a - center;
    let c = f.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }
    let qa = d.length_squared();
    if qa <= f32::EPSILON {
        return None;
    }
    let qb = 2.0 * f.dot(d);
    let disc = qb * qb - 4.0 * qa * c;
    if disc < 0.0 {
        return None;
    }
    let t = (-qb - disc.sqrt()) / (2.0 * qa);
    (0.0..=1.0).contains(&t).then_some(t)
}

#[derive(Clone, Copy)]
enum HitTarget {
    Blocker,
    Ship(Entity),
}

struct Shot {
    entity: Entity,
    from: Vec2,
    to: Vec2,
    radius: f32,
    shooter: ShipId,
    damage: f32,
}

/// Resolve projectile hits for this frame. Hit projectiles are despawned.
pub fn run(
    world: &mut World,
    despawn_buffer: &mut Vec<Entity>,
    events: &mut Vec<ArenaEvent>,
) -> Vec<Destruction> {
    despawn_buffer.clear();
    let mut destructions = Vec::new();

    let shots: Vec<Shot> = world
        .query::<(&Kinematics, &Projectile)>()
        .iter()
        .map(|(entity, (k, p))| Shot {
            entity,
            from: p.previous_position,
            to: k.position,
            radius: p.radius,
            shooter: p.shooter,
            damage: p.damage,
        })
        .collect();
    if shots.is_empty() {
        return destructions;
    }

    let blockers: Vec<Blocker> = world.query::<&Blocker>().iter().map(|(_, b)| *b).collect();

    for shot in &shots {
        let mut nearest: Option<(f32, HitTarget)> = None;
        let mut consider = |t: Option<f32>, target: HitTarget| {
            if let Some(t) = t {
                if nearest.map_or(true, |(best, _)| t < best) {
                    nearest = Some((t, target));
                }
            }
        };

        for blocker in &blockers {
            let t = segment_circle_entry(
                shot.from,
                shot.to,
                blocker.position,
                blocker.radius + shot.radius,
            );
            consider(t, HitTarget::Blocker);
        }

        let mut ships = world.query::<(&ShipInfo, &ShipMotion, &Hull)>();
        for (entity, (info, motion, hull)) in ships.iter() {
            if info.id == shot.shooter
                || info.lifecycle != ShipLifecycle::Active
                || is_wrecked(hull)
            {
                continue;
            }
            let t = segment_circle_entry(
                shot.from,
                shot.to,
                motion.position,
                hull.radius + shot.radius,
            );
            consider(t, HitTarget::Ship(entity));
        }
        drop(ships);

        let Some((t, target)) = nearest else {
            continue;
        };
        despawn_buffer.push(shot.entity);

        let HitTarget::Ship(entity) = target else {
            continue;
        };
        let impact = shot.from + (shot.to - shot.from) * t;
        let Ok((info, motion, hull)) =
            world.query_one_mut::<(&ShipInfo, &ShipMotion, &mut Hull)>(entity)
        else {
            continue;
        };
        let local = world_to_local(impact - motion.position, motion.rotation);
        let Some(piece) = hull.nearest_intact_piece(local) else {
            continue;
        };
        events.push(ArenaEvent::ProjectileHit {
            shooter: shot.shooter,
            target: info.id,
            piece,
            damage: shot.damage,
        });
        if apply_damage(hull, piece, shot.damage, info.id, events) {
            destructions.push(Destruction {
                ship: info.id,
                cause: DestructionCause::Projectile {
                    shooter: shot.shooter,
                },
            });
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
    destructions
}
