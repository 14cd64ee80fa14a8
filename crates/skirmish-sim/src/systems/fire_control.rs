//! Fire control: per-mount aiming, reload, burst, spin-up and heat.
//!
//! Each tick a mount slews its turret toward the aim target (clamped to the
//! aiming arc), then decides its phase:
//!
//! - `Idle`: no aim target; the turret holds its angle.
//! - `Blocked`: target outside the firing arc, weapon overheated, or host
//!   piece destroyed.
//! - `Aiming`: turret still slewing.
//! - `Reloading`: on target but the reload timer has not elapsed.
//! - `Ready`: a fire request now starts a burst.
//! - `Firing`: a burst is in progress.

use glam::Vec2;
use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skirmish_core::components::*;
use skirmish_core::constants::TURRET_ON_TARGET_TOLERANCE;
use skirmish_core::enums::{ShipLifecycle, WeaponPhase};
use skirmish_core::events::ArenaEvent;
use skirmish_core::input::Input;
use skirmish_core::types::{bearing_from_forward, forward_angle, local_to_world, ShipId};

/// Ship state a mount needs for one update.
#[derive(Debug, Clone, Copy)]
pub struct MountContext {
    pub ship_position: Vec2,
    pub ship_velocity: Vec2,
    pub ship_rotation: f32,
    pub aim_target: Option<Vec2>,
    pub fire: bool,
    pub host_intact: bool,
}

/// One projectile leaving a muzzle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// A projectile to be spawned by the session.
#[derive(Debug, Clone, Copy)]
pub struct ProjectileSpawn {
    pub shooter: ShipId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub damage: f32,
    pub lifetime_secs: f32,
    pub radius: f32,
}

/// Run fire control for every active ship. Returns the projectiles to spawn.
pub fn run(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    dt: f32,
    events: &mut Vec<ArenaEvent>,
) -> Vec<ProjectileSpawn> {
    let mut spawns = Vec::new();
    let mut shots = Vec::new();

    for (_entity, (info, hull, motion, input, armament)) in
        world.query_mut::<(&ShipInfo, &Hull, &ShipMotion, &Input, &mut Armament)>()
    {
        if info.lifecycle != ShipLifecycle::Active {
            continue;
        }
        for (index, mount) in armament.mounts.iter_mut().enumerate() {
            let ctx = mount_context(hull, motion, input, mount);
            shots.clear();
            update_mount(mount, &ctx, dt, rng, &mut shots);
            for shot in &shots {
                events.push(ArenaEvent::ShotFired {
                    ship: info.id,
                    mount: index,
                    position: shot.position,
                });
                spawns.push(ProjectileSpawn {
                    shooter: info.id,
                    position: shot.position,
                    velocity: shot.velocity,
                    damage: mount.spec.damage,
                    lifetime_secs: mount.spec.projectile_lifetime_secs,
                    radius: mount.spec.projectile_radius,
                });
            }
        }
    }
    spawns
}

fn mount_context(hull: &Hull, motion: &ShipMotion, input: &Input, mount: &WeaponMount) -> MountContext {
    MountContext {
        ship_position: motion.position,
        ship_velocity: motion.velocity,
        ship_rotation: motion.rotation,
        aim_target: input.aim_target,
        fire: input.fire,
        host_intact: hull
            .pieces
            .get(mount.piece_index)
            .is_some_and(Piece::is_intact),
    }
}

/// Muzzle speed of the first weapon whose host piece is intact.
pub fn primary_projectile_speed(hull: &Hull, armament: &Armament) -> Option<f32> {
    armament
        .mounts
        .iter()
        .find(|m| hull.pieces.get(m.piece_index).is_some_and(Piece::is_intact))
        .map(|m| m.spec.projectile_speed)
}

/// Reload time after spin-up is taken into account.
pub fn effective_reload(mount: &WeaponMount) -> f32 {
    match mount.spec.spin_up {
        Some(spin) => {
            let factor = 1.0 - mount.spin * (1.0 - spin.min_reload_factor.clamp(0.0, 1.0));
            mount.spec.reload_secs * factor
        }
        None => mount.spec.reload_secs,
    }
}

/// Advance one mount by `dt`, pushing any shots fired into `shots`.
pub fn update_mount(
    mount: &mut WeaponMount,
    ctx: &MountContext,
    dt: f32,
    rng: &mut impl Rng,
    shots: &mut Vec<Shot>,
) {
    let spec = mount.spec;
    mount.since_last_shot += dt;

    if let Some(heat) = spec.heat {
        mount.heat = (mount.heat - heat.cool_rate * dt).max(0.0);
        if mount.overheated && mount.heat <= 0.0 {
            mount.overheated = false;
        }
    }
    if let Some(spin) = spec.spin_up {
        let rate = if spin.spin_up_secs > 0.0 {
            dt / spin.spin_up_secs
        } else {
            1.0
        };
        let delta = if ctx.fire { rate } else { -rate };
        mount.spin = (mount.spin + delta).clamp(0.0, 1.0);
    }

    if !ctx.host_intact {
        mount.phase = WeaponPhase::Blocked;
        mount.burst_remaining = 0;
        return;
    }

    let muzzle = ctx.ship_position + local_to_world(mount.offset, ctx.ship_rotation);
    let target_bearing = ctx
        .aim_target
        .map(|target| bearing_from_forward(ctx.ship_rotation, target - muzzle));

    let arc = spec.aim_arc.abs();
    let desired = target_bearing.map(|b| b.clamp(-arc, arc));
    if let Some(desired) = desired {
        let step = spec.turn_rate * dt;
        mount.turret_angle += (desired - mount.turret_angle).clamp(-step, step);
    }
    mount.turret_angle = mount.turret_angle.clamp(-arc, arc);

    if mount.burst_remaining > 0 {
        mount.burst_timer -= dt;
        continue_burst(mount, ctx, muzzle, rng, shots);
        return;
    }

    let (Some(bearing), Some(desired)) = (target_bearing, desired) else {
        mount.phase = WeaponPhase::Idle;
        return;
    };

    mount.phase = if mount.overheated || bearing.abs() > spec.fire_arc {
        WeaponPhase::Blocked
    } else if (desired - mount.turret_angle).abs() > TURRET_ON_TARGET_TOLERANCE {
        WeaponPhase::Aiming
    } else if mount.since_last_shot < effective_reload(mount) {
        WeaponPhase::Reloading
    } else {
        WeaponPhase::Ready
    };

    if mount.phase == WeaponPhase::Ready && ctx.fire {
        mount.since_last_shot = 0.0;
        mount.burst_remaining = spec.burst_count.max(1);
        mount.burst_timer = 0.0;
        continue_burst(mount, ctx, muzzle, rng, shots);
    }
}

/// Fire every burst shot that is due, then settle the phase.
fn continue_burst(
    mount: &mut WeaponMount,
    ctx: &MountContext,
    muzzle: Vec2,
    rng: &mut impl Rng,
    shots: &mut Vec<Shot>,
) {
    while mount.burst_remaining > 0 && mount.burst_timer <= 0.0 && !mount.overheated {
        shots.push(fire_shot(mount, ctx, muzzle, rng));
        mount.burst_remaining -= 1;
        mount.burst_timer += mount.spec.burst_delay_secs.max(0.0);
    }
    if mount.overheated {
        mount.burst_remaining = 0;
    }
    mount.phase = if mount.burst_remaining > 0 {
        WeaponPhase::Firing
    } else {
        WeaponPhase::Reloading
    };
}

fn fire_shot(mount: &mut WeaponMount, ctx: &MountContext, muzzle: Vec2, rng: &mut impl Rng) -> Shot {
    let spec = mount.spec;
    let jitter = if spec.spread > 0.0 {
        rng.gen_range(-spec.spread..=spec.spread)
    } else {
        0.0
    };
    let angle = forward_angle(ctx.ship_rotation) + mount.turret_angle + jitter;

    if let Some(heat) = spec.heat {
        mount.heat += heat.heat_per_shot;
        if mount.heat >= heat.capacity {
            mount.overheated = true;
        }
    }

    Shot {
        position: muzzle,
        velocity: ctx.ship_velocity + Vec2::from_angle(angle) * spec.projectile_speed,
    }
}
