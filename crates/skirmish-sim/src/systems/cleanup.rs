//! Cleanup system: removes projectiles that expired or left the arena.

use hecs::{Entity, World};

use skirmish_core::components::{Kinematics, Projectile};
use skirmish_core::constants::PROJECTILE_ARENA_MARGIN;
use skirmish_core::types::ArenaBounds;

/// Despawn projectiles past their lifetime or beyond the arena margin.
/// Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(world: &mut World, bounds: &ArenaBounds, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();

    for (entity, (kinematics, projectile)) in world.query_mut::<(&Kinematics, &Projectile)>() {
        if projectile.lifetime_secs <= 0.0
            || !bounds.contains_with_margin(kinematics.position, PROJECTILE_ARENA_MARGIN)
        {
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
