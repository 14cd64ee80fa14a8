//! Read-only views of the arena, collected once per frame for controllers
//! and sensing.

use hecs::World;

use skirmish_core::components::*;
use skirmish_core::enums::ShipLifecycle;
use skirmish_core::types::{
    ArenaBounds, BlockerView, HazardView, ProjectileView, ShipId, ShipView,
};
use skirmish_sensing::SensingContext;

use super::collision::is_wrecked;

/// Everything a ship may perceive. Ships are ordered by id.
#[derive(Debug, Clone, Default)]
pub struct ArenaViews {
    pub ships: Vec<ShipView>,
    pub projectiles: Vec<ProjectileView>,
    pub hazards: Vec<HazardView>,
    pub blockers: Vec<BlockerView>,
}

impl ArenaViews {
    pub fn ship(&self, id: ShipId) -> Option<&ShipView> {
        self.ships.iter().find(|s| s.id == id)
    }

    pub fn context(&self, bounds: ArenaBounds) -> SensingContext<'_> {
        SensingContext {
            bounds,
            ships: &self.ships,
            projectiles: &self.projectiles,
            hazards: &self.hazards,
            blockers: &self.blockers,
        }
    }
}

/// View of a single ship entity.
pub fn ship_view(info: &ShipInfo, motion: &ShipMotion, hull: &Hull) -> ShipView {
    ShipView {
        id: info.id,
        team: info.team,
        is_player: info.is_player,
        position: motion.position,
        velocity: motion.velocity,
        rotation: motion.rotation,
        angular_velocity: motion.angular_velocity,
        health: hull.health_fraction(),
        radius: hull.radius,
        alive: info.lifecycle == ShipLifecycle::Active && !is_wrecked(hull),
    }
}

/// Snapshot every ship, projectile, hazard and blocker in the world.
pub fn collect(world: &World) -> ArenaViews {
    let mut ships: Vec<ShipView> = world
        .query::<(&ShipInfo, &ShipMotion, &Hull)>()
        .iter()
        .map(|(_, (info, motion, hull))| ship_view(info, motion, hull))
        .collect();
    ships.sort_by_key(|s| s.id);

    let mut projectiles: Vec<(u32, ProjectileView)> = world
        .query::<(&Kinematics, &Projectile)>()
        .iter()
        .map(|(_, (k, p))| {
            (
                p.id,
                ProjectileView {
                    shooter: p.shooter,
                    position: k.position,
                    velocity: k.velocity,
                },
            )
        })
        .collect();
    projectiles.sort_by_key(|(id, _)| *id);

    let mut hazards: Vec<(hecs::Entity, HazardView)> = world
        .query::<(&Kinematics, &Hazard)>()
        .iter()
        .map(|(entity, (k, h))| {
            (
                entity,
                HazardView {
                    position: k.position,
                    velocity: k.velocity,
                    radius: h.radius,
                },
            )
        })
        .collect();
    hazards.sort_by_key(|(entity, _)| entity.id());

    let mut blockers: Vec<(hecs::Entity, BlockerView)> = world
        .query::<&Blocker>()
        .iter()
        .map(|(entity, b)| {
            (
                entity,
                BlockerView {
                    position: b.position,
                    radius: b.radius,
                },
            )
        })
        .collect();
    blockers.sort_by_key(|(entity, _)| entity.id());

    ArenaViews {
        ships,
        projectiles: projectiles.into_iter().map(|(_, v)| v).collect(),
        hazards: hazards.into_iter().map(|(_, v)| v).collect(),
        blockers: blockers.into_iter().map(|(_, v)| v).collect(),
    }
}
