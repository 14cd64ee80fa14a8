//! Entity spawn factories: ships from layouts, arena walls, blockers and
//! hazards.

use glam::Vec2;
use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use skirmish_core::catalog::{PieceCatalog, PlacedPiece, ShipLayout};
use skirmish_core::components::*;
use skirmish_core::constants::*;
use skirmish_core::enums::*;
use skirmish_core::error::{CatalogError, LayoutError};
use skirmish_core::input::Input;
use skirmish_core::types::{ArenaBounds, ShipId};

use crate::controller::Controller;
use crate::error::{PhysicsError, SpawnError};
use crate::physics::{
    BodyHandle, BodyKind, BodyOptions, BodySpec, ColliderSpec, PhysicsAdapter, ShapeSpec,
};

/// Where a ship's layout comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutSource {
    /// A built-in design by name.
    Preset(String),
    /// An explicit piece list, as produced by the ship editor.
    Pieces(Vec<PlacedPiece>),
}

impl LayoutSource {
    pub fn resolve(&self) -> Result<ShipLayout, CatalogError> {
        match self {
            LayoutSource::Preset(name) => ShipLayout::preset(name),
            LayoutSource::Pieces(pieces) => Ok(ShipLayout {
                pieces: pieces.clone(),
            }),
        }
    }
}

/// Static description of a ship entering the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipSpec {
    pub name: String,
    #[serde(default)]
    pub team: Team,
    pub layout: LayoutSource,
    #[serde(default)]
    pub position: Vec2,
    #[serde(default)]
    pub rotation: f32,
}

/// A ship to spawn together with the controller that will fly it.
#[derive(Debug)]
pub struct ShipEntry {
    pub spec: ShipSpec,
    pub controller: Controller,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardSpec {
    pub position: Vec2,
    #[serde(default)]
    pub velocity: Vec2,
    pub radius: f32,
    pub damage: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockerSpec {
    pub position: Vec2,
    pub radius: f32,
}

/// Everything that enters the arena with the session.
#[derive(Debug)]
pub struct ArenaSetup {
    pub player: ShipEntry,
    pub opponents: Vec<ShipEntry>,
    pub hazards: Vec<HazardSpec>,
    pub blockers: Vec<BlockerSpec>,
}

/// Components of a ship assembled from a validated layout.
#[derive(Debug, Clone)]
pub struct ShipBlueprint {
    pub hull: Hull,
    pub armament: Armament,
}

/// Resolve and validate a ship's layout and assemble its hull and weapons.
/// Creates nothing; failures here never leave bodies behind.
pub fn prepare_ship(spec: &ShipSpec, catalog: &PieceCatalog) -> Result<ShipBlueprint, SpawnError> {
    let layout = spec.layout.resolve()?;
    build_blueprint(&layout, catalog)
}

/// Assemble hull and armament from a layout.
pub fn build_blueprint(
    layout: &ShipLayout,
    catalog: &PieceCatalog,
) -> Result<ShipBlueprint, SpawnError> {
    catalog.validate_layout(layout)?;

    let mut pieces = Vec::with_capacity(layout.pieces.len());
    let mut mounts = Vec::new();
    for placed in &layout.pieces {
        let spec = catalog
            .get(&placed.kind)
            .ok_or_else(|| LayoutError::UnknownPiece(placed.kind.clone()))?;
        if let Some(weapon) = spec.weapon {
            mounts.push(WeaponMount {
                piece_index: pieces.len(),
                spec: weapon,
                offset: placed.offset,
                phase: WeaponPhase::Idle,
                turret_angle: 0.0,
                since_last_shot: weapon.reload_secs,
                burst_remaining: 0,
                burst_timer: 0.0,
                spin: 0.0,
                heat: 0.0,
                overheated: false,
            });
        }
        pieces.push(Piece {
            kind: placed.kind.clone(),
            category: spec.category,
            offset: placed.offset,
            rotation: placed.rotation,
            width: spec.width,
            height: spec.height,
            mass: spec.mass,
            hp: spec.hp,
            max_hp: spec.hp,
            thrust: spec.thrust,
        });
    }

    let core_index = pieces
        .iter()
        .position(|p| p.category == PieceCategory::Core)
        .ok_or(LayoutError::MissingCore)?;
    let mass: f32 = pieces.iter().map(|p| p.mass).sum();
    let inertia: f32 = pieces
        .iter()
        .map(|p| {
            let own = (p.width * p.width + p.height * p.height) / 12.0;
            p.mass * (p.offset.length_squared() + own)
        })
        .sum();
    let radius = pieces
        .iter()
        .map(|p| p.offset.length() + 0.5 * p.width.hypot(p.height))
        .fold(0.0, f32::max);

    Ok(ShipBlueprint {
        hull: Hull {
            pieces,
            core_index,
            mass,
            inertia,
            radius,
        },
        armament: Armament { mounts },
    })
}

/// One box collider per piece, carrying the piece's mass.
pub fn ship_body_spec(hull: &Hull, position: Vec2, rotation: f32) -> BodySpec {
    BodySpec {
        position,
        options: BodyOptions {
            kind: BodyKind::Dynamic,
            rotation,
            linear_damping: SHIP_LINEAR_DAMPING,
            angular_damping: SHIP_ANGULAR_DAMPING,
        },
        colliders: hull
            .pieces
            .iter()
            .map(|p| ColliderSpec {
                shape: ShapeSpec::Box {
                    half_extents: Vec2::new(p.width, p.height) * 0.5,
                },
                offset: p.offset,
                rotation: p.rotation,
                mass: p.mass,
            })
            .collect(),
    }
}

/// Create the ship's body and entity. The entity starts `Spawning`; the
/// session activates it once a controller is mounted.
pub fn spawn_ship(
    world: &mut World,
    physics: &mut PhysicsAdapter,
    id: ShipId,
    spec: &ShipSpec,
    blueprint: ShipBlueprint,
    is_player: bool,
) -> Result<(Entity, BodyHandle), SpawnError> {
    let body = physics.create_body(&ship_body_spec(&blueprint.hull, spec.position, spec.rotation))?;

    let info = ShipInfo {
        id,
        team: spec.team,
        is_player,
        name: spec.name.clone(),
        lifecycle: ShipLifecycle::Spawning,
    };
    let motion = ShipMotion {
        position: spec.position,
        velocity: Vec2::ZERO,
        rotation: spec.rotation,
        angular_velocity: 0.0,
    };
    let entity = world.spawn((info, blueprint.hull, motion, blueprint.armament, Input::idle()));
    Ok((entity, body))
}

/// Four fixed boxes enclosing the playable rectangle.
pub fn spawn_walls(
    physics: &mut PhysicsAdapter,
    bounds: &ArenaBounds,
) -> Result<Vec<BodyHandle>, PhysicsError> {
    let half = bounds.half_extents();
    let t = ARENA_WALL_THICKNESS;
    let fixed = BodyOptions {
        kind: BodyKind::Fixed,
        ..Default::default()
    };
    let horizontal = Vec2::new(bounds.width + 2.0 * t, t);
    let vertical = Vec2::new(t, bounds.height + 2.0 * t);
    let walls = [
        (Vec2::new(0.0, half.y + t * 0.5), horizontal),
        (Vec2::new(0.0, -half.y - t * 0.5), horizontal),
        (Vec2::new(half.x + t * 0.5, 0.0), vertical),
        (Vec2::new(-half.x - t * 0.5, 0.0), vertical),
    ];
    walls
        .into_iter()
        .map(|(position, size)| physics.create_box(position, size, 0.0, fixed))
        .collect()
}

/// A fixed ball body plus the entity collision and sensing read.
pub fn spawn_blocker(
    world: &mut World,
    physics: &mut PhysicsAdapter,
    spec: &BlockerSpec,
) -> Result<(Entity, BodyHandle), PhysicsError> {
    let body = physics.create_body(&BodySpec {
        position: spec.position,
        options: BodyOptions {
            kind: BodyKind::Fixed,
            ..Default::default()
        },
        colliders: vec![ColliderSpec {
            shape: ShapeSpec::Ball {
                radius: spec.radius,
            },
            offset: Vec2::ZERO,
            rotation: 0.0,
            mass: 0.0,
        }],
    })?;
    let entity = world.spawn((Blocker {
        position: spec.position,
        radius: spec.radius,
    },));
    Ok((entity, body))
}

/// Hazards drift outside the physics world.
pub fn spawn_hazard(world: &mut World, spec: &HazardSpec) -> Result<Entity, PhysicsError> {
    if !(spec.radius.is_finite() && spec.radius > 0.0) {
        return Err(PhysicsError::InvalidValue {
            field: "hazard radius",
            value: spec.radius,
        });
    }
    if !spec.position.is_finite() || !spec.velocity.is_finite() {
        return Err(PhysicsError::InvalidValue {
            field: "hazard motion",
            value: f32::NAN,
        });
    }
    Ok(world.spawn((
        Kinematics {
            position: spec.position,
            velocity: spec.velocity,
        },
        Hazard {
            radius: spec.radius,
            damage: spec.damage.max(0.0),
            cooldowns: Vec::new(),
        },
    )))
}
