//! Physics adapter over a zero-gravity rapier2d world.
//!
//! Everything outside this module speaks world units: Y-up, angles
//! counterclockwise. rapier works in meters with Y pointing down, so
//! positions are scaled by [`WORLD_TO_PHYSICS_SCALE`] and both the Y axis and
//! angle sign flip on the way in. Always convert through the functions here.

use glam::Vec2;
use rapier2d::prelude::*;

use skirmish_core::constants::{MAX_PHYSICS_DT, WORLD_TO_PHYSICS_SCALE};

use crate::error::PhysicsError;

/// World position -> physics position.
pub fn world_to_physics(p: Vec2) -> Vec2 {
    Vec2::new(p.x * WORLD_TO_PHYSICS_SCALE, -p.y * WORLD_TO_PHYSICS_SCALE)
}

/// Physics position -> world position.
pub fn physics_to_world(p: Vec2) -> Vec2 {
    Vec2::new(p.x / WORLD_TO_PHYSICS_SCALE, -p.y / WORLD_TO_PHYSICS_SCALE)
}

pub fn world_angle_to_physics(angle: f32) -> f32 {
    -angle
}

pub fn physics_angle_to_world(angle: f32) -> f32 {
    -angle
}

/// Linear velocities and impulses convert like positions.
pub fn world_velocity_to_physics(v: Vec2) -> Vec2 {
    world_to_physics(v)
}

pub fn physics_velocity_to_world(v: Vec2) -> Vec2 {
    physics_to_world(v)
}

pub fn world_angvel_to_physics(w: f32) -> f32 {
    -w
}

pub fn physics_angvel_to_world(w: f32) -> f32 {
    -w
}

/// Angular impulses scale with length squared and flip sign.
pub fn world_torque_impulse_to_physics(j: f32) -> f32 {
    -j * WORLD_TO_PHYSICS_SCALE * WORLD_TO_PHYSICS_SCALE
}

fn to_vector(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

fn from_vector(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Opaque reference to a body owned by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(RigidBodyHandle);

/// Position and rotation angle of a body, in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    pub position: Vec2,
    pub angle: f32,
}

/// Linear and angular velocity of a body, in world units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorldVelocity {
    pub linear: Vec2,
    pub angular: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyKind {
    #[default]
    Dynamic,
    /// Immovable: arena walls and blockers.
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeSpec {
    Box { half_extents: Vec2 },
    Ball { radius: f32 },
}

/// One collider attached to a body, positioned in the body's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderSpec {
    pub shape: ShapeSpec,
    pub offset: Vec2,
    pub rotation: f32,
    pub mass: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyOptions {
    pub kind: BodyKind,
    pub rotation: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

/// Everything needed to create a body, in world units.
#[derive(Debug, Clone, PartialEq)]
pub struct BodySpec {
    pub position: Vec2,
    pub options: BodyOptions,
    pub colliders: Vec<ColliderSpec>,
}

impl BodySpec {
    fn validate(&self) -> Result<(), PhysicsError> {
        let finite = |field, value: f32| {
            if value.is_finite() {
                Ok(())
            } else {
                Err(PhysicsError::InvalidValue { field, value })
            }
        };
        let positive = |field, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(PhysicsError::InvalidValue { field, value })
            }
        };

        finite("position.x", self.position.x)?;
        finite("position.y", self.position.y)?;
        finite("rotation", self.options.rotation)?;
        if self.colliders.is_empty() {
            return Err(PhysicsError::NoColliders);
        }
        for collider in &self.colliders {
            match collider.shape {
                ShapeSpec::Box { half_extents } => {
                    positive("half width", half_extents.x)?;
                    positive("half height", half_extents.y)?;
                }
                ShapeSpec::Ball { radius } => positive("radius", radius)?,
            }
            finite("collider offset", collider.offset.length_squared())?;
            if self.options.kind == BodyKind::Dynamic && !(collider.mass > 0.0) {
                return Err(PhysicsError::InvalidMass(collider.mass));
            }
        }
        Ok(())
    }
}

/// Owns the rapier world. Mutated only by the arena session.
pub struct PhysicsAdapter {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_params: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl Default for PhysicsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsAdapter {
    /// Create an empty world with zero gravity.
    pub fn new() -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vector![0.0, 0.0],
            integration_params: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }

    /// Advance the world. `dt` is clamped to `[0, MAX_PHYSICS_DT]`; a zero
    /// step is skipped.
    pub fn step(&mut self, dt: f32) {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_PHYSICS_DT)
        } else {
            0.0
        };
        if dt <= 0.0 {
            return;
        }
        self.integration_params.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }

    /// Create a body with one or more colliders.
    pub fn create_body(&mut self, spec: &BodySpec) -> Result<BodyHandle, PhysicsError> {
        spec.validate()?;

        let position = to_vector(world_to_physics(spec.position));
        let rotation = world_angle_to_physics(spec.options.rotation);
        let body = match spec.options.kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic()
                .translation(position)
                .rotation(rotation)
                .linear_damping(spec.options.linear_damping)
                .angular_damping(spec.options.angular_damping)
                .can_sleep(false)
                .build(),
            BodyKind::Fixed => RigidBodyBuilder::fixed()
                .translation(position)
                .rotation(rotation)
                .build(),
        };
        let handle = self.bodies.insert(body);

        for collider in &spec.colliders {
            let builder = match collider.shape {
                ShapeSpec::Box { half_extents } => ColliderBuilder::cuboid(
                    half_extents.x * WORLD_TO_PHYSICS_SCALE,
                    half_extents.y * WORLD_TO_PHYSICS_SCALE,
                ),
                ShapeSpec::Ball { radius } => ColliderBuilder::ball(radius * WORLD_TO_PHYSICS_SCALE),
            };
            let mut builder = builder
                .translation(to_vector(world_to_physics(collider.offset)))
                .rotation(world_angle_to_physics(collider.rotation));
            if spec.options.kind == BodyKind::Dynamic {
                builder = builder.mass(collider.mass);
            }
            self.colliders
                .insert_with_parent(builder.build(), handle, &mut self.bodies);
        }
        // Mass properties are otherwise only refreshed on the next step.
        if let Some(body) = self.bodies.get_mut(handle) {
            body.recompute_mass_properties_from_colliders(&self.colliders);
        }
        Ok(BodyHandle(handle))
    }

    /// Convenience for a single axis-aligned box of full size `size`.
    pub fn create_box(
        &mut self,
        position: Vec2,
        size: Vec2,
        mass: f32,
        options: BodyOptions,
    ) -> Result<BodyHandle, PhysicsError> {
        self.create_body(&BodySpec {
            position,
            options,
            colliders: vec![ColliderSpec {
                shape: ShapeSpec::Box {
                    half_extents: size * 0.5,
                },
                offset: Vec2::ZERO,
                rotation: 0.0,
                mass,
            }],
        })
    }

    /// Remove a body and its colliders immediately. Returns whether the
    /// handle was live.
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        self.bodies
            .remove(
                handle.0,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle.0)
    }

    pub fn world_transform(&self, handle: BodyHandle) -> Option<WorldTransform> {
        let body = self.bodies.get(handle.0)?;
        Some(WorldTransform {
            position: physics_to_world(from_vector(body.translation())),
            angle: physics_angle_to_world(body.rotation().angle()),
        })
    }

    /// Teleport a body. Velocities are left untouched.
    pub fn set_world_transform(
        &mut self,
        handle: BodyHandle,
        transform: WorldTransform,
    ) -> Result<(), PhysicsError> {
        let body = self
            .bodies
            .get_mut(handle.0)
            .ok_or(PhysicsError::UnknownBody)?;
        let position = to_vector(world_to_physics(transform.position));
        let angle = world_angle_to_physics(transform.angle);
        body.set_position(Isometry::new(position, angle), true);
        Ok(())
    }

    pub fn world_velocity(&self, handle: BodyHandle) -> Option<WorldVelocity> {
        let body = self.bodies.get(handle.0)?;
        Some(WorldVelocity {
            linear: physics_velocity_to_world(from_vector(body.linvel())),
            angular: physics_angvel_to_world(body.angvel()),
        })
    }

    pub fn set_world_velocity(
        &mut self,
        handle: BodyHandle,
        velocity: WorldVelocity,
    ) -> Result<(), PhysicsError> {
        let body = self
            .bodies
            .get_mut(handle.0)
            .ok_or(PhysicsError::UnknownBody)?;
        body.set_linvel(to_vector(world_velocity_to_physics(velocity.linear)), true);
        body.set_angvel(world_angvel_to_physics(velocity.angular), true);
        Ok(())
    }

    /// Apply a linear impulse given in world units (mass × world velocity).
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2) -> Result<(), PhysicsError> {
        let body = self
            .bodies
            .get_mut(handle.0)
            .ok_or(PhysicsError::UnknownBody)?;
        body.apply_impulse(to_vector(world_velocity_to_physics(impulse)), true);
        Ok(())
    }

    /// Apply an angular impulse given in world units (counterclockwise positive).
    pub fn apply_torque_impulse(
        &mut self,
        handle: BodyHandle,
        impulse: f32,
    ) -> Result<(), PhysicsError> {
        let body = self
            .bodies
            .get_mut(handle.0)
            .ok_or(PhysicsError::UnknownBody)?;
        body.apply_torque_impulse(world_torque_impulse_to_physics(impulse), true);
        Ok(())
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Drop every body and collider.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}
