//! Arena simulation for the skirmish game.
//!
//! Owns the hecs ECS world and the rapier2d physics world, runs ship
//! controllers, weapons, collisions and hazards in a fixed per-frame order,
//! and computes sensing for the player and learned controllers.

pub mod controller;
pub mod error;
pub mod guidance;
pub mod outcome;
pub mod physics;
pub mod recorder;
pub mod session;
pub mod systems;
pub mod world_setup;

pub use controller::{Controller, HumanInputHandle, Policy, PolicyOutput};
pub use error::{PhysicsError, RecorderError, SessionError, SpawnError};
pub use session::{ArenaConfig, ArenaSession, FrameReport};
pub use skirmish_core as core;
pub use world_setup::{ArenaSetup, BlockerSpec, HazardSpec, LayoutSource, ShipEntry, ShipSpec};
