//! Perception encoder for the skirmish arena.
//!
//! Turns plain views of the arena (ships, projectiles, hazards, blockers)
//! into the fixed-shape [`SensingState`](skirmish_core::sensing::SensingState).
//! Every function here is pure and deterministic. No ECS dependency, no
//! physics dependency.

pub mod aim;
pub mod contacts;
pub mod encoder;
pub mod threats;
pub mod walls;

pub use encoder::{compute_sensing, SensingContext};
pub use skirmish_core as core;

#[cfg(test)]
mod tests;
