//! Core types and definitions for the skirmish arena simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! ids and arena geometry, the piece catalog, ECS components, the
//! controller input record, the sensing-state contract, events, and
//! constants. It has no dependency on the physics engine or the ECS runtime.

pub mod catalog;
pub mod components;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod input;
pub mod sensing;
pub mod types;

#[cfg(test)]
mod tests;
