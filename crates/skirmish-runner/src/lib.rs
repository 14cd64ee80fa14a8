//! Headless runner for skirmish arena matches.
//!
//! Loads a match description, builds controllers for every ship, and drives
//! arena sessions at the fixed tick rate.

pub mod config;
pub mod game_loop;
pub mod policy;

pub use skirmish_sim as sim;
