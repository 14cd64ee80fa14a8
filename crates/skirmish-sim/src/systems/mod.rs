//! ECS systems that operate on the arena world each frame.
//!
//! Systems are free functions over `&mut World` (plus whatever session
//! resources they touch). They do not own state; all state lives in
//! components or in the session.

pub mod cleanup;
pub mod collision;
pub mod fire_control;
pub mod hazards;
pub mod movement;
pub mod views;
