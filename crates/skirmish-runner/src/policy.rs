//! A hand-written policy that drives a ship through the learned-controller
//! interface: it reads only the flattened sensing vector and answers with
//! intent activations and a ship-local aim point.

use std::f32::consts::PI;

use glam::Vec2;

use skirmish_core::constants::SENSING_VECTOR_LEN;
use skirmish_core::sensing::SensingState;
use skirmish_sim::{Policy, PolicyOutput};

/// Bearing (radians) under which the policy stops turning.
const TURN_DEADBAND: f32 = 0.05;
/// Bearing (radians) under which the policy fires.
const FIRE_CONE: f32 = 0.15;

/// Chase the nearest enemy, keep it in front, and shoot when aligned.
#[derive(Debug, Clone, Copy)]
pub struct PursuitPolicy {
    /// Normalized distance the policy tries to hold.
    pub standoff: f32,
}

impl Default for PursuitPolicy {
    fn default() -> Self {
        Self { standoff: 0.2 }
    }
}

impl Policy for PursuitPolicy {
    fn act(&mut self, sensing: &[f32; SENSING_VECTOR_LEN]) -> PolicyOutput {
        let slot = SensingState::section_offsets().enemies;
        let present = sensing[slot] > 0.5;
        if !present {
            return PolicyOutput::default();
        }
        let distance = sensing[slot + 1];
        let bearing = sensing[slot + 2] * PI;

        let pressed = |on: bool| if on { 1.0 } else { 0.0 };
        let intents = [
            pressed(distance > self.standoff * 1.2),
            pressed(distance < self.standoff * 0.6),
            0.0,
            0.0,
            pressed(bearing > TURN_DEADBAND),
            pressed(bearing < -TURN_DEADBAND),
            pressed(bearing.abs() < FIRE_CONE),
        ];
        // Ship-local direction of the enemy, scaled by its normalized range.
        let aim = Vec2::new(-bearing.sin(), bearing.cos()) * distance;

        PolicyOutput {
            intents,
            aim: Some(aim),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::sensing::{ContactSensing, EnemySensing};

    fn sensing_with_enemy(distance: f32, bearing: f32) -> [f32; SENSING_VECTOR_LEN] {
        let mut state = SensingState::default();
        state.enemies[0] = EnemySensing {
            contact: ContactSensing {
                present: true,
                distance,
                bearing: bearing / PI,
            },
            ..Default::default()
        };
        state.flatten()
    }

    #[test]
    fn test_idle_without_enemies() {
        let out = PursuitPolicy::default().act(&SensingState::default().flatten());
        assert_eq!(out, PolicyOutput::default());
    }

    #[test]
    fn test_turns_toward_and_fires_when_aligned() {
        let mut policy = PursuitPolicy::default();

        let left = policy.act(&sensing_with_enemy(0.5, 0.8));
        assert_eq!(left.intents[4], 1.0);
        assert_eq!(left.intents[5], 0.0);
        assert_eq!(left.intents[6], 0.0);
        assert_eq!(left.intents[0], 1.0);

        let ahead = policy.act(&sensing_with_enemy(0.5, 0.0));
        assert_eq!(ahead.intents[6], 1.0);
        let aim = ahead.aim.unwrap();
        assert!(aim.abs_diff_eq(Vec2::new(0.0, 0.5), 1e-5));
    }

    #[test]
    fn test_backs_off_when_close() {
        let out = PursuitPolicy::default().act(&sensing_with_enemy(0.05, 0.0));
        assert_eq!(out.intents[0], 0.0);
        assert_eq!(out.intents[1], 1.0);
    }
}
