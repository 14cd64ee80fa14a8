//! Per-frame controller input.
//!
//! This record is the only contract between an input source (human,
//! scripted, or learned) and the layer that turns intent into force.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Intents produced by a controller for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Input {
    pub forward: bool,
    pub back: bool,
    /// Strafe toward the ship's left.
    pub left: bool,
    /// Strafe toward the ship's right.
    pub right: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub fire: bool,
    /// World-space point the weapons should track.
    pub aim_target: Option<Vec2>,
    /// Rotate the hull toward `aim_target` instead of using the turn intents.
    pub turn_toward: bool,
    pub fast_turn: bool,
}

impl Input {
    /// No intents at all.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Intents as activations in the policy action order:
    /// forward, back, left, right, turn_left, turn_right, fire.
    pub fn intent_activations(&self) -> [f32; crate::constants::ACTION_INTENTS] {
        [
            self.forward,
            self.back,
            self.left,
            self.right,
            self.turn_left,
            self.turn_right,
            self.fire,
        ]
        .map(|pressed| if pressed { 1.0 } else { 0.0 })
    }
}

/// One boolean intent of the [`Input`] record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Forward,
    Back,
    Left,
    Right,
    TurnLeft,
    TurnRight,
    Fire,
}

impl Intent {
    /// All intents in policy action order.
    pub const ALL: [Intent; crate::constants::ACTION_INTENTS] = [
        Intent::Forward,
        Intent::Back,
        Intent::Left,
        Intent::Right,
        Intent::TurnLeft,
        Intent::TurnRight,
        Intent::Fire,
    ];
}

impl Input {
    pub fn set(&mut self, intent: Intent, pressed: bool) {
        let flag = match intent {
            Intent::Forward => &mut self.forward,
            Intent::Back => &mut self.back,
            Intent::Left => &mut self.left,
            Intent::Right => &mut self.right,
            Intent::TurnLeft => &mut self.turn_left,
            Intent::TurnRight => &mut self.turn_right,
            Intent::Fire => &mut self.fire,
        };
        *flag = pressed;
    }

    /// Build the intents from policy activations; above `threshold` is pressed.
    pub fn from_activations(
        activations: &[f32; crate::constants::ACTION_INTENTS],
        threshold: f32,
    ) -> Self {
        let mut input = Self::default();
        for (intent, &activation) in Intent::ALL.iter().zip(activations) {
            input.set(*intent, activation > threshold);
        }
        input
    }
}
