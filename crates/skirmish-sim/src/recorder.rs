//! Sensing recorder: per-frame training samples for one ship.
//!
//! Each frame pairs the flattened sensing vector with the input the ship
//! actually produced and an aim label, the predicted intercept point on the
//! nearest enemy. Frames are written as JSON lines.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use skirmish_core::constants::SENSING_LAYOUT_VERSION;
use skirmish_core::input::Input;
use skirmish_core::sensing::SensingState;
use skirmish_core::types::{ShipId, ShipView};

use crate::error::RecorderError;
use crate::guidance::calculate_lead_point;

/// One recorded sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub tick: u64,
    pub layout_version: u32,
    pub sensing: Vec<f32>,
    pub input: Input,
    /// World-space point this frame's shot should have gone to.
    pub aim_label: Option<Vec2>,
}

/// Collects frames for a single ship.
#[derive(Debug, Clone)]
pub struct SensingRecorder {
    ship: ShipId,
    frames: Vec<RecordedFrame>,
}

impl SensingRecorder {
    pub fn new(ship: ShipId) -> Self {
        Self {
            ship,
            frames: Vec::new(),
        }
    }

    pub fn ship(&self) -> ShipId {
        self.ship
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Record one frame of the ship's sensing and input.
    pub fn capture(
        &mut self,
        tick: u64,
        ship: &ShipView,
        sensing: &SensingState,
        input: Input,
        projectile_speed: Option<f32>,
    ) {
        self.frames.push(RecordedFrame {
            tick,
            layout_version: SENSING_LAYOUT_VERSION,
            sensing: sensing.to_vec(),
            input,
            aim_label: aim_label(ship, sensing, projectile_speed),
        });
    }

    /// Write every frame as one JSON object per line.
    pub fn write_jsonl<W: Write>(&self, mut writer: W) -> Result<(), RecorderError> {
        for frame in &self.frames {
            serde_json::to_writer(&mut writer, frame)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RecorderError> {
        let file = File::create(path)?;
        self.write_jsonl(BufWriter::new(file))
    }
}

/// Intercept point on the nearest enemy, reconstructed from the raw enemy
/// side channel. Without a weapon the enemy's current position is used.
pub fn aim_label(
    ship: &ShipView,
    sensing: &SensingState,
    projectile_speed: Option<f32>,
) -> Option<Vec2> {
    let enemy = sensing.enemy_world.iter().find(|e| e.present)?;
    Some(match projectile_speed {
        Some(speed) => {
            calculate_lead_point(
                ship.position,
                ship.velocity,
                enemy.position,
                enemy.velocity,
                speed,
            )
            .0
        }
        None => enemy.position,
    })
}
