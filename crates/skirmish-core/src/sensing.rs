//! Sensing state: the fixed-shape, normalized snapshot consumed by the debug
//! overlay, the recorder, and learned policies.
//!
//! The flattened order is a versioned contract ([`SENSING_LAYOUT_VERSION`]).
//! Reordering fields or changing slot counts invalidates trained policies
//! and recorded data.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Motion and condition of the sensing ship itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SelfSensing {
    /// Velocity along the ship's forward axis.
    pub forward_velocity: f32,
    /// Velocity along the ship's right axis.
    pub lateral_velocity: f32,
    pub angular_velocity: f32,
    pub health: f32,
    pub x: f32,
    pub y: f32,
}

impl SelfSensing {
    pub fn values(&self) -> [f32; SELF_FIELDS] {
        [
            self.forward_velocity,
            self.lateral_velocity,
            self.angular_velocity,
            self.health,
            self.x,
            self.y,
        ]
    }
}

/// Distance to the arena boundary along the ship's four axes, over the diagonal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WallSensing {
    pub front: f32,
    pub back: f32,
    pub left: f32,
    pub right: f32,
}

impl WallSensing {
    pub fn values(&self) -> [f32; WALL_FIELDS] {
        [self.front, self.back, self.left, self.right]
    }
}

/// Eight 45° sectors; sector 0 is centered on the ship's front, then clockwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreatRadar {
    pub sectors: [f32; THREAT_SECTORS],
}

/// Fields shared by every sensed contact slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactSensing {
    pub present: bool,
    /// Distance over the arena diagonal.
    pub distance: f32,
    /// Bearing from the ship's forward direction over π (left positive).
    pub bearing: f32,
}

impl ContactSensing {
    fn values(&self) -> [f32; 3] {
        [
            if self.present { 1.0 } else { 0.0 },
            self.distance,
            self.bearing,
        ]
    }
}

/// One enemy slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnemySensing {
    pub contact: ContactSensing,
    /// Relative speed toward the ship (positive when closing).
    pub closing_speed: f32,
    /// Relative speed across the line of sight (left positive).
    pub lateral_speed: f32,
    /// How squarely the enemy faces the ship (1.0 = pointing straight at it).
    pub facing: f32,
    pub health: f32,
    /// How far ahead of the enemy's velocity the ship's forward axis points.
    pub lead_velocity: f32,
    /// How far ahead of the enemy's facing the ship's forward axis points.
    pub lead_facing: f32,
}

impl EnemySensing {
    pub fn values(&self) -> [f32; ENEMY_FIELDS] {
        let [present, distance, bearing] = self.contact.values();
        [
            present,
            distance,
            bearing,
            self.closing_speed,
            self.lateral_speed,
            self.facing,
            self.health,
            self.lead_velocity,
            self.lead_facing,
        ]
    }
}

/// One hazard slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HazardSensing {
    pub contact: ContactSensing,
    pub closing_speed: f32,
    pub lateral_speed: f32,
}

impl HazardSensing {
    pub fn values(&self) -> [f32; HAZARD_FIELDS] {
        let [present, distance, bearing] = self.contact.values();
        [
            present,
            distance,
            bearing,
            self.closing_speed,
            self.lateral_speed,
        ]
    }
}

/// One blocker slot. Distance is measured to the blocker's surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockerSensing {
    pub contact: ContactSensing,
    /// Radius over the arena diagonal.
    pub radius: f32,
}

impl BlockerSensing {
    pub fn values(&self) -> [f32; BLOCKER_FIELDS] {
        let [present, distance, bearing] = self.contact.values();
        [present, distance, bearing, self.radius]
    }
}

/// Raw world-space data of one enemy slot, for consumers that need real
/// positions (aim labels, overlays). Not part of the flattened vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnemyWorldData {
    pub present: bool,
    pub position: Vec2,
    pub velocity: Vec2,
    pub forward_angle: f32,
}

/// Complete sensing snapshot of one ship for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensingState {
    pub self_state: SelfSensing,
    pub walls: WallSensing,
    pub threats: ThreatRadar,
    /// Nearest first; unused slots are zero with `present = false`.
    pub enemies: [EnemySensing; ENEMY_SLOTS],
    pub hazards: [HazardSensing; HAZARD_SLOTS],
    pub blockers: [BlockerSensing; BLOCKER_SLOTS],
    /// Side channel aligned slot-for-slot with `enemies`.
    pub enemy_world: [EnemyWorldData; ENEMY_SLOTS],
}

impl SensingState {
    /// Flatten into the versioned fixed-length vector.
    pub fn flatten(&self) -> [f32; SENSING_VECTOR_LEN] {
        let mut out = [0.0; SENSING_VECTOR_LEN];
        let mut cursor = 0;
        let mut push = |values: &[f32]| {
            out[cursor..cursor + values.len()].copy_from_slice(values);
            cursor += values.len();
        };

        push(&self.self_state.values());
        push(&self.walls.values());
        push(&self.threats.sectors);
        for enemy in &self.enemies {
            push(&enemy.values());
        }
        for hazard in &self.hazards {
            push(&hazard.values());
        }
        for blocker in &self.blockers {
            push(&blocker.values());
        }
        debug_assert_eq!(cursor, SENSING_VECTOR_LEN);
        out
    }

    /// Flattened vector as an owned `Vec`, for serialization.
    pub fn to_vec(&self) -> Vec<f32> {
        self.flatten().to_vec()
    }

    /// Index of the first value of each section in the flattened vector.
    pub fn section_offsets() -> SectionOffsets {
        let walls = SELF_FIELDS;
        let threats = walls + WALL_FIELDS;
        let enemies = threats + THREAT_SECTORS;
        let hazards = enemies + ENEMY_SLOTS * ENEMY_FIELDS;
        let blockers = hazards + HAZARD_SLOTS * HAZARD_FIELDS;
        SectionOffsets {
            self_state: 0,
            walls,
            threats,
            enemies,
            hazards,
            blockers,
        }
    }
}

/// Start offsets of the flattened sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionOffsets {
    pub self_state: usize,
    pub walls: usize,
    pub threats: usize,
    pub enemies: usize,
    pub hazards: usize,
    pub blockers: usize,
}
