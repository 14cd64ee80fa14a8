//! Simulation constants and tuning parameters.
//!
//! Distances are world units, times are seconds, angles are radians.

use std::f32::consts::{PI, TAU};

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f32 = 1.0 / TICK_RATE as f32;

/// Largest frame delta the orchestrator accepts; longer hitches are clamped.
pub const MAX_FRAME_DT: f32 = 0.05;

/// Largest delta handed to the physics integrator in one step.
pub const MAX_PHYSICS_DT: f32 = 1.0 / 30.0;

// --- Physics ---

/// World units -> physics meters. Physics Y and angles are additionally negated.
pub const WORLD_TO_PHYSICS_SCALE: f32 = 0.1;

/// Linear damping applied to every ship body.
pub const SHIP_LINEAR_DAMPING: f32 = 0.6;

/// Angular damping applied to every ship body.
pub const SHIP_ANGULAR_DAMPING: f32 = 2.5;

/// Thickness of the fixed wall colliders enclosing the arena.
pub const ARENA_WALL_THICKNESS: f32 = 20.0;

// --- Arena ---

/// Default playable width.
pub const DEFAULT_ARENA_WIDTH: f32 = 800.0;

/// Default playable height.
pub const DEFAULT_ARENA_HEIGHT: f32 = 600.0;

/// Side length of one layout grid cell.
pub const PIECE_UNIT: f32 = 10.0;

// --- Ship control ---

/// Fraction of forward thrust available when reversing.
pub const BACK_THRUST_FACTOR: f32 = 0.5;

/// Fraction of forward thrust available for strafing.
pub const STRAFE_THRUST_FACTOR: f32 = 0.6;

/// Angular acceleration from the turn intents (rad/s²).
pub const TURN_ACCELERATION: f32 = 9.0;

/// Maximum commanded turn rate when turning toward an aim target (rad/s).
pub const MAX_TURN_RATE: f32 = 3.0;

/// Proportional gain of the turn-toward controller.
pub const TURN_TOWARD_GAIN: f32 = 6.0;

/// Multiplier applied to turn acceleration and rate when `fast_turn` is set.
pub const FAST_TURN_MULTIPLIER: f32 = 1.8;

// --- Weapons & projectiles ---

/// Angular tolerance under which a slewing turret counts as on target.
pub const TURRET_ON_TARGET_TOLERANCE: f32 = 0.05;

/// Projectiles further than this outside the arena are discarded.
pub const PROJECTILE_ARENA_MARGIN: f32 = 50.0;

// --- Hazards ---

/// Minimum time between two damaging contacts of one hazard with one ship.
pub const HAZARD_CONTACT_COOLDOWN_SECS: f32 = 0.5;

/// Speed change imparted on a ship pushed away by a hazard.
pub const HAZARD_PUSH_SPEED: f32 = 80.0;

// --- Outcome ---

/// Grace period between a decisive destruction and the outcome callback.
pub const OUTCOME_DELAY_SECS: f32 = 1.5;

// --- Sensing ---

/// Velocity that maps to ±1 in the self and contact sections.
pub const MAX_SENSED_VELOCITY: f32 = 300.0;

/// Angular velocity that maps to ±1 in the self section.
pub const MAX_SENSED_ANGULAR_VELOCITY: f32 = TAU;

/// Closest-approach distance at which a projectile stops scoring proximity.
pub const THREAT_PROXIMITY_RADIUS: f32 = 60.0;

/// Time to closest approach beyond which a projectile stops scoring urgency.
pub const THREAT_TIME_HORIZON: f32 = 2.0;

/// Number of threat radar sectors.
pub const THREAT_SECTORS: usize = 8;

/// Angular width of one threat sector.
pub const THREAT_SECTOR_ANGLE: f32 = TAU / THREAT_SECTORS as f32;

/// Padded enemy slots.
pub const ENEMY_SLOTS: usize = 4;

/// Padded hazard slots.
pub const HAZARD_SLOTS: usize = 4;

/// Padded blocker slots.
pub const BLOCKER_SLOTS: usize = 4;

/// Values in the self section.
pub const SELF_FIELDS: usize = 6;

/// Values in the wall section.
pub const WALL_FIELDS: usize = 4;

/// Values per enemy slot.
pub const ENEMY_FIELDS: usize = 9;

/// Values per hazard slot.
pub const HAZARD_FIELDS: usize = 5;

/// Values per blocker slot.
pub const BLOCKER_FIELDS: usize = 4;

/// Length of the flattened sensing vector.
pub const SENSING_VECTOR_LEN: usize = SELF_FIELDS
    + WALL_FIELDS
    + THREAT_SECTORS
    + ENEMY_SLOTS * ENEMY_FIELDS
    + HAZARD_SLOTS * HAZARD_FIELDS
    + BLOCKER_SLOTS * BLOCKER_FIELDS;

/// Bumped whenever the order or length of the flattened vector changes.
pub const SENSING_LAYOUT_VERSION: u32 = 1;

// --- ML policy ---

/// Intent activations in a policy action vector.
pub const ACTION_INTENTS: usize = 7;

/// Activation above which an intent counts as pressed.
pub const ACTION_THRESHOLD: f32 = 0.5;

// --- Scripted controllers ---

/// Interval between random intent re-rolls of a wandering ship.
pub const WANDER_REROLL_SECS: f32 = 1.0;

/// A hunter thrusts forward while its target is further than this.
pub const HUNTER_APPROACH_RANGE: f32 = 220.0;

/// A hunter backs off while its target is closer than this.
pub const HUNTER_STANDOFF_RANGE: f32 = 90.0;

/// Bearing error under which a hunter requests fire.
pub const HUNTER_FIRE_CONE: f32 = PI / 6.0;
