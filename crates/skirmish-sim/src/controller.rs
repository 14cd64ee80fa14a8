//! Controllers: where a ship's per-frame intent comes from.
//!
//! Human, scripted, and learned control all produce the same [`Input`]
//! record and share one downstream pipeline. A controller instance is bound
//! to exactly one ship.

use std::sync::{Arc, Mutex, PoisonError};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use skirmish_core::constants::*;
use skirmish_core::enums::{ControllerKind, ScriptedBehavior};
use skirmish_core::input::{Input, Intent};
use skirmish_core::sensing::SensingState;
use skirmish_core::types::{bearing_from_forward, ArenaBounds, ShipView};
use skirmish_sensing::aim::decode_aim_point;
use skirmish_sensing::contacts::is_enemy;

use crate::guidance::calculate_lead_point;

/// What a controller may look at while deciding.
#[derive(Debug, Clone, Copy)]
pub struct ControlContext<'a> {
    pub bounds: ArenaBounds,
    pub ships: &'a [ShipView],
    /// Muzzle speed of the controlled ship's primary weapon.
    pub projectile_speed: Option<f32>,
}

/// Per-frame intent source of one ship.
#[derive(Debug)]
pub enum Controller {
    Human(HumanController),
    Scripted(ScriptedController),
    Ml(MlController),
}

impl Controller {
    pub fn human(handle: HumanInputHandle) -> Self {
        Controller::Human(HumanController::new(handle))
    }

    pub fn scripted(behavior: ScriptedBehavior, seed: u64) -> Self {
        Controller::Scripted(ScriptedController::new(behavior, seed))
    }

    pub fn ml(policy: impl Policy + 'static) -> Self {
        Controller::Ml(MlController::new(policy))
    }

    pub fn kind(&self) -> ControllerKind {
        match self {
            Controller::Human(_) => ControllerKind::Human,
            Controller::Scripted(_) => ControllerKind::Scripted,
            Controller::Ml(_) => ControllerKind::Ml,
        }
    }

    /// Produce this frame's input for `ship`.
    pub fn input(&mut self, ship: &ShipView, ctx: &ControlContext<'_>, dt: f32) -> Input {
        match self {
            Controller::Human(c) => c.input(),
            Controller::Scripted(c) => c.input(ship, ctx, dt),
            Controller::Ml(c) => c.input(ship, &ctx.bounds),
        }
    }

    /// Clear one-shot flags after the frame consumed them.
    pub fn post_update(&mut self) {
        if let Controller::Human(c) = self {
            c.handle.clear_one_shots();
        }
    }

    /// Most recent aim point, for visualization.
    pub fn last_aim_target(&self) -> Option<Vec2> {
        match self {
            Controller::Human(c) => c.handle.snapshot().aim_target,
            Controller::Scripted(c) => c.last_aim,
            Controller::Ml(c) => c.last_aim,
        }
    }

    /// The controller's sensing intake, if it consumes sensing state.
    pub fn sensing_consumer(&mut self) -> Option<&mut MlController> {
        match self {
            Controller::Ml(c) => Some(c),
            _ => None,
        }
    }
}

// --- Human ---

#[derive(Debug, Default)]
struct HumanInputState {
    held: Input,
    fire_requested: bool,
}

/// Shared handle through which an input device writes a ship's intents.
/// Cloning yields another handle to the same state.
#[derive(Debug, Clone, Default)]
pub struct HumanInputHandle(Arc<Mutex<HumanInputState>>);

impl HumanInputHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut HumanInputState) -> R) -> R {
        let mut state = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    pub fn press(&self, intent: Intent) {
        self.with(|s| s.held.set(intent, true));
    }

    pub fn release(&self, intent: Intent) {
        self.with(|s| s.held.set(intent, false));
    }

    /// Fire once on the next frame, then release.
    pub fn request_fire(&self) {
        self.with(|s| s.fire_requested = true);
    }

    pub fn set_aim_target(&self, target: Option<Vec2>) {
        self.with(|s| s.held.aim_target = target);
    }

    pub fn set_turn_toward(&self, on: bool) {
        self.with(|s| s.held.turn_toward = on);
    }

    pub fn set_fast_turn(&self, on: bool) {
        self.with(|s| s.held.fast_turn = on);
    }

    /// Replace every held intent at once.
    pub fn set_input(&self, input: Input) {
        self.with(|s| s.held = input);
    }

    /// The input the next frame will see.
    pub fn snapshot(&self) -> Input {
        self.with(|s| {
            let mut input = s.held;
            input.fire |= s.fire_requested;
            input
        })
    }

    fn clear_one_shots(&self) {
        self.with(|s| s.fire_requested = false);
    }
}

/// Relays input written by a device through a [`HumanInputHandle`].
#[derive(Debug)]
pub struct HumanController {
    handle: HumanInputHandle,
}

impl HumanController {
    pub fn new(handle: HumanInputHandle) -> Self {
        Self { handle }
    }

    fn input(&self) -> Input {
        self.handle.snapshot()
    }
}

// --- Scripted ---

/// Rule-based opponent.
#[derive(Debug)]
pub struct ScriptedController {
    behavior: ScriptedBehavior,
    rng: ChaCha8Rng,
    reroll_in: f32,
    current: Input,
    last_aim: Option<Vec2>,
}

impl ScriptedController {
    pub fn new(behavior: ScriptedBehavior, seed: u64) -> Self {
        Self {
            behavior,
            rng: ChaCha8Rng::seed_from_u64(seed),
            reroll_in: 0.0,
            current: Input::idle(),
            last_aim: None,
        }
    }

    fn input(&mut self, ship: &ShipView, ctx: &ControlContext<'_>, dt: f32) -> Input {
        match self.behavior {
            ScriptedBehavior::Idle => Input::idle(),
            ScriptedBehavior::Wander => self.wander(dt),
            ScriptedBehavior::Hunter => self.hunt(ship, ctx),
        }
    }

    fn wander(&mut self, dt: f32) -> Input {
        self.reroll_in -= dt;
        if self.reroll_in <= 0.0 {
            self.reroll_in = WANDER_REROLL_SECS;
            let mut input = Input::idle();
            for intent in Intent::ALL {
                if intent != Intent::Fire {
                    input.set(intent, self.rng.gen_bool(0.5));
                }
            }
            self.current = input;
        }
        self.current
    }

    fn hunt(&mut self, ship: &ShipView, ctx: &ControlContext<'_>) -> Input {
        let target = ctx
            .ships
            .iter()
            .filter(|other| is_enemy(ship, other))
            .min_by(|a, b| {
                a.position
                    .distance_squared(ship.position)
                    .total_cmp(&b.position.distance_squared(ship.position))
            });
        let Some(target) = target else {
            self.last_aim = None;
            return Input::idle();
        };

        let aim = match ctx.projectile_speed {
            Some(speed) => {
                calculate_lead_point(
                    ship.position,
                    ship.velocity,
                    target.position,
                    target.velocity,
                    speed,
                )
                .0
            }
            None => target.position,
        };
        self.last_aim = Some(aim);

        let range = ship.position.distance(target.position);
        let bearing = bearing_from_forward(ship.rotation, aim - ship.position);
        Input {
            forward: range > HUNTER_APPROACH_RANGE,
            back: range < HUNTER_STANDOFF_RANGE,
            fire: ctx.projectile_speed.is_some() && bearing.abs() < HUNTER_FIRE_CONE,
            aim_target: Some(aim),
            turn_toward: true,
            ..Input::idle()
        }
    }
}

// --- ML ---

/// Raw output of a learned policy for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PolicyOutput {
    /// Intent activations in [`Intent::ALL`] order.
    pub intents: [f32; ACTION_INTENTS],
    /// Aim point in the ship-local frame, divided by the arena diagonal.
    pub aim: Option<Vec2>,
}

/// A learned policy: flattened sensing vector in, action vector out.
pub trait Policy: Send {
    fn act(&mut self, sensing: &[f32; SENSING_VECTOR_LEN]) -> PolicyOutput;
}

impl<F> Policy for F
where
    F: FnMut(&[f32; SENSING_VECTOR_LEN]) -> PolicyOutput + Send,
{
    fn act(&mut self, sensing: &[f32; SENSING_VECTOR_LEN]) -> PolicyOutput {
        self(sensing)
    }
}

/// Drives a ship from a [`Policy`], one frame behind the sensing it sees.
pub struct MlController {
    policy: Box<dyn Policy>,
    sensing: Option<SensingState>,
    last_aim: Option<Vec2>,
    turn_toward_aim: bool,
}

impl std::fmt::Debug for MlController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MlController")
            .field("has_sensing", &self.sensing.is_some())
            .field("last_aim", &self.last_aim)
            .field("turn_toward_aim", &self.turn_toward_aim)
            .finish()
    }
}

impl MlController {
    pub fn new(policy: impl Policy + 'static) -> Self {
        Self {
            policy: Box::new(policy),
            sensing: None,
            last_aim: None,
            turn_toward_aim: false,
        }
    }

    /// Rotate the hull toward the policy's aim point instead of relying on
    /// its turn intents.
    pub fn with_turn_toward_aim(mut self, on: bool) -> Self {
        self.turn_toward_aim = on;
        self
    }

    /// Hand over the sensing state used for the next frame.
    pub fn set_sensing_state(&mut self, state: SensingState) {
        self.sensing = Some(state);
    }

    pub fn sensing_state(&self) -> Option<&SensingState> {
        self.sensing.as_ref()
    }

    fn input(&mut self, ship: &ShipView, bounds: &ArenaBounds) -> Input {
        let Some(sensing) = &self.sensing else {
            return Input::idle();
        };
        let output = self.policy.act(&sensing.flatten());

        let mut input = Input::from_activations(&output.intents, ACTION_THRESHOLD);
        let aim = output
            .aim
            .filter(|a| a.is_finite())
            .map(|a| decode_aim_point(ship, a, bounds));
        input.aim_target = aim;
        input.turn_toward = self.turn_toward_aim && aim.is_some();
        self.last_aim = aim;
        input
    }
}
