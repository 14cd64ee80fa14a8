//! Arena session: the orchestrator of one match.
//!
//! `ArenaSession` owns the hecs world, the physics adapter, every ship's
//! controller and body handle, the seeded RNG, and the outcome timer.
//! Completely headless, so a seed and a setup reproduce a match exactly.
//!
//! Frame order:
//! 1. controllers produce input (ML controllers use last frame's sensing)
//! 2. input becomes thrust and torque impulses
//! 3. physics substeps covering the frame, then transforms are read back
//! 4. weapons fire and projectiles move
//! 5. projectile collisions, expired projectiles removed, hazard contacts,
//!    then destruction handling
//! 6. sensing for the player, ML ships and the recorded ship
//! 7. one-shot input flags cleared, pending outcome polled

use std::collections::BTreeMap;

use glam::Vec2;
use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use skirmish_core::catalog::PieceCatalog;
use skirmish_core::components::*;
use skirmish_core::constants::{MAX_FRAME_DT, MAX_PHYSICS_DT, OUTCOME_DELAY_SECS};
use skirmish_core::enums::*;
use skirmish_core::events::ArenaEvent;
use skirmish_core::input::Input;
use skirmish_core::sensing::SensingState;
use skirmish_core::types::{ArenaBounds, ShipId, ShipView, SimTime};
use skirmish_sensing::compute_sensing;

use crate::controller::{ControlContext, Controller};
use crate::error::{SessionError, SpawnError};
use crate::outcome::{OutcomeCallbacks, OutcomeTimer};
use crate::physics::{BodyHandle, PhysicsAdapter, WorldTransform, WorldVelocity};
use crate::recorder::SensingRecorder;
use crate::systems::collision::{apply_damage, is_wrecked};
use crate::systems::fire_control::{primary_projectile_speed, ProjectileSpawn};
use crate::systems::{cleanup, collision, fire_control, hazards, movement, views};
use crate::world_setup::{self, ArenaSetup, ShipBlueprint, ShipEntry};

/// Session-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// RNG seed. Same seed and setup = same match.
    pub seed: u64,
    pub bounds: ArenaBounds,
    /// Simulated seconds between the deciding destruction and the callback.
    pub outcome_delay_secs: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            bounds: ArenaBounds::default(),
            outcome_delay_secs: OUTCOME_DELAY_SECS,
        }
    }
}

/// What happened during one `tick`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub tick: u64,
    pub phase: SessionPhase,
    /// Events since the previous report, in emission order.
    pub events: Vec<ArenaEvent>,
    /// Outcome whose callbacks fired during this frame.
    pub delivered: Option<Outcome>,
}

/// One arena match.
pub struct ArenaSession {
    config: ArenaConfig,
    catalog: PieceCatalog,
    world: World,
    physics: PhysicsAdapter,
    rng: ChaCha8Rng,
    time: SimTime,
    phase: SessionPhase,
    player: ShipId,
    next_ship_id: u32,
    next_projectile_id: u32,

    ships: BTreeMap<ShipId, Entity>,
    bodies: BTreeMap<ShipId, BodyHandle>,
    controllers: BTreeMap<ShipId, Controller>,
    static_bodies: Vec<BodyHandle>,
    sensing: BTreeMap<ShipId, SensingState>,

    resolved: bool,
    outcome: Option<Outcome>,
    timer: OutcomeTimer,
    callbacks: OutcomeCallbacks,

    recorder: Option<SensingRecorder>,
    events: Vec<ArenaEvent>,
    despawn_buffer: Vec<Entity>,
}

impl std::fmt::Debug for ArenaSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArenaSession")
            .field("config", &self.config)
            .field("tick", &self.time.tick)
            .field("phase", &self.phase)
            .field("player", &self.player)
            .field("ships", &self.ships.len())
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

impl ArenaSession {
    /// Start a session. The player's layout is validated before any physics
    /// body exists; a bad player ship means the session never starts. Bad
    /// opponents, blockers or hazards are logged and skipped.
    pub fn enter(
        config: ArenaConfig,
        catalog: PieceCatalog,
        setup: ArenaSetup,
    ) -> Result<Self, SessionError> {
        let bounds = config.bounds;
        if !(bounds.width.is_finite() && bounds.height.is_finite())
            || bounds.width <= 0.0
            || bounds.height <= 0.0
        {
            return Err(SessionError::InvalidArena {
                width: bounds.width,
                height: bounds.height,
            });
        }

        let ArenaSetup {
            player,
            opponents,
            hazards,
            blockers,
        } = setup;

        let player_name = player.spec.name.clone();
        let blueprint = world_setup::prepare_ship(&player.spec, &catalog).map_err(|source| {
            SessionError::InvalidPlayer {
                name: player_name.clone(),
                source,
            }
        })?;

        let mut session = Self {
            config,
            catalog,
            world: World::new(),
            physics: PhysicsAdapter::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            time: SimTime::default(),
            phase: SessionPhase::Active,
            player: ShipId(0),
            next_ship_id: 0,
            next_projectile_id: 0,
            ships: BTreeMap::new(),
            bodies: BTreeMap::new(),
            controllers: BTreeMap::new(),
            static_bodies: Vec::new(),
            sensing: BTreeMap::new(),
            resolved: false,
            outcome: None,
            timer: OutcomeTimer::new(),
            callbacks: OutcomeCallbacks::default(),
            recorder: None,
            events: Vec::new(),
            despawn_buffer: Vec::new(),
        };

        session.static_bodies = world_setup::spawn_walls(&mut session.physics, &bounds)?;
        session.player = session
            .insert_ship(player, blueprint, true)
            .map_err(|source| SessionError::InvalidPlayer {
                name: player_name,
                source,
            })?;

        for entry in opponents {
            // Failures are logged and reported as events inside spawn_ship.
            let _ = session.spawn_ship(entry);
        }
        for spec in &blockers {
            match world_setup::spawn_blocker(&mut session.world, &mut session.physics, spec) {
                Ok((_, body)) => session.static_bodies.push(body),
                Err(err) => session.report_spawn_failure("blocker", &err),
            }
        }
        for spec in &hazards {
            if let Err(err) = world_setup::spawn_hazard(&mut session.world, spec) {
                session.report_spawn_failure("hazard", &err);
            }
        }

        info!(
            seed = config.seed,
            width = bounds.width,
            height = bounds.height,
            ships = session.ships.len(),
            hazards = hazards.len(),
            blockers = blockers.len(),
            "arena session entered"
        );
        Ok(session)
    }

    /// Add a ship mid-session. Failure affects only this ship: it is logged,
    /// reported as a `SpawnFailed` event, and returned.
    pub fn spawn_ship(&mut self, entry: ShipEntry) -> Result<ShipId, SpawnError> {
        let name = entry.spec.name.clone();
        let result = if self.phase == SessionPhase::Exited {
            Err(SpawnError::SessionExited)
        } else {
            match world_setup::prepare_ship(&entry.spec, &self.catalog) {
                Ok(blueprint) => self.insert_ship(entry, blueprint, false),
                Err(err) => Err(err),
            }
        };
        if let Err(err) = &result {
            self.report_spawn_failure(&name, err);
        }
        result
    }

    fn insert_ship(
        &mut self,
        entry: ShipEntry,
        blueprint: ShipBlueprint,
        is_player: bool,
    ) -> Result<ShipId, SpawnError> {
        let id = ShipId(self.next_ship_id);
        let (entity, body) = world_setup::spawn_ship(
            &mut self.world,
            &mut self.physics,
            id,
            &entry.spec,
            blueprint,
            is_player,
        )?;
        self.next_ship_id += 1;
        self.ships.insert(id, entity);
        self.bodies.insert(id, body);
        self.controllers.insert(id, entry.controller);
        if let Ok(mut info) = self.world.get::<&mut ShipInfo>(entity) {
            info.lifecycle = ShipLifecycle::Active;
        }

        debug!(ship = %id, name = %entry.spec.name, team = ?entry.spec.team, is_player, "ship spawned");
        self.events.push(ArenaEvent::ShipSpawned {
            ship: id,
            team: entry.spec.team,
            position: entry.spec.position,
        });
        Ok(id)
    }

    fn report_spawn_failure(&mut self, name: &str, err: &dyn std::error::Error) {
        warn!(name, error = %err, "spawn failed; continuing without it");
        self.events.push(ArenaEvent::SpawnFailed {
            name: name.to_string(),
            reason: err.to_string(),
        });
    }

    /// Advance the match by `dt` seconds (clamped to `MAX_FRAME_DT`).
    /// After `exit` this is a no-op.
    pub fn tick(&mut self, dt: f32) -> FrameReport {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        if self.phase == SessionPhase::Exited || dt <= 0.0 {
            return self.report(None);
        }

        self.time.advance(dt);
        self.gather_inputs(dt);

        movement::apply_thrust(&self.world, &mut self.physics, &self.bodies, dt);
        self.step_physics(dt);
        movement::sync_from_physics(&mut self.world, &self.physics, &self.bodies);

        let spawns = fire_control::run(&mut self.world, &mut self.rng, dt, &mut self.events);
        movement::integrate_projectiles(&mut self.world, dt);
        self.spawn_projectiles(spawns);

        // Expired projectiles still get their last swept segment tested.
        let mut destructions =
            collision::run(&mut self.world, &mut self.despawn_buffer, &mut self.events);
        cleanup::run(&mut self.world, &self.config.bounds, &mut self.despawn_buffer);
        destructions.extend(hazards::run(
            &mut self.world,
            &mut self.physics,
            &self.bodies,
            &self.config.bounds,
            dt,
            &mut self.events,
        ));
        for destruction in destructions {
            self.handle_ship_destroyed(destruction.ship, destruction.cause);
        }

        self.update_sensing();
        for controller in self.controllers.values_mut() {
            controller.post_update();
        }

        let delivered = self.deliver_outcome();
        self.report(delivered)
    }

    /// Cover the whole frame in equal physics substeps no longer than
    /// `MAX_PHYSICS_DT`, so ships and projectiles share one clock.
    fn step_physics(&mut self, dt: f32) {
        let substeps = (dt / MAX_PHYSICS_DT).ceil().max(1.0) as u32;
        let step = dt / substeps as f32;
        for _ in 0..substeps {
            self.physics.step(step);
        }
    }

    fn report(&mut self, delivered: Option<Outcome>) -> FrameReport {
        FrameReport {
            tick: self.time.tick,
            phase: self.phase,
            events: std::mem::take(&mut self.events),
            delivered,
        }
    }

    /// Ask every living ship's controller for this frame's input.
    fn gather_inputs(&mut self, dt: f32) {
        let arena = views::collect(&self.world);
        for (id, controller) in self.controllers.iter_mut() {
            let Some(&entity) = self.ships.get(id) else {
                continue;
            };
            let input = match arena.ship(*id) {
                Some(view) if view.alive => {
                    let ctx = ControlContext {
                        bounds: self.config.bounds,
                        ships: &arena.ships,
                        projectile_speed: projectile_speed(&self.world, entity),
                    };
                    controller.input(view, &ctx, dt)
                }
                _ => Input::idle(),
            };
            if let Ok(mut slot) = self.world.get::<&mut Input>(entity) {
                *slot = input;
            }
        }
    }

    fn spawn_projectiles(&mut self, spawns: Vec<ProjectileSpawn>) {
        for spawn in spawns {
            let id = self.next_projectile_id;
            self.next_projectile_id = self.next_projectile_id.wrapping_add(1);
            self.world.spawn((
                Kinematics {
                    position: spawn.position,
                    velocity: spawn.velocity,
                },
                Projectile {
                    id,
                    shooter: spawn.shooter,
                    damage: spawn.damage,
                    lifetime_secs: spawn.lifetime_secs,
                    radius: spawn.radius,
                    previous_position: spawn.position,
                },
            ));
        }
    }

    /// Compute sensing for the player, every ML-controlled ship and the
    /// recorded ship. ML controllers receive it for the next frame.
    fn update_sensing(&mut self) {
        let arena = views::collect(&self.world);
        let ctx = arena.context(self.config.bounds);
        let recorded = self.recorder.as_ref().map(SensingRecorder::ship);

        for (&id, &entity) in &self.ships {
            let is_ml = self
                .controllers
                .get(&id)
                .is_some_and(|c| c.kind() == ControllerKind::Ml);
            if id != self.player && !is_ml && recorded != Some(id) {
                continue;
            }
            let Some(view) = arena.ship(id).filter(|v| v.alive) else {
                continue;
            };

            let state = compute_sensing(view, &ctx);
            if let Some(ml) = self
                .controllers
                .get_mut(&id)
                .and_then(Controller::sensing_consumer)
            {
                ml.set_sensing_state(state.clone());
            }
            if recorded == Some(id) {
                if let Some(recorder) = self.recorder.as_mut() {
                    let input = self
                        .world
                        .get::<&Input>(entity)
                        .map(|i| *i)
                        .unwrap_or_default();
                    let speed = projectile_speed(&self.world, entity);
                    recorder.capture(self.time.tick, view, &state, input, speed);
                }
            }
            self.sensing.insert(id, state);
        }
    }

    fn deliver_outcome(&mut self) -> Option<Outcome> {
        let outcome = self.timer.poll(self.time.elapsed_secs)?;
        self.phase = SessionPhase::Finished;
        info!(?outcome, tick = self.time.tick, "outcome delivered");
        self.events.push(ArenaEvent::OutcomeDelivered { outcome });
        self.callbacks.fire(outcome);
        Some(outcome)
    }

    /// Shared destruction path for every cause. Removes the ship's body,
    /// marks it destroyed and evaluates the outcome. Returns false if the
    /// ship was already destroyed or is unknown.
    pub fn handle_ship_destroyed(&mut self, ship: ShipId, cause: DestructionCause) -> bool {
        let Some(&entity) = self.ships.get(&ship) else {
            return false;
        };
        match self.world.query_one_mut::<(&mut ShipInfo, &mut ShipMotion, &mut Input)>(entity) {
            Ok((info, motion, input)) => {
                if info.lifecycle == ShipLifecycle::Destroyed {
                    return false;
                }
                info.lifecycle = ShipLifecycle::Destroyed;
                motion.velocity = Vec2::ZERO;
                motion.angular_velocity = 0.0;
                *input = Input::idle();
            }
            Err(_) => return false,
        }
        if let Some(body) = self.bodies.remove(&ship) {
            self.physics.remove_body(body);
        }

        info!(ship = %ship, ?cause, tick = self.time.tick, "ship destroyed");
        self.events.push(ArenaEvent::ShipDestroyed { ship, cause });
        self.evaluate_outcome(ship);
        true
    }

    /// Decide the outcome at most once per session.
    fn evaluate_outcome(&mut self, destroyed: ShipId) {
        if self.resolved {
            return;
        }
        let outcome = if destroyed == self.player {
            Outcome::Lost
        } else if !self.any_hostile_alive() {
            Outcome::Won
        } else {
            return;
        };

        self.resolved = true;
        self.outcome = Some(outcome);
        self.phase = SessionPhase::Resolving;
        self.timer.schedule(
            outcome,
            self.time.elapsed_secs,
            self.config.outcome_delay_secs,
        );
        info!(
            ?outcome,
            delay_secs = self.config.outcome_delay_secs,
            "outcome resolved"
        );
        self.events.push(ArenaEvent::OutcomeResolved { outcome });
    }

    /// Whether any living ship still opposes the player.
    fn any_hostile_alive(&self) -> bool {
        let Some(player_team) = self
            .ships
            .get(&self.player)
            .and_then(|&e| self.world.get::<&ShipInfo>(e).ok().map(|info| info.team))
        else {
            return false;
        };
        self.world
            .query::<(&ShipInfo, &Hull)>()
            .iter()
            .any(|(_, (info, hull))| {
                !info.is_player
                    && info.team != player_team
                    && info.lifecycle == ShipLifecycle::Active
                    && !is_wrecked(hull)
            })
    }

    /// Remove a ship from play without damage.
    pub fn destroy_ship(&mut self, ship: ShipId) -> Result<bool, SessionError> {
        self.ensure_ship(ship)?;
        Ok(self.handle_ship_destroyed(ship, DestructionCause::Removed))
    }

    /// Apply damage to one piece of a ship. Returns whether the ship was
    /// destroyed by it.
    pub fn damage_piece(
        &mut self,
        ship: ShipId,
        piece: usize,
        damage: f32,
    ) -> Result<bool, SessionError> {
        let entity = self.ensure_ship(ship)?;
        let wrecked = match self.world.query_one_mut::<(&ShipInfo, &mut Hull)>(entity) {
            Ok((info, hull)) if info.lifecycle == ShipLifecycle::Active => {
                apply_damage(hull, piece, damage, ship, &mut self.events)
            }
            _ => false,
        };
        Ok(wrecked && self.handle_ship_destroyed(ship, DestructionCause::Direct))
    }

    /// Swap the controller flying `ship`, returning the previous one.
    pub fn set_controller(
        &mut self,
        ship: ShipId,
        controller: Controller,
    ) -> Result<Option<Controller>, SessionError> {
        self.ensure_ship(ship)?;
        debug!(ship = %ship, kind = ?controller.kind(), "controller replaced");
        self.sensing.remove(&ship);
        Ok(self.controllers.insert(ship, controller))
    }

    fn ensure_ship(&self, ship: ShipId) -> Result<Entity, SessionError> {
        if self.phase == SessionPhase::Exited {
            return Err(SessionError::Exited);
        }
        self.ships
            .get(&ship)
            .copied()
            .ok_or(SessionError::UnknownShip(ship))
    }

    /// Tear the session down: every body is removed, the pending outcome is
    /// cancelled, and later ticks do nothing.
    pub fn exit(&mut self) {
        if self.phase == SessionPhase::Exited {
            return;
        }
        self.timer.cancel();
        for (_, body) in std::mem::take(&mut self.bodies) {
            self.physics.remove_body(body);
        }
        for body in self.static_bodies.drain(..) {
            self.physics.remove_body(body);
        }
        self.physics.clear();
        self.world.clear();
        self.ships.clear();
        self.controllers.clear();
        self.sensing.clear();
        self.callbacks.clear();
        self.phase = SessionPhase::Exited;
        info!(tick = self.time.tick, outcome = ?self.outcome, "arena session exited");
    }

    pub fn on_won(&mut self, f: impl FnMut() + Send + 'static) {
        self.callbacks.on_won(f);
    }

    pub fn on_lost(&mut self, f: impl FnMut() + Send + 'static) {
        self.callbacks.on_lost(f);
    }

    /// Record the sensing of `ship` every frame from now on.
    pub fn attach_recorder(&mut self, ship: ShipId) -> Result<(), SessionError> {
        self.ensure_ship(ship)?;
        self.recorder = Some(SensingRecorder::new(ship));
        Ok(())
    }

    pub fn take_recorder(&mut self) -> Option<SensingRecorder> {
        self.recorder.take()
    }

    /// Events emitted outside of `tick` (spawns, direct damage) that no
    /// report has carried yet.
    pub fn drain_events(&mut self) -> Vec<ArenaEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Accessors ---

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn bounds(&self) -> ArenaBounds {
        self.config.bounds
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    /// The decided outcome, possibly not yet delivered.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn player_id(&self) -> ShipId {
        self.player
    }

    pub fn ship_ids(&self) -> impl Iterator<Item = ShipId> + '_ {
        self.ships.keys().copied()
    }

    pub fn ship_view(&self, ship: ShipId) -> Option<ShipView> {
        let &entity = self.ships.get(&ship)?;
        let mut query = self
            .world
            .query_one::<(&ShipInfo, &ShipMotion, &Hull)>(entity)
            .ok()?;
        query
            .get()
            .map(|(info, motion, hull)| views::ship_view(info, motion, hull))
    }

    /// Piece HP of a ship, in layout order.
    pub fn piece_hp(&self, ship: ShipId) -> Option<Vec<f32>> {
        let &entity = self.ships.get(&ship)?;
        let hull = self.world.get::<&Hull>(entity).ok()?;
        Some(hull.pieces.iter().map(|p| p.hp).collect())
    }

    /// Latest sensing state of a ship, if it is sensed every frame.
    pub fn sensing(&self, ship: ShipId) -> Option<&SensingState> {
        self.sensing.get(&ship)
    }

    pub fn player_sensing(&self) -> Option<&SensingState> {
        self.sensing(self.player)
    }

    pub fn controller(&self, ship: ShipId) -> Option<&Controller> {
        self.controllers.get(&ship)
    }

    pub fn last_aim_target(&self, ship: ShipId) -> Option<Vec2> {
        self.controllers.get(&ship)?.last_aim_target()
    }

    /// Physics body of a ship that is still in play.
    pub fn body_handle(&self, ship: ShipId) -> Option<BodyHandle> {
        self.bodies.get(&ship).copied()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn physics(&self) -> &PhysicsAdapter {
        &self.physics
    }

    /// Number of projectiles in flight.
    pub fn projectile_count(&self) -> usize {
        self.world.query::<&Projectile>().iter().count()
    }

    /// Overwrite a ship's position and velocity (test and tooling hook).
    pub fn place_ship(
        &mut self,
        ship: ShipId,
        position: Vec2,
        rotation: f32,
        velocity: Vec2,
    ) -> Result<(), SessionError> {
        let entity = self.ensure_ship(ship)?;
        let body = self
            .bodies
            .get(&ship)
            .copied()
            .ok_or(SessionError::UnknownShip(ship))?;
        self.physics
            .set_world_transform(body, WorldTransform { position, angle: rotation })?;
        self.physics.set_world_velocity(
            body,
            WorldVelocity {
                linear: velocity,
                angular: 0.0,
            },
        )?;
        if let Ok(mut motion) = self.world.get::<&mut ShipMotion>(entity) {
            motion.position = position;
            motion.rotation = rotation;
            motion.velocity = velocity;
            motion.angular_velocity = 0.0;
        }
        Ok(())
    }
}

fn projectile_speed(world: &World, entity: Entity) -> Option<f32> {
    let mut query = world.query_one::<(&Hull, &Armament)>(entity).ok()?;
    let (hull, armament) = query.get()?;
    primary_projectile_speed(hull, armament)
}
