//! Headless Session
//!
//! The host-side loop that owns all session state and drives the rule
//! engine: one `frame` per rendered frame, one callback per collision the
//! physics collaborator reports. Also exposes the control surface an
//! automated test driver uses (reload, reseed, bot mode, telemetry, force
//! end).
//!
//! Positions are never integrated here; physics belongs to the host.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::core::hash::{hash_with_domain, Digest32, STATE_DOMAIN};
use crate::core::rng::DeterministicRng;
use crate::core::telemetry::{Telemetry, TelemetryDump};
use crate::error::{SessionError, SpecError};
use crate::game::entities::{BulletId, EnemyId, Entities, Player};
use crate::game::events::GameEvent;
use crate::rules::{RuleContext, RuleEngine, RuleRegistry, PLAYER_DAMAGE_EVENT, PLAYER_DEAD_EVENT};
use crate::spec::catalog::RuleCatalog;
use crate::spec::game_spec::{GameSpec, SURVIVE_TIME};
use crate::spec::loader::{load_rules_catalog, load_spec, spec_hash};

/// Telemetry event opening every session.
pub const SESSION_START_EVENT: &str = "session_start";
/// Telemetry event for each enemy wave.
pub const ENEMY_SPAWN_EVENT: &str = "enemy_spawn";
/// Telemetry event for each kill.
pub const ENEMY_KILLED_EVENT: &str = "enemy_killed";

/// Host-loop tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Upper bound on a single frame step (ms).
    pub max_frame_ms: f64,
    /// Arena wall thickness (px).
    pub wall_thickness: f64,
    /// Spawn distance from the inner wall edge (px).
    pub spawn_margin: f64,
    /// Damage per enemy contact.
    pub contact_damage: f64,
    /// Per-enemy cooldown between contact hits (ms).
    pub contact_cooldown_ms: f64,
    /// Bot retarget countdown decrement per frame (ms).
    pub bot_step_ms: f64,
    /// Minimum bot retarget interval (ms).
    pub bot_retarget_base_ms: f64,
    /// Random extra retarget interval, drawn from [0, this) (ms).
    pub bot_retarget_jitter_ms: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_frame_ms: 50.0,
            wall_thickness: 32.0,
            spawn_margin: 20.0,
            contact_damage: 10.0,
            contact_cooldown_ms: 1000.0,
            bot_step_ms: 16.0,
            bot_retarget_base_ms: 500.0,
            bot_retarget_jitter_ms: 1000.0,
        }
    }
}

/// Terminal result of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Win condition met.
    Win,
    /// Player defeated.
    Lose,
}

impl Outcome {
    /// Telemetry event name.
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Lose => "lose",
        }
    }

    fn reason(self) -> &'static str {
        match self {
            Outcome::Win => "survived",
            Outcome::Lose => "died",
        }
    }
}

/// Player input for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Horizontal direction (-1, 0, 1).
    pub move_x: i8,
    /// Vertical direction (-1, 0, 1).
    pub move_y: i8,
    /// Fire at this angle (radians) this frame.
    pub fire_angle: Option<f64>,
}

impl FrameInput {
    /// No movement, no fire.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Movement only.
    pub fn with_movement(move_x: i8, move_y: i8) -> Self {
        Self {
            move_x,
            move_y,
            fire_angle: None,
        }
    }

    /// Whether any direction is held.
    pub fn is_moving(&self) -> bool {
        self.move_x != 0 || self.move_y != 0
    }
}

/// One play session.
#[derive(Debug)]
pub struct Session {
    spec: GameSpec,
    config: SessionConfig,
    registry: RuleRegistry,
    catalog: RuleCatalog,
    rng: DeterministicRng,
    telemetry: Telemetry,
    engine: RuleEngine,
    entities: Entities,
    game_time: f64,
    clock_ms: f64,
    spawn_timer: f64,
    bot_mode: bool,
    bot_timer: f64,
    started: bool,
    outcome: Option<Outcome>,
}

impl Session {
    /// Session with the built-in rules and catalog. Call [`Session::start`].
    pub fn new(spec: GameSpec, config: SessionConfig) -> Self {
        Self::with_rules(spec, config, RuleRegistry::with_builtin_rules(), load_rules_catalog())
    }

    /// Session with a custom registry and catalog.
    pub fn with_rules(
        spec: GameSpec,
        config: SessionConfig,
        registry: RuleRegistry,
        catalog: RuleCatalog,
    ) -> Self {
        let rng = DeterministicRng::new(spec.seed);
        let entities = Entities::new(spawn_player(&spec));
        Self {
            spec,
            config,
            registry,
            catalog,
            rng,
            telemetry: Telemetry::new(),
            engine: RuleEngine::new(),
            entities,
            game_time: 0.0,
            clock_ms: 0.0,
            spawn_timer: 0.0,
            bot_mode: false,
            bot_timer: 0.0,
            started: false,
            outcome: None,
        }
    }

    /// Reset to the spec's initial state and start the session.
    ///
    /// Fails without starting if any declared rule is invalid or a start
    /// hook fails.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.started = false;
        self.outcome = None;
        self.engine.clear();
        self.entities = Entities::new(spawn_player(&self.spec));
        self.rng.seed(self.spec.seed);
        self.game_time = 0.0;
        self.spawn_timer = 0.0;
        self.bot_timer = 0.0;

        self.telemetry.start();
        let hash = spec_hash(&self.spec).map_err(SpecError::from)?;
        self.telemetry.emit(
            SESSION_START_EVENT,
            Some(json!({ "seed": self.spec.seed, "specHash": hash.as_str() })),
        );

        self.engine
            .instantiate(&self.spec, &self.registry, &self.catalog)?;
        let mut ctx = RuleContext {
            rng: &mut self.rng,
            telemetry: &mut self.telemetry,
            game_time: self.game_time,
            spec: &self.spec,
            entities: &mut self.entities,
        };
        self.engine.start(&mut ctx)?;

        self.spawn_enemies();
        self.started = true;
        info!(
            "Session started: seed {} spec {} rules {:?}",
            self.spec.seed,
            hash,
            self.engine.kinds()
        );
        Ok(())
    }

    /// Advance one frame by `delta_ms`, clamped to the configured maximum.
    pub fn frame(&mut self, delta_ms: f64, input: FrameInput) -> Result<(), SessionError> {
        if !self.is_running() {
            warn!("Frame ignored: session not running");
            return Ok(());
        }

        // NaN or negative bounds collapse to a zero step
        let dt = delta_ms.max(0.0).min(self.config.max_frame_ms.max(0.0));
        self.game_time += dt;
        self.clock_ms += dt;
        self.telemetry.advance_to(self.clock_ms);

        if self.bot_mode {
            self.update_bot()?;
        } else {
            self.apply_input(input)?;
        }

        let mut ctx = RuleContext {
            rng: &mut self.rng,
            telemetry: &mut self.telemetry,
            game_time: self.game_time,
            spec: &self.spec,
            entities: &mut self.entities,
        };
        self.engine.tick(&mut ctx, dt)?;

        self.spawn_timer += dt;
        if self.spawn_timer >= self.spec.enemies.spawn.every_seconds * 1000.0 {
            self.spawn_timer = 0.0;
            self.spawn_enemies();
        }

        if self.spec.win_condition.kind == SURVIVE_TIME
            && self.game_time >= self.spec.win_condition.params.seconds * 1000.0
        {
            self.end(Outcome::Win);
        }
        if self.entities.player.is_defeated() {
            self.end(Outcome::Lose);
        }
        Ok(())
    }

    /// Dispatch a game event to every rule with a fresh context.
    ///
    /// Ignored unless the session is running.
    pub fn emit(&mut self, event: GameEvent) -> Result<(), SessionError> {
        if !self.is_running() {
            return Ok(());
        }
        let mut ctx = RuleContext {
            rng: &mut self.rng,
            telemetry: &mut self.telemetry,
            game_time: self.game_time,
            spec: &self.spec,
            entities: &mut self.entities,
        };
        self.engine.emit(&mut ctx, &event)?;
        Ok(())
    }

    // =========================================================================
    // HOST CALLBACKS
    // =========================================================================

    /// Fire a bullet from the player at `angle` (radians).
    ///
    /// Returns `None` once the session has ended.
    pub fn fire(&mut self, angle: f64) -> Result<Option<BulletId>, SessionError> {
        if !self.is_running() {
            return Ok(None);
        }
        let player = &mut self.entities.player;
        player.last_fired_ms = self.game_time;
        let speed = player.weapon.bullet_speed;
        let (x, y, damage) = (player.x, player.y, player.weapon.damage);
        let id = self
            .entities
            .spawn_bullet(x, y, angle.cos() * speed, angle.sin() * speed, damage);
        self.emit(GameEvent::BulletFired { bullet: id })?;
        Ok(Some(id))
    }

    /// A bullet reached a wall.
    ///
    /// Rules see the hit while the bullet has budget; a spent bullet is
    /// destroyed instead.
    pub fn bullet_hit_wall(&mut self, bullet: BulletId) -> Result<(), SessionError> {
        if !self.is_running() {
            return Ok(());
        }
        let Some(remaining) = self.entities.bullet(bullet).map(|b| b.bounces_remaining) else {
            return Ok(());
        };
        if remaining > 0 {
            self.emit(GameEvent::BulletHitWall { bullet })?;
        } else {
            self.entities.remove_bullet(bullet);
            debug!("Bullet {} destroyed at wall", bullet.0);
        }
        Ok(())
    }

    /// A bullet struck an enemy. The bullet is always consumed.
    pub fn bullet_hit_enemy(&mut self, bullet: BulletId, enemy: EnemyId) {
        if !self.is_running() {
            return;
        }
        let Some(b) = self.entities.remove_bullet(bullet) else {
            return;
        };
        let Some(e) = self.entities.enemy_mut(enemy) else {
            return;
        };
        e.hp -= b.damage;
        if e.hp <= 0.0 {
            if let Some(dead) = self.entities.remove_enemy(enemy) {
                self.telemetry.emit(
                    ENEMY_KILLED_EVENT,
                    Some(json!({ "enemyType": dead.template_id })),
                );
            }
        }
    }

    /// An enemy touched the player.
    pub fn enemy_contact(&mut self, enemy: EnemyId) {
        if !self.is_running() {
            return;
        }
        let now = self.game_time;
        let cooldown = self.config.contact_cooldown_ms;
        let Some(e) = self.entities.enemy_mut(enemy) else {
            return;
        };
        if !e.can_damage(now, cooldown) {
            return;
        }
        e.last_contact_ms = Some(now);

        let amount = self.config.contact_damage;
        self.entities.player.hp -= amount;
        self.telemetry.emit(
            PLAYER_DAMAGE_EVENT,
            Some(json!({ "amount": amount, "reason": "enemy_contact" })),
        );
        if self.entities.player.is_defeated() {
            self.telemetry
                .emit(PLAYER_DEAD_EVENT, Some(json!({ "reason": "enemy_contact" })));
            self.end(Outcome::Lose);
        }
    }

    // =========================================================================
    // CONTROL SURFACE
    // =========================================================================

    /// Replace the active spec (default + `overrides`) and restart.
    pub fn reload(&mut self, overrides: Option<&Value>) -> Result<(), SessionError> {
        let spec = load_spec(overrides)?;
        info!("Reloading session spec (seed {})", spec.seed);
        self.spec = spec;
        self.start()
    }

    /// Reseed the live RNG. Affects every draw from now on.
    ///
    /// Lasts only until the next [`Session::start`] or [`Session::reload`],
    /// which reseed from the spec.
    pub fn set_seed(&mut self, seed: u64) {
        debug!("RNG reseeded to {}", seed);
        self.rng.seed(seed);
    }

    /// Toggle autonomous play.
    pub fn set_bot_mode(&mut self, enabled: bool) {
        self.bot_mode = enabled;
        self.bot_timer = 0.0;
    }

    /// Copy of the telemetry log.
    pub fn telemetry_dump(&self) -> TelemetryDump {
        self.telemetry.dump()
    }

    /// End the session immediately. No-op if already ended.
    pub fn force_end(&mut self, outcome: Outcome) {
        self.end(outcome);
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Active spec.
    pub fn spec(&self) -> &GameSpec {
        &self.spec
    }

    /// Entity snapshot.
    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    /// Entity snapshot, for the host's physics collaborator.
    pub fn entities_mut(&mut self) -> &mut Entities {
        &mut self.entities
    }

    /// Telemetry log.
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Rule engine.
    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// Catalog in use.
    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Simulated milliseconds since start.
    pub fn game_time(&self) -> f64 {
        self.game_time
    }

    /// Terminal result, once reached.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Started and not yet ended.
    pub fn is_running(&self) -> bool {
        self.started && self.outcome.is_none()
    }

    /// Whether autonomous play is on.
    pub fn bot_mode(&self) -> bool {
        self.bot_mode
    }

    /// Binary snapshot of entity numeric state.
    pub fn state_bytes(&self) -> bincode::Result<Vec<u8>> {
        self.entities.snapshot_bytes()
    }

    /// SHA-256 over [`Session::state_bytes`].
    pub fn state_digest(&self) -> bincode::Result<Digest32> {
        Ok(hash_with_domain(STATE_DOMAIN, &self.state_bytes()?))
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn end(&mut self, outcome: Outcome) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(outcome);
        self.telemetry
            .emit(outcome.as_str(), Some(json!({ "reason": outcome.reason() })));
        self.entities.player.halt();
        info!("Session ended: {} at {:.0} ms", outcome.as_str(), self.game_time);
    }

    fn apply_input(&mut self, input: FrameInput) -> Result<(), SessionError> {
        let was_moving = self.entities.player.is_moving;
        let player = &mut self.entities.player;
        let (mut vx, mut vy) = (f64::from(input.move_x.signum()), f64::from(input.move_y.signum()));
        if input.is_moving() {
            let len = (vx * vx + vy * vy).sqrt();
            vx /= len;
            vy /= len;
        }
        let speed = player.speed;
        player.set_velocity(vx * speed, vy * speed);

        if input.is_moving() && !was_moving {
            self.emit(GameEvent::PlayerMoved)?;
        }
        if let Some(angle) = input.fire_angle {
            self.fire(angle)?;
        }
        Ok(())
    }

    fn update_bot(&mut self) -> Result<(), SessionError> {
        self.bot_timer -= self.config.bot_step_ms;
        if self.bot_timer <= 0.0 {
            self.bot_timer = self.config.bot_retarget_base_ms
                + self.rng.next_float(0.0, self.config.bot_retarget_jitter_ms);
            let angle = self.rng.next_float(0.0, TAU);
            let player = &mut self.entities.player;
            let speed = player.speed;
            player.set_velocity(angle.cos() * speed, angle.sin() * speed);
        }

        if self.entities.player.can_fire(self.game_time) {
            let target = self.entities.nearest_enemy().map(|e| (e.x, e.y));
            if let Some((ex, ey)) = target {
                let player = &self.entities.player;
                let angle = (ey - player.y).atan2(ex - player.x);
                self.fire(angle)?;
            }
        }
        Ok(())
    }

    fn spawn_enemies(&mut self) {
        let Some(template) = self.spec.enemies.templates.first() else {
            warn!("Enemy wave skipped: spec has no enemy templates");
            return;
        };
        let count = self.spec.enemies.spawn.count;
        let (w, h) = (self.spec.arena.width, self.spec.arena.height);
        let inset = self.config.wall_thickness + self.config.spawn_margin;

        for _ in 0..count {
            let (x, y) = match self.rng.next_int(0, 3) {
                0 => (self.rng.next_float(inset, w - inset), inset),
                1 => (self.rng.next_float(inset, w - inset), h - inset),
                2 => (inset, self.rng.next_float(inset, h - inset)),
                _ => (w - inset, self.rng.next_float(inset, h - inset)),
            };
            self.entities.spawn_enemy(template, x, y);
        }
        self.telemetry
            .emit(ENEMY_SPAWN_EVENT, Some(json!({ "count": count })));
    }
}

fn spawn_player(spec: &GameSpec) -> Player {
    Player::from_spec(&spec.player, spec.arena.width / 2.0, spec.arena.height / 2.0)
}

// =============================================================================
// TESTS
// =============================================================================
