//! Gameplay Rules
//!
//! Rules are trusted, co-located plugins that modify simulation outcomes.
//! Every rule implements [`Rule`]; all three hooks have no-op defaults so the
//! engine calls them unconditionally.
//!
//! ## Module Structure
//!
//! - `params`: catalog-driven parameter validation into typed structs
//! - `registry`: type name → factory
//! - `engine`: ordered dispatch over active instances
//! - `idle_damage`, `bullet_bounce`: rule variants

use std::fmt;

use serde_json::{json, Value};

use crate::core::rng::DeterministicRng;
use crate::core::telemetry::Telemetry;
use crate::game::entities::Entities;
use crate::game::events::GameEvent;
use crate::spec::game_spec::GameSpec;

pub mod bullet_bounce;
pub mod engine;
pub mod idle_damage;
pub mod params;
pub mod registry;

pub use engine::{RuleEngine, RuleId};
pub use params::{parse_params, validate_params, CheckedParams, RuleParams};
pub use registry::{RuleFactory, RuleRegistry};

/// Telemetry event every rule emits from its start hook.
pub const RULE_START_EVENT: &str = "rule_start";

/// Generic damage telemetry event.
pub const PLAYER_DAMAGE_EVENT: &str = "player_damage";

/// Player death telemetry event.
pub const PLAYER_DEAD_EVENT: &str = "player_dead";

/// Ephemeral view handed to a rule for one dispatch.
///
/// Built fresh by the host for every `start`, `tick` and `emit`. The borrows
/// make it impossible for a rule to keep it past the call.
pub struct RuleContext<'a> {
    /// Session RNG.
    pub rng: &'a mut DeterministicRng,
    /// Session telemetry.
    pub telemetry: &'a mut Telemetry,
    /// Simulated milliseconds since session start.
    pub game_time: f64,
    /// Active configuration.
    pub spec: &'a GameSpec,
    /// Player, enemies and bullets.
    pub entities: &'a mut Entities,
}

impl fmt::Debug for RuleContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleContext")
            .field("game_time", &self.game_time)
            .field("events", &self.telemetry.count())
            .finish_non_exhaustive()
    }
}

/// A gameplay-modifier plugin.
///
/// Hooks return `anyhow::Result` so a misbehaving rule aborts the dispatch
/// that called it instead of being silently skipped.
pub trait Rule: fmt::Debug {
    /// Registered type name.
    fn kind(&self) -> &'static str;

    /// Validated parameters, as reported in `rule_start`.
    fn params(&self) -> Value;

    /// Called once when the session starts.
    fn on_start(&mut self, _ctx: &mut RuleContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called every frame with the clamped frame step in milliseconds.
    fn on_tick(&mut self, _ctx: &mut RuleContext<'_>, _dt: f64) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called for every dispatched game event.
    fn on_event(&mut self, _ctx: &mut RuleContext<'_>, _event: &GameEvent) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Emit the `rule_start {type, params}` announcement for `rule`.
pub fn announce_start(rule: &dyn Rule, telemetry: &mut Telemetry) {
    telemetry.emit(
        RULE_START_EVENT,
        Some(json!({ "type": rule.kind(), "params": rule.params() })),
    );
}
