//! Idle Damage
//!
//! Punishes standing still: after `idleGraceMs` without movement the player
//! takes `dps` damage per second, applied per tick as `dps * dt / 1000`.

use serde::Serialize;
use serde_json::{json, Value};

use super::params::{parse_params, CheckedParams, RuleParams};
use super::{announce_start, Rule, RuleContext, PLAYER_DAMAGE_EVENT, PLAYER_DEAD_EVENT};
use crate::error::RuleError;
use crate::game::events::GameEvent;
use crate::spec::catalog::CatalogEntry;
use crate::spec::game_spec::ParamBag;

/// Registered type name.
pub const KIND: &str = "NoIdleDamage";

/// Damage per second parameter.
pub const PARAM_DPS: &str = "dps";

/// Grace period parameter (ms).
pub const PARAM_GRACE: &str = "idleGraceMs";

/// Emitted once at the start of each idle episode.
pub const ONSET_EVENT: &str = "rule_effect:idle_damage";

/// Validated parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdleDamageParams {
    /// Damage per second while idle.
    pub dps: f64,
    /// Idle time tolerated before damage starts.
    pub idle_grace_ms: f64,
}

impl RuleParams for IdleDamageParams {
    fn from_checked(checked: &CheckedParams) -> Result<Self, RuleError> {
        Ok(Self {
            dps: checked.get(PARAM_DPS)?,
            idle_grace_ms: checked.get(PARAM_GRACE)?,
        })
    }
}

/// Idle-damage rule instance.
#[derive(Debug)]
pub struct NoIdleDamage {
    params: IdleDamageParams,
    last_move_time: f64,
    idle_armed: bool,
}

impl NoIdleDamage {
    /// Validate `params` against `entry` and build the rule.
    pub fn from_params(entry: &CatalogEntry, params: &ParamBag) -> Result<Self, RuleError> {
        Ok(Self {
            params: parse_params(params, entry)?,
            last_move_time: 0.0,
            idle_armed: false,
        })
    }

    /// Typed parameters.
    pub fn typed_params(&self) -> IdleDamageParams {
        self.params
    }

    /// Whether the current idle episode has started dealing damage.
    pub fn is_armed(&self) -> bool {
        self.idle_armed
    }

    fn reset_idle(&mut self, now: f64) {
        self.last_move_time = now;
        self.idle_armed = false;
    }
}

/// Registry factory.
pub fn factory(entry: &CatalogEntry, params: &ParamBag) -> Result<Box<dyn Rule>, RuleError> {
    Ok(Box::new(NoIdleDamage::from_params(entry, params)?))
}

impl Rule for NoIdleDamage {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn params(&self) -> Value {
        json!(self.params)
    }

    fn on_start(&mut self, ctx: &mut RuleContext<'_>) -> anyhow::Result<()> {
        self.reset_idle(ctx.game_time);
        announce_start(self, ctx.telemetry);
        Ok(())
    }

    fn on_tick(&mut self, ctx: &mut RuleContext<'_>, dt: f64) -> anyhow::Result<()> {
        let player = &mut ctx.entities.player;
        if player.is_defeated() {
            return Ok(());
        }

        if player.is_moving {
            self.reset_idle(ctx.game_time);
            return Ok(());
        }

        if ctx.game_time - self.last_move_time <= self.params.idle_grace_ms {
            return Ok(());
        }

        if !self.idle_armed {
            self.idle_armed = true;
            ctx.telemetry.emit(
                ONSET_EVENT,
                Some(json!({ "dps": self.params.dps, "idleGraceMs": self.params.idle_grace_ms })),
            );
        }

        let damage = self.params.dps * (dt / 1000.0);
        player.hp -= damage;
        ctx.telemetry.emit(
            PLAYER_DAMAGE_EVENT,
            Some(json!({ "amount": damage, "reason": "idle" })),
        );
        if player.is_defeated() {
            ctx.telemetry.emit(PLAYER_DEAD_EVENT, Some(json!({ "reason": "idle_damage" })));
        }
        Ok(())
    }

    fn on_event(&mut self, ctx: &mut RuleContext<'_>, event: &GameEvent) -> anyhow::Result<()> {
        if let GameEvent::PlayerMoved = event {
            self.reset_idle(ctx.game_time);
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::DeterministicRng;
    use crate::core::telemetry::Telemetry;
    use crate::game::entities::{Entities, Player};
    use crate::spec::catalog::RuleCatalog;
    use crate::spec::game_spec::{GameSpec, RuleDecl};

    struct Harness {
        rule: NoIdleDamage,
        rng: DeterministicRng,
        telemetry: Telemetry,
        spec: GameSpec,
        entities: Entities,
        time: f64,
    }

    impl Harness {
        fn new(dps: f64, grace: f64) -> Self {
            let catalog = RuleCatalog::default();
            let decl = RuleDecl::new(KIND, json!({ "dps": dps, "idleGraceMs": grace }));
            let rule = NoIdleDamage::from_params(catalog.entry(KIND).unwrap(), &decl.params).unwrap();
            let spec = GameSpec::default();
            let entities = Entities::new(Player::from_spec(&spec.player, 480.0, 270.0));
            let mut harness = Self {
                rule,
                rng: DeterministicRng::new(1),
                telemetry: Telemetry::new(),
                spec,
                entities,
                time: 0.0,
            };
            harness.telemetry.start();
            harness.with_ctx(|rule, ctx| rule.on_start(ctx)).unwrap();
            harness
        }

        fn with_ctx<R>(&mut self, f: impl FnOnce(&mut NoIdleDamage, &mut RuleContext<'_>) -> R) -> R {
            let mut ctx = RuleContext {
                rng: &mut self.rng,
                telemetry: &mut self.telemetry,
                game_time: self.time,
                spec: &self.spec,
                entities: &mut self.entities,
            };
            f(&mut self.rule, &mut ctx)
        }

        fn step(&mut self, dt: f64, moving: bool) {
            self.time += dt;
            self.telemetry.advance_to(self.time);
            self.entities.player.is_moving = moving;
            self.with_ctx(|rule, ctx| rule.on_tick(ctx, dt)).unwrap();
        }

        fn count(&self, name: &str) -> usize {
            self.telemetry.events_named(name).count()
        }
    }

    #[test]
    fn test_rule_start_announcement() {
        let h = Harness::new(1.4, 700.0);
        let dump = h.telemetry.dump();
        let start = &dump.events[0];
        assert_eq!(start.event, "rule_start");
        assert_eq!(
            start.data,
            Some(json!({ "type": "NoIdleDamage", "params": { "dps": 1.4, "idleGraceMs": 700.0 } }))
        );
    }

    #[test]
    fn test_no_damage_within_grace() {
        let mut h = Harness::new(2.0, 500.0);
        for _ in 0..10 {
            h.step(50.0, false);
        }
        assert_eq!(h.time, 500.0);
        assert_eq!(h.count(ONSET_EVENT), 0);
        assert_eq!(h.entities.player.hp, 100.0);
    }

    #[test]
    fn test_onset_once_per_episode() {
        let mut h = Harness::new(2.0, 100.0);
        for _ in 0..10 {
            h.step(50.0, false);
        }
        assert_eq!(h.count(ONSET_EVENT), 1);
        assert!(h.rule.is_armed());

        // Movement ends the episode
        h.step(50.0, true);
        assert!(!h.rule.is_armed());
        for _ in 0..10 {
            h.step(50.0, false);
        }
        assert_eq!(h.count(ONSET_EVENT), 2);
    }

    #[test]
    fn test_damage_is_sum_of_ticks() {
        let mut h = Harness::new(2.0, 100.0);
        for dt in [16.0, 33.0, 50.0, 20.0, 41.0, 17.0, 50.0] {
            h.step(dt, false);
        }
        let total: f64 = h
            .telemetry
            .events_named(PLAYER_DAMAGE_EVENT)
            .map(|e| e.data.as_ref().unwrap()["amount"].as_f64().unwrap())
            .sum();
        assert!((100.0 - h.entities.player.hp - total).abs() < 1e-9);
        // Ticks ending at 119, 160, 177 and 227 are past the grace
        assert!((total - 2.0 * (20.0 + 41.0 + 17.0 + 50.0) / 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_player_moved_event_resets_idle() {
        let mut h = Harness::new(2.0, 100.0);
        for _ in 0..3 {
            h.step(50.0, false);
        }
        assert_eq!(h.count(ONSET_EVENT), 1);

        h.with_ctx(|rule, ctx| rule.on_event(ctx, &GameEvent::PlayerMoved))
            .unwrap();
        assert!(!h.rule.is_armed());

        // Grace restarts from the event time
        let hp = h.entities.player.hp;
        h.step(50.0, false);
        h.step(50.0, false);
        assert_eq!(h.entities.player.hp, hp);
        h.step(50.0, false);
        assert_eq!(h.count(ONSET_EVENT), 2);
    }

    #[test]
    fn test_death_and_silence_after() {
        let mut h = Harness::new(6.0, 0.0);
        h.entities.player.hp = 0.2;
        h.step(20.0, false); // 0.12 damage
        assert_eq!(h.count("player_dead"), 0);
        h.step(20.0, false); // crosses zero
        assert_eq!(h.count("player_dead"), 1);

        let events = h.telemetry.count();
        h.step(50.0, false);
        assert_eq!(h.telemetry.count(), events);
    }
}
