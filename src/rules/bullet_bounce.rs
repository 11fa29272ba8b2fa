//! Bullet Bounce
//!
//! Gives every fired bullet a bounce budget of `maxBounces` and spends one
//! unit per wall hit. Destroying a bullet whose budget is spent is the
//! collision collaborator's job, not this rule's.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use super::params::{parse_params, CheckedParams, RuleParams};
use super::{announce_start, Rule, RuleContext};
use crate::error::RuleError;
use crate::game::events::GameEvent;
use crate::spec::catalog::CatalogEntry;
use crate::spec::game_spec::ParamBag;

/// Registered type name.
pub const KIND: &str = "BulletBounce";

/// Bounce budget parameter.
pub const PARAM_MAX_BOUNCES: &str = "maxBounces";

/// Emitted on every bounce with the budget left afterwards.
pub const BOUNCE_EVENT: &str = "rule_effect:bullet_bounce";

/// Validated parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletBounceParams {
    /// Wall reflections each bullet may make.
    pub max_bounces: u32,
}

impl RuleParams for BulletBounceParams {
    fn from_checked(checked: &CheckedParams) -> Result<Self, RuleError> {
        // Range-checked non-negative; fractions truncate.
        Ok(Self {
            max_bounces: checked.get(PARAM_MAX_BOUNCES)? as u32,
        })
    }
}

/// Bullet-bounce rule instance. Holds no per-bullet state.
#[derive(Debug)]
pub struct BulletBounce {
    params: BulletBounceParams,
}

impl BulletBounce {
    /// Validate `params` against `entry` and build the rule.
    pub fn from_params(entry: &CatalogEntry, params: &ParamBag) -> Result<Self, RuleError> {
        Ok(Self {
            params: parse_params(params, entry)?,
        })
    }

    /// Typed parameters.
    pub fn typed_params(&self) -> BulletBounceParams {
        self.params
    }
}

/// Registry factory.
pub fn factory(entry: &CatalogEntry, params: &ParamBag) -> Result<Box<dyn Rule>, RuleError> {
    Ok(Box::new(BulletBounce::from_params(entry, params)?))
}

impl Rule for BulletBounce {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn params(&self) -> Value {
        json!(self.params)
    }

    fn on_start(&mut self, ctx: &mut RuleContext<'_>) -> anyhow::Result<()> {
        announce_start(self, ctx.telemetry);
        Ok(())
    }

    fn on_event(&mut self, ctx: &mut RuleContext<'_>, event: &GameEvent) -> anyhow::Result<()> {
        match event {
            GameEvent::BulletFired { bullet } => {
                if let Some(b) = ctx.entities.bullet_mut(*bullet) {
                    b.bounces_remaining = self.params.max_bounces;
                }
            }
            GameEvent::BulletHitWall { bullet } => {
                let Some(b) = ctx.entities.bullet_mut(*bullet) else {
                    return Ok(());
                };
                if b.bounces_remaining == 0 {
                    return Ok(());
                }
                b.bounces_remaining -= 1;
                let remaining = b.bounces_remaining;
                debug!("Bullet {} bounced, {} left", bullet.0, remaining);
                ctx.telemetry.emit(BOUNCE_EVENT, Some(json!({ "remaining": remaining })));
            }
            _ => {}
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
