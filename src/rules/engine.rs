//! Rule Engine
//!
//! Owns the active rule instances and dispatches lifecycle hooks in
//! declaration order. A rule that depends on another rule's mutation in the
//! same frame sees it only if declared later.
//!
//! Hook failures are not caught: the first error aborts the dispatch and the
//! remaining rules are not called for that start/tick/event.

use anyhow::Context;

use super::registry::RuleRegistry;
use super::{Rule, RuleContext};
use crate::error::RuleError;
use crate::game::events::GameEvent;
use crate::spec::catalog::RuleCatalog;
use crate::spec::game_spec::GameSpec;

/// Stable handle to an active rule. Never reused within one engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(usize);

impl RuleId {
    /// Insertion index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Ordered collection of active rules.
///
/// Removal leaves a tombstone so ids and relative order never shift.
#[derive(Debug, Default)]
pub struct RuleEngine {
    slots: Vec<Option<Box<dyn Rule>>>,
}

impl RuleEngine {
    /// Engine with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule after every existing one.
    pub fn add_rule(&mut self, rule: Box<dyn Rule>) -> RuleId {
        self.slots.push(Some(rule));
        RuleId(self.slots.len() - 1)
    }

    /// Remove a rule, keeping every other id valid.
    pub fn remove_rule(&mut self, id: RuleId) -> Option<Box<dyn Rule>> {
        self.slots.get_mut(id.0).and_then(Option::take)
    }

    /// Look up an active rule.
    pub fn get(&self, id: RuleId) -> Option<&dyn Rule> {
        self.slots.get(id.0).and_then(|slot| slot.as_deref())
    }

    /// Drop every rule. Ids restart from zero.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Number of active rules.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// No active rules.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Active rule types in dispatch order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.active().map(|rule| rule.kind()).collect()
    }

    /// Instantiate every rule declared in `spec`, in order.
    ///
    /// All-or-nothing: if any declaration fails, no rule is added.
    pub fn instantiate(
        &mut self,
        spec: &GameSpec,
        registry: &RuleRegistry,
        catalog: &RuleCatalog,
    ) -> Result<Vec<RuleId>, RuleError> {
        let rules = spec
            .rules
            .iter()
            .map(|decl| registry.create(&decl.kind, &decl.params, catalog))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rules.into_iter().map(|rule| self.add_rule(rule)).collect())
    }

    /// Run every start hook.
    pub fn start(&mut self, ctx: &mut RuleContext<'_>) -> anyhow::Result<()> {
        for rule in self.active_mut() {
            let kind = rule.kind();
            #[cfg(feature = "debug-tracing")]
            tracing::trace!(rule = kind, "start");
            rule.on_start(ctx).with_context(|| format!("{kind} start hook failed"))?;
        }
        Ok(())
    }

    /// Run every tick hook with the clamped frame step `dt` (ms).
    pub fn tick(&mut self, ctx: &mut RuleContext<'_>, dt: f64) -> anyhow::Result<()> {
        for rule in self.active_mut() {
            let kind = rule.kind();
            #[cfg(feature = "debug-tracing")]
            tracing::trace!(rule = kind, dt, "tick");
            rule.on_tick(ctx, dt).with_context(|| format!("{kind} tick hook failed"))?;
        }
        Ok(())
    }

    /// Run every event hook for `event`.
    pub fn emit(&mut self, ctx: &mut RuleContext<'_>, event: &GameEvent) -> anyhow::Result<()> {
        for rule in self.active_mut() {
            let kind = rule.kind();
            #[cfg(feature = "debug-tracing")]
            tracing::trace!(rule = kind, event = event.name(), "event");
            rule.on_event(ctx, event)
                .with_context(|| format!("{kind} {} hook failed", event.name()))?;
        }
        Ok(())
    }

    fn active(&self) -> impl Iterator<Item = &dyn Rule> {
        self.slots.iter().filter_map(|slot| slot.as_deref())
    }

    fn active_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Rule>> {
        self.slots.iter_mut().flatten()
    }
}

// =============================================================================
// TESTS
// =============================================================================
