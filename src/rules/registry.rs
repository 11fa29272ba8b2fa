//! Rule Registry
//!
//! Explicit type name → factory table. Built once at startup and handed to
//! whoever instantiates rules; there is no global registration.

use std::collections::BTreeMap;

use tracing::debug;

use super::{bullet_bounce, idle_damage, Rule};
use crate::error::RuleError;
use crate::spec::catalog::{CatalogEntry, RuleCatalog};
use crate::spec::game_spec::ParamBag;

/// Constructs a validated rule from its catalog entry and raw params.
pub type RuleFactory = fn(&CatalogEntry, &ParamBag) -> Result<Box<dyn Rule>, RuleError>;

/// Mapping from rule type name to factory.
#[derive(Clone, Debug, Default)]
pub struct RuleRegistry {
    factories: BTreeMap<String, RuleFactory>,
}

impl RuleRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `NoIdleDamage` and `BulletBounce`.
    pub fn with_builtin_rules() -> Self {
        let mut registry = Self::new();
        registry.register(idle_damage::KIND, idle_damage::factory);
        registry.register(bullet_bounce::KIND, bullet_bounce::factory);
        registry
    }

    /// Add or overwrite the factory for `name`.
    pub fn register(&mut self, name: &str, factory: RuleFactory) {
        if self.factories.insert(name.to_string(), factory).is_some() {
            debug!("Rule factory {} replaced", name);
        } else {
            debug!("Rule factory {} registered", name);
        }
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Construct a validated instance of `kind`.
    ///
    /// Fails with `UnknownRuleType` if unregistered, `UncataloguedRuleType`
    /// if the catalog has no schema for it, or the validation error.
    pub fn create(
        &self,
        kind: &str,
        params: &ParamBag,
        catalog: &RuleCatalog,
    ) -> Result<Box<dyn Rule>, RuleError> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| RuleError::UnknownRuleType(kind.to_string()))?;
        let entry = catalog
            .entry(kind)
            .ok_or_else(|| RuleError::UncataloguedRuleType(kind.to_string()))?;
        let rule = factory(entry, params)?;
        debug!("Rule {} created with {}", kind, rule.params());
        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::game_spec::RuleDecl;
    use serde_json::{json, Value};

    fn bag(value: Value) -> ParamBag {
        RuleDecl::new("T", value).params
    }

    #[derive(Debug)]
    struct Inert;

    impl Rule for Inert {
        fn kind(&self) -> &'static str {
            "Inert"
        }

        fn params(&self) -> Value {
            json!({})
        }
    }

    fn inert_factory(_: &CatalogEntry, _: &ParamBag) -> Result<Box<dyn Rule>, RuleError> {
        Ok(Box::new(Inert))
    }

    #[test]
    fn test_builtin_names() {
        let registry = RuleRegistry::with_builtin_rules();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["BulletBounce", "NoIdleDamage"]);
    }

    #[test]
    fn test_unknown_rule_type() {
        let registry = RuleRegistry::with_builtin_rules();
        let err = registry
            .create("Gravity", &bag(json!({})), &RuleCatalog::default())
            .unwrap_err();
        assert_eq!(err, RuleError::UnknownRuleType("Gravity".into()));
    }

    #[test]
    fn test_uncatalogued_rule_type() {
        let mut registry = RuleRegistry::new();
        registry.register("Inert", inert_factory);
        assert!(registry.contains("Inert"));

        let err = registry
            .create("Inert", &bag(json!({})), &RuleCatalog::default())
            .unwrap_err();
        assert_eq!(err, RuleError::UncataloguedRuleType("Inert".into()));

        let mut catalog = RuleCatalog::default();
        catalog.insert("Inert", CatalogEntry::default());
        let rule = registry.create("Inert", &bag(json!({})), &catalog).unwrap();
        assert_eq!(rule.kind(), "Inert");
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = RuleRegistry::with_builtin_rules();
        registry.register(idle_damage::KIND, inert_factory);

        let mut catalog = RuleCatalog::empty();
        catalog.insert("NoIdleDamage", CatalogEntry::default());
        let rule = registry.create("NoIdleDamage", &bag(json!({})), &catalog).unwrap();
        assert_eq!(rule.kind(), "Inert");
    }

    #[test]
    fn test_create_validates() {
        let registry = RuleRegistry::with_builtin_rules();
        let catalog = RuleCatalog::default();

        let rule = registry
            .create("NoIdleDamage", &bag(json!({ "dps": 2, "idleGraceMs": 500 })), &catalog)
            .unwrap();
        assert_eq!(rule.kind(), "NoIdleDamage");

        let err = registry
            .create("BulletBounce", &bag(json!({ "maxBounces": 7 })), &catalog)
            .unwrap_err();
        assert_eq!(err.param_name(), Some("maxBounces"));

        let err = registry.create("BulletBounce", &bag(json!({})), &catalog).unwrap_err();
        assert_eq!(err, RuleError::MissingParam("maxBounces".into()));
    }
}
