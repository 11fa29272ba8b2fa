//! Rule Catalog
//!
//! Per rule type: inclusive numeric ranges for each parameter, and the
//! telemetry events a correctly operating instance must emit at least once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::telemetry::Telemetry;
use crate::rules::bullet_bounce;
use crate::rules::idle_damage;

/// Inclusive `[min, max]` range, serialized as a two-element array.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamRange(pub f64, pub f64);

impl ParamRange {
    /// Lower bound.
    #[inline]
    pub fn min(self) -> f64 {
        self.0
    }

    /// Upper bound.
    #[inline]
    pub fn max(self) -> f64 {
        self.1
    }

    /// Inclusive containment. NaN is never contained.
    #[inline]
    pub fn contains(self, value: f64) -> bool {
        value >= self.0 && value <= self.1
    }
}

/// Schema for one rule type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Declared parameters and their ranges.
    pub params: BTreeMap<String, ParamRange>,
    /// Events the rule type must eventually emit.
    #[serde(rename = "mustEmit", default)]
    pub must_emit: Vec<String>,
}

impl CatalogEntry {
    /// Builder-style parameter declaration.
    pub fn with_param(mut self, name: &str, min: f64, max: f64) -> Self {
        self.params.insert(name.to_string(), ParamRange(min, max));
        self
    }

    /// Builder-style required emission.
    pub fn with_must_emit(mut self, event: &str) -> Self {
        self.must_emit.push(event.to_string());
        self
    }
}

/// Static mapping from rule type to its schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl Default for RuleCatalog {
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            idle_damage::KIND.to_string(),
            CatalogEntry::default()
                .with_param(idle_damage::PARAM_DPS, 0.5, 6.0)
                .with_param(idle_damage::PARAM_GRACE, 0.0, 1500.0)
                .with_must_emit(idle_damage::ONSET_EVENT),
        );
        entries.insert(
            bullet_bounce::KIND.to_string(),
            CatalogEntry::default()
                .with_param(bullet_bounce::PARAM_MAX_BOUNCES, 0.0, 6.0)
                .with_must_emit(bullet_bounce::BOUNCE_EVENT),
        );
        Self { entries }
    }
}

impl RuleCatalog {
    /// Catalog with no entries.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Parse a `{ruleType: {params, mustEmit}}` document.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, kind: impl Into<String>, entry: CatalogEntry) {
        self.entries.insert(kind.into(), entry);
    }

    /// Schema for a rule type.
    pub fn entry(&self, kind: &str) -> Option<&CatalogEntry> {
        self.entries.get(kind)
    }

    /// Catalogued rule type names, sorted.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Required events of `kinds` that never appear in the log.
    ///
    /// Uncatalogued kinds contribute nothing. Each missing event is listed
    /// once even if several kinds require it.
    pub fn unmet_emissions(&self, kinds: &[&str], telemetry: &Telemetry) -> Vec<String> {
        let mut missing: Vec<String> = Vec::new();
        for kind in kinds {
            let Some(entry) = self.entry(kind) else {
                continue;
            };
            for event in &entry.must_emit {
                if !telemetry.has_event(event) && !missing.contains(event) {
                    missing.push(event.clone());
                }
            }
        }
        missing
    }
}
