//! Spec & Catalog Loader
//!
//! The built-in [`GameSpec::default`] is the single source of defaults.
//! Overrides replace whole top-level keys; nested objects are never merged.

use serde_json::Value;

use super::catalog::RuleCatalog;
use super::game_spec::GameSpec;
use crate::core::hash::{rolling_hash, signed_hex};
use crate::error::SpecError;

/// Produce a complete spec by shallow-merging `overrides` over the default.
///
/// A top-level key present in `overrides` fully replaces the default value
/// for that key, so `{"player": {"hp": 5}}` must carry every player field.
pub fn load_spec(overrides: Option<&Value>) -> Result<GameSpec, SpecError> {
    let base = GameSpec::default();
    let Some(overrides) = overrides else {
        return Ok(base);
    };
    let Value::Object(patch) = overrides else {
        return Err(SpecError::OverridesNotObject(json_kind(overrides)));
    };

    let mut doc = serde_json::to_value(&base)?;
    if let Value::Object(fields) = &mut doc {
        for (key, value) in patch {
            fields.insert(key.clone(), value.clone());
        }
    }
    Ok(serde_json::from_value(doc)?)
}

/// Parse overrides from JSON text, then [`load_spec`].
pub fn load_spec_str(text: &str) -> Result<GameSpec, SpecError> {
    let overrides: Value = serde_json::from_str(text)?;
    load_spec(Some(&overrides))
}

/// The static rule catalog.
pub fn load_rules_catalog() -> RuleCatalog {
    RuleCatalog::default()
}

/// Cheap change-detection hash over the canonical JSON of `spec`.
///
/// Rendered in base 16 with a leading minus for negative values.
pub fn spec_hash(spec: &GameSpec) -> serde_json::Result<String> {
    let canonical = serde_json::to_string(spec)?;
    Ok(signed_hex(rolling_hash(&canonical)))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
