//! Parameter Validation
//!
//! One range-validating parser, driven by a catalog entry, feeds every
//! rule's typed parameter struct.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::RuleError;
use crate::spec::catalog::CatalogEntry;
use crate::spec::game_spec::ParamBag;

/// Declared parameters that passed validation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CheckedParams {
    values: BTreeMap<String, f64>,
}

impl CheckedParams {
    /// Value of a validated parameter.
    ///
    /// Fails with `MissingParam` when the catalog entry never declared it.
    pub fn get(&self, name: &str) -> Result<f64, RuleError> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| RuleError::MissingParam(name.to_string()))
    }

    /// Number of validated parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// No parameters were declared.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Typed parameters for one rule variant.
pub trait RuleParams: Sized {
    /// Build from validated values.
    fn from_checked(checked: &CheckedParams) -> Result<Self, RuleError>;
}

/// Check every declared parameter of `entry` against `params`.
///
/// Absent or null values fail with `MissingParam`; non-numeric or
/// out-of-range values fail with `ParamOutOfRange`. Both bounds are
/// inclusive. Undeclared extras are ignored.
pub fn validate_params(params: &ParamBag, entry: &CatalogEntry) -> Result<CheckedParams, RuleError> {
    let mut values = BTreeMap::new();
    for (name, range) in &entry.params {
        let value = match params.get(name) {
            None | Some(Value::Null) => return Err(RuleError::MissingParam(name.clone())),
            Some(value) => value,
        };
        match value.as_f64() {
            Some(number) if range.contains(number) => {
                values.insert(name.clone(), number);
            }
            _ => {
                return Err(RuleError::ParamOutOfRange {
                    name: name.clone(),
                    min: range.min(),
                    max: range.max(),
                    got: value.to_string(),
                })
            }
        }
    }
    Ok(CheckedParams { values })
}

/// Validate `params` against `entry`, then build the typed struct.
pub fn parse_params<P: RuleParams>(params: &ParamBag, entry: &CatalogEntry) -> Result<P, RuleError> {
    P::from_checked(&validate_params(params, entry)?)
}
