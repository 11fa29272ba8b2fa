//! Error types.
//!
//! Construction-time failures are typed and fatal to session bootstrap.
//! Failures raised inside rule hooks are `anyhow::Error` and propagate
//! uncaught out of the dispatch that hit them.

use thiserror::Error;

/// Rule registry and parameter validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    /// Requested type is not in the registry.
    #[error("UnknownRuleType:{0}")]
    UnknownRuleType(String),

    /// Registered type has no catalog entry to validate against.
    #[error("UncataloguedRuleType:{0}")]
    UncataloguedRuleType(String),

    /// Declared parameter absent (or null).
    #[error("MissingParam:{0}")]
    MissingParam(String),

    /// Parameter present but non-numeric or outside its inclusive range.
    #[error("ParamOutOfRange:{name} must be in [{min}, {max}], got {got}")]
    ParamOutOfRange {
        /// Parameter name.
        name: String,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
        /// Offending value as rendered JSON.
        got: String,
    },
}

impl RuleError {
    /// Name of the offending parameter, when there is one.
    pub fn param_name(&self) -> Option<&str> {
        match self {
            RuleError::MissingParam(name) => Some(name),
            RuleError::ParamOutOfRange { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Override document was not a JSON object.
    #[error("spec overrides must be a JSON object, got {0}")]
    OverridesNotObject(&'static str),

    /// Merged document does not describe a valid spec.
    #[error("invalid spec document: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Session bootstrap and dispatch errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Configuration could not be loaded.
    #[error("spec error: {0}")]
    Spec(#[from] SpecError),

    /// A declared rule could not be instantiated.
    #[error("rule error: {0}")]
    Rule(#[from] RuleError),

    /// A rule hook failed during start, tick or event dispatch.
    #[error(transparent)]
    Hook(#[from] anyhow::Error),
}
