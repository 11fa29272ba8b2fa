//! Session configuration and rule catalog.
//!
//! - `game_spec`: the `GameSpec` document
//! - `catalog`: per-rule-type parameter ranges and required emissions
//! - `loader`: default + overrides, catalog, spec hash

pub mod catalog;
pub mod game_spec;
pub mod loader;

pub use catalog::{CatalogEntry, ParamRange, RuleCatalog};
pub use game_spec::{GameSpec, ParamBag, RuleDecl};
pub use loader::{load_rules_catalog, load_spec, load_spec_str, spec_hash};
