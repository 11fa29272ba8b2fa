//! # Fates Engine
//!
//! Deterministic gameplay-rule engine for One Room, Many Fates.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      FATES ENGINE                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── rng.rs      - Seeded 31-bit LCG                         │
//! │  ├── hash.rs     - Spec hash, SHA-256 digests                │
//! │  └── telemetry.rs- Append-only event log                     │
//! │                                                              │
//! │  spec/           - Session configuration                     │
//! │  ├── game_spec.rs- GameSpec document + defaults              │
//! │  ├── catalog.rs  - Rule parameter ranges, required events    │
//! │  └── loader.rs   - Shallow-merge overrides, spec hash        │
//! │                                                              │
//! │  rules/          - Gameplay modifiers                        │
//! │  ├── params.rs   - Catalog-driven validation                 │
//! │  ├── registry.rs - Type name → factory                       │
//! │  ├── engine.rs   - Ordered dispatch                          │
//! │  ├── idle_damage.rs                                          │
//! │  └── bullet_bounce.rs                                        │
//! │                                                              │
//! │  game/           - Host collaborator                         │
//! │  ├── entities.rs - Player / enemies / bullets                │
//! │  ├── events.rs   - Events dispatched to rules                │
//! │  └── session.rs  - Headless loop + control surface           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! - All randomness comes from the seeded LCG
//! - Telemetry timestamps are simulated time, never wall-clock
//! - Rules dispatch in declaration order; maps iterate sorted (BTreeMap)
//!
//! Given the same spec, seed and sequence of host calls, two runs produce
//! byte-identical telemetry and identical entity state.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod game;
pub mod rules;
pub mod spec;

// Re-export commonly used types
pub use crate::core::rng::DeterministicRng;
pub use crate::core::telemetry::{Telemetry, TelemetryDump, TelemetryEvent};
pub use error::{RuleError, SessionError, SpecError};
pub use game::{FrameInput, GameEvent, Outcome, Session, SessionConfig};
pub use rules::{Rule, RuleContext, RuleEngine, RuleRegistry};
pub use spec::{load_rules_catalog, load_spec, spec_hash, GameSpec, RuleCatalog};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Nominal frame step of the host loop (ms, 60 Hz).
pub const FRAME_MS: f64 = 1000.0 / 60.0;
