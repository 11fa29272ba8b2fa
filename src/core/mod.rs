//! Core deterministic primitives.
//!
//! Nothing in this module reads the system clock or any platform entropy.

pub mod hash;
pub mod rng;
pub mod telemetry;

// Re-export core types
pub use hash::{hash_with_domain, rolling_hash, Digest32};
pub use rng::DeterministicRng;
pub use telemetry::{Telemetry, TelemetryDump, TelemetryEvent};
