//! Telemetry Log
//!
//! Ordered, append-only record of named events. This is the only surface
//! regression tests observe, so nothing is ever dropped or reordered.
//!
//! Time is simulated milliseconds supplied by the host loop through
//! [`Telemetry::advance_to`]. Wall-clock time never enters the log.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::hash::{hash_with_domain, Digest32, TELEMETRY_DOMAIN};

/// A single log entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    /// Milliseconds since the log was started.
    pub t: u64,
    /// Event name.
    pub event: String,
    /// Optional payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Serialized form handed to test drivers: `{"events": [...]}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryDump {
    /// Events in emission order.
    pub events: Vec<TelemetryEvent>,
}

impl TelemetryDump {
    /// Whether any event carries this name.
    pub fn has_event(&self, name: &str) -> bool {
        self.events.iter().any(|e| e.event == name)
    }
}

/// Append-only event recorder.
#[derive(Clone, Debug, Default)]
pub struct Telemetry {
    events: Vec<TelemetryEvent>,
    origin_ms: f64,
    now_ms: f64,
}

impl Telemetry {
    /// Create an empty log with origin and clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the log and move the origin to the current clock.
    pub fn start(&mut self) {
        self.events.clear();
        self.origin_ms = self.now_ms;
    }

    /// Move the clock forward. Backward moves are ignored.
    pub fn advance_to(&mut self, now_ms: f64) {
        if now_ms > self.now_ms {
            self.now_ms = now_ms;
        }
    }

    /// Current clock value (absolute, not relative to the origin).
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Append an event stamped with the current relative time.
    pub fn emit(&mut self, event: impl Into<String>, data: Option<Value>) {
        let elapsed = (self.now_ms - self.origin_ms).max(0.0);
        self.events.push(TelemetryEvent {
            t: elapsed.round() as u64,
            event: event.into(),
            data,
        });
    }

    /// Owned copy of the log.
    pub fn dump(&self) -> TelemetryDump {
        TelemetryDump {
            events: self.events.clone(),
        }
    }

    /// Empty the log without moving the origin.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Number of recorded events.
    pub fn count(&self) -> usize {
        self.events.len()
    }

    /// Whether any event carries this name.
    pub fn has_event(&self, name: &str) -> bool {
        self.events.iter().any(|e| e.event == name)
    }

    /// The last `n` events (fewer if the log is shorter).
    pub fn last(&self, n: usize) -> &[TelemetryEvent] {
        let start = self.events.len().saturating_sub(n);
        &self.events[start..]
    }

    /// All events with the given name, in order.
    pub fn events_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a TelemetryEvent> + 'a {
        self.events.iter().filter(move |e| e.event == name)
    }

    /// Canonical JSON rendering of the dump.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.dump())
    }

    /// SHA-256 over the canonical JSON dump.
    ///
    /// Two runs with identical logs produce identical digests.
    pub fn digest(&self) -> serde_json::Result<Digest32> {
        let json = self.to_json()?;
        Ok(hash_with_domain(TELEMETRY_DOMAIN, json.as_bytes()))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_emit_and_query() {
        let mut tel = Telemetry::new();
        tel.start();
        tel.emit("session_start", Some(json!({ "seed": 1 })));
        tel.advance_to(16.4);
        tel.emit("tick", None);
        tel.advance_to(33.6);
        tel.emit("tick", None);

        assert_eq!(tel.count(), 3);
        assert!(tel.has_event("session_start"));
        assert!(!tel.has_event("win"));
        assert_eq!(tel.events_named("tick").count(), 2);

        let last = tel.last(2);
        assert_eq!(last.len(), 2);
        assert_eq!(last[0].t, 16);
        assert_eq!(last[1].t, 34);
        assert_eq!(tel.last(10).len(), 3);
    }

    #[test]
    fn test_start_resets_origin() {
        let mut tel = Telemetry::new();
        tel.advance_to(1000.0);
        tel.emit("before", None);
        tel.start();
        assert_eq!(tel.count(), 0);

        tel.advance_to(1250.0);
        tel.emit("after", None);
        assert_eq!(tel.last(1)[0].t, 250);
    }

    #[test]
    fn test_clear_keeps_origin() {
        let mut tel = Telemetry::new();
        tel.start();
        tel.advance_to(40.0);
        tel.emit("a", None);
        tel.clear();
        assert_eq!(tel.count(), 0);

        tel.emit("b", None);
        assert_eq!(tel.last(1)[0].t, 40);
    }

    #[test]
    fn test_clock_never_moves_backwards() {
        let mut tel = Telemetry::new();
        tel.start();
        tel.advance_to(100.0);
        tel.advance_to(50.0);
        tel.emit("x", None);
        assert_eq!(tel.last(1)[0].t, 100);
    }

    #[test]
    fn test_dump_is_a_copy() {
        let mut tel = Telemetry::new();
        tel.start();
        tel.emit("a", Some(json!({ "n": 1 })));

        let mut dump = tel.dump();
        dump.events[0].event = "tampered".to_string();
        dump.events.clear();

        assert_eq!(tel.count(), 1);
        assert!(tel.has_event("a"));
    }

    #[test]
    fn test_dump_json_shape() {
        let mut tel = Telemetry::new();
        tel.start();
        tel.emit("win", Some(json!({ "reason": "survived" })));
        tel.emit("bare", None);

        let value: Value = serde_json::from_str(&tel.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({ "events": [
                { "t": 0, "event": "win", "data": { "reason": "survived" } },
                { "t": 0, "event": "bare" }
            ]})
        );
    }

    #[test]
    fn test_digest_tracks_content() {
        let mut a = Telemetry::new();
        let mut b = Telemetry::new();
        for tel in [&mut a, &mut b] {
            tel.start();
            tel.emit("x", Some(json!({ "v": 1.5 })));
        }
        assert_eq!(a.digest().unwrap(), b.digest().unwrap());

        b.emit("y", None);
        assert_ne!(a.digest().unwrap(), b.digest().unwrap());
    }
}
