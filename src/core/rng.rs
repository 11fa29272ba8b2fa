//! Deterministic Random Number Generator
//!
//! Linear congruential generator over 31 bits.
//! Given the same seed and the same sequence of calls, produces an identical
//! stream on every platform.

use serde::{Deserialize, Serialize};

/// LCG multiplier.
pub const LCG_MULTIPLIER: u64 = 1_103_515_245;

/// LCG increment.
pub const LCG_INCREMENT: u64 = 12_345;

/// State mask (modulus 2^31).
pub const LCG_MASK: u64 = 0x7fff_ffff;

/// 2^31 as a float, the divisor mapping state into [0, 1).
const LCG_MODULUS_F64: f64 = 2_147_483_648.0;

/// Deterministic PRNG using a 31-bit linear congruential step.
///
/// # Determinism Guarantee
///
/// The state is a pure function of the seed and the number of draws made
/// since seeding. There is no other source of entropy.
///
/// # Example
///
/// ```
/// use fates::core::rng::DeterministicRng;
///
/// let mut rng = DeterministicRng::new(1);
/// assert_eq!(rng.next_int(0, 9), 5); // Always the same!
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: u64,
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Reset the internal state to `value`.
    pub fn seed(&mut self, value: u64) {
        self.state = value;
    }

    /// Advance one LCG step and return the new state.
    #[inline]
    fn step(&mut self) -> u64 {
        // Wrapping in 2^64 then masking is exact mod 2^31.
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT)
            & LCG_MASK;
        self.state
    }

    /// Generate the next value in [0, 1).
    #[inline]
    pub fn next(&mut self) -> f64 {
        self.step() as f64 / LCG_MODULUS_F64
    }

    /// Generate an integer in the closed range [min, max].
    #[inline]
    pub fn next_int(&mut self, min: i64, max: i64) -> i64 {
        let span = (max - min + 1) as f64;
        (self.next() * span).floor() as i64 + min
    }

    /// Generate a float in [min, max).
    #[inline]
    pub fn next_float(&mut self, min: f64, max: f64) -> f64 {
        self.next() * (max - min) + min
    }

    /// Fair coin flip.
    #[inline]
    pub fn next_bool(&mut self) -> bool {
        self.next() < 0.5
    }

    /// Select a random element from a slice.
    ///
    /// Returns `None` without consuming a draw when the slice is empty.
    pub fn pick<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            return None;
        }
        let idx = self.next_int(0, slice.len() as i64 - 1) as usize;
        slice.get(idx)
    }

    /// Get current state (for checkpointing/debugging).
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Restore from saved state.
    pub fn set_state(&mut self, state: u64) {
        self.state = state;
    }
}

// =============================================================================
// TESTS
// =============================================================================
