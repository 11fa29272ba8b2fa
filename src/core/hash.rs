//! Hashing for change detection and replay verification
//!
//! Two families:
//! - A cheap 32-bit rolling hash used to tag a configuration document.
//!   Not for security or integrity.
//! - SHA-256 digests (with domain separators) used to compare telemetry logs
//!   and state snapshots between a run and its replay.

use sha2::{Digest, Sha256};

/// Digest output type (256 bits / 32 bytes)
pub type Digest32 = [u8; 32];

/// Domain separator for telemetry digests.
pub const TELEMETRY_DOMAIN: &[u8] = b"FATES_TELEMETRY_V1";

/// Domain separator for entity state digests.
pub const STATE_DOMAIN: &[u8] = b"FATES_STATE_V1";

/// 31-multiplier rolling hash over UTF-16 code units, wrapping at 32 bits.
pub fn rolling_hash(text: &str) -> i32 {
    text.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

/// Render a signed hash in base 16, with a leading minus for negatives.
pub fn signed_hex(value: i32) -> String {
    let wide = i64::from(value);
    if wide < 0 {
        format!("-{:x}", -wide)
    } else {
        format!("{wide:x}")
    }
}

/// Compute hash with domain separator.
pub fn hash_with_domain(domain: &[u8], data: &[u8]) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(data);
    hasher.finalize().into()
}

// =============================================================================
// TESTS
// =============================================================================
