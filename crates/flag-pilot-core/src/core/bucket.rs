// crates/flag-pilot-core/src/core/bucket.rs
// ============================================================================
// Module: Consistent Bucketing
// Description: Deterministic (user, flag) to percentile bucketing.
// Purpose: Provide stable partial-rollout partitioning across restarts.
// Dependencies: crate::core::identifiers, sha2
// ============================================================================

//! ## Overview
//! The bucketing function maps a `(user, flag)` pair to a stable percentile
//! in `0..100`. It hashes the concatenation of both identifiers with SHA-256
//! and reduces the leading digest bytes modulo 100, so the same pair lands in
//! the same bucket across processes and restarts while varying user
//! populations spread uniformly across the range. Pure function: no state,
//! no I/O, no failure modes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use sha2::Digest;
use sha2::Sha256;

use crate::core::identifiers::FlagId;
use crate::core::identifiers::UserId;

// ============================================================================
// SECTION: Bucketing Function
// ============================================================================

/// Number of buckets in the rollout percentile space.
const BUCKET_SPACE: u64 = 100;

/// Maps a `(user, flag)` pair to a stable bucket in `0..100`.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    reason = "Value is reduced modulo 100 before the cast and always fits in u8."
)]
pub fn bucket(user_id: &UserId, flag_id: &FlagId) -> u8 {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(flag_id.as_str().as_bytes());
    let digest = hasher.finalize();

    // The digest is at least eight bytes; fold the leading bytes into a u64.
    let mut value: u64 = 0;
    for byte in digest.iter().take(8) {
        value = (value << 8) | u64::from(*byte);
    }
    (value % BUCKET_SPACE) as u8
}
