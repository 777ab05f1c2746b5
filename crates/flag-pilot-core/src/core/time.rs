// crates/flag-pilot-core/src/core/time.rs
// ============================================================================
// Module: Flag Pilot Time Model
// Description: Canonical timestamp representations for transitions and audit logs.
// Purpose: Provide deterministic, replayable time values across Flag Pilot records.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Flag Pilot embeds explicit time values in state transitions and audit
//! records to keep replay deterministic. The evaluation path never reads
//! wall-clock time directly; background tasks stamp transitions through the
//! [`crate::interfaces::Clock`] seam so tests can substitute logical time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::Duration;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical timestamp used in Flag Pilot state and audit records.
///
/// # Invariants
/// - Values are explicitly provided by callers or a [`crate::interfaces::Clock`].
/// - No validation is performed; monotonicity is a caller responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Timestamp {
    /// Unix epoch milliseconds.
    UnixMillis(i64),
    /// Monotonic logical time value.
    Logical(u64),
}

impl Timestamp {
    /// Returns the timestamp as unix milliseconds when available.
    #[must_use]
    pub const fn as_unix_millis(&self) -> Option<i64> {
        match self {
            Self::UnixMillis(value) => Some(*value),
            Self::Logical(_) => None,
        }
    }

    /// Returns the timestamp as logical time when available.
    #[must_use]
    pub const fn as_logical(&self) -> Option<u64> {
        match self {
            Self::UnixMillis(_) => None,
            Self::Logical(value) => Some(*value),
        }
    }

    /// Projects the timestamp onto a calendar instant.
    ///
    /// Logical ticks are mapped as whole seconds from the epoch so that
    /// calendar-driven safety checks remain deterministic under logical time.
    #[must_use]
    pub fn to_offset_date_time(&self) -> OffsetDateTime {
        match self {
            Self::UnixMillis(millis) => {
                OffsetDateTime::from_unix_timestamp_nanos(i128::from(*millis) * 1_000_000)
                    .unwrap_or(OffsetDateTime::UNIX_EPOCH)
            }
            Self::Logical(ticks) => {
                let seconds = i64::try_from(*ticks).unwrap_or(i64::MAX);
                OffsetDateTime::UNIX_EPOCH.saturating_add(Duration::seconds(seconds))
            }
        }
    }
}
