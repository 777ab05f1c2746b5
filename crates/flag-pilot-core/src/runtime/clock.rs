// crates/flag-pilot-core/src/runtime/clock.rs
// ============================================================================
// Module: Clock Implementations
// Description: Wall-clock and logical clock sources for transition stamps.
// Purpose: Provide a production clock plus a deterministic clock for tests.
// Dependencies: crate::core::time, crate::interfaces
// ============================================================================

//! ## Overview
//! [`SystemClock`] stamps transitions with unix-epoch milliseconds.
//! [`LogicalClock`] produces a monotonically increasing logical sequence for
//! deterministic tests and demos.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use crate::core::Timestamp;
use crate::interfaces::Clock;

// ============================================================================
// SECTION: System Clock
// ============================================================================

/// Wall-clock time source stamping unix-epoch milliseconds.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Epoch milliseconds fit in i64 for any realistic wall-clock value."
    )]
    fn now(&self) -> Timestamp {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as i64);
        Timestamp::UnixMillis(millis)
    }
}

// ============================================================================
// SECTION: Logical Clock
// ============================================================================

/// Monotonic logical clock for deterministic tests and demos.
#[derive(Debug, Default)]
pub struct LogicalClock {
    /// Next logical tick value.
    next: AtomicU64,
}

impl LogicalClock {
    /// Creates a logical clock starting at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }
}

impl Clock for LogicalClock {
    fn now(&self) -> Timestamp {
        Timestamp::Logical(self.next.fetch_add(1, Ordering::Relaxed))
    }
}
