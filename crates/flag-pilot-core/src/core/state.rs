// crates/flag-pilot-core/src/core/state.rs
// ============================================================================
// Module: Flag State
// Description: Mutable rollout state and lifecycle status per flag.
// Purpose: Capture the single-writer rollout state read by the evaluation path.
// Dependencies: crate::core::{identifiers, time}, serde, thiserror
// ============================================================================

//! ## Overview
//! [`FlagState`] is the mutable half of a flag: enabled bit, rollout
//! percentage, lifecycle status, and the last transition note. State is owned
//! exclusively by the rollout executor and monitoring controller; the
//! evaluation engine only performs snapshot reads. Every commit is validated
//! against the state invariants before it becomes visible to readers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Flag Status
// ============================================================================

/// Flag rollout lifecycle status.
///
/// # Invariants
/// - Variants are stable for serialization and audit matching.
/// - Legal transitions: `Disabled -> RollingOut -> Steady`, with
///   `RollingOut -> RolledBack` and `Steady -> RolledBack`; `RolledBack`
///   returns to `Disabled` only through an operator reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagStatus {
    /// Flag is off and not rolling out.
    Disabled,
    /// Flag is partially rolled out and under active rollout control.
    RollingOut,
    /// Flag is fully rolled out and stable.
    Steady,
    /// Flag was rolled back; terminal until an operator reset.
    RolledBack,
}

impl FlagStatus {
    /// Returns true for states that terminate rollout control.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Disabled | Self::RolledBack)
    }
}

// ============================================================================
// SECTION: State Errors
// ============================================================================

/// Errors raised when a flag state violates its invariants.
#[derive(Debug, Error)]
pub enum StateError {
    /// Rollout percentage is outside the `0..=100` range.
    #[error("rollout percentage out of range: {0}")]
    PercentageOutOfRange(u8),
    /// A disabled flag carries a non-zero percentage or live status.
    #[error("disabled flag must have percentage 0 and a terminal status")]
    DisabledInconsistent,
    /// A steady flag is not fully rolled out.
    #[error("steady flag must have rollout percentage 100")]
    SteadyNotFull,
}

// ============================================================================
// SECTION: Flag State
// ============================================================================

/// Mutable rollout state for a single flag.
///
/// # Invariants
/// - `enabled == false` implies `rollout_percentage == 0` and
///   `status` in `{Disabled, RolledBack}`.
/// - `status == Steady` implies `rollout_percentage == 100`.
/// - `version` increases by exactly one on every committed transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagState {
    /// Dynamic enabled bit read by the evaluation engine.
    pub enabled: bool,
    /// Rollout percentage in `0..=100`.
    pub rollout_percentage: u8,
    /// Lifecycle status.
    pub status: FlagStatus,
    /// Free-text audit note for the last transition.
    pub last_transition_reason: String,
    /// Timestamp of the last transition.
    pub last_transition_at: Timestamp,
    /// Optimistic-concurrency version, bumped on every commit.
    pub version: u64,
}

impl FlagState {
    /// Returns the initial disabled state for a newly registered flag.
    #[must_use]
    pub fn disabled(at: Timestamp) -> Self {
        Self {
            enabled: false,
            rollout_percentage: 0,
            status: FlagStatus::Disabled,
            last_transition_reason: "registered".to_string(),
            last_transition_at: at,
            version: 0,
        }
    }

    /// Validates the state invariants.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when an invariant is violated.
    pub const fn validate(&self) -> Result<(), StateError> {
        if self.rollout_percentage > 100 {
            return Err(StateError::PercentageOutOfRange(self.rollout_percentage));
        }
        if !self.enabled && (self.rollout_percentage != 0 || !self.status.is_terminal()) {
            return Err(StateError::DisabledInconsistent);
        }
        if matches!(self.status, FlagStatus::Steady) && self.rollout_percentage != 100 {
            return Err(StateError::SteadyNotFull);
        }
        Ok(())
    }
}
