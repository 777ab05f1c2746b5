// crates/flag-pilot-core/src/core/rollout.rs
// ============================================================================
// Module: Rollout Configuration
// Description: Per-invocation rollout strategy configuration.
// Purpose: Describe how a flag should be progressively delivered.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`RolloutConfig`] is supplied per rollout invocation and never persisted
//! as part of a flag definition. The strategy is a tagged union over the
//! known shapes; configuration that does not match a known shape is rejected
//! at deserialization time rather than accepted as an arbitrary payload.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Rollout Strategy
// ============================================================================

/// Default canary percentage applied when none is supplied.
pub const DEFAULT_CANARY_PERCENTAGE: u8 = 5;

/// Progressive-delivery strategy selection.
///
/// # Invariants
/// - Variants are stable for serialization and audit matching.
/// - Percentages are in `0..=100`; durations are positive minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum RolloutStrategy {
    /// Single atomic transition to 100%.
    Instant,
    /// Linear percentage ramp over the given duration.
    Gradual {
        /// Total ramp duration in minutes, divided into fixed steps.
        duration_minutes: u32,
    },
    /// Small-percentage trial observed before full rollout.
    Canary {
        /// Percentage of users exposed during the canary window.
        canary_percentage: u8,
    },
    /// Atomic cutover between two fully built environments.
    BlueGreen,
}

impl RolloutStrategy {
    /// Returns a canary strategy with the default percentage.
    #[must_use]
    pub const fn default_canary() -> Self {
        Self::Canary {
            canary_percentage: DEFAULT_CANARY_PERCENTAGE,
        }
    }

    /// Returns a stable label for audit reasons.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instant => "instant",
            Self::Gradual {
                ..
            } => "gradual",
            Self::Canary {
                ..
            } => "canary",
            Self::BlueGreen => "blue_green",
        }
    }
}

// ============================================================================
// SECTION: Rollout Configuration
// ============================================================================

/// Per-invocation rollout configuration.
///
/// # Invariants
/// - `success_threshold` is a minimum quality score in `[0, 100]`.
/// - `error_threshold` is a maximum error-rate ratio in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RolloutConfig {
    /// Strategy driving the rollout percentage over time.
    pub strategy: RolloutStrategy,
    /// Minimum quality score tolerated mid-rollout.
    pub success_threshold: f64,
    /// Maximum error rate tolerated mid-rollout.
    pub error_threshold: f64,
}

impl RolloutConfig {
    /// Creates a rollout configuration with default thresholds.
    #[must_use]
    pub const fn new(strategy: RolloutStrategy) -> Self {
        Self {
            strategy,
            success_threshold: 60.0,
            error_threshold: 0.05,
        }
    }
}
