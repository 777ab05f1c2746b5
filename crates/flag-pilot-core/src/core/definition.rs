// crates/flag-pilot-core/src/core/definition.rs
// ============================================================================
// Module: Flag Definitions
// Description: Immutable per-deployment flag definitions and targeting rules.
// Purpose: Capture the static shape of a flag loaded from the registry.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! A [`FlagDefinition`] is the immutable half of a flag: environment gates,
//! targeting rules, dependency list, kill-switch marker, and rollback
//! thresholds. Definitions are loaded from an external registry and never
//! mutated by this subsystem; the mutable half lives in
//! [`crate::core::state::FlagState`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::Environment;
use crate::core::identifiers::FlagId;
use crate::core::identifiers::RegionId;

// ============================================================================
// SECTION: Business Size Tiers
// ============================================================================

/// Business-size tier used for targeting.
///
/// # Invariants
/// - Variants are stable for serialization and targeting-rule matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessSize {
    /// Micro businesses (smallest tier).
    Micro,
    /// Small businesses.
    Small,
    /// Medium businesses.
    Medium,
    /// Large businesses (largest tier).
    Large,
}

// ============================================================================
// SECTION: Rollback Thresholds
// ============================================================================

/// Named latency ceilings tracked for a flag.
///
/// # Invariants
/// - Ceilings are expressed in milliseconds and must be positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyCeilings {
    /// Ceiling for the p95 latency figure in milliseconds.
    pub p95_ms: f64,
    /// Ceiling for the p99 latency figure in milliseconds.
    pub p99_ms: f64,
}

/// Rollback thresholds bundled with a flag definition.
///
/// # Invariants
/// - `max_error_rate` is a ratio in `[0, 1]`.
/// - `min_quality_score` is a score in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollbackThresholds {
    /// Maximum tolerated error rate before rollback.
    pub max_error_rate: f64,
    /// Latency ceiling bundle for performance rollback.
    pub latency: LatencyCeilings,
    /// Minimum compliance/quality score tolerated during rollout.
    pub min_quality_score: f64,
}

impl Default for RollbackThresholds {
    fn default() -> Self {
        Self {
            max_error_rate: 0.05,
            latency: LatencyCeilings {
                p95_ms: 500.0,
                p99_ms: 1_000.0,
            },
            min_quality_score: 60.0,
        }
    }
}

// ============================================================================
// SECTION: Flag Definition
// ============================================================================

/// Immutable flag definition loaded from the registry.
///
/// # Invariants
/// - Empty `target_regions` or `target_business_sizes` means unrestricted.
/// - `dependencies` must all independently evaluate true for this flag to be on.
/// - `kill_switch` marks flags whose disable bypasses all strategy logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagDefinition {
    /// Flag identifier.
    pub id: FlagId,
    /// Per-environment boolean gates; absent environments are gated off.
    pub environments: BTreeMap<Environment, bool>,
    /// Region targeting set; empty means no region restriction.
    pub target_regions: BTreeSet<RegionId>,
    /// Business-size targeting set; empty means unrestricted.
    pub target_business_sizes: BTreeSet<BusinessSize>,
    /// Ordered list of flags that must all evaluate true.
    pub dependencies: Vec<FlagId>,
    /// Marks an operator kill switch for immediate disable.
    pub kill_switch: bool,
    /// Thresholds consulted by rollout strategies and monitoring.
    pub rollback_thresholds: RollbackThresholds,
}

impl FlagDefinition {
    /// Creates a minimal definition gated on for the given environments.
    #[must_use]
    pub fn new(id: FlagId, environments: impl IntoIterator<Item = Environment>) -> Self {
        Self {
            id,
            environments: environments.into_iter().map(|env| (env, true)).collect(),
            target_regions: BTreeSet::new(),
            target_business_sizes: BTreeSet::new(),
            dependencies: Vec::new(),
            kill_switch: false,
            rollback_thresholds: RollbackThresholds::default(),
        }
    }

    /// Returns true when the definition gates the flag on in `environment`.
    #[must_use]
    pub fn enabled_in(&self, environment: &Environment) -> bool {
        self.environments.get(environment).copied().unwrap_or(false)
    }
}
