// crates/flag-pilot-providers/src/metrics.rs
// ============================================================================
// Module: Built-in Metrics Sources
// Description: Programmable and environment-backed metrics sources.
// Purpose: Supply metrics snapshots for tests, demos, and env-driven setups.
// Dependencies: flag-pilot-core
// ============================================================================

//! ## Overview
//! [`StaticMetricsSource`] holds programmable snapshots for scenario tests
//! and demos. [`EnvMetricsSource`] reads snapshot fields from prefixed
//! environment variables; lookups are fail-closed, so a missing variable
//! reads as unavailable and a malformed value is an error rather than a
//! silent default.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::PoisonError;

use flag_pilot_core::FlagId;
use flag_pilot_core::LatencySample;
use flag_pilot_core::MetricsError;
use flag_pilot_core::MetricsSnapshot;
use flag_pilot_core::MetricsSource;

// ============================================================================
// SECTION: Static Metrics Source
// ============================================================================

/// Snapshot storage behind the static source lock.
#[derive(Debug, Default)]
struct StaticState {
    /// Fallback snapshot served when a flag has no dedicated entry.
    default: Option<MetricsSnapshot>,
    /// Per-flag snapshot overrides.
    per_flag: BTreeMap<FlagId, MetricsSnapshot>,
}

/// Programmable in-memory metrics source for tests and demos.
///
/// # Invariants
/// - Per-flag entries take precedence over the default snapshot.
/// - A flag with neither an entry nor a default reads as unavailable.
#[derive(Debug, Default)]
pub struct StaticMetricsSource {
    /// Programmable snapshot storage.
    state: Mutex<StaticState>,
}

impl StaticMetricsSource {
    /// Creates an empty source; every read is unavailable until programmed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source whose default snapshot is the healthy baseline.
    #[must_use]
    pub fn healthy() -> Self {
        let source = Self::new();
        source.set_default(MetricsSnapshot::healthy());
        source
    }

    /// Sets the fallback snapshot served for unprogrammed flags.
    pub fn set_default(&self, snapshot: MetricsSnapshot) {
        self.lock().default = Some(snapshot);
    }

    /// Sets the snapshot served for one flag.
    pub fn set(&self, flag_id: &FlagId, snapshot: MetricsSnapshot) {
        self.lock().per_flag.insert(flag_id.clone(), snapshot);
    }

    /// Removes the per-flag entry, falling back to the default snapshot.
    pub fn clear(&self, flag_id: &FlagId) {
        self.lock().per_flag.remove(flag_id);
    }

    /// Mutates the effective snapshot for one flag in place.
    ///
    /// Starts from the per-flag entry, then the default, then the healthy
    /// baseline, and stores the mutated result as the per-flag entry.
    pub fn mutate(&self, flag_id: &FlagId, apply: impl FnOnce(&mut MetricsSnapshot)) {
        let mut state = self.lock();
        let mut snapshot = state
            .per_flag
            .get(flag_id)
            .copied()
            .or(state.default)
            .unwrap_or_else(MetricsSnapshot::healthy);
        apply(&mut snapshot);
        state.per_flag.insert(flag_id.clone(), snapshot);
    }

    /// Locks the snapshot storage, recovering from poisoning.
    fn lock(&self) -> std::sync::MutexGuard<'_, StaticState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MetricsSource for StaticMetricsSource {
    fn snapshot(&self, flag_id: &FlagId) -> Result<MetricsSnapshot, MetricsError> {
        let state = self.lock();
        state.per_flag.get(flag_id).copied().or(state.default).ok_or_else(|| {
            MetricsError::Unavailable(format!("no snapshot configured for {flag_id}"))
        })
    }
}

// ============================================================================
// SECTION: Environment Metrics Source
// ============================================================================

/// Configuration for the environment-variable metrics source.
///
/// # Invariants
/// - `overrides` take precedence over process environment reads.
/// - `max_value_bytes` is enforced as a hard upper bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvMetricsConfig {
    /// Variable-name prefix, such as `FLAG_PILOT`.
    pub prefix: String,
    /// Optional override map used for deterministic lookups.
    pub overrides: Option<BTreeMap<String, String>>,
    /// Maximum bytes allowed for a single variable value.
    pub max_value_bytes: usize,
}

impl Default for EnvMetricsConfig {
    fn default() -> Self {
        Self {
            prefix: "FLAG_PILOT".to_string(),
            overrides: None,
            max_value_bytes: 255,
        }
    }
}

/// Metrics source reading snapshot fields from environment variables.
///
/// Variables are named `{PREFIX}_{FLAG}_{FIELD}` with the flag id uppercased
/// and non-alphanumeric characters mapped to underscores, for example
/// `FLAG_PILOT_CHECKOUT_REDESIGN_ERROR_RATE`.
///
/// # Invariants
/// - A missing variable reads as unavailable, never as a default value.
/// - Malformed or oversized values are errors.
pub struct EnvMetricsSource {
    /// Source configuration, including the prefix and size limit.
    config: EnvMetricsConfig,
}

impl EnvMetricsSource {
    /// Creates a new environment metrics source with the given configuration.
    #[must_use]
    pub const fn new(config: EnvMetricsConfig) -> Self {
        Self {
            config,
        }
    }

    /// Builds the variable name for one snapshot field.
    fn variable_name(&self, flag_id: &FlagId, field: &str) -> String {
        let mangled: String = flag_id
            .as_str()
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() {
                    ch.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}_{mangled}_{field}", self.config.prefix)
    }

    /// Looks up one variable, enforcing the value size limit.
    fn lookup(&self, name: &str) -> Result<String, MetricsError> {
        let value = match &self.config.overrides {
            Some(overrides) => overrides.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        let value = value.ok_or_else(|| {
            MetricsError::Unavailable(format!("missing environment variable {name}"))
        })?;
        if value.len() > self.config.max_value_bytes {
            return Err(MetricsError::Invalid(format!("{name} exceeds value size limit")));
        }
        Ok(value)
    }

    /// Reads one numeric field.
    fn number(&self, flag_id: &FlagId, field: &str) -> Result<f64, MetricsError> {
        let name = self.variable_name(flag_id, field);
        let value = self.lookup(&name)?;
        value
            .trim()
            .parse::<f64>()
            .map_err(|err| MetricsError::Invalid(format!("{name}: {err}")))
    }

    /// Reads one boolean field; only `true` and `false` are accepted.
    fn boolean(&self, flag_id: &FlagId, field: &str) -> Result<bool, MetricsError> {
        let name = self.variable_name(flag_id, field);
        let value = self.lookup(&name)?;
        match value.trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(MetricsError::Invalid(format!("{name}: expected true or false, got {other}"))),
        }
    }
}

impl MetricsSource for EnvMetricsSource {
    fn snapshot(&self, flag_id: &FlagId) -> Result<MetricsSnapshot, MetricsError> {
        Ok(MetricsSnapshot {
            error_rate: self.number(flag_id, "ERROR_RATE")?,
            quality_score: self.number(flag_id, "QUALITY_SCORE")?,
            security_score: self.number(flag_id, "SECURITY_SCORE")?,
            user_satisfaction: self.number(flag_id, "USER_SATISFACTION")?,
            regulatory_compliant: self.boolean(flag_id, "REGULATORY_COMPLIANT")?,
            latency: LatencySample {
                p95_ms: self.number(flag_id, "P95_LATENCY_MS")?,
                p99_ms: self.number(flag_id, "P99_LATENCY_MS")?,
            },
        })
    }
}
