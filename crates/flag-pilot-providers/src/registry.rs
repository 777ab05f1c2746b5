// crates/flag-pilot-providers/src/registry.rs
// ============================================================================
// Module: Metrics Source Registry
// Description: Registry routing metrics reads to named sources per flag.
// Purpose: Compose multiple metrics backends behind one source interface.
// Dependencies: flag-pilot-core
// ============================================================================

//! ## Overview
//! The registry holds named metrics sources and routes each flag's reads to
//! its assigned source, falling back to an optional default source. An
//! allowlist/denylist policy gates which sources may be consulted; a blocked
//! or unresolved source reads as unavailable, never as a silent pass.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use flag_pilot_core::FlagId;
use flag_pilot_core::MetricsError;
use flag_pilot_core::MetricsSnapshot;
use flag_pilot_core::MetricsSource;

// ============================================================================
// SECTION: Access Policy
// ============================================================================

/// Access policy controlling which sources may be queried.
///
/// # Invariants
/// - `denylist` overrides `allowlist` when both are present.
/// - If `allowlist` is `None`, all sources are allowed unless denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAccessPolicy {
    /// Optional allowlist of source names.
    pub allowlist: Option<BTreeSet<String>>,
    /// Explicit denylist of source names.
    pub denylist: BTreeSet<String>,
}

impl SourceAccessPolicy {
    /// Returns a policy that permits all sources.
    #[must_use]
    pub const fn allow_all() -> Self {
        Self {
            allowlist: None,
            denylist: BTreeSet::new(),
        }
    }

    /// Returns true when the source is allowed by policy.
    #[must_use]
    pub fn is_allowed(&self, source_name: &str) -> bool {
        if self.denylist.contains(source_name) {
            return false;
        }
        if let Some(allowlist) = &self.allowlist {
            return allowlist.contains(source_name);
        }
        true
    }
}

impl Default for SourceAccessPolicy {
    fn default() -> Self {
        Self::allow_all()
    }
}

// ============================================================================
// SECTION: Metrics Source Registry
// ============================================================================

/// Registry of named metrics sources with per-flag routing.
///
/// # Invariants
/// - Source names are unique within the registry.
/// - Access policy is enforced on every read.
pub struct MetricsSourceRegistry {
    /// Source implementations keyed by name.
    sources: BTreeMap<String, Arc<dyn MetricsSource>>,
    /// Per-flag source assignments.
    assignments: BTreeMap<FlagId, String>,
    /// Name of the fallback source for unassigned flags.
    default_source: Option<String>,
    /// Access control policy for source usage.
    policy: SourceAccessPolicy,
}

impl MetricsSourceRegistry {
    /// Creates a new registry with the provided policy.
    #[must_use]
    pub const fn new(policy: SourceAccessPolicy) -> Self {
        Self {
            sources: BTreeMap::new(),
            assignments: BTreeMap::new(),
            default_source: None,
            policy,
        }
    }

    /// Registers a named source, replacing any previous registration.
    pub fn register(&mut self, name: impl Into<String>, source: Arc<dyn MetricsSource>) {
        self.sources.insert(name.into(), source);
    }

    /// Marks a named source as the fallback for unassigned flags.
    pub fn set_default(&mut self, name: impl Into<String>) {
        self.default_source = Some(name.into());
    }

    /// Routes a flag's metrics reads to a named source.
    pub fn assign(&mut self, flag_id: FlagId, name: impl Into<String>) {
        self.assignments.insert(flag_id, name.into());
    }

    /// Returns the registered source names in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.sources.keys().map(String::as_str).collect()
    }

    /// Resolves the source name serving a flag.
    fn route(&self, flag_id: &FlagId) -> Option<&str> {
        self.assignments
            .get(flag_id)
            .map(String::as_str)
            .or(self.default_source.as_deref())
    }
}

impl MetricsSource for MetricsSourceRegistry {
    fn snapshot(&self, flag_id: &FlagId) -> Result<MetricsSnapshot, MetricsError> {
        let name = self.route(flag_id).ok_or_else(|| {
            MetricsError::Unavailable(format!("no metrics source assigned for {flag_id}"))
        })?;
        if !self.policy.is_allowed(name) {
            return Err(MetricsError::Unavailable(format!(
                "metrics source {name} blocked by policy"
            )));
        }
        let source = self.sources.get(name).ok_or_else(|| {
            MetricsError::Unavailable(format!("unknown metrics source {name}"))
        })?;
        source.snapshot(flag_id)
    }
}
