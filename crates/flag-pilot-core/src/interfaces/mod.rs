// crates/flag-pilot-core/src/interfaces/mod.rs
// ============================================================================
// Module: Flag Pilot Interfaces
// Description: Backend-agnostic interfaces for registry, metrics, audit, and alerts.
// Purpose: Define the contract surfaces used by the Flag Pilot runtime.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how Flag Pilot integrates with external systems without
//! embedding backend-specific details. Registry reads must be snapshot reads:
//! no reader observes a partially applied state. Audit and alert emission is
//! fire-and-forget from the core's perspective; the core logs emission
//! failures but never fails its primary operation on them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::AlertSeverity;
use crate::core::AuditEvent;
use crate::core::FlagDefinition;
use crate::core::FlagId;
use crate::core::FlagState;
use crate::core::MetricsSnapshot;
use crate::core::StateError;
use crate::core::Timestamp;
use crate::core::UserId;

// ============================================================================
// SECTION: Flag Registry
// ============================================================================

/// Flag registry errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Registry backend I/O failure.
    #[error("flag registry io error: {0}")]
    Io(String),
    /// Committed state lost a concurrent version race.
    #[error("flag state version conflict for {0}")]
    VersionConflict(String),
    /// Committed state violates the flag state invariants.
    #[error("invalid flag state: {0}")]
    Invalid(#[from] StateError),
    /// Registry reported an error.
    #[error("flag registry error: {0}")]
    Store(String),
}

/// Backend-agnostic flag registry.
///
/// Readers must observe either the previous or the new state of a commit,
/// never a partial write.
pub trait FlagRegistry: Send + Sync {
    /// Loads the static definition for a flag.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the backend read fails.
    fn definition(&self, flag_id: &FlagId) -> Result<Option<FlagDefinition>, RegistryError>;

    /// Loads the current dynamic state for a flag.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the backend read fails.
    fn state(&self, flag_id: &FlagId) -> Result<Option<FlagState>, RegistryError>;

    /// Commits a new state for a flag atomically.
    ///
    /// The commit must be rejected with [`RegistryError::VersionConflict`]
    /// when `state.version` is not exactly one above the stored version.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] on version conflicts, invariant violations,
    /// or backend failures.
    fn commit_state(
        &self,
        flag_id: &FlagId,
        state: &FlagState,
        reason: &str,
    ) -> Result<(), RegistryError>;
}

// ============================================================================
// SECTION: Metrics Source
// ============================================================================

/// Metrics source errors.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Metrics backend is unreachable.
    #[error("metrics source unavailable: {0}")]
    Unavailable(String),
    /// Metrics payload failed to parse.
    #[error("metrics source invalid data: {0}")]
    Invalid(String),
}

/// Read-only source of live metrics snapshots.
///
/// A failed fetch means "unknown"; callers must fail closed toward caution
/// rather than treating the failure as a silent pass.
pub trait MetricsSource: Send + Sync {
    /// Fetches the current metrics snapshot for a flag.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError`] when the snapshot cannot be fetched.
    fn snapshot(&self, flag_id: &FlagId) -> Result<MetricsSnapshot, MetricsError>;
}

// ============================================================================
// SECTION: Audit Sink
// ============================================================================

/// Audit sink errors.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Audit sink reported an error.
    #[error("audit sink error: {0}")]
    Sink(String),
}

/// Append-only audit event sink.
pub trait AuditSink: Send + Sync {
    /// Records an immutable audit event.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] when the sink is temporarily unavailable.
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError>;
}

// ============================================================================
// SECTION: Alert Sink
// ============================================================================

/// Alert sink errors.
#[derive(Debug, Error)]
pub enum AlertError {
    /// Alert sink reported an error.
    #[error("alert sink error: {0}")]
    Sink(String),
}

/// Operator alert sink.
pub trait AlertSink: Send + Sync {
    /// Raises an alert for a flag.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError`] when the sink is temporarily unavailable.
    fn notify(
        &self,
        flag_id: &FlagId,
        message: &str,
        severity: AlertSeverity,
    ) -> Result<(), AlertError>;
}

// ============================================================================
// SECTION: Usage Sink
// ============================================================================

/// Best-effort usage/analytics sink for evaluation outcomes.
///
/// Implementations must be non-blocking; dropped observations are acceptable
/// and must never influence the evaluation result.
pub trait UsageSink: Send + Sync {
    /// Observes one evaluation outcome.
    fn observe(&self, flag_id: &FlagId, user_id: &UserId, enabled: bool);
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Time source for transition stamps.
///
/// The evaluation path never consults the clock; only the executor and the
/// monitoring controller stamp transitions through this seam.
pub trait Clock: Send + Sync {
    /// Returns the current timestamp.
    fn now(&self) -> Timestamp;
}
