// crates/flag-pilot-core/src/core/audit.rs
// ============================================================================
// Module: Audit Events and Alerts
// Description: Immutable audit records and alert severities.
// Purpose: Name every state transition the control plane can emit.
// Dependencies: crate::core::{identifiers, time}, serde
// ============================================================================

//! ## Overview
//! Every state transition (enable, disable, percentage change, rollback,
//! alert) is recorded as an immutable [`AuditEvent`] through the
//! [`crate::interfaces::AuditSink`]. Emission is fire-and-forget: a sink
//! failure is logged by the emitter and never fails the primary operation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ActorId;
use crate::core::identifiers::FlagId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Event Kinds
// ============================================================================

/// Audit event classification.
///
/// # Invariants
/// - Variants are stable for serialization and scenario assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventKind {
    /// Flag was enabled by a rollout operation.
    Enabled,
    /// Flag was disabled by an operator.
    Disabled,
    /// Rollout percentage changed without a status change of direction.
    PercentageChanged,
    /// Flag was rolled back, automatically or manually.
    Rollback,
    /// An alert was raised without a state change.
    Alert,
}

// ============================================================================
// SECTION: Alert Severity
// ============================================================================

/// Severity attached to alerts and rollback triggers.
///
/// # Invariants
/// - Ordering follows escalation: `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// Informational; no action expected.
    Low,
    /// Degradation worth watching.
    Medium,
    /// Requires prompt operator attention.
    High,
    /// Requires immediate remediation.
    Critical,
}

// ============================================================================
// SECTION: Audit Event
// ============================================================================

/// Immutable audit record for one state transition.
///
/// # Invariants
/// - `percentage_before`/`percentage_after` reflect committed state around
///   the transition, both in `0..=100`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Flag the transition applies to.
    pub flag_id: FlagId,
    /// Event classification.
    pub kind: AuditEventKind,
    /// Actor that triggered the transition.
    pub actor: ActorId,
    /// Free-text transition reason.
    pub reason: String,
    /// Rollout percentage before the transition.
    pub percentage_before: u8,
    /// Rollout percentage after the transition.
    pub percentage_after: u8,
    /// Time the event was recorded.
    pub recorded_at: Timestamp,
}
