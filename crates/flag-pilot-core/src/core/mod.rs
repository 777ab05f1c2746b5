// crates/flag-pilot-core/src/core/mod.rs
// ============================================================================
// Module: Flag Pilot Core Types
// Description: Canonical flag, state, metrics, and audit structures.
// Purpose: Provide stable, serializable types for the rollout control plane.
// Dependencies: serde, sha2
// ============================================================================

//! ## Overview
//! Flag Pilot core types define flag definitions, rollout state, user
//! contexts, metrics snapshots, rollout configuration, and audit records.
//! These types are the canonical source of truth for any derived API
//! surfaces.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod bucket;
pub mod context;
pub mod definition;
pub mod identifiers;
pub mod metrics;
pub mod rollout;
pub mod state;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AlertSeverity;
pub use audit::AuditEvent;
pub use audit::AuditEventKind;
pub use bucket::bucket;
pub use context::UserContext;
pub use definition::BusinessSize;
pub use definition::FlagDefinition;
pub use definition::LatencyCeilings;
pub use definition::RollbackThresholds;
pub use identifiers::ActorId;
pub use identifiers::CheckId;
pub use identifiers::Environment;
pub use identifiers::FlagId;
pub use identifiers::RegionId;
pub use identifiers::TriggerId;
pub use identifiers::UserId;
pub use metrics::LatencySample;
pub use metrics::MetricsSnapshot;
pub use rollout::DEFAULT_CANARY_PERCENTAGE;
pub use rollout::RolloutConfig;
pub use rollout::RolloutStrategy;
pub use state::FlagState;
pub use state::FlagStatus;
pub use state::StateError;
pub use time::Timestamp;
