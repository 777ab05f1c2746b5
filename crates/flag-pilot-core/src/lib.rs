// crates/flag-pilot-core/src/lib.rs
// ============================================================================
// Module: Flag Pilot Core Library
// Description: Public API surface for the Flag Pilot core.
// Purpose: Expose core types, interfaces, and runtime engines.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Flag Pilot core provides per-user flag evaluation with consistent-hash
//! bucketing, strategy-driven progressive rollouts, a pre-deployment safety
//! pipeline, and post-deployment monitoring with automatic rollback. It is
//! backend-agnostic and integrates through explicit interfaces rather than
//! embedding into delivery platforms.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::AlertError;
pub use interfaces::AlertSink;
pub use interfaces::AuditError;
pub use interfaces::AuditSink;
pub use interfaces::Clock;
pub use interfaces::FlagRegistry;
pub use interfaces::MetricsError;
pub use interfaces::MetricsSource;
pub use interfaces::RegistryError;
pub use interfaces::UsageSink;
pub use runtime::CheckContext;
pub use runtime::CheckError;
pub use runtime::DayOfWeek;
pub use runtime::DeploymentSafetyReport;
pub use runtime::Evaluator;
pub use runtime::ExecutorConfig;
pub use runtime::ExecutorError;
pub use runtime::HoursWindow;
pub use runtime::InMemoryFlagRegistry;
pub use runtime::LogicalClock;
pub use runtime::MonitorConfig;
pub use runtime::MonitorController;
pub use runtime::ReportEntry;
pub use runtime::RolloutExecutor;
pub use runtime::RolloutWatch;
pub use runtime::SafetyCheck;
pub use runtime::SafetyCheckConfig;
pub use runtime::SafetyCheckResult;
pub use runtime::SafetyPipeline;
pub use runtime::SafetyVerdict;
pub use runtime::StateMutator;
pub use runtime::SystemClock;
pub use runtime::Transition;
pub use runtime::TransitionError;
pub use runtime::TriggerCondition;
pub use runtime::TriggerSpec;
pub use runtime::TriggerTable;
pub use runtime::WeeklyWindow;
pub use runtime::standard_checks;
