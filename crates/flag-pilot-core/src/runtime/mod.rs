// crates/flag-pilot-core/src/runtime/mod.rs
// ============================================================================
// Module: Flag Pilot Runtime
// Description: Evaluation, safety, rollout, and monitoring engines.
// Purpose: Compose the core types and interfaces into the running control
//          plane.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime layer hosts the engines behind the public API: the hot-path
//! evaluator, the in-memory registry and clocks, the pre-deployment safety
//! pipeline with its standard checks, the serialized state mutator, the
//! rollout executor, and the monitoring controller with its trigger table.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod checks;
pub mod clock;
pub mod evaluator;
pub mod executor;
pub mod monitor;
pub mod registry;
pub mod safety;
pub mod transitions;
pub mod triggers;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use checks::DayOfWeek;
pub use checks::HoursWindow;
pub use checks::SafetyCheckConfig;
pub use checks::WeeklyWindow;
pub use checks::standard_checks;
pub use clock::LogicalClock;
pub use clock::SystemClock;
pub use evaluator::Evaluator;
pub use executor::DEFAULT_CANARY_OBSERVATION;
pub use executor::ExecutorConfig;
pub use executor::ExecutorError;
pub use executor::GRADUAL_STEPS;
pub use executor::RolloutExecutor;
pub use executor::RolloutWatch;
pub use monitor::DEFAULT_TICK_INTERVAL;
pub use monitor::MonitorConfig;
pub use monitor::MonitorController;
pub use registry::InMemoryFlagRegistry;
pub use safety::CheckContext;
pub use safety::CheckError;
pub use safety::DeploymentSafetyReport;
pub use safety::ReportEntry;
pub use safety::SafetyCheck;
pub use safety::SafetyCheckResult;
pub use safety::SafetyPipeline;
pub use safety::SafetyVerdict;
pub use transitions::FlagWriter;
pub use transitions::StateMutator;
pub use transitions::Transition;
pub use transitions::TransitionError;
pub use triggers::TriggerCondition;
pub use triggers::TriggerSpec;
pub use triggers::TriggerTable;
