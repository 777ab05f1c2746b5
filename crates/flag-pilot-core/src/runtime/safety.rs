// crates/flag-pilot-core/src/runtime/safety.rs
// ============================================================================
// Module: Safety Check Pipeline
// Description: Pre-deployment safety checks and report aggregation.
// Purpose: Combine independent check results into one safety verdict.
// Dependencies: crate::{core, interfaces}, serde, thiserror
// ============================================================================

//! ## Overview
//! The safety pipeline runs every registered check and aggregates the
//! results into a [`DeploymentSafetyReport`]. Check order affects only
//! report ordering, never correctness. A check that fails to execute is
//! converted into a failing result with score zero; a critical check's
//! internal failure therefore blocks the deployment rather than silently
//! passing. Reports are constructed on demand and never stored long-term.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;

use crate::core::CheckId;
use crate::core::FlagId;
use crate::interfaces::MetricsSource;

// ============================================================================
// SECTION: Verdict Thresholds
// ============================================================================

/// Overall score below which a report is unsafe outright.
const UNSAFE_SCORE_FLOOR: f64 = 60.0;

/// Overall score below which a report carries a warning verdict.
const WARNING_SCORE_FLOOR: f64 = 80.0;

/// Aggregation weight for critical checks.
const CRITICAL_WEIGHT: f64 = 2.0;

/// Aggregation weight for non-critical checks.
const ADVISORY_WEIGHT: f64 = 1.0;

// ============================================================================
// SECTION: Check Contract
// ============================================================================

/// Errors raised by an individual safety check.
#[derive(Debug, Error)]
pub enum CheckError {
    /// Check could not read the metrics it needs.
    #[error("check metrics unavailable: {0}")]
    MetricsUnavailable(String),
    /// Check failed to execute.
    #[error("check execution failed: {0}")]
    Execution(String),
}

/// Context shared by all checks in one pipeline run.
pub struct CheckContext<'a> {
    /// Instant the pipeline run was requested at.
    pub now: OffsetDateTime,
    /// Metrics source consulted by metric-backed checks.
    pub metrics: &'a dyn MetricsSource,
}

/// Result produced by one safety check execution.
///
/// # Invariants
/// - `score` is in `0..=100`.
/// - `passed == false` results surface `message` as a blocker or warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyCheckResult {
    /// Whether the check passed.
    pub passed: bool,
    /// Check score in `0..=100`.
    pub score: f64,
    /// Human-readable outcome message.
    pub message: String,
    /// Supporting detail lines.
    pub details: Vec<String>,
    /// Advisory recommendations.
    pub recommendations: Vec<String>,
}

impl SafetyCheckResult {
    /// Builds a passing result with a full score.
    #[must_use]
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            score: 100.0,
            message: message.into(),
            details: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    /// Builds a failing result with the given score.
    #[must_use]
    pub fn fail(score: f64, message: impl Into<String>) -> Self {
        Self {
            passed: false,
            score,
            message: message.into(),
            details: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    /// Appends a detail line.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }

    /// Appends a recommendation.
    #[must_use]
    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendations.push(recommendation.into());
        self
    }
}

/// Independent, stateless pre-deployment safety check.
pub trait SafetyCheck: Send + Sync {
    /// Returns the stable check identifier.
    fn check_id(&self) -> CheckId;

    /// Returns true when a failure of this check blocks deployment.
    fn critical(&self) -> bool;

    /// Executes the check for a flag.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError`] when the check cannot execute; the pipeline
    /// converts the error into a failing result with score zero.
    fn execute(
        &self,
        flag_id: &FlagId,
        ctx: &CheckContext<'_>,
    ) -> Result<SafetyCheckResult, CheckError>;
}

// ============================================================================
// SECTION: Safety Report
// ============================================================================

/// Overall safety verdict for a deployment.
///
/// # Invariants
/// - Variants are stable for serialization and scenario assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyVerdict {
    /// No blockers, no warnings, healthy score.
    Safe,
    /// Advisory findings; explicit caller acknowledgement required.
    Warning,
    /// Blocking findings; the deployment must be rejected.
    Unsafe,
}

/// One report entry pairing a check with its result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Check identifier.
    pub check_id: CheckId,
    /// Whether the check is critical.
    pub critical: bool,
    /// Result produced by the check.
    pub result: SafetyCheckResult,
}

/// Aggregated deployment safety report.
///
/// # Invariants
/// - `entries` preserve pipeline registration order.
/// - `blockers` come only from failing critical checks; `warnings` only from
///   failing non-critical checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentSafetyReport {
    /// Overall verdict.
    pub overall_safety: SafetyVerdict,
    /// Weighted mean of all check scores.
    pub overall_score: f64,
    /// Ordered per-check entries.
    pub entries: Vec<ReportEntry>,
    /// Messages from failing critical checks.
    pub blockers: Vec<String>,
    /// Messages from failing non-critical checks.
    pub warnings: Vec<String>,
    /// Aggregated recommendations from all checks.
    pub recommendations: Vec<String>,
}

impl DeploymentSafetyReport {
    /// Returns true when the report blocks deployment.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.overall_safety == SafetyVerdict::Unsafe
    }

    /// Returns a one-line summary for audit reasons and error messages.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "verdict={:?} score={:.1} blockers={} warnings={}",
            self.overall_safety,
            self.overall_score,
            self.blockers.len(),
            self.warnings.len()
        )
    }
}

// ============================================================================
// SECTION: Safety Pipeline
// ============================================================================

/// Ordered pipeline of independent safety checks.
pub struct SafetyPipeline {
    /// Registered checks in report order.
    checks: Vec<Box<dyn SafetyCheck>>,
}

impl SafetyPipeline {
    /// Creates a pipeline from an ordered set of checks.
    #[must_use]
    pub fn new(checks: Vec<Box<dyn SafetyCheck>>) -> Self {
        Self {
            checks,
        }
    }

    /// Returns the number of registered checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Returns true when no checks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Runs every registered check and aggregates the report.
    #[must_use]
    pub fn run(&self, flag_id: &FlagId, ctx: &CheckContext<'_>) -> DeploymentSafetyReport {
        let mut entries = Vec::with_capacity(self.checks.len());
        let mut blockers = Vec::new();
        let mut warnings = Vec::new();
        let mut recommendations = Vec::new();
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;

        for check in &self.checks {
            let critical = check.critical();
            let result = check.execute(flag_id, ctx).unwrap_or_else(|err| {
                SafetyCheckResult::fail(0.0, format!("{}: {err}", check.check_id()))
            });

            let weight = if critical { CRITICAL_WEIGHT } else { ADVISORY_WEIGHT };
            weighted_sum += result.score * weight;
            weight_total += weight;

            if !result.passed {
                if critical {
                    blockers.push(result.message.clone());
                } else {
                    warnings.push(result.message.clone());
                }
            }
            recommendations.extend(result.recommendations.iter().cloned());

            entries.push(ReportEntry {
                check_id: check.check_id(),
                critical,
                result,
            });
        }

        let overall_score = if weight_total > 0.0 { weighted_sum / weight_total } else { 100.0 };
        let overall_safety = if !blockers.is_empty() || overall_score < UNSAFE_SCORE_FLOOR {
            SafetyVerdict::Unsafe
        } else if !warnings.is_empty() || overall_score < WARNING_SCORE_FLOOR {
            SafetyVerdict::Warning
        } else {
            SafetyVerdict::Safe
        };

        DeploymentSafetyReport {
            overall_safety,
            overall_score,
            entries,
            blockers,
            warnings,
            recommendations,
        }
    }
}
