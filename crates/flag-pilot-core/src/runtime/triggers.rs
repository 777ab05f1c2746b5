// crates/flag-pilot-core/src/runtime/triggers.rs
// ============================================================================
// Module: Rollback Trigger Table
// Description: Declarative live-metric rollback triggers.
// Purpose: Name the conditions that demand automatic or manual rollback.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! Rollback triggers are declarative and stateless: each row pairs a metric
//! condition with a severity and an auto-rollback marker. The table is built
//! once at startup and shared read-only by the monitoring controller, which
//! acts on the first firing row per tick.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::AlertSeverity;
use crate::core::LatencyCeilings;
use crate::core::MetricsSnapshot;
use crate::core::RollbackThresholds;
use crate::core::TriggerId;

// ============================================================================
// SECTION: Trigger Conditions
// ============================================================================

/// Declarative metric condition evaluated against a snapshot.
///
/// # Invariants
/// - Variants are stable for serialization and configuration matching.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum TriggerCondition {
    /// Error rate strictly above the threshold ratio.
    ErrorRateAbove {
        /// Maximum tolerated error-rate ratio.
        threshold: f64,
    },
    /// Quality/cultural score strictly below the threshold.
    QualityScoreBelow {
        /// Minimum tolerated quality score.
        threshold: f64,
    },
    /// Either tracked latency figure above its ceiling.
    LatencyAbove {
        /// Latency ceilings in milliseconds.
        ceilings: LatencyCeilings,
    },
    /// Regulatory-compliance verdict went false.
    RegulatoryNonCompliant,
    /// User-satisfaction proxy strictly below the threshold.
    UserSatisfactionBelow {
        /// Minimum tolerated satisfaction score.
        threshold: f64,
    },
}

impl TriggerCondition {
    /// Returns true when the condition fires for `snapshot`.
    #[must_use]
    pub fn fires(&self, snapshot: &MetricsSnapshot) -> bool {
        match self {
            Self::ErrorRateAbove {
                threshold,
            } => snapshot.error_rate > *threshold,
            Self::QualityScoreBelow {
                threshold,
            } => snapshot.quality_score < *threshold,
            Self::LatencyAbove {
                ceilings,
            } => {
                snapshot.latency.p95_ms > ceilings.p95_ms
                    || snapshot.latency.p99_ms > ceilings.p99_ms
            }
            Self::RegulatoryNonCompliant => !snapshot.regulatory_compliant,
            Self::UserSatisfactionBelow {
                threshold,
            } => snapshot.user_satisfaction < *threshold,
        }
    }

    /// Describes the firing condition against observed values.
    #[must_use]
    pub fn describe(&self, snapshot: &MetricsSnapshot) -> String {
        match self {
            Self::ErrorRateAbove {
                threshold,
            } => format!(
                "error rate {:.1}% above threshold {:.1}%",
                snapshot.error_rate * 100.0,
                threshold * 100.0
            ),
            Self::QualityScoreBelow {
                threshold,
            } => format!(
                "quality score {:.1} below threshold {threshold:.1}",
                snapshot.quality_score
            ),
            Self::LatencyAbove {
                ceilings,
            } => format!(
                "latency p95 {:.0}ms/p99 {:.0}ms above ceilings {:.0}ms/{:.0}ms",
                snapshot.latency.p95_ms, snapshot.latency.p99_ms, ceilings.p95_ms, ceilings.p99_ms
            ),
            Self::RegulatoryNonCompliant => "regulatory compliance check went false".to_string(),
            Self::UserSatisfactionBelow {
                threshold,
            } => format!(
                "user satisfaction {:.1} below threshold {threshold:.1}",
                snapshot.user_satisfaction
            ),
        }
    }
}

// ============================================================================
// SECTION: Trigger Specs
// ============================================================================

/// One declarative rollback trigger.
///
/// # Invariants
/// - Triggers are stateless; all state lives in the monitoring controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerSpec {
    /// Stable trigger identifier.
    pub id: TriggerId,
    /// Metric condition evaluated each tick.
    pub condition: TriggerCondition,
    /// Whether a firing trigger rolls the flag back automatically.
    pub auto_rollback: bool,
    /// Alert severity raised when the trigger fires.
    pub severity: AlertSeverity,
}

// ============================================================================
// SECTION: Trigger Table
// ============================================================================

/// Ordered, read-shared table of rollback triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerTable {
    /// Trigger rows in evaluation order.
    triggers: Vec<TriggerSpec>,
}

impl TriggerTable {
    /// Creates a table from explicit rows.
    #[must_use]
    pub const fn new(triggers: Vec<TriggerSpec>) -> Self {
        Self {
            triggers,
        }
    }

    /// Builds the standard trigger table from a flag's rollback thresholds.
    #[must_use]
    pub fn standard(thresholds: &RollbackThresholds) -> Self {
        Self::new(vec![
            TriggerSpec {
                id: TriggerId::new("error-rate"),
                condition: TriggerCondition::ErrorRateAbove {
                    threshold: thresholds.max_error_rate,
                },
                auto_rollback: true,
                severity: AlertSeverity::High,
            },
            TriggerSpec {
                id: TriggerId::new("quality-score"),
                condition: TriggerCondition::QualityScoreBelow {
                    threshold: thresholds.min_quality_score,
                },
                auto_rollback: true,
                severity: AlertSeverity::High,
            },
            TriggerSpec {
                id: TriggerId::new("latency"),
                condition: TriggerCondition::LatencyAbove {
                    ceilings: thresholds.latency,
                },
                auto_rollback: true,
                severity: AlertSeverity::Medium,
            },
            TriggerSpec {
                id: TriggerId::new("regulatory-compliance"),
                condition: TriggerCondition::RegulatoryNonCompliant,
                auto_rollback: true,
                severity: AlertSeverity::Critical,
            },
            TriggerSpec {
                id: TriggerId::new("user-satisfaction"),
                condition: TriggerCondition::UserSatisfactionBelow {
                    threshold: 60.0,
                },
                auto_rollback: false,
                severity: AlertSeverity::Low,
            },
        ])
    }

    /// Returns the trigger rows in evaluation order.
    #[must_use]
    pub fn rows(&self) -> &[TriggerSpec] {
        &self.triggers
    }

    /// Returns the first trigger firing for `snapshot`, if any.
    #[must_use]
    pub fn first_firing(&self, snapshot: &MetricsSnapshot) -> Option<&TriggerSpec> {
        self.triggers.iter().find(|spec| spec.condition.fires(snapshot))
    }
}
