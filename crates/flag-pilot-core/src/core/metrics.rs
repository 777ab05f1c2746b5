// crates/flag-pilot-core/src/core/metrics.rs
// ============================================================================
// Module: Metrics Snapshot
// Description: Opaque live-metrics input consumed by checks and triggers.
// Purpose: Name the numeric fields the control plane reads, nothing more.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`MetricsSnapshot`] is an external input: how the figures are computed or
//! collected is out of scope. The safety pipeline and the monitoring
//! controller only read the named numeric fields they need per check or
//! trigger, and treat a failed fetch as a degraded signal rather than a
//! silent pass.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Latency Sample
// ============================================================================

/// Performance bundle with the two tracked latency figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencySample {
    /// Observed p95 latency in milliseconds.
    pub p95_ms: f64,
    /// Observed p99 latency in milliseconds.
    pub p99_ms: f64,
}

// ============================================================================
// SECTION: Metrics Snapshot
// ============================================================================

/// Point-in-time metrics snapshot for one flag.
///
/// # Invariants
/// - `error_rate` is a ratio in `[0, 1]`.
/// - Score fields are expressed on a `0..=100` scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Observed error rate for traffic behind the flag.
    pub error_rate: f64,
    /// Quality/cultural compliance score.
    pub quality_score: f64,
    /// Security/privacy validation score.
    pub security_score: f64,
    /// User-satisfaction proxy score.
    pub user_satisfaction: f64,
    /// Regulatory-compliance verdict (for example tax-document compliance).
    pub regulatory_compliant: bool,
    /// Tracked latency figures.
    pub latency: LatencySample,
}

impl MetricsSnapshot {
    /// Returns a healthy snapshot useful as a fixture baseline.
    #[must_use]
    pub const fn healthy() -> Self {
        Self {
            error_rate: 0.0,
            quality_score: 100.0,
            security_score: 100.0,
            user_satisfaction: 100.0,
            regulatory_compliant: true,
            latency: LatencySample {
                p95_ms: 50.0,
                p99_ms: 120.0,
            },
        }
    }
}
