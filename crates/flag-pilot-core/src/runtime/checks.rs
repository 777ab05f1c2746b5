// crates/flag-pilot-core/src/runtime/checks.rs
// ============================================================================
// Module: Canonical Safety Checks
// Description: Data-driven table of the built-in pre-deployment checks.
// Purpose: Implement the standard check set over one shared configuration.
// Dependencies: crate::{core, interfaces, runtime::safety}, time
// ============================================================================

//! ## Overview
//! The canonical checks are declarative: one [`ConfiguredCheck`] per row of
//! the standard table, each evaluating a [`CheckKind`] against the shared
//! [`SafetyCheckConfig`] and the current metrics snapshot. Time-window checks
//! read the pipeline instant from the check context; metric-backed checks
//! read the metrics source and fail degraded (never pass silently) when the
//! fetch fails.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use time::Date;
use time::OffsetDateTime;
use time::Weekday;

use crate::core::CheckId;
use crate::core::FlagId;
use crate::core::LatencyCeilings;
use crate::core::MetricsSnapshot;
use crate::runtime::safety::CheckContext;
use crate::runtime::safety::CheckError;
use crate::runtime::safety::SafetyCheck;
use crate::runtime::safety::SafetyCheckResult;

// ============================================================================
// SECTION: Time Windows
// ============================================================================

/// Day of week used by window configuration.
///
/// # Invariants
/// - Variants are stable for configuration matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DayOfWeek {
    /// Monday.
    Monday,
    /// Tuesday.
    Tuesday,
    /// Wednesday.
    Wednesday,
    /// Thursday.
    Thursday,
    /// Friday.
    Friday,
    /// Saturday.
    Saturday,
    /// Sunday.
    Sunday,
}

impl DayOfWeek {
    /// Returns true when `weekday` names the same day.
    #[must_use]
    pub const fn matches(self, weekday: Weekday) -> bool {
        matches!(
            (self, weekday),
            (Self::Monday, Weekday::Monday)
                | (Self::Tuesday, Weekday::Tuesday)
                | (Self::Wednesday, Weekday::Wednesday)
                | (Self::Thursday, Weekday::Thursday)
                | (Self::Friday, Weekday::Friday)
                | (Self::Saturday, Weekday::Saturday)
                | (Self::Sunday, Weekday::Sunday)
        )
    }
}

/// Daily hour window, inclusive start and exclusive end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoursWindow {
    /// Opening hour in `0..24`.
    pub open_hour: u8,
    /// Closing hour in `0..=24`, exclusive.
    pub close_hour: u8,
}

impl HoursWindow {
    /// Returns true when `at` falls inside the window.
    #[must_use]
    pub fn contains(&self, at: OffsetDateTime) -> bool {
        let hour = at.hour();
        hour >= self.open_hour && hour < self.close_hour
    }
}

/// Recurring weekly window, such as a weekly deployment blackout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyWindow {
    /// Day the window recurs on.
    pub day: DayOfWeek,
    /// Window hours on that day.
    pub hours: HoursWindow,
}

impl WeeklyWindow {
    /// Returns true when `at` falls inside the recurring window.
    #[must_use]
    pub fn contains(&self, at: OffsetDateTime) -> bool {
        self.day.matches(at.weekday()) && self.hours.contains(at)
    }
}

// ============================================================================
// SECTION: Check Configuration
// ============================================================================

/// Shared configuration for the canonical check table.
///
/// # Invariants
/// - Score minimums are in `0..=100`; latency ceilings are positive.
#[derive(Debug, Clone)]
pub struct SafetyCheckConfig {
    /// Local business-hours window (advisory only).
    pub business_hours: HoursWindow,
    /// Days counted as business days.
    pub business_days: BTreeSet<DayOfWeek>,
    /// Recurring weekly restricted window, if any.
    pub restricted_window: Option<WeeklyWindow>,
    /// Whether the restricted window blocks instead of warning.
    pub restricted_window_blocks: bool,
    /// Calendar dates with a deployment blackout.
    pub blackout_dates: BTreeSet<Date>,
    /// Whether blackout dates block instead of warning.
    pub blackout_blocks: bool,
    /// Minimum quality/cultural compliance score.
    pub min_quality_score: f64,
    /// Minimum security/privacy validation score.
    pub min_security_score: f64,
    /// Latency ceilings for the performance-impact check.
    pub latency_ceilings: LatencyCeilings,
}

impl Default for SafetyCheckConfig {
    fn default() -> Self {
        Self {
            business_hours: HoursWindow {
                open_hour: 9,
                close_hour: 17,
            },
            business_days: BTreeSet::from([
                DayOfWeek::Monday,
                DayOfWeek::Tuesday,
                DayOfWeek::Wednesday,
                DayOfWeek::Thursday,
                DayOfWeek::Friday,
            ]),
            restricted_window: Some(WeeklyWindow {
                day: DayOfWeek::Friday,
                hours: HoursWindow {
                    open_hour: 11,
                    close_hour: 13,
                },
            }),
            restricted_window_blocks: false,
            blackout_dates: BTreeSet::new(),
            blackout_blocks: false,
            min_quality_score: 70.0,
            min_security_score: 80.0,
            latency_ceilings: LatencyCeilings {
                p95_ms: 500.0,
                p99_ms: 1_000.0,
            },
        }
    }
}

// ============================================================================
// SECTION: Check Kinds
// ============================================================================

/// Canonical check selector evaluated against the shared configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckKind {
    /// Advisory business-hours window.
    BusinessHours,
    /// Recurring weekly restricted window.
    RestrictedWindow,
    /// Blackout calendar dates.
    BlackoutCalendar,
    /// Quality/cultural compliance score minimum.
    QualityScore,
    /// Regulatory compliance verdict.
    RegulatoryCompliance,
    /// Latency figures below configured ceilings.
    PerformanceImpact,
    /// Security/privacy score minimum.
    SecurityScore,
}

/// One configured row of the canonical check table.
pub struct ConfiguredCheck {
    /// Stable check identifier.
    id: CheckId,
    /// Whether a failure blocks deployment.
    critical: bool,
    /// Check selector.
    kind: CheckKind,
    /// Shared check configuration.
    config: SafetyCheckConfig,
}

impl SafetyCheck for ConfiguredCheck {
    fn check_id(&self) -> CheckId {
        self.id.clone()
    }

    fn critical(&self) -> bool {
        self.critical
    }

    fn execute(
        &self,
        flag_id: &FlagId,
        ctx: &CheckContext<'_>,
    ) -> Result<SafetyCheckResult, CheckError> {
        match self.kind {
            CheckKind::BusinessHours => Ok(self.business_hours(ctx.now)),
            CheckKind::RestrictedWindow => Ok(self.restricted_window(ctx.now)),
            CheckKind::BlackoutCalendar => Ok(self.blackout_calendar(ctx.now)),
            CheckKind::QualityScore => Ok(self.quality_score(&self.fetch(flag_id, ctx)?)),
            CheckKind::RegulatoryCompliance => {
                Ok(Self::regulatory_compliance(&self.fetch(flag_id, ctx)?))
            }
            CheckKind::PerformanceImpact => {
                Ok(self.performance_impact(&self.fetch(flag_id, ctx)?))
            }
            CheckKind::SecurityScore => Ok(self.security_score(&self.fetch(flag_id, ctx)?)),
        }
    }
}

impl ConfiguredCheck {
    /// Fetches the metrics snapshot, mapping failures into check errors.
    fn fetch(
        &self,
        flag_id: &FlagId,
        ctx: &CheckContext<'_>,
    ) -> Result<MetricsSnapshot, CheckError> {
        ctx.metrics
            .snapshot(flag_id)
            .map_err(|err| CheckError::MetricsUnavailable(format!("{}: {err}", self.id)))
    }

    /// Evaluates the advisory business-hours window.
    fn business_hours(&self, now: OffsetDateTime) -> SafetyCheckResult {
        let in_days = self.config.business_days.iter().any(|day| day.matches(now.weekday()));
        if in_days && self.config.business_hours.contains(now) {
            SafetyCheckResult::pass("within business hours")
        } else {
            SafetyCheckResult::fail(50.0, "outside configured business hours")
                .with_recommendation("prefer deploying during business hours for faster response")
        }
    }

    /// Evaluates the recurring weekly restricted window.
    fn restricted_window(&self, now: OffsetDateTime) -> SafetyCheckResult {
        match &self.config.restricted_window {
            Some(window) if window.contains(now) => {
                SafetyCheckResult::fail(40.0, "inside the weekly restricted window")
                    .with_recommendation("wait for the restricted window to pass")
            }
            _ => SafetyCheckResult::pass("outside restricted windows"),
        }
    }

    /// Evaluates the blackout calendar.
    fn blackout_calendar(&self, now: OffsetDateTime) -> SafetyCheckResult {
        if self.config.blackout_dates.contains(&now.date()) {
            SafetyCheckResult::fail(30.0, "current date is in the blackout calendar")
                .with_detail(format!("blackout date: {}", now.date()))
        } else {
            SafetyCheckResult::pass("no blackout for the current date")
        }
    }

    /// Evaluates the quality/cultural compliance score minimum.
    fn quality_score(&self, snapshot: &MetricsSnapshot) -> SafetyCheckResult {
        if snapshot.quality_score >= self.config.min_quality_score {
            SafetyCheckResult::pass("quality score within tolerance")
        } else {
            SafetyCheckResult::fail(
                snapshot.quality_score.clamp(0.0, 100.0),
                format!(
                    "quality score {:.1} below minimum {:.1}",
                    snapshot.quality_score, self.config.min_quality_score
                ),
            )
        }
    }

    /// Evaluates the regulatory-compliance verdict.
    fn regulatory_compliance(snapshot: &MetricsSnapshot) -> SafetyCheckResult {
        if snapshot.regulatory_compliant {
            SafetyCheckResult::pass("regulatory compliance verified")
        } else {
            SafetyCheckResult::fail(0.0, "regulatory compliance validation failed")
                .with_recommendation("resolve compliance findings before rollout")
        }
    }

    /// Evaluates latency figures against the configured ceilings.
    fn performance_impact(&self, snapshot: &MetricsSnapshot) -> SafetyCheckResult {
        let ceilings = self.config.latency_ceilings;
        let p95_ok = snapshot.latency.p95_ms < ceilings.p95_ms;
        let p99_ok = snapshot.latency.p99_ms < ceilings.p99_ms;
        if p95_ok && p99_ok {
            SafetyCheckResult::pass("latency within ceilings")
        } else {
            SafetyCheckResult::fail(
                40.0,
                format!(
                    "latency above ceiling (p95 {:.0}ms/{:.0}ms, p99 {:.0}ms/{:.0}ms)",
                    snapshot.latency.p95_ms, ceilings.p95_ms, snapshot.latency.p99_ms,
                    ceilings.p99_ms
                ),
            )
        }
    }

    /// Evaluates the security/privacy score minimum.
    fn security_score(&self, snapshot: &MetricsSnapshot) -> SafetyCheckResult {
        if snapshot.security_score >= self.config.min_security_score {
            SafetyCheckResult::pass("security score within tolerance")
        } else {
            SafetyCheckResult::fail(
                snapshot.security_score.clamp(0.0, 100.0),
                format!(
                    "security score {:.1} below minimum {:.1}",
                    snapshot.security_score, self.config.min_security_score
                ),
            )
        }
    }
}

// ============================================================================
// SECTION: Standard Check Table
// ============================================================================

/// Builds the canonical ordered check table over one configuration.
#[must_use]
pub fn standard_checks(config: &SafetyCheckConfig) -> Vec<Box<dyn SafetyCheck>> {
    let rows: [(&str, bool, CheckKind); 7] = [
        ("business-hours", false, CheckKind::BusinessHours),
        ("restricted-window", config.restricted_window_blocks, CheckKind::RestrictedWindow),
        ("blackout-calendar", config.blackout_blocks, CheckKind::BlackoutCalendar),
        ("quality-score", true, CheckKind::QualityScore),
        ("regulatory-compliance", true, CheckKind::RegulatoryCompliance),
        ("performance-impact", true, CheckKind::PerformanceImpact),
        ("security-score", true, CheckKind::SecurityScore),
    ];

    rows.into_iter()
        .map(|(id, critical, kind)| {
            Box::new(ConfiguredCheck {
                id: CheckId::new(id),
                critical,
                kind,
                config: config.clone(),
            }) as Box<dyn SafetyCheck>
        })
        .collect()
}
