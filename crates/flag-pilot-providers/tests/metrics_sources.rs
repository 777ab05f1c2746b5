//! Metrics source tests for flag-pilot-providers.
// crates/flag-pilot-providers/tests/metrics_sources.rs
// =============================================================================
// Module: Metrics Source Tests
// Description: Static, environment, and registry metrics source behavior.
// Purpose: Ensure metrics reads are programmable and fail closed.
// =============================================================================

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]
#![allow(clippy::float_cmp, reason = "Tests compare exact configured float values.")]
#![allow(clippy::panic, reason = "Tests panic on unexpected error variants.")]

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use flag_pilot_core::FlagId;
use flag_pilot_core::MetricsError;
use flag_pilot_core::MetricsSnapshot;
use flag_pilot_core::MetricsSource;
use flag_pilot_providers::EnvMetricsConfig;
use flag_pilot_providers::EnvMetricsSource;
use flag_pilot_providers::MetricsSourceRegistry;
use flag_pilot_providers::SourceAccessPolicy;
use flag_pilot_providers::StaticMetricsSource;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// A complete override set for one flag under the default prefix.
fn full_overrides(flag: &str) -> BTreeMap<String, String> {
    let mangled = flag.to_ascii_uppercase().replace('-', "_");
    let rows = [
        ("ERROR_RATE", "0.02"),
        ("QUALITY_SCORE", "92.5"),
        ("SECURITY_SCORE", "88.0"),
        ("USER_SATISFACTION", "76.0"),
        ("REGULATORY_COMPLIANT", "true"),
        ("P95_LATENCY_MS", "120.0"),
        ("P99_LATENCY_MS", "340.0"),
    ];
    rows.into_iter()
        .map(|(field, value)| (format!("FLAG_PILOT_{mangled}_{field}"), value.to_string()))
        .collect()
}

/// Builds an env source backed by the given overrides.
fn env_source(overrides: BTreeMap<String, String>) -> EnvMetricsSource {
    EnvMetricsSource::new(EnvMetricsConfig {
        overrides: Some(overrides),
        ..EnvMetricsConfig::default()
    })
}

// ============================================================================
// SECTION: Static Source
// ============================================================================

#[test]
fn unprogrammed_flags_read_as_unavailable() {
    let source = StaticMetricsSource::new();
    let err = source.snapshot(&FlagId::new("missing")).unwrap_err();
    assert!(matches!(err, MetricsError::Unavailable(_)));
}

#[test]
fn per_flag_entries_override_the_default() {
    let source = StaticMetricsSource::healthy();
    let flag = FlagId::new("checkout");
    let mut degraded = MetricsSnapshot::healthy();
    degraded.error_rate = 0.2;
    source.set(&flag, degraded);

    assert_eq!(source.snapshot(&flag).unwrap().error_rate, 0.2);
    assert_eq!(source.snapshot(&FlagId::new("other")).unwrap().error_rate, 0.0);

    source.clear(&flag);
    assert_eq!(source.snapshot(&flag).unwrap().error_rate, 0.0);
}

#[test]
fn mutate_drives_scenario_changes_in_place() {
    let source = StaticMetricsSource::healthy();
    let flag = FlagId::new("checkout");
    source.mutate(&flag, |snapshot| {
        snapshot.quality_score = 40.0;
    });
    let snapshot = source.snapshot(&flag).unwrap();
    assert_eq!(snapshot.quality_score, 40.0);
    // Untouched fields keep the baseline values.
    assert!(snapshot.regulatory_compliant);
}

// ============================================================================
// SECTION: Environment Source
// ============================================================================

#[test]
fn env_source_reads_a_complete_snapshot() {
    let source = env_source(full_overrides("checkout-redesign"));
    let snapshot = source.snapshot(&FlagId::new("checkout-redesign")).unwrap();
    assert_eq!(snapshot.error_rate, 0.02);
    assert_eq!(snapshot.quality_score, 92.5);
    assert!(snapshot.regulatory_compliant);
    assert_eq!(snapshot.latency.p99_ms, 340.0);
}

#[test]
fn env_source_reports_missing_variables_as_unavailable() {
    let mut overrides = full_overrides("checkout");
    overrides.remove("FLAG_PILOT_CHECKOUT_QUALITY_SCORE");
    let err = env_source(overrides).snapshot(&FlagId::new("checkout")).unwrap_err();
    match err {
        MetricsError::Unavailable(message) => {
            assert!(message.contains("FLAG_PILOT_CHECKOUT_QUALITY_SCORE"));
        }
        other => panic!("expected unavailable, got {other}"),
    }
}

#[test]
fn env_source_rejects_malformed_values() {
    let mut overrides = full_overrides("checkout");
    overrides.insert("FLAG_PILOT_CHECKOUT_ERROR_RATE".to_string(), "two percent".to_string());
    let err = env_source(overrides).snapshot(&FlagId::new("checkout")).unwrap_err();
    assert!(matches!(err, MetricsError::Invalid(_)));

    let mut overrides = full_overrides("checkout");
    overrides.insert("FLAG_PILOT_CHECKOUT_REGULATORY_COMPLIANT".to_string(), "yes".to_string());
    let err = env_source(overrides).snapshot(&FlagId::new("checkout")).unwrap_err();
    match err {
        MetricsError::Invalid(message) => assert!(message.contains("expected true or false")),
        other => panic!("expected invalid, got {other}"),
    }
}

#[test]
fn env_source_rejects_oversized_values() {
    let mut overrides = full_overrides("checkout");
    overrides.insert("FLAG_PILOT_CHECKOUT_ERROR_RATE".to_string(), "0".repeat(300));
    let err = env_source(overrides).snapshot(&FlagId::new("checkout")).unwrap_err();
    match err {
        MetricsError::Invalid(message) => assert!(message.contains("size limit")),
        other => panic!("expected invalid, got {other}"),
    }
}

// ============================================================================
// SECTION: Source Registry
// ============================================================================

#[test]
fn registry_routes_assigned_flags_and_falls_back_to_the_default() {
    let canary_flag = FlagId::new("canary");
    let degraded = StaticMetricsSource::healthy();
    degraded.mutate(&canary_flag, |snapshot| {
        snapshot.error_rate = 0.5;
    });

    let mut registry = MetricsSourceRegistry::new(SourceAccessPolicy::allow_all());
    registry.register("healthy", Arc::new(StaticMetricsSource::healthy()));
    registry.register("degraded", Arc::new(degraded));
    registry.set_default("healthy");
    registry.assign(canary_flag.clone(), "degraded");

    assert_eq!(registry.names(), vec!["degraded", "healthy"]);
    assert_eq!(registry.snapshot(&canary_flag).unwrap().error_rate, 0.5);
    assert_eq!(registry.snapshot(&FlagId::new("other")).unwrap().error_rate, 0.0);
}

#[test]
fn registry_without_a_route_reads_as_unavailable() {
    let registry = MetricsSourceRegistry::new(SourceAccessPolicy::allow_all());
    let err = registry.snapshot(&FlagId::new("orphan")).unwrap_err();
    match err {
        MetricsError::Unavailable(message) => assert!(message.contains("no metrics source")),
        other => panic!("expected unavailable, got {other}"),
    }
}

#[test]
fn registry_enforces_the_access_policy() {
    let mut registry = MetricsSourceRegistry::new(SourceAccessPolicy {
        allowlist: None,
        denylist: BTreeSet::from(["blocked".to_string()]),
    });
    registry.register("blocked", Arc::new(StaticMetricsSource::healthy()));
    registry.set_default("blocked");

    let err = registry.snapshot(&FlagId::new("any")).unwrap_err();
    match err {
        MetricsError::Unavailable(message) => assert!(message.contains("blocked by policy")),
        other => panic!("expected unavailable, got {other}"),
    }
}
