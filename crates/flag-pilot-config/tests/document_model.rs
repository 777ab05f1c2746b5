//! Document model tests for flag-pilot-config.
// crates/flag-pilot-config/tests/document_model.rs
// =============================================================================
// Module: Config Document Model Tests
// Description: Parsing, validation, conversion, diagnostics, and seeding.
// Purpose: Ensure documents convert faithfully into runtime inputs.
// =============================================================================

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]
#![allow(clippy::float_cmp, reason = "Tests compare exact configured float values.")]

use flag_pilot_config::ConfigError;
use flag_pilot_config::DiagnosticCode;
use flag_pilot_config::FlagSetConfig;
use flag_pilot_core::AlertSeverity;
use flag_pilot_core::BusinessSize;
use flag_pilot_core::DayOfWeek;
use flag_pilot_core::FlagId;
use flag_pilot_core::FlagRegistry;
use flag_pilot_core::InMemoryFlagRegistry;
use flag_pilot_core::Timestamp;
use flag_pilot_core::TriggerCondition;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Parses a document expected to be valid.
fn parse(document: &str) -> FlagSetConfig {
    FlagSetConfig::from_toml(document).unwrap()
}

/// Asserts a document is rejected with a message containing `needle`.
fn assert_invalid(document: &str, needle: &str) {
    let err = FlagSetConfig::from_toml(document).unwrap_err();
    let message = err.to_string();
    assert!(message.contains(needle), "error {message} did not contain {needle}");
}

/// A document exercising every section.
const FULL_DOCUMENT: &str = r#"
    [[flag]]
    id = "checkout-redesign"
    target_regions = ["us-east", "eu-west"]
    target_business_sizes = ["small", "medium"]
    dependencies = ["payments-v2"]
    kill_switch = true

    [flag.environments]
    production = true
    staging = false

    [flag.rollback_thresholds]
    max_error_rate = 0.02
    min_quality_score = 75.0

    [[flag]]
    id = "payments-v2"

    [flag.environments]
    production = true

    [safety]
    open_hour = 8
    close_hour = 18
    blackout_dates = ["2026-12-24"]
    blackout_blocks = true

    [safety.restricted_window]
    day = "friday"
    open_hour = 11
    close_hour = 13

    [[trigger]]
    id = "error-rate"
    kind = "error_rate_above"
    threshold = 0.05
    auto_rollback = true
    severity = "high"

    [[trigger]]
    id = "latency"
    kind = "latency_above"
    p95_latency_ms = 500.0
    p99_latency_ms = 1000.0
    auto_rollback = true
"#;

// ============================================================================
// SECTION: Parsing and Defaults
// ============================================================================

#[test]
fn empty_documents_fall_back_to_defaults() {
    let config = parse("");
    assert!(config.flags.is_empty());
    assert!(config.triggers.is_empty());
    assert_eq!(config.safety.open_hour, 9);
    assert_eq!(config.safety.close_hour, 17);
    assert!(config.trigger_table().unwrap().is_none());
}

#[test]
fn full_documents_convert_to_runtime_inputs() {
    let config = parse(FULL_DOCUMENT);

    let definitions = config.flag_definitions().unwrap();
    assert_eq!(definitions.len(), 2);
    let checkout = &definitions[0];
    assert_eq!(checkout.id, FlagId::new("checkout-redesign"));
    assert!(checkout.kill_switch);
    assert!(checkout.target_business_sizes.contains(&BusinessSize::Small));
    assert_eq!(checkout.dependencies, vec![FlagId::new("payments-v2")]);
    assert_eq!(checkout.rollback_thresholds.max_error_rate, 0.02);
    assert_eq!(checkout.rollback_thresholds.min_quality_score, 75.0);
    // Unset thresholds keep their field defaults.
    assert_eq!(checkout.rollback_thresholds.latency.p95_ms, 500.0);

    let safety = config.safety.check_config().unwrap();
    assert_eq!(safety.business_hours.open_hour, 8);
    assert_eq!(safety.business_hours.close_hour, 18);
    assert!(safety.blackout_blocks);
    assert_eq!(safety.blackout_dates.len(), 1);
    assert_eq!(safety.restricted_window.unwrap().day, DayOfWeek::Friday);

    let table = config.trigger_table().unwrap().unwrap();
    let rows = table.rows();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].auto_rollback);
    assert_eq!(rows[0].severity, AlertSeverity::High);
    assert_eq!(rows[0].condition, TriggerCondition::ErrorRateAbove {
        threshold: 0.05,
    });
}

#[test]
fn unknown_fields_are_rejected() {
    let err = FlagSetConfig::from_toml("retries = 3").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.to_string().contains("retries"));

    assert_invalid(
        r#"
        [[flag]]
        id = "a"
        rollout = "gradual"
        "#,
        "rollout",
    );
}

// ============================================================================
// SECTION: Validation Failures
// ============================================================================

#[test]
fn duplicate_flag_ids_are_rejected() {
    assert_invalid(
        r#"
        [[flag]]
        id = "a"
        [[flag]]
        id = "a"
        "#,
        "duplicate flag id",
    );
}

#[test]
fn blank_flag_ids_are_rejected() {
    assert_invalid(
        r#"
        [[flag]]
        id = "  "
        "#,
        "flag.id must not be empty",
    );
}

#[test]
fn unknown_labels_are_rejected() {
    assert_invalid(
        r#"
        [[flag]]
        id = "a"
        target_business_sizes = ["galactic"]
        "#,
        "unknown business size",
    );
    assert_invalid(
        r#"
        [safety]
        business_days = ["funday"]
        "#,
        "unknown day of week",
    );
    assert_invalid(
        r#"
        [safety]
        blackout_dates = ["christmas"]
        "#,
        "invalid blackout date",
    );
}

#[test]
fn inverted_hour_windows_are_rejected() {
    assert_invalid(
        r#"
        [safety]
        open_hour = 18
        close_hour = 9
        "#,
        "open < close",
    );
}

#[test]
fn out_of_range_thresholds_are_rejected() {
    assert_invalid(
        r#"
        [[flag]]
        id = "a"
        [flag.rollback_thresholds]
        max_error_rate = 1.5
        "#,
        "max_error_rate must be in [0, 1]",
    );
}

#[test]
fn malformed_triggers_are_rejected() {
    assert_invalid(
        r#"
        [[trigger]]
        id = "t"
        kind = "vibes_below"
        "#,
        "unknown kind",
    );
    assert_invalid(
        r#"
        [[trigger]]
        id = "t"
        kind = "error_rate_above"
        "#,
        "requires threshold",
    );
    assert_invalid(
        r#"
        [[trigger]]
        id = "t"
        kind = "latency_above"
        p95_latency_ms = 500.0
        "#,
        "requires p95_latency_ms and p99_latency_ms",
    );
    assert_invalid(
        r#"
        [[trigger]]
        id = "t"
        kind = "regulatory_non_compliant"
        severity = "catastrophic"
        "#,
        "unknown severity",
    );
    assert_invalid(
        r#"
        [[trigger]]
        id = "t"
        kind = "regulatory_non_compliant"
        [[trigger]]
        id = "t"
        kind = "regulatory_non_compliant"
        "#,
        "duplicate trigger id",
    );
}

// ============================================================================
// SECTION: Diagnostics
// ============================================================================

#[test]
fn diagnostics_flag_unknown_dependencies() {
    let config = parse(
        r#"
        [[flag]]
        id = "a"
        dependencies = ["ghost"]
        [flag.environments]
        production = true
        "#,
    );
    let findings = config.diagnostics();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].code, DiagnosticCode::UnknownDependency);
    assert_eq!(findings[0].flag_id, "a");
    assert!(findings[0].message.contains("ghost"));
}

#[test]
fn diagnostics_flag_dependency_cycles() {
    let config = parse(
        r#"
        [[flag]]
        id = "a"
        dependencies = ["b"]
        [flag.environments]
        production = true
        [[flag]]
        id = "b"
        dependencies = ["a"]
        [flag.environments]
        production = true
        "#,
    );
    let cycles: Vec<_> = config
        .diagnostics()
        .into_iter()
        .filter(|finding| finding.code == DiagnosticCode::DependencyCycle)
        .map(|finding| finding.flag_id)
        .collect();
    assert_eq!(cycles, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn diagnostics_flag_fully_gated_flags() {
    let config = parse(
        r#"
        [[flag]]
        id = "a"
        [flag.environments]
        production = false
        "#,
    );
    let findings = config.diagnostics();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].code, DiagnosticCode::NoEnabledEnvironments);
}

#[test]
fn clean_documents_have_no_diagnostics() {
    let config = parse(FULL_DOCUMENT);
    assert!(config.diagnostics().is_empty());
}

// ============================================================================
// SECTION: Registry Seeding
// ============================================================================

#[test]
fn seeding_registers_every_declared_flag() {
    let config = parse(FULL_DOCUMENT);
    let registry = InMemoryFlagRegistry::new();
    let findings = config.seed(&registry, Timestamp::UnixMillis(0)).unwrap();
    assert!(findings.is_empty());

    let checkout = registry.definition(&FlagId::new("checkout-redesign")).unwrap().unwrap();
    assert!(checkout.kill_switch);
    let state = registry.state(&FlagId::new("payments-v2")).unwrap().unwrap();
    assert!(!state.enabled);
    assert_eq!(state.version, 0);
}
