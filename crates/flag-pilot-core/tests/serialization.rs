// crates/flag-pilot-core/tests/serialization.rs
// ============================================================================
// Module: Serialization Tests
// Description: Tests for the stable wire shapes of core types.
// ============================================================================
//! ## Overview
//! Pins the tagged-union and snake_case serialization shapes that external
//! registries and audit consumers depend on.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use flag_pilot_core::FlagState;
use flag_pilot_core::FlagStatus;
use flag_pilot_core::RolloutConfig;
use flag_pilot_core::RolloutStrategy;
use flag_pilot_core::SafetyVerdict;
use flag_pilot_core::Timestamp;
use flag_pilot_core::TriggerCondition;
use serde_json::json;

// ============================================================================
// SECTION: Rollout Strategies
// ============================================================================

#[test]
fn strategies_serialize_as_tagged_unions() {
    let canary = serde_json::to_value(RolloutStrategy::Canary {
        canary_percentage: 5,
    })
    .unwrap();
    assert_eq!(canary, json!({"kind": "canary", "canary_percentage": 5}));

    let instant = serde_json::to_value(RolloutStrategy::Instant).unwrap();
    assert_eq!(instant, json!({"kind": "instant"}));
}

#[test]
fn unknown_strategy_kinds_are_rejected() {
    let err = serde_json::from_value::<RolloutConfig>(json!({
        "strategy": {"kind": "big_bang"},
        "success_threshold": 60.0,
        "error_threshold": 0.05,
    }))
    .unwrap_err();
    assert!(err.to_string().contains("big_bang"));
}

// ============================================================================
// SECTION: Flag State
// ============================================================================

#[test]
fn flag_state_round_trips() {
    let state = FlagState {
        enabled: true,
        rollout_percentage: 30,
        status: FlagStatus::RollingOut,
        last_transition_reason: "gradual rollout step 3/10".to_string(),
        last_transition_at: Timestamp::UnixMillis(1_700_000_000_000),
        version: 4,
    };
    let value = serde_json::to_value(&state).unwrap();
    assert_eq!(value["status"], json!("rolling_out"));
    assert_eq!(
        value["last_transition_at"],
        json!({"kind": "unix_millis", "value": 1_700_000_000_000_i64})
    );
    let decoded: FlagState = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, state);
}

// ============================================================================
// SECTION: Triggers and Verdicts
// ============================================================================

#[test]
fn trigger_conditions_serialize_with_kind_tags() {
    let condition = serde_json::to_value(TriggerCondition::ErrorRateAbove {
        threshold: 0.05,
    })
    .unwrap();
    assert_eq!(condition, json!({"kind": "error_rate_above", "threshold": 0.05}));
}

#[test]
fn verdicts_serialize_as_snake_case() {
    assert_eq!(serde_json::to_value(SafetyVerdict::Unsafe).unwrap(), json!("unsafe"));
    assert_eq!(serde_json::to_value(SafetyVerdict::Safe).unwrap(), json!("safe"));
}
