// crates/flag-pilot-core/tests/evaluator.rs
// ============================================================================
// Module: Evaluator Tests
// Description: Tests for the hot-path flag evaluation gates.
// ============================================================================
//! ## Overview
//! Validates fail-closed behavior, short-circuit gate ordering, targeting
//! rules, percentage bucketing, and dependency chains.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;

use flag_pilot_core::BusinessSize;
use flag_pilot_core::Environment;
use flag_pilot_core::Evaluator;
use flag_pilot_core::FlagDefinition;
use flag_pilot_core::FlagId;
use flag_pilot_core::FlagState;
use flag_pilot_core::FlagStatus;
use flag_pilot_core::InMemoryFlagRegistry;
use flag_pilot_core::RegionId;
use flag_pilot_core::Timestamp;
use flag_pilot_core::UserContext;
use flag_pilot_core::UserId;
use flag_pilot_core::bucket;
use flag_pilot_core::interfaces::FlagRegistry;
use flag_pilot_core::interfaces::UsageSink;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Builds a user in the production environment of region "us".
fn user(user_id: &str) -> UserContext {
    UserContext::new(
        UserId::new(user_id),
        RegionId::new("us"),
        BusinessSize::Small,
        Environment::new("production"),
    )
}

/// Registers a flag gated on in production.
fn register(registry: &InMemoryFlagRegistry, flag_id: &str) -> FlagDefinition {
    let definition =
        FlagDefinition::new(FlagId::new(flag_id), [Environment::new("production")]);
    registry.register(definition.clone(), Timestamp::Logical(0)).unwrap();
    definition
}

/// Commits an enabled state at the given percentage.
fn set_enabled(registry: &InMemoryFlagRegistry, flag_id: &str, percentage: u8) {
    let status = if percentage == 100 { FlagStatus::Steady } else { FlagStatus::RollingOut };
    let state = FlagState {
        enabled: true,
        rollout_percentage: percentage,
        status,
        last_transition_reason: "test".to_string(),
        last_transition_at: Timestamp::Logical(1),
        version: 1,
    };
    registry.commit_state(&FlagId::new(flag_id), &state, "test").unwrap();
}

/// Usage sink recording every observation.
#[derive(Default)]
struct RecordingUsage {
    /// Observed (flag, user, enabled) tuples.
    observed: Mutex<Vec<(FlagId, UserId, bool)>>,
}

impl UsageSink for RecordingUsage {
    fn observe(&self, flag_id: &FlagId, user_id: &UserId, enabled: bool) {
        let mut observed = self.observed.lock().unwrap();
        observed.push((flag_id.clone(), user_id.clone(), enabled));
    }
}

// ============================================================================
// SECTION: Fail-Closed Behavior
// ============================================================================

#[test]
fn unknown_flag_evaluates_false() {
    let registry = Arc::new(InMemoryFlagRegistry::new());
    let evaluator = Evaluator::new(Arc::clone(&registry));
    assert!(!evaluator.is_enabled(&FlagId::new("missing"), &user("user-1")));
}

#[test]
fn registered_flag_defaults_to_disabled() {
    let registry = Arc::new(InMemoryFlagRegistry::new());
    register(&registry, "new-checkout");
    let evaluator = Evaluator::new(Arc::clone(&registry));
    assert!(!evaluator.is_enabled(&FlagId::new("new-checkout"), &user("user-1")));
}

// ============================================================================
// SECTION: Environment Gating
// ============================================================================

#[test]
fn absent_environment_is_gated_off() {
    let registry = Arc::new(InMemoryFlagRegistry::new());
    register(&registry, "new-checkout");
    set_enabled(&registry, "new-checkout", 100);
    let evaluator = Evaluator::new(Arc::clone(&registry));

    let mut staging_user = user("user-1");
    staging_user.environment = Environment::new("staging");
    assert!(!evaluator.is_enabled(&FlagId::new("new-checkout"), &staging_user));
    assert!(evaluator.is_enabled(&FlagId::new("new-checkout"), &user("user-1")));
}

#[test]
fn explicit_environment_override_wins() {
    let registry = Arc::new(InMemoryFlagRegistry::new());
    register(&registry, "new-checkout");
    set_enabled(&registry, "new-checkout", 100);
    let evaluator = Evaluator::new(Arc::clone(&registry));

    let production_user = user("user-1");
    assert!(!evaluator.is_enabled_in(
        &FlagId::new("new-checkout"),
        &production_user,
        &Environment::new("staging"),
    ));
}

// ============================================================================
// SECTION: Targeting Rules
// ============================================================================

#[test]
fn region_targeting_excludes_other_regions() {
    let registry = Arc::new(InMemoryFlagRegistry::new());
    let mut definition = register(&registry, "new-checkout");
    definition.target_regions = BTreeSet::from([RegionId::new("eu")]);
    registry.register(definition, Timestamp::Logical(0)).unwrap();
    set_enabled(&registry, "new-checkout", 100);
    let evaluator = Evaluator::new(Arc::clone(&registry));

    assert!(!evaluator.is_enabled(&FlagId::new("new-checkout"), &user("user-1")));

    let mut eu_user = user("user-1");
    eu_user.region = RegionId::new("eu");
    assert!(evaluator.is_enabled(&FlagId::new("new-checkout"), &eu_user));
}

#[test]
fn business_size_targeting_excludes_other_tiers() {
    let registry = Arc::new(InMemoryFlagRegistry::new());
    let mut definition = register(&registry, "new-checkout");
    definition.target_business_sizes = BTreeSet::from([BusinessSize::Large]);
    registry.register(definition, Timestamp::Logical(0)).unwrap();
    set_enabled(&registry, "new-checkout", 100);
    let evaluator = Evaluator::new(Arc::clone(&registry));

    assert!(!evaluator.is_enabled(&FlagId::new("new-checkout"), &user("user-1")));

    let mut large_user = user("user-1");
    large_user.business_size = BusinessSize::Large;
    assert!(evaluator.is_enabled(&FlagId::new("new-checkout"), &large_user));
}

#[test]
fn empty_targeting_sets_are_unrestricted() {
    let registry = Arc::new(InMemoryFlagRegistry::new());
    register(&registry, "new-checkout");
    set_enabled(&registry, "new-checkout", 100);
    let evaluator = Evaluator::new(Arc::clone(&registry));
    assert!(evaluator.is_enabled(&FlagId::new("new-checkout"), &user("user-1")));
}

// ============================================================================
// SECTION: Percentage Bucketing
// ============================================================================

#[test]
fn partial_rollout_admits_only_low_buckets() {
    let registry = Arc::new(InMemoryFlagRegistry::new());
    register(&registry, "new-checkout");
    set_enabled(&registry, "new-checkout", 30);
    let evaluator = Evaluator::new(Arc::clone(&registry));
    let flag_id = FlagId::new("new-checkout");

    for n in 0..200 {
        let ctx = user(&format!("user-{n}"));
        let expected = bucket(&ctx.user_id, &flag_id) < 30;
        assert_eq!(evaluator.is_enabled(&flag_id, &ctx), expected);
    }
}

#[test]
fn rollout_is_monotonic_per_user() {
    let registry = Arc::new(InMemoryFlagRegistry::new());
    register(&registry, "new-checkout");
    let evaluator = Evaluator::new(Arc::clone(&registry));
    let flag_id = FlagId::new("new-checkout");

    // Every user enabled at 30% must remain enabled as the rollout widens.
    let mut enabled_at_30 = Vec::new();
    set_enabled(&registry, "new-checkout", 30);
    for n in 0..200 {
        let ctx = user(&format!("user-{n}"));
        if evaluator.is_enabled(&flag_id, &ctx) {
            enabled_at_30.push(ctx);
        }
    }
    assert!(!enabled_at_30.is_empty());

    let registry2 = Arc::new(InMemoryFlagRegistry::new());
    register(&registry2, "new-checkout");
    set_enabled(&registry2, "new-checkout", 60);
    let evaluator2 = Evaluator::new(Arc::clone(&registry2));
    for ctx in &enabled_at_30 {
        assert!(evaluator2.is_enabled(&flag_id, ctx));
    }
}

// ============================================================================
// SECTION: Dependencies
// ============================================================================

#[test]
fn disabled_dependency_turns_flag_off() {
    let registry = Arc::new(InMemoryFlagRegistry::new());
    register(&registry, "payments-v2");
    let mut definition = register(&registry, "new-checkout");
    definition.dependencies = vec![FlagId::new("payments-v2")];
    registry.register(definition, Timestamp::Logical(0)).unwrap();
    set_enabled(&registry, "new-checkout", 100);
    let evaluator = Evaluator::new(Arc::clone(&registry));

    assert!(!evaluator.is_enabled(&FlagId::new("new-checkout"), &user("user-1")));

    set_enabled(&registry, "payments-v2", 100);
    assert!(evaluator.is_enabled(&FlagId::new("new-checkout"), &user("user-1")));
}

#[test]
fn cyclic_dependencies_terminate() {
    let registry = Arc::new(InMemoryFlagRegistry::new());
    let mut first = register(&registry, "flag-a");
    let mut second = register(&registry, "flag-b");
    first.dependencies = vec![FlagId::new("flag-b")];
    second.dependencies = vec![FlagId::new("flag-a")];
    registry.register(first, Timestamp::Logical(0)).unwrap();
    registry.register(second, Timestamp::Logical(0)).unwrap();
    set_enabled(&registry, "flag-a", 100);
    set_enabled(&registry, "flag-b", 100);
    let evaluator = Evaluator::new(Arc::clone(&registry));

    // The cycle must terminate; both flags are otherwise fully on.
    assert!(evaluator.is_enabled(&FlagId::new("flag-a"), &user("user-1")));
    assert!(evaluator.is_enabled(&FlagId::new("flag-b"), &user("user-1")));
}

// ============================================================================
// SECTION: Usage Tracking
// ============================================================================

#[test]
fn usage_sink_observes_every_top_level_evaluation() {
    let registry = Arc::new(InMemoryFlagRegistry::new());
    register(&registry, "new-checkout");
    set_enabled(&registry, "new-checkout", 100);
    let usage = Arc::new(RecordingUsage::default());
    let evaluator =
        Evaluator::new(Arc::clone(&registry)).with_usage_sink(Arc::clone(&usage) as _);

    assert!(evaluator.is_enabled(&FlagId::new("new-checkout"), &user("user-1")));
    assert!(!evaluator.is_enabled(&FlagId::new("missing"), &user("user-2")));

    let observed = usage.observed.lock().unwrap();
    assert_eq!(observed.len(), 2);
    assert_eq!(observed[0], (FlagId::new("new-checkout"), UserId::new("user-1"), true));
    assert_eq!(observed[1], (FlagId::new("missing"), UserId::new("user-2"), false));
}
