// crates/flag-pilot-core/tests/control_plane.rs
// ============================================================================
// Module: Control Plane Tests
// Description: End-to-end tests wiring executor, monitor, and evaluator.
// ============================================================================
//! ## Overview
//! Exercises the full loop: enable starts a watch, degraded metrics roll the
//! flag back automatically, and evaluation reflects every committed state.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use flag_pilot_core::ActorId;
use flag_pilot_core::AuditEvent;
use flag_pilot_core::BusinessSize;
use flag_pilot_core::Environment;
use flag_pilot_core::Evaluator;
use flag_pilot_core::ExecutorConfig;
use flag_pilot_core::FlagDefinition;
use flag_pilot_core::FlagId;
use flag_pilot_core::FlagStatus;
use flag_pilot_core::InMemoryFlagRegistry;
use flag_pilot_core::LogicalClock;
use flag_pilot_core::MetricsSnapshot;
use flag_pilot_core::MonitorConfig;
use flag_pilot_core::MonitorController;
use flag_pilot_core::RegionId;
use flag_pilot_core::RolloutConfig;
use flag_pilot_core::RolloutExecutor;
use flag_pilot_core::RolloutStrategy;
use flag_pilot_core::SafetyPipeline;
use flag_pilot_core::StateMutator;
use flag_pilot_core::Timestamp;
use flag_pilot_core::UserContext;
use flag_pilot_core::UserId;
use flag_pilot_core::interfaces::AlertError;
use flag_pilot_core::interfaces::AlertSink;
use flag_pilot_core::interfaces::AuditError;
use flag_pilot_core::interfaces::AuditSink;
use flag_pilot_core::interfaces::Clock;
use flag_pilot_core::interfaces::FlagRegistry;
use flag_pilot_core::interfaces::MetricsError;
use flag_pilot_core::interfaces::MetricsSource;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Metrics source returning a settable snapshot.
struct FixedMetrics {
    /// Snapshot returned on success.
    snapshot: Mutex<MetricsSnapshot>,
}

impl MetricsSource for FixedMetrics {
    fn snapshot(&self, _flag_id: &FlagId) -> Result<MetricsSnapshot, MetricsError> {
        Ok(*self.snapshot.lock().unwrap())
    }
}

/// Audit sink recording every event.
#[derive(Default)]
struct RecordingAudit {
    /// Recorded events in emission order.
    events: Mutex<Vec<AuditEvent>>,
}

impl AuditSink for RecordingAudit {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Alert sink counting notifications.
#[derive(Default)]
struct CountingAlerts {
    /// Recorded alert messages.
    messages: Mutex<Vec<String>>,
}

impl AlertSink for CountingAlerts {
    fn notify(
        &self,
        _flag_id: &FlagId,
        message: &str,
        _severity: flag_pilot_core::AlertSeverity,
    ) -> Result<(), AlertError> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

/// Full control-plane wiring under test.
struct Plane {
    /// Shared registry.
    registry: Arc<InMemoryFlagRegistry>,
    /// Settable metrics source.
    metrics: Arc<FixedMetrics>,
    /// Executor wired to the monitor.
    executor: RolloutExecutor<InMemoryFlagRegistry, FixedMetrics, RecordingAudit, CountingAlerts>,
    /// Monitoring controller.
    monitor:
        Arc<MonitorController<InMemoryFlagRegistry, FixedMetrics, RecordingAudit, CountingAlerts>>,
}

/// Builds the full control plane with a short monitor tick.
fn plane() -> Plane {
    let registry = Arc::new(InMemoryFlagRegistry::new());
    let audit = Arc::new(RecordingAudit::default());
    let alerts = Arc::new(CountingAlerts::default());
    let metrics = Arc::new(FixedMetrics {
        snapshot: Mutex::new(MetricsSnapshot::healthy()),
    });
    let clock: Arc<dyn Clock> = Arc::new(LogicalClock::new());
    let mutator =
        StateMutator::new(Arc::clone(&registry), Arc::clone(&audit), Arc::clone(&clock));
    let monitor = Arc::new(MonitorController::new(
        mutator.clone(),
        Arc::clone(&metrics),
        Arc::clone(&alerts),
        Arc::clone(&audit),
        Arc::clone(&clock),
        MonitorConfig {
            tick_interval: Duration::from_secs(10),
        },
    ));
    let executor = RolloutExecutor::new(
        mutator,
        Arc::clone(&metrics),
        Arc::clone(&alerts),
        Arc::new(SafetyPipeline::new(Vec::new())),
        clock,
        ExecutorConfig::default(),
    )
    .with_observer(Arc::clone(&monitor) as _);
    Plane {
        registry,
        metrics,
        executor,
        monitor,
    }
}

/// Builds a production user.
fn user(user_id: &str) -> UserContext {
    UserContext::new(
        UserId::new(user_id),
        RegionId::new("us"),
        BusinessSize::Small,
        Environment::new("production"),
    )
}

// ============================================================================
// SECTION: Enable Starts Observation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn enable_starts_a_watch_and_degradation_rolls_back() {
    let plane = plane();
    let flag = FlagId::new("new-checkout");
    let definition = FlagDefinition::new(flag.clone(), [Environment::new("production")]);
    plane.registry.register(definition, Timestamp::Logical(0)).unwrap();

    plane
        .executor
        .enable(
            &flag,
            &ActorId::new("release-bot"),
            &RolloutConfig::new(RolloutStrategy::Instant),
            false,
        )
        .await
        .unwrap();
    assert!(plane.monitor.is_watching(&flag));

    let evaluator = Evaluator::new(Arc::clone(&plane.registry));
    assert!(evaluator.is_enabled(&flag, &user("user-1")));

    // Live metrics degrade after the rollout reached steady state.
    let mut degraded = MetricsSnapshot::healthy();
    degraded.error_rate = 0.3;
    *plane.metrics.snapshot.lock().unwrap() = degraded;

    assert!(plane.monitor.join_watch(&flag).await);

    let state = plane.registry.state(&flag).unwrap().unwrap();
    assert_eq!(state.status, FlagStatus::RolledBack);
    assert!(!evaluator.is_enabled(&flag, &user("user-1")));
}

#[tokio::test(start_paused = true)]
async fn disable_stops_the_watch() {
    let plane = plane();
    let flag = FlagId::new("new-checkout");
    let definition = FlagDefinition::new(flag.clone(), [Environment::new("production")]);
    plane.registry.register(definition, Timestamp::Logical(0)).unwrap();
    let actor = ActorId::new("release-bot");

    plane
        .executor
        .enable(&flag, &actor, &RolloutConfig::new(RolloutStrategy::Instant), false)
        .await
        .unwrap();
    assert!(plane.monitor.is_watching(&flag));

    plane.executor.disable(&flag, &actor, "maintenance").await.unwrap();
    assert!(!plane.monitor.is_watching(&flag));

    let evaluator = Evaluator::new(Arc::clone(&plane.registry));
    assert!(!evaluator.is_enabled(&flag, &user("user-1")));
}
