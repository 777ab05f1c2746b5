// crates/flag-pilot-core/src/runtime/monitor.rs
// ============================================================================
// Module: Monitoring Controller
// Description: Post-deployment metric watching and automatic rollback.
// Purpose: Watch live flags, evaluate rollback triggers, and roll back or
//          alert per trigger policy.
// Dependencies: crate::{core, interfaces, runtime}, tokio, tracing
// ============================================================================

//! ## Overview
//! The monitoring controller owns one watch task per observed flag. Each tick
//! re-reads committed state, fetches a metrics snapshot, and evaluates the
//! flag's trigger table in order, acting on the first firing row only. An
//! auto-rollback trigger rolls the flag back through the shared serialized
//! mutator (never through the executor) and stops the watch; a manual trigger
//! raises an alert and keeps watching. A metrics fetch failure is itself
//! alert-worthy and never treated as healthy. Watch registration is
//! idempotent and per-flag failures never disturb other watches.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::ActorId;
use crate::core::AlertSeverity;
use crate::core::AuditEvent;
use crate::core::AuditEventKind;
use crate::core::FlagId;
use crate::interfaces::AlertSink;
use crate::interfaces::AuditSink;
use crate::interfaces::Clock;
use crate::interfaces::FlagRegistry;
use crate::interfaces::MetricsSource;
use crate::runtime::executor::RolloutWatch;
use crate::runtime::transitions::StateMutator;
use crate::runtime::triggers::TriggerTable;

// ============================================================================
// SECTION: Monitor Configuration
// ============================================================================

/// Default interval between metric observations.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(120);

/// Actor recorded on monitor-initiated transitions and alerts.
const MONITOR_ACTOR: &str = "monitor";

/// Tuning knobs for watch tasks.
#[derive(Debug, Clone, Copy)]
pub struct MonitorConfig {
    /// Interval between metric observations per watched flag.
    pub tick_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

// ============================================================================
// SECTION: Watch Tasks
// ============================================================================

/// Handle to one spawned watch task.
struct WatchTask {
    /// Cancellation signal observed by the task between ticks.
    cancel: watch::Sender<bool>,
    /// Join handle kept for teardown.
    handle: JoinHandle<()>,
}

/// Verdict of one observation tick.
enum WatchOutcome {
    /// Keep watching.
    Continue,
    /// Stop watching; the flag left rollout control.
    Stop,
}

/// Everything one watch task needs, cloned out of the controller.
struct WatchContext<R, M, A, L> {
    /// Serialized mutator shared with the executor.
    mutator: StateMutator<R, A>,
    /// Live metrics source.
    metrics: Arc<M>,
    /// Operator alert sink.
    alerts: Arc<L>,
    /// Audit sink receiving alert events.
    audit: Arc<A>,
    /// Clock stamping alert audit events.
    clock: Arc<dyn Clock>,
    /// Watched flag.
    flag: FlagId,
    /// Trigger table built from the flag's rollback thresholds.
    table: TriggerTable,
    /// Actor recorded on monitor actions.
    actor: ActorId,
}

impl<R, M, A, L> WatchContext<R, M, A, L>
where
    R: FlagRegistry,
    M: MetricsSource,
    A: AuditSink,
    L: AlertSink,
{
    /// Performs one observation tick.
    async fn observe_once(&self) -> WatchOutcome {
        let state = match self.mutator.registry().state(&self.flag) {
            Ok(Some(state)) => state,
            Ok(None) => return WatchOutcome::Stop,
            Err(err) => {
                tracing::warn!(flag = %self.flag, error = %err, "watch state read failed");
                return WatchOutcome::Continue;
            }
        };
        if state.status.is_terminal() {
            return WatchOutcome::Stop;
        }

        let snapshot = match self.metrics.snapshot(&self.flag) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                self.raise_alert(
                    &format!("metrics unavailable: {err}"),
                    AlertSeverity::Medium,
                    state.rollout_percentage,
                );
                return WatchOutcome::Continue;
            }
        };

        let Some(spec) = self.table.first_firing(&snapshot) else {
            return WatchOutcome::Continue;
        };
        let reason = format!("trigger {}: {}", spec.id, spec.condition.describe(&snapshot));

        if spec.auto_rollback {
            return match self.mutator.rollback(&self.flag, &self.actor, &reason).await {
                Ok(Some(transition)) => {
                    self.raise_alert(
                        &format!("automatic rollback: {reason}"),
                        AlertSeverity::Critical,
                        transition.before.rollout_percentage,
                    );
                    WatchOutcome::Stop
                }
                Ok(None) => WatchOutcome::Stop,
                Err(err) => {
                    tracing::warn!(flag = %self.flag, error = %err, "automatic rollback failed");
                    WatchOutcome::Continue
                }
            };
        }

        self.raise_alert(&reason, spec.severity, state.rollout_percentage);
        WatchOutcome::Continue
    }

    /// Raises an operator alert and records the matching audit event.
    ///
    /// Emission failures are logged; monitoring never fails on them.
    fn raise_alert(&self, message: &str, severity: AlertSeverity, percentage: u8) {
        if let Err(err) = self.alerts.notify(&self.flag, message, severity) {
            tracing::warn!(flag = %self.flag, error = %err, "alert emission failed");
        }
        let event = AuditEvent {
            flag_id: self.flag.clone(),
            kind: AuditEventKind::Alert,
            actor: self.actor.clone(),
            reason: message.to_string(),
            percentage_before: percentage,
            percentage_after: percentage,
            recorded_at: self.clock.now(),
        };
        if let Err(err) = self.audit.record(&event) {
            tracing::warn!(flag = %self.flag, error = %err, "audit emission failed");
        }
    }
}

// ============================================================================
// SECTION: Monitoring Controller
// ============================================================================

/// Post-deployment monitoring controller over watch tasks.
pub struct MonitorController<R, M, A, L> {
    /// Serialized mutator shared with the executor.
    mutator: StateMutator<R, A>,
    /// Live metrics source.
    metrics: Arc<M>,
    /// Operator alert sink.
    alerts: Arc<L>,
    /// Audit sink receiving alert events.
    audit: Arc<A>,
    /// Clock stamping alert audit events.
    clock: Arc<dyn Clock>,
    /// Watch task tuning.
    config: MonitorConfig,
    /// Live watch tasks keyed by flag id.
    watches: Arc<Mutex<BTreeMap<FlagId, WatchTask>>>,
}

impl<R, M, A, L> MonitorController<R, M, A, L>
where
    R: FlagRegistry + 'static,
    M: MetricsSource + 'static,
    A: AuditSink + 'static,
    L: AlertSink + 'static,
{
    /// Creates a controller over shared collaborators.
    #[must_use]
    pub fn new(
        mutator: StateMutator<R, A>,
        metrics: Arc<M>,
        alerts: Arc<L>,
        audit: Arc<A>,
        clock: Arc<dyn Clock>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            mutator,
            metrics,
            alerts,
            audit,
            clock,
            config,
            watches: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Returns true when a watch task is live for the flag.
    #[must_use]
    pub fn is_watching(&self, flag_id: &FlagId) -> bool {
        let watches = self.watches.lock().unwrap_or_else(PoisonError::into_inner);
        watches.contains_key(flag_id)
    }

    /// Starts watching a flag; idempotent for an already-watched flag.
    ///
    /// The trigger table is built once from the flag's rollback thresholds at
    /// watch start. An unknown flag is logged and ignored.
    pub fn start_watch(&self, flag_id: &FlagId) {
        let table = match self.mutator.registry().definition(flag_id) {
            Ok(Some(definition)) => TriggerTable::standard(&definition.rollback_thresholds),
            Ok(None) => {
                tracing::warn!(flag = %flag_id, "watch requested for unknown flag");
                return;
            }
            Err(err) => {
                tracing::warn!(flag = %flag_id, error = %err, "watch definition read failed");
                return;
            }
        };

        let mut watches = self.watches.lock().unwrap_or_else(PoisonError::into_inner);
        if watches.contains_key(flag_id) {
            return;
        }

        let ctx = WatchContext {
            mutator: self.mutator.clone(),
            metrics: Arc::clone(&self.metrics),
            alerts: Arc::clone(&self.alerts),
            audit: Arc::clone(&self.audit),
            clock: Arc::clone(&self.clock),
            flag: flag_id.clone(),
            table,
            actor: ActorId::new(MONITOR_ACTOR),
        };
        let tick = self.config.tick_interval;
        let registry = Arc::clone(&self.watches);
        let flag = flag_id.clone();
        let (cancel, mut cancelled) = watch::channel(false);

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancelled.changed() => return,
                    () = tokio::time::sleep(tick) => {}
                }
                match ctx.observe_once().await {
                    WatchOutcome::Continue => {}
                    WatchOutcome::Stop => {
                        let mut watches =
                            registry.lock().unwrap_or_else(PoisonError::into_inner);
                        watches.remove(&flag);
                        return;
                    }
                }
            }
        });
        watches.insert(flag_id.clone(), WatchTask {
            cancel,
            handle,
        });
    }

    /// Stops watching a flag; idempotent for an unwatched flag.
    pub fn stop_watch(&self, flag_id: &FlagId) {
        let task = {
            let mut watches = self.watches.lock().unwrap_or_else(PoisonError::into_inner);
            watches.remove(flag_id)
        };
        if let Some(task) = task {
            let _ = task.cancel.send(true);
        }
    }

    /// Waits for a flag's watch task to finish, if one exists.
    ///
    /// Intended for deterministic teardown and scenario tests.
    pub async fn join_watch(&self, flag_id: &FlagId) -> bool {
        let task = {
            let mut watches = self.watches.lock().unwrap_or_else(PoisonError::into_inner);
            watches.remove(flag_id)
        };
        match task {
            Some(task) => {
                let _ = task.handle.await;
                true
            }
            None => false,
        }
    }
}

impl<R, M, A, L> RolloutWatch for MonitorController<R, M, A, L>
where
    R: FlagRegistry + 'static,
    M: MetricsSource + 'static,
    A: AuditSink + 'static,
    L: AlertSink + 'static,
{
    fn watch(&self, flag_id: &FlagId) {
        self.start_watch(flag_id);
    }

    fn unwatch(&self, flag_id: &FlagId) {
        self.stop_watch(flag_id);
    }
}
