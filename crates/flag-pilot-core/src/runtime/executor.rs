// crates/flag-pilot-core/src/runtime/executor.rs
// ============================================================================
// Module: Rollout Executor
// Description: Strategy-driven progressive delivery over serialized state.
// Purpose: Drive flag percentages through instant, gradual, canary, and
//          blue/green strategies with safety gating.
// Dependencies: crate::{core, interfaces, runtime}, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! The rollout executor owns the write side of flag state. Every enable runs
//! the safety pipeline first: an unsafe report rejects the rollout outright
//! and a warning report requires explicit caller acknowledgement. Gradual and
//! canary strategies spawn a cancellable background task per flag; each timed
//! step re-reads committed state under the per-flag write lock and declines
//! to act once the flag has left the rolling-out status, so a stale timer can
//! never resurrect a rolled-back or disabled flag. Disable and the kill
//! switch bypass the safety pipeline entirely.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::ActorId;
use crate::core::AlertSeverity;
use crate::core::AuditEventKind;
use crate::core::FlagId;
use crate::core::FlagState;
use crate::core::FlagStatus;
use crate::core::MetricsSnapshot;
use crate::core::RolloutConfig;
use crate::core::RolloutStrategy;
use crate::interfaces::AlertSink;
use crate::interfaces::AuditSink;
use crate::interfaces::Clock;
use crate::interfaces::FlagRegistry;
use crate::interfaces::MetricsSource;
use crate::runtime::safety::CheckContext;
use crate::runtime::safety::DeploymentSafetyReport;
use crate::runtime::safety::SafetyPipeline;
use crate::runtime::safety::SafetyVerdict;
use crate::runtime::transitions::StateMutator;
use crate::runtime::transitions::Transition;
use crate::runtime::transitions::TransitionError;

// ============================================================================
// SECTION: Watch Hook
// ============================================================================

/// Hook notified when a rollout starts or stops needing live observation.
///
/// The monitoring controller implements this seam; the executor never calls
/// back into monitoring logic directly.
pub trait RolloutWatch: Send + Sync {
    /// Starts observing a flag.
    fn watch(&self, flag_id: &FlagId);

    /// Stops observing a flag.
    fn unwatch(&self, flag_id: &FlagId);
}

// ============================================================================
// SECTION: Executor Configuration
// ============================================================================

/// Number of equal percentage steps in a gradual rollout.
pub const GRADUAL_STEPS: u32 = 10;

/// Default canary observation window.
pub const DEFAULT_CANARY_OBSERVATION: Duration = Duration::from_secs(120);

/// Tuning knobs for background rollout tasks.
#[derive(Debug, Clone, Copy)]
pub struct ExecutorConfig {
    /// Number of equal percentage steps for gradual rollouts.
    pub gradual_steps: u32,
    /// Observation window before a canary verdict.
    pub canary_observation: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            gradual_steps: GRADUAL_STEPS,
            canary_observation: DEFAULT_CANARY_OBSERVATION,
        }
    }
}

// ============================================================================
// SECTION: Executor Errors
// ============================================================================

/// Errors raised by rollout operations.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Safety pipeline produced a blocking report.
    #[error("rollout blocked by safety checks: {0}")]
    SafetyBlocked(String),
    /// Safety pipeline produced warnings the caller has not acknowledged.
    #[error("rollout requires warning acknowledgement: {0}")]
    ConfirmationRequired(String),
    /// Flag definition does not arm a kill switch.
    #[error("kill switch not armed for flag: {0}")]
    KillSwitchUnavailable(String),
    /// Enable requested on a rolled-back flag that was not reset first.
    #[error("invalid transition for rolled-back flag: {0}")]
    InvalidTransition(String),
    /// Reset requested on a flag that is not rolled back.
    #[error("flag is not rolled back: {0}")]
    NotRolledBack(String),
    /// Serialized transition failed.
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

// ============================================================================
// SECTION: Rollout Tasks
// ============================================================================

/// Handle to one spawned rollout task.
struct RolloutTask {
    /// Cancellation signal observed by the task between steps.
    cancel: watch::Sender<bool>,
    /// Join handle for deterministic teardown.
    handle: JoinHandle<()>,
}

// ============================================================================
// SECTION: Rollout Executor
// ============================================================================

/// Strategy-driven rollout executor over serialized flag state.
pub struct RolloutExecutor<R, M, A, L> {
    /// Serialized, audited state mutator shared with monitoring.
    mutator: StateMutator<R, A>,
    /// Live metrics consulted by safety checks and canary verdicts.
    metrics: Arc<M>,
    /// Operator alert sink.
    alerts: Arc<L>,
    /// Pre-deployment safety pipeline.
    pipeline: Arc<SafetyPipeline>,
    /// Clock stamping safety-pipeline runs.
    clock: Arc<dyn Clock>,
    /// Background task tuning.
    config: ExecutorConfig,
    /// Live rollout tasks keyed by flag id.
    tasks: Mutex<BTreeMap<FlagId, RolloutTask>>,
    /// Optional observation hook, typically the monitoring controller.
    observer: Option<Arc<dyn RolloutWatch>>,
}

impl<R, M, A, L> RolloutExecutor<R, M, A, L>
where
    R: FlagRegistry + 'static,
    M: MetricsSource + 'static,
    A: AuditSink + 'static,
    L: AlertSink + 'static,
{
    /// Creates an executor over shared collaborators.
    #[must_use]
    pub fn new(
        mutator: StateMutator<R, A>,
        metrics: Arc<M>,
        alerts: Arc<L>,
        pipeline: Arc<SafetyPipeline>,
        clock: Arc<dyn Clock>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            mutator,
            metrics,
            alerts,
            pipeline,
            clock,
            config,
            tasks: Mutex::new(BTreeMap::new()),
            observer: None,
        }
    }

    /// Attaches the observation hook notified on rollout start and stop.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RolloutWatch>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Returns the shared state mutator.
    #[must_use]
    pub const fn mutator(&self) -> &StateMutator<R, A> {
        &self.mutator
    }

    /// Enables a flag under the given rollout configuration.
    ///
    /// Runs the safety pipeline first. An unsafe report rejects the rollout;
    /// a warning report is rejected unless `acknowledge_warnings` is set.
    /// Instant and blue/green strategies commit a single atomic transition to
    /// 100%; gradual and canary strategies commit an initial transition and
    /// spawn a cancellable background task.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] when safety gating rejects the rollout or
    /// the initial transition fails.
    pub async fn enable(
        &self,
        flag_id: &FlagId,
        actor: &ActorId,
        config: &RolloutConfig,
        acknowledge_warnings: bool,
    ) -> Result<DeploymentSafetyReport, ExecutorError> {
        let ctx = CheckContext {
            now: self.clock.now().to_offset_date_time(),
            metrics: self.metrics.as_ref(),
        };
        let report = self.pipeline.run(flag_id, &ctx);
        match report.overall_safety {
            SafetyVerdict::Unsafe => {
                tracing::warn!(flag = %flag_id, summary = %report.summary(), "rollout blocked");
                return Err(ExecutorError::SafetyBlocked(report.summary()));
            }
            SafetyVerdict::Warning if !acknowledge_warnings => {
                return Err(ExecutorError::ConfirmationRequired(report.summary()));
            }
            SafetyVerdict::Warning | SafetyVerdict::Safe => {}
        }

        self.cancel_task(flag_id);
        match config.strategy {
            RolloutStrategy::Instant | RolloutStrategy::BlueGreen => {
                let reason = format!("{} rollout to 100%", config.strategy.as_str());
                self.commit_enable(flag_id, actor, &reason, 100, FlagStatus::Steady).await?;
            }
            RolloutStrategy::Gradual {
                duration_minutes,
            } => {
                let reason = format!("gradual rollout started ({duration_minutes}m)");
                self.commit_enable(flag_id, actor, &reason, 0, FlagStatus::RollingOut).await?;
                self.spawn_gradual(flag_id, actor, *config, duration_minutes);
            }
            RolloutStrategy::Canary {
                canary_percentage,
            } => {
                let percentage = canary_percentage.min(100);
                let reason = format!("canary rollout at {percentage}%");
                self.commit_enable(flag_id, actor, &reason, percentage, FlagStatus::RollingOut)
                    .await?;
                self.spawn_canary(flag_id, actor, *config, percentage);
            }
        }

        if let Some(observer) = &self.observer {
            observer.watch(flag_id);
        }
        Ok(report)
    }

    /// Disables a flag immediately, bypassing the safety pipeline.
    ///
    /// Idempotent: an already-disabled flag declines the transition.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] when the transition fails.
    pub async fn disable(
        &self,
        flag_id: &FlagId,
        actor: &ActorId,
        reason: &str,
    ) -> Result<Option<Transition>, ExecutorError> {
        self.cancel_task(flag_id);
        let transition = self
            .mutator
            .apply(flag_id, actor, reason, |state| {
                if !state.enabled && state.status == FlagStatus::Disabled {
                    return None;
                }
                let mut next = state.clone();
                next.enabled = false;
                next.rollout_percentage = 0;
                next.status = FlagStatus::Disabled;
                Some((AuditEventKind::Disabled, next))
            })
            .await?;
        if let Some(observer) = &self.observer {
            observer.unwatch(flag_id);
        }
        Ok(transition)
    }

    /// Engages the kill switch: immediate disable for an armed flag.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::KillSwitchUnavailable`] when the definition
    /// does not arm a kill switch, or any disable failure.
    pub async fn kill(
        &self,
        flag_id: &FlagId,
        actor: &ActorId,
    ) -> Result<Option<Transition>, ExecutorError> {
        let definition = self
            .mutator
            .registry()
            .definition(flag_id)
            .map_err(TransitionError::from)?
            .ok_or_else(|| TransitionError::FlagNotFound(flag_id.to_string()))?;
        if !definition.kill_switch {
            return Err(ExecutorError::KillSwitchUnavailable(flag_id.to_string()));
        }
        self.disable(flag_id, actor, "kill switch engaged").await
    }

    /// Rolls a flag back on operator demand.
    ///
    /// Returns `None` when the flag is already in a terminal state.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] when the transition fails.
    pub async fn rollback(
        &self,
        flag_id: &FlagId,
        actor: &ActorId,
        reason: &str,
    ) -> Result<Option<Transition>, ExecutorError> {
        self.cancel_task(flag_id);
        let transition = self.mutator.rollback(flag_id, actor, reason).await?;
        if let Some(observer) = &self.observer {
            observer.unwatch(flag_id);
        }
        Ok(transition)
    }

    /// Resets a rolled-back flag to disabled so it can be re-enabled.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::NotRolledBack`] when the flag is in any other
    /// status.
    pub async fn reset(
        &self,
        flag_id: &FlagId,
        actor: &ActorId,
        reason: &str,
    ) -> Result<Transition, ExecutorError> {
        let transition = self
            .mutator
            .apply(flag_id, actor, reason, |state| {
                if state.status != FlagStatus::RolledBack {
                    return None;
                }
                let mut next = state.clone();
                next.enabled = false;
                next.rollout_percentage = 0;
                next.status = FlagStatus::Disabled;
                Some((AuditEventKind::Disabled, next))
            })
            .await?;
        transition.ok_or_else(|| ExecutorError::NotRolledBack(flag_id.to_string()))
    }

    /// Waits for a flag's background rollout task to finish, if one exists.
    ///
    /// Intended for deterministic teardown and scenario tests.
    pub async fn join_rollout(&self, flag_id: &FlagId) -> bool {
        let task = {
            let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
            tasks.remove(flag_id)
        };
        match task {
            Some(task) => {
                let _ = task.handle.await;
                true
            }
            None => false,
        }
    }

    /// Commits the initial enable transition for a rollout.
    ///
    /// Declines for a rolled-back flag: `RolledBack` is terminal until an
    /// operator resets the flag to `Disabled`.
    async fn commit_enable(
        &self,
        flag_id: &FlagId,
        actor: &ActorId,
        reason: &str,
        percentage: u8,
        status: FlagStatus,
    ) -> Result<(), ExecutorError> {
        let transition = self
            .mutator
            .apply(flag_id, actor, reason, |state| {
                if state.status == FlagStatus::RolledBack {
                    return None;
                }
                let mut next = state.clone();
                next.enabled = true;
                next.rollout_percentage = percentage;
                next.status = status;
                Some((AuditEventKind::Enabled, next))
            })
            .await?;
        transition
            .map(|_| ())
            .ok_or_else(|| ExecutorError::InvalidTransition(flag_id.to_string()))
    }

    /// Spawns the timed stepping task for a gradual rollout.
    ///
    /// Every applied step is followed by a metrics read; a threshold breach
    /// rolls the flag back immediately instead of continuing the ramp.
    fn spawn_gradual(
        &self,
        flag_id: &FlagId,
        actor: &ActorId,
        config: RolloutConfig,
        duration_minutes: u32,
    ) {
        let steps = self.config.gradual_steps.max(1);
        let interval = Duration::from_secs(
            u64::from(duration_minutes).saturating_mul(60) / u64::from(steps),
        );
        let mutator = self.mutator.clone();
        let metrics = Arc::clone(&self.metrics);
        let alerts = Arc::clone(&self.alerts);
        let observer = self.observer.clone();
        let flag = flag_id.clone();
        let actor = actor.clone();
        let (cancel, mut cancelled) = watch::channel(false);

        let handle = tokio::spawn(async move {
            for step in 1..=steps {
                tokio::select! {
                    _ = cancelled.changed() => return,
                    () = tokio::time::sleep(interval) => {}
                }
                let percentage = u8::try_from(step * 100 / steps).unwrap_or(100);
                let reason = format!("gradual rollout step {step}/{steps}");
                let outcome = mutator
                    .apply(&flag, &actor, &reason, |state: &FlagState| {
                        if state.status != FlagStatus::RollingOut {
                            return None;
                        }
                        let mut next = state.clone();
                        next.rollout_percentage = percentage;
                        if step == steps {
                            next.status = FlagStatus::Steady;
                        }
                        Some((AuditEventKind::PercentageChanged, next))
                    })
                    .await;
                match outcome {
                    Ok(Some(_)) => {}
                    Ok(None) => return,
                    Err(err) => {
                        tracing::warn!(flag = %flag, error = %err, "gradual step failed");
                        return;
                    }
                }

                // Metrics outages are left to the monitoring controller; only
                // a confirmed breach halts the ramp here.
                let breach = match metrics.snapshot(&flag) {
                    Ok(snapshot) => threshold_breach(&config, &snapshot),
                    Err(err) => {
                        tracing::warn!(flag = %flag, error = %err, "gradual metrics read failed");
                        None
                    }
                };
                if let Some(description) = breach {
                    let reason = format!("gradual rollout halted: {description}");
                    match mutator.rollback(&flag, &actor, &reason).await {
                        Ok(Some(_)) => {
                            if let Err(err) = alerts.notify(&flag, &reason, AlertSeverity::High)
                            {
                                tracing::warn!(flag = %flag, error = %err, "alert emission failed");
                            }
                        }
                        Ok(None) => {}
                        Err(err) => {
                            tracing::warn!(flag = %flag, error = %err, "gradual rollback failed");
                        }
                    }
                    if let Some(observer) = &observer {
                        observer.unwatch(&flag);
                    }
                    return;
                }
            }
        });
        self.store_task(flag_id, RolloutTask {
            cancel,
            handle,
        });
    }

    /// Spawns the observation task for a canary rollout.
    fn spawn_canary(
        &self,
        flag_id: &FlagId,
        actor: &ActorId,
        config: RolloutConfig,
        percentage: u8,
    ) {
        let observation = self.config.canary_observation;
        let mutator = self.mutator.clone();
        let metrics = Arc::clone(&self.metrics);
        let alerts = Arc::clone(&self.alerts);
        let observer = self.observer.clone();
        let flag = flag_id.clone();
        let actor = actor.clone();
        let (cancel, mut cancelled) = watch::channel(false);

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.changed() => return,
                () = tokio::time::sleep(observation) => {}
            }

            let failure = match metrics.snapshot(&flag) {
                Err(err) => Some(format!("canary metrics unavailable: {err}")),
                Ok(snapshot) => threshold_breach(&config, &snapshot)
                    .map(|description| format!("canary {description}")),
            };

            match failure {
                Some(reason) => {
                    match mutator.rollback(&flag, &actor, &reason).await {
                        Ok(Some(_)) => {
                            if let Err(err) =
                                alerts.notify(&flag, &reason, AlertSeverity::High)
                            {
                                tracing::warn!(flag = %flag, error = %err, "alert emission failed");
                            }
                        }
                        Ok(None) => {}
                        Err(err) => {
                            tracing::warn!(flag = %flag, error = %err, "canary rollback failed");
                        }
                    }
                    if let Some(observer) = observer {
                        observer.unwatch(&flag);
                    }
                }
                None => {
                    let reason =
                        format!("canary healthy at {percentage}%; promoting to full rollout");
                    let outcome = mutator
                        .apply(&flag, &actor, &reason, |state: &FlagState| {
                            if state.status != FlagStatus::RollingOut {
                                return None;
                            }
                            let mut next = state.clone();
                            next.rollout_percentage = 100;
                            next.status = FlagStatus::Steady;
                            Some((AuditEventKind::PercentageChanged, next))
                        })
                        .await;
                    if let Err(err) = outcome {
                        tracing::warn!(flag = %flag, error = %err, "canary promotion failed");
                    }
                }
            }
        });
        self.store_task(flag_id, RolloutTask {
            cancel,
            handle,
        });
    }

    /// Stores a task handle, cancelling any previous task for the flag.
    fn store_task(&self, flag_id: &FlagId, task: RolloutTask) {
        let previous = {
            let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
            tasks.insert(flag_id.clone(), task)
        };
        if let Some(previous) = previous {
            let _ = previous.cancel.send(true);
        }
    }

    /// Cancels the live background task for a flag, if any.
    fn cancel_task(&self, flag_id: &FlagId) {
        let task = {
            let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
            tasks.remove(flag_id)
        };
        if let Some(task) = task {
            let _ = task.cancel.send(true);
        }
    }
}

// ============================================================================
// SECTION: Threshold Checks
// ============================================================================

/// Describes the first rollout-threshold breach in `snapshot`, if any.
fn threshold_breach(config: &RolloutConfig, snapshot: &MetricsSnapshot) -> Option<String> {
    if snapshot.error_rate > config.error_threshold {
        return Some(format!(
            "error rate {:.1}% above threshold {:.1}%",
            snapshot.error_rate * 100.0,
            config.error_threshold * 100.0
        ));
    }
    if snapshot.quality_score < config.success_threshold {
        return Some(format!(
            "quality score {:.1} below threshold {:.1}",
            snapshot.quality_score, config.success_threshold
        ));
    }
    None
}
