// crates/flag-pilot-core/src/runtime/transitions.rs
// ============================================================================
// Module: Serialized State Transitions
// Description: Per-flag single-writer discipline with audited commits.
// Purpose: Guarantee that concurrent mutations for one flag never interleave.
// Dependencies: crate::{core, interfaces}, tokio, tracing
// ============================================================================

//! ## Overview
//! All flag state mutations funnel through [`StateMutator`], which holds one
//! asynchronous lock per flag id. A rollback and a percentage increase issued
//! near-simultaneously are therefore serialized, and the loser re-reads
//! committed state before acting, so mixed states (disabled with a non-zero
//! percentage) cannot be produced. Commits use optimistic versioning against
//! the registry: a conflicting commit is retried once from a fresh read and
//! then surfaced, never blindly overwritten. Every applied transition is
//! emitted to the audit sink; emission failures are logged and never fail
//! the primary operation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::OwnedMutexGuard;

use crate::core::ActorId;
use crate::core::AuditEvent;
use crate::core::AuditEventKind;
use crate::core::FlagId;
use crate::core::FlagState;
use crate::core::FlagStatus;
use crate::interfaces::AuditSink;
use crate::interfaces::Clock;
use crate::interfaces::FlagRegistry;
use crate::interfaces::RegistryError;

// ============================================================================
// SECTION: Flag Writer
// ============================================================================

/// Per-flag asynchronous write lock map.
///
/// # Invariants
/// - Exactly one lock exists per flag id for the lifetime of the writer.
#[derive(Debug, Default, Clone)]
pub struct FlagWriter {
    /// Lock map keyed by flag id.
    locks: Arc<Mutex<BTreeMap<FlagId, Arc<AsyncMutex<()>>>>>,
}

impl FlagWriter {
    /// Creates an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Acquires the write lock for a flag, creating it on first use.
    pub async fn lock(&self, flag_id: &FlagId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut guard = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(guard.entry(flag_id.clone()).or_default())
        };
        lock.lock_owned().await
    }
}

// ============================================================================
// SECTION: Transition Errors
// ============================================================================

/// Errors raised while applying a serialized transition.
#[derive(Debug, Error)]
pub enum TransitionError {
    /// Flag has no registered definition.
    #[error("flag not found: {0}")]
    FlagNotFound(String),
    /// Commit lost the version race twice in a row.
    #[error("flag state commit conflict for {0}")]
    Conflict(String),
    /// Registry operation failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

// ============================================================================
// SECTION: Transitions
// ============================================================================

/// Before/after snapshot of one applied transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Committed state before the transition.
    pub before: FlagState,
    /// Committed state after the transition.
    pub after: FlagState,
}

/// Serialized, audited state mutator shared by the executor and monitor.
pub struct StateMutator<R, A> {
    /// Registry holding definitions and committed state.
    registry: Arc<R>,
    /// Audit sink receiving every applied transition.
    audit: Arc<A>,
    /// Clock stamping transitions.
    clock: Arc<dyn Clock>,
    /// Per-flag write locks.
    writer: FlagWriter,
}

impl<R, A> Clone for StateMutator<R, A> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            audit: Arc::clone(&self.audit),
            clock: Arc::clone(&self.clock),
            writer: self.writer.clone(),
        }
    }
}

impl<R, A> StateMutator<R, A>
where
    R: FlagRegistry,
    A: AuditSink,
{
    /// Creates a mutator over shared collaborators.
    #[must_use]
    pub fn new(registry: Arc<R>, audit: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry,
            audit,
            clock,
            writer: FlagWriter::new(),
        }
    }

    /// Returns the shared registry handle.
    #[must_use]
    pub const fn registry(&self) -> &Arc<R> {
        &self.registry
    }

    /// Applies a transition decided from the freshly read state.
    ///
    /// The `decide` closure returns `None` to decline (no commit, no audit)
    /// or the audit kind plus the desired next state. Reason, timestamp, and
    /// version stamping are applied here. The closure may run twice when the
    /// first commit loses a version race.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] on unknown flags, double conflicts, or
    /// registry failures.
    pub async fn apply<F>(
        &self,
        flag_id: &FlagId,
        actor: &ActorId,
        reason: &str,
        decide: F,
    ) -> Result<Option<Transition>, TransitionError>
    where
        F: Fn(&FlagState) -> Option<(AuditEventKind, FlagState)>,
    {
        let _guard = self.writer.lock(flag_id).await;
        self.registry
            .definition(flag_id)?
            .ok_or_else(|| TransitionError::FlagNotFound(flag_id.to_string()))?;

        match self.try_commit(flag_id, reason, &decide)? {
            CommitOutcome::Declined => Ok(None),
            CommitOutcome::Committed(transition) => {
                self.emit_audit(flag_id, actor, reason, &transition);
                Ok(Some(transition.transition))
            }
            CommitOutcome::Conflicted => {
                // One retry from a fresh read, then surface the conflict.
                match self.try_commit(flag_id, reason, &decide)? {
                    CommitOutcome::Declined => Ok(None),
                    CommitOutcome::Committed(transition) => {
                        self.emit_audit(flag_id, actor, reason, &transition);
                        Ok(Some(transition.transition))
                    }
                    CommitOutcome::Conflicted => {
                        Err(TransitionError::Conflict(flag_id.to_string()))
                    }
                }
            }
        }
    }

    /// Rolls a flag back unless it is already in a terminal state.
    ///
    /// Returns `None` when the flag is already disabled or rolled back, so a
    /// stale timer firing after a rollback cannot re-apply one.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] on unknown flags or registry failures.
    pub async fn rollback(
        &self,
        flag_id: &FlagId,
        actor: &ActorId,
        reason: &str,
    ) -> Result<Option<Transition>, TransitionError> {
        self.apply(flag_id, actor, reason, |state| {
            if state.status.is_terminal() {
                return None;
            }
            let mut next = state.clone();
            next.enabled = false;
            next.rollout_percentage = 0;
            next.status = FlagStatus::RolledBack;
            Some((AuditEventKind::Rollback, next))
        })
        .await
    }

    /// Reads, decides, stamps, and commits one candidate transition.
    fn try_commit<F>(
        &self,
        flag_id: &FlagId,
        reason: &str,
        decide: &F,
    ) -> Result<CommitOutcome, TransitionError>
    where
        F: Fn(&FlagState) -> Option<(AuditEventKind, FlagState)>,
    {
        let current = self
            .registry
            .state(flag_id)?
            .unwrap_or_else(|| FlagState::disabled(self.clock.now()));

        let Some((kind, mut next)) = decide(&current) else {
            return Ok(CommitOutcome::Declined);
        };
        next.version = current.version + 1;
        next.last_transition_reason = reason.to_string();
        next.last_transition_at = self.clock.now();

        match self.registry.commit_state(flag_id, &next, reason) {
            Ok(()) => Ok(CommitOutcome::Committed(Transition {
                before: current,
                after: next,
            }
            .tagged(kind))),
            Err(RegistryError::VersionConflict(_)) => Ok(CommitOutcome::Conflicted),
            Err(err) => Err(err.into()),
        }
    }

    /// Emits the audit event for an applied transition, logging failures.
    fn emit_audit(
        &self,
        flag_id: &FlagId,
        actor: &ActorId,
        reason: &str,
        transition: &TaggedTransition,
    ) {
        let event = AuditEvent {
            flag_id: flag_id.clone(),
            kind: transition.kind,
            actor: actor.clone(),
            reason: reason.to_string(),
            percentage_before: transition.transition.before.rollout_percentage,
            percentage_after: transition.transition.after.rollout_percentage,
            recorded_at: self.clock.now(),
        };
        if let Err(err) = self.audit.record(&event) {
            tracing::warn!(flag = %flag_id, error = %err, "audit emission failed");
        }
    }
}

// ============================================================================
// SECTION: Commit Outcomes
// ============================================================================

/// Transition plus the audit kind chosen by the deciding closure.
#[derive(Debug, Clone)]
struct TaggedTransition {
    /// Audit classification for the transition.
    kind: AuditEventKind,
    /// Applied before/after states.
    transition: Transition,
}

impl Transition {
    /// Attaches an audit kind to the transition.
    const fn tagged(self, kind: AuditEventKind) -> TaggedTransition {
        TaggedTransition {
            kind,
            transition: self,
        }
    }
}

/// Result of one commit attempt.
enum CommitOutcome {
    /// The deciding closure declined to transition.
    Declined,
    /// The transition committed and should be audited.
    Committed(TaggedTransition),
    /// The commit lost a version race.
    Conflicted,
}
