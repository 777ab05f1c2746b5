// crates/flag-pilot-core/src/runtime/evaluator.rs
// ============================================================================
// Module: Flag Evaluation Engine
// Description: Hot-path, side-effect-free flag evaluation per user.
// Purpose: Compose environment, targeting, bucketing, and dependency gates.
// Dependencies: crate::{core, interfaces}, tracing
// ============================================================================

//! ## Overview
//! The evaluation engine answers "is flag X on for user U?" by composing the
//! gates in a fixed short-circuit order: unknown flag, environment gate,
//! dynamic enabled bit, region targeting, business-size targeting, percentage
//! bucketing, and recursive dependency evaluation. Unknown flags and registry
//! read failures evaluate to false (fail closed). Evaluation never mutates
//! flag state and never blocks on the rollout executor or the monitoring
//! controller; it only reads already-committed state. Usage tracking is a
//! best-effort side channel that cannot fail the boolean result.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::core::Environment;
use crate::core::FlagId;
use crate::core::UserContext;
use crate::core::bucket;
use crate::interfaces::FlagRegistry;
use crate::interfaces::UsageSink;

// ============================================================================
// SECTION: Evaluator
// ============================================================================

/// Hot-path flag evaluator over a shared registry.
pub struct Evaluator<R> {
    /// Registry consulted for definitions and committed state.
    registry: Arc<R>,
    /// Optional best-effort usage sink.
    usage: Option<Arc<dyn UsageSink>>,
}

impl<R> Evaluator<R>
where
    R: FlagRegistry,
{
    /// Creates an evaluator without usage tracking.
    #[must_use]
    pub const fn new(registry: Arc<R>) -> Self {
        Self {
            registry,
            usage: None,
        }
    }

    /// Attaches a best-effort usage sink for evaluation outcomes.
    #[must_use]
    pub fn with_usage_sink(mut self, usage: Arc<dyn UsageSink>) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Returns whether `flag_id` is enabled for `user` in the user's own
    /// originating environment.
    #[must_use]
    pub fn is_enabled(&self, flag_id: &FlagId, user: &UserContext) -> bool {
        self.is_enabled_in(flag_id, user, &user.environment)
    }

    /// Returns whether `flag_id` is enabled for `user` in `environment`.
    #[must_use]
    pub fn is_enabled_in(
        &self,
        flag_id: &FlagId,
        user: &UserContext,
        environment: &Environment,
    ) -> bool {
        let mut visited = BTreeSet::new();
        let enabled = self.evaluate(flag_id, user, environment, &mut visited);
        if let Some(usage) = &self.usage {
            usage.observe(flag_id, &user.user_id, enabled);
        }
        enabled
    }

    /// Evaluates one flag, tracking visited ids per top-level call.
    ///
    /// A revisited id is treated as true so cyclic dependency chains cannot
    /// recurse forever. This fail-open choice mirrors the ambiguous source
    /// behavior and is flagged for product clarification.
    fn evaluate(
        &self,
        flag_id: &FlagId,
        user: &UserContext,
        environment: &Environment,
        visited: &mut BTreeSet<FlagId>,
    ) -> bool {
        if !visited.insert(flag_id.clone()) {
            tracing::warn!(flag = %flag_id, "cyclic flag dependency revisited; treating as true");
            return true;
        }

        let Ok(Some(definition)) = self.registry.definition(flag_id) else {
            return false;
        };
        if !definition.enabled_in(environment) {
            return false;
        }

        let Ok(Some(state)) = self.registry.state(flag_id) else {
            return false;
        };
        if !state.enabled {
            return false;
        }

        if !definition.target_regions.is_empty()
            && !definition.target_regions.contains(&user.region)
        {
            return false;
        }
        if !definition.target_business_sizes.is_empty()
            && !definition.target_business_sizes.contains(&user.business_size)
        {
            return false;
        }

        if state.rollout_percentage < 100
            && bucket(&user.user_id, flag_id) >= state.rollout_percentage
        {
            return false;
        }

        definition
            .dependencies
            .iter()
            .all(|dependency| self.evaluate(dependency, user, environment, visited))
    }
}
