// crates/flag-pilot-core/src/core/context.rs
// ============================================================================
// Module: User Context
// Description: Per-request user context consumed by the evaluation engine.
// Purpose: Carry targeting attributes without exposing mutable state.
// Dependencies: crate::core::{definition, identifiers}, serde
// ============================================================================

//! ## Overview
//! [`UserContext`] describes the requesting user for a single evaluation:
//! identity, region, business-size tier, and the environment the request
//! originates from. The context is read-only input; this subsystem never
//! mutates it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::definition::BusinessSize;
use crate::core::identifiers::Environment;
use crate::core::identifiers::RegionId;
use crate::core::identifiers::UserId;

// ============================================================================
// SECTION: User Context
// ============================================================================

/// Read-only user context for flag evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    /// User identifier used for bucketing.
    pub user_id: UserId,
    /// Region the user belongs to.
    pub region: RegionId,
    /// Business-size tier of the user's account.
    pub business_size: BusinessSize,
    /// Environment the request originates from.
    pub environment: Environment,
}

impl UserContext {
    /// Creates a user context for the given identity and targeting attributes.
    #[must_use]
    pub const fn new(
        user_id: UserId,
        region: RegionId,
        business_size: BusinessSize,
        environment: Environment,
    ) -> Self {
        Self {
            user_id,
            region,
            business_size,
            environment,
        }
    }
}
