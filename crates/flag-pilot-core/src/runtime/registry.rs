// crates/flag-pilot-core/src/runtime/registry.rs
// ============================================================================
// Module: In-Memory Flag Registry
// Description: Simple in-memory flag registry for tests and demos.
// Purpose: Provide a deterministic registry implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides a simple in-memory implementation of
//! [`FlagRegistry`] for tests and local demos. Commits are validated against
//! the flag state invariants and enforce optimistic-concurrency versioning.
//! It is not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::FlagDefinition;
use crate::core::FlagId;
use crate::core::FlagState;
use crate::core::Timestamp;
use crate::interfaces::FlagRegistry;
use crate::interfaces::RegistryError;

// ============================================================================
// SECTION: In-Memory Registry
// ============================================================================

/// One registered flag: static definition plus current dynamic state.
#[derive(Debug, Clone)]
struct FlagEntry {
    /// Immutable definition.
    definition: FlagDefinition,
    /// Current committed state.
    state: FlagState,
}

/// In-memory flag registry for tests and demos.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFlagRegistry {
    /// Flag map protected by a mutex; commits swap whole entries.
    flags: Arc<Mutex<BTreeMap<FlagId, FlagEntry>>>,
}

impl InMemoryFlagRegistry {
    /// Creates an empty in-memory registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flags: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Registers a flag definition with an initial disabled state.
    ///
    /// Re-registering an existing flag replaces the definition and resets
    /// the state.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when the registry mutex is poisoned.
    pub fn register(
        &self,
        definition: FlagDefinition,
        registered_at: Timestamp,
    ) -> Result<(), RegistryError> {
        let mut guard = lock_flags(&self.flags)?;
        let id = definition.id.clone();
        guard.insert(id, FlagEntry {
            definition,
            state: FlagState::disabled(registered_at),
        });
        Ok(())
    }
}

impl FlagRegistry for InMemoryFlagRegistry {
    fn definition(&self, flag_id: &FlagId) -> Result<Option<FlagDefinition>, RegistryError> {
        let guard = lock_flags(&self.flags)?;
        Ok(guard.get(flag_id).map(|entry| entry.definition.clone()))
    }

    fn state(&self, flag_id: &FlagId) -> Result<Option<FlagState>, RegistryError> {
        let guard = lock_flags(&self.flags)?;
        Ok(guard.get(flag_id).map(|entry| entry.state.clone()))
    }

    fn commit_state(
        &self,
        flag_id: &FlagId,
        state: &FlagState,
        _reason: &str,
    ) -> Result<(), RegistryError> {
        state.validate()?;
        let mut guard = lock_flags(&self.flags)?;
        let entry = guard
            .get_mut(flag_id)
            .ok_or_else(|| RegistryError::Store(format!("unknown flag: {flag_id}")))?;
        if state.version != entry.state.version + 1 {
            return Err(RegistryError::VersionConflict(flag_id.to_string()));
        }
        entry.state = state.clone();
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Locks the flag map, mapping mutex poisoning into a registry error.
fn lock_flags(
    flags: &Arc<Mutex<BTreeMap<FlagId, FlagEntry>>>,
) -> Result<std::sync::MutexGuard<'_, BTreeMap<FlagId, FlagEntry>>, RegistryError> {
    flags.lock().map_err(|_| RegistryError::Store("flag registry mutex poisoned".to_string()))
}
