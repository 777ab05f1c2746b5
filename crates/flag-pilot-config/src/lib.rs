// crates/flag-pilot-config/src/lib.rs
// ============================================================================
// Module: Flag Pilot Config Library
// Description: Canonical flag-set configuration model and validation.
// Purpose: Load, validate, and seed flag-set documents into a registry.
// Dependencies: crate::config
// ============================================================================

//! ## Overview
//! Flag Pilot config defines the TOML flag-set document: flag definitions
//! with targeting and thresholds, the shared safety-check configuration, and
//! an optional rollback trigger table. Loading is strict and fail-closed;
//! validation errors reject the document, while advisory findings surface as
//! diagnostics without blocking the load.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigDiagnostic;
pub use config::ConfigError;
pub use config::DiagnosticCode;
pub use config::FlagEntryConfig;
pub use config::FlagSetConfig;
pub use config::RestrictedWindowConfig;
pub use config::SafetySectionConfig;
pub use config::ThresholdsConfig;
pub use config::TriggerEntryConfig;
