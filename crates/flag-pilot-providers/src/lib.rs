// crates/flag-pilot-providers/src/lib.rs
// ============================================================================
// Module: Flag Pilot Providers
// Description: Built-in collaborator implementations for the core interfaces.
// Purpose: Provide zero-config metrics sources and sinks aligned with the core.
// Dependencies: flag-pilot-core, tokio, tracing
// ============================================================================

//! ## Overview
//! This crate ships built-in implementations of the core interfaces: a
//! programmable in-memory metrics source, an environment-variable metrics
//! source with strict fail-closed parsing, channel-backed audit/alert/usage
//! sinks, and a registry that routes metrics reads to named sources per flag.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod channel;
pub mod metrics;
pub mod registry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use channel::AlertNotice;
pub use channel::ChannelAlertSink;
pub use channel::ChannelAuditSink;
pub use channel::ChannelUsageSink;
pub use channel::UsageObservation;
pub use metrics::EnvMetricsConfig;
pub use metrics::EnvMetricsSource;
pub use metrics::StaticMetricsSource;
pub use registry::MetricsSourceRegistry;
pub use registry::SourceAccessPolicy;
