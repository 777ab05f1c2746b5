// crates/flag-pilot-providers/src/channel.rs
// ============================================================================
// Module: Channel Sinks
// Description: Channel-backed sinks for audit, alert, and usage delivery.
// Purpose: Forward control-plane output through Tokio mpsc channels.
// Dependencies: flag-pilot-core, tokio, tracing
// ============================================================================

//! ## Overview
//! Channel sinks deliver control-plane output into `tokio::sync::mpsc`
//! channels without blocking the caller. Audit and alert sinks surface a full
//! channel as a sink error for the core to log; the usage sink is
//! best-effort and drops observations when the channel is full.

// ============================================================================
// SECTION: Imports
// ============================================================================

use flag_pilot_core::AlertError;
use flag_pilot_core::AlertSeverity;
use flag_pilot_core::AlertSink;
use flag_pilot_core::AuditError;
use flag_pilot_core::AuditEvent;
use flag_pilot_core::AuditSink;
use flag_pilot_core::FlagId;
use flag_pilot_core::UsageSink;
use flag_pilot_core::UserId;
use tokio::sync::mpsc::Sender;

// ============================================================================
// SECTION: Audit Sink
// ============================================================================

/// Channel-backed audit sink.
///
/// # Invariants
/// - Each recorded event enqueues exactly one message.
#[derive(Debug)]
pub struct ChannelAuditSink {
    /// Sender used to enqueue audit events.
    sender: Sender<AuditEvent>,
}

impl ChannelAuditSink {
    /// Creates an audit sink over the given channel.
    #[must_use]
    pub const fn new(sender: Sender<AuditEvent>) -> Self {
        Self {
            sender,
        }
    }
}

impl AuditSink for ChannelAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        self.sender.try_send(event.clone()).map_err(|err| AuditError::Sink(err.to_string()))
    }
}

// ============================================================================
// SECTION: Alert Sink
// ============================================================================

/// One alert delivered through a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertNotice {
    /// Flag the alert concerns.
    pub flag_id: FlagId,
    /// Human-readable alert message.
    pub message: String,
    /// Alert severity.
    pub severity: AlertSeverity,
}

/// Channel-backed alert sink.
#[derive(Debug)]
pub struct ChannelAlertSink {
    /// Sender used to enqueue alert notices.
    sender: Sender<AlertNotice>,
}

impl ChannelAlertSink {
    /// Creates an alert sink over the given channel.
    #[must_use]
    pub const fn new(sender: Sender<AlertNotice>) -> Self {
        Self {
            sender,
        }
    }
}

impl AlertSink for ChannelAlertSink {
    fn notify(
        &self,
        flag_id: &FlagId,
        message: &str,
        severity: AlertSeverity,
    ) -> Result<(), AlertError> {
        let notice = AlertNotice {
            flag_id: flag_id.clone(),
            message: message.to_string(),
            severity,
        };
        self.sender.try_send(notice).map_err(|err| AlertError::Sink(err.to_string()))
    }
}

// ============================================================================
// SECTION: Usage Sink
// ============================================================================

/// One evaluation outcome delivered through a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageObservation {
    /// Evaluated flag.
    pub flag_id: FlagId,
    /// User the flag was evaluated for.
    pub user_id: UserId,
    /// Evaluation outcome.
    pub enabled: bool,
}

/// Best-effort channel-backed usage sink.
///
/// # Invariants
/// - A full channel drops the observation; evaluation is never blocked.
#[derive(Debug)]
pub struct ChannelUsageSink {
    /// Sender used to enqueue usage observations.
    sender: Sender<UsageObservation>,
}

impl ChannelUsageSink {
    /// Creates a usage sink over the given channel.
    #[must_use]
    pub const fn new(sender: Sender<UsageObservation>) -> Self {
        Self {
            sender,
        }
    }
}

impl UsageSink for ChannelUsageSink {
    fn observe(&self, flag_id: &FlagId, user_id: &UserId, enabled: bool) {
        let observation = UsageObservation {
            flag_id: flag_id.clone(),
            user_id: user_id.clone(),
            enabled,
        };
        if self.sender.try_send(observation).is_err() {
            tracing::trace!(flag = %flag_id, "usage observation dropped");
        }
    }
}
