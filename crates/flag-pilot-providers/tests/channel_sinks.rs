//! Channel sink tests for flag-pilot-providers.
// crates/flag-pilot-providers/tests/channel_sinks.rs
// =============================================================================
// Module: Channel Sink Tests
// Description: Delivery and backpressure behavior of the channel sinks.
// Purpose: Ensure sinks never block and surface or drop full channels.
// =============================================================================

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use flag_pilot_core::AlertSeverity;
use flag_pilot_core::AlertSink;
use flag_pilot_core::AuditEvent;
use flag_pilot_core::AuditEventKind;
use flag_pilot_core::AuditSink;
use flag_pilot_core::FlagId;
use flag_pilot_core::Timestamp;
use flag_pilot_core::UsageSink;
use flag_pilot_providers::ChannelAlertSink;
use flag_pilot_providers::ChannelAuditSink;
use flag_pilot_providers::ChannelUsageSink;
use tokio::sync::mpsc;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Builds a deterministic audit event.
fn event(reason: &str) -> AuditEvent {
    AuditEvent {
        flag_id: FlagId::new("checkout"),
        kind: AuditEventKind::Enabled,
        actor: "release-bot".into(),
        reason: reason.to_string(),
        percentage_before: 0,
        percentage_after: 100,
        recorded_at: Timestamp::UnixMillis(0),
    }
}

// ============================================================================
// SECTION: Audit Sink
// ============================================================================

#[test]
fn audit_events_arrive_in_order() {
    let (tx, mut rx) = mpsc::channel(8);
    let sink = ChannelAuditSink::new(tx);
    sink.record(&event("first")).unwrap();
    sink.record(&event("second")).unwrap();

    assert_eq!(rx.try_recv().unwrap().reason, "first");
    assert_eq!(rx.try_recv().unwrap().reason, "second");
    assert!(rx.try_recv().is_err());
}

#[test]
fn a_full_audit_channel_is_a_sink_error() {
    let (tx, _rx) = mpsc::channel(1);
    let sink = ChannelAuditSink::new(tx);
    sink.record(&event("fits")).unwrap();
    assert!(sink.record(&event("overflow")).is_err());
}

// ============================================================================
// SECTION: Alert Sink
// ============================================================================

#[test]
fn alerts_carry_flag_message_and_severity() {
    let (tx, mut rx) = mpsc::channel(8);
    let sink = ChannelAlertSink::new(tx);
    sink.notify(&FlagId::new("checkout"), "error rate above threshold", AlertSeverity::High)
        .unwrap();

    let notice = rx.try_recv().unwrap();
    assert_eq!(notice.flag_id, FlagId::new("checkout"));
    assert_eq!(notice.message, "error rate above threshold");
    assert_eq!(notice.severity, AlertSeverity::High);
}

// ============================================================================
// SECTION: Usage Sink
// ============================================================================

#[test]
fn usage_observations_are_best_effort() {
    let (tx, mut rx) = mpsc::channel(1);
    let sink = ChannelUsageSink::new(tx);
    sink.observe(&FlagId::new("checkout"), &"user-1".into(), true);
    // The channel is full now; the next observation is dropped silently.
    sink.observe(&FlagId::new("checkout"), &"user-2".into(), false);

    let observation = rx.try_recv().unwrap();
    assert_eq!(observation.user_id, "user-1".into());
    assert!(observation.enabled);
    assert!(rx.try_recv().is_err());
}
