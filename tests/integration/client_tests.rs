//! Integration tests for the command → channel → inbound → state pipeline.

use super::mock_ports::{
    CONNECTED, DISCONNECTED, RECONNECTED, STARTED_402, STOPPED, feed, make_client,
};

use buswatch::app::commands::UserCommand;
use buswatch::app::ports::ChannelError;
use buswatch::channel::messages::{OutboundMessage, StartPayload};
use buswatch::config::ClientConfig;
use buswatch::error::{Error, Rejection, TransportError};
use buswatch::fsm::{SessionState, StatusKind};
use buswatch::log_feed::{LOG_CAPACITY, LogCategory};
use buswatch::validator::{RawRequest, ValidationError};

fn start_402() -> UserCommand {
    UserCommand::StartMonitoring(RawRequest::new("37.5", "127.0", "402", "30"))
}

fn active_402() -> SessionState {
    SessionState::Active {
        target_id: "402".into(),
        interval_secs: 30,
    }
}

// ── Scenario A: start → confirmation → Active ────────────────

#[test]
fn start_then_confirmation_becomes_active() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED]);
    assert_eq!(client.state(), &SessionState::Connected);

    client.handle_command(start_402(), &mut io, &mut sink).unwrap();
    assert_eq!(
        io.last_sent(),
        Some(&OutboundMessage::StartMonitoring(StartPayload {
            lat: 37.5,
            lng: 127.0,
            bus_number: "402".into(),
            interval: 30,
        }))
    );
    // Sending alone never moves the state.
    assert_eq!(client.state(), &SessionState::Connected);

    feed(&mut client, &mut io, &mut sink, &[STARTED_402]);
    assert_eq!(client.state(), &active_402());
    assert_eq!(sink.last_status().map(|s| s.0), Some(StatusKind::Active));
    assert!(client.controls().stop_enabled);
    assert!(!client.controls().start_enabled);
}

#[test]
fn unacknowledged_start_stays_connected() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED]);
    client.handle_command(start_402(), &mut io, &mut sink).unwrap();
    feed(&mut client, &mut io, &mut sink, &[r#"42["bus_update",{"bus_found":false}]"#]);
    assert_eq!(client.state(), &SessionState::Connected);
    assert!(client.pending_start().is_some());
}

// ── Scenario B: arrival update while Active ──────────────────

#[test]
fn urgent_arrival_is_success_and_keeps_state() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED, STARTED_402]);

    feed(
        &mut client,
        &mut io,
        &mut sink,
        &[r#"42["bus_update",{"bus_found":true,"bus_number":"402","arrival_time_formatted":"3분","remaining_stations":2,"urgency":"urgent"}]"#],
    );

    let entry = sink.last_log().expect("update logged");
    assert_eq!(entry.category, LogCategory::Success);
    assert!(entry.text.contains("402"));
    assert!(entry.text.contains("3분"));
    assert!(entry.text.contains('2'));
    assert!(entry.text.starts_with("🚨"));
    assert_eq!(client.state(), &active_402());

    let (kind, text) = sink.last_status().expect("status rendered");
    assert_eq!(kind, StatusKind::Active);
    assert!(text.contains("3분"));
}

#[test]
fn not_found_update_is_error_but_keeps_monitoring() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED, STARTED_402]);
    feed(
        &mut client,
        &mut io,
        &mut sink,
        &[r#"42["bus_update",{"bus_found":false,"message":"402번 버스 정보 없음"}]"#],
    );
    assert_eq!(sink.last_log().map(|e| e.category), Some(LogCategory::Error));
    assert_eq!(sink.last_status().map(|s| s.0), Some(StatusKind::Error));
    assert!(client.state().is_active());
}

#[test]
fn update_outside_active_is_flagged() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED]);
    sink.clear();
    feed(
        &mut client,
        &mut io,
        &mut sink,
        &[r#"42["bus_update",{"bus_found":true,"bus_number":"402"}]"#],
    );
    let logs = sink.logs();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].category, LogCategory::Success);
    assert_eq!(logs[1].category, LogCategory::Error);
    assert!(logs[1].text.contains("bus_update"));
    assert_eq!(client.state(), &SessionState::Connected);
}

// ── Scenario C: disconnect → reconnect needs re-query ────────

#[test]
fn disconnect_faults_and_reconnect_is_only_connected() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED, STARTED_402, DISCONNECTED]);
    assert_eq!(
        client.state(),
        &SessionState::Faulted {
            reason: "connection lost".into()
        }
    );
    assert_eq!(sink.last_status().map(|s| s.0), Some(StatusKind::Error));

    io.sent.clear();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED]);
    assert_eq!(client.state(), &SessionState::Connected);
    assert_eq!(io.sent, vec![OutboundMessage::GetSessionStatus]);
}

#[test]
fn reconnect_requeries_and_status_restores_active() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED, STARTED_402]);
    io.sent.clear();

    feed(&mut client, &mut io, &mut sink, &[RECONNECTED]);
    assert_eq!(client.state(), &SessionState::Connected);
    assert_eq!(io.sent, vec![OutboundMessage::GetSessionStatus]);

    feed(
        &mut client,
        &mut io,
        &mut sink,
        &[r#"42["session_status",{"active":true,"bus_number":"402","interval":30}]"#],
    );
    assert_eq!(client.state(), &active_402());
}

#[test]
fn inactive_status_after_reconnect_stops() {
    let (mut client, mut io, mut sink) = make_client();
    feed(
        &mut client,
        &mut io,
        &mut sink,
        &[CONNECTED, STARTED_402, RECONNECTED, r#"42["session_status",{"active":false}]"#],
    );
    assert_eq!(client.state(), &SessionState::Stopped);
    assert!(client.controls().start_enabled);
}

#[test]
fn requery_can_be_disabled() {
    let config = ClientConfig {
        query_status_on_connect: false,
        ..ClientConfig::default()
    };
    let mut client = buswatch::app::service::MonitorClient::new(config);
    let mut io = super::mock_ports::MockIo::new();
    let mut sink = super::mock_ports::RecordingSink::new();
    client.start(&mut sink);
    feed(&mut client, &mut io, &mut sink, &[CONNECTED, RECONNECTED]);
    assert!(io.sent.is_empty());
}

// ── Scenario D: stop while Stopped ───────────────────────────

#[test]
fn stop_while_stopped_is_rejected_locally() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED, STARTED_402, STOPPED]);
    assert_eq!(client.state(), &SessionState::Stopped);
    let sent_before = io.sent.len();
    sink.clear();

    let err = client
        .handle_command(UserCommand::StopMonitoring, &mut io, &mut sink)
        .unwrap_err();
    assert_eq!(err, Error::Rejected(Rejection::NotActive));
    assert_eq!(io.sent.len(), sent_before);
    let logs = sink.logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].category, LogCategory::Error);
    assert_eq!(client.state(), &SessionState::Stopped);
}

#[test]
fn stop_while_active_is_forwarded() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED, STARTED_402]);
    client
        .handle_command(UserCommand::StopMonitoring, &mut io, &mut sink)
        .unwrap();
    assert_eq!(io.last_sent(), Some(&OutboundMessage::StopMonitoring));
    // Still active until the server confirms.
    assert!(client.state().is_active());
    feed(&mut client, &mut io, &mut sink, &[STOPPED]);
    assert_eq!(client.state(), &SessionState::Stopped);
}

// ── Start gating ──────────────────────────────────────────────

#[test]
fn start_while_active_is_rejected() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED, STARTED_402]);
    let sent_before = io.sent.len();
    let err = client.handle_command(start_402(), &mut io, &mut sink).unwrap_err();
    assert_eq!(err, Error::Rejected(Rejection::AlreadyActive));
    assert_eq!(io.sent.len(), sent_before);
}

#[test]
fn start_before_connect_is_rejected() {
    let (mut client, mut io, mut sink) = make_client();
    let err = client.handle_command(start_402(), &mut io, &mut sink).unwrap_err();
    assert_eq!(err, Error::Transport(TransportError::NotConnected));
    assert!(io.sent.is_empty());
}

#[test]
fn invalid_request_never_reaches_the_channel() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED]);
    let sent_before = io.sent.len();

    let err = client
        .handle_command(
            UserCommand::StartMonitoring(RawRequest::new("90.0001", "127.0", "402", "30")),
            &mut io,
            &mut sink,
        )
        .unwrap_err();
    assert_eq!(err, Error::Validation(ValidationError::LatitudeOutOfRange));

    let err = client
        .handle_command(
            UserCommand::StartMonitoring(RawRequest::new("37.5", "127.0", "402", "9")),
            &mut io,
            &mut sink,
        )
        .unwrap_err();
    assert_eq!(err, Error::Validation(ValidationError::IntervalOutOfRange));

    assert_eq!(io.sent.len(), sent_before);
    assert_eq!(client.state(), &SessionState::Connected);
    assert_eq!(sink.last_log().map(|e| e.category), Some(LogCategory::Error));
}

#[test]
fn start_allowed_again_after_fault() {
    let (mut client, mut io, mut sink) = make_client();
    feed(
        &mut client,
        &mut io,
        &mut sink,
        &[CONNECTED, r#"42["error",{"message":"주변에 정류장이 없습니다"}]"#],
    );
    assert_eq!(
        client.state(),
        &SessionState::Faulted {
            reason: "주변에 정류장이 없습니다".into()
        }
    );
    assert!(client.controls().start_enabled);
    client.handle_command(start_402(), &mut io, &mut sink).unwrap();
}

#[test]
fn channel_failure_is_reported_and_leaves_nothing_pending() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED]);
    io.channel_error = Some(ChannelError::SendFailed("socket closed".into()));
    let err = client.handle_command(start_402(), &mut io, &mut sink).unwrap_err();
    assert!(matches!(err, Error::Channel(ChannelError::SendFailed(_))));
    assert!(client.pending_start().is_none());
    assert_eq!(sink.last_log().map(|e| e.category), Some(LogCategory::Error));
}

#[test]
fn status_query_is_forwarded_and_logged() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED]);
    io.sent.clear();
    client
        .handle_command(UserCommand::QueryStatus, &mut io, &mut sink)
        .unwrap();
    assert_eq!(io.sent, vec![OutboundMessage::GetSessionStatus]);
    assert_eq!(sink.last_log().map(|e| e.category), Some(LogCategory::Info));
}

// ── Inconsistencies and malformed input ──────────────────────

#[test]
fn start_for_other_target_while_active_notes_inconsistency() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED, STARTED_402]);
    sink.clear();
    feed(
        &mut client,
        &mut io,
        &mut sink,
        &[r#"42["monitoring_started",{"bus_number":"1002","interval":60}]"#],
    );
    assert_eq!(
        client.state(),
        &SessionState::Active {
            target_id: "1002".into(),
            interval_secs: 60
        }
    );
    let logs = sink.logs();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].category, LogCategory::Success);
    assert!(logs[1].text.contains("trusting server"));
}

#[test]
fn malformed_and_unknown_frames_are_logged_not_fatal() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED]);
    sink.clear();
    feed(
        &mut client,
        &mut io,
        &mut sink,
        &["{not json", r#"42["server_stats",{}]"#],
    );
    assert_eq!(sink.logs_in(LogCategory::Error), 2);
    assert_eq!(client.state(), &SessionState::Connected);
}

#[test]
fn repeated_connected_is_idempotent() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED, CONNECTED]);
    assert_eq!(client.state(), &SessionState::Connected);
}

// ── Log feed via commands ────────────────────────────────────

#[test]
fn clear_leaves_only_the_notice() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED, STARTED_402]);
    client
        .handle_command(UserCommand::ClearLog, &mut io, &mut sink)
        .unwrap();
    let snap = client.feed().snapshot();
    assert_eq!(snap.len(), 1);
    assert_eq!(snap[0].category, LogCategory::Info);
    assert_eq!(snap[0].text, "Log cleared");
}

#[test]
fn feed_is_bounded_under_a_flood() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED, STARTED_402]);
    let update = r#"42["bus_update",{"bus_found":true,"bus_number":"402","urgency":"normal"}]"#;
    for _ in 0..(LOG_CAPACITY + 50) {
        client.handle_frame(update, &mut io, &mut sink);
    }
    assert_eq!(client.feed().len(), LOG_CAPACITY);
    let seqs: Vec<u64> = client.feed().iter().map(|e| e.sequence).collect();
    assert!(seqs.windows(2).all(|w| w[1] == w[0] + 1));
}

// ── Teardown ─────────────────────────────────────────────────

#[test]
fn teardown_stops_an_active_session() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED, STARTED_402]);
    let feed_len = client.feed().len();
    client
        .handle_command(UserCommand::Teardown, &mut io, &mut sink)
        .unwrap();
    assert_eq!(io.last_sent(), Some(&OutboundMessage::StopMonitoring));
    assert_eq!(client.feed().len(), feed_len);
}

#[test]
fn teardown_is_silent_when_not_active() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED, STARTED_402, STOPPED]);
    io.sent.clear();
    client.teardown(&mut io);
    assert!(io.sent.is_empty());
}

#[test]
fn teardown_failure_is_swallowed() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED, STARTED_402]);
    io.channel_error = Some(ChannelError::NotConnected);
    client.teardown(&mut io);
    assert!(client.state().is_active());
}

// ── Pending start bookkeeping ────────────────────────────────

#[test]
fn pending_start_dropped_when_server_reports_inactive() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED]);
    client.handle_command(start_402(), &mut io, &mut sink).unwrap();
    assert!(client.pending_start().is_some());

    feed(&mut client, &mut io, &mut sink, &[r#"42["session_status",{"active":false}]"#]);
    assert!(client.pending_start().is_none());
}

#[test]
fn pending_start_dropped_on_stop_and_disconnect() {
    for frame in [STOPPED, DISCONNECTED] {
        let (mut client, mut io, mut sink) = make_client();
        feed(&mut client, &mut io, &mut sink, &[CONNECTED]);
        client.handle_command(start_402(), &mut io, &mut sink).unwrap();

        feed(&mut client, &mut io, &mut sink, &[frame]);
        assert!(client.pending_start().is_none(), "still pending after {frame}");
    }
}

#[test]
fn bare_confirmation_after_disconnect_is_not_filled_from_old_request() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED]);
    client.handle_command(start_402(), &mut io, &mut sink).unwrap();
    feed(
        &mut client,
        &mut io,
        &mut sink,
        &[DISCONNECTED, CONNECTED, r#"42["monitoring_started",{}]"#],
    );
    assert_eq!(
        client.state(),
        &SessionState::Active {
            target_id: "unknown".into(),
            interval_secs: 0
        }
    );
}

#[test]
fn disconnect_forgets_identity() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED]);
    assert_eq!(client.identity(), Some("sid-402"));
    feed(&mut client, &mut io, &mut sink, &[DISCONNECTED]);
    assert_eq!(client.identity(), None);
    feed(&mut client, &mut io, &mut sink, &[CONNECTED]);
    assert_eq!(client.identity(), Some("sid-402"));
}
