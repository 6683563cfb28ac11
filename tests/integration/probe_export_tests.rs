//! Integration tests for the station probe gate and the log export.

use super::mock_ports::{CONNECTED, DISCONNECTED, RECONNECTED, STARTED_402, feed, make_client};

use buswatch::app::commands::UserCommand;
use buswatch::app::events::AppEvent;
use buswatch::app::ports::{ExportError, ProbeError, ProbeResponse};
use buswatch::app::service::MonitorClient;
use buswatch::config::ClientConfig;
use buswatch::error::{Error, Rejection};
use buswatch::log_feed::LogCategory;
use chrono::{TimeZone, Utc};

fn station_response() -> ProbeResponse {
    ProbeResponse::from_json(
        r#"{"success": true, "total_count": 2, "buses": [
            {"route_name": "402", "arrival_time": 180},
            {"route_name": "1002"}
        ]}"#,
    )
    .unwrap()
}

// ── Probe gating ─────────────────────────────────────────────

#[test]
fn probe_requires_active_session() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED]);
    let err = client
        .handle_command(UserCommand::Probe, &mut io, &mut sink)
        .unwrap_err();
    assert_eq!(err, Error::Rejected(Rejection::ProbeNeedsActiveSession));
    assert!(io.probe_calls.is_empty());
    assert_eq!(sink.last_log().map(|e| e.category), Some(LogCategory::Error));
}

#[test]
fn probe_requires_identity() {
    let (mut client, mut io, mut sink) = make_client();
    feed(
        &mut client,
        &mut io,
        &mut sink,
        &[r#"42["connected",{}]"#, STARTED_402],
    );
    assert!(client.state().is_active());
    assert_eq!(client.identity(), None);

    let err = client
        .handle_command(UserCommand::Probe, &mut io, &mut sink)
        .unwrap_err();
    assert_eq!(err, Error::Rejected(Rejection::ProbeNeedsIdentity));
    assert!(io.probe_calls.is_empty());
}

#[test]
fn probe_passes_identity_and_response_through() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED, STARTED_402]);
    io.probe_response = Some(station_response());

    client
        .handle_command(UserCommand::Probe, &mut io, &mut sink)
        .unwrap();

    assert_eq!(io.probe_calls, vec![Some("sid-402".to_owned())]);
    let passed = sink.events.iter().find_map(|e| match e {
        AppEvent::ProbeResult(r) => Some(r.clone()),
        _ => None,
    });
    assert_eq!(passed, Some(station_response()));

    let logs = sink.logs();
    let tail: Vec<_> = logs[logs.len() - 2..]
        .iter()
        .map(|e| (e.category, e.text.as_str()))
        .collect();
    assert_eq!(
        tail,
        vec![
            (LogCategory::Domain, "Probe succeeded: 2 buses"),
            (LogCategory::Domain, "🚌 Buses: 402 (180s), 1002 (unknown)"),
        ]
    );
}

#[test]
fn empty_bus_list_logs_only_the_count() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED, STARTED_402]);
    io.probe_response = Some(
        ProbeResponse::from_json(r#"{"success": true, "total_count": 0, "buses": []}"#).unwrap(),
    );

    client
        .handle_command(UserCommand::Probe, &mut io, &mut sink)
        .unwrap();
    let entry = sink.last_log().expect("probe summary");
    assert_eq!(entry.text, "Probe succeeded: 0 buses");
}

#[test]
fn probe_after_reconnect_needs_a_fresh_identity() {
    let (mut client, mut io, mut sink) = make_client();
    feed(
        &mut client,
        &mut io,
        &mut sink,
        &[
            r#"42["connected",{"session_id":"old-sid"}]"#,
            STARTED_402,
            DISCONNECTED,
            RECONNECTED,
            r#"42["session_status",{"active":true,"bus_number":"402","interval":30}]"#,
        ],
    );
    assert!(client.state().is_active());
    assert_eq!(client.identity(), None);

    io.probe_response = Some(station_response());
    let err = client
        .handle_command(UserCommand::Probe, &mut io, &mut sink)
        .unwrap_err();
    assert_eq!(err, Error::Rejected(Rejection::ProbeNeedsIdentity));
    assert!(io.probe_calls.is_empty());

    // The next `connected` hands out the new id.
    feed(
        &mut client,
        &mut io,
        &mut sink,
        &[
            r#"42["connected",{"session_id":"new-sid"}]"#,
            r#"42["session_status",{"active":true,"bus_number":"402","interval":30}]"#,
        ],
    );
    client
        .handle_command(UserCommand::Probe, &mut io, &mut sink)
        .unwrap();
    assert_eq!(io.probe_calls, vec![Some("new-sid".to_owned())]);
}

#[test]
fn probe_failure_body_is_logged_as_error() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED, STARTED_402]);
    io.probe_response = Some(
        ProbeResponse::from_json(
            r#"{"success": false, "error_code": "SESSION_NOT_FOUND", "error": "세션이 없습니다"}"#,
        )
        .unwrap(),
    );

    client
        .handle_command(UserCommand::Probe, &mut io, &mut sink)
        .unwrap();
    let entry = sink.last_log().expect("probe summary");
    assert_eq!(entry.category, LogCategory::Error);
    assert_eq!(entry.text, "Probe failed: SESSION_NOT_FOUND - 세션이 없습니다");
}

#[test]
fn unreachable_probe_is_an_error() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED, STARTED_402]);
    let err = client
        .handle_command(UserCommand::Probe, &mut io, &mut sink)
        .unwrap_err();
    assert!(matches!(err, Error::Probe(ProbeError::Unavailable(_))));
}

#[test]
fn direct_probe_skips_gate_and_identity() {
    let (mut client, mut io, mut sink) = make_client();
    io.probe_response = Some(station_response());
    client
        .handle_command(UserCommand::ProbeDirect, &mut io, &mut sink)
        .unwrap();
    assert_eq!(io.probe_calls, vec![None]);
}

// ── Export ───────────────────────────────────────────────────

#[test]
fn export_writes_snapshot_under_timestamped_name() {
    let (mut client, mut io, mut sink) = make_client();
    feed(&mut client, &mut io, &mut sink, &[CONNECTED, STARTED_402]);
    let entries_before = client.feed().len();
    let now = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 5).unwrap();

    client.export_log(&mut io, now, &mut sink).unwrap();

    assert_eq!(io.exports.len(), 1);
    let (name, body) = &io.exports[0];
    assert_eq!(name, "busz_test_logs_2026-10-18T09-30-05.txt");
    assert_eq!(body.lines().count(), entries_before);
    assert!(body.lines().all(|l| l.starts_with('[')));

    let entry = sink.last_log().expect("export notice");
    assert_eq!(entry.category, LogCategory::Info);
    assert!(entry.text.contains(name.as_str()));
}

#[test]
fn export_uses_configured_prefix() {
    let config = ClientConfig {
        export_prefix: "replay_".into(),
        ..ClientConfig::default()
    };
    let mut client = MonitorClient::new(config);
    let mut io = super::mock_ports::MockIo::new();
    let mut sink = super::mock_ports::RecordingSink::new();
    client.start(&mut sink);
    let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
    client.export_log(&mut io, now, &mut sink).unwrap();
    assert_eq!(io.exports[0].0, "replay_2026-01-02T03-04-05.txt");
}

#[test]
fn export_failure_is_reported() {
    let (mut client, mut io, mut sink) = make_client();
    io.export_error = Some(ExportError::Io("disk full".into()));
    let err = client
        .handle_command(UserCommand::ExportLog, &mut io, &mut sink)
        .unwrap_err();
    assert_eq!(err, Error::Export(ExportError::Io("disk full".into())));
    assert_eq!(sink.last_log().map(|e| e.category), Some(LogCategory::Error));
}
