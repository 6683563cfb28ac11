//! Monitor client, the hexagonal core.
//!
//! [`MonitorClient`] owns the session state machine, the log feed and the
//! configuration.  It exposes a transport-agnostic API: user commands and
//! inbound channel messages go in, outbound messages and presentation
//! events come out through port traits injected at call sites.
//!
//! ```text
//!  UserCommand ──▶ ┌──────────────────────────┐ ──▶ ChannelPort
//!                  │      MonitorClient       │ ──▶ PresentationSink
//!  InboundMsg  ──▶ │ Validator · FSM · Feed   │ ──▶ ProbePort / ExportPort
//!                  └──────────────────────────┘
//! ```
//!
//! Sends never move the state.  Only inbound confirmations do.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::channel::codec;
use crate::channel::messages::{
    BusUpdatePayload, InboundMessage, MonitoringStartedPayload, OutboundMessage,
};
use crate::classifier::{DomainEvent, UNKNOWN, classify};
use crate::config::ClientConfig;
use crate::error::{ProtocolInconsistency, Rejection, Result, TransportError};
use crate::fsm::{Controls, SessionEvent, SessionMachine, SessionState, StatusKind};
use crate::log_feed::{LOG_CAPACITY, LogCategory, LogFeed, export_file_name};
use crate::validator::{MonitoringRequest, RawRequest, validate};

use super::commands::UserCommand;
use super::events::AppEvent;
use super::ports::{ChannelPort, ExportPort, PresentationSink, ProbePort};

// ───────────────────────────────────────────────────────────────
// MonitorClient
// ───────────────────────────────────────────────────────────────

/// The client core.  One instance per session.
pub struct MonitorClient {
    machine: SessionMachine,
    feed: LogFeed,
    config: ClientConfig,
    /// Session token assigned by the server on `connected`.
    identity: Option<String>,
    /// Last start request sent and not yet confirmed or refused.
    pending_start: Option<MonitoringRequest>,
}

impl MonitorClient {
    /// Construct the client in `Disconnected`.
    ///
    /// Does **not** announce itself, call [`start`](Self::start) next.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            machine: SessionMachine::new(),
            feed: LogFeed::new(),
            config,
            identity: None,
            pending_start: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Record the ready notice and push the initial status and controls.
    pub fn start(&mut self, sink: &mut impl PresentationSink) {
        self.record(
            LogCategory::Info,
            format!("Client ready (log capacity {LOG_CAPACITY})"),
            sink,
        );
        self.render_state(sink);
        info!("MonitorClient started in {}", self.machine.state_name());
    }

    /// Best-effort stop before the process exits.  Nothing is awaited and
    /// nothing is written to the feed.
    pub fn teardown(&mut self, channel: &mut impl ChannelPort) {
        debug!("Teardown after {} session event(s)", self.machine.applied());
        if !self.config.stop_on_teardown || !self.machine.state().is_active() {
            return;
        }
        match channel.emit(&OutboundMessage::StopMonitoring) {
            Ok(()) => info!("Teardown: stop sent for active session"),
            Err(e) => warn!("Teardown: stop not delivered: {}", e),
        }
    }

    // ── User commands ─────────────────────────────────────────

    /// Dispatch a user command.
    ///
    /// The `io` parameter satisfies all three outward ports, avoiding a
    /// triple mutable borrow while keeping the boundaries explicit.
    pub fn handle_command(
        &mut self,
        cmd: UserCommand,
        io: &mut (impl ChannelPort + ProbePort + ExportPort),
        sink: &mut impl PresentationSink,
    ) -> Result<()> {
        match cmd {
            UserCommand::StartMonitoring(raw) => self.start_monitoring(&raw, io, sink),
            UserCommand::StopMonitoring => self.stop_monitoring(io, sink),
            UserCommand::QueryStatus => self.query_status(io, sink),
            UserCommand::ClearLog => {
                self.clear_log(sink);
                Ok(())
            }
            UserCommand::ExportLog => self.export_log(io, Utc::now(), sink),
            UserCommand::Probe => self.probe(io, sink),
            UserCommand::ProbeDirect => self.probe_direct(io, sink),
            UserCommand::Teardown => {
                self.teardown(io);
                Ok(())
            }
        }
    }

    /// Validate `raw` and forward a start request.  The state does not
    /// change until the server confirms.
    pub fn start_monitoring(
        &mut self,
        raw: &RawRequest,
        channel: &mut impl ChannelPort,
        sink: &mut impl PresentationSink,
    ) -> Result<()> {
        let state = self.machine.state();
        let (active, can_start) = (state.is_active(), state.can_start());
        if active {
            self.record(
                LogCategory::Error,
                "Monitoring is already active - stop it first",
                sink,
            );
            return Err(Rejection::AlreadyActive.into());
        }
        if !can_start {
            self.record(LogCategory::Error, "Not connected to server", sink);
            return Err(TransportError::NotConnected.into());
        }

        let req = match validate(raw, &self.config) {
            Ok(req) => req,
            Err(e) => {
                self.record(LogCategory::Error, format!("Invalid request: {e}"), sink);
                return Err(e.into());
            }
        };

        if let Err(e) = channel.emit(&OutboundMessage::start(&req)) {
            self.record(
                LogCategory::Error,
                format!("Failed to send start request: {e}"),
                sink,
            );
            return Err(e.into());
        }

        self.record(
            LogCategory::Info,
            format!(
                "Start requested: bus {} at ({}, {}) every {}s",
                req.target_id(),
                req.latitude(),
                req.longitude(),
                req.interval_secs()
            ),
            sink,
        );
        self.pending_start = Some(req);
        Ok(())
    }

    /// Forward a stop request.  Only legal while `Active`.
    pub fn stop_monitoring(
        &mut self,
        channel: &mut impl ChannelPort,
        sink: &mut impl PresentationSink,
    ) -> Result<()> {
        if !self.machine.state().can_stop() {
            self.record(LogCategory::Error, "No active monitoring to stop", sink);
            return Err(Rejection::NotActive.into());
        }
        self.emit_logged(channel, &OutboundMessage::StopMonitoring, "Stop requested", sink)
    }

    /// Ask the server for the authoritative session status.
    pub fn query_status(
        &mut self,
        channel: &mut impl ChannelPort,
        sink: &mut impl PresentationSink,
    ) -> Result<()> {
        if self.machine.state() == &SessionState::Disconnected {
            self.record(LogCategory::Error, "Not connected to server", sink);
            return Err(TransportError::NotConnected.into());
        }
        self.emit_logged(
            channel,
            &OutboundMessage::GetSessionStatus,
            "Session status requested",
            sink,
        )
    }

    /// Empty the feed.  The clear notice is rendered like any other entry.
    pub fn clear_log(&mut self, sink: &mut impl PresentationSink) {
        let notice = self.feed.clear();
        sink.render(&AppEvent::Log(notice));
    }

    /// Write the feed snapshot under a timestamped name.
    pub fn export_log(
        &mut self,
        export: &mut impl ExportPort,
        now: DateTime<Utc>,
        sink: &mut impl PresentationSink,
    ) -> Result<()> {
        let file_name = export_file_name(&self.config.export_prefix, now);
        let contents = self.feed.render_export();
        let count = self.feed.len();

        if let Err(e) = export.write_export(&file_name, &contents) {
            self.record(LogCategory::Error, format!("Log export failed: {e}"), sink);
            return Err(e.into());
        }
        self.record(
            LogCategory::Info,
            format!("Log exported to {file_name} ({count} entries)"),
            sink,
        );
        Ok(())
    }

    /// Station probe for the active session, keyed by the identity token.
    pub fn probe(
        &mut self,
        probe: &mut impl ProbePort,
        sink: &mut impl PresentationSink,
    ) -> Result<()> {
        if !self.machine.state().is_active() {
            self.record(LogCategory::Error, "Start monitoring before probing", sink);
            return Err(Rejection::ProbeNeedsActiveSession.into());
        }
        let Some(identity) = self.identity.clone() else {
            self.record(LogCategory::Error, "No session id assigned yet", sink);
            return Err(Rejection::ProbeNeedsIdentity.into());
        };
        self.run_probe(probe, Some(identity.as_str()), sink)
    }

    /// Probe without the session gate or identity, so the collaborator's
    /// rejection path can be observed.
    pub fn probe_direct(
        &mut self,
        probe: &mut impl ProbePort,
        sink: &mut impl PresentationSink,
    ) -> Result<()> {
        self.run_probe(probe, None, sink)
    }

    // ── Inbound ───────────────────────────────────────────────

    /// Decode one raw frame and handle it.  Malformed frames are logged
    /// and dropped.
    pub fn handle_frame(
        &mut self,
        frame: &str,
        channel: &mut impl ChannelPort,
        sink: &mut impl PresentationSink,
    ) {
        match codec::decode(frame) {
            Ok(msg) => self.handle_inbound(msg, channel, sink),
            Err(e) => {
                warn!("Dropping inbound frame: {}", e);
                self.record(LogCategory::Error, format!("⚠️ Dropped frame: {e}"), sink);
            }
        }
    }

    /// React to one inbound channel message.
    pub fn handle_inbound(
        &mut self,
        msg: InboundMessage,
        channel: &mut impl ChannelPort,
        sink: &mut impl PresentationSink,
    ) {
        debug!("Inbound: {}", msg.name());
        match msg {
            InboundMessage::Connected(p) => {
                self.identity.clone_from(&p.session_id);
                self.apply(
                    SessionEvent::TransportConnected {
                        session_id: p.session_id,
                    },
                    sink,
                );
                self.reconcile(channel, sink);
            }
            InboundMessage::Disconnected => {
                // The server drops the session with the socket.
                self.identity = None;
                self.pending_start = None;
                self.apply(SessionEvent::TransportDisconnected, sink);
            }
            InboundMessage::Reconnected => {
                // A fresh id only arrives with the next `connected`.
                self.identity = None;
                self.apply(SessionEvent::TransportReconnected, sink);
                self.reconcile(channel, sink);
            }
            InboundMessage::MonitoringStarted(p) => {
                let event = self.started_event(p);
                self.apply(event, sink);
            }
            InboundMessage::MonitoringStopped(p) => {
                self.pending_start = None;
                self.apply(SessionEvent::MonitoringStopped { message: p.message }, sink);
            }
            InboundMessage::SessionStatus(p) => {
                if !p.active {
                    self.pending_start = None;
                }
                self.apply(
                    SessionEvent::SessionStatus {
                        active: p.active,
                        target_id: p.target_id,
                        interval_secs: p.interval_secs,
                    },
                    sink,
                );
            }
            InboundMessage::Error(p) => {
                self.pending_start = None;
                let reason = p.message.unwrap_or_else(|| UNKNOWN.to_owned());
                self.apply(SessionEvent::DomainError { reason }, sink);
            }
            InboundMessage::BusUpdate(p) => self.handle_update(p, sink),
            InboundMessage::Unknown { name } => {
                warn!("Unrecognised inbound event: {}", name);
                self.record(
                    LogCategory::Error,
                    format!("⚠️ Unrecognised event '{name}' ignored"),
                    sink,
                );
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> &SessionState {
        self.machine.state()
    }

    /// Control enablement for the current state.
    pub fn controls(&self) -> Controls {
        self.machine.state().controls()
    }

    pub fn feed(&self) -> &LogFeed {
        &self.feed
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn pending_start(&self) -> Option<&MonitoringRequest> {
        self.pending_start.as_ref()
    }

    // ── Internal ──────────────────────────────────────────────

    /// Append to the feed and push the entry to the sink.
    fn record(
        &mut self,
        category: LogCategory,
        text: impl Into<String>,
        sink: &mut impl PresentationSink,
    ) {
        let entry = self.feed.append(category, text);
        sink.render(&AppEvent::Log(entry));
    }

    fn render_state(&self, sink: &mut impl PresentationSink) {
        let state = self.machine.state();
        sink.render(&AppEvent::Status {
            kind: state.status_kind(),
            text: state.status_text(),
        });
        sink.render(&AppEvent::Controls(state.controls()));
    }

    /// Run one event through the machine and surface the result.
    fn apply(&mut self, event: SessionEvent, sink: &mut impl PresentationSink) {
        let transition = self.machine.apply(&event);
        for (category, text) in transition.notes() {
            self.record(category, text, sink);
        }
        self.render_state(sink);
    }

    fn emit_logged(
        &mut self,
        channel: &mut impl ChannelPort,
        msg: &OutboundMessage,
        note: &str,
        sink: &mut impl PresentationSink,
    ) -> Result<()> {
        match channel.emit(msg) {
            Ok(()) => {
                self.record(LogCategory::Info, note, sink);
                Ok(())
            }
            Err(e) => {
                self.record(
                    LogCategory::Error,
                    format!("Failed to send {}: {e}", msg.name()),
                    sink,
                );
                Err(e.into())
            }
        }
    }

    /// After (re)connecting, never trust the last known state: ask.
    fn reconcile(&mut self, channel: &mut impl ChannelPort, sink: &mut impl PresentationSink) {
        if !self.config.query_status_on_connect {
            return;
        }
        // Failure is already in the feed; the connection event itself stands.
        let _ = self.emit_logged(
            channel,
            &OutboundMessage::GetSessionStatus,
            "Session status requested",
            sink,
        );
    }

    /// Fill gaps in a start confirmation from the request we sent.
    fn started_event(&mut self, p: MonitoringStartedPayload) -> SessionEvent {
        let pending = self.pending_start.take();
        let target_id = p
            .target_id
            .or_else(|| pending.as_ref().map(|r| r.target_id().to_owned()))
            .unwrap_or_else(|| UNKNOWN.to_owned());
        let interval_secs = p
            .interval_secs
            .or_else(|| pending.as_ref().map(MonitoringRequest::interval_secs))
            .unwrap_or(0);
        SessionEvent::MonitoringStarted {
            target_id,
            interval_secs,
            message: p.message,
        }
    }

    /// Classify and log an arrival update.  Never moves the state.
    fn handle_update(&mut self, p: BusUpdatePayload, sink: &mut impl PresentationSink) {
        let classification = classify(&DomainEvent::from(p));
        let found = classification.is_found();
        self.record(classification.category, classification.summary, sink);

        if self.machine.state().is_active() {
            let kind = if found {
                StatusKind::Active
            } else {
                StatusKind::Error
            };
            sink.render(&AppEvent::Status {
                kind,
                text: classification.status_text,
            });
        } else {
            let note = ProtocolInconsistency {
                believed: self.machine.state_name(),
                event: "bus_update".to_owned(),
            };
            warn!("Session: {}", note);
            self.record(LogCategory::Error, format!("⚠️ {note}"), sink);
        }
    }

    fn run_probe(
        &mut self,
        probe: &mut impl ProbePort,
        identity: Option<&str>,
        sink: &mut impl PresentationSink,
    ) -> Result<()> {
        self.record(
            LogCategory::Domain,
            format!("Probe request (session: {})", identity.unwrap_or("none")),
            sink,
        );
        match probe.probe(identity) {
            Ok(response) => {
                if response.success() {
                    let count = response
                        .total_count()
                        .or_else(|| response.items().map(|v| v.len() as u64));
                    let count = count.map_or_else(|| UNKNOWN.to_owned(), |n| n.to_string());
                    self.record(
                        LogCategory::Domain,
                        format!("Probe succeeded: {count} buses"),
                        sink,
                    );
                    if let Some(listing) = response.arrivals_listing() {
                        self.record(LogCategory::Domain, format!("🚌 Buses: {listing}"), sink);
                    }
                } else {
                    self.record(
                        LogCategory::Error,
                        format!(
                            "Probe failed: {} - {}",
                            response.error_code().unwrap_or(UNKNOWN),
                            response.error().unwrap_or(UNKNOWN)
                        ),
                        sink,
                    );
                }
                sink.render(&AppEvent::ProbeResult(response));
                Ok(())
            }
            Err(e) => {
                self.record(LogCategory::Error, format!("Probe failed: {e}"), sink);
                Err(e.into())
            }
        }
    }
}
