//! Function-pointer session state machine.
//!
//! Same table-driven shape as a classic embedded FSM, but driven by
//! discrete server/transport events instead of ticks:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StateTable                                                  │
//! │  ┌──────────────┬───────────┬──────────┬──────────────────┐  │
//! │  │ StateId      │ on_enter  │ on_exit  │ accepts          │  │
//! │  ├──────────────┼───────────┼──────────┼──────────────────┤  │
//! │  │ Disconnected │ fn(state) │ -        │ fn(state, event) │  │
//! │  │ Connected    │ fn(state) │ -        │ fn(state, event) │  │
//! │  │ Active       │ fn(state) │ fn(state)│ fn(state, event) │  │
//! │  │ Stopped      │ fn(state) │ -        │ fn(state, event) │  │
//! │  │ Faulted      │ fn(state) │ fn(state)│ fn(state, event) │  │
//! │  └──────────────┴───────────┴──────────┴──────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The next state is a pure function of the event alone
//! ([`SessionEvent::target_state`]): the server is always trusted over the
//! local belief.  The current state's `accepts` function only decides
//! whether the event was *expected*; an unexpected event still applies and
//! yields a [`ProtocolInconsistency`] note.

pub mod states;

use core::fmt;

use log::{info, warn};

use crate::classifier::UNKNOWN;
use crate::error::ProtocolInconsistency;
use crate::log_feed::LogCategory;

/// Failure reason recorded when the transport drops.
pub const CONNECTION_LOST: &str = "connection lost";

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Payload-free state discriminant, used to index the state table.
/// Must stay in sync with [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Disconnected = 0,
    Connected = 1,
    Active = 2,
    Stopped = 3,
    Faulted = 4,
}

impl StateId {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 5;
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// The client's single belief about the monitoring session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Initial; no transport.
    Disconnected,
    /// Transport up, nothing being monitored.
    Connected,
    /// Server confirmed monitoring of `target_id` every `interval_secs`.
    Active { target_id: String, interval_secs: u16 },
    /// Monitoring ended, transport still up.
    Stopped,
    /// Transport or domain failure; monitoring implicitly not active.
    Faulted { reason: String },
}

/// Coarse status class for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Disconnected,
    Connected,
    Active,
    Stopped,
    Error,
}

impl StatusKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connected => "connected",
            Self::Active => "active",
            Self::Stopped => "stopped",
            Self::Error => "error",
        }
    }
}

/// Control enablement, derived purely from [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub start_enabled: bool,
    pub stop_enabled: bool,
    pub start_label: &'static str,
    pub stop_label: &'static str,
}

impl SessionState {
    pub fn id(&self) -> StateId {
        match self {
            Self::Disconnected => StateId::Disconnected,
            Self::Connected => StateId::Connected,
            Self::Active { .. } => StateId::Active,
            Self::Stopped => StateId::Stopped,
            Self::Faulted { .. } => StateId::Faulted,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    /// Whether a start request may be forwarded to the channel.
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Connected | Self::Stopped | Self::Faulted { .. })
    }

    /// Whether a stop request may be forwarded to the channel.
    pub fn can_stop(&self) -> bool {
        self.is_active()
    }

    pub fn status_kind(&self) -> StatusKind {
        match self {
            Self::Disconnected => StatusKind::Disconnected,
            Self::Connected => StatusKind::Connected,
            Self::Active { .. } => StatusKind::Active,
            Self::Stopped => StatusKind::Stopped,
            Self::Faulted { .. } => StatusKind::Error,
        }
    }

    /// One-line status for the presentation sink.
    pub fn status_text(&self) -> String {
        match self {
            Self::Disconnected => "Disconnected".to_owned(),
            Self::Connected => "Connected - ready to monitor".to_owned(),
            Self::Active {
                target_id,
                interval_secs,
            } => format!("Monitoring bus {target_id} every {interval_secs}s"),
            Self::Stopped => "Monitoring stopped".to_owned(),
            Self::Faulted { reason } => format!("Error: {reason}"),
        }
    }

    pub fn controls(&self) -> Controls {
        let active = self.is_active();
        Controls {
            start_enabled: self.can_start(),
            stop_enabled: self.can_stop(),
            start_label: if active {
                "🔄 Monitoring..."
            } else {
                "🚀 Start monitoring"
            },
            stop_label: "⏹️ Stop monitoring",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connected => write!(f, "Connected"),
            Self::Active {
                target_id,
                interval_secs,
            } => write!(f, "Active({target_id}, {interval_secs}s)"),
            Self::Stopped => write!(f, "Stopped"),
            Self::Faulted { reason } => write!(f, "Faulted({reason})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Authoritative notifications that move the session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    TransportConnected { session_id: Option<String> },
    TransportDisconnected,
    TransportReconnected,
    MonitoringStarted {
        target_id: String,
        interval_secs: u16,
        message: Option<String>,
    },
    MonitoringStopped { message: Option<String> },
    SessionStatus {
        active: bool,
        target_id: Option<String>,
        interval_secs: Option<u16>,
    },
    DomainError { reason: String },
}

impl SessionEvent {
    /// The state this event establishes, regardless of the prior state.
    pub fn target_state(&self) -> SessionState {
        match self {
            Self::TransportConnected { .. } | Self::TransportReconnected => {
                SessionState::Connected
            }
            Self::TransportDisconnected => SessionState::Faulted {
                reason: CONNECTION_LOST.to_owned(),
            },
            Self::MonitoringStarted {
                target_id,
                interval_secs,
                ..
            } => SessionState::Active {
                target_id: target_id.clone(),
                interval_secs: *interval_secs,
            },
            Self::MonitoringStopped { .. } => SessionState::Stopped,
            Self::SessionStatus {
                active: true,
                target_id,
                interval_secs,
            } => SessionState::Active {
                target_id: target_id.clone().unwrap_or_else(|| UNKNOWN.to_owned()),
                interval_secs: interval_secs.unwrap_or(0),
            },
            Self::SessionStatus { active: false, .. } => SessionState::Stopped,
            Self::DomainError { reason } => SessionState::Faulted {
                reason: reason.clone(),
            },
        }
    }

    /// Short event label used in inconsistency notes.
    pub fn label(&self) -> String {
        match self {
            Self::TransportConnected { .. } => "connected".to_owned(),
            Self::TransportDisconnected => "disconnected".to_owned(),
            Self::TransportReconnected => "reconnect".to_owned(),
            Self::MonitoringStarted {
                target_id,
                interval_secs,
                ..
            } => format!("monitoring_started(bus {target_id}, {interval_secs}s)"),
            Self::MonitoringStopped { .. } => "monitoring_stopped".to_owned(),
            Self::SessionStatus { active: true, .. } => "session_status(active)".to_owned(),
            Self::SessionStatus { active: false, .. } => "session_status(inactive)".to_owned(),
            Self::DomainError { .. } => "error".to_owned(),
        }
    }

    /// The single log line that summarises applying this event.
    fn summary(&self) -> (LogCategory, String) {
        match self {
            Self::TransportConnected { session_id } => (
                LogCategory::Success,
                match session_id {
                    Some(id) => format!("Connected to server (session: {id})"),
                    None => "Connected to server".to_owned(),
                },
            ),
            Self::TransportDisconnected => (LogCategory::Error, "Connection lost".to_owned()),
            Self::TransportReconnected => {
                (LogCategory::Success, "Reconnected to server".to_owned())
            }
            Self::MonitoringStarted {
                target_id,
                interval_secs,
                message,
            } => (
                LogCategory::Success,
                with_message(
                    format!("Monitoring started: bus {target_id} every {interval_secs}s"),
                    message.as_deref(),
                ),
            ),
            Self::MonitoringStopped { message } => (
                LogCategory::Info,
                with_message("Monitoring stopped".to_owned(), message.as_deref()),
            ),
            Self::SessionStatus {
                active: true,
                target_id,
                interval_secs,
            } => (
                LogCategory::Info,
                format!(
                    "Session status: active (bus {}, every {}s)",
                    target_id.as_deref().unwrap_or(UNKNOWN),
                    interval_secs.unwrap_or(0)
                ),
            ),
            Self::SessionStatus { active: false, .. } => {
                (LogCategory::Info, "Session status: inactive".to_owned())
            }
            Self::DomainError { reason } => (LogCategory::Error, format!("Server error: {reason}")),
        }
    }
}

fn with_message(base: String, message: Option<&str>) -> String {
    match message {
        Some(m) if !m.is_empty() => format!("{base} - {m}"),
        _ => base,
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&SessionState);

/// Whether `event` is expected while in `state`.
pub type AcceptsFn = fn(&SessionState, &SessionEvent) -> bool;

/// Static descriptor for one session state (one row in the table).
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub accepts: AcceptsFn,
}

// ---------------------------------------------------------------------------
// Transition record
// ---------------------------------------------------------------------------

/// Outcome of [`SessionMachine::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: SessionState,
    pub to: SessionState,
    /// Exactly one summary line per applied event.
    pub summary: (LogCategory, String),
    /// Set when the event was unexpected for `from`.
    pub inconsistency: Option<ProtocolInconsistency>,
}

impl Transition {
    /// Log lines to append, in order: the summary, then any inconsistency.
    pub fn notes(&self) -> Vec<(LogCategory, String)> {
        let mut notes = vec![self.summary.clone()];
        if let Some(note) = &self.inconsistency {
            notes.push((LogCategory::Error, format!("⚠️ {note}")));
        }
        notes
    }

    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Owns the state table and the one [`SessionState`] value.
pub struct SessionMachine {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    state: SessionState,
    /// Number of events applied so far.
    applied: u64,
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMachine {
    /// A machine in `Disconnected`, using the standard state table.
    pub fn new() -> Self {
        Self::with_table(states::build_state_table())
    }

    pub fn with_table(table: [StateDescriptor; StateId::COUNT]) -> Self {
        Self {
            table,
            state: SessionState::Disconnected,
            applied: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Table name of the current state.
    pub fn state_name(&self) -> &'static str {
        self.table[self.state.id() as usize].name
    }

    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// Apply one authoritative event.
    ///
    /// 1. Ask the current state whether the event was expected.
    /// 2. Move to `event.target_state()` unconditionally.
    /// 3. Run `on_exit`/`on_enter` when the state kind changes.
    pub fn apply(&mut self, event: &SessionEvent) -> Transition {
        let from_idx = self.state.id() as usize;
        let row = &self.table[from_idx];

        let inconsistency = if (row.accepts)(&self.state, event) {
            None
        } else {
            let note = ProtocolInconsistency {
                believed: row.name,
                event: event.label(),
            };
            warn!("Session: {}", note);
            Some(note)
        };

        let next = event.target_state();
        let next_idx = next.id() as usize;

        if next_idx != from_idx {
            info!(
                "Session transition: {} -> {}",
                self.table[from_idx].name, self.table[next_idx].name
            );
            if let Some(exit) = self.table[from_idx].on_exit {
                exit(&self.state);
            }
        }

        let from = core::mem::replace(&mut self.state, next);
        self.applied += 1;

        if next_idx != from_idx {
            if let Some(enter) = self.table[next_idx].on_enter {
                enter(&self.state);
            }
        }

        Transition {
            from,
            to: self.state.clone(),
            summary: event.summary(),
            inconsistency,
        }
    }
}
