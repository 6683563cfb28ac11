//! Outbound application events.
//!
//! The [`MonitorClient`](super::service::MonitorClient) pushes these
//! through the [`PresentationSink`](super::ports::PresentationSink) port.
//! Adapters on the other side decide what to do with them: print to a
//! terminal, forward to a UI, or just record them in tests.

use crate::fsm::{Controls, StatusKind};
use crate::log_feed::LogEntry;

use super::ports::ProbeResponse;

/// Structured events emitted by the client core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Status line derived from the current session state (or from the
    /// latest arrival update while active).
    Status { kind: StatusKind, text: String },

    /// A new log-feed entry.
    Log(LogEntry),

    /// Control enablement changed.
    Controls(Controls),

    /// Raw probe response, passed through untouched.
    ProbeResult(ProbeResponse),
}
