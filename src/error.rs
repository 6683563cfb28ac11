//! Unified error types for the monitoring client.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! command dispatch in [`MonitorClient`](crate::app::service::MonitorClient)
//! uniform.  None of these are fatal: every variant leaves the session able
//! to attempt a fresh start or a status query.

use core::fmt;

use crate::app::ports::{ChannelError, ExportError, ProbeError};
use crate::validator::ValidationError;

// ---------------------------------------------------------------------------
// Top-level client error
// ---------------------------------------------------------------------------

/// Every fallible client operation funnels into this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Monitoring request failed local validation (nothing was sent).
    Validation(ValidationError),
    /// The transport is down or unavailable.
    Transport(TransportError),
    /// A user action is not legal in the current session state.
    Rejected(Rejection),
    /// The channel adapter refused an outbound message.
    Channel(ChannelError),
    /// The secondary probe collaborator failed.
    Probe(ProbeError),
    /// Writing the log export failed.
    Export(ExportError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "validation: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Rejected(e) => write!(f, "rejected: {e}"),
            Self::Channel(e) => write!(f, "channel: {e}"),
            Self::Probe(e) => write!(f, "probe: {e}"),
            Self::Export(e) => write!(f, "export: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<Rejection> for Error {
    fn from(e: Rejection) -> Self {
        Self::Rejected(e)
    }
}

impl From<ChannelError> for Error {
    fn from(e: ChannelError) -> Self {
        Self::Channel(e)
    }
}

impl From<ProbeError> for Error {
    fn from(e: ProbeError) -> Self {
        Self::Probe(e)
    }
}

impl From<ExportError> for Error {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Connection-level failures raised by local commands.  A transport that
/// drops mid-session arrives as an inbound event instead and lands the
/// machine in `Faulted` (see [`crate::fsm::CONNECTION_LOST`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// No transport has come up yet.
    NotConnected,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
        }
    }
}

// ---------------------------------------------------------------------------
// Local rejections
// ---------------------------------------------------------------------------

/// A user action refused locally because the session state forbids it.
/// The channel is never touched when one of these is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// "start" while monitoring is already active.
    AlreadyActive,
    /// "stop" while monitoring is not active.
    NotActive,
    /// Probe requested without an active session.
    ProbeNeedsActiveSession,
    /// Probe requested before the server assigned an identity token.
    ProbeNeedsIdentity,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyActive => write!(f, "monitoring is already active"),
            Self::NotActive => write!(f, "no active monitoring to stop"),
            Self::ProbeNeedsActiveSession => write!(f, "start monitoring before probing"),
            Self::ProbeNeedsIdentity => write!(f, "no session id assigned yet"),
        }
    }
}

// ---------------------------------------------------------------------------
// Protocol inconsistencies
// ---------------------------------------------------------------------------

/// An inbound event that is semantically odd for the current state.
///
/// Never raised as an `Err`: the authoritative event still wins and the
/// inconsistency is recorded in the log feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolInconsistency {
    /// Name of the state the client believed it was in.
    pub believed: &'static str,
    /// Short description of the offending event.
    pub event: String,
}

impl fmt::Display for ProtocolInconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unexpected {} while {}; trusting server",
            self.event, self.believed
        )
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Client-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
