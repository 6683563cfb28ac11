//! Inbound user commands.
//!
//! These represent actions requested by the observer (a UI, a script, a
//! test) that the [`MonitorClient`](super::service::MonitorClient)
//! validates, gates on the session state, and acts upon.

use crate::validator::RawRequest;

/// Commands that drive the client from the user side.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// Validate and forward a start request.
    StartMonitoring(RawRequest),

    /// Ask the server to stop the active session.
    StopMonitoring,

    /// Ask the server for the authoritative session status.
    QueryStatus,

    /// Clear the log feed.
    ClearLog,

    /// Write the log feed to a timestamped file.
    ExportLog,

    /// One-shot station probe, gated on an active session.
    Probe,

    /// Same probe without the session gate (diagnostics).
    ProbeDirect,

    /// Process is about to exit.
    Teardown,
}
