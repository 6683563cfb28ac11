//! Port traits: the hexagonal boundary between the session core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorClient (domain)
//! ```
//!
//! Driven adapters (channel, presentation, probe, export) implement these
//! traits.  The [`MonitorClient`](super::service::MonitorClient) consumes
//! them via generics, so the core never touches a socket or a file.
//! All port errors are typed; callers must handle every variant.

use core::fmt;

use serde_json::Value;

use crate::channel::messages::OutboundMessage;
use crate::classifier::UNKNOWN;

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Channel port (driven adapter: domain → server)
// ───────────────────────────────────────────────────────────────

/// Outbound half of the event channel.  Sends are fire-and-forget: a
/// successful `emit` only means the message left, never that the server
/// acted on it.
pub trait ChannelPort {
    fn emit(&mut self, msg: &OutboundMessage) -> Result<(), ChannelError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The transport is not up.
    NotConnected,
    /// The adapter failed to hand the message to the transport.
    SendFailed(String),
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "channel not connected"),
            Self::SendFailed(why) => write!(f, "send failed: {why}"),
        }
    }
}

impl std::error::Error for ChannelError {}

// ───────────────────────────────────────────────────────────────
// Presentation sink (driven adapter: domain → observer)
// ───────────────────────────────────────────────────────────────

/// Push-only observer.  The core never queries it.
pub trait PresentationSink {
    fn render(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Probe port (driven adapter: domain → one-shot station query)
// ───────────────────────────────────────────────────────────────

/// Secondary one-shot lookup, keyed by the session identity token.
pub trait ProbePort {
    fn probe(&mut self, identity: Option<&str>) -> Result<ProbeResponse, ProbeError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The collaborator could not be reached.
    Unavailable(String),
    /// The collaborator answered with something that is not a JSON object.
    BadResponse,
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(why) => write!(f, "probe unavailable: {why}"),
            Self::BadResponse => write!(f, "probe returned a malformed response"),
        }
    }
}

impl std::error::Error for ProbeError {}

/// Probe response, carried through to the sink without interpretation.
/// The accessors only exist so the core can write one log line.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResponse {
    pub raw: Value,
}

impl ProbeResponse {
    pub fn from_json(text: &str) -> Result<Self, ProbeError> {
        let raw: Value = serde_json::from_str(text).map_err(|_| ProbeError::BadResponse)?;
        if raw.is_object() {
            Ok(Self { raw })
        } else {
            Err(ProbeError::BadResponse)
        }
    }

    pub fn success(&self) -> bool {
        self.raw.get("success").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn total_count(&self) -> Option<u64> {
        self.raw
            .get("total_count")
            .or_else(|| self.raw.get("totalCount"))
            .and_then(Value::as_u64)
    }

    pub fn items(&self) -> Option<&Vec<Value>> {
        self.raw
            .get("buses")
            .or_else(|| self.raw.get("items"))
            .and_then(Value::as_array)
    }

    pub fn error_code(&self) -> Option<&str> {
        self.raw
            .get("error_code")
            .or_else(|| self.raw.get("errorCode"))
            .and_then(Value::as_str)
    }

    pub fn error(&self) -> Option<&str> {
        self.raw.get("error").and_then(Value::as_str)
    }

    /// `route (Ns), route (Ns), ...` over the received buses, or `None`
    /// when the list is absent or empty.
    pub fn arrivals_listing(&self) -> Option<String> {
        let items = self.items().filter(|v| !v.is_empty())?;
        let listing = items
            .iter()
            .map(|bus| {
                let route = field_text(bus, &["route_name", "routeName", "bus_number"])
                    .unwrap_or_else(|| UNKNOWN.to_owned());
                let eta = field_text(bus, &["arrival_time", "arrivalTime"])
                    .map_or_else(|| UNKNOWN.to_owned(), |secs| format!("{secs}s"));
                format!("{route} ({eta})")
            })
            .collect::<Vec<_>>()
            .join(", ");
        Some(listing)
    }
}

/// First present, non-null key rendered as text (strings unquoted).
fn field_text(item: &Value, keys: &[&str]) -> Option<String> {
    match keys.iter().find_map(|k| item.get(*k))? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ───────────────────────────────────────────────────────────────
// Export port (driven adapter: domain → file system / download)
// ───────────────────────────────────────────────────────────────

/// Receives the rendered log export under its timestamped file name.
pub trait ExportPort {
    fn write_export(&mut self, file_name: &str, contents: &str) -> Result<(), ExportError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    Io(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(why) => write!(f, "export failed: {why}"),
        }
    }
}

impl std::error::Error for ExportError {}
