//! Named messages exchanged with the monitoring server.
//!
//! Inbound payloads are modelled as closed structs with explicit optional
//! fields, so an absent field is a handled case rather than an accident.
//! Field names follow the server handlers; the documented camelCase names
//! are accepted as aliases.

use serde::{Deserialize, Serialize};

use crate::validator::MonitoringRequest;

// ───────────────────────────────────────────────────────────────
// Outbound
// ───────────────────────────────────────────────────────────────

/// Wire payload for `start_bus_monitoring`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartPayload {
    pub lat: f64,
    pub lng: f64,
    pub bus_number: String,
    pub interval: u16,
}

/// Messages the client sends to the server.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    StartMonitoring(StartPayload),
    StopMonitoring,
    GetSessionStatus,
}

impl OutboundMessage {
    /// Build a start message from a validated request.
    pub fn start(req: &MonitoringRequest) -> Self {
        Self::StartMonitoring(StartPayload {
            lat: req.latitude(),
            lng: req.longitude(),
            bus_number: req.target_id().to_owned(),
            interval: req.interval_secs(),
        })
    }

    /// Event name on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartMonitoring(_) => "start_bus_monitoring",
            Self::StopMonitoring => "stop_bus_monitoring",
            Self::GetSessionStatus => "get_session_status",
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Inbound
// ───────────────────────────────────────────────────────────────

/// Payload of `connected`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConnectedPayload {
    #[serde(alias = "sessionId")]
    pub session_id: Option<String>,
    pub message: Option<String>,
}

/// Payload of `monitoring_started`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MonitoringStartedPayload {
    #[serde(rename = "bus_number", alias = "targetId")]
    pub target_id: Option<String>,
    #[serde(rename = "interval", alias = "intervalSeconds")]
    pub interval_secs: Option<u16>,
    pub message: Option<String>,
}

/// Payload of `monitoring_stopped`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MonitoringStoppedPayload {
    pub message: Option<String>,
}

/// Payload of `bus_update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BusUpdatePayload {
    #[serde(default, rename = "bus_found", alias = "found")]
    pub found: bool,
    #[serde(rename = "bus_number", alias = "targetId")]
    pub target_id: Option<String>,
    #[serde(rename = "arrival_time_formatted", alias = "etaFormatted")]
    pub eta_formatted: Option<String>,
    #[serde(rename = "remaining_stations", alias = "remainingStops")]
    pub remaining_stops: Option<u32>,
    pub urgency: Option<String>,
    #[serde(alias = "voiceMessage")]
    pub voice_message: Option<String>,
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Payload of `session_status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionStatusPayload {
    #[serde(default)]
    pub active: bool,
    #[serde(rename = "bus_number", alias = "targetId")]
    pub target_id: Option<String>,
    #[serde(rename = "interval", alias = "intervalSeconds")]
    pub interval_secs: Option<u16>,
}

/// Payload of `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorPayload {
    pub message: Option<String>,
}

/// Messages the server (or the transport itself) delivers to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    Connected(ConnectedPayload),
    Disconnected,
    Reconnected,
    MonitoringStarted(MonitoringStartedPayload),
    MonitoringStopped(MonitoringStoppedPayload),
    BusUpdate(BusUpdatePayload),
    SessionStatus(SessionStatusPayload),
    Error(ErrorPayload),
    /// An event name this client does not know.
    Unknown { name: String },
}

impl InboundMessage {
    /// Event name for logs.
    pub fn name(&self) -> &str {
        match self {
            Self::Connected(_) => "connected",
            Self::Disconnected => "disconnected",
            Self::Reconnected => "reconnect",
            Self::MonitoringStarted(_) => "monitoring_started",
            Self::MonitoringStopped(_) => "monitoring_stopped",
            Self::BusUpdate(_) => "bus_update",
            Self::SessionStatus(_) => "session_status",
            Self::Error(_) => "error",
            Self::Unknown { name } => name,
        }
    }
}
