//! Event-frame codec.
//!
//! Wire format (one frame per line):
//! ```text
//! ┌──────────────────┬──────────────────────────────────────┐
//! │ packet type (opt)│ JSON event array                     │
//! │ ASCII digits     │ ["event_name", {payload}]            │
//! └──────────────────┴──────────────────────────────────────┘
//! ```
//!
//! [`FrameDecoder`] accumulates incoming bytes and yields complete
//! newline-terminated frames.  This handles partial reads gracefully: a
//! single read may return part of a frame or several frames at once.

use core::fmt;

use heapless::Vec;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::messages::{InboundMessage, OutboundMessage};

/// Maximum frame size (protects against memory exhaustion).
pub const MAX_FRAME_SIZE: usize = 4096;

// ───────────────────────────────────────────────────────────────
// Encoding
// ───────────────────────────────────────────────────────────────

/// Encode an outbound message as a JSON event array (no trailing newline).
pub fn encode(msg: &OutboundMessage) -> String {
    let frame = match msg {
        OutboundMessage::StartMonitoring(payload) => {
            let payload = serde_json::to_value(payload).unwrap_or(Value::Null);
            Value::Array(vec![Value::from(msg.name()), payload])
        }
        OutboundMessage::StopMonitoring | OutboundMessage::GetSessionStatus => {
            Value::Array(vec![Value::from(msg.name())])
        }
    };
    frame.to_string()
}

// ───────────────────────────────────────────────────────────────
// Decoding
// ───────────────────────────────────────────────────────────────

/// Why an inbound frame could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Frame bytes are not UTF-8.
    NotUtf8,
    /// Frame body is not valid JSON.
    NotJson,
    /// JSON is valid but not `["name", payload?]`.
    NotAnEvent,
    /// Known event whose payload does not match its schema.
    BadPayload(&'static str),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotUtf8 => write!(f, "frame is not UTF-8"),
            Self::NotJson => write!(f, "frame is not JSON"),
            Self::NotAnEvent => write!(f, "frame is not an event array"),
            Self::BadPayload(event) => write!(f, "malformed {} payload", event),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Decode raw frame bytes.
pub fn decode_bytes(frame: &[u8]) -> Result<InboundMessage, DecodeError> {
    let text = core::str::from_utf8(frame).map_err(|_| DecodeError::NotUtf8)?;
    decode(text)
}

/// Decode one inbound frame.
pub fn decode(frame: &str) -> Result<InboundMessage, DecodeError> {
    let body = frame
        .trim()
        .trim_start_matches(|c: char| c.is_ascii_digit());
    let value: Value = serde_json::from_str(body).map_err(|_| DecodeError::NotJson)?;

    let Value::Array(mut parts) = value else {
        return Err(DecodeError::NotAnEvent);
    };
    if parts.is_empty() || parts.len() > 2 {
        return Err(DecodeError::NotAnEvent);
    }
    let payload = if parts.len() == 2 {
        parts.pop().unwrap_or(Value::Null)
    } else {
        Value::Null
    };
    let Value::String(name) = parts.swap_remove(0) else {
        return Err(DecodeError::NotAnEvent);
    };

    let msg = match name.as_str() {
        "connect" | "connected" => InboundMessage::Connected(payload_as(payload, "connected")?),
        "disconnect" | "disconnected" => InboundMessage::Disconnected,
        "reconnect" | "reconnected" => InboundMessage::Reconnected,
        "monitoring_started" => {
            InboundMessage::MonitoringStarted(payload_as(payload, "monitoring_started")?)
        }
        "monitoring_stopped" => {
            InboundMessage::MonitoringStopped(payload_as(payload, "monitoring_stopped")?)
        }
        "bus_update" => InboundMessage::BusUpdate(payload_as(payload, "bus_update")?),
        "session_status" => InboundMessage::SessionStatus(payload_as(payload, "session_status")?),
        "error" => InboundMessage::Error(payload_as(payload, "error")?),
        _ => InboundMessage::Unknown { name },
    };
    Ok(msg)
}

/// Deserialize a payload, treating a missing payload as `{}`.
fn payload_as<T: DeserializeOwned>(
    payload: Value,
    event: &'static str,
) -> Result<T, DecodeError> {
    let payload = match payload {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    serde_json::from_value(payload).map_err(|_| DecodeError::BadPayload(event))
}

// ───────────────────────────────────────────────────────────────
// Streaming line framer
// ───────────────────────────────────────────────────────────────

/// Framer state.
enum FramerState {
    /// Collecting bytes of the current line.
    Collecting,
    /// Current line overflowed; drop bytes until the next newline.
    Discarding,
}

/// Streaming newline-delimited frame splitter with a bounded line buffer.
pub struct FrameDecoder {
    state: FramerState,
    line: Vec<u8, MAX_FRAME_SIZE>,
    dropped: u32,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            state: FramerState::Collecting,
            line: Vec::new(),
            dropped: 0,
        }
    }

    /// Feed bytes into the decoder, calling `on_frame` for every complete,
    /// non-empty line.  Oversized lines are dropped whole.
    pub fn feed(&mut self, data: &[u8], mut on_frame: impl FnMut(&[u8])) {
        for &byte in data {
            match self.state {
                FramerState::Collecting => {
                    if byte == b'\n' {
                        let line = trim_cr(&self.line);
                        if !line.is_empty() {
                            on_frame(line);
                        }
                        self.line.clear();
                    } else if self.line.push(byte).is_err() {
                        // Oversized frame, drop it.
                        self.line.clear();
                        self.dropped += 1;
                        self.state = FramerState::Discarding;
                    }
                }
                FramerState::Discarding => {
                    if byte == b'\n' {
                        self.state = FramerState::Collecting;
                    }
                }
            }
        }
    }

    /// Flush a final unterminated line, if any.
    pub fn finish(&mut self, mut on_frame: impl FnMut(&[u8])) {
        if let FramerState::Collecting = self.state {
            let line = trim_cr(&self.line);
            if !line.is_empty() {
                on_frame(line);
            }
        }
        self.reset();
    }

    /// Reset decoder state (e.g. after a transport reconnect).
    pub fn reset(&mut self) {
        self.state = FramerState::Collecting;
        self.line.clear();
    }

    /// Number of oversized frames dropped so far.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

fn trim_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}
