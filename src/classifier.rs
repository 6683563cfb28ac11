//! Arrival-update classification.
//!
//! Turns a `bus_update` into a display category, an urgency rank and a
//! deterministic one-line summary.  Absent optional fields render as
//! [`UNKNOWN`] so summaries stay diff-stable.

use core::fmt;

use crate::channel::messages::BusUpdatePayload;
use crate::log_feed::LogCategory;

/// Placeholder for a field the server did not send.
pub const UNKNOWN: &str = "unknown";

/// Urgency of a found vehicle.  Ordered least → most urgent so that
/// `Urgency::Urgent > Urgency::Moderate` holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Urgency {
    Unspecified,
    Normal,
    Moderate,
    Urgent,
}

impl Urgency {
    /// Parse the server's urgency tag; anything unrecognised is lowest.
    pub fn from_wire(tag: Option<&str>) -> Self {
        match tag {
            Some("urgent") => Self::Urgent,
            Some("moderate") => Self::Moderate,
            Some("normal") => Self::Normal,
            _ => Self::Unspecified,
        }
    }

    /// Salience indicator shown in front of the summary.
    pub fn indicator(self) -> &'static str {
        match self {
            Self::Urgent => "🚨",
            Self::Moderate => "⚠️",
            Self::Normal => "⏰",
            Self::Unspecified => "🚌",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Urgent => "urgent",
            Self::Moderate => "moderate",
            Self::Normal => "normal",
            Self::Unspecified => "unspecified",
        };
        f.write_str(s)
    }
}

/// Inbound domain event, transient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    Found {
        target_id: Option<String>,
        eta_formatted: Option<String>,
        remaining_stops: Option<u32>,
        urgency: Option<String>,
        voice_message: Option<String>,
    },
    NotFound {
        message: Option<String>,
    },
    DomainError {
        message: Option<String>,
    },
}

impl From<BusUpdatePayload> for DomainEvent {
    fn from(p: BusUpdatePayload) -> Self {
        if p.found {
            Self::Found {
                target_id: p.target_id,
                eta_formatted: p.eta_formatted,
                remaining_stops: p.remaining_stops,
                urgency: p.urgency,
                voice_message: p.voice_message,
            }
        } else if p.error.is_some() {
            Self::DomainError { message: p.error }
        } else {
            Self::NotFound { message: p.message }
        }
    }
}

/// Result of [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: LogCategory,
    /// Full line for the log feed.
    pub summary: String,
    /// Shorter line for the status display.
    pub status_text: String,
    /// Only set for `Found`.
    pub urgency: Option<Urgency>,
}

impl Classification {
    /// Whether the update reported a vehicle.
    pub fn is_found(&self) -> bool {
        self.urgency.is_some()
    }
}

/// Classify a domain event.
pub fn classify(event: &DomainEvent) -> Classification {
    match event {
        DomainEvent::Found {
            target_id,
            eta_formatted,
            remaining_stops,
            urgency,
            voice_message,
        } => {
            let urgency = Urgency::from_wire(urgency.as_deref());
            let stops = remaining_stops.map_or_else(|| UNKNOWN.to_owned(), |n| n.to_string());
            let status_text = format!(
                "{} Bus {}: {} ({} stops left)",
                urgency.indicator(),
                or_unknown(target_id.as_deref()),
                or_unknown(eta_formatted.as_deref()),
                stops,
            );
            let summary = format!("{} - {}", status_text, or_unknown(voice_message.as_deref()));
            Classification {
                category: LogCategory::Success,
                summary,
                status_text,
                urgency: Some(urgency),
            }
        }
        DomainEvent::NotFound { message } | DomainEvent::DomainError { message } => {
            let text = format!("❌ {}", or_unknown(message.as_deref()));
            Classification {
                category: LogCategory::Error,
                summary: text.clone(),
                status_text: text,
                urgency: None,
            }
        }
    }
}

fn or_unknown(field: Option<&str>) -> &str {
    field.unwrap_or(UNKNOWN)
}
