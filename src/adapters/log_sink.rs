//! Log-based presentation sink.
//!
//! Implements [`PresentationSink`] by writing every rendered event to the
//! `log` facade, so a headless run shows the same stream a UI would.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::PresentationSink;
use crate::log_feed::LogCategory;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogPresentationSink;

impl LogPresentationSink {
    pub fn new() -> Self {
        Self
    }
}

impl PresentationSink for LogPresentationSink {
    fn render(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Status { kind, text } => {
                info!("STATUS | {} | {}", kind.as_str(), text);
            }
            AppEvent::Log(entry) => match entry.category {
                LogCategory::Error => {
                    warn!("LOG #{} | {} | {}", entry.sequence, entry.category, entry.text);
                }
                _ => info!("LOG #{} | {} | {}", entry.sequence, entry.category, entry.text),
            },
            AppEvent::Controls(c) => {
                info!(
                    "CONTROLS | start={} ({}) stop={} ({})",
                    if c.start_enabled { "on" } else { "off" },
                    c.start_label,
                    if c.stop_enabled { "on" } else { "off" },
                    c.stop_label,
                );
            }
            AppEvent::ProbeResult(r) => {
                info!("PROBE | {}", r.raw);
            }
        }
    }
}
