//! Bounded, append-only audit feed.
//!
//! Backed by a fixed-capacity `heapless::Deque`: when the feed is full the
//! oldest entry is evicted before the new one is pushed (strict FIFO), so
//! `len() <= LOG_CAPACITY` holds after every operation.  Entries are never
//! mutated after creation and sequence numbers never repeat, even across
//! [`LogFeed::clear`].

use core::fmt;

use chrono::{DateTime, Local, Utc};
use heapless::Deque;
use serde::Serialize;

/// Maximum number of retained entries.
pub const LOG_CAPACITY: usize = 200;

/// Display category of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogCategory {
    Info,
    Success,
    Error,
    /// Domain traffic that is neither a session transition nor an error
    /// (probe calls and their results).
    Domain,
}

impl LogCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
            Self::Domain => "domain",
        }
    }
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable audit record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub sequence: u64,
    pub timestamp: DateTime<Local>,
    pub category: LogCategory,
    pub text: String,
}

impl fmt::Display for LogEntry {
    /// Export line format: `[2026-10-18 09:30:00] text`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%Y-%m-%d %H:%M:%S"), self.text)
    }
}

/// The feed itself.  Only [`append`](Self::append) and
/// [`clear`](Self::clear) mutate it.
pub struct LogFeed {
    entries: Deque<LogEntry, LOG_CAPACITY>,
    next_sequence: u64,
}

impl Default for LogFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl LogFeed {
    pub fn new() -> Self {
        Self {
            entries: Deque::new(),
            next_sequence: 1,
        }
    }

    /// Append an entry stamped with the current local time.
    pub fn append(&mut self, category: LogCategory, text: impl Into<String>) -> LogEntry {
        self.append_at(category, text, Local::now())
    }

    /// Append an entry with an explicit timestamp.
    pub fn append_at(
        &mut self,
        category: LogCategory,
        text: impl Into<String>,
        timestamp: DateTime<Local>,
    ) -> LogEntry {
        let entry = LogEntry {
            sequence: self.next_sequence,
            timestamp,
            category,
            text: text.into(),
        };
        self.next_sequence += 1;

        if self.entries.is_full() {
            self.entries.pop_front();
        }
        // Cannot fail: a slot was freed above if the deque was full.
        let _ = self.entries.push_back(entry.clone());
        entry
    }

    /// Drop every entry, then record the clear itself.
    pub fn clear(&mut self) -> LogEntry {
        self.entries.clear();
        self.append(LogCategory::Info, "Log cleared")
    }

    /// Ordered copy of the retained entries, oldest first.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Borrowing iterator over the retained entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Plain-text export body: one entry per line, in sequence order.
    pub fn render_export(&self) -> String {
        let mut out = String::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&entry.to_string());
        }
        out
    }
}

/// Timestamped export file name, e.g. `busz_test_logs_2026-10-18T09-30-00.txt`.
pub fn export_file_name(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{}{}.txt", prefix, now.format("%Y-%m-%dT%H-%M-%S"))
}
