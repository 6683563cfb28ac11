//! Bounded hand-off queue between the transport side and the client task.
//!
//! Uses an `embassy-sync` channel over `NoopRawMutex`: everything runs on
//! one cooperative executor thread, so no cross-thread locking is needed.
//!
//! ```text
//! ┌──────────────┐   item   ┌──────────────┐
//! │  Transport   │─────────▶│ Client task  │
//! │  (producer)  │  bounded │ (consumer)   │
//! └──────────────┘          └──────────────┘
//! ```
//!
//! A full queue makes `send().await` park the producer until the client
//! has drained an item, so inbound events are never dropped or reordered.

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;

/// Queue depth for inbound items.
pub const EVENT_QUEUE_DEPTH: usize = 16;

/// Single-threaded bounded FIFO.
pub type EventQueue<T> = Channel<NoopRawMutex, T, EVENT_QUEUE_DEPTH>;

/// Create an empty queue.
pub fn event_queue<T>() -> EventQueue<T> {
    Channel::new()
}
