//! Channel adapter contract: named messages, wire framing and the
//! bounded hand-off queue.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Channel stack                        │
//! │                                                          │
//! │  bytes ──▶ FrameDecoder ──▶ decode ──▶ InboundMessage    │
//! │                                            │             │
//! │                                       EventQueue         │
//! │                                            ▼             │
//! │                                      MonitorClient       │
//! │                                            │             │
//! │  ChannelPort ◀── encode ◀── OutboundMessage┘             │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod codec;
pub mod messages;
pub mod queue;
pub mod transport;
