//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter           | Implements        | Connects to                  |
//! |-------------------|-------------------|------------------------------|
//! | `console_channel` | ChannelPort       | Any `io::Write` (stdout)     |
//! | `export_fs`       | ExportPort        | Local directory              |
//! | `log_sink`        | PresentationSink  | `log` facade                 |
//! | `probe`           | ProbePort         | Canned JSON response         |
//!
//! The live transport is out of scope; [`NullChannel`] in
//! [`crate::channel::transport`] covers the headless case.
//!
//! [`NullChannel`]: crate::channel::transport::NullChannel

pub mod console_channel;
pub mod export_fs;
pub mod log_sink;
pub mod probe;
pub(super) mod utils;
