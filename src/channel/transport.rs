//! Channel adapter helpers.
//!
//! The transport itself (connect, reconnect, retries) lives outside the
//! client core; the core only needs somewhere to put outbound messages.

use log::debug;

use crate::app::ports::{ChannelError, ChannelPort};

use super::codec;
use super::messages::OutboundMessage;

/// A channel that discards every message.
/// Useful as a default when no server is attached.
#[derive(Debug, Default)]
pub struct NullChannel {
    discarded: usize,
}

impl NullChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages swallowed so far.
    pub fn discarded(&self) -> usize {
        self.discarded
    }
}

impl ChannelPort for NullChannel {
    fn emit(&mut self, msg: &OutboundMessage) -> Result<(), ChannelError> {
        debug!("null channel: dropping {}", codec::encode(msg));
        self.discarded += 1;
        Ok(())
    }
}
