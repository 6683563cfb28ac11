//! Console channel adapter.
//!
//! Writes each outbound message as one encoded frame line to any
//! `io::Write`.  Used by the replay binary in place of a live socket, and
//! in tests to capture exactly what would go on the wire.

use std::io::Write;

use log::debug;

use crate::app::ports::{ChannelError, ChannelPort};
use crate::channel::codec;
use crate::channel::messages::OutboundMessage;

pub struct ConsoleChannel<W: Write> {
    out: W,
    sent: u32,
}

impl<W: Write> ConsoleChannel<W> {
    pub fn new(out: W) -> Self {
        Self { out, sent: 0 }
    }

    /// Frames written so far.
    pub fn sent(&self) -> u32 {
        self.sent
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ChannelPort for ConsoleChannel<W> {
    fn emit(&mut self, msg: &OutboundMessage) -> Result<(), ChannelError> {
        let frame = codec::encode(msg);
        writeln!(self.out, "{frame}").map_err(|e| ChannelError::SendFailed(e.to_string()))?;
        self.out
            .flush()
            .map_err(|e| ChannelError::SendFailed(e.to_string()))?;
        self.sent += 1;
        debug!("channel: -> {}", frame);
        Ok(())
    }
}
