use std::collections::VecDeque;

use tracing::debug;

use crate::error::{Ev3Error, Result};
use crate::proto::command::hex;

/// Byte transport to the brick. Implementations own any buffering or I/O;
/// the driver hands over one complete packet per call.
pub trait Connection {
    fn send(&mut self, packet: &[u8]) -> Result<()>;
    /// Block until one complete length-prefixed reply frame is available.
    fn receive(&mut self) -> Result<Vec<u8>>;
}

/// Connection that records every packet instead of transmitting it.
///
/// Queued replies are served in order by `receive`; with none queued it
/// answers `NoReply`.
#[derive(Debug, Default)]
pub struct ConnectionLogger {
    sent: VecDeque<Vec<u8>>,
    replies: VecDeque<Vec<u8>>,
}

impl ConnectionLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip `message_offset` recorded packets, then take the next one with its
    /// first `byte_offset` bytes removed. `None` when nothing was sent.
    #[cfg(test)]
    pub fn next_sent_message(&mut self, message_offset: usize, byte_offset: usize) -> Option<Vec<u8>> {
        for _ in 0..message_offset {
            self.sent.pop_front()?;
        }
        let msg = self.sent.pop_front()?;
        Some(msg.get(byte_offset..).map(<[u8]>::to_vec).unwrap_or_default())
    }

    #[cfg(test)]
    pub fn sent_count(&self) -> usize {
        self.sent.len()
    }

    pub fn drain(&mut self) -> Vec<Vec<u8>> {
        self.sent.drain(..).collect()
    }

    #[cfg(test)]
    pub fn push_reply(&mut self, frame: Vec<u8>) {
        self.replies.push_back(frame);
    }
}

impl Connection for ConnectionLogger {
    fn send(&mut self, packet: &[u8]) -> Result<()> {
        debug!(bytes = %hex(packet), "logged packet");
        self.sent.push_back(packet.to_vec());
        Ok(())
    }

    fn receive(&mut self) -> Result<Vec<u8>> {
        self.replies.pop_front().ok_or(Ev3Error::NoReply)
    }
}
