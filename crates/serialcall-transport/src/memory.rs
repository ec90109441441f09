use bytes::{Buf, Bytes, BytesMut};

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// In-memory transport with scripted replies.
///
/// Every `send` is recorded as one packet. `receive` serves bytes queued with
/// [`push_reply`](Self::push_reply) and returns short, like a timed-out
/// serial read, when the queue runs dry.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    sent: Vec<Vec<u8>>,
    replies: BytesMut,
    closed: bool,
}

impl MemoryTransport {
    /// Create an open transport with no queued replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes to be served by subsequent receives.
    pub fn push_reply(&mut self, bytes: &[u8]) {
        self.replies.extend_from_slice(bytes);
    }

    /// Queue every remaining byte of `buf` as reply data.
    pub fn push_reply_buf(&mut self, mut buf: impl Buf) {
        while buf.has_remaining() {
            let chunk = buf.chunk();
            let len = chunk.len();
            self.replies.extend_from_slice(chunk);
            buf.advance(len);
        }
    }

    /// Packets sent so far, oldest first.
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// The most recently sent packet.
    pub fn last_sent(&self) -> Option<&[u8]> {
        self.sent.last().map(Vec::as_slice)
    }

    /// Drain and return the recorded packets.
    pub fn take_sent(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.sent)
    }

    /// Number of queued reply bytes not yet received.
    pub fn pending_reply_bytes(&self) -> usize {
        self.replies.len()
    }

    /// Close the link; further traffic fails with [`TransportError::Closed`].
    pub fn close(&mut self) {
        self.closed = true;
    }
}

impl Transport for MemoryTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.sent.push(bytes.to_vec());
        Ok(())
    }

    fn receive(&mut self, n: usize) -> Result<Bytes> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        let take = n.min(self.replies.len());
        Ok(self.replies.split_to(take).freeze())
    }

    fn is_open(&self) -> bool {
        !self.closed
    }
}

impl Extend<u8> for MemoryTransport {
    fn extend<I: IntoIterator<Item = u8>>(&mut self, iter: I) {
        self.replies.extend(iter);
    }
}
