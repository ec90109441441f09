use bytes::Bytes;

use crate::error::Result;

/// A byte-oriented link to one remote device.
///
/// Replies carry no framing and no request id, so they are matched to the
/// most recent request purely by position. A transport must therefore never
/// be shared by two in-flight calls.
pub trait Transport {
    /// Write a complete packet and flush it.
    fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Read up to `n` bytes (blocking).
    ///
    /// Returns fewer than `n` bytes when the read timeout elapses or the
    /// stream reaches EOF first. Short replies are reported to the caller
    /// as-is; deciding whether they are an error is the codec's job.
    fn receive(&mut self, n: usize) -> Result<Bytes>;

    /// Whether the link can still carry traffic.
    fn is_open(&self) -> bool;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).send(bytes)
    }

    fn receive(&mut self, n: usize) -> Result<Bytes> {
        (**self).receive(n)
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).send(bytes)
    }

    fn receive(&mut self, n: usize) -> Result<Bytes> {
        (**self).receive(n)
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }
}
