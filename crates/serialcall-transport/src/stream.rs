use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// Default read timeout for a reply: 500 ms.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(500);

const READ_CHUNK_SIZE: usize = 64;

/// Configuration for a stream-backed transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortConfig {
    /// Read timeout for a reply. `None` blocks until the bytes arrive.
    pub read_timeout: Option<Duration>,
    /// Write timeout for a request.
    pub write_timeout: Option<Duration>,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
            write_timeout: None,
        }
    }
}

/// Streams whose blocking reads and writes can be bounded by a timeout.
pub trait Timeouts {
    /// Set the read timeout on the underlying stream.
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> std::io::Result<()>;

    /// Set the write timeout on the underlying stream.
    fn set_write_timeout(&mut self, timeout: Option<Duration>) -> std::io::Result<()>;
}

impl Timeouts for std::net::TcpStream {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> std::io::Result<()> {
        std::net::TcpStream::set_read_timeout(self, timeout)
    }

    fn set_write_timeout(&mut self, timeout: Option<Duration>) -> std::io::Result<()> {
        std::net::TcpStream::set_write_timeout(self, timeout)
    }
}

#[cfg(unix)]
impl Timeouts for std::os::unix::net::UnixStream {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> std::io::Result<()> {
        std::os::unix::net::UnixStream::set_read_timeout(self, timeout)
    }

    fn set_write_timeout(&mut self, timeout: Option<Duration>) -> std::io::Result<()> {
        std::os::unix::net::UnixStream::set_write_timeout(self, timeout)
    }
}

/// Adapts any `Read + Write` stream to [`Transport`].
///
/// Handles partial writes and reads internally. A read that times out
/// (`WouldBlock` / `TimedOut`) or hits EOF ends the receive early and the
/// bytes gathered so far are returned.
pub struct StreamTransport<S> {
    inner: Option<S>,
    config: PortConfig,
}

impl<S: Read + Write> StreamTransport<S> {
    /// Wrap a stream as-is. Whatever timeouts the stream already has apply.
    pub fn new(inner: S) -> Self {
        Self {
            inner: Some(inner),
            config: PortConfig {
                read_timeout: None,
                write_timeout: None,
            },
        }
    }

    /// Wrap a stream and apply the timeouts from `config` to it.
    pub fn with_config(mut inner: S, config: PortConfig) -> Result<Self>
    where
        S: Timeouts,
    {
        inner.set_read_timeout(config.read_timeout)?;
        inner.set_write_timeout(config.write_timeout)?;
        Ok(Self {
            inner: Some(inner),
            config,
        })
    }

    /// Close the transport, handing back the stream if it was still open.
    pub fn close(&mut self) -> Option<S> {
        let inner = self.inner.take();
        if inner.is_some() {
            debug!("stream transport closed");
        }
        inner
    }

    /// Borrow the underlying stream, if open.
    pub fn get_ref(&self) -> Option<&S> {
        self.inner.as_ref()
    }

    /// Mutably borrow the underlying stream, if open.
    pub fn get_mut(&mut self) -> Option<&mut S> {
        self.inner.as_mut()
    }

    /// Consume the transport and return the inner stream, if open.
    pub fn into_inner(self) -> Option<S> {
        self.inner
    }

    /// Current transport configuration.
    pub fn config(&self) -> &PortConfig {
        &self.config
    }

    fn stream(&mut self) -> Result<&mut S> {
        self.inner.as_mut().ok_or(TransportError::Closed)
    }
}

impl<S: Read + Write> Transport for StreamTransport<S> {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        let stream = self.stream()?;
        trace!(len = bytes.len(), packet = ?bytes, "sending packet");

        let mut offset = 0usize;
        while offset < bytes.len() {
            match stream.write(&bytes[offset..]) {
                Ok(0) => {
                    return Err(TransportError::WriteZero {
                        pending: bytes.len() - offset,
                    })
                }
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }

        loop {
            match stream.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    fn receive(&mut self, n: usize) -> Result<Bytes> {
        let stream = self.stream()?;
        let mut buf = BytesMut::with_capacity(n);
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        while buf.len() < n {
            let want = (n - buf.len()).min(READ_CHUNK_SIZE);
            match stream.read(&mut chunk[..want]) {
                Ok(0) => {
                    debug!(expected = n, received = buf.len(), "stream reached EOF");
                    break;
                }
                Ok(read) => buf.extend_from_slice(&chunk[..read]),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    debug!(expected = n, received = buf.len(), "reply read timed out");
                    break;
                }
                Err(err) => return Err(TransportError::Io(err)),
            }
        }

        trace!(len = buf.len(), reply = ?&buf[..], "received reply");
        Ok(buf.freeze())
    }

    fn is_open(&self) -> bool {
        self.inner.is_some()
    }
}

impl<S> std::fmt::Debug for StreamTransport<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamTransport")
            .field("open", &self.inner.is_some())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    /// Duplex test stream: reads come from `input`, writes land in `output`.
    struct Duplex {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
        max_write: usize,
    }

    impl Duplex {
        fn new(input: &[u8]) -> Self {
            Self {
                input: Cursor::new(input.to_vec()),
                output: Vec::new(),
                max_write: usize::MAX,
            }
        }
    }

    impl Read for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            // One byte at a time to exercise the accumulation loop.
            let one = buf.len().min(1);
            self.input.read(&mut buf[..one])
        }
    }

    impl Write for Duplex {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let n = buf.len().min(self.max_write);
            self.output.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct TimesOut;

    impl Read for TimesOut {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(ErrorKind::WouldBlock, "timed out"))
        }
    }

    impl Write for TimesOut {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn send_handles_partial_writes() {
        let mut duplex = Duplex::new(&[]);
        duplex.max_write = 1;
        let mut transport = StreamTransport::new(duplex);

        transport.send(&[6, 0, 0x5A]).unwrap();

        let inner = transport.into_inner().unwrap();
        assert_eq!(inner.output, vec![6, 0, 0x5A]);
    }

    #[test]
    fn receive_accumulates_partial_reads() {
        let mut transport = StreamTransport::new(Duplex::new(&[0x34, 0x01, 0xFF]));

        let reply = transport.receive(2).unwrap();

        assert_eq!(reply.as_ref(), &[0x34, 0x01]);
    }

    #[test]
    fn receive_returns_short_on_eof() {
        let mut transport = StreamTransport::new(Duplex::new(&[0x34]));

        let reply = transport.receive(4).unwrap();

        assert_eq!(reply.as_ref(), &[0x34]);
    }

    #[test]
    fn receive_returns_short_on_timeout() {
        let mut transport = StreamTransport::new(TimesOut);
        assert!(transport.receive(1).unwrap().is_empty());
    }

    #[test]
    fn zero_length_write_is_an_error() {
        let mut transport = StreamTransport::new(TimesOut);
        let err = transport.send(&[1, 2]).unwrap_err();
        assert!(matches!(err, TransportError::WriteZero { pending: 2 }));
    }

    #[test]
    fn closed_transport_rejects_traffic() {
        let mut transport = StreamTransport::new(Duplex::new(&[1]));
        assert!(transport.is_open());

        assert!(transport.close().is_some());

        assert!(!transport.is_open());
        assert!(matches!(transport.send(&[1]), Err(TransportError::Closed)));
        assert!(matches!(transport.receive(1), Err(TransportError::Closed)));
        assert!(transport.close().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn with_config_applies_socket_timeouts() {
        let (client, mut server) = std::os::unix::net::UnixStream::pair().unwrap();
        let config = PortConfig {
            read_timeout: Some(Duration::from_millis(20)),
            write_timeout: None,
        };
        let mut transport = StreamTransport::with_config(client, config).unwrap();

        // Nothing written by the peer: the read must time out, not hang.
        assert!(transport.receive(1).unwrap().is_empty());

        server.write_all(&[0x42]).unwrap();
        assert_eq!(transport.receive(1).unwrap().as_ref(), &[0x42]);
    }
}
