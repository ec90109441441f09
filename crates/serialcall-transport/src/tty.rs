use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::stream::{PortConfig, StreamTransport, Timeouts};

/// A character device (e.g. `/dev/ttyACM0`) opened for reading and writing.
///
/// Line settings such as baud rate must already be configured on the device;
/// this type only moves bytes. Timeouts are enforced with `poll(2)` before
/// each read or write, since plain file descriptors have no socket-style
/// timeout options.
pub struct TtyPort {
    file: File,
    path: PathBuf,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
}

impl TtyPort {
    /// Open a device path without making it the controlling terminal.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(&path)
            .map_err(|source| TransportError::Open {
                path: path.clone(),
                source,
            })?;
        debug!(?path, "opened tty device");

        Ok(Self {
            file,
            path,
            read_timeout: None,
            write_timeout: None,
        })
    }

    /// Open a device path and wrap it as a transport with `config` applied.
    pub fn open_transport(
        path: impl AsRef<Path>,
        config: PortConfig,
    ) -> Result<StreamTransport<Self>> {
        StreamTransport::with_config(Self::open(path)?, config)
    }

    /// The device path this port was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn wait_ready(&self, events: libc::c_short, timeout: Option<Duration>) -> std::io::Result<()> {
        let Some(timeout) = timeout else {
            return Ok(());
        };

        let millis = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);
        let mut fds = libc::pollfd {
            fd: self.file.as_raw_fd(),
            events,
            revents: 0,
        };

        // SAFETY: `fds` is a single valid, writable pollfd and the count is 1.
        let rc = unsafe { libc::poll(&mut fds, 1, millis) };
        match rc {
            0 => Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "tty not ready before timeout",
            )),
            rc if rc < 0 => Err(std::io::Error::last_os_error()),
            _ => Ok(()),
        }
    }
}

impl Read for TtyPort {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.wait_ready(libc::POLLIN, self.read_timeout)?;
        self.file.read(buf)
    }
}

impl Write for TtyPort {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.wait_ready(libc::POLLOUT, self.write_timeout)?;
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

impl Timeouts for TtyPort {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> std::io::Result<()> {
        self.read_timeout = timeout;
        Ok(())
    }

    fn set_write_timeout(&mut self, timeout: Option<Duration>) -> std::io::Result<()> {
        self.write_timeout = timeout;
        Ok(())
    }
}

impl std::fmt::Debug for TtyPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtyPort")
            .field("path", &self.path)
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}
