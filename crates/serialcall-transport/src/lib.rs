//! Byte-oriented transport abstraction for serialcall.
//!
//! The protocol engine only ever needs three things from a link: push a
//! complete request packet, pull up to `n` reply bytes (blocking, bounded by
//! a timeout), and report whether the link is still open. This crate defines
//! that contract as [`Transport`] and ships three implementations:
//! - [`StreamTransport`] over any `Read + Write` stream
//! - [`TtyPort`] for an already-configured character device (unix)
//! - [`MemoryTransport`], a scripted in-memory link for tests and offline use
//!
//! Opening, discovering and configuring serial hardware (baud rate, parity)
//! is left to the caller.

pub mod error;
pub mod memory;
pub mod stream;
pub mod traits;

#[cfg(unix)]
pub mod tty;

pub use error::{Result, TransportError};
pub use memory::MemoryTransport;
pub use stream::{PortConfig, StreamTransport, Timeouts, DEFAULT_READ_TIMEOUT};
pub use traits::Transport;

#[cfg(unix)]
pub use tty::TtyPort;
