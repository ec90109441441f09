//! Device sessions for serialcall.
//!
//! A [`Device`] binds one transport to one session's command registry and
//! register map. Names are resolved commands first, then registers:
//! - calling a command sends its request packet and decodes the reply
//! - reading a register sends `getByte(addr)`
//! - writing a register sends `setByte(addr, value)`
//!
//! [`SharedDevice`] wraps a session in a mutex for multi-threaded callers.

pub mod config;
pub mod device;
pub mod error;
pub mod helpers;
pub mod registers;
pub mod shared;

pub use config::DeviceConfig;
pub use device::{Attribute, Device, Resolution};
pub use error::{DeviceError, Result};
pub use registers::{RegisterMap, IO_SPACE_OFFSET};
pub use shared::SharedDevice;
