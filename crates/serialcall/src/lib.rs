//! Call functions on a microcontroller over a serial link.
//!
//! Remote functions are declared with their C prototypes and a command id.
//! Calls are packed into `[id][little-endian args][crc8]` packets and the
//! raw little-endian return value is read back.
//!
//! # Crate Structure
//!
//! - [`transport`]: the byte link (streams, TTY devices, in-memory)
//! - [`wire`]: type table, CRC-8, values and the packet codec
//! - [`proto`]: C prototype parser and command registry
//! - [`device`]: device sessions, register access and typed helpers
//!
//! ```
//! use serialcall::device::{Device, RegisterMap};
//! use serialcall::transport::MemoryTransport;
//!
//! let mut device = Device::with_builtins(MemoryTransport::new(), RegisterMap::new()).unwrap();
//! device.pin_mode(13, serialcall::device::helpers::OUTPUT).unwrap();
//! assert_eq!(device.transport().last_sent(), Some(&[0x02, 0x0D, 0x01, 0xB6][..]));
//! ```

/// Re-export transport types.
pub mod transport {
    pub use serialcall_transport::*;
}

/// Re-export wire types.
pub mod wire {
    pub use serialcall_wire::*;
}

/// Re-export prototype and registry types.
pub mod proto {
    pub use serialcall_proto::*;
}

/// Re-export device session types.
pub mod device {
    pub use serialcall_device::*;
}
