//! Wire format for serialcall.
//!
//! Every request is a single packet:
//! - 1 byte command id
//! - the arguments, packed little-endian at the width of their format code
//! - 1 byte CRC-8 (poly `0x31`, init `0xFF`) over everything before it
//!
//! A reply is the raw little-endian return value, exactly as wide as the
//! command's return format, and absent for `void` commands. Replies carry
//! no checksum, so only outbound packets are protected.

pub mod codec;
pub mod crc8;
pub mod descriptor;
pub mod error;
pub mod format;
pub mod value;

pub use codec::{
    decode_reply, decode_value, encode_request, encode_request_vec, encode_value, parse_hex,
    to_hex,
};
pub use crc8::{crc8, CRC8_INIT, CRC8_POLY};
pub use descriptor::CommandDescriptor;
pub use error::{Result, WireError};
pub use format::{width_of, FormatCode, TypeFormatEntry, TYPE_TABLE};
pub use value::Value;
