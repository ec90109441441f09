use bytes::{Buf, BufMut, BytesMut};

use crate::crc8::crc8;
use crate::descriptor::CommandDescriptor;
use crate::error::{Result, WireError};
use crate::format::FormatCode;
use crate::value::Value;

/// Append one value, little-endian, at the width of `format`.
///
/// Integers (and booleans, as 0/1) are range-checked against the target
/// width instead of being truncated. Floats are accepted only by the float
/// code; integers are converted when the target is the float code and
/// rejected if `f32` cannot hold them exactly.
pub fn encode_value(format: FormatCode, value: &Value, dst: &mut BytesMut) -> Result<()> {
    let out_of_range = || WireError::ValueOutOfRange {
        format,
        value: *value,
    };

    let Some((min, max)) = format.integer_range() else {
        let float = match *value {
            Value::Float(v) if v.is_finite() && v.abs() > f64::from(f32::MAX) => {
                return Err(out_of_range())
            }
            Value::Float(v) => v as f32,
            other => {
                let int = other.as_i128().ok_or_else(out_of_range)?;
                let float = int as f32;
                if float as i128 != int {
                    return Err(out_of_range());
                }
                float
            }
        };
        dst.put_f32_le(float);
        return Ok(());
    };

    let int = value.as_i128().ok_or_else(out_of_range)?;
    if int < min || int > max {
        return Err(out_of_range());
    }

    match format {
        FormatCode::U8 | FormatCode::Bool => dst.put_u8(int as u8),
        FormatCode::I8 => dst.put_i8(int as i8),
        FormatCode::U16 => dst.put_u16_le(int as u16),
        FormatCode::I16 => dst.put_i16_le(int as i16),
        FormatCode::U32 => dst.put_u32_le(int as u32),
        FormatCode::I32 => dst.put_i32_le(int as i32),
        FormatCode::U64 => dst.put_u64_le(int as u64),
        FormatCode::I64 => dst.put_i64_le(int as i64),
        FormatCode::F32 => return Err(out_of_range()),
    }
    Ok(())
}

/// Decode one little-endian value of `format` from the front of `src`.
///
/// Bytes beyond the format's width are ignored.
pub fn decode_value(format: FormatCode, src: &[u8]) -> Result<Value> {
    let width = format.width();
    if src.len() < width {
        return Err(WireError::TruncatedResponse {
            expected: width,
            actual: src.len(),
        });
    }

    let mut buf = &src[..width];
    let value = match format {
        FormatCode::U8 => Value::UInt(u64::from(buf.get_u8())),
        FormatCode::I8 => Value::Int(i64::from(buf.get_i8())),
        FormatCode::Bool => Value::Bool(buf.get_u8() != 0),
        FormatCode::U16 => Value::UInt(u64::from(buf.get_u16_le())),
        FormatCode::I16 => Value::Int(i64::from(buf.get_i16_le())),
        FormatCode::U32 => Value::UInt(u64::from(buf.get_u32_le())),
        FormatCode::I32 => Value::Int(i64::from(buf.get_i32_le())),
        FormatCode::U64 => Value::UInt(buf.get_u64_le()),
        FormatCode::I64 => Value::Int(buf.get_i64_le()),
        FormatCode::F32 => Value::Float(f64::from(buf.get_f32_le())),
    };
    Ok(value)
}

/// Encode a call into a request packet.
///
/// Wire format:
/// ```text
/// ┌────────────┬──────────────────────────────┬────────────┐
/// │ Id (1B)    │ Args (LE, per arg format)    │ CRC-8 (1B) │
/// └────────────┴──────────────────────────────┴────────────┘
/// ```
/// The checksum covers the id and argument bytes. On error nothing is
/// appended to `dst`.
pub fn encode_request(
    descriptor: &CommandDescriptor,
    args: &[Value],
    dst: &mut BytesMut,
) -> Result<()> {
    if args.len() != descriptor.arity() {
        return Err(WireError::ArityMismatch {
            command: descriptor.name().to_string(),
            expected: descriptor.arity(),
            actual: args.len(),
        });
    }

    let start = dst.len();
    dst.reserve(descriptor.request_len());
    dst.put_u8(descriptor.id());

    for (format, value) in descriptor.arg_formats().iter().zip(args) {
        if let Err(err) = encode_value(*format, value, dst) {
            dst.truncate(start);
            return Err(err);
        }
    }

    let checksum = crc8(&dst[start..]);
    dst.put_u8(checksum);
    Ok(())
}

/// Encode a call into a freshly allocated packet.
pub fn encode_request_vec(descriptor: &CommandDescriptor, args: &[Value]) -> Result<Vec<u8>> {
    let mut buf = BytesMut::with_capacity(descriptor.request_len());
    encode_request(descriptor, args, &mut buf)?;
    Ok(buf.to_vec())
}

/// Decode a reply for `descriptor`.
///
/// `void` commands consume nothing and yield `Ok(None)`. Otherwise exactly
/// the return format's width must be present; a shorter reply is a
/// [`WireError::TruncatedResponse`], never padded.
pub fn decode_reply(descriptor: &CommandDescriptor, src: &[u8]) -> Result<Option<Value>> {
    match descriptor.return_format() {
        None => Ok(None),
        Some(format) => decode_value(format, src).map(Some),
    }
}

/// Lowercase, space-separated hex, e.g. `02 0d 01 b6`.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse hex bytes written as `34 01`, `0x34,0x01` or `3401`.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let invalid = |token: &str| WireError::InvalidValue(format!("invalid hex byte string {token:?}"));
    let mut out = Vec::new();

    for token in text.split(|c: char| c.is_whitespace() || c == ',') {
        if token.is_empty() {
            continue;
        }
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        if digits.is_empty() || digits.len() % 2 != 0 || !digits.is_ascii() {
            return Err(invalid(token));
        }
        for pair in digits.as_bytes().chunks(2) {
            let pair = std::str::from_utf8(pair).map_err(|_| invalid(token))?;
            out.push(u8::from_str_radix(pair, 16).map_err(|_| invalid(token))?);
        }
    }

    Ok(out)
}
