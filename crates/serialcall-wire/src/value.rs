use std::fmt;
use std::str::FromStr;

use crate::error::WireError;

/// A dynamically typed argument or return value.
///
/// Arguments are checked against their target format when encoded, so a
/// caller can pass `Value::UInt(13)` for a `uint8_t` parameter or
/// `Value::Int(-1)` for an `int`. Decoded replies use the variant that
/// matches the return format's signedness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl Value {
    /// The value as a signed integer, if it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Bool(b) => Some(i64::from(b)),
            Self::Int(v) => Some(v),
            Self::UInt(v) => i64::try_from(v).ok(),
            Self::Float(_) => None,
        }
    }

    /// The value as an unsigned integer, if it is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::Bool(b) => Some(u64::from(b)),
            Self::Int(v) => u64::try_from(v).ok(),
            Self::UInt(v) => Some(v),
            Self::Float(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Widen an integer value for range checks.
    pub(crate) fn as_i128(&self) -> Option<i128> {
        match *self {
            Self::Bool(b) => Some(i128::from(b)),
            Self::Int(v) => Some(i128::from(v)),
            Self::UInt(v) => Some(i128::from(v)),
            Self::Float(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

/// Parses `true`/`false`, decimal and `0x` hex integers (optionally
/// negative), and decimal floats such as `1.5`, `.5`, `-2.` or `1e3`.
impl FromStr for Value {
    type Err = WireError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let text = input.trim();
        let invalid = || WireError::InvalidValue(format!("cannot parse {input:?} as a value"));

        match text {
            "" => return Err(invalid()),
            "true" => return Ok(Self::Bool(true)),
            "false" => return Ok(Self::Bool(false)),
            _ => {}
        }

        let (negative, magnitude) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let hex = magnitude
            .strip_prefix("0x")
            .or_else(|| magnitude.strip_prefix("0X"));
        if let Some(digits) = hex {
            let unsigned = u64::from_str_radix(digits, 16).map_err(|_| invalid())?;
            return signed_integer(negative, unsigned).ok_or_else(invalid);
        }

        if magnitude.bytes().all(|b| b.is_ascii_digit()) {
            let unsigned: u64 = magnitude.parse().map_err(|_| invalid())?;
            return signed_integer(negative, unsigned).ok_or_else(invalid);
        }

        let float: f64 = text.parse().map_err(|_| invalid())?;
        if !magnitude.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            // Reject "inf", "NaN" and friends; they are not C literals.
            return Err(invalid());
        }
        Ok(Self::Float(float))
    }
}

fn signed_integer(negative: bool, magnitude: u64) -> Option<Value> {
    if !negative {
        return Some(Value::UInt(magnitude));
    }
    if magnitude == 0 {
        return Some(Value::Int(0));
    }
    0i64.checked_sub_unsigned(magnitude).map(Value::Int)
}

macro_rules! impl_from_unsigned {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Self::UInt(u64::from(value))
            }
        })*
    };
}

macro_rules! impl_from_signed {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Self::Int(i64::from(value))
            }
        })*
    };
}

impl_from_unsigned!(u8, u16, u32, u64);
impl_from_signed!(i8, i16, i32, i64);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integers() {
        assert_eq!("13".parse::<Value>().unwrap(), Value::UInt(13));
        assert_eq!("-5".parse::<Value>().unwrap(), Value::Int(-5));
        assert_eq!("+7".parse::<Value>().unwrap(), Value::UInt(7));
        assert_eq!("0x20".parse::<Value>().unwrap(), Value::UInt(0x20));
        assert_eq!("-0X10".parse::<Value>().unwrap(), Value::Int(-16));
        assert_eq!("-0".parse::<Value>().unwrap(), Value::Int(0));
        assert_eq!(
            "-9223372036854775808".parse::<Value>().unwrap(),
            Value::Int(i64::MIN)
        );
        assert_eq!(
            "18446744073709551615".parse::<Value>().unwrap(),
            Value::UInt(u64::MAX)
        );
    }

    #[test]
    fn parses_floats_and_bools() {
        assert_eq!("1.5".parse::<Value>().unwrap(), Value::Float(1.5));
        assert_eq!(".5".parse::<Value>().unwrap(), Value::Float(0.5));
        assert_eq!("-2.".parse::<Value>().unwrap(), Value::Float(-2.0));
        assert_eq!("1e3".parse::<Value>().unwrap(), Value::Float(1000.0));
        assert_eq!("true".parse::<Value>().unwrap(), Value::Bool(true));
        assert_eq!(" false ".parse::<Value>().unwrap(), Value::Bool(false));
    }

    #[test]
    fn rejects_garbage() {
        for text in ["", "abc", "0xZZ", "-9223372036854775809", "inf", "NaN", "1.2.3"] {
            assert!(
                matches!(text.parse::<Value>(), Err(WireError::InvalidValue(_))),
                "{text:?} should not parse"
            );
        }
    }

    #[test]
    fn integer_views() {
        assert_eq!(Value::UInt(308).as_i64(), Some(308));
        assert_eq!(Value::Int(-1).as_u64(), None);
        assert_eq!(Value::Bool(true).as_u64(), Some(1));
        assert_eq!(Value::UInt(u64::MAX).as_i64(), None);
        assert_eq!(Value::Float(1.0).as_i64(), None);
        assert_eq!(Value::Float(1.0).as_f64(), Some(1.0));
    }

    #[test]
    fn from_primitives() {
        assert_eq!(Value::from(13u8), Value::UInt(13));
        assert_eq!(Value::from(-3i16), Value::Int(-3));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(0.25f32), Value::Float(0.25));
    }
}
