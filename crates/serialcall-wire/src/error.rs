use crate::format::FormatCode;
use crate::value::Value;

/// Errors that can occur while encoding requests or decoding replies.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WireError {
    /// A C type name has no entry in the type table.
    #[error("unknown C type: {0:?}")]
    UnknownType(String),

    /// A character is not one of the wire format tags.
    #[error("unknown format code: {0:?}")]
    UnknownFormatCode(char),

    /// A call supplied the wrong number of positional arguments.
    #[error("{command} takes {expected} argument(s) but {actual} were given")]
    ArityMismatch {
        command: String,
        expected: usize,
        actual: usize,
    },

    /// A value cannot be represented at its target wire width.
    #[error("value {value} is out of range for format '{format}'")]
    ValueOutOfRange { format: FormatCode, value: Value },

    /// Fewer reply bytes arrived than the return type needs.
    #[error("truncated response ({actual} of {expected} bytes)")]
    TruncatedResponse { expected: usize, actual: usize },

    /// Text could not be parsed as a value or byte string.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, WireError>;
