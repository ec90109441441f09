use std::fmt;
use std::io;

use serialcall_device::DeviceError;
use serialcall_proto::ProtoError;
use serialcall_transport::TransportError;
use serialcall_wire::WireError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => FAILURE,
        _ => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Open { ref source, .. } => {
            let code = io_error(context, io::Error::from(source.kind())).code;
            CliError::new(code, format!("{context}: {err}"))
        }
        TransportError::Io(source) => io_error(context, source),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn wire_error(context: &str, err: WireError) -> CliError {
    let code = match err {
        // No reply within the read timeout.
        WireError::TruncatedResponse { .. } => TIMEOUT,
        WireError::ArityMismatch { .. }
        | WireError::ValueOutOfRange { .. }
        | WireError::InvalidValue(_) => USAGE,
        WireError::UnknownType(_) | WireError::UnknownFormatCode(_) => DATA_INVALID,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn proto_error(context: &str, err: ProtoError) -> CliError {
    let code = match err {
        ProtoError::NotFound(_) => USAGE,
        _ => DATA_INVALID,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn device_error(context: &str, err: DeviceError) -> CliError {
    match err {
        DeviceError::Transport(err) => transport_error(context, err),
        DeviceError::Wire(err) => wire_error(context, err),
        DeviceError::Proto(err) => proto_error(context, err),
        DeviceError::UnknownAttribute(_)
        | DeviceError::NotCallable(_)
        | DeviceError::NotWritable(_) => CliError::new(USAGE, format!("{context}: {err}")),
        DeviceError::UnexpectedReturn { .. }
        | DeviceError::RegisterConfig(_)
        | DeviceError::Json(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        DeviceError::Poisoned => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_reply_maps_to_timeout() {
        let err = device_error(
            "call failed",
            DeviceError::Wire(WireError::TruncatedResponse {
                expected: 2,
                actual: 0,
            }),
        );
        assert_eq!(err.code, TIMEOUT);
        assert!(err.message.starts_with("call failed: "));
    }

    #[test]
    fn name_errors_are_usage_errors() {
        let err = device_error("write failed", DeviceError::NotWritable("tone".into()));
        assert_eq!(err.code, USAGE);
        let err = proto_error("lookup failed", ProtoError::NotFound("x".into()));
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn open_errors_keep_io_classification() {
        let err = transport_error(
            "open failed",
            TransportError::Open {
                path: "/dev/ttyACM9".into(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            },
        );
        assert_eq!(err.code, PERMISSION_DENIED);
        assert!(err.message.contains("/dev/ttyACM9"));

        let err = transport_error("send failed", TransportError::Closed);
        assert_eq!(err.code, TRANSPORT_ERROR);
    }
}
