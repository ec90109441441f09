/// Errors that can occur while talking to a device.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The link could not be used.
    #[error("transport error: {0}")]
    Transport(#[from] serialcall_transport::TransportError),

    /// A value could not be encoded or a reply could not be decoded.
    #[error("wire error: {0}")]
    Wire(#[from] serialcall_wire::WireError),

    /// A prototype or registry operation failed.
    #[error("registry error: {0}")]
    Proto(#[from] serialcall_proto::ProtoError),

    /// The name is neither a registered command nor a known register.
    #[error("no command or register named {0:?}")]
    UnknownAttribute(String),

    /// The name is a register; registers are read and written, not called.
    #[error("{0:?} is a register and cannot be called")]
    NotCallable(String),

    /// The name is a command; only registers accept assignment.
    #[error("{0:?} is a command and cannot be written")]
    NotWritable(String),

    /// A command replied with a value of an unexpected kind.
    #[error("command {command:?} returned {found}, expected {expected}")]
    UnexpectedReturn {
        command: String,
        expected: &'static str,
        found: String,
    },

    /// The register map configuration is invalid.
    #[error("register config error: {0}")]
    RegisterConfig(String),

    /// A thread panicked while holding the shared session lock.
    #[error("device session lock poisoned")]
    Poisoned,

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DeviceError>;
