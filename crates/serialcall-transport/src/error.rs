use std::path::PathBuf;

/// Errors that can occur in transport operations.
///
/// Every variant is a connection failure from the point of view of the
/// protocol layers above.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the device at the specified path.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream accepted zero bytes of a pending write.
    #[error("transport accepted zero bytes of a {pending}-byte write")]
    WriteZero { pending: usize },

    /// The transport has been closed.
    #[error("transport closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;
