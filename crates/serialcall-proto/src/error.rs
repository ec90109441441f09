/// Errors that can occur while parsing prototypes or managing the registry.
#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    /// The prototype text does not match the expected grammar.
    #[error("cannot parse prototype {prototype:?}: {reason}")]
    ParseFailure { prototype: String, reason: String },

    /// A type in the prototype has no entry in the type table.
    #[error("unknown C type {type_name:?} in prototype {prototype:?}")]
    UnknownType {
        prototype: String,
        type_name: String,
    },

    /// No command is registered under this name.
    #[error("no command named {0:?}")]
    NotFound(String),

    /// A command with this name already exists (strict registries only).
    #[error("command {0:?} is already registered")]
    DuplicateName(String),

    /// The command id is already used by another command (strict registries only).
    #[error("command id {id} is already used by {existing:?}")]
    DuplicateId { id: u8, existing: String },

    /// A prototype list could not be read.
    #[error("failed to load prototypes: {0}")]
    LoadFailed(String),

    /// A line of a prototype list is invalid.
    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<ProtoError>,
    },
}

pub type Result<T> = std::result::Result<T, ProtoError>;
