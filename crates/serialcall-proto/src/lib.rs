//! C prototype parsing and the command registry.
//!
//! Remote functions are described the way they are declared in the firmware,
//! as C prototypes such as `int analogRead(uint8_t);`. The parser turns each
//! prototype plus a command id into a [`CommandDescriptor`]; the registry
//! holds one session's descriptors by name.

pub mod builtins;
pub mod config;
pub mod error;
pub mod parser;
pub mod registry;

pub use builtins::BUILTIN_PROTOTYPES;
pub use config::RegistryConfig;
pub use error::{ProtoError, Result};
pub use parser::parse_prototype;
pub use registry::CommandRegistry;
pub use serialcall_wire::CommandDescriptor;
