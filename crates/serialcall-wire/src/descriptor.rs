use std::fmt;

use crate::format::FormatCode;

/// One remotely callable function: its command id, name and wire signature.
///
/// Immutable once built. Parameter names and default values from the
/// source prototype are not kept; the wire only needs the types, in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandDescriptor {
    id: u8,
    name: String,
    return_format: Option<FormatCode>,
    arg_formats: Vec<FormatCode>,
}

impl CommandDescriptor {
    /// Create a descriptor. `return_format: None` means `void`.
    pub fn new(
        id: u8,
        name: impl Into<String>,
        return_format: Option<FormatCode>,
        arg_formats: impl Into<Vec<FormatCode>>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            return_format,
            arg_formats: arg_formats.into(),
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_format(&self) -> Option<FormatCode> {
        self.return_format
    }

    pub fn arg_formats(&self) -> &[FormatCode] {
        &self.arg_formats
    }

    pub fn arity(&self) -> usize {
        self.arg_formats.len()
    }

    pub fn is_void(&self) -> bool {
        self.return_format.is_none()
    }

    /// Total width of the packed arguments.
    pub fn args_width(&self) -> usize {
        self.arg_formats.iter().map(|code| code.width()).sum()
    }

    /// Full request packet length: id byte, arguments, checksum byte.
    pub fn request_len(&self) -> usize {
        1 + self.args_width() + 1
    }

    /// Number of reply bytes to expect; zero for `void` commands.
    pub fn reply_width(&self) -> usize {
        self.return_format.map_or(0, FormatCode::width)
    }
}

/// Renders the descriptor as a fixed-width C prototype, e.g.
/// `int16_t analogRead(uint8_t)`.
impl fmt::Display for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ret = self.return_format.map_or("void", FormatCode::c_name);
        write!(f, "{ret} {}(", self.name)?;
        for (i, code) in self.arg_formats.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(code.c_name())?;
        }
        f.write_str(")")
    }
}
