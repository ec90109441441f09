use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use crate::error::{Result, WireError};

/// A fixed-width little-endian encoding, identified on the wire by a
/// single-character tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormatCode {
    /// `B`: unsigned 8-bit.
    U8,
    /// `b`: signed 8-bit.
    I8,
    /// `?`: boolean, one byte.
    Bool,
    /// `H`: unsigned 16-bit. Also the width of a device pointer.
    U16,
    /// `h`: signed 16-bit.
    I16,
    /// `I`: unsigned 32-bit.
    U32,
    /// `i`: signed 32-bit.
    I32,
    /// `Q`: unsigned 64-bit.
    U64,
    /// `q`: signed 64-bit.
    I64,
    /// `f`: IEEE-754 single precision.
    F32,
}

/// One row of the type table: a format code, its wire width in bytes and
/// the C type names that map to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeFormatEntry {
    pub code: FormatCode,
    pub width: usize,
    pub aliases: &'static [&'static str],
}

/// The C type table for an 8-bit AVR target, where `int` is 16 bits,
/// `long` is 32 bits and `double` is a 32-bit float.
pub const TYPE_TABLE: [TypeFormatEntry; 10] = [
    TypeFormatEntry {
        code: FormatCode::U8,
        width: 1,
        aliases: &["unsigned char", "uint8_t", "byte", "boolean"],
    },
    TypeFormatEntry {
        code: FormatCode::I8,
        width: 1,
        aliases: &["char", "signed char", "int8_t"],
    },
    TypeFormatEntry {
        code: FormatCode::Bool,
        width: 1,
        aliases: &["bool"],
    },
    TypeFormatEntry {
        code: FormatCode::U16,
        width: 2,
        aliases: &["unsigned int", "uint16_t", "size_t", "void*"],
    },
    TypeFormatEntry {
        code: FormatCode::I16,
        width: 2,
        aliases: &["int", "signed int", "int16_t"],
    },
    TypeFormatEntry {
        code: FormatCode::U64,
        width: 8,
        aliases: &["unsigned long long int", "unsigned long long", "uint64_t"],
    },
    TypeFormatEntry {
        code: FormatCode::I64,
        width: 8,
        aliases: &["long long int", "long long", "int64_t"],
    },
    TypeFormatEntry {
        code: FormatCode::U32,
        width: 4,
        aliases: &["unsigned long int", "unsigned long", "uint32_t"],
    },
    TypeFormatEntry {
        code: FormatCode::I32,
        width: 4,
        aliases: &[
            "long int",
            "long",
            "signed long int",
            "signed long",
            "int32_t",
        ],
    },
    TypeFormatEntry {
        code: FormatCode::F32,
        width: 4,
        aliases: &["float", "double"],
    },
];

impl FormatCode {
    pub const ALL: [Self; 10] = [
        Self::U8,
        Self::I8,
        Self::Bool,
        Self::U16,
        Self::I16,
        Self::U32,
        Self::I32,
        Self::U64,
        Self::I64,
        Self::F32,
    ];

    /// The single-character wire tag.
    pub const fn as_char(self) -> char {
        match self {
            Self::U8 => 'B',
            Self::I8 => 'b',
            Self::Bool => '?',
            Self::U16 => 'H',
            Self::I16 => 'h',
            Self::U32 => 'I',
            Self::I32 => 'i',
            Self::U64 => 'Q',
            Self::I64 => 'q',
            Self::F32 => 'f',
        }
    }

    /// Look up a format code by its wire tag.
    pub fn from_char(tag: char) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_char() == tag)
            .ok_or(WireError::UnknownFormatCode(tag))
    }

    /// Serialized width in bytes.
    pub const fn width(self) -> usize {
        match self {
            Self::U8 | Self::I8 | Self::Bool => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 => 8,
        }
    }

    /// Resolve a C type name. Whitespace runs are insignificant and spaces
    /// around `*` are ignored, so `"unsigned   long"` and `"void *"` resolve.
    pub fn from_c_type(name: &str) -> Result<Self> {
        let normalized = normalize_type_name(name);
        alias_index()
            .get(normalized.as_str())
            .copied()
            .ok_or(WireError::UnknownType(normalized))
    }

    /// All C type names that map to this code.
    pub fn aliases(self) -> &'static [&'static str] {
        match TYPE_TABLE.iter().find(|entry| entry.code == self) {
            Some(entry) => entry.aliases,
            None => &[],
        }
    }

    /// Fixed-width C name used when printing descriptors.
    pub const fn c_name(self) -> &'static str {
        match self {
            Self::U8 => "uint8_t",
            Self::I8 => "int8_t",
            Self::Bool => "bool",
            Self::U16 => "uint16_t",
            Self::I16 => "int16_t",
            Self::U32 => "uint32_t",
            Self::I32 => "int32_t",
            Self::U64 => "uint64_t",
            Self::I64 => "int64_t",
            Self::F32 => "float",
        }
    }

    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::F32
        )
    }

    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32)
    }

    /// Inclusive integer range representable by this code, or `None` for
    /// the float code. `Bool` accepts 0 and 1 only.
    pub const fn integer_range(self) -> Option<(i128, i128)> {
        let range = match self {
            Self::U8 => (0, u8::MAX as i128),
            Self::I8 => (i8::MIN as i128, i8::MAX as i128),
            Self::Bool => (0, 1),
            Self::U16 => (0, u16::MAX as i128),
            Self::I16 => (i16::MIN as i128, i16::MAX as i128),
            Self::U32 => (0, u32::MAX as i128),
            Self::I32 => (i32::MIN as i128, i32::MAX as i128),
            Self::U64 => (0, u64::MAX as i128),
            Self::I64 => (i64::MIN as i128, i64::MAX as i128),
            Self::F32 => return None,
        };
        Some(range)
    }
}

impl fmt::Display for FormatCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Serialized width of the code with wire tag `tag`.
pub fn width_of(tag: char) -> Result<usize> {
    FormatCode::from_char(tag).map(FormatCode::width)
}

/// Every C type alias, most specific first: more words before fewer, then
/// longer text before shorter. Matching in this order keeps
/// `unsigned long long int` from being taken as `unsigned long`.
pub fn aliases_longest_first() -> &'static [(&'static str, FormatCode)] {
    static SORTED: OnceLock<Vec<(&'static str, FormatCode)>> = OnceLock::new();
    SORTED.get_or_init(|| {
        let mut aliases: Vec<(&'static str, FormatCode)> = TYPE_TABLE
            .iter()
            .flat_map(|entry| entry.aliases.iter().map(move |alias| (*alias, entry.code)))
            .collect();
        aliases.sort_by(|(a, _), (b, _)| {
            alias_word_count(b)
                .cmp(&alias_word_count(a))
                .then_with(|| b.len().cmp(&a.len()))
                .then_with(|| a.cmp(b))
        });
        aliases
    })
}

/// Collapse whitespace runs to one space and drop spaces around `*`.
pub fn normalize_type_name(name: &str) -> String {
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.replace(" *", "*").replace("* ", "*")
}

fn alias_word_count(alias: &str) -> usize {
    alias.split_whitespace().count() + alias.matches('*').count()
}

fn alias_index() -> &'static HashMap<&'static str, FormatCode> {
    static INDEX: OnceLock<HashMap<&'static str, FormatCode>> = OnceLock::new();
    INDEX.get_or_init(|| {
        TYPE_TABLE
            .iter()
            .flat_map(|entry| entry.aliases.iter().map(move |alias| (*alias, entry.code)))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_long_long_aliases_agree() {
        let a = FormatCode::from_c_type("unsigned long long int").unwrap();
        let b = FormatCode::from_c_type("unsigned long long").unwrap();
        let c = FormatCode::from_c_type("uint64_t").unwrap();

        assert_eq!(a, FormatCode::U64);
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.width(), 8);
    }

    #[test]
    fn overlapping_names_do_not_collide() {
        let long = FormatCode::from_c_type("unsigned long").unwrap();
        let long_long = FormatCode::from_c_type("unsigned long long").unwrap();

        assert_ne!(long, long_long);
        assert_eq!(long.width(), 4);
        assert_eq!(long_long.width(), 8);
    }

    #[test]
    fn whitespace_is_insignificant() {
        assert_eq!(
            FormatCode::from_c_type("  unsigned \t long\n int ").unwrap(),
            FormatCode::U32
        );
        assert_eq!(FormatCode::from_c_type("void *").unwrap(), FormatCode::U16);
        assert_eq!(FormatCode::from_c_type("void*").unwrap(), FormatCode::U16);
    }

    #[test]
    fn avr_widths() {
        assert_eq!(FormatCode::from_c_type("int").unwrap().width(), 2);
        assert_eq!(FormatCode::from_c_type("long").unwrap().width(), 4);
        assert_eq!(FormatCode::from_c_type("double").unwrap(), FormatCode::F32);
        assert_eq!(FormatCode::from_c_type("boolean").unwrap(), FormatCode::U8);
    }

    #[test]
    fn unknown_type_fails() {
        assert!(matches!(
            FormatCode::from_c_type("char*"),
            Err(WireError::UnknownType(name)) if name == "char*"
        ));
        assert!(FormatCode::from_c_type("uint128_t").is_err());
    }

    #[test]
    fn every_alias_maps_to_exactly_one_code() {
        let mut seen = HashMap::new();
        for entry in TYPE_TABLE {
            for alias in entry.aliases {
                assert!(seen.insert(*alias, entry.code).is_none(), "duplicate {alias}");
            }
        }
    }

    #[test]
    fn table_widths_match_codes() {
        for entry in TYPE_TABLE {
            assert_eq!(entry.width, entry.code.width(), "{}", entry.code);
        }
        assert_eq!(TYPE_TABLE.len(), FormatCode::ALL.len());
    }

    #[test]
    fn tags_round_trip_and_widths() {
        for code in FormatCode::ALL {
            assert_eq!(FormatCode::from_char(code.as_char()).unwrap(), code);
            assert_eq!(width_of(code.as_char()).unwrap(), code.width());
            assert!(!code.aliases().is_empty());
        }
        assert!(matches!(
            width_of('x'),
            Err(WireError::UnknownFormatCode('x'))
        ));
    }

    #[test]
    fn longest_aliases_sort_first() {
        let sorted = aliases_longest_first();
        let position = |name: &str| sorted.iter().position(|(alias, _)| *alias == name).unwrap();

        assert!(position("unsigned long long int") < position("unsigned long long"));
        assert!(position("unsigned long long") < position("unsigned long"));
        assert!(position("signed char") < position("char"));
        assert!(position("void*") < position("int"));
        assert_eq!(sorted.len(), 31);
    }
}
