use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DeviceError, Result};

/// Offset from an AVR I/O-space address to its data-memory address.
pub const IO_SPACE_OFFSET: u16 = 0x20;

/// Register names and their data-memory addresses on the device.
///
/// Passed to a [`Device`](crate::Device) at construction. Reads of a
/// register name become `getByte(addr)`, writes become `setByte(addr, v)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RegisterMap {
    registers: BTreeMap<String, u16>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAddress {
    Number(u64),
    Text(String),
}

impl RegisterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a register at data-memory address `addr`.
    pub fn insert(&mut self, name: impl Into<String>, addr: u16) -> Option<u16> {
        self.registers.insert(name.into(), addr)
    }

    /// Add a register given by its I/O-space address, as the `_SFR_IO8`
    /// macros in AVR headers declare them.
    pub fn insert_io(&mut self, name: impl Into<String>, io_addr: u16) -> Result<Option<u16>> {
        let name = name.into();
        let addr = io_addr.checked_add(IO_SPACE_OFFSET).ok_or_else(|| {
            DeviceError::RegisterConfig(format!(
                "I/O address {io_addr:#x} for {name:?} overflows data memory"
            ))
        })?;
        Ok(self.insert(name, addr))
    }

    pub fn get(&self, name: &str) -> Option<u16> {
        self.registers.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registers.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<u16> {
        self.registers.remove(name)
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// Registers in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u16)> {
        self.registers.iter().map(|(name, addr)| (name.as_str(), *addr))
    }

    /// Parse a JSON object mapping names to addresses. Addresses are JSON
    /// numbers or strings such as `"0x25"` or `"37"`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, RawAddress> = serde_json::from_str(json)?;
        let mut map = Self::new();
        for (name, raw) in raw {
            let addr = match raw {
                RawAddress::Number(n) => u16::try_from(n).ok(),
                RawAddress::Text(text) => parse_address(&text),
            }
            .ok_or_else(|| {
                DeviceError::RegisterConfig(format!("invalid address for register {name:?}"))
            })?;
            map.insert(name, addr);
        }
        Ok(map)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            DeviceError::RegisterConfig(format!("{}: {err}", path.display()))
        })?;
        Self::from_json_str(&text)
    }
}

impl<N: Into<String>> FromIterator<(N, u16)> for RegisterMap {
    fn from_iter<I: IntoIterator<Item = (N, u16)>>(iter: I) -> Self {
        Self {
            registers: iter
                .into_iter()
                .map(|(name, addr)| (name.into(), addr))
                .collect(),
        }
    }
}

fn parse_address(text: &str) -> Option<u16> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}
