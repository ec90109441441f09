use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serialcall_wire::CommandDescriptor;
use tracing::debug;

use crate::builtins::BUILTIN_PROTOTYPES;
use crate::config::RegistryConfig;
use crate::error::{ProtoError, Result};
use crate::parser::parse_prototype;

/// Name-keyed registry of the commands one session can call.
///
/// Each device session owns its own registry; nothing here is global.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandDescriptor>,
    config: RegistryConfig,
}

impl CommandRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            commands: HashMap::new(),
            config,
        }
    }

    /// Create a registry holding the built-in command table.
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        registry.load_builtins()?;
        Ok(registry)
    }

    /// Register every built-in command.
    pub fn load_builtins(&mut self) -> Result<()> {
        for (prototype, id) in BUILTIN_PROTOTYPES {
            self.add(prototype, id)?;
        }
        Ok(())
    }

    /// Build a registry from embedded `(prototype, id)` pairs.
    pub fn from_prototypes(prototypes: &[(&str, u8)]) -> Result<Self> {
        let mut registry = Self::new();
        for (prototype, id) in prototypes {
            registry.add(prototype, *id)?;
        }
        Ok(registry)
    }

    /// Register a descriptor under its name.
    ///
    /// A later registration under an existing name replaces the earlier one
    /// and the replaced descriptor is returned, unless the config rejects
    /// duplicates.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<Option<CommandDescriptor>> {
        if self.config.reject_duplicate_names && self.commands.contains_key(descriptor.name()) {
            return Err(ProtoError::DuplicateName(descriptor.name().to_string()));
        }
        if self.config.reject_duplicate_ids {
            let clash = self
                .commands
                .values()
                .find(|existing| existing.id() == descriptor.id() && existing.name() != descriptor.name());
            if let Some(existing) = clash {
                return Err(ProtoError::DuplicateId {
                    id: descriptor.id(),
                    existing: existing.name().to_string(),
                });
            }
        }

        let replaced = self
            .commands
            .insert(descriptor.name().to_string(), descriptor);
        if let Some(old) = &replaced {
            debug!(name = old.name(), old_id = old.id(), "replaced command registration");
        }
        Ok(replaced)
    }

    /// Parse a prototype and register it with command id `id`.
    pub fn add(&mut self, prototype: &str, id: u8) -> Result<Option<CommandDescriptor>> {
        let descriptor = parse_prototype(prototype, id)?;
        self.register(descriptor)
    }

    /// Load a prototype list: one `<id> <prototype>` per line.
    ///
    /// Blank lines and lines starting with `#` are skipped. Ids are decimal
    /// or `0x` hex. Returns the number of commands registered.
    ///
    /// The list is applied as a whole: on error the registry is unchanged.
    pub fn load_str(&mut self, text: &str) -> Result<usize> {
        let mut staged = self.clone();
        let mut count = 0usize;
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            staged.load_line(line).map_err(|source| ProtoError::Line {
                line: index + 1,
                source: Box::new(source),
            })?;
            count += 1;
        }
        self.commands = staged.commands;
        Ok(count)
    }

    /// Load a prototype list file, bounded by `max_prototype_file_size`.
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let file = std::fs::File::open(path)
            .map_err(|err| ProtoError::LoadFailed(format!("{}: {err}", path.display())))?;
        let metadata = file
            .metadata()
            .map_err(|err| ProtoError::LoadFailed(err.to_string()))?;

        let max_bytes = self.config.max_prototype_file_size;
        if metadata.len() > max_bytes as u64 {
            return Err(ProtoError::LoadFailed(format!(
                "prototype file too large ({} bytes): {}",
                metadata.len(),
                path.display()
            )));
        }

        let read_limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
        let mut content = String::new();
        file.take(read_limit)
            .read_to_string(&mut content)
            .map_err(|err| {
                ProtoError::LoadFailed(format!("failed reading {}: {err}", path.display()))
            })?;
        if content.len() > max_bytes {
            return Err(ProtoError::LoadFailed(format!(
                "prototype file too large while reading: {}",
                path.display()
            )));
        }

        self.load_str(&content)
    }

    /// Build a registry from a prototype list file with default config.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut registry = Self::new();
        registry.load_file(path)?;
        Ok(registry)
    }

    /// Look up a command, failing with `NotFound`.
    pub fn lookup(&self, name: &str) -> Result<&CommandDescriptor> {
        self.commands
            .get(name)
            .ok_or_else(|| ProtoError::NotFound(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<CommandDescriptor> {
        self.commands.remove(name)
    }

    /// First command registered with `id`, in name order.
    pub fn by_id(&self, id: u8) -> Option<&CommandDescriptor> {
        self.commands
            .values()
            .filter(|desc| desc.id() == id)
            .min_by(|a, b| a.name().cmp(b.name()))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// All descriptors, sorted by id then name.
    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        let mut descriptors: Vec<&CommandDescriptor> = self.commands.values().collect();
        descriptors.sort_unstable_by(|a, b| a.id().cmp(&b.id()).then_with(|| a.name().cmp(b.name())));
        descriptors.into_iter()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn load_line(&mut self, line: &str) -> Result<()> {
        let (id_text, prototype) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| ProtoError::LoadFailed(format!("expected '<id> <prototype>', got {line:?}")))?;
        let id = parse_id(id_text)
            .ok_or_else(|| ProtoError::LoadFailed(format!("invalid command id {id_text:?}")))?;
        self.add(prototype.trim(), id)?;
        Ok(())
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_id(text: &str) -> Option<u8> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}
