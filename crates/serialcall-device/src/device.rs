use bytes::BytesMut;
use serialcall_proto::builtins::BUILTIN_PROTOTYPES;
use serialcall_proto::{parse_prototype, CommandDescriptor, CommandRegistry};
use serialcall_transport::{Transport, TransportError};
use serialcall_wire::{decode_reply, encode_request, to_hex, Value};
use tracing::{debug, trace};

use crate::config::DeviceConfig;
use crate::error::{DeviceError, Result};
use crate::registers::RegisterMap;

const GET_BYTE: &str = "getByte";
const SET_BYTE: &str = "setByte";

/// What a name refers to in one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// A registered command. Wins over a register of the same name.
    Command(&'a CommandDescriptor),
    /// A register at this data-memory address.
    Register(u16),
    Unknown,
}

/// Result of reading a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    /// The callable command; pass it to [`Device::invoke`].
    Command(CommandDescriptor),
    /// The current byte value of a register.
    Register(u8),
}

/// A session with one device over one transport.
///
/// The session owns its command registry and register map. Every operation
/// takes `&mut self`, so at most one request is in flight per link.
#[derive(Debug)]
pub struct Device<T> {
    transport: T,
    registry: CommandRegistry,
    registers: RegisterMap,
    config: DeviceConfig,
}

impl<T: Transport> Device<T> {
    /// Create a session with exactly the given commands and registers.
    pub fn new(transport: T, registry: CommandRegistry, registers: RegisterMap) -> Self {
        let config = DeviceConfig {
            load_builtins: false,
            ..DeviceConfig::default()
        };
        Self::from_parts(transport, registry, registers, config)
    }

    /// Create a session with the built-in command table.
    pub fn with_builtins(transport: T, registers: RegisterMap) -> Result<Self> {
        Self::with_config(
            transport,
            CommandRegistry::new(),
            registers,
            DeviceConfig::default(),
        )
    }

    /// Create a session with explicit config.
    ///
    /// With `load_builtins`, every built-in whose name is not already in
    /// `registry` is added, so caller registrations take precedence.
    pub fn with_config(
        transport: T,
        mut registry: CommandRegistry,
        registers: RegisterMap,
        config: DeviceConfig,
    ) -> Result<Self> {
        if config.load_builtins {
            for (prototype, id) in BUILTIN_PROTOTYPES {
                let descriptor = parse_prototype(prototype, id)?;
                if !registry.contains(descriptor.name()) {
                    registry.register(descriptor)?;
                }
            }
        }
        Ok(Self::from_parts(transport, registry, registers, config))
    }

    fn from_parts(
        transport: T,
        registry: CommandRegistry,
        registers: RegisterMap,
        config: DeviceConfig,
    ) -> Self {
        debug!(
            commands = registry.len(),
            registers = registers.len(),
            "device session created"
        );
        Self {
            transport,
            registry,
            registers,
            config,
        }
    }

    /// Classify a name. Commands are checked before registers.
    pub fn resolve(&self, name: &str) -> Resolution<'_> {
        if let Some(descriptor) = self.registry.get(name) {
            return Resolution::Command(descriptor);
        }
        match self.registers.get(name) {
            Some(addr) => Resolution::Register(addr),
            None => Resolution::Unknown,
        }
    }

    /// Call a registered command by name.
    ///
    /// Returns `Ok(None)` for `void` commands.
    pub fn call(&mut self, name: &str, args: &[Value]) -> Result<Option<Value>> {
        if let Some(descriptor) = self.registry.get(name) {
            return transact(&mut self.transport, descriptor, args);
        }
        if self.registers.contains(name) {
            return Err(DeviceError::NotCallable(name.to_string()));
        }
        Err(DeviceError::UnknownAttribute(name.to_string()))
    }

    /// Call a command through its descriptor, bypassing name lookup.
    pub fn invoke(&mut self, descriptor: &CommandDescriptor, args: &[Value]) -> Result<Option<Value>> {
        transact(&mut self.transport, descriptor, args)
    }

    /// Read a name: a command yields its callable descriptor, a register is
    /// fetched from the device with `getByte`.
    pub fn read(&mut self, name: &str) -> Result<Attribute> {
        let addr = match self.resolve(name) {
            Resolution::Command(descriptor) => return Ok(Attribute::Command(descriptor.clone())),
            Resolution::Register(addr) => addr,
            Resolution::Unknown => return Err(DeviceError::UnknownAttribute(name.to_string())),
        };
        self.fetch_register(addr).map(Attribute::Register)
    }

    /// Read a register's current value.
    pub fn read_register(&mut self, name: &str) -> Result<u8> {
        match self.resolve(name) {
            Resolution::Register(addr) => self.fetch_register(addr),
            Resolution::Command(_) | Resolution::Unknown => {
                Err(DeviceError::UnknownAttribute(name.to_string()))
            }
        }
    }

    /// Assign a register with `setByte`. Commands cannot be written.
    pub fn write(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let addr = match self.resolve(name) {
            Resolution::Register(addr) => addr,
            Resolution::Command(_) => return Err(DeviceError::NotWritable(name.to_string())),
            Resolution::Unknown => return Err(DeviceError::UnknownAttribute(name.to_string())),
        };
        let set_byte = self.registry.lookup(SET_BYTE)?;
        transact(&mut self.transport, set_byte, &[Value::from(addr), value.into()])?;
        Ok(())
    }

    fn fetch_register(&mut self, addr: u16) -> Result<u8> {
        let get_byte = self.registry.lookup(GET_BYTE)?;
        let value = transact(&mut self.transport, get_byte, &[Value::from(addr)])?;
        expect_integer(GET_BYTE, value)
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Mutable registry access, for registering firmware-specific commands.
    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    pub fn registers(&self) -> &RegisterMap {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut RegisterMap {
        &mut self.registers
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }
}

/// One request/reply exchange.
fn transact<T: Transport>(
    transport: &mut T,
    descriptor: &CommandDescriptor,
    args: &[Value],
) -> Result<Option<Value>> {
    let mut packet = BytesMut::with_capacity(descriptor.request_len());
    encode_request(descriptor, args, &mut packet)?;

    if !transport.is_open() {
        return Err(TransportError::Closed.into());
    }
    trace!(
        command = descriptor.name(),
        id = descriptor.id(),
        packet = %to_hex(&packet),
        "sending request"
    );
    transport.send(&packet)?;

    let width = descriptor.reply_width();
    if width == 0 {
        return Ok(None);
    }
    let reply = transport.receive(width)?;
    trace!(
        command = descriptor.name(),
        reply = %to_hex(&reply),
        "received reply"
    );
    Ok(decode_reply(descriptor, &reply)?)
}

/// Narrow a command's return value to an integer type.
pub(crate) fn expect_integer<R: TryFrom<i128>>(command: &str, value: Option<Value>) -> Result<R> {
    let widened = match value {
        Some(Value::Int(v)) => Some(i128::from(v)),
        Some(Value::UInt(v)) => Some(i128::from(v)),
        Some(Value::Bool(b)) => Some(i128::from(b)),
        Some(Value::Float(_)) | None => None,
    };
    widened
        .and_then(|n| R::try_from(n).ok())
        .ok_or_else(|| DeviceError::UnexpectedReturn {
            command: command.to_string(),
            expected: std::any::type_name::<R>(),
            found: value.map_or_else(|| "nothing".to_string(), |v| v.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use serialcall_proto::ProtoError;
    use serialcall_transport::MemoryTransport;
    use serialcall_wire::{crc8, WireError};

    use super::*;

    fn device_with(registers: RegisterMap) -> Device<MemoryTransport> {
        Device::with_builtins(MemoryTransport::new(), registers).unwrap()
    }

    fn with_crc(bytes: &[u8]) -> Vec<u8> {
        let mut packet = bytes.to_vec();
        packet.push(crc8(bytes));
        packet
    }

    #[test]
    fn void_command_sends_packet_and_reads_nothing() {
        let mut device = device_with(RegisterMap::new());
        device.transport_mut().push_reply(&[0xAA]);

        let result = device.call("pinMode", &[13u8.into(), 1u8.into()]).unwrap();

        assert_eq!(result, None);
        assert_eq!(device.transport().sent(), &[vec![0x02u8, 0x0D, 0x01, 0xB6]]);
        assert_eq!(device.transport().pending_reply_bytes(), 1);
    }

    #[test]
    fn analog_read_decodes_little_endian_reply() {
        let mut device = device_with(RegisterMap::new());
        device.transport_mut().push_reply(&[0x34, 0x01]);

        let result = device.call("analogRead", &[0u8.into()]).unwrap();

        assert_eq!(result, Some(Value::Int(308)));
        assert_eq!(device.transport().last_sent(), Some(&[0x06, 0x00, 0xDB][..]));
    }

    #[test]
    fn register_read_uses_get_byte() {
        let registers: RegisterMap = [("TCCR0A", 0x20u16)].into_iter().collect();
        let mut device = device_with(registers);
        device.transport_mut().push_reply(&[0x83]);

        assert_eq!(device.read("TCCR0A").unwrap(), Attribute::Register(0x83));
        assert_eq!(device.transport().last_sent(), Some(&[0x00, 0x20, 0x00, 0x97][..]));
    }

    #[test]
    fn register_write_uses_set_byte() {
        let registers: RegisterMap = [("PORTB", 0x25u16)].into_iter().collect();
        let mut device = device_with(registers);

        device.write("PORTB", 0xFFu8).unwrap();

        assert_eq!(
            device.transport().last_sent(),
            Some(&[0x01, 0x25, 0x00, 0xFF, 0xF6][..])
        );
        assert_eq!(device.transport().pending_reply_bytes(), 0);
    }

    #[test]
    fn commands_take_precedence_over_registers() {
        let registers: RegisterMap = [("PORTB", 0x25u16)].into_iter().collect();
        let mut device = device_with(registers);
        device
            .registry_mut()
            .add("uint8_t PORTB();", 40)
            .unwrap();

        assert!(matches!(device.resolve("PORTB"), Resolution::Command(desc) if desc.id() == 40));

        device.transport_mut().push_reply(&[7]);
        assert_eq!(device.call("PORTB", &[]).unwrap(), Some(Value::UInt(7)));
        assert_eq!(device.transport().last_sent(), Some(&with_crc(&[40])[..]));

        match device.read("PORTB").unwrap() {
            Attribute::Command(desc) => assert_eq!(desc.name(), "PORTB"),
            other => panic!("expected command, got {other:?}"),
        }
        assert!(matches!(
            device.write("PORTB", 1u8),
            Err(DeviceError::NotWritable(name)) if name == "PORTB"
        ));
    }

    #[test]
    fn resolve_classifies_names() {
        let registers: RegisterMap = [("DDRB", 0x24u16)].into_iter().collect();
        let device = device_with(registers);

        assert!(matches!(device.resolve("tone"), Resolution::Command(_)));
        assert_eq!(device.resolve("DDRB"), Resolution::Register(0x24));
        assert_eq!(device.resolve("nothing"), Resolution::Unknown);
    }

    #[test]
    fn registers_are_not_callable_and_unknown_names_fail() {
        let registers: RegisterMap = [("DDRB", 0x24u16)].into_iter().collect();
        let mut device = device_with(registers);

        assert!(matches!(
            device.call("DDRB", &[]),
            Err(DeviceError::NotCallable(name)) if name == "DDRB"
        ));
        assert!(matches!(
            device.call("missing", &[]),
            Err(DeviceError::UnknownAttribute(_))
        ));
        assert!(matches!(device.read("missing"), Err(DeviceError::UnknownAttribute(_))));
        assert!(matches!(
            device.write("missing", 1u8),
            Err(DeviceError::UnknownAttribute(_))
        ));
        assert!(device.transport().sent().is_empty());
    }

    #[test]
    fn arity_and_range_errors_send_nothing() {
        let mut device = device_with(RegisterMap::new());

        assert!(matches!(
            device.call("pinMode", &[13u8.into()]),
            Err(DeviceError::Wire(WireError::ArityMismatch { expected: 2, actual: 1, .. }))
        ));
        assert!(matches!(
            device.call("pinMode", &[300u16.into(), 1u8.into()]),
            Err(DeviceError::Wire(WireError::ValueOutOfRange { .. }))
        ));
        assert!(device.transport().sent().is_empty());
    }

    #[test]
    fn short_reply_is_truncated_response() {
        let mut device = device_with(RegisterMap::new());
        device.transport_mut().push_reply(&[0x34]);

        assert!(matches!(
            device.call("analogRead", &[0u8.into()]),
            Err(DeviceError::Wire(WireError::TruncatedResponse { expected: 2, actual: 1 }))
        ));
    }

    #[test]
    fn closed_transport_is_connection_failure() {
        let mut device = device_with(RegisterMap::new());
        device.transport_mut().close();

        assert!(matches!(
            device.call("getDevId", &[]),
            Err(DeviceError::Transport(TransportError::Closed))
        ));
        assert!(device.transport().sent().is_empty());
    }

    #[test]
    fn invoke_uses_descriptor_directly() {
        let mut device = device_with(RegisterMap::new());
        let Attribute::Command(desc) = device.read("getDevId").unwrap() else {
            panic!("getDevId should be a command");
        };
        device.transport_mut().push_reply(&[0x2A]);

        assert_eq!(device.invoke(&desc, &[]).unwrap(), Some(Value::UInt(42)));
        assert_eq!(device.transport().last_sent(), Some(&[0x0D, 0xE0][..]));
    }

    #[test]
    fn new_uses_registry_as_given() {
        let registry = CommandRegistry::from_prototypes(&[("void blink(uint8_t);", 30)]).unwrap();
        let registers: RegisterMap = [("PORTB", 0x25u16)].into_iter().collect();
        let mut device = Device::new(MemoryTransport::new(), registry, registers);

        assert_eq!(device.registry().len(), 1);
        assert!(!device.config().load_builtins);
        assert!(matches!(
            device.read_register("PORTB"),
            Err(DeviceError::Proto(ProtoError::NotFound(name))) if name == "getByte"
        ));
    }

    #[test]
    fn caller_registrations_survive_builtin_loading() {
        let registry = CommandRegistry::from_prototypes(&[("uint16_t getDevId();", 13)]).unwrap();
        let device = Device::with_config(
            MemoryTransport::new(),
            registry,
            RegisterMap::new(),
            DeviceConfig::default(),
        )
        .unwrap();

        assert_eq!(device.registry().len(), 18);
        assert_eq!(device.registry().lookup("getDevId").unwrap().reply_width(), 2);
    }

    #[test]
    fn sessions_do_not_share_registries() {
        let mut first = device_with(RegisterMap::new());
        let second = device_with(RegisterMap::new());
        first.registry_mut().add("void extra();", 50).unwrap();

        assert!(first.registry().contains("extra"));
        assert!(!second.registry().contains("extra"));
    }

    #[test]
    fn expect_integer_rejects_other_kinds() {
        assert_eq!(expect_integer::<u8>("x", Some(Value::UInt(5))).unwrap(), 5);
        assert!(matches!(
            expect_integer::<u8>("x", Some(Value::UInt(300))),
            Err(DeviceError::UnexpectedReturn { .. })
        ));
        assert!(matches!(
            expect_integer::<u8>("x", None),
            Err(DeviceError::UnexpectedReturn { ref found, .. }) if found == "nothing"
        ));
    }
}
