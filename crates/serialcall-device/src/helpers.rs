//! Typed wrappers over the built-in commands.
//!
//! Each helper calls the command by name, so a firmware-specific
//! registration under the same name is used instead of the built-in.

use serialcall_transport::Transport;
use serialcall_wire::Value;

use crate::device::{expect_integer, Device};
use crate::error::{DeviceError, Result};

pub const LOW: u8 = 0;
pub const HIGH: u8 = 1;

pub const INPUT: u8 = 0;
pub const OUTPUT: u8 = 1;
pub const INPUT_PULLUP: u8 = 2;

pub const LSBFIRST: u8 = 0;
pub const MSBFIRST: u8 = 1;

/// `analogReference` modes.
pub const EXTERNAL: u8 = 0;
pub const DEFAULT: u8 = 1;
pub const INTERNAL: u8 = 3;

/// Analog input pins on an ATmega328P board.
pub const A0: u8 = 14;
pub const A1: u8 = 15;
pub const A2: u8 = 16;
pub const A3: u8 = 17;
pub const A4: u8 = 18;
pub const A5: u8 = 19;

impl<T: Transport> Device<T> {
    pub fn pin_mode(&mut self, pin: u8, mode: u8) -> Result<()> {
        self.call("pinMode", &[pin.into(), mode.into()])?;
        Ok(())
    }

    pub fn digital_write(&mut self, pin: u8, level: u8) -> Result<()> {
        self.call("digitalWrite", &[pin.into(), level.into()])?;
        Ok(())
    }

    pub fn digital_read(&mut self, pin: u8) -> Result<i16> {
        self.call_integer("digitalRead", &[pin.into()])
    }

    pub fn analog_read(&mut self, pin: u8) -> Result<i16> {
        self.call_integer("analogRead", &[pin.into()])
    }

    pub fn analog_write(&mut self, pin: u8, value: i16) -> Result<()> {
        self.call("analogWrite", &[pin.into(), value.into()])?;
        Ok(())
    }

    pub fn analog_reference(&mut self, mode: u8) -> Result<()> {
        self.call("analogReference", &[mode.into()])?;
        Ok(())
    }

    pub fn get_byte(&mut self, addr: u16) -> Result<u8> {
        self.call_integer("getByte", &[addr.into()])
    }

    pub fn set_byte(&mut self, addr: u16, data: u8) -> Result<()> {
        self.call("setByte", &[addr.into(), data.into()])?;
        Ok(())
    }

    pub fn get_2_bytes(&mut self, addr: u16) -> Result<u16> {
        self.call_integer("get2Bytes", &[addr.into()])
    }

    pub fn get_4_bytes(&mut self, addr: u16) -> Result<u32> {
        self.call_integer("get4Bytes", &[addr.into()])
    }

    pub fn set_2_bytes(&mut self, addr: u16, data: u16) -> Result<()> {
        self.call("set2Bytes", &[addr.into(), data.into()])?;
        Ok(())
    }

    pub fn set_4_bytes(&mut self, addr: u16, data: u32) -> Result<()> {
        self.call("set4Bytes", &[addr.into(), data.into()])?;
        Ok(())
    }

    /// Address of the device's NUL-terminated type string.
    pub fn dev_type_addr(&mut self) -> Result<u16> {
        self.call_integer("getDevTypeAddr", &[])
    }

    pub fn dev_id(&mut self) -> Result<u8> {
        self.call_integer("getDevId", &[])
    }

    /// Read the device type string (typically the name of its AVR I/O
    /// header, e.g. `iom328p.h`) one byte at a time.
    ///
    /// Fails if no NUL appears within `max_dev_type_len` bytes.
    pub fn dev_type(&mut self) -> Result<String> {
        let base = self.dev_type_addr()?;
        let max_len = self.config().max_dev_type_len;
        let mut bytes = Vec::new();

        for offset in 0..max_len {
            let addr = u16::try_from(offset)
                .ok()
                .and_then(|offset| base.checked_add(offset))
                .ok_or_else(|| dev_type_error(format!("string at {base:#06x} runs past the address space")))?;
            match self.get_byte(addr)? {
                0 => return Ok(String::from_utf8_lossy(&bytes).into_owned()),
                byte => bytes.push(byte),
            }
        }

        Err(dev_type_error(format!("no NUL within {max_len} bytes")))
    }

    pub fn tone(&mut self, pin: u8, frequency: u16, duration_ms: u32) -> Result<()> {
        self.call("tone", &[pin.into(), frequency.into(), duration_ms.into()])?;
        Ok(())
    }

    pub fn no_tone(&mut self, pin: u8) -> Result<()> {
        self.call("noTone", &[pin.into()])?;
        Ok(())
    }

    pub fn shift_out(&mut self, data_pin: u8, clock_pin: u8, bit_order: u8, value: u8) -> Result<()> {
        self.call(
            "shiftOut",
            &[data_pin.into(), clock_pin.into(), bit_order.into(), value.into()],
        )?;
        Ok(())
    }

    pub fn shift_in(&mut self, data_pin: u8, clock_pin: u8, bit_order: u8) -> Result<u8> {
        self.call_integer("shiftIn", &[data_pin.into(), clock_pin.into(), bit_order.into()])
    }

    fn call_integer<R: TryFrom<i128>>(&mut self, name: &str, args: &[Value]) -> Result<R> {
        let value = self.call(name, args)?;
        expect_integer(name, value)
    }
}

fn dev_type_error(found: String) -> DeviceError {
    DeviceError::UnexpectedReturn {
        command: "getByte".to_string(),
        expected: "NUL-terminated device type string",
        found,
    }
}

#[cfg(test)]
mod tests {
    use serialcall_transport::MemoryTransport;
    use serialcall_wire::crc8;

    use super::*;
    use crate::config::DeviceConfig;
    use crate::registers::RegisterMap;
    use serialcall_proto::CommandRegistry;

    fn device() -> Device<MemoryTransport> {
        Device::with_builtins(MemoryTransport::new(), RegisterMap::new()).unwrap()
    }

    fn packet(bytes: &[u8]) -> Vec<u8> {
        let mut packet = bytes.to_vec();
        packet.push(crc8(bytes));
        packet
    }

    #[test]
    fn pin_helpers_encode_builtin_ids() {
        let mut device = device();
        device.pin_mode(13, OUTPUT).unwrap();
        device.digital_write(13, HIGH).unwrap();
        device.analog_write(9, 128).unwrap();

        let sent = device.transport_mut().take_sent();
        assert_eq!(sent[0], vec![0x02, 0x0D, 0x01, 0xB6]);
        assert_eq!(sent[1], packet(&[0x03, 13, 1]));
        assert_eq!(sent[2], packet(&[0x04, 9, 128, 0]));
    }

    #[test]
    fn read_helpers_return_typed_values() {
        let mut device = device();
        device.transport_mut().push_reply(&[0x34, 0x01]);
        assert_eq!(device.analog_read(A0).unwrap(), 308);
        assert_eq!(device.transport().last_sent(), Some(&packet(&[6, 14])[..]));

        device.transport_mut().push_reply(&[0x01, 0x00]);
        assert_eq!(device.digital_read(2).unwrap(), 1);

        device.transport_mut().push_reply(&[0x78, 0x56, 0x34, 0x12]);
        assert_eq!(device.get_4_bytes(0x0100).unwrap(), 0x1234_5678);
        assert_eq!(
            device.transport().last_sent(),
            Some(&packet(&[9, 0x00, 0x01])[..])
        );

        device.transport_mut().push_reply(&[0xA5]);
        assert_eq!(device.shift_in(4, 5, MSBFIRST).unwrap(), 0xA5);
    }

    #[test]
    fn memory_helpers() {
        let mut device = device();
        device.set_2_bytes(0x0200, 0xBEEF).unwrap();
        device.set_4_bytes(0x0200, 1).unwrap();
        device.tone(8, 440, 250).unwrap();
        device.no_tone(8).unwrap();
        device.shift_out(4, 5, LSBFIRST, 0x0F).unwrap();

        let sent = device.transport_mut().take_sent();
        assert_eq!(sent[0], packet(&[10, 0x00, 0x02, 0xEF, 0xBE]));
        assert_eq!(sent[1], packet(&[11, 0x00, 0x02, 1, 0, 0, 0]));
        assert_eq!(sent[2], packet(&[14, 8, 0xB8, 0x01, 0xFA, 0, 0, 0]));
        assert_eq!(sent[3], packet(&[15, 8]));
        assert_eq!(sent[4], packet(&[16, 4, 5, 0, 0x0F]));
    }

    #[test]
    fn dev_id_and_type() {
        let mut device = device();
        device.transport_mut().push_reply(&[0x07]);
        assert_eq!(device.dev_id().unwrap(), 7);

        device.transport_mut().push_reply(&[0x00, 0x01]);
        device.transport_mut().push_reply(b"iom328p.h\0");
        assert_eq!(device.dev_type().unwrap(), "iom328p.h");

        let sent = device.transport_mut().take_sent();
        // getDevId, getDevTypeAddr, then one getByte per character plus the NUL.
        assert_eq!(sent.len(), 2 + 10);
        assert_eq!(sent[1], vec![0x0C, 0xD1]);
        assert_eq!(sent[2], packet(&[0, 0x00, 0x01]));
        assert_eq!(sent[11], packet(&[0, 0x09, 0x01]));
    }

    #[test]
    fn dev_type_is_bounded() {
        let mut device = Device::with_config(
            MemoryTransport::new(),
            CommandRegistry::new(),
            RegisterMap::new(),
            DeviceConfig {
                max_dev_type_len: 4,
                ..DeviceConfig::default()
            },
        )
        .unwrap();
        device.transport_mut().push_reply(&[0x00, 0x01]);
        device.transport_mut().push_reply(b"abcdef\0");

        assert!(matches!(
            device.dev_type(),
            Err(DeviceError::UnexpectedReturn { .. })
        ));
        assert_eq!(device.transport().sent().len(), 1 + 4);
    }

    #[test]
    fn helpers_follow_registry_overrides() {
        let mut device = device();
        device
            .registry_mut()
            .add("uint8_t getDevId(uint8_t slot);", 40)
            .unwrap();

        assert!(matches!(
            device.dev_id(),
            Err(DeviceError::Wire(serialcall_wire::WireError::ArityMismatch { .. }))
        ));
    }
}
