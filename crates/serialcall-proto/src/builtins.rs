//! The fixed command table every firmware build registers.
//!
//! Ids must match the firmware exactly.

pub const GET_BYTE: u8 = 0;
pub const SET_BYTE: u8 = 1;
pub const PIN_MODE: u8 = 2;
pub const DIGITAL_WRITE: u8 = 3;
pub const ANALOG_WRITE: u8 = 4;
pub const DIGITAL_READ: u8 = 5;
pub const ANALOG_READ: u8 = 6;
pub const ANALOG_REFERENCE: u8 = 7;
pub const GET_2_BYTES: u8 = 8;
pub const GET_4_BYTES: u8 = 9;
pub const SET_2_BYTES: u8 = 10;
pub const SET_4_BYTES: u8 = 11;
pub const GET_DEV_TYPE_ADDR: u8 = 12;
pub const GET_DEV_ID: u8 = 13;
pub const TONE: u8 = 14;
pub const NO_TONE: u8 = 15;
pub const SHIFT_OUT: u8 = 16;
pub const SHIFT_IN: u8 = 17;

/// Built-in prototypes with their command ids.
pub const BUILTIN_PROTOTYPES: [(&str, u8); 18] = [
    ("uint8_t getByte(void* addr);", GET_BYTE),
    ("void setByte(void* addr, uint8_t data);", SET_BYTE),
    ("void pinMode(uint8_t, uint8_t);", PIN_MODE),
    ("void digitalWrite(uint8_t, uint8_t);", DIGITAL_WRITE),
    ("void analogWrite(uint8_t, int);", ANALOG_WRITE),
    ("int digitalRead(uint8_t);", DIGITAL_READ),
    ("int analogRead(uint8_t);", ANALOG_READ),
    ("void analogReference(uint8_t);", ANALOG_REFERENCE),
    ("uint16_t get2Bytes(void* addr);", GET_2_BYTES),
    ("uint32_t get4Bytes(void* addr);", GET_4_BYTES),
    ("void set2Bytes(void* addr, uint16_t data);", SET_2_BYTES),
    ("void set4Bytes(void* addr, uint32_t data);", SET_4_BYTES),
    ("void* getDevTypeAddr();", GET_DEV_TYPE_ADDR),
    ("uint8_t getDevId();", GET_DEV_ID),
    ("void tone(uint8_t, uint16_t, uint32_t);", TONE),
    ("void noTone(uint8_t);", NO_TONE),
    ("void shiftOut(uint8_t, uint8_t, uint8_t, uint8_t);", SHIFT_OUT),
    ("uint8_t shiftIn(uint8_t, uint8_t, uint8_t);", SHIFT_IN),
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serialcall_wire::FormatCode;

    use super::*;
    use crate::parser::parse_prototype;

    #[test]
    fn every_builtin_parses_with_unique_id_and_name() {
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for (prototype, id) in BUILTIN_PROTOTYPES {
            let desc = parse_prototype(prototype, id).unwrap();
            assert!(ids.insert(desc.id()), "duplicate id {id}");
            assert!(names.insert(desc.name().to_string()), "duplicate name");
        }
        assert_eq!(ids, (0..18).collect::<HashSet<u8>>());
    }

    #[test]
    fn builtin_signatures_match_firmware() {
        use FormatCode::*;

        let expected: [(&str, Option<FormatCode>, &[FormatCode]); 18] = [
            ("getByte", Some(U8), &[U16]),
            ("setByte", None, &[U16, U8]),
            ("pinMode", None, &[U8, U8]),
            ("digitalWrite", None, &[U8, U8]),
            ("analogWrite", None, &[U8, I16]),
            ("digitalRead", Some(I16), &[U8]),
            ("analogRead", Some(I16), &[U8]),
            ("analogReference", None, &[U8]),
            ("get2Bytes", Some(U16), &[U16]),
            ("get4Bytes", Some(U32), &[U16]),
            ("set2Bytes", None, &[U16, U16]),
            ("set4Bytes", None, &[U16, U32]),
            ("getDevTypeAddr", Some(U16), &[]),
            ("getDevId", Some(U8), &[]),
            ("tone", None, &[U8, U16, U32]),
            ("noTone", None, &[U8]),
            ("shiftOut", None, &[U8, U8, U8, U8]),
            ("shiftIn", Some(U8), &[U8, U8, U8]),
        ];

        for ((prototype, id), (name, ret, args)) in BUILTIN_PROTOTYPES.into_iter().zip(expected) {
            let desc = parse_prototype(prototype, id).unwrap();
            assert_eq!(desc.name(), name);
            assert_eq!(desc.return_format(), ret, "{name} return");
            assert_eq!(desc.arg_formats(), args, "{name} args");
        }
    }
}
