use crc::{Crc, CRC_8_NRSC_5};

/// Initial remainder.
pub const CRC8_INIT: u8 = 0xFF;

/// Generator polynomial `x^8 + x^5 + x^4 + 1`, MSB-first.
pub const CRC8_POLY: u8 = 0x31;

const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_NRSC_5);

/// CRC-8 over `bytes`: init `0xFF`, poly `0x31`, no reflection, no final XOR.
pub fn crc8(bytes: &[u8]) -> u8 {
    CRC8.checksum(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bit-by-bit reference written independently of `crc8`.
    fn reference(bytes: &[u8]) -> u8 {
        let mut reg: u16 = CRC8_INIT as u16;
        for &byte in bytes {
            for bit in (0..8).rev() {
                let input = (byte >> bit) & 1;
                let top = ((reg >> 7) & 1) as u8;
                reg = (reg << 1) & 0xFF;
                if top ^ input == 1 {
                    reg ^= CRC8_POLY as u16;
                }
            }
        }
        reg as u8
    }

    #[test]
    fn catalog_parameters_match_constants() {
        assert_eq!(CRC_8_NRSC_5.init, CRC8_INIT);
        assert_eq!(CRC_8_NRSC_5.poly, CRC8_POLY);
        assert!(!CRC_8_NRSC_5.refin);
        assert_eq!(CRC_8_NRSC_5.xorout, 0);
    }

    #[test]
    fn empty_input_is_initial_remainder() {
        assert_eq!(crc8(&[]), 0xFF);
    }

    #[test]
    fn single_byte_vectors() {
        assert_eq!(crc8(&[0x00]), 0xAC);
        assert_eq!(crc8(&[0x01]), 0x9D);
        assert_eq!(crc8(&[0xFF]), 0x00);
    }

    #[test]
    fn standard_check_value() {
        // CRC-8/NRSC-5 check string.
        assert_eq!(crc8(b"123456789"), 0xF7);
    }

    #[test]
    fn protocol_packets() {
        assert_eq!(crc8(&[2, 13, 1]), 0xB6);
        assert_eq!(crc8(&[6, 0]), 0xDB);
        assert_eq!(crc8(&[0, 0x20, 0x00]), 0x97);
    }

    #[test]
    fn matches_reference_for_every_single_byte() {
        for byte in 0..=u8::MAX {
            assert_eq!(crc8(&[byte]), reference(&[byte]), "byte {byte:#04x}");
        }
    }

    #[test]
    fn matches_reference_for_multi_byte_inputs() {
        let inputs: [&[u8]; 4] = [
            b"serialcall",
            &[0xDE, 0xAD, 0xBE, 0xEF],
            &[0; 17],
            &[14, 9, 0xB8, 0x01, 0xE8, 0x03, 0, 0],
        ];
        for input in inputs {
            assert_eq!(crc8(input), reference(input));
        }
    }
}
