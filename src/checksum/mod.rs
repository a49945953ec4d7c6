// Checksum primitives used by protocol decoders
// Parameterized CRC8/CRC16, bit-at-a-time, no tables

/// Compute a CRC-8 over `data`, MSB-first, no reflection.
///
/// `poly` is the generator polynomial (x^8 term implicit), `init` the
/// starting remainder. Decoders pass protocol-specific parameters per
/// call; there is no shared state.
pub fn crc8(data: &[u8], poly: u8, init: u8) -> u8 {
    let mut rem = init;
    for &byte in data {
        rem ^= byte;
        for _ in 0..8 {
            if rem & 0x80 != 0 {
                rem = (rem << 1) ^ poly;
            } else {
                rem <<= 1;
            }
        }
    }
    rem
}

/// CRC-8 variant for LSB-first protocols. `poly` must already be in
/// reflected form.
pub fn crc8_lsb(data: &[u8], poly: u8, init: u8) -> u8 {
    let mut rem = init;
    for &byte in data {
        rem ^= byte;
        for _ in 0..8 {
            if rem & 0x01 != 0 {
                rem = (rem >> 1) ^ poly;
            } else {
                rem >>= 1;
            }
        }
    }
    rem
}

/// Compute a CRC-16 over `data`, MSB-first, no reflection.
pub fn crc16(data: &[u8], poly: u16, init: u16) -> u16 {
    let mut rem = init;
    for &byte in data {
        rem ^= (byte as u16) << 8;
        for _ in 0..8 {
            if rem & 0x8000 != 0 {
                rem = (rem << 1) ^ poly;
            } else {
                rem <<= 1;
            }
        }
    }
    rem
}

/// CRC-16 variant for LSB-first protocols. `poly` must already be in
/// reflected form.
pub fn crc16_lsb(data: &[u8], poly: u16, init: u16) -> u16 {
    let mut rem = init;
    for &byte in data {
        rem ^= byte as u16;
        for _ in 0..8 {
            if rem & 0x0001 != 0 {
                rem = (rem >> 1) ^ poly;
            } else {
                rem >>= 1;
            }
        }
    }
    rem
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc16_deterministic() {
        let data = [0x81, 0x23, 0x45, 0x80];
        let a = crc16(&data, 0x8005, 0);
        let b = crc16(&data, 0x8005, 0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_crc16_known_vectors() {
        // CRC-16/XMODEM: poly 0x1021, init 0, "123456789" -> 0x31C3
        assert_eq!(crc16(b"123456789", 0x1021, 0), 0x31C3);
        // CRC-16/BUYPASS: poly 0x8005, init 0, "123456789" -> 0xFEE8
        assert_eq!(crc16(b"123456789", 0x8005, 0), 0xFEE8);
    }

    #[test]
    fn test_crc16_lsb_known_vector() {
        // CRC-16/ARC: reflected poly 0xA001, init 0, "123456789" -> 0xBB3D
        assert_eq!(crc16_lsb(b"123456789", 0xA001, 0), 0xBB3D);
    }

    #[test]
    fn test_crc8_known_vector() {
        // CRC-8: poly 0x07, init 0, "123456789" -> 0xF4
        assert_eq!(crc8(b"123456789", 0x07, 0), 0xF4);
    }

    #[test]
    fn test_single_bit_flip_changes_crc16() {
        let data = [0x81, 0x23, 0x45, 0x80];
        let base = crc16(&data, 0x8005, 0);
        for byte in 0..data.len() {
            for bit in 0..8 {
                let mut flipped = data;
                flipped[byte] ^= 1 << bit;
                assert_ne!(
                    crc16(&flipped, 0x8005, 0),
                    base,
                    "flip of byte {} bit {} did not change checksum",
                    byte,
                    bit
                );
            }
        }
    }

    #[test]
    fn test_crc8_single_bit_flip() {
        let data = [0xde, 0xad, 0xbe, 0xef];
        let base = crc8(&data, 0x31, 0xff);
        let mut flipped = data;
        flipped[2] ^= 0x10;
        assert_ne!(crc8(&flipped, 0x31, 0xff), base);
    }
}
