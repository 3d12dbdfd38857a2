//! Software model of the packet CRC and data whitening
//!
//! The radio computes both in hardware. These functions produce the same values, so packets can
//! be prepared or checked without the radio, e.g. to validate the CRC configuration.

/// CRC polynomial x^24 + x^10 + x^9 + x^6 + x^4 + x^3 + x + 1, as written to `CRCPOLY`
pub const CRC_POLY: u32 = 0x00_065B;

/// CRC initial value of the advertising physical channel PDUs
pub const CRC_INIT_ADV: u32 = 0x55_5555;

/// [`CRC_POLY`] bit-reversed, for the right-shifting implementation
const CRC_POLY_REFLECTED: u32 = 0xDA_6000;

/// Compute the CRC of `data` (header and payload) starting from `init`
///
/// The result is in transmission order: its least significant byte is sent first and each byte
/// is sent least significant bit first, like the rest of the PDU.
pub fn crc24(init: u32, data: &[u8]) -> u32 {
    let mut crc = reflect24(init);

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ CRC_POLY_REFLECTED
            } else {
                crc >> 1
            };
        }
    }

    crc & 0xFF_FFFF
}

/// Bytes of `crc` in the order they are appended to the PDU
pub fn crc24_bytes(crc: u32) -> [u8; 3] {
    let bytes = crc.to_le_bytes();
    [bytes[0], bytes[1], bytes[2]]
}

fn reflect24(value: u32) -> u32 {
    (value & 0xFF_FFFF).reverse_bits() >> 8
}

/// Apply (or remove) data whitening of BLE channel `channel` to `data` in place
///
/// The whitening LFSR is x^7 + x^4 + 1, initialized with the channel index and bit 6 set, which
/// is the value the radio takes in `DATAWHITEIV`.
pub fn whiten(channel: u8, data: &mut [u8]) {
    let mut lfsr = channel | 0x40;

    for byte in data.iter_mut() {
        for bit in 0..8 {
            let out = lfsr & 1;
            lfsr >>= 1;
            if out != 0 {
                lfsr ^= 0x44;
            }
            *byte ^= out << bit;
        }
    }
}
