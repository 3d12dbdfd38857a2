//! Device address filter
//!
//! The radio compares the address field of received packets against up to eight device
//! addresses and reports the index of the matching one.

use super::Radio;
use crate::hw::nrf52833::radio as regs;
use crate::hw::ppi::Fabric;
use crate::hw::Peripheral;

/// Device addresses the filter holds
pub const FILTER_SIZE: usize = 8;

impl<P: Peripheral, F: Fabric> Radio<P, F> {
    /// Match received packets against `addrs`
    ///
    /// Bit n of `enable_mask` enables `addrs[n]`, bit n of `type_mask` marks it as a random
    /// address.
    pub fn filter_configure(&mut self, enable_mask: u8, type_mask: u8, addrs: &[[u8; 6]]) {
        debug_assert!(addrs.len() <= FILTER_SIZE);

        for (idx, addr) in addrs.iter().enumerate() {
            let offset = 4 * idx as u32;
            let base = u32::from_le_bytes([addr[0], addr[1], addr[2], addr[3]]);
            let prefix = u16::from_le_bytes([addr[4], addr[5]]);

            self.radio.write(regs::DAB0 + offset, base);
            self.radio.write(regs::DAP0 + offset, prefix as u32);
        }

        self.radio.write(
            regs::DACNF,
            (type_mask as u32) << regs::DACNF_TXADD_POS | enable_mask as u32,
        );
    }

    /// Stop matching device addresses
    pub fn filter_disable(&mut self) {
        self.radio.clear_bits(regs::DACNF, 0xFF);
    }

    /// Clear the match result of the previous packet
    pub fn filter_status_reset(&mut self) {
        self.radio.clear(regs::EVENTS_DEVMATCH);
        self.radio.clear(regs::EVENTS_DEVMISS);
    }

    /// Check if the last received packet matched an enabled device address
    pub fn filter_has_match(&self) -> bool {
        self.radio.is_set(regs::EVENTS_DEVMATCH)
    }

    /// Index of the device address that matched
    pub fn filter_match_get(&self) -> u8 {
        self.radio.read(regs::DAI) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{permissive_fabric, Mocks};
    use super::super::Config;
    use super::*;

    #[test]
    fn test_configure_writes_addresses() {
        let mocks = Mocks::new();
        let mut radio =
            Radio::new(mocks.resources(), permissive_fabric(), Config::default()).unwrap();

        let addrs = [
            [0x01, 0x02, 0x03, 0x04, 0x05, 0x06],
            [0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0xC6],
        ];
        radio.filter_configure(0b11, 0b10, &addrs);

        assert_eq!(mocks.radio.read(0x600), 0x0403_0201);
        assert_eq!(mocks.radio.read(0x620), 0x0605);
        assert_eq!(mocks.radio.read(0x604), 0xA4A3_A2A1);
        assert_eq!(mocks.radio.read(0x624), 0xC6A5);
        assert_eq!(mocks.radio.read(0x640), 0b10 << 8 | 0b11);

        radio.filter_disable();
        assert_eq!(mocks.radio.read(0x640), 0b10 << 8);
    }

    #[test]
    fn test_match_status() {
        let mocks = Mocks::new();
        let mut radio =
            Radio::new(mocks.resources(), permissive_fabric(), Config::default()).unwrap();

        assert!(!radio.filter_has_match());
        mocks.radio.write(0x114, 1);
        mocks.radio.write(0x118, 1);
        mocks.radio.write(0x410, 6);
        assert!(radio.filter_has_match());
        assert_eq!(radio.filter_match_get(), 6);

        radio.filter_status_reset();
        assert!(!radio.filter_has_match());
        assert_eq!(mocks.radio.read(0x118), 0);
    }
}
