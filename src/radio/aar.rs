//! Resolution of private addresses with the AAR
//!
//! During reception the bit counter of the radio starts at the address match and fires after the
//! PDU header and the advertiser address are in RAM. The AAR then walks the configured IRKs
//! while the rest of the packet is still on air.

use super::pkt::PacketPtr;
use super::Radio;
use crate::error::Error;
use crate::fmt::debug;
use crate::hw::nrf52833::{aar as regs, radio};
use crate::hw::ppi::{mask, Fabric};
use crate::hw::Peripheral;

/// Header and address bits received before resolution may start
const RESOLVE_BITS: u32 = 64;

/// Bytes of scratch memory the AAR needs
const SCRATCH_LEN: usize = 3;

/// Device address laid out for a one-shot resolution
///
/// The AAR reads the address 3 bytes past its address pointer, where a received packet holds the
/// first payload byte.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct ArAddress {
    bytes: [u8; 9],
}

impl ArAddress {
    /// Wrap a device address, least significant byte first
    pub fn new(addr: [u8; 6]) -> Self {
        let mut bytes = [0; 9];
        bytes[3..].copy_from_slice(&addr);
        Self { bytes }
    }

    /// The wrapped device address
    pub fn addr(&self) -> &[u8] {
        &self.bytes[3..]
    }

    fn ptr(&self) -> u32 {
        PacketPtr::from_slice(&self.bytes).0
    }
}

impl<P: Peripheral, F: Fabric> Radio<P, F> {
    /// Resolve the address of every received packet against `irks`
    ///
    /// Must be called after [`set_packet_ptr`](Self::set_packet_ptr), the address is read from
    /// the packet buffer. `irks` and `scratch` must stay in place until reception ends.
    pub fn ar_configure(&mut self, irks: &[[u8; 16]], scratch: &mut [u8]) -> Result<(), Error> {
        if scratch.len() < SCRATCH_LEN {
            return Err(Error::TooSmallBuffer);
        }
        debug_assert!(!irks.is_empty() && irks.len() <= regs::MAX_IRKS);
        self.ar_status_reset();

        let aar = &self.ccm;
        aar.write(regs::ENABLE, regs::ENABLE_ENABLED);
        aar.write(regs::NIRK, irks.len() as u32);
        aar.write(regs::IRKPTR, irks.as_ptr() as usize as u32);
        // Packets in RAM have no S1 byte, the address follows S0 and length
        aar.write(
            regs::ADDRPTR,
            self.radio.read(radio::PACKETPTR).wrapping_sub(1),
        );
        aar.write(regs::SCRATCHPTR, PacketPtr::from_slice(scratch).0);

        self.radio.write(radio::BCC, RESOLVE_BITS);
        self.radio
            .set_bits(radio::SHORTS, radio::SHORTS_ADDRESS_BCSTART);
        self.connect(
            self.map.aar_start,
            self.radio.event(radio::EVENTS_BCMATCH),
            aar.task(regs::TASKS_START),
        );

        debug!("radio: resolving against {} irks", irks.len());
        Ok(())
    }

    /// Clear the result of the previous resolution and stop resolving on address match
    pub fn ar_status_reset(&mut self) {
        for event in [
            regs::EVENTS_END,
            regs::EVENTS_RESOLVED,
            regs::EVENTS_NOTRESOLVED,
        ] {
            self.ccm.clear(event);
        }
        self.ppi.disable(mask(self.map.aar_start));
    }

    /// Check if the address of the last received packet got resolved
    pub fn ar_has_match(&self) -> bool {
        self.radio.is_set(radio::EVENTS_BCMATCH)
            && self.ccm.is_set(regs::EVENTS_END)
            && self.ccm.is_set(regs::EVENTS_RESOLVED)
    }

    /// Index of the IRK that resolved the address
    pub fn ar_match_get(&self) -> u8 {
        self.ccm.read(regs::STATUS) as u8
    }

    /// Resolve `addr` now against the IRKs of the last [`ar_configure`](Self::ar_configure)
    ///
    /// Returns the index of the matching IRK. Busy-waits for the AAR, gives up with
    /// [`Error::Timeout`] after a bounded number of polls.
    pub fn ar_resolve(&mut self, addr: &ArAddress) -> Result<Option<u8>, Error> {
        let aar = &self.ccm;
        aar.write(regs::ENABLE, regs::ENABLE_ENABLED);
        for event in [
            regs::EVENTS_END,
            regs::EVENTS_RESOLVED,
            regs::EVENTS_NOTRESOLVED,
        ] {
            aar.clear(event);
        }
        aar.write(regs::ADDRPTR, addr.ptr());
        aar.trigger(regs::TASKS_START);

        let result = self.ccm_aar_wait(regs::EVENTS_END, regs::INTEN_END);
        let resolved = self.ccm.is_set(regs::EVENTS_RESOLVED);
        self.ccm.write(regs::ENABLE, 0);
        result?;

        Ok(resolved.then(|| self.ar_match_get()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{accepting_fabric, permit_setup, Mocks};
    use super::super::{Config, Direction, Phy};
    use super::*;
    use crate::hw::nrf52833::{CCM_AAR_BASE, RADIO_BASE};
    use crate::hw::ppi::traits::MockFabric;
    use crate::hw::{Event, Task};
    use crate::sim::{RxPacket, Sim};
    use mockall::predicate::*;

    #[test]
    fn test_address_layout() {
        let addr = ArAddress::new([1, 2, 3, 4, 5, 6]);
        assert_eq!(addr.addr(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(addr.bytes[..3], [0, 0, 0]);
    }

    #[test]
    fn test_configure_routes_bit_counter_to_aar() {
        let mocks = Mocks::new();
        let mut fabric = MockFabric::new();
        fabric
            .expect_bind()
            .with(
                eq(23),
                eq(Event(RADIO_BASE + 0x128)),
                eq(Task(CCM_AAR_BASE)),
            )
            .times(1)
            .return_const(());
        fabric
            .expect_enable()
            .with(eq(1 << 23))
            .times(1)
            .return_const(());
        permit_setup(&mut fabric);
        let mut radio = Radio::new(mocks.resources(), fabric, Config::default()).unwrap();

        let irks = [[0x11; 16], [0x22; 16]];
        let mut scratch = [0u8; 3];
        mocks.radio.write(0x504, 0x2000_0100);
        mocks.ccm.write(0x104, 1);

        assert_eq!(radio.ar_configure(&irks, &mut scratch), Ok(()));
        assert_eq!(mocks.ccm.read(0x500), 3);
        assert_eq!(mocks.ccm.read(0x504), 2);
        assert_eq!(mocks.ccm.read(0x510), 0x2000_00FF);
        assert_eq!(mocks.ccm.read(0x104), 0);
        assert_eq!(mocks.radio.read(0x560), 64);
        assert_eq!(mocks.radio.read(0x200) & 1 << 6, 1 << 6);
    }

    #[test]
    fn test_configure_rejects_small_scratch() {
        let mocks = Mocks::new();
        let mut radio = Radio::new(mocks.resources(), accepting_fabric(), Config::default())
            .unwrap();

        let mut scratch = [0u8; 2];
        assert_eq!(
            radio.ar_configure(&[[0; 16]], &mut scratch),
            Err(Error::TooSmallBuffer)
        );
    }

    #[test]
    fn test_match_requires_all_events() {
        let mocks = Mocks::new();
        let mut radio = Radio::new(mocks.resources(), accepting_fabric(), Config::default())
            .unwrap();

        mocks.ccm.write(0x100, 1);
        mocks.ccm.write(0x104, 1);
        assert!(!radio.ar_has_match());

        mocks.radio.write(0x128, 1);
        mocks.ccm.write(0x400, 5);
        assert!(radio.ar_has_match());
        assert_eq!(radio.ar_match_get(), 5);

        radio.ar_status_reset();
        assert!(!radio.ar_has_match());
    }

    #[test]
    fn test_resolve_times_out_without_aar() {
        let mocks = Mocks::new();
        let mut radio = Radio::new(mocks.resources(), accepting_fabric(), Config::default())
            .unwrap();

        let addr = ArAddress::new([1, 2, 3, 4, 5, 0x40]);
        assert_eq!(radio.ar_resolve(&addr), Err(Error::Timeout));
        assert_eq!(mocks.ccm.read(0x000), 1);
        assert_eq!(mocks.ccm.read(0x500), 0);
    }

    #[test]
    fn test_resolve_on_simulated_aar() {
        let sim = Sim::new();
        let mut radio = sim.radio(Config::default()).unwrap();
        let addr = ArAddress::new([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);

        assert_eq!(radio.ar_resolve(&addr), Ok(None));
        sim.set_aar_result(Some(2));
        assert_eq!(radio.ar_resolve(&addr), Ok(Some(2)));
    }

    #[test]
    fn test_resolution_during_reception() {
        let sim = Sim::new();
        let mut radio = sim.radio(Config::default()).unwrap();
        let irks = [[0u8; 16]; 4];
        let air = [0u8; 40];
        let mut scratch = [0u8; SCRATCH_LEN];

        radio.prepare();
        radio.set_phy(Phy::Le1M);
        radio.set_packet_ptr(PacketPtr::from_slice(&air));
        radio.switch_complete_and_disable();
        radio.ar_configure(&irks, &mut scratch).unwrap();

        sim.set_aar_result(Some(3));
        sim.inject_rx(RxPacket::new(40, 200));
        radio.tmr_start_now(Direction::Rx);
        sim.run_for_us(500);

        // 64 bits after the address match
        assert_eq!(
            sim.event_times(Event(RADIO_BASE + radio::EVENTS_BCMATCH)),
            [40_300 + 40_000 + 64_000]
        );
        assert!(radio.ar_has_match());
        assert_eq!(radio.ar_match_get(), 3);
    }
}
