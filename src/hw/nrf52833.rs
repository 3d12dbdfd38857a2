//! nRF52833 register map
//!
//! Base addresses, register offsets and bit fields of the peripherals used by the radio engine.
//! Only the registers the engine touches are listed. Offsets are taken from the register blocks of
//! the PAC and field values from its enumerations, so the drivers can go through the
//! [`Peripheral`](super::Peripheral) seam while the layout stays the one of the device crate.

/// RADIO base address
pub const RADIO_BASE: u32 = 0x4000_1000;
/// TIMER0 base address
pub const TIMER0_BASE: u32 = 0x4000_8000;
/// TIMER1 base address
pub const TIMER1_BASE: u32 = 0x4000_9000;
/// TIMER2 base address
pub const TIMER2_BASE: u32 = 0x4000_A000;
/// TIMER3 base address
pub const TIMER3_BASE: u32 = 0x4001_A000;
/// TIMER4 base address
pub const TIMER4_BASE: u32 = 0x4001_B000;
/// CCM and AAR shared base address
pub const CCM_AAR_BASE: u32 = 0x4000_F000;
/// RTC0 base address
pub const RTC0_BASE: u32 = 0x4000_B000;
/// PPI base address
pub const PPI_BASE: u32 = 0x4001_F000;

/// Byte offset of the register `$field` in the PAC register block `$block`
macro_rules! offset {
    ($block:ty, $field:ident) => {
        ::core::mem::offset_of!($block, $field) as u32
    };
}

/// Distance between two elements of a PAC register array
macro_rules! stride {
    ($elem:ty) => {
        ::core::mem::size_of::<$elem>() as u32
    };
}

/// RADIO registers
#[allow(missing_docs)]
pub mod radio {
    use nrf52833_hal::pac::radio::{self as pac, RegisterBlock as Rb};

    pub const TASKS_TXEN: u32 = offset!(Rb, tasks_txen);
    pub const TASKS_RXEN: u32 = offset!(Rb, tasks_rxen);
    pub const TASKS_START: u32 = offset!(Rb, tasks_start);
    pub const TASKS_STOP: u32 = offset!(Rb, tasks_stop);
    pub const TASKS_DISABLE: u32 = offset!(Rb, tasks_disable);
    pub const TASKS_RSSISTART: u32 = offset!(Rb, tasks_rssistart);
    pub const TASKS_RSSISTOP: u32 = offset!(Rb, tasks_rssistop);
    pub const TASKS_BCSTART: u32 = offset!(Rb, tasks_bcstart);
    pub const TASKS_BCSTOP: u32 = offset!(Rb, tasks_bcstop);

    pub const EVENTS_READY: u32 = offset!(Rb, events_ready);
    pub const EVENTS_ADDRESS: u32 = offset!(Rb, events_address);
    pub const EVENTS_PAYLOAD: u32 = offset!(Rb, events_payload);
    pub const EVENTS_END: u32 = offset!(Rb, events_end);
    pub const EVENTS_DISABLED: u32 = offset!(Rb, events_disabled);
    pub const EVENTS_DEVMATCH: u32 = offset!(Rb, events_devmatch);
    pub const EVENTS_DEVMISS: u32 = offset!(Rb, events_devmiss);
    pub const EVENTS_RSSIEND: u32 = offset!(Rb, events_rssiend);
    pub const EVENTS_BCMATCH: u32 = offset!(Rb, events_bcmatch);
    pub const EVENTS_CRCOK: u32 = offset!(Rb, events_crcok);
    pub const EVENTS_CRCERROR: u32 = offset!(Rb, events_crcerror);
    pub const EVENTS_RATEBOOST: u32 = offset!(Rb, events_rateboost);
    pub const EVENTS_TXREADY: u32 = offset!(Rb, events_txready);
    pub const EVENTS_RXREADY: u32 = offset!(Rb, events_rxready);
    pub const EVENTS_PHYEND: u32 = offset!(Rb, events_phyend);
    pub const EVENTS_CTEPRESENT: u32 = offset!(Rb, events_ctepresent);

    pub const SHORTS: u32 = offset!(Rb, shorts);
    pub const INTENSET: u32 = offset!(Rb, intenset);
    pub const INTENCLR: u32 = offset!(Rb, intenclr);
    pub const CRCSTATUS: u32 = offset!(Rb, crcstatus);
    pub const RXMATCH: u32 = offset!(Rb, rxmatch);
    pub const RXCRC: u32 = offset!(Rb, rxcrc);
    pub const DAI: u32 = offset!(Rb, dai);
    pub const PDUSTAT: u32 = offset!(Rb, pdustat);
    pub const CTESTATUS: u32 = offset!(Rb, ctestatus);
    pub const DFESTATUS: u32 = offset!(Rb, dfestatus);
    pub const PACKETPTR: u32 = offset!(Rb, packetptr);
    pub const FREQUENCY: u32 = offset!(Rb, frequency);
    pub const TXPOWER: u32 = offset!(Rb, txpower);
    pub const MODE: u32 = offset!(Rb, mode);
    pub const PCNF0: u32 = offset!(Rb, pcnf0);
    pub const PCNF1: u32 = offset!(Rb, pcnf1);
    pub const BASE0: u32 = offset!(Rb, base0);
    pub const PREFIX0: u32 = offset!(Rb, prefix0);
    pub const TXADDRESS: u32 = offset!(Rb, txaddress);
    pub const RXADDRESSES: u32 = offset!(Rb, rxaddresses);
    pub const CRCCNF: u32 = offset!(Rb, crccnf);
    pub const CRCPOLY: u32 = offset!(Rb, crcpoly);
    pub const CRCINIT: u32 = offset!(Rb, crcinit);
    pub const TIFS: u32 = offset!(Rb, tifs);
    pub const RSSISAMPLE: u32 = offset!(Rb, rssisample);
    pub const STATE: u32 = offset!(Rb, state);
    pub const DATAWHITEIV: u32 = offset!(Rb, datawhiteiv);
    pub const BCC: u32 = offset!(Rb, bcc);
    pub const DAB0: u32 = offset!(Rb, dab);
    pub const DAP0: u32 = offset!(Rb, dap);
    pub const DACNF: u32 = offset!(Rb, dacnf);
    pub const MODECNF0: u32 = offset!(Rb, modecnf0);
    pub const CTEINLINECONF: u32 = offset!(Rb, cteinlineconf);
    pub const DFEMODE: u32 = offset!(Rb, dfemode);
    pub const DFECTRL1: u32 = offset!(Rb, dfectrl1);
    pub const DFECTRL2: u32 = offset!(Rb, dfectrl2);
    pub const SWITCHPATTERN: u32 = offset!(Rb, switchpattern);
    pub const CLEARPATTERN: u32 = offset!(Rb, clearpattern);
    pub const PSEL_DFEGPIO0: u32 = offset!(Rb, psel) + offset!(pac::PSEL, dfegpio);
    pub const DFEPACKET_PTR: u32 = offset!(Rb, dfepacket) + offset!(pac::DFEPACKET, ptr);
    pub const DFEPACKET_MAXCNT: u32 = offset!(Rb, dfepacket) + offset!(pac::DFEPACKET, maxcnt);
    pub const DFEPACKET_AMOUNT: u32 = offset!(Rb, dfepacket) + offset!(pac::DFEPACKET, amount);
    pub const POWER: u32 = offset!(Rb, power);

    pub const SHORTS_READY_START: u32 = 1 << 0;
    pub const SHORTS_END_DISABLE: u32 = 1 << 1;
    pub const SHORTS_DISABLED_TXEN: u32 = 1 << 2;
    pub const SHORTS_DISABLED_RXEN: u32 = 1 << 3;
    pub const SHORTS_ADDRESS_RSSISTART: u32 = 1 << 4;
    pub const SHORTS_END_START: u32 = 1 << 5;
    pub const SHORTS_ADDRESS_BCSTART: u32 = 1 << 6;
    pub const SHORTS_DISABLED_RSSISTOP: u32 = 1 << 8;
    pub const SHORTS_PHYEND_DISABLE: u32 = 1 << 20;

    pub const INTEN_DISABLED: u32 = 1 << 4;

    pub const MODE_BLE_1MBIT: u32 = pac::mode::MODE_A::BLE_1MBIT as u32;
    pub const MODE_BLE_2MBIT: u32 = pac::mode::MODE_A::BLE_2MBIT as u32;
    pub const MODE_BLE_LR125KBIT: u32 = pac::mode::MODE_A::BLE_LR125KBIT as u32;
    pub const MODE_BLE_LR500KBIT: u32 = pac::mode::MODE_A::BLE_LR500KBIT as u32;

    pub const PCNF0_LFLEN_POS: u32 = 0;
    pub const PCNF0_S0LEN_POS: u32 = 8;
    pub const PCNF0_S1LEN_POS: u32 = 16;
    pub const PCNF0_S1INCL_POS: u32 = 20;
    pub const PCNF0_CILEN_POS: u32 = 22;
    pub const PCNF0_PLEN_POS: u32 = 24;
    pub const PCNF0_CRCINC_POS: u32 = 26;
    pub const PCNF0_TERMLEN_POS: u32 = 29;
    pub const PCNF0_PLEN_8BIT: u32 = pac::pcnf0::PLEN_A::_8BIT as u32;
    pub const PCNF0_PLEN_16BIT: u32 = pac::pcnf0::PLEN_A::_16BIT as u32;
    pub const PCNF0_PLEN_LONG_RANGE: u32 = pac::pcnf0::PLEN_A::LONG_RANGE as u32;

    pub const PCNF1_MAXLEN_POS: u32 = 0;
    pub const PCNF1_STATLEN_POS: u32 = 8;
    pub const PCNF1_BALEN_POS: u32 = 16;
    pub const PCNF1_ENDIAN_POS: u32 = 24;
    pub const PCNF1_WHITEEN_POS: u32 = 25;

    pub const CRCCNF_LEN_POS: u32 = 0;
    pub const CRCCNF_SKIPADDR_POS: u32 = 8;
    pub const CRCCNF_SKIPADDR_SKIP: u32 = pac::crccnf::SKIPADDR_A::SKIP as u32;

    pub const MODECNF0_RU_FAST: u32 = pac::modecnf0::RU_A::FAST as u32;
    pub const MODECNF0_DTX_CENTER: u32 = (pac::modecnf0::DTX_A::CENTER as u32) << 8;

    pub const DACNF_TXADD_POS: u32 = 8;

    pub const CTEINLINECONF_ENABLE: u32 = pac::cteinlineconf::CTEINLINECTRLEN_A::ENABLED as u32;
    pub const CTEINLINECONF_CTEINFOINS1: u32 =
        (pac::cteinlineconf::CTEINFOINS1_A::IN_S1 as u32) << 3;
    pub const CTEINLINECONF_ERRORHANDLING: u32 =
        (pac::cteinlineconf::CTEERRORHANDLING_A::YES as u32) << 4;
    pub const CTEINLINECONF_CTETIMEVALIDRANGE_POS: u32 = 6;
    pub const CTEINLINECONF_RXMODE1US_POS: u32 = 10;
    pub const CTEINLINECONF_RXMODE2US_POS: u32 = 13;
    pub const CTEINLINECONF_S0CONF_POS: u32 = 16;
    pub const CTEINLINECONF_S0MASK_POS: u32 = 24;

    pub const DFEMODE_AOD: u32 = pac::dfemode::DFEOPMODE_A::AO_D as u32;
    pub const DFEMODE_AOA: u32 = pac::dfemode::DFEOPMODE_A::AO_A as u32;

    pub const DFECTRL1_NUMBEROF8US_POS: u32 = 0;
    pub const DFECTRL1_DFEINEXTENSION: u32 = (pac::dfectrl1::DFEINEXTENSION_A::CRC as u32) << 7;
    pub const DFECTRL1_TSWITCHSPACING_POS: u32 = 8;
    pub const DFECTRL1_TSAMPLESPACINGREF_POS: u32 = 12;
    pub const DFECTRL1_TSAMPLESPACING_POS: u32 = 16;

    pub const PSEL_DISCONNECTED: u32 = 1 << 31;

    /// Entries of the SWITCHPATTERN buffer
    pub const SWITCHPATTERN_CAPACITY: usize = 40;

    pub const STATE_DISABLED: u32 = pac::state::STATE_A::DISABLED as u32;
    pub const STATE_RXRU: u32 = pac::state::STATE_A::RX_RU as u32;
    pub const STATE_RXIDLE: u32 = pac::state::STATE_A::RX_IDLE as u32;
    pub const STATE_RX: u32 = pac::state::STATE_A::RX as u32;
    pub const STATE_RXDISABLE: u32 = pac::state::STATE_A::RX_DISABLE as u32;
    pub const STATE_TXRU: u32 = pac::state::STATE_A::TX_RU as u32;
    pub const STATE_TXIDLE: u32 = pac::state::STATE_A::TX_IDLE as u32;
    pub const STATE_TX: u32 = pac::state::STATE_A::TX as u32;
    pub const STATE_TXDISABLE: u32 = pac::state::STATE_A::TX_DISABLE as u32;
}

/// TIMER registers
#[allow(missing_docs)]
pub mod timer {
    use nrf52833_hal::pac::timer0::{self as pac, RegisterBlock as Rb};

    pub const TASKS_START: u32 = offset!(Rb, tasks_start);
    pub const TASKS_STOP: u32 = offset!(Rb, tasks_stop);
    pub const TASKS_CLEAR: u32 = offset!(Rb, tasks_clear);
    pub const TASKS_SHUTDOWN: u32 = offset!(Rb, tasks_shutdown);
    pub const TASKS_CAPTURE0: u32 = offset!(Rb, tasks_capture);
    pub const EVENTS_COMPARE0: u32 = offset!(Rb, events_compare);
    pub const SHORTS: u32 = offset!(Rb, shorts);
    pub const INTENSET: u32 = offset!(Rb, intenset);
    pub const INTENCLR: u32 = offset!(Rb, intenclr);
    pub const MODE: u32 = offset!(Rb, mode);
    pub const BITMODE: u32 = offset!(Rb, bitmode);
    pub const PRESCALER: u32 = offset!(Rb, prescaler);
    pub const CC0: u32 = offset!(Rb, cc);

    pub const MODE_TIMER: u32 = pac::mode::MODE_A::TIMER as u32;
    pub const BITMODE_32BIT: u32 = pac::bitmode::BITMODE_A::_32BIT as u32;
    /// 16 MHz / 2^4 gives microsecond ticks
    pub const PRESCALER_1MHZ: u32 = 4;
    /// TIMER0..TIMER2 have four compare registers, TIMER3 and TIMER4 have six
    pub const MAX_CC: usize = 6;
}

/// RTC registers used as tick events
#[allow(missing_docs)]
pub mod rtc {
    use nrf52833_hal::pac::rtc0::RegisterBlock as Rb;

    pub const EVENTS_COMPARE0: u32 = offset!(Rb, events_compare);
}

/// PPI registers
#[allow(missing_docs)]
pub mod ppi {
    use nrf52833_hal::pac::ppi::{RegisterBlock as Rb, CH, CHG, FORK, TASKS_CHG};

    pub const TASKS_CHG0_EN: u32 = offset!(Rb, tasks_chg) + offset!(TASKS_CHG, en);
    pub const TASKS_CHG0_DIS: u32 = offset!(Rb, tasks_chg) + offset!(TASKS_CHG, dis);
    pub const CHEN: u32 = offset!(Rb, chen);
    pub const CHENSET: u32 = offset!(Rb, chenset);
    pub const CHENCLR: u32 = offset!(Rb, chenclr);
    pub const CH0_EEP: u32 = offset!(Rb, ch) + offset!(CH, eep);
    pub const CH0_TEP: u32 = offset!(Rb, ch) + offset!(CH, tep);
    pub const CHG0: u32 = offset!(Rb, chg);
    pub const FORK0_TEP: u32 = offset!(Rb, fork) + offset!(FORK, tep);

    /// Total channels, programmable ones followed by pre-programmed ones
    pub const NUM_CHANNELS: u8 = 32;
    /// Channels with writable EEP and TEP
    pub const NUM_PROGRAMMABLE: u8 = 20;
    pub const NUM_GROUPS: u8 = 6;

    pub const fn chg_en(group: u8) -> u32 {
        TASKS_CHG0_EN + stride!(TASKS_CHG) * group as u32
    }

    pub const fn chg_dis(group: u8) -> u32 {
        TASKS_CHG0_DIS + stride!(TASKS_CHG) * group as u32
    }

    pub const fn eep(channel: u8) -> u32 {
        CH0_EEP + stride!(CH) * channel as u32
    }

    pub const fn tep(channel: u8) -> u32 {
        CH0_TEP + stride!(CH) * channel as u32
    }

    pub const fn chg(group: u8) -> u32 {
        CHG0 + stride!(CHG) * group as u32
    }

    pub const fn fork_tep(channel: u8) -> u32 {
        FORK0_TEP + stride!(FORK) * channel as u32
    }
}

/// CCM registers
#[allow(missing_docs)]
pub mod ccm {
    use nrf52833_hal::pac::ccm::{self as pac, RegisterBlock as Rb};

    pub const TASKS_KSGEN: u32 = offset!(Rb, tasks_ksgen);
    pub const TASKS_CRYPT: u32 = offset!(Rb, tasks_crypt);
    pub const TASKS_STOP: u32 = offset!(Rb, tasks_stop);
    pub const TASKS_RATEOVERRIDE: u32 = offset!(Rb, tasks_rateoverride);
    pub const EVENTS_ENDKSGEN: u32 = offset!(Rb, events_endksgen);
    pub const EVENTS_ENDCRYPT: u32 = offset!(Rb, events_endcrypt);
    pub const EVENTS_ERROR: u32 = offset!(Rb, events_error);
    pub const SHORTS: u32 = offset!(Rb, shorts);
    pub const INTENSET: u32 = offset!(Rb, intenset);
    pub const INTENCLR: u32 = offset!(Rb, intenclr);
    pub const MICSTATUS: u32 = offset!(Rb, micstatus);
    pub const ENABLE: u32 = offset!(Rb, enable);
    pub const MODE: u32 = offset!(Rb, mode);
    pub const CNFPTR: u32 = offset!(Rb, cnfptr);
    pub const INPTR: u32 = offset!(Rb, inptr);
    pub const OUTPTR: u32 = offset!(Rb, outptr);
    pub const SCRATCHPTR: u32 = offset!(Rb, scratchptr);
    pub const MAXPACKETSIZE: u32 = offset!(Rb, maxpacketsize);
    pub const RATEOVERRIDE: u32 = offset!(Rb, rateoverride);

    pub const ENABLE_ENABLED: u32 = pac::enable::ENABLE_A::ENABLED as u32;
    pub const SHORTS_ENDKSGEN_CRYPT: u32 = 1 << 0;
    pub const INTEN_ENDCRYPT: u32 = 1 << 1;
    pub const MODE_DECRYPTION: u32 = pac::mode::MODE_A::DECRYPTION as u32;
    pub const MODE_DATARATE_POS: u32 = 16;
    pub const MODE_LENGTH_EXTENDED: u32 = (pac::mode::LENGTH_A::EXTENDED as u32) << 24;
    pub const DATARATE_1MBIT: u32 = pac::mode::DATARATE_A::_1MBIT as u32;
    pub const DATARATE_2MBIT: u32 = pac::mode::DATARATE_A::_2MBIT as u32;
    pub const DATARATE_125KBPS: u32 = pac::mode::DATARATE_A::_125KBPS as u32;
    pub const DATARATE_500KBPS: u32 = pac::mode::DATARATE_A::_500KBPS as u32;
    pub const RATEOVERRIDE_500KBPS: u32 = pac::rateoverride::RATEOVERRIDE_A::_500KBPS as u32;
}

/// AAR registers, sharing the register block of CCM
#[allow(missing_docs)]
pub mod aar {
    use nrf52833_hal::pac::aar::{self as pac, RegisterBlock as Rb};

    pub const TASKS_START: u32 = offset!(Rb, tasks_start);
    pub const TASKS_STOP: u32 = offset!(Rb, tasks_stop);
    pub const EVENTS_END: u32 = offset!(Rb, events_end);
    pub const EVENTS_RESOLVED: u32 = offset!(Rb, events_resolved);
    pub const EVENTS_NOTRESOLVED: u32 = offset!(Rb, events_notresolved);
    pub const INTENSET: u32 = offset!(Rb, intenset);
    pub const INTENCLR: u32 = offset!(Rb, intenclr);
    pub const STATUS: u32 = offset!(Rb, status);
    pub const ENABLE: u32 = offset!(Rb, enable);
    pub const NIRK: u32 = offset!(Rb, nirk);
    pub const IRKPTR: u32 = offset!(Rb, irkptr);
    pub const ADDRPTR: u32 = offset!(Rb, addrptr);
    pub const SCRATCHPTR: u32 = offset!(Rb, scratchptr);

    pub const ENABLE_ENABLED: u32 = pac::enable::ENABLE_A::ENABLED as u32;
    pub const INTEN_END: u32 = 1 << 0;
    /// Largest number of IRKs the AAR can walk in one run
    pub const MAX_IRKS: usize = 16;
}

/// Pre-programmed PPI channels 20..=31 as `(EEP, TEP)` bus addresses
pub const PREPROGRAMMED_CHANNELS: [(u32, u32); 12] = [
    (TIMER0_BASE + timer::EVENTS_COMPARE0, RADIO_BASE + radio::TASKS_TXEN),
    (TIMER0_BASE + timer::EVENTS_COMPARE0, RADIO_BASE + radio::TASKS_RXEN),
    (TIMER0_BASE + timer::EVENTS_COMPARE0 + 4, RADIO_BASE + radio::TASKS_DISABLE),
    (RADIO_BASE + radio::EVENTS_BCMATCH, CCM_AAR_BASE + aar::TASKS_START),
    (RADIO_BASE + radio::EVENTS_READY, CCM_AAR_BASE + ccm::TASKS_KSGEN),
    (RADIO_BASE + radio::EVENTS_ADDRESS, CCM_AAR_BASE + ccm::TASKS_CRYPT),
    (RADIO_BASE + radio::EVENTS_ADDRESS, TIMER0_BASE + timer::TASKS_CAPTURE0 + 4),
    (RADIO_BASE + radio::EVENTS_END, TIMER0_BASE + timer::TASKS_CAPTURE0 + 8),
    (RTC0_BASE + rtc::EVENTS_COMPARE0, RADIO_BASE + radio::TASKS_TXEN),
    (RTC0_BASE + rtc::EVENTS_COMPARE0, RADIO_BASE + radio::TASKS_RXEN),
    (RTC0_BASE + rtc::EVENTS_COMPARE0, TIMER0_BASE + timer::TASKS_CLEAR),
    (RTC0_BASE + rtc::EVENTS_COMPARE0, TIMER0_BASE + timer::TASKS_START),
];

/// Route of a pre-programmed channel, `None` for programmable channels
pub fn preprogrammed_route(channel: u8) -> Option<(u32, u32)> {
    channel
        .checked_sub(ppi::NUM_PROGRAMMABLE)
        .and_then(|idx| PREPROGRAMMED_CHANNELS.get(idx as usize))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprogrammed_route_lookup() {
        assert_eq!(preprogrammed_route(0), None);
        assert_eq!(preprogrammed_route(19), None);
        assert_eq!(
            preprogrammed_route(20),
            Some((0x4000_8140, 0x4000_1000))
        );
        assert_eq!(
            preprogrammed_route(22),
            Some((0x4000_8144, 0x4000_1010))
        );
        assert_eq!(
            preprogrammed_route(26),
            Some((0x4000_1104, 0x4000_8044))
        );
        assert_eq!(
            preprogrammed_route(27),
            Some((0x4000_110C, 0x4000_8048))
        );
        assert_eq!(preprogrammed_route(32), None);
    }

    #[test]
    fn test_bases_match_device_crate() {
        use nrf52833_hal::pac;

        assert_eq!(RADIO_BASE, pac::RADIO::PTR as u32);
        assert_eq!(TIMER0_BASE, pac::TIMER0::PTR as u32);
        assert_eq!(TIMER1_BASE, pac::TIMER1::PTR as u32);
        assert_eq!(TIMER2_BASE, pac::TIMER2::PTR as u32);
        assert_eq!(TIMER3_BASE, pac::TIMER3::PTR as u32);
        assert_eq!(TIMER4_BASE, pac::TIMER4::PTR as u32);
        assert_eq!(RTC0_BASE, pac::RTC0::PTR as u32);
        assert_eq!(PPI_BASE, pac::PPI::PTR as u32);
        assert_eq!(CCM_AAR_BASE, pac::CCM::PTR as u32);
        assert_eq!(CCM_AAR_BASE, pac::AAR::PTR as u32);
    }

    #[test]
    fn test_radio_register_layout() {
        assert_eq!(radio::EVENTS_BCMATCH, 0x128);
        assert_eq!(radio::EVENTS_PHYEND, 0x16C);
        assert_eq!(radio::CTESTATUS, 0x44C);
        assert_eq!(radio::DFESTATUS, 0x458);
        assert_eq!(radio::DFEMODE, 0x900);
        assert_eq!(radio::CTEINLINECONF, 0x904);
        assert_eq!(radio::PSEL_DFEGPIO0, 0x930);
        assert_eq!(radio::DFEPACKET_AMOUNT, 0x958);
        assert_eq!(radio::MODECNF0_DTX_CENTER, 2 << 8);
        assert_eq!(radio::STATE_TXRU, 9);
        assert_eq!(ccm::ENABLE_ENABLED, 2);
        assert_eq!(aar::ENABLE_ENABLED, 3);
    }

    #[test]
    fn test_ppi_register_layout() {
        assert_eq!(ppi::chg_en(1), 0x008);
        assert_eq!(ppi::chg_dis(1), 0x00C);
        assert_eq!(ppi::eep(19), 0x5A8);
        assert_eq!(ppi::tep(19), 0x5AC);
        assert_eq!(ppi::chg(5), 0x814);
        assert_eq!(ppi::fork_tep(31), 0x98C);
    }
}
