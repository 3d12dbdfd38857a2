//! Direction finding: Constant Tone Extension and antenna switching
//!
//! The antenna switch pattern is a write-only FIFO. Every write appends one antenna id, the radio
//! walks the entries during the CTE:
//!
//! * entry 0 drives the antenna while the PDU is on air,
//! * entry 1 drives the reference period,
//! * the rest drive the switch slots.
//!
//! When the radio runs out of entries it keeps the last one, so the guard antenna is appended at
//! the end of every pattern.

use super::Radio;
use crate::error::Error;
use crate::fmt::trace;
use crate::hw::nrf52833::radio as regs;
use crate::hw::ppi::Fabric;
use crate::hw::Peripheral;

/// Antenna pins of the DFE
pub const ANTENNA_PINS: usize = 8;

/// Entries of a pattern not used for switch slots: PDU antenna, reference antenna and guard
const RESERVED_ENTRIES: usize = 3;

/// Direction finding method
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DfMode {
    /// Angle of arrival, the receiver switches antennas
    Aoa,
    /// Angle of departure, the transmitter switches antennas
    Aod,
}

/// Spacing of antenna switches
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchSpacing {
    /// 4 us between switches
    Us4 = 1,
    /// 2 us between switches
    Us2 = 2,
}

/// Spacing of IQ samples
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleSpacing {
    Us4 = 1,
    Us2 = 2,
    Us1 = 3,
    Ns500 = 4,
    Ns250 = 5,
    Ns125 = 6,
}

/// CTEInfo of the last received packet
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CteStatus {
    /// CTE length in 8 us units
    pub time: u8,
    /// 0 for AoA, 1 for AoD with 1 us slots, 2 for AoD with 2 us slots
    pub cte_type: u8,
}

impl<P: Peripheral, F: Fabric> Radio<P, F> {
    /// Parse CTEInfo of received packets and sample the CTE it announces
    ///
    /// `info_in_s1` selects data channel PDUs, carrying CTEInfo in S1. Advertising channel PDUs
    /// carry it in the extended header.
    pub fn df_configure_cte_inline(&mut self, info_in_s1: bool) {
        let mut conf = regs::CTEINLINECONF_ENABLE
            | regs::CTEINLINECONF_ERRORHANDLING
            // 4 us sample spacing in the switch slots on both uncoded PHYs
            | 1 << regs::CTEINLINECONF_RXMODE1US_POS
            | 1 << regs::CTEINLINECONF_RXMODE2US_POS;

        if info_in_s1 {
            // CP bit of the data channel header
            conf |= regs::CTEINLINECONF_CTEINFOINS1
                | 0x20 << regs::CTEINLINECONF_S0CONF_POS
                | 0x20 << regs::CTEINLINECONF_S0MASK_POS;
        }

        self.radio.write(regs::CTEINLINECONF, conf);
        self.radio
            .set_bits(regs::DFECTRL1, regs::DFECTRL1_DFEINEXTENSION);
        self.cte_inline = true;
    }

    /// Stop parsing CTEInfo
    pub fn df_cte_inline_disable(&mut self) {
        self.radio.write(regs::CTEINLINECONF, 0);
        self.cte_inline = false;
    }

    /// Check if CTEInfo parsing is enabled
    pub fn df_cte_inline_is_enabled(&self) -> bool {
        self.cte_inline
    }

    /// Select the direction finding method
    pub fn df_set_mode(&mut self, mode: DfMode) {
        let value = match mode {
            DfMode::Aoa => regs::DFEMODE_AOA,
            DfMode::Aod => regs::DFEMODE_AOD,
        };
        self.radio.write(regs::DFEMODE, value);
    }

    /// Turn direction finding off, disconnecting the antenna pins
    pub fn df_reset(&mut self) {
        self.radio.write(regs::DFEMODE, 0);
        self.df_cte_inline_disable();
        self.radio.write(regs::CLEARPATTERN, 1);
        self.df_ant_configure(&[None; ANTENNA_PINS]);
    }

    /// Set the antenna switch spacing
    pub fn df_set_switch_spacing(&mut self, spacing: SwitchSpacing) {
        self.set_dfectrl1_field(regs::DFECTRL1_TSWITCHSPACING_POS, 0b111, spacing as u32);
    }

    /// Set the IQ sample spacing in the reference period and in the switch slots
    pub fn df_set_sample_spacing(&mut self, reference: SampleSpacing, slots: SampleSpacing) {
        self.set_dfectrl1_field(regs::DFECTRL1_TSAMPLESPACINGREF_POS, 0b111, reference as u32);
        self.set_dfectrl1_field(regs::DFECTRL1_TSAMPLESPACING_POS, 0b111, slots as u32);
    }

    /// Set the CTE length of transmitted packets, in 8 us units
    pub fn df_set_cte_length(&mut self, units_8us: u8) {
        debug_assert!((2..=20).contains(&units_8us));
        self.set_dfectrl1_field(regs::DFECTRL1_NUMBEROF8US_POS, 0b11_1111, units_8us as u32);
    }

    /// Connect the antenna switch outputs to GPIO pins
    pub fn df_ant_configure(&mut self, pins: &[Option<u8>; ANTENNA_PINS]) {
        for (idx, pin) in pins.iter().enumerate() {
            let value = match pin {
                Some(pin) => *pin as u32,
                None => regs::PSEL_DISCONNECTED,
            };
            self.radio
                .write(regs::PSEL_DFEGPIO0 + 4 * idx as u32, value);
        }
    }

    /// Program the antenna switch pattern
    ///
    /// `pdu_antenna` is used while the PDU is on air, `guard_ref` in the reference period and
    /// after `sequence` runs out. Returns [`Error::PatternTooLong`] if the pattern does not fit in
    /// the hardware buffer, nothing is written then.
    pub fn df_program_switch_pattern(
        &mut self,
        pdu_antenna: u8,
        guard_ref: u8,
        sequence: &[u8],
    ) -> Result<(), Error> {
        if sequence.len() + RESERVED_ENTRIES > regs::SWITCHPATTERN_CAPACITY {
            return Err(Error::PatternTooLong);
        }

        self.radio.write(regs::CLEARPATTERN, 1);
        self.radio.write(regs::SWITCHPATTERN, pdu_antenna as u32);
        self.radio.write(regs::SWITCHPATTERN, guard_ref as u32);
        for antenna in sequence {
            self.radio.write(regs::SWITCHPATTERN, *antenna as u32);
        }
        self.radio.write(regs::SWITCHPATTERN, guard_ref as u32);

        trace!("radio: switch pattern of {} antennas", sequence.len());
        Ok(())
    }

    /// Store IQ samples of the next CTE in `buffer`
    ///
    /// The buffer must stay in place until the packet is received.
    pub fn df_iq_buffer_set(&mut self, buffer: &mut [u32]) {
        self.radio
            .write(regs::DFEPACKET_PTR, buffer.as_ptr() as usize as u32);
        self.radio
            .write(regs::DFEPACKET_MAXCNT, buffer.len() as u32);
    }

    /// Amount of IQ samples stored during the last CTE
    pub fn df_iq_samples_amount(&self) -> u16 {
        self.radio.read(regs::DFEPACKET_AMOUNT) as u16
    }

    /// Check if the last CTE took more samples than the `pattern_len` programmed switch slots
    ///
    /// Assumes one sample per slot. The caller extends or restarts the pattern when it is
    /// exhausted.
    pub fn df_pattern_exhausted(&self, pattern_len: usize) -> bool {
        self.df_iq_samples_amount() as usize > pattern_len
    }

    /// CTEInfo parsed from the last received packet
    pub fn df_cte_status(&self) -> CteStatus {
        let status = self.radio.read(regs::CTESTATUS);
        CteStatus {
            time: (status & 0x3F) as u8,
            cte_type: ((status >> 6) & 0b11) as u8,
        }
    }

    fn set_dfectrl1_field(&self, pos: u32, width_mask: u32, value: u32) {
        let current = self.radio.read(regs::DFECTRL1);
        self.radio.write(
            regs::DFECTRL1,
            (current & !(width_mask << pos)) | (value & width_mask) << pos,
        );
    }
}
