//! On-the-fly encryption and decryption of packets with CCM
//!
//! Decryption runs while the packet is received: the key stream is generated right away, the
//! decryption itself starts on the address match, when the radio begins writing the encrypted
//! packet to RAM. Encryption runs before the transmission starts and is done long before the radio
//! reads the payload.

use super::pkt::{PacketFormat, PacketPtr, PduType};
use super::timing::Phy;
use super::{PollMode, Radio};
use crate::error::Error;
use crate::fmt::{trace, warn};
use crate::hw::nrf52833::{ccm as regs, radio};
use crate::hw::ppi::{mask, Fabric};
use crate::hw::Peripheral;

use nrf52833_hal::pac;

/// Polls of a CCM or AAR completion event before giving up
///
/// Decryption of the longest packet on LE Coded takes about 17 ms, each poll takes more than
/// 2 us while spinning.
pub(super) const POLL_ATTEMPTS: u32 = 10_000;

/// Bits received after the address match before delayed decryption starts
///
/// Header and CTEInfo are in RAM by then.
const CRYPT_DELAY_BITS: u32 = 24;

/// Smallest scratch area the CCM accepts
const SCRATCH_MIN: usize = 43;

/// S0, length and S1 bytes preceding the payload in RAM
const HEADER_LEN: usize = 3;

/// Key, nonce and direction of an encrypted link as read by the CCM
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct CcmData {
    /// Session key, least significant byte first
    pub key: [u8; 16],
    /// 39 bit packet counter, little endian
    pub counter: [u8; 8],
    /// 1 when the central transmits
    pub direction: u8,
    /// Initialization vector
    pub iv: [u8; 8],
}

impl CcmData {
    /// Set the packet counter
    pub fn set_counter(&mut self, counter: u64) {
        self.counter = (counter & ((1 << 39) - 1)).to_le_bytes();
    }

    /// Advance the packet counter after a packet got through
    pub fn increment_counter(&mut self) {
        let counter = u64::from_le_bytes(self.counter);
        self.set_counter(counter.wrapping_add(1));
    }
}

impl<P: Peripheral, F: Fabric> Radio<P, F> {
    /// Arm decryption of the next received packet
    ///
    /// The radio receives into `air`, the CCM writes the decrypted packet to `out`. `scratch` must
    /// hold at least 43 bytes and 16 bytes more than the longest payload. Returns the pointer to
    /// pass to [`set_packet_ptr`](Self::set_packet_ptr). All buffers must stay in place until the
    /// packet is received.
    pub fn ccm_rx_arm(
        &mut self,
        cnf: &CcmData,
        format: &PacketFormat,
        air: &mut [u8],
        out: &mut [u8],
        scratch: &mut [u8],
    ) -> Result<PacketPtr, Error> {
        let max_len = format.max_len as usize;
        if air.len() < HEADER_LEN + max_len
            || out.len() < HEADER_LEN + max_len
            || scratch.len() < SCRATCH_MIN.max(16 + max_len)
        {
            return Err(Error::TooSmallBuffer);
        }

        let ccm = &self.ccm;
        ccm.write(regs::ENABLE, regs::ENABLE_ENABLED);
        ccm.write(regs::MODE, regs::MODE_DECRYPTION | ccm_mode(format));
        ccm.write(regs::MAXPACKETSIZE, max_len as u32);
        ccm.write(regs::CNFPTR, cnf as *const CcmData as usize as u32);
        ccm.write(regs::INPTR, PacketPtr::from_slice(air).0);
        ccm.write(regs::OUTPTR, PacketPtr::from_slice(out).0);
        ccm.write(regs::SCRATCHPTR, PacketPtr::from_slice(scratch).0);
        ccm.write(regs::SHORTS, 0);
        self.ccm_clear_events();

        let map = self.map;
        if format.phy.is_coded() {
            // The payload of S2 packets is decrypted at 500 kbps after the rate boost
            ccm.write(regs::RATEOVERRIDE, regs::RATEOVERRIDE_500KBPS);
            self.connect(
                map.ccm_rate_override,
                self.radio.event(radio::EVENTS_RATEBOOST),
                ccm.task(regs::TASKS_RATEOVERRIDE),
            );
        }

        if format.cte_inline && format.pdu_type == PduType::DataChannel {
            self.radio.write(radio::BCC, CRYPT_DELAY_BITS);
            self.radio
                .set_bits(radio::SHORTS, radio::SHORTS_ADDRESS_BCSTART);
            self.connect(
                map.ccm_crypt_delayed,
                self.radio.event(radio::EVENTS_BCMATCH),
                ccm.task(regs::TASKS_CRYPT),
            );
        } else {
            self.connect(
                map.ccm_crypt,
                self.radio.event(radio::EVENTS_ADDRESS),
                ccm.task(regs::TASKS_CRYPT),
            );
        }

        ccm.trigger(regs::TASKS_KSGEN);
        trace!("radio: ccm rx armed, max len {}", max_len);

        Ok(PacketPtr::from_slice(air))
    }

    /// Encrypt `input` into `air` before the next transmission laid out as `format`
    ///
    /// Returns the pointer to pass to [`set_packet_ptr`](Self::set_packet_ptr).
    pub fn ccm_tx_arm(
        &mut self,
        cnf: &CcmData,
        format: &PacketFormat,
        input: &[u8],
        air: &mut [u8],
        scratch: &mut [u8],
    ) -> Result<PacketPtr, Error> {
        let payload = *input.get(1).ok_or(Error::TooSmallBuffer)? as usize;
        if payload > format.max_len as usize
            || input.len() < HEADER_LEN + payload
            || air.len() < HEADER_LEN + payload + 4
            || scratch.len() < SCRATCH_MIN.max(16 + payload + 4)
        {
            return Err(Error::TooSmallBuffer);
        }

        let ccm = &self.ccm;
        ccm.write(regs::ENABLE, regs::ENABLE_ENABLED);
        ccm.write(regs::MODE, ccm_mode(format));
        ccm.write(regs::CNFPTR, cnf as *const CcmData as usize as u32);
        ccm.write(regs::INPTR, PacketPtr::from_slice(input).0);
        ccm.write(regs::OUTPTR, PacketPtr::from_slice(air).0);
        ccm.write(regs::SCRATCHPTR, PacketPtr::from_slice(scratch).0);
        ccm.write(regs::SHORTS, regs::SHORTS_ENDKSGEN_CRYPT);
        self.ccm_clear_events();

        ccm.trigger(regs::TASKS_KSGEN);

        Ok(PacketPtr::from_slice(air))
    }

    /// Wait for the armed encryption or decryption to complete
    ///
    /// Returns `false` if the CCM reported an error. Gives up with [`Error::Timeout`] after a
    /// bounded number of polls.
    pub fn ccm_is_done(&mut self) -> Result<bool, Error> {
        self.ccm_aar_wait(regs::EVENTS_ENDCRYPT, regs::INTEN_ENDCRYPT)?;
        self.ccm.clear(regs::EVENTS_ENDCRYPT);

        Ok(!self.ccm.is_set(regs::EVENTS_ERROR))
    }

    /// Check the MIC of the last decrypted packet
    pub fn ccm_mic_is_valid(&self) -> bool {
        self.ccm.read(regs::MICSTATUS) & 1 != 0
    }

    /// Stop and disable the CCM, releasing its channels
    pub fn ccm_disable(&mut self) {
        self.ccm.trigger(regs::TASKS_STOP);
        self.ccm.write(regs::SHORTS, 0);
        self.ccm.write(regs::ENABLE, 0);

        let map = self.map;
        self.ppi.disable(
            mask(map.ccm_crypt) | mask(map.ccm_crypt_delayed) | mask(map.ccm_rate_override),
        );
    }

    /// Busy-wait until `event` of the CCM/AAR block is set
    pub(super) fn ccm_aar_wait(&self, event: u32, inten: u32) -> Result<(), Error> {
        let sleep = self.config.poll == PollMode::Sleep;
        if sleep {
            // Only the pending flag is used to wake up, the interrupt stays disabled in the NVIC
            self.ccm.write(regs::INTENSET, inten);
        }

        let mut result = Err(Error::Timeout);
        for _ in 0..POLL_ATTEMPTS {
            if self.ccm.is_set(event) {
                result = Ok(());
                break;
            }

            if sleep {
                cortex_m::asm::wfe();
            } else {
                core::hint::spin_loop();
            }
        }

        if sleep {
            self.ccm.write(regs::INTENCLR, inten);
            cortex_m::peripheral::NVIC::unpend(pac::Interrupt::CCM_AAR);
        }

        if result.is_err() {
            warn!("radio: ccm/aar event {} timed out", event);
        }
        result
    }

    fn ccm_clear_events(&self) {
        for event in [regs::EVENTS_ENDKSGEN, regs::EVENTS_ENDCRYPT, regs::EVENTS_ERROR] {
            self.ccm.clear(event);
        }
    }
}

/// Data rate and length field mode for packets laid out as `format`
fn ccm_mode(format: &PacketFormat) -> u32 {
    let datarate = match format.phy {
        Phy::Le1M => regs::DATARATE_1MBIT,
        Phy::Le2M => regs::DATARATE_2MBIT,
        Phy::CodedS2 | Phy::CodedS8 => regs::DATARATE_125KBPS,
    };
    let length = if format.max_len > 27 {
        regs::MODE_LENGTH_EXTENDED
    } else {
        0
    };

    datarate << regs::MODE_DATARATE_POS | length
}
