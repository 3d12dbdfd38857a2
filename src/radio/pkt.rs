//! PHY, packet format, addressing and CRC configuration
//!
//! Everything here is plain register configuration applied before the radio is enabled. It is
//! always safe to apply again.

use super::timing::Phy;
use super::Radio;
use crate::error::Error;
use crate::fmt::trace;
use crate::hw::nrf52833::radio as regs;
use crate::hw::ppi::Fabric;
use crate::hw::Peripheral;

/// Kind of PDU carried by the packet
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PduType {
    /// Advertising physical channel PDU
    Advertising,
    /// Data physical channel PDU of an ACL connection
    DataChannel,
    /// Isochronous physical channel PDU
    Isochronous,
}

/// On-air packet layout
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketFormat {
    /// Width of the length field in bits
    pub length_bits: u8,
    /// Largest payload accepted, in bytes
    pub max_len: u8,
    /// Kind of PDU
    pub pdu_type: PduType,
    /// PHY the packet is sent on
    pub phy: Phy,
    /// Constant Tone Extension inline parsing is enabled
    pub cte_inline: bool,
}

/// Layout of the S1 field derived from the packet format
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct S1Layout {
    /// Bits of S1 on air
    pub bits: u8,
    /// S1 has a byte in RAM even when it has no bits on air
    pub include_in_ram: bool,
}

impl PacketFormat {
    /// S1 holds the RFU bits after a short length field of data channel PDUs. With CTE inline
    /// parsing on a data channel, the CTEInfo byte is stored in the RAM byte of S1. Advertising
    /// PDUs carry CTEInfo in the extended header, so their S1 stays empty.
    pub(crate) fn s1_layout(&self) -> S1Layout {
        match self.pdu_type {
            PduType::DataChannel if self.cte_inline => {
                debug_assert_eq!(self.length_bits, 8);
                S1Layout {
                    bits: 0,
                    include_in_ram: true,
                }
            }
            PduType::DataChannel if self.length_bits < 8 => S1Layout {
                bits: 8 - self.length_bits,
                include_in_ram: false,
            },
            PduType::Isochronous => {
                debug_assert!(!self.cte_inline);
                S1Layout {
                    bits: 0,
                    include_in_ram: false,
                }
            }
            _ => S1Layout {
                bits: 0,
                include_in_ram: false,
            },
        }
    }

    fn pcnf0(&self) -> u32 {
        let s1 = self.s1_layout();

        let mut pcnf0 = (self.length_bits as u32) << regs::PCNF0_LFLEN_POS
            | 1 << regs::PCNF0_S0LEN_POS
            | (s1.bits as u32) << regs::PCNF0_S1LEN_POS
            | (s1.include_in_ram as u32) << regs::PCNF0_S1INCL_POS;

        pcnf0 |= match self.phy {
            Phy::Le1M => regs::PCNF0_PLEN_8BIT << regs::PCNF0_PLEN_POS,
            Phy::Le2M => regs::PCNF0_PLEN_16BIT << regs::PCNF0_PLEN_POS,
            Phy::CodedS2 | Phy::CodedS8 => {
                regs::PCNF0_PLEN_LONG_RANGE << regs::PCNF0_PLEN_POS
                    | 2 << regs::PCNF0_CILEN_POS
                    | 3 << regs::PCNF0_TERMLEN_POS
            }
        };

        pcnf0
    }

    fn pcnf1(&self) -> u32 {
        // No static length, little endian
        (self.max_len as u32) << regs::PCNF1_MAXLEN_POS
            | 3 << regs::PCNF1_BALEN_POS
            | 1 << regs::PCNF1_WHITEEN_POS
    }
}

/// Address of a packet buffer as seen by the radio DMA
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketPtr(pub u32);

impl PacketPtr {
    /// Address of `buffer`
    ///
    /// The buffer must stay in place until the radio is done with it.
    pub fn from_slice(buffer: &[u8]) -> Self {
        Self(buffer.as_ptr() as usize as u32)
    }
}

impl<P: Peripheral, F: Fabric> Radio<P, F> {
    /// Select the PHY of the next packets
    ///
    /// For LE Coded, `phy` tells the coding used for transmission. Reception accepts both coding
    /// schemes.
    pub fn set_phy(&mut self, phy: Phy) {
        let mode = match phy {
            Phy::Le1M => regs::MODE_BLE_1MBIT,
            Phy::Le2M => regs::MODE_BLE_2MBIT,
            Phy::CodedS2 => regs::MODE_BLE_LR500KBIT,
            Phy::CodedS8 => regs::MODE_BLE_LR125KBIT,
        };
        self.radio.write(regs::MODE, mode);

        let ramp_up = match self.config.ramp_up {
            super::RampUp::Fast => regs::MODECNF0_RU_FAST,
            super::RampUp::Default => 0,
        };
        self.radio
            .write(regs::MODECNF0, ramp_up | regs::MODECNF0_DTX_CENTER);

        self.phy = phy;
    }

    /// PHY selected with [`set_phy`](Self::set_phy)
    pub fn phy(&self) -> Phy {
        self.phy
    }

    /// Configure the packet layout
    pub fn set_packet_format(&mut self, format: &PacketFormat) {
        trace!(
            "radio: packet format len bits {} max {}",
            format.length_bits,
            format.max_len
        );
        debug_assert!(matches!(format.length_bits, 5 | 8));
        debug_assert!(!(format.cte_inline && format.phy.is_coded()));

        self.radio.write(regs::PCNF0, format.pcnf0());
        self.radio.write(regs::PCNF1, format.pcnf1());
    }

    /// Set the access address used for both transmission and reception
    pub fn set_access_address(&mut self, aa: u32) {
        let bytes = aa.to_le_bytes();
        self.radio.write(regs::PREFIX0, bytes[3] as u32);
        self.radio.write(
            regs::BASE0,
            (bytes[2] as u32) << 24 | (bytes[1] as u32) << 16 | (bytes[0] as u32) << 8,
        );
        self.radio.write(regs::TXADDRESS, 0);
        self.radio.write(regs::RXADDRESSES, 1);
    }

    /// Access address currently configured
    pub fn access_address(&self) -> u32 {
        let prefix = self.radio.read(regs::PREFIX0) & 0xFF;
        let base = self.radio.read(regs::BASE0) >> 8;
        prefix << 24 | base
    }

    /// Set the initial value of the whitening LFSR
    pub fn set_whitening_iv(&mut self, iv: u8) {
        self.radio.write(regs::DATAWHITEIV, (iv | 0x40) as u32);
    }

    /// Configure a 3 byte CRC computed over the PDU, skipping the access address
    pub fn set_crc(&mut self, polynomial: u32, seed: u32) {
        self.radio.write(
            regs::CRCCNF,
            3 << regs::CRCCNF_LEN_POS | regs::CRCCNF_SKIPADDR_SKIP << regs::CRCCNF_SKIPADDR_POS,
        );
        self.radio.write(regs::CRCPOLY, polynomial & 0xFF_FFFF);
        self.radio.write(regs::CRCINIT, seed & 0xFF_FFFF);
    }

    /// Tune to the BLE channel `channel` (0..=39) and set its whitening
    pub fn set_channel(&mut self, channel: u8) -> Result<(), Error> {
        let offset = match channel {
            0..=10 => 4 + 2 * channel,
            11..=36 => 28 + 2 * (channel - 11),
            37 => 2,
            38 => 26,
            39 => 80,
            _ => return Err(Error::InvalidChannel),
        };

        self.set_frequency(offset);
        self.set_whitening_iv(channel);
        Ok(())
    }

    /// Tune to 2400 MHz + `offset_mhz`
    pub fn set_frequency(&mut self, offset_mhz: u8) {
        debug_assert!(offset_mhz <= 100);
        self.radio.write(regs::FREQUENCY, offset_mhz as u32);
    }

    /// Set the transmit power in dBm
    pub fn set_tx_power(&mut self, dbm: i8) {
        debug_assert!(matches!(
            dbm,
            8 | 7 | 6 | 5 | 4 | 3 | 2 | 0 | -4 | -8 | -12 | -16 | -20 | -30 | -40
        ));
        self.radio.write(regs::TXPOWER, dbm as u8 as u32);
    }

    /// Set the buffer the next packet is sent from or received into
    pub fn set_packet_ptr(&mut self, ptr: PacketPtr) {
        self.radio.write(regs::PACKETPTR, ptr.0);
    }
}
