//! Radio ramp-up and chain delays
//!
//! Delays are empirically measured constants, kept in nanoseconds per SoC and per ramp-up mode.
//! Microsecond getters round up, because the radio engine uses them to enable the radio early
//! enough. The LE Coded receive chain is measured per board and supplied as [`Calibration`].

use super::Direction;

/// Over-the-air modulation and coding scheme
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phy {
    /// LE 1M
    Le1M,
    /// LE 2M
    Le2M,
    /// LE Coded with S=2 coding
    CodedS2,
    /// LE Coded with S=8 coding
    CodedS8,
}

impl Phy {
    /// Check if this is one of the LE Coded schemes
    pub const fn is_coded(self) -> bool {
        matches!(self, Phy::CodedS2 | Phy::CodedS8)
    }

    /// The slowest scheme this PHY may turn out to use
    ///
    /// A coded receiver learns the coding scheme only in the middle of a packet, so any timing
    /// decided before must assume S8.
    pub const fn worst_case(self) -> Phy {
        match self {
            Phy::CodedS2 => Phy::CodedS8,
            phy => phy,
        }
    }

    const fn index(self) -> usize {
        match self {
            Phy::Le1M => 0,
            Phy::Le2M => 1,
            Phy::CodedS2 => 2,
            Phy::CodedS8 => 3,
        }
    }
}

/// Radio ramp-up mode
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RampUp {
    /// 40 us ramp-up
    #[default]
    Fast,
    /// 140 us ramp-up, compatible with older radios
    Default,
}

/// SoC selecting the timing table
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Soc {
    /// nRF52833
    #[default]
    Nrf52833,
}

/// Delays of one ramp-up mode in nanoseconds, indexed by [`Phy`]
#[derive(Debug)]
pub struct TimingTable {
    /// TXEN to READY
    pub tx_ready_ns: [u32; 4],
    /// RXEN to READY
    pub rx_ready_ns: [u32; 4],
    /// Bit leaving the radio logic to bit on air
    pub tx_chain_ns: [u32; 4],
    /// Bit on air to bit reaching the radio logic, LE 1M and LE 2M only
    ///
    /// The LE Coded receive chain depends on the board and comes from [`Calibration`].
    pub rx_chain_ns: [u32; 2],
}

/// Timing tables of one SoC
#[derive(Debug)]
pub struct SocTiming {
    /// Fast ramp-up
    pub fast: TimingTable,
    /// Default ramp-up
    pub default: TimingTable,
}

const NRF52833: SocTiming = SocTiming {
    fast: TimingTable {
        tx_ready_ns: [40_900, 40_000, 42_300, 42_300],
        rx_ready_ns: [40_300, 40_300, 40_300, 40_300],
        tx_chain_ns: [600, 600, 600, 600],
        rx_chain_ns: [9_400, 5_000],
    },
    default: TimingTable {
        tx_ready_ns: [140_900, 140_000, 142_300, 142_300],
        rx_ready_ns: [140_300, 140_300, 140_300, 140_300],
        tx_chain_ns: [600, 600, 600, 600],
        rx_chain_ns: [9_400, 5_000],
    },
};

impl Soc {
    /// Timing tables of this SoC
    pub const fn timing(self) -> &'static SocTiming {
        match self {
            Soc::Nrf52833 => &NRF52833,
        }
    }
}

/// Hardware-measured constants supplied by the integrator
///
/// The radio engine does not carry defaults for these. Without them the delay compensated switch
/// and software turnarounds after an LE Coded reception are unavailable.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// Delay of the END event after the PDU end when CTE inline parsing is enabled
    pub end_evt_delay_us: u32,
    /// Receive chain delay of LE Coded S=2
    pub coded_rx_chain_delay_s2_ns: Option<u32>,
    /// Receive chain delay of LE Coded S=8
    pub coded_rx_chain_delay_s8_ns: Option<u32>,
}

/// Delay lookup for the selected SoC, ramp-up mode and calibration
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    table: &'static TimingTable,
    rx_chain_s2_ns: Option<u32>,
    rx_chain_s8_ns: Option<u32>,
}

impl Timing {
    /// Select the table of `soc` for `ramp_up` and take the coded receive chain from `calibration`
    pub fn new(soc: Soc, ramp_up: RampUp, calibration: Option<&Calibration>) -> Self {
        let timing = soc.timing();
        let table = match ramp_up {
            RampUp::Fast => &timing.fast,
            RampUp::Default => &timing.default,
        };

        Self {
            table,
            rx_chain_s2_ns: calibration.and_then(|c| c.coded_rx_chain_delay_s2_ns),
            rx_chain_s8_ns: calibration.and_then(|c| c.coded_rx_chain_delay_s8_ns),
        }
    }

    /// Ramp-up delay of the transmitter in nanoseconds
    pub fn tx_ready_delay_ns(&self, phy: Phy) -> u32 {
        self.table.tx_ready_ns[phy.index()]
    }

    /// Ramp-up delay of the receiver in nanoseconds
    pub fn rx_ready_delay_ns(&self, phy: Phy) -> u32 {
        self.table.rx_ready_ns[phy.index()]
    }

    /// Transmit chain delay in nanoseconds
    pub fn tx_chain_delay_ns(&self, phy: Phy) -> u32 {
        self.table.tx_chain_ns[phy.index()]
    }

    /// Receive chain delay in nanoseconds, `None` for LE Coded without calibration
    pub fn rx_chain_delay_ns(&self, phy: Phy) -> Option<u32> {
        match phy {
            Phy::Le1M | Phy::Le2M => Some(self.table.rx_chain_ns[phy.index()]),
            Phy::CodedS2 => self.rx_chain_s2_ns,
            Phy::CodedS8 => self.rx_chain_s8_ns,
        }
    }

    /// Ramp-up delay of the transmitter in microseconds
    pub fn tx_ready_delay_us(&self, phy: Phy) -> u32 {
        ns_to_us_ceil(self.tx_ready_delay_ns(phy))
    }

    /// Ramp-up delay of the receiver in microseconds
    pub fn rx_ready_delay_us(&self, phy: Phy) -> u32 {
        ns_to_us_ceil(self.rx_ready_delay_ns(phy))
    }

    /// Transmit chain delay in microseconds
    pub fn tx_chain_delay_us(&self, phy: Phy) -> u32 {
        ns_to_us_ceil(self.tx_chain_delay_ns(phy))
    }

    /// Receive chain delay in microseconds
    pub fn rx_chain_delay_us(&self, phy: Phy) -> Option<u32> {
        self.rx_chain_delay_ns(phy).map(ns_to_us_ceil)
    }

    /// Ramp-up delay in nanoseconds of the radio enabled in `dir`
    pub fn ready_delay_ns(&self, dir: Direction, phy: Phy) -> u32 {
        match dir {
            Direction::Tx => self.tx_ready_delay_ns(phy),
            Direction::Rx => self.rx_ready_delay_ns(phy),
        }
    }

    /// Chain delay in nanoseconds of the radio operating in `dir`
    pub fn chain_delay_ns(&self, dir: Direction, phy: Phy) -> Option<u32> {
        match dir {
            Direction::Tx => Some(self.tx_chain_delay_ns(phy)),
            Direction::Rx => self.rx_chain_delay_ns(phy),
        }
    }
}

/// Convert nanoseconds to microseconds rounding up
pub const fn ns_to_us_ceil(ns: u32) -> u32 {
    (ns + 999) / 1000
}

/// Convert nanoseconds to microseconds rounding to the nearest value
pub const fn ns_to_us_round(ns: u32) -> u32 {
    (ns + 500) / 1000
}
