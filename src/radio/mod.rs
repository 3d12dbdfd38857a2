//! BLE radio engine
//!
//! [`Radio`] owns the RADIO peripheral, the timers, the CCM/AAR block and the event-routing fabric
//! for the whole lifetime of the link layer. Each radio event follows the same sequence:
//!
//! 1. [`prepare`](Radio::prepare) removes whatever the previous event left behind,
//! 2. PHY, packet format, channel, access address and CRC are configured,
//! 3. the start of the event is armed with one of the `tmr_start_*` functions and the turnaround
//!    after the first packet with one of the `switch_complete_*` functions,
//! 4. hardware runs the event autonomously, software reads status and timestamps afterwards.
//!
//! Functions are grouped by concern in submodules, all of them extending [`Radio`].

mod aar;
mod ccm;
pub mod crc;
mod df;
mod filter;
mod pkt;
mod switch;
pub mod timing;
mod tmr;

pub use aar::ArAddress;
pub use ccm::CcmData;
pub use df::{DfMode, SampleSpacing, SwitchSpacing};
pub use pkt::{PacketFormat, PacketPtr, PduType};
pub use switch::{SwitchSchedule, SwitchStrategy};
pub use timing::{Calibration, Phy, RampUp, Soc, Timing};

use crate::error::Error;
use crate::fmt::{debug, trace};
use crate::hw::nrf52833::{self, radio as regs};
use crate::hw::ppi::channels::{ChannelMap, DUAL_TIMER, SINGLE_TIMER};
use crate::hw::ppi::{Fabric, Ppi};
use crate::hw::timer::Timer;
use crate::hw::Peripheral;

/// Macro used to build tests on a host
///
/// It is used for unit tests and doctest targets
#[doc(hidden)]
#[macro_export]
macro_rules! missing_test_fns {
    () => {
        #[no_mangle]
        pub extern "C" fn __wfe() {}
    };
}

#[cfg(test)]
missing_test_fns!();

/// Direction of a radio operation
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Transmission
    Tx,
    /// Reception
    Rx,
}

/// How busy-waits on CCM and AAR idle between polls
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollMode {
    /// Spin on the event register
    #[default]
    Spin,
    /// Sleep with `wfe` until the CCM_AAR interrupt source becomes pending
    Sleep,
}

/// Configuration selected once when the radio engine is created
#[derive(Debug, Default, Clone, Copy)]
pub struct Config {
    /// Radio ramp-up mode, selects the timing table too
    pub ramp_up: RampUp,
    /// TX/RX turnaround strategy
    pub switch: SwitchStrategy,
    /// Hardware-measured constants, if available
    pub calibration: Option<Calibration>,
    /// SoC for the timing table lookup
    pub soc: Soc,
    /// Busy-wait behavior of CCM and AAR polls
    pub poll: PollMode,
}

/// Peripherals handed over to the radio engine
///
/// The dual timer and hardware TIFS strategies expect TIMER0 as the event timer, because the
/// pre-programmed PPI channels are bound to it. The single timer strategy expects a timer with six
/// compare registers (TIMER3 or TIMER4) and no switch timer.
pub struct Resources<P: Peripheral> {
    /// RADIO
    pub radio: P,
    /// Timer used for the event start, receive timeout and timestamps
    pub event_timer: P,
    /// Timer used for the TX/RX turnaround
    pub switch_timer: Option<P>,
    /// CCM and AAR
    pub ccm_aar: P,
}

/// BLE radio engine on an nRF52 radio
///
/// # Examples
///
/// ```no_run
/// # #[macro_use] extern crate nrf_ble_radio;
/// # missing_test_fns!();
/// # fn main() {
/// use nrf52833_hal::pac::Peripherals;
/// use nrf_ble_radio::hw::periph::PeriphWrapper;
/// use nrf_ble_radio::hw::ppi::Ppi;
/// use nrf_ble_radio::radio::{Config, Radio, Resources};
///
/// let p = Peripherals::take().unwrap();
/// let resources = Resources {
///     radio: PeriphWrapper::radio(p.RADIO),
///     event_timer: PeriphWrapper::timer0(p.TIMER0),
///     switch_timer: Some(PeriphWrapper::timer1(p.TIMER1)),
///     ccm_aar: PeriphWrapper::ccm_aar(p.CCM, p.AAR),
/// };
/// let mut radio = Radio::new(resources, Ppi::new(PeriphWrapper::ppi(p.PPI)), Config::default())
///     .unwrap();
/// radio.reset();
/// # }
/// ```
pub struct Radio<P: Peripheral, F: Fabric = Ppi<P>> {
    radio: P,
    event_timer: Timer<P>,
    switch_timer: Option<Timer<P>>,
    ccm: P,
    ppi: F,
    map: &'static ChannelMap,
    config: Config,
    timing: Timing,
    phy: Phy,
    tifs_us: u32,
    sw_toggle: usize,
    last_pdu_end_us: u32,
    hcto_armed: bool,
    cte_inline: bool,
}

impl<P: Peripheral, F: Fabric> Radio<P, F> {
    /// Create the radio engine
    ///
    /// Returns [`Error::Unsupported`] if the dual timer strategy is selected without a switch
    /// timer.
    pub fn new(resources: Resources<P>, ppi: F, config: Config) -> Result<Self, Error> {
        let map = match config.switch {
            SwitchStrategy::SoftwareDualTimer => {
                if resources.switch_timer.is_none() {
                    return Err(Error::Unsupported);
                }
                &DUAL_TIMER
            }
            SwitchStrategy::HardwareAutoTifs => &DUAL_TIMER,
            SwitchStrategy::SoftwareSingleTimer => &SINGLE_TIMER,
        };

        if config.switch == SwitchStrategy::SoftwareSingleTimer {
            debug_assert!(matches!(
                resources.event_timer.base(),
                nrf52833::TIMER3_BASE | nrf52833::TIMER4_BASE
            ));
        } else {
            debug_assert_eq!(resources.event_timer.base(), nrf52833::TIMER0_BASE);
        }

        let switch_timer = match config.switch {
            SwitchStrategy::SoftwareDualTimer => resources.switch_timer.map(Timer::new),
            _ => None,
        };

        let radio = Self {
            radio: resources.radio,
            event_timer: Timer::new(resources.event_timer),
            switch_timer,
            ccm: resources.ccm_aar,
            ppi,
            map,
            timing: Timing::new(config.soc, config.ramp_up, config.calibration.as_ref()),
            config,
            phy: Phy::Le1M,
            tifs_us: 150,
            sw_toggle: 0,
            last_pdu_end_us: 0,
            hcto_armed: false,
            cte_inline: false,
        };
        radio.release_channels();

        debug!("radio: created with {}", config.switch);
        Ok(radio)
    }

    /// Configuration the engine was created with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Delay lookup used by the engine
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Power cycle the radio and release every routing channel
    ///
    /// All radio registers return to their reset values.
    pub fn reset(&mut self) {
        self.radio.write(regs::POWER, 0);
        self.radio.write(regs::POWER, 1);
        self.release_channels();
        self.hcto_armed = false;
        self.cte_inline = false;
    }

    /// Clean up everything the previous radio event may have left behind
    ///
    /// Must be called at the top of every radio event, before it is configured. Failure paths of
    /// the previous event (unexpected disable, receive timeout) may have skipped the regular
    /// teardown.
    pub fn prepare(&mut self) {
        trace!("radio: prepare");
        self.reset_status();
        self.tmr_status_reset();
        self.filter_status_reset();
        self.rssi_status_reset();
    }

    /// Start the transmitter ramp-up now
    pub fn enable_tx(&mut self) {
        self.radio.trigger(regs::TASKS_TXEN);
    }

    /// Start the receiver ramp-up now
    pub fn enable_rx(&mut self) {
        self.radio.trigger(regs::TASKS_RXEN);
    }

    /// Disable the radio now, dropping any armed turnaround
    pub fn disable(&mut self) {
        self.radio.write(regs::SHORTS, 0);
        self.sw_switch_disable();
        self.radio.trigger(regs::TASKS_DISABLE);
    }

    /// Clear all status events of the radio
    ///
    /// Status events stay set until cleared, so this is required at the start of every radio
    /// event. Calling it repeatedly has no further effect.
    pub fn reset_status(&mut self) {
        for event in [
            regs::EVENTS_READY,
            regs::EVENTS_ADDRESS,
            regs::EVENTS_PAYLOAD,
            regs::EVENTS_END,
            regs::EVENTS_DISABLED,
            regs::EVENTS_PHYEND,
            regs::EVENTS_RATEBOOST,
            regs::EVENTS_CTEPRESENT,
            regs::EVENTS_BCMATCH,
            regs::EVENTS_CRCOK,
            regs::EVENTS_CRCERROR,
            regs::EVENTS_TXREADY,
            regs::EVENTS_RXREADY,
        ] {
            self.radio.clear(event);
        }
    }

    /// Check if the radio finished ramping up
    pub fn is_ready(&self) -> bool {
        self.radio.is_set(regs::EVENTS_READY)
    }

    /// Check if an access address was sent or matched
    pub fn is_address_matched(&self) -> bool {
        self.radio.is_set(regs::EVENTS_ADDRESS)
    }

    /// Check if a packet was completely sent or received
    pub fn is_done(&self) -> bool {
        self.radio.is_set(regs::EVENTS_END)
    }

    /// Check if the radio got disabled
    pub fn is_disabled(&self) -> bool {
        self.radio.is_set(regs::EVENTS_DISABLED)
    }

    /// Check if the radio is in the disabled state
    pub fn is_idle(&self) -> bool {
        self.radio.read(regs::STATE) == regs::STATE_DISABLED
    }

    /// Check if the last received packet had a valid CRC
    pub fn crc_is_valid(&self) -> bool {
        self.radio.read(regs::CRCSTATUS) & 1 != 0
    }

    /// CRC of the last received packet
    pub fn crc_get(&self) -> u32 {
        self.radio.read(regs::RXCRC)
    }

    /// Coding scheme of the last packet received on the LE Coded PHY
    pub fn coded_rx_phy(&self) -> Phy {
        // PDUSTAT.CISTAT: 0 for LR125Kbit, 1 for LR500Kbit
        match (self.radio.read(regs::PDUSTAT) >> 1) & 0b11 {
            1 => Phy::CodedS2,
            _ => Phy::CodedS8,
        }
    }

    /// Enable the radio interrupt on the DISABLED event, the end of every radio event
    pub fn isr_enable(&mut self) {
        self.radio.clear(regs::EVENTS_DISABLED);
        self.radio.write(regs::INTENSET, regs::INTEN_DISABLED);
    }

    /// Disable all radio interrupts
    pub fn isr_disable(&mut self) {
        self.radio.write(regs::INTENCLR, u32::MAX);
    }

    /// Measure RSSI of the next received packet
    ///
    /// Sampling starts at the address match and stops when the radio gets disabled. Call after the
    /// `switch_complete_*` function of the event, which rewrites the turnaround shorts.
    pub fn rssi_measure(&mut self) {
        self.radio.set_bits(
            regs::SHORTS,
            regs::SHORTS_ADDRESS_RSSISTART | regs::SHORTS_DISABLED_RSSISTOP,
        );
    }

    /// Check if an RSSI sample is available
    pub fn rssi_is_ready(&self) -> bool {
        self.radio.is_set(regs::EVENTS_RSSIEND)
    }

    /// Last RSSI sample, as a positive number of -dBm
    pub fn rssi_get(&self) -> u8 {
        (self.radio.read(regs::RSSISAMPLE) & 0x7F) as u8
    }

    /// Clear the RSSI sample event
    pub fn rssi_status_reset(&mut self) {
        self.radio.clear(regs::EVENTS_RSSIEND);
    }

    fn release_channels(&self) {
        self.ppi.disable(self.map.all());

        let programmable = self.map.programmable();
        for channel in 0..nrf52833::ppi::NUM_PROGRAMMABLE {
            if programmable & (1 << channel) != 0 {
                self.ppi.unbind(channel);
            }
        }

        for group in self.map.sw_groups {
            self.ppi.group_assign(group, 0);
        }
        if let Some(group) = self.map.retire_group {
            self.ppi.group_assign(group, self.map.retired());
        }
    }

    /// Route `event` to `task` on `channel` and enable it
    ///
    /// Pre-programmed channels are only enabled.
    fn connect(&self, channel: u8, event: crate::hw::Event, task: crate::hw::Task) {
        self.ppi.bind(channel, event, task);
        self.ppi.enable(crate::hw::ppi::mask(channel));
    }

    fn radio_task(&self, dir: Direction) -> crate::hw::Task {
        match dir {
            Direction::Tx => self.radio.task(regs::TASKS_TXEN),
            Direction::Rx => self.radio.task(regs::TASKS_RXEN),
        }
    }
}
