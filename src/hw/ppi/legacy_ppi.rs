//! Implementation of the event-routing fabric based on legacy PPI peripheral from nRF52 series

use super::traits::Fabric;
use crate::hw::nrf52833::{ppi, preprogrammed_route};
use crate::hw::{Event, Peripheral, Task};

/// Event-routing fabric using the PPI peripheral available in the nRF52 family
///
/// Channels 0..=19 are programmable and have a fork task. Channels 20..=31 are pre-programmed by
/// hardware, only enabling and disabling them has an effect.
pub struct Ppi<P: Peripheral> {
    periph: P,
}

impl<P: Peripheral> Ppi<P> {
    /// Create a new fabric instance using passed PPI peripheral
    ///
    /// # Example
    ///
    /// ```no_run
    /// # #[macro_use] extern crate nrf_ble_radio;
    /// # missing_test_fns!();
    /// # fn main() {
    /// use nrf52833_hal::pac::Peripherals;
    /// use nrf_ble_radio::hw::periph::PeriphWrapper;
    /// use nrf_ble_radio::hw::ppi::Ppi;
    ///
    /// let peripherals = Peripherals::take().unwrap();
    ///
    /// let ppi = Ppi::new(PeriphWrapper::ppi(peripherals.PPI));
    /// # }
    /// ```
    pub fn new(periph: P) -> Self {
        Self { periph }
    }

    fn is_programmable(channel: u8) -> bool {
        channel < ppi::NUM_PROGRAMMABLE
    }
}

impl<P: Peripheral> Fabric for Ppi<P> {
    fn bind(&self, channel: u8, event: Event, task: Task) {
        debug_assert!(channel < ppi::NUM_CHANNELS);

        if Self::is_programmable(channel) {
            self.periph.write(ppi::eep(channel), event.0);
            self.periph.write(ppi::tep(channel), task.0);
        } else {
            debug_assert_eq!(preprogrammed_route(channel), Some((event.0, task.0)));
        }
    }

    fn fork(&self, channel: u8, task: Option<Task>) {
        debug_assert!(Self::is_programmable(channel));
        self.periph
            .write(ppi::fork_tep(channel), task.map_or(0, |t| t.0));
    }

    fn unbind(&self, channel: u8) {
        debug_assert!(channel < ppi::NUM_CHANNELS);

        self.disable(super::mask(channel));
        if Self::is_programmable(channel) {
            self.periph.write(ppi::eep(channel), 0);
            self.periph.write(ppi::tep(channel), 0);
            self.periph.write(ppi::fork_tep(channel), 0);
        }
    }

    fn enable(&self, mask: u32) {
        self.periph.write(ppi::CHENSET, mask);
    }

    fn disable(&self, mask: u32) {
        self.periph.write(ppi::CHENCLR, mask);
    }

    fn enabled(&self) -> u32 {
        self.periph.read(ppi::CHEN)
    }

    fn group_assign(&self, group: u8, mask: u32) {
        debug_assert!(group < ppi::NUM_GROUPS);
        self.periph.write(ppi::chg(group), mask);
    }

    fn group_enable(&self, group: u8) {
        debug_assert!(group < ppi::NUM_GROUPS);
        self.periph.trigger(ppi::chg_en(group));
    }

    fn group_disable(&self, group: u8) {
        debug_assert!(group < ppi::NUM_GROUPS);
        self.periph.trigger(ppi::chg_dis(group));
    }

    fn group_enable_task(&self, group: u8) -> Task {
        debug_assert!(group < ppi::NUM_GROUPS);
        self.periph.task(ppi::chg_en(group))
    }

    fn group_disable_task(&self, group: u8) -> Task {
        debug_assert!(group < ppi::NUM_GROUPS);
        self.periph.task(ppi::chg_dis(group))
    }
}
