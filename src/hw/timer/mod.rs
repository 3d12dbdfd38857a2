//! Timer driver based on the TIMER peripheral available in nRF MCUs
//!
//! The timer runs at 1 MHz as a 32-bit counter, so every count, compare and capture value is in
//! microseconds. It is used by the radio engine to:
//!
//! * schedule hardware events for [PPIs](super::ppi) with compare registers
//! * timestamp hardware events from [PPIs](super::ppi) with capture tasks

use super::nrf52833::timer;
use super::{Event, Peripheral, Task};

/// Free running microsecond timer on a `TIMER` peripheral
pub struct Timer<P: Peripheral> {
    periph: P,
}

impl<P: Peripheral> Timer<P> {
    /// Create a new [`Timer`] instance using passed hardware TIMER instance
    ///
    /// The timer is configured but not started.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # #[macro_use] extern crate nrf_ble_radio;
    /// # missing_test_fns!();
    /// # fn main() {
    /// use nrf52833_hal::pac::Peripherals;
    /// use nrf_ble_radio::hw::periph::PeriphWrapper;
    /// use nrf_ble_radio::hw::timer::Timer;
    ///
    /// let peripherals = Peripherals::take().unwrap();
    ///
    /// let timer = Timer::new(PeriphWrapper::timer0(peripherals.TIMER0));
    /// timer.start();
    /// # }
    /// ```
    pub fn new(periph: P) -> Self {
        let tmr = Self { periph };
        tmr.configure();
        tmr
    }

    /// Stop the timer and restore the microsecond configuration
    pub fn configure(&self) {
        self.periph.trigger(timer::TASKS_SHUTDOWN);
        self.periph.write(timer::MODE, timer::MODE_TIMER);
        self.periph.write(timer::BITMODE, timer::BITMODE_32BIT);
        self.periph.write(timer::PRESCALER, timer::PRESCALER_1MHZ);
        self.periph.write(timer::SHORTS, 0);
        self.periph.write(timer::INTENCLR, u32::MAX);
    }

    /// Start counting
    pub fn start(&self) {
        self.periph.trigger(timer::TASKS_START);
    }

    /// Stop counting, keeping the counter value
    pub fn stop(&self) {
        self.periph.trigger(timer::TASKS_STOP);
    }

    /// Reset the counter to zero
    pub fn clear(&self) {
        self.periph.trigger(timer::TASKS_CLEAR);
    }

    /// Stop counting and reset the counter to zero
    pub fn shutdown(&self) {
        self.periph.trigger(timer::TASKS_SHUTDOWN);
    }

    /// Capture the counter into the compare register `cc` and return the captured value
    pub fn capture(&self, cc: u8) -> u32 {
        self.periph.trigger(Self::capture_offset(cc));
        self.cc(cc)
    }

    /// Write the compare register `cc`
    pub fn set_cc(&self, cc: u8, value: u32) {
        self.periph.write(Self::cc_offset(cc), value);
    }

    /// Read the compare register `cc`
    pub fn cc(&self, cc: u8) -> u32 {
        self.periph.read(Self::cc_offset(cc))
    }

    /// Check if the counter reached the compare register `cc` since the event was last cleared
    pub fn is_compare_set(&self, cc: u8) -> bool {
        self.periph.is_set(Self::compare_offset(cc))
    }

    /// Clear the compare event of the register `cc`
    pub fn clear_compare(&self, cc: u8) {
        self.periph.clear(Self::compare_offset(cc));
    }

    /// Compare event of the register `cc`
    pub fn compare_event(&self, cc: u8) -> Event {
        self.periph.event(Self::compare_offset(cc))
    }

    /// Task capturing the counter into the register `cc`
    pub fn capture_task(&self, cc: u8) -> Task {
        self.periph.task(Self::capture_offset(cc))
    }

    /// Task starting the counter
    pub fn start_task(&self) -> Task {
        self.periph.task(timer::TASKS_START)
    }

    /// Task resetting the counter to zero
    pub fn clear_task(&self) -> Task {
        self.periph.task(timer::TASKS_CLEAR)
    }

    /// Bus address of the timer peripheral
    pub fn base(&self) -> u32 {
        self.periph.base()
    }

    fn cc_offset(cc: u8) -> u32 {
        debug_assert!((cc as usize) < timer::MAX_CC);
        timer::CC0 + 4 * cc as u32
    }

    fn capture_offset(cc: u8) -> u32 {
        debug_assert!((cc as usize) < timer::MAX_CC);
        timer::TASKS_CAPTURE0 + 4 * cc as u32
    }

    fn compare_offset(cc: u8) -> u32 {
        debug_assert!((cc as usize) < timer::MAX_CC);
        timer::EVENTS_COMPARE0 + 4 * cc as u32
    }
}
