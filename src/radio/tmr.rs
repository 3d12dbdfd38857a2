//! Event timer: radio event start, receive timeout and timestamps
//!
//! Timestamps are microseconds of the event timer. With the single timer strategy the timer is
//! cleared at every packet end, the engine then adds the accumulated offset of the clear so the
//! values stay absolute for the whole radio event. READY and address captures of a packet count
//! from the clear before that packet, which the turnaround folds into the offset when it is armed.
//! The end event that clears the timer also retires the start and receive timeout channels, their
//! compares would otherwise match again on the restarted timer.

use super::{Direction, Radio, SwitchStrategy};
use crate::error::Error;
use crate::fmt::{trace, warn};
use crate::hw::nrf52833::radio as regs;
use crate::hw::ppi::{mask, Fabric};
use crate::hw::{Event, Peripheral};

const CC_START: u8 = 0;
const CC_ADDRESS: u8 = 1;
const CC_END: u8 = 2;
const CC_SAMPLE: u8 = 3;

impl<P: Peripheral, F: Fabric> Radio<P, F> {
    /// Release every channel and compare used by the previous radio event
    pub fn tmr_status_reset(&mut self) {
        self.release_channels();
        self.hcto_armed = false;
    }

    /// Start the event timer on `tick` and enable the radio in `dir` `remainder_us` later
    ///
    /// `tick` is owned by the caller, usually a compare event of the RTC driving the link layer
    /// scheduler.
    pub fn tmr_start_tick(&mut self, dir: Direction, tick: Event, remainder_us: u32) {
        let et = &self.event_timer;
        et.shutdown();
        et.set_cc(CC_START, remainder_us);
        et.clear_compare(CC_START);
        et.set_cc(CC_END, 0);
        self.last_pdu_end_us = 0;

        let channel = self.map.tick_start;
        self.ppi.bind(channel, tick, et.clear_task());
        self.ppi.fork(channel, Some(et.start_task()));
        self.ppi.enable(mask(channel));

        self.route_start(dir);
        self.start_switch_timer();

        trace!("radio: start {} on tick + {} us", dir, remainder_us);
    }

    /// Enable the radio in `dir` when the running event timer reaches `start_us`
    ///
    /// Returns the programmed start. A start already in the past is moved one tick past now.
    pub fn tmr_start_us(&mut self, dir: Direction, start_us: u32) -> u32 {
        let origin = self.timer_origin();
        let et = &self.event_timer;
        et.start();

        let now = et.capture(CC_SAMPLE);
        let mut relative = start_us.wrapping_sub(origin);
        if (relative.wrapping_sub(now) as i32) <= 0 {
            warn!("radio: start {} us is in the past", start_us);
            relative = now.wrapping_add(1);
        }
        et.set_cc(CC_START, relative);
        et.clear_compare(CC_START);

        self.route_start(dir);
        self.start_switch_timer();

        relative.wrapping_add(origin)
    }

    /// Enable the radio in `dir` now, returning the event timer value of the enable
    pub fn tmr_start_now(&mut self, dir: Direction) -> u32 {
        let origin = self.timer_origin();
        self.event_timer.start();
        self.start_switch_timer();

        self.ppi
            .disable(mask(self.map.start_tx) | mask(self.map.start_rx));
        let now = self.event_timer.capture(CC_START);
        self.radio.trigger(match dir {
            Direction::Tx => regs::TASKS_TXEN,
            Direction::Rx => regs::TASKS_RXEN,
        });

        now.wrapping_add(origin)
    }

    /// Stop the event and switch timers
    pub fn tmr_stop(&mut self) {
        self.ppi.disable(mask(self.map.tick_start));
        self.event_timer.stop();
        if let Some(sw) = self.switch_timer.as_ref() {
            sw.stop();
        }
    }

    /// Disable the receiver at `hcto_us` unless an access address is matched before
    ///
    /// The address match captures the timer into the timeout compare, which moves it into the
    /// past. Returns [`Error::AlreadyArmed`] if a timeout is armed in this radio event.
    pub fn hcto_configure(&mut self, hcto_us: u32) -> Result<(), Error> {
        if self.hcto_armed {
            return Err(Error::AlreadyArmed);
        }

        let origin = self.timer_origin();
        let et = &self.event_timer;
        et.set_cc(CC_ADDRESS, hcto_us.wrapping_sub(origin));
        et.clear_compare(CC_ADDRESS);

        self.connect(
            self.map.hcto_disable,
            et.compare_event(CC_ADDRESS),
            self.radio.task(regs::TASKS_DISABLE),
        );
        self.connect(
            self.map.address_capture,
            self.radio.event(regs::EVENTS_ADDRESS),
            et.capture_task(CC_ADDRESS),
        );

        self.hcto_armed = true;
        trace!("radio: hcto at {} us", hcto_us);
        Ok(())
    }

    /// Capture the event timer at READY and at the access address match
    pub fn tmr_aa_capture(&mut self) {
        let et = &self.event_timer;
        self.connect(
            self.map.ready_capture,
            self.radio.event(regs::EVENTS_READY),
            et.capture_task(CC_START),
        );
        self.connect(
            self.map.address_capture,
            self.radio.event(regs::EVENTS_ADDRESS),
            et.capture_task(CC_ADDRESS),
        );
    }

    /// Timestamp of the last access address match
    pub fn tmr_aa_get(&self) -> u32 {
        self.event_timer
            .cc(CC_ADDRESS)
            .wrapping_add(self.packet_origin())
    }

    /// Timestamp of the last READY event
    pub fn tmr_ready_get(&self) -> u32 {
        self.event_timer
            .cc(CC_START)
            .wrapping_add(self.packet_origin())
    }

    /// Capture the event timer at the end of every packet
    ///
    /// With the single timer strategy an armed turnaround already captures at the end event that
    /// clears the timer, which is left as is.
    pub fn tmr_end_capture(&mut self) {
        let channel = self.map.end_capture;
        if self.map.retire_group.is_some() && self.ppi.enabled() & mask(channel) != 0 {
            return;
        }

        self.connect(
            channel,
            self.radio.event(regs::EVENTS_END),
            self.event_timer.capture_task(CC_END),
        );
    }

    /// Timestamp of the last packet end
    pub fn tmr_end_get(&self) -> u32 {
        match self.config.switch {
            SwitchStrategy::SoftwareSingleTimer => self
                .last_pdu_end_us
                .wrapping_add(self.event_timer.cc(CC_END)),
            _ => self.event_timer.cc(CC_END),
        }
    }

    /// Capture the event timer now
    pub fn tmr_sample(&mut self) {
        self.event_timer.capture(CC_SAMPLE);
    }

    /// Timestamp taken by the last [`tmr_sample`](Self::tmr_sample)
    pub fn tmr_sample_get(&self) -> u32 {
        self.event_timer
            .cc(CC_SAMPLE)
            .wrapping_add(self.timer_origin())
    }

    /// Absolute time of the clear before the packet in flight
    fn packet_origin(&self) -> u32 {
        match self.config.switch {
            SwitchStrategy::SoftwareSingleTimer => self.last_pdu_end_us,
            _ => 0,
        }
    }

    /// Absolute time of the last event timer clear
    fn timer_origin(&self) -> u32 {
        match self.config.switch {
            SwitchStrategy::SoftwareSingleTimer => self
                .last_pdu_end_us
                .wrapping_add(self.event_timer.cc(CC_END)),
            _ => 0,
        }
    }

    /// Route the start compare to the enable task of `dir`
    fn route_start(&self, dir: Direction) {
        let map = self.map;
        let compare = self.event_timer.compare_event(CC_START);
        let task = self.radio_task(dir);

        if map.start_tx == map.start_rx {
            self.ppi.disable(mask(map.start_tx));
            self.connect(map.start_tx, compare, task);
        } else {
            let (on, off) = match dir {
                Direction::Tx => (map.start_tx, map.start_rx),
                Direction::Rx => (map.start_rx, map.start_tx),
            };
            self.ppi.disable(mask(off));
            self.connect(on, compare, task);
        }
    }

    fn start_switch_timer(&self) {
        if let Some(sw) = self.switch_timer.as_ref() {
            sw.start();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{accepting_fabric, permissive_fabric, permit_setup, Mocks};
    use super::super::timing::Phy;
    use super::super::Config;
    use super::*;
    use crate::hw::nrf52833::{RADIO_BASE, RTC0_BASE, TIMER0_BASE};
    use crate::hw::ppi::traits::MockFabric;
    use crate::hw::Task;
    use crate::sim::{RxPacket, Sim, SimPeripheral};
    use mockall::predicate::*;

    #[test]
    fn test_start_us_routes_compare_to_enable() {
        let mocks = Mocks::new();
        let mut fabric = MockFabric::new();
        fabric
            .expect_bind()
            .with(
                eq(21),
                eq(Event(TIMER0_BASE + 0x140)),
                eq(Task(RADIO_BASE + 0x004)),
            )
            .times(1)
            .return_const(());
        fabric
            .expect_enable()
            .with(eq(1 << 21))
            .times(1)
            .return_const(());
        fabric
            .expect_disable()
            .with(eq(1 << 20))
            .times(1)
            .return_const(());
        permit_setup(&mut fabric);

        let mut radio = Radio::new(mocks.resources(), fabric, Config::default()).unwrap();
        let start = radio.tmr_start_us(Direction::Rx, 500);

        assert_eq!(start, 500);
        assert_eq!(mocks.timer0.read(0x540), 500);
        assert_eq!(mocks.timer0.read(0x000), 1);
        assert_eq!(mocks.timer1.read(0x000), 1);
    }

    #[test]
    fn test_start_in_the_past_is_postponed() {
        let mocks = Mocks::new();
        let mut radio = Radio::new(mocks.resources(), accepting_fabric(), Config::default())
            .unwrap();

        // The mock keeps the written value when the capture task is triggered
        mocks.timer0.write(0x54C, 800);
        let start = radio.tmr_start_us(Direction::Tx, 500);

        assert_eq!(start, 801);
        assert_eq!(mocks.timer0.read(0x540), 801);
    }

    #[test]
    fn test_start_tick_clears_and_starts_on_tick() {
        let mocks = Mocks::new();
        let tick = Event(RTC0_BASE + 0x140);

        let mut fabric = MockFabric::new();
        fabric
            .expect_bind()
            .with(eq(1), eq(tick), eq(Task(TIMER0_BASE + 0x00C)))
            .times(1)
            .return_const(());
        fabric
            .expect_fork()
            .with(eq(1), eq(Some(Task(TIMER0_BASE))))
            .times(1)
            .return_const(());
        fabric.expect_bind().return_const(());
        fabric.expect_enable().return_const(());
        permit_setup(&mut fabric);

        let mut radio = Radio::new(mocks.resources(), fabric, Config::default()).unwrap();
        radio.tmr_start_tick(Direction::Tx, tick, 130);

        assert_eq!(mocks.timer0.read(0x010), 1);
        assert_eq!(mocks.timer0.read(0x540), 130);
    }

    #[test]
    fn test_start_now_enables_in_software() {
        let mocks = Mocks::new();
        let mut radio = Radio::new(mocks.resources(), permissive_fabric(), Config::default())
            .unwrap();

        mocks.timer0.write(0x540, 42);
        assert_eq!(radio.tmr_start_now(Direction::Tx), 42);
        assert_eq!(mocks.radio.read(0x000), 1);
        assert_eq!(mocks.timer0.read(0x040), 1);
    }

    #[test]
    fn test_hcto_cannot_be_armed_twice() {
        let mocks = Mocks::new();
        let mut fabric = MockFabric::new();
        fabric
            .expect_enable()
            .with(in_iter([1 << 22, 1 << 26]))
            .times(2)
            .return_const(());
        fabric.expect_bind().return_const(());
        permit_setup(&mut fabric);

        let mut radio = Radio::new(mocks.resources(), fabric, Config::default()).unwrap();

        assert_eq!(radio.hcto_configure(1000), Ok(()));
        assert_eq!(mocks.timer0.read(0x544), 1000);
        assert_eq!(radio.hcto_configure(2000), Err(Error::AlreadyArmed));
        assert_eq!(mocks.timer0.read(0x544), 1000);
    }

    #[test]
    fn test_status_reset_allows_new_hcto() {
        let mocks = Mocks::new();
        let mut radio = Radio::new(mocks.resources(), accepting_fabric(), Config::default())
            .unwrap();

        assert_eq!(radio.hcto_configure(1000), Ok(()));
        radio.tmr_status_reset();
        assert_eq!(radio.hcto_configure(3000), Ok(()));
        assert_eq!(mocks.timer0.read(0x544), 3000);
    }

    #[test]
    fn test_timestamps_dual_timer() {
        let mocks = Mocks::new();
        let radio = Radio::new(mocks.resources(), permissive_fabric(), Config::default()).unwrap();

        mocks.timer0.write(0x540, 10);
        mocks.timer0.write(0x544, 50);
        mocks.timer0.write(0x548, 376);
        mocks.timer0.write(0x54C, 7);

        assert_eq!(radio.tmr_ready_get(), 10);
        assert_eq!(radio.tmr_aa_get(), 50);
        assert_eq!(radio.tmr_end_get(), 376);
        assert_eq!(radio.tmr_sample_get(), 7);
    }

    #[test]
    fn test_single_timer_accumulates_packet_ends() {
        let mocks = Mocks::new();
        let resources = crate::radio::Resources {
            radio: &mocks.radio,
            event_timer: &mocks.timer3,
            switch_timer: None,
            ccm_aar: &mocks.ccm,
        };
        let config = Config {
            switch: SwitchStrategy::SoftwareSingleTimer,
            ..Default::default()
        };
        let mut radio = Radio::new(resources, accepting_fabric(), config).unwrap();

        // First packet ends 300 us after the start, the timer restarts from zero there
        mocks.timer3.write(0x548, 300);
        assert_eq!(radio.tmr_end_get(), 300);
        radio.switch_complete_and_rx(Phy::Le1M);
        assert_eq!(radio.tmr_end_get(), 300);

        // Second packet: address 150 us and end 230 us after the first end
        mocks.timer3.write(0x544, 150);
        assert_eq!(radio.tmr_aa_get(), 450);
        mocks.timer3.write(0x548, 230);
        assert_eq!(radio.tmr_end_get(), 530);
        assert_eq!(radio.tmr_aa_get(), 450);

        // Third packet: address 120 us after the second end
        radio.switch_complete_and_tx(Phy::Le1M, Phy::Le1M).unwrap();
        mocks.timer3.write(0x544, 120);
        assert_eq!(radio.tmr_aa_get(), 650);
        assert_eq!(radio.tmr_end_get(), 530);
    }

    const DISABLE: Task = Task(RADIO_BASE + regs::TASKS_DISABLE);

    fn listen_with_timeout(sim: &Sim) {
        let mut radio = sim.radio(Config::default()).unwrap();

        radio.prepare();
        radio.set_phy(Phy::Le1M);
        radio.switch_complete_and_disable();
        assert_eq!(radio.tmr_start_us(Direction::Rx, 100), 100);
        radio.hcto_configure(1500).unwrap();
        sim.run_for_us(3000);
    }

    #[test]
    fn test_hcto_disables_at_timeout() {
        let sim = Sim::new();
        listen_with_timeout(&sim);

        assert_eq!(sim.task_times(DISABLE), [1_500_000]);
        assert_eq!(
            sim.event_times(Event(RADIO_BASE + regs::EVENTS_DISABLED)),
            [1_501_000]
        );
    }

    #[test]
    fn test_address_match_cancels_hcto() {
        let sim = Sim::new();
        sim.inject_rx(RxPacket::new(200, 100));
        listen_with_timeout(&sim);

        // Disabled by the END short only
        assert_eq!(sim.task_times(DISABLE), [140_300 + 300_000]);
    }

    fn single_timer_radio(sim: &Sim) -> Radio<SimPeripheral<'_>> {
        let config = Config {
            switch: SwitchStrategy::SoftwareSingleTimer,
            ..Default::default()
        };
        let mut radio = sim.radio(config).unwrap();
        radio.prepare();
        radio.set_phy(Phy::Le1M);
        radio.tifs_set(150);
        radio
    }

    #[test]
    fn test_single_timer_timestamps_across_turnarounds() {
        let sim = Sim::new();
        let mut radio = single_timer_radio(&sim);
        let txen = Task(RADIO_BASE + regs::TASKS_TXEN);

        radio.switch_complete_and_rx(Phy::Le1M);
        radio.tmr_aa_capture();
        radio.tmr_end_capture();
        assert_eq!(radio.tmr_start_us(Direction::Tx, 100), 100);

        // TX ends at 516.9 us, RX starts 109 us later, address 50 us after ready
        sim.inject_rx(RxPacket::new(50, 100));
        sim.run_for_us(560);
        assert_eq!(radio.tmr_end_get(), 516);

        radio.switch_complete_and_tx(Phy::Le1M, Phy::Le1M).unwrap();
        sim.run_for_us(390);

        assert_eq!(
            sim.task_times(Task(RADIO_BASE + regs::TASKS_RXEN)),
            [625_900]
        );
        assert_eq!(radio.tmr_aa_get(), 715);
        assert_eq!(radio.tmr_end_get(), 815);
        assert_eq!(sim.task_times(txen), [100_000, 916_200]);
    }

    #[test]
    fn test_single_timer_start_fires_once() {
        let sim = Sim::new();
        let mut radio = single_timer_radio(&sim);

        radio.switch_complete_and_rx(Phy::Le1M);
        radio.tmr_start_us(Direction::Tx, 100);
        sim.run_for_us(700);

        // The start compare matches again 100 us after the clear at the TX end
        assert_eq!(sim.task_times(Task(RADIO_BASE + regs::TASKS_TXEN)), [100_000]);
        assert_eq!(
            sim.task_times(Task(RADIO_BASE + regs::TASKS_RXEN)),
            [516_900 + 109_000]
        );
    }

    #[test]
    fn test_single_timer_hcto_retired_by_turnaround() {
        let sim = Sim::new();
        let mut radio = single_timer_radio(&sim);
        sim.inject_rx(RxPacket::new(200, 100));

        radio.switch_complete_and_tx(Phy::Le1M, Phy::Le1M).unwrap();
        radio.tmr_start_us(Direction::Rx, 100);
        radio.hcto_configure(1500).unwrap();
        sim.run_for_us(900);

        assert_eq!(sim.task_times(Task(RADIO_BASE + regs::TASKS_RXEN)), [100_000]);
        assert_eq!(sim.task_times(Task(RADIO_BASE + regs::TASKS_TXEN)), [540_300]);
        // END short only, the address capture left in the timeout compare never matches again
        assert_eq!(sim.task_times(DISABLE), [440_300]);
    }
}
