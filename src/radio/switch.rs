//! TX/RX turnaround
//!
//! After a packet the radio has to be enabled again, in the same or in the opposite direction, so
//! that the next packet starts exactly TIFS after the end of the current one. The CPU is too slow
//! and too unpredictable for that, so the turnaround is armed in advance and executed by hardware.
//!
//! Three strategies exist:
//!
//! * [`SwitchStrategy::HardwareAutoTifs`] uses the TIFS register of the radio and the
//!   DISABLED->TXEN/RXEN shorts.
//! * [`SwitchStrategy::SoftwareDualTimer`] uses a separate switch timer. The end of the current
//!   packet clears the switch timer and enables a PPI group holding the enable channel. The enable
//!   channel routes a compare event of the switch timer to TXEN or RXEN and disables its own group,
//!   so it fires exactly once. Two sets of channels, groups and compare registers are used in turns
//!   (the toggle), so a new turnaround can be armed while the previous one is still pending.
//! * [`SwitchStrategy::SoftwareSingleTimer`] does the same with the event timer, which is then
//!   cleared at every packet end. That end event also disables a group holding the start and
//!   receive timeout channels, so their compares cannot match again on the restarted timer.
//!
//! The dual timer strategy also handles two cases where the right compare value is known only
//! while the current packet is being received. Both are solved by arming two compares and letting
//! a radio event cancel one of them, by capturing the switch timer into it. The captured value is
//! the time elapsed since the previous packet end, far beyond the TIFS window, so the cancelled
//! compare cannot match before the other one fires and disables the group:
//!
//! * LE Coded reception: the S8 compare (earlier) and the S2 compare (later) are armed, RATEBOOST
//!   cancels the S8 one.
//! * CTE inline reception with delay compensation: END is delayed when no CTE follows the PDU. The
//!   regular compare and an earlier, compensated one are armed, CTEPRESENT cancels the compensated
//!   one.

use super::timing::{ns_to_us_ceil, ns_to_us_round, Phy, Timing};
use super::{Direction, Radio};
use crate::error::Error;
use crate::fmt::{trace, warn};
use crate::hw::nrf52833::radio as regs;
use crate::hw::ppi::{mask, Fabric};
use crate::hw::{Event, Peripheral};

/// How the TX/RX turnaround is executed
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchStrategy {
    /// TIFS register of the radio
    HardwareAutoTifs,
    /// Separate switch timer, cleared at every packet end
    #[default]
    SoftwareDualTimer,
    /// Event timer shared with the turnaround, cleared at every packet end
    SoftwareSingleTimer,
}

/// One TX/RX turnaround
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SwitchSchedule {
    /// Direction of the packet in flight
    pub dir_curr: Direction,
    /// Direction of the next packet
    pub dir_next: Direction,
    /// PHY of the packet in flight
    pub phy_curr: Phy,
    /// PHY of the next packet
    pub phy_next: Phy,
    /// Compensate the delayed END event of CTE inline reception
    pub compensation: bool,
}

impl SwitchSchedule {
    /// Time from the end of the current packet to the start of the next one that is consumed by
    /// the radio itself
    ///
    /// Rounded up when the next packet is received, since listening early is harmless, and to the
    /// nearest microsecond when it is transmitted. Returns [`Error::Unsupported`] after an LE
    /// Coded reception whose receive chain delay is not calibrated.
    pub fn delay_us(&self, timing: &Timing) -> Result<u32, Error> {
        let chain_ns = timing
            .chain_delay_ns(self.dir_curr, self.phy_curr)
            .ok_or(Error::Unsupported)?;
        let ns = timing.ready_delay_ns(self.dir_next, self.phy_next) + chain_ns;

        Ok(match self.dir_next {
            Direction::Rx => ns_to_us_ceil(ns),
            Direction::Tx => ns_to_us_round(ns),
        })
    }

    /// Compare value enabling the radio, counted from the end of the current packet
    ///
    /// When TIFS cannot be met the value is clamped to one tick. The next packet then starts late.
    pub fn compare_us(&self, timing: &Timing, tifs_us: u32) -> Result<u32, Error> {
        let delay = self.delay_us(timing)?;

        if delay >= tifs_us {
            warn!("radio: switch delay {} us exceeds tifs {} us", delay, tifs_us);
            Ok(1)
        } else {
            Ok(tifs_us - delay)
        }
    }
}

/// Compare armed next to the regular one, waiting for a radio event to pick between them
enum Speculation {
    /// Coded reception, S2 compare next to the S8 one
    CodedS2(u32),
    /// CTE inline reception, compare earlier by the END event delay
    EndDelay(u32),
}

const SWITCH_SHORTS: u32 = regs::SHORTS_READY_START
    | regs::SHORTS_END_DISABLE
    | regs::SHORTS_PHYEND_DISABLE
    | regs::SHORTS_DISABLED_TXEN
    | regs::SHORTS_DISABLED_RXEN;

impl<P: Peripheral, F: Fabric> Radio<P, F> {
    /// Set the inter frame space used by the following turnarounds
    pub fn tifs_set(&mut self, tifs_us: u32) {
        self.tifs_us = tifs_us;
        if self.config.switch == SwitchStrategy::HardwareAutoTifs {
            self.radio.write(regs::TIFS, tifs_us);
        }
    }

    /// Arm the turnaround after the packet in flight
    ///
    /// Returns [`Error::Unsupported`] when delay compensation is requested without the dual timer
    /// strategy or without calibration data, and when a software turnaround follows an LE Coded
    /// reception without a calibrated receive chain delay. Nothing is armed then.
    pub fn switch_complete(&mut self, schedule: SwitchSchedule) -> Result<(), Error> {
        let end_delay = if schedule.compensation {
            debug_assert_eq!(schedule.dir_curr, Direction::Rx);
            debug_assert!(!schedule.phy_curr.is_coded());
            Some(self.end_evt_delay_us()?)
        } else {
            None
        };

        trace!(
            "radio: switch {} -> {}, tifs {}",
            schedule.dir_curr,
            schedule.dir_next,
            self.tifs_us
        );

        match self.config.switch {
            SwitchStrategy::HardwareAutoTifs => self.hw_switch(&schedule),
            SwitchStrategy::SoftwareDualTimer => self.dual_timer_switch(&schedule, end_delay)?,
            SwitchStrategy::SoftwareSingleTimer => self.single_timer_switch(&schedule)?,
        }

        Ok(())
    }

    /// Receive on `phy_rx` after the packet being transmitted
    pub fn switch_complete_and_rx(&mut self, phy_rx: Phy) {
        self.switch_after_tx(Direction::Rx, self.phy, phy_rx);
    }

    /// Transmit on `phy_tx` after the packet being received on `phy_rx`
    ///
    /// See [`switch_complete`](Self::switch_complete) for the LE Coded requirements.
    pub fn switch_complete_and_tx(&mut self, phy_rx: Phy, phy_tx: Phy) -> Result<(), Error> {
        self.switch_complete(SwitchSchedule {
            dir_curr: Direction::Rx,
            dir_next: Direction::Tx,
            phy_curr: phy_rx,
            phy_next: phy_tx,
            compensation: false,
        })
    }

    /// Transmit on `phy_tx` after the packet being received on `phy_rx` with CTE inline parsing,
    /// compensating the delayed END event
    pub fn switch_complete_with_delay_compensation_and_tx(
        &mut self,
        phy_rx: Phy,
        phy_tx: Phy,
    ) -> Result<(), Error> {
        self.switch_complete(SwitchSchedule {
            dir_curr: Direction::Rx,
            dir_next: Direction::Tx,
            phy_curr: phy_rx,
            phy_next: phy_tx,
            compensation: true,
        })
    }

    /// Transmit on `phy_next` after the packet being transmitted on `phy_curr`
    pub fn switch_complete_and_b2b_tx(&mut self, phy_curr: Phy, phy_next: Phy) {
        self.switch_after_tx(Direction::Tx, phy_curr, phy_next);
    }

    /// Receive on `phy_next` after the packet being received on `phy_curr`
    ///
    /// See [`switch_complete`](Self::switch_complete) for the LE Coded requirements.
    pub fn switch_complete_and_b2b_rx(&mut self, phy_curr: Phy, phy_next: Phy) -> Result<(), Error> {
        self.switch_complete(SwitchSchedule {
            dir_curr: Direction::Rx,
            dir_next: Direction::Rx,
            phy_curr,
            phy_next,
            compensation: false,
        })
    }

    /// Disable the radio after the packet in flight
    pub fn switch_complete_and_disable(&mut self) {
        self.set_switch_shorts(regs::SHORTS_READY_START | regs::SHORTS_END_DISABLE);
        self.sw_switch_disable();
    }

    /// Disable every channel of the software turnaround
    pub(super) fn sw_switch_disable(&self) {
        let map = self.map;
        let mut channels = mask(map.sw_clear) | pair(map.sw_enable);
        for extra in [map.sw_enable_alt, map.sw_rateboost_cancel, map.sw_cte_cancel]
            .into_iter()
            .flatten()
        {
            channels |= pair(extra);
        }
        if self.config.switch == SwitchStrategy::SoftwareSingleTimer {
            channels |= mask(map.end_capture);
        }
        self.ppi.disable(channels);
    }

    /// Turnaround after a transmission, whose chain delay is known on every PHY
    fn switch_after_tx(&mut self, dir_next: Direction, curr: Phy, next: Phy) {
        let armed = self.switch_complete(SwitchSchedule {
            dir_curr: Direction::Tx,
            dir_next,
            phy_curr: curr,
            phy_next: next,
            compensation: false,
        });
        debug_assert!(armed.is_ok());
    }

    fn end_evt_delay_us(&self) -> Result<u32, Error> {
        match (self.config.switch, self.config.calibration) {
            (SwitchStrategy::SoftwareDualTimer, Some(calibration)) => {
                Ok(calibration.end_evt_delay_us)
            }
            _ => Err(Error::Unsupported),
        }
    }

    fn hw_switch(&mut self, schedule: &SwitchSchedule) {
        self.radio.write(regs::TIFS, self.tifs_us);

        let next = match schedule.dir_next {
            Direction::Tx => regs::SHORTS_DISABLED_TXEN,
            Direction::Rx => regs::SHORTS_DISABLED_RXEN,
        };
        self.set_switch_shorts(regs::SHORTS_READY_START | regs::SHORTS_END_DISABLE | next);
    }

    fn dual_timer_switch(
        &mut self,
        schedule: &SwitchSchedule,
        end_delay: Option<u32>,
    ) -> Result<(), Error> {
        // Reception on LE Coded may turn out to be S2 only after this point
        let primary = SwitchSchedule {
            phy_curr: schedule.phy_curr.worst_case(),
            ..*schedule
        };
        let primary_us = primary.compare_us(&self.timing, self.tifs_us)?;

        let speculation = if schedule.dir_curr == Direction::Rx && schedule.phy_curr.is_coded() {
            let s2 = SwitchSchedule {
                phy_curr: Phy::CodedS2,
                ..*schedule
            };
            Some(Speculation::CodedS2(s2.compare_us(&self.timing, self.tifs_us)?))
        } else {
            end_delay.map(Speculation::EndDelay)
        };

        let Some(sw) = self.switch_timer.as_ref() else {
            return Err(Error::Unsupported);
        };
        let map = self.map;
        let t = self.sw_toggle;
        let group = map.sw_groups[t];
        let enable_task = self.radio_task(schedule.dir_next);
        let end_event = self.end_event(schedule.dir_curr);

        // The cancel channels of the previous turnaround served a packet that has ended
        for cancel in [map.sw_rateboost_cancel, map.sw_cte_cancel].into_iter().flatten() {
            self.ppi.disable(pair(cancel));
        }

        self.ppi.bind(map.sw_clear, end_event, sw.clear_task());
        self.ppi
            .fork(map.sw_clear, Some(self.ppi.group_enable_task(group)));

        let primary_cc = map.sw_cc[t];
        sw.set_cc(primary_cc, primary_us);
        sw.clear_compare(primary_cc);

        let enable = map.sw_enable[t];
        self.ppi.bind(enable, sw.compare_event(primary_cc), enable_task);
        self.ppi
            .fork(enable, Some(self.ppi.group_disable_task(group)));

        let mut members = mask(enable);
        let mut armed = mask(map.sw_clear);

        if let (Some(speculation), Some(alt), Some(alt_cc)) =
            (speculation, map.sw_enable_alt, map.sw_cc_alt)
        {
            let alt = alt[t];
            let alt_cc = alt_cc[t];

            let (alt_us, cancel, cancel_event, cancelled_cc) = match speculation {
                Speculation::CodedS2(s2_us) => (
                    s2_us,
                    map.sw_rateboost_cancel,
                    regs::EVENTS_RATEBOOST,
                    primary_cc,
                ),
                Speculation::EndDelay(delay) => (
                    primary_us.saturating_sub(delay).max(1),
                    map.sw_cte_cancel,
                    regs::EVENTS_CTEPRESENT,
                    alt_cc,
                ),
            };

            sw.set_cc(alt_cc, alt_us);
            sw.clear_compare(alt_cc);
            self.ppi.bind(alt, sw.compare_event(alt_cc), enable_task);
            self.ppi.fork(alt, Some(self.ppi.group_disable_task(group)));
            members |= mask(alt);

            if let Some(cancel) = cancel {
                self.ppi.bind(
                    cancel[t],
                    self.radio.event(cancel_event),
                    sw.capture_task(cancelled_cc),
                );
                armed |= mask(cancel[t]);
            }

            trace!("radio: speculative compares {} and {}", primary_us, alt_us);
        }

        self.ppi.disable(members);
        self.ppi.group_assign(group, members);
        self.ppi.enable(armed);

        self.set_switch_shorts(regs::SHORTS_READY_START | self.end_disable(schedule.dir_curr));
        self.sw_toggle ^= 1;
        Ok(())
    }

    fn single_timer_switch(&mut self, schedule: &SwitchSchedule) -> Result<(), Error> {
        let worst_case = SwitchSchedule {
            phy_curr: schedule.phy_curr.worst_case(),
            ..*schedule
        };
        let compare_us = worst_case.compare_us(&self.timing, self.tifs_us)?;

        let map = self.map;
        let t = self.sw_toggle;
        let group = map.sw_groups[t];
        let enable_task = self.radio_task(schedule.dir_next);
        let end_event = self.end_event(schedule.dir_curr);

        // The timer restarts from zero at every packet end. Fold the last captured end into the
        // absolute offset before the next one is captured.
        let et = &self.event_timer;
        self.last_pdu_end_us = self.last_pdu_end_us.wrapping_add(et.cc(2));
        et.set_cc(2, 0);

        // END captures before it clears, end_capture has a lower index than sw_clear. The start
        // and receive timeout compares count from the previous clear, the same END retires them
        // so they cannot fire again after it. A start still pending is left alone.
        self.ppi.bind(map.end_capture, end_event, et.capture_task(2));
        self.ppi.fork(
            map.end_capture,
            map.retire_group.map(|g| self.ppi.group_disable_task(g)),
        );
        self.ppi.bind(map.sw_clear, end_event, et.clear_task());
        self.ppi
            .fork(map.sw_clear, Some(self.ppi.group_enable_task(group)));

        let cc = map.sw_cc[t];
        et.set_cc(cc, compare_us);
        et.clear_compare(cc);

        let enable = map.sw_enable[t];
        self.ppi.bind(enable, et.compare_event(cc), enable_task);
        self.ppi
            .fork(enable, Some(self.ppi.group_disable_task(group)));

        self.ppi.disable(mask(enable));
        self.ppi.group_assign(group, mask(enable));
        self.ppi.enable(mask(map.end_capture) | mask(map.sw_clear));

        self.set_switch_shorts(regs::SHORTS_READY_START | self.end_disable(schedule.dir_curr));
        self.sw_toggle ^= 1;
        Ok(())
    }

    fn set_switch_shorts(&self, shorts: u32) {
        let current = self.radio.read(regs::SHORTS);
        self.radio
            .write(regs::SHORTS, (current & !SWITCH_SHORTS) | shorts);
    }

    /// Event marking the end of a packet sent or received in `dir`
    ///
    /// PHYEND of a transmission follows the last bit on air, including the coded TERM2 field.
    fn end_event(&self, dir: Direction) -> Event {
        match dir {
            Direction::Tx => self.radio.event(regs::EVENTS_PHYEND),
            Direction::Rx => self.radio.event(regs::EVENTS_END),
        }
    }

    fn end_disable(&self, dir: Direction) -> u32 {
        match dir {
            Direction::Tx => regs::SHORTS_PHYEND_DISABLE,
            Direction::Rx => regs::SHORTS_END_DISABLE,
        }
    }
}

fn pair(channels: [u8; 2]) -> u32 {
    mask(channels[0]) | mask(channels[1])
}

#[cfg(test)]
mod tests {
    use super::super::tests::{accepting_fabric, permissive_fabric, permit_setup, Mocks};
    use super::super::timing::{RampUp, Soc};
    use super::super::{Calibration, Config};
    use super::*;
    use crate::hw::nrf52833::{PPI_BASE, RADIO_BASE, TIMER1_BASE};
    use crate::hw::ppi::traits::MockFabric;
    use crate::hw::Task;
    use crate::sim::{RxPacket, Sim};
    use mockall::predicate::*;

    const PHYS: [Phy; 4] = [Phy::Le1M, Phy::Le2M, Phy::CodedS2, Phy::CodedS8];
    const DIRS: [Direction; 2] = [Direction::Tx, Direction::Rx];

    const CODED: Calibration = Calibration {
        end_evt_delay_us: 0,
        coded_rx_chain_delay_s2_ns: Some(25_600),
        coded_rx_chain_delay_s8_ns: Some(30_000),
    };

    fn coded_config() -> Config {
        Config {
            calibration: Some(CODED),
            ..Default::default()
        }
    }

    fn schedule(dir_curr: Direction, dir_next: Direction, curr: Phy, next: Phy) -> SwitchSchedule {
        SwitchSchedule {
            dir_curr,
            dir_next,
            phy_curr: curr,
            phy_next: next,
            compensation: false,
        }
    }

    #[test]
    fn test_compare_never_below_one_tick() {
        for ramp_up in [RampUp::Fast, RampUp::Default] {
            let timing = Timing::new(Soc::Nrf52833, ramp_up, Some(&CODED));
            for tifs in 0..=400 {
                for dir_curr in DIRS {
                    for dir_next in DIRS {
                        for curr in PHYS {
                            for next in PHYS {
                                let s = schedule(dir_curr, dir_next, curr, next);
                                let compare = s.compare_us(&timing, tifs).unwrap();
                                assert!(compare >= 1);
                                assert!(compare <= tifs.max(1));
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_rounding_depends_on_next_direction() {
        let timing = Timing::new(Soc::Nrf52833, RampUp::Fast, None);

        // 40.3 us ramp-up + 0.6 us chain, rounded up
        let tx_to_rx = schedule(Direction::Tx, Direction::Rx, Phy::Le1M, Phy::Le1M);
        assert_eq!(tx_to_rx.delay_us(&timing), Ok(41));
        assert_eq!(tx_to_rx.compare_us(&timing, 150), Ok(109));

        // 40.9 us ramp-up + 9.4 us chain, rounded to nearest
        let rx_to_tx = schedule(Direction::Rx, Direction::Tx, Phy::Le1M, Phy::Le1M);
        assert_eq!(rx_to_tx.delay_us(&timing), Ok(50));
        assert_eq!(rx_to_tx.compare_us(&timing, 150), Ok(100));
    }

    #[test]
    fn test_coded_reception_needs_calibrated_chain() {
        let timing = Timing::new(Soc::Nrf52833, RampUp::Fast, None);

        let after_coded_rx = schedule(Direction::Rx, Direction::Tx, Phy::CodedS8, Phy::Le1M);
        assert_eq!(after_coded_rx.delay_us(&timing), Err(Error::Unsupported));
        assert_eq!(after_coded_rx.compare_us(&timing, 150), Err(Error::Unsupported));

        // Transmit chain and ramp-up are known on LE Coded
        let after_coded_tx = schedule(Direction::Tx, Direction::Rx, Phy::CodedS8, Phy::CodedS8);
        assert_eq!(after_coded_tx.delay_us(&timing), Ok(41));
    }

    #[test]
    fn test_short_tifs_is_clamped() {
        let timing = Timing::new(Soc::Nrf52833, RampUp::Default, Some(&CODED));

        let s = schedule(Direction::Rx, Direction::Tx, Phy::CodedS8, Phy::CodedS8);
        assert!(s.delay_us(&timing).unwrap() > 150);
        assert_eq!(s.compare_us(&timing, 150), Ok(1));
    }

    #[test]
    fn test_s8_enables_earlier_than_s2() {
        let timing = Timing::new(Soc::Nrf52833, RampUp::Fast, Some(&CODED));

        let s8 = schedule(Direction::Rx, Direction::Tx, Phy::CodedS8, Phy::CodedS8);
        let s2 = schedule(Direction::Rx, Direction::Tx, Phy::CodedS2, Phy::CodedS8);
        assert!(s8.compare_us(&timing, 150).unwrap() < s2.compare_us(&timing, 150).unwrap());
    }

    #[test]
    fn test_hardware_tifs() {
        let mocks = Mocks::new();
        let config = Config {
            switch: SwitchStrategy::HardwareAutoTifs,
            ..Default::default()
        };
        let mut radio = Radio::new(mocks.resources(), permissive_fabric(), config).unwrap();

        mocks.radio.write(0x200, 1 << 4);
        radio.tifs_set(150);
        assert_eq!(mocks.radio.read(0x544), 150);

        radio.switch_complete_and_tx(Phy::Le1M, Phy::Le1M).unwrap();
        assert_eq!(mocks.radio.read(0x200), 1 << 4 | 1 | 1 << 1 | 1 << 2);

        // No chain delay involved, LE Coded needs no calibration here
        radio.switch_complete_and_b2b_rx(Phy::CodedS8, Phy::CodedS8).unwrap();
        assert_eq!(mocks.radio.read(0x200), 1 << 4 | 1 | 1 << 1 | 1 << 3);

        radio.switch_complete_and_rx(Phy::Le1M);
        assert_eq!(mocks.radio.read(0x200), 1 << 4 | 1 | 1 << 1 | 1 << 3);

        radio.switch_complete_and_disable();
        assert_eq!(mocks.radio.read(0x200), 1 << 4 | 1 | 1 << 1);
    }

    #[test]
    fn test_compensation_requires_calibration() {
        let mocks = Mocks::new();
        let mut radio =
            Radio::new(mocks.resources(), permissive_fabric(), Config::default()).unwrap();

        let result = radio.switch_complete_with_delay_compensation_and_tx(Phy::Le1M, Phy::Le1M);
        assert_eq!(result, Err(Error::Unsupported));
    }

    #[test]
    fn test_compensation_unsupported_by_hardware_tifs() {
        let mocks = Mocks::new();
        let config = Config {
            switch: SwitchStrategy::HardwareAutoTifs,
            calibration: Some(Calibration {
                end_evt_delay_us: 5,
                coded_rx_chain_delay_s2_ns: None,
                coded_rx_chain_delay_s8_ns: None,
            }),
            ..Default::default()
        };
        let mut radio = Radio::new(mocks.resources(), permissive_fabric(), config).unwrap();

        let result = radio.switch_complete_with_delay_compensation_and_tx(Phy::Le1M, Phy::Le1M);
        assert_eq!(result, Err(Error::Unsupported));
    }

    fn group_task_fabric() -> MockFabric {
        let mut fabric = MockFabric::new();
        fabric
            .expect_group_enable_task()
            .returning(|g| Task(PPI_BASE + 8 * g as u32));
        fabric
            .expect_group_disable_task()
            .returning(|g| Task(PPI_BASE + 4 + 8 * g as u32));
        fabric
    }

    #[test]
    fn test_dual_timer_wiring_alternates_toggle() {
        let mocks = Mocks::new();
        let mut fabric = group_task_fabric();

        let phyend = Event(RADIO_BASE + 0x16C);
        let end = Event(RADIO_BASE + 0x10C);
        let clear = Task(TIMER1_BASE + 0x00C);

        let mut seq = mockall::Sequence::new();
        fabric
            .expect_bind()
            .with(eq(8), eq(phyend), eq(clear))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        fabric
            .expect_bind()
            .with(
                eq(9),
                eq(Event(TIMER1_BASE + 0x140)),
                eq(Task(RADIO_BASE + 0x004)),
            )
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        fabric
            .expect_bind()
            .with(eq(8), eq(end), eq(clear))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        fabric
            .expect_bind()
            .with(
                eq(10),
                eq(Event(TIMER1_BASE + 0x144)),
                eq(Task(RADIO_BASE + 0x000)),
            )
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        fabric
            .expect_fork()
            .with(eq(8), eq(Some(Task(PPI_BASE))))
            .times(1)
            .return_const(());
        fabric
            .expect_fork()
            .with(eq(9), eq(Some(Task(PPI_BASE + 4))))
            .times(1)
            .return_const(());
        fabric
            .expect_fork()
            .with(eq(8), eq(Some(Task(PPI_BASE + 8))))
            .times(1)
            .return_const(());
        fabric
            .expect_fork()
            .with(eq(10), eq(Some(Task(PPI_BASE + 12))))
            .times(1)
            .return_const(());

        fabric
            .expect_enable()
            .with(eq(1 << 8))
            .times(2)
            .return_const(());

        permit_setup(&mut fabric);
        let mut radio = Radio::new(mocks.resources(), fabric, Config::default()).unwrap();
        radio.set_phy(Phy::Le1M);
        radio.tifs_set(150);

        radio.switch_complete_and_rx(Phy::Le1M);
        assert_eq!(mocks.timer1.read(0x540), 109);
        assert_eq!(mocks.radio.read(0x200), 1 | 1 << 20);

        radio.switch_complete_and_tx(Phy::Le1M, Phy::Le1M).unwrap();
        assert_eq!(mocks.timer1.read(0x544), 100);
        assert_eq!(mocks.radio.read(0x200), 1 | 1 << 1);
    }

    #[test]
    fn test_dual_timer_coded_rx_arms_both_schedules() {
        let mocks = Mocks::new();
        let mut fabric = group_task_fabric();
        fabric.expect_bind().return_const(());
        fabric.expect_fork().return_const(());
        fabric
            .expect_enable()
            .with(eq(1 << 8 | 1 << 13))
            .times(1)
            .return_const(());
        fabric
            .expect_group_assign()
            .with(eq(0), eq(1 << 9 | 1 << 11))
            .times(1)
            .return_const(());

        permit_setup(&mut fabric);
        let mut radio = Radio::new(mocks.resources(), fabric, coded_config()).unwrap();
        radio.tifs_set(150);
        radio
            .switch_complete_and_tx(Phy::CodedS2, Phy::CodedS8)
            .unwrap();

        let timing = *radio.timing();
        let s8 = schedule(Direction::Rx, Direction::Tx, Phy::CodedS8, Phy::CodedS8);
        let s2 = schedule(Direction::Rx, Direction::Tx, Phy::CodedS2, Phy::CodedS8);
        assert_eq!(Ok(mocks.timer1.read(0x540)), s8.compare_us(&timing, 150));
        assert_eq!(Ok(mocks.timer1.read(0x548)), s2.compare_us(&timing, 150));
    }

    #[test]
    fn test_uncalibrated_coded_turnaround_arms_nothing() {
        let mocks = Mocks::new();
        let mut radio =
            Radio::new(mocks.resources(), accepting_fabric(), Config::default()).unwrap();
        radio.tifs_set(150);

        assert_eq!(
            radio.switch_complete_and_tx(Phy::CodedS2, Phy::CodedS8),
            Err(Error::Unsupported)
        );
        assert_eq!(
            radio.switch_complete_and_b2b_rx(Phy::CodedS8, Phy::Le1M),
            Err(Error::Unsupported)
        );
        assert_eq!(mocks.timer1.read(0x540), 0);
        assert_eq!(mocks.radio.read(0x200), 0);

        // A coded transmission is still followed by a turnaround
        radio.switch_complete_and_b2b_tx(Phy::CodedS8, Phy::CodedS8);
        assert_eq!(mocks.radio.read(0x200), 1 | 1 << 20);
    }

    #[test]
    fn test_dual_timer_compensation_arms_early_compare() {
        let mocks = Mocks::new();
        let mut fabric = group_task_fabric();
        fabric.expect_bind().return_const(());
        fabric.expect_fork().return_const(());
        fabric
            .expect_enable()
            .with(eq(1 << 8 | 1 << 15))
            .times(1)
            .return_const(());

        let config = Config {
            calibration: Some(Calibration {
                end_evt_delay_us: 7,
                coded_rx_chain_delay_s2_ns: None,
                coded_rx_chain_delay_s8_ns: None,
            }),
            ..Default::default()
        };
        permit_setup(&mut fabric);
        let mut radio = Radio::new(mocks.resources(), fabric, config).unwrap();
        radio.tifs_set(150);

        let result = radio.switch_complete_with_delay_compensation_and_tx(Phy::Le1M, Phy::Le1M);
        assert_eq!(result, Ok(()));
        assert_eq!(mocks.timer1.read(0x540), 100);
        assert_eq!(mocks.timer1.read(0x548), 93);
    }

    const TXEN: Task = Task(RADIO_BASE + regs::TASKS_TXEN);
    const RXEN: Task = Task(RADIO_BASE + regs::TASKS_RXEN);

    fn radio_event(offset: u32) -> Event {
        Event(RADIO_BASE + offset)
    }

    fn coded_rx_then_tx(packet: RxPacket) -> Sim {
        let sim = Sim::new();
        let mut radio = sim.radio(coded_config()).unwrap();

        radio.prepare();
        radio.set_phy(Phy::CodedS8);
        radio.tifs_set(150);
        radio
            .switch_complete_and_tx(Phy::CodedS2, Phy::CodedS8)
            .unwrap();
        radio.tmr_start_us(Direction::Rx, 100);

        sim.inject_rx(packet);
        sim.run_for_us(1600);
        assert!(sim.task_times(TXEN).is_empty());
        sim.run_for_us(100);

        // RXEN at 100 us, 40.3 us ramp-up, address after 400 us, 1000 us of PDU
        assert_eq!(sim.event_times(radio_event(regs::EVENTS_END)), [1_540_300]);
        sim
    }

    #[test]
    fn test_rate_boost_selects_s2_turnaround() {
        let sim = coded_rx_then_tx(RxPacket::new(400, 1000).with_rateboost(100));

        // 150 - round(42.3 + 25.6)
        assert_eq!(sim.task_times(TXEN), [1_540_300 + 82_000]);
    }

    #[test]
    fn test_missing_rate_boost_keeps_s8_turnaround() {
        let sim = coded_rx_then_tx(RxPacket::new(400, 1000));

        // 150 - round(42.3 + 30.0), the S2 compare follows but its group is disabled by then
        assert_eq!(sim.task_times(TXEN), [1_540_300 + 78_000]);
    }

    fn compensated_rx_then_tx(packet: RxPacket) -> Sim {
        let sim = Sim::new();
        let config = Config {
            calibration: Some(Calibration {
                end_evt_delay_us: 7,
                coded_rx_chain_delay_s2_ns: None,
                coded_rx_chain_delay_s8_ns: None,
            }),
            ..Default::default()
        };
        let mut radio = sim.radio(config).unwrap();

        radio.prepare();
        radio.set_phy(Phy::Le1M);
        radio.df_configure_cte_inline(true);
        radio.tifs_set(150);
        radio
            .switch_complete_with_delay_compensation_and_tx(Phy::Le1M, Phy::Le1M)
            .unwrap();
        radio.tmr_start_us(Direction::Rx, 100);

        sim.set_cte_end_delay_us(7);
        sim.inject_rx(packet);
        sim.run_for_us(550);
        sim
    }

    #[test]
    fn test_compensation_meets_tifs_without_cte() {
        let sim = compensated_rx_then_tx(RxPacket::new(40, 200));

        let pdu_end = 140_300 + 240_000;
        assert_eq!(
            sim.event_times(radio_event(regs::EVENTS_END)),
            [pdu_end + 7_000]
        );
        assert_eq!(sim.task_times(TXEN), [pdu_end + 100_000]);
    }

    #[test]
    fn test_cte_present_cancels_compensation() {
        let sim = compensated_rx_then_tx(RxPacket::new(40, 200).with_cte(2));

        let end = 140_300 + 240_000 + 16_000;
        assert_eq!(sim.event_times(radio_event(regs::EVENTS_END)), [end]);
        assert_eq!(sim.task_times(TXEN), [end + 100_000]);
    }

    #[test]
    fn test_tx_to_rx_turnaround_within_tifs() {
        let sim = Sim::new();
        let mut radio = sim.radio(Config::default()).unwrap();

        radio.prepare();
        radio.set_phy(Phy::Le1M);
        radio.tifs_set(150);
        radio.switch_complete_and_rx(Phy::Le1M);
        radio.tmr_start_us(Direction::Tx, 100);
        sim.run_for_us(700);

        let phy_end = 140_900 + 376_000;
        assert_eq!(
            sim.event_times(radio_event(regs::EVENTS_PHYEND)),
            [phy_end]
        );
        assert_eq!(sim.task_times(RXEN), [phy_end + 109_000]);

        let ready = sim.event_times(radio_event(regs::EVENTS_READY));
        assert_eq!(ready, [140_900, phy_end + 109_000 + 40_300]);
        assert!(ready[1] <= phy_end + 150_000);
    }

    #[test]
    fn test_hardware_tifs_turnaround() {
        let sim = Sim::new();
        let config = Config {
            switch: SwitchStrategy::HardwareAutoTifs,
            ..Default::default()
        };
        let mut radio = sim.radio(config).unwrap();

        radio.prepare();
        radio.set_phy(Phy::Le1M);
        radio.tifs_set(150);
        radio.switch_complete_and_rx(Phy::Le1M);
        radio.tmr_start_us(Direction::Tx, 100);
        sim.run_for_us(700);

        let end = 140_900 + 376_000;
        assert_eq!(
            sim.event_times(radio_event(regs::EVENTS_READY)),
            [140_900, end + 150_000]
        );
    }
}
