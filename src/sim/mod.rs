//! Software model of the nRF52833 blocks driven by the radio engine
//!
//! [`Sim`] holds the register files of RADIO, TIMER0, TIMER1, TIMER3, RTC0, PPI and CCM/AAR and
//! models their behavior closely enough to run radio events on a host:
//!
//! * timers count microseconds and generate compare events,
//! * PPI routes events to tasks in channel index order, including forks, groups and the
//!   pre-programmed channels,
//! * the radio ramps up with the delays of the timing table, sends packets of a configured air
//!   time, receives injected packets and follows its shorts,
//! * CCM and AAR complete instantly.
//!
//! Time advances only in [`run_for_us`](Sim::run_for_us). Every task and event is recorded with
//! the time it happened, tests inspect the record afterwards.
//!
//! ```
//! # #[macro_use] extern crate nrf_ble_radio;
//! # missing_test_fns!();
//! # fn main() {
//! use nrf_ble_radio::radio::{Config, Direction, Phy};
//! use nrf_ble_radio::sim::Sim;
//!
//! let sim = Sim::new();
//! let mut radio = sim.radio(Config::default()).unwrap();
//!
//! radio.prepare();
//! radio.set_phy(Phy::Le1M);
//! radio.tmr_start_now(Direction::Tx);
//! sim.run_for_us(100);
//! assert!(radio.is_ready());
//! # }
//! ```

mod radio;
mod timer;

pub use radio::RxPacket;

use radio::{RadioModel, Step};
use timer::TimerModel;

use crate::error::Error;
use crate::hw::nrf52833::{self, ccm, ppi, timer as tregs};
use crate::hw::ppi::Ppi;
use crate::hw::{Event, Peripheral, Task};
use crate::radio::{Config, Radio, Resources, SwitchStrategy};

use std::cell::RefCell;
use std::collections::VecDeque;

/// Simulated peripheral instance
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeriphId {
    /// RADIO
    Radio,
    /// TIMER0, event timer of the dual timer strategy
    Timer0,
    /// TIMER1, switch timer of the dual timer strategy
    Timer1,
    /// TIMER3, event timer of the single timer strategy
    Timer3,
    /// RTC0, source of tick events
    Rtc0,
    /// PPI
    Ppi,
    /// CCM and AAR
    CcmAar,
}

const PERIPHS: [PeriphId; 7] = [
    PeriphId::Radio,
    PeriphId::Timer0,
    PeriphId::Timer1,
    PeriphId::Timer3,
    PeriphId::Rtc0,
    PeriphId::Ppi,
    PeriphId::CcmAar,
];

impl PeriphId {
    /// Bus address of the register block
    pub const fn base(self) -> u32 {
        match self {
            PeriphId::Radio => nrf52833::RADIO_BASE,
            PeriphId::Timer0 => nrf52833::TIMER0_BASE,
            PeriphId::Timer1 => nrf52833::TIMER1_BASE,
            PeriphId::Timer3 => nrf52833::TIMER3_BASE,
            PeriphId::Rtc0 => nrf52833::RTC0_BASE,
            PeriphId::Ppi => nrf52833::PPI_BASE,
            PeriphId::CcmAar => nrf52833::CCM_AAR_BASE,
        }
    }

    fn decode(address: u32) -> Option<(PeriphId, u32)> {
        PERIPHS
            .iter()
            .find(|p| p.base() == address & !0xFFF)
            .map(|p| (*p, address & 0xFFF))
    }

    fn timer_slot(self) -> Option<usize> {
        match self {
            PeriphId::Timer0 => Some(0),
            PeriphId::Timer1 => Some(1),
            PeriphId::Timer3 => Some(2),
            _ => None,
        }
    }
}

const TIMERS: [PeriphId; 3] = [PeriphId::Timer0, PeriphId::Timer1, PeriphId::Timer3];

/// Kind of a recorded signal
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Signal {
    /// A task got triggered, by software or through PPI
    Task,
    /// An event got generated
    Event,
}

/// One entry of the trace
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Record {
    /// Simulated time in nanoseconds
    pub time_ns: u64,
    /// Task or event
    pub signal: Signal,
    /// Bus address of the task or event register
    pub address: u32,
}

/// Simulated SoC
pub struct Sim {
    state: RefCell<State>,
}

/// Register access to one simulated peripheral
#[derive(Clone, Copy)]
pub struct SimPeripheral<'a> {
    sim: &'a Sim,
    id: PeriphId,
}

enum Happening {
    Radio(usize),
    Compare(usize, u8),
}

struct State {
    now: u64,
    regs: [[u32; 1024]; PERIPHS.len()],
    timers: [TimerModel; 3],
    radio: RadioModel,
    pending: VecDeque<(Signal, u32)>,
    trace: Vec<Record>,
    aar_result: Option<u8>,
    mic_ok: bool,
}

impl Default for Sim {
    fn default() -> Self {
        Self::new()
    }
}

impl Sim {
    /// Create a SoC with all registers at zero, at time zero
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State {
                now: 0,
                regs: [[0; 1024]; PERIPHS.len()],
                timers: Default::default(),
                radio: RadioModel::default(),
                pending: VecDeque::new(),
                trace: Vec::new(),
                aar_result: None,
                mic_ok: true,
            }),
        }
    }

    /// Register access to `id`
    pub fn peripheral(&self, id: PeriphId) -> SimPeripheral<'_> {
        SimPeripheral { sim: self, id }
    }

    /// Peripherals for a radio engine using `strategy`
    pub fn resources(&self, strategy: SwitchStrategy) -> Resources<SimPeripheral<'_>> {
        let (event_timer, switch_timer) = match strategy {
            SwitchStrategy::SoftwareSingleTimer => (PeriphId::Timer3, None),
            SwitchStrategy::SoftwareDualTimer => (PeriphId::Timer0, Some(PeriphId::Timer1)),
            SwitchStrategy::HardwareAutoTifs => (PeriphId::Timer0, None),
        };

        Resources {
            radio: self.peripheral(PeriphId::Radio),
            event_timer: self.peripheral(event_timer),
            switch_timer: switch_timer.map(|id| self.peripheral(id)),
            ccm_aar: self.peripheral(PeriphId::CcmAar),
        }
    }

    /// PPI fabric of the SoC
    pub fn ppi(&self) -> Ppi<SimPeripheral<'_>> {
        Ppi::new(self.peripheral(PeriphId::Ppi))
    }

    /// Radio engine running on the SoC
    pub fn radio(&self, config: Config) -> Result<Radio<SimPeripheral<'_>>, Error> {
        Radio::new(self.resources(config.switch), self.ppi(), config)
    }

    /// Simulated time in nanoseconds
    pub fn now_ns(&self) -> u64 {
        self.state.borrow().now
    }

    /// Simulated time in microseconds, rounded down
    pub fn now_us(&self) -> u64 {
        self.now_ns() / 1000
    }

    /// Advance time by `us`, executing everything scheduled on the way
    pub fn run_for_us(&self, us: u32) {
        let target = self.now_ns() + us as u64 * 1000;
        self.run_until_ns(target);
    }

    /// Advance time to `target` nanoseconds
    pub fn run_until_ns(&self, target: u64) {
        let mut state = self.state.borrow_mut();

        while let Some((at, happening)) = state.next_happening() {
            if at > target {
                break;
            }
            state.now = at;
            state.happen(happening);
            state.process();
        }

        state.now = state.now.max(target);
    }

    /// Generate `event` now, like a peripheral outside of the model would
    pub fn raise(&self, event: Event) {
        let mut state = self.state.borrow_mut();
        state.pending.push_back((Signal::Event, event.0));
        state.process();
    }

    /// Queue a packet for the next reception
    pub fn inject_rx(&self, packet: RxPacket) {
        self.state.borrow_mut().radio.rx_queue.push_back(packet);
    }

    /// Air time of transmitted packets, from START to END
    pub fn set_tx_air_time_us(&self, us: u32) {
        self.state.borrow_mut().radio.tx_air_us = us;
    }

    /// Delay of END after a PDU without CTE while CTE inline parsing is enabled
    pub fn set_cte_end_delay_us(&self, us: u32) {
        self.state.borrow_mut().radio.cte_end_delay_us = us;
    }

    /// RSSI reported by the next measurement, in -dBm
    pub fn set_rssi(&self, rssi: u8) {
        self.state.borrow_mut().radio.rssi = rssi;
    }

    /// Outcome of the next address resolutions, the index of the matching IRK
    pub fn set_aar_result(&self, result: Option<u8>) {
        self.state.borrow_mut().aar_result = result;
    }

    /// MIC check outcome of the next decryptions
    pub fn set_mic_ok(&self, ok: bool) {
        self.state.borrow_mut().mic_ok = ok;
    }

    /// Counter value of a timer now
    pub fn counter(&self, id: PeriphId) -> Option<u32> {
        let state = self.state.borrow();
        id.timer_slot()
            .map(|slot| state.timers[slot].counter(state.now))
    }

    /// Copy of the register file of `id`
    pub fn registers(&self, id: PeriphId) -> [u32; 1024] {
        self.state.borrow().regs[id as usize]
    }

    /// Everything recorded so far
    pub fn trace(&self) -> Vec<Record> {
        self.state.borrow().trace.clone()
    }

    /// Times in nanoseconds at which `task` got triggered
    pub fn task_times(&self, task: Task) -> Vec<u64> {
        self.times(Signal::Task, task.0)
    }

    /// Times in nanoseconds at which `event` got generated
    pub fn event_times(&self, event: Event) -> Vec<u64> {
        self.times(Signal::Event, event.0)
    }

    fn times(&self, signal: Signal, address: u32) -> Vec<u64> {
        self.state
            .borrow()
            .trace
            .iter()
            .filter(|r| r.signal == signal && r.address == address)
            .map(|r| r.time_ns)
            .collect()
    }
}

impl Peripheral for SimPeripheral<'_> {
    fn base(&self) -> u32 {
        self.id.base()
    }

    fn read(&self, offset: u32) -> u32 {
        self.sim.state.borrow().reg(self.id, offset)
    }

    fn write(&self, offset: u32, value: u32) {
        let mut state = self.sim.state.borrow_mut();
        state.write(self.id, offset, value);
        state.process();
    }
}

impl State {
    fn reg(&self, id: PeriphId, offset: u32) -> u32 {
        self.regs[id as usize][(offset / 4) as usize]
    }

    fn set_reg(&mut self, id: PeriphId, offset: u32, value: u32) {
        self.regs[id as usize][(offset / 4) as usize] = value;
    }

    fn write(&mut self, id: PeriphId, offset: u32, value: u32) {
        debug_assert!(offset % 4 == 0 && offset < 0x1000);

        // Task registers are write-only, writing 0 has no effect
        if offset < 0x100 {
            if value != 0 {
                self.pending.push_back((Signal::Task, id.base() + offset));
            }
            return;
        }

        match id {
            PeriphId::Ppi if offset == ppi::CHENSET => {
                let chen = self.reg(id, ppi::CHEN);
                self.set_reg(id, ppi::CHEN, chen | value);
            }
            PeriphId::Ppi if offset == ppi::CHENCLR => {
                let chen = self.reg(id, ppi::CHEN);
                self.set_reg(id, ppi::CHEN, chen & !value);
            }
            PeriphId::Radio => self.radio_write(offset, value),
            _ => self.set_reg(id, offset, value),
        }
    }

    /// Execute queued tasks and events until nothing is left
    fn process(&mut self) {
        while let Some((signal, address)) = self.pending.pop_front() {
            self.trace.push(Record {
                time_ns: self.now,
                signal,
                address,
            });

            let Some((id, offset)) = PeriphId::decode(address) else {
                continue;
            };

            match signal {
                Signal::Task => self.task(id, offset),
                Signal::Event => self.event(id, offset),
            }
        }
    }

    fn task(&mut self, id: PeriphId, offset: u32) {
        match id {
            PeriphId::Radio => self.radio_task(offset),
            PeriphId::Timer0 | PeriphId::Timer1 | PeriphId::Timer3 => self.timer_task(id, offset),
            PeriphId::Ppi => self.group_task(offset),
            PeriphId::CcmAar => self.ccm_aar_task(offset),
            PeriphId::Rtc0 => {}
        }
    }

    fn event(&mut self, id: PeriphId, offset: u32) {
        self.set_reg(id, offset, 1);

        self.route(id.base() + offset);

        match id {
            PeriphId::Radio => self.radio_event(offset),
            PeriphId::CcmAar
                if offset == ccm::EVENTS_ENDKSGEN
                    && self.reg(id, ccm::ENABLE) == ccm::ENABLE_ENABLED
                    && self.reg(id, ccm::SHORTS) & ccm::SHORTS_ENDKSGEN_CRYPT != 0 =>
            {
                self.pending
                    .push_back((Signal::Task, id.base() + ccm::TASKS_CRYPT));
            }
            _ => {}
        }
    }

    /// Queue the tasks of every enabled channel listening to `event`
    fn route(&mut self, event: u32) {
        let chen = self.reg(PeriphId::Ppi, ppi::CHEN);

        for channel in 0..ppi::NUM_CHANNELS {
            if chen & (1 << channel) == 0 {
                continue;
            }

            let (eep, tep, fork) = if channel < ppi::NUM_PROGRAMMABLE {
                (
                    self.reg(PeriphId::Ppi, ppi::eep(channel)),
                    self.reg(PeriphId::Ppi, ppi::tep(channel)),
                    self.reg(PeriphId::Ppi, ppi::fork_tep(channel)),
                )
            } else {
                match nrf52833::preprogrammed_route(channel) {
                    Some((eep, tep)) => (eep, tep, 0),
                    None => continue,
                }
            };

            if eep != event {
                continue;
            }
            for task in [tep, fork] {
                if task != 0 {
                    self.pending.push_back((Signal::Task, task));
                }
            }
        }
    }

    fn group_task(&mut self, offset: u32) {
        if offset >= 8 * ppi::NUM_GROUPS as u32 {
            return;
        }

        let group = (offset / 8) as u8;
        let members = self.reg(PeriphId::Ppi, ppi::chg(group));
        let chen = self.reg(PeriphId::Ppi, ppi::CHEN);
        let chen = if offset % 8 == ppi::TASKS_CHG0_EN {
            chen | members
        } else {
            chen & !members
        };
        self.set_reg(PeriphId::Ppi, ppi::CHEN, chen);
    }

    fn timer_task(&mut self, id: PeriphId, offset: u32) {
        let Some(slot) = id.timer_slot() else {
            return;
        };
        let now = self.now;
        let timer = &mut self.timers[slot];

        match offset {
            tregs::TASKS_START => timer.start(now),
            tregs::TASKS_STOP => timer.stop(now),
            tregs::TASKS_CLEAR => timer.clear(now),
            tregs::TASKS_SHUTDOWN => timer.shutdown(),
            o if (tregs::TASKS_CAPTURE0..tregs::TASKS_CAPTURE0 + 4 * tregs::MAX_CC as u32)
                .contains(&o) =>
            {
                let cc = (o - tregs::TASKS_CAPTURE0) / 4;
                let value = timer.counter(now);
                self.set_reg(id, tregs::CC0 + 4 * cc, value);
            }
            _ => {}
        }
    }

    fn ccm_aar_task(&mut self, offset: u32) {
        let id = PeriphId::CcmAar;
        let base = id.base();

        match self.reg(id, ccm::ENABLE) {
            ccm::ENABLE_ENABLED => match offset {
                ccm::TASKS_KSGEN => self
                    .pending
                    .push_back((Signal::Event, base + ccm::EVENTS_ENDKSGEN)),
                ccm::TASKS_CRYPT => {
                    self.set_reg(id, ccm::MICSTATUS, self.mic_ok as u32);
                    self.pending
                        .push_back((Signal::Event, base + ccm::EVENTS_ENDCRYPT));
                }
                _ => {}
            },
            nrf52833::aar::ENABLE_ENABLED if offset == nrf52833::aar::TASKS_START => {
                let result = match self.aar_result {
                    Some(idx) => {
                        self.set_reg(id, nrf52833::aar::STATUS, idx as u32);
                        nrf52833::aar::EVENTS_RESOLVED
                    }
                    None => nrf52833::aar::EVENTS_NOTRESOLVED,
                };
                self.pending.push_back((Signal::Event, base + result));
                self.pending
                    .push_back((Signal::Event, base + nrf52833::aar::EVENTS_END));
            }
            _ => {}
        }
    }

    fn next_happening(&self) -> Option<(u64, Happening)> {
        let mut next = self
            .radio
            .next_step()
            .map(|(at, idx)| (at, Happening::Radio(idx)));

        for (slot, id) in TIMERS.iter().enumerate() {
            let count = if *id == PeriphId::Timer3 { 6 } else { 4 };
            let mut ccs = [0; tregs::MAX_CC];
            for (cc, value) in ccs.iter_mut().enumerate().take(count) {
                *value = self.reg(*id, tregs::CC0 + 4 * cc as u32);
            }

            if let Some((at, cc)) = self.timers[slot].next_compare(self.now, &ccs[..count]) {
                if next.as_ref().map_or(true, |(best, _)| at < *best) {
                    next = Some((at, Happening::Compare(slot, cc)));
                }
            }
        }

        next
    }

    fn happen(&mut self, happening: Happening) {
        match happening {
            Happening::Radio(idx) => {
                let step = self.radio.take_step(idx);
                self.radio_step(step);
            }
            Happening::Compare(slot, cc) => {
                self.timers[slot].mark_fired(cc, self.now);
                let event = TIMERS[slot].base() + tregs::EVENTS_COMPARE0 + 4 * cc as u32;
                self.pending.push_back((Signal::Event, event));
            }
        }
    }

    fn schedule(&mut self, delay_ns: u64, step: Step) {
        let at = self.now + delay_ns;
        self.radio.schedule.push((at, step));
    }
}
