//! RADIO model
//!
//! The radio walks through the states of the product specification. Ramp-up takes the delay of
//! the timing table for the mode and ramp-up configured in MODE and MODECNF0. Packets on air are
//! reduced to the instants of their events.

use super::{PeriphId, Signal, State};
use crate::hw::nrf52833::radio as regs;
use crate::radio::{Direction, Phy, RampUp, Soc, Timing};

use std::collections::VecDeque;

const TX_DISABLE_NS: u64 = 6_000;
const RX_DISABLE_NS: u64 = 1_000;
const RSSI_SETTLE_NS: u64 = 250;
/// CTEInfo is known once the header is received
const HEADER_US: u32 = 16;
/// Guard and reference period preceding the switch slots of a CTE
const CTE_REFERENCE_US: u32 = 12;

/// Packet arriving at the simulated receiver
///
/// Times are counted from the START task of the receiver.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct RxPacket {
    /// Access address matched, ADDRESS generated
    pub address_after_us: u32,
    /// PDU and CRC on air after the access address
    pub duration_us: u32,
    /// RATEBOOST after the access address, for an LE Coded packet using S2
    pub rateboost_after_us: Option<u32>,
    /// CTE following the packet, in 8 us units
    pub cte_time: Option<u8>,
    /// CRC check outcome
    pub crc_ok: bool,
}

impl RxPacket {
    /// Packet with a valid CRC, without rate boost and CTE
    pub fn new(address_after_us: u32, duration_us: u32) -> Self {
        Self {
            address_after_us,
            duration_us,
            rateboost_after_us: None,
            cte_time: None,
            crc_ok: true,
        }
    }

    /// Switch to S2 coding `after_us` after the access address
    pub fn with_rateboost(self, after_us: u32) -> Self {
        Self {
            rateboost_after_us: Some(after_us),
            ..self
        }
    }

    /// Append a CTE of `time` 8 us units
    pub fn with_cte(self, time: u8) -> Self {
        Self {
            cte_time: Some(time),
            ..self
        }
    }

    /// Fail the CRC check
    pub fn with_crc_error(self) -> Self {
        Self {
            crc_ok: false,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum RadioState {
    Disabled,
    RampUp(Direction),
    Idle(Direction),
    Active(Direction),
    Disabling(Direction),
}

impl RadioState {
    fn register(self) -> u32 {
        match self {
            RadioState::Disabled => regs::STATE_DISABLED,
            RadioState::RampUp(Direction::Rx) => regs::STATE_RXRU,
            RadioState::Idle(Direction::Rx) => regs::STATE_RXIDLE,
            RadioState::Active(Direction::Rx) => regs::STATE_RX,
            RadioState::Disabling(Direction::Rx) => regs::STATE_RXDISABLE,
            RadioState::RampUp(Direction::Tx) => regs::STATE_TXRU,
            RadioState::Idle(Direction::Tx) => regs::STATE_TXIDLE,
            RadioState::Active(Direction::Tx) => regs::STATE_TX,
            RadioState::Disabling(Direction::Tx) => regs::STATE_TXDISABLE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(super) enum Step {
    Ready,
    Address,
    RateBoost,
    CtePresent,
    End { crc_ok: bool, s2: bool, cte_time: Option<u8> },
    Disabled,
    BcMatch,
    RssiEnd,
}

pub(super) struct RadioModel {
    state: RadioState,
    pub(super) schedule: Vec<(u64, Step)>,
    pub(super) rx_queue: VecDeque<RxPacket>,
    pub(super) tx_air_us: u32,
    pub(super) cte_end_delay_us: u32,
    pub(super) rssi: u8,
    last_end: Option<u64>,
    short_enable: bool,
}

impl Default for RadioModel {
    fn default() -> Self {
        Self {
            state: RadioState::Disabled,
            schedule: Vec::new(),
            rx_queue: VecDeque::new(),
            tx_air_us: 376,
            cte_end_delay_us: 0,
            rssi: 0,
            last_end: None,
            short_enable: false,
        }
    }
}

impl RadioModel {
    /// Earliest scheduled step, the first scheduled one wins a tie
    pub(super) fn next_step(&self) -> Option<(u64, usize)> {
        let mut next: Option<(u64, usize)> = None;
        for (idx, (at, _)) in self.schedule.iter().enumerate() {
            if next.map_or(true, |(best, _)| *at < best) {
                next = Some((*at, idx));
            }
        }
        next
    }

    pub(super) fn take_step(&mut self, idx: usize) -> Step {
        self.schedule.remove(idx).1
    }

    fn power_off(&mut self) {
        self.state = RadioState::Disabled;
        self.schedule.clear();
        self.last_end = None;
        self.short_enable = false;
    }
}

impl State {
    pub(super) fn radio_write(&mut self, offset: u32, value: u32) {
        if offset == regs::POWER && value == 0 {
            self.radio.power_off();
            self.regs[PeriphId::Radio as usize] = [0; 1024];
        }
        if offset != regs::STATE {
            self.set_reg(PeriphId::Radio, offset, value);
        }
    }

    pub(super) fn radio_task(&mut self, offset: u32) {
        match offset {
            regs::TASKS_TXEN => self.radio_enable(Direction::Tx),
            regs::TASKS_RXEN => self.radio_enable(Direction::Rx),
            regs::TASKS_START => self.radio_start(),
            regs::TASKS_DISABLE => self.radio_disable(),
            regs::TASKS_RSSISTART => self.schedule(RSSI_SETTLE_NS, Step::RssiEnd),
            regs::TASKS_BCSTART => {
                let bits = self.reg(PeriphId::Radio, regs::BCC) as u64;
                self.schedule(bits * self.bit_ns(), Step::BcMatch);
            }
            _ => {}
        }
    }

    /// Apply the shorts triggered by `offset`
    pub(super) fn radio_event(&mut self, offset: u32) {
        let shorts = self.reg(PeriphId::Radio, regs::SHORTS);
        let links: &[(u32, u32)] = match offset {
            regs::EVENTS_READY => &[(regs::SHORTS_READY_START, regs::TASKS_START)],
            regs::EVENTS_ADDRESS => &[
                (regs::SHORTS_ADDRESS_RSSISTART, regs::TASKS_RSSISTART),
                (regs::SHORTS_ADDRESS_BCSTART, regs::TASKS_BCSTART),
            ],
            regs::EVENTS_END => &[
                (regs::SHORTS_END_DISABLE, regs::TASKS_DISABLE),
                (regs::SHORTS_END_START, regs::TASKS_START),
            ],
            regs::EVENTS_PHYEND => &[(regs::SHORTS_PHYEND_DISABLE, regs::TASKS_DISABLE)],
            regs::EVENTS_DISABLED => &[
                (regs::SHORTS_DISABLED_TXEN, regs::TASKS_TXEN),
                (regs::SHORTS_DISABLED_RXEN, regs::TASKS_RXEN),
                (regs::SHORTS_DISABLED_RSSISTOP, regs::TASKS_RSSISTOP),
            ],
            _ => &[],
        };

        for (short, task) in links {
            if shorts & short == 0 {
                continue;
            }
            if matches!(*task, regs::TASKS_TXEN | regs::TASKS_RXEN) {
                self.radio.short_enable = true;
            }
            self.pending
                .push_back((Signal::Task, PeriphId::Radio.base() + task));
        }
    }

    pub(super) fn radio_step(&mut self, step: Step) {
        let mut events = Vec::with_capacity(3);

        match step {
            Step::Ready => {
                if let RadioState::RampUp(dir) = self.radio.state {
                    self.set_radio_state(RadioState::Idle(dir));
                    events.push(regs::EVENTS_READY);
                    events.push(match dir {
                        Direction::Tx => regs::EVENTS_TXREADY,
                        Direction::Rx => regs::EVENTS_RXREADY,
                    });
                }
            }
            Step::Address => events.push(regs::EVENTS_ADDRESS),
            Step::RateBoost => events.push(regs::EVENTS_RATEBOOST),
            Step::CtePresent => events.push(regs::EVENTS_CTEPRESENT),
            Step::End {
                crc_ok,
                s2,
                cte_time,
            } => {
                let RadioState::Active(dir) = self.radio.state else {
                    return;
                };
                self.set_radio_state(RadioState::Idle(dir));
                self.radio.last_end = Some(self.now);

                events.push(regs::EVENTS_END);
                events.push(regs::EVENTS_PHYEND);
                if dir == Direction::Rx {
                    self.packet_status(crc_ok, s2, cte_time);
                    events.push(if crc_ok {
                        regs::EVENTS_CRCOK
                    } else {
                        regs::EVENTS_CRCERROR
                    });
                }
            }
            Step::Disabled => {
                self.set_radio_state(RadioState::Disabled);
                events.push(regs::EVENTS_DISABLED);
            }
            Step::BcMatch => events.push(regs::EVENTS_BCMATCH),
            Step::RssiEnd => {
                self.set_reg(PeriphId::Radio, regs::RSSISAMPLE, self.radio.rssi as u32);
                events.push(regs::EVENTS_RSSIEND);
            }
        }

        for event in events {
            self.pending
                .push_back((Signal::Event, PeriphId::Radio.base() + event));
        }
    }

    fn radio_enable(&mut self, dir: Direction) {
        let from_short = core::mem::take(&mut self.radio.short_enable);
        if self.radio.state != RadioState::Disabled {
            return;
        }

        let ready = self.now + self.radio_timing().ready_delay_ns(dir, self.radio_phy()) as u64;
        // The inter frame space register applies to enables from the DISABLED shorts
        let at = match (from_short, self.radio.last_end) {
            (true, Some(end)) => {
                let tifs = self.reg(PeriphId::Radio, regs::TIFS) as u64;
                ready.max(end + tifs * 1000)
            }
            _ => ready,
        };

        self.set_radio_state(RadioState::RampUp(dir));
        self.radio.schedule.push((at, Step::Ready));
    }

    fn radio_start(&mut self) {
        match self.radio.state {
            RadioState::Idle(Direction::Tx) => {
                self.set_radio_state(RadioState::Active(Direction::Tx));
                let address_us = match self.radio_phy() {
                    Phy::Le1M => 40,
                    Phy::Le2M => 24,
                    Phy::CodedS2 | Phy::CodedS8 => 336,
                };
                let air_us = self.radio.tx_air_us.max(address_us + 1);
                self.schedule(address_us as u64 * 1000, Step::Address);
                self.schedule(
                    air_us as u64 * 1000,
                    Step::End {
                        crc_ok: true,
                        s2: false,
                        cte_time: None,
                    },
                );
            }
            RadioState::Idle(Direction::Rx) => {
                self.set_radio_state(RadioState::Active(Direction::Rx));
                if let Some(packet) = self.radio.rx_queue.pop_front() {
                    self.receive(packet);
                }
            }
            _ => {}
        }
    }

    fn receive(&mut self, packet: RxPacket) {
        let address = packet.address_after_us;
        let pdu_end = address + packet.duration_us;

        self.schedule(address as u64 * 1000, Step::Address);
        if let Some(after) = packet.rateboost_after_us {
            self.schedule((address + after) as u64 * 1000, Step::RateBoost);
        }

        let inline = self.reg(PeriphId::Radio, regs::CTEINLINECONF) & regs::CTEINLINECONF_ENABLE != 0;
        let end = match packet.cte_time {
            Some(time) => {
                let header = address + HEADER_US.min(packet.duration_us);
                self.schedule(header as u64 * 1000, Step::CtePresent);
                pdu_end + 8 * time as u32
            }
            // The receiver keeps waiting for a CTE that does not come
            None if inline => pdu_end + self.radio.cte_end_delay_us,
            None => pdu_end,
        };

        self.schedule(
            end as u64 * 1000,
            Step::End {
                crc_ok: packet.crc_ok,
                s2: packet.rateboost_after_us.is_some(),
                cte_time: packet.cte_time,
            },
        );
    }

    fn radio_disable(&mut self) {
        let dir = match self.radio.state {
            RadioState::Disabled | RadioState::Disabling(_) => return,
            RadioState::RampUp(dir) | RadioState::Idle(dir) | RadioState::Active(dir) => dir,
        };

        self.radio.schedule.clear();
        self.set_radio_state(RadioState::Disabling(dir));
        let delay = match dir {
            Direction::Tx => TX_DISABLE_NS,
            Direction::Rx => RX_DISABLE_NS,
        };
        self.schedule(delay, Step::Disabled);
    }

    fn packet_status(&mut self, crc_ok: bool, s2: bool, cte_time: Option<u8>) {
        self.set_reg(PeriphId::Radio, regs::CRCSTATUS, crc_ok as u32);
        // PDUSTAT.CISTAT 1 is LR500Kbit
        self.set_reg(PeriphId::Radio, regs::PDUSTAT, (s2 as u32) << 1);
        self.set_reg(
            PeriphId::Radio,
            regs::CTESTATUS,
            cte_time.unwrap_or(0) as u32 & 0x3F,
        );

        let amount = match cte_time {
            Some(time) if self.reg(PeriphId::Radio, regs::DFEMODE) != 0 => {
                let spacing_us = match (self.reg(PeriphId::Radio, regs::DFECTRL1)
                    >> regs::DFECTRL1_TSWITCHSPACING_POS)
                    & 0b111
                {
                    2 => 2,
                    3 => 1,
                    _ => 4,
                };
                let slots = (8 * time as u32).saturating_sub(CTE_REFERENCE_US) / spacing_us;
                slots.min(self.reg(PeriphId::Radio, regs::DFEPACKET_MAXCNT))
            }
            _ => 0,
        };
        self.set_reg(PeriphId::Radio, regs::DFEPACKET_AMOUNT, amount);
    }

    fn set_radio_state(&mut self, state: RadioState) {
        self.radio.state = state;
        self.set_reg(PeriphId::Radio, regs::STATE, state.register());
    }

    fn radio_phy(&self) -> Phy {
        match self.reg(PeriphId::Radio, regs::MODE) {
            regs::MODE_BLE_2MBIT => Phy::Le2M,
            regs::MODE_BLE_LR125KBIT => Phy::CodedS8,
            regs::MODE_BLE_LR500KBIT => Phy::CodedS2,
            _ => Phy::Le1M,
        }
    }

    fn radio_timing(&self) -> Timing {
        let ramp_up = if self.reg(PeriphId::Radio, regs::MODECNF0) & regs::MODECNF0_RU_FAST != 0 {
            RampUp::Fast
        } else {
            RampUp::Default
        };
        Timing::new(Soc::Nrf52833, ramp_up, None)
    }

    fn bit_ns(&self) -> u64 {
        match self.radio_phy() {
            Phy::Le1M => 1000,
            Phy::Le2M => 500,
            Phy::CodedS2 => 2000,
            Phy::CodedS8 => 8000,
        }
    }
}
