//! TIMER model counting microseconds

use crate::hw::nrf52833::timer as regs;

const NS_PER_TICK: u64 = 1000;

/// Counter state of one TIMER instance
///
/// The counter is `base` at time `since` and advances by one every microsecond while running.
#[derive(Debug, Default)]
pub(super) struct TimerModel {
    running: bool,
    base: u32,
    since: u64,
    last_fire: [Option<u64>; regs::MAX_CC],
}

impl TimerModel {
    pub fn counter(&self, now: u64) -> u32 {
        if self.running {
            self.base
                .wrapping_add(((now - self.since) / NS_PER_TICK) as u32)
        } else {
            self.base
        }
    }

    pub fn start(&mut self, now: u64) {
        if !self.running {
            self.since = now;
            self.running = true;
        }
    }

    pub fn stop(&mut self, now: u64) {
        self.base = self.counter(now);
        self.running = false;
    }

    pub fn clear(&mut self, now: u64) {
        self.base = 0;
        self.since = now;
    }

    pub fn shutdown(&mut self) {
        self.base = 0;
        self.running = false;
    }

    /// Earliest time, not before `now`, at which the counter steps onto one of `ccs`
    ///
    /// A compare equal to the counter already matched, it matches again only after a wrap.
    pub fn next_compare(&self, now: u64, ccs: &[u32]) -> Option<(u64, u8)> {
        if !self.running {
            return None;
        }

        ccs.iter()
            .enumerate()
            .filter_map(|(idx, cc)| {
                let ticks = cc.wrapping_sub(self.base) as u64;
                let at = self.since + ticks * NS_PER_TICK;
                let pending = ticks != 0
                    && at >= now
                    && self.last_fire[idx] != Some(at);
                pending.then_some((at, idx as u8))
            })
            .min()
    }

    pub fn mark_fired(&mut self, cc: u8, at: u64) {
        self.last_fire[cc as usize] = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_microseconds_while_running() {
        let mut timer = TimerModel::default();
        assert_eq!(timer.counter(5_000), 0);

        timer.start(1_000);
        assert_eq!(timer.counter(1_999), 0);
        assert_eq!(timer.counter(2_000), 1);

        timer.stop(10_500);
        assert_eq!(timer.counter(50_000), 9);

        timer.start(60_000);
        assert_eq!(timer.counter(61_000), 10);

        timer.clear(61_200);
        assert_eq!(timer.counter(62_199), 0);
        assert_eq!(timer.counter(62_200), 1);
    }

    #[test]
    fn test_compare_matches_once() {
        let mut timer = TimerModel::default();
        timer.start(0);

        let ccs = [0, 150, 100, 0];
        assert_eq!(timer.next_compare(0, &ccs), Some((100_000, 2)));

        timer.mark_fired(2, 100_000);
        assert_eq!(timer.next_compare(100_000, &ccs), Some((150_000, 1)));
        assert_eq!(timer.next_compare(150_001, &ccs), None);
    }
}
