//! Static allocation of PPI channels and groups used by the radio engine
//!
//! Every purpose gets its own channel index, fixed at compile time. Two purposes share an index
//! only when they can never be active in the same configuration; such cases are documented on the
//! field.
//!
//! Two maps exist. [`DUAL_TIMER`] is used with a separate switch timer and the event timer being
//! TIMER0, which lets it use the pre-programmed channels 20..=31. [`SINGLE_TIMER`] is used when
//! one six-compare timer serves both the event timing and the TIFS switch. The pre-programmed
//! channels bound to TIMER0 are useless then, so their purposes move to programmable channels.

use crate::hw::nrf52833::ppi::NUM_PROGRAMMABLE;

/// Channel and group indices of each purpose
#[derive(Debug)]
pub struct ChannelMap {
    /// RADIO READY -> event timer CAPTURE0
    pub ready_capture: u8,
    /// Tick event -> event timer CLEAR, fork START
    pub tick_start: u8,
    /// RADIO RATEBOOST -> CCM RATEOVERRIDE
    pub ccm_rate_override: u8,
    /// RADIO BCMATCH -> CCM CRYPT, exclusive with [`aar_start`](Self::aar_start)
    pub ccm_crypt_delayed: u8,
    /// Event timer COMPARE0 -> RADIO TXEN
    pub start_tx: u8,
    /// Event timer COMPARE0 -> RADIO RXEN, equal to [`start_tx`](Self::start_tx) when rebound per
    /// direction
    pub start_rx: u8,
    /// Event timer COMPARE1 -> RADIO DISABLE
    pub hcto_disable: u8,
    /// RADIO BCMATCH -> AAR START
    pub aar_start: u8,
    /// RADIO READY -> CCM KSGEN
    pub ccm_ksgen: u8,
    /// RADIO ADDRESS -> CCM CRYPT
    pub ccm_crypt: u8,
    /// RADIO ADDRESS -> event timer CAPTURE1
    pub address_capture: u8,
    /// RADIO END -> event timer CAPTURE2
    pub end_capture: u8,
    /// RADIO END or PHYEND -> switch timer CLEAR, fork group enable
    pub sw_clear: u8,
    /// Switch timer compare -> RADIO TXEN or RXEN, fork group disable; per toggle
    pub sw_enable: [u8; 2],
    /// Alternative switch timer compare -> RADIO TXEN or RXEN, fork group disable; per toggle.
    /// Used by the coded S2 schedule or by the delay compensated schedule, never both since CTE is
    /// not allowed on the coded PHY.
    pub sw_enable_alt: Option<[u8; 2]>,
    /// RADIO RATEBOOST -> switch timer capture of the S8 compare; per toggle
    pub sw_rateboost_cancel: Option<[u8; 2]>,
    /// RADIO CTEPRESENT -> switch timer capture of the compensated compare; per toggle
    pub sw_cte_cancel: Option<[u8; 2]>,
    /// Channel groups holding the switch enable channels; per toggle
    pub sw_groups: [u8; 2],
    /// Compare register of the switch timer used for the primary schedule, per toggle
    pub sw_cc: [u8; 2],
    /// Compare register of the switch timer used for the alternative schedule, per toggle
    pub sw_cc_alt: Option<[u8; 2]>,
    /// Channel group holding [`start_tx`](Self::start_tx) and
    /// [`hcto_disable`](Self::hcto_disable), disabled by the END that clears a shared timer. Only
    /// needed when the event timer is also the switch timer.
    pub retire_group: Option<u8>,
}

impl ChannelMap {
    /// Mask of every channel that may be left enabled by a radio event
    pub const fn all(&self) -> u32 {
        let mut mask = bit(self.ready_capture)
            | bit(self.tick_start)
            | bit(self.ccm_rate_override)
            | bit(self.ccm_crypt_delayed)
            | bit(self.start_tx)
            | bit(self.start_rx)
            | bit(self.hcto_disable)
            | bit(self.aar_start)
            | bit(self.ccm_ksgen)
            | bit(self.ccm_crypt)
            | bit(self.address_capture)
            | bit(self.end_capture)
            | bit(self.sw_clear)
            | pair(self.sw_enable);

        if let Some(alt) = self.sw_enable_alt {
            mask |= pair(alt);
        }
        if let Some(cancel) = self.sw_rateboost_cancel {
            mask |= pair(cancel);
        }
        if let Some(cancel) = self.sw_cte_cancel {
            mask |= pair(cancel);
        }

        mask
    }

    /// Mask of the channels retired by the END that clears a shared timer
    pub const fn retired(&self) -> u32 {
        match self.retire_group {
            Some(_) => bit(self.start_tx) | bit(self.start_rx) | bit(self.hcto_disable),
            None => 0,
        }
    }

    /// Mask of the programmable channels of the map
    pub const fn programmable(&self) -> u32 {
        self.all() & ((1 << NUM_PROGRAMMABLE) - 1)
    }
}

const fn bit(channel: u8) -> u32 {
    1 << channel
}

const fn pair(channels: [u8; 2]) -> u32 {
    bit(channels[0]) | bit(channels[1])
}

/// Map for the dual timer and the hardware TIFS switch strategies
pub const DUAL_TIMER: ChannelMap = ChannelMap {
    ready_capture: 0,
    tick_start: 1,
    ccm_rate_override: 2,
    ccm_crypt_delayed: 3,
    start_tx: 20,
    start_rx: 21,
    hcto_disable: 22,
    aar_start: 23,
    ccm_ksgen: 24,
    ccm_crypt: 25,
    address_capture: 26,
    end_capture: 27,
    sw_clear: 8,
    sw_enable: [9, 10],
    sw_enable_alt: Some([11, 12]),
    sw_rateboost_cancel: Some([13, 14]),
    sw_cte_cancel: Some([15, 16]),
    sw_groups: [0, 1],
    sw_cc: [0, 1],
    sw_cc_alt: Some([2, 3]),
    retire_group: None,
};

/// Map for the single timer switch strategy
pub const SINGLE_TIMER: ChannelMap = ChannelMap {
    ready_capture: 0,
    tick_start: 1,
    ccm_rate_override: 2,
    ccm_crypt_delayed: 3,
    start_tx: 4,
    start_rx: 4,
    hcto_disable: 5,
    aar_start: 23,
    ccm_ksgen: 24,
    ccm_crypt: 25,
    address_capture: 6,
    end_capture: 7,
    sw_clear: 8,
    sw_enable: [9, 10],
    sw_enable_alt: None,
    sw_rateboost_cancel: None,
    sw_cte_cancel: None,
    sw_groups: [0, 1],
    sw_cc: [4, 5],
    sw_cc_alt: None,
    retire_group: Some(2),
};

// Switch channels must be programmable, they are rebound on every switch
const _: () = assert!(DUAL_TIMER.sw_clear < NUM_PROGRAMMABLE);
const _: () = assert!(DUAL_TIMER.programmable() < (1 << 17));
const _: () = assert!(SINGLE_TIMER.programmable() < (1 << 11));
const _: () = assert!(matches!(SINGLE_TIMER.retire_group, Some(g) if g > 1));
