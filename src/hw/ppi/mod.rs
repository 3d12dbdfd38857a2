//! Portable PPI abstraction
//!
//! PPI is Programmable peripheral interconnect which allows multiple peripherals in SoC to trigger
//! tasks in other peripherals. Such tasks triggering has minimal latency with controllable jitter
//! and low power consumption, because it does not require CPU processing.
//!
//! The radio engine uses a static allocation of channels: every purpose has its own channel index
//! chosen at compile time (see [`channels`]). Nothing is allocated at run time, so arming a radio
//! event costs only a few register writes.

pub mod channels;
pub mod legacy_ppi;
pub mod traits;

pub use legacy_ppi::Ppi;
pub use traits::Fabric;

/// Bit mask selecting a single channel
pub const fn mask(channel: u8) -> u32 {
    1 << channel
}
