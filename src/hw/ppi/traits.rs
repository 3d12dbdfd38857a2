//! Traits used for PPI modules portability
//!
//! Each port of the event-routing fabric to another SoC generation shall implement the traits
//! described in this module.

use crate::hw::{Event, Task};

#[cfg(test)]
use mockall::*;

/// Event-routing fabric connecting peripherals' events with tasks
///
/// Channels are identified by their index, groups of channels by the group index. Indices are
/// taken from the static allocation table, so passing an index outside of the fabric is a
/// programming error caught by debug assertions.
#[cfg_attr(test, automock)]
pub trait Fabric {
    /// Route `event` to `task` through `channel`
    ///
    /// Pre-programmed channels have a fixed route and cannot be rebound. For them this function
    /// only checks in debug builds that the requested route matches the fixed one.
    fn bind(&self, channel: u8, event: Event, task: Task);

    /// Set the second task triggered by `channel`, or remove it with `None`
    fn fork(&self, channel: u8, task: Option<Task>);

    /// Detach event and tasks from `channel`
    ///
    /// The channel is disabled first, so it is left in the same state as after reset.
    fn unbind(&self, channel: u8);

    /// Enable all channels selected in `mask`
    fn enable(&self, mask: u32);

    /// Disable all channels selected in `mask`
    fn disable(&self, mask: u32);

    /// Mask of currently enabled channels
    fn enabled(&self) -> u32;

    /// Make channels selected in `mask` the members of `group`
    fn group_assign(&self, group: u8, mask: u32);

    /// Enable all channels in `group`
    fn group_enable(&self, group: u8);

    /// Disable all channels in `group`
    fn group_disable(&self, group: u8);

    /// Task enabling all channels in `group` when triggered through another channel
    fn group_enable_task(&self, group: u8) -> Task;

    /// Task disabling all channels in `group` when triggered through another channel
    fn group_disable_task(&self, group: u8) -> Task;
}
