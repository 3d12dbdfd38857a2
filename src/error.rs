/// Errors reported by radio software
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A hardware operation is still in progress
    WouldBlock,
    /// The RF channel index or the PPI channel/group index is out of range
    InvalidChannel,
    /// The antenna switch pattern does not fit in the hardware buffer
    PatternTooLong,
    /// The receive timeout is already installed for the current radio event
    AlreadyArmed,
    /// A busy hardware block did not complete within the bounded number of polls
    Timeout,
    /// The selected switch strategy or configuration cannot serve the request
    Unsupported,
    /// The passed buffer cannot contain all necessary data
    TooSmallBuffer,
}
