#![cfg_attr(not(any(test, doctest, feature = "mocked_platform")), no_std)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

//! Bluetooth Low Energy radio engine for Nordic nRF SoCs.
//!
//! The crate drives the radio peripheral for a BLE link layer: PHY and packet configuration,
//! event start and receive timeout, TX/RX turnaround within the inter frame space, on-the-fly
//! encryption, address resolution and direction finding. Timing critical sequences are wired
//! with PPI, so hardware executes them without the CPU.
//!
//! Currently nRF52833 is supported. Drivers access the hardware only through the traits in
//! [`hw`], so porting to other SoCs comes down to a register map, timing tables and a fabric
//! implementation.

#[cfg(not(any(feature = "mocked_platform", feature = "nrf52833")))]
compile_error!("One platform must be enabled as a build feature");

#[cfg(all(feature = "mocked_platform", feature = "nrf52833"))]
compile_error!("Cannot enable multiple platforms simultaneously (mocked and nrf52833)");

#[cfg(all(test, not(feature = "mocked_platform")))]
compile_error!("For tests \"mocked_platform\" feature shall be selected");

mod fmt;

/// Defines errors reported by this crate
pub mod error;

pub mod hw;

pub mod radio;

#[cfg(feature = "mocked_platform")]
pub mod sim;
