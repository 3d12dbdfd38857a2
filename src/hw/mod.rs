//! Portable hardware seams
//!
//! Drivers in this crate never touch peripheral registers directly. They go through the
//! [`Peripheral`] trait, which is implemented by [`periph::PeriphWrapper`] for memory-mapped
//! silicon and by the simulated SoC for host builds.
//!
//! Events and tasks are identified by their bus address. That is the value the PPI fabric
//! stores in its EEP and TEP registers, so an [`Event`] or a [`Task`] obtained from any
//! peripheral can be routed to any other.

pub mod nrf52833;
pub mod periph;
pub mod ppi;
pub mod timer;

/// Address of a peripheral event register
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Event(pub u32);

/// Address of a peripheral task register
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Task(pub u32);

/// Register-level access to one peripheral instance
///
/// Offsets are byte offsets from the peripheral base address as listed in the product
/// specification. Tasks are triggered by writing 1, events are cleared by writing 0.
pub trait Peripheral {
    /// Bus address of the peripheral register block
    fn base(&self) -> u32;

    /// Read the register at `offset`
    fn read(&self, offset: u32) -> u32;

    /// Write `value` to the register at `offset`
    fn write(&self, offset: u32, value: u32);

    /// Bus address of the register at `offset`
    fn address(&self, offset: u32) -> u32 {
        self.base() + offset
    }

    /// Endpoint of the event register at `offset`
    fn event(&self, offset: u32) -> Event {
        Event(self.address(offset))
    }

    /// Endpoint of the task register at `offset`
    fn task(&self, offset: u32) -> Task {
        Task(self.address(offset))
    }

    /// Trigger the task at `offset`
    fn trigger(&self, offset: u32) {
        self.write(offset, 1);
    }

    /// Check if the event at `offset` was generated since it was last cleared
    fn is_set(&self, offset: u32) -> bool {
        self.read(offset) != 0
    }

    /// Clear the event at `offset`
    fn clear(&self, offset: u32) {
        self.write(offset, 0);
    }

    /// Set the bits of `mask` in the register at `offset`
    fn set_bits(&self, offset: u32, mask: u32) {
        self.write(offset, self.read(offset) | mask);
    }

    /// Clear the bits of `mask` in the register at `offset`
    fn clear_bits(&self, offset: u32, mask: u32) {
        self.write(offset, self.read(offset) & !mask);
    }
}

impl<T: Peripheral + ?Sized> Peripheral for &T {
    fn base(&self) -> u32 {
        (**self).base()
    }

    fn read(&self, offset: u32) -> u32 {
        (**self).read(offset)
    }

    fn write(&self, offset: u32, value: u32) {
        (**self).write(offset, value)
    }
}

/// Plain memory standing in for a peripheral register block in unit tests
#[cfg(test)]
pub(crate) mod mock {
    use super::Peripheral;
    use core::cell::RefCell;

    pub struct RegistersMock {
        base: u32,
        memory: RefCell<[u32; 1024]>,
    }

    impl RegistersMock {
        pub fn new(base: u32) -> Self {
            Self {
                base,
                memory: RefCell::new([0; 1024]),
            }
        }
    }

    impl Peripheral for RegistersMock {
        fn base(&self) -> u32 {
            self.base
        }

        fn read(&self, offset: u32) -> u32 {
            self.memory.borrow()[(offset / 4) as usize]
        }

        fn write(&self, offset: u32, value: u32) {
            self.memory.borrow_mut()[(offset / 4) as usize] = value;
        }
    }
}
