//! Memory-mapped peripheral access
//!
//! [`PeriphWrapper`] allows testability of the drivers. On silicon it points to the register block
//! of a peripheral taken from the PAC. In unit tests running on a host PC it can point to an
//! arbitrary memory block (like an array) overriding the peripheral memory space.

use super::Peripheral;
use nrf52833_hal::pac;

/// Volatile register access through a pointer to a peripheral register block
pub struct PeriphWrapper {
    ptr: *mut u32,
}

// The wrapper is the only owner of the peripheral it points to. It is created by consuming the PAC
// singleton, so moving it to another context cannot create aliasing access.
unsafe impl Send for PeriphWrapper {}

impl PeriphWrapper {
    /// Create a wrapper accessing registers starting at `ptr`
    ///
    /// # Safety
    ///
    /// `ptr` must point to a 4 KiB register block (or memory standing in for it) that stays valid
    /// as long as the wrapper exists and that is not accessed through any other wrapper.
    pub unsafe fn new(ptr: *mut u32) -> Self {
        Self { ptr }
    }

    /// Take over the RADIO peripheral
    pub fn radio(_radio: pac::RADIO) -> Self {
        unsafe { Self::new(pac::RADIO::ptr() as *mut u32) }
    }

    /// Take over the TIMER0 peripheral
    pub fn timer0(_timer: pac::TIMER0) -> Self {
        unsafe { Self::new(pac::TIMER0::ptr() as *mut u32) }
    }

    /// Take over the TIMER1 peripheral
    pub fn timer1(_timer: pac::TIMER1) -> Self {
        unsafe { Self::new(pac::TIMER1::ptr() as *mut u32) }
    }

    /// Take over the TIMER3 peripheral
    pub fn timer3(_timer: pac::TIMER3) -> Self {
        unsafe { Self::new(pac::TIMER3::ptr() as *mut u32) }
    }

    /// Take over the PPI peripheral
    pub fn ppi(_ppi: pac::PPI) -> Self {
        unsafe { Self::new(pac::PPI::ptr() as *mut u32) }
    }

    /// Take over the CCM and AAR peripherals
    ///
    /// Both share one register block, the ENABLE register selects which one is active.
    pub fn ccm_aar(_ccm: pac::CCM, _aar: pac::AAR) -> Self {
        unsafe { Self::new(pac::CCM::ptr() as *mut u32) }
    }
}

impl Peripheral for PeriphWrapper {
    fn base(&self) -> u32 {
        self.ptr as usize as u32
    }

    fn read(&self, offset: u32) -> u32 {
        debug_assert!(offset % 4 == 0 && offset < 0x1000);
        unsafe { self.ptr.add((offset / 4) as usize).read_volatile() }
    }

    fn write(&self, offset: u32, value: u32) {
        debug_assert!(offset % 4 == 0 && offset < 0x1000);
        unsafe { self.ptr.add((offset / 4) as usize).write_volatile(value) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Peripheral memory mock
    #[repr(align(4))]
    struct PeriphMock {
        memory: [u32; 1024],
    }

    impl PeriphMock {
        pub fn new() -> Self {
            Self { memory: [0; 1024] }
        }
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_write_then_read() {
        let mut mock = PeriphMock::new();
        let periph = unsafe { PeriphWrapper::new(mock.memory.as_mut_ptr()) };

        periph.write(0x504, 0xdeadbeef);
        assert_eq!(periph.read(0x504), 0xdeadbeef);
        assert_eq!(periph.read(0x500), 0);
        assert_eq!(periph.read(0x508), 0);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_endpoints_are_bus_addresses() {
        let mut mock = PeriphMock::new();
        let periph = unsafe { PeriphWrapper::new(mock.memory.as_mut_ptr()) };
        let base = periph.base();

        assert_eq!(periph.task(0x010).0, base + 0x010);
        assert_eq!(periph.event(0x10c).0, base + 0x10c);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_trigger_and_clear() {
        let mut mock = PeriphMock::new();
        let periph = unsafe { PeriphWrapper::new(mock.memory.as_mut_ptr()) };

        periph.trigger(0x100);
        assert!(periph.is_set(0x100));
        periph.clear(0x100);
        assert!(!periph.is_set(0x100));
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_bit_manipulation() {
        let mut mock = PeriphMock::new();
        let periph = unsafe { PeriphWrapper::new(mock.memory.as_mut_ptr()) };

        periph.set_bits(0x200, 0b1001);
        periph.set_bits(0x200, 0b0100);
        assert_eq!(periph.read(0x200), 0b1101);
        periph.clear_bits(0x200, 0b0001);
        assert_eq!(periph.read(0x200), 0b1100);
    }
}
