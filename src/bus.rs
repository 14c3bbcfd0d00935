//! Access to the memory-mapped MFPR register block.
//!
//! The controller is generic over [`MfprBus`] so the engine can run
//! against a plain array in tests; production code uses [`MmioBus`],
//! which performs volatile 32-bit accesses at `base + offset`.

/// 32-bit register access within the MFPR block, addressed by byte offset.
///
/// Implementations need no internal locking; the controller serializes
/// every access behind its own critical section.
pub trait MfprBus {
    /// Reads the register at `base + offset`.
    fn read(&mut self, offset: u32) -> u32;

    /// Writes the register at `base + offset`. The underlying bus may
    /// post the write; observability is only guaranteed after a readback
    /// of any register in the same block.
    fn write(&mut self, offset: u32, value: u32);
}

/// Volatile MMIO access at an integer base address.
pub struct MmioBus {
    base: usize,
}

impl MmioBus {
    /// Wraps the MFPR block mapped at `base`.
    ///
    /// # Safety
    ///
    /// `base` must be the virtual address of the MFPR register block,
    /// mapped for the lifetime of the bus, 4-byte aligned, and not
    /// accessed through any other path while this bus exists.
    pub const unsafe fn new(base: usize) -> Self {
        MmioBus { base }
    }
}

impl MfprBus for MmioBus {
    fn read(&mut self, offset: u32) -> u32 {
        unsafe { core::ptr::read_volatile((self.base + offset as usize) as *const u32) }
    }

    fn write(&mut self, offset: u32, value: u32) {
        unsafe { core::ptr::write_volatile((self.base + offset as usize) as *mut u32, value) }
    }
}
