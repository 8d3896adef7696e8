use crate::Memory;

use std::sync::atomic::{AtomicU8, Ordering};

/// RAM that another thread may write while the bus owner reads it.
///
/// Every byte is an independent relaxed atomic: single accesses never tear, but a multi-byte read
/// can observe a mix of old and new values if a writer is active at the same time. This mirrors a
/// dual-ported RAM chip with no arbitration beyond the byte level.
pub struct SharedRam<const LENGTH: usize> {
    memory: [AtomicU8; LENGTH],
}

impl<const LENGTH: usize> SharedRam<LENGTH> {
    pub fn new() -> Self {
        Self {
            memory: std::array::from_fn(|_| AtomicU8::new(0)),
        }
    }

    /// Reads a byte without exclusive access
    pub fn load(&self, addr: usize) -> u8 {
        self.memory[addr].load(Ordering::Relaxed)
    }

    /// Writes a byte without exclusive access
    pub fn store(&self, addr: usize, data: u8) {
        self.memory[addr].store(data, Ordering::Relaxed)
    }
}

impl<const LENGTH: usize> Default for SharedRam<LENGTH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const LENGTH: usize> Memory for SharedRam<LENGTH> {
    fn peek(&self, addr: u16) -> u8 {
        self.load(addr as usize)
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.store(addr as usize, data)
    }
}
