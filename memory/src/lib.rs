pub mod shared_ram;

pub use self::shared_ram::SharedRam;

/// A byte-addressed device on the 16-bit bus
pub trait Memory {
    fn read(&mut self, addr: u16) -> u8 {
        // Reads can have side-effects, but generally will be the same as peek
        self.peek(addr)
    }
    fn peek(&self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, data: u8);
}
