use memory::Memory;

/// Default location of the first slot, inside cartridge RAM
pub const NOTE_BASE: u16 = 0xB000;
/// Distance between consecutive voices' slots
pub const SLOT_STRIDE: u16 = 0x10;

const ACTIVE_OFFSET: u16 = 0;
const NUMBER_OFFSET: u16 = 1;
const VELOCITY_OFFSET: u16 = 2;

/// One voice's note state as deposited by the external note source
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoteSlot {
    pub active: u8,
    pub number: u8,
    pub velocity: u8,
}

impl NoteSlot {
    pub fn is_active(&self) -> bool {
        self.active != 0
    }
}

/// Samples the three per-voice note slots.
///
/// Each field is a separate byte read with no synchronisation against the writer, so a slot
/// read while the source is updating it may combine fields from before and after the update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteReader {
    base: u16,
}

impl NoteReader {
    pub fn new(base: u16) -> Self {
        Self { base }
    }

    pub fn slot_address(&self, channel_i: usize) -> u16 {
        self.base.wrapping_add((channel_i as u16) << 4)
    }

    pub fn read_voice<M: Memory + ?Sized>(&self, memory: &M, channel_i: usize) -> NoteSlot {
        let addr = self.slot_address(channel_i);
        NoteSlot {
            active: memory.peek(addr.wrapping_add(ACTIVE_OFFSET)),
            number: memory.peek(addr.wrapping_add(NUMBER_OFFSET)),
            velocity: memory.peek(addr.wrapping_add(VELOCITY_OFFSET)),
        }
    }

    /// Writes a slot the way the external source does: note and velocity first, then the
    /// activity flag, one byte at a time.
    pub fn deposit<F: FnMut(u16, u8)>(&self, channel_i: usize, slot: NoteSlot, mut store: F) {
        let addr = self.slot_address(channel_i);
        store(addr.wrapping_add(NUMBER_OFFSET), slot.number);
        store(addr.wrapping_add(VELOCITY_OFFSET), slot.velocity);
        store(addr.wrapping_add(ACTIVE_OFFSET), slot.active);
    }
}

impl Default for NoteReader {
    fn default() -> Self {
        Self::new(NOTE_BASE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Sparse bus that also logs every address peeked
    #[derive(Default)]
    struct SparseBus {
        bytes: HashMap<u16, u8>,
        peeks: RefCell<Vec<u16>>,
    }

    impl Memory for SparseBus {
        fn peek(&self, addr: u16) -> u8 {
            self.peeks.borrow_mut().push(addr);
            self.bytes.get(&addr).copied().unwrap_or(0)
        }

        fn write(&mut self, addr: u16, data: u8) {
            self.bytes.insert(addr, data);
        }
    }

    #[test]
    fn slots_are_sixteen_bytes_apart() {
        let reader = NoteReader::default();
        assert_eq!(reader.slot_address(0), 0xB000);
        assert_eq!(reader.slot_address(1), 0xB010);
        assert_eq!(reader.slot_address(2), 0xB020);
    }

    #[test]
    fn reads_three_consecutive_bytes() {
        let mut bus = SparseBus::default();
        bus.write(0xB010, 1);
        bus.write(0xB011, 60);
        bus.write(0xB012, 100);
        let slot = NoteReader::default().read_voice(&bus, 1);
        assert_eq!(
            slot,
            NoteSlot {
                active: 1,
                number: 60,
                velocity: 100
            }
        );
        assert_eq!(*bus.peeks.borrow(), vec![0xB010, 0xB011, 0xB012]);
    }

    #[test]
    fn any_nonzero_activity_is_held() {
        let slot = NoteSlot {
            active: 0x40,
            ..NoteSlot::default()
        };
        assert!(slot.is_active());
        assert!(!NoteSlot::default().is_active());
    }

    #[test]
    fn deposit_writes_activity_last() {
        let reader = NoteReader::new(0xA000);
        let mut order = Vec::new();
        let slot = NoteSlot {
            active: 1,
            number: 33,
            velocity: 120,
        };
        reader.deposit(2, slot, |addr, data| order.push((addr, data)));
        assert_eq!(order, vec![(0xA021, 33), (0xA022, 120), (0xA020, 1)]);
    }
}
