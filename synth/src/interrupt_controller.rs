use bitfield::Bit;
use memory::Memory;

pub const IF: u16 = 0xFF0F;
pub const IE: u16 = 0xFFFF;

pub const IRQ_VBLANK: usize = 0x0;
pub const IRQ_LCD_STAT: usize = 0x1;
pub const IRQ_TIMER: usize = 0x2;
pub const IRQ_SERIAL: usize = 0x3;
pub const IRQ_JOYPAD: usize = 0x4;

pub struct InterruptController {
    master_enable: bool,
    enable_reg: InterruptReg,
    pub request_reg: InterruptReg,
}

impl InterruptController {
    pub fn new() -> Self {
        Self {
            master_enable: false,
            enable_reg: InterruptReg(0),
            request_reg: InterruptReg(0),
        }
    }

    pub fn set_master_enable(&mut self, enable: bool) {
        self.master_enable = enable;
    }

    pub fn has_interrupt(&self) -> bool {
        self.master_enable && self.pending() != 0
    }

    /// Enabled requests, regardless of the master enable
    pub fn pending(&self) -> u8 {
        self.request_reg.0 & self.enable_reg.0 & 0x1F
    }

    /// Raises a request; returns false if it was already pending and this one is lost
    pub fn request(&mut self, offset: usize) -> bool {
        let was_pending = self.request_reg.bit(offset);
        self.request_reg.set_bit(offset, true);
        !was_pending
    }

    /// Clears a request as the CPU does on dispatch
    pub fn acknowledge(&mut self, offset: usize) {
        self.request_reg.set_bit(offset, false);
    }

    pub fn enable(&mut self, offset: usize) {
        self.enable_reg.set_bit(offset, true);
    }
}

impl Default for InterruptController {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory for InterruptController {
    fn peek(&self, addr: u16) -> u8 {
        match addr {
            // Unused upper bits read high
            IF => self.request_reg.0 | 0xE0,
            IE => self.enable_reg.0,
            _ => 0xFF,
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            IF => self.request_reg.0 = data & 0x1F,
            IE => self.enable_reg.0 = data,
            _ => {}
        }
    }
}

bitfield! {
  /// FF0Fh - IF, FFFFh - IE
  /// One bit per interrupt source
  #[derive(Clone, Copy, Default, PartialEq, Eq)]
  pub struct InterruptReg(u8);
  impl Debug;
  pub vblank, set_vblank: 0;
  pub lcd_stat, set_lcd_stat: 1;
  pub timer, set_timer: 2;
  pub serial, set_serial: 3;
  pub joypad, set_joypad: 4;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_needs_master_enable_and_enable_bit() {
        let mut irq = InterruptController::new();
        irq.request(IRQ_TIMER);
        assert!(!irq.has_interrupt());

        irq.enable(IRQ_TIMER);
        assert!(!irq.has_interrupt());

        irq.set_master_enable(true);
        assert!(irq.has_interrupt());

        irq.acknowledge(IRQ_TIMER);
        assert!(!irq.has_interrupt());
    }

    #[test]
    fn request_while_pending_is_reported() {
        let mut irq = InterruptController::new();
        assert!(irq.request(IRQ_TIMER));
        assert!(!irq.request(IRQ_TIMER));
        assert!(irq.request(IRQ_VBLANK));
        assert!(irq.request_reg.timer());
        assert!(irq.request_reg.vblank());
    }

    #[test]
    fn registers_are_mapped() {
        let mut irq = InterruptController::new();
        irq.write(IE, 0x04);
        irq.write(IF, 0xFF);
        assert_eq!(irq.peek(IE), 0x04);
        assert_eq!(irq.peek(IF), 0xFF);
        assert_eq!(irq.pending(), 0x04);

        irq.write(IF, 0x00);
        assert_eq!(irq.peek(IF), 0xE0);
    }
}
