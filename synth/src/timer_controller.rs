use crate::interrupt_controller::{self, InterruptController};

use memory::Memory;

pub const DIV: u16 = 0xFF04;
pub const TIMA: u16 = 0xFF05;
pub const TMA: u16 = 0xFF06;
pub const TAC: u16 = 0xFF07;

/// DIV/TIMA/TMA/TAC.
///
/// TIMA counts falling edges of one bit of the free-running 16-bit divider, so writes that pull
/// that bit low (resetting DIV, or retargeting TAC) count as an increment the way they do on
/// hardware. Overflow reloads TMA and raises the timer interrupt in the same cycle.
pub struct TimerController {
    divider: u16,
    counter: u8,
    modulo: u8,
    control_reg: TimerControlReg,
}

impl TimerController {
    pub fn new() -> Self {
        Self {
            divider: 0,
            counter: 0,
            modulo: 0,
            control_reg: TimerControlReg(0),
        }
    }

    /// Advances by `cycles` master clocks; returns how many overflows found the timer
    /// interrupt still pending
    pub fn tick(&mut self, cycles: u32, interrupt_controller: &mut InterruptController) -> u32 {
        let mut coalesced = 0;
        for _ in 0..cycles {
            let old_input = self.timer_input();
            self.divider = self.divider.wrapping_add(1);
            if old_input && !self.timer_input() && !self.increment(interrupt_controller) {
                coalesced += 1;
            }
        }
        coalesced
    }

    // Returns false if the overflow's interrupt request was lost
    fn increment(&mut self, interrupt_controller: &mut InterruptController) -> bool {
        let (counter, overflow) = self.counter.overflowing_add(1);
        if !overflow {
            self.counter = counter;
            return true;
        }
        self.counter = self.modulo;
        interrupt_controller.request(interrupt_controller::IRQ_TIMER)
    }

    fn timer_input(&self) -> bool {
        let bit = match self.control_reg.clock_select() {
            0b00 => 9,
            0b01 => 3,
            0b10 => 5,
            0b11 | _ => 7,
        };
        self.control_reg.enable() && (self.divider >> bit) & 1 != 0
    }

    /// Applies a register write that may pull the timer input low.
    ///
    /// Bus writes can't report a lost interrupt, so the glitch increment requests it silently.
    fn write_with_edge(
        &mut self,
        write: impl FnOnce(&mut Self),
        interrupt_controller: &mut InterruptController,
    ) {
        let old_input = self.timer_input();
        write(self);
        if old_input && !self.timer_input() {
            self.increment(interrupt_controller);
        }
    }

    pub fn write_reg(&mut self, addr: u16, data: u8, interrupt_controller: &mut InterruptController) {
        match addr {
            DIV => self.write_with_edge(|timer| timer.divider = 0, interrupt_controller),
            TAC => self.write_with_edge(
                |timer| timer.control_reg = TimerControlReg(data & 0x07),
                interrupt_controller,
            ),
            _ => self.write(addr, data),
        }
    }
}

impl Default for TimerController {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory for TimerController {
    fn peek(&self, addr: u16) -> u8 {
        match addr {
            DIV => (self.divider >> 8) as u8,
            TIMA => self.counter,
            TMA => self.modulo,
            TAC => 0xF8 | self.control_reg.0,
            _ => 0xFF,
        }
    }

    /// Writes without edge detection; use `write_reg` when an interrupt controller is at hand
    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            DIV => self.divider = 0,
            TIMA => self.counter = data,
            TMA => self.modulo = data,
            TAC => self.control_reg = TimerControlReg(data & 0x07),
            _ => {}
        }
    }
}

bitfield! {
  /// FF07h - TAC
  /// Starts the timer and selects its input clock
  #[derive(Clone, Copy, Default, PartialEq, Eq)]
  pub struct TimerControlReg(u8);
  impl Debug;
  pub clock_select, set_clock_select: 1, 0;
  pub enable, set_enable: 2;
}
