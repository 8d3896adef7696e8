//! The emulated board: timer, interrupt controller, sound generator and cartridge RAM on one bus.
//!
//! The machine stands in for the CPU only as far as interrupt dispatch goes. Whatever runs in
//! interrupt context is a [`TimerHandler`]; it gets the cartridge RAM to read and the sound
//! registers to write, and nothing else.

use crate::config::{SynthConfig, TimerRate};
use crate::interrupt_controller::{self, InterruptController, IE, IF};
use crate::ports::SoundPorts;
use crate::timer_controller::{TimerController, DIV, TAC, TIMA, TMA};

use sound::consts::MASTER_CLOCK_HZ;
use sound::registers::{NR10, WAVE_RAM_END};
use sound::SoundController;

use log::{debug, info, warn};
use memory::{Memory, SharedRam};

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const CART_RAM_START: u16 = 0xA000;
pub const CART_RAM_END: u16 = 0xBFFF;
const CART_RAM_SIZE: usize = (CART_RAM_END - CART_RAM_START) as usize + 1;

// Interrupts are checked once per machine cycle
const DISPATCH_GRANULARITY: u32 = 4;

/// Code run in interrupt context each time the timer overflows
pub trait TimerHandler: Send {
    fn on_timer(&mut self, notes: &dyn Memory, ports: &mut dyn SoundPorts);
}

/// A000h-BFFFh, shared between the bus and whoever deposits notes
#[derive(Clone, Default)]
pub struct CartridgeRam {
    ram: Arc<SharedRam<CART_RAM_SIZE>>,
}

impl CartridgeRam {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes through a shared handle; addresses outside A000h-BFFFh are dropped
    pub fn store(&self, addr: u16, data: u8) {
        if let Some(offset) = Self::offset(addr) {
            self.ram.store(offset, data);
        }
    }

    pub fn load(&self, addr: u16) -> u8 {
        Self::offset(addr).map_or(0xFF, |offset| self.ram.load(offset))
    }

    fn offset(addr: u16) -> Option<usize> {
        (CART_RAM_START..=CART_RAM_END)
            .contains(&addr)
            .then(|| (addr - CART_RAM_START) as usize)
    }
}

impl Memory for CartridgeRam {
    fn peek(&self, addr: u16) -> u8 {
        self.load(addr)
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.store(addr, data);
    }
}

/// Running totals for the timer interrupt, readable from any thread
#[derive(Debug, Default)]
pub struct TickStats {
    ticks: AtomicU32,
    overruns: AtomicU32,
    coalesced: AtomicU32,
}

impl TickStats {
    pub fn ticks(&self) -> u32 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Handler runs that took longer than one tick period of wall time
    pub fn overruns(&self) -> u32 {
        self.overruns.load(Ordering::Relaxed)
    }

    /// Timer overflows lost because the previous request was still pending
    pub fn coalesced(&self) -> u32 {
        self.coalesced.load(Ordering::Relaxed)
    }

    // Each returns the count before the update
    pub(crate) fn record_tick(&self) -> u32 {
        self.ticks.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn record_overrun(&self) -> u32 {
        self.overruns.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn record_coalesced(&self, count: u32) -> u32 {
        self.coalesced.fetch_add(count, Ordering::Relaxed)
    }
}

pub struct Machine {
    sound: SoundController,
    timer: TimerController,
    interrupt_controller: InterruptController,
    cart_ram: CartridgeRam,

    timer_handler: Option<Box<dyn TimerHandler>>,
    stats: Arc<TickStats>,
    tick_budget: Option<Duration>,

    cycles_per_sample: f64,
    cycle_remainder: f64,
}

impl Machine {
    pub fn new(config: &SynthConfig) -> Self {
        let period = config.tick_rate.period_cycles() as f64 / MASTER_CLOCK_HZ as f64;
        let tick_budget = config
            .overrun_check
            .then(|| Duration::from_secs_f64(period));
        Self {
            sound: SoundController::new(),
            timer: TimerController::new(),
            interrupt_controller: InterruptController::new(),
            cart_ram: CartridgeRam::new(),

            timer_handler: None,
            stats: Arc::new(TickStats::default()),
            tick_budget,

            cycles_per_sample: MASTER_CLOCK_HZ as f64 / config.sample_rate.max(1) as f64,
            cycle_remainder: 0.0,
        }
    }

    /// Retunes `render` for a device that opened at a different rate than configured
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.cycles_per_sample = MASTER_CLOCK_HZ as f64 / sample_rate.max(1) as f64;
        self.cycle_remainder = 0.0;
    }

    pub fn sound(&self) -> &SoundController {
        &self.sound
    }

    pub fn sound_ports(&mut self) -> &mut SoundController {
        &mut self.sound
    }

    /// A handle to cartridge RAM that stays valid after the machine moves to another thread
    pub fn cartridge_ram(&self) -> CartridgeRam {
        self.cart_ram.clone()
    }

    pub fn stats(&self) -> Arc<TickStats> {
        self.stats.clone()
    }

    /// Programs the timer for `rate`, unmasks its interrupt and hands it `handler`
    pub fn install_timer_handler(&mut self, rate: TimerRate, handler: Box<dyn TimerHandler>) {
        info!(
            "timer interrupt at {} Hz (clock {} Hz, TMA {:02X})",
            rate.hz(),
            rate.clock.hz(),
            rate.modulo()
        );
        self.timer_handler = Some(handler);

        self.write(TAC, 0x00);
        self.write(TMA, rate.modulo());
        self.write(TIMA, rate.modulo());
        self.write(TAC, 0x04 | rate.clock.select());

        self.interrupt_controller
            .enable(interrupt_controller::IRQ_TIMER);
        self.interrupt_controller.set_master_enable(true);
    }

    /// Runs the board for `cycles` master clocks
    pub fn step(&mut self, cycles: u32) {
        let mut remaining = cycles;
        while remaining > 0 {
            let chunk = remaining.min(DISPATCH_GRANULARITY);
            let coalesced = self.timer.tick(chunk, &mut self.interrupt_controller);
            if coalesced > 0 && self.stats.record_coalesced(coalesced) == 0 {
                warn!("timer interrupt requested while still pending; ticks are being dropped");
            }
            self.dispatch_interrupt();
            remaining -= chunk;
        }
        self.sound.tick(cycles);
    }

    fn dispatch_interrupt(&mut self) {
        if !self.interrupt_controller.has_interrupt() {
            return;
        }
        // Lowest bit has priority
        let irq = self.interrupt_controller.pending().trailing_zeros() as usize;
        self.interrupt_controller.acknowledge(irq);
        if irq != interrupt_controller::IRQ_TIMER {
            debug!("no handler for interrupt {}", irq);
            return;
        }

        let handler = match self.timer_handler.as_mut() {
            Some(handler) => handler,
            None => return,
        };

        // Handlers run with interrupts masked, as after a real dispatch
        self.interrupt_controller.set_master_enable(false);
        let started = self.tick_budget.map(|_| Instant::now());
        handler.on_timer(&self.cart_ram, &mut self.sound);
        if let (Some(started), Some(budget)) = (started, self.tick_budget) {
            let elapsed = started.elapsed();
            if elapsed > budget && self.stats.record_overrun() == 0 {
                warn!(
                    "timer handler took {:?}, longer than its {:?} period",
                    elapsed, budget
                );
            }
        }
        self.stats.record_tick();
        self.interrupt_controller.set_master_enable(true);
    }

    /// Fills `out` with interleaved left/right samples, running the board in step
    pub fn render(&mut self, out: &mut [f32]) {
        for frame in out.chunks_exact_mut(2) {
            self.cycle_remainder += self.cycles_per_sample;
            let cycles = self.cycle_remainder as u32;
            self.cycle_remainder -= cycles as f64;
            self.step(cycles);

            let (left, right) = self.sound.sample();
            frame[0] = left;
            frame[1] = right;
        }
    }
}

impl Memory for Machine {
    fn peek(&self, addr: u16) -> u8 {
        match addr {
            CART_RAM_START..=CART_RAM_END => self.cart_ram.peek(addr),
            DIV..=TAC => self.timer.peek(addr),
            IF | IE => self.interrupt_controller.peek(addr),
            NR10..=WAVE_RAM_END => self.sound.peek(addr),
            _ => 0xFF,
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            CART_RAM_START..=CART_RAM_END => self.cart_ram.write(addr, data),
            DIV..=TAC => self
                .timer
                .write_reg(addr, data, &mut self.interrupt_controller),
            IF | IE => self.interrupt_controller.write(addr, data),
            NR10..=WAVE_RAM_END => self.sound.write(addr, data),
            _ => {}
        }
    }
}
