use crate::consts::*;
use crate::registers::*;

const MAX_FREQUENCY: u16 = 0x7FF;

pub struct ToneChannel {
    // Channel 2 has no sweep unit, so this register is never written for that channel.
    pub sweep_reg: SweepReg,
    pub duty_length_reg: DutyLengthReg,
    envelope_reg: EnvelopeReg,
    frequency_lo: u8,
    frequency_hi_reg: FrequencyHiReg,

    enabled: bool,
    counter: u32,
    duty_step: usize,
    curr_vol: u8,
    length_counter: u16,
    envelope_counter: u8,
    sweep_enabled: bool,
    sweep_counter: u8,
    shadow_frequency: u16,
}

impl ToneChannel {
    pub fn new() -> Self {
        Self {
            sweep_reg: SweepReg(0),
            duty_length_reg: DutyLengthReg(0),
            envelope_reg: EnvelopeReg(0),
            frequency_lo: 0,
            frequency_hi_reg: FrequencyHiReg(0),

            enabled: false,
            counter: 0,
            duty_step: 0,
            curr_vol: 0,
            length_counter: 0,
            envelope_counter: 0,
            sweep_enabled: false,
            sweep_counter: 0,
            shadow_frequency: 0,
        }
    }

    pub fn tick(&mut self, cycles: u32) {
        let mut remaining = cycles;
        while remaining >= self.counter {
            remaining -= self.counter;
            self.counter = self.period();
            self.duty_step = (self.duty_step + 1) % 8;
        }
        self.counter -= remaining;
    }

    pub fn sample(&self) -> f32 {
        if !self.enabled {
            return 0.0;
        }
        let vol = (self.curr_vol as f32) / 15.0;
        if DUTY_PATTERNS[self.duty_length_reg.duty() as usize][self.duty_step] {
            vol
        } else {
            -vol
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn volume(&self) -> u8 {
        self.curr_vol
    }

    pub fn frequency(&self) -> u16 {
        ((self.frequency_hi_reg.frequency_hi() as u16) << 8) | self.frequency_lo as u16
    }

    pub fn envelope_reg(&self) -> EnvelopeReg {
        self.envelope_reg
    }

    pub fn frequency_hi_reg(&self) -> FrequencyHiReg {
        self.frequency_hi_reg
    }

    pub fn set_duty_length_reg(&mut self, data: u8) {
        self.duty_length_reg = DutyLengthReg(data);
        self.length_counter = SQUARE_LENGTH_MAX - self.duty_length_reg.length_load() as u16;
    }

    pub fn set_envelope_reg(&mut self, data: u8) {
        // Only a restart loads the new volume; powering the DAC down silences the channel at once
        self.envelope_reg = EnvelopeReg(data);
        if !self.envelope_reg.dac_enabled() {
            self.enabled = false;
        }
    }

    pub fn set_frequency_reg_lo(&mut self, data: u8) {
        self.frequency_lo = data;
    }

    pub fn set_frequency_reg_hi(&mut self, data: u8) {
        self.frequency_hi_reg = FrequencyHiReg(data);
        if self.frequency_hi_reg.restart() {
            self.restart();
        }
    }

    pub fn clock_length(&mut self) {
        if self.frequency_hi_reg.length_enable() && self.length_counter > 0 {
            self.length_counter -= 1;
            if self.length_counter == 0 {
                self.enabled = false;
            }
        }
    }

    pub fn clock_envelope(&mut self) {
        let period = self.envelope_reg.period();
        if period == 0 {
            return;
        }
        if self.envelope_counter > 0 {
            self.envelope_counter -= 1;
        }
        if self.envelope_counter == 0 {
            self.envelope_counter = period;
            if self.envelope_reg.add_mode() && self.curr_vol < 15 {
                self.curr_vol += 1;
            } else if !self.envelope_reg.add_mode() && self.curr_vol > 0 {
                self.curr_vol -= 1;
            }
        }
    }

    pub fn clock_sweep(&mut self) {
        if self.sweep_counter > 0 {
            self.sweep_counter -= 1;
        }
        if self.sweep_counter != 0 {
            return;
        }
        self.sweep_counter = self.sweep_period();

        if self.sweep_enabled && self.sweep_reg.period() != 0 {
            let new_frequency = self.next_sweep_frequency();
            if new_frequency <= MAX_FREQUENCY && self.sweep_reg.shift() != 0 {
                self.shadow_frequency = new_frequency;
                self.frequency_lo = new_frequency as u8;
                self.frequency_hi_reg
                    .set_frequency_hi((new_frequency >> 8) as u8);
                // The overflow check runs a second time against the frequency just written
                self.next_sweep_frequency();
            }
        }
    }

    fn next_sweep_frequency(&mut self) -> u16 {
        let delta = self.shadow_frequency >> self.sweep_reg.shift();
        let new_frequency = if self.sweep_reg.negate() {
            self.shadow_frequency.wrapping_sub(delta)
        } else {
            self.shadow_frequency + delta
        };
        if new_frequency > MAX_FREQUENCY {
            self.enabled = false;
        }
        new_frequency
    }

    fn sweep_period(&self) -> u8 {
        match self.sweep_reg.period() {
            0 => 8,
            period => period,
        }
    }

    fn period(&self) -> u32 {
        (2048 - self.frequency() as u32) * 4
    }

    fn restart(&mut self) {
        self.enabled = self.envelope_reg.dac_enabled();
        self.counter = self.period();
        self.curr_vol = self.envelope_reg.initial_volume();
        self.envelope_counter = self.envelope_reg.period();
        if self.length_counter == 0 {
            self.length_counter = SQUARE_LENGTH_MAX;
        }

        self.shadow_frequency = self.frequency();
        self.sweep_counter = self.sweep_period();
        self.sweep_enabled = self.sweep_reg.period() != 0 || self.sweep_reg.shift() != 0;
        if self.sweep_reg.shift() != 0 {
            self.next_sweep_frequency();
        }
    }
}
