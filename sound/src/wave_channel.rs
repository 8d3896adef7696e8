use crate::consts::*;
use crate::registers::*;

pub struct WaveChannel {
    pub enable_reg: WaveEnableReg,
    pub volume_reg: WaveVolumeReg,
    frequency_lo: u8,
    frequency_hi_reg: FrequencyHiReg,

    // 32 4-bit samples, two per byte, played high nibble first.
    pattern_ram: [u8; 16],
    enabled: bool,
    position: usize,
    counter: u32,
    length_counter: u16,
}

impl WaveChannel {
    pub fn new() -> Self {
        Self {
            enable_reg: WaveEnableReg(0),
            volume_reg: WaveVolumeReg(0),
            frequency_lo: 0,
            frequency_hi_reg: FrequencyHiReg(0),

            pattern_ram: [0; 16],
            enabled: false,
            position: 0,
            counter: 0,
            length_counter: 0,
        }
    }

    pub fn tick(&mut self, cycles: u32) {
        let mut remaining = cycles;
        while remaining >= self.counter {
            remaining -= self.counter;
            self.counter = self.period();
            if self.enabled {
                self.position = (self.position + 1) % 32;
            }
        }
        self.counter -= remaining;
    }

    pub fn sample(&self) -> f32 {
        if !self.enabled {
            return 0.0;
        }
        self.volume_multiplier() * ((self.current_nibble() as f32 / 15.0) - 0.5) * 2.0
    }

    fn current_nibble(&self) -> u8 {
        let byte = self.pattern_ram[self.position / 2];
        if self.position % 2 == 0 {
            byte >> 4
        } else {
            byte & 0x0F
        }
    }

    fn volume_multiplier(&self) -> f32 {
        match self.volume_reg.volume() {
            0 => 0.0,
            1 => 1.0,
            2 => 0.5,
            3 | _ => 0.25,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn frequency(&self) -> u16 {
        ((self.frequency_hi_reg.frequency_hi() as u16) << 8) | self.frequency_lo as u16
    }

    pub fn frequency_hi_reg(&self) -> FrequencyHiReg {
        self.frequency_hi_reg
    }

    pub fn set_enable_reg(&mut self, data: u8) {
        self.enable_reg = WaveEnableReg(data);
        if !self.enable_reg.dac_enable() {
            self.enabled = false;
        }
    }

    pub fn set_length_reg(&mut self, data: u8) {
        self.length_counter = WAVE_LENGTH_MAX - data as u16;
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

    // `octet_i` is the offset from FF30h
    pub fn read_pattern_octet(&self, octet_i: usize) -> u8 {
        self.pattern_ram[octet_i]
    }

    pub fn write_pattern_octet(&mut self, octet_i: usize, data: u8) {
        self.pattern_ram[octet_i] = data;
    }

    pub fn clock_length(&mut self) {
        if self.frequency_hi_reg.length_enable() && self.length_counter > 0 {
            self.length_counter -= 1;
            if self.length_counter == 0 {
                self.enabled = false;
            }
        }
    }

    fn restart(&mut self) {
        self.enabled = self.enable_reg.dac_enable();
        self.counter = self.period();
        self.position = 0;
        if self.length_counter == 0 {
            self.length_counter = WAVE_LENGTH_MAX;
        }
    }

    fn period(&self) -> u32 {
        (2048 - self.frequency() as u32) * 2
    }
}
