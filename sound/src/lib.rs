#[macro_use]
extern crate bitfield;

pub mod consts;
pub mod registers;
mod tone_channel;
mod wave_channel;

use crate::consts::*;
use crate::registers::*;
use crate::tone_channel::*;
use crate::wave_channel::*;

use log::{debug, trace};
use memory::Memory;

/// The four-channel programmable sound generator, mapped at FF10h-FF3Fh.
///
/// Channels 1 and 2 are square waves, channel 3 plays the 32-nibble pattern RAM. Channel 4's
/// registers are latched but the channel itself produces no output.
pub struct SoundController {
    tone_channels: [ToneChannel; 2],
    wave_channel: WaveChannel,
    noise_regs: [u8; 4],
    master_volume_reg: MasterVolumeReg,
    output_routing_reg: OutputRoutingReg,
    master_enable: bool,
    sequencer_divider: u32,
    sequencer_step: u8,
}

impl SoundController {
    pub fn new() -> Self {
        Self {
            tone_channels: [ToneChannel::new(), ToneChannel::new()],
            wave_channel: WaveChannel::new(),
            noise_regs: [0; 4],
            master_volume_reg: MasterVolumeReg(0),
            output_routing_reg: OutputRoutingReg(0),
            master_enable: false,
            sequencer_divider: FRAME_SEQUENCER_PERIOD,
            sequencer_step: 0,
        }
    }

    pub fn tick(&mut self, cycles: u32) {
        if !self.master_enable {
            return;
        }

        for tone_channel in &mut self.tone_channels {
            tone_channel.tick(cycles);
        }
        self.wave_channel.tick(cycles);

        let mut remaining = cycles;
        while remaining >= self.sequencer_divider {
            remaining -= self.sequencer_divider;
            self.sequencer_divider = FRAME_SEQUENCER_PERIOD;
            self.step_frame_sequencer();
        }
        self.sequencer_divider -= remaining;
    }

    fn step_frame_sequencer(&mut self) {
        if self.sequencer_step % 2 == 0 {
            for tone_channel in &mut self.tone_channels {
                tone_channel.clock_length();
            }
            self.wave_channel.clock_length();
        }
        if self.sequencer_step == 2 || self.sequencer_step == 6 {
            self.tone_channels[0].clock_sweep();
        }
        if self.sequencer_step == 7 {
            for tone_channel in &mut self.tone_channels {
                tone_channel.clock_envelope();
            }
        }
        self.sequencer_step = (self.sequencer_step + 1) % 8;
    }

    /// Mixes the current output of every channel into a (left, right) pair in [-1, 1]
    pub fn sample(&self) -> (f32, f32) {
        if !self.master_enable {
            return (0.0, 0.0);
        }

        let channel_samples = [
            self.tone_channels[0].sample(),
            self.tone_channels[1].sample(),
            self.wave_channel.sample(),
            0.0,
        ];

        let mut left = 0.0;
        let mut right = 0.0;
        for (channel_i, sample) in channel_samples.iter().enumerate() {
            if self.output_routing_reg.left(channel_i) {
                left += 0.25 * sample;
            }
            if self.output_routing_reg.right(channel_i) {
                right += 0.25 * sample;
            }
        }

        let left_vol = (self.master_volume_reg.left_volume() + 1) as f32 / 8.0;
        let right_vol = (self.master_volume_reg.right_volume() + 1) as f32 / 8.0;
        (left * left_vol, right * right_vol)
    }

    pub fn is_channel_enabled(&self, channel_i: usize) -> bool {
        match channel_i {
            0 | 1 => self.tone_channels[channel_i].is_enabled(),
            2 => self.wave_channel.is_enabled(),
            _ => false,
        }
    }

    pub fn channel_frequency(&self, channel_i: usize) -> u16 {
        match channel_i {
            0 | 1 => self.tone_channels[channel_i].frequency(),
            2 => self.wave_channel.frequency(),
            _ => 0,
        }
    }

    pub fn channel_volume(&self, channel_i: usize) -> u8 {
        match channel_i {
            0 | 1 => self.tone_channels[channel_i].volume(),
            2 => self.wave_channel.volume_reg.volume(),
            _ => 0,
        }
    }

    fn set_master_enable(&mut self, enable: bool) {
        if self.master_enable == enable {
            return;
        }
        debug!("sound {}", if enable { "powered on" } else { "powered off" });

        if !enable {
            // Powering off clears every register except the pattern RAM
            let mut wave_channel = WaveChannel::new();
            for octet_i in 0..16 {
                let octet = self.wave_channel.read_pattern_octet(octet_i);
                wave_channel.write_pattern_octet(octet_i, octet);
            }
            self.tone_channels = [ToneChannel::new(), ToneChannel::new()];
            self.wave_channel = wave_channel;
            self.noise_regs = [0; 4];
            self.master_volume_reg = MasterVolumeReg(0);
            self.output_routing_reg = OutputRoutingReg(0);
        } else {
            self.sequencer_divider = FRAME_SEQUENCER_PERIOD;
            self.sequencer_step = 0;
        }
        self.master_enable = enable;
    }

    fn status_reg(&self) -> SoundOnReg {
        let mut status = 0x70;
        for channel_i in 0..3 {
            if self.is_channel_enabled(channel_i) {
                status |= 1 << channel_i;
            }
        }
        let mut reg = SoundOnReg(status);
        reg.set_master_enable(self.master_enable);
        reg
    }
}

impl Default for SoundController {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory for SoundController {
    fn peek(&self, addr: u16) -> u8 {
        // Write-only bits read back as 1
        match addr {
            NR10 => 0x80 | self.tone_channels[0].sweep_reg.0,
            NR11 => 0x3F | self.tone_channels[0].duty_length_reg.0,
            NR12 => self.tone_channels[0].envelope_reg().0,
            NR14 => 0xBF | self.tone_channels[0].frequency_hi_reg().0,
            NR21 => 0x3F | self.tone_channels[1].duty_length_reg.0,
            NR22 => self.tone_channels[1].envelope_reg().0,
            NR24 => 0xBF | self.tone_channels[1].frequency_hi_reg().0,
            NR30 => 0x7F | self.wave_channel.enable_reg.0,
            NR32 => 0x9F | self.wave_channel.volume_reg.0,
            NR34 => 0xBF | self.wave_channel.frequency_hi_reg().0,
            NR42 => self.noise_regs[1],
            NR43 => self.noise_regs[2],
            NR44 => 0xBF | self.noise_regs[3],
            NR50 => self.master_volume_reg.0,
            NR51 => self.output_routing_reg.0,
            NR52 => self.status_reg().0,
            WAVE_RAM_START..=WAVE_RAM_END => self
                .wave_channel
                .read_pattern_octet((addr - WAVE_RAM_START) as usize),
            _ => 0xFF,
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            NR52 => {
                self.set_master_enable(SoundOnReg(data).master_enable());
                return;
            }
            WAVE_RAM_START..=WAVE_RAM_END => {
                self.wave_channel
                    .write_pattern_octet((addr - WAVE_RAM_START) as usize, data);
                return;
            }
            _ => {}
        }

        if !self.master_enable {
            trace!("ignoring write {:02X} to {:04X} while powered off", data, addr);
            return;
        }

        match addr {
            NR10 => self.tone_channels[0].sweep_reg = SweepReg(data),
            NR11 => self.tone_channels[0].set_duty_length_reg(data),
            NR12 => self.tone_channels[0].set_envelope_reg(data),
            NR13 => self.tone_channels[0].set_frequency_reg_lo(data),
            NR14 => self.tone_channels[0].set_frequency_reg_hi(data),
            NR21 => self.tone_channels[1].set_duty_length_reg(data),
            NR22 => self.tone_channels[1].set_envelope_reg(data),
            NR23 => self.tone_channels[1].set_frequency_reg_lo(data),
            NR24 => self.tone_channels[1].set_frequency_reg_hi(data),
            NR30 => self.wave_channel.set_enable_reg(data),
            NR31 => self.wave_channel.set_length_reg(data),
            NR32 => self.wave_channel.volume_reg = WaveVolumeReg(data),
            NR33 => self.wave_channel.set_frequency_reg_lo(data),
            NR34 => self.wave_channel.set_frequency_reg_hi(data),
            NR41..=NR44 => self.noise_regs[(addr - NR41) as usize] = data,
            NR50 => self.master_volume_reg = MasterVolumeReg(data),
            NR51 => self.output_routing_reg = OutputRoutingReg(data),
            _ => trace!("write {:02X} to unmapped sound address {:04X}", data, addr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn powered() -> SoundController {
        let mut sound = SoundController::new();
        sound.write(NR52, 0x80);
        sound.write(NR50, 0x77);
        sound.write(NR51, 0xFF);
        sound
    }

    #[test]
    fn writes_ignored_while_powered_off() {
        let mut sound = SoundController::new();
        sound.write(NR50, 0x77);
        assert_eq!(sound.peek(NR50), 0x00);
        assert_eq!(sound.peek(NR52), 0x70);
    }

    #[test]
    fn restart_enables_channel_and_status() {
        let mut sound = powered();
        sound.write(NR12, 0xF0);
        sound.write(NR13, 0x56);
        sound.write(NR14, 0x83);
        assert!(sound.is_channel_enabled(0));
        assert_eq!(sound.channel_frequency(0), 854);
        assert_eq!(sound.channel_volume(0), 15);
        assert_eq!(sound.peek(NR52), 0xF1);
    }

    #[test]
    fn zero_envelope_disables_channel() {
        let mut sound = powered();
        sound.write(NR22, 0xF0);
        sound.write(NR24, 0x87);
        assert!(sound.is_channel_enabled(1));
        sound.write(NR22, 0x00);
        sound.write(NR24, 0x87);
        assert!(!sound.is_channel_enabled(1));
    }

    #[test]
    fn power_off_clears_registers_but_keeps_pattern_ram() {
        let mut sound = powered();
        sound.write(WAVE_RAM_START, 0x12);
        sound.write(NR12, 0xF0);
        sound.write(NR14, 0x80);
        sound.write(NR52, 0x00);
        assert!(!sound.is_channel_enabled(0));
        assert_eq!(sound.peek(NR12), 0x00);
        assert_eq!(sound.peek(NR51), 0x00);
        assert_eq!(sound.peek(WAVE_RAM_START), 0x12);
    }

    #[test]
    fn write_only_registers_read_back_masked() {
        let mut sound = powered();
        sound.write(NR13, 0x56);
        sound.write(NR14, 0x03);
        assert_eq!(sound.peek(NR13), 0xFF);
        assert_eq!(sound.peek(NR14), 0xBF);
        sound.write(NR32, 0x20);
        assert_eq!(sound.peek(NR32), 0xBF);
    }

    #[test]
    fn routing_selects_outputs() {
        let mut sound = powered();
        sound.write(NR51, 0x01); // channel 1 right only
        sound.write(NR11, 0x80);
        sound.write(NR12, 0xF0);
        sound.write(NR13, 0xFF);
        sound.write(NR14, 0x87);
        let (left, right) = sound.sample();
        assert_relative_eq!(left, 0.0);
        assert_relative_eq!(right.abs(), 0.25);
    }

    #[test]
    fn master_volume_scales_mix() {
        let mut sound = powered();
        sound.write(NR50, 0x30); // left 4/8, right 1/8
        sound.write(NR11, 0x80);
        sound.write(NR12, 0xF0);
        sound.write(NR14, 0x80);
        let (left, right) = sound.sample();
        assert_relative_eq!(left.abs(), 0.25 * 0.5);
        assert_relative_eq!(right.abs(), 0.25 * 0.125);
    }

    #[test]
    fn frame_sequencer_clocks_envelope() {
        let mut sound = powered();
        sound.write(NR12, 0xF1);
        sound.write(NR14, 0x80);
        // The envelope is clocked on the eighth sequencer step
        sound.tick(FRAME_SEQUENCER_PERIOD * 8);
        assert_eq!(sound.channel_volume(0), 14);
    }
}
