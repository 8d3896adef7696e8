use crate::error::ConfigError;
use crate::machine::{CART_RAM_END, CART_RAM_START};
use crate::note_reader::{NOTE_BASE, SLOT_STRIDE};
use crate::voice::VOICE_COUNT;

use sound::consts::MASTER_CLOCK_HZ;

/// The four TIMA input clocks selectable through TAC
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerClock {
    Hz4096,
    Hz16384,
    Hz65536,
    Hz262144,
}

impl TimerClock {
    const ALL: [TimerClock; 4] = [
        TimerClock::Hz4096,
        TimerClock::Hz16384,
        TimerClock::Hz65536,
        TimerClock::Hz262144,
    ];

    pub fn hz(self) -> u32 {
        match self {
            TimerClock::Hz4096 => 4096,
            TimerClock::Hz16384 => 16384,
            TimerClock::Hz65536 => 65536,
            TimerClock::Hz262144 => 262144,
        }
    }

    /// TAC bits 1-0
    pub fn select(self) -> u8 {
        match self {
            TimerClock::Hz4096 => 0b00,
            TimerClock::Hz262144 => 0b01,
            TimerClock::Hz65536 => 0b10,
            TimerClock::Hz16384 => 0b11,
        }
    }
}

/// A timer interrupt rate expressed as TIMA clock and overflow divider
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerRate {
    pub clock: TimerClock,
    /// TIMA increments per overflow, 1..=256
    pub divider: u16,
}

impl TimerRate {
    pub const HZ_16384: TimerRate = TimerRate {
        clock: TimerClock::Hz16384,
        divider: 1,
    };

    /// Picks the slowest clock that reaches `hz` with a whole divider
    pub fn from_hz(hz: u32) -> Result<Self, ConfigError> {
        if hz == 0 {
            return Err(ConfigError::UnsupportedTickRate(hz));
        }
        TimerClock::ALL
            .iter()
            .find(|clock| clock.hz() % hz == 0 && clock.hz() / hz <= 256)
            .map(|&clock| TimerRate {
                clock,
                divider: (clock.hz() / hz) as u16,
            })
            .ok_or(ConfigError::UnsupportedTickRate(hz))
    }

    pub fn hz(&self) -> u32 {
        self.clock.hz() / self.divider as u32
    }

    /// The TMA value that reloads TIMA so it overflows every `divider` increments
    pub fn modulo(&self) -> u8 {
        (256 - self.divider) as u8
    }

    pub fn period_cycles(&self) -> u32 {
        MASTER_CLOCK_HZ / self.hz()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SynthConfig {
    /// Address of voice 0's note slot
    pub note_base: u16,
    pub tick_rate: TimerRate,
    pub sample_rate: u32,
    /// NR50 value written at power-on
    pub master_volume: u8,
    /// NR51 value written at power-on
    pub output_routing: u8,
    /// Time every tick against its period and count the ones that run long
    pub overrun_check: bool,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            note_base: NOTE_BASE,
            tick_rate: TimerRate::HZ_16384,
            sample_rate: 44_100,
            master_volume: 0x77,
            output_routing: 0xFF,
            overrun_check: cfg!(debug_assertions),
        }
    }
}

impl SynthConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let last_slot_byte =
            self.note_base as u32 + (VOICE_COUNT as u32 - 1) * SLOT_STRIDE as u32 + 2;
        if self.note_base < CART_RAM_START || last_slot_byte > CART_RAM_END as u32 {
            return Err(ConfigError::NoteBaseOutOfRange {
                base: self.note_base,
            });
        }
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_rate_uses_16384_clock() {
        let rate = TimerRate::from_hz(16384).unwrap();
        assert_eq!(rate, TimerRate::HZ_16384);
        assert_eq!(rate.modulo(), 0xFF);
        assert_eq!(rate.clock.select(), 0b11);
        assert_eq!(rate.period_cycles(), 256);
    }

    #[test]
    fn slower_rates_divide_the_slowest_clock() {
        let rate = TimerRate::from_hz(64).unwrap();
        assert_eq!(rate.clock, TimerClock::Hz4096);
        assert_eq!(rate.divider, 64);
        assert_eq!(rate.modulo(), 0xC0);

        let rate = TimerRate::from_hz(8192).unwrap();
        assert_eq!(rate.clock, TimerClock::Hz16384);
        assert_eq!(rate.divider, 2);
        assert_eq!(rate.hz(), 8192);
    }

    #[test]
    fn unreachable_rates_are_rejected() {
        assert_eq!(
            TimerRate::from_hz(1000),
            Err(ConfigError::UnsupportedTickRate(1000))
        );
        assert_eq!(TimerRate::from_hz(0), Err(ConfigError::UnsupportedTickRate(0)));
        assert_eq!(
            TimerRate::from_hz(524288),
            Err(ConfigError::UnsupportedTickRate(524288))
        );
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SynthConfig::default().validate(), Ok(()));
    }

    #[test]
    fn note_base_must_fit_cartridge_ram() {
        let mut config = SynthConfig::default();
        config.note_base = 0x8000;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NoteBaseOutOfRange { base: 0x8000 })
        );
        config.note_base = 0xBFE0;
        assert!(config.validate().is_err());
        config.note_base = 0xBFDD;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn zero_sample_rate_is_rejected() {
        let config = SynthConfig {
            sample_rate: 0,
            ..SynthConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroSampleRate));
    }
}
