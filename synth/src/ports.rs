//! Write-only access to the sound generator's registers.
//!
//! The driver only ever names a [`Port`]; where the byte lands is up to the [`SoundPorts`]
//! implementation: the emulated [`SoundController`], or [`VolatilePorts`] over the real
//! memory-mapped block.

use crate::voice::{VoiceKind, VOICE_COUNT};

use sound::registers::*;
use sound::SoundController;

use memory::Memory;
use volatile_register::WO;

const SOUND_REGISTER_SPAN: usize = (WAVE_RAM_END - NR10) as usize + 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Port {
    /// Channel 1 duty/length (`DutyLengthReg`)
    Nr11,
    /// Channel 1 envelope (`EnvelopeReg`)
    Nr12,
    /// Channel 1 frequency low byte
    Nr13,
    /// Channel 1 frequency high bits and restart (`FrequencyHiReg`)
    Nr14,
    Nr21,
    Nr22,
    Nr23,
    Nr24,
    /// Channel 3 DAC power (`WaveEnableReg`)
    Nr30,
    /// Channel 3 output level (`WaveVolumeReg`)
    Nr32,
    Nr33,
    Nr34,
    /// Master volume (`MasterVolumeReg`)
    Nr50,
    /// Output routing (`OutputRoutingReg`)
    Nr51,
    /// Master enable (`SoundOnReg`)
    Nr52,
    /// One of the 16 pattern RAM bytes
    WaveRam(u8),
}

impl Port {
    pub fn address(self) -> u16 {
        match self {
            Port::Nr11 => NR11,
            Port::Nr12 => NR12,
            Port::Nr13 => NR13,
            Port::Nr14 => NR14,
            Port::Nr21 => NR21,
            Port::Nr22 => NR22,
            Port::Nr23 => NR23,
            Port::Nr24 => NR24,
            Port::Nr30 => NR30,
            Port::Nr32 => NR32,
            Port::Nr33 => NR33,
            Port::Nr34 => NR34,
            Port::Nr50 => NR50,
            Port::Nr51 => NR51,
            Port::Nr52 => NR52,
            Port::WaveRam(octet_i) => WAVE_RAM_START + (octet_i & 0x0F) as u16,
        }
    }
}

/// The three registers a voice drives
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelPorts {
    pub kind: VoiceKind,
    pub amplitude: Port,
    pub frequency_lo: Port,
    pub frequency_hi: Port,
}

pub const VOICE_PORTS: [ChannelPorts; VOICE_COUNT] = [
    ChannelPorts {
        kind: VoiceKind::Square,
        amplitude: Port::Nr12,
        frequency_lo: Port::Nr13,
        frequency_hi: Port::Nr14,
    },
    ChannelPorts {
        kind: VoiceKind::Square,
        amplitude: Port::Nr22,
        frequency_lo: Port::Nr23,
        frequency_hi: Port::Nr24,
    },
    ChannelPorts {
        kind: VoiceKind::Wave,
        amplitude: Port::Nr32,
        frequency_lo: Port::Nr33,
        frequency_hi: Port::Nr34,
    },
];

pub trait SoundPorts {
    fn write_port(&mut self, port: Port, data: u8);
}

impl SoundPorts for SoundController {
    fn write_port(&mut self, port: Port, data: u8) {
        self.write(port.address(), data);
    }
}

/// FF10h-FF3Fh as laid out in the address space
#[repr(C)]
pub struct SoundRegisterBlock {
    registers: [WO<u8>; SOUND_REGISTER_SPAN],
}

/// Volatile writes straight into a memory-mapped register block
pub struct VolatilePorts {
    block: *const SoundRegisterBlock,
}

impl VolatilePorts {
    /// # Safety
    ///
    /// `base` must point at the NR10 register of a mapped sound register block (FF10h on the
    /// hardware) that stays mapped for the lifetime of the returned value, and nothing else may
    /// hold a Rust reference into that block.
    pub unsafe fn new(base: *mut u8) -> Self {
        Self {
            block: base as *const SoundRegisterBlock,
        }
    }
}

impl SoundPorts for VolatilePorts {
    fn write_port(&mut self, port: Port, data: u8) {
        let offset = (port.address() - NR10) as usize;
        // SAFETY: `new` requires `block` to be a mapped register block and every port address
        // lies inside it.
        unsafe { (*self.block).registers[offset].write(data) }
    }
}

/// Captures every port write in order
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingPorts {
    pub writes: Vec<(Port, u8)>,
}

#[cfg(test)]
impl RecordingPorts {
    pub fn last(&self, port: Port) -> Option<u8> {
        self.writes
            .iter()
            .rev()
            .find(|(written, _)| *written == port)
            .map(|&(_, data)| data)
    }
}

#[cfg(test)]
impl SoundPorts for RecordingPorts {
    fn write_port(&mut self, port: Port, data: u8) {
        self.writes.push((port, data));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ports_map_to_register_addresses() {
        assert_eq!(Port::Nr14.address(), 0xFF14);
        assert_eq!(Port::Nr24.address(), 0xFF19);
        assert_eq!(Port::Nr34.address(), 0xFF1E);
        assert_eq!(Port::Nr52.address(), 0xFF26);
        assert_eq!(Port::WaveRam(0).address(), 0xFF30);
        assert_eq!(Port::WaveRam(15).address(), 0xFF3F);
    }

    #[test]
    fn volatile_writes_land_at_register_offsets() {
        let mut block = [0u8; SOUND_REGISTER_SPAN];
        {
            let mut ports = unsafe { VolatilePorts::new(block.as_mut_ptr()) };
            ports.write_port(Port::Nr12, 0xF0);
            ports.write_port(Port::Nr14, 0x83);
            ports.write_port(Port::Nr52, 0x80);
            ports.write_port(Port::WaveRam(15), 0x5A);
        }
        assert_eq!(block[0x02], 0xF0);
        assert_eq!(block[0x04], 0x83);
        assert_eq!(block[0x16], 0x80);
        assert_eq!(block[0x2F], 0x5A);
    }

    #[test]
    fn emulated_controller_receives_port_writes() {
        let mut sound = SoundController::new();
        sound.write_port(Port::Nr52, 0x80);
        sound.write_port(Port::Nr51, 0xF3);
        assert_eq!(sound.peek(NR51), 0xF3);
    }
}
