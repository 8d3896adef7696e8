use crate::config::SynthConfig;
use crate::machine::TimerHandler;
use crate::note_reader::NoteReader;
use crate::ports::{Port, SoundPorts, VOICE_PORTS};
use crate::voice::{Voice, VoiceKind, VoiceMonitor, VoiceUpdate, VOICE_COUNT};

use sound::registers::{
    DutyLengthReg, EnvelopeReg, FrequencyHiReg, SoundOnReg, WaveEnableReg, WaveVolumeReg,
};

use log::{info, trace};
use memory::Memory;

use std::sync::Arc;

/// Channel 3's pattern: one rising and one falling ramp
pub const TRIANGLE_PATTERN: [u8; 16] = [
    0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54, 0x32, 0x10,
];

/// Turns note slots into channel register writes, once per timer tick
pub struct Synthesizer {
    reader: NoteReader,
    voices: [Voice; VOICE_COUNT],
    monitor: Arc<VoiceMonitor>,
}

impl Synthesizer {
    pub fn new(reader: NoteReader, monitor: Arc<VoiceMonitor>) -> Self {
        Self {
            reader,
            voices: [Voice::default(); VOICE_COUNT],
            monitor,
        }
    }

    pub fn voices(&self) -> &[Voice; VOICE_COUNT] {
        &self.voices
    }

    /// Powers the sound generator up and sets everything the tick never touches
    pub fn power_on<P: SoundPorts + ?Sized>(&self, ports: &mut P, config: &SynthConfig) {
        info!(
            "powering on: master volume {:02X}, routing {:02X}",
            config.master_volume, config.output_routing
        );

        let mut sound_on = SoundOnReg(0);
        sound_on.set_master_enable(true);
        ports.write_port(Port::Nr52, sound_on.0);
        ports.write_port(Port::Nr50, config.master_volume);
        ports.write_port(Port::Nr51, config.output_routing);

        let mut duty = DutyLengthReg(0);
        duty.set_duty(0); // 12.5%
        ports.write_port(Port::Nr11, duty.0);
        duty.set_duty(2); // 50%
        ports.write_port(Port::Nr21, duty.0);

        for (octet_i, &octet) in TRIANGLE_PATTERN.iter().enumerate() {
            ports.write_port(Port::WaveRam(octet_i as u8), octet);
        }
        let mut wave_enable = WaveEnableReg(0);
        wave_enable.set_dac_enable(true);
        ports.write_port(Port::Nr30, wave_enable.0);
    }

    /// One timer period: read every voice's slot and rewrite its channel registers.
    ///
    /// Never blocks and never fails; the work is a fixed number of reads and writes.
    pub fn tick<M, P>(&mut self, notes: &M, ports: &mut P)
    where
        M: Memory + ?Sized,
        P: SoundPorts + ?Sized,
    {
        for (voice_i, channel) in VOICE_PORTS.iter().enumerate() {
            let slot = self.reader.read_voice(notes, voice_i);
            let update = self.voices[voice_i].update(channel.kind, &slot);

            ports.write_port(channel.amplitude, amplitude_reg(channel.kind, &update));
            ports.write_port(channel.frequency_lo, (update.frequency & 0xFF) as u8);
            let mut frequency_hi = FrequencyHiReg(0);
            frequency_hi.set_frequency_hi((update.frequency >> 8) as u8);
            frequency_hi.set_restart(update.retrigger);
            ports.write_port(channel.frequency_hi, frequency_hi.0);

            if update.retrigger {
                trace!("voice {} restarted at amplitude {}", voice_i, update.amplitude);
            }

            self.monitor.publish(voice_i, &slot, &self.voices[voice_i]);
        }
    }
}

fn amplitude_reg(kind: VoiceKind, update: &VoiceUpdate) -> u8 {
    match kind {
        VoiceKind::Square => {
            let mut envelope = EnvelopeReg(0);
            envelope.set_initial_volume(update.amplitude & 0xF);
            envelope.0
        }
        VoiceKind::Wave => {
            let mut volume = WaveVolumeReg(0);
            volume.set_volume(update.amplitude & 0x3);
            volume.0
        }
    }
}

impl TimerHandler for Synthesizer {
    fn on_timer(&mut self, notes: &dyn Memory, ports: &mut dyn SoundPorts) {
        self.tick(notes, ports);
    }
}
