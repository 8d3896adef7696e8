use crate::freq_table;
use crate::note_reader::NoteSlot;

use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU8, Ordering};

pub const VOICE_COUNT: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoiceKind {
    /// 4-bit envelope volume
    Square,
    /// 2-bit output level code
    Wave,
}

/// Per-voice state carried between ticks
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Voice {
    /// Stays at the last in-range note's divisor while the note is out of range
    pub frequency: u16,
    pub amplitude: u8,
    pub previous_amplitude: u8,
}

/// What a tick writes to hardware for one voice
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoiceUpdate {
    pub amplitude: u8,
    pub frequency: u16,
    pub retrigger: bool,
}

impl Voice {
    pub fn update(&mut self, kind: VoiceKind, slot: &NoteSlot) -> VoiceUpdate {
        let mut amplitude = if slot.is_active() {
            slot.velocity >> 3
        } else {
            0
        };
        if kind == VoiceKind::Wave {
            amplitude = wave_volume_code(amplitude);
        }

        match freq_table::note_index(slot.number) {
            Some(index) => self.frequency = freq_table::lookup(index),
            None => amplitude = 0,
        }

        let retrigger = amplitude != self.previous_amplitude;
        self.amplitude = amplitude;
        self.previous_amplitude = amplitude;

        VoiceUpdate {
            amplitude,
            frequency: self.frequency,
            retrigger,
        }
    }
}

/// Maps a square-scale amplitude onto the wave channel's output level code.
///
/// Codes run 1 = 100%, 2 = 50%, 3 = 25%, 0 = mute, so louder notes get smaller codes. Inputs
/// above 15 (velocities past 127) wrap around the two-bit field.
pub fn wave_volume_code(amplitude: u8) -> u8 {
    4u8.wrapping_sub(amplitude >> 2) & 0x3
}

/// A display copy of one voice, possibly torn across fields
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VoiceSnapshot {
    pub active: bool,
    pub number: u8,
    pub velocity: u8,
    pub frequency: u16,
    pub amplitude: u8,
}

#[derive(Default)]
struct MonitorSlot {
    active: AtomicBool,
    number: AtomicU8,
    velocity: AtomicU8,
    frequency: AtomicU16,
    amplitude: AtomicU8,
}

/// Voice state published by the tick for readers on other threads.
///
/// The tick is the only writer. Fields are stored independently, so a reader racing the tick can
/// see a mix of two ticks' values; that is fine for a status display and nothing else.
#[derive(Default)]
pub struct VoiceMonitor {
    slots: [MonitorSlot; VOICE_COUNT],
}

impl VoiceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, voice_i: usize, slot: &NoteSlot, voice: &Voice) {
        let monitor_slot = &self.slots[voice_i];
        monitor_slot.active.store(slot.is_active(), Ordering::Relaxed);
        monitor_slot.number.store(slot.number, Ordering::Relaxed);
        monitor_slot.velocity.store(slot.velocity, Ordering::Relaxed);
        monitor_slot.frequency.store(voice.frequency, Ordering::Relaxed);
        monitor_slot.amplitude.store(voice.amplitude, Ordering::Relaxed);
    }

    pub fn snapshot(&self, voice_i: usize) -> VoiceSnapshot {
        let monitor_slot = &self.slots[voice_i];
        VoiceSnapshot {
            active: monitor_slot.active.load(Ordering::Relaxed),
            number: monitor_slot.number.load(Ordering::Relaxed),
            velocity: monitor_slot.velocity.load(Ordering::Relaxed),
            frequency: monitor_slot.frequency.load(Ordering::Relaxed),
            amplitude: monitor_slot.amplitude.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(active: u8, number: u8, velocity: u8) -> NoteSlot {
        NoteSlot {
            active,
            number,
            velocity,
        }
    }

    #[test]
    fn wave_code_for_every_raw_amplitude() {
        for raw in 0..=31u8 {
            let expected = ((4i32 - (raw >> 2) as i32) & 0x3) as u8;
            assert_eq!(wave_volume_code(raw), expected, "raw amplitude {}", raw);
        }
        assert_eq!(wave_volume_code(0), 0);
        assert_eq!(wave_volume_code(4), 3);
        assert_eq!(wave_volume_code(8), 2);
        assert_eq!(wave_volume_code(15), 1);
        assert_eq!(wave_volume_code(16), 0);
        assert_eq!(wave_volume_code(31), 1);
    }

    #[test]
    fn out_of_range_notes_are_silent_for_any_velocity() {
        for number in (0..24u8).chain(98..=255u8) {
            for &kind in &[VoiceKind::Square, VoiceKind::Wave] {
                let mut voice = Voice::default();
                let update = voice.update(kind, &slot(1, number, 127));
                assert_eq!(update.amplitude, 0, "note {}", number);
            }
        }
    }

    #[test]
    fn out_of_range_note_keeps_stale_frequency() {
        let mut voice = Voice::default();
        voice.update(VoiceKind::Square, &slot(1, 33, 120));
        let update = voice.update(VoiceKind::Square, &slot(1, 120, 120));
        assert_eq!(update.frequency, 854);
        assert_eq!(update.amplitude, 0);
        assert!(update.retrigger);
    }

    #[test]
    fn square_amplitude_is_velocity_over_eight() {
        let mut voice = Voice::default();
        assert_eq!(voice.update(VoiceKind::Square, &slot(1, 60, 120)).amplitude, 15);
        assert_eq!(voice.update(VoiceKind::Square, &slot(1, 60, 64)).amplitude, 8);
        assert_eq!(voice.update(VoiceKind::Square, &slot(0, 60, 64)).amplitude, 0);
    }

    #[test]
    fn retrigger_only_on_amplitude_change() {
        let mut voice = Voice::default();
        assert!(voice.update(VoiceKind::Square, &slot(1, 60, 100)).retrigger);
        // Pitch glide at the same amplitude
        let glide = voice.update(VoiceKind::Square, &slot(1, 62, 100));
        assert!(!glide.retrigger);
        assert_eq!(glide.frequency, freq_table::lookup(38));
        // Velocity change re-articulates the same pitch
        assert!(voice.update(VoiceKind::Square, &slot(1, 62, 60)).retrigger);
        assert_eq!(voice.previous_amplitude, 7);
    }

    #[test]
    fn release_retriggers_once() {
        let mut voice = Voice::default();
        voice.update(VoiceKind::Square, &slot(1, 60, 100));
        assert!(voice.update(VoiceKind::Square, &slot(0, 60, 100)).retrigger);
        assert!(!voice.update(VoiceKind::Square, &slot(0, 60, 100)).retrigger);
    }

    #[test]
    fn monitor_returns_published_values() {
        let monitor = VoiceMonitor::new();
        let mut voice = Voice::default();
        let note = slot(1, 33, 120);
        voice.update(VoiceKind::Square, &note);
        monitor.publish(1, &note, &voice);
        assert_eq!(
            monitor.snapshot(1),
            VoiceSnapshot {
                active: true,
                number: 33,
                velocity: 120,
                frequency: 854,
                amplitude: 15,
            }
        );
        assert_eq!(monitor.snapshot(0), VoiceSnapshot::default());
    }
}
