use synth::voice::VOICE_COUNT;
use synth::NoteSlot;

use sdl2::keyboard::Scancode;

const DEFAULT_VELOCITY: u8 = 100;
const VELOCITY_STEP: u8 = 8;

// Chromatic rows, one octave each, starting on C
const LOWER_ROW: [Scancode; 12] = [
    Scancode::Z,
    Scancode::S,
    Scancode::X,
    Scancode::D,
    Scancode::C,
    Scancode::V,
    Scancode::G,
    Scancode::B,
    Scancode::H,
    Scancode::N,
    Scancode::J,
    Scancode::M,
];
const UPPER_ROW: [Scancode; 12] = [
    Scancode::Q,
    Scancode::Num2,
    Scancode::W,
    Scancode::Num3,
    Scancode::E,
    Scancode::R,
    Scancode::Num5,
    Scancode::T,
    Scancode::Num6,
    Scancode::Y,
    Scancode::Num7,
    Scancode::U,
];
// C major scale for the wave voice
const FUNCTION_ROW: [(Scancode, u8); 8] = [
    (Scancode::F1, 0),
    (Scancode::F2, 2),
    (Scancode::F3, 4),
    (Scancode::F4, 5),
    (Scancode::F5, 7),
    (Scancode::F6, 9),
    (Scancode::F7, 11),
    (Scancode::F8, 12),
];

const LOWER_BASE: u8 = 48;
const UPPER_BASE: u8 = 60;
const FUNCTION_BASE: u8 = 48;

/// Turns key presses into note slots, one monophonic voice per key row.
///
/// The last key pressed on a row owns its voice; releasing any other key on that row leaves
/// the note sounding.
pub struct Keyboard {
    velocity: u8,
    held: [Option<Scancode>; VOICE_COUNT],
    numbers: [u8; VOICE_COUNT],
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            velocity: DEFAULT_VELOCITY,
            held: [None; VOICE_COUNT],
            numbers: [0; VOICE_COUNT],
        }
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    /// Returns the voice and slot to deposit, if the key plays a note
    pub fn key_down(&mut self, scancode: Scancode) -> Option<(usize, NoteSlot)> {
        match scancode {
            Scancode::Up => {
                self.velocity = (self.velocity + VELOCITY_STEP).min(127);
                None
            }
            Scancode::Down => {
                self.velocity = self.velocity.saturating_sub(VELOCITY_STEP);
                None
            }
            _ => {
                let (voice_i, number) = note_for(scancode)?;
                self.held[voice_i] = Some(scancode);
                self.numbers[voice_i] = number;
                Some((
                    voice_i,
                    NoteSlot {
                        active: 1,
                        number,
                        velocity: self.velocity,
                    },
                ))
            }
        }
    }

    pub fn key_up(&mut self, scancode: Scancode) -> Option<(usize, NoteSlot)> {
        let (voice_i, _) = note_for(scancode)?;
        if self.held[voice_i] != Some(scancode) {
            return None;
        }
        self.held[voice_i] = None;
        Some((
            voice_i,
            NoteSlot {
                active: 0,
                number: self.numbers[voice_i],
                velocity: self.velocity,
            },
        ))
    }
}

fn note_for(scancode: Scancode) -> Option<(usize, u8)> {
    if let Some(semitone) = LOWER_ROW.iter().position(|&key| key == scancode) {
        return Some((0, LOWER_BASE + semitone as u8));
    }
    if let Some(semitone) = UPPER_ROW.iter().position(|&key| key == scancode) {
        return Some((1, UPPER_BASE + semitone as u8));
    }
    FUNCTION_ROW
        .iter()
        .find(|&&(key, _)| key == scancode)
        .map(|&(_, interval)| (2, FUNCTION_BASE + interval))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_map_to_voices() {
        let mut keyboard = Keyboard::new();
        let (voice_i, slot) = keyboard.key_down(Scancode::Z).unwrap();
        assert_eq!((voice_i, slot.number, slot.active), (0, 48, 1));
        assert_eq!(keyboard.key_down(Scancode::U).unwrap().1.number, 71);
        assert_eq!(keyboard.key_down(Scancode::F8).unwrap().0, 2);
        assert_eq!(keyboard.key_down(Scancode::F8).unwrap().1.number, 60);
        assert!(keyboard.key_down(Scancode::P).is_none());
    }

    #[test]
    fn only_the_sounding_key_releases() {
        let mut keyboard = Keyboard::new();
        keyboard.key_down(Scancode::Z);
        keyboard.key_down(Scancode::X);
        assert!(keyboard.key_up(Scancode::Z).is_none());

        let (voice_i, slot) = keyboard.key_up(Scancode::X).unwrap();
        assert_eq!(voice_i, 0);
        assert_eq!(slot.active, 0);
        assert_eq!(slot.number, 50);
    }

    #[test]
    fn velocity_is_clamped() {
        let mut keyboard = Keyboard::new();
        for _ in 0..10 {
            keyboard.key_down(Scancode::Up);
        }
        assert_eq!(keyboard.velocity(), 127);
        for _ in 0..20 {
            keyboard.key_down(Scancode::Down);
        }
        assert_eq!(keyboard.velocity(), 0);
        assert_eq!(keyboard.key_down(Scancode::C).unwrap().1.velocity, 0);
    }
}
