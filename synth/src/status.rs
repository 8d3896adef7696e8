use crate::machine::TickStats;
use crate::voice::{VoiceMonitor, VOICE_COUNT};

pub const DISPLAY_WIDTH: usize = 20;
pub const DISPLAY_HEIGHT: usize = 18;

const TITLE: &str = "MIDI Sound Generator";
const STATS_ROW: u16 = 14;

/// A character display with a movable cursor
pub trait TextDisplay {
    fn goto_xy(&mut self, x: u16, y: u16);
    fn put_str(&mut self, text: &str);
}

/// Draws voice state as hex text; reads published snapshots only
#[derive(Clone, Copy, Debug, Default)]
pub struct StatusRenderer;

impl StatusRenderer {
    pub fn new() -> Self {
        Self
    }

    /// `OV` on the last row counts every late tick: handler overruns plus coalesced timer
    /// interrupts.
    pub fn render<D: TextDisplay + ?Sized>(
        &self,
        display: &mut D,
        monitor: &VoiceMonitor,
        stats: &TickStats,
    ) {
        display.goto_xy(0, 0);
        display.put_str(TITLE);

        for voice_i in 0..VOICE_COUNT {
            let voice = monitor.snapshot(voice_i);
            let top = 1 + 4 * voice_i as u16;

            display.goto_xy(0, top);
            display.put_str(&format!(
                "CH{} {}",
                voice_i + 1,
                if voice.active { "ON" } else { "--" }
            ));
            display.goto_xy(0, top + 1);
            display.put_str(&format!(
                "NOTE {:02X} VEL {:02X}",
                voice.number, voice.velocity
            ));
            display.goto_xy(0, top + 2);
            display.put_str(&format!(
                "FREQ {:04X} AMP {:02X}",
                voice.frequency, voice.amplitude
            ));
        }

        let late = stats.overruns().saturating_add(stats.coalesced());
        display.goto_xy(0, STATS_ROW);
        display.put_str(&format!(
            "TK {:08X} OV {:04X}",
            stats.ticks(),
            late.min(0xFFFF)
        ));
    }
}

/// An in-memory 20x18 character grid
pub struct TextBuffer {
    cells: [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
    cursor: (usize, usize),
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            cells: [[b' '; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            cursor: (0, 0),
        }
    }

    pub fn line(&self, y: usize) -> String {
        String::from_utf8_lossy(&self.cells[y]).into_owned()
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextDisplay for TextBuffer {
    fn goto_xy(&mut self, x: u16, y: u16) {
        self.cursor = (x as usize, y as usize);
    }

    /// Text past the right edge or bottom row is dropped
    fn put_str(&mut self, text: &str) {
        let (x, y) = self.cursor;
        let row = match self.cells.get_mut(y) {
            Some(row) => row,
            None => return,
        };
        let mut written = 0;
        for (cell, byte) in row.iter_mut().skip(x).zip(text.bytes()) {
            *cell = if byte.is_ascii() { byte } else { b'?' };
            written += 1;
        }
        self.cursor = (x + written, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::note_reader::NoteSlot;
    use crate::voice::{Voice, VoiceKind};

    fn rendered(monitor: &VoiceMonitor, stats: &TickStats) -> TextBuffer {
        let mut buffer = TextBuffer::new();
        StatusRenderer::new().render(&mut buffer, monitor, stats);
        buffer
    }

    #[test]
    fn idle_layout() {
        let buffer = rendered(&VoiceMonitor::new(), &TickStats::default());
        assert_eq!(buffer.line(0), "MIDI Sound Generator");
        for voice_i in 0..VOICE_COUNT {
            let top = 1 + 4 * voice_i;
            assert_eq!(buffer.line(top).trim_end(), format!("CH{} --", voice_i + 1));
            assert_eq!(buffer.line(top + 1).trim_end(), "NOTE 00 VEL 00");
            assert_eq!(buffer.line(top + 2).trim_end(), "FREQ 0000 AMP 00");
            assert_eq!(buffer.line(top + 3).trim_end(), "");
        }
        assert_eq!(buffer.line(14).trim_end(), "TK 00000000 OV 0000");
    }

    #[test]
    fn active_voice_in_hex() {
        let monitor = VoiceMonitor::new();
        let slot = NoteSlot {
            active: 1,
            number: 69,
            velocity: 100,
        };
        let mut voice = Voice::default();
        voice.update(VoiceKind::Wave, &slot);
        monitor.publish(2, &slot, &voice);

        let buffer = rendered(&monitor, &TickStats::default());
        assert_eq!(buffer.line(9).trim_end(), "CH3 ON");
        assert_eq!(buffer.line(10).trim_end(), "NOTE 45 VEL 64");
        assert_eq!(
            buffer.line(11).trim_end(),
            format!("FREQ {:04X} AMP 01", voice.frequency)
        );
        assert_eq!(buffer.line(1).trim_end(), "CH1 --");
    }

    #[test]
    fn late_ticks_sum_overruns_and_coalesced() {
        let stats = TickStats::default();
        for _ in 0..0x12 {
            stats.record_tick();
        }
        stats.record_overrun();
        stats.record_overrun();
        stats.record_coalesced(3);

        let buffer = rendered(&VoiceMonitor::new(), &stats);
        assert_eq!(buffer.line(14).trim_end(), "TK 00000012 OV 0005");
    }

    #[test]
    fn text_is_clipped_at_the_edges() {
        let mut buffer = TextBuffer::new();
        buffer.goto_xy(15, 0);
        buffer.put_str("overflowing");
        assert_eq!(buffer.line(0), "               overf");
        buffer.goto_xy(0, 40);
        buffer.put_str("nowhere");
    }
}
