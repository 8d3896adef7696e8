#[macro_use]
extern crate bitfield;

pub mod config;
pub mod error;
pub mod freq_table;
pub mod interrupt_controller;
pub mod machine;
pub mod note_reader;
pub mod ports;
pub mod status;
pub mod synthesizer;
pub mod timer_controller;
pub mod voice;

pub use crate::config::{SynthConfig, TimerClock, TimerRate};
pub use crate::error::ConfigError;
pub use crate::machine::{CartridgeRam, Machine, TickStats, TimerHandler};
pub use crate::note_reader::{NoteReader, NoteSlot};
pub use crate::status::{StatusRenderer, TextBuffer, TextDisplay};
pub use crate::synthesizer::Synthesizer;
pub use crate::voice::{VoiceMonitor, VoiceSnapshot};

use std::sync::Arc;

/// Builds a powered-on machine with the synthesizer installed on the timer interrupt
pub fn boot(config: &SynthConfig) -> Result<(Machine, Arc<VoiceMonitor>), ConfigError> {
    config.validate()?;

    let monitor = Arc::new(VoiceMonitor::new());
    let synthesizer = Synthesizer::new(NoteReader::new(config.note_base), monitor.clone());

    let mut machine = Machine::new(config);
    synthesizer.power_on(machine.sound_ports(), config);
    machine.install_timer_handler(config.tick_rate, Box::new(synthesizer));

    Ok((machine, monitor))
}
