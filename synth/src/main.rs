mod keyboard;
mod terminal;

use crate::keyboard::Keyboard;
use crate::terminal::TerminalDisplay;

use synth::{ConfigError, Machine, NoteReader, StatusRenderer, SynthConfig, TimerRate};

use clap::Parser;
use log::{error, info};
use thiserror::Error;

use std::{io, num::ParseIntError, process, thread, time};

use sdl2::{
    audio::{AudioCallback, AudioSpecDesired},
    event::Event,
    keyboard::Keycode,
};

const AUDIO_BUFFER_FRAMES: u16 = 512;

#[derive(Debug, Error)]
enum FrontendError {
    #[error("SDL: {0}")]
    Sdl(String),
    #[error("terminal: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Parser, Debug)]
#[command(name = "synth")]
#[command(about = "Plays keyboard notes through an emulated Game Boy sound generator")]
struct Args {
    /// Address of voice 0's note slot, in hex
    #[arg(long, default_value = "B000", value_parser = parse_hex_u16)]
    note_base: u16,

    /// Timer interrupt rate in Hz
    #[arg(long, default_value_t = 16384)]
    tick_rate: u32,

    /// Output sample rate in Hz
    #[arg(long, default_value_t = 44_100)]
    sample_rate: u32,

    /// NR50 master volume, in hex
    #[arg(long, default_value = "77", value_parser = parse_hex_u8)]
    master_volume: u8,

    /// NR51 output routing, in hex
    #[arg(long, default_value = "FF", value_parser = parse_hex_u8)]
    routing: u8,

    /// Time every tick against its period (on by default in debug builds)
    #[arg(long)]
    overrun_check: Option<bool>,

    /// Don't draw the status display
    #[arg(long)]
    no_status: bool,
}

impl Args {
    fn config(&self) -> Result<SynthConfig, ConfigError> {
        let defaults = SynthConfig::default();
        let config = SynthConfig {
            note_base: self.note_base,
            tick_rate: TimerRate::from_hz(self.tick_rate)?,
            sample_rate: self.sample_rate,
            master_volume: self.master_volume,
            output_routing: self.routing,
            overrun_check: self.overrun_check.unwrap_or(defaults.overrun_check),
        };
        config.validate()?;
        Ok(config)
    }
}

fn parse_hex_u16(text: &str) -> Result<u16, ParseIntError> {
    u16::from_str_radix(text.trim_start_matches("0x"), 16)
}

fn parse_hex_u8(text: &str) -> Result<u8, ParseIntError> {
    u8::from_str_radix(text.trim_start_matches("0x"), 16)
}

/// The audio thread: owns the machine and advances it one buffer at a time
struct AudioOutput {
    machine: Machine,
}

impl AudioCallback for AudioOutput {
    type Channel = f32;

    fn callback(&mut self, out: &mut [f32]) {
        self.machine.render(out);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), FrontendError> {
    let config = args.config()?;
    let (mut machine, monitor) = synth::boot(&config)?;
    let cart_ram = machine.cartridge_ram();
    let stats = machine.stats();
    let reader = NoteReader::new(config.note_base);

    let sdl_context = sdl2::init().map_err(FrontendError::Sdl)?;
    let video_subsystem = sdl_context.video().map_err(FrontendError::Sdl)?;
    let audio_subsystem = sdl_context.audio().map_err(FrontendError::Sdl)?;

    // Only here to take keyboard focus
    let _window = video_subsystem
        .window("MIDI Sound Generator", 320, 144)
        .position_centered()
        .build()
        .map_err(|e| FrontendError::Sdl(e.to_string()))?;
    let mut event_pump = sdl_context.event_pump().map_err(FrontendError::Sdl)?;

    let desired = AudioSpecDesired {
        freq: Some(config.sample_rate as i32),
        channels: Some(2),
        samples: Some(AUDIO_BUFFER_FRAMES),
    };
    let device = audio_subsystem
        .open_playback(None, &desired, |spec| {
            if spec.freq as u32 != config.sample_rate {
                info!("audio device opened at {} Hz", spec.freq);
                machine.set_sample_rate(spec.freq as u32);
            }
            AudioOutput { machine }
        })
        .map_err(FrontendError::Sdl)?;
    device.resume();

    let mut display = if args.no_status {
        None
    } else {
        Some(TerminalDisplay::new()?)
    };
    let renderer = StatusRenderer::new();
    let mut keyboard = Keyboard::new();

    'running: loop {
        for event in event_pump.poll_iter() {
            let deposit = match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'running,
                Event::KeyDown {
                    scancode: Some(scancode),
                    repeat: false,
                    ..
                } => keyboard.key_down(scancode),
                Event::KeyUp {
                    scancode: Some(scancode),
                    ..
                } => keyboard.key_up(scancode),
                _ => None,
            };
            if let Some((voice_i, slot)) = deposit {
                reader.deposit(voice_i, slot, |addr, data| cart_ram.store(addr, data));
            }
        }

        if let Some(display) = display.as_mut() {
            renderer.render(display, &monitor, &stats);
            display.flush()?;
        }
        thread::sleep(time::Duration::from_millis(16));
    }

    drop(display);
    info!(
        "{} ticks, {} overruns, {} coalesced",
        stats.ticks(),
        stats.overruns(),
        stats.coalesced()
    );
    Ok(())
}
