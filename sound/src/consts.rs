pub const MASTER_CLOCK_HZ: u32 = 4_194_304;

// The frame sequencer steps at 512 Hz, clocking length counters at 256 Hz, the sweep unit at
// 128 Hz and envelopes at 64 Hz.
pub const FRAME_SEQUENCER_PERIOD: u32 = MASTER_CLOCK_HZ / 512;

pub const SQUARE_LENGTH_MAX: u16 = 64;
pub const WAVE_LENGTH_MAX: u16 = 256;

pub const DUTY_PATTERNS: [[bool; 8]; 4] = [
    [false, false, false, false, false, false, false, true], // 12.5%
    [true, false, false, false, false, false, false, true],  // 25%
    [true, false, false, false, false, true, true, true],    // 50%
    [false, true, true, true, true, true, true, false],      // 75%
];
