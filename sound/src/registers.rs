// Register addresses on the 16-bit bus
pub const NR10: u16 = 0xFF10;
pub const NR11: u16 = 0xFF11;
pub const NR12: u16 = 0xFF12;
pub const NR13: u16 = 0xFF13;
pub const NR14: u16 = 0xFF14;
pub const NR21: u16 = 0xFF16;
pub const NR22: u16 = 0xFF17;
pub const NR23: u16 = 0xFF18;
pub const NR24: u16 = 0xFF19;
pub const NR30: u16 = 0xFF1A;
pub const NR31: u16 = 0xFF1B;
pub const NR32: u16 = 0xFF1C;
pub const NR33: u16 = 0xFF1D;
pub const NR34: u16 = 0xFF1E;
pub const NR41: u16 = 0xFF20;
pub const NR42: u16 = 0xFF21;
pub const NR43: u16 = 0xFF22;
pub const NR44: u16 = 0xFF23;
pub const NR50: u16 = 0xFF24;
pub const NR51: u16 = 0xFF25;
pub const NR52: u16 = 0xFF26;
pub const WAVE_RAM_START: u16 = 0xFF30;
pub const WAVE_RAM_END: u16 = 0xFF3F;

bitfield! {
  /// FF10h - NR10
  /// Configures frequency sweep for channel 1
  #[derive(Clone, Copy, Default, PartialEq, Eq)]
  pub struct SweepReg(u8);
  impl Debug;
  pub shift, set_shift: 2, 0;
  pub negate, set_negate: 3;
  pub period, set_period: 6, 4;
}

bitfield! {
  /// FF11h, FF16h - NR11, NR21
  /// Configures duty and length for channels 1 and 2
  #[derive(Clone, Copy, Default, PartialEq, Eq)]
  pub struct DutyLengthReg(u8);
  impl Debug;
  pub length_load, set_length_load: 5, 0;
  pub duty, set_duty: 7, 6;
}

bitfield! {
  /// FF12h, FF17h, FF21h - NR12, NR22, NR42
  /// Configures the volume envelope for channels 1, 2 and 4
  #[derive(Clone, Copy, Default, PartialEq, Eq)]
  pub struct EnvelopeReg(u8);
  impl Debug;
  pub period, set_period: 2, 0;
  pub add_mode, set_add_mode: 3;
  pub initial_volume, set_initial_volume: 7, 4;
}

impl EnvelopeReg {
    /// The channel DAC is powered whenever the upper five bits are not all zero
    pub fn dac_enabled(&self) -> bool {
        self.0 & 0xF8 != 0
    }
}

bitfield! {
  /// FF14h, FF19h, FF1Eh - NR14, NR24, NR34
  /// Controls the frequency high bits, length-limiting and restarting for channels 1, 2 and 3
  #[derive(Clone, Copy, Default, PartialEq, Eq)]
  pub struct FrequencyHiReg(u8);
  impl Debug;
  pub frequency_hi, set_frequency_hi: 2, 0;
  pub length_enable, set_length_enable: 6;
  pub restart, set_restart: 7;
}

bitfield! {
  /// FF1Ah - NR30
  /// Powers the channel 3 DAC
  #[derive(Clone, Copy, Default, PartialEq, Eq)]
  pub struct WaveEnableReg(u8);
  impl Debug;
  pub dac_enable, set_dac_enable: 7;
}

bitfield! {
  /// FF1Ch - NR32
  /// Selects the output level of channel 3
  /// 0 = mute, 1 = 100%, 2 = 50%, 3 = 25%
  #[derive(Clone, Copy, Default, PartialEq, Eq)]
  pub struct WaveVolumeReg(u8);
  impl Debug;
  pub volume, set_volume: 6, 5;
}

bitfield! {
  /// FF24h - NR50
  /// Controls the master volume of the left and right outputs
  #[derive(Clone, Copy, Default, PartialEq, Eq)]
  pub struct MasterVolumeReg(u8);
  impl Debug;
  pub right_volume, set_right_volume: 2, 0;
  pub vin_right, set_vin_right: 3;
  pub left_volume, set_left_volume: 6, 4;
  pub vin_left, set_vin_left: 7;
}

bitfield! {
  /// FF25h - NR51
  /// Routes each channel to the left and/or right output
  #[derive(Clone, Copy, Default, PartialEq, Eq)]
  pub struct OutputRoutingReg(u8);
  impl Debug;
  pub right_mask, set_right_mask: 3, 0;
  pub left_mask, set_left_mask: 7, 4;
}

impl OutputRoutingReg {
    pub fn right(&self, channel_i: usize) -> bool {
        self.right_mask() & (1 << channel_i) != 0
    }

    pub fn left(&self, channel_i: usize) -> bool {
        self.left_mask() & (1 << channel_i) != 0
    }
}

bitfield! {
  /// FF26h - NR52
  /// Controls and exposes whether channels are enabled/on
  #[derive(Clone, Copy, Default, PartialEq, Eq)]
  pub struct SoundOnReg(u8);
  impl Debug;
  pub channel_mask, _: 3, 0;
  pub master_enable, set_master_enable: 7;
}
