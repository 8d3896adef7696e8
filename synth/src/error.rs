use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no timer clock divides evenly into a {0} Hz tick")]
    UnsupportedTickRate(u32),
    #[error("note slots at {base:#06X} do not fit in cartridge RAM")]
    NoteBaseOutOfRange { base: u16 },
    #[error("sample rate must be nonzero")]
    ZeroSampleRate,
}
