//! Audio file codecs for the mixbench workstation.
//!
//! Decodes WAV files into mono [`mx_ir::SignalBuffer`]s and encodes
//! mixes back to 16-bit PCM.

mod wav_format;

pub use wav_format::{
    buffer_to_wav, decode_mono, decode_wav, load_mono, load_wav, save_wav, write_wav,
};

use thiserror::Error;

/// Error type for decoding and encoding audio files.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed file contents
    #[error("decode error: {0}")]
    Decode(String),
    /// Valid file in an encoding we don't handle
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    /// File rate differs from the engine rate
    #[error("unsupported sample rate {found} Hz (expected {expected} Hz)")]
    UnsupportedSampleRate { found: u32, expected: u32 },
    /// File holds no samples
    #[error("file contains no audio")]
    Empty,
}

impl From<hound::Error> for FormatError {
    fn from(e: hound::Error) -> Self {
        match e {
            hound::Error::IoError(io) => FormatError::Io(io),
            err @ (hound::Error::Unsupported | hound::Error::TooWide) => {
                FormatError::UnsupportedFormat(err.to_string())
            }
            other => FormatError::Decode(other.to_string()),
        }
    }
}
