//! Session error types.

use std::path::PathBuf;

use mx_audio::AudioError;
use mx_engine::MixError;
use mx_formats::FormatError;
use thiserror::Error;

/// Error type for session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// A file could not be decoded; nothing was added
    #[error("failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    /// A rendered mix could not be encoded
    #[error("failed to encode mix: {0}")]
    Encode(#[source] FormatError),

    /// Mixing failed (nothing to mix)
    #[error(transparent)]
    Mix(#[from] MixError),

    /// The audio device refused the request
    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error("channel '{0}' already exists")]
    DuplicateChannel(String),

    #[error("invalid channel name '{0}'")]
    InvalidChannelName(String),

    #[error("no channel named '{0}'")]
    UnknownChannel(String),

    /// The Master channel cannot be renamed
    #[error("channel '{0}' is reserved")]
    ReservedChannel(String),

    #[error("index {index} out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
