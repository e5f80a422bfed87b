//! Engine error types.

use thiserror::Error;

/// Error returned by the compositor.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixError {
    /// The placement set was empty
    #[error("nothing to mix")]
    NothingToMix,
}
