//! Audio device backends for the mixbench workstation.

mod cpal_backend;
mod traits;

pub use cpal_backend::{play_blocking, CpalDriver, CpalInputStream, CpalOutput};
pub use traits::{AudioDriver, AudioError, AudioOutput, BlockCallback, InputStream, NullDriver};
