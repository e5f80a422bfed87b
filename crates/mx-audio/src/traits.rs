//! Audio device traits and error types.

use mx_ir::SignalBuffer;
use thiserror::Error;

/// Error type for audio operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// Failed to initialize audio device
    #[error("device init error: {0}")]
    DeviceInit(String),
    /// Failed to create audio stream
    #[error("stream create error: {0}")]
    StreamCreate(String),
    /// Playback error
    #[error("playback error: {0}")]
    Playback(String),
    /// Failed to launch the playback thread
    #[error("failed to spawn playback thread: {0}")]
    Spawn(String),
    /// No audio device available
    #[error("no audio device available")]
    NoDevice,
}

/// Callback invoked by the driver with each captured block of mono samples.
///
/// Runs on the driver's own thread.
pub type BlockCallback = Box<dyn FnMut(&[f32]) + Send + 'static>;

/// Blocking sink for mono samples, used by playback threads.
pub trait AudioOutput {
    /// Get the sample rate.
    fn sample_rate(&self) -> u32;

    /// Write samples to the output, parking until all of them are queued.
    fn write(&mut self, samples: &[f32]) -> Result<(), AudioError>;

    /// Start playback.
    fn start(&mut self) -> Result<(), AudioError>;

    /// Stop playback.
    fn stop(&mut self) -> Result<(), AudioError>;
}

/// A capture stream opened by [`AudioDriver::open_input_stream`].
pub trait InputStream {
    /// Begin delivering blocks to the callback.
    fn start(&mut self) -> Result<(), AudioError>;

    /// Pause delivery. The stream can be started again.
    fn stop(&mut self) -> Result<(), AudioError>;

    /// Release the device.
    fn close(self: Box<Self>);
}

/// The device-driver boundary the session talks to.
pub trait AudioDriver {
    /// Play `buffer` without waiting for it to finish.
    ///
    /// Each call sounds independently; a new request does not stop an
    /// earlier one.
    fn play(&self, buffer: SignalBuffer, sample_rate: u32) -> Result<(), AudioError>;

    /// Open a capture stream that feeds `on_block`. The stream starts
    /// stopped.
    fn open_input_stream(
        &self,
        sample_rate: u32,
        channels: u16,
        on_block: BlockCallback,
    ) -> Result<Box<dyn InputStream>, AudioError>;
}

/// A driver with no device behind it: playback is discarded and capture
/// is unavailable. Used for headless rendering.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDriver;

impl AudioDriver for NullDriver {
    fn play(&self, _buffer: SignalBuffer, _sample_rate: u32) -> Result<(), AudioError> {
        Ok(())
    }

    fn open_input_stream(
        &self,
        _sample_rate: u32,
        _channels: u16,
        _on_block: BlockCallback,
    ) -> Result<Box<dyn InputStream>, AudioError> {
        Err(AudioError::NoDevice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_driver_accepts_playback() {
        assert!(NullDriver.play(SignalBuffer::silent(4), 44100).is_ok());
    }

    #[test]
    fn null_driver_has_no_input() {
        let result = NullDriver.open_input_stream(44100, 1, Box::new(|_| {}));
        assert!(matches!(result, Err(AudioError::NoDevice)));
    }

    #[test]
    fn errors_render_their_cause() {
        let err = AudioError::StreamCreate("busy".into());
        assert_eq!(err.to_string(), "stream create error: busy");
    }
}
