//! Recording state machine: `Idle -> Recording -> Idle`.
//!
//! While recording, the driver's input callback is the only writer of the
//! accumulation buffer and it only ever appends. Stopping detaches the
//! stream and hands back everything captured as one buffer.

use std::mem;
use std::sync::Arc;

use log::warn;
use mx_audio::{AudioDriver, InputStream};
use mx_ir::{SignalBuffer, SAMPLE_RATE};
use parking_lot::Mutex;

/// Channel count requested from the input device.
const RECORD_CHANNELS: u16 = 1;

struct ActiveRecording {
    stream: Box<dyn InputStream>,
    captured: Arc<Mutex<Vec<f32>>>,
}

#[derive(Default)]
enum RecorderState {
    #[default]
    Idle,
    Recording(ActiveRecording),
}

/// Owns at most one active recording.
#[derive(Default)]
pub struct Recorder {
    state: RecorderState,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, RecorderState::Recording(_))
    }

    /// Open and start an input stream on `driver`.
    ///
    /// Returns `Ok(false)` without touching the device if a recording is
    /// already running.
    pub fn start<D: AudioDriver>(&mut self, driver: &D) -> Result<bool, mx_audio::AudioError> {
        if self.is_recording() {
            return Ok(false);
        }

        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);
        let mut stream = driver.open_input_stream(
            SAMPLE_RATE,
            RECORD_CHANNELS,
            Box::new(move |block: &[f32]| sink.lock().extend_from_slice(block)),
        )?;

        if let Err(e) = stream.start() {
            stream.close();
            return Err(e);
        }

        self.state = RecorderState::Recording(ActiveRecording { stream, captured });
        Ok(true)
    }

    /// Stop the active recording and return the captured audio.
    ///
    /// Returns `None` when idle. A failure to stop the stream is logged;
    /// the stream is closed and the captured audio kept regardless.
    pub fn stop(&mut self) -> Option<SignalBuffer> {
        let RecorderState::Recording(mut active) = mem::take(&mut self.state) else {
            return None;
        };

        if let Err(e) = active.stream.stop() {
            warn!("failed to stop input stream: {}", e);
        }
        active.stream.close();

        let samples = mem::take(&mut *active.captured.lock());
        Some(SignalBuffer::from_vec(samples))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mx_audio::{AudioError, BlockCallback};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Feeds scripted blocks into the callback when started.
    struct ScriptedStream {
        on_block: BlockCallback,
        blocks: Vec<Vec<f32>>,
        closed: Rc<RefCell<bool>>,
    }

    impl InputStream for ScriptedStream {
        fn start(&mut self) -> Result<(), AudioError> {
            for block in &self.blocks {
                (self.on_block)(block.as_slice());
            }
            Ok(())
        }

        fn stop(&mut self) -> Result<(), AudioError> {
            Ok(())
        }

        fn close(self: Box<Self>) {
            *self.closed.borrow_mut() = true;
        }
    }

    struct ScriptedDriver {
        blocks: Vec<Vec<f32>>,
        opened: RefCell<usize>,
        closed: Rc<RefCell<bool>>,
    }

    impl ScriptedDriver {
        fn new(blocks: Vec<Vec<f32>>) -> Self {
            Self {
                blocks,
                opened: RefCell::new(0),
                closed: Rc::new(RefCell::new(false)),
            }
        }
    }

    impl AudioDriver for ScriptedDriver {
        fn play(&self, _buffer: SignalBuffer, _sample_rate: u32) -> Result<(), AudioError> {
            Ok(())
        }

        fn open_input_stream(
            &self,
            sample_rate: u32,
            channels: u16,
            on_block: BlockCallback,
        ) -> Result<Box<dyn InputStream>, AudioError> {
            assert_eq!(sample_rate, 44100);
            assert_eq!(channels, 1);
            *self.opened.borrow_mut() += 1;
            Ok(Box::new(ScriptedStream {
                on_block,
                blocks: self.blocks.clone(),
                closed: Rc::clone(&self.closed),
            }))
        }
    }

    #[test]
    fn stop_concatenates_blocks() {
        let driver = ScriptedDriver::new(vec![vec![0.1, 0.2], vec![0.3]]);
        let mut rec = Recorder::new();
        assert!(rec.start(&driver).unwrap());
        assert!(rec.is_recording());

        let buf = rec.stop().unwrap();
        assert_eq!(buf.as_slice(), &[0.1, 0.2, 0.3]);
        assert!(!rec.is_recording());
        assert!(*driver.closed.borrow());
    }

    #[test]
    fn second_start_is_rejected() {
        let driver = ScriptedDriver::new(vec![vec![0.5]]);
        let mut rec = Recorder::new();
        assert!(rec.start(&driver).unwrap());
        assert!(!rec.start(&driver).unwrap());
        assert_eq!(*driver.opened.borrow(), 1);
        assert_eq!(rec.stop().unwrap().len(), 1);
    }

    #[test]
    fn stop_while_idle_is_none() {
        let mut rec = Recorder::new();
        assert!(rec.stop().is_none());
    }

    #[test]
    fn open_failure_leaves_recorder_idle() {
        let mut rec = Recorder::new();
        let err = rec.start(&mx_audio::NullDriver).unwrap_err();
        assert_eq!(err, AudioError::NoDevice);
        assert!(!rec.is_recording());
    }
}
