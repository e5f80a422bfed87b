//! CPAL-based audio backend.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};
use log::{debug, warn};
use mx_ir::SignalBuffer;
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

use crate::traits::{AudioDriver, AudioError, AudioOutput, BlockCallback, InputStream};

/// Silence written after a buffer so the ring drains before the stream drops.
const TAIL_SECS: f64 = 0.2;

/// How long `write` waits past a full ring's duration before giving up.
const STALL_SLACK: Duration = Duration::from_millis(500);

const POLL_INTERVAL: Duration = Duration::from_millis(2);

/// CPAL-based audio output for mono sample buffers.
pub struct CpalOutput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    producer: HeapProd<f32>,
    running: Arc<AtomicBool>,
}

impl CpalOutput {
    /// Create an output on the default device at `sample_rate`.
    pub fn new(sample_rate: u32) -> Result<(Self, HeapCons<f32>), AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceInit(e.to_string()))?;

        let mut config: StreamConfig = config.into();
        config.sample_rate = SampleRate(sample_rate);

        // Ring buffer for about 100ms of mono audio
        let rb = HeapRb::<f32>::new(sample_rate as usize / 10);
        let (producer, consumer) = rb.split();

        let output = Self {
            device,
            config,
            stream: None,
            producer,
            running: Arc::new(AtomicBool::new(false)),
        };

        Ok((output, consumer))
    }

    /// Build and start the audio stream.
    pub fn build_stream(&mut self, mut consumer: HeapCons<f32>) -> Result<(), AudioError> {
        let running = self.running.clone();
        let channels = self.config.channels as usize;

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if !running.load(Ordering::Relaxed) {
                        data.fill(0.0);
                        return;
                    }

                    // One mono sample per device frame, copied to every channel
                    for frame in data.chunks_mut(channels) {
                        let sample = consumer.try_pop().unwrap_or(0.0);
                        frame.fill(sample);
                    }
                },
                |err| warn!("audio output stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::StreamCreate(e.to_string()))?;

        stream.play().map_err(|e| AudioError::Playback(e.to_string()))?;
        self.stream = Some(stream);

        Ok(())
    }
}

impl AudioOutput for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn write(&mut self, samples: &[f32]) -> Result<(), AudioError> {
        let rate = self.sample_rate().max(1) as f64;
        let ring_secs = self.producer.capacity().get() as f64 / rate;
        let stall = Duration::from_secs_f64(ring_secs) + STALL_SLACK;
        push_until_stalled(&mut self.producer, samples, stall)
    }

    fn start(&mut self) -> Result<(), AudioError> {
        self.running.store(true, Ordering::Relaxed);
        if let Some(ref stream) = self.stream {
            stream.play().map_err(|e| AudioError::Playback(e.to_string()))?;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.running.store(false, Ordering::Relaxed);
        if let Some(ref stream) = self.stream {
            stream.pause().map_err(|e| AudioError::Playback(e.to_string()))?;
        }
        Ok(())
    }
}

/// Push `samples` into the ring, parking while it is full.
///
/// Fails if the consumer takes nothing for `stall`, which happens when the
/// device callback has stopped running.
fn push_until_stalled<P>(
    producer: &mut P,
    samples: &[f32],
    stall: Duration,
) -> Result<(), AudioError>
where
    P: Producer<Item = f32>,
{
    let mut rest = samples;
    let mut last_progress = Instant::now();
    while !rest.is_empty() {
        let pushed = producer.push_slice(rest);
        rest = &rest[pushed..];
        if rest.is_empty() {
            break;
        }
        if pushed > 0 {
            last_progress = Instant::now();
        } else if last_progress.elapsed() >= stall {
            return Err(AudioError::Playback(format!(
                "output stalled with {} samples unwritten",
                rest.len()
            )));
        }
        thread::sleep(POLL_INTERVAL);
    }
    Ok(())
}

/// Average interleaved frames down to one sample per frame.
fn downmix_interleaved(data: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return data.to_vec();
    }
    data.chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// CPAL capture stream that forwards mono blocks to a callback.
pub struct CpalInputStream {
    stream: Stream,
}

impl CpalInputStream {
    /// Open a capture stream on the default input device.
    pub fn open(
        sample_rate: u32,
        channels: u16,
        mut on_block: BlockCallback,
    ) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(AudioError::NoDevice)?;

        let config = StreamConfig {
            channels,
            sample_rate: SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };
        let width = channels as usize;

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if width <= 1 {
                        on_block(data);
                    } else {
                        on_block(&downmix_interleaved(data, width));
                    }
                },
                |err| warn!("audio input stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::StreamCreate(e.to_string()))?;

        // Streams may auto-start on some hosts; hold delivery until start().
        if let Err(e) = stream.pause() {
            warn!("failed to pause new input stream: {}", e);
        }
        Ok(Self { stream })
    }
}

impl InputStream for CpalInputStream {
    fn start(&mut self) -> Result<(), AudioError> {
        self.stream
            .play()
            .map_err(|e| AudioError::Playback(e.to_string()))
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.stream
            .pause()
            .map_err(|e| AudioError::Playback(e.to_string()))
    }

    fn close(self: Box<Self>) {
        drop(self.stream);
    }
}

/// Play a buffer to completion on the calling thread.
pub fn play_blocking(buffer: &SignalBuffer, sample_rate: u32) -> Result<(), AudioError> {
    let (mut output, consumer) = CpalOutput::new(sample_rate)?;
    output.build_stream(consumer)?;
    output.start()?;
    output.write(buffer.as_slice())?;

    let tail = (sample_rate as f64 * TAIL_SECS) as usize;
    output.write(&vec![0.0; tail])?;
    output.stop()
}

/// Default-device driver. Every playback request gets its own thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpalDriver;

impl AudioDriver for CpalDriver {
    fn play(&self, buffer: SignalBuffer, sample_rate: u32) -> Result<(), AudioError> {
        debug!(
            "dispatching playback of {} samples at {} Hz",
            buffer.len(),
            sample_rate
        );
        thread::Builder::new()
            .name("mx-playback".into())
            .spawn(move || {
                if let Err(e) = play_blocking(&buffer, sample_rate) {
                    warn!("playback failed: {}", e);
                }
            })
            .map_err(|e| AudioError::Spawn(e.to_string()))?;
        Ok(())
    }

    fn open_input_stream(
        &self,
        sample_rate: u32,
        channels: u16,
        on_block: BlockCallback,
    ) -> Result<Box<dyn InputStream>, AudioError> {
        let stream = CpalInputStream::open(sample_rate, channels, on_block)?;
        Ok(Box::new(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_averages_frames() {
        let data = [1.0, 0.0, 0.5, -0.5, 0.2, 0.4];
        let mono = downmix_interleaved(&data, 2);
        assert_eq!(mono.len(), 3);
        assert!((mono[0] - 0.5).abs() < 1e-6);
        assert!(mono[1].abs() < 1e-6);
        assert!((mono[2] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn push_fails_when_nothing_drains() {
        let (mut prod, cons) = HeapRb::<f32>::new(4).split();
        let err =
            push_until_stalled(&mut prod, &[0.5; 10], Duration::from_millis(20)).unwrap_err();
        assert!(matches!(err, AudioError::Playback(_)));
        assert_eq!(cons.occupied_len(), 4);
    }

    #[test]
    fn push_completes_while_draining() {
        let (mut prod, mut cons) = HeapRb::<f32>::new(4).split();
        let reader = thread::spawn(move || {
            let mut got = Vec::new();
            while got.len() < 10 {
                match cons.try_pop() {
                    Some(s) => got.push(s),
                    None => thread::sleep(Duration::from_millis(1)),
                }
            }
            got
        });
        let samples: Vec<f32> = (0..10).map(|i| i as f32).collect();
        push_until_stalled(&mut prod, &samples, Duration::from_secs(5)).unwrap();
        assert_eq!(reader.join().unwrap(), samples);
    }

    #[test]
    fn downmix_mono_is_copy() {
        let data = [0.1, 0.2];
        assert_eq!(downmix_interleaved(&data, 1), vec![0.1, 0.2]);
    }
}
