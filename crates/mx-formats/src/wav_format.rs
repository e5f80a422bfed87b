//! WAV encoding and decoding for mono sample buffers.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;
use mx_ir::{SignalBuffer, SAMPLE_RATE};

use crate::FormatError;

// --- Writing ---

/// Encode `buffer` as 16-bit mono PCM. Samples are clamped to `[-1, 1]`.
pub fn write_wav<W: Write + Seek>(
    w: W,
    buffer: &SignalBuffer,
    sample_rate: u32,
) -> Result<(), FormatError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::new(w, spec)?;
    for &s in buffer {
        let value = (s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
        writer.write_sample(value)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Encode `buffer` into an in-memory WAV file.
pub fn buffer_to_wav(buffer: &SignalBuffer, sample_rate: u32) -> Result<Vec<u8>, FormatError> {
    let mut cursor = Cursor::new(Vec::new());
    write_wav(&mut cursor, buffer, sample_rate)?;
    Ok(cursor.into_inner())
}

/// Encode `buffer` to a WAV file at `path`.
pub fn save_wav(path: impl AsRef<Path>, buffer: &SignalBuffer, sample_rate: u32) -> Result<(), FormatError> {
    let file = File::create(path.as_ref())?;
    write_wav(std::io::BufWriter::new(file), buffer, sample_rate)?;
    debug!("wrote {} samples to {}", buffer.len(), path.as_ref().display());
    Ok(())
}

// --- Reading ---

/// Decode a WAV stream into a mono buffer and its sample rate.
///
/// Integer PCM of 8 to 32 bits and 32-bit float are accepted. Multi-channel
/// files are downmixed by averaging the channels of each frame.
pub fn decode_wav<R: Read>(reader: R) -> Result<(SignalBuffer, u32), FormatError> {
    let mut reader = WavReader::new(reader)?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(FormatError::Decode("zero channels".into()));
    }

    let interleaved = read_normalized(&mut reader, &spec)?;
    if interleaved.is_empty() {
        return Err(FormatError::Empty);
    }

    let mono = downmix(&interleaved, spec.channels as usize);
    Ok((SignalBuffer::from_vec(mono), spec.sample_rate))
}

/// Decode a WAV stream, rejecting any rate other than the engine rate.
pub fn decode_mono<R: Read>(reader: R) -> Result<SignalBuffer, FormatError> {
    let (buffer, rate) = decode_wav(reader)?;
    if rate != SAMPLE_RATE {
        return Err(FormatError::UnsupportedSampleRate {
            found: rate,
            expected: SAMPLE_RATE,
        });
    }
    Ok(buffer)
}

/// Load a WAV file into a mono buffer and its sample rate.
pub fn load_wav(path: impl AsRef<Path>) -> Result<(SignalBuffer, u32), FormatError> {
    let file = File::open(path.as_ref())?;
    let decoded = decode_wav(BufReader::new(file))?;
    debug!(
        "loaded {} samples at {} Hz from {}",
        decoded.0.len(),
        decoded.1,
        path.as_ref().display()
    );
    Ok(decoded)
}

/// Load a WAV file at the engine rate. Files at other rates are rejected,
/// not resampled.
pub fn load_mono(path: impl AsRef<Path>) -> Result<SignalBuffer, FormatError> {
    let file = File::open(path.as_ref())?;
    decode_mono(BufReader::new(file))
}

fn read_normalized<R: Read>(reader: &mut WavReader<R>, spec: &WavSpec) -> Result<Vec<f32>, FormatError> {
    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .map(|s| s.map_err(FormatError::from))
            .collect(),
        (SampleFormat::Int, bits @ 8..=32) => {
            let scale = 1.0 / (1u64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale).map_err(FormatError::from))
                .collect()
        }
        (format, bits) => Err(FormatError::UnsupportedFormat(format!(
            "{:?} at {} bits",
            format, bits
        ))),
    }
}

fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build an in-memory WAV file from i16 samples.
    fn make_wav(channels: u16, sample_rate: u32, samples: &[i16]) -> Vec<u8> {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn decode_16bit_mono() {
        let wav = make_wav(1, 44100, &[0, 16384, -16384, -32768]);
        let (buf, rate) = decode_wav(Cursor::new(wav)).unwrap();
        assert_eq!(rate, 44100);
        assert_eq!(buf.as_slice(), &[0.0, 0.5, -0.5, -1.0]);
    }

    #[test]
    fn stereo_is_averaged_to_mono() {
        let wav = make_wav(2, 44100, &[16384, 0, -16384, -16384]);
        let (buf, _) = decode_wav(Cursor::new(wav)).unwrap();
        assert_eq!(buf.as_slice(), &[0.25, -0.5]);
    }

    #[test]
    fn float_samples_pass_through() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for s in [0.25f32, -0.75] {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        let (buf, _) = decode_wav(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(buf.as_slice(), &[0.25, -0.75]);
    }

    #[test]
    fn mismatched_rate_is_rejected() {
        let wav = make_wav(1, 48000, &[0, 1, 2]);
        match decode_mono(Cursor::new(wav)) {
            Err(FormatError::UnsupportedSampleRate { found, expected }) => {
                assert_eq!(found, 48000);
                assert_eq!(expected, 44100);
            }
            other => panic!("expected UnsupportedSampleRate, got {:?}", other),
        }
    }

    #[test]
    fn empty_file_is_rejected() {
        let wav = make_wav(1, 44100, &[]);
        assert!(matches!(decode_wav(Cursor::new(wav)), Err(FormatError::Empty)));
    }

    #[test]
    fn invalid_header_rejected() {
        assert!(decode_wav(Cursor::new(b"not a wav".to_vec())).is_err());
    }

    #[test]
    fn encode_then_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mix.wav");
        let buffer = SignalBuffer::from_vec(vec![0.0, 0.5, -0.5, 2.0]);
        save_wav(&path, &buffer, 44100).unwrap();

        let loaded = load_mono(&path).unwrap();
        assert_eq!(loaded.len(), 4);
        assert!((loaded.as_slice()[1] - 0.5).abs() < 1e-4);
        assert!((loaded.as_slice()[2] + 0.5).abs() < 1e-4);
        // out-of-range input is clamped on the way out
        assert!((loaded.as_slice()[3] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_wav(dir.path().join("nope.wav"));
        assert!(matches!(result, Err(FormatError::Io(_))));
    }

    #[test]
    fn buffer_to_wav_has_riff_header() {
        let bytes = buffer_to_wav(&SignalBuffer::silent(8), 44100).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(bytes.len(), 44 + 16);
    }
}
