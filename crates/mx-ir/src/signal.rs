//! Mono f32 sample buffer at the engine sample rate.

use alloc::vec;
use alloc::vec::Vec;

use crate::SAMPLE_RATE;

/// Convert a duration in seconds to a sample count at [`SAMPLE_RATE`].
///
/// Rounds to the nearest sample. Negative and non-finite inputs map to 0.
pub fn seconds_to_samples(secs: f64) -> usize {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    libm::round(secs * SAMPLE_RATE as f64) as usize
}

/// An ordered sequence of mono samples at [`SAMPLE_RATE`].
///
/// Effects and generators hand out fresh buffers; nothing in the engine
/// mutates a buffer it did not create.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SignalBuffer {
    samples: Vec<f32>,
}

impl SignalBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer of `len` zero samples.
    pub fn silent(len: usize) -> Self {
        Self {
            samples: vec![0.0; len],
        }
    }

    /// Create a buffer from raw samples.
    pub fn from_vec(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    /// Concatenate blocks into one buffer.
    pub fn concat<B: AsRef<[f32]>>(blocks: &[B]) -> Self {
        let total = blocks.iter().map(|b| b.as_ref().len()).sum();
        let mut samples = Vec::with_capacity(total);
        for block in blocks {
            samples.extend_from_slice(block.as_ref());
        }
        Self { samples }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds at [`SAMPLE_RATE`].
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / SAMPLE_RATE as f64
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.samples
    }

    pub fn iter(&self) -> core::slice::Iter<'_, f32> {
        self.samples.iter()
    }

    /// Largest absolute sample value, 0 for an empty buffer.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()))
    }

    /// Zero-pad the tail up to `len` samples. Never shrinks.
    pub fn grow_to(&mut self, len: usize) {
        if len > self.samples.len() {
            self.samples.resize(len, 0.0);
        }
    }

    /// Add `source` into this buffer starting at sample `start`.
    ///
    /// Grows the buffer first when the source runs past the current end.
    pub fn mix_in(&mut self, start: usize, source: &[f32]) {
        let end = start + source.len();
        self.grow_to(end);
        for (dst, &src) in self.samples[start..end].iter_mut().zip(source) {
            *dst += src;
        }
    }

    /// Scale all samples by `gain`.
    pub fn apply_gain(&mut self, gain: f32) {
        for s in &mut self.samples {
            *s *= gain;
        }
    }

    /// Return a copy scaled by `gain`.
    pub fn scaled(&self, gain: f32) -> Self {
        let mut out = self.clone();
        out.apply_gain(gain);
        out
    }

    /// Scale so the peak equals `headroom`. Silence is left untouched.
    pub fn normalize_peak(&mut self, headroom: f32) {
        let peak = self.peak();
        if peak > 0.0 {
            self.apply_gain(headroom / peak);
        }
    }

    /// Peak-per-column overview for waveform display.
    ///
    /// Returns `width` values. Buffers shorter than `width` yield zeros.
    pub fn overview(&self, width: usize) -> Vec<f32> {
        let len = self.samples.len();
        if len == 0 || width == 0 {
            return vec![0.0; width];
        }
        let per_column = len / width;
        if per_column == 0 {
            return vec![0.0; width];
        }
        (0..width)
            .map(|i| {
                let start = i * per_column;
                let end = (start + per_column).min(len);
                self.samples[start..end]
                    .iter()
                    .fold(0.0f32, |acc, &s| acc.max(s.abs()))
            })
            .collect()
    }
}

impl From<Vec<f32>> for SignalBuffer {
    fn from(samples: Vec<f32>) -> Self {
        Self::from_vec(samples)
    }
}

impl AsRef<[f32]> for SignalBuffer {
    fn as_ref(&self) -> &[f32] {
        &self.samples
    }
}

impl<'a> IntoIterator for &'a SignalBuffer {
    type Item = &'a f32;
    type IntoIter = core::slice::Iter<'a, f32>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
