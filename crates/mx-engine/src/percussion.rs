//! Procedural drum voices.
//!
//! Each voice is a fixed-length buffer computed from a closed-form
//! formula over `t = i / SAMPLE_RATE`. Noise-based voices pull their
//! randomness from a [`NoiseSource`] so callers can swap in a
//! deterministic source.

use alloc::vec::Vec;
use core::f64::consts::TAU;
use mx_ir::{seconds_to_samples, SignalBuffer, SAMPLE_RATE};

/// Output scale applied to every voice.
const VOICE_GAIN: f64 = 0.5;

const KICK_SECS: f64 = 0.15;
const KICK_START_HZ: f64 = 150.0;
const KICK_END_HZ: f64 = 40.0;
const KICK_DECAY: f64 = 7.0;

const SNARE_SECS: f64 = 0.15;
const SNARE_TONE_HZ: f64 = 200.0;
const SNARE_DECAY: f64 = 4.0;

const HIHAT_SECS: f64 = 0.075;
const HIHAT_DECAY: f64 = 15.0;

/// Source of uniform noise in `[-1, 1]`.
pub trait NoiseSource {
    fn next_sample(&mut self) -> f32;
}

impl<F: FnMut() -> f32> NoiseSource for F {
    fn next_sample(&mut self) -> f32 {
        self()
    }
}

/// Uniform noise from the thread-local RNG.
#[cfg(feature = "std")]
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadNoise;

#[cfg(feature = "std")]
impl NoiseSource for ThreadNoise {
    fn next_sample(&mut self) -> f32 {
        use rand::Rng;
        rand::thread_rng().gen_range(-1.0..=1.0)
    }
}

fn render(secs: f64, mut sample_at: impl FnMut(f64) -> f64) -> SignalBuffer {
    let len = seconds_to_samples(secs);
    let samples: Vec<f32> = (0..len)
        .map(|i| {
            let t = i as f64 / SAMPLE_RATE as f64;
            (sample_at(t) * VOICE_GAIN) as f32
        })
        .collect();
    SignalBuffer::from_vec(samples)
}

/// Kick: sine swept linearly from 150 Hz to 40 Hz, `exp(-7t)` envelope.
///
/// The phase is the integral of the swept frequency, so the pitch glides
/// without folding back.
pub fn kick() -> SignalBuffer {
    let sweep = (KICK_END_HZ - KICK_START_HZ) / KICK_SECS;
    render(KICK_SECS, |t| {
        let phase = TAU * (KICK_START_HZ * t + 0.5 * sweep * t * t);
        libm::sin(phase) * libm::exp(-KICK_DECAY * t)
    })
}

/// Snare: equal parts noise and a 200 Hz tone, `exp(-4t)` envelope.
pub fn snare(noise: &mut impl NoiseSource) -> SignalBuffer {
    render(SNARE_SECS, |t| {
        let n = noise.next_sample() as f64;
        let tone = libm::sin(TAU * SNARE_TONE_HZ * t);
        (0.5 * n + 0.5 * tone) * libm::exp(-SNARE_DECAY * t)
    })
}

/// Hihat: pure noise, `exp(-15t)` envelope, half the length of the others.
pub fn hihat(noise: &mut impl NoiseSource) -> SignalBuffer {
    render(HIHAT_SECS, |t| {
        noise.next_sample() as f64 * libm::exp(-HIHAT_DECAY * t)
    })
}

/// The built-in drum voices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Drum {
    Kick,
    Snare,
    Hihat,
}

impl Drum {
    pub const ALL: [Drum; 3] = [Drum::Kick, Drum::Snare, Drum::Hihat];

    /// Look a voice up by its lowercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(name))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Drum::Kick => "kick",
            Drum::Snare => "snare",
            Drum::Hihat => "hihat",
        }
    }

    pub fn duration_secs(&self) -> f64 {
        match self {
            Drum::Kick => KICK_SECS,
            Drum::Snare => SNARE_SECS,
            Drum::Hihat => HIHAT_SECS,
        }
    }

    pub fn synthesize(&self, noise: &mut impl NoiseSource) -> SignalBuffer {
        match self {
            Drum::Kick => kick(),
            Drum::Snare => snare(noise),
            Drum::Hihat => hihat(noise),
        }
    }
}
