//! Time-domain effect primitives.
//!
//! Each effect is a pure function from a buffer to a new buffer of the
//! same length. [`Effect`] bundles an effect with its parameters so a
//! chain can hold them in order.

mod compressor;
mod delay;
mod eq;
mod reverb;

use mx_ir::{SignalBuffer, DELAY_TIME_SECS};

pub use compressor::compress;
pub use delay::delay;
pub use eq::eq;
pub use reverb::reverb;

/// Metadata describing one effect parameter.
pub struct ParamInfo {
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

/// Static metadata about an effect, for display and parameter editing.
pub struct EffectInfo {
    pub name: &'static str,
    pub short_name: &'static str,
    pub params: &'static [ParamInfo],
}

/// An effect stage with its parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    Delay { level: f32, time_secs: f64 },
    Reverb { level: f32 },
    Eq { gain: f32 },
    Compression { threshold: f32, ratio: f32 },
}

impl Effect {
    /// A delay at the fixed channel delay time.
    pub fn delay(level: f32) -> Self {
        Effect::Delay {
            level,
            time_secs: DELAY_TIME_SECS,
        }
    }

    pub fn info(&self) -> &'static EffectInfo {
        match self {
            Effect::Delay { .. } => &delay::INFO,
            Effect::Reverb { .. } => &reverb::INFO,
            Effect::Eq { .. } => &eq::INFO,
            Effect::Compression { .. } => &compressor::INFO,
        }
    }

    pub fn name(&self) -> &'static str {
        self.info().name
    }

    /// Run this effect over `input`, returning a new buffer.
    pub fn apply(&self, input: &SignalBuffer) -> SignalBuffer {
        match *self {
            Effect::Delay { level, time_secs } => delay(input, level, time_secs),
            Effect::Reverb { level } => reverb(input, level),
            Effect::Eq { gain } => eq(input, gain),
            Effect::Compression { threshold, ratio } => compress(input, threshold, ratio),
        }
    }
}
