//! Signal-processing engine for the mixbench workstation.
//!
//! Time-domain effects, the per-channel effect chain, procedural drum
//! voices and the compositor that sums placed buffers into one
//! normalized master buffer. Everything here is synchronous and pure.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod chain;
mod compositor;
pub mod effects;
mod error;
mod percussion;

pub use chain::EffectChain;
pub use compositor::{mix, mix_raw, resolve_channel};
pub use effects::{compress, delay, eq, reverb, Effect, EffectInfo, ParamInfo};
pub use error::MixError;
pub use percussion::{hihat, kick, snare, Drum, NoiseSource};

#[cfg(feature = "std")]
pub use percussion::ThreadNoise;
