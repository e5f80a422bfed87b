//! Core data model for the mixbench workstation.
//!
//! This crate defines the types shared by every other layer: sample
//! buffers, mixing channels with their effect settings, and the timeline
//! and multitrack entries that the compositor places into a mix.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod channel;
mod clip;
mod name;
mod signal;

pub use channel::{
    Channel, CompressionParams, DelayParams, EffectConfig, EqParams, ReverbParams,
};
pub use clip::{Placement, TimelineSample, Track};
pub use name::{bounded_name, Name, NAME_CAPACITY};
pub use signal::{seconds_to_samples, SignalBuffer};

/// Engine sample rate in Hz. Every buffer in the system runs at this rate.
pub const SAMPLE_RATE: u32 = 44100;

/// Peak level the final mix is normalized to.
pub const NORMALIZE_HEADROOM: f32 = 0.8;

/// Fixed delay time of the channel delay effect, in seconds.
pub const DELAY_TIME_SECS: f64 = 0.3;

/// Length of the synthesized reverb impulse response, in seconds.
pub const REVERB_IR_SECS: f64 = 0.1;

/// Window size of the moving-average EQ kernel.
pub const EQ_WINDOW: usize = 10;

/// Name of the reserved channel every session starts with.
pub const MASTER_CHANNEL: &str = "Master";
