//! Mixing channels and their effect settings.

use alloc::string::String;

use crate::name::{bounded_name, Name};
use crate::MASTER_CHANNEL;

/// Delay settings. The delay time itself is fixed at [`crate::DELAY_TIME_SECS`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DelayParams {
    pub enabled: bool,
    /// Wet level added on top of the dry signal
    pub level: f32,
}

impl Default for DelayParams {
    fn default() -> Self {
        Self {
            enabled: false,
            level: 0.5,
        }
    }
}

/// Reverb settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReverbParams {
    pub enabled: bool,
    /// Scale of the impulse response
    pub level: f32,
}

impl Default for ReverbParams {
    fn default() -> Self {
        Self {
            enabled: false,
            level: 0.3,
        }
    }
}

/// Moving-average EQ settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EqParams {
    pub enabled: bool,
    pub gain: f32,
}

impl Default for EqParams {
    fn default() -> Self {
        Self {
            enabled: false,
            gain: 1.0,
        }
    }
}

/// Hard-knee compressor settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompressionParams {
    pub enabled: bool,
    /// Linear amplitude above which compression applies
    pub threshold: f32,
    /// Compression ratio (4.0 = 4:1)
    pub ratio: f32,
}

impl Default for CompressionParams {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: 0.5,
            ratio: 4.0,
        }
    }
}

/// Per-channel effect configuration, one entry per effect in chain order.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EffectConfig {
    pub delay: DelayParams,
    pub reverb: ReverbParams,
    pub eq: EqParams,
    pub compression: CompressionParams,
}

impl EffectConfig {
    /// Returns true if any effect is switched on.
    pub fn any_enabled(&self) -> bool {
        self.delay.enabled || self.reverb.enabled || self.eq.enabled || self.compression.enabled
    }
}

/// A mixing bus that tracks route through.
#[derive(Clone, Debug, PartialEq)]
pub struct Channel {
    /// Unique channel name
    pub name: Name,
    /// Free-text routing label; not resolved by the engine
    pub output: String,
    /// Effect chain settings
    pub effects: EffectConfig,
}

impl Channel {
    /// Create a channel with all effects off, routed to Master.
    pub fn new(name: &str) -> Self {
        Self {
            name: bounded_name(name),
            output: String::from(MASTER_CHANNEL),
            effects: EffectConfig::default(),
        }
    }

    /// The reserved Master channel.
    pub fn master() -> Self {
        let mut channel = Self::new(MASTER_CHANNEL);
        channel.output = String::from("Output");
        channel
    }

    /// Returns true if this is the reserved Master channel.
    pub fn is_master(&self) -> bool {
        self.name.as_str() == MASTER_CHANNEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_channel_has_effects_off() {
        let ch = Channel::new("Drums");
        assert_eq!(ch.name.as_str(), "Drums");
        assert_eq!(ch.output, "Master");
        assert!(!ch.effects.any_enabled());
        assert!(!ch.is_master());
    }

    #[test]
    fn master_is_recognized() {
        let ch = Channel::master();
        assert!(ch.is_master());
        assert_eq!(ch.output, "Output");
    }

    #[test]
    fn any_enabled_tracks_each_flag() {
        let mut fx = EffectConfig::default();
        fx.compression.enabled = true;
        assert!(fx.any_enabled());
        fx.compression.enabled = false;
        fx.reverb.enabled = true;
        assert!(fx.any_enabled());
    }
}
