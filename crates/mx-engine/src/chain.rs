//! Fixed-order effect chain built from a channel's settings.

use alloc::vec::Vec;
use mx_ir::{Channel, EffectConfig, SignalBuffer};

use crate::effects::Effect;

/// The enabled effects of a channel, in processing order.
///
/// Order is always Delay → Reverb → EQ → Compression; disabled stages
/// are left out.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectChain {
    stages: Vec<Effect>,
}

impl EffectChain {
    pub fn from_config(config: &EffectConfig) -> Self {
        let mut stages = Vec::with_capacity(4);
        if config.delay.enabled {
            stages.push(Effect::delay(config.delay.level));
        }
        if config.reverb.enabled {
            stages.push(Effect::Reverb {
                level: config.reverb.level,
            });
        }
        if config.eq.enabled {
            stages.push(Effect::Eq {
                gain: config.eq.gain,
            });
        }
        if config.compression.enabled {
            stages.push(Effect::Compression {
                threshold: config.compression.threshold,
                ratio: config.compression.ratio,
            });
        }
        Self { stages }
    }

    pub fn for_channel(channel: &Channel) -> Self {
        Self::from_config(&channel.effects)
    }

    pub fn stages(&self) -> &[Effect] {
        &self.stages
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage in order, returning the processed buffer.
    pub fn process(&self, input: &SignalBuffer) -> SignalBuffer {
        let mut stages = self.stages.iter();
        let Some(first) = stages.next() else {
            return input.clone();
        };
        stages.fold(first.apply(input), |buf, fx| fx.apply(&buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{compress, delay, eq, reverb};
    use alloc::vec;
    use mx_ir::DELAY_TIME_SECS;

    fn all_on() -> EffectConfig {
        let mut fx = EffectConfig::default();
        fx.delay.enabled = true;
        fx.reverb.enabled = true;
        fx.eq.enabled = true;
        fx.compression.enabled = true;
        fx
    }

    fn test_signal() -> SignalBuffer {
        SignalBuffer::from_vec(
            (0..20000)
                .map(|i| libm::sinf(i as f32 * 0.05) * 0.9)
                .collect(),
        )
    }

    #[test]
    fn default_config_is_empty_passthrough() {
        let chain = EffectChain::from_config(&EffectConfig::default());
        assert!(chain.is_empty());
        let buf = SignalBuffer::from_vec(vec![0.1, 0.2]);
        assert_eq!(chain.process(&buf), buf);
    }

    #[test]
    fn stages_follow_fixed_order() {
        let chain = EffectChain::from_config(&all_on());
        let names: Vec<&str> = chain.stages().iter().map(|fx| fx.name()).collect();
        assert_eq!(names, ["Delay", "Reverb", "EQ", "Compressor"]);
    }

    #[test]
    fn disabled_stages_are_skipped() {
        let mut fx = all_on();
        fx.reverb.enabled = false;
        fx.compression.enabled = false;
        let names: Vec<&str> = EffectChain::from_config(&fx)
            .stages()
            .iter()
            .map(|fx| fx.name())
            .collect();
        assert_eq!(names, ["Delay", "EQ"]);
    }

    #[test]
    fn process_matches_manual_composition() {
        let fx = all_on();
        let input = test_signal();
        let expected = compress(
            &eq(
                &reverb(&delay(&input, fx.delay.level, DELAY_TIME_SECS), fx.reverb.level),
                fx.eq.gain,
            ),
            fx.compression.threshold,
            fx.compression.ratio,
        );
        assert_eq!(EffectChain::from_config(&fx).process(&input), expected);
    }

    #[test]
    fn order_changes_output() {
        let fx = all_on();
        let input = test_signal();
        let reordered = delay(
            &reverb(
                &eq(
                    &compress(&input, fx.compression.threshold, fx.compression.ratio),
                    fx.eq.gain,
                ),
                fx.reverb.level,
            ),
            fx.delay.level,
            DELAY_TIME_SECS,
        );
        assert_ne!(EffectChain::from_config(&fx).process(&input), reordered);
    }

    #[test]
    fn chain_preserves_length() {
        let input = test_signal();
        let out = EffectChain::from_config(&all_on()).process(&input);
        assert_eq!(out.len(), input.len());
    }
}
