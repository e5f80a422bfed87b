//! Single-tap delay.

use alloc::vec::Vec;
use mx_ir::{seconds_to_samples, SignalBuffer};

use super::{EffectInfo, ParamInfo};

pub(super) static INFO: EffectInfo = EffectInfo {
    name: "Delay",
    short_name: "Dly",
    params: &[ParamInfo {
        name: "Level",
        min: 0.0,
        max: 1.0,
        default: 0.5,
    }],
};

/// Add a copy of `input` shifted right by `time_secs`, scaled by `level`.
///
/// The shifted copy is truncated to the input length: whatever would land
/// past the end is dropped, not wrapped around.
pub fn delay(input: &SignalBuffer, level: f32, time_secs: f64) -> SignalBuffer {
    let shift = seconds_to_samples(time_secs);
    let src = input.as_slice();
    let out: Vec<f32> = src
        .iter()
        .enumerate()
        .map(|(i, &dry)| match i.checked_sub(shift) {
            Some(j) => dry + level * src[j],
            None => dry,
        })
        .collect();
    SignalBuffer::from_vec(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use mx_ir::DELAY_TIME_SECS;

    fn ramp(len: usize) -> SignalBuffer {
        SignalBuffer::from_vec((0..len).map(|i| (i % 97) as f32 / 97.0 - 0.5).collect())
    }

    #[test]
    fn zero_level_is_identity() {
        let buf = ramp(20000);
        assert_eq!(delay(&buf, 0.0, DELAY_TIME_SECS), buf);
    }

    #[test]
    fn preserves_length() {
        for len in [0, 1, 100, 13230, 13231, 30000] {
            let buf = ramp(len);
            assert_eq!(delay(&buf, 0.7, DELAY_TIME_SECS).len(), len);
        }
    }

    #[test]
    fn echo_lands_after_shift() {
        // 0.3 s at 44100 Hz = 13230 samples
        let mut samples = vec![0.0f32; 20000];
        samples[0] = 1.0;
        let out = delay(&SignalBuffer::from_vec(samples), 0.5, DELAY_TIME_SECS);
        assert_eq!(out.as_slice()[0], 1.0);
        assert_eq!(out.as_slice()[13229], 0.0);
        assert_eq!(out.as_slice()[13230], 0.5);
    }

    #[test]
    fn tail_is_dropped_not_wrapped() {
        let mut samples = vec![0.0f32; 13230];
        samples[13229] = 1.0;
        let out = delay(&SignalBuffer::from_vec(samples), 1.0, DELAY_TIME_SECS);
        assert_eq!(out.as_slice()[0], 0.0);
        assert!((out.peak() - 1.0).abs() < 1e-6);
    }
}
