//! Convolution reverb with a synthetic exponential-decay impulse response.

use alloc::vec::Vec;
use mx_ir::{seconds_to_samples, SignalBuffer, REVERB_IR_SECS, SAMPLE_RATE};

use super::{EffectInfo, ParamInfo};

pub(super) static INFO: EffectInfo = EffectInfo {
    name: "Reverb",
    short_name: "Rvb",
    params: &[ParamInfo {
        name: "Level",
        min: 0.0,
        max: 1.0,
        default: 0.3,
    }],
};

/// Decay rate of the impulse response, per second.
const DECAY: f64 = 10.0;

/// `h[k] = level * exp(-10 t)` over 100 ms, `t = k / rate`.
fn impulse_response(level: f32) -> Vec<f32> {
    let len = seconds_to_samples(REVERB_IR_SECS);
    (0..len)
        .map(|k| {
            let t = k as f64 / SAMPLE_RATE as f64;
            level * libm::exp(-DECAY * t) as f32
        })
        .collect()
}

/// Convolve `input` with the impulse response and add the result to the
/// dry signal. The convolution is truncated to the input length.
pub fn reverb(input: &SignalBuffer, level: f32) -> SignalBuffer {
    let ir = impulse_response(level);
    let src = input.as_slice();
    let out: Vec<f32> = (0..src.len())
        .map(|i| {
            let taps = ir.len().min(i + 1);
            let wet: f32 = (0..taps).map(|k| src[i - k] * ir[k]).sum();
            src[i] + wet
        })
        .collect();
    SignalBuffer::from_vec(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn impulse_response_spans_100ms() {
        let ir = impulse_response(1.0);
        assert_eq!(ir.len(), 4410);
        assert_eq!(ir[0], 1.0);
        // exp(-10 * 0.05) at the midpoint
        let mid = ir[2205];
        assert!((mid - libm::expf(-0.5)).abs() < 1e-4);
    }

    #[test]
    fn preserves_length() {
        for len in [0, 1, 10, 5000] {
            let buf = SignalBuffer::silent(len);
            assert_eq!(reverb(&buf, 0.5).len(), len);
        }
    }

    #[test]
    fn impulse_yields_dry_plus_response() {
        let mut samples = vec![0.0f32; 6000];
        samples[0] = 1.0;
        let out = reverb(&SignalBuffer::from_vec(samples), 0.5);
        // dry 1.0 plus h[0] = 0.5
        assert!((out.as_slice()[0] - 1.5).abs() < 1e-6);
        let expected = 0.5 * libm::exp(-10.0 * 100.0 / 44100.0) as f32;
        assert!((out.as_slice()[100] - expected).abs() < 1e-6);
        // past the 4410-sample response there is nothing left
        assert_eq!(out.as_slice()[5000], 0.0);
    }

    #[test]
    fn zero_level_is_dry() {
        let buf = SignalBuffer::from_vec(vec![0.3, -0.1, 0.7]);
        assert_eq!(reverb(&buf, 0.0), buf);
    }
}
