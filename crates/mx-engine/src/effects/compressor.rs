//! Hard-knee downward compressor without attack or release.

use alloc::vec::Vec;
use mx_ir::SignalBuffer;

use super::{EffectInfo, ParamInfo};

pub(super) static INFO: EffectInfo = EffectInfo {
    name: "Compressor",
    short_name: "Comp",
    params: &[
        ParamInfo {
            name: "Threshold",
            min: 0.0,
            max: 1.0,
            default: 0.5,
        },
        ParamInfo {
            name: "Ratio",
            min: 1.0,
            max: 20.0,
            default: 4.0,
        },
    ],
};

/// Sign of `x` with `sign(0) == 0`.
fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Reduce every sample above `threshold` so the excess shrinks by `ratio`.
pub fn compress(input: &SignalBuffer, threshold: f32, ratio: f32) -> SignalBuffer {
    let out: Vec<f32> = input
        .iter()
        .map(|&x| {
            let mag = x.abs();
            if mag > threshold {
                sign(x) * (threshold + (mag - threshold) / ratio)
            } else {
                x
            }
        })
        .collect();
    SignalBuffer::from_vec(out)
}
