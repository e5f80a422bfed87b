//! Moving-average tone control.

use alloc::vec::Vec;
use mx_ir::{SignalBuffer, EQ_WINDOW};

use super::{EffectInfo, ParamInfo};

pub(super) static INFO: EffectInfo = EffectInfo {
    name: "EQ",
    short_name: "EQ",
    params: &[ParamInfo {
        name: "Gain",
        min: 0.0,
        max: 2.0,
        default: 1.0,
    }],
};

/// Low-pass `input` with a `gain`-scaled moving average of [`EQ_WINDOW`]
/// samples, centered so the output keeps the input length.
///
/// For a window of 10 the average at `i` covers `i - 5 ..= i + 4`;
/// samples outside the buffer count as zero.
pub fn eq(input: &SignalBuffer, gain: f32) -> SignalBuffer {
    let src = input.as_slice();
    let len = src.len();
    let before = EQ_WINDOW / 2;
    let after = EQ_WINDOW - 1 - before;
    let coeff = gain / EQ_WINDOW as f32;

    let out: Vec<f32> = (0..len)
        .map(|i| {
            let start = i.saturating_sub(before);
            let end = (i + after + 1).min(len);
            coeff * src[start..end].iter().sum::<f32>()
        })
        .collect();
    SignalBuffer::from_vec(out)
}
