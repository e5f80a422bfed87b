//! Offline compositor: sums placed buffers into one master buffer.

use log::debug;
use mx_ir::{seconds_to_samples, Channel, Placement, SignalBuffer, NORMALIZE_HEADROOM};

use crate::chain::EffectChain;
use crate::error::MixError;

/// Find the channel a placement routes to.
///
/// `None` means "no channel effects", either because the placement has no
/// channel or because the name no longer matches any channel.
pub fn resolve_channel<'c>(channels: &'c [Channel], name: Option<&str>) -> Option<&'c Channel> {
    let name = name?;
    channels.iter().find(|ch| ch.name.as_str() == name)
}

/// Sum `placements` into a master buffer without normalizing.
///
/// Each placement runs through its channel's effect chain (unresolved
/// channels pass through untouched), is scaled by its gain and added at
/// `round(offset * rate)`. The master buffer grows whenever a processed
/// placement runs past its end.
pub fn mix_raw(placements: &[Placement<'_>], channels: &[Channel]) -> Result<SignalBuffer, MixError> {
    if placements.is_empty() {
        return Err(MixError::NothingToMix);
    }

    let total_secs = placements
        .iter()
        .map(Placement::end_secs)
        .fold(0.0f64, f64::max);
    let mut master = SignalBuffer::silent(seconds_to_samples(total_secs));

    for placement in placements {
        let mut processed = match resolve_channel(channels, placement.channel) {
            Some(channel) => EffectChain::for_channel(channel).process(placement.buffer),
            None => placement.buffer.clone(),
        };
        processed.apply_gain(placement.gain);

        let start = seconds_to_samples(placement.offset);
        master.mix_in(start, processed.as_slice());
    }

    debug!(
        "mixed {} placements into {} samples ({:.3}s)",
        placements.len(),
        master.len(),
        master.duration_secs()
    );
    Ok(master)
}

/// Sum `placements` and peak-normalize the result to [`NORMALIZE_HEADROOM`].
///
/// Effects may push intermediate levels well past 1.0; the single
/// normalization at the end brings the mix back into range. A silent mix
/// is returned as-is.
pub fn mix(placements: &[Placement<'_>], channels: &[Channel]) -> Result<SignalBuffer, MixError> {
    let mut master = mix_raw(placements, channels)?;
    let peak = master.peak();
    master.normalize_peak(NORMALIZE_HEADROOM);
    debug!("normalized mix from peak {:.4}", peak);
    Ok(master)
}
