//! Timeline and multitrack entries, and the placements they mix as.

use crate::name::{bounded_name, Name};
use crate::signal::SignalBuffer;
use crate::MASTER_CHANNEL;

fn sanitize_offset(offset: f64) -> f64 {
    if offset.is_finite() {
        offset.max(0.0)
    } else {
        0.0
    }
}

/// A recorded or loaded buffer on the recording timeline.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineSample {
    pub buffer: SignalBuffer,
    /// Start time in seconds (>= 0)
    pub offset: f64,
    pub label: Name,
}

impl TimelineSample {
    pub fn new(buffer: SignalBuffer, offset: f64, label: &str) -> Self {
        Self {
            buffer,
            offset: sanitize_offset(offset),
            label: bounded_name(label),
        }
    }

    pub fn set_offset(&mut self, offset: f64) {
        self.offset = sanitize_offset(offset);
    }

    /// Timeline entries mix at unity gain with no channel effects.
    pub fn placement(&self) -> Placement<'_> {
        Placement {
            buffer: &self.buffer,
            offset: self.offset,
            gain: 1.0,
            channel: None,
        }
    }
}

/// An imported buffer on the multitrack view, routed through a channel.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub buffer: SignalBuffer,
    /// Start time in seconds (>= 0)
    pub offset: f64,
    /// Linear gain (0..=1)
    pub volume: f32,
    /// Name of the channel this track routes through. May dangle.
    pub channel: Name,
    pub label: Name,
}

impl Track {
    /// Create a track at offset 0, full volume, routed to Master.
    pub fn new(buffer: SignalBuffer, label: &str) -> Self {
        Self {
            buffer,
            offset: 0.0,
            volume: 1.0,
            channel: bounded_name(MASTER_CHANNEL),
            label: bounded_name(label),
        }
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.set_offset(offset);
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.set_volume(volume);
        self
    }

    pub fn set_offset(&mut self, offset: f64) {
        self.offset = sanitize_offset(offset);
    }

    /// Set the volume, clamped to `0..=1`.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
    }

    pub fn set_channel(&mut self, channel: &str) {
        self.channel = bounded_name(channel);
    }

    pub fn placement(&self) -> Placement<'_> {
        Placement {
            buffer: &self.buffer,
            offset: self.offset,
            gain: self.volume,
            channel: Some(self.channel.as_str()),
        }
    }
}

/// One buffer scheduled into a mix.
#[derive(Clone, Copy, Debug)]
pub struct Placement<'a> {
    pub buffer: &'a SignalBuffer,
    /// Start time in seconds
    pub offset: f64,
    pub gain: f32,
    /// Channel to route through; `None` skips effects entirely
    pub channel: Option<&'a str>,
}

impl<'a> Placement<'a> {
    pub fn new(buffer: &'a SignalBuffer, offset: f64) -> Self {
        Self {
            buffer,
            offset,
            gain: 1.0,
            channel: None,
        }
    }

    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_channel(mut self, channel: &'a str) -> Self {
        self.channel = Some(channel);
        self
    }

    /// End time in seconds, before any effect processing.
    pub fn end_secs(&self) -> f64 {
        sanitize_offset(self.offset) + self.buffer.duration_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn track_defaults_route_to_master() {
        let track = Track::new(SignalBuffer::silent(10), "kick.wav");
        assert_eq!(track.channel.as_str(), MASTER_CHANNEL);
        assert_eq!(track.volume, 1.0);
        assert_eq!(track.offset, 0.0);
    }

    #[test]
    fn track_setters_clamp() {
        let mut track = Track::new(SignalBuffer::silent(10), "t");
        track.set_volume(1.5);
        assert_eq!(track.volume, 1.0);
        track.set_volume(-0.2);
        assert_eq!(track.volume, 0.0);
        track.set_offset(-3.0);
        assert_eq!(track.offset, 0.0);
        track.set_offset(f64::INFINITY);
        assert_eq!(track.offset, 0.0);
    }

    #[test]
    fn timeline_placement_is_unity_without_channel() {
        let sample = TimelineSample::new(SignalBuffer::silent(4), 1.25, "Recording 1");
        let p = sample.placement();
        assert_eq!(p.gain, 1.0);
        assert_eq!(p.offset, 1.25);
        assert!(p.channel.is_none());
    }

    #[test]
    fn track_placement_carries_volume_and_channel() {
        let mut track = Track::new(SignalBuffer::from_vec(vec![0.5; 4]), "t").with_volume(0.25);
        track.set_channel("Drums");
        let p = track.placement();
        assert_eq!(p.gain, 0.25);
        assert_eq!(p.channel, Some("Drums"));
    }

    #[test]
    fn placement_end_includes_buffer_length() {
        let buf = SignalBuffer::silent(44100);
        let p = Placement::new(&buf, 0.5);
        assert!((p.end_secs() - 1.5).abs() < 1e-12);
    }
}
