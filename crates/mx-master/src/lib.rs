//! Headless session controller for the mixbench workstation.
//!
//! [`Session`] owns the channel list, the track list, the recording
//! timeline and the recorder. The CLI and any other front end drive the
//! workstation only through it.

mod error;
mod recording;

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use mx_engine::ThreadNoise;
use mx_ir::{Placement, NAME_CAPACITY, SAMPLE_RATE};

pub use error::{Result, SessionError};
pub use recording::Recorder;

// Re-export common types so callers don't need the lower crates directly.
pub use mx_audio::{AudioDriver, AudioError, CpalDriver, NullDriver};
pub use mx_engine::{Drum, MixError};
pub use mx_formats::FormatError;
pub use mx_ir::{
    Channel, CompressionParams, DelayParams, EffectConfig, EqParams, ReverbParams, SignalBuffer,
    TimelineSample, Track, MASTER_CHANNEL,
};

/// Outcome of a batch import. Each file is decoded independently.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Indices of the tracks that were added.
    pub added: Vec<usize>,
    /// Files that failed to decode. None of them were added.
    pub failed: Vec<(PathBuf, FormatError)>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// The workstation state: channels, tracks, timeline and recorder.
pub struct Session<D: AudioDriver = CpalDriver> {
    driver: D,
    channels: Vec<Channel>,
    tracks: Vec<Track>,
    timeline: Vec<TimelineSample>,
    recorder: Recorder,
    recordings: usize,
}

impl Session<CpalDriver> {
    /// Session on the default audio device.
    pub fn with_default_device() -> Self {
        Self::new(CpalDriver)
    }
}

impl<D: AudioDriver + Default> Default for Session<D> {
    fn default() -> Self {
        Self::new(D::default())
    }
}

impl<D: AudioDriver> Session<D> {
    /// A fresh session containing only the Master channel.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            channels: vec![Channel::master()],
            tracks: Vec::new(),
            timeline: Vec::new(),
            recorder: Recorder::new(),
            recordings: 0,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    // --- Channels ---

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.name.as_str() == name)
    }

    fn channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        self.channels.iter_mut().find(|c| c.name.as_str() == name)
    }

    /// Add a channel routed to Master with every effect disabled.
    pub fn add_channel(&mut self, name: &str) -> Result<&Channel> {
        check_channel_name(name)?;
        if self.channel(name).is_some() {
            return Err(SessionError::DuplicateChannel(name.to_string()));
        }

        let channel = Channel::new(name);
        info!("added channel '{}'", channel.name);
        self.channels.push(channel);
        let index = self.channels.len() - 1;
        Ok(&self.channels[index])
    }

    /// Remove a channel by name. Master cannot be removed; asking to is a
    /// no-op returning `false`. Tracks still naming the removed channel
    /// play without effects.
    pub fn remove_channel(&mut self, name: &str) -> bool {
        if name == MASTER_CHANNEL {
            debug!("ignoring request to remove the Master channel");
            return false;
        }
        let Some(pos) = self.channels.iter().position(|c| c.name.as_str() == name) else {
            return false;
        };
        self.channels.remove(pos);
        info!("removed channel '{}'", name);
        true
    }

    /// Rename a channel. Track references are left as they were.
    pub fn rename_channel(&mut self, old: &str, new: &str) -> Result<()> {
        if old == MASTER_CHANNEL {
            return Err(SessionError::ReservedChannel(old.to_string()));
        }
        check_channel_name(new)?;
        let new_name = mx_ir::bounded_name(new);
        if new_name.as_str() != old && self.channel(&new_name).is_some() {
            return Err(SessionError::DuplicateChannel(new_name.to_string()));
        }

        let channel = self
            .channel_mut(old)
            .ok_or_else(|| SessionError::UnknownChannel(old.to_string()))?;
        channel.name = new_name;
        info!("renamed channel '{}' to '{}'", old, new_name);
        Ok(())
    }

    /// Set a channel's output label. Routing is not followed when mixing.
    pub fn set_channel_output(&mut self, name: &str, output: &str) -> Result<()> {
        let channel = self
            .channel_mut(name)
            .ok_or_else(|| SessionError::UnknownChannel(name.to_string()))?;
        channel.output = output.to_string();
        Ok(())
    }

    /// Effect parameters of a channel, for editing in place.
    pub fn channel_effects_mut(&mut self, name: &str) -> Option<&mut EffectConfig> {
        self.channel_mut(name).map(|c| &mut c.effects)
    }

    // --- Tracks ---

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index)
    }

    /// Append a track and return its index.
    pub fn add_track(&mut self, track: Track) -> usize {
        self.tracks.push(track);
        self.tracks.len() - 1
    }

    pub fn remove_track(&mut self, index: usize) -> Result<Track> {
        let len = self.tracks.len();
        if index >= len {
            return Err(SessionError::IndexOutOfRange { index, len });
        }
        Ok(self.tracks.remove(index))
    }

    /// Import audio files as tracks on Master. A file that fails to decode
    /// is listed in the report and does not stop the others.
    pub fn import_tracks<P: AsRef<Path>>(&mut self, paths: &[P]) -> ImportReport {
        let mut report = ImportReport::default();
        for path in paths {
            let path = path.as_ref();
            match mx_formats::load_mono(path) {
                Ok(buffer) => {
                    let index = self.add_track(Track::new(buffer, &file_label(path)));
                    report.added.push(index);
                }
                Err(e) => {
                    warn!("skipping {}: {}", path.display(), e);
                    report.failed.push((path.to_path_buf(), e));
                }
            }
        }
        info!(
            "imported {} track(s), {} failed",
            report.added.len(),
            report.failed.len()
        );
        report
    }

    /// Route a track through an existing channel.
    pub fn assign_track_channel(&mut self, index: usize, channel: &str) -> Result<()> {
        if self.channel(channel).is_none() {
            return Err(SessionError::UnknownChannel(channel.to_string()));
        }
        let len = self.tracks.len();
        let track = self
            .tracks
            .get_mut(index)
            .ok_or(SessionError::IndexOutOfRange { index, len })?;
        track.set_channel(channel);
        Ok(())
    }

    // --- Timeline ---

    pub fn timeline(&self) -> &[TimelineSample] {
        &self.timeline
    }

    pub fn timeline_sample_mut(&mut self, index: usize) -> Option<&mut TimelineSample> {
        self.timeline.get_mut(index)
    }

    /// Append a sample to the timeline and return its index.
    pub fn add_timeline_sample(&mut self, sample: TimelineSample) -> usize {
        self.timeline.push(sample);
        self.timeline.len() - 1
    }

    /// Decode a file onto the timeline at offset 0. On failure nothing is
    /// added.
    pub fn load_timeline_sample(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let buffer = mx_formats::load_mono(path).map_err(|source| SessionError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        let index = self.add_timeline_sample(TimelineSample::new(buffer, 0.0, &file_label(path)));
        info!("loaded {} onto the timeline", path.display());
        Ok(index)
    }

    pub fn remove_timeline_sample(&mut self, index: usize) -> Result<TimelineSample> {
        let len = self.timeline.len();
        if index >= len {
            return Err(SessionError::IndexOutOfRange { index, len });
        }
        Ok(self.timeline.remove(index))
    }

    pub fn clear_timeline(&mut self) {
        self.timeline.clear();
    }

    // --- Recording ---

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// Start capturing from the driver's input. Returns `Ok(false)` if a
    /// recording is already running.
    pub fn start_recording(&mut self) -> Result<bool> {
        let started = self.recorder.start(&self.driver)?;
        if started {
            info!("recording started");
        } else {
            warn!("recording already in progress");
        }
        Ok(started)
    }

    /// Stop capturing and append the result to the timeline at offset 0.
    /// Returns the new sample's index, or `None` if nothing was recording.
    pub fn stop_recording(&mut self) -> Option<usize> {
        let buffer = self.recorder.stop()?;
        self.recordings += 1;
        let label = format!("Recording {}", self.recordings);
        info!(
            "recording stopped: {} samples ({:.2} s) as '{}'",
            buffer.len(),
            buffer.duration_secs(),
            label
        );
        Some(self.add_timeline_sample(TimelineSample::new(buffer, 0.0, &label)))
    }

    // --- Mixing ---

    /// Mix every timeline sample at its offset, without channel effects.
    pub fn mix_timeline(&self) -> Result<SignalBuffer> {
        let placements: Vec<Placement<'_>> =
            self.timeline.iter().map(TimelineSample::placement).collect();
        Ok(mx_engine::mix(&placements, &self.channels)?)
    }

    /// Mix every track through its channel's effects at its volume.
    pub fn mix_tracks(&self) -> Result<SignalBuffer> {
        let placements: Vec<Placement<'_>> = self.tracks.iter().map(Track::placement).collect();
        Ok(mx_engine::mix(&placements, &self.channels)?)
    }

    // --- Playback ---

    /// Synthesize a drum hit and play it.
    pub fn play_drum(&self, drum: Drum) -> Result<()> {
        let buffer = drum.synthesize(&mut ThreadNoise);
        info!("playing {}", drum.name());
        self.dispatch(buffer)
    }

    /// Play one timeline sample as recorded, without normalization.
    pub fn play_timeline_sample(&self, index: usize) -> Result<()> {
        let sample = self.timeline.get(index).ok_or(SessionError::IndexOutOfRange {
            index,
            len: self.timeline.len(),
        })?;
        info!("playing '{}'", sample.label);
        self.dispatch(sample.buffer.clone())
    }

    pub fn play_timeline(&self) -> Result<()> {
        let mixed = self.mix_timeline()?;
        info!("playing timeline mix ({:.2} s)", mixed.duration_secs());
        self.dispatch(mixed)
    }

    pub fn play_tracks(&self) -> Result<()> {
        let mixed = self.mix_tracks()?;
        info!("playing track mix ({:.2} s)", mixed.duration_secs());
        self.dispatch(mixed)
    }

    fn dispatch(&self, buffer: SignalBuffer) -> Result<()> {
        self.driver.play(buffer, SAMPLE_RATE)?;
        Ok(())
    }

    // --- Export ---

    /// Render the track mix as a 16-bit mono WAV file.
    pub fn render_tracks_wav(&self) -> Result<Vec<u8>> {
        let mixed = self.mix_tracks()?;
        mx_formats::buffer_to_wav(&mixed, SAMPLE_RATE).map_err(SessionError::Encode)
    }

    /// Render the timeline mix as a 16-bit mono WAV file.
    pub fn render_timeline_wav(&self) -> Result<Vec<u8>> {
        let mixed = self.mix_timeline()?;
        mx_formats::buffer_to_wav(&mixed, SAMPLE_RATE).map_err(SessionError::Encode)
    }
}

/// Channel names are looked up by exact match, so they are stored
/// unchanged: no surrounding whitespace and no truncation.
fn check_channel_name(name: &str) -> Result<()> {
    if name.is_empty() || name.trim() != name || name.len() > NAME_CAPACITY {
        return Err(SessionError::InvalidChannelName(name.to_string()));
    }
    Ok(())
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
