//! mixbench CLI: drum synthesis, offline mixing and recording.
//!
//! Usage:
//!   mixbench drum kick
//!   mixbench mix intro.wav vocals.wav@1.5:0.8 --reverb 0.3 --wav out.wav
//!   mixbench record --seconds 5 --wav take.wav

use std::error::Error;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use std::{env, fs};

use log::info;
use mx_engine::ThreadNoise;
use mx_ir::SAMPLE_RATE;
use mx_master::{AudioDriver, CpalDriver, Drum, NullDriver, Session, SignalBuffer, MASTER_CHANNEL};

/// Extra wait after a dispatched buffer so the device drains its tail.
const PLAYBACK_SLACK_SECS: f64 = 0.4;

const DEFAULT_RECORD_SECS: f64 = 5.0;

const USAGE: &str = "\
Usage:
  mixbench drum <kick|snare|hihat> [--wav out.wav]
  mixbench mix <file[@offset[:volume]]>... [--delay L] [--reverb L] [--eq G]
               [--compress THRESHOLD:RATIO] [--wav out.wav]
  mixbench record [--seconds N] [--wav out.wav]";

#[derive(Debug, PartialEq)]
enum Command {
    Drum {
        drum: Drum,
        wav: Option<PathBuf>,
    },
    Mix {
        tracks: Vec<TrackArg>,
        effects: MasterEffects,
        wav: Option<PathBuf>,
    },
    Record {
        seconds: f64,
        wav: Option<PathBuf>,
    },
}

impl Command {
    /// Parse the arguments after the program name.
    fn parse(args: &[String]) -> Result<Self, String> {
        let (name, rest) = args.split_first().ok_or("missing command")?;
        let (positional, flags) = split_flags(rest)?;
        let flag = |key: &str| {
            flags
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        let wav = flag("wav").map(PathBuf::from);

        match name.as_str() {
            "drum" => {
                let [drum] = positional.as_slice() else {
                    return Err("drum takes exactly one voice".into());
                };
                Ok(Command::Drum {
                    drum: parse_drum(drum)?,
                    wav,
                })
            }
            "mix" => {
                if positional.is_empty() {
                    return Err("mix needs at least one file".into());
                }
                let tracks = positional
                    .iter()
                    .map(|t| t.parse())
                    .collect::<Result<Vec<TrackArg>, _>>()?;
                let effects = MasterEffects {
                    delay: flag("delay").map(|v| parse_level("delay", v)).transpose()?,
                    reverb: flag("reverb").map(|v| parse_level("reverb", v)).transpose()?,
                    eq: flag("eq").map(|v| parse_level("eq", v)).transpose()?,
                    compress: flag("compress").map(parse_compression).transpose()?,
                };
                Ok(Command::Mix {
                    tracks,
                    effects,
                    wav,
                })
            }
            "record" => {
                let seconds = match flag("seconds") {
                    Some(v) => v
                        .parse::<f64>()
                        .map_err(|e| format!("bad --seconds '{}': {}", v, e))?,
                    None => DEFAULT_RECORD_SECS,
                };
                Ok(Command::Record { seconds, wav })
            }
            other => Err(format!("unknown command '{}'", other)),
        }
    }
}

/// Separate `--key value` pairs from positional arguments.
fn split_flags(args: &[String]) -> Result<(Vec<&String>, Vec<(String, String)>), String> {
    let mut positional = Vec::new();
    let mut flags = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.strip_prefix("--") {
            Some(key) => {
                let value = iter
                    .next()
                    .ok_or_else(|| format!("--{} needs a value", key))?;
                flags.push((key.to_string(), value.clone()));
            }
            None => positional.push(arg),
        }
    }
    Ok((positional, flags))
}

/// One `mix` input: a file plus optional placement.
#[derive(Debug, PartialEq)]
struct TrackArg {
    path: PathBuf,
    offset: f64,
    volume: f32,
}

impl FromStr for TrackArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((path, placement)) = s.rsplit_once('@') else {
            return Ok(Self {
                path: PathBuf::from(s),
                offset: 0.0,
                volume: 1.0,
            });
        };
        let (offset, volume) = match placement.split_once(':') {
            Some((o, v)) => (o, Some(v)),
            None => (placement, None),
        };
        let offset = offset
            .parse::<f64>()
            .map_err(|e| format!("bad offset '{}': {}", offset, e))?;
        let volume = match volume {
            Some(v) => v.parse::<f32>().map_err(|e| format!("bad volume '{}': {}", v, e))?,
            None => 1.0,
        };
        Ok(Self {
            path: PathBuf::from(path),
            offset,
            volume,
        })
    }
}

fn parse_drum(s: &str) -> Result<Drum, String> {
    Drum::from_name(s).ok_or_else(|| format!("unknown drum '{}' (kick, snare, hihat)", s))
}

fn parse_level(name: &str, s: &str) -> Result<f32, String> {
    s.parse::<f32>()
        .map_err(|e| format!("bad --{} '{}': {}", name, s, e))
}

fn parse_compression(s: &str) -> Result<(f32, f32), String> {
    let (t, r) = s
        .split_once(':')
        .ok_or_else(|| format!("expected THRESHOLD:RATIO, got '{}'", s))?;
    let threshold = t.parse::<f32>().map_err(|e| format!("bad threshold '{}': {}", t, e))?;
    let ratio = r.parse::<f32>().map_err(|e| format!("bad ratio '{}': {}", r, e))?;
    Ok((threshold, ratio))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = Command::parse(&args).unwrap_or_else(|e| {
        eprintln!("{}\n\n{}", e, USAGE);
        std::process::exit(2);
    });

    if let Err(e) = run(command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Drum { drum, wav: Some(path) } => {
            let buffer = drum.synthesize(&mut ThreadNoise);
            write_wav(&path, &buffer)
        }
        Command::Drum { drum, wav: None } => {
            let session = Session::with_default_device();
            session.play_drum(drum)?;
            wait_for_playback(drum.duration_secs());
            Ok(())
        }
        Command::Mix {
            tracks,
            effects,
            wav: Some(path),
        } => {
            let session = build_mix(Session::new(NullDriver), &tracks, &effects);
            let bytes = session.render_tracks_wav()?;
            fs::write(&path, &bytes)?;
            println!("Wrote {} ({} bytes)", path.display(), bytes.len());
            Ok(())
        }
        Command::Mix {
            tracks,
            effects,
            wav: None,
        } => {
            let session = build_mix(Session::with_default_device(), &tracks, &effects);
            let mixed = session.mix_tracks()?;
            session.play_tracks()?;
            println!("Playing {:.2} s...", mixed.duration_secs());
            wait_for_playback(mixed.duration_secs());
            println!("Done.");
            Ok(())
        }
        Command::Record { seconds, wav } => record(seconds, wav.as_deref()),
    }
}

/// Effect settings applied to the Master channel for `mix`.
#[derive(Debug, Default, PartialEq)]
struct MasterEffects {
    delay: Option<f32>,
    reverb: Option<f32>,
    eq: Option<f32>,
    compress: Option<(f32, f32)>,
}

fn build_mix<D: AudioDriver>(
    mut session: Session<D>,
    tracks: &[TrackArg],
    effects: &MasterEffects,
) -> Session<D> {
    for arg in tracks {
        let report = session.import_tracks(&[&arg.path]);
        for (path, e) in &report.failed {
            eprintln!("Failed to load {}: {}", path.display(), e);
        }
        for &index in &report.added {
            if let Some(track) = session.track_mut(index) {
                track.set_offset(arg.offset);
                track.set_volume(arg.volume);
            }
        }
    }

    if let Some(fx) = session.channel_effects_mut(MASTER_CHANNEL) {
        if let Some(level) = effects.delay {
            fx.delay.enabled = true;
            fx.delay.level = level;
        }
        if let Some(level) = effects.reverb {
            fx.reverb.enabled = true;
            fx.reverb.level = level;
        }
        if let Some(gain) = effects.eq {
            fx.eq.enabled = true;
            fx.eq.gain = gain;
        }
        if let Some((threshold, ratio)) = effects.compress {
            fx.compression.enabled = true;
            fx.compression.threshold = threshold;
            fx.compression.ratio = ratio;
        }
    }
    session
}

fn record(seconds: f64, wav: Option<&Path>) -> Result<(), Box<dyn Error>> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(format!("invalid duration {}", seconds).into());
    }
    let mut session: Session<CpalDriver> = Session::with_default_device();
    session.start_recording()?;
    println!("Recording for {:.1} s...", seconds);
    std::thread::sleep(Duration::from_secs_f64(seconds));

    let Some(index) = session.stop_recording() else {
        return Err("recording was not running".into());
    };
    let take = &session.timeline()[index];
    info!("captured {} samples", take.buffer.len());

    match wav {
        Some(path) => {
            let bytes = session.render_timeline_wav()?;
            fs::write(path, &bytes)?;
            println!("Wrote {} ({} bytes)", path.display(), bytes.len());
        }
        None => {
            let duration = take.buffer.duration_secs();
            session.play_timeline()?;
            wait_for_playback(duration);
        }
    }
    Ok(())
}

fn write_wav(path: &Path, buffer: &SignalBuffer) -> Result<(), Box<dyn Error>> {
    mx_formats::save_wav(path, buffer, SAMPLE_RATE)?;
    println!("Wrote {} ({} samples)", path.display(), buffer.len());
    Ok(())
}

/// Playback runs on its own thread; keep the process alive until it ends.
fn wait_for_playback(secs: f64) {
    std::thread::sleep(Duration::from_secs_f64(secs + PLAYBACK_SLACK_SECS));
}
