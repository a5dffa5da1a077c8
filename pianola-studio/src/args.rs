use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use pianola_engine::PipelineConfig;
use pianola_midi::{EventKind, OutputFilter, SendMask};

use crate::config::Config;
use crate::output::Format;

#[derive(Parser, Debug)]
#[command(name = "pianola")]
#[command(version, about = "Converts Standard MIDI Files into timed events for a player piano")]
pub struct Args {
  /// Standard MIDI File to convert
  pub input: PathBuf,

  /// Where to write the events
  pub output: PathBuf,

  #[arg(short, long, value_enum, default_value_t = Format::Csv)]
  pub format: Format,

  /// Event kinds to extract [default: all]
  #[arg(long, value_enum, value_delimiter = ',')]
  pub kinds: Vec<KindArg>,

  /// Track indices to write, from 0 to 63 [default: all]
  #[arg(long, value_delimiter = ',', value_parser = clap::value_parser!(u16).range(0..64))]
  pub tracks: Vec<u16>,

  /// Channels to write, from 0 to 15 [default: all]
  #[arg(long, value_delimiter = ',', value_parser = clap::value_parser!(u8).range(0..16))]
  pub channels: Vec<u8>,

  /// Turn note ons with zero velocity into note offs
  #[arg(long)]
  pub zero_velocity_off: bool,

  /// Make strikes and releases of every key alternate
  #[arg(long)]
  pub resolve_overlaps: bool,

  /// Remap velocities, reshape short notes and insert holds
  #[arg(long)]
  pub post_process: bool,

  /// JSON file with the velocity range and per key curve for the post processing
  #[arg(long)]
  pub calibration: Option<PathBuf>,

  /// Log debug information
  #[arg(short, long)]
  pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
  NoteOff,
  NoteOn,
  Aftertouch,
  ControlChange,
  ProgramChange,
  ChannelPressure,
  PitchBend,
  TrackEnd,
}

impl From<KindArg> for EventKind {
  fn from(kind: KindArg) -> Self {
    match kind {
      KindArg::NoteOff => EventKind::NoteOff,
      KindArg::NoteOn => EventKind::NoteOn,
      KindArg::Aftertouch => EventKind::Aftertouch,
      KindArg::ControlChange => EventKind::ControlChange,
      KindArg::ProgramChange => EventKind::ProgramChange,
      KindArg::ChannelPressure => EventKind::ChannelKeyPressure,
      KindArg::PitchBend => EventKind::PitchBend,
      KindArg::TrackEnd => EventKind::TrackEnd,
    }
  }
}

impl Args {
  pub fn config(&self) -> Config {
    let send_mask = if self.kinds.is_empty() {
      SendMask::new()
    } else {
      let kinds = self.kinds.iter().copied().map(EventKind::from).collect::<Vec<_>>();
      SendMask::new().with_kinds(&kinds)
    };

    let mut filter = OutputFilter::new();
    if !self.tracks.is_empty() {
      filter = filter.with_tracks(&self.tracks);
    }
    if !self.channels.is_empty() {
      filter = filter.with_channels(&self.channels);
    }

    Config {
      input: self.input.clone(),
      output: self.output.clone(),
      format: self.format,
      pipeline: PipelineConfig {
        send_mask,
        collapse_zero_velocity: self.zero_velocity_off,
        resolve_overlaps: self.resolve_overlaps,
        post_process: self.post_process,
        ..PipelineConfig::default()
      },
      filter,
    }
  }
}

#[cfg(test)]
mod tests {
  use pianola_midi::Event;

  use super::*;

  #[test]
  fn defaults() {
    let args = Args::try_parse_from(["pianola", "song.mid", "song.csv"]).expect("args");
    let config = args.config();

    assert_eq!(config.input, PathBuf::from("song.mid"));
    assert_eq!(config.output, PathBuf::from("song.csv"));
    assert_eq!(config.format, Format::Csv);
    assert_eq!(config.pipeline.send_mask, SendMask::new());
    assert_eq!(config.filter, OutputFilter::new());
    assert!(!config.pipeline.collapse_zero_velocity);
    assert!(!config.pipeline.resolve_overlaps);
    assert!(!config.pipeline.post_process);
    assert!(args.calibration.is_none());
  }

  #[test]
  fn options() {
    let args = Args::try_parse_from([
      "pianola",
      "song.mid",
      "song.py",
      "--format",
      "script",
      "--kinds",
      "note-on,note-off",
      "--tracks",
      "0,2",
      "--channels",
      "0",
      "--zero-velocity-off",
      "--resolve-overlaps",
      "--post-process",
      "-v",
    ])
    .expect("args");
    let config = args.config();

    assert!(args.verbose);
    assert_eq!(config.format, Format::Script);
    assert_eq!(
      config.pipeline.send_mask,
      SendMask::none().with_kinds(&[EventKind::NoteOn, EventKind::NoteOff])
    );
    assert_eq!(
      config.filter,
      OutputFilter::new().with_tracks(&[0, 2]).with_channels(&[0])
    );
    assert!(config.pipeline.collapse_zero_velocity);
    assert!(config.pipeline.resolve_overlaps);
    assert!(config.pipeline.post_process);
  }

  #[test]
  fn tracks_beyond_the_mask_are_rejected() {
    let result = Args::try_parse_from(["pianola", "in.mid", "out.csv", "--tracks", "0,70"]);
    assert!(result.is_err());

    let args =
      Args::try_parse_from(["pianola", "in.mid", "out.csv", "--tracks", "63"]).expect("args");
    let filter = args.config().filter;
    assert!(filter.accepts(&Event::note_on(0, 63, 0, 60, 100)));
    assert!(!filter.accepts(&Event::note_on(0, 0, 0, 60, 100)));
    assert!(!filter.accepts(&Event::note_on(0, 70, 0, 60, 100)));
  }

  #[test]
  fn invalid_channel() {
    let result = Args::try_parse_from(["pianola", "in.mid", "out.csv", "--channels", "16"]);
    assert!(result.is_err());
  }
}
