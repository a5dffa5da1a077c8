use std::fmt::{Debug, Formatter};

use crate::event::{Event, EventKind};

/// Selects which event kinds are extracted from the track data at all.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SendMask {
  kinds: u8,
}

impl SendMask {
  pub fn new() -> Self {
    Self { kinds: 0xff }
  }

  pub fn none() -> Self {
    Self { kinds: 0 }
  }

  #[must_use]
  pub fn with_kinds(mut self, kinds: &[EventKind]) -> Self {
    self.kinds = 0;
    for kind in kinds.iter().cloned() {
      self.kinds |= Self::bit(kind);
    }
    self
  }

  #[must_use]
  pub fn without_kind(mut self, kind: EventKind) -> Self {
    self.kinds &= !Self::bit(kind);
    self
  }

  #[inline]
  pub fn contains(&self, kind: EventKind) -> bool {
    (self.kinds & Self::bit(kind)) != 0
  }

  #[inline]
  fn bit(kind: EventKind) -> u8 {
    1 << kind.code()
  }
}

impl Default for SendMask {
  fn default() -> Self {
    Self::new()
  }
}

impl Debug for SendMask {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "SendMask({:08b})", self.kinds)
  }
}

/// Selects which of the extracted events are written out.
///
/// Tracks are 0-based. Only the first 64 tracks can be selected individually, the rest pass
/// only while every track is selected. Indices of 64 and above given to `with_tracks` select
/// nothing.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct OutputFilter {
  tracks: u64,
  channels: u16,
}

impl OutputFilter {
  pub fn new() -> Self {
    Self {
      tracks: u64::MAX,
      channels: 0xffff,
    }
  }

  #[must_use]
  pub fn with_tracks(mut self, tracks: &[u16]) -> Self {
    self.tracks = 0;
    for track in tracks.iter().cloned() {
      if track < 64 {
        self.tracks |= 1 << track;
      }
    }
    self
  }

  #[must_use]
  pub fn with_channels(mut self, channels: &[u8]) -> Self {
    self.channels = 0;
    for channel in channels.iter().cloned() {
      if channel < 16 {
        self.channels |= 1 << channel;
      }
    }
    self
  }

  #[inline]
  pub fn track(&self, track: u16) -> bool {
    if track < 64 {
      (self.tracks & (1 << track)) != 0
    } else {
      self.tracks == u64::MAX
    }
  }

  #[inline]
  pub fn channel(&self, channel: u8) -> bool {
    let channel = channel & 0x0f;
    (self.channels & (1 << channel)) != 0
  }

  pub fn accepts(&self, event: &Event) -> bool {
    event.is_active() && self.track(event.track) && self.channel(event.channel)
  }
}

impl Default for OutputFilter {
  fn default() -> Self {
    Self::new()
  }
}

impl Debug for OutputFilter {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    writeln!(f, "OutputFilter:")?;
    writeln!(f, "  TR: {:064b}", self.tracks)?;
    writeln!(f, "  CH: {:016b}", self.channels)
  }
}
