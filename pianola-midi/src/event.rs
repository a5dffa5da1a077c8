use std::fmt::Formatter;

pub type TimeMs = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
  NoteOff,
  NoteOn,
  Aftertouch,
  ControlChange,
  ProgramChange,
  ChannelKeyPressure,
  PitchBend,
  TrackEnd,
}

impl EventKind {
  pub const ALL: [EventKind; 8] = [
    Self::NoteOff,
    Self::NoteOn,
    Self::Aftertouch,
    Self::ControlChange,
    Self::ProgramChange,
    Self::ChannelKeyPressure,
    Self::PitchBend,
    Self::TrackEnd,
  ];

  /// Numeric code used by the serialized formats.
  pub fn code(self) -> u8 {
    match self {
      Self::NoteOff => 0,
      Self::NoteOn => 1,
      Self::Aftertouch => 2,
      Self::ControlChange => 3,
      Self::ProgramChange => 4,
      Self::ChannelKeyPressure => 5,
      Self::PitchBend => 6,
      Self::TrackEnd => 7,
    }
  }

  pub fn is_note(self) -> bool {
    matches!(self, Self::NoteOff | Self::NoteOn)
  }
}

/// A performance event resolved to absolute milliseconds.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Event {
  pub time_ms: TimeMs,
  pub kind: EventKind,
  pub track: u16,
  pub channel: u8,
  pub key: u8,
  pub value: u16,
  active: bool,
}

impl Event {
  pub const NO_KEY: u8 = 255;
  pub const NO_VALUE: u16 = 255;

  pub fn new(time_ms: TimeMs, kind: EventKind, track: u16, channel: u8, key: u8, value: u16) -> Self {
    Self {
      time_ms,
      kind,
      track,
      channel,
      key,
      value,
      active: true,
    }
  }

  pub fn note_on(time_ms: TimeMs, track: u16, channel: u8, key: u8, velocity: u16) -> Self {
    Self::new(time_ms, EventKind::NoteOn, track, channel, key, velocity)
  }

  pub fn note_off(time_ms: TimeMs, track: u16, channel: u8, key: u8, velocity: u16) -> Self {
    Self::new(time_ms, EventKind::NoteOff, track, channel, key, velocity)
  }

  pub fn track_end(time_ms: TimeMs, track: u16) -> Self {
    Self::new(
      time_ms,
      EventKind::TrackEnd,
      track,
      0,
      Self::NO_KEY,
      Self::NO_VALUE,
    )
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Excludes the event from the output. There is no way back.
  pub fn deactivate(&mut self) {
    self.active = false;
  }

  /// A note on that actually strikes the key.
  pub fn is_strike(&self) -> bool {
    self.kind == EventKind::NoteOn && self.value > 0
  }

  /// A note off, or a note on with zero velocity.
  pub fn is_release(&self) -> bool {
    match self.kind {
      EventKind::NoteOff => true,
      EventKind::NoteOn => self.value == 0,
      _ => false,
    }
  }

  /// Same event at another time, always active.
  #[must_use]
  pub fn at(&self, time_ms: TimeMs) -> Self {
    Self {
      time_ms,
      active: true,
      ..*self
    }
  }
}

impl std::fmt::Debug for Event {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "[{:>8}] T{:03} C{:02} {:?} {} {}{}",
      self.time_ms,
      self.track,
      self.channel,
      self.kind,
      self.key,
      self.value,
      if self.active { "" } else { " (inactive)" }
    )
  }
}

/// Destination of the events produced while parsing.
pub trait EventSink {
  fn push_event(&mut self, event: Event);
}

impl EventSink for Vec<Event> {
  fn push_event(&mut self, event: Event) {
    self.push(event);
  }
}
