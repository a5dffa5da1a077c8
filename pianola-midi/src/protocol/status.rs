use crate::event::{Event, EventKind};

/// Message type and channel of a channel voice message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceStatus {
  pub kind: EventKind,
  pub channel: u8,
}

impl VoiceStatus {
  pub fn new(kind: EventKind, channel: u8) -> Self {
    Self { kind, channel }
  }

  pub fn from_status(status: u8) -> Option<Self> {
    let channel = status & 0x0f;
    let kind = match status >> 4 {
      0x8 => EventKind::NoteOff,
      0x9 => EventKind::NoteOn,
      0xa => EventKind::Aftertouch,
      0xb => EventKind::ControlChange,
      0xc => EventKind::ProgramChange,
      0xd => EventKind::ChannelKeyPressure,
      0xe => EventKind::PitchBend,
      _ => return None,
    };
    Some(Self::new(kind, channel))
  }

  /// Number of data bytes following the status.
  pub fn data_len(&self) -> usize {
    match self.kind {
      EventKind::ProgramChange | EventKind::ChannelKeyPressure => 1,
      _ => 2,
    }
  }

  /// Key and value carried by the data bytes.
  pub fn key_and_value(&self, data: &[u8]) -> (u8, u16) {
    let data0 = data.first().cloned().unwrap_or(0);
    let data1 = data.get(1).cloned().unwrap_or(0);
    match self.kind {
      EventKind::ProgramChange | EventKind::ChannelKeyPressure => (Event::NO_KEY, data0 as u16),
      EventKind::PitchBend => {
        let lsb = (data0 & 0x7f) as u16;
        let msb = (data1 & 0x7f) as u16;
        (Event::NO_KEY, (msb << 7) | lsb)
      }
      _ => (data0, data1 as u16),
    }
  }
}

/// What the byte at the cursor starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
  /// A channel voice message. When `running` the status byte was omitted and the cursor is
  /// already at the first data byte.
  Voice { status: VoiceStatus, running: bool },
  /// System exclusive, system common, real time or meta.
  System(u8),
  /// A data byte with no running status to attach it to.
  Orphan,
}

pub fn dispatch(byte: u8, running_status: Option<VoiceStatus>) -> Dispatch {
  if byte & 0x80 == 0 {
    running_status.map_or(Dispatch::Orphan, |status| Dispatch::Voice {
      status,
      running: true,
    })
  } else {
    VoiceStatus::from_status(byte).map_or(Dispatch::System(byte), |status| Dispatch::Voice {
      status,
      running: false,
    })
  }
}

/// Data length of the system common and real time messages that can show up in a track.
pub fn system_common_len(status: u8) -> Option<usize> {
  match status {
    // MIDI Time Code Quarter Frame, Song Select
    0xf1 | 0xf3 => Some(1),
    // Song Position Pointer
    0xf2 => Some(2),
    // Tune Request, Timing Clock, Start, Continue
    0xf6 | 0xf8 | 0xfa | 0xfb => Some(0),
    _ => None,
  }
}
