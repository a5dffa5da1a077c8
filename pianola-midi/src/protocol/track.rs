use log::{debug, info, warn};
use pianola_time::Millis;

use crate::context::ParserContext;
use crate::event::{Event, EventKind, EventSink, TimeMs};
use crate::protocol::meta;
use crate::protocol::status::{dispatch, system_common_len, Dispatch, VoiceStatus};
use crate::protocol::vlq;

const SYSEX_START_STATUS: u8 = 0xf0;
const SYSEX_ESCAPE_STATUS: u8 = 0xf7;
const META_STATUS: u8 = 0xff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
  Handled,
  Unhandled,
  /// The message runs past the end of the chunk.
  Truncated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackSummary {
  pub track: u16,
  pub events: usize,
  pub unhandled: usize,
  pub end_of_track: bool,
  pub duration_ms: Millis,
}

/// Decodes the events of a single track chunk.
///
/// Malformed data never stops the parser: a message that can not be recognised is counted as
/// unhandled, the time of its delta is taken back, and decoding goes on with the next byte.
pub struct TrackParser<'a> {
  data: &'a [u8],
  pos: usize,
  track: u16,
  time_ms: Millis,
  running_status: Option<VoiceStatus>,
  end_of_track: bool,
  events: usize,
  unhandled: usize,
}

impl<'a> TrackParser<'a> {
  pub fn new(data: &'a [u8], track: u16) -> Self {
    Self {
      data,
      pos: 0,
      track,
      time_ms: 0.0,
      running_status: None,
      end_of_track: false,
      events: 0,
      unhandled: 0,
    }
  }

  pub fn parse<S>(mut self, context: &mut ParserContext, sink: &mut S) -> TrackSummary
  where
    S: EventSink,
  {
    while self.pos < self.data.len() {
      if !self.step(context, sink) {
        break;
      }
    }

    info!(
      "track {}: {} events, unhandled messages: {}",
      self.track, self.events, self.unhandled
    );
    if !self.end_of_track {
      warn!("track {}: missing End of Track", self.track);
    }

    TrackSummary {
      track: self.track,
      events: self.events,
      unhandled: self.unhandled,
      end_of_track: self.end_of_track,
      duration_ms: self.time_ms,
    }
  }

  /// Decodes one delta time and the message following it. Returns false once the rest of the
  /// chunk can not be decoded.
  fn step<S: EventSink>(&mut self, context: &mut ParserContext, sink: &mut S) -> bool {
    let start = self.pos;
    let previous_ms = self.time_ms;

    let outcome = match vlq::decode(&self.data[self.pos..]) {
      Some((delta, len)) => {
        self.pos += len;
        self.time_ms += context.clock.convert(self.time_ms, delta);
        self.message(context, sink)
      }
      None => Outcome::Truncated,
    };

    match outcome {
      Outcome::Handled => true,
      Outcome::Unhandled => {
        self.unhandled(start, previous_ms);
        true
      }
      Outcome::Truncated => {
        self.unhandled(start, previous_ms);
        warn!(
          "track {}: message at offset {} runs past the end of the chunk",
          self.track, start
        );
        false
      }
    }
  }

  fn message<S: EventSink>(&mut self, context: &mut ParserContext, sink: &mut S) -> Outcome {
    let byte = match self.data.get(self.pos) {
      Some(byte) => *byte,
      None => return Outcome::Truncated,
    };

    match dispatch(byte, self.running_status) {
      Dispatch::Voice { status, running } => self.voice(status, running, context, sink),
      Dispatch::System(status) => self.system(status, context, sink),
      Dispatch::Orphan => {
        self.pos += 1;
        Outcome::Unhandled
      }
    }
  }

  fn voice<S: EventSink>(
    &mut self,
    status: VoiceStatus,
    running: bool,
    context: &ParserContext,
    sink: &mut S,
  ) -> Outcome {
    let data_start = if running { self.pos } else { self.pos + 1 };
    let data_end = data_start + status.data_len();
    let bytes = self.data;
    let data = match bytes.get(data_start..data_end) {
      Some(data) => data,
      None => return Outcome::Truncated,
    };

    self.pos = data_end;
    if !running {
      self.running_status = Some(status);
    }

    if context.send_mask.contains(status.kind) {
      let (key, value) = status.key_and_value(data);
      let event = Event::new(
        self.now(),
        status.kind,
        self.track,
        status.channel,
        key,
        value,
      );
      self.emit(event, sink);
    }
    Outcome::Handled
  }

  fn system<S: EventSink>(
    &mut self,
    status: u8,
    context: &mut ParserContext,
    sink: &mut S,
  ) -> Outcome {
    match status {
      SYSEX_START_STATUS | SYSEX_ESCAPE_STATUS => self.sysex(),
      META_STATUS => self.meta(context, sink),
      _ => match system_common_len(status) {
        Some(len) => self.skip_to(self.pos + 1 + len),
        None => {
          self.pos += 1;
          Outcome::Unhandled
        }
      },
    }
  }

  fn sysex(&mut self) -> Outcome {
    let len_start = self.pos + 1;
    match self.data.get(len_start..).and_then(vlq::decode) {
      Some((len, len_size)) => self.skip_to((len_start + len_size).saturating_add(len as usize)),
      None => Outcome::Truncated,
    }
  }

  fn meta<S: EventSink>(&mut self, context: &mut ParserContext, sink: &mut S) -> Outcome {
    let meta_type = match self.data.get(self.pos + 1) {
      Some(meta_type) => *meta_type,
      None => return Outcome::Truncated,
    };

    let len_start = self.pos + 2;
    let (len, len_size) = match self.data.get(len_start..).and_then(vlq::decode) {
      Some((len, len_size)) => (len as usize, len_size),
      None => return Outcome::Truncated,
    };

    let data = self.data;
    let payload_start = len_start + len_size;
    let payload_end = payload_start.saturating_add(len);
    let payload = match data.get(payload_start..payload_end) {
      Some(payload) => payload,
      None => return Outcome::Truncated,
    };
    self.pos = payload_end;

    if !meta::is_known(meta_type) {
      debug!(
        "track {}: unhandled meta {:02x} with {} bytes",
        self.track, meta_type, len
      );
      return Outcome::Unhandled;
    }

    if !meta::is_valid_len(meta_type, len) {
      warn!(
        "track {}: meta {:02x} declares {} bytes, expected {:?}",
        self.track,
        meta_type,
        len,
        meta::fixed_len(meta_type)
      );
    }

    match meta_type {
      meta::END_OF_TRACK => {
        self.end_of_track = true;
        if context.send_mask.contains(EventKind::TrackEnd) {
          self.emit(Event::track_end(self.now(), self.track), sink);
        }
        Outcome::Handled
      }
      meta::SET_TEMPO => match meta::tempo(payload) {
        Some(tempo) => {
          debug!(
            "track {}: tempo {} at {:.3} ms",
            self.track, tempo, self.time_ms
          );
          context.clock.record_tempo(self.time_ms, tempo);
          Outcome::Handled
        }
        None => Outcome::Unhandled,
      },
      _ => Outcome::Handled,
    }
  }

  fn skip_to(&mut self, pos: usize) -> Outcome {
    if pos <= self.data.len() {
      self.pos = pos;
      Outcome::Handled
    } else {
      Outcome::Truncated
    }
  }

  fn unhandled(&mut self, start: usize, previous_ms: Millis) {
    self.unhandled += 1;
    self.time_ms = previous_ms;
    if self.pos == start {
      self.pos += 1;
    }
    let end = (start + 8).min(self.data.len());
    debug!(
      "track {}: unhandled at offset {}: {:02x?}",
      self.track,
      start,
      &self.data[start..end]
    );
  }

  fn emit<S: EventSink>(&mut self, event: Event, sink: &mut S) {
    self.events += 1;
    sink.push_event(event);
  }

  fn now(&self) -> TimeMs {
    self.time_ms.round() as TimeMs
  }
}

#[cfg(test)]
mod tests {
  use pianola_time::Timing;

  use super::*;
  use crate::filter::SendMask;

  fn parse(bytes: Vec<u8>, context: &mut ParserContext) -> (Vec<Event>, TrackSummary) {
    let mut events = Vec::new();
    let summary = TrackParser::new(&bytes, 0).parse(context, &mut events);
    (events, summary)
  }

  fn assert_parses(bytes: Vec<u8>, expected: Vec<Event>) -> TrackSummary {
    let mut context = ParserContext::new(SendMask::new()).with_timing(Timing::metrical(480));
    let (events, summary) = parse(bytes, &mut context);
    assert_eq!(
      events, expected,
      "Unexpected result:\n    found: {:?}\n expected: {:?}\n",
      events, expected
    );
    summary
  }

  #[test]
  fn note_on_then_note_off_after_a_quarter_note() {
    let summary = assert_parses(
      vec![
        0x00, 0x90, 0x3c, 0x64, // note on
        0x83, 0x60, 0x80, 0x3c, 0x00, // note off after 480 ticks
        0x00, 0xff, 0x2f, 0x00, // end of track
      ],
      vec![
        Event::note_on(0, 0, 0, 60, 100),
        Event::note_off(500, 0, 0, 60, 0),
        Event::track_end(500, 0),
      ],
    );

    assert_eq!(summary.unhandled, 0);
    assert!(summary.end_of_track);
    assert_eq!(summary.events, 3);
  }

  #[test]
  fn running_status() {
    assert_parses(
      vec![
        0x00, 0x92, 0x3c, 0x64, // note on channel 2
        0x60, 0x3e, 0x50, // running status note on
        0x60, 0x3c, 0x00, // running status zero velocity note on
        0x00, 0xc2, 0x05, // program change
        0x60, 0x06, // running status program change
      ],
      vec![
        Event::note_on(0, 0, 2, 60, 100),
        Event::note_on(100, 0, 2, 62, 80),
        Event::note_on(200, 0, 2, 60, 0),
        Event::new(200, EventKind::ProgramChange, 0, 2, Event::NO_KEY, 5),
        Event::new(300, EventKind::ProgramChange, 0, 2, Event::NO_KEY, 6),
      ],
    );
  }

  #[test]
  fn running_status_survives_meta_events() {
    assert_parses(
      vec![
        0x00, 0xb0, 0x07, 0x64, // control change
        0x00, 0xff, 0x03, 0x02, b'h', b'i', // track name
        0x00, 0x0a, 0x40, // running status control change
      ],
      vec![
        Event::new(0, EventKind::ControlChange, 0, 0, 7, 100),
        Event::new(0, EventKind::ControlChange, 0, 0, 10, 64),
      ],
    );
  }

  #[test]
  fn all_voice_messages() {
    assert_parses(
      vec![
        0x00, 0x81, 0x3c, 0x40, // note off
        0x00, 0x91, 0x3c, 0x40, // note on
        0x00, 0xa1, 0x3c, 0x20, // aftertouch
        0x00, 0xb1, 0x40, 0x7f, // control change
        0x00, 0xc1, 0x13, // program change
        0x00, 0xd1, 0x55, // channel pressure
        0x00, 0xe1, 0x00, 0x40, // pitch bend center
      ],
      vec![
        Event::note_off(0, 0, 1, 60, 64),
        Event::note_on(0, 0, 1, 60, 64),
        Event::new(0, EventKind::Aftertouch, 0, 1, 60, 32),
        Event::new(0, EventKind::ControlChange, 0, 1, 64, 127),
        Event::new(0, EventKind::ProgramChange, 0, 1, Event::NO_KEY, 19),
        Event::new(0, EventKind::ChannelKeyPressure, 0, 1, Event::NO_KEY, 85),
        Event::new(0, EventKind::PitchBend, 0, 1, Event::NO_KEY, 0x2000),
      ],
    );
  }

  #[test]
  fn send_mask_filters_but_keeps_running_status() {
    let mut context = ParserContext::new(SendMask::new().with_kinds(&[EventKind::NoteOff]));
    let (events, summary) = parse(
      vec![
        0x00, 0x90, 0x3c, 0x64, // note on, filtered
        0x10, 0x3c, 0x00, // running status note on, filtered
        0x00, 0x80, 0x3c, 0x00, // note off
        0x00, 0xff, 0x2f, 0x00, // end of track, filtered
      ],
      &mut context,
    );

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::NoteOff);
    assert_eq!(summary.unhandled, 0);
    assert_eq!(summary.events, 1);
  }

  #[test]
  fn tempo_change_affects_later_deltas() {
    let mut context = ParserContext::new(SendMask::new()).with_timing(Timing::metrical(480));
    let (events, _) = parse(
      vec![
        0x00, 0xff, 0x51, 0x03, 0x0f, 0x42, 0x40, // 1000000 us per quarter note
        0x83, 0x60, 0x90, 0x3c, 0x64, // note on after one quarter note
        0x00, 0xff, 0x51, 0x03, 0x03, 0xd0, 0x90, // 250000 us per quarter note
        0x83, 0x60, 0x80, 0x3c, 0x00, // note off after one quarter note
      ],
      &mut context,
    );

    assert_eq!(
      events,
      vec![
        Event::note_on(1000, 0, 0, 60, 100),
        Event::note_off(1250, 0, 0, 60, 0),
      ]
    );
    assert_eq!(context.clock.tempo_map().len(), 2);
    assert_eq!(context.clock.tempo_map().lookup(1001.0), 250_000);
  }

  #[test]
  fn sysex_and_system_common_are_skipped() {
    let summary = assert_parses(
      vec![
        0x00, 0xf0, 0x03, 0x43, 0x12, 0xf7, // sysex
        0x00, 0xf7, 0x01, 0xf7, // sysex escape
        0x00, 0xf2, 0x10, 0x20, // song position
        0x00, 0xf6, // tune request
        0x00, 0x90, 0x3c, 0x64,
      ],
      vec![Event::note_on(0, 0, 0, 60, 100)],
    );
    assert_eq!(summary.unhandled, 0);
  }

  #[test]
  fn meta_events_are_skipped() {
    let summary = assert_parses(
      vec![
        0x00, 0xff, 0x00, 0x02, 0x00, 0x01, // sequence number
        0x00, 0xff, 0x01, 0x03, b'a', b'b', b'c', // text
        0x00, 0xff, 0x20, 0x01, 0x00, // channel prefix
        0x00, 0xff, 0x21, 0x01, 0x00, // port
        0x00, 0xff, 0x54, 0x05, 0x60, 0x00, 0x00, 0x00, 0x00, // smpte offset
        0x00, 0xff, 0x58, 0x04, 0x04, 0x02, 0x18, 0x08, // time signature
        0x00, 0xff, 0x59, 0x02, 0x00, 0x00, // key signature
        0x00, 0xff, 0x7f, 0x03, 0x00, 0x00, 0x41, // sequencer specific
        0x00, 0x90, 0x3c, 0x64,
      ],
      vec![Event::note_on(0, 0, 0, 60, 100)],
    );
    assert_eq!(summary.unhandled, 0);
  }

  #[test]
  fn unhandled_messages_roll_back_time() {
    let summary = assert_parses(
      vec![
        0x83, 0x60, 0x3c, // orphan data byte after 480 ticks
        0x83, 0x60, 0xf4, // undefined status after 480 ticks
        0x83, 0x60, 0xff, 0x30, 0x01, 0x00, // unknown meta after 480 ticks
        0x00, 0x90, 0x3c, 0x64,
      ],
      vec![Event::note_on(0, 0, 0, 60, 100)],
    );
    assert_eq!(summary.unhandled, 3);
  }

  #[test]
  fn events_after_end_of_track_are_still_parsed() {
    assert_parses(
      vec![
        0x00, 0xff, 0x2f, 0x00, // end of track
        0x00, 0x90, 0x3c, 0x64,
      ],
      vec![Event::track_end(0, 0), Event::note_on(0, 0, 0, 60, 100)],
    );
  }

  #[test]
  fn truncated_messages_stop_the_track() {
    let summary = assert_parses(
      vec![
        0x00, 0x90, 0x3c, 0x64, // note on
        0x00, 0x90, 0x3c, // note on missing its velocity
      ],
      vec![Event::note_on(0, 0, 0, 60, 100)],
    );
    assert_eq!(summary.unhandled, 1);
    assert!(!summary.end_of_track);

    let summary = assert_parses(vec![0x00, 0xff, 0x01, 0x10, b'a'], vec![]);
    assert_eq!(summary.unhandled, 1);

    let summary = assert_parses(vec![0x81, 0x80], vec![]);
    assert_eq!(summary.unhandled, 1);
  }

  #[test]
  fn fixed_timing_ignores_tempo() {
    let mut context = ParserContext::new(SendMask::new()).with_timing(Timing::timecode(25, 40));
    let (events, _) = parse(
      vec![
        0x00, 0xff, 0x51, 0x03, 0x0f, 0x42, 0x40, // tempo is recorded but unused
        0x64, 0x90, 0x3c, 0x64, // note on after 100 ticks
      ],
      &mut context,
    );

    assert_eq!(events, vec![Event::note_on(100, 0, 0, 60, 100)]);
    assert_eq!(context.clock.tempo_map().len(), 1);
  }
}
