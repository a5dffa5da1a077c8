use pianola_time::{Clock, Timing};

use crate::filter::SendMask;

/// State shared by the parsers of all the chunks in a file.
#[derive(Debug, Clone, Default)]
pub struct ParserContext {
  pub clock: Clock,
  pub send_mask: SendMask,
  next_track: u16,
}

impl ParserContext {
  pub fn new(send_mask: SendMask) -> Self {
    Self {
      clock: Clock::default(),
      send_mask,
      next_track: 0,
    }
  }

  pub fn with_timing(mut self, timing: Timing) -> Self {
    self.clock.set_timing(timing);
    self
  }

  /// Index for the next track chunk, in file order.
  pub fn next_track(&mut self) -> u16 {
    let track = self.next_track;
    self.next_track = self.next_track.saturating_add(1);
    track
  }

  pub fn num_tracks(&self) -> u16 {
    self.next_track
  }
}
