use crate::tempo::TempoMap;
use crate::timing::Timing;
use crate::Millis;

/// Converts tick deltas into elapsed milliseconds.
///
/// In metrical mode every tick is resampled against the tempo map, accumulating the
/// instantaneous tick length in double precision. A tempo change recorded while parsing affects
/// every tick converted afterwards, in any track.
#[derive(Debug, Clone, Default)]
pub struct Clock {
  timing: Timing,
  tempo_map: TempoMap,
}

impl Clock {
  pub fn new(timing: Timing) -> Self {
    Self {
      timing,
      tempo_map: TempoMap::new(),
    }
  }

  pub fn set_timing(&mut self, timing: Timing) {
    self.timing = timing;
  }

  pub fn tempo_map(&self) -> &TempoMap {
    &self.tempo_map
  }

  pub fn record_tempo(&mut self, at_ms: Millis, micros_per_quarter_note: u32) {
    self.tempo_map.record_tempo(at_ms, micros_per_quarter_note);
  }

  /// Milliseconds elapsed after `delta_ticks` ticks starting at `start_ms`.
  pub fn convert(&self, start_ms: Millis, delta_ticks: u32) -> Millis {
    match self.timing {
      Timing::Timecode { .. } => {
        let ratio = self.timing.fixed_ratio().unwrap_or(1.0);
        f64::from(delta_ticks) * ratio
      }
      Timing::Metrical {
        ticks_per_quarter_note,
      } => self.integrate(start_ms, delta_ticks, ticks_per_quarter_note),
    }
  }

  fn integrate(&self, start_ms: Millis, delta_ticks: u32, ticks_per_quarter_note: u16) -> Millis {
    let ticks_per_quarter_note = f64::from(ticks_per_quarter_note.max(1));
    let tick_length = |index: Option<usize>| {
      let tempo = index.map_or(TempoMap::DEFAULT_MICROS_PER_QUARTER_NOTE, |index| {
        self.tempo_map.points()[index].micros_per_quarter_note
      });
      f64::from(tempo) / 1000.0 / ticks_per_quarter_note
    };

    // the point in effect can only move forward while time advances, so it is looked up again
    // only once the time reaches the next candidate point
    let mut current_ms = start_ms;
    let mut index = self.tempo_map.lookup_index(current_ms);
    let mut next_change = self.tempo_map.next_change(index);
    let mut ms_per_tick = tick_length(index);

    for _ in 0..delta_ticks {
      if next_change.map_or(false, |at_ms| at_ms <= current_ms) {
        index = self.tempo_map.lookup_index(current_ms);
        next_change = self.tempo_map.next_change(index);
        ms_per_tick = tick_length(index);
      }
      current_ms += ms_per_tick;
    }

    current_ms - start_ms
  }
}
