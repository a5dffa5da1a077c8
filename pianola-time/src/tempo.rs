use crate::Millis;

/// A tempo change, effective from `at_ms` onwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoPoint {
  pub at_ms: Millis,
  pub micros_per_quarter_note: u32,
}

impl TempoPoint {
  pub fn new(at_ms: Millis, micros_per_quarter_note: u32) -> Self {
    Self {
      at_ms,
      micros_per_quarter_note,
    }
  }
}

/// Insertion ordered list of tempo changes.
///
/// Lookups walk the points from the most recently recorded one backwards and return the first
/// one that is already in effect, so the newest recording wins when points were recorded out of
/// time order (e.g. tempo changes found in a later track).
#[derive(Debug, Clone, Default)]
pub struct TempoMap {
  points: Vec<TempoPoint>,
}

impl TempoMap {
  /// 120 BPM
  pub const DEFAULT_MICROS_PER_QUARTER_NOTE: u32 = 500_000;

  pub fn new() -> Self {
    Self { points: Vec::new() }
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  pub fn points(&self) -> &[TempoPoint] {
    &self.points
  }

  pub fn record_tempo(&mut self, at_ms: Millis, micros_per_quarter_note: u32) {
    self
      .points
      .push(TempoPoint::new(at_ms, micros_per_quarter_note));
  }

  pub fn lookup(&self, ms: Millis) -> u32 {
    self
      .lookup_index(ms)
      .map_or(Self::DEFAULT_MICROS_PER_QUARTER_NOTE, |index| {
        self.points[index].micros_per_quarter_note
      })
  }

  pub(crate) fn lookup_index(&self, ms: Millis) -> Option<usize> {
    self.points.iter().rposition(|point| point.at_ms <= ms)
  }

  /// Earliest time at which a point recorded after `index` would take over.
  pub(crate) fn next_change(&self, index: Option<usize>) -> Option<Millis> {
    let from = index.map_or(0, |index| index + 1);
    self.points[from..]
      .iter()
      .map(|point| point.at_ms)
      .reduce(f64::min)
  }
}
