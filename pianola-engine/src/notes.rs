use log::debug;
use pianola_midi::TimeMs;

use crate::config::NoteConfig;
use crate::events::store::EventStore;

const KEY_SLOTS: usize = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoteStats {
  pub remapped: usize,
  pub pulled: usize,
  pub boosted: usize,
  pub holds: usize,
}

/// A strike together with the release that ends it and the strike that follows, as indices into
/// the store.
#[derive(Debug, Clone, Copy)]
struct Note {
  strike: usize,
  release: Option<usize>,
  next_strike: Option<usize>,
  /// Strike on the same key before the release, when overlaps were not resolved. The release
  /// then belongs to that later strike.
  interrupted_by: Option<usize>,
}

/// Shapes the notes for a mechanical player.
///
/// Velocities are remapped into the range the device accepts, notes that are struck again too
/// soon are released earlier, short notes are played louder, and long notes get a hold event
/// that lowers the actuator power after the initial strike.
pub struct NotePostProcessor {
  config: NoteConfig,
}

impl NotePostProcessor {
  pub fn new(config: NoteConfig) -> Self {
    Self { config }
  }

  pub fn process(&self, store: &mut EventStore) -> NoteStats {
    store.sort();

    let mut stats = NoteStats {
      remapped: self.remap_volumes(store),
      ..NoteStats::default()
    };

    let notes = Self::notes(store);
    for note in notes.iter() {
      self.reshape(store, note, &mut stats);
    }
    stats.holds = self.insert_holds(store, &notes);

    store.sort();

    debug!(
      "notes: {} remapped, {} releases pulled, {} boosted, {} holds",
      stats.remapped, stats.pulled, stats.boosted, stats.holds
    );
    stats
  }

  /// Output value for a note on velocity.
  pub fn remap(&self, key: u8, velocity: u16) -> u16 {
    let (coefficient, shift) = self.config.curve.get(key);
    let normalized = f64::from(velocity) / NoteConfig::MAX_VELOCITY;
    let normalized = (normalized * coefficient + shift).clamp(0.0, 1.0);
    let low = self.config.low_value.min(self.config.high_value);
    let high = self.config.high_value.max(self.config.low_value);
    let span = f64::from(high - low);
    low + (normalized * span).round() as u16
  }

  /// Value of a strike whose note lasts only `length_ms`.
  pub fn boost(&self, value: u16, length_ms: TimeMs) -> u16 {
    let min_length = f64::from(self.config.min_note_length_ms);
    if min_length <= 0.0 || f64::from(length_ms) >= min_length {
      return value;
    }
    let missing = (min_length - f64::from(length_ms)) / min_length;
    let factor = 1.0 + (self.config.short_note_mult - 1.0) * missing * missing;
    let boosted = (f64::from(value) * factor).round();
    boosted.clamp(0.0, f64::from(NoteConfig::MAX_VALUE)) as u16
  }

  fn remap_volumes(&self, store: &mut EventStore) -> usize {
    let strikes = store
      .iter()
      .enumerate()
      .filter(|(_, event)| event.is_active() && event.is_strike())
      .map(|(index, _)| index)
      .collect::<Vec<_>>();

    for index in strikes.iter().copied() {
      if let Some(event) = store.get_mut(index) {
        event.value = self.remap(event.key, event.value);
      }
    }
    strikes.len()
  }

  fn notes(store: &EventStore) -> Vec<Note> {
    let mut chains = vec![Vec::new(); KEY_SLOTS];
    for (index, event) in store.iter().enumerate() {
      if event.is_active() && event.kind.is_note() {
        chains[event.key as usize].push(index);
      }
    }

    let is_strike = |index: &usize| store.get(*index).map_or(false, |event| event.is_strike());
    let is_release = |index: &usize| store.get(*index).map_or(false, |event| event.is_release());

    let mut notes = Vec::new();
    for chain in chains.iter() {
      for (position, strike) in chain.iter().enumerate() {
        if !is_strike(strike) {
          continue;
        }
        let following = &chain[position + 1..];
        let release_position = following.iter().position(is_release);
        let release = release_position.map(|position| following[position]);
        let next_strike = release_position.and_then(|release_position| {
          following[release_position + 1..]
            .iter()
            .copied()
            .find(|index| is_strike(index))
        });
        let interrupted_by = following[..release_position.unwrap_or(following.len())]
          .iter()
          .copied()
          .find(|index| is_strike(index));
        notes.push(Note {
          strike: *strike,
          release,
          next_strike,
          interrupted_by,
        });
      }
    }
    notes
  }

  fn reshape(&self, store: &mut EventStore, note: &Note, stats: &mut NoteStats) {
    if note.interrupted_by.is_some() {
      return;
    }

    let time_of = |store: &EventStore, index: usize| store.get(index).map(|event| event.time_ms);

    let (start_ms, value) = match store.get(note.strike) {
      Some(event) => (event.time_ms, event.value),
      None => return,
    };
    let release_ms = match note.release.and_then(|index| time_of(store, index)) {
      Some(release_ms) => release_ms,
      None => return,
    };

    let mut end_ms = release_ms;
    if let Some(next_ms) = note.next_strike.and_then(|index| time_of(store, index)) {
      if next_ms.saturating_sub(release_ms) < self.config.min_note_gap_ms {
        let span = f64::from(next_ms.saturating_sub(start_ms));
        let kept = ((1.0 - self.config.gap_fraction) * span).round() as TimeMs;
        let target_ms = start_ms.saturating_add(kept.max(1));
        if target_ms < release_ms {
          if let Some(release) = note.release {
            if let Some(event) = store.get_mut(release) {
              event.time_ms = target_ms;
            }
          }
          end_ms = target_ms;
          stats.pulled += 1;
        }
      }
    }

    let boosted = self.boost(value, end_ms.saturating_sub(start_ms));
    if boosted != value {
      if let Some(strike) = store.get_mut(note.strike) {
        strike.value = boosted;
      }
      stats.boosted += 1;
    }
  }

  fn insert_holds(&self, store: &mut EventStore, notes: &[Note]) -> usize {
    let hold_ms = self.config.note_on_to_hold_ms;

    let mut holds = Vec::new();
    for note in notes.iter() {
      let strike = match store.get(note.strike) {
        Some(strike) => *strike,
        None => continue,
      };
      let release_ms = note
        .interrupted_by
        .or(note.release)
        .and_then(|index| store.get(index))
        .map(|release| release.time_ms);
      let hold_at = strike.time_ms.saturating_add(hold_ms);
      if release_ms.map_or(true, |release_ms| release_ms > hold_at) {
        let mut hold = strike.at(hold_at);
        hold.value = self.config.hold_value;
        holds.push(hold);
      }
    }

    let count = holds.len();
    for hold in holds {
      store.push(hold);
    }
    count
  }
}

impl Default for NotePostProcessor {
  fn default() -> Self {
    Self::new(NoteConfig::default())
  }
}

#[cfg(test)]
mod tests {
  use pianola_midi::{Event, EventKind};

  use super::*;
  use crate::config::KeyCurve;

  fn store(events: Vec<Event>) -> EventStore {
    events.into_iter().collect()
  }

  fn active(store: &EventStore) -> Vec<(TimeMs, EventKind, u8, u16)> {
    store
      .active()
      .map(|event| (event.time_ms, event.kind, event.key, event.value))
      .collect()
  }

  #[test]
  fn remap_into_device_range() {
    let processor = NotePostProcessor::default();
    assert_eq!(processor.remap(60, 127), 155);
    assert_eq!(processor.remap(60, 100), 151);
    assert_eq!(processor.remap(60, 64), 145);
    assert_eq!(processor.remap(60, 1), 135);
    assert_eq!(processor.remap(60, 255), 155);
  }

  #[test]
  fn remap_with_key_curve() {
    let config = NoteConfig {
      curve: KeyCurve::neutral()
        .with_key(60, 0.5, 0.0)
        .with_key(61, 1.0, -1.0),
      ..NoteConfig::default()
    };
    let processor = NotePostProcessor::new(config);
    assert_eq!(processor.remap(60, 100), 143);
    assert_eq!(processor.remap(61, 100), 135);
    assert_eq!(processor.remap(62, 100), 151);
  }

  #[test]
  fn boost_has_quadratic_falloff() {
    let processor = NotePostProcessor::default();
    assert_eq!(processor.boost(151, 16), 253);
    assert_eq!(processor.boost(151, 60), 168);
    assert_eq!(processor.boost(143, 45), 179);
    assert_eq!(processor.boost(151, 90), 151);
    assert_eq!(processor.boost(200, 0), 255);
  }

  #[test]
  fn note_struck_again_too_soon_is_shortened_and_boosted() {
    let mut store = store(vec![
      Event::note_on(0, 0, 0, 60, 100),
      Event::note_off(49, 0, 0, 60, 0),
      Event::note_on(50, 0, 0, 60, 100),
      Event::note_off(500, 0, 0, 60, 0),
    ]);

    let stats = NotePostProcessor::default().process(&mut store);

    assert_eq!(
      stats,
      NoteStats {
        remapped: 2,
        pulled: 1,
        boosted: 1,
        holds: 1
      }
    );
    assert_eq!(
      active(&store),
      vec![
        (0, EventKind::NoteOn, 60, 253),
        (16, EventKind::NoteOff, 60, 0),
        (50, EventKind::NoteOn, 60, 151),
        (140, EventKind::NoteOn, 60, 75),
        (500, EventKind::NoteOff, 60, 0),
      ]
    );
  }

  #[test]
  fn well_spaced_notes_keep_their_releases() {
    let mut store = store(vec![
      Event::note_on(0, 0, 0, 60, 127),
      Event::note_on(0, 0, 0, 64, 127),
      Event::note_off(80, 0, 0, 64, 0),
      Event::note_off(200, 0, 0, 60, 0),
      Event::note_on(400, 0, 0, 60, 127),
      Event::note_on(450, 0, 0, 60, 0),
    ]);

    let stats = NotePostProcessor::default().process(&mut store);

    assert_eq!(stats.pulled, 0);
    assert_eq!(stats.boosted, 2);
    assert_eq!(stats.holds, 1);
    assert_eq!(
      active(&store),
      vec![
        (0, EventKind::NoteOn, 60, 155),
        (0, EventKind::NoteOn, 64, 157),
        (80, EventKind::NoteOff, 64, 0),
        (90, EventKind::NoteOn, 60, 75),
        (200, EventKind::NoteOff, 60, 0),
        (400, EventKind::NoteOn, 60, 186),
        (450, EventKind::NoteOn, 60, 0),
      ]
    );
  }

  #[test]
  fn release_is_pulled_when_the_key_stays_up_too_briefly() {
    let mut store = store(vec![
      Event::note_on(0, 0, 0, 60, 127),
      Event::note_off(200, 0, 0, 60, 0),
      Event::note_on(250, 0, 0, 60, 127),
      Event::note_off(600, 0, 0, 60, 0),
    ]);

    let stats = NotePostProcessor::default().process(&mut store);

    assert_eq!(stats.pulled, 1);
    assert_eq!(stats.boosted, 1);
    assert_eq!(
      active(&store),
      vec![
        (0, EventKind::NoteOn, 60, 157),
        (80, EventKind::NoteOff, 60, 0),
        (250, EventKind::NoteOn, 60, 155),
        (340, EventKind::NoteOn, 60, 75),
        (600, EventKind::NoteOff, 60, 0),
      ]
    );
  }

  #[test]
  fn short_note_is_boosted_without_a_following_strike() {
    let mut store = store(vec![
      Event::note_on(0, 0, 0, 60, 127),
      Event::note_off(50, 0, 0, 60, 0),
    ]);

    let stats = NotePostProcessor::default().process(&mut store);

    assert_eq!(
      stats,
      NoteStats {
        remapped: 1,
        pulled: 0,
        boosted: 1,
        holds: 0
      }
    );
    assert_eq!(
      active(&store),
      vec![
        (0, EventKind::NoteOn, 60, 186),
        (50, EventKind::NoteOff, 60, 0),
      ]
    );
  }

  #[test]
  fn strike_without_its_own_release_is_not_reshaped() {
    let mut store = store(vec![
      Event::note_on(0, 0, 0, 60, 127),
      Event::note_on(30, 0, 0, 60, 127),
      Event::note_off(60, 0, 0, 60, 0),
      Event::note_on(100, 0, 0, 60, 127),
      Event::note_off(400, 0, 0, 60, 0),
    ]);

    let stats = NotePostProcessor::default().process(&mut store);

    assert_eq!(
      stats,
      NoteStats {
        remapped: 3,
        pulled: 1,
        boosted: 1,
        holds: 1
      }
    );
    assert_eq!(
      active(&store),
      vec![
        (0, EventKind::NoteOn, 60, 155),
        (30, EventKind::NoteOn, 60, 243),
        (52, EventKind::NoteOff, 60, 0),
        (100, EventKind::NoteOn, 60, 155),
        (190, EventKind::NoteOn, 60, 75),
        (400, EventKind::NoteOff, 60, 0),
      ]
    );
  }

  #[test]
  fn unreleased_note_gets_hold() {
    let mut store = store(vec![Event::note_on(10, 3, 1, 70, 127)]);

    let stats = NotePostProcessor::default().process(&mut store);

    assert_eq!(stats.holds, 1);
    let hold = store.get(1).expect("hold");
    assert_eq!(hold.time_ms, 100);
    assert_eq!(hold.kind, EventKind::NoteOn);
    assert_eq!((hold.track, hold.channel, hold.key, hold.value), (3, 1, 70, 75));
  }

  #[test]
  fn inactive_and_other_events_are_left_alone() {
    let mut inactive = Event::note_on(0, 0, 0, 60, 100);
    inactive.deactivate();
    let mut store = store(vec![
      inactive,
      Event::new(0, EventKind::ControlChange, 0, 0, 64, 127),
      Event::new(5, EventKind::PitchBend, 0, 0, Event::NO_KEY, 8192),
    ]);

    let stats = NotePostProcessor::default().process(&mut store);

    assert_eq!(stats, NoteStats::default());
    assert_eq!(store.len(), 3);
    assert_eq!(store.get(0).map(|event| event.value), Some(100));
  }
}
