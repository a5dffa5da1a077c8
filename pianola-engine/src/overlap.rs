use log::debug;
use pianola_midi::{Event, TimeMs};

use crate::events::store::EventStore;

/// Any key byte can show up in a note event, not only 0-127.
const KEY_SLOTS: usize = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlapStats {
  pub shifted: usize,
  pub inserted: usize,
  pub deactivated: usize,
}

impl OverlapStats {
  pub fn is_empty(&self) -> bool {
    self.shifted == 0 && self.inserted == 0 && self.deactivated == 0
  }
}

/// Makes the note events of every key alternate between strikes and releases.
///
/// A strike on a key that is still held gets a release inserted right before it, a release of a
/// key that is not held is deactivated, and note events of a key never share the same
/// millisecond: the later one is moved forward.
pub struct OverlapResolver {
  held: [bool; KEY_SLOTS],
  last_ms: [Option<TimeMs>; KEY_SLOTS],
}

impl OverlapResolver {
  pub fn new() -> Self {
    Self {
      held: [false; KEY_SLOTS],
      last_ms: [None; KEY_SLOTS],
    }
  }

  pub fn resolve(mut self, store: &mut EventStore) -> OverlapStats {
    store.sort();

    let mut stats = OverlapStats::default();
    let mut inserted = Vec::new();

    for index in 0..store.len() {
      let note = match store.get(index) {
        Some(event) if event.is_active() && event.kind.is_note() => *event,
        _ => continue,
      };
      let key = note.key as usize;

      if note.is_release() && !self.held[key] {
        if let Some(event) = store.get_mut(index) {
          event.deactivate();
        }
        stats.deactivated += 1;
        continue;
      }

      let mut time_ms = match self.last_ms[key] {
        Some(last_ms) if note.time_ms <= last_ms => {
          stats.shifted += 1;
          last_ms.saturating_add(1)
        }
        _ => note.time_ms,
      };

      if note.is_strike() {
        if self.held[key] {
          let last_ms = self.last_ms[key].unwrap_or(0);
          let release_ms = time_ms.saturating_sub(1).max(last_ms.saturating_add(1));
          if release_ms >= time_ms {
            time_ms = release_ms.saturating_add(1);
            stats.shifted += 1;
          }
          inserted.push(Event::note_off(
            release_ms,
            note.track,
            note.channel,
            note.key,
            0,
          ));
        }
        self.held[key] = true;
      } else {
        self.held[key] = false;
      }

      if time_ms != note.time_ms {
        if let Some(event) = store.get_mut(index) {
          event.time_ms = time_ms;
        }
      }
      self.last_ms[key] = Some(time_ms);
    }

    stats.inserted = inserted.len();
    for event in inserted {
      store.push(event);
    }
    store.sort();

    debug!(
      "overlaps: {} shifted, {} releases inserted, {} releases deactivated",
      stats.shifted, stats.inserted, stats.deactivated
    );
    stats
  }
}

impl Default for OverlapResolver {
  fn default() -> Self {
    Self::new()
  }
}
