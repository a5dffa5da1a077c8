use pianola_midi::{Event, EventKind, EventSink};

/// Append only collection of events.
///
/// Events are never removed, the passes that rewrite the store deactivate them instead.
#[derive(Debug, Clone)]
pub struct EventStore {
  data: Vec<Event>,
  sorted: bool,
}

impl EventStore {
  pub fn new() -> Self {
    Self::with_capacity(0)
  }

  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      data: Vec::with_capacity(capacity),
      sorted: true,
    }
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  pub fn is_sorted(&self) -> bool {
    self.sorted
  }

  pub fn push(&mut self, event: Event) {
    self.sorted = self.sorted
      && self
        .data
        .last()
        .map_or(true, |last_event| event.time_ms >= last_event.time_ms);
    self.data.push(event);
  }

  /// Orders the events by time. Nothing can be assumed about the order of simultaneous events.
  pub fn sort(&mut self) {
    if !self.sorted {
      self.data.sort_by_key(|event| event.time_ms);
      self.sorted = true;
    }
  }

  pub fn get(&self, index: usize) -> Option<&Event> {
    self.data.get(index)
  }

  /// Mutable access to an event. The store is considered unsorted afterwards.
  pub fn get_mut(&mut self, index: usize) -> Option<&mut Event> {
    self.sorted = false;
    self.data.get_mut(index)
  }

  pub fn as_slice(&self) -> &[Event] {
    &self.data
  }

  pub fn iter(&self) -> Iter<'_> {
    Iter(self.data.iter())
  }

  pub fn active(&self) -> impl Iterator<Item = &Event> {
    self.data.iter().filter(|event| event.is_active())
  }

  /// Turns every zero velocity note on into a note off.
  pub fn collapse_zero_velocity(&mut self) -> usize {
    let mut collapsed = 0;
    for event in self.data.iter_mut() {
      if event.kind == EventKind::NoteOn && event.value == 0 {
        event.kind = EventKind::NoteOff;
        collapsed += 1;
      }
    }
    collapsed
  }
}

impl Default for EventStore {
  fn default() -> Self {
    Self::new()
  }
}

impl EventSink for EventStore {
  fn push_event(&mut self, event: Event) {
    self.push(event);
  }
}

impl FromIterator<Event> for EventStore {
  fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
    iter.into_iter().fold(Self::new(), |mut store, event| {
      store.push(event);
      store
    })
  }
}

impl<'a> IntoIterator for &'a EventStore {
  type Item = &'a Event;
  type IntoIter = Iter<'a>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

pub struct Iter<'a>(std::slice::Iter<'a, Event>);

impl<'a> Iterator for Iter<'a> {
  type Item = &'a Event;

  fn next(&mut self) -> Option<Self::Item> {
    self.0.next()
  }
}
