use pianola_midi::SendMask;

const NUM_KEYS: usize = 128;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
  pub send_mask: SendMask,
  /// Rewrite zero velocity note ons as note offs right after parsing.
  pub collapse_zero_velocity: bool,
  pub resolve_overlaps: bool,
  pub post_process: bool,
  pub notes: NoteConfig,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      send_mask: SendMask::default(),
      collapse_zero_velocity: false,
      resolve_overlaps: false,
      post_process: false,
      notes: NoteConfig::default(),
    }
  }
}

/// Shaping of the notes for the playback device.
#[derive(Debug, Clone)]
pub struct NoteConfig {
  pub low_value: u16,
  pub high_value: u16,
  pub min_note_gap_ms: u32,
  /// Share of the span until the next strike that is cut from a note followed too closely.
  pub gap_fraction: f64,
  pub min_note_length_ms: u32,
  pub short_note_mult: f64,
  pub note_on_to_hold_ms: u32,
  pub hold_value: u16,
  pub curve: KeyCurve,
}

impl NoteConfig {
  pub const DEFAULT_LOW_VALUE: u16 = 135;
  pub const DEFAULT_HIGH_VALUE: u16 = 155;
  pub const DEFAULT_MIN_NOTE_GAP_MS: u32 = 80;
  pub const DEFAULT_GAP_FRACTION: f64 = 0.68;
  pub const DEFAULT_MIN_NOTE_LENGTH_MS: u32 = 90;
  pub const DEFAULT_SHORT_NOTE_MULT: f64 = 2.0;
  pub const DEFAULT_NOTE_ON_TO_HOLD_MS: u32 = 90;
  pub const DEFAULT_HOLD_VALUE: u16 = 75;

  /// Highest velocity a note on can carry.
  pub const MAX_VELOCITY: f64 = 127.0;
  /// Highest value the device accepts.
  pub const MAX_VALUE: u16 = 255;
}

impl Default for NoteConfig {
  fn default() -> Self {
    Self {
      low_value: Self::DEFAULT_LOW_VALUE,
      high_value: Self::DEFAULT_HIGH_VALUE,
      min_note_gap_ms: Self::DEFAULT_MIN_NOTE_GAP_MS,
      gap_fraction: Self::DEFAULT_GAP_FRACTION,
      min_note_length_ms: Self::DEFAULT_MIN_NOTE_LENGTH_MS,
      short_note_mult: Self::DEFAULT_SHORT_NOTE_MULT,
      note_on_to_hold_ms: Self::DEFAULT_NOTE_ON_TO_HOLD_MS,
      hold_value: Self::DEFAULT_HOLD_VALUE,
      curve: KeyCurve::default(),
    }
  }
}

/// Per key calibration of the volume remap: `velocity * coefficient + shift`, on the
/// normalized velocity.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyCurve {
  coefficients: [f64; NUM_KEYS],
  shifts: [f64; NUM_KEYS],
}

impl KeyCurve {
  pub const KEYS: usize = NUM_KEYS;

  pub fn neutral() -> Self {
    Self {
      coefficients: [1.0; Self::KEYS],
      shifts: [0.0; Self::KEYS],
    }
  }

  #[must_use]
  pub fn with_key(mut self, key: u8, coefficient: f64, shift: f64) -> Self {
    self.set(key, coefficient, shift);
    self
  }

  /// Keys out of range are ignored.
  pub fn set(&mut self, key: u8, coefficient: f64, shift: f64) {
    let key = key as usize;
    if key < Self::KEYS {
      self.coefficients[key] = coefficient;
      self.shifts[key] = shift;
    }
  }

  pub fn get(&self, key: u8) -> (f64, f64) {
    let key = key as usize;
    if key < Self::KEYS {
      (self.coefficients[key], self.shifts[key])
    } else {
      (1.0, 0.0)
    }
  }

  pub fn is_neutral(&self) -> bool {
    *self == Self::neutral()
  }
}

impl Default for KeyCurve {
  fn default() -> Self {
    Self::neutral()
  }
}
