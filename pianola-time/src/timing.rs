/// Timing parameters taken from the header chunk, fixed for the whole file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timing {
  /// Tick based timing, tick length follows the tempo map.
  Metrical { ticks_per_quarter_note: u16 },
  /// SMPTE frame based timing, tempo meta events are ignored.
  Timecode {
    frames_per_second: u8,
    ticks_per_frame: u8,
  },
}

impl Timing {
  pub const DEFAULT_TICKS_PER_QUARTER_NOTE: u16 = 480;

  pub fn metrical(ticks_per_quarter_note: u16) -> Self {
    Self::Metrical {
      ticks_per_quarter_note,
    }
  }

  pub fn timecode(frames_per_second: u8, ticks_per_frame: u8) -> Self {
    Self::Timecode {
      frames_per_second,
      ticks_per_frame,
    }
  }

  /// Decodes the 16 bits division field of the header chunk.
  pub fn from_division(division: [u8; 2]) -> Self {
    if division[0] & 0x80 == 0 {
      Self::metrical(u16::from_be_bytes(division))
    } else {
      // the upper byte holds the negated frame rate (-24, -25, -29, -30)
      let frames_per_second = (division[0] as i8).unsigned_abs();
      Self::timecode(frames_per_second, division[1])
    }
  }

  /// The constant ratio used in frame based mode.
  pub fn fixed_ratio(&self) -> Option<f64> {
    match *self {
      Self::Metrical { .. } => None,
      Self::Timecode {
        frames_per_second,
        ticks_per_frame,
      } => Some(f64::from(ticks_per_frame) * f64::from(frames_per_second) / 1000.0),
    }
  }
}

impl Default for Timing {
  fn default() -> Self {
    Self::metrical(Self::DEFAULT_TICKS_PER_QUARTER_NOTE)
  }
}

impl std::fmt::Display for Timing {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Metrical {
        ticks_per_quarter_note,
      } => write!(f, "tpqn {}", ticks_per_quarter_note),
      Self::Timecode {
        frames_per_second,
        ticks_per_frame,
      } => write!(f, "fps {}, tpf {}", frames_per_second, ticks_per_frame),
    }
  }
}
