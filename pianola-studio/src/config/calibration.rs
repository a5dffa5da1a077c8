use std::path::Path;

use serde::Deserialize;

use pianola_engine::{KeyCurve, NoteConfig};

use crate::errors::{Error, Result};

/// Device calibration loaded from a JSON file.
///
/// ```json
/// { "low": 130, "high": 160, "keys": [{ "key": 60, "coefficient": 1.2, "shift": -0.05 }] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Calibration {
  pub low: Option<u16>,
  pub high: Option<u16>,
  #[serde(default)]
  pub keys: Vec<KeyCalibration>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyCalibration {
  pub key: u16,
  #[serde(default = "KeyCalibration::neutral_coefficient")]
  pub coefficient: f64,
  #[serde(default)]
  pub shift: f64,
}

impl KeyCalibration {
  fn neutral_coefficient() -> f64 {
    1.0
  }
}

impl Calibration {
  pub fn load(path: &Path) -> Result<Self> {
    let data = std::fs::read_to_string(path).map_err(|source| Error::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let calibration = Self::from_json(&data).map_err(|source| Error::Calibration {
      path: path.to_path_buf(),
      source,
    })?;

    match calibration.out_of_range_key() {
      Some(key) => Err(Error::CalibrationKey {
        path: path.to_path_buf(),
        key,
      }),
      None => Ok(calibration),
    }
  }

  pub fn from_json(data: &str) -> serde_json::Result<Self> {
    serde_json::from_str(data)
  }

  pub fn out_of_range_key(&self) -> Option<u16> {
    self
      .keys
      .iter()
      .map(|calibration| calibration.key)
      .find(|key| usize::from(*key) >= KeyCurve::KEYS)
  }

  pub fn apply(&self, notes: &mut NoteConfig) {
    if let Some(low) = self.low {
      notes.low_value = low.min(NoteConfig::MAX_VALUE);
    }
    if let Some(high) = self.high {
      notes.high_value = high.min(NoteConfig::MAX_VALUE);
    }
    for calibration in self.keys.iter() {
      if let Ok(key) = u8::try_from(calibration.key) {
        notes.curve.set(key, calibration.coefficient, calibration.shift);
      }
    }
  }
}
