use std::path::PathBuf;

use thiserror::Error;

use pianola_engine as engine;

#[derive(Debug, Error)]
pub enum Error {
  #[error("Engine: {0}")]
  Engine(#[from] engine::Error),

  #[error("Reading {path}: {source}")]
  Read {
    path: PathBuf,
    source: std::io::Error,
  },

  #[error("Writing {path}: {source}")]
  Write {
    path: PathBuf,
    source: std::io::Error,
  },

  #[error("Calibration {path}: {source}")]
  Calibration {
    path: PathBuf,
    source: serde_json::Error,
  },

  #[error("Calibration {path}: key {key} is out of range")]
  CalibrationKey { path: PathBuf, key: u16 },
}

pub type Result<T> = core::result::Result<T, Error>;
