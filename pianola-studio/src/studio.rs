use std::fs::File;
use std::path::Path;

use log::{info, warn};

use pianola_engine::{Conversion, Pipeline};

use crate::config::calibration::Calibration;
use crate::config::Config;
use crate::errors::{Error, Result};
use crate::output;

pub struct Studio {
  config: Config,
}

impl Studio {
  pub fn new(config: Config) -> Result<Self> {
    Ok(Self { config })
  }

  pub fn with_calibration(mut self, path: &Path) -> Result<Self> {
    let calibration = Calibration::load(path)?;
    info!(
      "calibration {}: {} keys",
      path.display(),
      calibration.keys.len()
    );
    calibration.apply(&mut self.config.pipeline.notes);
    Ok(self)
  }

  /// Converts the input file and writes the selected events, returning how many were written.
  pub fn run(&self) -> Result<usize> {
    let input = &self.config.input;
    let data = std::fs::read(input).map_err(|source| Error::Read {
      path: input.clone(),
      source,
    })?;

    let conversion = self.convert(&data)?;

    let output = &self.config.output;
    let write_error = |source: std::io::Error| Error::Write {
      path: output.clone(),
      source,
    };
    let file = File::create(output).map_err(write_error)?;
    let written = output::write(
      self.config.format,
      &conversion.events,
      &self.config.filter,
      file,
    )
    .map_err(write_error)?;

    info!("{} events written to {}", written, output.display());
    Ok(written)
  }

  pub fn convert(&self, data: &[u8]) -> Result<Conversion> {
    let pipeline = Pipeline::with_config(self.config.pipeline.clone());
    let conversion = pipeline.run(data)?;
    Self::log_conversion(&conversion);
    Ok(conversion)
  }

  fn log_conversion(conversion: &Conversion) {
    let report = &conversion.report;
    info!(
      "{} events from {} tracks, {} tempo changes",
      report.events(),
      report.tracks.len(),
      report.tempo_points
    );
    if report.unhandled() > 0 {
      warn!("{} unhandled messages", report.unhandled());
    }
    if report.skipped_chunks > 0 {
      info!("{} unknown chunks skipped", report.skipped_chunks);
    }
    if let Some(overlaps) = conversion.overlaps {
      info!(
        "overlaps: {} moved, {} releases added, {} releases dropped",
        overlaps.shifted, overlaps.inserted, overlaps.deactivated
      );
    }
    if let Some(notes) = conversion.notes {
      info!(
        "notes: {} remapped, {} shortened, {} boosted, {} holds",
        notes.remapped, notes.pulled, notes.boosted, notes.holds
      );
    }
  }
}
