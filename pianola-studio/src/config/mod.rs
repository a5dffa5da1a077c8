pub mod calibration;

use std::path::PathBuf;

use pianola_engine::PipelineConfig;
use pianola_midi::OutputFilter;

use crate::output::Format;

#[derive(Debug, Clone, Default)]
pub struct Config {
  pub input: PathBuf,
  pub output: PathBuf,
  pub format: Format,
  pub pipeline: PipelineConfig,
  pub filter: OutputFilter,
}
