mod args;
mod config;
mod errors;
mod output;
mod studio;

use anyhow::Context;
use clap::Parser;

use crate::args::Args;
use crate::studio::Studio;

fn main() -> anyhow::Result<()> {
  let args = Args::parse();

  let default_filter = if args.verbose { "debug" } else { "info" };
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
    .format_timestamp_millis()
    .init();

  let mut studio = Studio::new(args.config())?;
  if let Some(path) = args.calibration.as_deref() {
    studio = studio.with_calibration(path)?;
  }

  studio
    .run()
    .with_context(|| format!("converting {}", args.input.display()))?;

  Ok(())
}
