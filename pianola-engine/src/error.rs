use thiserror::Error;

use pianola_midi as midi;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("Midi: {0}")]
  Midi(#[from] midi::Error),
}
