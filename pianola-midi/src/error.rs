use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("Not a Standard MIDI File: missing MThd header chunk")]
  MissingHeader,

  #[error("Header chunk too short: {len} bytes")]
  InvalidHeader { len: usize },
}
