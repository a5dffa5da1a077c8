mod clock;
mod tempo;
mod timing;

pub use clock::Clock;
pub use tempo::{TempoMap, TempoPoint};
pub use timing::Timing;

/// Absolute or elapsed time in milliseconds, kept in double precision while parsing.
pub type Millis = f64;
