mod config;
mod error;
pub mod events;
mod notes;
mod overlap;
mod pipeline;

pub use crate::config::{KeyCurve, NoteConfig, PipelineConfig};
pub use crate::error::{Error, Result};
pub use crate::events::store::EventStore;
pub use crate::notes::{NotePostProcessor, NoteStats};
pub use crate::overlap::{OverlapResolver, OverlapStats};
pub use crate::pipeline::{Conversion, Pipeline};
