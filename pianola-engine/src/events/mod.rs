pub mod store;

pub use pianola_midi::{Event, EventKind};
