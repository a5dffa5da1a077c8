pub mod context;
pub mod error;
pub mod event;
pub mod filter;
pub mod protocol;

pub use context::ParserContext;
pub use error::{Error, Result};
pub use event::{Event, EventKind, EventSink, TimeMs};
pub use filter::{OutputFilter, SendMask};
pub use protocol::file::{FileParser, Header, ParseReport};
pub use protocol::track::{TrackParser, TrackSummary};
