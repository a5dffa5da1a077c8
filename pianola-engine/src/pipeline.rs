use log::debug;
use pianola_midi::{FileParser, ParseReport};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::events::store::EventStore;
use crate::notes::{NotePostProcessor, NoteStats};
use crate::overlap::{OverlapResolver, OverlapStats};

/// Outcome of converting one file.
#[derive(Debug, Clone)]
pub struct Conversion {
  /// Sorted by time. Inactive events are kept and must be skipped by the writers.
  pub events: EventStore,
  pub report: ParseReport,
  pub collapsed: usize,
  pub overlaps: Option<OverlapStats>,
  pub notes: Option<NoteStats>,
}

/// Runs parsing and the optional passes over the events of a file, in order.
pub struct Pipeline {
  config: PipelineConfig,
}

impl Pipeline {
  pub fn new() -> Self {
    Self::with_config(PipelineConfig::default())
  }

  pub fn with_config(config: PipelineConfig) -> Self {
    Self { config }
  }

  pub fn run(&self, data: &[u8]) -> Result<Conversion> {
    let mut events = EventStore::with_capacity(data.len() / 3);
    let mut parser = FileParser::new(self.config.send_mask);
    let report = parser.parse(data, &mut events)?;
    debug!(
      "parsed {} events from {} tracks",
      events.len(),
      report.tracks.len()
    );

    let collapsed = if self.config.collapse_zero_velocity {
      let collapsed = events.collapse_zero_velocity();
      debug!("{} zero velocity note ons turned into note offs", collapsed);
      collapsed
    } else {
      0
    };

    events.sort();

    let overlaps = self
      .config
      .resolve_overlaps
      .then(|| OverlapResolver::new().resolve(&mut events));

    let notes = self
      .config
      .post_process
      .then(|| NotePostProcessor::new(self.config.notes.clone()).process(&mut events));

    Ok(Conversion {
      events,
      report,
      collapsed,
      overlaps,
      notes,
    })
  }
}

impl Default for Pipeline {
  fn default() -> Self {
    Self::new()
  }
}
