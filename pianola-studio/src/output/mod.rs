mod csv;
mod script;

use std::io::{self, Write};

use clap::ValueEnum;

use pianola_engine::EventStore;
use pianola_midi::{Event, OutputFilter};

pub use self::csv::CsvWriter;
pub use self::script::ScriptWriter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
  /// `time_ms,track,channel,kind,key,value` lines
  #[default]
  Csv,
  /// Serial commands for the player firmware
  Script,
}

/// Serializes one event per line.
pub trait EventWriter {
  fn write_event(&mut self, event: &Event) -> io::Result<()>;

  fn flush(&mut self) -> io::Result<()>;
}

/// Writes the active events accepted by the filter, returning how many were written.
pub fn write_events<E>(writer: &mut E, events: &EventStore, filter: &OutputFilter) -> io::Result<usize>
where
  E: EventWriter,
{
  let mut count = 0;
  for event in events.iter().filter(|event| filter.accepts(event)) {
    writer.write_event(event)?;
    count += 1;
  }
  writer.flush()?;
  Ok(count)
}

pub fn write<W>(format: Format, events: &EventStore, filter: &OutputFilter, out: W) -> io::Result<usize>
where
  W: Write,
{
  match format {
    Format::Csv => write_events(&mut CsvWriter::new(out), events, filter),
    Format::Script => write_events(&mut ScriptWriter::new(out), events, filter),
  }
}
