use std::io::{self, BufWriter, Write};

use pianola_midi::Event;

use crate::output::EventWriter;

pub struct CsvWriter<W: Write> {
  out: BufWriter<W>,
}

impl<W: Write> CsvWriter<W> {
  pub fn new(out: W) -> Self {
    Self {
      out: BufWriter::new(out),
    }
  }
}

impl<W: Write> EventWriter for CsvWriter<W> {
  fn write_event(&mut self, event: &Event) -> io::Result<()> {
    writeln!(
      self.out,
      "{},{},{},{},{},{}",
      event.time_ms,
      event.track,
      event.channel,
      event.kind.code(),
      event.key,
      event.value
    )
  }

  fn flush(&mut self) -> io::Result<()> {
    self.out.flush()
  }
}
