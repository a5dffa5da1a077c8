use std::io::{self, BufWriter, Write};

use pianola_midi::Event;

use crate::output::EventWriter;

/// Python serial calls that replay the events on the player.
pub struct ScriptWriter<W: Write> {
  out: BufWriter<W>,
}

impl<W: Write> ScriptWriter<W> {
  pub fn new(out: W) -> Self {
    Self {
      out: BufWriter::new(out),
    }
  }
}

impl<W: Write> EventWriter for ScriptWriter<W> {
  fn write_event(&mut self, event: &Event) -> io::Result<()> {
    writeln!(
      self.out,
      "ser.write(b'<{},{},{},{},{},{}>')",
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
