use log::{debug, info, warn};
use pianola_time::Timing;

use crate::context::ParserContext;
use crate::error::{Error, Result};
use crate::event::EventSink;
use crate::filter::SendMask;
use crate::protocol::track::{TrackParser, TrackSummary};

const HEADER_TAG: &[u8; 4] = b"MThd";
const TRACK_TAG: &[u8; 4] = b"MTrk";
const CHUNK_HEADER_LEN: usize = 8;
const HEADER_DATA_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Header {
  pub format: u16,
  /// Number of tracks declared by the header. Tracks are actually discovered chunk by chunk.
  pub tracks: u16,
  pub timing: Timing,
}

impl Header {
  fn decode(data: &[u8]) -> Result<Self> {
    match data {
      [f0, f1, t0, t1, d0, d1, ..] => Ok(Self {
        format: u16::from_be_bytes([*f0, *f1]),
        tracks: u16::from_be_bytes([*t0, *t1]),
        timing: Timing::from_division([*d0, *d1]),
      }),
      _ => Err(Error::InvalidHeader { len: data.len() }),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseReport {
  pub header: Header,
  pub tracks: Vec<TrackSummary>,
  pub skipped_chunks: usize,
  pub tempo_points: usize,
}

impl ParseReport {
  pub fn unhandled(&self) -> usize {
    self.tracks.iter().map(|track| track.unhandled).sum()
  }

  pub fn events(&self) -> usize {
    self.tracks.iter().map(|track| track.events).sum()
  }
}

struct Chunk<'a> {
  tag: [u8; 4],
  declared_len: usize,
  data: &'a [u8],
}

impl<'a> Chunk<'a> {
  /// Reads the chunk at the start of `data`. The body is clamped to the available bytes.
  fn read(data: &'a [u8]) -> Option<Self> {
    match data {
      [a, b, c, d, l0, l1, l2, l3, body @ ..] => {
        let declared_len = u32::from_be_bytes([*l0, *l1, *l2, *l3]) as usize;
        let len = declared_len.min(body.len());
        Some(Self {
          tag: [*a, *b, *c, *d],
          declared_len,
          data: &body[..len],
        })
      }
      _ => None,
    }
  }

  fn is_clamped(&self) -> bool {
    self.data.len() < self.declared_len
  }

  fn total_len(&self) -> usize {
    CHUNK_HEADER_LEN + self.data.len()
  }

  fn tag_name(&self) -> String {
    String::from_utf8_lossy(&self.tag).into_owned()
  }
}

/// Walks the chunks of a Standard MIDI File and runs a [`TrackParser`] for every track chunk.
pub struct FileParser {
  context: ParserContext,
}

impl FileParser {
  pub fn new(send_mask: SendMask) -> Self {
    Self {
      context: ParserContext::new(send_mask),
    }
  }

  pub fn into_context(self) -> ParserContext {
    self.context
  }

  pub fn parse<S>(&mut self, data: &[u8], sink: &mut S) -> Result<ParseReport>
  where
    S: EventSink,
  {
    let mut pos = 0;
    let mut header = None;
    let mut tracks = Vec::new();
    let mut skipped_chunks = 0;

    while pos < data.len() {
      let chunk = match Chunk::read(&data[pos..]) {
        Some(chunk) => chunk,
        None => {
          warn!("ignoring {} trailing bytes", data.len() - pos);
          break;
        }
      };

      debug!("{}: {}", chunk.tag_name(), chunk.declared_len);
      if chunk.is_clamped() {
        warn!(
          "chunk {} declares {} bytes but only {} are available",
          chunk.tag_name(),
          chunk.declared_len,
          chunk.data.len()
        );
      }

      if pos == 0 && &chunk.tag != HEADER_TAG {
        return Err(Error::MissingHeader);
      }

      match &chunk.tag {
        HEADER_TAG => {
          let decoded = self.header(chunk.data)?;
          header = Some(decoded);
        }
        TRACK_TAG => {
          let track = self.context.next_track();
          let summary = TrackParser::new(chunk.data, track).parse(&mut self.context, sink);
          tracks.push(summary);
        }
        _ => {
          skipped_chunks += 1;
        }
      }

      pos += chunk.total_len();
    }

    let header = header.ok_or(Error::MissingHeader)?;
    if usize::from(header.tracks) != tracks.len() {
      debug!(
        "header declares {} tracks, found {}",
        header.tracks,
        tracks.len()
      );
    }

    Ok(ParseReport {
      header,
      tracks,
      skipped_chunks,
      tempo_points: self.context.clock.tempo_map().len(),
    })
  }

  fn header(&mut self, data: &[u8]) -> Result<Header> {
    let header = Header::decode(data)?;
    if data.len() > HEADER_DATA_LEN {
      debug!("ignoring {} extra header bytes", data.len() - HEADER_DATA_LEN);
    }
    info!(
      "MIDI format {}, tracks {}, {}",
      header.format, header.tracks, header.timing
    );
    self.context.clock.set_timing(header.timing);
    Ok(header)
  }
}
