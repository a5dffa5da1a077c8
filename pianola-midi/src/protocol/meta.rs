pub const SEQUENCE_NUMBER: u8 = 0x00;
pub const CHANNEL_PREFIX: u8 = 0x20;
pub const MIDI_PORT: u8 = 0x21;
pub const END_OF_TRACK: u8 = 0x2f;
pub const SET_TEMPO: u8 = 0x51;
pub const SMPTE_OFFSET: u8 = 0x54;
pub const TIME_SIGNATURE: u8 = 0x58;
pub const KEY_SIGNATURE: u8 = 0x59;
pub const SEQUENCER_SPECIFIC: u8 = 0x7f;

/// Meta events whose payload is free form (text, sequencer specific, ...).
pub fn is_variable_len(meta_type: u8) -> bool {
  matches!(meta_type, 0x01..=0x09 | 0x60 | SEQUENCER_SPECIFIC)
}

/// Payload length of the meta events with a fixed layout.
pub fn fixed_len(meta_type: u8) -> Option<usize> {
  match meta_type {
    SEQUENCE_NUMBER => Some(2),
    CHANNEL_PREFIX | MIDI_PORT => Some(1),
    END_OF_TRACK => Some(0),
    SET_TEMPO => Some(3),
    SMPTE_OFFSET => Some(5),
    TIME_SIGNATURE => Some(4),
    KEY_SIGNATURE => Some(2),
    _ => None,
  }
}

pub fn is_known(meta_type: u8) -> bool {
  is_variable_len(meta_type) || fixed_len(meta_type).is_some()
}

/// Whether a declared payload length agrees with the layout of the meta event.
pub fn is_valid_len(meta_type: u8, len: usize) -> bool {
  match (meta_type, fixed_len(meta_type)) {
    // the sequence number can be omitted
    (SEQUENCE_NUMBER, _) => len == 0 || len == 2,
    (_, Some(expected)) => len == expected,
    (_, None) => true,
  }
}

/// Microseconds per quarter note from a Set Tempo payload.
pub fn tempo(payload: &[u8]) -> Option<u32> {
  match payload {
    [b0, b1, b2, ..] => Some(((*b0 as u32) << 16) | ((*b1 as u32) << 8) | (*b2 as u32)),
    _ => None,
  }
}
