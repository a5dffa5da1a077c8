/// Decodes a variable length quantity from the start of `data`.
///
/// Returns the value and the number of bytes it took, or `None` when `data` ends before a byte
/// without the continuation bit. There is no limit on the number of bytes, excess high bits are
/// shifted out.
pub fn decode(data: &[u8]) -> Option<(u32, usize)> {
  let mut value = 0u32;
  for (index, byte) in data.iter().cloned().enumerate() {
    value = (value << 7) | (byte & 0x7f) as u32;
    if byte & 0x80 == 0 {
      return Some((value, index + 1));
    }
  }
  None
}
