/// The reflected CRC-32 polynomial (the same one zlib and gzip use).
const POLYNOMIAL: u32 = 0xEDB8_8320;

/// CRC of each possible low byte, so the update loop can go a byte at a time.
static BYTE_CRCS: [u32; 256] = {
  let mut table = [0_u32; 256];
  let mut byte = 0_u32;
  while byte < 256 {
    table[byte as usize] = crc_of_byte(byte);
    byte += 1;
  }
  table
};

const fn crc_of_byte(byte: u32) -> u32 {
  let mut crc = byte;
  let mut bits_left = 8;
  while bits_left > 0 {
    let carry = crc & 1;
    crc >>= 1;
    if carry == 1 {
      crc ^= POLYNOMIAL;
    }
    bits_left -= 1;
  }
  crc
}

#[inline]
fn update_crc(mut crc: u32, bytes: &[u8]) -> u32 {
  for &byte in bytes {
    let i = (crc ^ u32::from(byte)) as u8 as usize;
    crc = BYTE_CRCS[i] ^ (crc >> 8);
  }
  crc
}

/// The CRC-32 that closes every PNG chunk.
///
/// It covers the chunk type and the chunk data, but not the length.
#[inline]
#[must_use]
pub fn chunk_crc(chunk_type: [u8; 4], data: &[u8]) -> u32 {
  update_crc(update_crc(u32::MAX, &chunk_type), data) ^ u32::MAX
}

#[test]
fn test_chunk_crc_known_values() {
  // every PNG ends with these exact 12 bytes
  assert_eq!(chunk_crc(*b"IEND", &[]), 0xAE42_6082);
  // the standard CRC-32 check value
  assert_eq!(update_crc(u32::MAX, b"123456789") ^ u32::MAX, 0xCBF4_3926);
}

#[test]
fn test_byte_crc_table_entries() {
  assert_eq!(BYTE_CRCS[0], 0);
  assert_eq!(BYTE_CRCS[1], 0x7707_3096);
  assert_eq!(BYTE_CRCS[128], POLYNOMIAL);
  assert_eq!(BYTE_CRCS[255], 0x2D02_EF8D);
}
