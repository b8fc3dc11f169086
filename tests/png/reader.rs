//! Just enough of a PNG reader to check what the encoder writes.

/// An unparsed chunk from a PNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawChunk<'b> {
  pub ty: [u8; 4],
  pub data: &'b [u8],
  pub declared_crc: u32,
}

/// Produces successive raw chunks from PNG bytes.
#[derive(Debug, Clone)]
pub struct RawChunkIter<'b>(&'b [u8]);
impl<'b> RawChunkIter<'b> {
  /// Pass the full PNG bytes, the signature is checked and skipped.
  pub fn new(bytes: &'b [u8]) -> Self {
    assert_eq!(&bytes[..8], &[137, 80, 78, 71, 13, 10, 26, 10], "bad signature");
    Self(&bytes[8..])
  }
}
impl<'b> Iterator for RawChunkIter<'b> {
  type Item = RawChunk<'b>;
  fn next(&mut self) -> Option<Self::Item> {
    if self.0.is_empty() {
      return None;
    }
    let len = u32::from_be_bytes(self.0[..4].try_into().unwrap()) as usize;
    let ty: [u8; 4] = self.0[4..8].try_into().unwrap();
    let data = &self.0[8..8 + len];
    let declared_crc = u32::from_be_bytes(self.0[8 + len..12 + len].try_into().unwrap());
    self.0 = &self.0[12 + len..];
    Some(RawChunk { ty, data, declared_crc })
  }
}

/// Bit-at-a-time CRC-32, slow but obviously right.
pub fn crc32(bytes: impl IntoIterator<Item = u8>) -> u32 {
  let mut crc = u32::MAX;
  for byte in bytes {
    crc ^= u32::from(byte);
    for _ in 0..8 {
      crc = if crc & 1 != 0 { (crc >> 1) ^ 0xEDB8_8320 } else { crc >> 1 };
    }
  }
  !crc
}

/// Everything the tests look at in an encoded PNG.
#[derive(Debug, Clone, Default)]
pub struct DecodedPng {
  pub width: u32,
  pub height: u32,
  pub bit_depth: u8,
  pub color_type: u8,
  pub chunk_types: Vec<[u8; 4]>,
  pub idat_lens: Vec<usize>,
  pub plte: Option<Vec<u8>>,
  pub trns: Option<Vec<u8>>,
  /// The decompressed image data, filter bytes included.
  pub inflated: Vec<u8>,
  /// The filter byte of each row.
  pub filters: Vec<u8>,
  /// Unfiltered scanlines, all rows back to back.
  pub pixels: Vec<u8>,
}
impl DecodedPng {
  pub fn channels(&self) -> usize {
    match self.color_type {
      0 | 3 => 1,
      2 => 3,
      4 => 2,
      6 => 4,
      other => panic!("unknown color type {other}"),
    }
  }
}

/// Parses a PNG, checking every CRC and the chunk order along the way.
pub fn decode(png: &[u8]) -> DecodedPng {
  let mut out = DecodedPng::default();
  let mut zlib = Vec::new();
  for chunk in RawChunkIter::new(png) {
    let crc = crc32(chunk.ty.iter().chain(chunk.data).copied());
    assert_eq!(crc, chunk.declared_crc, "bad CRC on {:?}", core::str::from_utf8(&chunk.ty));
    out.chunk_types.push(chunk.ty);
    match &chunk.ty {
      b"IHDR" => {
        assert_eq!(chunk.data.len(), 13);
        out.width = u32::from_be_bytes(chunk.data[0..4].try_into().unwrap());
        out.height = u32::from_be_bytes(chunk.data[4..8].try_into().unwrap());
        out.bit_depth = chunk.data[8];
        out.color_type = chunk.data[9];
        assert_eq!(&chunk.data[10..], &[0, 0, 0]);
      }
      b"PLTE" => out.plte = Some(chunk.data.to_vec()),
      b"tRNS" => out.trns = Some(chunk.data.to_vec()),
      b"IDAT" => {
        out.idat_lens.push(chunk.data.len());
        zlib.extend_from_slice(chunk.data);
      }
      b"IEND" => assert!(chunk.data.is_empty()),
      other => panic!("unexpected chunk {other:?}"),
    }
  }
  assert_eq!(out.chunk_types.first(), Some(b"IHDR"));
  assert_eq!(out.chunk_types.last(), Some(b"IEND"));

  let filtered = miniz_oxide::inflate::decompress_to_vec_zlib(&zlib).unwrap();
  let bpp = out.channels();
  let line_len = out.width as usize * bpp;
  assert_eq!(filtered.len(), (line_len + 1) * out.height as usize);
  let mut previous = vec![0_u8; line_len];
  for line in filtered.chunks_exact(line_len + 1) {
    let (filter, data) = (line[0], &line[1..]);
    out.filters.push(filter);
    let current = unfilter(filter, data, &previous, bpp);
    out.pixels.extend_from_slice(&current);
    previous = current;
  }
  out.inflated = filtered;
  out
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
  let p = i32::from(a) + i32::from(b) - i32::from(c);
  let pa = (p - i32::from(a)).abs();
  let pb = (p - i32::from(b)).abs();
  let pc = (p - i32::from(c)).abs();
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}

/// `previous` is all zeroes for the first line.
pub fn unfilter(filter: u8, data: &[u8], previous: &[u8], bpp: usize) -> Vec<u8> {
  let mut out: Vec<u8> = Vec::with_capacity(data.len());
  for (i, &x) in data.iter().enumerate() {
    let a = if i >= bpp { out[i - bpp] } else { 0 };
    let b = previous[i];
    let c = if i >= bpp { previous[i - bpp] } else { 0 };
    let recon = match filter {
      0 => x,
      1 => x.wrapping_add(a),
      2 => x.wrapping_add(b),
      3 => x.wrapping_add(((u16::from(a) + u16::from(b)) / 2) as u8),
      4 => x.wrapping_add(paeth(a, b, c)),
      other => panic!("illegal filter type {other}"),
    };
    out.push(recon);
  }
  out
}
