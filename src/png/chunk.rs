use super::*;

/// The first eight bytes of a PNG datastream.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// A four-letter PNG chunk type.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ChunkType(pub [u8; 4]);
#[allow(nonstandard_style)]
impl ChunkType {
  pub const IHDR: Self = Self(*b"IHDR");
  pub const PLTE: Self = Self(*b"PLTE");
  pub const tRNS: Self = Self(*b"tRNS");
  pub const IDAT: Self = Self(*b"IDAT");
  pub const IEND: Self = Self(*b"IEND");
}
impl Debug for ChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_char(self.0[0] as char)?;
    f.write_char(self.0[1] as char)?;
    f.write_char(self.0[2] as char)?;
    f.write_char(self.0[3] as char)?;
    Ok(())
  }
}

/// A chunk type and its data, ready to be framed.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkRecord<'b> {
  pub ty: ChunkType,
  pub data: &'b [u8],
}
impl Debug for ChunkRecord<'_> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("ChunkRecord")
      .field("ty", &self.ty)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .finish()
  }
}
impl<'b> ChunkRecord<'b> {
  #[inline]
  #[must_use]
  pub const fn new(ty: ChunkType, data: &'b [u8]) -> Self {
    Self { ty, data }
  }

  /// The CRC that goes after the data.
  #[inline]
  #[must_use]
  pub fn crc(&self) -> u32 {
    chunk_crc(self.ty.0, self.data)
  }

  /// Length, type, data, and CRC.
  #[inline]
  #[must_use]
  pub const fn framed_len(&self) -> usize {
    12 + self.data.len()
  }
}

/// Frames chunks into the output sink.
///
/// This doesn't know anything about chunk ordering, that's enforced by the
/// [`Encoder`].
#[derive(Debug)]
pub struct ChunkAssembler<W> {
  sink: W,
  bytes_written: u64,
  chunks_written: u32,
}
impl<W: ByteSink> ChunkAssembler<W> {
  #[inline]
  #[must_use]
  pub const fn new(sink: W) -> Self {
    Self { sink, bytes_written: 0, chunks_written: 0 }
  }

  pub fn write_signature(&mut self) -> PngResult<()> {
    self.sink.write_bytes(&PNG_SIGNATURE)?;
    self.bytes_written += PNG_SIGNATURE.len() as u64;
    Ok(())
  }

  pub fn write_chunk(&mut self, chunk: ChunkRecord<'_>) -> PngResult<()> {
    // chunk lengths are limited to 2^31-1
    let len = u32::try_from(chunk.data.len())
      .ok()
      .filter(|len| *len <= i32::MAX as u32)
      .ok_or(PngEncodeError::InvalidChunkSize(chunk.data.len()))?;
    trace!("writing {:?} chunk, {} bytes", chunk.ty, len);
    self.sink.write_bytes(&len.to_be_bytes())?;
    self.sink.write_bytes(&chunk.ty.0)?;
    self.sink.write_bytes(chunk.data)?;
    self.sink.write_bytes(&chunk.crc().to_be_bytes())?;
    self.bytes_written += chunk.framed_len() as u64;
    self.chunks_written += 1;
    Ok(())
  }

  #[inline]
  #[must_use]
  pub const fn bytes_written(&self) -> u64 {
    self.bytes_written
  }

  #[inline]
  #[must_use]
  pub const fn chunks_written(&self) -> u32 {
    self.chunks_written
  }

  #[inline]
  #[must_use]
  pub const fn sink(&self) -> &W {
    &self.sink
  }

  #[inline]
  #[must_use]
  pub fn into_sink(self) -> W {
    self.sink
  }
}
