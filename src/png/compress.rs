use super::*;

use miniz_oxide::{
  deflate::core::{compress, CompressorOxide, TDEFLFlush, TDEFLStatus},
  DataFormat,
};

/// The highest compression level.
pub const MAX_COMPRESSION_LEVEL: u8 = 9;

/// Size of the scratch buffer that each `compress` call writes into.
const OUT_BUF_LEN: usize = 16 * 1024;

/// A zlib stream over the filtered scanlines, cut into `IDAT` chunks.
///
/// All of the image data forms a single zlib stream, and the `IDAT` chunks
/// are just arbitrary slices of it. An `IDAT` is written every time
/// `idat_max_len` compressed bytes are waiting, and the tail goes out in
/// [`finish`](Self::finish).
pub struct StreamCompressor {
  deflate: Box<CompressorOxide>,
  out_buf: Vec<u8>,
  pending: Vec<u8>,
  idat_max_len: usize,
  bytes_in: u64,
  bytes_out: u64,
  idat_chunks: u32,
}
impl Debug for StreamCompressor {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("StreamCompressor")
      .field("pending", &self.pending.len())
      .field("idat_max_len", &self.idat_max_len)
      .field("bytes_in", &self.bytes_in)
      .field("bytes_out", &self.bytes_out)
      .field("idat_chunks", &self.idat_chunks)
      .finish()
  }
}
impl StreamCompressor {
  /// `level` goes from 0 (stored blocks only) to 9 (smallest output).
  ///
  /// ## Failure
  /// * Level above 9.
  /// * `idat_max_len` of 0, or more than a chunk can hold.
  pub fn new(level: u8, idat_max_len: usize) -> PngResult<Self> {
    if level > MAX_COMPRESSION_LEVEL {
      return Err(PngEncodeError::InvalidCompressionLevel(level));
    }
    if idat_max_len == 0 || idat_max_len > i32::MAX as usize {
      return Err(PngEncodeError::InvalidChunkSize(idat_max_len));
    }
    let mut deflate = Box::<CompressorOxide>::default();
    deflate.set_format_and_level(DataFormat::Zlib, level);
    Ok(Self {
      deflate,
      out_buf: alloc::vec![0; OUT_BUF_LEN],
      pending: Vec::new(),
      idat_max_len,
      bytes_in: 0,
      bytes_out: 0,
      idat_chunks: 0,
    })
  }

  /// Pushes more filtered bytes into the stream.
  pub fn feed<W: ByteSink>(
    &mut self, bytes: &[u8], assembler: &mut ChunkAssembler<W>,
  ) -> PngResult<()> {
    self.bytes_in += bytes.len() as u64;
    self.run(bytes, TDEFLFlush::None)?;
    self.emit_full_chunks(assembler)
  }

  /// Ends the zlib stream and writes out everything that's left.
  ///
  /// There's always at least one `IDAT` after this, even if it ends up very
  /// small.
  pub fn finish<W: ByteSink>(&mut self, assembler: &mut ChunkAssembler<W>) -> PngResult<()> {
    self.run(&[], TDEFLFlush::Finish)?;
    self.emit_full_chunks(assembler)?;
    if !self.pending.is_empty() || self.idat_chunks == 0 {
      let tail = core::mem::take(&mut self.pending);
      self.write_idat(&tail, assembler)?;
    }
    Ok(())
  }

  fn run(&mut self, mut input: &[u8], flush: TDEFLFlush) -> PngResult<()> {
    let finishing = matches!(flush, TDEFLFlush::Finish);
    loop {
      let (status, consumed, produced) =
        compress(&mut self.deflate, input, &mut self.out_buf, flush);
      self.pending.extend_from_slice(&self.out_buf[..produced]);
      self.bytes_out += produced as u64;
      input = &input[consumed..];
      match status {
        TDEFLStatus::Done => return Ok(()),
        TDEFLStatus::Okay => {
          // a full output buffer can mean there's more output waiting
          if !finishing && input.is_empty() && produced < self.out_buf.len() {
            return Ok(());
          }
        }
        TDEFLStatus::BadParam | TDEFLStatus::PutBufFailed => {
          warn!("deflate failed with {status:?}");
          return Err(PngEncodeError::Compression);
        }
      }
    }
  }

  fn emit_full_chunks<W: ByteSink>(&mut self, assembler: &mut ChunkAssembler<W>) -> PngResult<()> {
    if self.pending.len() < self.idat_max_len {
      return Ok(());
    }
    let pending = core::mem::take(&mut self.pending);
    let mut chunks = pending.chunks_exact(self.idat_max_len);
    for chunk in chunks.by_ref() {
      self.write_idat(chunk, assembler)?;
    }
    self.pending.extend_from_slice(chunks.remainder());
    Ok(())
  }

  fn write_idat<W: ByteSink>(
    &mut self, data: &[u8], assembler: &mut ChunkAssembler<W>,
  ) -> PngResult<()> {
    assembler.write_chunk(ChunkRecord::new(ChunkType::IDAT, data))?;
    self.idat_chunks += 1;
    Ok(())
  }

  /// Uncompressed bytes fed in so far.
  #[inline]
  #[must_use]
  pub const fn bytes_in(&self) -> u64 {
    self.bytes_in
  }

  /// Compressed bytes produced so far, including those not yet in an `IDAT`.
  #[inline]
  #[must_use]
  pub const fn bytes_out(&self) -> u64 {
    self.bytes_out
  }

  #[inline]
  #[must_use]
  pub const fn idat_chunks(&self) -> u32 {
    self.idat_chunks
  }
}
