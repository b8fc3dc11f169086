use super::*;

/// Default compression level, a balance of speed and size.
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 6;

/// Default maximum `IDAT` payload.
pub const DEFAULT_IDAT_MAX_LEN: usize = 32 * 1024;

/// Tuning knobs for an [`Encoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncoderConfig {
  pub filter_mode: FilterMode,
  /// 0 (no compression) to 9 (smallest output)
  pub compression_level: u8,
  /// Compressed data is split into `IDAT` chunks of at most this many bytes.
  pub idat_max_len: usize,
}
impl Default for EncoderConfig {
  #[inline]
  fn default() -> Self {
    Self {
      filter_mode: FilterMode::Auto,
      compression_level: DEFAULT_COMPRESSION_LEVEL,
      idat_max_len: DEFAULT_IDAT_MAX_LEN,
    }
  }
}
impl EncoderConfig {
  #[inline]
  #[must_use]
  pub const fn with_filter_mode(self, filter_mode: FilterMode) -> Self {
    Self { filter_mode, ..self }
  }
  #[inline]
  #[must_use]
  pub const fn with_compression_level(self, compression_level: u8) -> Self {
    Self { compression_level, ..self }
  }
  #[inline]
  #[must_use]
  pub const fn with_idat_max_len(self, idat_max_len: usize) -> Self {
    Self { idat_max_len, ..self }
  }
}

/// Where an [`Encoder`] is in the process of writing a PNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncoderState {
  /// Nothing has been written yet.
  Created,
  /// The signature and `IHDR` are out.
  HeaderWritten,
  /// `PLTE` (and maybe `tRNS`) are out. Only indexed images get here.
  PaletteWritten,
  /// At least one row has gone into the image data.
  Streaming { rows_written: u32 },
  /// `IEND` is out, the PNG is complete.
  Finalized,
  /// An earlier call returned an error. Nothing more can be done.
  Failed,
}

/// Writes one PNG image to a [`ByteSink`], a row at a time.
///
/// The calls must go in this order:
/// 1. [`write_header`](Self::write_header)
/// 2. [`write_palette`](Self::write_palette), only for indexed images
/// 3. [`write_row`](Self::write_row) or
///    [`write_scanline`](Self::write_scanline), once per row, top to bottom
/// 4. [`finish`](Self::finish)
///
/// Memory use is a few scanlines plus the compressor state, no matter how tall
/// the image is. Any error before [`finish`](Self::finish) succeeds poisons the
/// encoder, and what's been written to the sink so far is not a valid PNG.
/// Once finished, misuse is reported but the encoder stays `Finalized`.
#[derive(Debug)]
pub struct Encoder<W> {
  assembler: ChunkAssembler<W>,
  descriptor: ImageDescriptor,
  config: EncoderConfig,
  filter_mode: FilterMode,
  state: EncoderState,
  palette_len: usize,
  compressor: StreamCompressor,
  selector: FilterSelector,
  adapter: Option<PixelFormatAdapter>,
  current: Vec<u8>,
  previous: Vec<u8>,
  filter_counts: [u32; 5],
}
impl<W: ByteSink> Encoder<W> {
  /// Makes an encoder. Nothing is written until
  /// [`write_header`](Self::write_header).
  ///
  /// ## Failure
  /// * [`PngEncodeError::InvalidCompressionLevel`]
  /// * [`PngEncodeError::InvalidChunkSize`]
  pub fn new(sink: W, descriptor: ImageDescriptor, config: EncoderConfig) -> PngResult<Self> {
    let compressor = StreamCompressor::new(config.compression_level, config.idat_max_len)?;
    Ok(Self {
      assembler: ChunkAssembler::new(sink),
      descriptor,
      config,
      filter_mode: config.filter_mode.resolve(descriptor.color_type()),
      state: EncoderState::Created,
      palette_len: 0,
      compressor,
      selector: FilterSelector::new(),
      adapter: None,
      current: Vec::new(),
      previous: Vec::new(),
      filter_counts: [0; 5],
    })
  }

  #[inline]
  #[must_use]
  pub const fn state(&self) -> EncoderState {
    self.state
  }

  #[inline]
  #[must_use]
  pub const fn descriptor(&self) -> &ImageDescriptor {
    &self.descriptor
  }

  #[inline]
  #[must_use]
  pub const fn config(&self) -> &EncoderConfig {
    &self.config
  }

  /// Total bytes given to the sink so far.
  #[inline]
  #[must_use]
  pub const fn bytes_written(&self) -> u64 {
    self.assembler.bytes_written()
  }

  /// Gives back the sink, whatever state the encoder is in.
  #[inline]
  #[must_use]
  pub fn into_sink(self) -> W {
    self.assembler.into_sink()
  }

  /// Writes the PNG signature and the `IHDR` chunk.
  pub fn write_header(&mut self) -> PngResult<()> {
    self.guarded("write the header", |enc| {
      if enc.state != EncoderState::Created {
        return Err(enc.invalid_state("write the header"));
      }
      enc.descriptor.validate()?;
      enc.assembler.write_signature()?;
      let ihdr = enc.descriptor.ihdr_payload();
      enc.assembler.write_chunk(ChunkRecord::new(ChunkType::IHDR, &ihdr))?;
      let scanline_len = enc.descriptor.scanline_len();
      enc.current.reserve(scanline_len);
      enc.previous.reserve(scanline_len);
      debug!(
        "PNG header: {}x{} {:?}, filter mode {:?}, level {}",
        enc.descriptor.width,
        enc.descriptor.height,
        enc.descriptor.color_type(),
        enc.filter_mode,
        enc.config.compression_level
      );
      enc.state = EncoderState::HeaderWritten;
      Ok(())
    })
  }

  /// Writes `PLTE`, and `tRNS` if any palette entry is transparent.
  ///
  /// Only indexed images have a palette phase.
  pub fn write_palette(&mut self, palette: &Palette) -> PngResult<()> {
    self.guarded("write the palette", |enc| {
      if enc.state != EncoderState::HeaderWritten || !enc.descriptor.is_indexed {
        return Err(enc.invalid_state("write the palette"));
      }
      if palette.is_empty() {
        return Err(PngEncodeError::MissingPalette);
      }
      let plte = palette.plte_payload();
      enc.assembler.write_chunk(ChunkRecord::new(ChunkType::PLTE, &plte))?;
      if let Some(trns) = palette.trns_payload() {
        enc.assembler.write_chunk(ChunkRecord::new(ChunkType::tRNS, &trns))?;
      }
      debug!(
        "PNG palette: {} entries, tRNS: {}",
        palette.len(),
        palette.has_transparency()
      );
      enc.palette_len = palette.len();
      enc.state = EncoderState::PaletteWritten;
      Ok(())
    })
  }

  /// Converts row `row` of `image` and adds it to the image data.
  ///
  /// The image must have the encoder's dimensions, and its pixel format must
  /// map onto the encoder's color type.
  pub fn write_row<I: RasterImage + ?Sized>(&mut self, image: &I, row: u32) -> PngResult<()> {
    self.guarded("write a row", |enc| {
      enc.check_next_row(row, "write a row")?;
      let expected = (enc.descriptor.width, enc.descriptor.height);
      let actual = (image.width(), image.height());
      if expected != actual {
        return Err(PngEncodeError::ImageMismatch { expected, actual });
      }
      let adapter = match enc.adapter {
        Some(adapter) if adapter.source() == image.pixel_format() => adapter,
        _ => {
          let adapter = PixelFormatAdapter::for_image(&enc.descriptor, image)?;
          enc.adapter = Some(adapter);
          adapter
        }
      };
      adapter.produce_scanline(image, row, &mut enc.current)?;
      enc.push_current_row(row)
    })
  }

  /// Adds a row that's already in the PNG's own channel layout.
  ///
  /// `canonical` must be exactly
  /// [`scanline_len`](ImageDescriptor::scanline_len) bytes, without a filter
  /// type byte.
  pub fn write_scanline(&mut self, row: u32, canonical: &[u8]) -> PngResult<()> {
    self.guarded("write a scanline", |enc| {
      enc.check_next_row(row, "write a scanline")?;
      let expected = enc.descriptor.scanline_len();
      if canonical.len() != expected {
        return Err(PngEncodeError::ScanlineLengthMismatch { expected, actual: canonical.len() });
      }
      enc.current.clear();
      enc.current.extend_from_slice(canonical);
      enc.push_current_row(row)
    })
  }

  /// Ends the image data and writes `IEND`.
  ///
  /// Every row has to be written first.
  pub fn finish(&mut self) -> PngResult<()> {
    self.guarded("finish", |enc| {
      let height = enc.descriptor.height;
      let rows_written = match enc.state {
        EncoderState::Streaming { rows_written } => rows_written,
        EncoderState::HeaderWritten | EncoderState::PaletteWritten => 0,
        _ => return Err(enc.invalid_state("finish")),
      };
      if rows_written != height {
        return Err(PngEncodeError::IncompleteImage { rows_written, height });
      }
      enc.compressor.finish(&mut enc.assembler)?;
      enc.assembler.write_chunk(ChunkRecord::new(ChunkType::IEND, &[]))?;
      debug!(
        "PNG finished: {} bytes in, {} bytes compressed, {} IDAT, {} chunks, {} bytes total, filters [None, Sub, Up, Average, Paeth] = {:?}",
        enc.compressor.bytes_in(),
        enc.compressor.bytes_out(),
        enc.compressor.idat_chunks(),
        enc.assembler.chunks_written(),
        enc.assembler.bytes_written(),
        enc.filter_counts
      );
      enc.state = EncoderState::Finalized;
      Ok(())
    })
  }

  /// Runs `op`, and moves to `Failed` if it fails.
  ///
  /// A finished encoder stays `Finalized`: its PNG is already complete.
  fn guarded<T>(
    &mut self, operation: &'static str, op: impl FnOnce(&mut Self) -> PngResult<T>,
  ) -> PngResult<T> {
    if self.state == EncoderState::Failed {
      return Err(PngEncodeError::Poisoned);
    }
    op(self).map_err(|e| {
      debug!("encoder failed to {operation} while {:?}: {e}", self.state);
      if self.state != EncoderState::Finalized {
        self.state = EncoderState::Failed;
      }
      e
    })
  }

  #[inline]
  fn invalid_state(&self, operation: &'static str) -> PngEncodeError {
    PngEncodeError::InvalidState { state: self.state, operation }
  }

  fn check_next_row(&self, row: u32, operation: &'static str) -> PngResult<()> {
    let rows_written = match self.state {
      EncoderState::HeaderWritten if !self.descriptor.is_indexed => 0,
      EncoderState::PaletteWritten => 0,
      EncoderState::Streaming { rows_written } => rows_written,
      _ => return Err(self.invalid_state(operation)),
    };
    let height = self.descriptor.height;
    if row >= height {
      return Err(PngEncodeError::RowOutOfRange { row, height });
    }
    if row != rows_written {
      return Err(PngEncodeError::RowOutOfOrder { expected: rows_written, actual: row });
    }
    Ok(())
  }

  /// Filters and compresses `self.current`, which holds row `row`.
  fn push_current_row(&mut self, row: u32) -> PngResult<()> {
    debug_assert_eq!(self.current.len(), self.descriptor.scanline_len());
    if self.descriptor.is_indexed {
      let palette_len = self.palette_len;
      if let Some(&index) = self.current.iter().find(|&&i| usize::from(i) >= palette_len) {
        return Err(PngEncodeError::PaletteIndexOutOfRange { row, index, palette_len });
      }
    }
    let previous = if row == 0 { None } else { Some(self.previous.as_slice()) };
    let (filter, filtered) = self.selector.select_and_apply(
      &self.current,
      previous,
      self.descriptor.bytes_per_pixel(),
      self.filter_mode,
    );
    trace!("row {row}: {filter:?}");
    self.compressor.feed(&[filter as u8], &mut self.assembler)?;
    self.compressor.feed(filtered, &mut self.assembler)?;
    self.filter_counts[filter as usize] += 1;
    core::mem::swap(&mut self.current, &mut self.previous);
    self.state = EncoderState::Streaming { rows_written: row + 1 };
    Ok(())
  }
}

/// Encodes a whole image in one go, giving back the sink.
///
/// The PNG color type comes from the image's pixel format, and indexed images
/// have their palette taken from the image's color table.
pub fn encode_image<W: ByteSink, I: RasterImage + ?Sized>(
  sink: W, image: &I, config: EncoderConfig,
) -> PngResult<W> {
  let descriptor = ImageDescriptor::for_image(image)?;
  let mut encoder = Encoder::new(sink, descriptor, config)?;
  encoder.write_header()?;
  if descriptor.is_indexed {
    encoder.write_palette(&extract_palette(image)?)?;
  }
  for y in 0..descriptor.height {
    encoder.write_row(image, y)?;
  }
  encoder.finish()?;
  Ok(encoder.into_sink())
}

/// Encodes a whole image into a new `Vec<u8>`.
#[inline]
pub fn encode_to_vec<I: RasterImage + ?Sized>(
  image: &I, config: EncoderConfig,
) -> PngResult<Vec<u8>> {
  encode_image(Vec::new(), image, config)
}
