use core::fmt;

use crate::{
  image::SourcePixelFormat,
  png::{EncoderState, PngColorType},
};

/// The broad class of a [`PngEncodeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
  /// The image data or configuration can't be expressed as a PNG.
  Format,
  /// The encoder's API was called out of order.
  State,
  /// The output sink refused bytes.
  Io,
}

/// An error from the `pngstream` crate.
///
/// After an error the encoder that produced it is poisoned, and the bytes
/// already written to the sink are not a complete PNG. The exception is a
/// finished encoder, which keeps its complete PNG and stays finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PngEncodeError {
  /// The source pixel format has no mapping to the requested PNG color type.
  UnsupportedFormat { color_type: PngColorType, source: SourcePixelFormat },

  /// The color table has more entries than an 8-bit index can address.
  PaletteTooLarge { entries: usize },

  /// An indexed image has no color table, or an empty one.
  MissingPalette,

  /// A pixel of an indexed row points past the end of the palette.
  PaletteIndexOutOfRange { row: u32, index: u8, palette_len: usize },

  /// The declared width and/or height is 0, or too big for PNG.
  InvalidDimensions { width: u32, height: u32 },

  /// Only 8 bits per channel is supported.
  UnsupportedBitDepth(u8),

  /// An image can't be both grayscale and indexed.
  ConflictingColorFlags,

  /// Compression levels go from 0 to 9.
  InvalidCompressionLevel(u8),

  /// The maximum IDAT payload size must be non-zero and fit in 31 bits.
  InvalidChunkSize(usize),

  /// The image given for a row doesn't have the encoder's dimensions.
  ImageMismatch { expected: (u32, u32), actual: (u32, u32) },

  /// The image's bytes for a row are fewer than its width requires.
  SourceRowTooShort { row: u32, expected: usize, actual: usize },

  /// A canonical scanline has the wrong length for the descriptor.
  ScanlineLengthMismatch { expected: usize, actual: usize },

  /// The deflate compressor reported a failure.
  Compression,

  /// The operation isn't allowed in the encoder's current state.
  InvalidState { state: EncoderState, operation: &'static str },

  /// A row was supplied that isn't the next row.
  RowOutOfOrder { expected: u32, actual: u32 },

  /// A row index is past the bottom of the image.
  RowOutOfRange { row: u32, height: u32 },

  /// `finish` was called before every row was written.
  IncompleteImage { rows_written: u32, height: u32 },

  /// The encoder already failed once and can't be used again.
  Poisoned,

  /// The output sink rejected a write.
  Sink,
}
impl PngEncodeError {
  /// Which class of failure this is.
  #[inline]
  #[must_use]
  pub const fn kind(&self) -> ErrorKind {
    match self {
      Self::UnsupportedFormat { .. }
      | Self::PaletteTooLarge { .. }
      | Self::MissingPalette
      | Self::PaletteIndexOutOfRange { .. }
      | Self::InvalidDimensions { .. }
      | Self::UnsupportedBitDepth(_)
      | Self::ConflictingColorFlags
      | Self::InvalidCompressionLevel(_)
      | Self::InvalidChunkSize(_)
      | Self::ImageMismatch { .. }
      | Self::SourceRowTooShort { .. }
      | Self::ScanlineLengthMismatch { .. }
      | Self::Compression => ErrorKind::Format,
      Self::InvalidState { .. }
      | Self::RowOutOfOrder { .. }
      | Self::RowOutOfRange { .. }
      | Self::IncompleteImage { .. }
      | Self::Poisoned => ErrorKind::State,
      Self::Sink => ErrorKind::Io,
    }
  }
}
impl fmt::Display for PngEncodeError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UnsupportedFormat { color_type, source } => {
        write!(f, "can't encode {source:?} pixels as PNG color type {color_type:?}")
      }
      Self::PaletteTooLarge { entries } => {
        write!(f, "palette has {entries} entries, at most 256 are allowed")
      }
      Self::MissingPalette => f.write_str("indexed image has no palette entries"),
      Self::PaletteIndexOutOfRange { row, index, palette_len } => write!(
        f,
        "row {row} uses palette index {index}, but the palette has {palette_len} entries"
      ),
      Self::InvalidDimensions { width, height } => {
        write!(f, "invalid image dimensions: {width}x{height}")
      }
      Self::UnsupportedBitDepth(depth) => {
        write!(f, "bit depth {depth} is unsupported, only 8 is allowed")
      }
      Self::ConflictingColorFlags => f.write_str("an image can't be both grayscale and indexed"),
      Self::InvalidCompressionLevel(level) => {
        write!(f, "compression level {level} is outside of 0..=9")
      }
      Self::InvalidChunkSize(size) => write!(f, "invalid IDAT chunk size: {size}"),
      Self::ImageMismatch { expected, actual } => write!(
        f,
        "image is {}x{}, but the encoder expects {}x{}",
        actual.0, actual.1, expected.0, expected.1
      ),
      Self::SourceRowTooShort { row, expected, actual } => {
        write!(f, "source row {row} has {actual} bytes, expected at least {expected}")
      }
      Self::ScanlineLengthMismatch { expected, actual } => {
        write!(f, "scanline has {actual} bytes, expected {expected}")
      }
      Self::Compression => f.write_str("the deflate compressor failed"),
      Self::InvalidState { state, operation } => {
        write!(f, "can't {operation} while the encoder is {state:?}")
      }
      Self::RowOutOfOrder { expected, actual } => {
        write!(f, "row {actual} was supplied, but row {expected} is next")
      }
      Self::RowOutOfRange { row, height } => {
        write!(f, "row {row} is out of range for an image of height {height}")
      }
      Self::IncompleteImage { rows_written, height } => {
        write!(f, "only {rows_written} of {height} rows were written")
      }
      Self::Poisoned => f.write_str("the encoder already failed and can't be reused"),
      Self::Sink => f.write_str("the output sink rejected a write"),
    }
  }
}
#[cfg(feature = "std")]
impl std::error::Error for PngEncodeError {}

/// Result alias for encoding operations.
pub type PngResult<T> = Result<T, PngEncodeError>;
