use super::*;

/// Where one output channel comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Tap {
  /// This byte of the source pixel.
  At(u8),
  /// A constant 255, for alpha the source doesn't have.
  Opaque,
}
use Tap::{At, Opaque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Program {
  /// The source row already is the canonical scanline.
  Copy,
  /// Gather channels out of each source pixel.
  ///
  /// Packed pixels are read as native-endian `u32` and their taps index the
  /// little-endian bytes of that value, so they work the same on every target.
  Shuffle { taps: [Tap; 4], packed: bool },
}

/// Turns rows of some [`SourcePixelFormat`] into canonical PNG scanlines.
///
/// An adapter only describes a conversion, it doesn't hold any row data, so
/// one adapter can be reused across rows, images, and encoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelFormatAdapter {
  color_type: PngColorType,
  source: SourcePixelFormat,
  program: Program,
}
impl PixelFormatAdapter {
  /// Looks up the conversion from `source` pixels to `color_type` scanlines.
  ///
  /// ## Failure
  /// * [`PngEncodeError::UnsupportedFormat`] when there's no conversion.
  pub fn select(color_type: PngColorType, source: SourcePixelFormat) -> PngResult<Self> {
    use PngColorType as C;
    use SourcePixelFormat as S;
    let shuffle = |taps: [Tap; 4]| Program::Shuffle { taps, packed: false };
    let packed = |taps: [Tap; 4]| Program::Shuffle { taps, packed: true };
    let program = match (color_type, source) {
      (C::Index, S::Indexed8)
      | (C::Y, S::Gray8)
      | (C::YA, S::GrayAlpha8)
      | (C::RGB, S::Rgb8)
      | (C::RGBA, S::Rgba8) => Program::Copy,
      // greyscale
      (C::Y, S::GrayAlpha8) => shuffle([At(0), Opaque, Opaque, Opaque]),
      (C::YA, S::Gray8) => shuffle([At(0), Opaque, Opaque, Opaque]),
      // rgb
      (C::RGB, S::Gray8 | S::GrayAlpha8) => shuffle([At(0), At(0), At(0), Opaque]),
      (C::RGB, S::Bgr8 | S::Bgra8) => shuffle([At(2), At(1), At(0), Opaque]),
      (C::RGB, S::Rgba8) => shuffle([At(0), At(1), At(2), Opaque]),
      (C::RGB, S::Argb8) => shuffle([At(1), At(2), At(3), Opaque]),
      (C::RGB, S::Abgr8) => shuffle([At(3), At(2), At(1), Opaque]),
      (C::RGB, S::PackedArgb32 | S::PackedRgb32) => packed([At(2), At(1), At(0), Opaque]),
      (C::RGB, S::PackedBgr32) => packed([At(0), At(1), At(2), Opaque]),
      // rgba
      (C::RGBA, S::Gray8) => shuffle([At(0), At(0), At(0), Opaque]),
      (C::RGBA, S::GrayAlpha8) => shuffle([At(0), At(0), At(0), At(1)]),
      (C::RGBA, S::Rgb8) => shuffle([At(0), At(1), At(2), Opaque]),
      (C::RGBA, S::Bgr8) => shuffle([At(2), At(1), At(0), Opaque]),
      (C::RGBA, S::Bgra8) => shuffle([At(2), At(1), At(0), At(3)]),
      (C::RGBA, S::Argb8) => shuffle([At(1), At(2), At(3), At(0)]),
      (C::RGBA, S::Abgr8) => shuffle([At(3), At(2), At(1), At(0)]),
      (C::RGBA, S::PackedArgb32) => packed([At(2), At(1), At(0), At(3)]),
      (C::RGBA, S::PackedRgb32) => packed([At(2), At(1), At(0), Opaque]),
      (C::RGBA, S::PackedBgr32) => packed([At(0), At(1), At(2), Opaque]),
      _ => return Err(PngEncodeError::UnsupportedFormat { color_type, source }),
    };
    Ok(Self { color_type, source, program })
  }

  /// The adapter for `image` under `descriptor`.
  #[inline]
  pub fn for_image<I: RasterImage + ?Sized>(
    descriptor: &ImageDescriptor, image: &I,
  ) -> PngResult<Self> {
    Self::select(descriptor.color_type(), image.pixel_format())
  }

  #[inline]
  #[must_use]
  pub const fn color_type(&self) -> PngColorType {
    self.color_type
  }

  #[inline]
  #[must_use]
  pub const fn source(&self) -> SourcePixelFormat {
    self.source
  }

  /// Writes the canonical scanline of row `y` into `out`, returning it.
  ///
  /// `out` is cleared and resized to `width * channel_count` bytes, so
  /// passing the same buffer every row avoids any per-row allocation.
  ///
  /// ## Failure
  /// * [`PngEncodeError::RowOutOfRange`] if `y` isn't a row of the image.
  /// * [`PngEncodeError::SourceRowTooShort`] if the image gives too few bytes.
  pub fn produce_scanline<'o, I: RasterImage + ?Sized>(
    &self, image: &I, y: u32, out: &'o mut Vec<u8>,
  ) -> PngResult<&'o [u8]> {
    let height = image.height();
    if y >= height {
      return Err(PngEncodeError::RowOutOfRange { row: y, height });
    }
    let width = image.width() as usize;
    let src_bpp = self.source.bytes_per_pixel();
    let channels = self.color_type.channel_count();
    let expected = width * src_bpp;
    let row = image.row_bytes(y).unwrap_or(&[]);
    let row = row.get(..expected).ok_or(PngEncodeError::SourceRowTooShort {
      row: y,
      expected,
      actual: row.len(),
    })?;

    out.clear();
    match self.program {
      Program::Copy => out.extend_from_slice(row),
      Program::Shuffle { taps, packed } => {
        out.resize(width * channels, 0);
        for (dst, src) in out.chunks_exact_mut(channels).zip(row.chunks_exact(src_bpp)) {
          let mut px = [0_u8; 4];
          px[..src_bpp].copy_from_slice(src);
          if packed {
            px = u32::from_ne_bytes(px).to_le_bytes();
          }
          for (d, tap) in dst.iter_mut().zip(taps) {
            *d = match tap {
              At(i) => px[i as usize],
              Opaque => u8::MAX,
            };
          }
        }
      }
    }
    Ok(out.as_slice())
  }
}
