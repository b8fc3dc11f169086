use super::*;

/// The types of color that PNG supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngColorType {
  /// Greyscale
  Y = 0,
  /// Red, Green, Blue
  RGB = 2,
  /// Index into a palette.
  ///
  /// The palette will have RGB8 data. There may optionally be a transparency
  /// chunk.
  Index = 3,
  /// Greyscale + Alpha
  YA = 4,
  /// Red, Green, Blue, Alpha
  RGBA = 6,
}
impl PngColorType {
  /// The number of channels in this type of color.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    match self {
      Self::Y => 1,
      Self::RGB => 3,
      Self::Index => 1,
      Self::YA => 2,
      Self::RGBA => 4,
    }
  }
}

/// The only bit depth this crate writes.
pub const BIT_DEPTH: u8 = 8;

/// Describes the image an encoder will produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageDescriptor {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// bits per channel, must be 8
  pub bit_depth: u8,
  /// For indexed images, if the palette has any transparency.
  pub has_alpha: bool,
  pub is_grayscale: bool,
  pub is_indexed: bool,
}
impl ImageDescriptor {
  #[inline]
  #[must_use]
  pub const fn new(
    width: u32, height: u32, has_alpha: bool, is_grayscale: bool, is_indexed: bool,
  ) -> Self {
    Self { width, height, bit_depth: BIT_DEPTH, has_alpha, is_grayscale, is_indexed }
  }

  /// Describes an image the way its own pixel format suggests.
  ///
  /// Indexed images are marked `has_alpha` when their color table has any
  /// entry that isn't fully opaque.
  pub fn for_image<I: RasterImage + ?Sized>(image: &I) -> PngResult<Self> {
    let format = image.pixel_format();
    let (has_alpha, is_grayscale, is_indexed) = match format {
      SourcePixelFormat::Gray16 | SourcePixelFormat::Rgb565 => {
        return Err(PngEncodeError::UnsupportedFormat {
          color_type: if format.is_grayscale() { PngColorType::Y } else { PngColorType::RGB },
          source: format,
        });
      }
      SourcePixelFormat::Indexed8 => {
        let table = image.color_table().unwrap_or(&[]);
        (table.iter().any(|c| c.a < u8::MAX), false, true)
      }
      other => (other.has_alpha(), other.is_grayscale(), false),
    };
    Ok(Self::new(image.width(), image.height(), has_alpha, is_grayscale, is_indexed))
  }

  /// Checks that a PNG can actually be written for this description.
  pub const fn validate(&self) -> PngResult<()> {
    if self.width == 0 || self.height == 0 || self.width > MAX_DIMENSION || self.height > MAX_DIMENSION
    {
      return Err(PngEncodeError::InvalidDimensions { width: self.width, height: self.height });
    }
    // a row has to be addressable, filter byte and all
    if self.checked_filtered_len().is_none() {
      return Err(PngEncodeError::InvalidDimensions { width: self.width, height: self.height });
    }
    if self.bit_depth != BIT_DEPTH {
      return Err(PngEncodeError::UnsupportedBitDepth(self.bit_depth));
    }
    if self.is_grayscale && self.is_indexed {
      return Err(PngEncodeError::ConflictingColorFlags);
    }
    Ok(())
  }

  /// The PNG color type for this description.
  #[inline]
  #[must_use]
  pub const fn color_type(&self) -> PngColorType {
    match (self.is_indexed, self.is_grayscale, self.has_alpha) {
      (true, _, _) => PngColorType::Index,
      (false, true, true) => PngColorType::YA,
      (false, true, false) => PngColorType::Y,
      (false, false, true) => PngColorType::RGBA,
      (false, false, false) => PngColorType::RGB,
    }
  }

  /// Bytes per complete pixel, which is also the filter's "left" distance.
  #[inline]
  #[must_use]
  pub const fn bytes_per_pixel(&self) -> usize {
    self.color_type().channel_count()
  }

  /// Bytes per unfiltered scanline.
  ///
  /// Only trustworthy once [`validate`](Self::validate) has passed.
  #[inline]
  #[must_use]
  pub const fn scanline_len(&self) -> usize {
    (self.width as usize) * self.bytes_per_pixel()
  }

  /// Bytes per filtered scanline (filter byte included), if that fits in a
  /// `usize`.
  #[inline]
  #[must_use]
  pub const fn checked_filtered_len(&self) -> Option<usize> {
    match (self.width as usize).checked_mul(self.bytes_per_pixel()) {
      Some(len) => len.checked_add(1),
      None => None,
    }
  }

  /// The 13 data bytes of an `IHDR` chunk, in file order.
  ///
  /// Compression, filter, and interlace method are always 0.
  pub(crate) const fn ihdr_payload(&self) -> [u8; 13] {
    let [w0, w1, w2, w3] = self.width.to_be_bytes();
    let [h0, h1, h2, h3] = self.height.to_be_bytes();
    [w0, w1, w2, w3, h0, h1, h2, h3, self.bit_depth, self.color_type() as u8, 0, 0, 0]
  }
}

/// PNG limits both dimensions to 2^31-1.
pub const MAX_DIMENSION: u32 = i32::MAX as u32;
