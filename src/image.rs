#![forbid(unsafe_code)]

//! Source images for the encoder.
//!
//! The encoder never looks at a concrete image type, only at the
//! [`RasterImage`] trait: dimensions, the [`SourcePixelFormat`] of the bytes,
//! the bytes of one row at a time, and (for indexed images) the color table.

use alloc::vec::Vec;

use pixel_formats::r8g8b8a8_Srgb;

use crate::pixels::SourcePixel;

/// Every pixel memory layout that a [`RasterImage`] can report.
///
/// Not every layout can be encoded: the 16-bit formats exist so that images
/// holding them get a proper error instead of garbage output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourcePixelFormat {
  /// `y`
  Gray8,
  /// `y a`
  GrayAlpha8,
  /// `r g b`
  Rgb8,
  /// `b g r`
  Bgr8,
  /// `r g b a`
  Rgba8,
  /// `b g r a`
  Bgra8,
  /// `a r g b`
  Argb8,
  /// `a b g r`
  Abgr8,
  /// native-endian `u32` holding `0xAARRGGBB`
  PackedArgb32,
  /// native-endian `u32` holding `0x00RRGGBB`
  PackedRgb32,
  /// native-endian `u32` holding `0x00BBGGRR`
  PackedBgr32,
  /// one palette index per byte
  Indexed8,
  /// native-endian `u16` greyscale
  Gray16,
  /// native-endian `u16` holding 5 bits red, 6 bits green, 5 bits blue
  Rgb565,
}
impl SourcePixelFormat {
  /// Bytes used by one pixel of this format.
  #[inline]
  #[must_use]
  pub const fn bytes_per_pixel(self) -> usize {
    match self {
      Self::Gray8 | Self::Indexed8 => 1,
      Self::GrayAlpha8 | Self::Gray16 | Self::Rgb565 => 2,
      Self::Rgb8 | Self::Bgr8 => 3,
      Self::Rgba8
      | Self::Bgra8
      | Self::Argb8
      | Self::Abgr8
      | Self::PackedArgb32
      | Self::PackedRgb32
      | Self::PackedBgr32 => 4,
    }
  }

  /// If the format carries an alpha channel.
  #[inline]
  #[must_use]
  pub const fn has_alpha(self) -> bool {
    matches!(
      self,
      Self::GrayAlpha8 | Self::Rgba8 | Self::Bgra8 | Self::Argb8 | Self::Abgr8 | Self::PackedArgb32
    )
  }

  /// If the format is greyscale.
  #[inline]
  #[must_use]
  pub const fn is_grayscale(self) -> bool {
    matches!(self, Self::Gray8 | Self::GrayAlpha8 | Self::Gray16)
  }
}

/// An image that can be read one row at a time.
pub trait RasterImage {
  /// Width in pixels.
  fn width(&self) -> u32;

  /// Height in pixels.
  fn height(&self) -> u32;

  /// How the bytes of each row are laid out.
  fn pixel_format(&self) -> SourcePixelFormat;

  /// The bytes of row `y`, or `None` if `y` is out of bounds.
  ///
  /// The slice must hold at least `width * bytes_per_pixel` bytes. Anything
  /// after that is ignored.
  fn row_bytes(&self, y: u32) -> Option<&[u8]>;

  /// The color table of an indexed image.
  #[inline]
  fn color_table(&self) -> Option<&[r8g8b8a8_Srgb]> {
    None
  }
}

/// An owned direct-color image.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub struct Bitmap<P> {
  pub width: u32,
  pub height: u32,
  pub pixels: Vec<P>,
}
impl<P: Clone> Bitmap<P> {
  /// Makes an image with every pixel set to `pixel`.
  #[inline]
  #[must_use]
  pub fn new_filled(width: u32, height: u32, pixel: P) -> Self {
    let pixels = alloc::vec![pixel; (width as usize) * (height as usize)];
    Self { width, height, pixels }
  }
}
impl<P> Bitmap<P> {
  /// Gets the pixel at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut P> {
    if x < self.width && y < self.height {
      self.pixels.get_mut(xy_width_to_index(x, y, self.width))
    } else {
      None
    }
  }
}
impl<P: SourcePixel> RasterImage for Bitmap<P> {
  #[inline]
  fn width(&self) -> u32 {
    self.width
  }
  #[inline]
  fn height(&self) -> u32 {
    self.height
  }
  #[inline]
  fn pixel_format(&self) -> SourcePixelFormat {
    P::FORMAT
  }
  #[inline]
  fn row_bytes(&self, y: u32) -> Option<&[u8]> {
    if y >= self.height {
      return None;
    }
    let start = xy_width_to_index(0, y, self.width);
    let row = self.pixels.get(start..start + self.width as usize)?;
    Some(bytemuck::cast_slice(row))
  }
}

/// An owned indexed-color image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Palmap {
  pub width: u32,
  pub height: u32,
  pub indexes: Vec<u8>,
  pub palette: Vec<r8g8b8a8_Srgb>,
}
impl Palmap {
  /// Gets the index at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut u8> {
    if x < self.width && y < self.height {
      self.indexes.get_mut(xy_width_to_index(x, y, self.width))
    } else {
      None
    }
  }
}
impl RasterImage for Palmap {
  #[inline]
  fn width(&self) -> u32 {
    self.width
  }
  #[inline]
  fn height(&self) -> u32 {
    self.height
  }
  #[inline]
  fn pixel_format(&self) -> SourcePixelFormat {
    SourcePixelFormat::Indexed8
  }
  #[inline]
  fn row_bytes(&self, y: u32) -> Option<&[u8]> {
    if y >= self.height {
      return None;
    }
    let start = xy_width_to_index(0, y, self.width);
    self.indexes.get(start..start + self.width as usize)
  }
  #[inline]
  fn color_table(&self) -> Option<&[r8g8b8a8_Srgb]> {
    Some(&self.palette)
  }
}

/// A borrow of pixel bytes in any [`SourcePixelFormat`].
///
/// Rows start every `stride` bytes, so padded rows or sub-images of a bigger
/// buffer work fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct RawImage<'a> {
  pub width: u32,
  pub height: u32,
  pub format: SourcePixelFormat,
  pub stride: usize,
  pub data: &'a [u8],
  pub palette: Option<&'a [r8g8b8a8_Srgb]>,
}
impl<'a> RawImage<'a> {
  /// A tightly packed image, rows with no padding between them.
  #[inline]
  #[must_use]
  pub const fn packed(width: u32, height: u32, format: SourcePixelFormat, data: &'a [u8]) -> Self {
    let stride = (width as usize) * format.bytes_per_pixel();
    Self { width, height, format, stride, data, palette: None }
  }

  /// Attaches a color table, for indexed data.
  #[inline]
  #[must_use]
  pub const fn with_palette(self, palette: &'a [r8g8b8a8_Srgb]) -> Self {
    Self { palette: Some(palette), ..self }
  }
}
impl RasterImage for RawImage<'_> {
  #[inline]
  fn width(&self) -> u32 {
    self.width
  }
  #[inline]
  fn height(&self) -> u32 {
    self.height
  }
  #[inline]
  fn pixel_format(&self) -> SourcePixelFormat {
    self.format
  }
  #[inline]
  fn row_bytes(&self, y: u32) -> Option<&[u8]> {
    if y >= self.height {
      return None;
    }
    let start = (y as usize).checked_mul(self.stride)?;
    let end = start.saturating_add(self.stride).min(self.data.len());
    self.data.get(start..end)
  }
  #[inline]
  fn color_table(&self) -> Option<&[r8g8b8a8_Srgb]> {
    self.palette
  }
}

/// Converts an `(x,y)` position within a given `width` 2D space into a linear
/// index.
#[inline]
#[must_use]
pub const fn xy_width_to_index(x: u32, y: u32, width: u32) -> usize {
  (y as usize) * (width as usize) + (x as usize)
}
