//! Plain-old-data pixel structs, one per supported source memory layout.
//!
//! The struct names give the channels in memory order. The `Packed*` types are
//! a single native-endian `u32`, named by the channels from the most
//! significant byte down, the way `0xAARRGGBB` style integer pixels are
//! usually described.

use bytemuck::{Pod, Zeroable};

use crate::image::SourcePixelFormat;

/// A pixel type that can be handed to the encoder as-is.
///
/// The bytes of a `[Self]` must be laid out the way [`Self::FORMAT`]
/// describes.
pub trait SourcePixel: Pod {
  /// The memory layout of this pixel type.
  const FORMAT: SourcePixelFormat;
}

/// An 8-bit greyscale pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Zeroable, Pod)]
#[repr(C)]
#[allow(missing_docs)]
pub struct Y8 {
  pub y: u8,
}

/// An 8-bits per channel greyscale + alpha pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Zeroable, Pod)]
#[repr(C)]
#[allow(missing_docs)]
pub struct YA8 {
  pub y: u8,
  pub a: u8,
}

/// Red/Green/Blue, u8 per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Zeroable, Pod)]
#[repr(C)]
#[allow(missing_docs)]
pub struct RGB888 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}

/// Blue/Green/Red, u8 per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Zeroable, Pod)]
#[repr(C)]
#[allow(missing_docs)]
pub struct BGR888 {
  pub b: u8,
  pub g: u8,
  pub r: u8,
}

/// Red/Green/Blue/Alpha, u8 per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Zeroable, Pod)]
#[repr(C)]
#[allow(missing_docs)]
pub struct RGBA8888 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}

/// Blue/Green/Red/Alpha, u8 per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Zeroable, Pod)]
#[repr(C)]
#[allow(missing_docs)]
pub struct BGRA8888 {
  pub b: u8,
  pub g: u8,
  pub r: u8,
  pub a: u8,
}
impl From<RGBA8888> for BGRA8888 {
  #[inline]
  fn from(RGBA8888 { r, g, b, a }: RGBA8888) -> Self {
    Self { r, g, b, a }
  }
}

/// Alpha/Red/Green/Blue, u8 per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Zeroable, Pod)]
#[repr(C)]
#[allow(missing_docs)]
pub struct ARGB8888 {
  pub a: u8,
  pub r: u8,
  pub g: u8,
  pub b: u8,
}
impl From<RGBA8888> for ARGB8888 {
  #[inline]
  fn from(RGBA8888 { r, g, b, a }: RGBA8888) -> Self {
    Self { r, g, b, a }
  }
}

/// Alpha/Blue/Green/Red, u8 per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Zeroable, Pod)]
#[repr(C)]
#[allow(missing_docs)]
pub struct ABGR8888 {
  pub a: u8,
  pub b: u8,
  pub g: u8,
  pub r: u8,
}
impl From<RGBA8888> for ABGR8888 {
  #[inline]
  fn from(RGBA8888 { r, g, b, a }: RGBA8888) -> Self {
    Self { r, g, b, a }
  }
}

/// `0xAARRGGBB` in a native-endian `u32`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Zeroable, Pod)]
#[repr(transparent)]
pub struct PackedARGB(pub u32);
impl From<RGBA8888> for PackedARGB {
  #[inline]
  fn from(RGBA8888 { r, g, b, a }: RGBA8888) -> Self {
    Self(u32::from_be_bytes([a, r, g, b]))
  }
}

/// `0x00RRGGBB` in a native-endian `u32`, the top byte is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Zeroable, Pod)]
#[repr(transparent)]
pub struct PackedXRGB(pub u32);
impl From<RGBA8888> for PackedXRGB {
  #[inline]
  fn from(RGBA8888 { r, g, b, a: _ }: RGBA8888) -> Self {
    Self(u32::from_be_bytes([0, r, g, b]))
  }
}

/// `0x00BBGGRR` in a native-endian `u32`, the top byte is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Zeroable, Pod)]
#[repr(transparent)]
pub struct PackedXBGR(pub u32);
impl From<RGBA8888> for PackedXBGR {
  #[inline]
  fn from(RGBA8888 { r, g, b, a: _ }: RGBA8888) -> Self {
    Self(u32::from_be_bytes([0, b, g, r]))
  }
}

impl SourcePixel for Y8 {
  const FORMAT: SourcePixelFormat = SourcePixelFormat::Gray8;
}
impl SourcePixel for YA8 {
  const FORMAT: SourcePixelFormat = SourcePixelFormat::GrayAlpha8;
}
impl SourcePixel for RGB888 {
  const FORMAT: SourcePixelFormat = SourcePixelFormat::Rgb8;
}
impl SourcePixel for BGR888 {
  const FORMAT: SourcePixelFormat = SourcePixelFormat::Bgr8;
}
impl SourcePixel for RGBA8888 {
  const FORMAT: SourcePixelFormat = SourcePixelFormat::Rgba8;
}
impl SourcePixel for BGRA8888 {
  const FORMAT: SourcePixelFormat = SourcePixelFormat::Bgra8;
}
impl SourcePixel for ARGB8888 {
  const FORMAT: SourcePixelFormat = SourcePixelFormat::Argb8;
}
impl SourcePixel for ABGR8888 {
  const FORMAT: SourcePixelFormat = SourcePixelFormat::Abgr8;
}
impl SourcePixel for PackedARGB {
  const FORMAT: SourcePixelFormat = SourcePixelFormat::PackedArgb32;
}
impl SourcePixel for PackedXRGB {
  const FORMAT: SourcePixelFormat = SourcePixelFormat::PackedRgb32;
}
impl SourcePixel for PackedXBGR {
  const FORMAT: SourcePixelFormat = SourcePixelFormat::PackedBgr32;
}
