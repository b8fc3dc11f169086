//! Holds all the tools for encoding PNG data.
//!
//! ## Automated PNG Encoding
//! If you have a whole image in memory, [`encode_to_vec`] and
//! [`encode_image`] will pick the PNG color type, write the palette if needed,
//! and stream every row for you.
//!
//! ## Encoding a PNG Yourself
//! An [`Encoder`] lets you feed the image one row at a time, so the full image
//! never needs to exist in memory at once.
//!
//! The general format of a PNG is that the information is stored in "chunks".
//! This crate writes the four "critical" chunk types, plus transparency:
//! * **Header** (`IHDR`) - The image's dimensions and pixel format. Always 8
//!   bits per channel, never interlaced.
//! * **Palette** (`PLTE`) - Indexed images only, what index values map to what
//!   `RGB8` values. When any entry isn't opaque a **Transparency** (`tRNS`)
//!   chunk with one alpha per entry follows it.
//! * **Image Data** (`IDAT`) - One or more chunks of compressed data. All of
//!   the compressed data forms a single zlib data stream, split into chunks of
//!   at most [`EncoderConfig::idat_max_len`] bytes.
//! * **End** (`IEND`) - The last chunk, lets a reader know the PNG wasn't
//!   truncated accidentally.
//!
//! ### Step By Step
//!
//! ```
//! use pngstream::png::*;
//! let rows: [[u8; 6]; 2] = [[255, 0, 0, 0, 255, 0], [0, 0, 255, 255, 255, 255]];
//! let descriptor = ImageDescriptor::new(2, 2, false, false, false);
//! let mut encoder = Encoder::new(Vec::new(), descriptor, EncoderConfig::default()).unwrap();
//! encoder.write_header().unwrap();
//! for (y, row) in rows.iter().enumerate() {
//!   encoder.write_scanline(y as u32, row).unwrap();
//! }
//! encoder.finish().unwrap();
//! let png: Vec<u8> = encoder.into_sink();
//! ```
//!
//! Each row is converted to the PNG's own channel layout (the "canonical"
//! scanline), gets a filter picked by the [`FilterMode`], and goes through the
//! compressor. Only the current and previous scanlines are held onto.

use core::fmt::{Debug, Write};

use alloc::{boxed::Box, vec::Vec};
use log::{debug, trace, warn};
use pixel_formats::r8g8b8a8_Srgb;

use crate::{
  image::{RasterImage, SourcePixelFormat},
  sink::ByteSink,
  PngEncodeError, PngResult,
};

mod crc32;
pub use crc32::*;

mod chunk;
pub use chunk::*;

mod ihdr;
pub use ihdr::*;

mod palette;
pub use palette::*;

mod filter;
pub use filter::*;

mod scanline;
pub use scanline::*;

mod compress;
pub use compress::*;

mod encoder;
pub use encoder::*;
