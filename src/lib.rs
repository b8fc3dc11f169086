#![no_std]
#![cfg_attr(docs_rs, feature(doc_cfg))]

//! A crate for streaming raster images out as PNG data.
//!
//! Rows are converted, filtered, and compressed one at a time, so an image of
//! any height can be written with only a few scanlines of memory. See the
//! [`png`] module for the details.
//!
//! ```
//! use pngstream::{encode_to_vec, pixels::RGBA8888, Bitmap, EncoderConfig};
//! let red = RGBA8888 { r: 255, g: 0, b: 0, a: 255 };
//! let image = Bitmap::new_filled(8, 8, red);
//! let png = encode_to_vec(&image, EncoderConfig::default()).unwrap();
//! assert_eq!(&png[1..4], b"PNG");
//! ```

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

mod error;
pub use error::*;

pub mod pixels;

pub mod image;
pub use image::{Bitmap, Palmap, RasterImage, RawImage, SourcePixelFormat};

pub mod sink;
pub use sink::*;

pub mod png;
pub use png::{
  encode_image, encode_to_vec, Encoder, EncoderConfig, EncoderState, FilterMode, FilterType,
  ImageDescriptor, Palette,
};
