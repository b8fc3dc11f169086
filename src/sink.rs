#![forbid(unsafe_code)]

//! Where encoded bytes go.

use alloc::vec::Vec;

use crate::{PngEncodeError, PngResult};

/// A destination for the encoded byte stream.
///
/// Writes are all-or-nothing from the encoder's point of view: a sink either
/// takes every byte it's given or reports [`PngEncodeError::Sink`]. Retrying
/// is up to the sink.
pub trait ByteSink {
  /// Append all of `bytes` to the output.
  fn write_bytes(&mut self, bytes: &[u8]) -> PngResult<()>;
}

impl ByteSink for Vec<u8> {
  #[inline]
  fn write_bytes(&mut self, bytes: &[u8]) -> PngResult<()> {
    self.try_reserve(bytes.len()).map_err(|_| PngEncodeError::Sink)?;
    self.extend_from_slice(bytes);
    Ok(())
  }
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
  #[inline]
  fn write_bytes(&mut self, bytes: &[u8]) -> PngResult<()> {
    (**self).write_bytes(bytes)
  }
}

/// Adapts any [`std::io::Write`] into a [`ByteSink`].
///
/// The encoder's error type is `Copy`, so the actual `io::Error` of a failed
/// write is kept here instead, and can be retrieved with
/// [`take_error`](Self::take_error).
#[cfg(feature = "std")]
#[cfg_attr(docs_rs, doc(cfg(feature = "std")))]
#[derive(Debug)]
pub struct IoSink<W> {
  inner: W,
  last_error: Option<std::io::Error>,
}
#[cfg(feature = "std")]
impl<W: std::io::Write> IoSink<W> {
  /// Wraps a writer.
  #[inline]
  #[must_use]
  pub const fn new(inner: W) -> Self {
    Self { inner, last_error: None }
  }

  /// The error from the most recent failed write, if any.
  #[inline]
  pub fn take_error(&mut self) -> Option<std::io::Error> {
    self.last_error.take()
  }

  /// Gets the writer back.
  #[inline]
  pub fn into_inner(self) -> W {
    self.inner
  }
}
#[cfg(feature = "std")]
impl<W: std::io::Write> ByteSink for IoSink<W> {
  fn write_bytes(&mut self, bytes: &[u8]) -> PngResult<()> {
    match self.inner.write_all(bytes) {
      Ok(()) => Ok(()),
      Err(e) => {
        log::error!("sink rejected {} bytes: {e}", bytes.len());
        self.last_error = Some(e);
        Err(PngEncodeError::Sink)
      }
    }
  }
}
