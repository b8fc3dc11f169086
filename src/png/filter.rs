//! From the PNG standard:
//!
//! > Filters are applied to **bytes**, not to pixels, regardless of the bit
//! > depth or color type of the image.
//!
//! Every filter compares each byte `x` with up to three neighbors:
//! * `a`: the same channel of the pixel to the left (0 for the first pixel).
//! * `b`: the byte directly above, in the previous scanline (0 on the first
//!   line).
//! * `c`: the same channel of the pixel above and to the left.

use super::*;

/// The five PNG filter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FilterType {
  None = 0,
  Sub = 1,
  Up = 2,
  Average = 3,
  Paeth = 4,
}
impl FilterType {
  /// All filter types, in filter byte order.
  pub const ALL: [Self; 5] = [Self::None, Self::Sub, Self::Up, Self::Average, Self::Paeth];
}

/// How a filter is picked for each row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FilterMode {
  /// Always use this filter.
  Fixed(FilterType),
  /// Try every filter, keep the smallest sum of absolute (signed) bytes.
  Adaptive,
  /// Like `Adaptive`, but the cost also counts how many distinct byte values
  /// the row uses. Slower, sometimes compresses a little better.
  AdaptiveAggressive,
  /// No filtering for indexed images and `Adaptive` for everything else.
  #[default]
  Auto,
}
impl FilterMode {
  /// Resolves `Auto` for a particular color type.
  #[inline]
  #[must_use]
  pub const fn resolve(self, color_type: PngColorType) -> Self {
    match self {
      Self::Auto => match color_type {
        PngColorType::Index => Self::Fixed(FilterType::None),
        _ => Self::Adaptive,
      },
      other => other,
    }
  }
}

/// Filters one scanline.
///
/// * `previous` is the unfiltered scanline above, `None` for the first line.
/// * `bpp` is the number of bytes per complete pixel.
/// * `out` must be the same length as `current`.
///
/// ## Panics
/// * If `out` or `previous` isn't the same length as `current`.
/// * If `bpp` is 0.
pub fn filter_scanline(
  filter: FilterType, current: &[u8], previous: Option<&[u8]>, bpp: usize, out: &mut [u8],
) {
  assert_eq!(current.len(), out.len(), "output length must match the scanline");
  assert!(
    previous.map_or(true, |p| p.len() == current.len()),
    "previous scanline length must match the scanline"
  );
  assert!(bpp > 0, "bytes per pixel can't be 0");
  match (filter, previous) {
    (FilterType::None, _) => out.copy_from_slice(current),
    (FilterType::Sub, _) | (FilterType::Paeth, None) => {
      // with no line above, paeth always predicts the left byte
      let split = bpp.min(current.len());
      let (head, tail) = out.split_at_mut(split);
      head.copy_from_slice(&current[..split]);
      for ((o, x), a) in tail.iter_mut().zip(&current[split..]).zip(current) {
        *o = filter_sub(*x, *a);
      }
    }
    (FilterType::Up, None) => out.copy_from_slice(current),
    (FilterType::Up, Some(prev)) => {
      for ((o, x), b) in out.iter_mut().zip(current).zip(prev) {
        *o = filter_up(*x, *b);
      }
    }
    (FilterType::Average, _) => {
      for (i, (o, x)) in out.iter_mut().zip(current).enumerate() {
        let a = if i >= bpp { current[i - bpp] } else { 0 };
        let b = previous.map_or(0, |p| p[i]);
        *o = filter_average(*x, a, b);
      }
    }
    (FilterType::Paeth, Some(prev)) => {
      for (i, (o, x)) in out.iter_mut().zip(current).enumerate() {
        let (a, c) = if i >= bpp { (current[i - bpp], prev[i - bpp]) } else { (0, 0) };
        *o = filter_paeth(*x, a, prev[i], c);
      }
    }
  }
}

/// Filter Type 1
#[inline]
const fn filter_sub(x: u8, a: u8) -> u8 {
  x.wrapping_sub(a)
}

/// Filter Type 2
#[inline]
const fn filter_up(x: u8, b: u8) -> u8 {
  x.wrapping_sub(b)
}

/// Filter Type 3
///
/// The sum is done at 16 bits, the average of `a` and `b` can't overflow.
#[inline]
const fn filter_average(x: u8, a: u8, b: u8) -> u8 {
  x.wrapping_sub(((a as u16 + b as u16) / 2) as u8)
}

/// Filter Type 4
#[inline]
const fn filter_paeth(x: u8, a: u8, b: u8, c: u8) -> u8 {
  x.wrapping_sub(paeth_predictor(a, b, c))
}

/// The Paeth filter function computes a simple linear function of the three
/// neighboring pixels (left `a`, above `b`, upper left `c`).
///
/// The output is the "predictor" of the neighboring pixel closest to the
/// computed value, with ties going to `a`, then `b`, then `c`.
#[inline]
#[must_use]
pub const fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
  // p can go from -255 to 510, and must not wrap, so the math is done in i32
  let a = a as i32;
  let b = b as i32;
  let c = c as i32;
  let p = a + b - c;
  let pa = (p - a).abs();
  let pb = (p - b).abs();
  let pc = (p - c).abs();
  if pa <= pb && pa <= pc {
    a as u8
  } else if pb <= pc {
    b as u8
  } else {
    c as u8
  }
}

/// Sum of the bytes as signed values, so both 0x01 and 0xFF cost 1.
///
/// Small values mean the filter predicted well, which usually means the row
/// will compress well.
#[inline]
#[must_use]
pub fn signed_abs_sum(filtered: &[u8]) -> u64 {
  filtered.iter().map(|&byte| u64::from((byte as i8).unsigned_abs())).sum()
}

/// How many different byte values appear.
#[inline]
#[must_use]
pub fn distinct_byte_values(filtered: &[u8]) -> u32 {
  let mut seen = [0_u64; 4];
  for &byte in filtered {
    seen[usize::from(byte >> 6)] |= 1 << (byte & 63);
  }
  seen.iter().map(|bits| bits.count_ones()).sum()
}

/// Scales the distinct value count in the aggressive cost: one distinct value
/// weighs as much as an absolute sum of `ceil(row_len / 16)`.
pub const AGGRESSIVE_DISTINCT_DIVISOR: usize = 16;

/// The aggressive mode cost of a filtered row.
#[inline]
#[must_use]
pub fn aggressive_cost(filtered: &[u8]) -> u64 {
  let weight = filtered.len().div_ceil(AGGRESSIVE_DISTINCT_DIVISOR) as u64;
  signed_abs_sum(filtered) + u64::from(distinct_byte_values(filtered)) * weight
}

/// Picks and applies a filter for each scanline.
///
/// The selector only keeps scratch space between rows, never row data, so the
/// caller must pass the correct previous scanline every time.
#[derive(Debug, Clone, Default)]
pub struct FilterSelector {
  scratch: [Vec<u8>; 5],
}
impl FilterSelector {
  #[inline]
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Filters `current` according to `mode`.
  ///
  /// `Auto` should be [resolved](FilterMode::resolve) first; if it isn't, it
  /// acts like `Adaptive`.
  ///
  /// ## Panics
  /// Same as [`filter_scanline`]: a `previous` of the wrong length, or a `bpp`
  /// of 0.
  pub fn select_and_apply(
    &mut self, current: &[u8], previous: Option<&[u8]>, bpp: usize, mode: FilterMode,
  ) -> (FilterType, &[u8]) {
    let chosen = match mode {
      FilterMode::Fixed(filter) => {
        self.apply(filter, current, previous, bpp);
        filter
      }
      FilterMode::Adaptive | FilterMode::Auto => {
        self.pick_cheapest(current, previous, bpp, signed_abs_sum)
      }
      FilterMode::AdaptiveAggressive => {
        self.pick_cheapest(current, previous, bpp, aggressive_cost)
      }
    };
    (chosen, &self.scratch[chosen as usize])
  }

  fn apply(&mut self, filter: FilterType, current: &[u8], previous: Option<&[u8]>, bpp: usize) {
    let out = &mut self.scratch[filter as usize];
    out.clear();
    out.resize(current.len(), 0);
    filter_scanline(filter, current, previous, bpp, out);
  }

  fn pick_cheapest(
    &mut self, current: &[u8], previous: Option<&[u8]>, bpp: usize, cost: fn(&[u8]) -> u64,
  ) -> FilterType {
    let mut best = (FilterType::None, u64::MAX);
    for filter in FilterType::ALL {
      self.apply(filter, current, previous, bpp);
      let c = cost(&self.scratch[filter as usize]);
      // strictly less, so ties keep the lower filter type
      if c < best.1 {
        best = (filter, c);
      }
    }
    best.0
  }
}
