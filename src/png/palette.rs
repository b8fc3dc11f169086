use super::*;

/// Most entries an 8-bit index can address.
pub const MAX_PALETTE_ENTRIES: usize = 1 << BIT_DEPTH;

/// One color of a palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
  /// Position within the palette, which is what the pixels store.
  pub index: u8,
  pub color: r8g8b8a8_Srgb,
}

/// The color table of an indexed image, in index order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
  entries: Vec<PaletteEntry>,
  has_transparency: bool,
}
impl Palette {
  /// Builds a palette from colors in index order.
  ///
  /// ## Failure
  /// * More than 256 colors.
  /// * No colors at all.
  pub fn from_colors(colors: &[r8g8b8a8_Srgb]) -> PngResult<Self> {
    if colors.len() > MAX_PALETTE_ENTRIES {
      return Err(PngEncodeError::PaletteTooLarge { entries: colors.len() });
    }
    if colors.is_empty() {
      return Err(PngEncodeError::MissingPalette);
    }
    let entries: Vec<PaletteEntry> = colors
      .iter()
      .zip(0..=u8::MAX)
      .map(|(&color, index)| PaletteEntry { index, color })
      .collect();
    let has_transparency = entries.iter().any(|e| e.color.a < u8::MAX);
    Ok(Self { entries, has_transparency })
  }

  #[inline]
  #[must_use]
  pub fn entries(&self) -> &[PaletteEntry] {
    &self.entries
  }

  #[inline]
  #[must_use]
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// If any entry is less than fully opaque.
  #[inline]
  #[must_use]
  pub const fn has_transparency(&self) -> bool {
    self.has_transparency
  }

  /// `PLTE` data: `r g b` for each entry.
  #[must_use]
  pub fn plte_payload(&self) -> Vec<u8> {
    self.entries.iter().flat_map(|e| [e.color.r, e.color.g, e.color.b]).collect()
  }

  /// `tRNS` data: one alpha per entry, only when the palette has
  /// transparency.
  #[must_use]
  pub fn trns_payload(&self) -> Option<Vec<u8>> {
    if self.has_transparency {
      Some(self.entries.iter().map(|e| e.color.a).collect())
    } else {
      None
    }
  }
}

/// Pulls the palette out of an indexed image.
pub fn extract_palette<I: RasterImage + ?Sized>(image: &I) -> PngResult<Palette> {
  let table = image.color_table().ok_or(PngEncodeError::MissingPalette)?;
  let palette = Palette::from_colors(table)?;
  debug!(
    "extracted {} palette entries, transparency: {}",
    palette.len(),
    palette.has_transparency()
  );
  Ok(palette)
}
