use pngstream::{
  encode_to_vec,
  pixels::{RGBA8888, Y8},
  png::*,
  Bitmap, ErrorKind, IoSink, Palmap, PngEncodeError, RawImage, SourcePixelFormat,
};
use pixel_formats::r8g8b8a8_Srgb;

mod reader;
use reader::decode;

use super::rand_bytes;

const ENCODABLE_FORMATS: [SourcePixelFormat; 11] = [
  SourcePixelFormat::Gray8,
  SourcePixelFormat::GrayAlpha8,
  SourcePixelFormat::Rgb8,
  SourcePixelFormat::Bgr8,
  SourcePixelFormat::Rgba8,
  SourcePixelFormat::Bgra8,
  SourcePixelFormat::Argb8,
  SourcePixelFormat::Abgr8,
  SourcePixelFormat::PackedArgb32,
  SourcePixelFormat::PackedRgb32,
  SourcePixelFormat::PackedBgr32,
];

const ALL_MODES: [FilterMode; 8] = [
  FilterMode::Fixed(FilterType::None),
  FilterMode::Fixed(FilterType::Sub),
  FilterMode::Fixed(FilterType::Up),
  FilterMode::Fixed(FilterType::Average),
  FilterMode::Fixed(FilterType::Paeth),
  FilterMode::Adaptive,
  FilterMode::AdaptiveAggressive,
  FilterMode::Auto,
];

/// What one source pixel should become, worked out channel by channel.
fn expected_pixel(format: SourcePixelFormat, px: &[u8]) -> Vec<u8> {
  use SourcePixelFormat as S;
  let packed = || u32::from_ne_bytes(px.try_into().unwrap());
  match format {
    S::Gray8 | S::GrayAlpha8 | S::Rgb8 | S::Rgba8 => px.to_vec(),
    S::Bgr8 => vec![px[2], px[1], px[0]],
    S::Bgra8 => vec![px[2], px[1], px[0], px[3]],
    S::Argb8 => vec![px[1], px[2], px[3], px[0]],
    S::Abgr8 => vec![px[3], px[2], px[1], px[0]],
    S::PackedArgb32 => {
      let v = packed();
      vec![(v >> 16) as u8, (v >> 8) as u8, v as u8, (v >> 24) as u8]
    }
    S::PackedRgb32 => {
      let v = packed();
      vec![(v >> 16) as u8, (v >> 8) as u8, v as u8]
    }
    S::PackedBgr32 => {
      let v = packed();
      vec![v as u8, (v >> 8) as u8, (v >> 16) as u8]
    }
    other => panic!("{other:?} isn't encodable"),
  }
}

fn expected_color_type(format: SourcePixelFormat) -> u8 {
  match (format.is_grayscale(), format.has_alpha()) {
    (true, false) => 0,
    (true, true) => 4,
    (false, false) => 2,
    (false, true) => 6,
  }
}

#[test_log::test]
fn test_round_trip_every_format_mode_and_level() {
  let (width, height) = (13_u32, 7_u32);
  for format in ENCODABLE_FORMATS {
    let data = rand_bytes(width as usize * height as usize * format.bytes_per_pixel());
    let image = RawImage::packed(width, height, format, &data);
    let expected: Vec<u8> = data
      .chunks_exact(format.bytes_per_pixel())
      .flat_map(|px| expected_pixel(format, px))
      .collect();
    for mode in ALL_MODES {
      for level in [0, 1, 6, 9] {
        let config =
          EncoderConfig::default().with_filter_mode(mode).with_compression_level(level);
        let png = encode_to_vec(&image, config).unwrap();
        let decoded = decode(&png);
        assert_eq!((decoded.width, decoded.height), (width, height));
        assert_eq!(decoded.bit_depth, 8);
        assert_eq!(decoded.color_type, expected_color_type(format), "{format:?}");
        assert_eq!(decoded.pixels, expected, "{format:?} {mode:?} level {level}");
        if let FilterMode::Fixed(filter) = mode {
          assert!(decoded.filters.iter().all(|&f| f == filter as u8));
        }
      }
    }
  }
}

#[test_log::test]
fn test_round_trip_indexed() {
  let palette: Vec<r8g8b8a8_Srgb> = rand_bytes(40 * 4)
    .chunks_exact(4)
    .map(|c| r8g8b8a8_Srgb { r: c[0], g: c[1], b: c[2], a: c[3] })
    .collect();
  let indexes: Vec<u8> = rand_bytes(17 * 9).into_iter().map(|i| i % 40).collect();
  let palmap = Palmap { width: 17, height: 9, indexes: indexes.clone(), palette: palette.clone() };
  for mode in ALL_MODES {
    let png = encode_to_vec(&palmap, EncoderConfig::default().with_filter_mode(mode)).unwrap();
    let decoded = decode(&png);
    assert_eq!(decoded.color_type, 3);
    assert_eq!(decoded.pixels, indexes);
    let plte = decoded.plte.unwrap();
    assert_eq!(plte.len(), 40 * 3);
    for (i, color) in palette.iter().enumerate() {
      assert_eq!(&plte[i * 3..i * 3 + 3], &[color.r, color.g, color.b]);
    }
    if palette.iter().any(|c| c.a < 255) {
      let alphas: Vec<u8> = palette.iter().map(|c| c.a).collect();
      assert_eq!(decoded.trns, Some(alphas));
    } else {
      assert_eq!(decoded.trns, None);
    }
    if mode == FilterMode::Auto {
      assert!(decoded.filters.iter().all(|&f| f == 0));
    }
  }
}

#[test_log::test]
fn test_opaque_red_8x8() {
  let image = Bitmap::new_filled(8, 8, RGBA8888 { r: 255, g: 0, b: 0, a: 255 });
  let config = EncoderConfig::default()
    .with_filter_mode(FilterMode::Fixed(FilterType::None))
    .with_compression_level(0);
  let decoded = decode(&encode_to_vec(&image, config).unwrap());
  assert_eq!(decoded.color_type, 6);
  assert_eq!(
    decoded.chunk_types,
    vec![*b"IHDR", *b"IDAT", *b"IEND"]
  );
  assert_eq!(decoded.filters, vec![0; 8]);
  assert_eq!(decoded.pixels.len(), 64 * 4);
  assert!(decoded.pixels.chunks_exact(4).all(|px| px == [255, 0, 0, 255]));
}

#[test_log::test]
fn test_indexed_transparency_8x8() {
  let palmap = Palmap {
    width: 8,
    height: 8,
    indexes: (0..64).map(|i| (i % 2) as u8).collect(),
    palette: vec![
      r8g8b8a8_Srgb { r: 0, g: 0, b: 255, a: 255 },
      r8g8b8a8_Srgb { r: 0, g: 0, b: 0, a: 0 },
    ],
  };
  let decoded = decode(&encode_to_vec(&palmap, EncoderConfig::default()).unwrap());
  assert_eq!(
    decoded.chunk_types,
    vec![*b"IHDR", *b"PLTE", *b"tRNS", *b"IDAT", *b"IEND"]
  );
  assert_eq!(decoded.plte, Some(vec![0, 0, 255, 0, 0, 0]));
  assert_eq!(decoded.trns, Some(vec![255, 0]));
}

#[test_log::test]
fn test_gray_row_with_sub_filter() {
  let data = [10_u8, 20, 30, 40];
  let image = RawImage::packed(4, 1, SourcePixelFormat::Gray8, &data);
  let config = EncoderConfig::default().with_filter_mode(FilterMode::Fixed(FilterType::Sub));
  let decoded = decode(&encode_to_vec(&image, config).unwrap());
  assert_eq!(decoded.inflated, vec![1, 10, 10, 10, 10]);
  assert_eq!(decoded.pixels, data);
}

#[test_log::test]
fn test_idat_payloads_respect_max_len() {
  let data = rand_bytes(64 * 64 * 4);
  let image = RawImage::packed(64, 64, SourcePixelFormat::Rgba8, &data);
  let config = EncoderConfig::default().with_compression_level(0).with_idat_max_len(100);
  let decoded = decode(&encode_to_vec(&image, config).unwrap());
  assert!(decoded.idat_lens.len() > 100);
  assert!(decoded.idat_lens.iter().all(|&len| len > 0 && len <= 100));
  assert_eq!(decoded.pixels, data);
}

#[test_log::test]
fn test_streaming_rows_from_padded_buffer() {
  // 3 pixels of BGR plus 7 bytes of padding per row
  let (width, height, stride) = (3_u32, 5_u32, 16_usize);
  let buffer = rand_bytes(stride * height as usize);
  let image = RawImage {
    width,
    height,
    format: SourcePixelFormat::Bgr8,
    stride,
    data: &buffer,
    palette: None,
  };
  let descriptor = ImageDescriptor::new(width, height, false, false, false);
  let mut encoder =
    Encoder::new(IoSink::new(Vec::new()), descriptor, EncoderConfig::default()).unwrap();
  encoder.write_header().unwrap();
  for y in 0..height {
    encoder.write_row(&image, y).unwrap();
    assert_eq!(encoder.state(), EncoderState::Streaming { rows_written: y + 1 });
  }
  encoder.finish().unwrap();
  let png = encoder.into_sink().into_inner();

  let decoded = decode(&png);
  let expected: Vec<u8> = buffer
    .chunks_exact(stride)
    .flat_map(|row| row[..9].chunks_exact(3).flat_map(|px| [px[2], px[1], px[0]]))
    .collect();
  assert_eq!(decoded.pixels, expected);
}

#[test_log::test]
fn test_scanlines_and_rows_can_be_mixed() {
  let descriptor = ImageDescriptor::new(2, 2, false, true, false);
  let image = Bitmap::new_filled(2, 2, Y8 { y: 77 });
  let mut encoder = Encoder::new(Vec::new(), descriptor, EncoderConfig::default()).unwrap();
  encoder.write_header().unwrap();
  encoder.write_scanline(0, &[1, 2]).unwrap();
  encoder.write_row(&image, 1).unwrap();
  encoder.finish().unwrap();
  assert_eq!(decode(&encoder.into_sink()).pixels, vec![1, 2, 77, 77]);
}

/// Accepts `limit` bytes, then fails every write.
struct FailingWriter {
  written: Vec<u8>,
  limit: usize,
}
impl std::io::Write for FailingWriter {
  fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
    if self.written.len() + buf.len() > self.limit {
      return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
    }
    self.written.extend_from_slice(buf);
    Ok(buf.len())
  }
  fn flush(&mut self) -> std::io::Result<()> {
    Ok(())
  }
}

#[test_log::test]
fn test_sink_failure_poisons_the_encoder() {
  let descriptor = ImageDescriptor::new(4, 4, true, false, false);
  let sink = IoSink::new(FailingWriter { written: Vec::new(), limit: 20 });
  let mut encoder = Encoder::new(sink, descriptor, EncoderConfig::default()).unwrap();
  let err = encoder.write_header().unwrap_err();
  assert_eq!(err, PngEncodeError::Sink);
  assert_eq!(err.kind(), ErrorKind::Io);
  assert_eq!(encoder.state(), EncoderState::Failed);
  assert_eq!(encoder.write_scanline(0, &[0; 16]), Err(PngEncodeError::Poisoned));
  let mut sink = encoder.into_sink();
  let io_err = sink.take_error().unwrap();
  assert_eq!(io_err.to_string(), "disk full");
}

#[test_log::test]
fn test_state_errors_are_state_kind() {
  let descriptor = ImageDescriptor::new(1, 2, false, true, false);
  let mut encoder = Encoder::new(Vec::new(), descriptor, EncoderConfig::default()).unwrap();
  assert_eq!(encoder.finish().unwrap_err().kind(), ErrorKind::State);

  let mut encoder = Encoder::new(Vec::new(), descriptor, EncoderConfig::default()).unwrap();
  encoder.write_header().unwrap();
  encoder.write_scanline(0, &[0]).unwrap();
  let err = encoder.write_scanline(0, &[0]).unwrap_err();
  assert_eq!(err, PngEncodeError::RowOutOfOrder { expected: 1, actual: 0 });
  assert_eq!(err.kind(), ErrorKind::State);
}

#[test_log::test]
fn test_format_errors() {
  let data = [0_u8; 8];
  let gray16 = RawImage::packed(2, 2, SourcePixelFormat::Gray16, &data);
  let err = encode_to_vec(&gray16, EncoderConfig::default()).unwrap_err();
  assert!(matches!(err, PngEncodeError::UnsupportedFormat { .. }));
  assert_eq!(err.kind(), ErrorKind::Format);

  let rgb565 = RawImage::packed(2, 2, SourcePixelFormat::Rgb565, &data);
  assert_eq!(encode_to_vec(&rgb565, EncoderConfig::default()).unwrap_err().kind(), ErrorKind::Format);

  let no_palette = RawImage::packed(2, 2, SourcePixelFormat::Indexed8, &data[..4]);
  assert_eq!(
    encode_to_vec(&no_palette, EncoderConfig::default()),
    Err(PngEncodeError::MissingPalette)
  );

  let huge = Palmap {
    width: 1,
    height: 1,
    indexes: vec![0],
    palette: vec![r8g8b8a8_Srgb { r: 0, g: 0, b: 0, a: 255 }; 257],
  };
  assert_eq!(
    encode_to_vec(&huge, EncoderConfig::default()),
    Err(PngEncodeError::PaletteTooLarge { entries: 257 })
  );

  let bad_index = Palmap {
    width: 2,
    height: 2,
    indexes: vec![0, 1, 1, 3],
    palette: vec![r8g8b8a8_Srgb { r: 0, g: 0, b: 0, a: 255 }; 2],
  };
  assert_eq!(
    encode_to_vec(&bad_index, EncoderConfig::default()),
    Err(PngEncodeError::PaletteIndexOutOfRange { row: 1, index: 3, palette_len: 2 })
  );

  let short = RawImage::packed(4, 2, SourcePixelFormat::Rgb8, &data);
  assert_eq!(
    encode_to_vec(&short, EncoderConfig::default()),
    Err(PngEncodeError::SourceRowTooShort { row: 0, expected: 12, actual: 8 })
  );
}

#[test_log::test]
fn test_adaptive_rows_use_varied_filters_on_smooth_data() {
  // The first row is a horizontal ramp with nothing above it, so Sub wins.
  // The lower half steps 3 per pixel and 2 per row, which leaves Up and Paeth
  // tied at 2 per byte, and the tie goes to Up.
  let (width, height) = (32_u32, 32_u32);
  let mut image = Bitmap::new_filled(width, height, Y8::default());
  for y in 0..height {
    for x in 0..width {
      image.get_mut(x, y).unwrap().y = if y < 16 { (x * 7) as u8 } else { (x * 3 + y * 2) as u8 };
    }
  }
  let config = EncoderConfig::default().with_filter_mode(FilterMode::Adaptive);
  let decoded = decode(&encode_to_vec(&image, config).unwrap());
  assert_eq!(decoded.filters[0], FilterType::Sub as u8);
  assert!(decoded.filters[1..16].iter().all(|&f| f == FilterType::Up as u8));
  assert!(decoded.filters[17..].iter().all(|&f| f == FilterType::Up as u8));
  assert_eq!(decoded.pixels.len(), (width * height) as usize);
}
