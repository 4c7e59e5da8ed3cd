//! Synthetic PNG generators.
//!
//! These produce small, predictable images so tests can assert exact pixel
//! values after a pipeline run.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};

/// Encode an RGBA image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .expect("Failed to encode test PNG");
    out.into_inner()
}

/// Decode PNG bytes into RGBA8.
pub fn decode_rgba(data: &[u8]) -> RgbaImage {
    image::load_from_memory_with_format(data, ImageFormat::Png)
        .expect("Failed to decode test PNG")
        .to_rgba8()
}

/// A PNG filled with a single colour.
///
/// # Example
///
/// ```
/// use test_utils::{decode_rgba, solid_png};
///
/// let png = solid_png(4, 2, [255, 255, 255, 255]);
/// let img = decode_rgba(&png);
/// assert_eq!(img.dimensions(), (4, 2));
/// ```
pub fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(width, height, Rgba(rgba)))
}

/// A PNG with a white background and an opaque coloured square in the
/// middle, roughly what a precipitation overlay looks like.
pub fn overlay_png(width: u32, height: u32, feature: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        let inside = x >= width / 4 && x < width * 3 / 4 && y >= height / 4 && y < height * 3 / 4;
        if inside {
            Rgba(feature)
        } else {
            Rgba([255, 255, 255, 255])
        }
    });
    encode_png(&image)
}

/// A PNG whose pixel at (x, y) is `[x * 16, y * 16, 128, 255]` (wrapping).
pub fn gradient_png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 16) as u8, (y * 16) as u8, 128, 255])
    });
    encode_png(&image)
}
