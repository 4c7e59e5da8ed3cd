//! Decoded raster owned by a single pipeline run.

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageFormat, RgbaImage};

use crate::error::PipelineError;

/// Pixel rectangle of an image, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub width: u32,
    pub height: u32,
}

/// Straight-alpha RGBA8 image.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pixels: RgbaImage,
}

impl RasterImage {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// Decode PNG bytes, converting any PNG colour type to RGBA8.
    pub fn decode_png(data: &[u8]) -> Result<Self, PipelineError> {
        let img = image::load_from_memory_with_format(data, ImageFormat::Png)
            .map_err(PipelineError::Decode)?;
        Ok(Self {
            pixels: img.to_rgba8(),
        })
    }

    /// Encode as an RGBA PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, PipelineError> {
        let mut data = Vec::new();
        let (width, height) = self.pixels.dimensions();
        PngEncoder::new(&mut data)
            .write_image(self.pixels.as_raw(), width, height, ColorType::Rgba8)
            .map_err(PipelineError::Encode)?;
        Ok(data)
    }

    pub fn bounds(&self) -> Bounds {
        let (width, height) = self.pixels.dimensions();
        Bounds { width, height }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }
}
