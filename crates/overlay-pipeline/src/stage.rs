//! Transformation stages.

use image::{imageops, Rgba};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PipelineError;
use crate::raster::RasterImage;
use crate::resample::catmull_rom_resample;

fn white() -> [u8; 3] {
    [255, 255, 255]
}

/// One step of a category pipeline.
///
/// Serialized with a `stage` tag, e.g.
/// `{ stage: replace_color, tolerance: 50, target: [255, 255, 255] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    /// Fade pixels close to `target` towards transparency.
    ///
    /// A pixel at RGB distance `d < tolerance` keeps `d / tolerance` of its
    /// alpha, so an exact match vanishes and the edge of the tolerance
    /// sphere keeps its original opacity. Colour channels are untouched.
    ReplaceColor {
        tolerance: f64,
        #[serde(default = "white")]
        target: [u8; 3],
    },

    /// White pixels whose opacity is the source luminance.
    Greyscale,

    /// Gaussian blur of all four channels, `sigma` in pixels.
    GaussianBlur { sigma: f32 },

    /// Catmull-Rom reconstruction at the same dimensions.
    Resample,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::ReplaceColor { .. } => "replace_color",
            Stage::Greyscale => "greyscale",
            Stage::GaussianBlur { .. } => "gaussian_blur",
            Stage::Resample => "resample",
        }
    }

    /// Apply this stage, consuming the input image.
    pub fn transform(&self, image: RasterImage) -> Result<RasterImage, PipelineError> {
        match self {
            Stage::ReplaceColor { tolerance, target } => {
                replace_color(image, *tolerance, *target)
            }
            Stage::Greyscale => Ok(greyscale(image)),
            Stage::GaussianBlur { sigma } => gaussian_blur(image, *sigma),
            Stage::Resample => Ok(resample(image)),
        }
    }
}

/// Run `stages` in order. The first failing stage aborts the rest.
pub fn run_stages(stages: &[Stage], image: RasterImage) -> Result<RasterImage, PipelineError> {
    stages.iter().try_fold(image, |image, stage| {
        debug!(stage = stage.name(), "Applying pipeline stage");
        stage.transform(image)
    })
}

fn replace_color(
    mut image: RasterImage,
    tolerance: f64,
    target: [u8; 3],
) -> Result<RasterImage, PipelineError> {
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(PipelineError::InvalidParameter {
            stage: "replace_color",
            message: format!("tolerance must be a non-negative number, got {}", tolerance),
        });
    }

    let [tr, tg, tb] = target.map(f64::from);
    for Rgba([r, g, b, a]) in image.pixels_mut().pixels_mut() {
        let (dr, dg, db) = (tr - *r as f64, tg - *g as f64, tb - *b as f64);
        let dist = (dr * dr + dg * dg + db * db).sqrt();
        if dist < tolerance {
            *a = ((dist / tolerance) * *a as f64) as u8;
        }
    }
    Ok(image)
}

fn greyscale(mut image: RasterImage) -> RasterImage {
    for px in image.pixels_mut().pixels_mut() {
        let Rgba([r, g, b, a]) = *px;
        *px = if a == 0 {
            Rgba([0, 0, 0, 0])
        } else {
            let lum = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
            Rgba([255, 255, 255, lum as u8])
        };
    }
    image
}

fn gaussian_blur(image: RasterImage, sigma: f32) -> Result<RasterImage, PipelineError> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(PipelineError::InvalidParameter {
            stage: "gaussian_blur",
            message: format!("sigma must be positive, got {}", sigma),
        });
    }
    Ok(RasterImage::from_rgba(imageops::blur(image.pixels(), sigma)))
}

fn resample(image: RasterImage) -> RasterImage {
    let bounds = image.bounds();
    RasterImage::from_rgba(catmull_rom_resample(
        image.pixels(),
        bounds.width,
        bounds.height,
    ))
}
