//! Separable Catmull-Rom resampling of RGBA images.
//!
//! Filtering happens on premultiplied values so fully transparent pixels
//! do not bleed their colour into neighbours. The result is written back as
//! straight alpha.

use image::{Rgba, RgbaImage};

/// Catmull-Rom kernel (cubic with B = 0, C = 0.5), support of 2.
fn catmull_rom(x: f32) -> f32 {
    let x = x.abs();
    if x < 1.0 {
        1.5 * x * x * x - 2.5 * x * x + 1.0
    } else if x < 2.0 {
        -0.5 * x * x * x + 2.5 * x * x - 4.0 * x + 2.0
    } else {
        0.0
    }
}

/// Taps contributing to one destination sample along an axis.
struct Taps {
    start: usize,
    weights: Vec<f32>,
}

/// Weights for every destination index along an axis of `src_len` samples.
///
/// Destination pixel centres are mapped into source space. Taps outside the
/// image are dropped and the rest are renormalised.
fn axis_taps(src_len: usize, dst_len: usize) -> Vec<Taps> {
    let scale = src_len as f32 / dst_len as f32;
    let support = 2.0;

    (0..dst_len)
        .map(|d| {
            let center = (d as f32 + 0.5) * scale - 0.5;
            let first = (center - support).ceil().max(0.0) as usize;
            let last = ((center + support).floor() as isize).min(src_len as isize - 1);

            let mut weights: Vec<f32> = (first as isize..=last)
                .map(|s| catmull_rom(s as f32 - center))
                .collect();

            let sum: f32 = weights.iter().sum();
            if sum.abs() > f32::EPSILON {
                for w in &mut weights {
                    *w /= sum;
                }
            }

            Taps {
                start: first,
                weights,
            }
        })
        .collect()
}

fn premultiply(src: &RgbaImage) -> Vec<[f32; 4]> {
    src.pixels()
        .map(|Rgba([r, g, b, a])| {
            let alpha = *a as f32 / 255.0;
            [
                *r as f32 * alpha,
                *g as f32 * alpha,
                *b as f32 * alpha,
                *a as f32,
            ]
        })
        .collect()
}

fn unpremultiply(px: [f32; 4]) -> Rgba<u8> {
    let a = px[3].round().clamp(0.0, 255.0);
    if a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let scale = 255.0 / a;
    let channel = |c: f32| (c * scale).round().clamp(0.0, 255.0) as u8;
    Rgba([channel(px[0]), channel(px[1]), channel(px[2]), a as u8])
}

/// Resample `src` to `width` x `height` with Catmull-Rom reconstruction.
///
/// At identical dimensions every destination centre lands on a source
/// centre, so the pass reconstructs the image rather than rescaling it.
pub fn catmull_rom_resample(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (src_w, src_h) = (src.width() as usize, src.height() as usize);
    let (dst_w, dst_h) = (width as usize, height as usize);
    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
        return RgbaImage::new(width, height);
    }

    let source = premultiply(src);

    // Horizontal pass: src_h rows of dst_w samples.
    let x_taps = axis_taps(src_w, dst_w);
    let mut horizontal = vec![[0.0f32; 4]; dst_w * src_h];
    for y in 0..src_h {
        let row = &source[y * src_w..(y + 1) * src_w];
        for (x, taps) in x_taps.iter().enumerate() {
            let mut acc = [0.0f32; 4];
            for (i, w) in taps.weights.iter().enumerate() {
                let px = row[taps.start + i];
                for c in 0..4 {
                    acc[c] += px[c] * w;
                }
            }
            horizontal[y * dst_w + x] = acc;
        }
    }

    // Vertical pass.
    let y_taps = axis_taps(src_h, dst_h);
    let mut out = RgbaImage::new(width, height);
    for (y, taps) in y_taps.iter().enumerate() {
        for x in 0..dst_w {
            let mut acc = [0.0f32; 4];
            for (i, w) in taps.weights.iter().enumerate() {
                let px = horizontal[(taps.start + i) * dst_w + x];
                for c in 0..4 {
                    acc[c] += px[c] * w;
                }
            }
            out.put_pixel(x as u32, y as u32, unpremultiply(acc));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_interpolates_at_integers() {
        assert_eq!(catmull_rom(0.0), 1.0);
        assert_eq!(catmull_rom(1.0), 0.0);
        assert_eq!(catmull_rom(-1.0), 0.0);
        assert_eq!(catmull_rom(2.0), 0.0);
        assert!(catmull_rom(0.5) > 0.5);
        assert!(catmull_rom(1.5) < 0.0);
    }

    #[test]
    fn test_identity_taps_are_single_weight() {
        for taps in axis_taps(10, 10) {
            let non_zero: Vec<_> = taps.weights.iter().filter(|w| w.abs() > 1e-6).collect();
            assert_eq!(non_zero.len(), 1);
            assert!((non_zero[0] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_same_size_opaque_is_unchanged() {
        let src = RgbaImage::from_fn(8, 5, |x, y| {
            Rgba([(x * 30) as u8, (y * 50) as u8, ((x + y) * 10) as u8, 255])
        });
        let out = catmull_rom_resample(&src, 8, 5);
        assert_eq!(out, src);
    }

    #[test]
    fn test_transparent_stays_transparent_black() {
        let src = RgbaImage::from_pixel(4, 4, Rgba([200, 100, 50, 0]));
        let out = catmull_rom_resample(&src, 4, 4);
        assert!(out.pixels().all(|p| *p == Rgba([0, 0, 0, 0])));
    }

    #[test]
    fn test_downscale_uniform() {
        let src = RgbaImage::from_pixel(16, 16, Rgba([10, 120, 240, 255]));
        let out = catmull_rom_resample(&src, 4, 4);
        assert_eq!(out.dimensions(), (4, 4));
        assert!(out.pixels().all(|p| *p == Rgba([10, 120, 240, 255])));
    }

    #[test]
    fn test_empty_image() {
        let src = RgbaImage::new(0, 0);
        assert_eq!(catmull_rom_resample(&src, 0, 0).dimensions(), (0, 0));
    }
}
