//! Adaptive anti-aliasing pass.
//!
//! Runs after the first pass over the finished image. Interior pixels
//! whose brightness changes sharply against their 4-neighbourhood are
//! re-traced with a ring of sub-pixel rays. Gradients come from a snapshot
//! of the first pass, so already smoothed pixels never feed back into the
//! decision.

use std::f32::consts::TAU;

use lumen_core::Scene;
use lumen_math::Vec4;

use crate::config::RenderConfig;
use crate::image_buffer::{encode_bgra, BYTES_PER_PIXEL};
use crate::renderer::render_pixel;
use crate::stripe::Stripe;

/// Gradient magnitude above which a pixel is supersampled.
pub const GRADIENT_THRESHOLD: f32 = 0.05;

/// Rays traced per supersampled pixel.
pub const SUPERSAMPLES: usize = 8;

/// Sub-pixel ring radius in pixels.
const RING_RADIUS: f32 = 0.5;

/// Mean of the color bytes at (x, y), in [0, 255].
fn intensity(image: &[u8], width: u32, x: u32, y: u32) -> f32 {
    let i = (y as usize * width as usize + x as usize) * BYTES_PER_PIXEL;
    (image[i] as f32 + image[i + 1] as f32 + image[i + 2] as f32) / 3.0
}

/// Central-difference brightness gradient of an interior pixel,
/// normalized to [0, 1] units per pixel.
pub fn gradient_magnitude(image: &[u8], width: u32, x: u32, y: u32) -> f32 {
    let dx = (intensity(image, width, x + 1, y) - intensity(image, width, x - 1, y)) / 255.0;
    let dy = (intensity(image, width, x, y + 1) - intensity(image, width, x, y - 1)) / 255.0;
    (dx * dx + dy * dy).sqrt()
}

/// Average of [`SUPERSAMPLES`] rays on a circle around (x, y).
pub fn supersample(scene: &Scene, config: &RenderConfig, x: u32, y: u32) -> Vec4 {
    let mut sum = Vec4::ZERO;
    for i in 0..SUPERSAMPLES {
        let theta = TAU * i as f32 / SUPERSAMPLES as f32;
        let sx = x as f32 + RING_RADIUS * theta.cos();
        let sy = y as f32 + RING_RADIUS * theta.sin();
        sum += render_pixel(scene, config, sx, sy);
    }
    sum / SUPERSAMPLES as f32
}

/// Smooth the high-gradient pixels of a stripe.
///
/// `snapshot` is the complete first-pass image. Border rows must not be
/// part of the stripe; border columns are skipped here.
pub fn smooth_stripe(stripe: Stripe<'_>, snapshot: &[u8], scene: &Scene, config: &RenderConfig) {
    let width = config.width();
    if width < 3 {
        return;
    }

    for (y, row) in stripe.rows {
        let pixels: &mut [[u8; 4]] = bytemuck::cast_slice_mut(row);
        for x in 1..width - 1 {
            if gradient_magnitude(snapshot, width, x, y) > GRADIENT_THRESHOLD {
                pixels[x as usize] = encode_bgra(supersample(scene, config, x, y));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stripe::partition_rows;

    /// 3x3 gray image with a custom center neighbourhood.
    fn image_with(left: u8, right: u8, top: u8, bottom: u8) -> Vec<u8> {
        let mut image = vec![100u8; 3 * 3 * 4];
        let mut set = |x: usize, y: usize, v: u8| {
            let i = (y * 3 + x) * 4;
            image[i..i + 3].fill(v);
        };
        set(0, 1, left);
        set(2, 1, right);
        set(1, 0, top);
        set(1, 2, bottom);
        image
    }

    #[test]
    fn test_flat_image_has_no_gradient() {
        let image = image_with(100, 100, 100, 100);
        assert_eq!(gradient_magnitude(&image, 3, 1, 1), 0.0);
    }

    #[test]
    fn test_gradient_central_difference() {
        let image = image_with(0, 255, 100, 100);
        assert!((gradient_magnitude(&image, 3, 1, 1) - 1.0).abs() < 1e-6);

        let image = image_with(100, 100, 0, 51);
        assert!((gradient_magnitude(&image, 3, 1, 1) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_alpha_ignored() {
        let mut image = image_with(100, 100, 100, 100);
        // Alpha byte of the right neighbour.
        image[(3 + 2) * 4 + 3] = 0;
        assert_eq!(gradient_magnitude(&image, 3, 1, 1), 0.0);
    }

    #[test]
    fn test_smooth_leaves_flat_regions() {
        let scene = Scene::new();
        let config = RenderConfig::default().with_resolution(3, 3);

        let mut image = image_with(100, 100, 100, 100);
        let snapshot = image.clone();
        for stripe in partition_rows(&mut image, 3, 1..2, 1) {
            smooth_stripe(stripe, &snapshot, &scene, &config);
        }

        assert_eq!(image, snapshot);
    }

    #[test]
    fn test_smooth_retraces_edges() {
        // Empty scene: supersampling returns the opaque black background.
        let scene = Scene::new();
        let config = RenderConfig::default().with_resolution(3, 3);

        let mut image = image_with(0, 255, 100, 100);
        let snapshot = image.clone();
        for stripe in partition_rows(&mut image, 3, 1..2, 1) {
            smooth_stripe(stripe, &snapshot, &scene, &config);
        }

        let center = (3 + 1) * 4;
        assert_eq!(&image[center..center + 4], &[0, 0, 0, 255]);
        // Neighbours are untouched.
        assert_eq!(image[..center], snapshot[..center]);
    }
}
