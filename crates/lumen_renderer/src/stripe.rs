//! Interleaved row stripes for parallel rendering.
//!
//! With `N` workers, stripe `k` owns rows `k, k + N, k + 2N, ...` of the
//! pass's row range. Every stripe holds disjoint `&mut` row slices of the
//! one output buffer, so workers write without any locking.

use std::ops::Range;

use lumen_core::Scene;

use crate::config::RenderConfig;
use crate::image_buffer::{encode_bgra, BYTES_PER_PIXEL};
use crate::renderer::render_pixel;

/// A set of image rows rendered by one worker.
#[derive(Debug)]
pub struct Stripe<'a> {
    /// Index of this stripe in the pass.
    pub id: usize,
    /// `(y, row bytes)` pairs, top to bottom.
    pub rows: Vec<(u32, &'a mut [u8])>,
}

impl Stripe<'_> {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Image rows covered by this stripe.
    pub fn row_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.iter().map(|(y, _)| *y)
    }
}

/// Split `buffer` into `count` stripes covering `rows`.
///
/// Row `y` of the range goes to stripe `(y - rows.start) % count`. Rows
/// outside the range are not handed out. A zero count is treated as one.
pub fn partition_rows(buffer: &mut [u8], width: u32, rows: Range<u32>, count: usize) -> Vec<Stripe<'_>> {
    let count = count.max(1);
    let mut stripes: Vec<Stripe<'_>> = (0..count).map(|id| Stripe { id, rows: Vec::new() }).collect();

    let stride = width as usize * BYTES_PER_PIXEL;
    if stride == 0 {
        return stripes;
    }

    for (y, row) in buffer.chunks_exact_mut(stride).enumerate() {
        let y = y as u32;
        if rows.contains(&y) {
            stripes[(y - rows.start) as usize % count].rows.push((y, row));
        }
    }

    stripes
}

/// Trace every pixel of the stripe's rows.
pub fn render_stripe(stripe: Stripe<'_>, scene: &Scene, config: &RenderConfig) {
    for (y, row) in stripe.rows {
        let pixels: &mut [[u8; 4]] = bytemuck::cast_slice_mut(row);
        for (x, pixel) in pixels.iter_mut().enumerate() {
            *pixel = encode_bgra(render_pixel(scene, config, x as f32, y as f32));
        }
    }
}
