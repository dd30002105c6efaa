//! Owned BGRA pixel storage.
//!
//! The tracer writes into any `&mut [u8]` laid out as rows of 4-byte
//! pixels in `[B, G, R, A]` order (a little-endian `0xAARRGGBB` word).
//! [`ImageBuffer`] owns such a slice for callers that have no storage of
//! their own and converts it for saving.

use std::path::Path;

use image::{DynamicImage, ImageResult, Rgba, RgbaImage};
use lumen_math::Vec4;

/// Bytes per pixel in the output buffer.
pub const BYTES_PER_PIXEL: usize = 4;

/// Byte offsets of each channel inside a pixel.
pub mod channel {
    pub const B: usize = 0;
    pub const G: usize = 1;
    pub const R: usize = 2;
    pub const A: usize = 3;
}

/// Convert a linear RGBA color to BGRA bytes, clamping each channel to [0, 1].
#[inline]
pub fn encode_bgra(color: Vec4) -> [u8; 4] {
    let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0) as u8;
    let mut pixel = [0u8; 4];
    pixel[channel::B] = to_byte(color.z);
    pixel[channel::G] = to_byte(color.y);
    pixel[channel::R] = to_byte(color.x);
    pixel[channel::A] = to_byte(color.w);
    pixel
}

/// Row-major BGRA image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with zeros.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Set every byte of every channel to `value`.
    pub fn clear(&mut self, value: u8) {
        self.data.fill(value);
    }

    /// BGRA bytes of the pixel at (x, y), or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels()[self.index(x, y)])
    }

    /// Overwrite one pixel. Out-of-range coordinates are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, bgra: [u8; 4]) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            bytemuck::cast_slice_mut::<u8, [u8; 4]>(&mut self.data)[idx] = bgra;
        }
    }

    /// All pixels in row-major order.
    /// Row-major pixel index, computed in `usize` so large images don't wrap.
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn pixels(&self) -> &[[u8; 4]] {
        bytemuck::cast_slice(&self.data)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Reorder channels into an RGBA image.
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let p = self.pixels()[self.index(x, y)];
            Rgba([p[channel::R], p[channel::G], p[channel::B], p[channel::A]])
        })
    }

    /// Save to disk. The format follows the file extension; JPEG output
    /// drops the alpha channel.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let path = path.as_ref();
        let is_jpeg = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"));

        if is_jpeg {
            DynamicImage::ImageRgba8(self.to_rgba_image()).to_rgb8().save(path)
        } else {
            self.to_rgba_image().save(path)
        }
    }
}
