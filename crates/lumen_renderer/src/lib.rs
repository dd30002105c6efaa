//! Lumen Renderer - CPU recursive ray tracing
//!
//! A Whitted-style ray tracer: Phong shading with hard shadows, mirror
//! reflection and refraction, rendered on a rayon pool in interleaved row
//! stripes with an optional adaptive anti-aliasing pass.

mod antialias;
mod config;
mod image_buffer;
mod renderer;
mod stripe;

pub use antialias::{gradient_magnitude, supersample, GRADIENT_THRESHOLD, SUPERSAMPLES};
pub use config::{ConfigError, RenderConfig};
pub use image_buffer::{channel, encode_bgra, ImageBuffer, BYTES_PER_PIXEL};
pub use renderer::{render_pixel, trace_ray, RayTracer, RenderError};
pub use stripe::{partition_rows, render_stripe, Stripe};

/// Re-export common math types from lumen_math
pub use lumen_math::{Color, Vec3, Vec4};
