//! Recursive Whitted-style ray tracer.
//!
//! Implements:
//! - Phong local shading with hard shadows
//! - Mirror reflection for fully specular surfaces
//! - Refraction weighted by a linear Schlick term
//! - Striped multi-threaded rendering plus an optional adaptive
//!   anti-aliasing pass

use std::time::Instant;

use lumen_core::{Scene, SurfacePoint, AIR_REFRACTION_INDEX};
use lumen_math::{reflect, Ray, Vec3, Vec4, EPSILON};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use thiserror::Error;

use crate::antialias::smooth_stripe;
use crate::config::RenderConfig;
use crate::image_buffer::ImageBuffer;
use crate::stripe::{partition_rows, render_stripe, Stripe};

/// Errors that can occur while rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Image buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("Failed to create worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Nearest surface along a ray, resolved to shading inputs.
fn nearest_surface(ray: &Ray, scene: &Scene) -> Option<(Vec3, SurfacePoint)> {
    let triangle = scene.nearest_triangle(ray);
    let sphere = scene.nearest_sphere(ray);

    match (triangle, sphere) {
        (Some((i, hit)), other) if other.map_or(true, |(_, s)| hit.t <= s.t) => {
            let point = scene.triangles()[i].interpolate(hit.barycentric);
            Some((point, scene.triangle_attribs()[i].surface_at(hit.barycentric)))
        }
        (_, Some((j, hit))) => Some((hit.point, scene.sphere_attribs()[j].surface_at(hit.normal))),
        _ => None,
    }
}

/// Compute the color seen along a ray.
///
/// `depth` is the number of trace levels left. At zero the background is
/// returned; at one only local shading is evaluated. Pure over `scene`.
pub fn trace_ray(ray: &Ray, depth: u32, scene: &Scene) -> Vec4 {
    if depth == 0 {
        return scene.background();
    }

    let Some((point, surface)) = nearest_surface(ray, scene) else {
        return scene.background();
    };

    let n = surface.normal;
    let ks = surface.specular;
    let local = scene.compute_phong_illumination(point, n, surface.diffuse, ks, surface.shininess);

    if depth == 1 {
        return (local * (Vec3::ONE - ks)).extend(1.0);
    }

    let mut reflected = Vec3::ZERO;
    if ks.cmpgt(Vec3::splat(EPSILON)).all() {
        let mirror = Ray::normalized(point, reflect(ray.direction, n));
        reflected = trace_ray(&mirror, depth - 1, scene).truncate();
    }

    let mut reflectance = 1.0;
    let mut transmittance = 0.0;
    let mut refracted = Vec3::ZERO;

    if (surface.refraction_index - AIR_REFRACTION_INDEX).abs() > EPSILON {
        let mut n1 = AIR_REFRACTION_INDEX;
        let mut n2 = surface.refraction_index;

        let cos_i = -ray.direction.dot(n);
        if cos_i < 0.0 {
            std::mem::swap(&mut n1, &mut n2);
        }

        let ratio = n1 / n2;
        let sin2_t = ratio * ratio * (1.0 - cos_i * cos_i);

        // Schlick with a linear falloff term.
        let r0 = ((n1 - n2) / (n1 + n2)).powi(2);
        reflectance = r0 + (1.0 - r0) * (1.0 - cos_i);
        transmittance = 1.0 - reflectance;

        refracted = if sin2_t > 1.0 {
            // Total internal reflection: nothing is transmitted.
            scene.background().truncate()
        } else {
            let cos_t = (1.0 - sin2_t).sqrt();
            let direction = ratio * ray.direction + (ratio * cos_i - cos_t) * n;
            trace_ray(&Ray::normalized(point, direction), depth - 1, scene).truncate()
        };
    }

    let color = ks * (reflectance * reflected + transmittance * refracted) + (Vec3::ONE - ks) * local;
    color.extend(1.0)
}

/// Trace the primary ray through viewport position (x, y).
pub fn render_pixel(scene: &Scene, config: &RenderConfig, x: f32, y: f32) -> Vec4 {
    let ray = scene.camera().cast_ray(x, y, config.width(), config.height());
    trace_ray(&ray, config.depth(), scene)
}

/// Run one pass over its stripes, inline or on the pool.
fn dispatch<'a, F>(pool: Option<&ThreadPool>, stripes: Vec<Stripe<'a>>, work: F)
where
    F: Fn(Stripe<'a>) + Send + Sync,
{
    match pool {
        Some(pool) => pool.install(|| stripes.into_par_iter().for_each(work)),
        None => stripes.into_iter().for_each(work),
    }
}

/// Owns the render configuration and renders scenes with it.
#[derive(Debug, Clone, Default)]
pub struct RayTracer {
    config: RenderConfig,
}

impl RayTracer {
    /// Create a tracer with the given configuration.
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut RenderConfig {
        &mut self.config
    }

    pub fn set_config(&mut self, config: RenderConfig) {
        self.config = config;
    }

    /// Render `scene` into a BGRA `buffer` of at least `width * height * 4`
    /// bytes.
    ///
    /// With more than one thread the rows are interleaved over a pool built
    /// for this call. The output does not depend on the thread count.
    pub fn render(&self, scene: &Scene, buffer: &mut [u8]) -> Result<(), RenderError> {
        let config = self.config;
        let needed = config.buffer_len();
        if buffer.len() < needed {
            return Err(RenderError::BufferTooSmall {
                needed,
                actual: buffer.len(),
            });
        }

        if config.use_kd_tree() != scene.uses_spatial_index() {
            log::warn!(
                "Config asks for kd-tree {} but the scene has it {}",
                if config.use_kd_tree() { "on" } else { "off" },
                if scene.uses_spatial_index() { "on" } else { "off" }
            );
        }

        let (width, height) = (config.width(), config.height());
        if width == 0 || height == 0 {
            return Ok(());
        }

        let threads = config.num_threads();
        let pool = if threads > 1 {
            Some(ThreadPoolBuilder::new().num_threads(threads).build()?)
        } else {
            None
        };

        let buffer = &mut buffer[..needed];

        let start = Instant::now();
        let stripes = partition_rows(buffer, width, 0..height, threads);
        dispatch(pool.as_ref(), stripes, |stripe| render_stripe(stripe, scene, &config));
        log::info!(
            "Frame rendered ({}x{}, {} thread(s)) in {:.3}s",
            width,
            height,
            threads,
            start.elapsed().as_secs_f64()
        );

        if config.anti_aliasing() && height > 2 {
            let start = Instant::now();
            let snapshot = buffer.to_vec();
            let stripes = partition_rows(buffer, width, 1..height - 1, threads);
            dispatch(pool.as_ref(), stripes, |stripe| {
                smooth_stripe(stripe, &snapshot, scene, &config)
            });
            log::info!(
                "Adaptive anti-aliasing finished in {:.3}s",
                start.elapsed().as_secs_f64()
            );
        }

        Ok(())
    }

    /// Render into a newly allocated image of the configured size.
    pub fn render_image(&self, scene: &Scene) -> Result<ImageBuffer, RenderError> {
        let mut image = ImageBuffer::new(self.config.width(), self.config.height());
        self.render(scene, image.as_bytes_mut())?;
        Ok(image)
    }
}
