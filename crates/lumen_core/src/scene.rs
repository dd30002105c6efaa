//! Scene container and the queries the tracer runs against it.
//!
//! Geometry and materials are kept in parallel arrays: triangle `i` is
//! shaded with `triangle_attribs()[i]`, sphere `j` with
//! `sphere_attribs()[j]`. The scene is built once (from text or
//! programmatically) and only read while rendering.

use lumen_math::{
    ray_sphere, reflect, BoundingBox, Color, Ray, Sphere, SphereHit, Triangle, TriangleHit, Vec3,
    Vec4, EPSILON,
};

use crate::camera::Camera;
use crate::kd_tree::{self, KdTree, DEFAULT_CAPACITY};
use crate::material::{SphereAttrib, TriangleAttrib};

/// A point light. Its contribution does not fall off with distance.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub color: Color,
}

impl Light {
    /// Create a new light.
    pub fn new(position: Vec3, color: Color) -> Self {
        Self { position, color }
    }
}

/// Everything needed to render one image.
#[derive(Debug, Clone)]
pub struct Scene {
    triangles: Vec<Triangle>,
    triangle_attribs: Vec<TriangleAttrib>,
    spheres: Vec<Sphere>,
    sphere_attribs: Vec<SphereAttrib>,
    lights: Vec<Light>,
    camera: Camera,
    ambient: Color,
    background: Vec4,
    kd_tree: Option<KdTree>,
    specular_highlights: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene with a black, opaque background.
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
            triangle_attribs: Vec::new(),
            spheres: Vec::new(),
            sphere_attribs: Vec::new(),
            lights: Vec::new(),
            camera: Camera::default(),
            ambient: Color::ZERO,
            background: Vec4::new(0.0, 0.0, 0.0, 1.0),
            kd_tree: None,
            specular_highlights: false,
        }
    }

    /// Add a triangle with its material. Returns its index.
    ///
    /// A previously built spatial index no longer covers the new triangle
    /// and is dropped.
    pub fn add_triangle(&mut self, triangle: Triangle, attrib: TriangleAttrib) -> usize {
        if self.kd_tree.take().is_some() {
            log::debug!("Triangle added, dropping spatial index");
        }
        self.triangles.push(triangle);
        self.triangle_attribs.push(attrib);
        self.triangles.len() - 1
    }

    /// Add a sphere with its material. Returns its index.
    pub fn add_sphere(&mut self, sphere: Sphere, attrib: SphereAttrib) -> usize {
        self.spheres.push(sphere);
        self.sphere_attribs.push(attrib);
        self.spheres.len() - 1
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn set_ambient(&mut self, ambient: Color) {
        self.ambient = ambient;
    }

    /// Set the RGBA color returned for rays that escape the scene.
    pub fn set_background(&mut self, background: Vec4) {
        self.background = background;
    }

    /// Enable the Phong specular term. Off by default.
    pub fn set_specular_highlights(&mut self, enabled: bool) {
        self.specular_highlights = enabled;
    }

    /// Build or drop the kd-tree used for triangle queries.
    pub fn set_use_spatial_index(&mut self, enabled: bool) {
        if !enabled {
            self.kd_tree = None;
        } else if self.kd_tree.is_none() {
            self.kd_tree = Some(KdTree::build(&self.triangles, DEFAULT_CAPACITY));
        }
    }

    pub fn uses_spatial_index(&self) -> bool {
        self.kd_tree.is_some()
    }

    pub fn kd_tree(&self) -> Option<&KdTree> {
        self.kd_tree.as_ref()
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangle_attribs(&self) -> &[TriangleAttrib] {
        &self.triangle_attribs
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn sphere_attribs(&self) -> &[SphereAttrib] {
        &self.sphere_attribs
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn ambient(&self) -> Color {
        self.ambient
    }

    pub fn background(&self) -> Vec4 {
        self.background
    }

    /// Total number of triangles, spheres and lights.
    pub fn object_count(&self) -> usize {
        self.triangles.len() + self.spheres.len() + self.lights.len()
    }

    /// Box around every triangle and sphere. Empty for a scene without
    /// geometry.
    pub fn bounds(&self) -> BoundingBox {
        let triangles = self.triangles.iter().map(Triangle::bounds);
        let spheres = self.spheres.iter().map(Sphere::bounds);
        triangles
            .chain(spheres)
            .fold(BoundingBox::EMPTY, |acc, b| BoundingBox::surrounding(&acc, &b))
    }

    /// Log object counts and extent at info level.
    pub fn log_summary(&self) {
        log::info!(
            "Scene: {} lights, {} triangles, {} spheres ({} objects total)",
            self.lights.len(),
            self.triangles.len(),
            self.spheres.len(),
            self.object_count()
        );
        let bounds = self.bounds();
        if !bounds.is_empty() {
            log::info!("Scene bounds {bounds}");
        }
    }

    /// Closest triangle hit along `ray`.
    ///
    /// Goes through the kd-tree when one is built. Both paths return the
    /// same triangle, preferring the lower index on equal distances.
    pub fn nearest_triangle(&self, ray: &Ray) -> Option<(usize, TriangleHit)> {
        match &self.kd_tree {
            Some(tree) => tree.nearest_triangle(&self.triangles, ray),
            None => kd_tree::nearest_among(&self.triangles, 0..self.triangles.len(), ray),
        }
    }

    /// Closest sphere hit along `ray`. Always a linear scan.
    pub fn nearest_sphere(&self, ray: &Ray) -> Option<(usize, SphereHit)> {
        let mut best: Option<(usize, SphereHit)> = None;
        for (i, sphere) in self.spheres.iter().enumerate() {
            if let Some(hit) = ray_sphere(sphere, ray) {
                if best.map_or(true, |(_, b)| hit.t < b.t) {
                    best = Some((i, hit));
                }
            }
        }
        best
    }

    /// True if nothing blocks the segment from `point` to `light`.
    fn light_visible(&self, point: Vec3, light: &Light) -> bool {
        let to_light = light.position - point;
        let max_t = to_light.length() + EPSILON;
        let shadow_ray = Ray::new(point, to_light.normalize_or_zero());

        let blocked_by_triangle = self
            .nearest_triangle(&shadow_ray)
            .is_some_and(|(_, hit)| hit.t <= max_t);
        let blocked_by_sphere = self
            .nearest_sphere(&shadow_ray)
            .is_some_and(|(_, hit)| hit.t <= max_t);

        !(blocked_by_triangle || blocked_by_sphere)
    }

    /// Local Phong shading at a surface point: ambient plus the diffuse
    /// (and optionally specular) term of every visible light.
    ///
    /// The result is not clamped.
    pub fn compute_phong_illumination(
        &self,
        point: Vec3,
        normal: Vec3,
        diffuse: Color,
        specular: Color,
        shininess: f32,
    ) -> Color {
        let mut diffuse_sum = Color::ZERO;
        let mut specular_sum = Color::ZERO;

        let mirrored = reflect(point, normal).normalize_or_zero();

        for light in &self.lights {
            if !self.light_visible(point, light) {
                continue;
            }

            let l = (light.position - point).normalize_or_zero();
            diffuse_sum += light.color * diffuse * l.dot(normal).max(0.0);

            if self.specular_highlights {
                specular_sum += light.color * specular * l.dot(mirrored).max(0.0).powf(shininess);
            }
        }

        self.ambient + diffuse_sum + specular_sum
    }
}
