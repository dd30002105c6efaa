//! Geometric primitives. Material data lives next to them in parallel
//! arrays owned by the scene, so these stay plain `Copy` values.

use crate::{BoundingBox, Vec3};

/// A triangle in world space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vec3; 3],
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { vertices: [a, b, c] }
    }

    /// Center of mass of the three vertices.
    pub fn centroid(&self) -> Vec3 {
        (self.vertices[0] + self.vertices[1] + self.vertices[2]) / 3.0
    }

    /// Tight bounding box of the vertices.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::enclosing(self.vertices)
    }

    /// Point with barycentric weights `bary` (one weight per vertex).
    pub fn interpolate(&self, bary: Vec3) -> Vec3 {
        self.vertices[0] * bary.x + self.vertices[1] * bary.y + self.vertices[2] * bary.z
    }
}

/// A sphere primitive.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn bounds(&self) -> BoundingBox {
        let r = Vec3::splat(self.radius.abs());
        BoundingBox::from_points(self.center - r, self.center + r)
    }
}
