//! Math layer of the tracer: rays, boxes, primitives and the
//! intersection routines that operate on them.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
pub mod intersect;
mod primitives;
mod ray;

pub use aabb::{BoundingBox, Side};
pub use intersect::{
    half_space_triangle, ray_aabb, ray_sphere, ray_triangle, reflect, SphereHit, TriangleHit,
    EPSILON,
};
pub use primitives::{Sphere, Triangle};
pub use ray::Ray;

/// RGB color in linear [0, 1] space.
pub type Color = Vec3;
