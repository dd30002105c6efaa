use crate::Vec3;

/// A ray in 3D space with an origin and a direction.
///
/// Every query in the tracer measures hit distances in units of `direction`,
/// so callers are expected to pass a unit-length direction. `Ray::new` does
/// not normalize on its own; use [`Ray::normalized`] when the direction comes
/// from arbitrary math.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Create a ray, normalizing the direction.
    #[inline]
    pub fn normalized(origin: Vec3, direction: Vec3) -> Self {
        Self::new(origin, direction.normalize())
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
