use std::fmt;

use crate::Vec3;

/// Which side of an axis-aligned split plane a query refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    /// Coordinates at or below the plane.
    Less,
    /// Coordinates at or above the plane.
    Greater,
}

/// Axis-aligned bounding box used by the spatial index.
///
/// Stored as two corners. An empty box has `min > max` on every axis and
/// grows to fit whatever points are added to it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// A box that contains nothing.
    pub const EMPTY: BoundingBox = BoundingBox {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create the smallest box holding both points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create the smallest box holding every point of the iterator.
    pub fn enclosing<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        let mut bbox = Self::EMPTY;
        for p in points {
            bbox.grow(p);
        }
        bbox
    }

    /// Grow the box to include a point.
    #[inline]
    pub fn grow(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Create a box that surrounds two other boxes.
    pub fn surrounding(a: &BoundingBox, b: &BoundingBox) -> Self {
        Self {
            min: a.min.min(b.min),
            max: a.max.max(b.max),
        }
    }

    /// True if the box holds no point at all.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Produce the child box on one side of the plane `coord[axis] = value`.
    ///
    /// The `Greater` child gets its minimum raised to `value`, the `Less`
    /// child gets its maximum lowered to it. The result is only a proper box
    /// when `min[axis] < value < max[axis]`.
    pub fn split(&self, value: f32, axis: usize, side: Side) -> BoundingBox {
        let mut child = *self;
        match side {
            Side::Greater => child.min[axis] = value,
            Side::Less => child.max[axis] = value,
        }
        child
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "|BB| x: [{:4.2}, {:4.2}]; y: [{:4.2}, {:4.2}]; z: [{:4.2}, {:4.2}]",
            self.min.x, self.max.x, self.min.y, self.max.y, self.min.z, self.max.z
        )
    }
}
