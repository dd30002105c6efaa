//! Surface attributes stored alongside the primitives.
//!
//! Triangles carry per-vertex data packed as matrix columns so that
//! barycentric interpolation of a whole attribute is one `Mat3 * Vec3`.

use lumen_math::{Color, Mat3, Vec3};

/// Index of refraction of the medium the camera sits in.
pub const AIR_REFRACTION_INDEX: f32 = 1.0;

/// Shading inputs at a single surface point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfacePoint {
    pub normal: Vec3,
    pub diffuse: Color,
    pub specular: Color,
    pub shininess: f32,
    pub refraction_index: f32,
}

/// Per-vertex material of a triangle.
///
/// Column `i` of each matrix belongs to vertex `i`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TriangleAttrib {
    pub diffuse: Mat3,
    pub specular: Mat3,
    pub normals: Mat3,
    pub shininess: Vec3,
    pub refraction_index: f32,
}

impl TriangleAttrib {
    /// Create attributes from per-vertex values.
    pub fn from_vertices(
        diffuse: [Color; 3],
        specular: [Color; 3],
        normals: [Vec3; 3],
        shininess: [f32; 3],
        refraction_index: f32,
    ) -> Self {
        Self {
            diffuse: Mat3::from_cols(diffuse[0], diffuse[1], diffuse[2]),
            specular: Mat3::from_cols(specular[0], specular[1], specular[2]),
            normals: Mat3::from_cols(normals[0], normals[1], normals[2]),
            shininess: Vec3::from_array(shininess),
            refraction_index,
        }
    }

    /// Same material on all three vertices with a shared normal.
    pub fn uniform(normal: Vec3, material: &SphereAttrib) -> Self {
        Self::from_vertices(
            [material.diffuse; 3],
            [material.specular; 3],
            [normal; 3],
            [material.shininess; 3],
            material.refraction_index,
        )
    }

    /// Interpolate every attribute at barycentric weights `bary`.
    pub fn surface_at(&self, bary: Vec3) -> SurfacePoint {
        SurfacePoint {
            normal: (self.normals * bary).normalize_or_zero(),
            diffuse: self.diffuse * bary,
            specular: self.specular * bary,
            shininess: self.shininess.dot(bary),
            refraction_index: self.refraction_index,
        }
    }
}

/// Material of a sphere.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SphereAttrib {
    pub diffuse: Color,
    pub specular: Color,
    pub shininess: f32,
    pub refraction_index: f32,
}

impl SphereAttrib {
    /// Create a new sphere material.
    pub fn new(diffuse: Color, specular: Color, shininess: f32, refraction_index: f32) -> Self {
        Self {
            diffuse,
            specular,
            shininess,
            refraction_index,
        }
    }

    /// Diffuse-only material in air.
    pub fn matte(diffuse: Color) -> Self {
        Self::new(diffuse, Color::ZERO, 1.0, AIR_REFRACTION_INDEX)
    }

    /// Shading inputs for a hit with the given normal.
    pub fn surface_at(&self, normal: Vec3) -> SurfacePoint {
        SurfacePoint {
            normal,
            diffuse: self.diffuse,
            specular: self.specular,
            shininess: self.shininess,
            refraction_index: self.refraction_index,
        }
    }
}

impl Default for SphereAttrib {
    fn default() -> Self {
        Self::matte(Color::splat(0.5))
    }
}
