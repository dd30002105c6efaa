//! Pinhole camera that turns pixel coordinates into primary rays.

use std::f32::consts::FRAC_PI_3;

use lumen_math::{DMat4, DVec3, DVec4, Ray, Vec3};

/// Perspective camera placed by a position and three rotation angles.
///
/// The view and projection transforms are rebuilt in double precision on
/// every [`Camera::cast_ray`] call, so the camera is a plain value with no
/// cached state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Rotation about the x, y and z axes in radians.
    pub rotation: Vec3,
    /// Uniform scale. It has no effect on ray directions.
    pub scale: f32,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Create a camera at `position` with the given rotation angles.
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        Self {
            position,
            rotation,
            ..Self::default()
        }
    }

    /// Set the uniform scale.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// World-to-camera transform: `Rz * Rx * Ry * S * T`, all inverted.
    pub fn view_matrix(&self) -> DMat4 {
        let rot = self.rotation.as_dvec3();
        let scale = if self.scale.is_finite() && self.scale != 0.0 {
            1.0 / self.scale as f64
        } else {
            1.0
        };

        DMat4::from_rotation_z(-rot.z)
            * DMat4::from_rotation_x(-rot.x)
            * DMat4::from_rotation_y(-rot.y)
            * DMat4::from_scale(DVec3::splat(scale))
            * DMat4::from_translation(-self.position.as_dvec3())
    }

    /// OpenGL-style perspective projection for a viewport of the given aspect.
    pub fn projection_matrix(&self, aspect: f64) -> DMat4 {
        DMat4::perspective_rh_gl(self.fov_y as f64, aspect, self.near as f64, self.far as f64)
    }

    /// Build the primary ray through viewport position `(x, y)`.
    ///
    /// `y` grows downwards as in the image buffer. Fractional coordinates
    /// are allowed, which the anti-aliasing pass uses for sub-pixel rays.
    pub fn cast_ray(&self, x: f32, y: f32, width: u32, height: u32) -> Ray {
        let (w, h) = (width.max(1) as f64, height.max(1) as f64);

        // Viewport to normalized device coordinates, flipping y.
        let xp = (x as f64 / w) * 2.0 - 1.0;
        let yp = ((h - y as f64) / h) * 2.0 - 1.0;

        let clip_to_world = (self.projection_matrix(w / h) * self.view_matrix()).inverse();
        let far_point = clip_to_world * DVec4::new(xp, yp, 1.0, 1.0);

        let direction = if far_point.w != 0.0 {
            far_point.truncate() / far_point.w - self.position.as_dvec3()
        } else {
            far_point.truncate()
        };

        Ray::new(self.position, direction.normalize_or_zero().as_vec3())
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
            fov_y: FRAC_PI_3,
            near: 0.01,
            far: 10000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn test_center_ray_looks_down_negative_z() {
        let camera = Camera::default();
        let ray = camera.cast_ray(50.0, 50.0, 100, 100);

        assert_eq!(ray.origin, Vec3::ZERO);
        assert_close(ray.direction, Vec3::NEG_Z);
    }

    #[test]
    fn test_ray_origin_is_camera_position() {
        let camera = Camera::new(Vec3::new(3.0, -2.0, 7.0), Vec3::ZERO);
        let ray = camera.cast_ray(50.0, 50.0, 100, 100);

        assert_eq!(ray.origin, camera.position);
        assert_close(ray.direction, Vec3::NEG_Z);
    }

    #[test]
    fn test_top_edge_matches_field_of_view() {
        let camera = Camera::default();
        let ray = camera.cast_ray(50.0, 0.0, 100, 100);

        // Half the vertical fov above the view axis.
        let expected = Vec3::new(0.0, (FRAC_PI_3 / 2.0).sin(), -(FRAC_PI_3 / 2.0).cos());
        assert_close(ray.direction, expected);
    }

    #[test]
    fn test_image_x_maps_to_world_x() {
        let camera = Camera::default();
        let left = camera.cast_ray(0.0, 50.0, 200, 100);
        let right = camera.cast_ray(200.0, 50.0, 200, 100);

        assert!(left.direction.x < 0.0);
        assert!(right.direction.x > 0.0);
        assert!((left.direction.x + right.direction.x).abs() < 1e-5);
    }

    #[test]
    fn test_rotation_about_x_looks_down() {
        let camera = Camera::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(-FRAC_PI_2, 0.0, 0.0));
        let ray = camera.cast_ray(32.0, 32.0, 64, 64);

        assert_close(ray.direction, Vec3::NEG_Y);
    }

    #[test]
    fn test_rotation_about_y_turns_left() {
        let camera = Camera::new(Vec3::ZERO, Vec3::new(0.0, FRAC_PI_2, 0.0));
        let ray = camera.cast_ray(50.0, 50.0, 100, 100);

        assert_close(ray.direction, Vec3::NEG_X);
    }

    #[test]
    fn test_scale_does_not_change_direction() {
        let plain = Camera::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.3, -0.2, 0.1));
        let scaled = plain.with_scale(2.5);

        let a = plain.cast_ray(10.0, 70.0, 100, 100);
        let b = scaled.cast_ray(10.0, 70.0, 100, 100);
        assert_close(a.direction, b.direction);
    }
}
