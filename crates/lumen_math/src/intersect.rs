//! Ray/primitive intersection tests.
//!
//! Stateless functions shared by the brute-force scans and the spatial
//! index. Degenerate input (zero-length direction, non-positive radius,
//! singular triangle) is reported as a miss rather than producing NaNs.

use crate::{BoundingBox, Mat3, Ray, Side, Sphere, Triangle, Vec3};

/// Minimum hit distance and general float tolerance of the tracer.
pub const EPSILON: f32 = 1e-3;

/// Result of a successful ray/triangle test.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TriangleHit {
    /// World-space intersection point.
    pub point: Vec3,
    /// Weights of vertices A, B and C; they sum to one.
    pub barycentric: Vec3,
    /// Ray parameter of the hit.
    pub t: f32,
}

/// Result of a successful ray/sphere test.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SphereHit {
    pub point: Vec3,
    /// Unit normal. Points outward when `entering`, inward otherwise.
    pub normal: Vec3,
    pub t: f32,
    /// False when the ray starts inside the sphere and hits it on the way out.
    pub entering: bool,
}

/// Mirror `incident` about `normal` (which must be unit length).
#[inline]
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * normal.dot(incident) * normal
}

/// Ray/triangle intersection.
///
/// Writes the hit as `O + t*r = A + v*(B - A) + w*(C - A)` and solves the
/// 3x3 system `[-r | B-A | C-A] * (t, v, w) = O - A` directly.
pub fn ray_triangle(triangle: &Triangle, ray: &Ray) -> Option<TriangleHit> {
    let [a, b, c] = triangle.vertices;
    let m = Mat3::from_cols(-ray.direction, b - a, c - a);

    let det = m.determinant();
    if det == 0.0 || !det.is_finite() {
        return None;
    }

    let solution = m.inverse() * (ray.origin - a);
    let (t, v, w) = (solution.x, solution.y, solution.z);

    if t > EPSILON && v > 0.0 && w > 0.0 && v + w <= 1.0 {
        Some(TriangleHit {
            point: ray.at(t),
            barycentric: Vec3::new(1.0 - v - w, v, w),
            t,
        })
    } else {
        None
    }
}

/// Ray/sphere intersection for a unit-length ray direction.
///
/// Solves `t^2 + b*t + c = 0`. When the ray starts inside the sphere the
/// exit point is returned with the normal flipped to face the ray origin,
/// which the refraction code relies on.
pub fn ray_sphere(sphere: &Sphere, ray: &Ray) -> Option<SphereHit> {
    if sphere.radius <= 0.0 || ray.direction.length_squared() == 0.0 {
        return None;
    }

    let oc = ray.origin - sphere.center;
    let b = 2.0 * ray.direction.dot(oc);
    let c = oc.dot(oc) - sphere.radius * sphere.radius;
    let delta = b * b - 4.0 * c;

    if delta < 0.0 {
        return None;
    }

    let outward = |t: f32| {
        let point = ray.at(t);
        (point, (point - sphere.center).normalize())
    };

    // Grazing ray, a single root.
    if delta < EPSILON {
        let t = -0.5 * b;
        if t <= EPSILON {
            return None;
        }
        let (point, normal) = outward(t);
        return Some(SphereHit { point, normal, t, entering: true });
    }

    let sqrt_delta = delta.sqrt();
    let near = 0.5 * (-b - sqrt_delta);
    let far = 0.5 * (-b + sqrt_delta);

    if near > EPSILON {
        let (point, normal) = outward(near);
        Some(SphereHit { point, normal, t: near, entering: true })
    } else if far > EPSILON {
        let (point, normal) = outward(far);
        Some(SphereHit { point, normal: -normal, t: far, entering: false })
    } else {
        None
    }
}

/// Ray/box slab test.
///
/// Based on Williams et al., "An Efficient and Robust Ray-Box Intersection
/// Algorithm". A zero direction component divides to +/-infinity, which the
/// comparisons below handle correctly. Boxes lying entirely behind the ray
/// origin are rejected.
pub fn ray_aabb(ray: &Ray, bbox: &BoundingBox) -> bool {
    let slab = |axis: usize| -> (f32, f32) {
        let d = ray.direction[axis];
        let o = ray.origin[axis];
        if d.is_sign_positive() {
            ((bbox.min[axis] - o) / d, (bbox.max[axis] - o) / d)
        } else {
            ((bbox.max[axis] - o) / d, (bbox.min[axis] - o) / d)
        }
    };

    let (mut tmin, mut tmax) = slab(0);

    let (tymin, tymax) = slab(1);
    if tmin > tymax || tymin > tmax {
        return false;
    }
    if tymin > tmin {
        tmin = tymin;
    }
    if tymax < tmax {
        tmax = tymax;
    }

    let (tzmin, tzmax) = slab(2);
    if tmin > tzmax || tzmin > tmax {
        return false;
    }
    if tzmax < tmax {
        tmax = tzmax;
    }

    !(tmax < 0.0)
}

/// True if any vertex lies in the chosen closed half-space of the plane
/// `coord[axis] = value`.
///
/// A triangle crossing the plane satisfies both sides at once.
pub fn half_space_triangle(triangle: &Triangle, value: f32, axis: usize, side: Side) -> bool {
    triangle.vertices.iter().any(|v| match side {
        Side::Greater => v[axis] >= value,
        Side::Less => v[axis] <= value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle_at_z(z: f32) -> Triangle {
        Triangle::new(
            Vec3::new(-1.0, -1.0, z),
            Vec3::new(1.0, -1.0, z),
            Vec3::new(0.0, 1.0, z),
        )
    }

    #[test]
    fn test_triangle_hit_analytic() {
        let tri = unit_triangle_at_z(-2.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, -1.0));

        let hit = ray_triangle(&tri, &ray).expect("ray should hit");
        assert!((hit.t - 5.0).abs() < 1e-4);
        assert!((hit.point - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-4);

        let sum = hit.barycentric.x + hit.barycentric.y + hit.barycentric.z;
        assert!((sum - 1.0).abs() < 1e-5);
        assert!((tri.interpolate(hit.barycentric) - hit.point).length() < 1e-4);
    }

    #[test]
    fn test_triangle_hit_oblique() {
        let tri = Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(0.0, 4.0, 0.0),
        );
        let origin = Vec3::new(-1.0, 2.0, 2.0);
        let target = Vec3::new(1.0, 1.0, 0.0);
        let ray = Ray::normalized(origin, target - origin);

        let hit = ray_triangle(&tri, &ray).expect("ray should hit");
        assert!((hit.t - (target - origin).length()).abs() < 1e-4);
        assert!((hit.barycentric - Vec3::new(0.5, 0.25, 0.25)).length() < 1e-4);
    }

    #[test]
    fn test_triangle_miss() {
        let tri = unit_triangle_at_z(-1.0);

        // Pointing away
        let away = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(ray_triangle(&tri, &away).is_none());

        // Outside the edges
        let beside = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(ray_triangle(&tri, &beside).is_none());

        // Parallel to the plane
        let parallel = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::X);
        assert!(ray_triangle(&tri, &parallel).is_none());
    }

    #[test]
    fn test_triangle_degenerate_is_miss() {
        let collapsed = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        let ray = Ray::new(Vec3::new(1.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(ray_triangle(&collapsed, &ray).is_none());

        let zero_dir = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::ZERO);
        assert!(ray_triangle(&unit_triangle_at_z(0.0), &zero_dir).is_none());
    }

    #[test]
    fn test_sphere_entering_hit() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.5);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let hit = ray_sphere(&sphere, &ray).expect("ray should hit");
        assert!(hit.entering);
        assert!((hit.t - 3.5).abs() < 1e-4);
        assert!((hit.normal - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn test_sphere_exit_hit_flips_normal() {
        let sphere = Sphere::new(Vec3::ZERO, 2.0);
        let ray = Ray::new(Vec3::new(0.0, 0.5, 0.0), Vec3::Y);

        let hit = ray_sphere(&sphere, &ray).expect("ray should hit");
        assert!(!hit.entering);
        assert!((hit.t - 1.5).abs() < 1e-4);
        assert!((hit.point - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-4);
        // Normal faces back toward the inside
        assert!((hit.normal - Vec3::NEG_Y).length() < 1e-4);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0);

        let beside = Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(ray_sphere(&sphere, &beside).is_none());

        let behind = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(ray_sphere(&sphere, &behind).is_none());

        let flat = Sphere::new(Vec3::new(0.0, 0.0, -5.0), 0.0);
        let through = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!(ray_sphere(&flat, &through).is_none());
    }

    #[test]
    fn test_ray_from_surface_does_not_self_hit() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0);
        let ray = Ray::new(Vec3::Y, Vec3::Y);
        assert!(ray_sphere(&sphere, &ray).is_none());
    }

    #[test]
    fn test_aabb_hit_and_miss() {
        let bbox = BoundingBox::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));

        let through = Ray::new(Vec3::new(0.2, -0.3, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(ray_aabb(&through, &bbox));

        let diagonal = Ray::normalized(Vec3::splat(-4.0), Vec3::ONE);
        assert!(ray_aabb(&diagonal, &bbox));

        // Parallel to the z faces but outside the x extent.
        let parallel_outside = Ray::new(Vec3::new(2.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!ray_aabb(&parallel_outside, &bbox));

        let away = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(!ray_aabb(&away, &bbox));
    }

    #[test]
    fn test_aabb_origin_inside() {
        let bbox = BoundingBox::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(ray_aabb(&ray, &bbox));
    }

    #[test]
    fn test_half_space_straddle() {
        let tri = Triangle::new(
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );

        // Crosses x = 0: both tests pass.
        assert!(half_space_triangle(&tri, 0.0, 0, Side::Less));
        assert!(half_space_triangle(&tri, 0.0, 0, Side::Greater));

        // Entirely below y = 2.
        assert!(half_space_triangle(&tri, 2.0, 1, Side::Less));
        assert!(!half_space_triangle(&tri, 2.0, 1, Side::Greater));

        // Touching the plane counts for both sides.
        assert!(half_space_triangle(&tri, 1.0, 1, Side::Greater));
    }

    #[test]
    fn test_reflect() {
        let r = reflect(Vec3::new(1.0, -1.0, 0.0), Vec3::Y);
        assert_eq!(r, Vec3::new(1.0, 1.0, 0.0));
    }
}
