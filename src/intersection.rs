use glam::Vec3;
use wormhole_shared::TracerConfig;
use crate::ray::Ray;

/// Distance and outward normal of a ray/surface intersection
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceHit {
    pub distance: f32,
    pub normal: Vec3,
}

/// Nearest positive root of the ray/sphere quadratic.
/// Prefers the smaller root and falls back to the larger when the smaller lies behind
/// `MIN_RAY_DISTANCE`.
pub fn sphere_distance(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let a = ray.direction.dot(ray.direction);
    if a < TracerConfig::PARALLEL_EPSILON {
        return None;
    }
    let b = 2.0 * oc.dot(ray.direction);
    let c = oc.dot(oc) - radius * radius;
    let discriminant = b * b - 4.0 * a * c;

    if discriminant < 0.0 {
        return None;
    }

    let sqrt_discriminant = discriminant.sqrt();
    let t1 = (-b - sqrt_discriminant) / (2.0 * a);
    let t2 = (-b + sqrt_discriminant) / (2.0 * a);

    let t = if t1 > TracerConfig::MIN_RAY_DISTANCE { t1 } else { t2 };
    (t > TracerConfig::MIN_RAY_DISTANCE).then_some(t)
}

/// Test ray-sphere intersection
pub fn intersect_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<SurfaceHit> {
    // Cheap bounding-box reject before the quadratic
    let extent = Vec3::splat(radius);
    slab_interval(ray, center - extent, center + extent)?;

    let t = sphere_distance(ray, center, radius)?;
    let normal = (ray.at(t) - center).normalize_or_zero();

    Some(SurfaceHit { distance: t, normal })
}

/// Test ray against an axis-aligned cube of edge length `edge`
pub fn intersect_cube(ray: &Ray, center: Vec3, edge: f32) -> Option<SurfaceHit> {
    let half = edge * 0.5;
    let extent = Vec3::splat(half);
    let (t_near, t_far) = slab_interval(ray, center - extent, center + extent)?;

    let t = if t_near > TracerConfig::MIN_RAY_DISTANCE { t_near } else { t_far };
    if t <= TracerConfig::MIN_RAY_DISTANCE {
        return None;
    }

    let normal = cube_face_normal(ray.at(t) - center, half);
    Some(SurfaceHit { distance: t, normal })
}

/// Slab-method entry/exit distances of a ray against an AABB.
/// Division by zero components relies on IEEE infinities; NaN bounds from a ray lying
/// exactly on a slab plane are discarded by `f32::max`/`f32::min`.
pub fn slab_interval(ray: &Ray, aabb_min: Vec3, aabb_max: Vec3) -> Option<(f32, f32)> {
    if ray.is_degenerate() {
        return None;
    }

    let inv_dir = ray.direction.recip();
    let t1 = (aabb_min - ray.origin) * inv_dir;
    let t2 = (aabb_max - ray.origin) * inv_dir;

    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;
    for axis in 0..3 {
        let (lo, hi) = if t1[axis] <= t2[axis] {
            (t1[axis], t2[axis])
        } else {
            (t2[axis], t1[axis])
        };
        t_near = t_near.max(lo);
        t_far = t_far.min(hi);
    }

    (t_near <= t_far && t_far > 0.0).then_some((t_near, t_far))
}

/// Signed unit axis of the dominant component of `local` relative to the half extent
fn cube_face_normal(local: Vec3, half: f32) -> Vec3 {
    let scaled = (local / half).to_array();
    let mut axis = 0;
    for i in 1..3 {
        if scaled[i].abs() > scaled[axis].abs() {
            axis = i;
        }
    }

    let mut normal = [0.0; 3];
    normal[axis] = scaled[axis].signum();
    Vec3::from_array(normal)
}
