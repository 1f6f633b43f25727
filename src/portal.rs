use glam::Vec3;
use serde::Deserialize;
use wormhole_shared::TracerConfig;
use crate::intersection::sphere_distance;
use crate::ray::Ray;

/// Geometry used for the wormhole boundary
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThroatKind {
    /// Flat circular portal facing `normal`
    Disk,
    /// Spherical throat; the interior is the bending region
    #[default]
    Sphere,
}

/// The wormhole mouth. Immutable after construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Throat {
    pub kind: ThroatKind,
    pub center: Vec3,
    pub radius: f32,
    /// Facing direction of the disk; ignored by the spherical throat
    pub normal: Vec3,
}

/// Where a ray meets the throat boundary
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThroatCrossing {
    pub distance: f32,
    pub point: Vec3,
    /// Surface normal oriented against the incoming ray
    pub normal: Vec3,
    /// Distance of the crossing point from the throat's center axis
    pub axis_distance: f32,
}

impl Throat {
    pub fn disk(center: Vec3, radius: f32, normal: Vec3) -> Self {
        debug_assert!(radius > 0.0, "throat radius must be positive");
        Self {
            kind: ThroatKind::Disk,
            center,
            radius,
            normal: normal.normalize_or_zero(),
        }
    }

    pub fn sphere(center: Vec3, radius: f32) -> Self {
        debug_assert!(radius > 0.0, "throat radius must be positive");
        Self {
            kind: ThroatKind::Sphere,
            center,
            radius,
            normal: Vec3::Z,
        }
    }

    /// Same center and radius with a different boundary shape
    pub fn with_kind(self, kind: ThroatKind) -> Self {
        match kind {
            ThroatKind::Disk => Self::disk(self.center, self.radius, self.normal),
            ThroatKind::Sphere => Self::sphere(self.center, self.radius),
        }
    }

    /// Distance along the ray to the throat boundary
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        match self.kind {
            ThroatKind::Disk => self.disk_distance(ray),
            ThroatKind::Sphere => sphere_distance(ray, self.center, self.radius),
        }
    }

    /// Full crossing record: distance, point, facing normal and axis distance
    pub fn crossing(&self, ray: &Ray) -> Option<ThroatCrossing> {
        let distance = self.intersect(ray)?;
        let point = ray.at(distance);

        let outward = match self.kind {
            ThroatKind::Disk => self.normal,
            ThroatKind::Sphere => (point - self.center).normalize_or_zero(),
        };
        let normal = if outward.dot(ray.direction) > 0.0 { -outward } else { outward };

        Some(ThroatCrossing {
            distance,
            point,
            normal,
            axis_distance: self.axis_distance(point),
        })
    }

    /// Distance from the axis through `center` along `normal`.
    /// For a point on the disk this is the in-plane distance from the center.
    pub fn axis_distance(&self, point: Vec3) -> f32 {
        let offset = point - self.center;
        (offset - self.normal * offset.dot(self.normal)).length()
    }

    /// Rim highlight: full `glow` at 90% of the radius fading to black at the edge.
    /// Only the disk portal has a rim.
    pub fn rim_glow(&self, axis_distance: f32, glow: Vec3) -> Vec3 {
        let rim_start = TracerConfig::RIM_START * self.radius;
        if self.kind != ThroatKind::Disk || axis_distance <= rim_start {
            return Vec3::ZERO;
        }

        let fade = ((axis_distance - rim_start) / (self.radius - rim_start)).clamp(0.0, 1.0);
        glow.lerp(Vec3::ZERO, fade)
    }

    fn disk_distance(&self, ray: &Ray) -> Option<f32> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < TracerConfig::PARALLEL_EPSILON {
            return None;
        }

        let t = (self.center - ray.origin).dot(self.normal) / denom;
        if t <= TracerConfig::MIN_RAY_DISTANCE {
            return None;
        }

        ((ray.at(t) - self.center).length() <= self.radius).then_some(t)
    }
}

impl Default for Throat {
    fn default() -> Self {
        Self::sphere(Vec3::ZERO, TracerConfig::THROAT_RADIUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec3;

    fn disk() -> Throat {
        Throat::disk(Vec3::ZERO, 25.0, Vec3::Z)
    }

    #[test]
    fn disk_hit_through_center() {
        let ray = Ray::new(vec3(0.0, 0.0, 80.0), vec3(0.0, 0.0, -1.0));
        let crossing = disk().crossing(&ray).unwrap();

        assert!((crossing.distance - 80.0).abs() < 1e-4);
        assert_eq!(crossing.normal, Vec3::Z);
        assert!(crossing.axis_distance < 1e-4);
    }

    #[test]
    fn disk_normal_faces_ray_from_behind() {
        let ray = Ray::new(vec3(5.0, 0.0, -40.0), vec3(0.0, 0.0, 1.0));
        let crossing = disk().crossing(&ray).unwrap();
        assert_eq!(crossing.normal, -Vec3::Z);
        assert!((crossing.axis_distance - 5.0).abs() < 1e-4);
    }

    #[test]
    fn disk_rejects_outside_radius_and_parallel_rays() {
        let outside = Ray::new(vec3(30.0, 0.0, 80.0), vec3(0.0, 0.0, -1.0));
        assert!(disk().intersect(&outside).is_none());

        let parallel = Ray::new(vec3(0.0, 0.0, 10.0), Vec3::X);
        assert!(disk().intersect(&parallel).is_none());

        let receding = Ray::new(vec3(0.0, 0.0, 10.0), Vec3::Z);
        assert!(disk().intersect(&receding).is_none());
    }

    #[test]
    fn sphere_throat_crossing_distance() {
        let throat = Throat::sphere(Vec3::ZERO, 25.0);
        let ray = Ray::new(vec3(0.0, 0.0, 80.0), vec3(0.0, 0.0, -1.0));
        let crossing = throat.crossing(&ray).unwrap();

        assert!((crossing.distance - 55.0).abs() < 1e-4);
        assert!(crossing.normal.abs_diff_eq(Vec3::Z, 1e-5));
    }

    #[test]
    fn rim_glow_fades_toward_edge() {
        let glow = vec3(0.6, 0.8, 1.0);
        let throat = disk();

        assert_eq!(throat.rim_glow(10.0, glow), Vec3::ZERO);
        assert!(throat.rim_glow(22.51, glow).abs_diff_eq(glow, 1e-2));
        assert!(throat.rim_glow(23.75, glow).abs_diff_eq(glow * 0.5, 1e-4));
        assert!(throat.rim_glow(25.0, glow).abs_diff_eq(Vec3::ZERO, 1e-5));
    }

    #[test]
    fn sphere_throat_has_no_rim() {
        let throat = Throat::sphere(Vec3::ZERO, 25.0);
        assert_eq!(throat.rim_glow(24.0, Vec3::ONE), Vec3::ZERO);
    }
}
