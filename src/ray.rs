use glam::Vec3;
use wormhole_shared::TracerConfig;

/// Ray representation for tracing
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray. The direction is normalized; a zero direction stays zero
    /// and every intersection test reports a miss for it.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Get point along ray at parameter t
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    pub fn is_degenerate(&self) -> bool {
        self.direction.length_squared() < TracerConfig::PARALLEL_EPSILON
    }
}

/// Mirror `incident` about the plane with unit `normal`
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - normal * (2.0 * incident.dot(normal))
}

/// Snell refraction of a unit `incident` through a surface whose unit `normal`
/// faces against it. `eta` is the ratio n_incident / n_transmitted.
/// Returns `None` on total internal reflection.
pub fn refract(incident: Vec3, normal: Vec3, eta: f32) -> Option<Vec3> {
    let cos_i = -normal.dot(incident);
    let sin2_t = eta * eta * (1.0 - cos_i * cos_i);
    if sin2_t > 1.0 {
        return None;
    }

    let cos_t = (1.0 - sin2_t).sqrt();
    let refracted = incident * eta + normal * (eta * cos_i - cos_t);
    refracted.is_finite().then(|| refracted.normalize_or_zero())
}

/// Hermite interpolation; `edge0 > edge1` yields a falling edge
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec3;

    #[test]
    fn ray_direction_is_normalized() {
        let ray = Ray::new(Vec3::ZERO, vec3(3.0, 0.0, 4.0));
        assert!((ray.direction.length() - 1.0).abs() < 1e-6);
        assert!(ray.at(5.0).abs_diff_eq(vec3(3.0, 0.0, 4.0), 1e-5));
    }

    #[test]
    fn zero_direction_is_degenerate() {
        let ray = Ray::new(Vec3::ONE, Vec3::ZERO);
        assert!(ray.is_degenerate());
        assert_eq!(ray.direction, Vec3::ZERO);
    }

    #[test]
    fn reflect_flips_normal_component() {
        let r = reflect(vec3(1.0, -1.0, 0.0), Vec3::Y);
        assert_eq!(r, vec3(1.0, 1.0, 0.0));
    }

    #[test]
    fn refract_at_normal_incidence_keeps_direction() {
        let d = vec3(0.0, 0.0, -1.0);
        let r = refract(d, Vec3::Z, 1.0 / 1.5).unwrap();
        assert!(r.abs_diff_eq(d, 1e-6));
    }

    #[test]
    fn refract_bends_toward_normal_when_entering_denser_medium() {
        let d = vec3(1.0, 0.0, -1.0).normalize();
        let r = refract(d, Vec3::Z, 1.0 / 1.5).unwrap();
        // sin(theta_t) = sin(45deg) / 1.5
        let expected_sin = (0.5f32).sqrt() / 1.5;
        assert!((r.x - expected_sin).abs() < 1e-5);
        assert!(r.z < 0.0);
        assert!((r.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn refract_reports_total_internal_reflection() {
        let grazing = vec3(0.99, 0.0, -0.141).normalize();
        assert!(refract(grazing, Vec3::Z, 1.5).is_none());
    }

    #[test]
    fn smoothstep_falling_edge() {
        assert_eq!(smoothstep(0.01, 0.0, 0.0), 1.0);
        assert_eq!(smoothstep(0.01, 0.0, 0.02), 0.0);
        let mid = smoothstep(0.01, 0.0, 0.005);
        assert!((mid - 0.5).abs() < 1e-5);
    }
}
