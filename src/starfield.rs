use glam::{vec3, Vec3};
use wormhole_shared::{PackedStar, SimpleRng};
use crate::ray::smoothstep;

/// Decorative background star
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    pub direction: Vec3,
    pub brightness: f32,
    pub color: Vec3,
    /// Angular radius in radians
    pub size: f32,
}

impl Star {
    /// Contribution of this star to a ray escaping along unit `direction`
    pub fn radiance(&self, direction: Vec3) -> Vec3 {
        let cos_angle = direction.dot(self.direction).clamp(-1.0, 1.0);
        if cos_angle < self.size.cos() {
            return Vec3::ZERO;
        }

        let angular_distance = cos_angle.acos();
        self.color * (self.brightness * smoothstep(self.size, 0.0, angular_distance))
    }

    pub fn pack(&self) -> PackedStar {
        PackedStar::new(self.direction.to_array(), self.brightness, self.color.to_array(), self.size)
    }
}

/// Generate `count` stars deterministically from `seed`
pub fn generate_stars(count: u32, seed: u32) -> Vec<Star> {
    let mut rng = SimpleRng::new(seed);
    let mut stars = Vec::with_capacity(count as usize);

    while stars.len() < count as usize {
        let direction = vec3(rng.next_f32_signed(), rng.next_f32_signed(), rng.next_f32_signed())
            .normalize_or_zero();
        if direction == Vec3::ZERO {
            continue;
        }

        let brightness = rng.next_f32() * 0.5 + 0.5;
        let size = rng.next_f32() * 0.005 + 0.001;

        let temperature = rng.next_f32();
        let color = if temperature < 0.33 {
            vec3(0.8, 0.8, 1.0) // bluish
        } else if temperature < 0.66 {
            vec3(1.0, 1.0, 1.0)
        } else {
            vec3(1.0, 1.0, 0.8) // yellowish
        };

        stars.push(Star { direction, brightness, color, size });
    }

    stars
}

/// Additive starlight along `direction`
pub fn starlight(stars: &[Star], direction: Vec3) -> Vec3 {
    stars.iter().map(|star| star.radiance(direction)).sum()
}
