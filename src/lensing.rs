use glam::Vec3;
use wormhole_shared::{TracerConfig, Universe};
use crate::lighting::LightingCalculator;
use crate::ray::{refract, Ray};
use crate::scene::Scene;

/// Tunables of the single-refraction lensing approximation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LensingSettings {
    /// n_outside / n_throat used for the refraction at the throat boundary
    pub ior_ratio: f32,
    pub glow_color: Vec3,
    /// Weight of the glow at full Fresnel factor
    pub glow_blend: f32,
}

impl Default for LensingSettings {
    fn default() -> Self {
        Self {
            ior_ratio: TracerConfig::IOR_RATIO,
            glow_color: Vec3::new(0.6, 0.8, 1.0),
            glow_blend: TracerConfig::GLOW_BLEND,
        }
    }
}

/// Edge glow factor, 0 head-on and 1 at grazing incidence
pub fn fresnel(direction: Vec3, normal: Vec3) -> f32 {
    (1.0 - direction.dot(normal).abs()).clamp(0.0, 1.0).powi(3)
}

/// Traces a ray with at most one throat crossing, bending it by refraction
pub struct LensingTracer<'a> {
    pub scene: &'a Scene,
    pub lighting: LightingCalculator<'a>,
    pub settings: LensingSettings,
}

impl<'a> LensingTracer<'a> {
    pub fn new(scene: &'a Scene, lighting: LightingCalculator<'a>, settings: LensingSettings) -> Self {
        Self { scene, lighting, settings }
    }

    pub fn trace(&self, ray: &Ray, universe: Universe) -> Vec3 {
        let throat = &self.scene.throat;
        let local_hit = self.scene.nearest_hit(ray, universe);
        let crossing = throat.crossing(ray);

        let crossing = match (local_hit, crossing) {
            (Some(hit), Some(crossing)) if hit.distance < crossing.distance => {
                return self.lighting.shade(&hit, ray, universe);
            }
            (Some(hit), None) => return self.lighting.shade(&hit, ray, universe),
            (None, None) => return self.lighting.background(ray.direction, universe),
            (_, Some(crossing)) => crossing,
        };

        let fresnel = fresnel(ray.direction, crossing.normal);

        // Total internal reflection keeps the incident direction
        let bent = refract(ray.direction, crossing.normal, self.settings.ior_ratio)
            .filter(|d| *d != Vec3::ZERO)
            .unwrap_or(ray.direction);

        // Jump across the throat to emerge on the far side
        let offset = TracerConfig::SURFACE_OFFSET + 2.0 * throat.radius;
        let emerged = Ray::new(crossing.point + bent * offset, bent);

        let far_side = universe.opposite();
        let seen = match self.scene.nearest_hit(&emerged, far_side) {
            Some(hit) => self.lighting.shade(&hit, &emerged, far_side),
            None => self.lighting.background(emerged.direction, far_side),
        };

        let color = seen.lerp(self.settings.glow_color, fresnel * self.settings.glow_blend);
        color + throat.rim_glow(crossing.axis_distance, self.settings.glow_color)
    }
}
