use glam::{vec3, Vec3};
use serde::Deserialize;
use wormhole_shared::{TracerConfig, Universe};
use crate::ray::{reflect, Ray};
use crate::scene::{HitRecord, Scene};
use crate::starfield::starlight;

/// What an escaping ray sees
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMode {
    Black,
    /// Vertical gradient tinted per universe
    Gradient,
    /// Gradient plus additive stars
    Starfield,
}

/// Parameters of the surface shading equation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadingModel {
    pub ambient: f32,
    pub shininess: f32,
    pub specular_color: Vec3,
    pub specular: bool,
}

impl ShadingModel {
    /// Diffuse plus Phong highlight
    pub fn phong() -> Self {
        Self {
            ambient: TracerConfig::AMBIENT,
            shininess: TracerConfig::SHININESS,
            specular_color: Vec3::splat(0.5),
            specular: true,
        }
    }

    /// Diffuse only
    pub fn lambert() -> Self {
        Self {
            ambient: TracerConfig::GEODESIC_AMBIENT,
            shininess: TracerConfig::SHININESS,
            specular_color: Vec3::ZERO,
            specular: false,
        }
    }

    /// Shade a surface with unit `normal`, unit `light_dir` toward the light and unit
    /// `view_dir` toward the viewer
    pub fn evaluate(&self, base: Vec3, normal: Vec3, light_dir: Vec3, view_dir: Vec3) -> Vec3 {
        let diffuse = normal.dot(light_dir).max(0.0);
        let mut color = base * (self.ambient + diffuse * (1.0 - self.ambient));

        if self.specular {
            let reflected = reflect(-light_dir, normal);
            let spec = view_dir.dot(reflected).max(0.0).powf(self.shininess);
            color += self.specular_color * spec;
        }

        color
    }
}

/// Horizon and zenith colors of a universe's sky
fn sky_colors(universe: Universe) -> (Vec3, Vec3) {
    match universe {
        Universe::A => (vec3(0.08, 0.10, 0.20), vec3(0.01, 0.01, 0.05)),
        Universe::B => (vec3(0.20, 0.08, 0.12), vec3(0.04, 0.0, 0.02)),
    }
}

/// Continuous vertical gradient for a unit `direction`
pub fn gradient(direction: Vec3, universe: Universe) -> Vec3 {
    let (horizon, zenith) = sky_colors(universe);
    let t = (0.5 * (direction.y + 1.0)).clamp(0.0, 1.0);
    horizon.lerp(zenith, t)
}

/// Surface and background shading against one scene
pub struct LightingCalculator<'a> {
    pub scene: &'a Scene,
    pub model: ShadingModel,
    pub background: BackgroundMode,
}

impl<'a> LightingCalculator<'a> {
    pub fn new(scene: &'a Scene, model: ShadingModel, background: BackgroundMode) -> Self {
        Self { scene, model, background }
    }

    /// Color of a hit seen along `ray`, lit by the sun of `universe`
    pub fn shade(&self, hit: &HitRecord, ray: &Ray, universe: Universe) -> Vec3 {
        if hit.emissive {
            return hit.color;
        }

        let light_dir = (self.scene.sun_position(universe) - hit.point).normalize_or_zero();
        self.model.evaluate(hit.color, hit.normal, light_dir, -ray.direction)
    }

    /// Color of a ray escaping along unit `direction`
    pub fn background(&self, direction: Vec3, universe: Universe) -> Vec3 {
        match self.background {
            BackgroundMode::Black => Vec3::ZERO,
            BackgroundMode::Gradient => gradient(direction, universe),
            BackgroundMode::Starfield => {
                gradient(direction, universe) + starlight(&self.scene.stars, direction)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::starfield::Star;

    fn hit(normal: Vec3, emissive: bool) -> HitRecord {
        HitRecord {
            distance: 10.0,
            point: Vec3::ZERO,
            normal,
            color: vec3(1.0, 0.0, 0.0),
            emissive,
        }
    }

    #[test]
    fn lambert_facing_and_away_from_light() {
        let model = ShadingModel::lambert();
        let base = vec3(1.0, 0.5, 0.0);

        let lit = model.evaluate(base, Vec3::Y, Vec3::Y, Vec3::Z);
        assert!(lit.abs_diff_eq(base, 1e-6));

        let unlit = model.evaluate(base, -Vec3::Y, Vec3::Y, Vec3::Z);
        assert!(unlit.abs_diff_eq(base * 0.2, 1e-6));
    }

    #[test]
    fn phong_highlight_peaks_on_mirror_direction() {
        let model = ShadingModel::phong();
        let light = vec3(1.0, 1.0, 0.0).normalize();
        let mirror = vec3(-1.0, 1.0, 0.0).normalize();

        let at_peak = model.evaluate(Vec3::ZERO, Vec3::Y, light, mirror);
        assert!(at_peak.abs_diff_eq(model.specular_color, 1e-4));

        let off_peak = model.evaluate(Vec3::ZERO, Vec3::Y, light, Vec3::Y);
        assert!(off_peak.x < 0.01);
    }

    #[test]
    fn emissive_bypasses_shading() {
        let scene = Scene::default_scene();
        let lighting = LightingCalculator::new(&scene, ShadingModel::phong(), BackgroundMode::Gradient);
        let ray = Ray::new(vec3(0.0, 0.0, 80.0), -Vec3::Z);

        let color = lighting.shade(&hit(Vec3::Z, true), &ray, Universe::A);
        assert_eq!(color, vec3(1.0, 0.0, 0.0));
    }

    #[test]
    fn shading_uses_universe_sun() {
        let scene = Scene::default_scene();
        let lighting = LightingCalculator::new(&scene, ShadingModel::lambert(), BackgroundMode::Black);
        let ray = Ray::new(vec3(0.0, 0.0, 80.0), -Vec3::Z);

        // Sun A is above, sun B is below
        let up = hit(Vec3::Y, false);
        let in_a = lighting.shade(&up, &ray, Universe::A);
        let in_b = lighting.shade(&up, &ray, Universe::B);
        assert!(in_a.x > 0.5);
        assert!((in_b.x - 0.2).abs() < 1e-6);
    }

    #[test]
    fn gradient_spans_horizon_to_zenith() {
        let (horizon, zenith) = sky_colors(Universe::A);
        assert!(gradient(-Vec3::Y, Universe::A).abs_diff_eq(horizon, 1e-6));
        assert!(gradient(Vec3::Y, Universe::A).abs_diff_eq(zenith, 1e-6));
        assert_ne!(gradient(Vec3::X, Universe::A), gradient(Vec3::X, Universe::B));
    }

    #[test]
    fn background_is_continuous() {
        let scene = Scene::default_scene();
        let lighting = LightingCalculator::new(&scene, ShadingModel::phong(), BackgroundMode::Gradient);
        let eps = 1e-3;

        for i in 0..20 {
            let y = -0.95 + i as f32 * 0.1;
            let a = lighting.background(vec3(0.0, y, -1.0), Universe::A);
            let b = lighting.background(vec3(0.0, y + eps, -1.0), Universe::A);
            assert!((a - b).abs().max_element() < eps);
        }
    }

    #[test]
    fn starfield_adds_to_gradient() {
        let star = Star {
            direction: Vec3::X,
            brightness: 0.9,
            color: Vec3::ONE,
            size: 0.004,
        };
        let scene = Scene::default_scene().with_stars(vec![star]);
        let lighting = LightingCalculator::new(&scene, ShadingModel::phong(), BackgroundMode::Starfield);

        let on_star = lighting.background(Vec3::X, Universe::A);
        let expected = gradient(Vec3::X, Universe::A) + Vec3::splat(0.9);
        assert!(on_star.abs_diff_eq(expected, 1e-5));

        let black = LightingCalculator::new(&scene, ShadingModel::phong(), BackgroundMode::Black);
        assert_eq!(black.background(Vec3::X, Universe::A), Vec3::ZERO);
    }
}
