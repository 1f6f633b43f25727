use glam::{vec3, Quat, Vec3};
use wormhole_shared::{TracerConfig, Universe};
use crate::scene::{Primitive, Scene};

/// Orbits the non-emissive primitives about the origin.
/// Positions are always derived from the initial layout, so sampling any time is drift-free.
#[derive(Clone, Debug)]
pub struct OrbitAnimator {
    initial: Vec<Primitive>,
}

impl OrbitAnimator {
    /// Capture the layout at time zero
    pub fn new(scene: &Scene) -> Self {
        Self {
            initial: scene.primitives.clone(),
        }
    }

    pub fn rotation_axis(universe: Universe) -> Vec3 {
        match universe {
            Universe::A => Vec3::Y,
            Universe::B => vec3(0.1, 1.0, 0.0).normalize(),
        }
    }

    /// Angular velocity in radians per second; outer orbits turn slower
    pub fn angular_velocity(center: Vec3) -> f32 {
        let orbit_radius = vec3(center.x, 0.0, center.z).length();
        TracerConfig::ORBIT_ANGULAR_SCALE / (orbit_radius + TracerConfig::ORBIT_SPEED_FACTOR)
    }

    /// Position of `primitive` after `time` seconds
    pub fn position_at(primitive: &Primitive, time: f32) -> Vec3 {
        if primitive.emissive {
            return primitive.center;
        }

        let mut angle = time * Self::angular_velocity(primitive.center);
        if primitive.universe == Universe::B {
            angle = -angle;
        }
        Quat::from_axis_angle(Self::rotation_axis(primitive.universe), angle) * primitive.center
    }

    /// Move the scene's primitives to their positions at `time`.
    /// Must run between frames, never while a frame is being traced.
    pub fn apply(&self, scene: &mut Scene, time: f32) {
        for (current, initial) in scene.primitives.iter_mut().zip(&self.initial) {
            current.center = Self::position_at(initial, time);
        }
    }
}
