use std::ops::{Add, Mul};
use glam::{vec3, Vec3};
use wormhole_shared::{TracerConfig, Universe};
use crate::lighting::LightingCalculator;
use crate::portal::Throat;
use crate::ray::Ray;
use crate::scene::Scene;

/// Integrator tunables
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeodesicSettings {
    /// Fixed RK4 step; accuracy is traded for speed
    pub step_size: f32,
    pub max_steps: u32,
    pub escape_radius: f32,
    /// Scale of the focusing acceleration; 1.0 is the unscaled metric term
    pub focusing_strength: f32,
}

impl Default for GeodesicSettings {
    fn default() -> Self {
        Self {
            step_size: TracerConfig::GEODESIC_STEP_SIZE,
            max_steps: TracerConfig::GEODESIC_MAX_STEPS,
            escape_radius: TracerConfig::ESCAPE_RADIUS,
            focusing_strength: 1.0,
        }
    }
}

/// Cylindrical coordinates around the wormhole axis (the Y axis)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CylindricalCoords {
    /// Signed axial coordinate, standing in for proper distance
    pub l: f32,
    pub rho: f32,
    pub phi: f32,
}

impl CylindricalCoords {
    pub fn from_cartesian(position: Vec3) -> Self {
        Self {
            l: position.y,
            rho: (position.x * position.x + position.z * position.z).sqrt(),
            phi: position.z.atan2(position.x),
        }
    }

    pub fn to_cartesian(&self) -> Vec3 {
        vec3(self.rho * self.phi.cos(), self.l, self.rho * self.phi.sin())
    }
}

/// Position and momentum advanced together by the integrator
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Phase {
    pub position: Vec3,
    pub momentum: Vec3,
}

impl Add for Phase {
    type Output = Phase;

    fn add(self, rhs: Phase) -> Phase {
        Phase {
            position: self.position + rhs.position,
            momentum: self.momentum + rhs.momentum,
        }
    }
}

impl Mul<f32> for Phase {
    type Output = Phase;

    fn mul(self, rhs: f32) -> Phase {
        Phase {
            position: self.position * rhs,
            momentum: self.momentum * rhs,
        }
    }
}

/// One classic fourth-order Runge-Kutta step of size `h`
pub fn rk4_step<S, F>(state: S, h: f32, derivative: F) -> S
where
    S: Copy + Add<Output = S> + Mul<f32, Output = S>,
    F: Fn(S) -> S,
{
    let k1 = derivative(state);
    let k2 = derivative(state + k1 * (h * 0.5));
    let k3 = derivative(state + k2 * (h * 0.5));
    let k4 = derivative(state + k3 * h);

    state + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (h / 6.0)
}

/// Axis-approximated geodesic equations: the momentum is pulled along `-position`
/// by `strength * b^2 * l / (l^2 + b^2)^(3/2)`, with `l` the axial coordinate and
/// `b` the throat radius. Position is relative to the throat center.
pub fn geodesic_derivative(phase: Phase, throat_radius: f32, strength: f32) -> Phase {
    let b2 = throat_radius * throat_radius;
    let l = phase.position.y;
    let r = (l * l + b2).sqrt();
    let focusing = strength * b2 * l / (r * r * r);

    Phase {
        position: phase.momentum,
        momentum: phase.position * -focusing,
    }
}

/// Outcome of one integration step
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Advance {
    Continue,
    /// Passed through the throat; `entry` is the position before mirroring
    Crossed { entry: Vec3 },
    Escaped,
    /// Non-finite state; treated like an escape
    Diverged,
}

/// Per-ray integrator state
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeodesicState {
    pub position: Vec3,
    pub momentum: Vec3,
    pub universe: Universe,
}

impl GeodesicState {
    /// Start at the ray origin with the ray direction as initial momentum
    pub fn new(ray: &Ray, universe: Universe) -> Self {
        Self {
            position: ray.origin,
            momentum: ray.direction,
            universe,
        }
    }

    pub fn cylindrical(&self) -> CylindricalCoords {
        CylindricalCoords::from_cartesian(self.position)
    }

    /// Rates of change of (l, rho, phi); zero radial and angular rates on the axis
    pub fn cylindrical_momentum(&self) -> CylindricalCoords {
        let Vec3 { x, z, .. } = self.position;
        let rho2 = x * x + z * z;
        if rho2 < f32::EPSILON {
            return CylindricalCoords { l: self.momentum.y, rho: 0.0, phi: 0.0 };
        }

        let rho = rho2.sqrt();
        CylindricalCoords {
            l: self.momentum.y,
            rho: (x * self.momentum.x + z * self.momentum.z) / rho,
            phi: (x * self.momentum.z - z * self.momentum.x) / rho2,
        }
    }

    pub fn direction(&self) -> Vec3 {
        self.momentum.normalize_or_zero()
    }

    /// Ray from the current position along the current direction
    pub fn probe(&self) -> Ray {
        Ray::new(self.position, self.momentum)
    }

    /// Take one RK4 step, then apply the throat and escape rules
    pub fn advance(&mut self, throat: &Throat, settings: &GeodesicSettings) -> Advance {
        let center = throat.center;
        let phase = Phase {
            position: self.position - center,
            momentum: self.momentum,
        };
        let next = rk4_step(phase, settings.step_size, |p| {
            geodesic_derivative(p, throat.radius, settings.focusing_strength)
        });

        if !next.position.is_finite() || !next.momentum.is_finite() {
            return Advance::Diverged;
        }

        let relative = next.position;
        let distance_sq = relative.length_squared();
        self.position = relative + center;
        self.momentum = next.momentum;

        // Only inbound rays cross; a mirrored ray heads outward and must leave first
        if distance_sq < throat.radius * throat.radius && relative.dot(self.momentum) < 0.0 {
            let entry = self.position;
            self.position = center - relative;
            self.universe = self.universe.opposite();
            return Advance::Crossed { entry };
        }

        if distance_sq > settings.escape_radius * settings.escape_radius {
            return Advance::Escaped;
        }

        Advance::Continue
    }
}

/// Marches rays through the curved region with fixed-step RK4
pub struct GeodesicTracer<'a> {
    pub scene: &'a Scene,
    pub lighting: LightingCalculator<'a>,
    pub settings: GeodesicSettings,
}

impl<'a> GeodesicTracer<'a> {
    pub fn new(scene: &'a Scene, lighting: LightingCalculator<'a>, settings: GeodesicSettings) -> Self {
        Self { scene, lighting, settings }
    }

    pub fn trace(&self, ray: &Ray, universe: Universe) -> Vec3 {
        let mut state = GeodesicState::new(ray, universe);
        let reach = 2.0 * self.settings.step_size;

        for _ in 0..self.settings.max_steps {
            let probe = state.probe();
            if let Some(hit) = self.scene.nearest_hit(&probe, state.universe) {
                if hit.distance < reach {
                    return self.lighting.shade(&hit, &probe, state.universe);
                }
            }

            match state.advance(&self.scene.throat, &self.settings) {
                Advance::Continue | Advance::Crossed { .. } => {}
                Advance::Escaped | Advance::Diverged => break,
            }
        }

        self.lighting.background(state.direction(), state.universe)
    }
}
