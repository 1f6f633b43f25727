use glam::Vec3;
use serde::Deserialize;
use wormhole_shared::{Camera, TracerConfig, Universe};
use crate::error::SettingsError;
use crate::lighting::BackgroundMode;
use crate::portal::ThroatKind;
use crate::renderer::TracerVariant;

/// Everything the frame driver needs besides the scene itself
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// n gives n x n samples per pixel
    pub samples_per_axis: u32,
    pub variant: TracerVariant,
    /// Overrides the throat shape from the scene when set
    pub throat: Option<ThroatKind>,
    /// Falls back to the variant's default when unset
    pub background: Option<BackgroundMode>,
    pub star_count: u32,
    pub star_seed: u32,
    pub ior_ratio: f32,
    pub glow_color: Vec3,
    pub step_size: f32,
    pub max_steps: u32,
    pub escape_radius: f32,
    pub focusing_strength: f32,
    pub threads: usize,
    pub universe: Universe,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            samples_per_axis: 1,
            variant: TracerVariant::Lensing,
            throat: None,
            background: None,
            star_count: TracerConfig::DEFAULT_STAR_COUNT,
            star_seed: 42,
            ior_ratio: TracerConfig::IOR_RATIO,
            glow_color: Vec3::new(0.6, 0.8, 1.0),
            step_size: TracerConfig::GEODESIC_STEP_SIZE,
            max_steps: TracerConfig::GEODESIC_MAX_STEPS,
            escape_radius: TracerConfig::ESCAPE_RADIUS,
            focusing_strength: 1.0,
            threads: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4),
            universe: Universe::A,
        }
    }
}

impl RenderSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.width == 0 || self.height == 0 {
            return Err(SettingsError::EmptyFrame {
                width: self.width,
                height: self.height,
            });
        }
        if self.samples_per_axis == 0 {
            return Err(SettingsError::NoSamples);
        }
        if self.max_steps == 0 {
            return Err(SettingsError::NoSteps);
        }
        if self.threads == 0 {
            return Err(SettingsError::NoThreads);
        }

        let positive = [
            ("ior ratio", self.ior_ratio),
            ("step size", self.step_size),
            ("escape radius", self.escape_radius),
        ];
        for (name, value) in positive {
            // NaN fails this comparison too
            if !(value > 0.0) {
                return Err(SettingsError::NotPositive { name, value });
            }
        }

        Ok(())
    }

    /// Background used when none was requested: gradient for lensing, black for geodesics
    pub fn background_mode(&self) -> BackgroundMode {
        self.background.unwrap_or(match self.variant {
            TracerVariant::Lensing => BackgroundMode::Gradient,
            TracerVariant::Geodesic => BackgroundMode::Black,
        })
    }
}

/// Top-level scene file. Every section is optional and falls back to the built-in scene.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub primitives: Option<Vec<PrimitiveDescription>>,
    pub throat: Option<ThroatDescription>,
    pub camera: Option<CameraDescription>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeDescription {
    Sphere,
    Cube,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UniverseDescription {
    A,
    B,
}

impl From<UniverseDescription> for Universe {
    fn from(value: UniverseDescription) -> Self {
        match value {
            UniverseDescription::A => Universe::A,
            UniverseDescription::B => Universe::B,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct PrimitiveDescription {
    pub kind: ShapeDescription,
    pub center: [f32; 3],
    /// Radius for spheres, edge length for cubes
    pub size: f32,
    pub color: [f32; 3],
    pub universe: UniverseDescription,
    #[serde(default)]
    pub emissive: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ThroatDescription {
    pub kind: ThroatKind,
    pub center: [f32; 3],
    pub radius: f32,
    pub normal: [f32; 3],
}

impl Default for ThroatDescription {
    fn default() -> Self {
        Self {
            kind: ThroatKind::default(),
            center: [0.0; 3],
            radius: TracerConfig::THROAT_RADIUS,
            normal: [0.0, 0.0, 1.0],
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CameraDescription {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub up: [f32; 3],
    pub fov: f32,
}

impl Default for CameraDescription {
    fn default() -> Self {
        let camera = Camera::default();
        Self {
            position: camera.position,
            target: camera.target,
            up: camera.up,
            fov: camera.fov,
        }
    }
}

impl From<CameraDescription> for Camera {
    fn from(value: CameraDescription) -> Self {
        Camera::new(value.position, value.target, value.up, value.fov)
    }
}
