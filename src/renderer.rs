use glam::Vec3;
use log::info;
use serde::Deserialize;
use wormhole_shared::{Camera, TileRect, Universe};
use crate::camera::CameraBasis;
use crate::config::RenderSettings;
use crate::geodesic::{GeodesicSettings, GeodesicTracer};
use crate::lensing::{LensingSettings, LensingTracer};
use crate::lighting::{BackgroundMode, LightingCalculator, ShadingModel};
use crate::ray::Ray;
use crate::scene::Scene;

/// Light transport model used per pixel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TracerVariant {
    /// Single refraction at the throat
    #[default]
    Lensing,
    /// Fixed-step RK4 through the curved region
    Geodesic,
}

/// Per-frame parameters threaded through the frame driver
#[derive(Clone, Debug, PartialEq)]
pub struct RenderContext {
    pub camera: Camera,
    pub width: u32,
    pub height: u32,
    pub samples_per_axis: u32,
    pub universe: Universe,
    pub variant: TracerVariant,
    pub background: BackgroundMode,
    pub lensing: LensingSettings,
    pub geodesic: GeodesicSettings,
}

impl RenderContext {
    pub fn new(camera: Camera, width: u32, height: u32) -> Self {
        Self {
            camera,
            width,
            height,
            samples_per_axis: 1,
            universe: Universe::A,
            variant: TracerVariant::Lensing,
            background: BackgroundMode::Gradient,
            lensing: LensingSettings::default(),
            geodesic: GeodesicSettings::default(),
        }
    }

    pub fn from_settings(settings: &RenderSettings, camera: Camera) -> Self {
        Self {
            camera,
            width: settings.width,
            height: settings.height,
            samples_per_axis: settings.samples_per_axis.max(1),
            universe: settings.universe,
            variant: settings.variant,
            background: settings.background_mode(),
            lensing: LensingSettings {
                ior_ratio: settings.ior_ratio,
                glow_color: settings.glow_color,
                ..Default::default()
            },
            geodesic: GeodesicSettings {
                step_size: settings.step_size,
                max_steps: settings.max_steps,
                escape_radius: settings.escape_radius,
                focusing_strength: settings.focusing_strength,
            },
        }
    }

    /// Switch the viewpoint to the other universe
    pub fn toggle_universe(&mut self) -> Universe {
        self.universe = self.universe.opposite();
        info!("Switched to universe {}", self.universe);
        self.universe
    }
}

enum Tracer<'a> {
    Lensing(LensingTracer<'a>),
    Geodesic(GeodesicTracer<'a>),
}

/// Per-pixel contract shared by every execution backend
pub struct FrameTracer<'a> {
    context: &'a RenderContext,
    basis: CameraBasis,
    tracer: Tracer<'a>,
}

impl<'a> FrameTracer<'a> {
    pub fn new(scene: &'a Scene, context: &'a RenderContext) -> Self {
        let tracer = match context.variant {
            TracerVariant::Lensing => {
                let lighting = LightingCalculator::new(scene, ShadingModel::phong(), context.background);
                Tracer::Lensing(LensingTracer::new(scene, lighting, context.lensing))
            }
            TracerVariant::Geodesic => {
                let lighting = LightingCalculator::new(scene, ShadingModel::lambert(), context.background);
                Tracer::Geodesic(GeodesicTracer::new(scene, lighting, context.geodesic))
            }
        };

        Self {
            context,
            basis: CameraBasis::new(&context.camera, context.width, context.height),
            tracer,
        }
    }

    /// Ray through sub-pixel sample (`sx`, `sy`) of pixel (`x`, `y`)
    pub fn primary_ray(&self, x: u32, y: u32, sx: u32, sy: u32) -> Ray {
        let n = self.context.samples_per_axis as f32;
        let u = (x as f32 + (sx as f32 + 0.5) / n) / self.context.width as f32;
        let v = (y as f32 + (sy as f32 + 0.5) / n) / self.context.height as f32;
        self.basis.ray(u, v)
    }

    pub fn trace(&self, ray: &Ray) -> Vec3 {
        match &self.tracer {
            Tracer::Lensing(tracer) => tracer.trace(ray, self.context.universe),
            Tracer::Geodesic(tracer) => tracer.trace(ray, self.context.universe),
        }
    }

    /// Average of all sub-pixel samples, before clamping
    pub fn pixel_color(&self, x: u32, y: u32) -> Vec3 {
        let n = self.context.samples_per_axis;
        let mut color = Vec3::ZERO;
        for sy in 0..n {
            for sx in 0..n {
                color += self.trace(&self.primary_ray(x, y, sx, sy));
            }
        }
        color / (n * n) as f32
    }

    pub fn shade_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        to_rgb8(self.pixel_color(x, y))
    }

    /// Row-major RGB bytes of one tile
    pub fn render_tile(&self, tile: &TileRect) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(tile.pixel_count() * 3);
        for y in tile.y..tile.y + tile.height {
            for x in tile.x..tile.x + tile.width {
                bytes.extend_from_slice(&self.shade_pixel(x, y));
            }
        }
        bytes
    }
}

/// Hard clamp to [0, 1] then scale; bright highlights clip
pub fn to_rgb8(color: Vec3) -> [u8; 3] {
    let c = color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
    [c.x as u8, c.y as u8, c.z as u8]
}

/// Dense row-major RGB image, top row first
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 3],
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = self.offset(x, y);
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let i = self.offset(x, y);
        self.pixels[i..i + 3].copy_from_slice(&rgb);
    }

    /// Copy a tile produced by `FrameTracer::render_tile` into place
    pub fn blit_tile(&mut self, tile: &TileRect, bytes: &[u8]) {
        let row_len = tile.width as usize * 3;
        for (row, src) in bytes.chunks_exact(row_len).enumerate() {
            let start = self.offset(tile.x, tile.y + row as u32);
            self.pixels[start..start + row_len].copy_from_slice(src);
        }
    }

    /// Convert float RGBA readback stored bottom row first; `None` on a size mismatch
    pub fn from_rgba_f32(width: u32, height: u32, rgba: &[f32]) -> Option<Self> {
        if rgba.len() != width as usize * height as usize * 4 {
            return None;
        }

        let mut framebuffer = Self::new(width, height);
        for (i, texel) in rgba.chunks_exact(4).enumerate() {
            let x = (i % width as usize) as u32;
            let y = height - 1 - (i / width as usize) as u32;
            framebuffer.set_pixel(x, y, to_rgb8(Vec3::new(texel[0], texel[1], texel[2])));
        }
        Some(framebuffer)
    }

    /// Binary PPM (P6) bytes
    pub fn to_ppm(&self) -> Vec<u8> {
        let header = format!("P6\n{} {}\n255\n", self.width, self.height);
        let mut bytes = Vec::with_capacity(header.len() + self.pixels.len());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(&self.pixels);
        bytes
    }
}
