use std::path::Path;
use glam::{vec3, Vec3};
use log::{info, warn};
use wormhole_shared::{Camera, PackedPrimitive, PackedStar, ShapeKind, Universe};
use crate::config::{SceneDescription, ShapeDescription};
use crate::error::SceneError;
use crate::intersection::{intersect_cube, intersect_sphere, SurfaceHit};
use crate::portal::{Throat, ThroatKind};
use crate::ray::Ray;
use crate::starfield::Star;

/// Geometric shape of a primitive
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Sphere { radius: f32 },
    /// Axis-aligned cube
    Cube { edge: f32 },
}

impl Shape {
    /// Radius or edge length
    pub fn size(&self) -> f32 {
        match *self {
            Shape::Sphere { radius } => radius,
            Shape::Cube { edge } => edge,
        }
    }
}

/// Scene object belonging to exactly one universe
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Primitive {
    pub center: Vec3,
    pub shape: Shape,
    pub color: Vec3,
    pub universe: Universe,
    pub emissive: bool,
}

/// Transient record of the nearest surface along a ray
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitRecord {
    pub distance: f32,
    pub point: Vec3,
    pub normal: Vec3,
    pub color: Vec3,
    pub emissive: bool,
}

impl Primitive {
    pub fn sphere(center: Vec3, radius: f32, color: Vec3, universe: Universe) -> Self {
        Self {
            center,
            shape: Shape::Sphere { radius },
            color,
            universe,
            emissive: false,
        }
    }

    pub fn cube(center: Vec3, edge: f32, color: Vec3, universe: Universe) -> Self {
        Self {
            center,
            shape: Shape::Cube { edge },
            color,
            universe,
            emissive: false,
        }
    }

    /// Mark as a light source; emissive primitives are never shaded
    pub fn emissive(mut self) -> Self {
        self.emissive = true;
        self
    }

    pub fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        match self.shape {
            Shape::Sphere { radius } => intersect_sphere(ray, self.center, radius),
            Shape::Cube { edge } => intersect_cube(ray, self.center, edge),
        }
    }

    pub fn pack(&self) -> PackedPrimitive {
        let kind = match self.shape {
            Shape::Sphere { .. } => ShapeKind::Sphere,
            Shape::Cube { .. } => ShapeKind::Cube,
        };
        PackedPrimitive::new(
            self.center.to_array(),
            self.shape.size(),
            self.color.to_array(),
            self.emissive,
            self.universe,
            kind,
        )
    }

    /// Restore a typed primitive; `None` for unknown universe or shape tags
    pub fn from_packed(packed: &PackedPrimitive) -> Option<Self> {
        let size = packed.size();
        let shape = match packed.kind()? {
            ShapeKind::Sphere => Shape::Sphere { radius: size },
            ShapeKind::Cube => Shape::Cube { edge: size },
        };

        Some(Self {
            center: packed.center(),
            shape,
            color: packed.color(),
            universe: packed.universe()?,
            emissive: packed.is_emissive(),
        })
    }
}

/// Primitives of both universes, the throat joining them and the background stars.
/// Read-only while a frame is being traced.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub camera: Camera,
    pub primitives: Vec<Primitive>,
    pub throat: Throat,
    pub stars: Vec<Star>,
}

impl Scene {
    pub fn new(camera: Camera, primitives: Vec<Primitive>, throat: Throat) -> Self {
        Self {
            camera,
            primitives,
            throat,
            stars: Vec::new(),
        }
    }

    /// Two suns and four planets per universe around a spherical throat
    pub fn default_scene() -> Self {
        let primitives = vec![
            Primitive::sphere(vec3(0.0, 5000.0, -6000.0), 1000.0, vec3(1.0, 0.9, 0.7), Universe::A).emissive(),
            Primitive::sphere(vec3(-80.0, 40.0, 0.0), 10.0, vec3(1.0, 0.2, 0.2), Universe::A),
            Primitive::sphere(vec3(-80.0, -40.0, 0.0), 10.0, vec3(0.2, 1.0, 0.2), Universe::A),
            Primitive::sphere(vec3(-100.0, 0.0, 50.0), 10.0, vec3(0.2, 0.2, 1.0), Universe::A),
            Primitive::sphere(vec3(-120.0, 0.0, 0.0), 12.0, vec3(1.0, 0.6, 0.2), Universe::A),
            Primitive::sphere(vec3(0.0, -7000.0, 8000.0), 1500.0, vec3(0.7, 0.8, 1.0), Universe::B).emissive(),
            Primitive::cube(vec3(80.0, 40.0, 0.0), 18.0, vec3(1.0, 1.0, 0.2), Universe::B),
            Primitive::sphere(vec3(80.0, -40.0, 0.0), 18.0, vec3(1.0, 0.2, 1.0), Universe::B),
            Primitive::sphere(vec3(100.0, 0.0, 50.0), 18.0, vec3(0.2, 1.0, 1.0), Universe::B),
            Primitive::sphere(vec3(120.0, 0.0, 0.0), 22.0, vec3(1.0, 1.0, 1.0), Universe::B),
        ];

        Self::new(Camera::default(), primitives, Throat::default())
    }

    /// Nearest primitive of `universe` along the ray; other universes are never tested
    pub fn nearest_hit(&self, ray: &Ray, universe: Universe) -> Option<HitRecord> {
        let mut closest: Option<HitRecord> = None;

        for primitive in self.primitives.iter().filter(|p| p.universe == universe) {
            let Some(hit) = primitive.intersect(ray) else {
                continue;
            };
            if closest.map_or(true, |c| hit.distance < c.distance) {
                closest = Some(HitRecord {
                    distance: hit.distance,
                    point: ray.at(hit.distance),
                    normal: hit.normal,
                    color: primitive.color,
                    emissive: primitive.emissive,
                });
            }
        }

        closest
    }

    /// Light position for a universe: its first emissive primitive, else the default sun
    pub fn sun_position(&self, universe: Universe) -> Vec3 {
        self.primitives
            .iter()
            .find(|p| p.universe == universe && p.emissive)
            .map_or_else(|| universe.default_sun(), |p| p.center)
    }

    pub fn with_stars(mut self, stars: Vec<Star>) -> Self {
        self.stars = stars;
        self
    }

    /// Change the throat shape, keeping its center and radius
    pub fn set_throat_kind(&mut self, kind: ThroatKind) {
        self.throat = self.throat.with_kind(kind);
    }

    /// Packed buffers for upload
    pub fn pack(&self) -> (Vec<PackedPrimitive>, Vec<PackedStar>) {
        let primitives = self.primitives.iter().map(Primitive::pack).collect();
        let stars = self.stars.iter().map(Star::pack).collect();
        (primitives, stars)
    }

    /// Build a scene from a parsed description, filling missing sections from the default scene
    pub fn from_description(description: SceneDescription) -> Result<Self, SceneError> {
        let mut scene = Self::default_scene();

        if let Some(primitives) = description.primitives {
            scene.primitives = primitives
                .into_iter()
                .map(|p| {
                    if !(p.size > 0.0) {
                        return Err(SceneError::Validation(format!(
                            "primitive at {:?} has non-positive size {}",
                            p.center, p.size
                        )));
                    }
                    let center = Vec3::from_array(p.center);
                    let color = Vec3::from_array(p.color);
                    let primitive = match p.kind {
                        ShapeDescription::Sphere => Primitive::sphere(center, p.size, color, p.universe.into()),
                        ShapeDescription::Cube => Primitive::cube(center, p.size, color, p.universe.into()),
                    };
                    Ok(if p.emissive { primitive.emissive() } else { primitive })
                })
                .collect::<Result<_, _>>()?;
        }

        if let Some(throat) = description.throat {
            if !(throat.radius > 0.0) {
                return Err(SceneError::Validation(format!(
                    "throat radius must be positive, got {}",
                    throat.radius
                )));
            }
            let center = Vec3::from_array(throat.center);
            scene.throat = match throat.kind {
                ThroatKind::Disk => {
                    let normal = Vec3::from_array(throat.normal);
                    if normal.length_squared() < 1e-8 {
                        return Err(SceneError::Validation("disk throat needs a non-zero normal".into()));
                    }
                    Throat::disk(center, throat.radius, normal)
                }
                ThroatKind::Sphere => Throat::sphere(center, throat.radius),
            };
        }

        if let Some(camera) = description.camera {
            if !(camera.fov > 0.0 && camera.fov < 180.0) {
                return Err(SceneError::Validation(format!(
                    "camera fov must be within (0, 180) degrees, got {}",
                    camera.fov
                )));
            }
            scene.camera = camera.into();
        }

        Ok(scene)
    }

    /// Load scene from a JSON description file
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let description: SceneDescription = serde_json::from_str(&text)?;
        Self::from_description(description)
    }

    /// Load scene from a JSON description file with fallback to the default scene
    pub fn load_from_path_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load_from_path(path.as_ref()) {
            Ok(scene) => {
                info!("Loaded scene from {:?} ({} primitives)", path.as_ref(), scene.primitives.len());
                scene
            }
            Err(e) => {
                warn!("Failed to load scene from {:?}, using default scene: {}", path.as_ref(), e);
                Self::default_scene()
            }
        }
    }
}
