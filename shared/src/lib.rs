#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use bytemuck::{Pod, Zeroable};
use core::fmt;
use glam::{vec3, Vec3};

/// Configuration constants for the wormhole tracer
pub struct TracerConfig;

impl TracerConfig {
    pub const TILE_SIZE: u32 = 32;
    pub const MIN_RAY_DISTANCE: f32 = 1e-3;
    pub const PARALLEL_EPSILON: f32 = 1e-4;
    pub const SURFACE_OFFSET: f32 = 0.1;

    pub const THROAT_RADIUS: f32 = 25.0;
    pub const IOR_RATIO: f32 = 1.0 / 1.5;
    pub const GLOW_BLEND: f32 = 0.8;
    pub const RIM_START: f32 = 0.9;

    pub const AMBIENT: f32 = 0.3;
    pub const GEODESIC_AMBIENT: f32 = 0.2;
    pub const SHININESS: f32 = 32.0;

    pub const GEODESIC_STEP_SIZE: f32 = 0.5;
    pub const GEODESIC_MAX_STEPS: u32 = 1000;
    pub const ESCAPE_RADIUS: f32 = 20_000.0;

    pub const DEFAULT_STAR_COUNT: u32 = 1000;
    pub const ORBIT_ANGULAR_SCALE: f32 = 10.0;
    pub const ORBIT_SPEED_FACTOR: f32 = 150.0;
    pub const MOVIE_FPS: u32 = 24;

    pub const SUN_POSITION_A: [f32; 3] = [0.0, 5000.0, -6000.0];
    pub const SUN_POSITION_B: [f32; 3] = [0.0, -7000.0, 8000.0];
}

/// One of the two object sets joined by the throat
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Universe {
    #[default]
    A,
    B,
}

impl Universe {
    /// The universe on the other side of the throat
    pub fn opposite(self) -> Self {
        match self {
            Universe::A => Universe::B,
            Universe::B => Universe::A,
        }
    }

    /// Numeric id used in packed buffers (1 or 2)
    pub fn id(self) -> u32 {
        match self {
            Universe::A => 1,
            Universe::B => 2,
        }
    }

    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            1 => Some(Universe::A),
            2 => Some(Universe::B),
            _ => None,
        }
    }

    /// Fallback sun position when a universe has no emissive primitive
    pub fn default_sun(self) -> Vec3 {
        match self {
            Universe::A => Vec3::from_array(TracerConfig::SUN_POSITION_A),
            Universe::B => Vec3::from_array(TracerConfig::SUN_POSITION_B),
        }
    }
}

impl fmt::Display for Universe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Universe::A => f.write_str("A"),
            Universe::B => f.write_str("B"),
        }
    }
}

/// Shape discriminant stored in `PackedPrimitive::properties[2]`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum ShapeKind {
    Sphere = 0,
    Cube = 1,
}

impl ShapeKind {
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(ShapeKind::Sphere),
            1 => Some(ShapeKind::Cube),
            _ => None,
        }
    }
}

/// Camera pose as supplied by the scene configuration
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Camera {
    pub position: [f32; 3],
    pub fov: f32,
    pub target: [f32; 3],
    pub _pad0: f32,
    pub up: [f32; 3],
    pub _pad1: f32,
}

/// Primitive layout for buffer upload (48 bytes, three vec4s)
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct PackedPrimitive {
    pub center_and_size: [f32; 4],
    pub color: [f32; 4],
    pub properties: [f32; 4], // emissive, universe id, shape kind, unused
}

/// Background star layout for buffer upload (32 bytes)
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct PackedStar {
    pub direction_and_brightness: [f32; 4],
    pub color_and_size: [f32; 4],
}

impl Camera {
    pub fn new(position: [f32; 3], target: [f32; 3], up: [f32; 3], fov: f32) -> Self {
        Self {
            position,
            fov,
            target,
            _pad0: 0.0,
            up,
            _pad1: 0.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn target(&self) -> Vec3 {
        Vec3::from_array(self.target)
    }

    pub fn up(&self) -> Vec3 {
        Vec3::from_array(self.up)
    }

    /// Unit vector from the position toward the target
    pub fn forward(&self) -> Vec3 {
        (self.target() - self.position()).normalize_or_zero()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new([0.0, 0.0, 80.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0], 60.0)
    }
}

impl PackedPrimitive {
    pub fn new(
        center: [f32; 3],
        size: f32,
        color: [f32; 3],
        emissive: bool,
        universe: Universe,
        kind: ShapeKind,
    ) -> Self {
        Self {
            center_and_size: [center[0], center[1], center[2], size],
            color: [color[0], color[1], color[2], 1.0],
            properties: [
                if emissive { 1.0 } else { 0.0 },
                universe.id() as f32,
                kind as u32 as f32,
                0.0,
            ],
        }
    }

    pub fn center(&self) -> Vec3 {
        vec3(self.center_and_size[0], self.center_and_size[1], self.center_and_size[2])
    }

    pub fn size(&self) -> f32 {
        self.center_and_size[3]
    }

    pub fn color(&self) -> Vec3 {
        vec3(self.color[0], self.color[1], self.color[2])
    }

    pub fn is_emissive(&self) -> bool {
        self.properties[0] > 0.5
    }

    /// Decode the universe tag; ids are stored as floats so round to the nearest integer
    pub fn universe(&self) -> Option<Universe> {
        Universe::from_id((self.properties[1] + 0.5) as u32)
    }

    pub fn kind(&self) -> Option<ShapeKind> {
        ShapeKind::from_id((self.properties[2] + 0.5) as u32)
    }
}

impl PackedStar {
    pub fn new(direction: [f32; 3], brightness: f32, color: [f32; 3], size: f32) -> Self {
        Self {
            direction_and_brightness: [direction[0], direction[1], direction[2], brightness],
            color_and_size: [color[0], color[1], color[2], size],
        }
    }
}

/// Pixel rectangle covered by one tile
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl TileRect {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Helper functions for tile calculations
pub struct TileHelper;

impl TileHelper {
    /// Calculate number of tiles needed for given dimensions
    pub fn calculate_tile_count(width: u32, height: u32, tile_size: u32) -> (u32, u32) {
        (width.div_ceil(tile_size), height.div_ceil(tile_size))
    }

    /// Rectangle of the tile at `index`, clipped to the frame edges
    pub fn tile_rect(index: u32, tiles_x: u32, width: u32, height: u32, tile_size: u32) -> TileRect {
        let x = (index % tiles_x) * tile_size;
        let y = (index / tiles_x) * tile_size;

        TileRect {
            x,
            y,
            width: tile_size.min(width - x),
            height: tile_size.min(height - y),
        }
    }

    /// All tiles of a frame in row-major order
    pub fn tiles(width: u32, height: u32, tile_size: u32) -> Vec<TileRect> {
        if width == 0 || height == 0 || tile_size == 0 {
            return Vec::new();
        }
        let (tiles_x, tiles_y) = Self::calculate_tile_count(width, height, tile_size);
        (0..tiles_x * tiles_y)
            .map(|index| Self::tile_rect(index, tiles_x, width, height, tile_size))
            .collect()
    }
}

/// Simple pseudo-random number generator usable on host and device
/// Uses a linear congruential generator for simplicity and speed
pub struct SimpleRng {
    seed: u32,
}

impl SimpleRng {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // Numerical Recipes constants
        self.seed = self.seed.wrapping_mul(1664525).wrapping_add(1013904223);
        self.seed
    }

    /// Generate random f32 in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / 16777216.0
    }

    /// Generate random f32 in [-1, 1)
    pub fn next_f32_signed(&mut self) -> f32 {
        self.next_f32() * 2.0 - 1.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn universe_opposite_is_an_involution() {
        assert_eq!(Universe::A.opposite(), Universe::B);
        assert_eq!(Universe::B.opposite(), Universe::A);
        assert_eq!(Universe::A.opposite().opposite(), Universe::A);
    }

    #[test]
    fn universe_ids_match_packed_encoding() {
        assert_eq!(Universe::A.id(), 1);
        assert_eq!(Universe::B.id(), 2);
        assert_eq!(Universe::from_id(2), Some(Universe::B));
        assert_eq!(Universe::from_id(0), None);
    }

    #[test]
    fn test_packed_primitive_properties() {
        let packed = PackedPrimitive::new(
            [80.0, 40.0, 0.0],
            18.0,
            [1.0, 1.0, 0.2],
            false,
            Universe::B,
            ShapeKind::Cube,
        );

        assert_eq!(packed.center(), vec3(80.0, 40.0, 0.0));
        assert_eq!(packed.size(), 18.0);
        assert!(!packed.is_emissive());
        assert_eq!(packed.universe(), Some(Universe::B));
        assert_eq!(packed.kind(), Some(ShapeKind::Cube));
        assert_eq!(packed.properties, [0.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_packed_layout_sizes() {
        assert_eq!(core::mem::size_of::<PackedPrimitive>(), 48);
        assert_eq!(core::mem::size_of::<PackedStar>(), 32);
        assert_eq!(core::mem::size_of::<Camera>(), 48);
    }

    #[test]
    fn test_packed_primitive_bytes() {
        let packed = PackedPrimitive::new([1.0, 2.0, 3.0], 4.0, [0.5; 3], true, Universe::A, ShapeKind::Sphere);
        let bytes: &[u8] = bytemuck::bytes_of(&packed);
        assert_eq!(bytes.len(), 48);

        let restored: PackedPrimitive = *bytemuck::from_bytes(bytes);
        assert_eq!(restored, packed);
    }

    #[test]
    fn test_camera_forward() {
        let camera = Camera::default();
        assert!(camera.forward().abs_diff_eq(vec3(0.0, 0.0, -1.0), 1e-6));
    }

    #[test]
    fn test_tile_count() {
        assert_eq!(TileHelper::calculate_tile_count(800, 600, 32), (25, 19));
        assert_eq!(TileHelper::calculate_tile_count(64, 64, 32), (2, 2));
        assert_eq!(TileHelper::calculate_tile_count(800, 600, u32::MAX), (1, 1));
    }

    #[test]
    fn test_oversized_tile_covers_whole_frame() {
        let tiles = TileHelper::tiles(4, 3, u32::MAX);
        assert_eq!(tiles, [TileRect { x: 0, y: 0, width: 4, height: 3 }]);
    }

    #[test]
    fn test_tiles_cover_frame_exactly() {
        let tiles = TileHelper::tiles(70, 45, 32);
        assert_eq!(tiles.len(), 6);

        let covered: usize = tiles.iter().map(TileRect::pixel_count).sum();
        assert_eq!(covered, 70 * 45);

        let last = tiles[5];
        assert_eq!(last, TileRect { x: 64, y: 32, width: 6, height: 13 });
    }

    #[test]
    fn test_tiles_empty_frame() {
        assert!(TileHelper::tiles(0, 10, 32).is_empty());
    }

    #[test]
    fn test_rng_range() {
        let mut rng = SimpleRng::new(7);
        for _ in 0..1000 {
            let v = rng.next_f32();
            assert!((0.0..1.0).contains(&v));
            let s = rng.next_f32_signed();
            assert!((-1.0..1.0).contains(&s));
        }
    }

    #[test]
    fn test_rng_is_deterministic() {
        let mut a = SimpleRng::new(42);
        let mut b = SimpleRng::new(42);
        for _ in 0..16 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }
}
