use std::f32::consts::{FRAC_PI_2, PI};
use std::path::Path;
use glam::{vec3, Vec3};
use wormhole_shared::Camera;
use crate::error::SceneError;
use crate::ray::Ray;

const ORBIT_SENSITIVITY: f32 = 0.01;
const ELEVATION_LIMIT: f32 = 0.1;
const PAN_SPEED: f32 = 0.1;
const ZOOM_STEP: f32 = 0.1;
const MIN_RADIUS: f32 = 20.0;
const MAX_RADIUS: f32 = 500.0;

/// Orthonormal frame for primary ray generation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraBasis {
    pub origin: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub tan_half_fov: f32,
}

impl CameraBasis {
    pub fn new(camera: &Camera, width: u32, height: u32) -> Self {
        let forward = camera.forward();
        let mut right = forward.cross(camera.up()).normalize_or_zero();
        if right == Vec3::ZERO {
            // Looking straight along the up vector
            right = forward.any_orthonormal_vector();
        }
        let up = right.cross(forward);

        Self {
            origin: camera.position(),
            forward,
            right,
            up,
            aspect: width as f32 / height.max(1) as f32,
            tan_half_fov: (camera.fov.to_radians() * 0.5).tan(),
        }
    }

    /// Ray through normalized screen coordinates; (0, 0) is the top-left corner
    pub fn ray(&self, u: f32, v: f32) -> Ray {
        let px = (2.0 * u - 1.0) * self.aspect * self.tan_half_fov;
        let py = (1.0 - 2.0 * v) * self.tan_half_fov;
        Ray::new(self.origin, self.right * px + self.up * py + self.forward)
    }
}

/// Camera orbiting a target on a sphere
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub azimuth: f32,
    /// Polar angle from +Y
    pub elevation: f32,
    pub radius: f32,
    pub fov: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::look_from(Camera::default().position(), Vec3::ZERO, 60.0)
    }
}

impl OrbitCamera {
    /// Spherical parameters placing the camera at `position` around `target`
    pub fn look_from(position: Vec3, target: Vec3, fov: f32) -> Self {
        let offset = position - target;
        let radius = offset.length();
        let elevation = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            FRAC_PI_2
        };

        Self {
            target,
            azimuth: offset.z.atan2(offset.x),
            elevation,
            radius,
            fov,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.target + spherical_offset(self.azimuth, self.elevation, self.radius)
    }

    /// Rotate around the target; deltas are in input units
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.azimuth -= dx * ORBIT_SENSITIVITY;
        self.elevation = (self.elevation + dy * ORBIT_SENSITIVITY).clamp(ELEVATION_LIMIT, PI - ELEVATION_LIMIT);
    }

    /// Slide the target in the view plane
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = (self.target - self.position()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let local_up = right.cross(forward).normalize_or_zero();
        let speed = PAN_SPEED * (self.radius / 100.0);

        self.target -= right * dx * speed;
        self.target += local_up * dy * speed;
    }

    pub fn zoom(&mut self, delta: f32) {
        self.radius = (self.radius * (1.0 - delta * ZOOM_STEP)).clamp(MIN_RADIUS, MAX_RADIUS);
    }

    pub fn to_camera(&self) -> Camera {
        Camera::new(
            self.position().to_array(),
            self.target.to_array(),
            [0.0, 1.0, 0.0],
            self.fov,
        )
    }
}

fn spherical_offset(azimuth: f32, elevation: f32, radius: f32) -> Vec3 {
    vec3(
        radius * elevation.sin() * azimuth.cos(),
        radius * elevation.cos(),
        radius * elevation.sin() * azimuth.sin(),
    )
}

/// One camera path sample; angles in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    pub time: f32,
    pub azimuth_deg: f32,
    pub elevation_deg: f32,
    pub radius: f32,
    pub target: Vec3,
}

impl Keyframe {
    /// Parse `time az el radius tx ty tz`
    fn parse(line: &str) -> Option<Self> {
        let mut values = line.split_whitespace().map(str::parse::<f32>);
        let mut next = || values.next()?.ok();

        Some(Self {
            time: next()?,
            azimuth_deg: next()?,
            elevation_deg: next()?,
            radius: next()?,
            target: vec3(next()?, next()?, next()?),
        })
    }
}

/// Keyframed camera flight, sampled by linear interpolation
#[derive(Clone, Debug, PartialEq)]
pub struct CameraPath {
    pub keyframes: Vec<Keyframe>,
}

impl CameraPath {
    /// Parse path text; blank lines, `#` comments and malformed lines are skipped
    pub fn parse(text: &str) -> Self {
        let keyframes = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(Keyframe::parse)
            .collect();

        Self { keyframes }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let camera_path = Self::parse(&text);
        if camera_path.keyframes.is_empty() {
            return Err(SceneError::EmptyCameraPath(path.to_path_buf()));
        }
        Ok(camera_path)
    }

    /// Time of the last keyframe
    pub fn duration(&self) -> f32 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }

    /// Camera at `time`, clamped to the first and last keyframes
    pub fn sample(&self, time: f32, fov: f32) -> Option<Camera> {
        let first = self.keyframes.first()?;
        let index = self
            .keyframes
            .iter()
            .rposition(|k| k.time <= time)
            .unwrap_or(0);
        let a = self.keyframes.get(index).unwrap_or(first);
        let b = self.keyframes.get(index + 1).unwrap_or(a);

        let t = if b.time > a.time {
            ((time - a.time) / (b.time - a.time)).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let lerp = |x: f32, y: f32| x + (y - x) * t;
        let target = a.target.lerp(b.target, t);
        let offset = spherical_offset(
            lerp(a.azimuth_deg, b.azimuth_deg).to_radians(),
            lerp(a.elevation_deg, b.elevation_deg).to_radians(),
            lerp(a.radius, b.radius),
        );

        Some(Camera::new(
            (target + offset).to_array(),
            target.to_array(),
            [0.0, 1.0, 0.0],
            fov,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_ray_follows_forward() {
        let basis = CameraBasis::new(&Camera::default(), 800, 600);
        let ray = basis.ray(0.5, 0.5);
        assert!(ray.direction.abs_diff_eq(vec3(0.0, 0.0, -1.0), 1e-6));
        assert_eq!(ray.origin, vec3(0.0, 0.0, 80.0));
    }

    #[test]
    fn screen_corners_map_to_frustum() {
        let basis = CameraBasis::new(&Camera::default(), 200, 100);
        let top_left = basis.ray(0.0, 0.0).direction;
        assert!(top_left.x < 0.0 && top_left.y > 0.0);

        // Horizontal extent is aspect times the vertical one
        let ratio = top_left.x / top_left.y;
        assert!((ratio + 2.0).abs() < 1e-4);

        let half = (30.0f32).to_radians().tan();
        let top = basis.ray(0.5, 0.0).direction;
        assert!((top.y / -top.z - half).abs() < 1e-5);
    }

    #[test]
    fn basis_when_looking_along_up() {
        let camera = Camera::new([0.0, 100.0, 0.0], [0.0; 3], [0.0, 1.0, 0.0], 60.0);
        let basis = CameraBasis::new(&camera, 10, 10);
        assert!((basis.right.length() - 1.0).abs() < 1e-5);
        assert!(basis.ray(0.5, 0.5).direction.abs_diff_eq(-Vec3::Y, 1e-5));
    }

    #[test]
    fn default_orbit_matches_default_camera() {
        let orbit = OrbitCamera::default();
        assert!(orbit.position().abs_diff_eq(vec3(0.0, 0.0, 80.0), 1e-4));
        assert!((orbit.radius - 80.0).abs() < 1e-5);
    }

    #[test]
    fn orbit_clamps_elevation() {
        let mut orbit = OrbitCamera::default();
        orbit.orbit(0.0, 10_000.0);
        assert!((orbit.elevation - (PI - 0.1)).abs() < 1e-6);
        orbit.orbit(0.0, -10_000.0);
        assert!((orbit.elevation - 0.1).abs() < 1e-6);

        let azimuth = orbit.azimuth;
        orbit.orbit(10.0, 0.0);
        assert!((orbit.azimuth - (azimuth - 0.1)).abs() < 1e-6);
        assert!((orbit.position() - orbit.target).length() - orbit.radius < 1e-3);
    }

    #[test]
    fn zoom_clamps_radius() {
        let mut orbit = OrbitCamera::default();
        orbit.zoom(1.0);
        assert!((orbit.radius - 72.0).abs() < 1e-4);

        orbit.zoom(9.0);
        assert_eq!(orbit.radius, MIN_RADIUS);
        orbit.zoom(-1000.0);
        assert_eq!(orbit.radius, MAX_RADIUS);
    }

    #[test]
    fn pan_moves_target_in_view_plane() {
        let mut orbit = OrbitCamera::default();
        orbit.pan(10.0, 0.0);
        // Looking down -Z, right is +X; a positive drag slides the target left
        assert!(orbit.target.abs_diff_eq(vec3(-0.8, 0.0, 0.0), 1e-4));

        orbit.pan(0.0, 10.0);
        assert!((orbit.target.y - 0.8).abs() < 1e-4);
    }

    #[test]
    fn look_from_round_trips() {
        let position = vec3(30.0, 40.0, -50.0);
        let target = vec3(1.0, 2.0, 3.0);
        let orbit = OrbitCamera::look_from(position, target, 45.0);
        assert!(orbit.position().abs_diff_eq(position, 1e-3));
        assert_eq!(orbit.to_camera().target, [1.0, 2.0, 3.0]);
    }

    const PATH: &str = "\
# time az el radius tx ty tz
0 90 90 80 0 0 0

not a keyframe
2 180 90 100 10 0 0
4 180 45 100 10 0 0 trailing
";

    #[test]
    fn parse_skips_comments_and_garbage() {
        let path = CameraPath::parse(PATH);
        assert_eq!(path.keyframes.len(), 3);
        assert_eq!(path.duration(), 4.0);
        assert_eq!(path.keyframes[1].target, vec3(10.0, 0.0, 0.0));
    }

    #[test]
    fn sample_interpolates_and_clamps() {
        let path = CameraPath::parse(PATH);

        let start = path.sample(0.0, 60.0).unwrap();
        assert!(start.position().abs_diff_eq(vec3(0.0, 0.0, 80.0), 1e-3));

        let middle = path.sample(1.0, 60.0).unwrap();
        assert!(middle.target().abs_diff_eq(vec3(5.0, 0.0, 0.0), 1e-5));
        let radius = (middle.position() - middle.target()).length();
        assert!((radius - 90.0).abs() < 1e-3);

        let before = path.sample(-3.0, 60.0).unwrap();
        assert_eq!(before, start);

        let after = path.sample(10.0, 60.0).unwrap();
        let end = path.sample(4.0, 60.0).unwrap();
        assert_eq!(after, end);
    }

    #[test]
    fn empty_path_has_no_samples() {
        let path = CameraPath::parse("# nothing here\n");
        assert!(path.sample(0.0, 60.0).is_none());
        assert_eq!(path.duration(), 0.0);
    }

    #[test]
    fn loading_missing_path_fails() {
        assert!(matches!(
            CameraPath::load("/nonexistent/camera_path.txt"),
            Err(SceneError::Io { .. })
        ));
    }
}
