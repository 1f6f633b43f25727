pub mod animation;
pub mod camera;
pub mod compute;
pub mod config;
pub mod error;
pub mod export;
pub mod geodesic;
pub mod intersection;
pub mod lensing;
pub mod lighting;
pub mod portal;
pub mod ray;
pub mod renderer;
pub mod scene;
pub mod starfield;

pub use wormhole_shared::{Camera, TracerConfig, Universe};

pub use compute::{CpuBackend, RenderBackend, SerialBackend};
pub use config::RenderSettings;
pub use renderer::{Framebuffer, RenderContext, TracerVariant};
pub use scene::Scene;

#[cfg(test)]
mod scenario_tests {
    use glam::{vec3, Vec3};
    use crate::camera::CameraBasis;
    use crate::lighting::gradient;
    use crate::portal::Throat;
    use crate::renderer::FrameTracer;
    use crate::scene::Primitive;
    use super::*;

    /// Red sphere in A, yellow cube in B, throat of radius 25 at the origin
    fn two_object_scene() -> Scene {
        Scene::new(
            Camera::default(),
            vec![
                Primitive::sphere(vec3(-80.0, 40.0, 0.0), 10.0, vec3(1.0, 0.0, 0.0), Universe::A),
                Primitive::cube(vec3(80.0, 40.0, 0.0), 18.0, vec3(1.0, 1.0, 0.0), Universe::B),
            ],
            Throat::sphere(Vec3::ZERO, 25.0),
        )
    }

    /// Normalized screen coordinates of a world point for the default camera
    fn project(context: &RenderContext, point: Vec3) -> (f32, f32) {
        let basis = CameraBasis::new(&context.camera, context.width, context.height);
        let d = point - basis.origin;
        let depth = d.dot(basis.forward);
        let px = d.dot(basis.right) / depth;
        let py = d.dot(basis.up) / depth;
        (
            (px / (basis.aspect * basis.tan_half_fov) + 1.0) * 0.5,
            (1.0 - py / basis.tan_half_fov) * 0.5,
        )
    }

    fn pixel_at(context: &RenderContext, (u, v): (f32, f32)) -> (u32, u32) {
        ((u * context.width as f32) as u32, (v * context.height as f32) as u32)
    }

    #[test]
    fn red_sphere_pixel_is_red() {
        let scene = two_object_scene();
        // Wide frame so the sphere at 45 degrees is on screen
        let context = RenderContext::new(Camera::default(), 320, 120);
        let tracer = FrameTracer::new(&scene, &context);

        let (x, y) = pixel_at(&context, project(&context, vec3(-80.0, 40.0, 0.0)));
        let [r, g, b] = tracer.shade_pixel(x, y);
        assert!(r > 2 * g.max(b), "expected red, got {:?}", [r, g, b]);
    }

    #[test]
    fn throat_pixel_sees_universe_b() {
        let scene = two_object_scene();
        let context = RenderContext::new(Camera::default(), 160, 120);
        let tracer = FrameTracer::new(&scene, &context);

        // Straight through the throat center nothing in B lies ahead
        let ray = crate::ray::Ray::new(vec3(0.0, 0.0, 80.0), -Vec3::Z);
        let color = tracer.trace(&ray);
        assert!(color.abs_diff_eq(gradient(-Vec3::Z, Universe::B), 1e-5));
    }

    #[test]
    fn throat_pixel_toward_cube_is_yellow() {
        // The B cube moved behind the throat so the bent ray finds it
        let mut scene = two_object_scene();
        scene.primitives[1].center = vec3(0.0, 0.0, -60.0);
        let context = RenderContext::new(Camera::default(), 160, 120);
        let tracer = FrameTracer::new(&scene, &context);

        let [r, g, b] = tracer.shade_pixel(80, 60);
        assert!(r > 2 * b && g > 2 * b, "expected yellow, got {:?}", [r, g, b]);
    }

    #[test]
    fn empty_sky_pixel_is_universe_a_gradient() {
        let scene = two_object_scene();
        let context = RenderContext::new(Camera::default(), 160, 120);
        let tracer = FrameTracer::new(&scene, &context);

        let ray = tracer.primary_ray(2, 2, 0, 0);
        let expected = gradient(ray.direction, Universe::A);
        assert!(tracer.trace(&ray).abs_diff_eq(expected, 1e-6));
        assert_eq!(tracer.shade_pixel(2, 2), crate::renderer::to_rgb8(expected));
    }

    #[test]
    fn toggling_universe_swaps_the_view() {
        let scene = two_object_scene();
        let mut context = RenderContext::new(Camera::default(), 320, 120);
        let (x, y) = pixel_at(&context, project(&context, vec3(-80.0, 40.0, 0.0)));

        context.toggle_universe();
        let tracer = FrameTracer::new(&scene, &context);
        let [r, g, b] = tracer.shade_pixel(x, y);
        assert!(r < 100 && g < 100 && b < 100);
    }

    #[test]
    fn full_frame_is_identical_across_backends() {
        let scene = two_object_scene();
        let mut context = RenderContext::new(Camera::default(), 48, 36);
        context.samples_per_axis = 2;

        let serial = SerialBackend.render(&scene, &context);
        let parallel = CpuBackend::new(4).unwrap().render(&scene, &context);
        assert_eq!(serial.pixels.len(), 48 * 36 * 3);
        assert_eq!(serial, parallel);
    }
}
