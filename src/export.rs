use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};
use log::{info, warn};
use wormhole_shared::TracerConfig;
use crate::animation::OrbitAnimator;
use crate::camera::CameraPath;
use crate::compute::RenderBackend;
use crate::error::ExportError;
use crate::renderer::{Framebuffer, RenderContext};
use crate::scene::Scene;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ExportError {
    let path = path.to_path_buf();
    move |source| ExportError::Io { path, source }
}

/// Write a binary PPM (P6)
pub fn write_ppm(path: &Path, framebuffer: &Framebuffer) -> Result<(), ExportError> {
    fs::write(path, framebuffer.to_ppm()).map_err(io_error(path))
}

/// Save a still frame as PNG or PPM, chosen by file extension
pub fn save_frame(path: &Path, framebuffer: &Framebuffer) -> Result<(), ExportError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("ppm") => write_ppm(path, framebuffer)?,
        Some("png") => image::save_buffer(
            path,
            &framebuffer.pixels,
            framebuffer.width,
            framebuffer.height,
            image::ColorType::Rgb8,
        )?,
        _ => return Err(ExportError::UnsupportedFormat(path.to_path_buf())),
    }

    info!("Saved {}x{} frame to {:?}", framebuffer.width, framebuffer.height, path);
    Ok(())
}

/// Numbered PPM frames in a per-run directory
pub struct MovieExporter {
    pub directory: PathBuf,
    pub fps: u32,
}

impl MovieExporter {
    /// Create `<root>/run_<unix seconds>`
    pub fn new(root: &Path) -> Result<Self, ExportError> {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self::in_directory(root.join(format!("run_{stamp}")))
    }

    pub fn in_directory(directory: PathBuf) -> Result<Self, ExportError> {
        fs::create_dir_all(&directory).map_err(io_error(&directory))?;
        Ok(Self {
            directory,
            fps: TracerConfig::MOVIE_FPS,
        })
    }

    pub fn frame_path(&self, index: u32) -> PathBuf {
        self.directory.join(format!("frame_{index:05}.ppm"))
    }

    pub fn frame_count(&self, duration: f32) -> u32 {
        (duration.max(0.0) * self.fps as f32) as u32
    }

    pub fn write_frame(&self, index: u32, framebuffer: &Framebuffer) -> Result<PathBuf, ExportError> {
        let path = self.frame_path(index);
        write_ppm(&path, framebuffer)?;
        Ok(path)
    }

    /// Render the whole camera path, animating the scene by frame time.
    /// Returns the number of frames written.
    pub fn render_path(
        &self,
        backend: &dyn RenderBackend,
        scene: &mut Scene,
        context: &mut RenderContext,
        path: &CameraPath,
    ) -> Result<u32, ExportError> {
        let animator = OrbitAnimator::new(scene);
        let frames = self.frame_count(path.duration());
        let fov = context.camera.fov;
        info!("Rendering {} frames for a {:.2}s path into {:?}", frames, path.duration(), self.directory);

        for index in 0..frames {
            let time = index as f32 / self.fps as f32;
            if let Some(camera) = path.sample(time, fov) {
                context.camera = camera;
            }
            animator.apply(scene, time);

            let framebuffer = backend.render(scene, context);
            self.write_frame(index, &framebuffer)?;
            info!("Saved frame {}/{}", index + 1, frames);
        }

        Ok(frames)
    }

    /// ffmpeg invocation muxing the frames into `<directory>.mp4`
    pub fn ffmpeg_command(&self) -> (Command, PathBuf) {
        let video = self.directory.with_extension("mp4");
        let mut command = Command::new("ffmpeg");
        command
            .arg("-r")
            .arg(self.fps.to_string())
            .arg("-i")
            .arg(self.directory.join("frame_%05d.ppm"))
            .args(["-c:v", "libx264", "-pix_fmt", "yuv420p", "-y"])
            .arg(&video);
        (command, video)
    }

    /// Run ffmpeg; failure is reported with the command so it can be rerun by hand
    pub fn encode(&self) -> Result<PathBuf, ExportError> {
        let (mut command, video) = self.ffmpeg_command();
        let status = command
            .status()
            .map_err(|e| ExportError::Encoder(format!("could not start ffmpeg: {e}")))?;

        if !status.success() {
            warn!("ffmpeg failed; rerun manually: {:?}", command);
            return Err(ExportError::Encoder(format!("ffmpeg exited with {status}")));
        }

        info!("Created video {:?}", video);
        Ok(video)
    }
}
