use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use wormhole::animation::OrbitAnimator;
use wormhole::camera::CameraPath;
use wormhole::export::{save_frame, MovieExporter};
use wormhole::lighting::BackgroundMode;
use wormhole::portal::ThroatKind;
use wormhole::starfield::generate_stars;
use wormhole::{CpuBackend, RenderBackend, RenderContext, RenderSettings, Scene, TracerVariant, Universe};

#[derive(Parser, Debug)]
#[command(author, version, about = "Two-universe wormhole ray tracer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single still frame (PNG or PPM by extension)
    Render {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(long, short, default_value = "wormhole.png")]
        output: PathBuf,
        /// Animation time in seconds
        #[arg(long, default_value_t = 0.0)]
        time: f32,
    },
    /// Render a camera path as numbered PPM frames
    Movie {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(long, default_value = "camera_path.txt")]
        path: PathBuf,
        #[arg(long, default_value = "exports")]
        exports: PathBuf,
        /// Skip the ffmpeg step
        #[arg(long, default_value_t = false)]
        no_encode: bool,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum UniverseArg {
    A,
    B,
}

impl From<UniverseArg> for Universe {
    fn from(value: UniverseArg) -> Self {
        match value {
            UniverseArg::A => Universe::A,
            UniverseArg::B => Universe::B,
        }
    }
}

#[derive(Args, Debug)]
struct CommonArgs {
    #[arg(long, default_value_t = 800)]
    width: u32,
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// n gives n x n samples per pixel
    #[arg(long, default_value_t = 1)]
    samples: u32,
    #[arg(long, value_enum, default_value_t = TracerVariant::Lensing)]
    variant: TracerVariant,
    #[arg(long, value_enum)]
    throat: Option<ThroatKind>,
    #[arg(long, value_enum)]
    background: Option<BackgroundMode>,
    #[arg(long, default_value_t = wormhole::TracerConfig::DEFAULT_STAR_COUNT)]
    stars: u32,
    #[arg(long, default_value_t = 42)]
    seed: u32,
    #[arg(long, default_value_t = wormhole::TracerConfig::IOR_RATIO)]
    ior: f32,
    #[arg(long, default_value_t = wormhole::TracerConfig::GEODESIC_STEP_SIZE)]
    step_size: f32,
    #[arg(long, default_value_t = wormhole::TracerConfig::GEODESIC_MAX_STEPS)]
    max_steps: u32,
    #[arg(long, default_value_t = wormhole::TracerConfig::ESCAPE_RADIUS)]
    escape_radius: f32,
    #[arg(long, default_value_t = 1.0)]
    focusing: f32,
    /// Worker threads; defaults to the available parallelism
    #[arg(long)]
    threads: Option<usize>,
    /// JSON scene description
    #[arg(long)]
    scene: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = UniverseArg::A)]
    universe: UniverseArg,
}

impl CommonArgs {
    fn settings(&self) -> RenderSettings {
        let defaults = RenderSettings::default();
        RenderSettings {
            width: self.width,
            height: self.height,
            samples_per_axis: self.samples,
            variant: self.variant,
            throat: self.throat,
            background: self.background,
            star_count: self.stars,
            star_seed: self.seed,
            ior_ratio: self.ior,
            step_size: self.step_size,
            max_steps: self.max_steps,
            escape_radius: self.escape_radius,
            focusing_strength: self.focusing,
            threads: self.threads.unwrap_or(defaults.threads),
            universe: self.universe.into(),
            ..defaults
        }
    }

    fn scene(&self, settings: &RenderSettings) -> Scene {
        let mut scene = match &self.scene {
            Some(path) => Scene::load_from_path_or_default(path),
            None => Scene::default_scene(),
        };
        if let Some(kind) = settings.throat {
            scene.set_throat_kind(kind);
        }
        scene.with_stars(generate_stars(settings.star_count, settings.star_seed))
    }
}

fn prepare(common: &CommonArgs) -> Result<(Scene, RenderContext, CpuBackend)> {
    let settings = common.settings();
    settings.validate().context("invalid render settings")?;

    let scene = common.scene(&settings);
    let context = RenderContext::from_settings(&settings, scene.camera);
    let backend = CpuBackend::new(settings.threads).context("failed to build worker pool")?;

    info!(
        "Scene: {} primitives, {:?} throat r={}, {} stars, universe {}",
        scene.primitives.len(),
        scene.throat.kind,
        scene.throat.radius,
        scene.stars.len(),
        context.universe,
    );
    Ok((scene, context, backend))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Render { common, output, time } => {
            let (mut scene, context, backend) = prepare(&common)?;
            if time != 0.0 {
                OrbitAnimator::new(&scene).apply(&mut scene, time);
            }

            let framebuffer = backend.render(&scene, &context);
            save_frame(&output, &framebuffer).with_context(|| format!("failed to save {}", output.display()))?;
        }
        Command::Movie { common, path, exports, no_encode } => {
            let camera_path = CameraPath::load(&path)
                .with_context(|| format!("failed to load camera path {}", path.display()))?;
            let (mut scene, mut context, backend) = prepare(&common)?;

            let exporter = MovieExporter::new(&exports).context("failed to create export directory")?;
            let frames = exporter
                .render_path(&backend, &mut scene, &mut context, &camera_path)
                .context("movie export failed")?;
            info!("Wrote {} frames to {}", frames, exporter.directory.display());

            if !no_encode && frames > 0 {
                let video = exporter.encode().context("video encoding failed")?;
                info!("Video written to {}", video.display());
            }
        }
    }

    Ok(())
}
