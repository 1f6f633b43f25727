use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use log::{debug, info};
use rayon::prelude::*;
use wormhole_shared::{TileHelper, TracerConfig};
use crate::renderer::{FrameTracer, Framebuffer, RenderContext};
use crate::scene::Scene;

/// An execution target for the per-pixel tracing contract
pub trait RenderBackend {
    /// Trace every pixel of the frame; returns once all of them are resolved
    fn render(&self, scene: &Scene, context: &RenderContext) -> Framebuffer;
}

/// Single-threaded scanline rendering
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialBackend;

impl RenderBackend for SerialBackend {
    fn render(&self, scene: &Scene, context: &RenderContext) -> Framebuffer {
        let tracer = FrameTracer::new(scene, context);
        let mut framebuffer = Framebuffer::new(context.width, context.height);

        for y in 0..context.height {
            for x in 0..context.width {
                framebuffer.set_pixel(x, y, tracer.shade_pixel(x, y));
            }
        }

        framebuffer
    }
}

/// Tiles traced in parallel on a fixed-size worker pool
pub struct CpuBackend {
    pool: rayon::ThreadPool,
    tile_size: u32,
}

impl CpuBackend {
    pub fn new(threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("wormhole-worker-{i}"))
            .build()?;

        Ok(Self {
            pool,
            tile_size: TracerConfig::TILE_SIZE,
        })
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size.max(1);
        self
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl RenderBackend for CpuBackend {
    fn render(&self, scene: &Scene, context: &RenderContext) -> Framebuffer {
        let start = Instant::now();
        let tiles = TileHelper::tiles(context.width, context.height, self.tile_size);
        let total = tiles.len();
        let finished = AtomicUsize::new(0);

        info!(
            "Rendering {}x{} ({} tiles, {} threads, {:?}, {}x{} samples)",
            context.width,
            context.height,
            total,
            self.threads(),
            context.variant,
            context.samples_per_axis,
            context.samples_per_axis,
        );

        let tracer = FrameTracer::new(scene, context);
        let rendered: Vec<Vec<u8>> = self.pool.install(|| {
            tiles
                .par_iter()
                .map(|tile| {
                    let bytes = tracer.render_tile(tile);
                    let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
                    debug!("Tile {}/{} done", done, total);
                    bytes
                })
                .collect()
        });

        let mut framebuffer = Framebuffer::new(context.width, context.height);
        for (tile, bytes) in tiles.iter().zip(&rendered) {
            framebuffer.blit_tile(tile, bytes);
        }

        info!("Render completed in {:.2}ms", start.elapsed().as_secs_f32() * 1000.0);
        framebuffer
    }
}
