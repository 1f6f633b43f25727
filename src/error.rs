use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading scene descriptions and camera paths
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scene description: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid scene: {0}")]
    Validation(String),

    #[error("camera path {0:?} contains no keyframes")]
    EmptyCameraPath(PathBuf),
}

/// Errors raised while writing frames and movies
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("unsupported output format for {0:?} (expected .png or .ppm)")]
    UnsupportedFormat(PathBuf),

    #[error("video encoder failed: {0}")]
    Encoder(String),
}

/// Rejected render settings
#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("frame dimensions must be non-zero, got {width}x{height}")]
    EmptyFrame { width: u32, height: u32 },

    #[error("supersampling factor must be at least 1")]
    NoSamples,

    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },

    #[error("geodesic max steps must be at least 1")]
    NoSteps,

    #[error("thread count must be at least 1")]
    NoThreads,
}
