use std::path::PathBuf;

/// Errors raised while reading tracks, reducing them to segments or writing sheets.
#[derive(Debug, thiserror::Error)]
pub enum TramosError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse GPX: {0}")]
    Gpx(#[from] gpx::errors::GpxError),

    #[error("could not write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not scan directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("could not build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("no tracks found in {}", .0.display())]
    NoTracks(PathBuf),

    /// The track had fewer than two usable points, so nothing could be reduced.
    #[error("no segments could be computed for {source_name}")]
    NoSegments { source_name: String },

    #[error("threshold `{name}` must be a finite, non-negative number (got {value})")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid output: {0}")]
    InvalidOutput(String),
}

pub type Result<T> = std::result::Result<T, TramosError>;
