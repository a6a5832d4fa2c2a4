use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced at the boundaries of the analysis pipeline.
///
/// The pipeline stages themselves are total; only image I/O, threshold estimation and
/// configuration loading can fail.
#[derive(Debug, Error)]
pub enum CpsError {
    /// The input image could not be opened or decoded.
    #[error("cannot read image {}: {source}", path.display())]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Otsu's method has nothing to split, e.g. a constant value channel.
    #[error("cannot estimate threshold: {0}")]
    CannotEstimate(String),

    /// The rendered image could not be persisted.
    #[error("cannot write image {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed configuration file: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CpsError>;
