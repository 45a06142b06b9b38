use ndarray_stats::errors::MultiInputError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("Image loading error: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("n_components={requested} must be between 1 and {max}")]
    InvalidComponents { requested: usize, max: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Decomposition failed: {0}")]
    DecompositionFailed(String),

    #[error("Incompatible buffers: {0}")]
    ShapeMismatch(#[from] MultiInputError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CompressionError>;
