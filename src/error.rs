//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, codec and resize errors, and provides semantic variants
//! for argument validation, layout and crop failures.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Resize error: {0}")]
    Resize(#[from] fast_image_resize::ResizeError),

    #[error("Resize buffer error: {0}")]
    ResizeBuffer(#[from] fast_image_resize::ImageBufferError),

    #[error("JPEG encoder error: {0}")]
    Jpeg(#[from] jpeg_encoder::EncodingError),

    #[error("TIFF encoder error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Parse(#[from] crate::types::ParseValueError),

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("{what} must be greater than 0")]
    ZeroSize { what: &'static str },

    #[error("Invalid grid layout: {0}")]
    InvalidLayout(String),

    #[error("Invalid crop: {0}")]
    InvalidCrop(String),

    #[error("Frame sequence is empty")]
    EmptySequence,

    #[error("Invalid trim range {start}..{end} for a {duration:.3}s sequence")]
    InvalidTrim { start: f64, end: f64, duration: f64 },

    #[error("Output {output:?} from {source_path:?} was already written from {first:?}")]
    OutputCollision {
        output: std::path::PathBuf,
        source_path: std::path::PathBuf,
        first: std::path::PathBuf,
    },

    #[error("Processing error: {0}")]
    Processing(String),
}

impl Error {
    pub fn external<E: std::fmt::Display>(e: E) -> Self {
        Error::Processing(e.to_string())
    }
}
