//! Error types for rasterfeat

use thiserror::Error;

/// Main error type for rasterfeat operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Two grids handed between stages do not have the same (rows, cols)
    #[error("Shape mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    ShapeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Invalid window size: {value} ({reason})")]
    InvalidWindowSize { value: String, reason: String },

    /// A ring that cannot form a polygon (fewer than 3 distinct vertices)
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// NaN or infinity reached a comparison that needs a finite value
    #[error("Numeric domain error at ({row}, {col}): {value}")]
    NumericDomainError { row: usize, col: usize, value: f64 },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Other(format!("JSON error: {}", e))
    }
}

/// Result type alias for rasterfeat operations
pub type Result<T> = std::result::Result<T, Error>;
