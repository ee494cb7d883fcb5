//! Error types for ecubevis.
//!
//! A single error enum covers every failure the normalizer, slicer, loader and
//! plot planner can report. Callers outside the crate usually only match on the
//! coordinate and selection variants.

use thiserror::Error;

/// The main error type for ecubevis operations.
#[derive(Error, Debug)]
pub enum EcubevisError {
    /// A coordinate name outside the accepted vocabulary
    #[error("Unknown coordinate '{name}'. Accepted coordinate names are: {}", accepted.join(", "))]
    UnknownCoordinate { name: String, accepted: Vec<String> },

    /// Two coordinate names resolve to the same canonical name
    #[error("Coordinates '{first}' and '{second}' both map to canonical coordinate '{canonical}'")]
    DuplicateCoordinate {
        first: String,
        second: String,
        canonical: String,
    },

    /// The selected variable is neither 3D nor 4D
    #[error("Variable '{variable}' is {ndim}D, expected a 3D [time, lat, lon] or 4D [time, level, lat, lon] array")]
    Dimensionality { variable: String, ndim: usize },

    /// A wraparound selection whose rotation index is undefined
    #[error("Degenerate longitude selection: {message}")]
    DegenerateSelection { message: String },

    /// A bound that keeps no points along its axis
    #[error("Selection along '{dimension}' is empty: {message}")]
    EmptySelection { dimension: String, message: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// Invalid coordinate errors
    #[error("Invalid coordinates: {message}")]
    InvalidCoordinates { message: String },

    /// Data not found errors
    #[error("Data not found: {message}")]
    DataNotFound { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// NetCDF file operation errors
    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    /// Array shape errors
    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results with EcubevisError
pub type Result<T> = std::result::Result<T, EcubevisError>;
