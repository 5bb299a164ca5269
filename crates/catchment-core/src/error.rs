//! Error types for catchment

use std::path::PathBuf;
use thiserror::Error;

use crate::models::{CentreId, ObjectId};

#[derive(Debug, Error)]
pub enum CatchmentError {
    // Input errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported format for {path}: expected one of {expected}")]
    UnsupportedFormat { path: PathBuf, expected: String },

    #[error("{format} error: {message}")]
    FormatError { format: String, message: String },

    #[error("Column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    #[error("Invalid {column} value '{value}' at row {row}")]
    InvalidCoordinate {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Feature {feature} has unsupported geometry: {geometry_type} (only points are accepted)")]
    UnsupportedGeometry {
        feature: usize,
        geometry_type: String,
    },

    // Geoprocessing errors
    #[error("Projection from EPSG:{from} to EPSG:{to} failed: {reason}")]
    ProjectionFailed { from: u32, to: u32, reason: String },

    #[error("Invalid search radius {radius}: must be a finite value greater than zero")]
    InvalidRadius { radius: f64 },

    #[error("Property {property} coincides with centre {centre}; inverse distance is undefined")]
    CoincidentPoints { property: ObjectId, centre: CentreId },

    #[error("Property {property} has no projected position")]
    UnprojectedProperty { property: ObjectId },

    // Output errors
    #[error("Output already exists at {path} and overwrite is disabled")]
    OutputExists { path: PathBuf },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<csv::Error> for CatchmentError {
    fn from(err: csv::Error) -> Self {
        CatchmentError::FormatError {
            format: "CSV".to_string(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatchmentError>;
