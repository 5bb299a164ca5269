//! Readers and writers for the pipeline's inputs and outputs
//!
//! Property tables always come from delimited text. Centre datasets go
//! through the `FeatureReader` trait so the registry can pick a reader from
//! the file extension.

use std::path::Path;

use crate::error::{CatchmentError, Result};
use crate::models::CentreDataset;

pub mod property_csv;
pub mod geojson;
pub mod shapefile;
pub mod writer;

pub use self::property_csv::PropertyCsvReader;
pub use self::geojson::GeoJsonReader;
pub use self::shapefile::ShapefileReader;
pub use self::writer::{write_near_table, write_scored_table, OutputFormat};

/// Reader for point datasets holding centre locations
pub trait FeatureReader {
    /// Read every point feature of the dataset at `path`
    fn read(&self, path: &Path) -> Result<CentreDataset>;

    /// Get supported file extensions (e.g., ["shp"])
    fn supported_extensions(&self) -> &[&str];

    /// Get human-readable format name
    fn format_name(&self) -> &str;
}

/// Registry dispatching centre datasets to a reader by extension
pub struct FeatureRegistry {
    readers: Vec<Box<dyn FeatureReader>>,
}

impl FeatureRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self { readers: Vec::new() }
    }

    /// Registry with every built-in reader
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ShapefileReader));
        registry.register(Box::new(GeoJsonReader));
        registry
    }

    /// Register a format reader
    pub fn register(&mut self, reader: Box<dyn FeatureReader>) {
        self.readers.push(reader);
    }

    /// Detect format and return appropriate reader
    pub fn detect(&self, path: &Path) -> Result<&dyn FeatureReader> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        self.readers
            .iter()
            .find(|r| r.supported_extensions().iter().any(|ext| *ext == extension))
            .map(|r| r.as_ref())
            .ok_or_else(|| CatchmentError::UnsupportedFormat {
                path: path.to_path_buf(),
                expected: self.supported_extensions().join(", "),
            })
    }

    /// Detect the format and read the dataset in one step
    pub fn read(&self, path: &Path) -> Result<CentreDataset> {
        let reader = self.detect(path)?;
        tracing::debug!("Reading {} as {}", path.display(), reader.format_name());
        reader.read(path)
    }

    /// Every extension some registered reader accepts
    pub fn supported_extensions(&self) -> Vec<String> {
        self.readers
            .iter()
            .flat_map(|r| r.supported_extensions().iter().map(|e| format!(".{}", e)))
            .collect()
    }
}

impl Default for FeatureRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Verify that a file exists and is a regular file
pub fn verify_file_exists(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(CatchmentError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Dataset name derived from the file stem
pub(crate) fn dataset_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed")
        .to_string()
}

/// Parse an EPSG code out of a CRS name such as `EPSG:3414` or
/// `urn:ogc:def:crs:EPSG::3414`
pub(crate) fn epsg_from_name(name: &str) -> Option<u32> {
    if name.contains("CRS84") {
        return Some(4326);
    }
    name.rsplit(':').next().and_then(|code| code.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_registry_detects_by_extension() {
        let registry = FeatureRegistry::with_defaults();

        let shp = registry.detect(Path::new("centres.shp")).unwrap();
        assert_eq!(shp.format_name(), "Shapefile");

        let geojson = registry.detect(Path::new("centres.GeoJSON")).unwrap();
        assert_eq!(geojson.format_name(), "GeoJSON");
    }

    #[test]
    fn test_registry_rejects_unknown_extension() {
        let registry = FeatureRegistry::with_defaults();
        let err = registry.detect(&PathBuf::from("centres.kml")).err().unwrap();
        match err {
            CatchmentError::UnsupportedFormat { expected, .. } => {
                assert!(expected.contains(".shp"));
                assert!(expected.contains(".geojson"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_epsg_from_name() {
        assert_eq!(epsg_from_name("EPSG:3414"), Some(3414));
        assert_eq!(epsg_from_name("urn:ogc:def:crs:EPSG::3414"), Some(3414));
        assert_eq!(epsg_from_name("urn:ogc:def:crs:OGC:1.3:CRS84"), Some(4326));
        assert_eq!(epsg_from_name("SVY21"), None);
    }
}
