//! Delimited-text reader for the property table

use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{CatchmentError, Result};
use crate::formats::{dataset_name, verify_file_exists};
use crate::models::{ObjectId, PropertyRecord, PropertyTable};

/// Reads property rows carrying longitude/latitude columns
#[derive(Debug, Clone)]
pub struct PropertyCsvReader {
    longitude_field: String,
    latitude_field: String,
}

impl Default for PropertyCsvReader {
    fn default() -> Self {
        Self::new("longitude", "latitude")
    }
}

impl PropertyCsvReader {
    pub fn new(longitude_field: impl Into<String>, latitude_field: impl Into<String>) -> Self {
        Self {
            longitude_field: longitude_field.into(),
            latitude_field: latitude_field.into(),
        }
    }

    /// Read the property table at `path`
    pub fn read(&self, path: &Path) -> Result<PropertyTable> {
        verify_file_exists(path)?;
        let file = File::open(path)?;
        self.read_from(path, file)
    }

    /// Read a property table from any byte source; `origin` names it in errors
    pub fn read_from<R: Read>(&self, origin: &Path, source: R) -> Result<PropertyTable> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::Headers)
            .from_reader(source);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let lon_idx = self.column(&headers, &self.longitude_field, origin)?;
        let lat_idx = self.column(&headers, &self.latitude_field, origin)?;

        let mut records = Vec::new();
        for (idx, row) in reader.records().enumerate() {
            let row = row?;
            let row_number = idx + 1;
            let attributes: Vec<String> = row.iter().map(str::to_string).collect();

            let longitude = parse_coordinate(&attributes, lon_idx, row_number, &self.longitude_field)?;
            let latitude = parse_coordinate(&attributes, lat_idx, row_number, &self.latitude_field)?;

            records.push(PropertyRecord {
                id: ObjectId(row_number as u64),
                longitude,
                latitude,
                attributes,
            });
        }

        tracing::debug!(
            "Read {} property rows from {} ({} columns)",
            records.len(),
            origin.display(),
            headers.len()
        );

        Ok(PropertyTable {
            name: dataset_name(origin),
            headers,
            records,
        })
    }

    fn column(&self, headers: &[String], name: &str, origin: &Path) -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CatchmentError::MissingColumn {
                column: name.to_string(),
                path: PathBuf::from(origin),
            })
    }
}

fn parse_coordinate(
    attributes: &[String],
    idx: usize,
    row: usize,
    column: &str,
) -> Result<f64> {
    let raw = attributes.get(idx).map(String::as_str).unwrap_or("");
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CatchmentError::InvalidCoordinate {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}
