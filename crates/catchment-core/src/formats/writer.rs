//! Persistence of the enriched property dataset and the near table
//!
//! Every write goes to a temporary file next to the destination and is
//! renamed into place once complete, so a failed run never leaves a partial
//! output behind.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::{CatchmentError, Result};
use crate::models::{ScoredTable, WeightedPair};

/// Output encodings chosen from the destination extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    GeoJson,
    Csv,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "geojson" | "json" => Ok(OutputFormat::GeoJson),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(CatchmentError::UnsupportedFormat {
                path: path.to_path_buf(),
                expected: ".geojson, .json, .csv".to_string(),
            }),
        }
    }

    /// Near tables are only written as CSV
    pub fn require_csv(path: &Path) -> Result<()> {
        match Self::from_path(path) {
            Ok(OutputFormat::Csv) => Ok(()),
            _ => Err(CatchmentError::UnsupportedFormat {
                path: path.to_path_buf(),
                expected: ".csv".to_string(),
            }),
        }
    }
}

/// Write the scored property table to `path`
pub fn write_scored_table(table: &ScoredTable, path: &Path, overwrite: bool) -> Result<()> {
    let format = OutputFormat::from_path(path)?;
    persist_atomically(path, overwrite, |out| match format {
        OutputFormat::GeoJson => write_geojson(table, out),
        OutputFormat::Csv => write_csv(table, out),
    })?;
    tracing::info!("Wrote {} scored properties to {}", table.len(), path.display());
    Ok(())
}

/// Write the weighted near table as CSV
pub fn write_near_table(pairs: &[WeightedPair], path: &Path, overwrite: bool) -> Result<()> {
    OutputFormat::require_csv(path)?;
    persist_atomically(path, overwrite, |out| {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(["IN_FID", "NEAR_FID", "NEAR_DIST", "NEAR_RANK", "WEIGHT"])?;
        for weighted in pairs {
            let pair = &weighted.pair;
            writer.write_record([
                pair.property_id.to_string(),
                pair.centre_id.to_string(),
                pair.distance.to_string(),
                pair.rank.to_string(),
                weighted.weight.to_string(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    })?;
    tracing::info!("Wrote {} near pairs to {}", pairs.len(), path.display());
    Ok(())
}

/// Feature property carrying the 1-based row identity
const OBJECTID: &str = "OBJECTID";

fn write_geojson(table: &ScoredTable, out: &mut dyn Write) -> Result<()> {
    if table.headers.iter().any(|h| h == OBJECTID) {
        tracing::warn!("Input has an '{}' column; the row identity replaces it", OBJECTID);
    }

    let features = table
        .rows
        .iter()
        .map(|row| {
            let mut properties = JsonObject::new();
            for (header, value) in table.headers.iter().zip(&row.attributes) {
                properties.insert(header.clone(), infer_value(value));
            }
            properties.insert(OBJECTID.to_string(), row.id.0.into());
            properties.insert(table.field_name.clone(), number(row.score));

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![
                    row.position[0],
                    row.position[1],
                ]))),
                id: Some(geojson::feature::Id::Number(row.id.0.into())),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let mut foreign_members = JsonObject::new();
    foreign_members.insert(
        "crs".to_string(),
        serde_json::json!({
            "type": "name",
            "properties": { "name": format!("urn:ogc:def:crs:EPSG::{}", table.crs.epsg) }
        }),
    );

    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    };

    serde_json::to_writer_pretty(&mut *out, &collection)
        .map_err(|e| CatchmentError::Serialization(e.to_string()))?;
    writeln!(out)?;
    Ok(())
}

fn write_csv(table: &ScoredTable, out: &mut dyn Write) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header: Vec<&str> = table.headers.iter().map(String::as_str).collect();
    header.extend(["POINT_X", "POINT_Y", table.field_name.as_str()]);
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record: Vec<String> = row.attributes.clone();
        record.push(row.position[0].to_string());
        record.push(row.position[1].to_string());
        record.push(row.score.to_string());
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Type a raw CSV cell the way a dataframe loader would
fn infer_value(raw: &str) -> serde_json::Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return serde_json::Value::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return i.into();
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() => number(f),
        _ => serde_json::Value::String(raw.to_string()),
    }
}

fn number(value: f64) -> serde_json::Value {
    serde_json::Number::from_f64(value)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

fn persist_atomically<F>(path: &Path, overwrite: bool, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    if path.exists() && !overwrite {
        return Err(CatchmentError::OutputExists {
            path: path.to_path_buf(),
        });
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut buffered = BufWriter::new(temp.as_file_mut());
        write(&mut buffered)?;
        buffered.flush()?;
    }
    temp.persist(path).map_err(|e| CatchmentError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CentreId, Crs, NearPair, ObjectId, ScoredProperty};

    fn table() -> ScoredTable {
        ScoredTable {
            headers: vec!["block".to_string(), "town".to_string()],
            field_name: "weighted_market_food_distance".to_string(),
            crs: Crs::svy21(),
            rows: vec![
                ScoredProperty {
                    id: ObjectId(1),
                    position: [29000.0, 38000.0],
                    attributes: vec!["101".to_string(), "ANG MO KIO".to_string()],
                    score: 0.015,
                },
                ScoredProperty {
                    id: ObjectId(2),
                    position: [30000.0, 39000.0],
                    attributes: vec!["".to_string(), "BEDOK".to_string()],
                    score: 0.0,
                },
            ],
        }
    }

    #[test]
    fn test_output_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("a.geojson")).unwrap(), OutputFormat::GeoJson);
        assert_eq!(OutputFormat::from_path(Path::new("a.CSV")).unwrap(), OutputFormat::Csv);
        assert!(OutputFormat::from_path(Path::new("a.gdb")).is_err());
    }

    #[test]
    fn test_near_table_requires_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("near.geojson");

        let err = write_near_table(&[], &path, true).unwrap_err();
        match err {
            CatchmentError::UnsupportedFormat { expected, .. } => assert_eq!(expected, ".csv"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_geojson_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.geojson");
        write_scored_table(&table(), &path, true).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let features = parsed["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0]["properties"]["OBJECTID"], 1);
        assert_eq!(features[0]["properties"]["block"], 101);
        assert_eq!(features[0]["properties"]["town"], "ANG MO KIO");
        assert_eq!(features[0]["properties"]["weighted_market_food_distance"], 0.015);
        assert_eq!(features[1]["properties"]["block"], serde_json::Value::Null);
        assert_eq!(features[1]["geometry"]["coordinates"][0], 30000.0);
        assert_eq!(parsed["crs"]["properties"]["name"], "urn:ogc:def:crs:EPSG::3414");
    }

    #[test]
    fn test_geojson_keeps_row_identity_over_input_column() {
        let mut table = table();
        table.headers[0] = "OBJECTID".to_string();
        table.rows[0].attributes[0] = "999".to_string();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.geojson");
        write_scored_table(&table, &path, true).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["features"][0]["properties"]["OBJECTID"], 1);
        assert_eq!(parsed["features"][1]["properties"]["OBJECTID"], 2);
    }

    #[test]
    fn test_csv_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        write_scored_table(&table(), &path, true).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "block,town,POINT_X,POINT_Y,weighted_market_food_distance");
        assert_eq!(lines[1], "101,ANG MO KIO,29000,38000,0.015");
        assert_eq!(lines[2], ",BEDOK,30000,39000,0");
    }

    #[test]
    fn test_overwrite_disabled_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "existing").unwrap();

        let err = write_scored_table(&table(), &path, false).unwrap_err();
        assert!(matches!(err, CatchmentError::OutputExists { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "existing");

        write_scored_table(&table(), &path, true).unwrap();
        assert_ne!(fs::read_to_string(&path).unwrap(), "existing");
    }

    #[test]
    fn test_failed_write_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let result = persist_atomically(&path, true, |_| {
            Err(CatchmentError::Serialization("boom".to_string()))
        });
        assert!(result.is_err());
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_near_table_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("near.csv");
        let pairs = vec![WeightedPair {
            pair: NearPair {
                property_id: ObjectId(3),
                centre_id: CentreId(9),
                distance: 200.0,
                rank: 1,
            },
            weight: 0.005,
        }];
        write_near_table(&pairs, &path, true).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "IN_FID,NEAR_FID,NEAR_DIST,NEAR_RANK,WEIGHT");
        assert_eq!(lines[1], "3,9,200,1,0.005");
    }
}
