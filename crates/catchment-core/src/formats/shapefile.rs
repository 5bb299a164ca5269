//! Shapefile point reader
//!
//! Shapefiles consist of multiple component files (.shp, .shx, .dbf, .prj).
//! The first three must be present; the .prj only informs the CRS.

use shapefile::dbase::FieldValue;
use shapefile::{Reader, Shape};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CatchmentError, Result};
use crate::formats::{dataset_name, verify_file_exists, FeatureReader};
use crate::models::{CentreDataset, CentreId, CentrePoint, Crs};

/// Shapefile format reader
pub struct ShapefileReader;

impl FeatureReader for ShapefileReader {
    fn read(&self, path: &Path) -> Result<CentreDataset> {
        verify_file_exists(path)?;
        verify_components(path)?;

        let crs = extract_crs(path)?;

        let mut reader = Reader::from_path(path).map_err(|e| format_error(format!(
            "Failed to open Shapefile: {}",
            e
        )))?;

        let mut centres = Vec::new();
        for result in reader.iter_shapes_and_records() {
            let (shape, record) =
                result.map_err(|e| format_error(format!("Failed to read feature: {}", e)))?;
            let number = centres.len() + 1;
            let position = shape_position(&shape, number)?;

            let attributes: BTreeMap<String, serde_json::Value> = record
                .into_iter()
                .map(|(name, value)| (name, convert_dbase_value(&value)))
                .collect();

            centres.push(CentrePoint {
                id: CentreId(number as u64),
                position,
                attributes,
            });
        }

        tracing::debug!("Read {} centres from {} ({})", centres.len(), path.display(), crs);

        Ok(CentreDataset {
            name: dataset_name(path),
            format: "Shapefile".to_string(),
            crs,
            centres,
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["shp"]
    }

    fn format_name(&self) -> &str {
        "Shapefile"
    }
}

fn format_error(message: String) -> CatchmentError {
    CatchmentError::FormatError {
        format: "Shapefile".to_string(),
        message,
    }
}

/// Verify that all required Shapefile component files exist
fn verify_components(path: &Path) -> Result<()> {
    let missing: Vec<String> = ["shx", "dbf"]
        .iter()
        .filter(|ext| !component_path(path, ext).exists())
        .map(|ext| format!(".{}", ext))
        .collect();

    if !missing.is_empty() {
        return Err(format_error(format!(
            "Missing required component files: {}",
            missing.join(", ")
        )));
    }
    Ok(())
}

fn component_path(path: &Path, ext: &str) -> PathBuf {
    path.with_extension(ext)
}

/// CRS from the .prj file, defaulting to WGS 84 when absent or unrecognised
fn extract_crs(path: &Path) -> Result<Crs> {
    let prj_path = component_path(path, "prj");
    if !prj_path.exists() {
        tracing::warn!("{} has no .prj file; assuming EPSG:4326", path.display());
        return Ok(Crs::wgs84());
    }

    let wkt = fs::read_to_string(&prj_path)?;
    match epsg_from_wkt(&wkt) {
        Some(epsg) => Ok(Crs::from_epsg(epsg)),
        None => {
            tracing::warn!(
                "Could not identify the CRS in {}; assuming EPSG:4326",
                prj_path.display()
            );
            Ok(Crs::wgs84())
        }
    }
}

/// Identify an EPSG code in OGC or ESRI flavoured WKT
pub(crate) fn epsg_from_wkt(wkt: &str) -> Option<u32> {
    // The outermost AUTHORITY closes the root element, so take the last one
    if let Some(start) = wkt.rfind("AUTHORITY[\"EPSG\",") {
        let digits: String = wkt[start + 17..]
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if let Ok(code) = digits.parse() {
            return Some(code);
        }
    }

    // ESRI .prj files carry names only
    let compact = wkt.to_ascii_uppercase();
    if compact.starts_with("PROJCS") {
        if compact.contains("SVY21") {
            return Some(3414);
        }
        if compact.contains("WGS_1984_WEB_MERCATOR") {
            return Some(3857);
        }
        return None;
    }
    if compact.starts_with("GEOGCS") && compact.contains("WGS_1984") {
        return Some(4326);
    }
    None
}

fn shape_position(shape: &Shape, number: usize) -> Result<[f64; 2]> {
    let position = match shape {
        Shape::Point(p) => [p.x, p.y],
        Shape::PointM(p) => [p.x, p.y],
        Shape::PointZ(p) => [p.x, p.y],
        Shape::Multipoint(mp) if mp.points().len() == 1 => [mp.points()[0].x, mp.points()[0].y],
        Shape::MultipointM(mp) if mp.points().len() == 1 => [mp.points()[0].x, mp.points()[0].y],
        Shape::MultipointZ(mp) if mp.points().len() == 1 => [mp.points()[0].x, mp.points()[0].y],
        other => {
            return Err(CatchmentError::UnsupportedGeometry {
                feature: number,
                geometry_type: format!("{:?}", other.shapetype()),
            })
        }
    };

    if !position.iter().all(|c| c.is_finite()) {
        return Err(format_error(format!(
            "Feature {} has a non-finite point position",
            number
        )));
    }
    Ok(position)
}

fn convert_dbase_value(value: &FieldValue) -> serde_json::Value {
    match value {
        FieldValue::Character(Some(s)) => serde_json::Value::String(s.trim().to_string()),
        FieldValue::Numeric(Some(n)) => number(*n),
        FieldValue::Float(Some(f)) => number(*f as f64),
        FieldValue::Double(d) => number(*d),
        FieldValue::Integer(i) => serde_json::Value::Number((*i).into()),
        FieldValue::Currency(c) => number(*c),
        FieldValue::Date(Some(date)) => serde_json::Value::String(format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            date.month(),
            date.day()
        )),
        FieldValue::Logical(Some(b)) => serde_json::Value::Bool(*b),
        FieldValue::Memo(s) => serde_json::Value::String(s.clone()),
        FieldValue::Character(None)
        | FieldValue::Numeric(None)
        | FieldValue::Float(None)
        | FieldValue::Logical(None)
        | FieldValue::Date(None) => serde_json::Value::Null,
        other => serde_json::Value::String(format!("{:?}", other)),
    }
}

fn number(value: f64) -> serde_json::Value {
    serde_json::Number::from_f64(value)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epsg_from_ogc_wkt_uses_root_authority() {
        let wkt = r#"PROJCS["SVY21 / Singapore TM",GEOGCS["SVY21",AUTHORITY["EPSG","4757"]],PROJECTION["Transverse_Mercator"],AUTHORITY["EPSG","3414"]]"#;
        assert_eq!(epsg_from_wkt(wkt), Some(3414));
    }

    #[test]
    fn test_epsg_from_esri_wkt() {
        let geographic = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;
        assert_eq!(epsg_from_wkt(geographic), Some(4326));

        let svy21 = r#"PROJCS["SVY21_Singapore_TM",GEOGCS["GCS_SVY21",DATUM["D_SVY21",SPHEROID["WGS_1984",6378137.0,298.257223563]]],PROJECTION["Transverse_Mercator"]]"#;
        assert_eq!(epsg_from_wkt(svy21), Some(3414));
    }

    #[test]
    fn test_unknown_projection_is_unidentified() {
        let wkt = r#"PROJCS["Local_Grid",GEOGCS["GCS_WGS_1984"],PROJECTION["Transverse_Mercator"]]"#;
        assert_eq!(epsg_from_wkt(wkt), None);
    }

    #[test]
    fn test_missing_components_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let shp = dir.path().join("centres.shp");
        fs::write(&shp, b"").unwrap();
        fs::write(dir.path().join("centres.dbf"), b"").unwrap();

        let err = ShapefileReader.read(&shp).unwrap_err();
        match err {
            CatchmentError::FormatError { message, .. } => {
                assert!(message.contains(".shx"));
                assert!(!message.contains(".dbf"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    fn write_centres(dir: &Path, points: &[(f64, f64, &str)]) -> PathBuf {
        let path = dir.join("centres.shp");
        let table = shapefile::dbase::TableWriterBuilder::new()
            .add_character_field("NAME".try_into().unwrap(), 50);
        let mut writer = shapefile::Writer::from_path(&path, table).unwrap();
        for (x, y, name) in points {
            let mut record = shapefile::dbase::Record::default();
            record.insert("NAME".to_string(), FieldValue::Character(Some(name.to_string())));
            writer
                .write_shape_and_record(&shapefile::Point::new(*x, *y), &record)
                .unwrap();
        }
        drop(writer);
        path
    }

    #[test]
    fn test_read_point_shapefile() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_centres(
            dir.path(),
            &[(30100.0, 40000.0, "Tekka Centre"), (30000.0, 39800.0, "Maxwell")],
        );
        fs::write(
            path.with_extension("prj"),
            r#"PROJCS["SVY21 / Singapore TM",GEOGCS["SVY21",AUTHORITY["EPSG","4757"]],PROJECTION["Transverse_Mercator"],AUTHORITY["EPSG","3414"]]"#,
        )
        .unwrap();

        let dataset = ShapefileReader.read(&path).unwrap();

        assert_eq!(dataset.name, "centres");
        assert_eq!(dataset.crs, Crs::svy21());
        assert_eq!(dataset.centres.len(), 2);
        assert_eq!(dataset.centres[0].id, CentreId(1));
        assert_eq!(dataset.centres[0].position, [30100.0, 40000.0]);
        assert_eq!(dataset.centres[1].id, CentreId(2));
        assert_eq!(dataset.centres[1].position, [30000.0, 39800.0]);
        assert_eq!(
            dataset.centres[0].attributes.get("NAME"),
            Some(&serde_json::Value::String("Tekka Centre".to_string()))
        );
    }

    #[test]
    fn test_missing_prj_defaults_to_wgs84() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_centres(dir.path(), &[(103.85, 1.30, "A")]);

        let dataset = ShapefileReader.read(&path).unwrap();
        assert_eq!(dataset.crs, Crs::wgs84());
        assert_eq!(dataset.centres[0].position, [103.85, 1.30]);
    }

    #[test]
    fn test_non_finite_point_is_rejected() {
        let nan = Shape::Point(shapefile::Point::new(f64::NAN, 40000.0));
        assert!(matches!(
            shape_position(&nan, 2),
            Err(CatchmentError::FormatError { .. })
        ));

        let dir = tempfile::tempdir().unwrap();
        let path = write_centres(dir.path(), &[(f64::NAN, 40000.0, "A"), (1.0, 2.0, "B")]);
        assert!(ShapefileReader.read(&path).is_err());
    }

    #[test]
    fn test_point_shapes() {
        let point = Shape::Point(shapefile::Point::new(1.5, 2.5));
        assert_eq!(shape_position(&point, 1).unwrap(), [1.5, 2.5]);

        let line = Shape::Polyline(shapefile::Polyline::new(vec![
            shapefile::Point::new(0.0, 0.0),
            shapefile::Point::new(1.0, 1.0),
        ]));
        assert!(matches!(
            shape_position(&line, 4),
            Err(CatchmentError::UnsupportedGeometry { feature: 4, .. })
        ));
    }
}
