//! GeoJSON point reader

use geojson::{Feature, GeoJson, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{CatchmentError, Result};
use crate::formats::{dataset_name, epsg_from_name, verify_file_exists, FeatureReader};
use crate::models::{CentreDataset, CentreId, CentrePoint, Crs};

/// GeoJSON format reader
pub struct GeoJsonReader;

impl FeatureReader for GeoJsonReader {
    fn read(&self, path: &Path) -> Result<CentreDataset> {
        verify_file_exists(path)?;
        let content = fs::read_to_string(path)?;
        let mut dataset = self.parse(&content)?;
        dataset.name = dataset_name(path);
        Ok(dataset)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["geojson", "json"]
    }

    fn format_name(&self) -> &str {
        "GeoJSON"
    }
}

impl GeoJsonReader {
    /// Parse GeoJSON text into a centre dataset
    pub fn parse(&self, content: &str) -> Result<CentreDataset> {
        let geojson: GeoJson = content.parse().map_err(|e| CatchmentError::FormatError {
            format: "GeoJSON".to_string(),
            message: format!("Failed to parse GeoJSON: {}", e),
        })?;

        let (features, crs) = match geojson {
            GeoJson::FeatureCollection(fc) => {
                // Legacy `crs` member; RFC 7946 files are always WGS 84
                let crs = fc
                    .foreign_members
                    .as_ref()
                    .and_then(|fm| fm.get("crs"))
                    .and_then(|crs| crs.get("properties"))
                    .and_then(|props| props.get("name"))
                    .and_then(|name| name.as_str())
                    .and_then(epsg_from_name)
                    .unwrap_or(4326);
                (fc.features, crs)
            }
            GeoJson::Feature(feature) => (vec![feature], 4326),
            GeoJson::Geometry(geometry) => (vec![Feature::from(geometry)], 4326),
        };

        let centres = features
            .iter()
            .enumerate()
            .map(|(idx, feature)| convert_feature(feature, idx + 1))
            .collect::<Result<Vec<_>>>()?;

        Ok(CentreDataset {
            name: "unnamed".to_string(),
            format: "GeoJSON".to_string(),
            crs: Crs::from_epsg(crs),
            centres,
        })
    }
}

fn convert_feature(feature: &Feature, number: usize) -> Result<CentrePoint> {
    let value = feature.geometry.as_ref().map(|g| &g.value);
    let position = match value {
        Some(Value::Point(coords)) => point_position(coords, number)?,
        Some(Value::MultiPoint(points)) if points.len() == 1 => point_position(&points[0], number)?,
        other => {
            return Err(CatchmentError::UnsupportedGeometry {
                feature: number,
                geometry_type: other.map(geometry_type_name).unwrap_or("null").to_string(),
            })
        }
    };

    let attributes: BTreeMap<String, serde_json::Value> = feature
        .properties
        .as_ref()
        .map(|props| props.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default();

    Ok(CentrePoint {
        id: CentreId(number as u64),
        position,
        attributes,
    })
}

fn point_position(coords: &[f64], number: usize) -> Result<[f64; 2]> {
    match coords {
        [x, y, ..] if x.is_finite() && y.is_finite() => Ok([*x, *y]),
        _ => Err(CatchmentError::FormatError {
            format: "GeoJSON".to_string(),
            message: format!("Feature {} has an invalid point position", number),
        }),
    }
}

fn geometry_type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_collection_points() {
        let dataset = GeoJsonReader
            .parse(
                r#"{
                "type": "FeatureCollection",
                "features": [
                    {"type": "Feature", "geometry": {"type": "Point", "coordinates": [103.85, 1.30]},
                     "properties": {"NAME": "Maxwell Food Centre"}},
                    {"type": "Feature", "geometry": {"type": "Point", "coordinates": [103.84, 1.28, 12.0]},
                     "properties": null}
                ]
            }"#,
            )
            .unwrap();

        assert_eq!(dataset.crs, Crs::wgs84());
        assert_eq!(dataset.centres.len(), 2);
        assert_eq!(dataset.centres[0].id.0, 1);
        assert_eq!(dataset.centres[1].id.0, 2);
        assert_eq!(dataset.centres[1].position, [103.84, 1.28]);
        assert_eq!(
            dataset.centres[0].attributes["NAME"],
            serde_json::json!("Maxwell Food Centre")
        );
    }

    #[test]
    fn test_legacy_crs_member() {
        let dataset = GeoJsonReader
            .parse(
                r#"{
                "type": "FeatureCollection",
                "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::3414"}},
                "features": [
                    {"type": "Feature", "geometry": {"type": "Point", "coordinates": [29000.0, 38000.0]}, "properties": {}}
                ]
            }"#,
            )
            .unwrap();
        assert_eq!(dataset.crs, Crs::svy21());
    }

    #[test]
    fn test_single_point_multipoint_is_accepted() {
        let dataset = GeoJsonReader
            .parse(r#"{"type": "MultiPoint", "coordinates": [[1.0, 2.0]]}"#)
            .unwrap();
        assert_eq!(dataset.centres[0].position, [1.0, 2.0]);
    }

    #[test]
    fn test_polygon_is_rejected() {
        let err = GeoJsonReader
            .parse(
                r#"{"type": "Feature", "properties": {},
                    "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}}"#,
            )
            .unwrap_err();
        match err {
            CatchmentError::UnsupportedGeometry { feature, geometry_type } => {
                assert_eq!(feature, 1);
                assert_eq!(geometry_type, "Polygon");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_null_geometry_is_rejected() {
        let err = GeoJsonReader
            .parse(r#"{"type": "Feature", "properties": {}, "geometry": null}"#)
            .unwrap_err();
        assert!(matches!(err, CatchmentError::UnsupportedGeometry { .. }));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            GeoJsonReader.parse("{not json"),
            Err(CatchmentError::FormatError { .. })
        ));
    }
}
