//! CRS transformation into the working planar frame

use catchment_core::error::{CatchmentError, Result};
use catchment_core::models::{CentreDataset, CentrePoint, Crs, ObjectId, PropertyTable};
use proj::Proj;

/// A property positioned in the working CRS
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedProperty {
    pub id: ObjectId,
    pub position: [f64; 2],
}

/// Point transform between two CRS; identity when they match
pub struct Reprojector {
    from: Crs,
    to: Crs,
    proj: Option<Proj>,
}

impl Reprojector {
    /// Create a transform from `from` to `to`
    pub fn new(from: &Crs, to: &Crs) -> Result<Self> {
        if from.matches(to) {
            return Ok(Self::identity(to));
        }

        let proj = Proj::new_known_crs(&from.authority(), &to.authority(), None).map_err(|e| {
            CatchmentError::ProjectionFailed {
                from: from.epsg,
                to: to.epsg,
                reason: format!("Failed to create projection: {}", e),
            }
        })?;

        Ok(Self {
            from: from.clone(),
            to: to.clone(),
            proj: Some(proj),
        })
    }

    /// Transform that leaves coordinates untouched
    pub fn identity(crs: &Crs) -> Self {
        Self {
            from: crs.clone(),
            to: crs.clone(),
            proj: None,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.proj.is_none()
    }

    pub fn source(&self) -> &Crs {
        &self.from
    }

    pub fn target(&self) -> &Crs {
        &self.to
    }

    /// Project one position given as (x, y), i.e. (longitude, latitude)
    /// for geographic frames
    pub fn project(&self, x: f64, y: f64) -> Result<[f64; 2]> {
        let Some(proj) = &self.proj else {
            return Ok([x, y]);
        };

        let (px, py) = proj.convert((x, y)).map_err(|e| self.failure(e.to_string()))?;
        if !px.is_finite() || !py.is_finite() {
            return Err(self.failure(format!("({}, {}) has no finite image", x, y)));
        }
        Ok([px, py])
    }

    fn failure(&self, reason: String) -> CatchmentError {
        CatchmentError::ProjectionFailed {
            from: self.from.epsg,
            to: self.to.epsg,
            reason,
        }
    }
}

/// Build one projected point per property row, identity preserved
pub fn project_properties(
    table: &PropertyTable,
    reprojector: &Reprojector,
) -> Result<Vec<ProjectedProperty>> {
    table
        .records
        .iter()
        .map(|record| {
            let position = reprojector.project(record.longitude, record.latitude)?;
            Ok(ProjectedProperty { id: record.id, position })
        })
        .collect()
}

/// Move every centre of `dataset` into the reprojector's target frame
pub fn project_centres(
    dataset: CentreDataset,
    reprojector: &Reprojector,
) -> Result<Vec<CentrePoint>> {
    if !dataset.crs.matches(reprojector.source()) {
        return Err(CatchmentError::ProjectionFailed {
            from: dataset.crs.epsg,
            to: reprojector.target().epsg,
            reason: format!(
                "dataset is in {} but the transform starts from {}",
                dataset.crs,
                reprojector.source()
            ),
        });
    }

    dataset
        .centres
        .into_iter()
        .map(|mut centre| {
            centre.position = reprojector.project(centre.position[0], centre.position[1])?;
            Ok(centre)
        })
        .collect()
}
