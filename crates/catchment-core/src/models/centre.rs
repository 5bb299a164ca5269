use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::crs::Crs;

/// Identity of a centre point, 1-based in source feature order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CentreId(pub u64);

impl std::fmt::Display for CentreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A market or food centre location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentrePoint {
    pub id: CentreId,

    /// Position in the dataset's CRS (x, y)
    pub position: [f64; 2],

    /// Source attributes, kept for diagnostics only
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl CentrePoint {
    pub fn new(id: u64, x: f64, y: f64) -> Self {
        Self {
            id: CentreId(id),
            position: [x, y],
            attributes: BTreeMap::new(),
        }
    }
}

/// Point dataset of centres as read from disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CentreDataset {
    pub name: String,
    pub format: String,
    pub crs: Crs,
    pub centres: Vec<CentrePoint>,
}
