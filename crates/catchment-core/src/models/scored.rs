use serde::{Deserialize, Serialize};

use super::crs::Crs;
use super::property::ObjectId;

/// A property with its final score, positioned in the working CRS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProperty {
    pub id: ObjectId,
    pub position: [f64; 2],
    pub attributes: Vec<String>,
    pub score: f64,
}

/// Enriched property dataset ready to be persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredTable {
    pub headers: Vec<String>,
    pub field_name: String,
    pub crs: Crs,
    pub rows: Vec<ScoredProperty>,
}

impl ScoredTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
