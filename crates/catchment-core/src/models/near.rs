//! Transient tables produced while scoring a run.

use serde::{Deserialize, Serialize};

use super::centre::CentreId;
use super::property::ObjectId;

/// One property/centre match inside the search radius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearPair {
    pub property_id: ObjectId,
    pub centre_id: CentreId,

    /// Planar distance in working CRS units
    pub distance: f64,

    /// 1 for the closest centre of this property
    pub rank: u32,
}

/// Flat near table, ordered by property then rank
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NearTable {
    pub pairs: Vec<NearPair>,
}

impl NearTable {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NearPair> {
        self.pairs.iter()
    }
}

/// Summed inverse-distance weight for one property
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightSum {
    pub property_id: ObjectId,
    pub total: f64,
    pub count: usize,
}

/// A near pair with its inverse-distance weight attached
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedPair {
    pub pair: NearPair,
    pub weight: f64,
}
