use serde::{Deserialize, Serialize};

/// Row identity of a property, 1-based in input order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the property table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    /// Row identity
    pub id: ObjectId,

    /// Longitude in the source CRS
    pub longitude: f64,

    /// Latitude in the source CRS
    pub latitude: f64,

    /// Raw cell values, aligned with [`PropertyTable::headers`]
    pub attributes: Vec<String>,
}

/// Tabular property dataset loaded from a delimited file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyTable {
    /// Dataset name (file stem)
    pub name: String,

    /// Column names in file order
    pub headers: Vec<String>,

    /// Rows in file order
    pub records: Vec<PropertyRecord>,
}

impl PropertyTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of a column in the header row
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}
