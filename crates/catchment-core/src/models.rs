pub mod centre;
pub mod crs;
pub mod near;
pub mod property;
pub mod scored;

pub use centre::{CentreDataset, CentreId, CentrePoint};
pub use crs::Crs;
pub use near::{NearPair, NearTable, WeightSum, WeightedPair};
pub use property::{ObjectId, PropertyRecord, PropertyTable};
pub use scored::{ScoredProperty, ScoredTable};
