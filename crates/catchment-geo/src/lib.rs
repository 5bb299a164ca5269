//! Catchment Geo - Reprojection and near-table generation
//!
//! This crate puts property and centre points into one planar frame and
//! finds every centre inside a property's catchment radius.

pub mod index;
pub mod near;
pub mod transform;

pub use index::CentreIndex;
pub use near::{generate_near_table, NearOptions};
pub use transform::{project_centres, project_properties, ProjectedProperty, Reprojector};
