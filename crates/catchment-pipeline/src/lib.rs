//! Catchment Pipeline - Inverse-distance weighting and run orchestration
//!
//! Ties ingestion, reprojection, the near table and the weighting steps into
//! a single synchronous run that produces one score per property.

pub mod models;
pub mod pipeline;
pub mod weighting;

pub use models::{Computation, PipelinePhase, RunReport};
pub use pipeline::Pipeline;
pub use weighting::{calculate_weights, inverse_distance, join_weights, round_to, summarize};
