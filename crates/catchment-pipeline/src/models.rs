use catchment_core::models::{ScoredTable, WeightedPair};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Steps of a scoring run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Loading,
    Projecting,
    NearTable,
    Weighting,
    Writing,
    Complete,
}

impl PipelinePhase {
    pub fn description(&self) -> &'static str {
        match self {
            PipelinePhase::Loading => "Loading properties and centres",
            PipelinePhase::Projecting => "Projecting points into the working CRS",
            PipelinePhase::NearTable => "Generating near table",
            PipelinePhase::Weighting => "Weighting and aggregating distances",
            PipelinePhase::Writing => "Writing enriched dataset",
            PipelinePhase::Complete => "Complete",
        }
    }
}

/// Summary of a scoring run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub properties: usize,
    pub centres: usize,
    pub near_pairs: usize,
    /// Properties with at least one centre inside the radius
    pub matched_properties: usize,
    pub max_score: f64,
    pub mean_score: f64,
    pub search_radius: f64,
    pub source_crs: u32,
    pub target_crs: u32,
    pub field_name: String,
    pub output: Option<PathBuf>,
    pub elapsed_ms: u64,
}

/// Everything one run computes before anything is persisted
#[derive(Debug, Clone)]
pub struct Computation {
    pub scored: ScoredTable,
    pub near: Vec<WeightedPair>,
    pub report: RunReport,
}
