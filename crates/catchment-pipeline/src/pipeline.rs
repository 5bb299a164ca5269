use catchment_core::config::PipelineSettings;
use catchment_core::error::Result;
use catchment_core::formats::{
    write_near_table, write_scored_table, FeatureRegistry, PropertyCsvReader,
};
use catchment_core::models::{CentreDataset, PropertyTable, ScoredTable, WeightedPair};
use catchment_geo::{
    generate_near_table, project_centres, project_properties, CentreIndex, NearOptions,
    Reprojector,
};
use std::path::Path;
use std::time::Instant;

use crate::models::{Computation, PipelinePhase, RunReport};
use crate::weighting::{calculate_weights, join_weights, summarize};

/// Scoring pipeline: ingest, project, near table, weight, persist
pub struct Pipeline {
    settings: PipelineSettings,
    registry: FeatureRegistry,
}

impl Pipeline {
    /// Create a pipeline after validating its settings
    pub fn new(settings: PipelineSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            registry: FeatureRegistry::with_defaults(),
        })
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Load the property table
    pub fn load_properties(&self, path: &Path) -> Result<PropertyTable> {
        PropertyCsvReader::new(&self.settings.longitude_field, &self.settings.latitude_field)
            .read(path)
    }

    /// Load the centre dataset, picking the reader from the extension
    pub fn load_centres(&self, path: &Path) -> Result<CentreDataset> {
        self.registry.read(path)
    }

    /// Score already-loaded inputs without touching the filesystem
    pub fn compute(&self, properties: &PropertyTable, centres: CentreDataset) -> Result<Computation> {
        self.compute_with_progress(properties, centres, &mut |_| {})
    }

    fn compute_with_progress(
        &self,
        properties: &PropertyTable,
        centres: CentreDataset,
        on_phase: &mut dyn FnMut(PipelinePhase),
    ) -> Result<Computation> {
        let started = Instant::now();
        let target = &self.settings.target_crs;

        on_phase(PipelinePhase::Projecting);
        let property_transform = Reprojector::new(&self.settings.source_crs, target)?;
        let projected = project_properties(properties, &property_transform)?;
        let centre_transform = Reprojector::new(&centres.crs, target)?;
        let centre_points = project_centres(centres, &centre_transform)?;
        tracing::debug!(
            "Projected {} properties and {} centres into {}",
            projected.len(),
            centre_points.len(),
            target
        );

        on_phase(PipelinePhase::NearTable);
        let index = CentreIndex::build(&centre_points);
        let options = NearOptions {
            search_radius: self.settings.search_radius,
            closest_count: self.settings.closest_count,
        };
        let near = generate_near_table(&projected, &index, &options)?;

        on_phase(PipelinePhase::Weighting);
        let weighted = calculate_weights(&near)?;
        let sums = summarize(&weighted);
        let scored = join_weights(properties, &projected, &sums, &self.settings.field_name, target)?;

        let report = self.report(&scored, index.len(), &weighted, sums.len(), started);
        Ok(Computation {
            scored,
            near: weighted,
            report,
        })
    }

    /// Load both inputs and score them, reporting each phase
    pub fn evaluate(
        &self,
        properties_path: &Path,
        centres_path: &Path,
        on_phase: &mut dyn FnMut(PipelinePhase),
    ) -> Result<Computation> {
        on_phase(PipelinePhase::Loading);
        let properties = self.load_properties(properties_path)?;
        let centres = self.load_centres(centres_path)?;
        tracing::info!(
            "Loaded {} properties from {} and {} centres from {}",
            properties.len(),
            properties_path.display(),
            centres.centres.len(),
            centres_path.display()
        );

        self.compute_with_progress(&properties, centres, on_phase)
    }

    /// Persist the scored table of a computation
    pub fn write(&self, computation: &mut Computation, output_path: &Path) -> Result<()> {
        write_scored_table(&computation.scored, output_path, self.settings.overwrite)?;
        computation.report.output = Some(output_path.to_path_buf());
        Ok(())
    }

    /// Persist the weighted near table of a computation as CSV
    pub fn write_near(&self, near: &[WeightedPair], output_path: &Path) -> Result<()> {
        write_near_table(near, output_path, self.settings.overwrite)
    }

    /// Full run: evaluate then write the enriched dataset
    pub fn run(
        &self,
        properties_path: &Path,
        centres_path: &Path,
        output_path: &Path,
    ) -> Result<RunReport> {
        self.run_with_progress(properties_path, centres_path, output_path, &mut |_| {})
    }

    pub fn run_with_progress(
        &self,
        properties_path: &Path,
        centres_path: &Path,
        output_path: &Path,
        on_phase: &mut dyn FnMut(PipelinePhase),
    ) -> Result<RunReport> {
        let started = Instant::now();
        let mut computation = self.evaluate(properties_path, centres_path, on_phase)?;

        on_phase(PipelinePhase::Writing);
        self.write(&mut computation, output_path)?;

        on_phase(PipelinePhase::Complete);
        let mut report = computation.report;
        report.elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            "Scored {} properties ({} with a centre within {}) in {} ms",
            report.properties,
            report.matched_properties,
            report.search_radius,
            report.elapsed_ms
        );
        Ok(report)
    }

    fn report(
        &self,
        scored: &ScoredTable,
        centres: usize,
        weighted: &[WeightedPair],
        matched: usize,
        started: Instant,
    ) -> RunReport {
        let max_score = scored.rows.iter().map(|r| r.score).fold(0.0, f64::max);
        let mean_score = if scored.is_empty() {
            0.0
        } else {
            scored.rows.iter().map(|r| r.score).sum::<f64>() / scored.len() as f64
        };

        RunReport {
            properties: scored.len(),
            centres,
            near_pairs: weighted.len(),
            matched_properties: matched,
            max_score,
            mean_score,
            search_radius: self.settings.search_radius,
            source_crs: self.settings.source_crs.epsg,
            target_crs: self.settings.target_crs.epsg,
            field_name: self.settings.field_name.clone(),
            output: None,
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }
}
