use crate::cli::NearArgs;
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::progress::PhaseProgress;
use anyhow::{Context, Result};
use catchment_core::formats::OutputFormat;
use catchment_pipeline::{Pipeline, PipelinePhase};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct NearSummary {
    pairs: usize,
    properties: usize,
    matched_properties: usize,
    search_radius: f64,
    output: Option<PathBuf>,
}

pub fn execute(
    args: NearArgs,
    output: &OutputWriter,
    config_path: Option<&Path>,
    dry_run: bool,
) -> Result<()> {
    let config = load_config(config_path, args.scoring.overrides())?;
    let pipeline = Pipeline::new(config.settings()?)?;
    let destination = &args.inputs.output;

    // Reject a non-CSV destination before doing any work
    OutputFormat::require_csv(destination)?;

    let progress = PhaseProgress::new(!output.is_json());
    let evaluated = pipeline.evaluate(&args.inputs.properties, &args.inputs.centres, &mut |phase| {
        progress.update(phase)
    });
    let computation = match evaluated {
        Ok(computation) => computation,
        Err(err) => {
            progress.fail("Near table failed");
            return Err(err).context("Failed to build the near table");
        }
    };

    let mut summary = NearSummary {
        pairs: computation.near.len(),
        properties: computation.report.properties,
        matched_properties: computation.report.matched_properties,
        search_radius: computation.report.search_radius,
        output: None,
    };

    if dry_run {
        progress.succeed("Near table built (dry run)");
        output.info(format!("Dry run: {} was not written", destination.display()));
    } else {
        progress.update(PipelinePhase::Writing);
        if let Err(err) = pipeline.write_near(&computation.near, destination) {
            progress.fail("Write failed");
            return Err(err).context(format!("Failed to write {}", destination.display()));
        }
        progress.succeed("Near table written");
        summary.output = Some(destination.clone());
    }

    if output.is_json() {
        return output.result(&summary);
    }

    if let Some(path) = &summary.output {
        output.success(format!("Wrote {} near pairs to {}", summary.pairs, path.display()));
    }
    output.kv("Near pairs", summary.pairs);
    output.kv(
        "Properties with a centre in range",
        format!("{} of {}", summary.matched_properties, summary.properties),
    );
    output.kv("Search radius", summary.search_radius);
    Ok(())
}
