use crate::cli::RunArgs;
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::progress::PhaseProgress;
use anyhow::{Context, Result};
use catchment_core::formats::OutputFormat;
use catchment_pipeline::{Pipeline, PipelinePhase};
use std::path::Path;
use std::time::Instant;

pub fn execute(
    args: RunArgs,
    output: &OutputWriter,
    config_path: Option<&Path>,
    dry_run: bool,
) -> Result<()> {
    let started = Instant::now();
    let config = load_config(config_path, args.scoring.overrides())?;
    let pipeline = Pipeline::new(config.settings()?)?;
    let destination = &args.inputs.output;

    // Reject an unknown output extension before doing any work
    OutputFormat::from_path(destination)?;

    let progress = PhaseProgress::new(!output.is_json());
    let evaluated = pipeline.evaluate(&args.inputs.properties, &args.inputs.centres, &mut |phase| {
        progress.update(phase)
    });
    let mut computation = match evaluated {
        Ok(computation) => computation,
        Err(err) => {
            progress.fail("Scoring failed");
            return Err(err).context("Failed to score properties");
        }
    };

    if dry_run {
        progress.succeed("Scored (dry run)");
        computation.report.elapsed_ms = started.elapsed().as_millis() as u64;
        output.info(format!("Dry run: {} was not written", destination.display()));
        if output.is_json() {
            return output.result(&computation.report);
        }
        super::print_report(output, &computation.report);
        return Ok(());
    }

    progress.update(PipelinePhase::Writing);
    if let Err(err) = pipeline.write(&mut computation, destination) {
        progress.fail("Write failed");
        return Err(err).context(format!("Failed to write {}", destination.display()));
    }
    progress.update(PipelinePhase::Complete);
    progress.succeed("Scoring complete");

    let mut report = computation.report;
    report.elapsed_ms = started.elapsed().as_millis() as u64;

    if output.is_json() {
        return output.result(&report);
    }

    output.success(format!(
        "Wrote '{}' for {} properties to {}",
        report.field_name,
        report.properties,
        destination.display()
    ));
    super::print_report(output, &report);
    Ok(())
}
