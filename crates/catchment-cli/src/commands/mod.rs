//! Command implementations

mod config;
mod near;
mod run;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;
use catchment_pipeline::RunReport;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Run(args) => run::execute(args, &output, config_path, cli.dry_run),
        Commands::Near(args) => near::execute(args, &output, config_path, cli.dry_run),
        Commands::Config(args) => config::execute(args, &output, config_path),
    }
}

/// Human-readable summary of a scoring run
fn print_report(output: &OutputWriter, report: &RunReport) {
    output.section("Summary");
    output.kv("Properties", report.properties);
    output.kv("Centres", report.centres);
    output.kv("Near pairs", report.near_pairs);
    output.kv(
        "Properties with a centre in range",
        report.matched_properties,
    );
    output.kv("Search radius", report.search_radius);
    output.kv(
        "CRS",
        format!("EPSG:{} -> EPSG:{}", report.source_crs, report.target_crs),
    );
    output.kv("Max score", format!("{:.3}", report.max_score));
    output.kv("Mean score", format!("{:.3}", report.mean_score));
    output.kv("Elapsed", format!("{} ms", report.elapsed_ms));
}
