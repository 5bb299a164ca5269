//! Catchment CLI - Command-line interface
//!
//! Scores property points by the inverse distances to nearby centres.

mod cli;
mod commands;
mod config_loader;
mod errors;
mod output;
mod progress;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json = cli.json;
    if let Err(err) = commands::execute(cli) {
        errors::CliError::from_anyhow(&err).display(json);
        std::process::exit(1);
    }
}

/// RUST_LOG wins; otherwise --verbose shows phase messages
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}
