use catchment_core::config::{parse_epsg, CliConfigOverrides};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Catchment - distance-weighted accessibility scoring
#[derive(Parser, Debug)]
#[command(name = "catchment")]
#[command(
    about = "Score property points by the summed inverse distance to nearby centres",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Print a message for each pipeline phase
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Compute and report without writing any output
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Configuration file (defaults to ./catchment.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score every property and write the enriched dataset
    Run(RunArgs),

    /// Write the weighted near table as CSV
    Near(NearArgs),

    /// Show the resolved configuration and where each value came from
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Property table (CSV with longitude/latitude columns)
    pub properties: PathBuf,

    /// Centre points (Shapefile or GeoJSON)
    pub centres: PathBuf,

    /// Output location
    #[arg(long, short = 'o')]
    pub output: PathBuf,
}

#[derive(Args, Debug, Default)]
pub struct ScoringArgs {
    /// Catchment radius in target CRS units [default: 400]
    #[arg(long, short = 'r')]
    pub search_radius: Option<f64>,

    /// Keep only the N closest centres per property (0 keeps all)
    #[arg(long)]
    pub closest_count: Option<usize>,

    /// CRS of the property coordinates, e.g. 4326 or EPSG:4326
    #[arg(long, value_parser = parse_epsg)]
    pub source_crs: Option<u32>,

    /// Planar CRS distances are measured in, e.g. 3414
    #[arg(long, value_parser = parse_epsg)]
    pub target_crs: Option<u32>,

    /// Name of the score column
    #[arg(long)]
    pub field: Option<String>,

    /// Longitude column of the property table
    #[arg(long)]
    pub lon_field: Option<String>,

    /// Latitude column of the property table
    #[arg(long)]
    pub lat_field: Option<String>,

    /// Fail instead of replacing an existing output
    #[arg(long)]
    pub no_overwrite: bool,
}

impl ScoringArgs {
    pub fn overrides(&self) -> CliConfigOverrides {
        CliConfigOverrides {
            search_radius: self.search_radius,
            closest_count: self.closest_count,
            source_crs: self.source_crs,
            target_crs: self.target_crs,
            field_name: self.field.clone(),
            longitude_field: self.lon_field.clone(),
            latitude_field: self.lat_field.clone(),
            overwrite: self.no_overwrite.then_some(false),
        }
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    #[command(flatten)]
    pub scoring: ScoringArgs,
}

#[derive(Args, Debug)]
pub struct NearArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    #[command(flatten)]
    pub scoring: ScoringArgs,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub scoring: ScoringArgs,
}
