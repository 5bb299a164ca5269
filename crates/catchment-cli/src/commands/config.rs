use crate::cli::ConfigArgs;
use crate::config_loader::{config_file, load_config};
use crate::output::OutputWriter;
use anyhow::Result;
use catchment_core::config::ConfigSource;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tabled::Tabled;

#[derive(Tabled)]
struct ConfigRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Source")]
    source: String,
}

#[derive(Serialize)]
struct ConfigEntry {
    value: String,
    source: ConfigSource,
}

pub fn execute(args: ConfigArgs, output: &OutputWriter, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path, args.scoring.overrides())?;
    let entries = config.to_inspection_map();

    if let Err(err) = config.settings() {
        output.warning(format!("Resolved configuration is not usable: {}", err));
    }

    if output.is_json() {
        let data: BTreeMap<String, ConfigEntry> = entries
            .into_iter()
            .map(|(key, (value, source))| (key, ConfigEntry { value, source }))
            .collect();
        return output.result(&data);
    }

    match config_file(config_path) {
        Some(path) => output.info(format!("Configuration file: {}", path.display())),
        None => output.info("No configuration file; using defaults and environment"),
    }

    let rows: Vec<ConfigRow> = entries
        .into_iter()
        .map(|(key, (value, source))| ConfigRow {
            key,
            value,
            source: source.to_string(),
        })
        .collect();
    output.table(rows);
    Ok(())
}
