use crate::error::{CatchmentError, Result};
use crate::models::Crs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

/// Default catchment radius in working CRS units (metres for SVY21)
pub const DEFAULT_SEARCH_RADIUS: f64 = 400.0;

/// Default name of the derived score column
pub const DEFAULT_FIELD_NAME: &str = "weighted_market_food_distance";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ConfigSource::Default => "default",
            ConfigSource::File => "file",
            ConfigSource::Environment => "env",
            ConfigSource::Cli => "cli",
        };
        f.write_str(label)
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has at least the same precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() >= self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Validated settings consumed by the scoring pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSettings {
    pub search_radius: f64,
    /// Keep only the N closest centres per property; 0 keeps all
    pub closest_count: usize,
    pub source_crs: Crs,
    pub target_crs: Crs,
    pub field_name: String,
    pub longitude_field: String,
    pub latitude_field: String,
    pub overwrite: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            search_radius: DEFAULT_SEARCH_RADIUS,
            closest_count: 0,
            source_crs: Crs::wgs84(),
            target_crs: Crs::svy21(),
            field_name: DEFAULT_FIELD_NAME.to_string(),
            longitude_field: "longitude".to_string(),
            latitude_field: "latitude".to_string(),
            overwrite: true,
        }
    }
}

impl PipelineSettings {
    /// Check the invariants the pipeline relies on
    pub fn validate(&self) -> Result<()> {
        validate_radius(self.search_radius)?;
        for (key, value) in [
            ("field_name", &self.field_name),
            ("longitude_field", &self.longitude_field),
            ("latitude_field", &self.latitude_field),
        ] {
            if value.trim().is_empty() {
                return Err(CatchmentError::ConfigInvalid {
                    key: key.to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }
        if self.longitude_field == self.latitude_field {
            return Err(CatchmentError::ConfigInvalid {
                key: "latitude_field".to_string(),
                reason: "longitude and latitude must be different columns".to_string(),
            });
        }
        Ok(())
    }
}

/// Reject radii that cannot bound a search
pub fn validate_radius(radius: f64) -> Result<()> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(CatchmentError::InvalidRadius { radius });
    }
    Ok(())
}

/// Layered configuration for catchment runs
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub search_radius: ConfigValue<f64>,
    pub closest_count: ConfigValue<usize>,
    pub source_crs: ConfigValue<u32>,
    pub target_crs: ConfigValue<u32>,
    pub field_name: ConfigValue<String>,
    pub longitude_field: ConfigValue<String>,
    pub latitude_field: ConfigValue<String>,
    pub overwrite: ConfigValue<bool>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        let defaults = PipelineSettings::default();
        Self {
            search_radius: ConfigValue::new(defaults.search_radius, ConfigSource::Default),
            closest_count: ConfigValue::new(defaults.closest_count, ConfigSource::Default),
            source_crs: ConfigValue::new(defaults.source_crs.epsg, ConfigSource::Default),
            target_crs: ConfigValue::new(defaults.target_crs.epsg, ConfigSource::Default),
            field_name: ConfigValue::new(defaults.field_name, ConfigSource::Default),
            longitude_field: ConfigValue::new(defaults.longitude_field, ConfigSource::Default),
            latitude_field: ConfigValue::new(defaults.latitude_field, ConfigSource::Default),
            overwrite: ConfigValue::new(defaults.overwrite, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| CatchmentError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| CatchmentError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(radius) = file_config.search_radius {
            self.search_radius.update(radius, ConfigSource::File);
        }
        if let Some(count) = file_config.closest_count {
            self.closest_count.update(count, ConfigSource::File);
        }
        if let Some(crs) = file_config.source_crs {
            self.source_crs.update(crs, ConfigSource::File);
        }
        if let Some(crs) = file_config.target_crs {
            self.target_crs.update(crs, ConfigSource::File);
        }
        if let Some(name) = file_config.field_name {
            self.field_name.update(name, ConfigSource::File);
        }
        if let Some(name) = file_config.longitude_field {
            self.longitude_field.update(name, ConfigSource::File);
        }
        if let Some(name) = file_config.latitude_field {
            self.latitude_field.update(name, ConfigSource::File);
        }
        if let Some(overwrite) = file_config.overwrite {
            self.overwrite.update(overwrite, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // CATCHMENT_SEARCH_RADIUS
        if let Ok(raw) = env::var("CATCHMENT_SEARCH_RADIUS") {
            match raw.parse::<f64>() {
                Ok(radius) => self.search_radius.update(radius, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid CATCHMENT_SEARCH_RADIUS value '{}': expected a number",
                    raw
                ),
            }
        }

        // CATCHMENT_CLOSEST_COUNT
        if let Ok(raw) = env::var("CATCHMENT_CLOSEST_COUNT") {
            match raw.parse::<usize>() {
                Ok(count) => self.closest_count.update(count, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid CATCHMENT_CLOSEST_COUNT value '{}': expected a non-negative integer",
                    raw
                ),
            }
        }

        // CATCHMENT_SOURCE_CRS / CATCHMENT_TARGET_CRS
        if let Ok(raw) = env::var("CATCHMENT_SOURCE_CRS") {
            match parse_epsg(&raw) {
                Ok(crs) => self.source_crs.update(crs, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid CATCHMENT_SOURCE_CRS value '{}': expected an EPSG code",
                    raw
                ),
            }
        }
        if let Ok(raw) = env::var("CATCHMENT_TARGET_CRS") {
            match parse_epsg(&raw) {
                Ok(crs) => self.target_crs.update(crs, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid CATCHMENT_TARGET_CRS value '{}': expected an EPSG code",
                    raw
                ),
            }
        }

        if let Ok(name) = env::var("CATCHMENT_FIELD_NAME") {
            self.field_name.update(name, ConfigSource::Environment);
        }
        if let Ok(name) = env::var("CATCHMENT_LONGITUDE_FIELD") {
            self.longitude_field.update(name, ConfigSource::Environment);
        }
        if let Ok(name) = env::var("CATCHMENT_LATITUDE_FIELD") {
            self.latitude_field.update(name, ConfigSource::Environment);
        }

        // CATCHMENT_OVERWRITE
        if let Ok(raw) = env::var("CATCHMENT_OVERWRITE") {
            match parse_bool(&raw) {
                Ok(overwrite) => self.overwrite.update(overwrite, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid CATCHMENT_OVERWRITE value '{}': expected true or false",
                    raw
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(radius) = overrides.search_radius {
            self.search_radius.update(radius, ConfigSource::Cli);
        }
        if let Some(count) = overrides.closest_count {
            self.closest_count.update(count, ConfigSource::Cli);
        }
        if let Some(crs) = overrides.source_crs {
            self.source_crs.update(crs, ConfigSource::Cli);
        }
        if let Some(crs) = overrides.target_crs {
            self.target_crs.update(crs, ConfigSource::Cli);
        }
        if let Some(name) = overrides.field_name {
            self.field_name.update(name, ConfigSource::Cli);
        }
        if let Some(name) = overrides.longitude_field {
            self.longitude_field.update(name, ConfigSource::Cli);
        }
        if let Some(name) = overrides.latitude_field {
            self.latitude_field.update(name, ConfigSource::Cli);
        }
        if let Some(overwrite) = overrides.overwrite {
            self.overwrite.update(overwrite, ConfigSource::Cli);
        }
    }

    /// Resolve into validated pipeline settings
    pub fn settings(&self) -> Result<PipelineSettings> {
        let settings = PipelineSettings {
            search_radius: self.search_radius.value,
            closest_count: self.closest_count.value,
            source_crs: Crs::from_epsg(self.source_crs.value),
            target_crs: Crs::from_epsg(self.target_crs.value),
            field_name: self.field_name.value.clone(),
            longitude_field: self.longitude_field.value.clone(),
            latitude_field: self.latitude_field.value.clone(),
            overwrite: self.overwrite.value,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> BTreeMap<String, (String, ConfigSource)> {
        let mut map = BTreeMap::new();

        map.insert(
            "search_radius".to_string(),
            (self.search_radius.value.to_string(), self.search_radius.source),
        );
        map.insert(
            "closest_count".to_string(),
            (self.closest_count.value.to_string(), self.closest_count.source),
        );
        map.insert(
            "source_crs".to_string(),
            (format!("EPSG:{}", self.source_crs.value), self.source_crs.source),
        );
        map.insert(
            "target_crs".to_string(),
            (format!("EPSG:{}", self.target_crs.value), self.target_crs.source),
        );
        map.insert(
            "field_name".to_string(),
            (self.field_name.value.clone(), self.field_name.source),
        );
        map.insert(
            "longitude_field".to_string(),
            (self.longitude_field.value.clone(), self.longitude_field.source),
        );
        map.insert(
            "latitude_field".to_string(),
            (self.latitude_field.value.clone(), self.latitude_field.source),
        );
        map.insert(
            "overwrite".to_string(),
            (self.overwrite.value.to_string(), self.overwrite.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    search_radius: Option<f64>,
    closest_count: Option<usize>,
    source_crs: Option<u32>,
    target_crs: Option<u32>,
    field_name: Option<String>,
    longitude_field: Option<String>,
    latitude_field: Option<String>,
    overwrite: Option<bool>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub search_radius: Option<f64>,
    pub closest_count: Option<usize>,
    pub source_crs: Option<u32>,
    pub target_crs: Option<u32>,
    pub field_name: Option<String>,
    pub longitude_field: Option<String>,
    pub latitude_field: Option<String>,
    pub overwrite: Option<bool>,
}

/// Parse an EPSG code, accepting `3414` or `EPSG:3414`
pub fn parse_epsg(s: &str) -> Result<u32> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("EPSG:")
        .or_else(|| trimmed.strip_prefix("epsg:"))
        .unwrap_or(trimmed);
    digits.parse::<u32>().map_err(|_| CatchmentError::ConfigInvalid {
        key: "crs".to_string(),
        reason: format!("Invalid EPSG code: {}", s),
    })
}

/// Parse a boolean flag from common spellings
pub fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(CatchmentError::ConfigInvalid {
            key: "overwrite".to_string(),
            reason: format!("Invalid boolean: {}", s),
        }),
    }
}
