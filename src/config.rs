//! Configuration management and validation.
//!
//! Provides the layered processing configuration: built-in defaults, an optional
//! TOML file, `FIRESOUNDING_*` environment overrides and finally CLI flags.
//! Custom instrument formats are declared here as column tables.

use crate::app::models::{HainesElevation, ReferenceLevelSet};
use crate::app::services::hodograph::{AltitudeBand, HodographSampler};
use crate::app::services::output_writer::TableFormat;
use crate::app::services::sounding_parser::{InstrumentSchema, Quantity, Unit};
use crate::constants::{
    DEFAULT_FORMAT, DEFAULT_HODOGRAPH_BANDS, DEFAULT_HODOGRAPH_STRIDE, DEFAULT_HODOGRAPH_WINDOW,
    DEFAULT_MAX_LEVELS, MAX_WORKERS, env,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Processing settings: which format to read, where to write, how much to accept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Instrument format identifier (built-in or declared under `[formats]`)
    pub format: String,

    /// Directory receiving profile tables and reports
    pub output_dir: PathBuf,

    /// Profile table file format
    pub table_format: TableFormat,

    /// Unit for u/v in the written profile table
    pub wind_unit: Unit,

    /// Upper bound on records accepted per sounding
    pub max_levels: usize,

    /// Soundings processed concurrently
    pub workers: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_string(),
            output_dir: PathBuf::from("."),
            table_format: TableFormat::Csv,
            wind_unit: Unit::MetersPerSecond,
            max_levels: DEFAULT_MAX_LEVELS,
            workers: num_cpus::get().clamp(1, MAX_WORKERS),
        }
    }
}

/// Index computation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Extra reference pressures (hPa) merged with the standard RAOB levels
    pub reference_levels: Vec<f64>,

    /// Haines Index elevation class
    pub haines: HainesElevation,
}

/// Hodograph smoothing and thinning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HodographConfig {
    pub window: usize,
    pub stride: usize,
    pub bands: Vec<AltitudeBand>,
}

impl Default for HodographConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_HODOGRAPH_WINDOW,
            stride: DEFAULT_HODOGRAPH_STRIDE,
            bands: DEFAULT_HODOGRAPH_BANDS
                .iter()
                .map(|&(lower, upper)| AltitudeBand::new(lower, upper))
                .collect(),
        }
    }
}

/// Complete processor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub processing: ProcessingConfig,
    pub analysis: AnalysisConfig,
    pub hodograph: HodographConfig,

    /// Custom instrument formats keyed by identifier
    pub formats: BTreeMap<String, InstrumentSchema>,
}

impl Config {
    /// Create a configuration writing to `output_dir`
    pub fn new(output_dir: PathBuf) -> Self {
        Self::default().with_output_dir(output_dir)
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.processing.format = format.into();
        self
    }

    pub fn with_output_dir(mut self, output_dir: PathBuf) -> Self {
        self.processing.output_dir = output_dir;
        self
    }

    pub fn with_table_format(mut self, table_format: TableFormat) -> Self {
        self.processing.table_format = table_format;
        self
    }

    pub fn with_wind_unit(mut self, unit: Unit) -> Self {
        self.processing.wind_unit = unit;
        self
    }

    pub fn with_max_levels(mut self, max_levels: usize) -> Self {
        self.processing.max_levels = max_levels;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.processing.workers = workers;
        self
    }

    pub fn with_haines(mut self, elevation: HainesElevation) -> Self {
        self.analysis.haines = elevation;
        self
    }

    pub fn with_reference_levels(mut self, levels: Vec<f64>) -> Self {
        self.analysis.reference_levels = levels;
        self
    }

    /// Register a custom instrument format under its own name
    pub fn with_custom_format(mut self, schema: InstrumentSchema) -> Self {
        self.formats.insert(schema.name.clone(), schema);
        self
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read config file {}", path.display()), e)
        })?;
        Self::from_toml(&text)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(text)?;
        for (key, schema) in config.formats.iter_mut() {
            if schema.name.trim().is_empty() {
                schema.name = key.clone();
            } else if schema.name != *key {
                return Err(Error::configuration(format!(
                    "Format table '{}' declares a different name '{}'",
                    key, schema.name
                )));
            }
        }
        Ok(config)
    }

    /// Default config file location: `<config dir>/firesounding/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("firesounding").join("config.toml"))
            .ok_or_else(|| Error::configuration("Could not determine config directory"))
    }

    /// Defaults, then the config file if given, then environment overrides
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Apply `FIRESOUNDING_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(format) = lookup(env::FORMAT) {
            debug!("{} overrides format: {}", env::FORMAT, format);
            self.processing.format = format;
        }
        if let Some(haines) = lookup(env::HAINES) {
            self.analysis.haines = haines.parse()?;
        }
        if let Some(output_dir) = lookup(env::OUTPUT_DIR) {
            self.processing.output_dir = PathBuf::from(output_dir);
        }
        Ok(())
    }

    /// Column table for the configured format, custom tables shadowing built-ins
    pub fn resolve_schema(&self) -> Result<InstrumentSchema> {
        match self.formats.get(&self.processing.format) {
            Some(schema) => Ok(schema.clone()),
            None => InstrumentSchema::builtin(&self.processing.format),
        }
    }

    /// Built-in formats followed by the custom ones
    pub fn available_formats(&self) -> Vec<InstrumentSchema> {
        let mut formats: Vec<InstrumentSchema> = InstrumentSchema::builtins()
            .into_iter()
            .filter(|schema| !self.formats.contains_key(&schema.name))
            .collect();
        formats.extend(self.formats.values().cloned());
        formats
    }

    pub fn reference_level_set(&self) -> ReferenceLevelSet {
        ReferenceLevelSet::with_custom(&self.analysis.reference_levels)
    }

    pub fn hodograph_sampler(&self) -> HodographSampler {
        HodographSampler::new(
            self.hodograph.window,
            self.hodograph.stride,
            self.hodograph.bands.clone(),
        )
    }

    /// Create the output directory if needed
    pub fn ensure_output_directory(&self) -> Result<()> {
        let dir = &self.processing.output_dir;
        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| {
                Error::io(
                    format!("Failed to create output directory {}", dir.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.processing.max_levels == 0 {
            return Err(Error::configuration("max_levels must be greater than 0"));
        }

        if self.processing.workers == 0 || self.processing.workers > MAX_WORKERS {
            return Err(Error::configuration(format!(
                "workers must be between 1 and {}",
                MAX_WORKERS
            )));
        }

        if self.processing.wind_unit.quantity() != Quantity::Speed {
            return Err(Error::configuration(format!(
                "wind_unit '{}' is not a speed unit",
                self.processing.wind_unit
            )));
        }

        if let Some(level) = self
            .analysis
            .reference_levels
            .iter()
            .find(|level| !level.is_finite() || **level <= 0.0)
        {
            return Err(Error::configuration(format!(
                "Reference level {} hPa must be a positive pressure",
                level
            )));
        }

        if self.hodograph.window == 0 || self.hodograph.stride == 0 {
            return Err(Error::configuration(
                "Hodograph window and stride must be greater than 0",
            ));
        }

        if let Some(band) = self
            .hodograph
            .bands
            .iter()
            .find(|band| band.lower >= band.upper)
        {
            return Err(Error::configuration(format!(
                "Hodograph band {}-{} m is empty",
                band.lower, band.upper
            )));
        }

        for schema in self.formats.values() {
            schema.validate()?;
        }

        self.resolve_schema()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::CanonicalField;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.processing.format, "windsond");
        assert_eq!(config.processing.wind_unit, Unit::MetersPerSecond);
        assert_eq!(config.analysis.haines, HainesElevation::Low);
        assert_eq!(config.hodograph.bands.len(), 4);
    }

    #[test]
    fn test_builder_methods() {
        let config = Config::new(PathBuf::from("/tmp/out"))
            .with_format("imet")
            .with_haines(HainesElevation::High)
            .with_wind_unit(Unit::Knots)
            .with_reference_levels(vec![975.0])
            .with_workers(2);

        assert_eq!(config.processing.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.resolve_schema().unwrap().name, "imet");
        assert_eq!(config.analysis.haines, HainesElevation::High);
        assert!(config.reference_level_set().levels().contains(&975.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(Config::default().with_max_levels(0).validate().is_err());
        assert!(Config::default().with_workers(0).validate().is_err());
        assert!(Config::default().with_workers(MAX_WORKERS + 1).validate().is_err());
        assert!(Config::default().with_wind_unit(Unit::Celsius).validate().is_err());
        assert!(
            Config::default()
                .with_reference_levels(vec![-10.0])
                .validate()
                .is_err()
        );
        assert!(matches!(
            Config::default().with_format("radiosonde-x").validate(),
            Err(Error::UnknownFormat { .. })
        ));
    }

    #[test]
    fn test_custom_format_from_toml() {
        let text = r#"
            [processing]
            format = "lab"
            wind_unit = "knots"

            [analysis]
            haines = "mid"
            reference_levels = [975.0, 875.0]

            [formats.lab]
            delimiter = ","
            columns = [
                { source = "p", field = "pressure", unit = "hPa" },
                { source = "t", field = "temperature", unit = "C" },
                { source = "td", field = "dewpoint", unit = "C" },
                { source = "ws", field = "wind_speed", unit = "m/s" },
                { source = "wd", field = "wind_direction", unit = "deg" },
                { source = "z", field = "altitude", unit = "m" },
            ]
        "#;

        let config = Config::from_toml(text).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.processing.wind_unit, Unit::Knots);
        assert_eq!(config.analysis.haines, HainesElevation::Mid);

        let schema = config.resolve_schema().unwrap();
        assert_eq!(schema.name, "lab");
        assert_eq!(schema.delimiter, ',');
        assert_eq!(
            schema.column_for(CanonicalField::Altitude).unwrap().source,
            "z"
        );
        assert_eq!(config.available_formats().len(), 3);
    }

    #[test]
    fn test_format_table_name_must_match_key() {
        let text = r#"
            [formats.lab]
            name = "other"
            columns = []
        "#;
        assert!(matches!(
            Config::from_toml(text),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_environment_overrides() {
        let vars: HashMap<&str, &str> = [
            (env::FORMAT, "imet"),
            (env::HAINES, "high"),
            (env::OUTPUT_DIR, "/data/soundings"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env_from(|key| vars.get(key).map(|value| value.to_string()))
            .unwrap();

        assert_eq!(config.processing.format, "imet");
        assert_eq!(config.analysis.haines, HainesElevation::High);
        assert_eq!(
            config.processing.output_dir,
            PathBuf::from("/data/soundings")
        );

        let mut config = Config::default();
        let result = config.apply_env_from(|key| {
            (key == env::HAINES).then(|| "alpine".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file_and_output_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[processing]\nformat = \"imet\"\nmax_levels = 100\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.processing.format, "imet");
        assert_eq!(config.processing.max_levels, 100);

        let output_dir = temp_dir.path().join("out").join("nested");
        let config = config.with_output_dir(output_dir.clone());
        config.ensure_output_directory().unwrap();
        assert!(output_dir.exists());

        assert!(Config::load_from_file(&temp_dir.path().join("missing.toml")).is_err());
    }
}
