//! Configuration loading and typed config structures for Strawgro.
//!
//! The canonical configuration lives in `strawgro-config.yaml` at the project
//! root. The `site`, `soil`, and `cultivar` sections are required; every
//! other section has defaults. Missing keys surface as YAML errors at load
//! time. Semantic checks (threshold ordering, positive rates, soil water
//! capacities) run in [`validate_parameters`] before the first simulated day.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strawgro_types::{CultivarParams, ModelParameters, SoilProperties};

use crate::experiment::Experiment;
use crate::step::SimulationContext;

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A parameter is present but unusable.
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameter {
        /// Dotted path of the offending parameter.
        field: String,
        /// Explanation of what is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `strawgro-config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Location and planting date.
    pub site: SiteConfig,

    /// Soil of the stand.
    pub soil: SoilProperties,

    /// Cultivar parameters.
    pub cultivar: CultivarParams,

    /// Model-level settings.
    #[serde(default)]
    pub model: ModelParameters,

    /// Weather input.
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Result output.
    #[serde(default)]
    pub output: OutputConfig,

    /// Optional comparison against a reference simulator's output.
    #[serde(default)]
    pub comparison: Option<ComparisonConfig>,

    /// Optional experiment batch run alongside the base configuration.
    #[serde(default)]
    pub experiments: Option<ExperimentsConfig>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML or a required
    /// key is missing.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML or a
    /// required key is missing.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Check every parameter the engine depends on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] for the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_parameters(self.site.latitude, &self.soil, &self.cultivar, &self.model)
    }

    /// Build the immutable run context described by this configuration.
    pub fn context(&self) -> SimulationContext {
        SimulationContext {
            latitude: self.site.latitude,
            planting_date: self.site.planting_date,
            soil: self.soil.clone(),
            cultivar: self.cultivar.clone(),
            model: self.model.clone(),
        }
    }
}

/// Location and planting date of the stand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Latitude in decimal degrees (positive north).
    pub latitude: f64,

    /// Planting date (`YYYY-MM-DD`).
    pub planting_date: NaiveDate,
}

/// Supported weather file formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherFormat {
    /// DSSAT `.WTH` text file.
    #[default]
    Wth,
    /// JSON array of weather records.
    Json,
}

/// Weather input configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Path to the weather file.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Format of the weather file.
    #[serde(default)]
    pub format: WeatherFormat,
}

/// Result output configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Where to write the JSON result table. Standard output when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Reference comparison configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    /// Path to a DSSAT `PlantGro.OUT` file.
    pub reference_path: PathBuf,
}

/// Experiment batch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentsConfig {
    /// Path to an experiment YAML file (see [`ExperimentConfig`]).
    pub path: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        field: field.to_owned(),
        reason: reason.to_owned(),
    }
}

fn ensure(condition: bool, field: &str, reason: &str) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(invalid(field, reason))
    }
}

/// Validate the parameters of one run.
///
/// Every value must be finite. Beyond that:
/// - `tbase < topt < tmax_th` (the thermal-time falling leg divides by
///   `tmax_th - topt`)
/// - `rue`, `k_light`, `sla`, `co2_ppm`, `plant_density`, `max_root_depth` > 0
/// - `field_capacity > wilting_point >= 0`
/// - `potential_fruits_per_crown`, `max_root_growth_rate`, `initial_lai`,
///   `initial_root_depth` >= 0
/// - `|latitude| <= 90`
///
/// # Errors
///
/// Returns [`ConfigError::InvalidParameter`] for the first offending field.
pub fn validate_parameters(
    latitude: f64,
    soil: &SoilProperties,
    cultivar: &CultivarParams,
    model: &ModelParameters,
) -> Result<(), ConfigError> {
    let numbers = [
        ("site.latitude", latitude),
        ("soil.max_root_depth", soil.max_root_depth),
        ("soil.field_capacity", soil.field_capacity),
        ("soil.wilting_point", soil.wilting_point),
        ("cultivar.tbase", cultivar.tbase),
        ("cultivar.topt", cultivar.topt),
        ("cultivar.tmax_th", cultivar.tmax_th),
        ("cultivar.rue", cultivar.rue),
        ("cultivar.k_light", cultivar.k_light),
        ("cultivar.sla", cultivar.sla),
        (
            "cultivar.potential_fruits_per_crown",
            cultivar.potential_fruits_per_crown,
        ),
        ("model.plant_density", model.plant_density),
        ("model.co2_ppm", model.co2_ppm),
        ("model.max_root_growth_rate", model.max_root_growth_rate),
        ("model.initial_lai", model.initial_lai),
        ("model.initial_root_depth", model.initial_root_depth),
    ];
    for (field, value) in numbers {
        ensure(value.is_finite(), field, "must be a finite number")?;
    }

    ensure(
        (-90.0..=90.0).contains(&latitude),
        "site.latitude",
        "must lie within -90..=90 degrees",
    )?;

    ensure(
        cultivar.tbase < cultivar.topt,
        "cultivar.topt",
        "must be greater than tbase",
    )?;
    ensure(
        cultivar.topt < cultivar.tmax_th,
        "cultivar.tmax_th",
        "must be greater than topt",
    )?;
    ensure(cultivar.rue > 0.0, "cultivar.rue", "must be positive")?;
    ensure(cultivar.k_light > 0.0, "cultivar.k_light", "must be positive")?;
    ensure(cultivar.sla > 0.0, "cultivar.sla", "must be positive")?;
    ensure(
        cultivar.potential_fruits_per_crown >= 0.0,
        "cultivar.potential_fruits_per_crown",
        "must not be negative",
    )?;

    ensure(
        soil.max_root_depth > 0.0,
        "soil.max_root_depth",
        "must be positive",
    )?;
    ensure(
        soil.wilting_point >= 0.0,
        "soil.wilting_point",
        "must not be negative",
    )?;
    ensure(
        soil.field_capacity > soil.wilting_point,
        "soil.field_capacity",
        "must be greater than wilting_point",
    )?;

    ensure(model.plant_density > 0.0, "model.plant_density", "must be positive")?;
    ensure(model.co2_ppm > 0.0, "model.co2_ppm", "must be positive")?;
    ensure(
        model.max_root_growth_rate >= 0.0,
        "model.max_root_growth_rate",
        "must not be negative",
    )?;
    ensure(model.initial_lai >= 0.0, "model.initial_lai", "must not be negative")?;
    ensure(
        model.initial_root_depth >= 0.0,
        "model.initial_root_depth",
        "must not be negative",
    )?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Experiment configuration
// ---------------------------------------------------------------------------

/// A named set of runs derived from one base configuration.
///
/// Loaded from a separate YAML file. Each treatment replaces whole
/// sections of the base configuration; anything it leaves out is taken from
/// the base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Unique experiment identifier (generated at creation time).
    #[serde(default = "default_experiment_id")]
    pub experiment_id: String,

    /// Human-readable experiment name.
    #[serde(default)]
    pub name: String,

    /// Longer description of the experiment's purpose or hypothesis.
    #[serde(default)]
    pub description: String,

    /// Runs to perform, in order.
    #[serde(default)]
    pub treatments: Vec<Treatment>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            experiment_id: default_experiment_id(),
            name: String::new(),
            description: String::new(),
            treatments: Vec::new(),
        }
    }
}

/// Overrides applied to the base configuration for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Treatment {
    /// Treatment name, used in logs and outcome records.
    pub name: String,

    /// Replacement latitude.
    #[serde(default)]
    pub latitude: Option<f64>,

    /// Replacement planting date.
    #[serde(default)]
    pub planting_date: Option<NaiveDate>,

    /// Replacement soil section.
    #[serde(default)]
    pub soil: Option<SoilProperties>,

    /// Replacement cultivar section.
    #[serde(default)]
    pub cultivar: Option<CultivarParams>,

    /// Replacement model section.
    #[serde(default)]
    pub model: Option<ModelParameters>,
}

impl Treatment {
    /// Apply this treatment's overrides on top of `base`.
    pub fn apply(&self, base: &SimulationContext) -> SimulationContext {
        SimulationContext {
            latitude: self.latitude.unwrap_or(base.latitude),
            planting_date: self.planting_date.unwrap_or(base.planting_date),
            soil: self.soil.clone().unwrap_or_else(|| base.soil.clone()),
            cultivar: self.cultivar.clone().unwrap_or_else(|| base.cultivar.clone()),
            model: self.model.clone().unwrap_or_else(|| base.model.clone()),
        }
    }
}

impl ExperimentConfig {
    /// Create a new experiment config with a fresh ID and the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    /// Load experiment config from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse experiment config from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Expand the treatments against a base context into validated
    /// experiments. Each experiment gets its own identifier and carries this
    /// config's `experiment_id` as its batch identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] if any treatment produces
    /// an invalid parameter set; the field is prefixed with the treatment
    /// name.
    pub fn experiments(&self, base: &SimulationContext) -> Result<Vec<Experiment>, ConfigError> {
        self.treatments
            .iter()
            .map(|treatment| {
                let context = treatment.apply(base);
                context.validate().map_err(|err| match err {
                    ConfigError::InvalidParameter { field, reason } => {
                        ConfigError::InvalidParameter {
                            field: format!("{}.{field}", treatment.name),
                            reason,
                        }
                    }
                    other => other,
                })?;
                Ok(Experiment::new(&self.experiment_id, &treatment.name, context))
            })
            .collect()
    }
}

fn default_experiment_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
