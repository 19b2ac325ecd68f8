//! Engine binary for the Strawgro strawberry growth model.
//!
//! Loads a run configuration, reads the weather file it names, simulates
//! the season day by day, and writes the daily result table as JSON.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `strawgro-config.yaml` (or `STRAWGRO_CONFIG`)
//! 2. Initialize structured logging (tracing), `RUST_LOG` over
//!    `logging.level`
//! 3. Validate parameters
//! 4. Load weather and select the records from the planting date on
//! 5. Run the simulation
//! 6. Write the results to `output.path` or standard output
//! 7. If a reference is configured, compare against it and write the
//!    summary next to the results
//! 8. If an experiment file is configured, run its treatments in parallel
//!    over the same weather and write one digest per run

mod error;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use strawgro_core::config::{ExperimentConfig, SimulationConfig, WeatherFormat};
use strawgro_core::experiment::{ExperimentOutcome, ExperimentSummary, run_batch};
use strawgro_core::runner::Simulation;
use strawgro_data::{ReferenceTable, compare, load_json, load_wth, records_from};
use strawgro_types::{DailyResult, WeatherRecord};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "strawgro-config.yaml";

/// Environment variable overriding the configuration path.
const CONFIG_PATH_ENV: &str = "STRAWGRO_CONFIG";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any startup step, the run, or output fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    run()?;
    Ok(())
}

fn run() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config_path = config_path();
    let config = SimulationConfig::from_file(&config_path)?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        path = %config_path.display(),
        cultivar = %config.cultivar.name,
        latitude = config.site.latitude,
        planting_date = %config.site.planting_date,
        transpiration = ?config.model.transpiration,
        "Configuration loaded"
    );

    // 3. Validate parameters.
    config.validate()?;

    // 4. Load weather.
    let weather = load_weather(&config)?;
    let season = records_from(&weather, config.site.planting_date);
    info!(
        records = weather.len(),
        from_planting = season.len(),
        "Weather loaded"
    );
    if season.is_empty() {
        warn!("No weather records on or after the planting date");
    }

    // 5. Run.
    let mut simulation = Simulation::new(config.context())?;
    let results = simulation.simulate_growth(season)?;

    // 6. Write results.
    write_json(config.output.path.as_deref(), &results)?;

    // 7. Compare against the reference simulator.
    if let Some(comparison) = &config.comparison {
        compare_with_reference(&config, &comparison.reference_path, &results)?;
    }

    // 8. Run the experiment batch.
    if let Some(experiments) = &config.experiments {
        run_experiments(&config, &experiments.path, season)?;
    }

    info!("strawgro-engine finished");
    Ok(())
}

/// Configuration path from `STRAWGRO_CONFIG`, or the default.
fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

fn load_weather(
    config: &SimulationConfig,
) -> Result<Vec<WeatherRecord>, EngineError> {
    let path = config
        .weather
        .path
        .as_deref()
        .ok_or(EngineError::MissingWeatherPath)?;
    let records = match config.weather.format {
        WeatherFormat::Wth => load_wth(path)?,
        WeatherFormat::Json => load_json(path)?,
    };
    Ok(records)
}

/// Write `value` as pretty JSON to `path`, or to standard output.
fn write_json<T: Serialize + ?Sized>(path: Option<&Path>, value: &T) -> Result<(), EngineError> {
    if let Some(path) = path {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
        info!(path = %path.display(), "Output written");
    } else {
        let stdout = io::stdout();
        let mut writer = stdout.lock();
        serde_json::to_writer_pretty(&mut writer, value)?;
        writeln!(writer)?;
    }
    Ok(())
}

fn compare_with_reference(
    config: &SimulationConfig,
    reference_path: &Path,
    results: &[DailyResult],
) -> Result<(), EngineError> {
    let reference = ReferenceTable::load(reference_path)?;
    let comparison = compare(results, &reference, config.model.plant_density)?;

    for summary in &comparison.variables {
        info!(
            field = %summary.field,
            code = %summary.code,
            days = summary.count,
            reference_mean = summary.reference_mean,
            simulated_mean = summary.simulated_mean,
            mean_absolute_difference = summary.mean_absolute_difference,
            max_absolute_difference = summary.max_absolute_difference,
            correlation = ?summary.correlation,
            "Reference comparison"
        );
    }

    if let Some(output) = &config.output.path {
        let path = output.with_extension("comparison.json");
        write_json(Some(&path), &comparison)?;
    }
    Ok(())
}

fn run_experiments(
    config: &SimulationConfig,
    path: &Path,
    season: &[WeatherRecord],
) -> Result<(), EngineError> {
    let batch = ExperimentConfig::from_file(path)?;
    let experiments = batch.experiments(&config.context())?;
    info!(
        batch_id = %batch.experiment_id,
        name = %batch.name,
        treatments = experiments.len(),
        "Experiment batch loaded"
    );

    let summaries: Vec<ExperimentSummary> = run_batch(&experiments, season)
        .iter()
        .map(ExperimentOutcome::summary)
        .collect();

    for summary in &summaries {
        match &summary.error {
            Some(error) => warn!(
                experiment_id = %summary.experiment_id,
                name = %summary.name,
                error = %error,
                "Experiment failed"
            ),
            None => info!(
                experiment_id = %summary.experiment_id,
                name = %summary.name,
                days = summary.days,
                biomass = ?summary.final_day.as_ref().map(|day| day.biomass),
                fruit_number = ?summary.final_day.as_ref().map(|day| day.fruit_number),
                "Experiment finished"
            ),
        }
    }

    if let Some(output) = &config.output.path {
        let path = output.with_extension("experiments.json");
        write_json(Some(&path), &summaries)?;
    }
    Ok(())
}
