//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup, the run, and output.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: strawgro_core::config::ConfigError,
    },

    /// The configuration names no weather file.
    #[error("config error: `weather.path` is required")]
    MissingWeatherPath,

    /// Weather input could not be read.
    #[error("weather error: {source}")]
    Weather {
        /// The underlying weather file error.
        #[from]
        source: strawgro_data::WeatherFileError,
    },

    /// The simulation run failed.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: strawgro_core::runner::SimulationError,
    },

    /// Reference output could not be read or aligned.
    #[error("reference error: {source}")]
    Reference {
        /// The underlying reference error.
        #[from]
        source: strawgro_data::ReferenceError,
    },

    /// Writing output failed.
    #[error("output error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Serializing output failed.
    #[error("output serialization error: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
