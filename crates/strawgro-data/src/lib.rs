//! Collaborator data formats for the Strawgro model.
//!
//! The simulation core consumes an ordered sequence of weather records and
//! produces an ordered sequence of daily results. This crate sits on either
//! side of it: reading weather from disk, and holding the results up against
//! the output of the DSSAT reference simulator.
//!
//! # Modules
//!
//! - [`weather_file`] -- DSSAT `.WTH` and JSON weather input, selection
//!   from the planting date
//! - [`reference`] -- DSSAT `PlantGro.OUT` growth tables
//! - [`comparison`] -- Column mapping, unit conversion, DAP alignment, and
//!   per-variable summary statistics

pub mod comparison;
pub mod reference;
pub mod weather_file;

pub use comparison::{COLUMN_MAP, Comparison, VariableSummary, compare};
pub use reference::{ReferenceError, ReferenceTable};
pub use weather_file::{WeatherFileError, load_json, load_wth, records_from};
