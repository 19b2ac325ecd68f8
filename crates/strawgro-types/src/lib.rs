//! Shared type definitions for the Strawgro strawberry growth model.
//!
//! This crate is the single source of truth for the data model used across
//! the workspace: the phenological stage enumeration, the immutable cultivar
//! and soil parameters, the daily weather record consumed by the engine, the
//! mutable plant state, and the daily result record handed back to callers.
//!
//! # Modules
//!
//! - [`enums`] -- Enumeration types (phenological stage, transpiration method)
//! - [`structs`] -- Parameter, weather, plant state, and result structs

pub mod enums;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Stage, TranspirationMethod};
pub use structs::{
    CultivarParams, DailyResult, ModelParameters, PlantState, SoilProperties, WeatherRecord,
};
