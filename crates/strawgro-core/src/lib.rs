//! Crop clock, daily step, and simulation driver for the Strawgro model.
//!
//! This crate turns the plant-level formulas of `strawgro-plant` into a
//! day-by-day simulation over a dense, chronological weather sequence.
//!
//! # Modules
//!
//! - [`clock`] -- Crop clock with the days-after-planting counter and the
//!   chronology guard for weather records.
//! - [`config`] -- Configuration loading from `strawgro-config.yaml` into
//!   strongly-typed structs, parameter validation, experiment configs.
//! - [`input`] -- Validation of individual weather records.
//! - [`step`] -- The pure daily step and the immutable run context.
//! - [`runner`] -- [`Simulation`], the stateful driver over a weather
//!   sequence.
//! - [`experiment`] -- Parallel batches of independent runs.
//!
//! [`Simulation`]: runner::Simulation

pub mod clock;
pub mod config;
pub mod experiment;
pub mod input;
pub mod runner;
pub mod step;
