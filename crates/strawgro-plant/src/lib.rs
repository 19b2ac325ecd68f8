//! Plant-level logic for the Strawgro model.
//!
//! Everything here operates on plain values and [`PlantState`] without any
//! I/O. It sits between `strawgro-types` (the data model) and
//! `strawgro-core` (the daily step and the simulation driver).
//!
//! # Modules
//!
//! - [`physiology`] -- Stateless process formulas: daylength, thermal time,
//!   photosynthesis, transpiration, water stress, maintenance respiration
//! - [`phenology`] -- Thermal-time accumulation and the stage state machine
//! - [`partition`] -- Stage-dependent allocation of daily assimilate to
//!   organs, canopy and root updates, crown/runner/fruit counts
//!
//! [`PlantState`]: strawgro_types::PlantState

pub mod partition;
pub mod phenology;
pub mod physiology;

pub use partition::{
    PartitionFractions, partition_biomass, update_crowns, update_fruits, update_runners,
};
pub use phenology::{PhenologyUpdate, advance_phenology};
