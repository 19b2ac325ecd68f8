//! The daily step: one weather record in, one new plant state and one
//! result record out.
//!
//! Each day runs in a fixed order:
//!
//! 1. **Validate** the weather record.
//! 2. **Develop** -- daylength, thermal time, phenology (at most one stage).
//! 3. **Assimilate** -- photosynthesis and transpiration on yesterday's
//!    canopy, water stress on yesterday's root zone, stress reduction,
//!    conversion to a per-plant basis, maintenance respiration on
//!    yesterday's organ pools.
//! 4. **Grow** -- partitioning under today's stage, then runners, crowns,
//!    and fruits.
//! 5. **Record** the daily result.
//!
//! [`step`] never mutates its inputs. A failed validation returns before
//! any computation, so the caller's state is untouched.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use strawgro_plant::physiology;
use strawgro_plant::{
    advance_phenology, partition_biomass, update_crowns, update_fruits, update_runners,
};
use strawgro_types::{
    CultivarParams, DailyResult, ModelParameters, PlantState, SoilProperties, WeatherRecord,
};
use tracing::{debug, info};

use crate::config::{ConfigError, validate_parameters};
use crate::input::{InputError, validate_weather};

/// Centimetres per metre, for root depth against per-metre soil water.
const CM_PER_M: f64 = 100.0;

/// Immutable parameters of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationContext {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Planting date; day 1 is the first record on or after it.
    pub planting_date: NaiveDate,
    /// Soil of the stand.
    pub soil: SoilProperties,
    /// Cultivar parameters.
    pub cultivar: CultivarParams,
    /// Model-level settings.
    pub model: ModelParameters,
}

impl SimulationContext {
    /// Validate every parameter of the run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] for the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_parameters(self.latitude, &self.soil, &self.cultivar, &self.model)
    }

    /// Plant state on the planting day.
    pub const fn planting_state(&self) -> PlantState {
        PlantState::at_planting(&self.soil, &self.model)
    }
}

/// Simulate day `day` (days after planting) from `state` and `weather`.
///
/// Returns the state at the end of the day and the day's result record.
///
/// # Errors
///
/// Returns [`InputError`] if the weather record is malformed.
pub fn step(
    ctx: &SimulationContext,
    state: &PlantState,
    weather: &WeatherRecord,
    day: u32,
) -> Result<(PlantState, DailyResult), InputError> {
    validate_weather(weather, day)?;

    let cultivar = &ctx.cultivar;
    let soil = &ctx.soil;
    let model = &ctx.model;
    let (tmax, tmin) = (weather.tmax, weather.tmin);

    let mut next = state.clone();
    next.days_after_planting = day;

    // Development
    let daylength = physiology::daylength(ctx.latitude, weather.date.ordinal());
    let daily_thermal_time =
        physiology::thermal_time(tmin, tmax, cultivar.tbase, cultivar.topt, cultivar.tmax_th);
    let phenology = advance_phenology(state.stage, state.thermal_time, daily_thermal_time);
    next.stage = phenology.stage;
    next.thermal_time = phenology.thermal_time;
    if let Some(left) = phenology.left {
        info!(
            day,
            date = %weather.date,
            from = %left,
            to = %next.stage,
            thermal_time = next.thermal_time,
            "Stage transition"
        );
    }

    // Assimilation, on yesterday's canopy, roots, and pools
    let gross = physiology::photosynthesis(
        weather.solar_radiation,
        tmax,
        tmin,
        cultivar.rue,
        cultivar.tbase,
        cultivar.topt,
        cultivar.k_light,
        state.leaf_area_index,
        model.co2_ppm,
    );
    let transpiration = physiology::transpiration_with(
        model.transpiration,
        weather.solar_radiation,
        tmax,
        tmin,
        state.leaf_area_index,
        weather.wind_speed,
    );
    let water_stress = physiology::water_stress(
        soil.field_capacity,
        soil.wilting_point,
        state.root_depth / CM_PER_M,
        weather.rainfall,
        transpiration,
    );
    let photosynthesis = gross * (1.0 - water_stress);
    let respiration = physiology::maintenance_respiration(
        state.leaf_biomass,
        state.stem_biomass,
        state.root_biomass,
        state.fruit_biomass,
        tmin,
        tmax,
    );
    let daily_biomass = (photosynthesis / model.plant_density - respiration).max(0.0);

    // Growth, under today's stage
    partition_biomass(&mut next, daily_biomass, cultivar, soil, model);
    update_runners(&mut next);
    update_crowns(&mut next);
    update_fruits(&mut next, cultivar);

    debug!(
        day,
        stage = %next.stage,
        thermal_time = next.thermal_time,
        photosynthesis,
        water_stress,
        daily_biomass,
        biomass = next.biomass,
        "Day simulated"
    );

    let result = DailyResult {
        date: weather.date,
        dap: day,
        stage: next.stage,
        thermal_time: next.thermal_time,
        biomass: next.biomass,
        leaf_area_index: next.leaf_area_index,
        root_depth: next.root_depth,
        fruit_number: next.fruit_number,
        fruit_biomass: next.fruit_biomass,
        leaf_biomass: next.leaf_biomass,
        stem_biomass: next.stem_biomass,
        root_biomass: next.root_biomass,
        crown_number: next.crown_number,
        runner_number: next.runner_number,
        water_stress,
        daylength,
        photosynthesis,
        transpiration,
    };

    Ok((next, result))
}
