//! Core structs for the Strawgro model.
//!
//! Parameters ([`CultivarParams`], [`SoilProperties`], [`ModelParameters`])
//! are immutable for the lifetime of a run. [`PlantState`] is the one mutable
//! record a run threads from day to day, and [`DailyResult`] is the frozen
//! per-day snapshot returned to the caller.
//!
//! Units follow the reference model: temperatures in °C, radiation in
//! MJ/m²/day, rainfall and transpiration in mm/day, root depth in cm, soil
//! water capacities in mm per metre of soil, biomass in g per plant.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::enums::{Stage, TranspirationMethod};

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Cultivar-specific parameters, supplied once per run and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CultivarParams {
    /// Cultivar name (informational).
    #[serde(default)]
    pub name: String,
    /// Base temperature below which development stops (°C).
    pub tbase: f64,
    /// Optimal temperature for development (°C).
    pub topt: f64,
    /// Maximum threshold temperature above which development stops (°C).
    pub tmax_th: f64,
    /// Radiation-use efficiency (g assimilate per MJ intercepted).
    pub rue: f64,
    /// Light-extinction coefficient of the canopy.
    pub k_light: f64,
    /// Specific leaf area (m² leaf per g leaf biomass).
    pub sla: f64,
    /// Potential fruit count per crown.
    pub potential_fruits_per_crown: f64,
}

/// Soil properties of the stand, supplied once per run and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilProperties {
    /// Maximum rooting depth (cm).
    pub max_root_depth: f64,
    /// Water content at field capacity (mm per metre of soil).
    pub field_capacity: f64,
    /// Water content at the permanent wilting point (mm per metre of soil).
    pub wilting_point: f64,
}

/// Model-level settings that are not cultivar or soil specific.
///
/// Every field has a default matching the reference model, so the YAML
/// `model` section may be omitted entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Stand density used to convert canopy assimilate to a per-plant basis
    /// (plants/m², default 5).
    #[serde(default = "default_plant_density")]
    pub plant_density: f64,
    /// Atmospheric CO2 concentration (ppm, default 400).
    #[serde(default = "default_co2_ppm")]
    pub co2_ppm: f64,
    /// Transpiration formula (default Hargreaves without wind adjustment).
    #[serde(default)]
    pub transpiration: TranspirationMethod,
    /// Maximum root elongation rate (cm/day, default 0.5).
    #[serde(default = "default_max_root_growth_rate")]
    pub max_root_growth_rate: f64,
    /// Leaf area index at planting (default 0.1).
    #[serde(default = "default_initial_lai")]
    pub initial_lai: f64,
    /// Root depth at planting (cm, default 5). Capped at the soil maximum.
    #[serde(default = "default_initial_root_depth")]
    pub initial_root_depth: f64,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            plant_density: default_plant_density(),
            co2_ppm: default_co2_ppm(),
            transpiration: TranspirationMethod::default(),
            max_root_growth_rate: default_max_root_growth_rate(),
            initial_lai: default_initial_lai(),
            initial_root_depth: default_initial_root_depth(),
        }
    }
}

const fn default_plant_density() -> f64 {
    5.0
}

const fn default_co2_ppm() -> f64 {
    400.0
}

const fn default_max_root_growth_rate() -> f64 {
    0.5
}

const fn default_initial_lai() -> f64 {
    0.1
}

const fn default_initial_root_depth() -> f64 {
    5.0
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// One day of weather, consumed in order by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    /// Calendar date of the record.
    pub date: NaiveDate,
    /// Maximum air temperature (°C).
    pub tmax: f64,
    /// Minimum air temperature (°C).
    pub tmin: f64,
    /// Incoming solar radiation (MJ/m²/day).
    pub solar_radiation: f64,
    /// Rainfall (mm/day).
    pub rainfall: f64,
    /// Relative humidity (%).
    pub rh: f64,
    /// Wind speed (m/s).
    pub wind_speed: f64,
}

impl WeatherRecord {
    /// Mean daily air temperature (°C).
    pub const fn tavg(&self) -> f64 {
        (self.tmax + self.tmin) / 2.0
    }

    /// Every numeric field paired with its name, in declaration order.
    pub const fn numeric_fields(&self) -> [(&'static str, f64); 6] {
        [
            ("tmax", self.tmax),
            ("tmin", self.tmin),
            ("solar_radiation", self.solar_radiation),
            ("rainfall", self.rainfall),
            ("rh", self.rh),
            ("wind_speed", self.wind_speed),
        ]
    }
}

// ---------------------------------------------------------------------------
// PlantState
// ---------------------------------------------------------------------------

/// Mutable state of one plant over one simulation run.
///
/// `biomass` is always recomputed as the sum of the four organ pools, never
/// accumulated independently. `stage`, `thermal_time`, and `root_depth`
/// never decrease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantState {
    /// Days after planting of the most recently simulated day (0 at planting).
    pub days_after_planting: u32,
    /// Total biomass (g/plant).
    pub biomass: f64,
    /// Leaf biomass (g/plant).
    pub leaf_biomass: f64,
    /// Stem biomass (g/plant).
    pub stem_biomass: f64,
    /// Root biomass (g/plant).
    pub root_biomass: f64,
    /// Fruit biomass (g/plant).
    pub fruit_biomass: f64,
    /// Leaf area index (m²/m²), derived from leaf biomass.
    pub leaf_area_index: f64,
    /// Rooting depth (cm), bounded by the soil maximum.
    pub root_depth: f64,
    /// Fruits per plant.
    pub fruit_number: f64,
    /// Crowns per plant (at least 1).
    pub crown_number: f64,
    /// Runners per plant.
    pub runner_number: f64,
    /// Current phenological stage.
    pub stage: Stage,
    /// Accumulated thermal time since planting (degree-days).
    pub thermal_time: f64,
}

impl PlantState {
    /// State on the planting day: no biomass, one crown, a minimal canopy,
    /// and a shallow root system capped at the soil maximum.
    pub const fn at_planting(soil: &SoilProperties, model: &ModelParameters) -> Self {
        Self {
            days_after_planting: 0,
            biomass: 0.0,
            leaf_biomass: 0.0,
            stem_biomass: 0.0,
            root_biomass: 0.0,
            fruit_biomass: 0.0,
            leaf_area_index: model.initial_lai,
            root_depth: model.initial_root_depth.min(soil.max_root_depth),
            fruit_number: 0.0,
            crown_number: 1.0,
            runner_number: 0.0,
            stage: Stage::Germination,
            thermal_time: 0.0,
        }
    }

    /// Sum of the four organ pools (g/plant).
    pub const fn organ_total(&self) -> f64 {
        self.leaf_biomass + self.stem_biomass + self.root_biomass + self.fruit_biomass
    }
}

// ---------------------------------------------------------------------------
// DailyResult
// ---------------------------------------------------------------------------

/// Snapshot of one simulated day. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyResult {
    /// Calendar date of the simulated day.
    pub date: NaiveDate,
    /// Days after planting.
    pub dap: u32,
    /// Phenological stage at the end of the day.
    pub stage: Stage,
    /// Accumulated thermal time (degree-days).
    pub thermal_time: f64,
    /// Total biomass (g/plant).
    pub biomass: f64,
    /// Leaf area index (m²/m²).
    pub leaf_area_index: f64,
    /// Rooting depth (cm).
    pub root_depth: f64,
    /// Fruits per plant.
    pub fruit_number: f64,
    /// Fruit biomass (g/plant).
    pub fruit_biomass: f64,
    /// Leaf biomass (g/plant).
    pub leaf_biomass: f64,
    /// Stem biomass (g/plant).
    pub stem_biomass: f64,
    /// Root biomass (g/plant).
    pub root_biomass: f64,
    /// Crowns per plant.
    pub crown_number: f64,
    /// Runners per plant.
    pub runner_number: f64,
    /// Water stress factor (0 = none, 1 = maximum).
    pub water_stress: f64,
    /// Astronomical daylength (hours).
    pub daylength: f64,
    /// Canopy photosynthesis after water stress (g/m²/day).
    pub photosynthesis: f64,
    /// Potential transpiration (mm/day).
    pub transpiration: f64,
}

impl DailyResult {
    /// Look up a numeric column by its result-table name.
    ///
    /// Returns `None` for `date`, `stage`, and unknown names.
    pub fn value(&self, column: &str) -> Option<f64> {
        let value = match column {
            "dap" => f64::from(self.dap),
            "thermal_time" => self.thermal_time,
            "biomass" => self.biomass,
            "leaf_area_index" => self.leaf_area_index,
            "root_depth" => self.root_depth,
            "fruit_number" => self.fruit_number,
            "fruit_biomass" => self.fruit_biomass,
            "leaf_biomass" => self.leaf_biomass,
            "stem_biomass" => self.stem_biomass,
            "root_biomass" => self.root_biomass,
            "crown_number" => self.crown_number,
            "runner_number" => self.runner_number,
            "water_stress" => self.water_stress,
            "daylength" => self.daylength,
            "photosynthesis" => self.photosynthesis,
            "transpiration" => self.transpiration,
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soil(max_root_depth: f64) -> SoilProperties {
        SoilProperties {
            max_root_depth,
            field_capacity: 200.0,
            wilting_point: 50.0,
        }
    }

    #[test]
    fn planting_state_matches_reference_defaults() {
        let state = PlantState::at_planting(&soil(50.0), &ModelParameters::default());
        assert_eq!(state.stage, Stage::Germination);
        assert_eq!(state.days_after_planting, 0);
        assert!((state.leaf_area_index - 0.1).abs() < f64::EPSILON);
        assert!((state.root_depth - 5.0).abs() < f64::EPSILON);
        assert!((state.crown_number - 1.0).abs() < f64::EPSILON);
        assert!(state.organ_total().abs() < f64::EPSILON);
    }

    #[test]
    fn planting_root_depth_capped_by_shallow_soil() {
        let state = PlantState::at_planting(&soil(3.0), &ModelParameters::default());
        assert!((state.root_depth - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn model_parameters_default_when_section_empty() {
        let params: Result<ModelParameters, _> = serde_yml::from_str("{}");
        assert_eq!(params.ok(), Some(ModelParameters::default()));
    }

    #[test]
    fn cultivar_requires_thresholds() {
        let yaml = "name: Albion\ntbase: 4.0\ntopt: 22.0\n";
        let parsed: Result<CultivarParams, _> = serde_yml::from_str(yaml);
        assert!(parsed.is_err());
    }

    #[test]
    fn weather_record_parses_iso_date() {
        let json = r#"{"date":"2023-05-01","tmax":25.0,"tmin":15.0,
            "solar_radiation":20.0,"rainfall":5.0,"rh":70.0,"wind_speed":2.0}"#;
        let record: Result<WeatherRecord, _> = serde_json::from_str(json);
        let record = record.ok();
        assert_eq!(
            record.as_ref().map(|r| r.date),
            NaiveDate::from_ymd_opt(2023, 5, 1)
        );
        assert!(record.is_some_and(|r| (r.tavg() - 20.0).abs() < f64::EPSILON));
    }

    #[test]
    fn weather_record_missing_field_is_rejected() {
        let json = r#"{"date":"2023-05-01","tmax":25.0,"tmin":15.0}"#;
        let record: Result<WeatherRecord, _> = serde_json::from_str(json);
        assert!(record.is_err());
    }
}
