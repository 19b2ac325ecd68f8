//! Stateless physiological process formulas.
//!
//! Each function is a pure mapping from daily inputs to a single rate. None
//! of them read or write [`PlantState`]; the daily step passes in the values
//! they need. Inputs are assumed to have passed weather validation (finite,
//! `tmax >= tmin`), which is what keeps the square root in
//! [`transpiration`] in its domain.
//!
//! [`PlantState`]: strawgro_types::PlantState

use std::f64::consts::PI;

use strawgro_types::TranspirationMethod;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Amplitude of the solar declination cycle (degrees).
pub const DECLINATION_AMPLITUDE_DEG: f64 = 23.45;

/// Day of year of the spring equinox used by the declination formula.
pub const EQUINOX_DAY_OF_YEAR: f64 = 80.0;

/// CO2 concentration at which the CO2 effect on photosynthesis is 1 (ppm).
pub const REFERENCE_CO2_PPM: f64 = 400.0;

/// Sensitivity of photosynthesis to `ln(co2 / 400)`.
pub const CO2_SENSITIVITY: f64 = 0.11;

/// Hargreaves coefficient.
pub const HARGREAVES_COEFFICIENT: f64 = 0.0023;

/// Hargreaves temperature offset (°C).
pub const HARGREAVES_TEMPERATURE_OFFSET: f64 = 17.8;

/// Fraction of rainfall that reaches the root zone.
pub const EFFECTIVE_RAINFALL_FRACTION: f64 = 0.7;

/// Reference temperature of the Q10 respiration model (°C).
pub const RESPIRATION_REFERENCE_TEMP: f64 = 20.0;

/// Maintenance respiration coefficients per organ (g/g/day at 20 °C).
pub const LEAF_RESPIRATION: f64 = 0.03;
/// Stem maintenance respiration coefficient.
pub const STEM_RESPIRATION: f64 = 0.015;
/// Root maintenance respiration coefficient.
pub const ROOT_RESPIRATION: f64 = 0.01;
/// Fruit maintenance respiration coefficient.
pub const FRUIT_RESPIRATION: f64 = 0.01;

// ---------------------------------------------------------------------------
// Daylength
// ---------------------------------------------------------------------------

/// Astronomical daylength in hours for a latitude (degrees) and day of year.
///
/// Returns exactly 24 when the sunset-angle factor is at or below -1
/// (midnight sun) and exactly 0 when it is at or above 1 (polar night).
pub fn daylength(latitude: f64, day_of_year: u32) -> f64 {
    let declination_deg = DECLINATION_AMPLITUDE_DEG
        * (2.0 * PI * (f64::from(day_of_year) - EQUINOX_DAY_OF_YEAR) / 365.0).sin();
    let factor = -latitude.to_radians().tan() * declination_deg.to_radians().tan();

    if factor <= -1.0 {
        24.0
    } else if factor >= 1.0 {
        0.0
    } else {
        24.0 * factor.acos() / PI
    }
}

// ---------------------------------------------------------------------------
// Thermal time
// ---------------------------------------------------------------------------

/// Daily thermal time (degree-days) from a trapezoidal temperature response.
///
/// Zero at or below `tbase` and above `tmax_th`; rises linearly up to
/// `topt - tbase` at `topt`, then falls linearly to zero at `tmax_th`.
/// Requires `tmax_th > topt`, which configuration validation enforces.
pub const fn thermal_time(tmin: f64, tmax: f64, tbase: f64, topt: f64, tmax_th: f64) -> f64 {
    let tavg = (tmin + tmax) / 2.0;
    if tavg <= tbase || tavg > tmax_th {
        0.0
    } else if tavg <= topt {
        tavg - tbase
    } else {
        let peak = topt - tbase;
        peak - (tavg - topt) * peak / (tmax_th - topt)
    }
}

// ---------------------------------------------------------------------------
// Photosynthesis
// ---------------------------------------------------------------------------

/// Canopy gross photosynthesis (g assimilate/m²/day).
///
/// Radiation × RUE, scaled by a temperature ramp (0 at `tbase`, 1 from
/// `topt`), a logarithmic CO2 effect, and Beer-Lambert light interception.
pub fn photosynthesis(
    solar_radiation: f64,
    tmax: f64,
    tmin: f64,
    rue: f64,
    tbase: f64,
    topt: f64,
    k_light: f64,
    lai: f64,
    co2: f64,
) -> f64 {
    let tavg = (tmax + tmin) / 2.0;
    let temp_effect = if tavg <= tbase {
        0.0
    } else if tavg >= topt {
        1.0
    } else {
        (tavg - tbase) / (topt - tbase)
    };
    let co2_effect = CO2_SENSITIVITY.mul_add((co2 / REFERENCE_CO2_PPM).ln(), 1.0);
    let light_interception = 1.0 - (-k_light * lai).exp();
    solar_radiation * rue * temp_effect * co2_effect * light_interception
}

// ---------------------------------------------------------------------------
// Transpiration
// ---------------------------------------------------------------------------

/// Potential transpiration (mm/day): Hargreaves ET0 times a canopy crop
/// coefficient `kc = 0.3 + 0.7·(1 − e^(−0.7·LAI))`.
pub fn transpiration(solar_radiation: f64, tmax: f64, tmin: f64, lai: f64) -> f64 {
    let tavg = (tmax + tmin) / 2.0;
    let et0 = HARGREAVES_COEFFICIENT
        * solar_radiation
        * (tmax - tmin).sqrt()
        * (tavg + HARGREAVES_TEMPERATURE_OFFSET);
    let kc = 0.7f64.mul_add(1.0 - (-0.7 * lai).exp(), 0.3);
    et0 * kc
}

/// Multiplier applied to transpiration for wind speeds away from 2 m/s,
/// clamped to `[0.5, 2.0]`.
pub fn wind_modifier(wind_speed: f64) -> f64 {
    0.1f64.mul_add(wind_speed - 2.0, 1.0).clamp(0.5, 2.0)
}

/// Potential transpiration using the configured formula.
pub fn transpiration_with(
    method: TranspirationMethod,
    solar_radiation: f64,
    tmax: f64,
    tmin: f64,
    lai: f64,
    wind_speed: f64,
) -> f64 {
    let base = transpiration(solar_radiation, tmax, tmin, lai);
    match method {
        TranspirationMethod::Hargreaves => base,
        TranspirationMethod::WindAdjusted => base * wind_modifier(wind_speed),
    }
}

// ---------------------------------------------------------------------------
// Water stress
// ---------------------------------------------------------------------------

/// Water stress factor in `[0, 1]` (0 = none).
///
/// `root_depth` must be in the same length unit as the capacities are
/// expressed per (metres for mm/m). Exactly 0 whenever effective rainfall
/// covers transpiration; saturates at 1 once the deficit reaches the
/// available water of the root zone.
pub const fn water_stress(
    field_capacity: f64,
    wilting_point: f64,
    root_depth: f64,
    rainfall: f64,
    transpiration: f64,
) -> f64 {
    let available_water = (field_capacity - wilting_point) * root_depth;
    let effective_rainfall = EFFECTIVE_RAINFALL_FRACTION * rainfall;
    let deficit = (transpiration - effective_rainfall).max(0.0);
    if deficit <= 0.0 {
        return 0.0;
    }
    (deficit / available_water).min(1.0)
}

// ---------------------------------------------------------------------------
// Maintenance respiration
// ---------------------------------------------------------------------------

/// Q10 = 2 temperature factor relative to 20 °C.
pub fn respiration_temperature_factor(tmin: f64, tmax: f64) -> f64 {
    let tavg = (tmin + tmax) / 2.0;
    2.0f64.powf((tavg - RESPIRATION_REFERENCE_TEMP) / 10.0)
}

/// Maintenance respiration of all organs (g/plant/day).
pub fn maintenance_respiration(
    leaf_biomass: f64,
    stem_biomass: f64,
    root_biomass: f64,
    fruit_biomass: f64,
    tmin: f64,
    tmax: f64,
) -> f64 {
    let temp_factor = respiration_temperature_factor(tmin, tmax);
    let base = leaf_biomass.mul_add(
        LEAF_RESPIRATION,
        stem_biomass.mul_add(
            STEM_RESPIRATION,
            root_biomass.mul_add(ROOT_RESPIRATION, fruit_biomass * FRUIT_RESPIRATION),
        ),
    );
    base * temp_factor
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;

    #[test]
    fn daylength_equator_is_twelve_hours() {
        assert_relative_eq!(daylength(0.0, 172), 12.0, epsilon = 1e-9);
        assert_relative_eq!(daylength(0.0, 355), 12.0, epsilon = 1e-9);
    }

    #[test]
    fn daylength_midnight_sun_is_exactly_24() {
        let hours = daylength(80.0, 172);
        assert_abs_diff_eq!(hours, 24.0);
    }

    #[test]
    fn daylength_polar_night_is_exactly_0() {
        let hours = daylength(80.0, 355);
        assert_abs_diff_eq!(hours, 0.0);
    }

    #[test]
    fn daylength_mid_latitude_summer_is_long() {
        let may = daylength(40.0, 121);
        assert!(may > 13.0 && may < 15.0, "got {may}");
        let december = daylength(40.0, 355);
        assert!(december < 10.0, "got {december}");
    }

    #[test]
    fn thermal_time_rising_leg() {
        assert_relative_eq!(thermal_time(15.0, 25.0, 4.0, 22.0, 35.0), 16.0);
        assert_relative_eq!(thermal_time(22.0, 22.0, 4.0, 22.0, 35.0), 18.0);
    }

    #[test]
    fn thermal_time_falling_leg() {
        // tavg = 28.5: 18 - 6.5 * 18 / 13 = 9
        assert_relative_eq!(thermal_time(25.0, 32.0, 4.0, 22.0, 35.0), 9.0, epsilon = 1e-12);
        // tavg == tmax_th falls to zero.
        assert_abs_diff_eq!(thermal_time(35.0, 35.0, 4.0, 22.0, 35.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn thermal_time_outside_range_is_zero() {
        assert_abs_diff_eq!(thermal_time(0.0, 8.0, 4.0, 22.0, 35.0), 0.0);
        assert_abs_diff_eq!(thermal_time(36.0, 40.0, 4.0, 22.0, 35.0), 0.0);
    }

    #[test]
    fn photosynthesis_temperature_ramp() {
        let full = photosynthesis(20.0, 30.0, 20.0, 2.5, 4.0, 22.0, 0.6, 3.0, 400.0);
        let half = photosynthesis(20.0, 13.0, 13.0, 2.5, 4.0, 22.0, 0.6, 3.0, 400.0);
        assert_relative_eq!(half, full * 0.5, epsilon = 1e-12);
        let cold = photosynthesis(20.0, 4.0, 0.0, 2.5, 4.0, 22.0, 0.6, 3.0, 400.0);
        assert_abs_diff_eq!(cold, 0.0);
    }

    #[test]
    fn photosynthesis_at_reference_co2_and_lai() {
        let expected = 20.0 * 2.5 * (16.0 / 18.0) * (1.0 - (-0.06f64).exp());
        let got = photosynthesis(20.0, 25.0, 15.0, 2.5, 4.0, 22.0, 0.6, 0.1, 400.0);
        assert_relative_eq!(got, expected, epsilon = 1e-12);
    }

    #[test]
    fn photosynthesis_increases_with_co2() {
        let base = photosynthesis(20.0, 25.0, 15.0, 2.5, 4.0, 22.0, 0.6, 1.0, 400.0);
        let enriched = photosynthesis(20.0, 25.0, 15.0, 2.5, 4.0, 22.0, 0.6, 1.0, 800.0);
        assert_relative_eq!(enriched / base, 1.0 + 0.11 * 2.0f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn transpiration_matches_hargreaves() {
        let et0 = 0.0023 * 20.0 * 10.0f64.sqrt() * (20.0 + 17.8);
        let kc = 0.3 + 0.7 * (1.0 - (-0.07f64).exp());
        assert_relative_eq!(transpiration(20.0, 25.0, 15.0, 0.1), et0 * kc, epsilon = 1e-12);
    }

    #[test]
    fn wind_modifier_is_neutral_at_two_and_clamped() {
        assert_relative_eq!(wind_modifier(2.0), 1.0);
        assert_relative_eq!(wind_modifier(5.0), 1.3, epsilon = 1e-12);
        assert_relative_eq!(wind_modifier(-10.0), 0.5);
        assert_relative_eq!(wind_modifier(30.0), 2.0);
    }

    #[test]
    fn transpiration_methods_agree_at_reference_wind() {
        let plain =
            transpiration_with(TranspirationMethod::Hargreaves, 20.0, 25.0, 15.0, 1.0, 2.0);
        let windy =
            transpiration_with(TranspirationMethod::WindAdjusted, 20.0, 25.0, 15.0, 1.0, 2.0);
        assert_relative_eq!(plain, windy, epsilon = 1e-12);
        let gusty =
            transpiration_with(TranspirationMethod::WindAdjusted, 20.0, 25.0, 15.0, 1.0, 5.0);
        assert!(gusty > plain);
    }

    #[test]
    fn water_stress_zero_when_rain_covers_demand() {
        assert_abs_diff_eq!(water_stress(200.0, 50.0, 0.05, 5.0, 3.4), 0.0);
        assert_abs_diff_eq!(water_stress(200.0, 50.0, 0.05, 10.0, 2.0), 0.0);
    }

    #[test]
    fn water_stress_zero_when_rain_exactly_meets_demand() {
        // 0.7 * 5 mm of rain is exactly the 3.5 mm transpired.
        assert_abs_diff_eq!(water_stress(200.0, 50.0, 0.05, 5.0, 3.5), 0.0);
        assert!(water_stress(200.0, 50.0, 0.05, 5.0, 3.6) > 0.0);
    }

    #[test]
    fn water_stress_partial_and_saturated() {
        // available = 150 * 0.1 = 15 mm; deficit = 3 mm
        assert_relative_eq!(water_stress(200.0, 50.0, 0.1, 0.0, 3.0), 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(water_stress(200.0, 50.0, 0.1, 0.0, 16.0), 1.0);
        assert_abs_diff_eq!(water_stress(200.0, 50.0, 0.1, 0.0, 40.0), 1.0);
    }

    #[test]
    fn respiration_doubles_per_ten_degrees() {
        let at_20 = maintenance_respiration(1.0, 1.0, 1.0, 1.0, 15.0, 25.0);
        let at_30 = maintenance_respiration(1.0, 1.0, 1.0, 1.0, 25.0, 35.0);
        assert_relative_eq!(at_20, 0.065, epsilon = 1e-12);
        assert_relative_eq!(at_30, 2.0 * at_20, epsilon = 1e-12);
    }
}
