//! Weather-record validation.
//!
//! A record is checked in full before the day that consumes it touches any
//! state. Errors carry the 1-based day index so a failing run points at the
//! offending line of the weather sequence.

use strawgro_types::WeatherRecord;

/// A weather record the engine cannot consume.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    /// A field is NaN or infinite.
    #[error("day {day}: `{field}` is not a finite number ({value})")]
    NonFinite {
        /// 1-based day index within the run.
        day: u32,
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A field lies outside its physical range.
    #[error("day {day}: `{field}` = {value} {reason}")]
    OutOfRange {
        /// 1-based day index within the run.
        day: u32,
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
        /// Which bound was violated.
        reason: &'static str,
    },

    /// Maximum temperature below minimum temperature.
    #[error("day {day}: tmax ({tmax}) is below tmin ({tmin})")]
    InvertedTemperatures {
        /// 1-based day index within the run.
        day: u32,
        /// Reported maximum temperature.
        tmax: f64,
        /// Reported minimum temperature.
        tmin: f64,
    },
}

/// Check that `record` is usable as day `day` of a run.
///
/// # Errors
///
/// Returns [`InputError`] for the first problem found.
pub fn validate_weather(record: &WeatherRecord, day: u32) -> Result<(), InputError> {
    for (field, value) in record.numeric_fields() {
        if !value.is_finite() {
            return Err(InputError::NonFinite { day, field, value });
        }
    }

    if record.tmax < record.tmin {
        return Err(InputError::InvertedTemperatures {
            day,
            tmax: record.tmax,
            tmin: record.tmin,
        });
    }

    let non_negative = [
        ("solar_radiation", record.solar_radiation),
        ("rainfall", record.rainfall),
        ("wind_speed", record.wind_speed),
    ];
    for (field, value) in non_negative {
        if value < 0.0 {
            return Err(InputError::OutOfRange {
                day,
                field,
                value,
                reason: "must not be negative",
            });
        }
    }

    if !(0.0..=100.0).contains(&record.rh) {
        return Err(InputError::OutOfRange {
            day,
            field: "rh",
            value: record.rh,
            reason: "must lie within 0..=100 percent",
        });
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn record() -> WeatherRecord {
        WeatherRecord {
            date: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
            tmax: 25.0,
            tmin: 15.0,
            solar_radiation: 20.0,
            rainfall: 5.0,
            rh: 70.0,
            wind_speed: 2.0,
        }
    }

    #[test]
    fn accepts_ordinary_day() {
        assert!(validate_weather(&record(), 1).is_ok());
    }

    #[test]
    fn accepts_equal_temperatures() {
        let mut rec = record();
        rec.tmin = 25.0;
        assert!(validate_weather(&rec, 1).is_ok());
    }

    #[test]
    fn rejects_nan_with_field_and_day() {
        let mut rec = record();
        rec.solar_radiation = f64::NAN;
        let err = validate_weather(&rec, 7).unwrap_err();
        assert!(matches!(
            err,
            InputError::NonFinite { day: 7, field: "solar_radiation", .. }
        ));
    }

    #[test]
    fn rejects_infinite_temperature() {
        let mut rec = record();
        rec.tmax = f64::INFINITY;
        assert!(matches!(
            validate_weather(&rec, 1).unwrap_err(),
            InputError::NonFinite { field: "tmax", .. }
        ));
    }

    #[test]
    fn rejects_inverted_temperatures() {
        let mut rec = record();
        rec.tmax = 10.0;
        let err = validate_weather(&rec, 3).unwrap_err();
        assert!(matches!(err, InputError::InvertedTemperatures { day: 3, .. }));
        assert!(err.to_string().contains("day 3"));
    }

    #[test]
    fn rejects_negative_rainfall() {
        let mut rec = record();
        rec.rainfall = -1.0;
        assert!(matches!(
            validate_weather(&rec, 1).unwrap_err(),
            InputError::OutOfRange { field: "rainfall", .. }
        ));
    }

    #[test]
    fn rejects_humidity_above_saturation() {
        let mut rec = record();
        rec.rh = 104.0;
        assert!(matches!(
            validate_weather(&rec, 1).unwrap_err(),
            InputError::OutOfRange { field: "rh", .. }
        ));
    }
}
