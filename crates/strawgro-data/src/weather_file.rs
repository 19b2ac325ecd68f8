//! Weather input: DSSAT `.WTH` text files and JSON record arrays.
//!
//! A `.WTH` file carries station metadata followed by a daily table whose
//! header line starts with `@DATE`. Columns are located by name, so their
//! order does not matter. `TMAX`, `TMIN` and `SRAD` are required; `RAIN`,
//! `RHUM` and `WIND` fall back to 0 mm, 70 % and 2 m/s when the column is
//! absent or the cell holds the DSSAT missing marker.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use strawgro_types::WeatherRecord;
use tracing::debug;

/// DSSAT marker for a missing value.
const MISSING: f64 = -99.0;

/// Default rainfall when the file has no usable `RAIN` value (mm).
const DEFAULT_RAINFALL: f64 = 0.0;

/// Default relative humidity when the file has no usable `RHUM` value (%).
const DEFAULT_RH: f64 = 70.0;

/// Default wind speed when the file has no usable `WIND` value (m/s).
const DEFAULT_WIND_SPEED: f64 = 2.0;

/// Errors that can occur while reading weather input.
#[derive(Debug, thiserror::Error)]
pub enum WeatherFileError {
    /// Failed to read the weather file from disk.
    #[error("failed to read weather file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse a JSON weather array.
    #[error("failed to parse weather JSON: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// No `@DATE` header line was found.
    #[error("no `@DATE` header line in weather file")]
    MissingHeader,

    /// A required column is absent from the header.
    #[error("weather file has no `{column}` column")]
    MissingColumn {
        /// Name of the required column.
        column: &'static str,
    },

    /// A date code could not be decoded.
    #[error("line {line}: invalid DSSAT date `{code}`")]
    InvalidDate {
        /// 1-based line number in the file.
        line: usize,
        /// The offending date code.
        code: String,
    },

    /// A required cell is absent, missing-marked, or not a number.
    #[error("line {line}: invalid `{column}` value `{value}`")]
    InvalidValue {
        /// 1-based line number in the file.
        line: usize,
        /// Column name.
        column: &'static str,
        /// Raw cell text (empty when the row is too short).
        value: String,
    },
}

/// Decode a DSSAT date code: `YYDDD` (year 2000 + YY) or `YYYYDDD`.
pub fn decode_dssat_date(code: &str) -> Option<NaiveDate> {
    if !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (year, ordinal) = match code.len() {
        5 => (2000 + code.get(..2)?.parse::<i32>().ok()?, code.get(2..)?),
        7 => (code.get(..4)?.parse::<i32>().ok()?, code.get(4..)?),
        _ => return None,
    };
    NaiveDate::from_yo_opt(year, ordinal.parse().ok()?)
}

fn is_missing(value: f64) -> bool {
    (value - MISSING).abs() < 1e-6
}

/// Parse the daily table of a `.WTH` file.
///
/// Blank lines and lines starting with `*` or `!` are skipped.
///
/// # Errors
///
/// Returns [`WeatherFileError`] for a missing header or required column, an
/// undecodable date, or an unusable required value.
pub fn parse_wth(text: &str) -> Result<Vec<WeatherRecord>, WeatherFileError> {
    let mut lines = text.lines().enumerate();

    let header = lines
        .by_ref()
        .find(|(_, line)| line.starts_with("@DATE"))
        .map(|(_, line)| line)
        .ok_or(WeatherFileError::MissingHeader)?;
    let columns: BTreeMap<&str, usize> = header
        .split_whitespace()
        .enumerate()
        .map(|(index, name)| (name.trim_start_matches('@'), index))
        .collect();

    let column = |name: &'static str| {
        columns
            .get(name)
            .copied()
            .ok_or(WeatherFileError::MissingColumn { column: name })
    };
    let tmax_col = column("TMAX")?;
    let tmin_col = column("TMIN")?;
    let srad_col = column("SRAD")?;
    let rain_col = columns.get("RAIN").copied();
    let rhum_col = columns.get("RHUM").copied();
    let wind_col = columns.get("WIND").copied();

    let mut records = Vec::new();
    for (index, line) in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('*') || trimmed.starts_with('!') {
            continue;
        }
        let line_number = index + 1;
        let cells: Vec<&str> = trimmed.split_whitespace().collect();

        let code = cells.first().copied().unwrap_or_default();
        let date = decode_dssat_date(code).ok_or_else(|| WeatherFileError::InvalidDate {
            line: line_number,
            code: code.to_owned(),
        })?;

        let required = |name: &'static str, col: usize| {
            let raw = cells.get(col).copied().unwrap_or_default();
            raw.parse::<f64>()
                .ok()
                .filter(|value| !is_missing(*value))
                .ok_or_else(|| WeatherFileError::InvalidValue {
                    line: line_number,
                    column: name,
                    value: raw.to_owned(),
                })
        };
        let optional = |col: Option<usize>, default: f64| {
            col.and_then(|col| cells.get(col))
                .and_then(|raw| raw.parse::<f64>().ok())
                .filter(|value| !is_missing(*value))
                .unwrap_or(default)
        };

        records.push(WeatherRecord {
            date,
            tmax: required("TMAX", tmax_col)?,
            tmin: required("TMIN", tmin_col)?,
            solar_radiation: required("SRAD", srad_col)?,
            rainfall: optional(rain_col, DEFAULT_RAINFALL),
            rh: optional(rhum_col, DEFAULT_RH),
            wind_speed: optional(wind_col, DEFAULT_WIND_SPEED),
        });
    }

    debug!(records = records.len(), "Parsed WTH weather table");
    Ok(records)
}

/// Read and parse a `.WTH` file.
///
/// # Errors
///
/// Returns [`WeatherFileError::Io`] if the file cannot be read, or any
/// error of [`parse_wth`].
pub fn load_wth(path: &Path) -> Result<Vec<WeatherRecord>, WeatherFileError> {
    let text = std::fs::read_to_string(path)?;
    parse_wth(&text)
}

/// Parse a JSON array of weather records with ISO dates.
///
/// # Errors
///
/// Returns [`WeatherFileError::Json`] if the text is not a valid array of
/// complete records.
pub fn parse_json(text: &str) -> Result<Vec<WeatherRecord>, WeatherFileError> {
    let records: Vec<WeatherRecord> = serde_json::from_str(text)?;
    Ok(records)
}

/// Read and parse a JSON weather file.
///
/// # Errors
///
/// Returns [`WeatherFileError::Io`] if the file cannot be read, or
/// [`WeatherFileError::Json`] if it cannot be parsed.
pub fn load_json(path: &Path) -> Result<Vec<WeatherRecord>, WeatherFileError> {
    let text = std::fs::read_to_string(path)?;
    parse_json(&text)
}

/// The records from the first one dated on or after `planting_date` to the
/// end of the sequence.
pub fn records_from(records: &[WeatherRecord], planting_date: NaiveDate) -> &[WeatherRecord] {
    let start = records
        .iter()
        .position(|record| record.date >= planting_date)
        .unwrap_or(records.len());
    records.get(start..).unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const SAMPLE: &str = "\
*WEATHER DATA : Gainesville, FL

@ INSI      LAT     LONG  ELEV   TAV   AMP REFHT WNDHT
  UFGA   29.630  -82.370    10  20.9  13.1   2.0   2.0

@DATE  SRAD  TMAX  TMIN  RAIN  RHUM  WIND
23121  20.1  25.0  15.0   5.0  68.0   1.8
23122  18.4  26.1  14.2   0.0 -99.0   2.4

! trailing comment
23123  21.0  27.3  16.0 -99.0  72.0  -99
";

    #[test]
    fn decodes_short_and_long_dates() {
        assert_eq!(
            decode_dssat_date("23121"),
            NaiveDate::from_ymd_opt(2023, 5, 1)
        );
        assert_eq!(
            decode_dssat_date("2023121"),
            NaiveDate::from_ymd_opt(2023, 5, 1)
        );
        assert_eq!(decode_dssat_date("24366"), NaiveDate::from_ymd_opt(2024, 12, 31));
        assert_eq!(decode_dssat_date("23366"), None);
        assert_eq!(decode_dssat_date("2312"), None);
        assert_eq!(decode_dssat_date("23a21"), None);
    }

    #[test]
    fn parses_table_and_applies_defaults() {
        let records = parse_wth(SAMPLE).unwrap();
        assert_eq!(records.len(), 3);

        let first = &records[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2023, 5, 1).unwrap());
        assert_relative_eq!(first.solar_radiation, 20.1);
        assert_relative_eq!(first.tmax, 25.0);
        assert_relative_eq!(first.tmin, 15.0);
        assert_relative_eq!(first.rainfall, 5.0);
        assert_relative_eq!(first.rh, 68.0);
        assert_relative_eq!(first.wind_speed, 1.8);

        assert_relative_eq!(records[1].rh, 70.0);
        assert_relative_eq!(records[2].rainfall, 0.0);
        assert_relative_eq!(records[2].wind_speed, 2.0);
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let text = "@DATE  SRAD  TMAX  TMIN\n23121  20.0  25.0  15.0\n";
        let records = parse_wth(text).unwrap();
        assert_relative_eq!(records[0].rainfall, 0.0);
        assert_relative_eq!(records[0].rh, 70.0);
        assert_relative_eq!(records[0].wind_speed, 2.0);
    }

    #[test]
    fn missing_header_is_an_error() {
        assert!(matches!(
            parse_wth("23121 20.0 25.0 15.0\n"),
            Err(WeatherFileError::MissingHeader)
        ));
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let text = "@DATE  TMAX  TMIN\n23121  25.0  15.0\n";
        assert!(matches!(
            parse_wth(text),
            Err(WeatherFileError::MissingColumn { column: "SRAD" })
        ));
    }

    #[test]
    fn missing_required_value_names_the_line() {
        let text = "@DATE  SRAD  TMAX  TMIN\n23121  20.0  -99  15.0\n";
        let err = parse_wth(text).unwrap_err();
        assert!(matches!(
            err,
            WeatherFileError::InvalidValue { line: 2, column: "TMAX", .. }
        ));
    }

    #[test]
    fn bad_date_code_is_an_error() {
        let text = "@DATE  SRAD  TMAX  TMIN\nxx121  20.0  25.0  15.0\n";
        assert!(matches!(
            parse_wth(text),
            Err(WeatherFileError::InvalidDate { line: 2, .. })
        ));
    }

    #[test]
    fn parses_json_array() {
        let json = r#"[{"date":"2023-05-01","tmax":25.0,"tmin":15.0,
            "solar_radiation":20.0,"rainfall":5.0,"rh":70.0,"wind_speed":2.0}]"#;
        let records = parse_json(json).unwrap();
        assert_eq!(records.len(), 1);
        assert!(parse_json("[{\"date\":\"2023-05-01\"}]").is_err());
    }

    #[test]
    fn selects_records_from_planting_date() {
        let records = parse_wth(SAMPLE).unwrap();
        let planting = NaiveDate::from_ymd_opt(2023, 5, 2).unwrap();
        let selected = records_from(&records, planting);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].date, planting);

        let late = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        assert!(records_from(&records, late).is_empty());
    }
}
