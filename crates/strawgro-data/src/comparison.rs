//! Comparison of simulated results against a reference simulator's output.
//!
//! The simulation produces one record per day under its own field names
//! and units. The reference table is sparse (written at event-driven
//! intervals) and uses DSSAT column codes with per-area units. Comparison
//! therefore:
//!
//! 1. maps each result field to its DSSAT code and converts its unit,
//! 2. keeps only the simulated days whose DAP also appears in the
//!    reference (downsampling the dense daily series),
//! 3. summarizes every variable present on both sides.

use serde::{Deserialize, Serialize};
use strawgro_types::DailyResult;
use tracing::{debug, info, warn};

use crate::reference::{ReferenceError, ReferenceTable};

/// Reference percentages are skipped when the reference value is this close
/// to zero.
const ZERO_REFERENCE: f64 = 1e-10;

/// Unit conversion from a result field to its reference column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitScale {
    /// Same unit on both sides.
    Identity,
    /// g/plant to kg/ha: × plant density (plants/m²) × 10.
    GramsPerPlantToKgPerHectare,
    /// cm to m.
    CentimetresToMetres,
    /// Count per plant to count per m²: × plant density.
    PerPlantToPerSquareMetre,
}

impl UnitScale {
    /// Multiplier applied to the simulated value.
    pub const fn factor(self, plant_density: f64) -> f64 {
        match self {
            Self::Identity => 1.0,
            Self::GramsPerPlantToKgPerHectare => plant_density * 10.0,
            Self::CentimetresToMetres => 0.01,
            Self::PerPlantToPerSquareMetre => plant_density,
        }
    }
}

/// One result field and its reference counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Result field name (see [`DailyResult::value`]).
    pub field: &'static str,
    /// DSSAT column code.
    pub code: &'static str,
    /// Unit conversion from field to code.
    pub scale: UnitScale,
}

const fn mapping(field: &'static str, code: &'static str, scale: UnitScale) -> ColumnMapping {
    ColumnMapping { field, code, scale }
}

/// Day-index column shared by both tables.
pub const DAP_COLUMN: &str = "DAP";

/// Compared variables, in report order.
pub const COLUMN_MAP: [ColumnMapping; 9] = [
    mapping("leaf_area_index", "LAID", UnitScale::Identity),
    mapping("leaf_biomass", "LWAD", UnitScale::GramsPerPlantToKgPerHectare),
    mapping("stem_biomass", "SWAD", UnitScale::GramsPerPlantToKgPerHectare),
    mapping("fruit_biomass", "GWAD", UnitScale::GramsPerPlantToKgPerHectare),
    mapping("root_biomass", "RWAD", UnitScale::GramsPerPlantToKgPerHectare),
    mapping("biomass", "VWAD", UnitScale::GramsPerPlantToKgPerHectare),
    mapping("root_depth", "RDPD", UnitScale::CentimetresToMetres),
    mapping("fruit_number", "G#AD", UnitScale::PerPlantToPerSquareMetre),
    mapping("water_stress", "WSPD", UnitScale::Identity),
];

/// Summary statistics of one variable over the shared days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSummary {
    /// Result field name.
    pub field: String,
    /// DSSAT column code.
    pub code: String,
    /// Number of shared days with a reference value.
    pub count: usize,
    /// Mean of the reference values.
    pub reference_mean: f64,
    /// Mean of the converted simulated values.
    pub simulated_mean: f64,
    /// Mean of `reference - simulated`.
    pub mean_difference: f64,
    /// Mean of `|reference - simulated|`.
    pub mean_absolute_difference: f64,
    /// Largest `|reference - simulated|` on any shared day.
    pub max_absolute_difference: f64,
    /// Mean of `(reference - simulated) / reference × 100`, over days with a
    /// non-zero reference. `None` when every reference value is zero.
    pub mean_percent_difference: Option<f64>,
    /// Pearson correlation. `None` with fewer than two days or when either
    /// side is constant.
    pub correlation: Option<f64>,
    /// Smallest reference value.
    pub reference_min: f64,
    /// Largest reference value.
    pub reference_max: f64,
    /// Smallest converted simulated value.
    pub simulated_min: f64,
    /// Largest converted simulated value.
    pub simulated_max: f64,
}

/// Outcome of comparing a run against a reference table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// DAP values present in both the results and the reference.
    pub shared_days: Vec<u32>,
    /// Per-variable summaries, in [`COLUMN_MAP`] order.
    pub variables: Vec<VariableSummary>,
}

impl Comparison {
    /// Summary for a result field, if it was compared.
    pub fn variable(&self, field: &str) -> Option<&VariableSummary> {
        self.variables.iter().find(|summary| summary.field == field)
    }
}

/// Compare `results` against `reference`.
///
/// Variables whose DSSAT column is absent from the reference are skipped.
///
/// # Errors
///
/// Returns [`ReferenceError::MissingColumn`] if the reference has no `DAP`
/// column to align on.
pub fn compare(
    results: &[DailyResult],
    reference: &ReferenceTable,
    plant_density: f64,
) -> Result<Comparison, ReferenceError> {
    let reference_days = reference.column(DAP_COLUMN)?;

    // (reference row, simulated day) for every reference row whose DAP the
    // run reached.
    let aligned: Vec<(usize, &DailyResult)> = reference_days
        .iter()
        .enumerate()
        .filter_map(|(row, dap)| {
            let dap = (*dap)?;
            results
                .iter()
                .find(|result| (f64::from(result.dap) - dap).abs() < 0.5)
                .map(|result| (row, result))
        })
        .collect();

    if aligned.is_empty() {
        warn!(
            reference_rows = reference.len(),
            simulated_days = results.len(),
            "No shared DAP between results and reference"
        );
        return Ok(Comparison::default());
    }

    let shared_days = aligned.iter().map(|(_, result)| result.dap).collect();

    let mut variables = Vec::new();
    for map in &COLUMN_MAP {
        if !reference.has_column(map.code) {
            debug!(code = map.code, "Reference has no column, skipping");
            continue;
        }
        let factor = map.scale.factor(plant_density);
        let pairs: Vec<(f64, f64)> = aligned
            .iter()
            .filter_map(|(row, result)| {
                let reference_value = reference.value(*row, map.code)?;
                let simulated = result.value(map.field)? * factor;
                Some((reference_value, simulated))
            })
            .collect();
        if let Some(summary) = summarize(map, &pairs) {
            variables.push(summary);
        }
    }

    info!(
        shared_days = aligned.len(),
        variables = variables.len(),
        "Reference comparison complete"
    );

    Ok(Comparison {
        shared_days,
        variables,
    })
}

fn count(n: usize) -> f64 {
    u32::try_from(n).map_or(f64::from(u32::MAX), f64::from)
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0_usize), |(sum, n), value| (sum + value, n + 1));
    (n > 0).then(|| sum / count(n))
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), value| {
        (lo.min(value), hi.max(value))
    })
}

/// Pearson correlation coefficient of paired samples.
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let mean_x = mean(pairs.iter().map(|(x, _)| *x))?;
    let mean_y = mean(pairs.iter().map(|(_, y)| *y))?;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let denominator = (sxx * syy).sqrt();
    (denominator > 0.0).then(|| sxy / denominator)
}

fn summarize(map: &ColumnMapping, pairs: &[(f64, f64)]) -> Option<VariableSummary> {
    let reference_mean = mean(pairs.iter().map(|(r, _)| *r))?;
    let simulated_mean = mean(pairs.iter().map(|(_, s)| *s))?;
    let (reference_min, reference_max) = min_max(pairs.iter().map(|(r, _)| *r));
    let (simulated_min, simulated_max) = min_max(pairs.iter().map(|(_, s)| *s));

    Some(VariableSummary {
        field: map.field.to_owned(),
        code: map.code.to_owned(),
        count: pairs.len(),
        reference_mean,
        simulated_mean,
        mean_difference: reference_mean - simulated_mean,
        mean_absolute_difference: mean(pairs.iter().map(|(r, s)| (r - s).abs()))?,
        max_absolute_difference: pairs
            .iter()
            .map(|(r, s)| (r - s).abs())
            .fold(0.0, f64::max),
        mean_percent_difference: mean(
            pairs
                .iter()
                .filter(|(r, _)| r.abs() > ZERO_REFERENCE)
                .map(|(r, s)| (r - s) / r * 100.0),
        ),
        correlation: pearson(pairs),
        reference_min,
        reference_max,
        simulated_min,
        simulated_max,
    })
}
