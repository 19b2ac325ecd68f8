//! Phenological state machine driven by accumulated thermal time.
//!
//! Each day the day's thermal time is added to the running total, then only
//! the immediately following stage's threshold is checked. A day advances
//! at most one stage even if several thresholds were crossed, and
//! [`Stage::Senescence`] never transitions.

use strawgro_types::Stage;

/// Outcome of one day of phenological development.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhenologyUpdate {
    /// Stage at the end of the day.
    pub stage: Stage,
    /// Accumulated thermal time at the end of the day (degree-days).
    pub thermal_time: f64,
    /// Stage that was left today, if a transition happened.
    pub left: Option<Stage>,
}

impl PhenologyUpdate {
    /// Whether the plant entered a new stage today.
    pub const fn transitioned(&self) -> bool {
        self.left.is_some()
    }
}

/// Accumulate today's thermal time and advance at most one stage.
///
/// Negative daily thermal time is treated as zero so the running total
/// never decreases.
pub const fn advance_phenology(stage: Stage, accumulated: f64, today: f64) -> PhenologyUpdate {
    let thermal_time = accumulated + today.max(0.0);

    match stage.next() {
        Some(next) if thermal_time >= next.threshold() => PhenologyUpdate {
            stage: next,
            thermal_time,
            left: Some(stage),
        },
        _ => PhenologyUpdate {
            stage,
            thermal_time,
            left: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn stays_below_next_threshold() {
        let update = advance_phenology(Stage::Germination, 32.0, 16.0);
        assert_eq!(update.stage, Stage::Germination);
        assert_relative_eq!(update.thermal_time, 48.0);
        assert!(!update.transitioned());
    }

    #[test]
    fn advances_when_threshold_met_exactly() {
        let update = advance_phenology(Stage::Germination, 40.0, 10.0);
        assert_eq!(update.stage, Stage::Emergence);
        assert_eq!(update.left, Some(Stage::Germination));
    }

    #[test]
    fn never_skips_more_than_one_stage() {
        // 650 degree-days crosses Emergence through Flowering thresholds at once.
        let update = advance_phenology(Stage::Germination, 0.0, 650.0);
        assert_eq!(update.stage, Stage::Emergence);

        let update = advance_phenology(update.stage, update.thermal_time, 0.0);
        assert_eq!(update.stage, Stage::Juvenile);
    }

    #[test]
    fn catches_up_one_stage_per_day() {
        let mut stage = Stage::Germination;
        let mut total = 0.0;
        let mut days = 0;
        while !stage.is_terminal() {
            let update = advance_phenology(stage, total, if days == 0 { 2000.0 } else { 0.0 });
            stage = update.stage;
            total = update.thermal_time;
            days += 1;
        }
        assert_eq!(days, 9);
    }

    #[test]
    fn senescence_is_terminal() {
        let update = advance_phenology(Stage::Senescence, 1600.0, 25.0);
        assert_eq!(update.stage, Stage::Senescence);
        assert!(!update.transitioned());
        assert_relative_eq!(update.thermal_time, 1625.0);
    }

    #[test]
    fn negative_thermal_time_does_not_decrease_total() {
        let update = advance_phenology(Stage::Juvenile, 150.0, -3.0);
        assert_relative_eq!(update.thermal_time, 150.0);
    }
}
