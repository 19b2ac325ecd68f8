//! Experiment batches: many independent runs over one weather sequence.
//!
//! Each [`Experiment`] owns its own context and, once started, its own
//! [`Simulation`] and plant state, so runs share nothing and can execute on
//! the `rayon` thread pool. Outcomes come back in input order regardless of
//! which run finishes first. Every run carries the identifier of the batch
//! it was expanded from, so outcomes can be traced back to their
//! experiment file.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strawgro_types::{DailyResult, WeatherRecord};
use tracing::info;

use crate::runner::{Simulation, SimulationError};
use crate::step::SimulationContext;

/// One named run within a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    /// Identifier of the batch this run belongs to.
    pub batch_id: String,
    /// Unique identifier of this run (UUID v7).
    pub experiment_id: String,
    /// Human-readable name.
    pub name: String,
    /// Parameters of the run.
    pub context: SimulationContext,
}

impl Experiment {
    /// Create an experiment in batch `batch_id` with a fresh identifier.
    pub fn new(batch_id: &str, name: &str, context: SimulationContext) -> Self {
        Self {
            batch_id: batch_id.to_owned(),
            experiment_id: uuid::Uuid::now_v7().to_string(),
            name: name.to_owned(),
            context,
        }
    }
}

/// Result of one experiment in a batch.
#[derive(Debug)]
pub struct ExperimentOutcome {
    /// Identifier of the batch the experiment belongs to.
    pub batch_id: String,
    /// Identifier of the experiment that produced this outcome.
    pub experiment_id: String,
    /// Name of the experiment.
    pub name: String,
    /// Full result sequence, or the error that stopped the run.
    pub results: Result<Vec<DailyResult>, SimulationError>,
}

impl ExperimentOutcome {
    /// Result of the last simulated day, if the run succeeded and simulated
    /// at least one day.
    pub fn final_day(&self) -> Option<&DailyResult> {
        self.results.as_ref().ok().and_then(|results| results.last())
    }

    /// Serializable digest of this outcome: the last day, or the error.
    pub fn summary(&self) -> ExperimentSummary {
        let (days, error) = match &self.results {
            Ok(results) => (results.len(), None),
            Err(err) => (0, Some(err.to_string())),
        };
        ExperimentSummary {
            batch_id: self.batch_id.clone(),
            experiment_id: self.experiment_id.clone(),
            name: self.name.clone(),
            days,
            final_day: self.final_day().cloned(),
            error,
        }
    }
}

/// Digest of one experiment, written next to the main results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentSummary {
    /// Identifier of the batch.
    pub batch_id: String,
    /// Identifier of the experiment.
    pub experiment_id: String,
    /// Name of the experiment.
    pub name: String,
    /// Number of simulated days (0 on failure).
    pub days: usize,
    /// Result of the last simulated day.
    pub final_day: Option<DailyResult>,
    /// Error that stopped the run, if any.
    pub error: Option<String>,
}

/// Run every experiment over `weather` in parallel.
///
/// A failing experiment does not affect the others; its error is reported
/// in its own outcome.
pub fn run_batch(experiments: &[Experiment], weather: &[WeatherRecord]) -> Vec<ExperimentOutcome> {
    info!(
        experiments = experiments.len(),
        days = weather.len(),
        "Experiment batch starting"
    );

    let outcomes: Vec<ExperimentOutcome> = experiments
        .par_iter()
        .map(|experiment| {
            let results = Simulation::new(experiment.context.clone())
                .map_err(SimulationError::from)
                .and_then(|mut simulation| simulation.simulate_growth(weather));
            ExperimentOutcome {
                batch_id: experiment.batch_id.clone(),
                experiment_id: experiment.experiment_id.clone(),
                name: experiment.name.clone(),
                results,
            }
        })
        .collect();

    let failed = outcomes.iter().filter(|o| o.results.is_err()).count();
    info!(
        experiments = outcomes.len(),
        failed, "Experiment batch finished"
    );

    outcomes
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::{Days, NaiveDate};
    use strawgro_types::{CultivarParams, ModelParameters, SoilProperties};

    use super::*;

    fn context(latitude: f64) -> SimulationContext {
        SimulationContext {
            latitude,
            planting_date: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
            soil: SoilProperties {
                max_root_depth: 50.0,
                field_capacity: 200.0,
                wilting_point: 50.0,
            },
            cultivar: CultivarParams {
                name: "Albion".to_owned(),
                tbase: 4.0,
                topt: 22.0,
                tmax_th: 35.0,
                rue: 2.5,
                k_light: 0.6,
                sla: 0.02,
                potential_fruits_per_crown: 10.0,
            },
            model: ModelParameters::default(),
        }
    }

    fn weather(days: u64) -> Vec<WeatherRecord> {
        let start = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
        (0..days)
            .map(|offset| WeatherRecord {
                date: start.checked_add_days(Days::new(offset)).unwrap(),
                tmax: 25.0,
                tmin: 15.0,
                solar_radiation: 20.0,
                rainfall: 5.0,
                rh: 70.0,
                wind_speed: 2.0,
            })
            .collect()
    }

    #[test]
    fn batch_preserves_order_and_ids() {
        let experiments = vec![
            Experiment::new("batch", "south", context(30.0)),
            Experiment::new("batch", "north", context(50.0)),
            Experiment::new("batch", "equator", context(0.0)),
        ];
        let outcomes = run_batch(&experiments, &weather(5));
        assert_eq!(outcomes.len(), 3);
        for (experiment, outcome) in experiments.iter().zip(&outcomes) {
            assert_eq!(experiment.experiment_id, outcome.experiment_id);
            assert_eq!(outcome.batch_id, "batch");
            assert_eq!(experiment.name, outcome.name);
            assert_eq!(outcome.results.as_ref().unwrap().len(), 5);
        }
    }

    #[test]
    fn batch_matches_sequential_runs() {
        let experiments = vec![
            Experiment::new("batch", "a", context(35.0)),
            Experiment::new("batch", "b", context(45.0)),
        ];
        let days = weather(12);
        let outcomes = run_batch(&experiments, &days);
        for (experiment, outcome) in experiments.iter().zip(&outcomes) {
            let sequential = crate::runner::run(experiment.context.clone(), &days).unwrap();
            assert_eq!(outcome.results.as_ref().unwrap(), &sequential);
        }
    }

    #[test]
    fn failing_experiment_does_not_affect_others() {
        let mut broken = context(40.0);
        broken.cultivar.tmax_th = broken.cultivar.topt;
        let experiments = vec![
            Experiment::new("batch", "ok", context(40.0)),
            Experiment::new("batch", "broken", broken),
        ];
        let outcomes = run_batch(&experiments, &weather(3));
        assert!(outcomes[0].results.is_ok());
        assert!(matches!(
            outcomes[1].results,
            Err(SimulationError::Config { .. })
        ));
        assert!(outcomes[0].final_day().is_some());
        assert!(outcomes[1].final_day().is_none());
    }

    #[test]
    fn summaries_carry_batch_and_error() {
        let mut broken = context(40.0);
        broken.cultivar.sla = 0.0;
        let experiments = vec![
            Experiment::new("sweep-1", "ok", context(40.0)),
            Experiment::new("sweep-1", "broken", broken),
        ];
        let outcomes = run_batch(&experiments, &weather(4));

        let ok = outcomes[0].summary();
        assert_eq!(ok.batch_id, "sweep-1");
        assert_eq!(ok.days, 4);
        assert_eq!(ok.final_day.map(|day| day.dap), Some(4));
        assert!(ok.error.is_none());

        let failed = outcomes[1].summary();
        assert_eq!(failed.days, 0);
        assert!(failed.final_day.is_none());
        assert!(failed.error.unwrap().contains("cultivar.sla"));
    }

    #[test]
    fn experiments_get_unique_ids() {
        let a = Experiment::new("batch", "a", context(40.0));
        let b = Experiment::new("batch", "b", context(40.0));
        assert_ne!(a.experiment_id, b.experiment_id);
    }
}
