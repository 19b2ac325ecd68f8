//! Simulation driver.
//!
//! [`Simulation`] owns one run: its immutable [`SimulationContext`], the
//! crop clock, the current [`PlantState`], and the accumulated results. It
//! wraps the pure [`step`] function and adds chronology checks and result
//! bookkeeping around it.
//!
//! A day that fails (bad record, gap in the dates) leaves the state, the
//! clock, and the results exactly as they were before the call.
//!
//! [`step`]: crate::step::step

use strawgro_types::{DailyResult, PlantState, WeatherRecord};
use tracing::{info, warn};

use crate::clock::{ClockError, CropClock};
use crate::config::ConfigError;
use crate::input::InputError;
use crate::step::{self, SimulationContext};

/// Errors that can occur during a simulation run.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The run parameters are invalid.
    #[error("configuration error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// A weather record is malformed.
    #[error("input error: {source}")]
    Input {
        /// The underlying input error.
        #[from]
        source: InputError,
    },

    /// The weather sequence breaks chronology.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// One simulation run over a dense daily weather sequence.
#[derive(Debug, Clone)]
pub struct Simulation {
    context: SimulationContext,
    clock: CropClock,
    state: PlantState,
    results: Vec<DailyResult>,
}

impl Simulation {
    /// Create a run at planting conditions.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] if the context is invalid.
    pub fn new(context: SimulationContext) -> Result<Self, ConfigError> {
        context.validate()?;
        let clock = CropClock::new(context.planting_date);
        let state = context.planting_state();
        Ok(Self {
            context,
            clock,
            state,
            results: Vec::new(),
        })
    }

    /// Simulate the next day, append its result, and return a copy of it.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Clock`] if `weather` is not the next date
    /// in sequence, or [`SimulationError::Input`] if it is malformed.
    pub fn simulate_day(
        &mut self,
        weather: &WeatherRecord,
    ) -> Result<DailyResult, SimulationError> {
        let day = self.clock.peek(weather.date)?;
        let (state, result) = step::step(&self.context, &self.state, weather, day)?;

        self.clock.advance(weather.date)?;
        self.state = state;
        self.results.push(result.clone());
        Ok(result)
    }

    /// Clear the accumulated results, then simulate every record in order.
    ///
    /// The plant state and the clock carry over, so a second call continues
    /// the season from the day after the last one simulated; its first
    /// record must be that day. Use [`Simulation::reset`] or a fresh
    /// [`Simulation`] to start again from planting.
    ///
    /// Returns the results of this call. On error the run stops at the
    /// failing day; the days before it remain in [`Simulation::results`].
    ///
    /// # Errors
    ///
    /// Returns the first [`SimulationError`] encountered.
    pub fn simulate_growth(
        &mut self,
        weather: &[WeatherRecord],
    ) -> Result<Vec<DailyResult>, SimulationError> {
        self.results.clear();

        info!(
            cultivar = %self.context.cultivar.name,
            latitude = self.context.latitude,
            planting_date = %self.context.planting_date,
            from_day = self.clock.day().saturating_add(1),
            days = weather.len(),
            "Simulation starting"
        );

        for record in weather {
            if let Err(err) = self.simulate_day(record) {
                warn!(
                    completed_days = self.clock.day(),
                    date = %record.date,
                    error = %err,
                    "Simulation aborted"
                );
                return Err(err);
            }
        }

        info!(
            days = self.clock.day(),
            stage = %self.state.stage,
            thermal_time = self.state.thermal_time,
            biomass = self.state.biomass,
            fruit_number = self.state.fruit_number,
            "Simulation ended"
        );

        Ok(self.results.clone())
    }

    /// Return to planting conditions, discarding all results.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.state = self.context.planting_state();
        self.results.clear();
    }

    /// Current plant state.
    pub const fn state(&self) -> &PlantState {
        &self.state
    }

    /// Results accumulated so far, in day order.
    pub fn results(&self) -> &[DailyResult] {
        &self.results
    }

    /// Parameters of this run.
    pub const fn context(&self) -> &SimulationContext {
        &self.context
    }

    /// Days after planting of the last simulated day.
    pub const fn day(&self) -> u32 {
        self.clock.day()
    }
}

/// Validate `context` and run it over `weather` in one call.
///
/// # Errors
///
/// Returns [`SimulationError::Config`] for invalid parameters, or the first
/// per-day error.
pub fn run(
    context: SimulationContext,
    weather: &[WeatherRecord],
) -> Result<Vec<DailyResult>, SimulationError> {
    let mut simulation = Simulation::new(context)?;
    simulation.simulate_growth(weather)
}
