//! Evolutionary population search.
//!
//! Maintains a population of candidate schedules, recombining and mutating
//! them under the shared weighted objective. Slower than the constructive
//! strategies but explores trade-offs they cannot, which pays off on
//! tightly constrained or under-staffed problems.

mod config;
mod runner;

pub use config::GeneticConfig;

use crate::control::ExecControl;
use crate::error::{EngineError, Result};
use crate::eval;
use crate::model::{ScheduleRequest, ScheduleResult, Termination};
use crate::param::{validate_against, ParamSet, ParamSpec, ValidationReport};
use crate::strategy::{Complexity, Strategy, StrategyType};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Genetic scheduling strategy.
pub struct GeneticStrategy {
    control: ExecControl,
    config: Mutex<GeneticConfig>,
}

impl GeneticStrategy {
    /// Creates an instance with default parameters.
    pub fn new() -> Self {
        Self {
            control: ExecControl::new(),
            config: Mutex::new(GeneticConfig::default()),
        }
    }
}

impl Default for GeneticStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for GeneticStrategy {
    fn kind(&self) -> StrategyType {
        StrategyType::Genetic
    }

    fn name(&self) -> &'static str {
        "Genetic Search"
    }

    fn description(&self) -> &'static str {
        "Evolves a population of candidate schedules through selection, \
         crossover, and mutation, scored by the weighted objective. Suited \
         to tightly constrained problems where constructive strategies \
         leave too much demand unmet."
    }

    fn param_specs(&self) -> Vec<ParamSpec> {
        config::param_specs()
    }

    fn control(&self) -> &ExecControl {
        &self.control
    }

    fn initialize(&self, params: &ParamSet) -> Result<()> {
        let report = self.validate_parameters(params);
        if !report.valid {
            return Err(EngineError::Validation(
                report.error.unwrap_or_else(|| "invalid parameters".into()),
            ));
        }
        *self.config.lock().expect("config lock poisoned") = GeneticConfig::from_params(params);
        Ok(())
    }

    fn validate_parameters(&self, params: &ParamSet) -> ValidationReport {
        validate_against(&config::param_specs(), params)
    }

    fn generate_schedule(&self, request: &ScheduleRequest) -> Result<ScheduleResult> {
        self.control.begin();
        debug!(
            strategy = %self.kind(),
            employees = request.employees.len(),
            shifts = request.shifts.len(),
            horizon_days = request.horizon_days,
            "run started"
        );
        if let Err(message) = eval::validate_request(request) {
            self.control.finish(Termination::Error);
            warn!(strategy = %self.kind(), %message, "request rejected");
            return Err(EngineError::execution("request validation", message));
        }
        let config = self.config.lock().expect("config lock poisoned").clone();
        let result = runner::run(request, &config, &self.control);
        self.control.finish(result.termination);
        match result.termination {
            Termination::TimeLimitExceeded => warn!(
                strategy = %self.kind(),
                elapsed_ms = result.stats.elapsed.as_millis() as u64,
                "time limit exceeded; returning best-so-far"
            ),
            Termination::Stopped => info!(strategy = %self.kind(), "run stopped on request"),
            _ => {}
        }
        info!(
            strategy = %self.kind(),
            assignments = result.assignments.len(),
            open_seats = result.open_seats(),
            iterations = result.stats.iterations,
            "run finished"
        );
        Ok(result)
    }

    fn estimate_execution_time(&self, request: &ScheduleRequest) -> Duration {
        let config = self.config.lock().expect("config lock poisoned").clone();
        let per_generation = config.population_size as u64 * request.total_slots().max(1);
        Duration::from_micros(config.max_generations.saturating_mul(per_generation) / 10)
            .min(config.time_limit)
    }

    fn is_applicable(&self, employees: usize, shifts: usize, horizon_days: u32) -> bool {
        // Needs genetic diversity and a non-trivial search space.
        employees >= 2 && shifts >= 1 && horizon_days >= 1
    }

    fn complexity(&self) -> Complexity {
        Complexity {
            time: "O(generations * population * n)",
            space: "O(population * n)",
            best_case: "O(population * n)",
            average_case: "O(generations * population * n)",
            worst_case: "O(generations * population * n)",
        }
    }

    fn applicable_scenarios(&self) -> Vec<&'static str> {
        vec![
            "Tightly constrained rosters with competing requirements",
            "Under-staffed periods where trade-offs must be searched",
            "Offline planning where minutes of compute are acceptable",
        ]
    }
}
