//! Min-conflicts local search.
//!
//! Starts from a greedy construction and repairs the most problematic
//! slots one move at a time. Middle ground between greedy speed and
//! genetic thoroughness; the default pick for mid-sized problems.

mod config;
mod runner;

pub use config::{HeuristicConfig, HeuristicFn};

use crate::control::ExecControl;
use crate::error::{EngineError, Result};
use crate::eval;
use crate::model::{ScheduleRequest, ScheduleResult, Termination};
use crate::param::{validate_against, ParamSet, ParamSpec, ValidationReport};
use crate::strategy::{Complexity, Strategy, StrategyType};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Heuristic scheduling strategy.
pub struct HeuristicStrategy {
    control: ExecControl,
    config: Mutex<HeuristicConfig>,
}

impl HeuristicStrategy {
    /// Creates an instance with default parameters.
    pub fn new() -> Self {
        Self {
            control: ExecControl::new(),
            config: Mutex::new(HeuristicConfig::default()),
        }
    }
}

impl Default for HeuristicStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for HeuristicStrategy {
    fn kind(&self) -> StrategyType {
        StrategyType::Heuristic
    }

    fn name(&self) -> &'static str {
        "Min-Conflicts Repair"
    }

    fn description(&self) -> &'static str {
        "Builds a greedy starting schedule, then iteratively repairs open \
         or conflicted slots with their least-conflicting candidate. Good \
         quality-for-cost on mid-sized problems."
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
        *self.config.lock().expect("config lock poisoned") = HeuristicConfig::from_params(params);
        Ok(())
    }

    fn validate_parameters(&self, params: &ParamSet) -> ValidationReport {
        let mut report = validate_against(&config::param_specs(), params);
        if report.valid {
            let name = params.get_str("heuristicFunction", config::DEFAULT_FUNCTION);
            if HeuristicFn::parse(name).is_none() {
                report.warn(format!(
                    "unknown heuristicFunction `{name}`; falling back to {}",
                    config::DEFAULT_FUNCTION
                ));
            }
        }
        report
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
        let work = config.max_iterations.saturating_mul(request.total_slots().max(1));
        Duration::from_micros(work).min(config.time_limit)
    }

    fn is_applicable(&self, employees: usize, shifts: usize, horizon_days: u32) -> bool {
        employees >= 1 && shifts >= 1 && horizon_days >= 1
    }

    fn complexity(&self) -> Complexity {
        Complexity {
            time: "O(iterations * n)",
            space: "O(n)",
            best_case: "O(n)",
            average_case: "O(iterations * n)",
            worst_case: "O(iterations * n^2)",
        }
    }

    fn applicable_scenarios(&self) -> Vec<&'static str> {
        vec![
            "Mid-sized rosters needing better quality than pure greedy",
            "Repairing a schedule after a few requirements change",
            "Interactive planning with a bounded response time",
        ]
    }
}
