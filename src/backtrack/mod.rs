//! Depth-first search with forward checking.
//!
//! Exhaustive within its depth window, so it finds complete schedules that
//! greedy construction misses. Exponential in the worst case; the registry
//! consults [`Strategy::is_applicable`] to keep it off large problems.

mod config;
mod runner;

pub use config::{BacktrackConfig, Pruning};

use crate::control::ExecControl;
use crate::error::{EngineError, Result};
use crate::eval;
use crate::model::{ScheduleRequest, ScheduleResult, Termination};
use crate::param::{validate_against, ParamSet, ParamSpec, ValidationReport};
use crate::strategy::{Complexity, Strategy, StrategyType};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Backtracking scheduling strategy.
pub struct BacktrackStrategy {
    control: ExecControl,
    config: Mutex<BacktrackConfig>,
}

impl BacktrackStrategy {
    /// Creates an instance with default parameters.
    pub fn new() -> Self {
        Self {
            control: ExecControl::new(),
            config: Mutex::new(BacktrackConfig::default()),
        }
    }
}

impl Default for BacktrackStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for BacktrackStrategy {
    fn kind(&self) -> StrategyType {
        StrategyType::Backtrack
    }

    fn name(&self) -> &'static str {
        "Backtracking Search"
    }

    fn description(&self) -> &'static str {
        "Systematic depth-first assignment with forward checking, able to \
         unwind bad placements constructive strategies commit to. Best on \
         small, tightly coupled problems where completeness matters."
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
        *self.config.lock().expect("config lock poisoned") = BacktrackConfig::from_params(params);
        Ok(())
    }

    fn validate_parameters(&self, params: &ParamSet) -> ValidationReport {
        let mut report = validate_against(&config::param_specs(), params);
        if report.valid {
            let name = params.get_str("pruningStrategy", config::DEFAULT_PRUNING);
            if Pruning::parse(name).is_none() {
                report.warn(format!(
                    "unknown pruningStrategy `{name}`; falling back to {}",
                    config::DEFAULT_PRUNING
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
        let branching = request.employees.len().max(1) as u64;
        let depth = config.max_depth.min(12) as u32;
        Duration::from_micros(branching.saturating_pow(depth).min(1_000_000))
            .min(config.time_limit)
    }

    fn is_applicable(&self, employees: usize, shifts: usize, horizon_days: u32) -> bool {
        let scale = employees as u64 * shifts as u64 * u64::from(horizon_days);
        scale > 0 && scale <= config::SCALE_LIMIT
    }

    fn complexity(&self) -> Complexity {
        Complexity {
            time: "O(b^d)",
            space: "O(d)",
            best_case: "O(d)",
            average_case: "O(b^d)",
            worst_case: "O(b^d)",
        }
    }

    fn applicable_scenarios(&self) -> Vec<&'static str> {
        vec![
            "Small teams with hard coupling between shifts",
            "Skill-scarce rosters where placement order matters",
            "Verifying whether a fully staffed schedule exists at all",
        ]
    }
}
