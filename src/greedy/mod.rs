//! Priority-ordered greedy assignment.
//!
//! Fast constructive strategy: picks one slot-employee pair at a time
//! according to the configured priority rule, and never revisits a
//! placement. Every assignment it makes is hard-constraint clean, so the
//! schedule carries zero violations; demand it cannot fill is reported as
//! unmet.

mod config;
mod runner;

pub use config::{GreedyConfig, Priority};

use crate::control::ExecControl;
use crate::error::{EngineError, Result};
use crate::eval;
use crate::model::{ScheduleRequest, ScheduleResult, Termination};
use crate::param::{validate_against, ParamSet, ParamSpec, ValidationReport};
use crate::strategy::{Complexity, Strategy, StrategyType};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Greedy scheduling strategy.
pub struct GreedyStrategy {
    control: ExecControl,
    config: Mutex<GreedyConfig>,
}

impl GreedyStrategy {
    /// Creates an instance with default parameters.
    pub fn new() -> Self {
        Self {
            control: ExecControl::new(),
            config: Mutex::new(GreedyConfig::default()),
        }
    }
}

impl Default for GreedyStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for GreedyStrategy {
    fn kind(&self) -> StrategyType {
        StrategyType::Greedy
    }

    fn name(&self) -> &'static str {
        "Greedy Assignment"
    }

    fn description(&self) -> &'static str {
        "Constructs a schedule one assignment at a time, ordered by a \
         priority rule, without backtracking. Fast and predictable; best \
         suited to well-staffed problems where a decent schedule beats a \
         perfect one."
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
        *self.config.lock().expect("config lock poisoned") = GreedyConfig::from_params(params);
        Ok(())
    }

    fn validate_parameters(&self, params: &ParamSet) -> ValidationReport {
        let mut report = validate_against(&config::param_specs(), params);
        if report.valid {
            let name = params.get_str("priorityStrategy", config::DEFAULT_PRIORITY);
            if Priority::parse(name).is_none() {
                report.warn(format!(
                    "unknown priorityStrategy `{name}`; falling back to {}",
                    config::DEFAULT_PRIORITY
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
        let work = request.total_slots() * request.employees.len().max(1) as u64;
        Duration::from_micros(work).min(config.time_limit)
    }

    fn is_applicable(&self, _employees: usize, _shifts: usize, _horizon_days: u32) -> bool {
        // Linear-time construction scales to any input.
        true
    }

    fn complexity(&self) -> Complexity {
        Complexity {
            time: "O(n log n)",
            space: "O(n)",
            best_case: "O(n)",
            average_case: "O(n log n)",
            worst_case: "O(n^2)",
        }
    }

    fn applicable_scenarios(&self) -> Vec<&'static str> {
        vec![
            "Large rosters where response time matters more than optimality",
            "Well-staffed departments with loose constraints",
            "Producing a baseline schedule for later refinement",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::State;
    use crate::model::{Employee, Shift};

    fn request(employees: usize, shifts_per_day: usize, days: u32) -> ScheduleRequest {
        ScheduleRequest::new(
            (1..=employees).map(|i| Employee::new(format!("E{i}"))).collect(),
            (1..=shifts_per_day)
                .map(|i| Shift::new(format!("S{i}"), 480, 960))
                .collect(),
            days,
        )
    }

    #[test]
    fn test_defaults_initialize() {
        let s = GreedyStrategy::new();
        let defaults = ParamSet::defaults_of(&s.param_specs());
        assert!(s.initialize(&defaults).is_ok());
        assert_eq!(defaults.get_str("priorityStrategy", ""), "FAIRNESS");
        assert_eq!(defaults.get_i64("maxIterations", 0), 1000);
        assert_eq!(defaults.get_i64("timeLimitMs", 0), 30_000);
    }

    #[test]
    fn test_invalid_iterations_rejected() {
        let s = GreedyStrategy::new();
        let params = ParamSet::new().with("maxIterations", 0i64);
        assert!(matches!(
            s.initialize(&params),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_priority_warns_but_passes() {
        let s = GreedyStrategy::new();
        let params = ParamSet::new().with("priorityStrategy", "LIFO");
        let report = s.validate_parameters(&params);
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);
        // Initialization still succeeds and falls back.
        assert!(s.initialize(&params).is_ok());
    }

    #[test]
    fn test_fairness_balances_counts() {
        // 3 employees, 2 shifts/day, 2 days: 4 slots over 3 people.
        let s = GreedyStrategy::new();
        let result = s.generate_schedule(&request(3, 2, 2)).unwrap();

        assert!(result.is_fully_staffed());
        assert_eq!(result.metrics.violations, 0);
        let counts = result.assignment_counts();
        let max = counts.values().copied().max().unwrap();
        let min = request(3, 2, 2)
            .employees
            .iter()
            .map(|e| counts.get(e.id.as_str()).copied().unwrap_or(0))
            .min()
            .unwrap();
        assert!(max - min <= 1, "unbalanced counts: {counts:?}");
    }

    #[test]
    fn test_understaffed_reports_unmet() {
        let s = GreedyStrategy::new();
        // One employee, two concurrent shifts per day.
        let result = s.generate_schedule(&request(1, 2, 1)).unwrap();
        assert_eq!(result.assignments.len(), 1);
        assert_eq!(result.open_seats(), 1);
        assert_eq!(result.termination, Termination::Completed);
        assert_eq!(s.status(), State::Completed);
    }

    #[test]
    fn test_empty_request_is_trivial() {
        let s = GreedyStrategy::new();
        let result = s
            .generate_schedule(&ScheduleRequest::new(vec![], vec![], 1))
            .unwrap();
        assert!(result.assignments.is_empty());
        assert!(result.is_fully_staffed());
    }

    #[test]
    fn test_invalid_request_faults() {
        let s = GreedyStrategy::new();
        let bad = ScheduleRequest::new(vec![Employee::new("E1")], vec![Shift::new("X", 900, 480)], 1);
        assert!(s.generate_schedule(&bad).is_err());
        assert_eq!(s.status(), State::Error);
    }

    #[test]
    fn test_earliest_first_priority() {
        let s = GreedyStrategy::new();
        s.initialize(&ParamSet::new().with("priorityStrategy", "EARLIEST_FIRST"))
            .unwrap();
        let result = s.generate_schedule(&request(2, 2, 2)).unwrap();
        assert!(result.is_fully_staffed());
        assert_eq!(result.metrics.violations, 0);
    }

    #[test]
    fn test_run_emits_trace_events() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        struct CountingSubscriber(Arc<AtomicUsize>);

        impl tracing::Subscriber for CountingSubscriber {
            fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
                true
            }
            fn new_span(&self, _: &tracing::span::Attributes<'_>) -> tracing::span::Id {
                tracing::span::Id::from_u64(1)
            }
            fn record(&self, _: &tracing::span::Id, _: &tracing::span::Record<'_>) {}
            fn record_follows_from(&self, _: &tracing::span::Id, _: &tracing::span::Id) {}
            fn event(&self, _: &tracing::Event<'_>) {
                self.0.fetch_add(1, Ordering::Relaxed);
            }
            fn enter(&self, _: &tracing::span::Id) {}
            fn exit(&self, _: &tracing::span::Id) {}
        }

        let events = Arc::new(AtomicUsize::new(0));
        tracing::subscriber::with_default(CountingSubscriber(Arc::clone(&events)), || {
            let s = GreedyStrategy::new();
            s.generate_schedule(&request(2, 1, 1)).unwrap();
        });
        // At least the run-started and run-finished events.
        assert!(events.load(Ordering::Relaxed) >= 2);
    }

    #[test]
    fn test_always_applicable() {
        let s = GreedyStrategy::new();
        assert!(s.is_applicable(10_000, 50, 365));
    }
}
