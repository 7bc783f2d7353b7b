//! Greedy strategy parameters.

use crate::param::{ParamSet, ParamSpec};
use std::time::Duration;

pub(crate) const DEFAULT_PRIORITY: &str = "FAIRNESS";
const DEFAULT_MAX_ITERATIONS: i64 = 1000;
const DEFAULT_TIME_LIMIT_MS: i64 = 30_000;

/// Declared parameters and their documented defaults.
pub(crate) fn param_specs() -> Vec<ParamSpec> {
    vec![
        ParamSpec::new(
            "priorityStrategy",
            "Priority strategy",
            "Rule that orders slot-employee picks: FAIRNESS balances \
             per-employee assignment counts, EARLIEST_FIRST fills slots in \
             day order",
            DEFAULT_PRIORITY.into(),
        ),
        ParamSpec::new(
            "maxIterations",
            "Max iterations",
            "Upper bound on assignments attempted",
            DEFAULT_MAX_ITERATIONS.into(),
        )
        .with_bounds(1i64, 100_000i64),
        ParamSpec::new(
            "timeLimitMs",
            "Time limit (ms)",
            "Soft wall-clock budget for one run",
            DEFAULT_TIME_LIMIT_MS.into(),
        )
        .with_bounds(1i64, 600_000i64),
    ]
}

/// Slot-ordering rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Prefer the pick that keeps per-employee counts balanced.
    Fairness,
    /// Fill slots in day-major order.
    EarliestFirst,
}

impl Priority {
    /// Parses a contract-surface name; `None` for unknown names.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "FAIRNESS" => Some(Self::Fairness),
            "EARLIEST_FIRST" => Some(Self::EarliestFirst),
            _ => None,
        }
    }
}

/// Parsed greedy configuration.
#[derive(Debug, Clone)]
pub struct GreedyConfig {
    /// Slot-ordering rule.
    pub priority: Priority,
    /// Upper bound on assignments attempted.
    pub max_iterations: u64,
    /// Soft wall-clock budget.
    pub time_limit: Duration,
}

impl GreedyConfig {
    /// Builds a configuration from a validated parameter set.
    ///
    /// An unrecognized `priorityStrategy` falls back to FAIRNESS; the
    /// validation report will have carried the warning.
    pub fn from_params(params: &ParamSet) -> Self {
        Self {
            priority: Priority::parse(params.get_str("priorityStrategy", DEFAULT_PRIORITY))
                .unwrap_or(Priority::Fairness),
            max_iterations: params.get_i64("maxIterations", DEFAULT_MAX_ITERATIONS) as u64,
            time_limit: Duration::from_millis(
                params.get_i64("timeLimitMs", DEFAULT_TIME_LIMIT_MS) as u64,
            ),
        }
    }
}

impl Default for GreedyConfig {
    fn default() -> Self {
        Self::from_params(&ParamSet::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let c = GreedyConfig::default();
        assert_eq!(c.priority, Priority::Fairness);
        assert_eq!(c.max_iterations, 1000);
        assert_eq!(c.time_limit, Duration::from_secs(30));
    }

    #[test]
    fn test_unknown_priority_falls_back() {
        let params = ParamSet::new().with("priorityStrategy", "RANDOM");
        assert_eq!(GreedyConfig::from_params(&params).priority, Priority::Fairness);
    }

    #[test]
    fn test_overrides_applied() {
        let params = ParamSet::new()
            .with("priorityStrategy", "EARLIEST_FIRST")
            .with("timeLimitMs", 500i64);
        let c = GreedyConfig::from_params(&params);
        assert_eq!(c.priority, Priority::EarliestFirst);
        assert_eq!(c.time_limit, Duration::from_millis(500));
    }
}
