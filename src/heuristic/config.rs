//! Heuristic strategy parameters.

use crate::param::{ParamSet, ParamSpec};
use std::time::Duration;

pub(crate) const DEFAULT_FUNCTION: &str = "LEAST_CONFLICTING";
const DEFAULT_MAX_ITERATIONS: i64 = 2000;
const DEFAULT_TIME_LIMIT_MS: i64 = 40_000;

/// Declared parameters and their documented defaults.
pub(crate) fn param_specs() -> Vec<ParamSpec> {
    vec![
        ParamSpec::new(
            "heuristicFunction",
            "Heuristic function",
            "Repair rule: LEAST_CONFLICTING repairs the most conflicted \
             slot, MOST_CONSTRAINED the slot with the fewest candidates, \
             BEST_FIT spreads load across employees, HIGHEST_VALUE takes \
             the best-scoring single move",
            DEFAULT_FUNCTION.into(),
        ),
        ParamSpec::new(
            "maxIterations",
            "Max iterations",
            "Upper bound on repair moves",
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

/// Repair-move selection rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeuristicFn {
    /// Repair the most conflicted slot with its least-conflicting candidate.
    LeastConflicting,
    /// Repair the trouble slot with the fewest candidates first.
    MostConstrained,
    /// Prefer the least-conflicting then least-loaded candidate, slots in
    /// demand order.
    BestFit,
    /// Take the single move with the best objective improvement.
    HighestValue,
}

impl HeuristicFn {
    /// Parses a contract-surface name; `None` for unknown names.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "LEAST_CONFLICTING" => Some(Self::LeastConflicting),
            "MOST_CONSTRAINED" => Some(Self::MostConstrained),
            "BEST_FIT" => Some(Self::BestFit),
            "HIGHEST_VALUE" => Some(Self::HighestValue),
            _ => None,
        }
    }
}

/// Parsed heuristic configuration.
#[derive(Debug, Clone)]
pub struct HeuristicConfig {
    /// Trouble-slot selection rule.
    pub function: HeuristicFn,
    /// Upper bound on repair moves.
    pub max_iterations: u64,
    /// Soft wall-clock budget.
    pub time_limit: Duration,
}

impl HeuristicConfig {
    /// Builds a configuration from a validated parameter set.
    ///
    /// An unrecognized `heuristicFunction` falls back to
    /// LEAST_CONFLICTING; the validation report will have carried the
    /// warning.
    pub fn from_params(params: &ParamSet) -> Self {
        Self {
            function: HeuristicFn::parse(params.get_str("heuristicFunction", DEFAULT_FUNCTION))
                .unwrap_or(HeuristicFn::LeastConflicting),
            max_iterations: params.get_i64("maxIterations", DEFAULT_MAX_ITERATIONS) as u64,
            time_limit: Duration::from_millis(
                params.get_i64("timeLimitMs", DEFAULT_TIME_LIMIT_MS) as u64,
            ),
        }
    }
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self::from_params(&ParamSet::new())
    }
}
