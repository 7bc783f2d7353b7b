//! Backtracking strategy parameters.

use crate::param::{ParamSet, ParamSpec};
use std::time::Duration;

const DEFAULT_MAX_DEPTH: i64 = 10;
pub(crate) const DEFAULT_PRUNING: &str = "FORWARD_CHECKING";
const DEFAULT_TIME_LIMIT_MS: i64 = 45_000;

/// Problem-scale ceiling (`employees * shifts * days`) above which the
/// strategy reports itself inapplicable.
pub(crate) const SCALE_LIMIT: u64 = 10_000;

/// Declared parameters and their documented defaults.
pub(crate) fn param_specs() -> Vec<ParamSpec> {
    vec![
        ParamSpec::new(
            "maxDepth",
            "Max depth",
            "Number of leading decision slots explored with full \
             backtracking; deeper slots are completed greedily",
            DEFAULT_MAX_DEPTH.into(),
        )
        .with_bounds(1i64, 64i64),
        ParamSpec::new(
            "pruningStrategy",
            "Pruning strategy",
            "FORWARD_CHECKING prunes branches that empty a later slot's \
             candidate set; NONE explores the raw tree",
            DEFAULT_PRUNING.into(),
        ),
        ParamSpec::new(
            "timeLimitMs",
            "Time limit (ms)",
            "Soft wall-clock budget for one run",
            DEFAULT_TIME_LIMIT_MS.into(),
        )
        .with_bounds(1i64, 600_000i64),
    ]
}

/// Branch-pruning rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pruning {
    /// Reject a placement that leaves a later decision slot with no
    /// eligible candidate.
    ForwardChecking,
    /// No look-ahead.
    None,
}

impl Pruning {
    /// Parses a contract-surface name; `None` for unknown names.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "FORWARD_CHECKING" => Some(Self::ForwardChecking),
            "NONE" => Some(Self::None),
            _ => None,
        }
    }
}

/// Parsed backtracking configuration.
#[derive(Debug, Clone)]
pub struct BacktrackConfig {
    /// Decision slots explored with full backtracking.
    pub max_depth: usize,
    /// Branch-pruning rule.
    pub pruning: Pruning,
    /// Soft wall-clock budget.
    pub time_limit: Duration,
}

impl BacktrackConfig {
    /// Builds a configuration from a validated parameter set.
    ///
    /// An unrecognized `pruningStrategy` falls back to FORWARD_CHECKING;
    /// the validation report will have carried the warning.
    pub fn from_params(params: &ParamSet) -> Self {
        Self {
            max_depth: params.get_i64("maxDepth", DEFAULT_MAX_DEPTH) as usize,
            pruning: Pruning::parse(params.get_str("pruningStrategy", DEFAULT_PRUNING))
                .unwrap_or(Pruning::ForwardChecking),
            time_limit: Duration::from_millis(
                params.get_i64("timeLimitMs", DEFAULT_TIME_LIMIT_MS) as u64,
            ),
        }
    }
}

impl Default for BacktrackConfig {
    fn default() -> Self {
        Self::from_params(&ParamSet::new())
    }
}
