//! The strategy contract.
//!
//! [`Strategy`] is the uniform lifecycle every scheduling algorithm
//! implements: parameterization, validation, execution, progress, and
//! run control. The registry hands instances out as `Arc<dyn Strategy>`.

use crate::control::{ExecControl, ProgressFn, State};
use crate::error::Result;
use crate::model::{ScheduleRequest, ScheduleResult};
use crate::param::{ParamSet, ParamSpec, ValidationReport};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Identifier of a built-in strategy family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyType {
    /// Priority-ordered greedy assignment.
    Greedy,
    /// Evolutionary population search.
    Genetic,
    /// Depth-first search with forward checking.
    Backtrack,
    /// Min-conflicts local search.
    Heuristic,
}

impl StrategyType {
    /// All built-in types, in registration order.
    pub const ALL: [StrategyType; 4] = [
        Self::Greedy,
        Self::Genetic,
        Self::Backtrack,
        Self::Heuristic,
    ];

    /// Contract-surface type tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Greedy => "GREEDY",
            Self::Genetic => "GENETIC",
            Self::Backtrack => "BACKTRACK",
            Self::Heuristic => "HEURISTIC",
        }
    }
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "GREEDY" => Ok(Self::Greedy),
            "GENETIC" => Ok(Self::Genetic),
            "BACKTRACK" => Ok(Self::Backtrack),
            "HEURISTIC" => Ok(Self::Heuristic),
            other => Err(format!("unknown strategy type `{other}`")),
        }
    }
}

/// Static complexity annotations for one strategy. Informational only.
#[derive(Debug, Clone, Serialize)]
pub struct Complexity {
    /// Asymptotic time complexity.
    pub time: &'static str,
    /// Asymptotic space complexity.
    pub space: &'static str,
    /// Best-case time.
    pub best_case: &'static str,
    /// Average-case time.
    pub average_case: &'static str,
    /// Worst-case time.
    pub worst_case: &'static str,
}

/// A pluggable shift-scheduling algorithm.
///
/// # Lifecycle
///
/// An instance is created by the registry, `initialize`d with merged
/// parameters, then used for zero or more `generate_schedule` calls.
/// Run control (`pause`/`resume`/`stop`) is safe to invoke from a thread
/// other than the one executing the run; the default methods route to the
/// instance's [`ExecControl`].
///
/// # Concurrency
///
/// Concurrent `generate_schedule` calls on one instance are not
/// supported. Callers sharing a cached instance must serialize runs, or
/// request distinct instances (e.g. by varying a parameter).
pub trait Strategy: Send + Sync {
    /// The strategy's type tag.
    fn kind(&self) -> StrategyType;

    /// Human-readable name.
    fn name(&self) -> &'static str;

    /// One-paragraph description.
    fn description(&self) -> &'static str;

    /// Declared parameter metadata, including the documented defaults.
    fn param_specs(&self) -> Vec<ParamSpec>;

    /// Run-control block backing the default lifecycle methods.
    fn control(&self) -> &ExecControl;

    /// Validates and stores a merged parameter set.
    ///
    /// Fails with [`EngineError::Validation`](crate::EngineError) on any
    /// fatal finding; no state transition happens in that case.
    fn initialize(&self, params: &ParamSet) -> Result<()>;

    /// Checks a parameter set against the declared bounds.
    fn validate_parameters(&self, params: &ParamSet) -> ValidationReport;

    /// Runs the algorithm to produce a schedule.
    ///
    /// Soft outcomes (time limit, unmet demand, stop request) are encoded
    /// in the result; only internal faults return an error.
    fn generate_schedule(&self, request: &ScheduleRequest) -> Result<ScheduleResult>;

    /// Rough wall-clock estimate for a request, capped at the time limit.
    fn estimate_execution_time(&self, request: &ScheduleRequest) -> Duration;

    /// Whether the strategy is suited to the given problem scale.
    fn is_applicable(&self, employee_count: usize, shift_count: usize, horizon_days: u32) -> bool;

    /// Static complexity descriptor.
    fn complexity(&self) -> Complexity;

    /// Scenarios this strategy is a good fit for.
    fn applicable_scenarios(&self) -> Vec<&'static str>;

    /// Installs the progress callback for subsequent runs.
    fn set_progress_callback(&self, callback: ProgressFn) {
        self.control().set_callback(callback);
    }

    /// Current lifecycle state.
    fn status(&self) -> State {
        self.control().status()
    }

    /// Requests a pause; no-op unless running.
    fn pause(&self) {
        self.control().pause();
    }

    /// Resumes a paused run; no-op otherwise.
    fn resume(&self) {
        self.control().resume();
    }

    /// Requests a cooperative stop from any non-terminal state.
    fn stop(&self) {
        self.control().stop();
    }
}

/// Descriptive metadata snapshot returned by the registry's `describe`.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyInfo {
    /// Type tag.
    pub kind: StrategyType,
    /// Human-readable name.
    pub name: &'static str,
    /// Description.
    pub description: &'static str,
    /// Complexity annotations.
    pub complexity: Complexity,
    /// Applicable scenarios.
    pub scenarios: Vec<&'static str>,
    /// Declared parameters.
    pub params: Vec<ParamSpec>,
}
