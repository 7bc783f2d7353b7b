//! Scheduling result model.
//!
//! A result is always a complete value: even a timed-out or stopped run
//! yields the best assignments found so far, tagged with how the run
//! terminated. Unmet demand is data, not an error.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// One employee-shift-day assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Assigned employee.
    pub employee_id: String,
    /// Assigned shift.
    pub shift_id: String,
    /// Day offset within the planning horizon.
    pub day: u32,
}

impl Assignment {
    /// Creates an assignment.
    pub fn new(employee_id: impl Into<String>, shift_id: impl Into<String>, day: u32) -> Self {
        Self {
            employee_id: employee_id.into(),
            shift_id: shift_id.into(),
            day,
        }
    }
}

/// Demand that could not be filled: open seats on one shift on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmetSlot {
    /// The under-staffed shift.
    pub shift_id: String,
    /// Day offset within the planning horizon.
    pub day: u32,
    /// Number of seats left open.
    pub open: u32,
}

/// Aggregate quality metrics of a schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Count of hard-constraint violations in the assignments.
    pub violations: u32,
    /// Population variance of per-employee assignment counts.
    pub fairness_variance: f64,
    /// Weighted objective score (lower is better).
    pub objective: f64,
}

/// Execution statistics for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Wall-clock time consumed.
    pub elapsed: Duration,
    /// Iterations, generations, or node expansions consumed.
    pub iterations: u64,
}

/// How a run terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The strategy ran to its natural end.
    Completed,
    /// `stop()` was honored mid-run.
    Stopped,
    /// The time budget expired; the result is the best found so far.
    TimeLimitExceeded,
    /// An internal fault ended the run.
    Error,
}

/// Output of a scheduling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResult {
    /// Employee-shift-day assignments.
    pub assignments: Vec<Assignment>,
    /// Demand that could not be filled.
    pub unmet: Vec<UnmetSlot>,
    /// Aggregate quality metrics.
    pub metrics: QualityMetrics,
    /// Execution statistics.
    pub stats: RunStats,
    /// Terminal-state tag.
    pub termination: Termination,
}

impl ScheduleResult {
    /// Whether every slot of demand was filled.
    pub fn is_fully_staffed(&self) -> bool {
        self.unmet.is_empty()
    }

    /// Per-employee assignment counts.
    pub fn assignment_counts(&self) -> HashMap<&str, u32> {
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for a in &self.assignments {
            *counts.entry(a.employee_id.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// All assignments for one employee.
    pub fn assignments_for(&self, employee_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.employee_id == employee_id)
            .collect()
    }

    /// Total open seats across all unmet slots.
    pub fn open_seats(&self) -> u32 {
        self.unmet.iter().map(|u| u.open).sum()
    }
}
