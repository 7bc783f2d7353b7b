//! Shared schedule evaluation.
//!
//! Slot expansion, hard-constraint eligibility, conflict counting,
//! fairness, and result assembly. Every strategy works over the same
//! expanded slot list and the same conflict definitions, so their quality
//! metrics are comparable.
//!
//! Hard constraints: availability window, skill match, at most one shift
//! per employee per day, maximum consecutive working days, minimum rest
//! hours between shifts on adjacent days.

use crate::model::{
    Assignment, QualityMetrics, RunStats, ScheduleRequest, ScheduleResult, Termination, UnmetSlot,
};
use std::collections::BTreeMap;
use std::time::Duration;

/// Objective weight for each open (unmet) seat.
pub const W_UNMET: f64 = 100.0;
/// Objective weight for each hard-constraint violation.
pub const W_VIOLATION: f64 = 50.0;
/// Objective weight for fairness variance.
pub const W_FAIRNESS: f64 = 1.0;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// One required-but-unfilled unit of demand: a seat on a shift on a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Index into [`ScheduleRequest::shifts`].
    pub shift: usize,
    /// Day offset within the horizon.
    pub day: u32,
    /// Seat number within the shift's headcount (0-based).
    pub seat: u32,
}

/// Expands a request into its demand slots, day-major then shift order.
///
/// The ordering is deterministic, which makes every strategy's slot
/// traversal reproducible.
pub fn expand_slots(request: &ScheduleRequest) -> Vec<Slot> {
    let mut slots = Vec::with_capacity(request.total_slots() as usize);
    for day in 0..request.horizon_days {
        for (shift, def) in request.shifts.iter().enumerate() {
            for seat in 0..def.headcount {
                slots.push(Slot { shift, day, seat });
            }
        }
    }
    slots
}

/// Structural request validation, run before any search starts.
///
/// Collects all findings, then reports them joined; a failing request
/// faults the run (state → `Error`).
pub fn validate_request(request: &ScheduleRequest) -> Result<(), String> {
    let mut errors = Vec::new();

    if request.horizon_days == 0 {
        errors.push("planning horizon must be at least one day".to_string());
    }

    let mut employee_ids = std::collections::HashSet::new();
    for e in &request.employees {
        if !employee_ids.insert(e.id.as_str()) {
            errors.push(format!("duplicate employee id `{}`", e.id));
        }
    }

    let mut shift_ids = std::collections::HashSet::new();
    for s in &request.shifts {
        if !shift_ids.insert(s.id.as_str()) {
            errors.push(format!("duplicate shift id `{}`", s.id));
        }
        if s.end_min <= s.start_min {
            errors.push(format!(
                "shift `{}` has an inverted time window ({}..{})",
                s.id, s.start_min, s.end_min
            ));
        }
        if u32::from(s.end_min) > MINUTES_PER_DAY {
            errors.push(format!("shift `{}` ends past midnight", s.id));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}

/// Incremental assignment state for constructive strategies.
///
/// Tracks, per employee, which shift they work each day. Greedy and
/// backtracking only ever place eligible assignments through this, so
/// their schedules carry zero violations by construction.
pub struct Roster<'a> {
    request: &'a ScheduleRequest,
    /// Per employee: day → shift index.
    days: Vec<BTreeMap<u32, usize>>,
    counts: Vec<u32>,
}

impl<'a> Roster<'a> {
    /// Creates an empty roster for a request.
    pub fn new(request: &'a ScheduleRequest) -> Self {
        Self {
            request,
            days: vec![BTreeMap::new(); request.employees.len()],
            counts: vec![0; request.employees.len()],
        }
    }

    /// Number of shifts currently assigned to an employee.
    pub fn count(&self, employee: usize) -> u32 {
        self.counts[employee]
    }

    /// Whether assigning `employee` to `shift` on `day` satisfies every
    /// hard constraint given the current roster.
    pub fn is_eligible(&self, employee: usize, shift: usize, day: u32) -> bool {
        let emp = &self.request.employees[employee];
        let def = &self.request.shifts[shift];

        if let Some(skill) = &def.required_skill {
            if !emp.has_skill(skill) {
                return false;
            }
        }
        if !emp.is_available(day, def.start_min, def.end_min) {
            return false;
        }
        if self.days[employee].contains_key(&day) {
            return false;
        }

        if emp.max_consecutive_days > 0 {
            let mut run = 1u32;
            let mut d = day;
            while d > 0 && self.days[employee].contains_key(&(d - 1)) {
                run += 1;
                d -= 1;
            }
            let mut d = day;
            while self.days[employee].contains_key(&(d + 1)) {
                run += 1;
                d += 1;
            }
            if run > emp.max_consecutive_days {
                return false;
            }
        }

        if emp.min_rest_hours > 0 {
            let needed = emp.min_rest_hours * 60;
            if day > 0 {
                if let Some(&prev) = self.days[employee].get(&(day - 1)) {
                    let prev_end = u32::from(self.request.shifts[prev].end_min);
                    let rest = MINUTES_PER_DAY - prev_end + u32::from(def.start_min);
                    if rest < needed {
                        return false;
                    }
                }
            }
            if let Some(&next) = self.days[employee].get(&(day + 1)) {
                let next_start = u32::from(self.request.shifts[next].start_min);
                let rest = MINUTES_PER_DAY - u32::from(def.end_min) + next_start;
                if rest < needed {
                    return false;
                }
            }
        }

        true
    }

    /// Records an assignment.
    pub fn assign(&mut self, employee: usize, shift: usize, day: u32) {
        self.days[employee].insert(day, shift);
        self.counts[employee] += 1;
    }

    /// Removes an assignment (backtracking).
    pub fn unassign(&mut self, employee: usize, day: u32) {
        if self.days[employee].remove(&day).is_some() {
            self.counts[employee] -= 1;
        }
    }
}

/// Conflicts that placing `employee` on `slots[index]` would create,
/// evaluated against every *other* filled slot of `assignment`.
///
/// Counts one conflict per violated condition: skill mismatch,
/// unavailability, same-day double booking, consecutive-days overrun,
/// and each broken rest gap. Zero means the placement is clean.
pub fn conflicts_for(
    request: &ScheduleRequest,
    slots: &[Slot],
    assignment: &[Option<usize>],
    index: usize,
    employee: usize,
) -> u32 {
    let slot = slots[index];
    let emp = &request.employees[employee];
    let def = &request.shifts[slot.shift];
    let mut conflicts = 0u32;

    if let Some(skill) = &def.required_skill {
        if !emp.has_skill(skill) {
            conflicts += 1;
        }
    }
    if !emp.is_available(slot.day, def.start_min, def.end_min) {
        conflicts += 1;
    }

    // Days this employee works elsewhere in the assignment.
    let mut worked: BTreeMap<u32, usize> = BTreeMap::new();
    for (j, assigned) in assignment.iter().enumerate() {
        if j != index && *assigned == Some(employee) {
            worked.insert(slots[j].day, slots[j].shift);
        }
    }

    if worked.contains_key(&slot.day) {
        conflicts += 1;
    }

    if emp.max_consecutive_days > 0 {
        let mut run = 1u32;
        let mut d = slot.day;
        while d > 0 && worked.contains_key(&(d - 1)) {
            run += 1;
            d -= 1;
        }
        let mut d = slot.day;
        while worked.contains_key(&(d + 1)) {
            run += 1;
            d += 1;
        }
        if run > emp.max_consecutive_days {
            conflicts += 1;
        }
    }

    if emp.min_rest_hours > 0 {
        let needed = emp.min_rest_hours * 60;
        if slot.day > 0 {
            if let Some(&prev) = worked.get(&(slot.day - 1)) {
                let prev_end = u32::from(request.shifts[prev].end_min);
                if MINUTES_PER_DAY - prev_end + u32::from(def.start_min) < needed {
                    conflicts += 1;
                }
            }
        }
        if let Some(&next) = worked.get(&(slot.day + 1)) {
            let next_start = u32::from(request.shifts[next].start_min);
            if MINUTES_PER_DAY - u32::from(def.end_min) + next_start < needed {
                conflicts += 1;
            }
        }
    }

    conflicts
}

/// Total conflict count over a full assignment vector.
pub fn count_conflicts(
    request: &ScheduleRequest,
    slots: &[Slot],
    assignment: &[Option<usize>],
) -> u32 {
    assignment
        .iter()
        .enumerate()
        .filter_map(|(i, a)| a.map(|e| conflicts_for(request, slots, assignment, i, e)))
        .sum()
}

/// Per-employee assignment counts (zero-count employees included).
pub fn assignment_counts(request: &ScheduleRequest, assignment: &[Option<usize>]) -> Vec<u32> {
    let mut counts = vec![0u32; request.employees.len()];
    for assigned in assignment.iter().flatten() {
        counts[*assigned] += 1;
    }
    counts
}

/// Population variance of per-employee assignment counts.
pub fn fairness_variance(counts: &[u32]) -> f64 {
    if counts.is_empty() {
        return 0.0;
    }
    let n = counts.len() as f64;
    let mean = counts.iter().map(|&c| f64::from(c)).sum::<f64>() / n;
    counts
        .iter()
        .map(|&c| {
            let d = f64::from(c) - mean;
            d * d
        })
        .sum::<f64>()
        / n
}

/// Weighted objective score; lower is better.
///
/// Unmet demand dominates, a violation weighs half an open seat, and
/// fairness variance breaks ties between otherwise equal schedules.
pub fn objective(unmet: u32, violations: u32, fairness: f64) -> f64 {
    f64::from(unmet) * W_UNMET + f64::from(violations) * W_VIOLATION + fairness * W_FAIRNESS
}

/// Aggregates unassigned slots into per-shift-per-day open-seat counts.
pub fn unmet_slots(
    request: &ScheduleRequest,
    slots: &[Slot],
    assignment: &[Option<usize>],
) -> Vec<UnmetSlot> {
    let mut open: BTreeMap<(u32, usize), u32> = BTreeMap::new();
    for (i, assigned) in assignment.iter().enumerate() {
        if assigned.is_none() {
            *open.entry((slots[i].day, slots[i].shift)).or_insert(0) += 1;
        }
    }
    open.into_iter()
        .map(|((day, shift), count)| UnmetSlot {
            shift_id: request.shifts[shift].id.clone(),
            day,
            open: count,
        })
        .collect()
}

/// Assembles a [`ScheduleResult`] from an assignment vector.
pub fn build_result(
    request: &ScheduleRequest,
    slots: &[Slot],
    assignment: &[Option<usize>],
    elapsed: Duration,
    iterations: u64,
    termination: Termination,
) -> ScheduleResult {
    let assignments: Vec<Assignment> = assignment
        .iter()
        .enumerate()
        .filter_map(|(i, a)| {
            a.map(|e| {
                Assignment::new(
                    request.employees[e].id.clone(),
                    request.shifts[slots[i].shift].id.clone(),
                    slots[i].day,
                )
            })
        })
        .collect();

    let unmet = unmet_slots(request, slots, assignment);
    let open: u32 = unmet.iter().map(|u| u.open).sum();
    let violations = count_conflicts(request, slots, assignment);
    let fairness = fairness_variance(&assignment_counts(request, assignment));

    ScheduleResult {
        assignments,
        unmet,
        metrics: QualityMetrics {
            violations,
            fairness_variance: fairness,
            objective: objective(open, violations, fairness),
        },
        stats: RunStats {
            elapsed,
            iterations,
        },
        termination,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AvailabilityWindow, Employee, Shift};

    fn two_shift_request() -> ScheduleRequest {
        ScheduleRequest::new(
            vec![Employee::new("E1"), Employee::new("E2")],
            vec![Shift::new("DAY", 480, 960), Shift::new("NIGHT", 1020, 1440)],
            2,
        )
    }

    #[test]
    fn test_expand_slots_day_major() {
        let req = two_shift_request();
        let slots = expand_slots(&req);
        assert_eq!(slots.len(), 4);
        assert_eq!((slots[0].day, slots[0].shift), (0, 0));
        assert_eq!((slots[1].day, slots[1].shift), (0, 1));
        assert_eq!((slots[2].day, slots[2].shift), (1, 0));
    }

    #[test]
    fn test_expand_slots_headcount() {
        let req = ScheduleRequest::new(
            vec![Employee::new("E1")],
            vec![Shift::new("DAY", 480, 960).with_headcount(3)],
            1,
        );
        let slots = expand_slots(&req);
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[2].seat, 2);
    }

    #[test]
    fn test_validate_request_ok() {
        assert!(validate_request(&two_shift_request()).is_ok());
    }

    #[test]
    fn test_validate_request_duplicates() {
        let req = ScheduleRequest::new(
            vec![Employee::new("E1"), Employee::new("E1")],
            vec![Shift::new("DAY", 480, 960)],
            1,
        );
        let err = validate_request(&req).unwrap_err();
        assert!(err.contains("duplicate employee"));
    }

    #[test]
    fn test_validate_request_inverted_window() {
        let req = ScheduleRequest::new(
            vec![Employee::new("E1")],
            vec![Shift::new("BAD", 960, 480)],
            1,
        );
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn test_validate_request_zero_horizon() {
        let req = ScheduleRequest::new(vec![], vec![], 0);
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn test_roster_one_shift_per_day() {
        let req = two_shift_request();
        let mut roster = Roster::new(&req);

        assert!(roster.is_eligible(0, 0, 0));
        roster.assign(0, 0, 0);
        // Same employee, same day, other shift.
        assert!(!roster.is_eligible(0, 1, 0));
        // Other day is fine.
        assert!(roster.is_eligible(0, 0, 1));
    }

    #[test]
    fn test_roster_skill_gate() {
        let req = ScheduleRequest::new(
            vec![Employee::new("E1"), Employee::new("E2").with_skill("icu")],
            vec![Shift::new("ICU", 480, 960).with_required_skill("icu")],
            1,
        );
        let roster = Roster::new(&req);
        assert!(!roster.is_eligible(0, 0, 0));
        assert!(roster.is_eligible(1, 0, 0));
    }

    #[test]
    fn test_roster_availability_gate() {
        let req = ScheduleRequest::new(
            vec![Employee::new("E1").with_availability(AvailabilityWindow::new(0, 0, 0, 1440))],
            vec![Shift::new("DAY", 480, 960)],
            2,
        );
        let roster = Roster::new(&req);
        assert!(roster.is_eligible(0, 0, 0));
        assert!(!roster.is_eligible(0, 0, 1)); // window ends after day 0
    }

    #[test]
    fn test_roster_max_consecutive_days() {
        let req = ScheduleRequest::new(
            vec![Employee::new("E1").with_max_consecutive_days(2)],
            vec![Shift::new("DAY", 480, 960)],
            4,
        );
        let mut roster = Roster::new(&req);
        roster.assign(0, 0, 0);
        roster.assign(0, 0, 1);
        assert!(!roster.is_eligible(0, 0, 2)); // would make a 3-day run
        assert!(roster.is_eligible(0, 0, 3));

        // Filling the gap day would also bridge into a long run.
        roster.assign(0, 0, 3);
        assert!(!roster.is_eligible(0, 0, 2));
    }

    #[test]
    fn test_roster_min_rest_hours() {
        // NIGHT ends 24:00; DAY starts 08:00 next day → 8h rest.
        let req = ScheduleRequest::new(
            vec![Employee::new("E1").with_min_rest_hours(11)],
            vec![Shift::new("DAY", 480, 960), Shift::new("NIGHT", 1020, 1440)],
            2,
        );
        let mut roster = Roster::new(&req);
        roster.assign(0, 1, 0); // NIGHT on day 0
        assert!(!roster.is_eligible(0, 0, 1)); // DAY on day 1: 8h < 11h
        assert!(roster.is_eligible(0, 1, 1)); // NIGHT again: 21h rest
    }

    #[test]
    fn test_roster_unassign() {
        let req = two_shift_request();
        let mut roster = Roster::new(&req);
        roster.assign(0, 0, 0);
        assert_eq!(roster.count(0), 1);
        roster.unassign(0, 0);
        assert_eq!(roster.count(0), 0);
        assert!(roster.is_eligible(0, 1, 0));
    }

    #[test]
    fn test_conflicts_double_booking() {
        let req = two_shift_request();
        let slots = expand_slots(&req);
        // E1 on both day-0 shifts.
        let asg = vec![Some(0), Some(0), None, None];
        assert!(conflicts_for(&req, &slots, &asg, 0, 0) >= 1);
        assert_eq!(count_conflicts(&req, &slots, &asg), 2); // both parties conflicted
    }

    #[test]
    fn test_conflicts_clean_assignment() {
        let req = two_shift_request();
        let slots = expand_slots(&req);
        let asg = vec![Some(0), Some(1), Some(1), Some(0)];
        assert_eq!(count_conflicts(&req, &slots, &asg), 0);
    }

    #[test]
    fn test_fairness_variance() {
        assert_eq!(fairness_variance(&[]), 0.0);
        assert_eq!(fairness_variance(&[3, 3, 3]), 0.0);
        assert!((fairness_variance(&[4, 2]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_objective_weighting() {
        // One open seat outweighs one violation.
        assert!(objective(1, 0, 0.0) > objective(0, 1, 0.0));
        // Fairness only breaks ties.
        assert!(objective(0, 0, 3.0) < objective(0, 1, 0.0));
    }

    #[test]
    fn test_build_result_aggregates_unmet() {
        let req = two_shift_request();
        let slots = expand_slots(&req);
        let asg = vec![Some(0), None, Some(1), None];
        let result = build_result(
            &req,
            &slots,
            &asg,
            Duration::from_millis(5),
            7,
            Termination::Completed,
        );

        assert_eq!(result.assignments.len(), 2);
        assert_eq!(result.unmet.len(), 2);
        assert_eq!(result.open_seats(), 2);
        assert_eq!(result.stats.iterations, 7);
        assert_eq!(result.termination, Termination::Completed);
        assert!(result.metrics.objective >= 200.0);
    }
}
