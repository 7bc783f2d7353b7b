//! Greedy construction loop.

use super::config::{GreedyConfig, Priority};
use crate::control::{ExecControl, Progress, Signal};
use crate::eval::{self, Roster, Slot};
use crate::model::{ScheduleRequest, ScheduleResult, Termination};
use std::time::Instant;

/// Runs greedy construction to completion or budget exhaustion.
pub fn run(request: &ScheduleRequest, config: &GreedyConfig, control: &ExecControl) -> ScheduleResult {
    let slots = eval::expand_slots(request);
    let mut assignment: Vec<Option<usize>> = vec![None; slots.len()];
    let mut roster = Roster::new(request);

    let start = Instant::now();
    let mut iterations = 0u64;
    let mut termination = Termination::Completed;

    loop {
        if assignment.iter().all(Option::is_some) {
            break;
        }
        if iterations >= config.max_iterations {
            break;
        }
        if start.elapsed() >= config.time_limit {
            termination = Termination::TimeLimitExceeded;
            break;
        }
        if control.checkpoint() == Signal::Stop {
            termination = Termination::Stopped;
            break;
        }

        let Some((index, employee)) = next_pick(request, &slots, &assignment, &roster, config.priority)
        else {
            // No eligible candidate for any open slot.
            break;
        };

        roster.assign(employee, slots[index].shift, slots[index].day);
        assignment[index] = Some(employee);
        iterations += 1;

        let filled = assignment.iter().filter(|a| a.is_some()).count();
        control.emit(Progress {
            percent: filled as f64 / slots.len().max(1) as f64,
            phase: "assign".into(),
            message: format!("{filled}/{} slots filled", slots.len()),
            elapsed: start.elapsed(),
            remaining: None,
        });
    }

    eval::build_result(request, &slots, &assignment, start.elapsed(), iterations, termination)
}

/// Chooses the next slot-employee pair under the configured priority.
///
/// Ties break deterministically: lowest assignment count, then lowest
/// employee id, then slot order.
fn next_pick(
    request: &ScheduleRequest,
    slots: &[Slot],
    assignment: &[Option<usize>],
    roster: &Roster<'_>,
    priority: Priority,
) -> Option<(usize, usize)> {
    let mut best: Option<(u32, &str, usize, usize)> = None;

    for (index, assigned) in assignment.iter().enumerate() {
        if assigned.is_some() {
            continue;
        }
        let slot = slots[index];
        let candidate = (0..request.employees.len())
            .filter(|&e| roster.is_eligible(e, slot.shift, slot.day))
            .min_by_key(|&e| (roster.count(e), request.employees[e].id.as_str()));

        if let Some(employee) = candidate {
            let rank = (
                roster.count(employee),
                request.employees[employee].id.as_str(),
                index,
                employee,
            );
            match priority {
                // First open slot with any candidate wins.
                Priority::EarliestFirst => return Some((index, employee)),
                Priority::Fairness => {
                    if best.is_none_or(|b| (rank.0, rank.1, rank.2) < (b.0, b.1, b.2)) {
                        best = Some(rank);
                    }
                }
            }
        }
    }

    best.map(|(_, _, index, employee)| (index, employee))
}
