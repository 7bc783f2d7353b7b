//! Min-conflicts repair loop.
//!
//! Starts from a randomized greedy construction, then iteratively repairs
//! "trouble" slots: those left open despite having candidates, or whose
//! current assignment conflicts with the rest of the schedule. Each repair
//! may transit through a conflicted intermediate state; the best schedule
//! seen under the weighted objective is what gets returned.

use super::config::{HeuristicConfig, HeuristicFn};
use crate::control::{ExecControl, Progress, Signal};
use crate::eval::{self, Roster, Slot};
use crate::model::{ScheduleRequest, ScheduleResult, Termination};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::time::Instant;

/// Runs the repair loop to a conflict-free schedule or budget exhaustion.
pub fn run(
    request: &ScheduleRequest,
    config: &HeuristicConfig,
    control: &ExecControl,
) -> ScheduleResult {
    let slots = eval::expand_slots(request);
    let domains = static_domains(request, &slots);
    let mut rng = StdRng::from_rng(&mut rand::rng());
    let start = Instant::now();

    let mut assignment = greedy_seed(request, &slots, &mut rng);
    let mut best = assignment.clone();
    let mut best_score = score(request, &slots, &best);

    let mut iterations = 0u64;
    let mut termination = Termination::Completed;

    while iterations < config.max_iterations {
        if start.elapsed() >= config.time_limit {
            termination = Termination::TimeLimitExceeded;
            break;
        }
        if control.checkpoint() == Signal::Stop {
            termination = Termination::Stopped;
            break;
        }

        let trouble = trouble_slots(request, &slots, &domains, &assignment);
        if trouble.is_empty() {
            break;
        }
        let trouble_count = trouble.len();

        // No movable slot means a local minimum.
        let Some((index, employee)) =
            select_move(request, &slots, &domains, &assignment, trouble, config.function)
        else {
            break;
        };
        assignment[index] = Some(employee);
        iterations += 1;

        let current = score(request, &slots, &assignment);
        if current < best_score {
            best_score = current;
            best = assignment.clone();
        }

        control.emit(Progress {
            percent: iterations as f64 / config.max_iterations as f64,
            phase: "repair".into(),
            message: format!("{trouble_count} trouble slots remain"),
            elapsed: start.elapsed(),
            remaining: None,
        });

        if best_score == 0.0 {
            break;
        }
    }

    // The loop may end right after a final improving move.
    let current = score(request, &slots, &assignment);
    if current < best_score {
        best = assignment;
    }

    eval::build_result(request, &slots, &best, start.elapsed(), iterations, termination)
}

/// Picks the next repair move under the configured rule.
///
/// The slot-ordering rules repair the first slot in their priority order
/// whose best candidate is an actual change; candidate ties go to the
/// lowest employee id for determinism. HIGHEST_VALUE instead evaluates
/// every candidate move and takes the one with the best objective
/// improvement, or none at a local minimum.
fn select_move(
    request: &ScheduleRequest,
    slots: &[Slot],
    domains: &[Vec<usize>],
    assignment: &[Option<usize>],
    mut trouble: Vec<usize>,
    function: HeuristicFn,
) -> Option<(usize, usize)> {
    match function {
        HeuristicFn::LeastConflicting => {
            // Most-conflicted slot first; open slots come after conflicted
            // ones, both in slot order.
            trouble.sort_by_key(|&i| {
                let conflicts = assignment[i]
                    .map_or(0, |e| eval::conflicts_for(request, slots, assignment, i, e));
                (std::cmp::Reverse(conflicts), i)
            });
            first_movable(request, slots, domains, assignment, &trouble)
        }
        HeuristicFn::MostConstrained => {
            trouble.sort_by_key(|&i| (domains[i].len(), i));
            first_movable(request, slots, domains, assignment, &trouble)
        }
        HeuristicFn::BestFit => {
            // Slots in demand order; candidate ranking also prefers the
            // least-loaded employee so fills spread across the roster.
            let counts = eval::assignment_counts(request, assignment);
            for &index in &trouble {
                let candidate = domains[index].iter().copied().min_by_key(|&e| {
                    (
                        eval::conflicts_for(request, slots, assignment, index, e),
                        counts[e],
                        request.employees[e].id.as_str(),
                    )
                });
                if let Some(candidate) = candidate {
                    if assignment[index] != Some(candidate) {
                        return Some((index, candidate));
                    }
                }
            }
            None
        }
        HeuristicFn::HighestValue => {
            let current = score(request, slots, assignment);
            let mut scratch = assignment.to_vec();
            let mut best: Option<(f64, usize, usize)> = None;
            for &index in &trouble {
                let prev = scratch[index];
                for &employee in &domains[index] {
                    if prev == Some(employee) {
                        continue;
                    }
                    scratch[index] = Some(employee);
                    let candidate_score = score(request, slots, &scratch);
                    if candidate_score < current
                        && best.is_none_or(|(s, _, _)| candidate_score < s)
                    {
                        best = Some((candidate_score, index, employee));
                    }
                }
                scratch[index] = prev;
            }
            best.map(|(_, index, employee)| (index, employee))
        }
    }
}

fn first_movable(
    request: &ScheduleRequest,
    slots: &[Slot],
    domains: &[Vec<usize>],
    assignment: &[Option<usize>],
    ordered: &[usize],
) -> Option<(usize, usize)> {
    for &index in ordered {
        let candidate = domains[index].iter().copied().min_by_key(|&e| {
            (
                eval::conflicts_for(request, slots, assignment, index, e),
                request.employees[e].id.as_str(),
            )
        });
        if let Some(candidate) = candidate {
            if assignment[index] != Some(candidate) {
                return Some((index, candidate));
            }
        }
    }
    None
}

/// Randomized hard-constraint-clean construction used as the start state.
fn greedy_seed(request: &ScheduleRequest, slots: &[Slot], rng: &mut StdRng) -> Vec<Option<usize>> {
    let mut assignment = vec![None; slots.len()];
    let mut roster = Roster::new(request);
    let mut order: Vec<usize> = (0..request.employees.len()).collect();

    for (index, slot) in slots.iter().enumerate() {
        order.shuffle(rng);
        if let Some(&employee) = order
            .iter()
            .find(|&&e| roster.is_eligible(e, slot.shift, slot.day))
        {
            roster.assign(employee, slot.shift, slot.day);
            assignment[index] = Some(employee);
        }
    }
    assignment
}

/// Employees passing the static gates (skill, availability) per slot.
fn static_domains(request: &ScheduleRequest, slots: &[Slot]) -> Vec<Vec<usize>> {
    slots
        .iter()
        .map(|slot| {
            let def = &request.shifts[slot.shift];
            (0..request.employees.len())
                .filter(|&e| {
                    let emp = &request.employees[e];
                    def.required_skill
                        .as_ref()
                        .is_none_or(|skill| emp.has_skill(skill))
                        && emp.is_available(slot.day, def.start_min, def.end_min)
                })
                .collect()
        })
        .collect()
}

/// Slots needing repair: fillable-but-open, or assigned with conflicts.
fn trouble_slots(
    request: &ScheduleRequest,
    slots: &[Slot],
    domains: &[Vec<usize>],
    assignment: &[Option<usize>],
) -> Vec<usize> {
    assignment
        .iter()
        .enumerate()
        .filter(|(i, assigned)| match assigned {
            None => !domains[*i].is_empty(),
            Some(e) => eval::conflicts_for(request, slots, assignment, *i, *e) > 0,
        })
        .map(|(i, _)| i)
        .collect()
}

fn score(request: &ScheduleRequest, slots: &[Slot], assignment: &[Option<usize>]) -> f64 {
    let open = assignment.iter().filter(|a| a.is_none()).count() as u32;
    let violations = eval::count_conflicts(request, slots, assignment);
    let fairness = eval::fairness_variance(&eval::assignment_counts(request, assignment));
    eval::objective(open, violations, fairness)
}
