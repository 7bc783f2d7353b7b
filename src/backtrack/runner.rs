//! Depth-first search with optional forward checking.
//!
//! Slots whose candidate set is empty from the start can never be filled
//! and are excluded as unmet before the search begins. The first
//! `max_depth` remaining decision slots are explored with full
//! backtracking; anything deeper is completed greedily at each leaf, which
//! keeps the tree tractable on wide problems.

use super::config::{BacktrackConfig, Pruning};
use crate::control::{ExecControl, Progress, Signal};
use crate::eval::{self, Roster, Slot};
use crate::model::{ScheduleRequest, ScheduleResult, Termination};
use std::time::Instant;

enum Flow {
    /// Every decision slot is filled; stop searching.
    Complete,
    /// This subtree holds no complete schedule.
    Exhausted,
    /// Budget or stop request ended the search.
    Halt(Termination),
}

struct Search<'a> {
    request: &'a ScheduleRequest,
    slots: &'a [Slot],
    /// Decision slot indices (nonempty initial candidate set), slot order.
    decision: Vec<usize>,
    depth_limit: usize,
    roster: Roster<'a>,
    assignment: Vec<Option<usize>>,
    best: Vec<Option<usize>>,
    best_filled: usize,
    nodes: u64,
    start: Instant,
    config: &'a BacktrackConfig,
    control: &'a ExecControl,
}

/// Runs the backtracking search to completion or budget exhaustion.
pub fn run(
    request: &ScheduleRequest,
    config: &BacktrackConfig,
    control: &ExecControl,
) -> ScheduleResult {
    let slots = eval::expand_slots(request);
    let start = Instant::now();

    let decision: Vec<usize> = (0..slots.len())
        .filter(|&i| {
            let slot = slots[i];
            let def = &request.shifts[slot.shift];
            request.employees.iter().any(|emp| {
                def.required_skill
                    .as_ref()
                    .is_none_or(|skill| emp.has_skill(skill))
                    && emp.is_available(slot.day, def.start_min, def.end_min)
            })
        })
        .collect();

    let mut search = Search {
        request,
        slots: &slots,
        depth_limit: config.max_depth.min(decision.len()),
        decision,
        roster: Roster::new(request),
        assignment: vec![None; slots.len()],
        best: vec![None; slots.len()],
        best_filled: 0,
        nodes: 0,
        start,
        config,
        control,
    };

    let termination = match search.dfs(0) {
        Flow::Complete | Flow::Exhausted => Termination::Completed,
        Flow::Halt(t) => {
            // Salvage the partial path the halt interrupted.
            let filled = search.greedy_complete(0);
            search.record();
            search.undo(filled);
            t
        }
    };

    eval::build_result(
        request,
        &slots,
        &search.best,
        start.elapsed(),
        search.nodes,
        termination,
    )
}

impl<'a> Search<'a> {
    fn dfs(&mut self, k: usize) -> Flow {
        if self.start.elapsed() >= self.config.time_limit {
            return Flow::Halt(Termination::TimeLimitExceeded);
        }
        if self.control.checkpoint() == Signal::Stop {
            return Flow::Halt(Termination::Stopped);
        }

        if k == self.depth_limit {
            let filled = self.greedy_complete(k);
            let complete = self.record();
            if complete {
                return Flow::Complete;
            }
            self.undo(filled);
            return Flow::Exhausted;
        }

        let index = self.decision[k];
        let slot = self.slots[index];
        let mut candidates: Vec<usize> = (0..self.request.employees.len())
            .filter(|&e| self.roster.is_eligible(e, slot.shift, slot.day))
            .collect();
        candidates.sort_by_key(|&e| (self.roster.count(e), self.request.employees[e].id.as_str()));

        for employee in candidates {
            self.nodes += 1;
            self.roster.assign(employee, slot.shift, slot.day);
            self.assignment[index] = Some(employee);

            let viable = self.config.pruning != Pruning::ForwardChecking || self.look_ahead(k + 1);
            if viable {
                self.emit(k);
                match self.dfs(k + 1) {
                    Flow::Exhausted => {}
                    flow => return flow,
                }
            }

            self.roster.unassign(employee, slot.day);
            self.assignment[index] = None;
        }

        // Leaving the slot open keeps the best-partial guarantee.
        self.dfs(k + 1)
    }

    /// Whether every undecided decision slot in the backtracking window
    /// still has at least one eligible candidate.
    fn look_ahead(&self, from: usize) -> bool {
        self.decision[from..self.depth_limit].iter().all(|&index| {
            let slot = self.slots[index];
            (0..self.request.employees.len())
                .any(|e| self.roster.is_eligible(e, slot.shift, slot.day))
        })
    }

    /// Greedily fills decision slots from `k` on; returns the placements
    /// made so they can be undone.
    fn greedy_complete(&mut self, k: usize) -> Vec<(usize, usize)> {
        let mut placed = Vec::new();
        for j in k..self.decision.len() {
            let index = self.decision[j];
            if self.assignment[index].is_some() {
                continue;
            }
            let slot = self.slots[index];
            let candidate = (0..self.request.employees.len())
                .filter(|&e| self.roster.is_eligible(e, slot.shift, slot.day))
                .min_by_key(|&e| (self.roster.count(e), self.request.employees[e].id.as_str()));
            if let Some(employee) = candidate {
                self.roster.assign(employee, slot.shift, slot.day);
                self.assignment[index] = Some(employee);
                placed.push((index, employee));
            }
        }
        placed
    }

    fn undo(&mut self, placed: Vec<(usize, usize)>) {
        for (index, employee) in placed {
            self.roster.unassign(employee, self.slots[index].day);
            self.assignment[index] = None;
        }
    }

    /// Keeps the assignment if it fills more slots than the incumbent.
    /// Returns whether every decision slot is filled.
    fn record(&mut self) -> bool {
        let filled = self.assignment.iter().filter(|a| a.is_some()).count();
        if filled > self.best_filled {
            self.best = self.assignment.clone();
            self.best_filled = filled;
        }
        filled == self.decision.len()
    }

    fn emit(&self, k: usize) {
        self.control.emit(Progress {
            percent: (k + 1) as f64 / self.depth_limit.max(1) as f64,
            phase: "search".into(),
            message: format!("depth {} of {}", k + 1, self.depth_limit),
            elapsed: self.start.elapsed(),
            remaining: None,
        });
    }
}
