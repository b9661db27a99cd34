//! Depth-first branch and bound over a [`RosterModel`].

use std::time::Instant;

use super::{RosterModel, COVERAGE_WEIGHT};
use crate::models::CommittedShift;

/// How often (in nodes) the wall clock is consulted.
const CLOCK_CHECK_INTERVAL: u64 = 256;

/// Search statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes visited.
    pub nodes: u64,
    /// Whether the whole tree was explored (incumbent is optimal).
    pub exhaustive: bool,
    /// Whether the deadline stopped the search.
    pub timed_out: bool,
    /// Objective of the incumbent, 0 when there is none.
    pub objective: i64,
}

/// Result of a search: employee index per shift index.
#[derive(Debug, Clone)]
pub(crate) struct SearchOutcome {
    pub best: Option<Vec<Option<usize>>>,
    pub stats: SearchStats,
}

struct BranchAndBound<'m, 'p> {
    model: &'m RosterModel<'p>,
    deadline: Instant,
    node_limit: u64,
    /// Optimistic objective of positions `k..` of the search order.
    bounds: Vec<i64>,
    working: Vec<Vec<CommittedShift>>,
    loads: Vec<usize>,
    current: Vec<Option<usize>>,
    best: Option<Vec<Option<usize>>>,
    best_value: i64,
    nodes: u64,
    interrupted: bool,
    timed_out: bool,
}

/// Runs the search until the tree is exhausted, the node limit is hit or
/// the deadline passes.
pub(crate) fn branch_and_bound(
    model: &RosterModel<'_>,
    deadline: Instant,
    node_limit: u64,
) -> SearchOutcome {
    let mut bounds = vec![0; model.order.len() + 1];
    for k in (0..model.order.len()).rev() {
        let best_affinity = model.candidates[model.order[k]]
            .iter()
            .map(|c| COVERAGE_WEIGHT + c.affinity)
            .max()
            .unwrap_or(0);
        bounds[k] = bounds[k + 1] + best_affinity;
    }

    let mut search = BranchAndBound {
        model,
        deadline,
        node_limit,
        bounds,
        working: model
            .problem
            .employees
            .iter()
            .map(|e| e.existing_shifts.clone())
            .collect(),
        loads: vec![0; model.problem.employees.len()],
        current: vec![None; model.shift_count()],
        best: None,
        best_value: i64::MIN,
        nodes: 0,
        interrupted: false,
        timed_out: false,
    };
    search.descend(0, 0);

    let objective = if search.best.is_some() {
        search.best_value
    } else {
        0
    };
    SearchOutcome {
        best: search.best,
        stats: SearchStats {
            nodes: search.nodes,
            exhaustive: !search.interrupted,
            timed_out: search.timed_out,
            objective,
        },
    }
}

impl BranchAndBound<'_, '_> {
    fn descend(&mut self, depth: usize, value: i64) {
        if self.interrupted {
            return;
        }
        self.nodes += 1;
        if self.nodes > self.node_limit {
            self.interrupted = true;
            return;
        }
        if self.nodes % CLOCK_CHECK_INTERVAL == 0 && Instant::now() >= self.deadline {
            self.interrupted = true;
            self.timed_out = true;
            return;
        }

        let model = self.model;
        if depth == model.order.len() {
            if value > self.best_value {
                self.best_value = value;
                self.best = Some(self.current.clone());
            }
            return;
        }
        if value + self.bounds[depth] <= self.best_value {
            return;
        }

        let s = model.order[depth];
        let shift = &model.problem.shifts[s];
        for candidate in &model.candidates[s] {
            let e = candidate.employee;
            if !model.limits[e].admits(shift, &self.working[e], model.clock) {
                continue;
            }
            let gain = COVERAGE_WEIGHT + candidate.affinity - model.fairness_penalty(self.loads[e]);

            self.working[e].push(CommittedShift::new(shift.start_time, shift.end_time));
            self.loads[e] += 1;
            self.current[s] = Some(e);

            self.descend(depth + 1, value + gain);

            self.current[s] = None;
            self.loads[e] -= 1;
            self.working[e].pop();
            if self.interrupted {
                return;
            }
        }

        // leave the shift open
        self.descend(depth + 1, value);
    }
}
