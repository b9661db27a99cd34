//! Multi-stage optimization pipeline.
//!
//! # Algorithm
//!
//! 1. **Location distribution**: per location, demand (shifts, hours) and
//!    supply (employees passing the gates for at least one of its shifts,
//!    employees preferring it). Locations with the fewest eligible
//!    employees per shift are searched first.
//! 2. **Assignment optimization**: the constraint solver, driven with the
//!    stage-1 shift order.
//! 3. **Fine-tuning**: seeded hill climbing. Each pass visits assignments in
//!    shuffled order and moves one to another employee when the move keeps
//!    every hard limit, the employee scores above 0 for the shift, and
//!    `fairness + cost efficiency` strictly improves. Fairness here counts
//!    every employee, idle ones included.
//!
//! Any stage failure aborts the pipeline with [`SolverError::Stage`].
//!
//! # Reference
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use super::ConstraintSolver;
use crate::cp::{rescore, summarize, HardLimits, SELECTED_REASON};
use crate::error::SolverError;
use crate::evaluation::{CandidateContext, CandidateEvaluator};
use crate::models::{
    Employee, LocalClock, SchedulingProblem, SchedulingSolution, Shift, ShiftAssignment,
    SolutionMetrics, SolverKind,
};
use crate::scheduler::{cost_efficiency, fairness_score, shifts_in_order, RosterState};

/// Reason added to assignments moved during fine-tuning.
pub const REBALANCED_REASON: &str = "Rebalanced during fine-tuning";

const STAGE_LOCATIONS: &str = "location_distribution";
const STAGE_ASSIGNMENT: &str = "assignment";
const STAGE_TUNING: &str = "fine_tuning";

const DEFAULT_SEED: u64 = 42;
const DEFAULT_MAX_PASSES: usize = 4;
const IMPROVEMENT_EPSILON: f64 = 1e-9;

/// Demand and supply at one location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPlan {
    /// Location ID.
    pub location_id: String,
    /// Shifts at the location.
    pub shift_count: usize,
    /// Total shift hours at the location.
    pub hours: f64,
    /// Employees passing the gates for at least one shift there.
    pub eligible_employees: usize,
    /// Employees whose preferred location it is.
    pub preferring_employees: usize,
}

impl LocationPlan {
    /// Eligible employees per shift. Lower is scarcer.
    pub fn supply_ratio(&self) -> f64 {
        if self.shift_count == 0 {
            return f64::INFINITY;
        }
        self.eligible_employees as f64 / self.shift_count as f64
    }
}

/// Three-stage pipeline around a constraint solver.
#[derive(Debug, Clone)]
pub struct MultiStagePipeline {
    solver: Arc<dyn ConstraintSolver>,
    evaluator: CandidateEvaluator,
    seed: u64,
    max_passes: usize,
}

impl MultiStagePipeline {
    /// Creates a pipeline around `solver`.
    pub fn new(solver: Arc<dyn ConstraintSolver>) -> Self {
        Self {
            solver,
            evaluator: CandidateEvaluator::standard(),
            seed: DEFAULT_SEED,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    /// Sets the fine-tuning seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the number of fine-tuning passes.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Replaces the evaluator.
    pub fn with_evaluator(mut self, evaluator: CandidateEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Swaps the constraint solver, keeping every other setting.
    pub fn with_solver(mut self, solver: Arc<dyn ConstraintSolver>) -> Self {
        self.solver = solver;
        self
    }

    /// Fine-tuning seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fine-tuning pass budget.
    pub fn max_passes(&self) -> usize {
        self.max_passes
    }

    /// Name of the wrapped constraint solver.
    pub fn solver_name(&self) -> &'static str {
        self.solver.name()
    }

    /// Stage 1: per-location demand and supply, scarcest first.
    pub fn plan_locations(
        &self,
        problem: &SchedulingProblem,
        clock: LocalClock,
    ) -> Vec<LocationPlan> {
        let mut by_location: BTreeMap<&str, Vec<&Shift>> = BTreeMap::new();
        for shift in &problem.shifts {
            by_location.entry(shift.location_id.as_str()).or_default().push(shift);
        }

        let mut plans: Vec<LocationPlan> = by_location
            .into_iter()
            .map(|(location, shifts)| {
                let eligible = problem
                    .employees
                    .iter()
                    .filter(|e| {
                        shifts.iter().any(|s| {
                            let ctx = CandidateContext::new(s, e, &problem.constraints)
                                .with_clock(clock);
                            self.evaluator.is_eligible(&ctx)
                        })
                    })
                    .count();
                let preferring = problem
                    .employees
                    .iter()
                    .filter(|e| e.preferred_location_id.as_deref() == Some(location))
                    .count();
                LocationPlan {
                    location_id: location.to_string(),
                    shift_count: shifts.len(),
                    hours: shifts.iter().map(|s| s.duration_hours()).sum(),
                    eligible_employees: eligible,
                    preferring_employees: preferring,
                }
            })
            .collect();

        plans.sort_by(|a, b| {
            a.supply_ratio()
                .total_cmp(&b.supply_ratio())
                .then_with(|| b.hours.total_cmp(&a.hours))
                .then_with(|| a.location_id.cmp(&b.location_id))
        });
        plans
    }

    /// Shift IDs grouped by planned location order, start order within.
    pub fn shift_order(problem: &SchedulingProblem, plans: &[LocationPlan]) -> Vec<String> {
        let ordered = shifts_in_order(&problem.shifts);
        plans
            .iter()
            .flat_map(|plan| {
                ordered
                    .iter()
                    .filter(move |s| s.location_id == plan.location_id)
                    .map(|s| s.id.clone())
            })
            .collect()
    }

    /// Runs all three stages.
    pub fn solve(
        &self,
        problem: &SchedulingProblem,
        timeout: Duration,
    ) -> Result<SchedulingSolution, SolverError> {
        let started = Instant::now();

        let clock = problem
            .clock()
            .map_err(|e| SolverError::InvalidProblem(e).in_stage(STAGE_LOCATIONS))?;
        let plans = self.plan_locations(problem, clock);
        let order = Self::shift_order(problem, &plans);
        debug!(locations = plans.len(), "planned location distribution");

        let remaining = timeout.saturating_sub(started.elapsed());
        let staged = self
            .solver
            .solve_ordered(problem, &order, remaining)
            .map_err(|e| e.in_stage(STAGE_ASSIGNMENT))?;

        let placements = self.placements(problem, &staged).map_err(|e| e.in_stage(STAGE_TUNING))?;
        let (tuned, moved) = self.fine_tune(problem, clock, placements);
        info!(
            assigned = tuned.len(),
            moved = moved.len(),
            "multi-stage fine-tuning finished"
        );

        let pairs: Vec<(&Shift, &Employee)> = tuned
            .iter()
            .map(|&(s, e)| (&problem.shifts[s], &problem.employees[e]))
            .collect();
        let mut assignments = rescore(problem, &self.evaluator, clock, &pairs, SELECTED_REASON);
        for assignment in &mut assignments {
            if moved.contains(assignment.shift_id.as_str()) {
                assignment.reasons.insert(1, REBALANCED_REASON.to_string());
            }
        }

        let metrics = SolutionMetrics::calculate(&assignments, problem);
        let explanation = format!(
            "Multi-stage optimization: {}",
            summarize(assignments.len(), problem.shifts.len(), &metrics)
        );
        Ok(SchedulingSolution {
            assignments,
            unassignable: staged.unassignable,
            solver: SolverKind::MultiStage,
            status: staged.status,
            solve_time_ms: started.elapsed().as_millis() as u64,
            explanation,
            metrics,
        })
    }

    /// (shift index, employee index) pairs of a stage-2 solution.
    fn placements(
        &self,
        problem: &SchedulingProblem,
        solution: &SchedulingSolution,
    ) -> Result<Vec<(usize, usize)>, SolverError> {
        solution
            .assignments
            .iter()
            .map(|a| {
                let s = problem.shifts.iter().position(|s| s.id == a.shift_id);
                let e = problem.employees.iter().position(|e| e.id == a.employee_id);
                s.zip(e).ok_or_else(|| {
                    SolverError::InconsistentOutput(format!(
                        "assignment {} -> {} does not match the problem",
                        a.shift_id, a.employee_id
                    ))
                })
            })
            .collect()
    }

    /// Stage 3. Returns the tuned placements and the IDs of moved shifts.
    fn fine_tune<'p>(
        &self,
        problem: &'p SchedulingProblem,
        clock: LocalClock,
        mut placements: Vec<(usize, usize)>,
    ) -> (Vec<(usize, usize)>, HashSet<&'p str>) {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut roster = RosterState::from_employees(&problem.employees);
        for &(s, e) in &placements {
            roster.commit(&problem.employees[e].id, &problem.shifts[s]);
        }
        let mut moved = HashSet::new();
        let mut current = balance(problem, &placements);

        for pass in 0..self.max_passes {
            let mut visit: Vec<usize> = (0..placements.len()).collect();
            visit.shuffle(&mut rng);
            let mut improved = false;

            for i in visit {
                let (s, from) = placements[i];
                let shift = &problem.shifts[s];
                roster.release(&problem.employees[from].id, &shift.id);

                let mut accepted = None;
                for (to, employee) in problem.employees.iter().enumerate() {
                    if to == from {
                        continue;
                    }
                    let working = roster.working_set(&employee.id);
                    let limits = HardLimits::for_employee(&problem.constraints, employee);
                    if !limits.admits(shift, working, clock) {
                        continue;
                    }
                    let ctx = CandidateContext::new(shift, employee, &problem.constraints)
                        .with_working_set(working)
                        .with_clock(clock);
                    if !self.evaluator.evaluate(&ctx).is_feasible() {
                        continue;
                    }

                    placements[i] = (s, to);
                    let value = balance(problem, &placements);
                    if value > current + IMPROVEMENT_EPSILON {
                        current = value;
                        accepted = Some(to);
                        break;
                    }
                    placements[i] = (s, from);
                }

                let owner = accepted.unwrap_or(from);
                roster.commit(&problem.employees[owner].id, shift);
                if accepted.is_some() {
                    moved.insert(shift.id.as_str());
                    improved = true;
                }
            }

            debug!(pass, objective = current, "fine-tuning pass");
            if !improved {
                break;
            }
        }
        (placements, moved)
    }
}

/// Fine-tuning objective: fairness over all employees plus cost efficiency.
fn balance(problem: &SchedulingProblem, placements: &[(usize, usize)]) -> f64 {
    let mut counts = vec![0usize; problem.employees.len()];
    for &(_, e) in placements {
        counts[e] += 1;
    }
    let assignments: Vec<ShiftAssignment> = placements
        .iter()
        .map(|&(s, e)| ShiftAssignment {
            shift_id: problem.shifts[s].id.clone(),
            employee_id: problem.employees[e].id.clone(),
            score: 0,
            reasons: Vec::new(),
            warnings: Vec::new(),
        })
        .collect();
    let metrics = SolutionMetrics::calculate(&assignments, problem);
    fairness_score(counts) + cost_efficiency(metrics.avg_cost_per_hour)
}
