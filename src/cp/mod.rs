//! Constraint-programming formulation for shift rostering.
//!
//! Builds a [`RosterModel`] from a scheduling problem and solves it with a
//! depth-first branch and bound ([`CpSolver`]).
//!
//! # Model
//!
//! - **Decision**: each shift is staffed by at most one eligible employee.
//!   Eligibility = every evaluator gate passes against the employee's
//!   pre-existing shifts and the candidate scores above 0.
//! - **Hard constraints** per employee: no overlap, minimum rest between
//!   any two shifts, weekly hours ≤ cap, optional daily hours ≤ cap,
//!   consecutive worked days ≤ cap.
//! - **Objective** (maximize): `10000 × covered + Σ affinity − Σ fairness`,
//!   where affinity is the candidate score and the fairness term is
//!   `fairnessWeight × 10 × load` at the time of each assignment.
//!
//! # Search
//! Fail-first shift order (fewest candidates first) unless a caller
//! supplies one, candidates by affinity, optimistic bound per remaining
//! shift, bounded by a wall-clock deadline and a node limit.
//!
//! # Reference
//! - Baptiste et al. (2001), "Constraint-Based Scheduling"
//! - Land & Doig (1960), "An Automatic Method of Solving Discrete
//!   Programming Problems"

mod search;

use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

use tracing::{debug, info};

pub use search::SearchStats;

use crate::error::SolverError;
use crate::evaluation::{CandidateContext, CandidateEvaluator};
use crate::models::{
    consecutive_run_containing, CommittedShift, Employee, LocalClock, SchedulingConstraints,
    SchedulingProblem, SchedulingSolution, Shift, ShiftAssignment, SolutionMetrics, SolveStatus,
    SolverKind, UnassignableShift,
};
use crate::scheduler::{shifts_in_order, RosterState};
use crate::solver::ConstraintSolver;

/// Objective weight of one covered shift. Dominates any affinity sum.
pub const COVERAGE_WEIGHT: i64 = 10_000;

/// Default search node limit.
pub const DEFAULT_NODE_LIMIT: u64 = 2_000_000;

/// Reason attached to every assignment chosen by the solver.
pub const SELECTED_REASON: &str = "Selected by constraint solver";

/// Reason for a shift without any eligible employee.
pub const NO_CANDIDATE_REASON: &str = "No employees available or qualified";

/// Reason for a shift left open by the optimizer.
pub const CONFLICT_REASON: &str = "Conflicts with other constraints";

const HOURS_EPSILON: f64 = 1e-9;

/// Per-employee hard limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HardLimits {
    /// Weekly hour cap.
    pub max_hours_per_week: f64,
    /// Daily hour cap.
    pub max_hours_per_day: Option<f64>,
    /// Longest run of consecutive worked days.
    pub max_consecutive_days: u32,
    /// Minimum rest between two shifts.
    pub min_rest_hours: f64,
}

impl HardLimits {
    /// Effective limits of an employee.
    pub fn for_employee(constraints: &SchedulingConstraints, employee: &Employee) -> Self {
        Self {
            max_hours_per_week: constraints.max_hours_for(employee),
            max_hours_per_day: constraints.max_hours_per_day,
            max_consecutive_days: constraints.max_consecutive_days_for(employee),
            min_rest_hours: constraints.min_rest_hours_for(employee),
        }
    }

    /// Whether `shift` can join `working` without breaking a limit.
    pub fn admits(&self, shift: &Shift, working: &[CommittedShift], clock: LocalClock) -> bool {
        let window = shift.window();
        let date = clock.date(shift.start_time);
        let mut week_hours = shift.duration_hours();
        let mut day_hours = week_hours;
        let mut dates = BTreeSet::from([date]);

        for committed in working {
            let other = committed.window();
            if other.overlaps(&window) || window.rest_hours_between(&other) < self.min_rest_hours {
                return false;
            }
            let hours = committed.duration_hours();
            let other_date = clock.date(committed.start_time);
            week_hours += hours;
            if other_date == date {
                day_hours += hours;
            }
            dates.insert(other_date);
        }

        if week_hours > self.max_hours_per_week + HOURS_EPSILON {
            return false;
        }
        if let Some(cap) = self.max_hours_per_day {
            if day_hours > cap + HOURS_EPSILON {
                return false;
            }
        }
        consecutive_run_containing(&dates, date) <= self.max_consecutive_days
    }
}

/// An eligible employee for one shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    /// Index into `problem.employees`.
    pub employee: usize,
    /// Candidate score against pre-existing shifts.
    pub affinity: i64,
}

/// A rostering problem compiled for search.
#[derive(Debug)]
pub struct RosterModel<'p> {
    pub(crate) problem: &'p SchedulingProblem,
    pub(crate) clock: LocalClock,
    /// Shift indices in search order.
    pub(crate) order: Vec<usize>,
    /// Candidates per shift index, best affinity first.
    pub(crate) candidates: Vec<Vec<Candidate>>,
    /// Why employees were excluded, per shift index.
    pub(crate) rejections: Vec<Vec<String>>,
    /// Hard limits per employee index.
    pub(crate) limits: Vec<HardLimits>,
    /// Fairness weight, if the objective carries one.
    pub(crate) fairness_weight: Option<f64>,
}

impl RosterModel<'_> {
    /// Number of shifts.
    pub fn shift_count(&self) -> usize {
        self.problem.shifts.len()
    }

    /// Number of eligible employees for a shift.
    pub fn candidate_count(&self, shift_index: usize) -> usize {
        self.candidates[shift_index].len()
    }

    /// Shift IDs in search order.
    pub fn search_order(&self) -> Vec<&str> {
        self.order
            .iter()
            .map(|&i| self.problem.shifts[i].id.as_str())
            .collect()
    }

    /// Objective penalty of giving one more shift to an employee that
    /// already works `load` shifts.
    pub(crate) fn fairness_penalty(&self, load: usize) -> i64 {
        self.fairness_weight
            .map(|w| (w * 10.0 * load as f64).round() as i64)
            .unwrap_or(0)
    }
}

/// Builds a [`RosterModel`] from a scheduling problem.
///
/// # Example
/// ```
/// use shift_roster::cp::RosterCpBuilder;
/// use shift_roster::evaluation::CandidateEvaluator;
/// use shift_roster::models::SchedulingProblem;
///
/// let problem = SchedulingProblem::new("org");
/// let evaluator = CandidateEvaluator::standard();
/// let model = RosterCpBuilder::new(&problem, &evaluator).build().unwrap();
/// assert_eq!(model.shift_count(), 0);
/// ```
pub struct RosterCpBuilder<'p> {
    problem: &'p SchedulingProblem,
    evaluator: &'p CandidateEvaluator,
    order: Option<Vec<String>>,
}

impl<'p> RosterCpBuilder<'p> {
    /// Creates a new builder.
    pub fn new(problem: &'p SchedulingProblem, evaluator: &'p CandidateEvaluator) -> Self {
        Self {
            problem,
            evaluator,
            order: None,
        }
    }

    /// Fixes the shift search order. Shifts missing from `order` follow
    /// in start-time order.
    pub fn with_order(mut self, order: &[String]) -> Self {
        self.order = Some(order.to_vec());
        self
    }

    /// Compiles the model.
    pub fn build(&self) -> Result<RosterModel<'p>, SolverError> {
        let problem = self.problem;
        let clock = problem.clock().map_err(SolverError::InvalidProblem)?;
        let limits: Vec<HardLimits> = problem
            .employees
            .iter()
            .map(|e| HardLimits::for_employee(&problem.constraints, e))
            .collect();

        let mut candidates = Vec::with_capacity(problem.shifts.len());
        let mut rejections = Vec::with_capacity(problem.shifts.len());
        for shift in &problem.shifts {
            let mut eligible = Vec::new();
            let mut excluded = Vec::new();
            for (idx, employee) in problem.employees.iter().enumerate() {
                let ctx = CandidateContext::new(shift, employee, &problem.constraints)
                    .with_clock(clock);
                let score = self.evaluator.evaluate(&ctx);
                if !score.is_feasible() {
                    let reason = score.rejection_reason().unwrap_or("Score too low");
                    excluded.push(format!("{}: {}", employee.name, reason));
                } else if !limits[idx].admits(shift, &employee.existing_shifts, clock) {
                    excluded.push(format!("{}: Would break a hard labor limit", employee.name));
                } else {
                    eligible.push(Candidate {
                        employee: idx,
                        affinity: score.score as i64,
                    });
                }
            }
            eligible.sort_by(|a, b| {
                b.affinity.cmp(&a.affinity).then_with(|| {
                    problem.employees[a.employee]
                        .id
                        .cmp(&problem.employees[b.employee].id)
                })
            });
            candidates.push(eligible);
            rejections.push(excluded);
        }

        let order = match &self.order {
            Some(ids) => fixed_order(problem, ids),
            None => fail_first_order(problem, &candidates),
        };

        Ok(RosterModel {
            problem,
            clock,
            order,
            candidates,
            rejections,
            limits,
            fairness_weight: problem.constraints.fairness_weight,
        })
    }
}

fn fixed_order(problem: &SchedulingProblem, ids: &[String]) -> Vec<usize> {
    let index: HashMap<&str, usize> = problem
        .shifts
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id.as_str(), i))
        .collect();

    let mut seen = vec![false; problem.shifts.len()];
    let mut order = Vec::with_capacity(problem.shifts.len());
    for id in ids {
        if let Some(&i) = index.get(id.as_str()) {
            if !seen[i] {
                seen[i] = true;
                order.push(i);
            }
        }
    }
    for shift in shifts_in_order(&problem.shifts) {
        let i = index[shift.id.as_str()];
        if !seen[i] {
            seen[i] = true;
            order.push(i);
        }
    }
    order
}

fn fail_first_order(problem: &SchedulingProblem, candidates: &[Vec<Candidate>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..problem.shifts.len()).collect();
    order.sort_by(|&a, &b| {
        let (sa, sb) = (&problem.shifts[a], &problem.shifts[b]);
        candidates[a]
            .len()
            .cmp(&candidates[b].len())
            .then_with(|| sa.start_time.cmp(&sb.start_time))
            .then_with(|| sa.id.cmp(&sb.id))
    });
    order
}

/// Scores placements by replaying them in shift start order through the
/// evaluator, so every assignment carries reasons and warnings that
/// reflect the final roster. Each assignment gets `tag` as first reason.
pub fn rescore(
    problem: &SchedulingProblem,
    evaluator: &CandidateEvaluator,
    clock: LocalClock,
    placements: &[(&Shift, &Employee)],
    tag: &str,
) -> Vec<ShiftAssignment> {
    let mut ordered = placements.to_vec();
    ordered.sort_by(|a, b| {
        a.0.start_time
            .cmp(&b.0.start_time)
            .then_with(|| a.0.id.cmp(&b.0.id))
    });

    let mut roster = RosterState::from_employees(&problem.employees);
    let mut assignments = Vec::with_capacity(ordered.len());
    for (shift, employee) in ordered {
        let ctx = CandidateContext::new(shift, employee, &problem.constraints)
            .with_working_set(roster.working_set(&employee.id))
            .with_clock(clock);
        let score = evaluator.evaluate(&ctx);

        let mut reasons = vec![tag.to_string()];
        reasons.extend(score.reasons);
        assignments.push(ShiftAssignment {
            shift_id: shift.id.clone(),
            employee_id: employee.id.clone(),
            score: score.score,
            reasons,
            warnings: score.warnings,
        });
        roster.commit(&employee.id, shift);
    }
    assignments
}

/// One-line summary of a solution.
pub fn summarize(assigned: usize, total: usize, metrics: &SolutionMetrics) -> String {
    format!(
        "Assigned {assigned} of {total} shifts | Coverage rate: {:.1}% | \
         Fairness score: {:.2} | Cost efficiency: {:.2} | Using {} employees",
        metrics.coverage_rate * 100.0,
        metrics.fairness_score,
        metrics.cost_efficiency,
        metrics.employees_used
    )
}

/// In-process constraint-programming solver.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use shift_roster::cp::CpSolver;
/// use shift_roster::models::{SchedulingProblem, SolveStatus};
/// use shift_roster::solver::ConstraintSolver;
///
/// let solution = CpSolver::new()
///     .solve(&SchedulingProblem::new("org"), Duration::from_secs(1))
///     .unwrap();
/// assert_eq!(solution.status, SolveStatus::Optimal);
/// ```
#[derive(Debug, Clone)]
pub struct CpSolver {
    evaluator: CandidateEvaluator,
    node_limit: u64,
}

impl CpSolver {
    /// Creates a solver with the standard evaluator.
    pub fn new() -> Self {
        Self {
            evaluator: CandidateEvaluator::standard(),
            node_limit: DEFAULT_NODE_LIMIT,
        }
    }

    /// Sets the search node limit.
    pub fn with_node_limit(mut self, node_limit: u64) -> Self {
        self.node_limit = node_limit.max(1);
        self
    }

    /// Replaces the evaluator.
    pub fn with_evaluator(mut self, evaluator: CandidateEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Solves with an optional fixed shift order.
    pub fn solve_with_order(
        &self,
        problem: &SchedulingProblem,
        order: Option<&[String]>,
        timeout: Duration,
    ) -> Result<SchedulingSolution, SolverError> {
        let started = Instant::now();
        let mut builder = RosterCpBuilder::new(problem, &self.evaluator);
        if let Some(order) = order {
            builder = builder.with_order(order);
        }
        let model = builder.build()?;
        debug!(
            shifts = model.shift_count(),
            employees = problem.employees.len(),
            "built roster model"
        );

        let outcome = search::branch_and_bound(&model, started + timeout, self.node_limit);
        let stats = outcome.stats;
        let Some(best) = outcome.best else {
            return Err(if stats.timed_out {
                SolverError::Timeout {
                    budget_ms: timeout.as_millis() as u64,
                }
            } else {
                SolverError::NoSolution(format!(
                    "node limit of {} reached before a first solution",
                    self.node_limit
                ))
            });
        };

        let placements: Vec<(&Shift, &Employee)> = best
            .iter()
            .enumerate()
            .filter_map(|(s, e)| e.map(|e| (&problem.shifts[s], &problem.employees[e])))
            .collect();
        let assignments = rescore(
            problem,
            &self.evaluator,
            model.clock,
            &placements,
            SELECTED_REASON,
        );

        let unassignable: Vec<UnassignableShift> = shifts_in_order(&problem.shifts)
            .into_iter()
            .filter_map(|shift| {
                let s = problem.shifts.iter().position(|x| x.id == shift.id)?;
                if best[s].is_some() {
                    return None;
                }
                let reasons: Vec<String> = if model.candidates[s].is_empty() {
                    std::iter::once(NO_CANDIDATE_REASON.to_string())
                        .chain(model.rejections[s].iter().cloned())
                        .collect()
                } else {
                    vec![CONFLICT_REASON.to_string()]
                };
                Some(UnassignableShift {
                    shift_id: shift.id.clone(),
                    reasons,
                })
            })
            .collect();

        let status = if assignments.is_empty() && !problem.shifts.is_empty() {
            SolveStatus::Infeasible
        } else if stats.exhaustive {
            SolveStatus::Optimal
        } else {
            SolveStatus::Feasible
        };
        let metrics = SolutionMetrics::calculate(&assignments, problem);
        let explanation = summarize(assignments.len(), problem.shifts.len(), &metrics);

        info!(
            status = ?status,
            assigned = assignments.len(),
            shifts = problem.shifts.len(),
            nodes = stats.nodes,
            "constraint search finished"
        );

        Ok(SchedulingSolution {
            assignments,
            unassignable,
            solver: SolverKind::ConstraintProgramming,
            status,
            solve_time_ms: started.elapsed().as_millis() as u64,
            explanation,
            metrics,
        })
    }
}

impl Default for CpSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintSolver for CpSolver {
    fn name(&self) -> &'static str {
        "in-process-cp"
    }

    fn solve(
        &self,
        problem: &SchedulingProblem,
        timeout: Duration,
    ) -> Result<SchedulingSolution, SolverError> {
        self.solve_with_order(problem, None, timeout)
    }

    fn solve_ordered(
        &self,
        problem: &SchedulingProblem,
        order: &[String],
        timeout: Duration,
    ) -> Result<SchedulingSolution, SolverError> {
        self.solve_with_order(problem, Some(order), timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AvailabilityWindow;
    use crate::scheduler::GreedyScheduler;
    use chrono::{DateTime, TimeZone, Utc};

    // 2024-11-11 is a Monday
    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, day, hour, 0, 0).unwrap()
    }

    fn all_week(id: &str) -> Employee {
        (0..7).fold(Employee::new(id, id), |e, day| {
            e.with_availability(AvailabilityWindow::parse(day, "00:00", "24:00").unwrap())
        })
    }

    fn budget() -> Duration {
        Duration::from_secs(5)
    }

    #[test]
    fn test_limits_admit() {
        let c = SchedulingConstraints::default();
        let emp = all_week("E1");
        let limits = HardLimits::for_employee(&c, &emp);
        let clock = LocalClock::utc();
        let shift = Shift::new("S", at(11, 9), at(11, 17), "L1");

        assert!(limits.admits(&shift, &[], clock));
        // 4 hours rest < 8
        assert!(!limits.admits(&shift, &[CommittedShift::new(at(11, 1), at(11, 5))], clock));
        // 40 hours already
        let week: Vec<_> = (12..17).map(|d| CommittedShift::new(at(d, 9), at(d, 17))).collect();
        assert!(!limits.admits(&shift, &week, clock));
    }

    #[test]
    fn test_limits_consecutive_and_daily() {
        let c = SchedulingConstraints::default()
            .with_max_consecutive_days(3)
            .with_max_hours_per_day(6.0);
        let limits = HardLimits::for_employee(&c, &all_week("E1"));
        let clock = LocalClock::utc();

        let streak: Vec<_> = (8..11).map(|d| CommittedShift::new(at(d, 9), at(d, 11))).collect();
        let shift = Shift::new("S", at(11, 9), at(11, 11), "L1");
        assert!(!limits.admits(&shift, &streak, clock));

        let long = Shift::new("L", at(11, 9), at(11, 16), "L1");
        assert!(!limits.admits(&long, &[], clock));
    }

    #[test]
    fn test_covers_what_greedy_misses() {
        // Greedy gives S1 to the cheaper E1, who is the only one who can
        // work S2. Search covers both.
        let problem = SchedulingProblem::new("org")
            .with_shift(Shift::new("S1", at(11, 8), at(11, 12), "L1"))
            .with_shift(Shift::new("S2", at(11, 10), at(11, 14), "L1").with_required_skill("keys"))
            .with_employee(all_week("E1").with_hourly_rate(10.0).with_skill("keys"))
            .with_employee(all_week("E2").with_hourly_rate(25.0));

        let greedy = GreedyScheduler::new().solve(&problem);
        assert_eq!(greedy.assignments.len(), 1);

        let cp = CpSolver::new().solve(&problem, budget()).unwrap();
        assert_eq!(cp.assignments.len(), 2);
        assert_eq!(cp.status, SolveStatus::Optimal);
        assert_eq!(cp.assignment_for("S2").unwrap().employee_id, "E1");
        assert_eq!(cp.assignment_for("S1").unwrap().employee_id, "E2");
        assert!(cp.assignments.iter().all(|a| a.reasons[0] == SELECTED_REASON));
    }

    #[test]
    fn test_rest_is_hard() {
        let problem = SchedulingProblem::new("org")
            .with_shift(Shift::new("S1", at(11, 6), at(11, 10), "L1"))
            .with_shift(Shift::new("S2", at(11, 14), at(11, 18), "L1"))
            .with_employee(all_week("E1"));

        let cp = CpSolver::new().solve(&problem, budget()).unwrap();
        assert_eq!(cp.assignments.len(), 1);
        assert_eq!(cp.unassignable[0].reasons, vec![CONFLICT_REASON]);
    }

    #[test]
    fn test_no_candidates_reason() {
        let problem = SchedulingProblem::new("org")
            .with_shift(Shift::new("S1", at(11, 6), at(11, 10), "L1").with_required_skill("x"))
            .with_employee(all_week("E1"));

        let cp = CpSolver::new().solve(&problem, budget()).unwrap();
        assert_eq!(cp.status, SolveStatus::Infeasible);
        assert_eq!(cp.unassignable[0].reasons[0], NO_CANDIDATE_REASON);
        assert_eq!(cp.unassignable[0].reasons[1], "E1: Missing required skills: x");
    }

    #[test]
    fn test_fairness_weight_spreads_load() {
        let shifts: Vec<_> = (11..15)
            .map(|d| Shift::new(format!("S{d}"), at(d, 9), at(d, 13), "L1"))
            .collect();
        let problem = SchedulingProblem::new("org")
            .with_shifts(shifts)
            .with_employee(all_week("E1").with_hourly_rate(10.0))
            .with_employee(all_week("E2").with_hourly_rate(12.0))
            .with_constraints(SchedulingConstraints::new().with_fairness_weight(5.0));

        let cp = CpSolver::new().solve(&problem, budget()).unwrap();
        assert_eq!(cp.assignments.len(), 4);
        assert_eq!(cp.assignments_of("E1").count(), 2);
        assert_eq!(cp.assignments_of("E2").count(), 2);
    }

    #[test]
    fn test_fixed_order_appends_missing() {
        let problem = SchedulingProblem::new("org")
            .with_shift(Shift::new("A", at(11, 8), at(11, 9), "L1"))
            .with_shift(Shift::new("B", at(12, 8), at(12, 9), "L1"))
            .with_shift(Shift::new("C", at(13, 8), at(13, 9), "L1"));
        let evaluator = CandidateEvaluator::standard();
        let model = RosterCpBuilder::new(&problem, &evaluator)
            .with_order(&["C".to_string(), "ghost".to_string()])
            .build()
            .unwrap();
        assert_eq!(model.search_order(), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_node_limit_without_incumbent() {
        let shifts: Vec<_> = (11..16)
            .map(|d| Shift::new(format!("S{d}"), at(d, 9), at(d, 13), "L1"))
            .collect();
        let problem = SchedulingProblem::new("org")
            .with_shifts(shifts)
            .with_employee(all_week("E1"));

        let err = CpSolver::new()
            .with_node_limit(2)
            .solve(&problem, budget())
            .unwrap_err();
        assert!(matches!(err, SolverError::NoSolution(_)));
    }

    #[test]
    fn test_invalid_timezone() {
        let problem = SchedulingProblem::new("org").with_timezone("Not/AZone");
        let err = CpSolver::new().solve(&problem, budget()).unwrap_err();
        assert!(matches!(err, SolverError::InvalidProblem(_)));
    }
}
