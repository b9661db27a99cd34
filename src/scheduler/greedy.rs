//! Scored greedy assignment.
//!
//! # Algorithm
//!
//! 1. Order shifts by start time ascending (ties by shift ID).
//! 2. For each shift, score every employee against their current working
//!    set with the candidate evaluator.
//! 3. Rank candidates by score descending (ties by employee ID) and commit
//!    the best one if its score is positive.
//! 4. Append the committed shift to that employee's working set, so hour,
//!    rest and fairness rules see the load when later shifts are scored.
//!
//! Single pass, no backtracking: fast and explainable, not optimal. The
//! result depends on shift order, which is always the one above.
//!
//! # Complexity
//! O(s · e · w) where s=shifts, e=employees, w=working set size.
//!
//! # Reference
//! Ernst et al. (2004), "Staff scheduling and rostering", Sec. 4
//! (constructive heuristics)

use std::cmp::Ordering;
use std::time::Instant;

use tracing::{debug, warn};

use super::RosterState;
use crate::evaluation::{CandidateContext, CandidateEvaluator, CandidateScore};
use crate::models::{
    Employee, LocalClock, SchedulingConstraints, SchedulingProblem, SchedulingSolution, Shift,
    ShiftAssignment, SolutionMetrics, SolveStatus, SolverKind, UnassignableShift,
};

/// Leading reason of every unassignable shift.
pub const NO_MATCH_REASON: &str = "No available employees match this shift's requirements";

/// Result of a greedy pass.
#[derive(Debug, Clone)]
pub struct GreedyOutcome {
    /// Staffed shifts, in processing order.
    pub assignments: Vec<ShiftAssignment>,
    /// Shifts without a positive-scoring candidate.
    pub unassignable: Vec<UnassignableShift>,
    /// Working sets at the end of the pass.
    pub roster: RosterState,
}

/// A scored candidate for one shift.
#[derive(Debug, Clone)]
pub struct RankedCandidate<'a> {
    /// Candidate employee.
    pub employee: &'a Employee,
    /// Candidate score.
    pub score: CandidateScore,
}

/// Greedy shift assigner.
///
/// # Example
///
/// ```
/// use shift_roster::scheduler::GreedyScheduler;
/// use shift_roster::models::{AvailabilityWindow, Employee, SchedulingProblem, Shift};
/// use chrono::{TimeZone, Utc};
///
/// let problem = SchedulingProblem::new("org")
///     .with_shift(Shift::new(
///         "S1",
///         Utc.with_ymd_and_hms(2024, 11, 11, 10, 0, 0).unwrap(),
///         Utc.with_ymd_and_hms(2024, 11, 11, 14, 0, 0).unwrap(),
///         "store-1",
///     ))
///     .with_employee(
///         Employee::new("E1", "Alice")
///             .with_availability(AvailabilityWindow::parse(1, "09:00", "17:00").unwrap()),
///     );
///
/// let solution = GreedyScheduler::new().solve(&problem);
/// assert_eq!(solution.assignments.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GreedyScheduler {
    evaluator: CandidateEvaluator,
}

impl GreedyScheduler {
    /// Creates a scheduler with the standard evaluator.
    pub fn new() -> Self {
        Self {
            evaluator: CandidateEvaluator::standard(),
        }
    }

    /// Replaces the evaluator.
    pub fn with_evaluator(mut self, evaluator: CandidateEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// The evaluator in use.
    pub fn evaluator(&self) -> &CandidateEvaluator {
        &self.evaluator
    }

    /// Scores every employee for a shift against the current roster.
    ///
    /// Sorted by score descending, then employee ID ascending.
    pub fn rank<'a>(
        &self,
        shift: &Shift,
        employees: &'a [Employee],
        roster: &RosterState,
        constraints: &SchedulingConstraints,
        clock: LocalClock,
    ) -> Vec<RankedCandidate<'a>> {
        let mut ranked: Vec<RankedCandidate<'a>> = employees
            .iter()
            .map(|employee| {
                let ctx = CandidateContext::new(shift, employee, constraints)
                    .with_working_set(roster.working_set(&employee.id))
                    .with_clock(clock);
                RankedCandidate {
                    employee,
                    score: self.evaluator.evaluate(&ctx),
                }
            })
            .collect();
        ranked.sort_by(compare_candidates);
        ranked
    }

    /// Assigns shifts one at a time, best candidate first.
    pub fn assign(
        &self,
        shifts: &[Shift],
        employees: &[Employee],
        constraints: &SchedulingConstraints,
        clock: LocalClock,
    ) -> GreedyOutcome {
        let mut roster = RosterState::from_employees(employees);
        let mut assignments = Vec::new();
        let mut unassignable = Vec::new();

        for shift in shifts_in_order(shifts) {
            let ranked = self.rank(shift, employees, &roster, constraints, clock);

            match ranked.first() {
                Some(best) if best.score.is_feasible() => {
                    debug!(
                        shift = %shift.id,
                        employee = %best.employee.id,
                        score = best.score.score,
                        "assigned shift"
                    );
                    assignments.push(ShiftAssignment {
                        shift_id: shift.id.clone(),
                        employee_id: best.employee.id.clone(),
                        score: best.score.score,
                        reasons: best.score.reasons.clone(),
                        warnings: best.score.warnings.clone(),
                    });
                    roster.commit(&best.employee.id, shift);
                }
                _ => {
                    debug!(shift = %shift.id, candidates = ranked.len(), "no feasible candidate");
                    unassignable.push(UnassignableShift {
                        shift_id: shift.id.clone(),
                        reasons: unassignable_reasons(&ranked),
                    });
                }
            }
        }

        GreedyOutcome {
            assignments,
            unassignable,
            roster,
        }
    }

    /// Solves a whole problem greedily.
    ///
    /// Status is `FEASIBLE` when anything was assigned (or there was
    /// nothing to assign), `INFEASIBLE` otherwise.
    pub fn solve(&self, problem: &SchedulingProblem) -> SchedulingSolution {
        let started = Instant::now();
        let clock = problem.clock().unwrap_or_else(|err| {
            warn!(%err, "falling back to UTC");
            LocalClock::utc()
        });

        let outcome = self.assign(
            &problem.shifts,
            &problem.employees,
            &problem.constraints,
            clock,
        );

        let status = if outcome.assignments.is_empty() && !problem.shifts.is_empty() {
            SolveStatus::Infeasible
        } else {
            SolveStatus::Feasible
        };
        let metrics = SolutionMetrics::calculate(&outcome.assignments, problem);
        let explanation = format!(
            "Greedy assignment staffed {} of {} shifts ({:.1}% coverage)",
            outcome.assignments.len(),
            problem.shifts.len(),
            metrics.coverage_rate * 100.0
        );

        SchedulingSolution {
            assignments: outcome.assignments,
            unassignable: outcome.unassignable,
            solver: SolverKind::Greedy,
            status,
            solve_time_ms: started.elapsed().as_millis() as u64,
            explanation,
            metrics,
        }
    }
}

impl Default for GreedyScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Shifts by start time ascending, ties by ID.
pub fn shifts_in_order(shifts: &[Shift]) -> Vec<&Shift> {
    let mut ordered: Vec<&Shift> = shifts.iter().collect();
    ordered.sort_by(|a, b| {
        a.start_time
            .cmp(&b.start_time)
            .then_with(|| a.id.cmp(&b.id))
    });
    ordered
}

fn compare_candidates(a: &RankedCandidate<'_>, b: &RankedCandidate<'_>) -> Ordering {
    b.score
        .score
        .cmp(&a.score.score)
        .then_with(|| a.employee.id.cmp(&b.employee.id))
}

fn unassignable_reasons(ranked: &[RankedCandidate<'_>]) -> Vec<String> {
    let mut reasons = vec![NO_MATCH_REASON.to_string()];
    reasons.extend(ranked.iter().filter_map(|c| {
        c.score
            .rejection_reason()
            .map(|reason| format!("{}: {}", c.employee.name, reason))
    }));
    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AvailabilityWindow, CommittedShift};
    use chrono::{DateTime, TimeZone, Utc};

    // 2024-11-11 is a Monday
    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, day, hour, 0, 0).unwrap()
    }

    fn all_week(id: &str, name: &str) -> Employee {
        (0..7).fold(Employee::new(id, name), |e, day| {
            e.with_availability(AvailabilityWindow::parse(day, "06:00", "23:00").unwrap())
        })
    }

    #[test]
    fn test_assigns_in_start_order() {
        let problem = SchedulingProblem::new("org")
            .with_shift(Shift::new("late", at(11, 15), at(11, 19), "L1"))
            .with_shift(Shift::new("early", at(11, 8), at(11, 12), "L1"))
            .with_employee(all_week("E1", "Alice"));

        let solution = GreedyScheduler::new().solve(&problem);
        assert_eq!(solution.assignments[0].shift_id, "early");
        assert_eq!(solution.assignments.len(), 2);
        // Only 3 hours rest between them
        assert!(solution.assignments[1]
            .warnings
            .iter()
            .any(|w| w.contains("rest")));
    }

    #[test]
    fn test_tie_breaks_by_employee_id() {
        let problem = SchedulingProblem::new("org")
            .with_shift(Shift::new("S1", at(11, 8), at(11, 12), "L1"))
            .with_employee(all_week("E2", "Zed"))
            .with_employee(all_week("E1", "Amy"));

        let solution = GreedyScheduler::new().solve(&problem);
        assert_eq!(solution.assignments[0].employee_id, "E1");
    }

    #[test]
    fn test_working_set_grows_during_pass() {
        // E1 is cheaper, so wins the first shift; the overlapping second
        // shift must then go to E2.
        let problem = SchedulingProblem::new("org")
            .with_shift(Shift::new("S1", at(11, 8), at(11, 12), "L1"))
            .with_shift(Shift::new("S2", at(11, 10), at(11, 14), "L1"))
            .with_employee(all_week("E1", "Amy").with_hourly_rate(10.0))
            .with_employee(all_week("E2", "Bob").with_hourly_rate(25.0));

        let solution = GreedyScheduler::new().solve(&problem);
        assert_eq!(solution.assignment_for("S1").unwrap().employee_id, "E1");
        assert_eq!(solution.assignment_for("S2").unwrap().employee_id, "E2");
    }

    #[test]
    fn test_unassignable_reasons_name_candidates() {
        let problem = SchedulingProblem::new("org")
            .with_shift(
                Shift::new("S1", at(11, 8), at(11, 12), "L1").with_required_skill("forklift"),
            )
            .with_employee(all_week("E1", "Amy"));

        let solution = GreedyScheduler::new().solve(&problem);
        assert_eq!(solution.status, SolveStatus::Infeasible);
        assert_eq!(solution.unassignable[0].reasons[0], NO_MATCH_REASON);
        assert_eq!(
            solution.unassignable[0].reasons[1],
            "Amy: Missing required skills: forklift"
        );
    }

    #[test]
    fn test_priced_out_candidate_reason() {
        let problem = SchedulingProblem::new("org")
            .with_shift(Shift::new("S1", at(11, 10), at(11, 14), "L1"))
            .with_employee(
                Employee::new("E1", "Ann")
                    .with_hourly_rate(200.0)
                    .with_availability(AvailabilityWindow::parse(1, "09:00", "17:00").unwrap()),
            );

        let solution = GreedyScheduler::new().solve(&problem);
        assert!(solution.assignments.is_empty());
        assert_eq!(
            solution.unassignable[0].reasons,
            vec![
                NO_MATCH_REASON.to_string(),
                "Ann: Score reduced to 0 by soft penalties".to_string(),
            ]
        );
    }

    #[test]
    fn test_existing_shift_conflict() {
        let emp = all_week("E1", "Amy")
            .with_existing_shift(CommittedShift::new(at(11, 8), at(11, 12)));
        let problem = SchedulingProblem::new("org")
            .with_shift(Shift::new("S1", at(11, 11), at(11, 15), "L1"))
            .with_employee(emp);

        let solution = GreedyScheduler::new().solve(&problem);
        assert!(solution.assignments.is_empty());
        assert!(solution.unassignable[0]
            .reasons
            .iter()
            .any(|r| r.to_lowercase().contains("conflict")));
    }

    #[test]
    fn test_empty_problem_is_feasible() {
        let solution = GreedyScheduler::new().solve(&SchedulingProblem::new("org"));
        assert_eq!(solution.status, SolveStatus::Feasible);
        assert_eq!(solution.solver, SolverKind::Greedy);
        assert!((solution.metrics.coverage_rate - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_repeated_runs_identical() {
        let problem = SchedulingProblem::new("org")
            .with_shifts((11..16).flat_map(|d| {
                [
                    Shift::new(format!("A{d}"), at(d, 8), at(d, 14), "L1"),
                    Shift::new(format!("B{d}"), at(d, 14), at(d, 20), "L1"),
                ]
            }))
            .with_employee(all_week("E1", "Amy"))
            .with_employee(all_week("E2", "Bob"))
            .with_employee(all_week("E3", "Cat"));

        let scheduler = GreedyScheduler::new();
        let first = scheduler.solve(&problem);
        for _ in 0..5 {
            assert_eq!(scheduler.solve(&problem).assignments, first.assignments);
        }
    }
}
