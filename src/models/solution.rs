//! Scheduling solution model.
//!
//! The output of one solve: which employee staffs which shift, which
//! shifts could not be staffed and why, which solver produced the result,
//! and aggregate quality metrics.

use serde::{Deserialize, Serialize};

/// Solver that produced a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolverKind {
    /// Scored greedy assignment.
    #[serde(rename = "greedy")]
    Greedy,
    /// Constraint-programming search.
    #[serde(rename = "ortools")]
    ConstraintProgramming,
    /// Multi-stage pipeline.
    #[serde(rename = "universal")]
    MultiStage,
}

impl SolverKind {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greedy => "greedy",
            Self::ConstraintProgramming => "ortools",
            Self::MultiStage => "universal",
        }
    }
}

/// Outcome status of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    /// Proven best under the solver's objective.
    Optimal,
    /// Satisfies all hard constraints.
    Feasible,
    /// No assignment could be made.
    Infeasible,
    /// Search ended without a conclusion.
    Unknown,
    /// The solver failed.
    Error,
}

/// One shift staffed by one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftAssignment {
    /// Staffed shift.
    pub shift_id: String,
    /// Assigned employee.
    pub employee_id: String,
    /// Candidate score 0..=100.
    pub score: u8,
    /// Positive factors.
    #[serde(default)]
    pub reasons: Vec<String>,
    /// Soft violations.
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// A shift nobody could staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnassignableShift {
    /// Unstaffed shift.
    pub shift_id: String,
    /// Why no candidate was chosen.
    #[serde(default)]
    pub reasons: Vec<String>,
}

/// Aggregate quality metrics of a solution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionMetrics {
    /// Sum of assignment scores.
    pub total_score: f64,
    /// Evenness of shift counts, 0..=1.
    pub fairness_score: f64,
    /// Labor-cost efficiency, 0..=1.
    pub cost_efficiency: f64,
    /// Staffed shifts / total shifts, 0..=1.
    pub coverage_rate: f64,
    /// Total labor cost of assigned paid hours.
    #[serde(default)]
    pub total_cost: f64,
    /// Average cost per paid hour.
    #[serde(default)]
    pub avg_cost_per_hour: f64,
    /// Distinct employees with at least one assignment.
    #[serde(default)]
    pub employees_used: usize,
}

/// The result of one solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingSolution {
    /// Staffed shifts.
    pub assignments: Vec<ShiftAssignment>,
    /// Unstaffed shifts.
    pub unassignable: Vec<UnassignableShift>,
    /// Producing solver.
    pub solver: SolverKind,
    /// Outcome status.
    pub status: SolveStatus,
    /// Wall-clock solve time in milliseconds.
    #[serde(rename = "solveTime")]
    pub solve_time_ms: u64,
    /// Free-text explanation.
    #[serde(default)]
    pub explanation: String,
    /// Aggregate metrics.
    pub metrics: SolutionMetrics,
}

impl SchedulingSolution {
    /// Creates an empty solution.
    pub fn new(solver: SolverKind, status: SolveStatus) -> Self {
        Self {
            assignments: Vec::new(),
            unassignable: Vec::new(),
            solver,
            status,
            solve_time_ms: 0,
            explanation: String::new(),
            metrics: SolutionMetrics::default(),
        }
    }

    /// The assignment for a shift, if staffed.
    pub fn assignment_for(&self, shift_id: &str) -> Option<&ShiftAssignment> {
        self.assignments.iter().find(|a| a.shift_id == shift_id)
    }

    /// Assignments of one employee.
    pub fn assignments_of<'a>(
        &'a self,
        employee_id: &'a str,
    ) -> impl Iterator<Item = &'a ShiftAssignment> + 'a {
        self.assignments
            .iter()
            .filter(move |a| a.employee_id == employee_id)
    }

    /// Whether a shift is unstaffed.
    pub fn is_unassignable(&self, shift_id: &str) -> bool {
        self.unassignable.iter().any(|u| u.shift_id == shift_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let mut solution =
            SchedulingSolution::new(SolverKind::ConstraintProgramming, SolveStatus::Optimal);
        solution.solve_time_ms = 12;
        let json = serde_json::to_value(&solution).unwrap();

        assert_eq!(json["solver"], "ortools");
        assert_eq!(json["status"], "OPTIMAL");
        assert_eq!(json["solveTime"], 12);
        assert!(json["metrics"]["coverageRate"].is_number());
        assert_eq!(SolverKind::MultiStage.as_str(), "universal");
    }

    #[test]
    fn test_lookup_helpers() {
        let mut solution = SchedulingSolution::new(SolverKind::Greedy, SolveStatus::Feasible);
        solution.assignments.push(ShiftAssignment {
            shift_id: "S1".into(),
            employee_id: "E1".into(),
            score: 80,
            reasons: vec![],
            warnings: vec![],
        });
        solution.unassignable.push(UnassignableShift {
            shift_id: "S2".into(),
            reasons: vec!["nobody".into()],
        });

        assert_eq!(solution.assignment_for("S1").unwrap().employee_id, "E1");
        assert!(solution.assignment_for("S2").is_none());
        assert_eq!(solution.assignments_of("E1").count(), 1);
        assert!(solution.is_unassignable("S2"));
    }

    #[test]
    fn test_status_parse() {
        let s: SolveStatus = serde_json::from_str("\"INFEASIBLE\"").unwrap();
        assert_eq!(s, SolveStatus::Infeasible);
    }
}
