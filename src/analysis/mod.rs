//! Diagnostics derived from a finished solve.
//!
//! Nothing here changes a solution: [`analyze_coverage`] explains unstaffed
//! shifts and [`employee_insights`] summarizes workloads.

mod coverage;
mod insights;

pub use coverage::{
    analyze_coverage, CoverageGap, ALMOST_AVAILABLE_MARGIN_MINUTES, LOW_HOURS_THRESHOLD,
    POST_FOR_PICKUP,
};
pub use insights::{employee_insights, EmployeeInsight};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::classify::{classify, ProblemComplexity};
use crate::models::{LocalClock, SchedulingProblem, SchedulingSolution};
use crate::scheduler::RosterState;

/// A solution with its diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleReport {
    /// Classifier verdict for the problem.
    pub complexity: ProblemComplexity,
    pub solution: SchedulingSolution,
    /// One entry per unassignable shift.
    pub coverage_gaps: Vec<CoverageGap>,
    /// One entry per employee, in input order.
    pub employee_insights: Vec<EmployeeInsight>,
}

impl ScheduleReport {
    /// Analyzes `solution` against the problem it solves.
    pub fn build(problem: &SchedulingProblem, solution: SchedulingSolution) -> Self {
        let clock = problem.clock().unwrap_or_else(|err| {
            warn!(%err, "falling back to UTC");
            LocalClock::utc()
        });
        let roster = RosterState::from_solution(problem, &solution);
        Self {
            complexity: classify(problem),
            coverage_gaps: analyze_coverage(
                &solution.unassignable,
                &problem.shifts,
                &problem.employees,
                &roster,
                clock,
            ),
            employee_insights: employee_insights(&problem.employees, &roster),
            solution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AvailabilityWindow, Employee, Shift};
    use crate::scheduler::GreedyScheduler;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_report_counts_new_assignments() {
        let problem = SchedulingProblem::new("org")
            .with_shift(Shift::new(
                "S1",
                Utc.with_ymd_and_hms(2024, 11, 11, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 11, 11, 14, 0, 0).unwrap(),
                "L1",
            ))
            .with_shift(Shift::new(
                "S2",
                Utc.with_ymd_and_hms(2024, 11, 12, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 11, 12, 14, 0, 0).unwrap(),
                "L1",
            ))
            .with_employee(
                Employee::new("E1", "Ann")
                    .with_availability(AvailabilityWindow::parse(1, "09:00", "17:00").unwrap()),
            );
        let solution = GreedyScheduler::new().solve(&problem);
        let report = ScheduleReport::build(&problem, solution);

        assert_eq!(report.complexity, ProblemComplexity::Simple);
        assert_eq!(report.coverage_gaps.len(), 1);
        assert_eq!(report.coverage_gaps[0].shift_id, "S2");
        assert_eq!(report.employee_insights.len(), 1);
        assert!((report.employee_insights[0].weekly_hours - 4.0).abs() < 1e-10);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("coverageGaps").is_some());
        assert_eq!(json["solution"]["solver"], "greedy");
    }
}
