//! Problem classification.
//!
//! Labels a problem `simple`, `complex` or `multi-stage` so the router can
//! pick a solver. Classification is an ordered list of (predicate, label)
//! rules evaluated top to bottom; the first match wins, so a problem that
//! satisfies both a multi-stage and a complex rule is multi-stage.
//!
//! | Order | Rule | Label |
//! |-------|------|-------|
//! | 1 | fairness weight set and a shift carries an hourly rate | multi-stage |
//! | 2 | more than 2 locations and more than 20 shifts | multi-stage |
//! | 3 | cost optimization on and fair distribution requested | multi-stage |
//! | 4 | more than 15 shifts | complex |
//! | 5 | more than 10 employees | complex |
//! | 6 | fair distribution requested | complex |
//! | 7 | more than 1 location and more than 5 shifts | complex |
//! | 8 | an employee has skills, shift-type or location preferences | complex |
//! | - | otherwise | simple |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::SchedulingProblem;

/// Solver routing label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProblemComplexity {
    /// Greedy assignment is enough.
    Simple,
    /// Constraint-programming search.
    Complex,
    /// Multi-stage pipeline.
    MultiStage,
}

impl fmt::Display for ProblemComplexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Simple => "simple",
            Self::Complex => "complex",
            Self::MultiStage => "multi-stage",
        })
    }
}

/// One classification rule.
#[derive(Clone, Copy)]
pub struct ClassificationRule {
    /// Rule name, reported for logging.
    pub name: &'static str,
    /// Label assigned when the predicate holds.
    pub complexity: ProblemComplexity,
    /// Predicate over the problem.
    pub predicate: fn(&SchedulingProblem) -> bool,
}

impl fmt::Debug for ClassificationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassificationRule")
            .field("name", &self.name)
            .field("complexity", &self.complexity)
            .finish()
    }
}

/// Name reported when no rule matches.
pub const DEFAULT_RULE: &str = "default";

/// Classification rules, in precedence order.
pub const RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "fairness_with_shift_rates",
        complexity: ProblemComplexity::MultiStage,
        predicate: |p| p.constraints.fairness_weight.is_some() && p.has_shift_rates(),
    },
    ClassificationRule {
        name: "many_locations_at_scale",
        complexity: ProblemComplexity::MultiStage,
        predicate: |p| p.location_count() > 2 && p.shifts.len() > 20,
    },
    ClassificationRule {
        name: "cost_with_fairness",
        complexity: ProblemComplexity::MultiStage,
        predicate: |p| p.constraints.cost_optimization_enabled && p.requires_fairness(),
    },
    ClassificationRule {
        name: "shift_count",
        complexity: ProblemComplexity::Complex,
        predicate: |p| p.shifts.len() > 15,
    },
    ClassificationRule {
        name: "employee_count",
        complexity: ProblemComplexity::Complex,
        predicate: |p| p.employees.len() > 10,
    },
    ClassificationRule {
        name: "fairness",
        complexity: ProblemComplexity::Complex,
        predicate: |p| p.requires_fairness(),
    },
    ClassificationRule {
        name: "multiple_locations",
        complexity: ProblemComplexity::Complex,
        predicate: |p| p.location_count() > 1 && p.shifts.len() > 5,
    },
    ClassificationRule {
        name: "employee_preferences",
        complexity: ProblemComplexity::Complex,
        predicate: |p| p.employees.iter().any(|e| e.has_preferences()),
    },
];

/// Classifies a problem.
pub fn classify(problem: &SchedulingProblem) -> ProblemComplexity {
    classify_with_reason(problem).0
}

/// Classifies a problem and names the rule that decided it.
pub fn classify_with_reason(problem: &SchedulingProblem) -> (ProblemComplexity, &'static str) {
    RULES
        .iter()
        .find(|rule| (rule.predicate)(problem))
        .map(|rule| (rule.complexity, rule.name))
        .unwrap_or((ProblemComplexity::Simple, DEFAULT_RULE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, SchedulingConstraints, Shift};
    use chrono::{Duration, TimeZone, Utc};

    fn make_shifts(n: usize, locations: usize) -> Vec<Shift> {
        let base = Utc.with_ymd_and_hms(2024, 11, 11, 8, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                let start = base + Duration::hours(i as i64 * 5);
                Shift::new(
                    format!("S{i}"),
                    start,
                    start + Duration::hours(4),
                    format!("L{}", i % locations.max(1)),
                )
            })
            .collect()
    }

    fn make_problem(shifts: usize, employees: usize, locations: usize) -> SchedulingProblem {
        SchedulingProblem::new("org")
            .with_shifts(make_shifts(shifts, locations))
            .with_employees((0..employees).map(|i| Employee::new(format!("E{i}"), "x")))
    }

    #[test]
    fn test_small_is_simple() {
        let (label, rule) = classify_with_reason(&make_problem(3, 2, 1));
        assert_eq!(label, ProblemComplexity::Simple);
        assert_eq!(rule, DEFAULT_RULE);
    }

    #[test]
    fn test_shift_count_boundary() {
        assert_eq!(classify(&make_problem(15, 2, 1)), ProblemComplexity::Simple);
        assert_eq!(classify(&make_problem(16, 2, 1)), ProblemComplexity::Complex);
    }

    #[test]
    fn test_employee_count_boundary() {
        assert_eq!(classify(&make_problem(3, 10, 1)), ProblemComplexity::Simple);
        assert_eq!(classify(&make_problem(3, 11, 1)), ProblemComplexity::Complex);
    }

    #[test]
    fn test_locations() {
        assert_eq!(classify(&make_problem(5, 2, 2)), ProblemComplexity::Simple);
        assert_eq!(classify(&make_problem(6, 2, 2)), ProblemComplexity::Complex);
        assert_eq!(classify(&make_problem(21, 2, 3)), ProblemComplexity::MultiStage);
        assert_eq!(classify(&make_problem(20, 2, 3)), ProblemComplexity::Complex);
    }

    #[test]
    fn test_employee_preferences() {
        let problem =
            make_problem(2, 1, 1).with_employee(Employee::new("X", "x").with_skill("cashier"));
        assert_eq!(
            classify_with_reason(&problem),
            (ProblemComplexity::Complex, "employee_preferences")
        );
    }

    #[test]
    fn test_fairness_routes() {
        let fair = make_problem(2, 1, 1).with_fair_distribution(true);
        assert_eq!(classify(&fair), ProblemComplexity::MultiStage);

        let no_cost = fair
            .clone()
            .with_constraints(SchedulingConstraints::new().with_cost_optimization(false));
        assert_eq!(
            classify_with_reason(&no_cost),
            (ProblemComplexity::Complex, "fairness")
        );
    }

    #[test]
    fn test_fairness_weight_with_rates() {
        let mut problem = make_problem(2, 1, 1)
            .with_constraints(SchedulingConstraints::new().with_fairness_weight(1.0));
        assert_eq!(classify(&problem), ProblemComplexity::Simple);

        problem.shifts[0].hourly_rate = Some(18.0);
        assert_eq!(
            classify_with_reason(&problem),
            (ProblemComplexity::MultiStage, "fairness_with_shift_rates")
        );
    }

    #[test]
    fn test_precedence_multi_stage_over_complex() {
        // 30 shifts also satisfy the shift-count rule
        let problem = make_problem(30, 2, 4);
        assert_eq!(classify(&problem), ProblemComplexity::MultiStage);
    }

    #[test]
    fn test_serde_labels() {
        assert_eq!(
            serde_json::to_string(&ProblemComplexity::MultiStage).unwrap(),
            "\"multi-stage\""
        );
        assert_eq!(ProblemComplexity::Complex.to_string(), "complex");
    }
}
