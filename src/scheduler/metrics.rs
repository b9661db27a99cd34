//! Solution quality metrics.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total score | Sum of assignment scores |
//! | Fairness | max(0, 1 − variance/mean) of shift counts per used employee |
//! | Cost efficiency | 1 − (avg cost per hour − 15)/20, clamped to [0, 1] |
//! | Coverage rate | Staffed shifts / total shifts (1.0 with no shifts) |
//!
//! Cost uses paid hours (breaks excluded) at the shift rate, else the
//! employee rate, else the baseline rate of 15.
//!
//! # Reference
//! Van den Bergh et al. (2013), "Personnel scheduling: A literature
//! review", EJOR 226(3)

use std::collections::HashMap;

use crate::models::{SchedulingProblem, ShiftAssignment, SolutionMetrics};

/// Hourly rate assumed when neither shift nor employee has one.
pub const BASELINE_HOURLY_RATE: f64 = 15.0;

impl SolutionMetrics {
    /// Computes metrics for a set of assignments.
    ///
    /// # Arguments
    /// * `assignments` - Staffed shifts.
    /// * `problem` - The problem they solve (for shift hours and rates).
    pub fn calculate(assignments: &[ShiftAssignment], problem: &SchedulingProblem) -> Self {
        let shifts: HashMap<&str, _> = problem.shifts.iter().map(|s| (s.id.as_str(), s)).collect();
        let employees: HashMap<&str, _> = problem
            .employees
            .iter()
            .map(|e| (e.id.as_str(), e))
            .collect();

        let mut per_employee: HashMap<&str, usize> = HashMap::new();
        let mut total_score = 0.0;
        let mut total_cost = 0.0;
        let mut total_hours = 0.0;

        for assignment in assignments {
            total_score += assignment.score as f64;
            *per_employee.entry(assignment.employee_id.as_str()).or_default() += 1;

            if let Some(shift) = shifts.get(assignment.shift_id.as_str()) {
                let rate = shift
                    .hourly_rate
                    .or_else(|| {
                        employees
                            .get(assignment.employee_id.as_str())
                            .and_then(|e| e.default_hourly_rate)
                    })
                    .unwrap_or(BASELINE_HOURLY_RATE);
                let hours = shift.paid_hours();
                total_cost += rate * hours;
                total_hours += hours;
            }
        }

        let avg_cost_per_hour = if total_hours > 0.0 {
            total_cost / total_hours
        } else {
            0.0
        };

        let coverage_rate = if problem.shifts.is_empty() {
            1.0
        } else {
            assignments.len() as f64 / problem.shifts.len() as f64
        };

        Self {
            total_score,
            fairness_score: fairness_score(per_employee.values().copied()),
            cost_efficiency: cost_efficiency(avg_cost_per_hour),
            coverage_rate,
            total_cost,
            avg_cost_per_hour,
            employees_used: per_employee.len(),
        }
    }
}

/// Evenness of shift counts: `max(0, 1 − variance/mean)`.
///
/// 0.0 with no counts.
pub fn fairness_score(counts: impl IntoIterator<Item = usize>) -> f64 {
    let counts: Vec<f64> = counts.into_iter().map(|c| c as f64).collect();
    if counts.is_empty() {
        return 0.0;
    }
    let n = counts.len() as f64;
    let mean = counts.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return 0.0;
    }
    let variance = counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n;
    (1.0 - variance / mean).max(0.0)
}

/// Cost efficiency of an average hourly cost, clamped to [0, 1].
pub fn cost_efficiency(avg_cost_per_hour: f64) -> f64 {
    (1.0 - (avg_cost_per_hour - BASELINE_HOURLY_RATE) / 20.0).clamp(0.0, 1.0)
}
