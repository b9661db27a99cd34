//! Per-employee workload insights.

use serde::{Deserialize, Serialize};

use crate::models::Employee;
use crate::scheduler::RosterState;

/// Workload summary of one employee, after a solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInsight {
    pub employee_id: String,
    pub employee_name: String,
    /// Rounded to one decimal.
    pub weekly_hours: f64,
    /// Committed plus newly assigned shifts.
    pub shift_count: usize,
    /// Workload notes, at least one per employee.
    pub insights: Vec<String>,
}

/// Insights for every employee that has at least one.
///
/// | Condition | Insight |
/// |-----------|---------|
/// | 0 < hours < 20 | under-scheduled |
/// | 30 ≤ hours ≤ 40 | well balanced |
/// | hours > 40 | approaching overtime |
/// | shifts < 3 and hours > 0 | could take more shifts |
pub fn employee_insights(employees: &[Employee], roster: &RosterState) -> Vec<EmployeeInsight> {
    employees
        .iter()
        .filter_map(|employee| {
            let hours = roster.hours(&employee.id);
            let shift_count = roster.shift_count(&employee.id);

            let mut insights = Vec::new();
            if hours > 0.0 && hours < 20.0 {
                insights.push(format!("Only {hours:.1} hours scheduled - may want more shifts"));
            }
            if (30.0..=40.0).contains(&hours) {
                insights.push(format!("Well-balanced at {hours:.1} hours"));
            }
            if hours > 40.0 {
                insights.push(format!("{hours:.1} hours - approaching overtime"));
            }
            if shift_count < 3 && hours > 0.0 {
                insights.push("Could take on more shifts for better distribution".to_string());
            }

            (!insights.is_empty()).then(|| EmployeeInsight {
                employee_id: employee.id.clone(),
                employee_name: employee.name.clone(),
                weekly_hours: (hours * 10.0).round() / 10.0,
                shift_count,
                insights,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CommittedShift;
    use chrono::{TimeZone, Utc};

    fn with_days(id: &str, days: u32, hours: u32) -> Employee {
        (0..days).fold(Employee::new(id, id), |e, d| {
            e.with_existing_shift(CommittedShift::new(
                Utc.with_ymd_and_hms(2024, 11, 11 + d, 8, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 11, 11 + d, 8 + hours, 0, 0).unwrap(),
            ))
        })
    }

    #[test]
    fn test_buckets() {
        let employees = vec![
            Employee::new("idle", "idle"),
            with_days("light", 2, 4),
            with_days("balanced", 4, 8),
            with_days("heavy", 5, 9),
            with_days("middle", 3, 8),
        ];
        let roster = RosterState::from_employees(&employees);
        let insights = employee_insights(&employees, &roster);

        let ids: Vec<_> = insights.iter().map(|i| i.employee_id.as_str()).collect();
        assert_eq!(ids, vec!["light", "balanced", "heavy"]);

        assert_eq!(insights[0].insights.len(), 2);
        assert_eq!(insights[0].shift_count, 2);
        assert_eq!(insights[1].insights, vec!["Well-balanced at 32.0 hours"]);
        assert_eq!(insights[2].insights, vec!["45.0 hours - approaching overtime"]);
        assert!((insights[2].weekly_hours - 45.0).abs() < 1e-10);
    }
}
