//! Scheduling problem model.
//!
//! A problem bundles everything one solve needs: the shifts to staff, the
//! employees who may staff them, constraint settings and soft-objective
//! preferences. Problems are built fresh per solve request and never
//! mutated by the solvers.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{Employee, LocalClock, SchedulingConstraints, Shift};

/// Soft-objective switches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingPreferences {
    /// Fairness requirements are present: spread shifts evenly.
    #[serde(default)]
    pub fair_distribution_enabled: bool,
}

/// One scheduling request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingProblem {
    /// Owning organization.
    pub organization_id: String,
    /// IANA timezone used for day-of-week and time-of-day reasoning.
    /// `None` = UTC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Shifts to staff.
    #[serde(default)]
    pub shifts: Vec<Shift>,
    /// Candidate employees.
    #[serde(default)]
    pub employees: Vec<Employee>,
    /// Constraint settings.
    #[serde(default)]
    pub constraints: SchedulingConstraints,
    /// Soft-objective switches.
    #[serde(default)]
    pub preferences: SchedulingPreferences,
}

impl SchedulingProblem {
    /// Creates an empty problem for an organization.
    pub fn new(organization_id: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            timezone: None,
            shifts: Vec::new(),
            employees: Vec::new(),
            constraints: SchedulingConstraints::default(),
            preferences: SchedulingPreferences::default(),
        }
    }

    /// Sets the timezone.
    pub fn with_timezone(mut self, tz: impl Into<String>) -> Self {
        self.timezone = Some(tz.into());
        self
    }

    /// Adds a shift.
    pub fn with_shift(mut self, shift: Shift) -> Self {
        self.shifts.push(shift);
        self
    }

    /// Adds several shifts.
    pub fn with_shifts(mut self, shifts: impl IntoIterator<Item = Shift>) -> Self {
        self.shifts.extend(shifts);
        self
    }

    /// Adds an employee.
    pub fn with_employee(mut self, employee: Employee) -> Self {
        self.employees.push(employee);
        self
    }

    /// Adds several employees.
    pub fn with_employees(mut self, employees: impl IntoIterator<Item = Employee>) -> Self {
        self.employees.extend(employees);
        self
    }

    /// Replaces the constraint settings.
    pub fn with_constraints(mut self, constraints: SchedulingConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Turns fair distribution on or off.
    pub fn with_fair_distribution(mut self, enabled: bool) -> Self {
        self.preferences.fair_distribution_enabled = enabled;
        self
    }

    /// The local clock for this problem's timezone.
    ///
    /// Returns an error for an unknown timezone name.
    pub fn clock(&self) -> Result<LocalClock, String> {
        match &self.timezone {
            Some(name) => LocalClock::from_name(name),
            None => Ok(LocalClock::utc()),
        }
    }

    /// Finds a shift by ID.
    pub fn shift(&self, id: &str) -> Option<&Shift> {
        self.shifts.iter().find(|s| s.id == id)
    }

    /// Finds an employee by ID.
    pub fn employee(&self, id: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    /// Number of distinct shift locations.
    pub fn location_count(&self) -> usize {
        self.shifts
            .iter()
            .map(|s| s.location_id.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Whether fairness requirements are present.
    pub fn requires_fairness(&self) -> bool {
        self.preferences.fair_distribution_enabled
    }

    /// Whether any shift carries an explicit hourly rate.
    pub fn has_shift_rates(&self) -> bool {
        self.shifts.iter().any(|s| s.hourly_rate.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn make_shift(id: &str, location: &str) -> Shift {
        Shift::new(
            id,
            Utc.with_ymd_and_hms(2024, 11, 11, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 11, 11, 13, 0, 0).unwrap(),
            location,
        )
    }

    #[test]
    fn test_problem_builder() {
        let problem = SchedulingProblem::new("org-1")
            .with_shift(make_shift("S1", "L1"))
            .with_shift(make_shift("S2", "L2"))
            .with_shift(make_shift("S3", "L1"))
            .with_employee(Employee::new("E1", "Alice"));

        assert_eq!(problem.location_count(), 2);
        assert!(problem.shift("S2").is_some());
        assert!(problem.employee("E1").is_some());
        assert!(problem.employee("E9").is_none());
        assert!(!problem.has_shift_rates());
        assert!(!problem.requires_fairness());
    }

    #[test]
    fn test_problem_clock() {
        let utc = SchedulingProblem::new("org");
        assert_eq!(utc.clock().unwrap(), LocalClock::utc());

        let bad = SchedulingProblem::new("org").with_timezone("Nowhere/Special");
        assert!(bad.clock().is_err());
    }

    #[test]
    fn test_problem_deserialize_minimal() {
        let problem: SchedulingProblem =
            serde_json::from_str(r#"{"organizationId": "org-9"}"#).unwrap();
        assert!(problem.shifts.is_empty());
        assert!(problem.constraints.cost_optimization_enabled);
        assert!(!problem.preferences.fair_distribution_enabled);
    }
}
