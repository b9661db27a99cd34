//! Per-solve working state.
//!
//! A [`RosterState`] holds every employee's working set (committed shifts
//! for the target week) while one solve runs. It is built fresh from the
//! problem at the start of a solve and dropped at the end, so concurrent
//! solves never share mutable state.

use std::collections::HashMap;

use crate::models::{CommittedShift, Employee, SchedulingProblem, SchedulingSolution, Shift};

/// Working sets keyed by employee ID.
#[derive(Debug, Clone, Default)]
pub struct RosterState {
    working: HashMap<String, Vec<CommittedShift>>,
}

impl RosterState {
    /// Seeds working sets from each employee's pre-existing shifts.
    pub fn from_employees(employees: &[Employee]) -> Self {
        let working = employees
            .iter()
            .map(|e| (e.id.clone(), e.existing_shifts.clone()))
            .collect();
        Self { working }
    }

    /// Working sets after applying a solution's assignments.
    ///
    /// Assignments that reference unknown shifts or employees are ignored.
    pub fn from_solution(problem: &SchedulingProblem, solution: &SchedulingSolution) -> Self {
        let mut state = Self::from_employees(&problem.employees);
        for assignment in &solution.assignments {
            if let Some(shift) = problem.shift(&assignment.shift_id) {
                state.commit(&assignment.employee_id, shift);
            }
        }
        state
    }

    /// An employee's working set. Empty for unknown employees.
    pub fn working_set(&self, employee_id: &str) -> &[CommittedShift] {
        self.working
            .get(employee_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Adds a shift to an employee's working set.
    pub fn commit(&mut self, employee_id: &str, shift: &Shift) {
        let committed = CommittedShift {
            id: Some(shift.id.clone()),
            start_time: shift.start_time,
            end_time: shift.end_time,
            location_id: Some(shift.location_id.clone()),
        };
        self.working
            .entry(employee_id.to_string())
            .or_default()
            .push(committed);
    }

    /// Removes a shift from an employee's working set.
    ///
    /// Returns `false` when it was not there.
    pub fn release(&mut self, employee_id: &str, shift_id: &str) -> bool {
        let Some(set) = self.working.get_mut(employee_id) else {
            return false;
        };
        match set.iter().position(|c| c.id.as_deref() == Some(shift_id)) {
            Some(pos) => {
                set.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Total committed hours of an employee.
    pub fn hours(&self, employee_id: &str) -> f64 {
        self.working_set(employee_id)
            .iter()
            .map(|c| c.duration_hours())
            .sum()
    }

    /// Number of committed shifts of an employee.
    pub fn shift_count(&self, employee_id: &str) -> usize {
        self.working_set(employee_id).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn make_shift(id: &str, hour: u32) -> Shift {
        Shift::new(
            id,
            Utc.with_ymd_and_hms(2024, 11, 11, hour, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 11, 11, hour + 2, 0, 0).unwrap(),
            "L1",
        )
    }

    #[test]
    fn test_seeded_from_existing_shifts() {
        let emp = Employee::new("E1", "A").with_existing_shift(CommittedShift::new(
            Utc.with_ymd_and_hms(2024, 11, 10, 8, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 11, 10, 16, 0, 0).unwrap(),
        ));
        let state = RosterState::from_employees(&[emp]);
        assert_eq!(state.shift_count("E1"), 1);
        assert!((state.hours("E1") - 8.0).abs() < 1e-10);
        assert!(state.working_set("nobody").is_empty());
    }

    #[test]
    fn test_commit_and_release() {
        let mut state = RosterState::from_employees(&[Employee::new("E1", "A")]);
        state.commit("E1", &make_shift("S1", 8));
        state.commit("E1", &make_shift("S2", 12));
        assert_eq!(state.shift_count("E1"), 2);
        assert!((state.hours("E1") - 4.0).abs() < 1e-10);

        assert!(state.release("E1", "S1"));
        assert!(!state.release("E1", "S1"));
        assert_eq!(state.working_set("E1")[0].id.as_deref(), Some("S2"));
    }

    #[test]
    fn test_states_are_independent() {
        let employees = [Employee::new("E1", "A")];
        let mut first = RosterState::from_employees(&employees);
        let second = RosterState::from_employees(&employees);
        first.commit("E1", &make_shift("S1", 8));
        assert_eq!(first.shift_count("E1"), 1);
        assert_eq!(second.shift_count("E1"), 0);
    }
}
