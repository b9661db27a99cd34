//! Evaluation context for candidate scoring.

use chrono::NaiveDate;

use crate::models::{CommittedShift, Employee, LocalClock, SchedulingConstraints, Shift};

/// Everything a scoring rule may look at for one candidate.
///
/// The working set is the employee's committed shifts for the target week
/// as seen at this point of the solve. It defaults to the employee's
/// `existing_shifts`; solvers pass their in-progress state instead.
#[derive(Debug, Clone, Copy)]
pub struct CandidateContext<'a> {
    /// Shift being staffed.
    pub shift: &'a Shift,
    /// Candidate employee.
    pub employee: &'a Employee,
    /// Shifts already committed to the employee.
    pub working_set: &'a [CommittedShift],
    /// Organization constraint settings.
    pub constraints: &'a SchedulingConstraints,
    /// Local wall-clock used for day and time-of-day reasoning.
    pub clock: LocalClock,
}

impl<'a> CandidateContext<'a> {
    /// Creates a context over the employee's pre-existing shifts, in UTC.
    pub fn new(
        shift: &'a Shift,
        employee: &'a Employee,
        constraints: &'a SchedulingConstraints,
    ) -> Self {
        Self {
            shift,
            employee,
            working_set: &employee.existing_shifts,
            constraints,
            clock: LocalClock::utc(),
        }
    }

    /// Replaces the working set.
    pub fn with_working_set(mut self, working_set: &'a [CommittedShift]) -> Self {
        self.working_set = working_set;
        self
    }

    /// Sets the local clock.
    pub fn with_clock(mut self, clock: LocalClock) -> Self {
        self.clock = clock;
        self
    }

    /// Hours already committed in the working set.
    pub fn committed_hours(&self) -> f64 {
        self.working_set.iter().map(|c| c.duration_hours()).sum()
    }

    /// Local day of week of the shift start.
    pub fn shift_day(&self) -> u8 {
        self.clock.day_of_week(self.shift.start_time)
    }

    /// Local calendar date of the shift start.
    pub fn shift_date(&self) -> NaiveDate {
        self.clock.date(self.shift.start_time)
    }
}
