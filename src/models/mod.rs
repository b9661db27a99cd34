//! Rostering domain models.
//!
//! Provides the core data types for representing shift-staffing problems
//! and their solutions.
//!
//! # Domain Mappings
//!
//! | shift-roster | Retail | Healthcare | Logistics |
//! |--------------|--------|------------|-----------|
//! | Shift | Register shift | Ward shift | Dock shift |
//! | Employee | Associate | Nurse | Loader |
//! | AvailabilityWindow | Store hours offered | Rota preference | Roster slot |
//! | SchedulingSolution | Weekly rota | Duty roster | Crew plan |

mod calendar;
mod constraints;
mod employee;
mod problem;
mod shift;
mod solution;

pub use calendar::{
    consecutive_run_containing, day_name, LocalClock, TimeOfDay, TimeWindow, MINUTES_PER_DAY,
};
pub use constraints::{
    SchedulingConstraints, DEFAULT_MAX_CONSECUTIVE_DAYS, DEFAULT_MAX_HOURS_PER_WEEK,
    DEFAULT_MIN_REST_HOURS, DEFAULT_PREFERRED_LOCATION_WEIGHT,
};
pub use employee::{AvailabilityWindow, CommittedShift, Employee};
pub use problem::{SchedulingPreferences, SchedulingProblem};
pub use shift::{Shift, DEFAULT_PRIORITY, MAX_PRIORITY};
pub use solution::{
    SchedulingSolution, ShiftAssignment, SolutionMetrics, SolveStatus, SolverKind,
    UnassignableShift,
};
