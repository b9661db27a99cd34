//! Employee shift rostering.
//!
//! Assigns employees to shifts for a week: every (employee, shift) pair is
//! scored by a rule pipeline, problems are classified by size and
//! structure, and each class is routed to a greedy pass, a
//! constraint-programming search, or a multi-stage pipeline, with greedy
//! assignment as the fallback whenever a solver fails.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Shift`, `Employee`, `AvailabilityWindow`,
//!   `SchedulingConstraints`, `SchedulingProblem`, `SchedulingSolution`
//! - **`evaluation`**: Candidate scoring rules and `CandidateEvaluator`
//! - **`scheduler`**: Greedy assignment, per-solve roster state, metrics
//! - **`classify`**: Problem complexity classification
//! - **`cp`**: In-process constraint-programming solver
//! - **`solver`**: Solver boundary, external process backend, multi-stage
//!   pipeline, and the routing `MultiSolverScheduler`
//! - **`analysis`**: Coverage gaps and employee workload insights
//! - **`validation`**: Input integrity checks
//! - **`config`**: TOML configuration
//!
//! # Example
//! ```
//! use chrono::{TimeZone, Utc};
//! use shift_roster::models::{AvailabilityWindow, Employee, SchedulingProblem, Shift};
//! use shift_roster::solver::MultiSolverScheduler;
//!
//! let problem = SchedulingProblem::new("org")
//!     .with_shift(Shift::new(
//!         "S1",
//!         Utc.with_ymd_and_hms(2024, 11, 11, 10, 0, 0).unwrap(),
//!         Utc.with_ymd_and_hms(2024, 11, 11, 14, 0, 0).unwrap(),
//!         "L1",
//!     ))
//!     .with_employee(
//!         Employee::new("E1", "Ann")
//!             .with_availability(AvailabilityWindow::parse(1, "09:00", "17:00").unwrap()),
//!     );
//!
//! let solution = MultiSolverScheduler::new().solve(&problem).unwrap();
//! assert_eq!(solution.assignments[0].employee_id, "E1");
//! ```
//!
//! # References
//!
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"
//! - Baptiste et al. (2001), "Constraint-Based Scheduling"

pub mod analysis;
pub mod classify;
pub mod config;
pub mod cp;
pub mod error;
pub mod evaluation;
pub mod models;
pub mod scheduler;
pub mod solver;
pub mod validation;

pub use error::{SchedulingError, SolverError};
