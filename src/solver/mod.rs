//! Solver strategies and routing.
//!
//! # Overview
//!
//! - [`ConstraintSolver`]: the boundary every optimizing backend sits
//!   behind. Backends are [`CpSolver`](crate::cp::CpSolver) (in-process
//!   search) and [`ProcessSolver`] (an external program driven through
//!   temp-file JSON handoff).
//! - [`MultiStagePipeline`]: location planning, ordered assignment, and a
//!   seeded fine-tuning pass.
//! - [`MultiSolverScheduler`]: validates, classifies and dispatches, and
//!   falls back to greedy assignment whenever a strategy fails.

mod pipeline;
mod process;
mod router;

use std::fmt::Debug;
use std::time::Duration;

pub use pipeline::{LocationPlan, MultiStagePipeline, REBALANCED_REASON};
pub use process::{ExternalOutput, ProcessSolver};
pub use router::{MultiSolverScheduler, Strategy, FALLBACK_PREFIX};

use crate::error::SolverError;
use crate::models::{SchedulingProblem, SchedulingSolution};

/// An optimizing solver backend.
///
/// Implementations must be stateless across calls: everything a solve
/// needs is in `problem`.
pub trait ConstraintSolver: Send + Sync + Debug {
    /// Backend name, used in logs.
    fn name(&self) -> &'static str;

    /// Solves within `timeout`.
    fn solve(
        &self,
        problem: &SchedulingProblem,
        timeout: Duration,
    ) -> Result<SchedulingSolution, SolverError>;

    /// Solves with a preferred shift order. Backends that cannot use an
    /// order ignore it.
    fn solve_ordered(
        &self,
        problem: &SchedulingProblem,
        order: &[String],
        timeout: Duration,
    ) -> Result<SchedulingSolution, SolverError> {
        let _ = order;
        self.solve(problem, timeout)
    }
}
