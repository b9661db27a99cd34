//! Multi-solver router with greedy fallback.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{ConstraintSolver, MultiStagePipeline};
use crate::classify::{classify_with_reason, ProblemComplexity};
use crate::config::RosterConfig;
use crate::cp::CpSolver;
use crate::error::{SchedulingError, SolverError};
use crate::models::{SchedulingProblem, SchedulingSolution};
use crate::scheduler::GreedyScheduler;
use crate::validation::validate_problem;

/// Prefix of the explanation of a fallback solution.
pub const FALLBACK_PREFIX: &str = "Primary solver failed, using fallback. Error: ";

/// Solve strategy selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Decided by the classifier.
    #[default]
    Auto,
    /// Greedy assignment.
    Greedy,
    /// Constraint solver.
    ConstraintProgramming,
    /// Multi-stage pipeline.
    MultiStage,
}

impl Strategy {
    fn for_complexity(complexity: ProblemComplexity) -> Self {
        match complexity {
            ProblemComplexity::Simple => Self::Greedy,
            ProblemComplexity::Complex => Self::ConstraintProgramming,
            ProblemComplexity::MultiStage => Self::MultiStage,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Greedy => "greedy",
            Self::ConstraintProgramming => "cp",
            Self::MultiStage => "multi-stage",
        })
    }
}

/// Routes each problem to the solver its complexity calls for.
///
/// `simple` problems go to [`GreedyScheduler`], `complex` ones to the
/// constraint solver, `multi-stage` ones to [`MultiStagePipeline`]. When the
/// chosen strategy fails, the whole problem is re-solved greedily and the
/// error is recorded in the explanation; only invalid input is returned as
/// an error.
///
/// # Example
/// ```
/// use shift_roster::models::{SchedulingProblem, SolverKind};
/// use shift_roster::solver::MultiSolverScheduler;
///
/// let solution = MultiSolverScheduler::new()
///     .solve(&SchedulingProblem::new("org"))
///     .unwrap();
/// assert_eq!(solution.solver, SolverKind::Greedy);
/// ```
#[derive(Debug, Clone)]
pub struct MultiSolverScheduler {
    greedy: GreedyScheduler,
    solver: Arc<dyn ConstraintSolver>,
    pipeline: MultiStagePipeline,
    timeout: Duration,
}

impl MultiSolverScheduler {
    /// In-process constraint solver, 30 s budget.
    pub fn new() -> Self {
        let solver: Arc<dyn ConstraintSolver> = Arc::new(CpSolver::new());
        Self {
            greedy: GreedyScheduler::new(),
            pipeline: MultiStagePipeline::new(Arc::clone(&solver)),
            solver,
            timeout: Duration::from_secs(30),
        }
    }

    /// Builds a router from configuration.
    pub fn from_config(config: &RosterConfig) -> Self {
        let solver = config.constraint_solver();
        Self {
            greedy: GreedyScheduler::new(),
            pipeline: MultiStagePipeline::new(Arc::clone(&solver))
                .with_seed(config.tuning.seed)
                .with_max_passes(config.tuning.max_passes),
            solver,
            timeout: config.timeout(),
        }
    }

    /// Replaces the constraint solver (used directly and by the pipeline).
    ///
    /// The pipeline keeps its seed, pass budget and evaluator.
    pub fn with_solver(mut self, solver: Arc<dyn ConstraintSolver>) -> Self {
        self.pipeline = self.pipeline.with_solver(Arc::clone(&solver));
        self.solver = solver;
        self
    }

    /// Replaces the pipeline.
    pub fn with_pipeline(mut self, pipeline: MultiStagePipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Sets the constraint solve budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates, classifies and solves.
    pub fn solve(
        &self,
        problem: &SchedulingProblem,
    ) -> Result<SchedulingSolution, SchedulingError> {
        self.solve_with(problem, Strategy::Auto)
    }

    /// Validates and solves with a given strategy.
    ///
    /// The reported solve time covers the whole call, validation and
    /// classification included, whichever backend produced the solution.
    pub fn solve_with(
        &self,
        problem: &SchedulingProblem,
        strategy: Strategy,
    ) -> Result<SchedulingSolution, SchedulingError> {
        let started = Instant::now();
        validate_problem(problem).map_err(SchedulingError::InvalidInput)?;

        let strategy = match strategy {
            Strategy::Auto => {
                let (complexity, rule) = classify_with_reason(problem);
                info!(
                    organization = %problem.organization_id,
                    %complexity,
                    rule,
                    shifts = problem.shifts.len(),
                    employees = problem.employees.len(),
                    "classified problem"
                );
                Strategy::for_complexity(complexity)
            }
            forced => forced,
        };
        info!(%strategy, "solving");

        let attempt = match strategy {
            Strategy::Auto | Strategy::Greedy => Ok(self.greedy.solve(problem)),
            Strategy::ConstraintProgramming => self.solver.solve(problem, self.timeout),
            Strategy::MultiStage => self.pipeline.solve(problem, self.timeout),
        };

        let mut solution = match attempt {
            Ok(solution) => solution,
            Err(err) => self.fall_back(problem, &err),
        };
        solution.solve_time_ms = started.elapsed().as_millis() as u64;
        Ok(solution)
    }

    fn fall_back(&self, problem: &SchedulingProblem, err: &SolverError) -> SchedulingSolution {
        warn!(
            solver = self.solver.name(),
            error = %err,
            "primary solver failed, using greedy fallback"
        );
        let mut solution = self.greedy.solve(problem);
        solution.explanation = format!("{FALLBACK_PREFIX}{err}");
        solution
    }
}

impl Default for MultiSolverScheduler {
    fn default() -> Self {
        Self::new()
    }
}
