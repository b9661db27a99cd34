//! Greedy assignment and solution metrics.
//!
//! # Algorithm
//!
//! `GreedyScheduler` walks shifts in start order and commits the best
//! positive-scoring candidate for each, updating a per-solve
//! `RosterState` so later shifts see the new load. It is not optimal, but
//! it is fast, deterministic, and the fallback for every other solver.
//!
//! # Metrics
//!
//! `SolutionMetrics::calculate` computes total score, fairness, cost
//! efficiency, and coverage rate for any set of assignments.
//!
//! # References
//!
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"
//! - Van den Bergh et al. (2013), "Personnel scheduling: A literature review"

mod greedy;
mod metrics;
mod roster;

pub use greedy::{
    shifts_in_order, GreedyOutcome, GreedyScheduler, RankedCandidate, NO_MATCH_REASON,
};
pub use metrics::{cost_efficiency, fairness_score, BASELINE_HOURLY_RATE};
pub use roster::RosterState;
