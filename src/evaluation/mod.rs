//! Candidate evaluation: scoring one (employee, shift) pairing.
//!
//! A candidate score is an integer in [0, 100] with ordered lists of
//! reasons (positive factors) and warnings (soft violations). A score of
//! exactly 0 means the pairing is infeasible.
//!
//! # Algorithm
//! Scores start at a neutral base of 50 and pass through an ordered
//! pipeline of named [`ScoringRule`]s. Gate rules (skills, seniority,
//! availability, time conflict) may short-circuit to 0; the remaining
//! rules add or subtract deltas. The final value is clamped to [0, 100]
//! and rounded; a positive total below 1 rounds up to 1.
//!
//! # Usage
//!
//! ```
//! use shift_roster::evaluation::{CandidateContext, CandidateEvaluator};
//! use shift_roster::models::{Employee, SchedulingConstraints, Shift};
//! use chrono::{TimeZone, Utc};
//!
//! let shift = Shift::new(
//!     "S1",
//!     Utc.with_ymd_and_hms(2024, 11, 11, 10, 0, 0).unwrap(),
//!     Utc.with_ymd_and_hms(2024, 11, 11, 14, 0, 0).unwrap(),
//!     "store-1",
//! );
//! let employee = Employee::new("E1", "Alice");
//! let constraints = SchedulingConstraints::default();
//!
//! let evaluator = CandidateEvaluator::standard();
//! let score = evaluator.evaluate(&CandidateContext::new(&shift, &employee, &constraints));
//! // No availability on Monday → rejected
//! assert_eq!(score.score, 0);
//! ```
//!
//! # References
//!
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"

mod context;
mod engine;
pub mod rules;

pub use context::CandidateContext;
pub use engine::CandidateEvaluator;

use std::fmt::Debug;

use crate::models::{Employee, SchedulingConstraints, Shift};

/// Neutral starting score of every candidate.
pub const BASE_SCORE: f64 = 50.0;

/// Upper bound of a candidate score.
pub const MAX_SCORE: f64 = 100.0;

/// Infeasibility reason when no gate rejected but the deltas summed to 0.
pub const SOFT_PENALTY_REASON: &str = "Score reduced to 0 by soft penalties";

/// Result of applying one rule to a candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// Hard constraint violated: the candidate scores 0.
    Reject(String),
    /// Score change with optional explanations.
    Adjust(Adjustment),
    /// The rule does not apply.
    Skip,
}

/// A score delta with the reasons and warnings behind it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Adjustment {
    /// Amount added to the score (negative = penalty).
    pub delta: f64,
    /// Positive factors.
    pub reasons: Vec<String>,
    /// Soft violations.
    pub warnings: Vec<String>,
}

impl Adjustment {
    /// A bonus with a reason.
    pub fn bonus(delta: f64, reason: impl Into<String>) -> Self {
        Self {
            delta,
            reasons: vec![reason.into()],
            warnings: Vec::new(),
        }
    }

    /// A penalty with a warning. `amount` is subtracted.
    pub fn penalty(amount: f64, warning: impl Into<String>) -> Self {
        Self {
            delta: -amount,
            reasons: Vec::new(),
            warnings: vec![warning.into()],
        }
    }

    /// A silent delta.
    pub fn delta(delta: f64) -> Self {
        Self {
            delta,
            ..Default::default()
        }
    }

    /// Folds another adjustment into this one.
    pub fn merge(mut self, other: Adjustment) -> Self {
        self.delta += other.delta;
        self.reasons.extend(other.reasons);
        self.warnings.extend(other.warnings);
        self
    }
}

/// One applied rule in a candidate's audit trail.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTrace {
    /// Rule name.
    pub rule: &'static str,
    /// Score delta applied (0 for a rejecting gate).
    pub delta: f64,
}

/// Score of one (employee, shift) pairing.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    /// Final score 0..=100. 0 = infeasible.
    pub score: u8,
    /// Positive factors, in rule order. A rejection holds its reason here.
    pub reasons: Vec<String>,
    /// Soft violations, in rule order.
    pub warnings: Vec<String>,
    /// Gate that rejected the candidate, if any.
    pub rejected_by: Option<&'static str>,
    /// Rules that contributed, in order.
    pub trace: Vec<RuleTrace>,
}

impl CandidateScore {
    /// Whether the candidate may be assigned.
    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.score > 0
    }

    /// Short explanation of infeasibility, if any.
    ///
    /// A gate rejection reports the gate's reason. A score clamped to 0 by
    /// soft deltas reports [`SOFT_PENALTY_REASON`], since its reasons only
    /// list the factors that counted in its favor.
    pub fn rejection_reason(&self) -> Option<&str> {
        if self.is_feasible() {
            return None;
        }
        match self.rejected_by {
            Some(_) => self.reasons.first().map(String::as_str),
            None => Some(SOFT_PENALTY_REASON),
        }
    }
}

/// A rule in the candidate scoring pipeline.
///
/// Rules are evaluated in pipeline order. Gate rules return
/// [`RuleOutcome::Reject`] to stop evaluation; soft rules return
/// [`RuleOutcome::Adjust`] or [`RuleOutcome::Skip`].
pub trait ScoringRule: Send + Sync + Debug {
    /// Rule name (e.g. "skill", "rest").
    fn name(&self) -> &'static str;

    /// Applies the rule to a candidate.
    fn apply(&self, ctx: &CandidateContext<'_>) -> RuleOutcome;

    /// Whether the rule can reject a candidate outright.
    fn is_gate(&self) -> bool {
        false
    }

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// Scores a shift for an employee against the employee's committed
/// shifts, using the standard pipeline and UTC wall-clock time.
pub fn evaluate(
    shift: &Shift,
    employee: &Employee,
    constraints: &SchedulingConstraints,
) -> CandidateScore {
    CandidateEvaluator::standard().evaluate(&CandidateContext::new(shift, employee, constraints))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjustment_merge() {
        let a = Adjustment::bonus(10.0, "good").merge(Adjustment::penalty(4.0, "meh"));
        assert!((a.delta - 6.0).abs() < 1e-10);
        assert_eq!(a.reasons, vec!["good"]);
        assert_eq!(a.warnings, vec!["meh"]);
    }

    #[test]
    fn test_rejection_reason() {
        let rejected = CandidateScore {
            score: 0,
            reasons: vec!["Conflicts with existing shift".into()],
            warnings: vec![],
            rejected_by: Some("conflict"),
            trace: vec![],
        };
        assert!(!rejected.is_feasible());
        assert_eq!(rejected.rejection_reason(), Some("Conflicts with existing shift"));

        let accepted = CandidateScore {
            score: 70,
            ..rejected
        };
        assert!(accepted.rejection_reason().is_none());
    }

    #[test]
    fn test_rejection_reason_after_soft_penalties() {
        let clamped = CandidateScore {
            score: 0,
            reasons: vec!["Available during shift time".into()],
            warnings: vec![],
            rejected_by: None,
            trace: vec![],
        };
        assert_eq!(clamped.rejection_reason(), Some(SOFT_PENALTY_REASON));
    }
}
