//! Candidate evaluator: runs the scoring rule pipeline.
//!
//! # Reference
//! Burke et al. (2004), "The State of the Art of Nurse Rostering",
//! Journal of Scheduling 7(6)

use std::sync::Arc;

use super::rules;
use super::{CandidateContext, CandidateScore, RuleOutcome, RuleTrace, ScoringRule};
use super::{BASE_SCORE, MAX_SCORE};

/// An ordered pipeline of scoring rules.
///
/// # Example
/// ```
/// use shift_roster::evaluation::{rules, CandidateEvaluator};
///
/// let gates_only = CandidateEvaluator::new()
///     .with_rule(rules::SkillGate)
///     .with_rule(rules::AvailabilityGate);
/// assert_eq!(gates_only.rule_names(), vec!["skill", "availability"]);
/// ```
#[derive(Clone)]
pub struct CandidateEvaluator {
    rules: Vec<Arc<dyn ScoringRule>>,
    base_score: f64,
}

impl CandidateEvaluator {
    /// Creates an empty evaluator with the neutral base score.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            base_score: BASE_SCORE,
        }
    }

    /// The standard pipeline: gates first, then labor limits,
    /// preferences, and objectives.
    pub fn standard() -> Self {
        Self::new()
            .with_rule(rules::SkillGate)
            .with_rule(rules::SeniorityGate)
            .with_rule(rules::AvailabilityGate)
            .with_rule(rules::ConflictGate)
            .with_rule(rules::RestPenalty)
            .with_rule(rules::WeeklyHours)
            .with_rule(rules::ConsecutiveDays)
            .with_rule(rules::PreferredLocation)
            .with_rule(rules::ShiftTypePreference)
            .with_rule(rules::PriorityBonus)
            .with_rule(rules::CostBonus)
            .with_rule(rules::FairDistribution)
    }

    /// Appends a rule to the pipeline.
    pub fn with_rule<R: ScoringRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Sets the starting score.
    pub fn with_base_score(mut self, base_score: f64) -> Self {
        self.base_score = base_score;
        self
    }

    /// Names of the rules, in pipeline order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Scores a candidate.
    ///
    /// Stops at the first rejecting gate; otherwise applies every rule,
    /// clamps the total to [0, 100] and rounds it.
    pub fn evaluate(&self, ctx: &CandidateContext<'_>) -> CandidateScore {
        let mut score = self.base_score;
        let mut reasons = Vec::new();
        let mut warnings = Vec::new();
        let mut trace = Vec::new();

        for rule in &self.rules {
            match rule.apply(ctx) {
                RuleOutcome::Reject(reason) => {
                    trace.push(RuleTrace {
                        rule: rule.name(),
                        delta: 0.0,
                    });
                    return CandidateScore {
                        score: 0,
                        reasons: vec![reason],
                        warnings: Vec::new(),
                        rejected_by: Some(rule.name()),
                        trace,
                    };
                }
                RuleOutcome::Adjust(adjustment) => {
                    score += adjustment.delta;
                    reasons.extend(adjustment.reasons);
                    warnings.extend(adjustment.warnings);
                    trace.push(RuleTrace {
                        rule: rule.name(),
                        delta: adjustment.delta,
                    });
                }
                RuleOutcome::Skip => {}
            }
        }

        let clamped = score.clamp(0.0, MAX_SCORE);
        // any positive total stays feasible
        let score = if clamped > 0.0 && clamped < 1.0 {
            1
        } else {
            clamped.round() as u8
        };

        CandidateScore {
            score,
            reasons,
            warnings,
            rejected_by: None,
            trace,
        }
    }

    /// Runs the gate rules only.
    ///
    /// Returns the first rejection reason, or `Ok(())` when every gate
    /// passes.
    pub fn check_gates(&self, ctx: &CandidateContext<'_>) -> Result<(), String> {
        for rule in self.rules.iter().filter(|r| r.is_gate()) {
            if let RuleOutcome::Reject(reason) = rule.apply(ctx) {
                return Err(reason);
            }
        }
        Ok(())
    }

    /// Whether the candidate passes every gate.
    pub fn is_eligible(&self, ctx: &CandidateContext<'_>) -> bool {
        self.check_gates(ctx).is_ok()
    }
}

impl Default for CandidateEvaluator {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for CandidateEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateEvaluator")
            .field("rules", &self.rule_names())
            .field("base_score", &self.base_score)
            .finish()
    }
}
