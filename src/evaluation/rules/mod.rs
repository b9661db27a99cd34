//! Built-in scoring rules.
//!
//! # Categories
//!
//! - **Gates**: skill, seniority, availability, conflict
//! - **Labor limits** (soft): rest, weekly hours, consecutive days
//! - **Preferences**: preferred location, shift type
//! - **Objectives**: priority, cost, fair distribution
//!
//! # Score Convention
//! Deltas are added to the running score. Gates reject instead of
//! returning a delta; a rejected candidate scores 0.

use std::collections::BTreeSet;

use super::{Adjustment, CandidateContext, RuleOutcome, ScoringRule};
use crate::models::consecutive_run_containing;

// ======================== Gates ========================

/// Every required skill must be held.
#[derive(Debug, Clone, Copy)]
pub struct SkillGate;

impl ScoringRule for SkillGate {
    fn name(&self) -> &'static str {
        "skill"
    }

    fn apply(&self, ctx: &CandidateContext<'_>) -> RuleOutcome {
        let missing = ctx.employee.missing_skills(&ctx.shift.required_skills);
        if missing.is_empty() {
            RuleOutcome::Skip
        } else {
            RuleOutcome::Reject(format!("Missing required skills: {}", missing.join(", ")))
        }
    }

    fn is_gate(&self) -> bool {
        true
    }

    fn description(&self) -> &'static str {
        "Employee holds all required skills"
    }
}

/// Employee seniority must meet the shift minimum. Unknown seniority is 0.
#[derive(Debug, Clone, Copy)]
pub struct SeniorityGate;

impl ScoringRule for SeniorityGate {
    fn name(&self) -> &'static str {
        "seniority"
    }

    fn apply(&self, ctx: &CandidateContext<'_>) -> RuleOutcome {
        let Some(required) = ctx.shift.min_seniority else {
            return RuleOutcome::Skip;
        };
        let seniority = ctx.employee.seniority.unwrap_or(0);
        if seniority < required {
            RuleOutcome::Reject(format!(
                "Seniority {seniority} below required {required}"
            ))
        } else {
            RuleOutcome::Skip
        }
    }

    fn is_gate(&self) -> bool {
        true
    }

    fn description(&self) -> &'static str {
        "Employee meets minimum seniority"
    }
}

/// The shift must fit inside an availability window on its local day.
///
/// A containing window flagged preferred earns +20, otherwise +15.
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityGate;

/// Bonus for a plain availability match.
pub const AVAILABLE_BONUS: f64 = 15.0;
/// Bonus for a preferred availability match.
pub const PREFERRED_WINDOW_BONUS: f64 = 20.0;

impl ScoringRule for AvailabilityGate {
    fn name(&self) -> &'static str {
        "availability"
    }

    fn apply(&self, ctx: &CandidateContext<'_>) -> RuleOutcome {
        let day = ctx.shift_day();
        let date = ctx.shift_date();
        let (start, end) = ctx.clock.minute_span(&ctx.shift.window());

        let mut any_window = false;
        let mut best: Option<bool> = None;
        for window in ctx.employee.windows_on(day, date) {
            any_window = true;
            if window.contains_span(start, end) {
                best = Some(best.unwrap_or(false) || window.preferred);
            }
        }

        match best {
            Some(true) => RuleOutcome::Adjust(Adjustment::bonus(
                PREFERRED_WINDOW_BONUS,
                "Available during preferred hours",
            )),
            Some(false) => RuleOutcome::Adjust(Adjustment::bonus(
                AVAILABLE_BONUS,
                "Available during shift time",
            )),
            None if any_window => RuleOutcome::Reject(
                "Shift time is outside employee availability window".to_string(),
            ),
            None => RuleOutcome::Reject("Employee not available on this day".to_string()),
        }
    }

    fn is_gate(&self) -> bool {
        true
    }

    fn description(&self) -> &'static str {
        "Shift fits an availability window"
    }
}

/// The shift must not overlap any shift in the working set.
#[derive(Debug, Clone, Copy)]
pub struct ConflictGate;

impl ScoringRule for ConflictGate {
    fn name(&self) -> &'static str {
        "conflict"
    }

    fn apply(&self, ctx: &CandidateContext<'_>) -> RuleOutcome {
        let window = ctx.shift.window();
        if ctx
            .working_set
            .iter()
            .any(|committed| committed.window().overlaps(&window))
        {
            RuleOutcome::Reject("Conflicts with existing shift".to_string())
        } else {
            RuleOutcome::Skip
        }
    }

    fn is_gate(&self) -> bool {
        true
    }

    fn description(&self) -> &'static str {
        "No overlap with committed shifts"
    }
}

// ======================== Labor limits ========================

/// -10 per committed shift closer than the minimum rest.
#[derive(Debug, Clone, Copy)]
pub struct RestPenalty;

impl ScoringRule for RestPenalty {
    fn name(&self) -> &'static str {
        "rest"
    }

    fn apply(&self, ctx: &CandidateContext<'_>) -> RuleOutcome {
        let min_rest = ctx.constraints.min_rest_hours_for(ctx.employee);
        let window = ctx.shift.window();

        let adjustment = ctx
            .working_set
            .iter()
            .map(|committed| window.rest_hours_between(&committed.window()))
            .filter(|&rest| rest < min_rest)
            .fold(Adjustment::default(), |acc, rest| {
                acc.merge(Adjustment::penalty(
                    10.0,
                    format!("Only {rest:.1} hours rest between shifts"),
                ))
            });

        if adjustment.warnings.is_empty() {
            RuleOutcome::Skip
        } else {
            RuleOutcome::Adjust(adjustment)
        }
    }

    fn description(&self) -> &'static str {
        "Minimum rest between shifts"
    }
}

/// Weekly hours: -15 over the cap, +8 under the employee's target,
/// +10 otherwise.
#[derive(Debug, Clone, Copy)]
pub struct WeeklyHours;

impl ScoringRule for WeeklyHours {
    fn name(&self) -> &'static str {
        "weekly_hours"
    }

    fn apply(&self, ctx: &CandidateContext<'_>) -> RuleOutcome {
        let total = ctx.committed_hours() + ctx.shift.duration_hours();
        let max = ctx.constraints.max_hours_for(ctx.employee);

        let adjustment = if total > max {
            Adjustment::penalty(15.0, format!("Would exceed max hours ({total:.1}/{max}h)"))
        } else {
            match ctx.employee.min_hours_per_week {
                Some(min) if total < min => Adjustment::bonus(
                    8.0,
                    format!("Helps reach minimum weekly hours ({total:.1}/{min}h)"),
                ),
                _ => Adjustment::bonus(
                    10.0,
                    format!("Within weekly hour limits ({total:.1}/{max}h)"),
                ),
            }
        };
        RuleOutcome::Adjust(adjustment)
    }

    fn description(&self) -> &'static str {
        "Weekly hour cap and target"
    }
}

/// -10 when the shift makes a run of consecutive worked days reach the cap.
#[derive(Debug, Clone, Copy)]
pub struct ConsecutiveDays;

impl ScoringRule for ConsecutiveDays {
    fn name(&self) -> &'static str {
        "consecutive_days"
    }

    fn apply(&self, ctx: &CandidateContext<'_>) -> RuleOutcome {
        let day = ctx.shift_date();
        let mut dates: BTreeSet<_> = ctx
            .working_set
            .iter()
            .map(|committed| ctx.clock.date(committed.start_time))
            .collect();
        dates.insert(day);

        let run = consecutive_run_containing(&dates, day);
        let max = ctx.constraints.max_consecutive_days_for(ctx.employee);
        if run >= max {
            RuleOutcome::Adjust(Adjustment::penalty(
                10.0,
                format!("Would work {run} consecutive days"),
            ))
        } else {
            RuleOutcome::Skip
        }
    }

    fn description(&self) -> &'static str {
        "Consecutive worked days cap"
    }
}

// ======================== Preferences ========================

/// +15 × `preferredLocationWeight` at the employee's preferred location.
#[derive(Debug, Clone, Copy)]
pub struct PreferredLocation;

impl ScoringRule for PreferredLocation {
    fn name(&self) -> &'static str {
        "preferred_location"
    }

    fn apply(&self, ctx: &CandidateContext<'_>) -> RuleOutcome {
        match &ctx.employee.preferred_location_id {
            Some(location) if *location == ctx.shift.location_id => {
                RuleOutcome::Adjust(Adjustment::bonus(
                    15.0 * ctx.constraints.preferred_location_weight,
                    "Preferred location",
                ))
            }
            _ => RuleOutcome::Skip,
        }
    }
}

/// +12 when the shift type is one the employee prefers.
#[derive(Debug, Clone, Copy)]
pub struct ShiftTypePreference;

impl ScoringRule for ShiftTypePreference {
    fn name(&self) -> &'static str {
        "shift_type"
    }

    fn apply(&self, ctx: &CandidateContext<'_>) -> RuleOutcome {
        match &ctx.shift.shift_type {
            Some(kind) if ctx.employee.shift_type_preferences.contains(kind) => {
                RuleOutcome::Adjust(Adjustment::bonus(12.0, format!("Prefers {kind} shifts")))
            }
            _ => RuleOutcome::Skip,
        }
    }
}

// ======================== Objectives ========================

/// +2 × priority for shifts above priority 5.
#[derive(Debug, Clone, Copy)]
pub struct PriorityBonus;

impl ScoringRule for PriorityBonus {
    fn name(&self) -> &'static str {
        "priority"
    }

    fn apply(&self, ctx: &CandidateContext<'_>) -> RuleOutcome {
        let priority = ctx.shift.priority;
        if priority > 5 {
            RuleOutcome::Adjust(Adjustment::bonus(
                priority as f64 * 2.0,
                format!("High-priority shift (priority {priority})"),
            ))
        } else {
            RuleOutcome::Skip
        }
    }
}

/// Rewards cheaper employees when cost optimization is on.
///
/// The rate is normalized against a $10–$30 band as `1 - (rate - 10) / 20`
/// and scaled by 10. Rates outside the band push the delta below 0 or
/// above 10; that is left as is.
#[derive(Debug, Clone, Copy)]
pub struct CostBonus;

impl ScoringRule for CostBonus {
    fn name(&self) -> &'static str {
        "cost"
    }

    fn apply(&self, ctx: &CandidateContext<'_>) -> RuleOutcome {
        if !ctx.constraints.cost_optimization_enabled {
            return RuleOutcome::Skip;
        }
        let rate = match ctx.employee.default_hourly_rate {
            Some(rate) if rate > 0.0 => rate,
            _ => return RuleOutcome::Skip,
        };

        let normalized = 1.0 - (rate - 10.0) / 20.0;
        let adjustment = if rate < 20.0 {
            Adjustment::bonus(normalized * 10.0, format!("Cost-effective (${rate:.2}/h)"))
        } else {
            Adjustment::delta(normalized * 10.0)
        };
        RuleOutcome::Adjust(adjustment)
    }

    fn description(&self) -> &'static str {
        "Hourly rate within the $10-$30 band"
    }
}

/// Spreads shifts: -2 per committed shift above 5, +5 below 3.
#[derive(Debug, Clone, Copy)]
pub struct FairDistribution;

impl ScoringRule for FairDistribution {
    fn name(&self) -> &'static str {
        "fair_distribution"
    }

    fn apply(&self, ctx: &CandidateContext<'_>) -> RuleOutcome {
        let count = ctx.working_set.len();
        if count > 5 {
            RuleOutcome::Adjust(Adjustment::penalty(
                count as f64 * 2.0,
                format!("Already has {count} shifts this week"),
            ))
        } else if count < 3 {
            RuleOutcome::Adjust(Adjustment::bonus(5.0, "Helps distribute shifts fairly"))
        } else {
            RuleOutcome::Skip
        }
    }
}
