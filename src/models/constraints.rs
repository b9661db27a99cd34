//! Organization-wide scheduling constraints.
//!
//! Labor-law-like limits and soft-objective weights that apply to every
//! employee unless the employee carries an override. Resolution order for
//! each limit: employee override, then organization setting, then the
//! built-in default.

use serde::{Deserialize, Serialize};

use super::Employee;

/// Default weekly hour cap.
pub const DEFAULT_MAX_HOURS_PER_WEEK: f64 = 40.0;
/// Default consecutive-day cap.
pub const DEFAULT_MAX_CONSECUTIVE_DAYS: u32 = 6;
/// Default minimum rest between shifts, in hours.
pub const DEFAULT_MIN_REST_HOURS: f64 = 8.0;
/// Default multiplier of the preferred-location bonus.
pub const DEFAULT_PREFERRED_LOCATION_WEIGHT: f64 = 1.2;

/// Constraint configuration for one organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingConstraints {
    /// Weekly hour cap.
    #[serde(default = "default_max_hours_per_week")]
    pub max_hours_per_week: f64,
    /// Longest allowed run of consecutive worked days.
    #[serde(default = "default_max_consecutive_days")]
    pub max_consecutive_days: u32,
    /// Minimum rest between two shifts, in hours.
    #[serde(default = "default_min_rest_hours")]
    pub min_rest_hours_between_shifts: f64,
    /// Multiplier of the preferred-location bonus.
    #[serde(default = "default_preferred_location_weight")]
    pub preferred_location_weight: f64,
    /// Rewards cheaper employees and enables cost tuning.
    #[serde(default = "default_cost_optimization")]
    pub cost_optimization_enabled: bool,
    /// Weight of the fairness objective. Presence marks the problem as
    /// fairness-sensitive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fairness_weight: Option<f64>,
    /// Daily hour cap, enforced by the constraint solver only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hours_per_day: Option<f64>,
}

fn default_max_hours_per_week() -> f64 {
    DEFAULT_MAX_HOURS_PER_WEEK
}

fn default_max_consecutive_days() -> u32 {
    DEFAULT_MAX_CONSECUTIVE_DAYS
}

fn default_min_rest_hours() -> f64 {
    DEFAULT_MIN_REST_HOURS
}

fn default_preferred_location_weight() -> f64 {
    DEFAULT_PREFERRED_LOCATION_WEIGHT
}

fn default_cost_optimization() -> bool {
    true
}

impl SchedulingConstraints {
    /// Creates constraints with all defaults.
    pub fn new() -> Self {
        Self {
            max_hours_per_week: DEFAULT_MAX_HOURS_PER_WEEK,
            max_consecutive_days: DEFAULT_MAX_CONSECUTIVE_DAYS,
            min_rest_hours_between_shifts: DEFAULT_MIN_REST_HOURS,
            preferred_location_weight: DEFAULT_PREFERRED_LOCATION_WEIGHT,
            cost_optimization_enabled: true,
            fairness_weight: None,
            max_hours_per_day: None,
        }
    }

    /// Sets the weekly hour cap.
    pub fn with_max_hours_per_week(mut self, hours: f64) -> Self {
        self.max_hours_per_week = hours;
        self
    }

    /// Sets the consecutive-day cap.
    pub fn with_max_consecutive_days(mut self, days: u32) -> Self {
        self.max_consecutive_days = days;
        self
    }

    /// Sets the minimum rest between shifts.
    pub fn with_min_rest_hours(mut self, hours: f64) -> Self {
        self.min_rest_hours_between_shifts = hours;
        self
    }

    /// Sets the preferred-location weight.
    pub fn with_preferred_location_weight(mut self, weight: f64) -> Self {
        self.preferred_location_weight = weight;
        self
    }

    /// Enables or disables cost optimization.
    pub fn with_cost_optimization(mut self, enabled: bool) -> Self {
        self.cost_optimization_enabled = enabled;
        self
    }

    /// Sets the fairness weight.
    pub fn with_fairness_weight(mut self, weight: f64) -> Self {
        self.fairness_weight = Some(weight);
        self
    }

    /// Sets the daily hour cap.
    pub fn with_max_hours_per_day(mut self, hours: f64) -> Self {
        self.max_hours_per_day = Some(hours);
        self
    }

    /// Effective weekly hour cap for an employee.
    pub fn max_hours_for(&self, employee: &Employee) -> f64 {
        employee
            .max_hours_per_week
            .unwrap_or(self.max_hours_per_week)
    }

    /// Effective consecutive-day cap for an employee.
    pub fn max_consecutive_days_for(&self, employee: &Employee) -> u32 {
        employee
            .max_consecutive_days
            .unwrap_or(self.max_consecutive_days)
    }

    /// Effective minimum rest for an employee.
    pub fn min_rest_hours_for(&self, employee: &Employee) -> f64 {
        employee
            .min_rest_hours
            .unwrap_or(self.min_rest_hours_between_shifts)
    }
}

impl Default for SchedulingConstraints {
    fn default() -> Self {
        Self::new()
    }
}
