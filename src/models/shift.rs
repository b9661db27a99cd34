//! Shift model.
//!
//! A shift is a single slot of work at a location that needs exactly one
//! employee. Shifts carry the requirements a candidate must meet (skills,
//! seniority) and the attributes the scorer rewards (type, priority, rate).
//!
//! # Time Representation
//! `start_time`/`end_time` are absolute UTC instants. A shift may cross
//! midnight; its local day of week is taken from the start instant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TimeWindow;

/// Default shift priority.
pub const DEFAULT_PRIORITY: u8 = 0;

/// Highest priority accepted by validation.
pub const MAX_PRIORITY: u8 = 10;

/// A shift to be staffed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    /// Unique shift identifier.
    pub id: String,
    /// Shift start (inclusive).
    pub start_time: DateTime<Utc>,
    /// Shift end (exclusive).
    pub end_time: DateTime<Utc>,
    /// Location the shift is worked at.
    pub location_id: String,
    /// Display name of the location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    /// Role label (informational).
    #[serde(default)]
    pub role: String,
    /// Skills the assignee must hold, all of them.
    #[serde(default)]
    pub required_skills: Vec<String>,
    /// Free-form type label matched against employee preferences
    /// (e.g. `morning`, `closing`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_type: Option<String>,
    /// Minimum seniority an assignee must have.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_seniority: Option<u32>,
    /// Importance 0..=10 (higher = more important).
    #[serde(default = "default_priority")]
    pub priority: u8,
    /// Unpaid break, in minutes.
    #[serde(default)]
    pub break_minutes: u32,
    /// Shift-specific hourly rate; overrides the employee's rate for cost.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
}

fn default_priority() -> u8 {
    DEFAULT_PRIORITY
}

impl Shift {
    /// Creates a new shift.
    pub fn new(
        id: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        location_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            start_time,
            end_time,
            location_id: location_id.into(),
            location_name: None,
            role: String::new(),
            required_skills: Vec::new(),
            shift_type: None,
            min_seniority: None,
            priority: DEFAULT_PRIORITY,
            break_minutes: 0,
            hourly_rate: None,
        }
    }

    /// Sets the location display name.
    pub fn with_location_name(mut self, name: impl Into<String>) -> Self {
        self.location_name = Some(name.into());
        self
    }

    /// Sets the role label.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Adds a required skill.
    pub fn with_required_skill(mut self, skill: impl Into<String>) -> Self {
        self.required_skills.push(skill.into());
        self
    }

    /// Sets the shift type label.
    pub fn with_shift_type(mut self, shift_type: impl Into<String>) -> Self {
        self.shift_type = Some(shift_type.into());
        self
    }

    /// Sets the minimum seniority.
    pub fn with_min_seniority(mut self, seniority: u32) -> Self {
        self.min_seniority = Some(seniority);
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the unpaid break length.
    pub fn with_break_minutes(mut self, minutes: u32) -> Self {
        self.break_minutes = minutes;
        self
    }

    /// Sets the shift-specific hourly rate.
    pub fn with_hourly_rate(mut self, rate: f64) -> Self {
        self.hourly_rate = Some(rate);
        self
    }

    /// The `[start, end)` interval of this shift.
    #[inline]
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_time, self.end_time)
    }

    /// Raw duration in hours, breaks included.
    ///
    /// Hour limits are always checked against this value.
    #[inline]
    pub fn duration_hours(&self) -> f64 {
        self.window().duration_hours()
    }

    /// Paid hours: duration minus the unpaid break, never negative.
    pub fn paid_hours(&self) -> f64 {
        (self.duration_hours() - self.break_minutes as f64 / 60.0).max(0.0)
    }

    /// Display name of the location, falling back to its id.
    pub fn location_label(&self) -> &str {
        match &self.location_name {
            Some(name) if !name.is_empty() => name.as_str(),
            _ if !self.location_id.is_empty() => self.location_id.as_str(),
            _ => "Unknown",
        }
    }
}
