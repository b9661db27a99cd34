//! Employee model.
//!
//! Employees are the schedulable workers. Each carries qualifications
//! (skills, seniority), soft preferences (location, shift types), optional
//! per-employee overrides of organization limits, weekly availability, and
//! the shifts already committed for the target week.
//!
//! # Reference
//! Ernst et al. (2004), "Staff scheduling and rostering: A review of
//! applications, methods and models", EJOR 153(1)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{TimeOfDay, TimeWindow};

/// A schedulable worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Unique employee identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Role label.
    #[serde(default)]
    pub role: String,
    /// Skills held.
    #[serde(default)]
    pub skills: Vec<String>,
    /// Seniority level. `None` = unknown (treated as 0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seniority: Option<u32>,
    /// Default hourly rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_hourly_rate: Option<f64>,
    /// Preferred work location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_location_id: Option<String>,
    /// Preferred shift type labels.
    #[serde(default)]
    pub shift_type_preferences: Vec<String>,
    /// Override of the organization's weekly hour cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hours_per_week: Option<f64>,
    /// Override of the organization's consecutive-day cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_consecutive_days: Option<u32>,
    /// Override of the organization's minimum rest between shifts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rest_hours: Option<f64>,
    /// Weekly hours this employee wants to reach.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_hours_per_week: Option<f64>,
    /// When the employee can work.
    #[serde(default)]
    pub availability: Vec<AvailabilityWindow>,
    /// Shifts already committed within the target week.
    #[serde(default)]
    pub existing_shifts: Vec<CommittedShift>,
}

impl Employee {
    /// Creates a new employee.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: String::new(),
            skills: Vec::new(),
            seniority: None,
            default_hourly_rate: None,
            preferred_location_id: None,
            shift_type_preferences: Vec::new(),
            max_hours_per_week: None,
            max_consecutive_days: None,
            min_rest_hours: None,
            min_hours_per_week: None,
            availability: Vec::new(),
            existing_shifts: Vec::new(),
        }
    }

    /// Sets the role label.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Adds a skill.
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.push(skill.into());
        self
    }

    /// Sets the seniority level.
    pub fn with_seniority(mut self, seniority: u32) -> Self {
        self.seniority = Some(seniority);
        self
    }

    /// Sets the default hourly rate.
    pub fn with_hourly_rate(mut self, rate: f64) -> Self {
        self.default_hourly_rate = Some(rate);
        self
    }

    /// Sets the preferred location.
    pub fn with_preferred_location(mut self, location_id: impl Into<String>) -> Self {
        self.preferred_location_id = Some(location_id.into());
        self
    }

    /// Adds a preferred shift type.
    pub fn with_shift_type_preference(mut self, shift_type: impl Into<String>) -> Self {
        self.shift_type_preferences.push(shift_type.into());
        self
    }

    /// Overrides the weekly hour cap.
    pub fn with_max_hours_per_week(mut self, hours: f64) -> Self {
        self.max_hours_per_week = Some(hours);
        self
    }

    /// Overrides the consecutive-day cap.
    pub fn with_max_consecutive_days(mut self, days: u32) -> Self {
        self.max_consecutive_days = Some(days);
        self
    }

    /// Overrides the minimum rest between shifts.
    pub fn with_min_rest_hours(mut self, hours: f64) -> Self {
        self.min_rest_hours = Some(hours);
        self
    }

    /// Sets the weekly hours target.
    pub fn with_min_hours_per_week(mut self, hours: f64) -> Self {
        self.min_hours_per_week = Some(hours);
        self
    }

    /// Adds an availability window.
    pub fn with_availability(mut self, window: AvailabilityWindow) -> Self {
        self.availability.push(window);
        self
    }

    /// Adds an already-committed shift.
    pub fn with_existing_shift(mut self, shift: CommittedShift) -> Self {
        self.existing_shifts.push(shift);
        self
    }

    /// Whether the employee holds a skill.
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }

    /// Required skills this employee lacks, in requirement order.
    pub fn missing_skills<'a>(&self, required: &'a [String]) -> Vec<&'a str> {
        required
            .iter()
            .filter(|skill| !self.has_skill(skill))
            .map(String::as_str)
            .collect()
    }

    /// Availability windows that apply on a local day/date.
    pub fn windows_on(
        &self,
        day_of_week: u8,
        date: NaiveDate,
    ) -> impl Iterator<Item = &AvailabilityWindow> {
        self.availability
            .iter()
            .filter(move |w| w.applies_on(day_of_week, date))
    }

    /// Whether the employee has any constraint-rich attribute
    /// (skills, shift-type preferences, or a preferred location).
    pub fn has_preferences(&self) -> bool {
        !self.skills.is_empty()
            || !self.shift_type_preferences.is_empty()
            || self.preferred_location_id.is_some()
    }
}

/// A recurring (or one-off) window during which an employee may work.
///
/// Times are local wall-clock. `start_time` < `end_time`; windows do not
/// wrap past midnight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityWindow {
    /// Day of week, 0 = Sunday … 6 = Saturday.
    pub day_of_week: u8,
    /// Window start.
    pub start_time: TimeOfDay,
    /// Window end.
    pub end_time: TimeOfDay,
    /// Repeats every week.
    #[serde(default = "default_recurring")]
    pub recurring: bool,
    /// The single local date a non-recurring window applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// The employee prefers to work in this window.
    #[serde(default)]
    pub preferred: bool,
}

fn default_recurring() -> bool {
    true
}

impl AvailabilityWindow {
    /// Creates a recurring, non-preferred window.
    pub fn new(day_of_week: u8, start_time: TimeOfDay, end_time: TimeOfDay) -> Self {
        Self {
            day_of_week,
            start_time,
            end_time,
            recurring: true,
            date: None,
            preferred: false,
        }
    }

    /// Parses `HH:MM` bounds into a recurring window.
    pub fn parse(day_of_week: u8, start: &str, end: &str) -> Result<Self, String> {
        Ok(Self::new(
            day_of_week,
            TimeOfDay::parse(start)?,
            TimeOfDay::parse(end)?,
        ))
    }

    /// Marks the window as preferred.
    pub fn preferred(mut self) -> Self {
        self.preferred = true;
        self
    }

    /// Restricts the window to one local date.
    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.recurring = false;
        self.date = Some(date);
        self
    }

    /// Whether the window applies on a local day/date.
    pub fn applies_on(&self, day_of_week: u8, date: NaiveDate) -> bool {
        if self.day_of_week != day_of_week {
            return false;
        }
        match (self.recurring, self.date) {
            (false, Some(only)) => only == date,
            _ => true,
        }
    }

    /// Whether a local `[start, end)` minute span fits inside this window.
    pub fn contains_span(&self, start_minute: u32, end_minute: u32) -> bool {
        self.start_time.minutes() <= start_minute && end_minute <= self.end_time.minutes()
    }
}

/// A shift already committed to an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommittedShift {
    /// Shift identifier, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Start (inclusive).
    pub start_time: DateTime<Utc>,
    /// End (exclusive).
    pub end_time: DateTime<Utc>,
    /// Location worked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}

impl CommittedShift {
    /// Creates an anonymous committed interval.
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            id: None,
            start_time,
            end_time,
            location_id: None,
        }
    }

    /// Sets the shift id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The `[start, end)` interval.
    #[inline]
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_time, self.end_time)
    }

    /// Raw duration in hours.
    #[inline]
    pub fn duration_hours(&self) -> f64 {
        self.window().duration_hours()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_employee_builder() {
        let emp = Employee::new("E1", "Alice")
            .with_skill("cashier")
            .with_seniority(3)
            .with_preferred_location("L1")
            .with_availability(AvailabilityWindow::parse(1, "09:00", "17:00").unwrap());

        assert!(emp.has_skill("cashier"));
        assert!(!emp.has_skill("barista"));
        assert_eq!(emp.seniority, Some(3));
        assert!(emp.has_preferences());
        assert_eq!(emp.availability.len(), 1);
    }

    #[test]
    fn test_missing_skills() {
        let emp = Employee::new("E1", "Alice").with_skill("cashier");
        let required = vec!["cashier".to_string(), "forklift".into(), "barista".into()];
        assert_eq!(emp.missing_skills(&required), vec!["forklift", "barista"]);
    }

    #[test]
    fn test_window_applies_on() {
        let monday = NaiveDate::from_ymd_opt(2024, 11, 11).unwrap();
        let next_monday = NaiveDate::from_ymd_opt(2024, 11, 18).unwrap();

        let recurring = AvailabilityWindow::parse(1, "09:00", "17:00").unwrap();
        assert!(recurring.applies_on(1, monday));
        assert!(recurring.applies_on(1, next_monday));
        assert!(!recurring.applies_on(2, monday));

        let once = recurring.clone().on_date(monday);
        assert!(once.applies_on(1, monday));
        assert!(!once.applies_on(1, next_monday));
    }

    #[test]
    fn test_window_contains_span() {
        let w = AvailabilityWindow::parse(1, "09:00", "17:00").unwrap();
        assert!(w.contains_span(9 * 60, 17 * 60));
        assert!(w.contains_span(10 * 60, 14 * 60));
        assert!(!w.contains_span(8 * 60 + 30, 12 * 60));
        assert!(!w.contains_span(16 * 60, 18 * 60));
    }

    #[test]
    fn test_employee_deserialize() {
        let json = r#"{
            "id": "E7",
            "name": "Bo",
            "skills": ["cashier"],
            "maxHoursPerWeek": 32,
            "availability": [
                {"dayOfWeek": 1, "startTime": "09:00", "endTime": "17:00", "preferred": true}
            ],
            "existingShifts": [
                {"startTime": "2024-11-11T08:00:00Z", "endTime": "2024-11-11T12:00:00Z"}
            ]
        }"#;
        let emp: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(emp.max_hours_per_week, Some(32.0));
        assert!(emp.availability[0].recurring);
        assert!(emp.availability[0].preferred);
        assert!((emp.existing_shifts[0].duration_hours() - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_committed_shift_window() {
        let c = CommittedShift::new(
            Utc.with_ymd_and_hms(2024, 11, 11, 8, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 11, 11, 12, 0, 0).unwrap(),
        )
        .with_id("X1");
        assert_eq!(c.id.as_deref(), Some("X1"));
        assert_eq!(c.window().start, c.start_time);
    }
}
