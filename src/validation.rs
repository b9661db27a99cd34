//! Input validation for scheduling problems.
//!
//! Checks structural integrity of shifts, employees, and constraint
//! settings before any solver runs. Detects:
//! - Duplicate IDs
//! - Empty or inverted intervals (shift end ≤ start, window end ≤ start)
//! - Out-of-range values (priority, day of week)
//! - Negative hours, rates, and weights
//! - Unknown timezones
//!
//! Malformed input is the only condition the router reports to its
//! caller; everything downstream of validation degrades gracefully.

use std::collections::HashSet;
use std::fmt;

use crate::models::{Employee, SchedulingConstraints, SchedulingProblem, Shift, MAX_PRIORITY};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// An entity has an empty identifier.
    MissingId,
    /// An interval ends at or before its start.
    InvalidInterval,
    /// A value lies outside its allowed range.
    OutOfRange,
    /// A quantity that must be non-negative is negative.
    NegativeValue,
    /// The timezone name is not a known IANA zone.
    InvalidTimezone,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a scheduling problem.
///
/// Checks:
/// 1. The timezone, when given, is a known IANA zone
/// 2. No duplicate or empty shift IDs; every shift has start < end,
///    priority ≤ 10, and a non-negative rate
/// 3. No duplicate or empty employee IDs; overrides and rates are
///    non-negative; availability days are 0..=6 with start < end;
///    committed shifts have start < end
/// 4. Constraint settings are non-negative
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_problem(problem: &SchedulingProblem) -> ValidationResult {
    let mut errors = Vec::new();

    if let Err(message) = problem.clock() {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidTimezone,
            message,
        ));
    }

    let mut shift_ids = HashSet::new();
    for shift in &problem.shifts {
        if shift.id.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingId,
                "Shift with empty ID",
            ));
        } else if !shift_ids.insert(shift.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate shift ID: {}", shift.id),
            ));
        }
        check_shift(shift, &mut errors);
    }

    let mut employee_ids = HashSet::new();
    for employee in &problem.employees {
        if employee.id.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingId,
                "Employee with empty ID",
            ));
        } else if !employee_ids.insert(employee.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate employee ID: {}", employee.id),
            ));
        }
        check_employee(employee, &mut errors);
    }

    check_constraints(&problem.constraints, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_shift(shift: &Shift, errors: &mut Vec<ValidationError>) {
    if shift.end_time <= shift.start_time {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidInterval,
            format!("Shift '{}' must end after it starts", shift.id),
        ));
    }
    if shift.priority > MAX_PRIORITY {
        errors.push(ValidationError::new(
            ValidationErrorKind::OutOfRange,
            format!(
                "Shift '{}' priority {} exceeds {MAX_PRIORITY}",
                shift.id, shift.priority
            ),
        ));
    }
    if let Some(rate) = shift.hourly_rate {
        check_non_negative(rate, || format!("Shift '{}' hourly rate", shift.id), errors);
    }
}

fn check_employee(employee: &Employee, errors: &mut Vec<ValidationError>) {
    let id = &employee.id;
    let optional = [
        (employee.default_hourly_rate, "hourly rate"),
        (employee.max_hours_per_week, "max hours per week"),
        (employee.min_rest_hours, "min rest hours"),
        (employee.min_hours_per_week, "min hours per week"),
    ];
    for (value, label) in optional {
        if let Some(v) = value {
            check_non_negative(v, || format!("Employee '{id}' {label}"), errors);
        }
    }

    for window in &employee.availability {
        if window.day_of_week > 6 {
            errors.push(ValidationError::new(
                ValidationErrorKind::OutOfRange,
                format!(
                    "Employee '{id}' availability day {} is not in 0..=6",
                    window.day_of_week
                ),
            ));
        }
        if window.end_time <= window.start_time {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidInterval,
                format!(
                    "Employee '{id}' availability {}-{} must end after it starts",
                    window.start_time, window.end_time
                ),
            ));
        }
    }

    for committed in &employee.existing_shifts {
        if committed.end_time <= committed.start_time {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidInterval,
                format!("Employee '{id}' has a committed shift that ends before it starts"),
            ));
        }
    }
}

fn check_constraints(constraints: &SchedulingConstraints, errors: &mut Vec<ValidationError>) {
    check_non_negative(
        constraints.max_hours_per_week,
        || "maxHoursPerWeek".to_string(),
        errors,
    );
    check_non_negative(
        constraints.min_rest_hours_between_shifts,
        || "minRestHoursBetweenShifts".to_string(),
        errors,
    );
    check_non_negative(
        constraints.preferred_location_weight,
        || "preferredLocationWeight".to_string(),
        errors,
    );
    if let Some(weight) = constraints.fairness_weight {
        check_non_negative(weight, || "fairnessWeight".to_string(), errors);
    }
    if let Some(hours) = constraints.max_hours_per_day {
        check_non_negative(hours, || "maxHoursPerDay".to_string(), errors);
    }
}

fn check_non_negative(
    value: f64,
    label: impl FnOnce() -> String,
    errors: &mut Vec<ValidationError>,
) {
    if value.is_nan() || value < 0.0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NegativeValue,
            format!("{} must be non-negative (got {value})", label()),
        ));
    }
}
