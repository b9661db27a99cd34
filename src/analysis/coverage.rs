//! Coverage gap analysis for unstaffed shifts.

use serde::{Deserialize, Serialize};

use crate::models::{day_name, Employee, LocalClock, Shift, UnassignableShift};
use crate::scheduler::RosterState;

/// Start-time margin within which an employee counts as almost available.
pub const ALMOST_AVAILABLE_MARGIN_MINUTES: u32 = 120;

/// Weekly hours under which an employee could use an extra shift.
pub const LOW_HOURS_THRESHOLD: f64 = 20.0;

/// Most names quoted in one suggestion.
const MAX_NAMES: usize = 2;

/// Fallback suggestion when no heuristic applies.
pub const POST_FOR_PICKUP: &str = "No employees are available during this time. \
    Consider posting this shift for pickup or adjusting the schedule.";

/// Summary of one unstaffed shift, with suggestions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageGap {
    /// The unstaffed shift.
    pub shift_id: String,
    /// Local day name, e.g. `Monday`.
    pub day: String,
    /// Local 12-hour range, e.g. `9:00 AM - 1:00 PM`.
    pub time_range: String,
    /// Location name, else ID.
    pub location: String,
    /// Role to fill, empty when the shift names none.
    pub role: String,
    /// Staffing hints, most specific first.
    pub suggestions: Vec<String>,
}

/// Builds a gap per unassignable shift. Unknown shift IDs are skipped.
///
/// `roster` holds working sets after the solve; it drives the low-hours
/// heuristic.
pub fn analyze_coverage(
    unassignable: &[UnassignableShift],
    shifts: &[Shift],
    employees: &[Employee],
    roster: &RosterState,
    clock: LocalClock,
) -> Vec<CoverageGap> {
    unassignable
        .iter()
        .filter_map(|u| shifts.iter().find(|s| s.id == u.shift_id))
        .map(|shift| gap_for(shift, employees, roster, clock))
        .collect()
}

fn gap_for(
    shift: &Shift,
    employees: &[Employee],
    roster: &RosterState,
    clock: LocalClock,
) -> CoverageGap {
    let day_of_week = clock.day_of_week(shift.start_time);
    let date = clock.date(shift.start_time);
    let day = day_name(day_of_week);
    let start_minute = clock.minute_of_day(shift.start_time);

    let mut suggestions = Vec::new();

    let almost: Vec<&Employee> = employees
        .iter()
        .filter(|e| {
            e.windows_on(day_of_week, date).any(|w| {
                w.start_time.minutes().abs_diff(start_minute) < ALMOST_AVAILABLE_MARGIN_MINUTES
            })
        })
        .collect();
    if !almost.is_empty() {
        suggestions.push(format!(
            "{} {} available on {day} but not during these hours. \
             Consider adjusting the shift time or asking if they can extend their availability.",
            names(&almost, " or "),
            if almost.len() > 1 { "are" } else { "is" },
        ));
    }

    let low_hours: Vec<&Employee> = employees
        .iter()
        .filter(|e| {
            roster.hours(&e.id) < LOW_HOURS_THRESHOLD
                && e.windows_on(day_of_week, date).next().is_some()
        })
        .collect();
    if let Some(first) = low_hours.first() {
        suggestions.push(format!(
            "{} {} only {:.1} hours this week. \
             They might appreciate the extra shift if their availability can be adjusted.",
            names(&low_hours, " and "),
            if low_hours.len() > 1 { "have" } else { "has" },
            roster.hours(&first.id),
        ));
    }

    if suggestions.is_empty() {
        suggestions.push(POST_FOR_PICKUP.to_string());
    }

    CoverageGap {
        shift_id: shift.id.clone(),
        day: day.to_string(),
        time_range: format!(
            "{} - {}",
            clock.clock_time(shift.start_time),
            clock.clock_time(shift.end_time)
        ),
        location: shift.location_label().to_string(),
        role: shift.role.clone(),
        suggestions,
    }
}

fn names(employees: &[&Employee], separator: &str) -> String {
    employees
        .iter()
        .take(MAX_NAMES)
        .map(|e| e.name.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AvailabilityWindow, CommittedShift};
    use chrono::{TimeZone, Utc};

    fn make_shift() -> Shift {
        // Monday
        Shift::new(
            "S1",
            Utc.with_ymd_and_hms(2024, 11, 11, 6, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 11, 11, 10, 0, 0).unwrap(),
            "L1",
        )
        .with_location_name("Downtown")
        .with_role("barista")
    }

    fn unassignable() -> Vec<UnassignableShift> {
        vec![UnassignableShift {
            shift_id: "S1".into(),
            reasons: vec!["none".into()],
        }]
    }

    fn analyze(employees: &[Employee]) -> Vec<CoverageGap> {
        let roster = RosterState::from_employees(employees);
        analyze_coverage(&unassignable(), &[make_shift()], employees, &roster, LocalClock::utc())
    }

    #[test]
    fn test_summary_fields() {
        let gaps = analyze(&[]);
        assert_eq!(gaps.len(), 1);
        let gap = &gaps[0];
        assert_eq!(gap.day, "Monday");
        assert_eq!(gap.time_range, "6:00 AM - 10:00 AM");
        assert_eq!(gap.location, "Downtown");
        assert_eq!(gap.role, "barista");
        assert_eq!(gap.suggestions, vec![POST_FOR_PICKUP]);
    }

    #[test]
    fn test_almost_available_names_at_most_two() {
        let emp = |id: &str, name: &str| {
            Employee::new(id, name)
                .with_availability(AvailabilityWindow::parse(1, "07:00", "15:00").unwrap())
                .with_existing_shift(CommittedShift::new(
                    Utc.with_ymd_and_hms(2024, 11, 12, 0, 0, 0).unwrap(),
                    Utc.with_ymd_and_hms(2024, 11, 13, 0, 0, 0).unwrap(),
                ))
        };
        let gaps = analyze(&[emp("E1", "Ann"), emp("E2", "Bob"), emp("E3", "Cy")]);
        let suggestions = &gaps[0].suggestions;
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].starts_with("Ann or Bob are available on Monday"));
    }

    #[test]
    fn test_low_hours() {
        let emp = Employee::new("E1", "Ann")
            .with_availability(AvailabilityWindow::parse(1, "14:00", "22:00").unwrap())
            .with_existing_shift(CommittedShift::new(
                Utc.with_ymd_and_hms(2024, 11, 12, 9, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 11, 12, 15, 30, 0).unwrap(),
            ));
        let gaps = analyze(&[emp]);
        assert_eq!(
            gaps[0].suggestions,
            vec!["Ann has only 6.5 hours this week. They might appreciate the extra shift if their availability can be adjusted."]
        );
    }

    #[test]
    fn test_unknown_shift_skipped() {
        let roster = RosterState::default();
        let gaps = analyze_coverage(&unassignable(), &[], &[], &roster, LocalClock::utc());
        assert!(gaps.is_empty());
    }
}
