//! Scheduling request model.
//!
//! Employees, shifts, and the planning horizon. Dates are day offsets
//! (`0..horizon_days`); the caller maps day 0 to a concrete calendar date.
//! Times of day are minutes since midnight.

use serde::{Deserialize, Serialize};

/// An availability window: an inclusive day range with a daily time window.
///
/// An employee is available for a shift on a given day when some window
/// contains the day and fully covers the shift's time range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    /// First day of the window (inclusive, horizon offset).
    pub start_day: u32,
    /// Last day of the window (inclusive, horizon offset).
    pub end_day: u32,
    /// Daily availability start (minutes since midnight).
    pub start_min: u16,
    /// Daily availability end (minutes since midnight, exclusive).
    pub end_min: u16,
}

impl AvailabilityWindow {
    /// Creates a window spanning the given days with a daily time range.
    pub fn new(start_day: u32, end_day: u32, start_min: u16, end_min: u16) -> Self {
        Self {
            start_day,
            end_day,
            start_min,
            end_min,
        }
    }

    /// A window covering every day of a horizon, all day long.
    pub fn always(horizon_days: u32) -> Self {
        Self::new(0, horizon_days.saturating_sub(1), 0, 24 * 60)
    }

    /// Whether this window covers `day` and the `[start_min, end_min)` range.
    pub fn covers(&self, day: u32, start_min: u16, end_min: u16) -> bool {
        day >= self.start_day
            && day <= self.end_day
            && start_min >= self.start_min
            && end_min <= self.end_min
    }
}

/// A staff member that can be assigned to shifts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    /// Unique employee identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Skills this employee holds (matched against [`Shift::required_skill`]).
    pub skills: Vec<String>,
    /// Availability windows. Empty means always available.
    pub availability: Vec<AvailabilityWindow>,
    /// Maximum consecutive working days (0 = unlimited).
    pub max_consecutive_days: u32,
    /// Minimum rest between two shifts on different days, in hours (0 = none).
    pub min_rest_hours: u32,
}

impl Employee {
    /// Creates an employee with no constraints and full availability.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            skills: Vec::new(),
            availability: Vec::new(),
            max_consecutive_days: 0,
            min_rest_hours: 0,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a skill.
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.push(skill.into());
        self
    }

    /// Adds an availability window.
    pub fn with_availability(mut self, window: AvailabilityWindow) -> Self {
        self.availability.push(window);
        self
    }

    /// Sets the maximum consecutive working days.
    pub fn with_max_consecutive_days(mut self, days: u32) -> Self {
        self.max_consecutive_days = days;
        self
    }

    /// Sets the minimum rest hours between shifts.
    pub fn with_min_rest_hours(mut self, hours: u32) -> Self {
        self.min_rest_hours = hours;
        self
    }

    /// Whether this employee holds the given skill.
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }

    /// Availability check for a time range on a given day.
    ///
    /// Returns `true` when no windows are declared (always available).
    pub fn is_available(&self, day: u32, start_min: u16, end_min: u16) -> bool {
        self.availability.is_empty()
            || self
                .availability
                .iter()
                .any(|w| w.covers(day, start_min, end_min))
    }
}

/// A bounded time window requiring a given headcount and optional skill.
///
/// One shift recurs on every day of the planning horizon; each required
/// head on each day is one slot of demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    /// Unique shift identifier.
    pub id: String,
    /// Shift start (minutes since midnight).
    pub start_min: u16,
    /// Shift end (minutes since midnight, exclusive). Must exceed the start.
    pub end_min: u16,
    /// Number of employees required per day.
    pub headcount: u32,
    /// Skill every assignee must hold, if any.
    pub required_skill: Option<String>,
}

impl Shift {
    /// Creates a single-head shift with the given time window.
    pub fn new(id: impl Into<String>, start_min: u16, end_min: u16) -> Self {
        Self {
            id: id.into(),
            start_min,
            end_min,
            headcount: 1,
            required_skill: None,
        }
    }

    /// Sets the required headcount.
    pub fn with_headcount(mut self, headcount: u32) -> Self {
        self.headcount = headcount;
        self
    }

    /// Sets the required skill.
    pub fn with_required_skill(mut self, skill: impl Into<String>) -> Self {
        self.required_skill = Some(skill.into());
        self
    }

    /// Whether this shift's time window overlaps another's on the same day.
    pub fn overlaps(&self, other: &Shift) -> bool {
        self.start_min < other.end_min && other.start_min < self.end_min
    }
}

/// Immutable input to a scheduling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Staff available for assignment.
    pub employees: Vec<Employee>,
    /// Shift definitions, each recurring daily over the horizon.
    pub shifts: Vec<Shift>,
    /// Length of the planning horizon in days.
    pub horizon_days: u32,
}

impl ScheduleRequest {
    /// Creates a request.
    pub fn new(employees: Vec<Employee>, shifts: Vec<Shift>, horizon_days: u32) -> Self {
        Self {
            employees,
            shifts,
            horizon_days,
        }
    }

    /// Total demand: sum of headcounts over shifts and days.
    pub fn total_slots(&self) -> u64 {
        let per_day: u64 = self.shifts.iter().map(|s| u64::from(s.headcount)).sum();
        per_day * u64::from(self.horizon_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_builder() {
        let e = Employee::new("E1")
            .with_name("Alice")
            .with_skill("nursing")
            .with_max_consecutive_days(5)
            .with_min_rest_hours(11);

        assert_eq!(e.id, "E1");
        assert!(e.has_skill("nursing"));
        assert!(!e.has_skill("welding"));
        assert_eq!(e.max_consecutive_days, 5);
        assert_eq!(e.min_rest_hours, 11);
    }

    #[test]
    fn test_availability_empty_means_always() {
        let e = Employee::new("E1");
        assert!(e.is_available(0, 0, 24 * 60));
        assert!(e.is_available(364, 480, 960));
    }

    #[test]
    fn test_availability_window_covers() {
        let w = AvailabilityWindow::new(0, 4, 480, 1080); // days 0-4, 08:00-18:00
        assert!(w.covers(2, 540, 1020));
        assert!(!w.covers(5, 540, 1020)); // day out of range
        assert!(!w.covers(2, 420, 1020)); // starts before window
        assert!(!w.covers(2, 540, 1140)); // ends after window
    }

    #[test]
    fn test_employee_with_window() {
        let e = Employee::new("E1").with_availability(AvailabilityWindow::new(0, 1, 480, 960));
        assert!(e.is_available(0, 480, 960));
        assert!(!e.is_available(2, 480, 960));
    }

    #[test]
    fn test_shift_overlap() {
        let day = Shift::new("DAY", 480, 960);
        let swing = Shift::new("SWING", 900, 1320);
        let night = Shift::new("NIGHT", 1020, 1440);

        assert!(day.overlaps(&swing));
        assert!(swing.overlaps(&day));
        assert!(!day.overlaps(&night));
    }

    #[test]
    fn test_total_slots() {
        let req = ScheduleRequest::new(
            vec![Employee::new("E1")],
            vec![
                Shift::new("DAY", 480, 960).with_headcount(2),
                Shift::new("NIGHT", 1020, 1440),
            ],
            7,
        );
        assert_eq!(req.total_slots(), 21);
    }

    #[test]
    fn test_request_from_json() {
        let json = r#"{
            "employees": [
                {"id": "E1", "name": "Alice", "skills": ["nursing"],
                 "availability": [], "max_consecutive_days": 5, "min_rest_hours": 11}
            ],
            "shifts": [
                {"id": "DAY", "start_min": 480, "end_min": 960,
                 "headcount": 1, "required_skill": "nursing"}
            ],
            "horizon_days": 7
        }"#;

        let req: ScheduleRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.employees.len(), 1);
        assert_eq!(req.shifts[0].required_skill.as_deref(), Some("nursing"));
        assert_eq!(req.total_slots(), 7);
    }
}
