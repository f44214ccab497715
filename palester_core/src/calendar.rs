//! Month calendar classification.
//!
//! Every cell of a displayed month (full Sunday-to-Saturday weeks, so the
//! grid includes days of the neighbouring months) gets a category derived
//! from program history and logged workouts.

use crate::program::{active_program, first_program_date};
use crate::{DayName, Error, Result, TrainingProgram};
use chrono::{Datelike, Days, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Display category of a calendar cell
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum DayCategory {
    Completed,
    Missed,
    Rest,
    Future,
    /// No program applied yet, or a future day outside the displayed month
    Regular,
    Today,
    OldCompleted,
    OldMissed,
    OldRest,
}

impl DayCategory {
    /// Muted variant used for days outside the displayed month
    pub fn old(self) -> Self {
        match self {
            DayCategory::Completed => DayCategory::OldCompleted,
            DayCategory::Missed => DayCategory::OldMissed,
            DayCategory::Rest => DayCategory::OldRest,
            other => other,
        }
    }
}

/// How the current day is presented
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TodayStyle {
    /// Keep today's computed status and flag the cell for a ring highlight
    #[default]
    Ring,
    /// Replace today's status with `DayCategory::Today`
    Override,
}

/// One classified cell of the grid
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub category: DayCategory,
    pub is_today: bool,
}

// ============================================================================
// Month Cursor
// ============================================================================

/// The month currently displayed; navigable one month at a time
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonthCursor {
    first: NaiveDate,
    last: NaiveDate,
}

impl MonthCursor {
    /// Fails unless the month and its full grid weeks are representable dates
    pub fn new(year: i32, month: u32) -> Result<Self> {
        let bad = || Error::Parse(format!("invalid month {}-{}", year, month));
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(bad)?;
        let last = (28..=31)
            .rev()
            .find_map(|day| NaiveDate::from_ymd_opt(year, month, day))
            .ok_or_else(bad)?;
        if first.checked_sub_days(Days::new(6)).is_none()
            || last.checked_add_days(Days::new(6)).is_none()
        {
            return Err(bad());
        }
        Ok(Self { first, last })
    }

    /// Month containing the given date
    pub fn containing(date: NaiveDate) -> Result<Self> {
        Self::new(date.year(), date.month())
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last
    }

    /// The following month, `None` at the end of the supported range
    pub fn next(&self) -> Option<Self> {
        let (year, month) = match self.month() {
            12 => (self.year() + 1, 1),
            m => (self.year(), m + 1),
        };
        Self::new(year, month).ok()
    }

    /// The preceding month, `None` at the start of the supported range
    pub fn prev(&self) -> Option<Self> {
        let (year, month) = match self.month() {
            1 => (self.year() - 1, 12),
            m => (self.year(), m - 1),
        };
        Self::new(year, month).ok()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }

    /// Every date from the Sunday on or before the 1st through the Saturday
    /// on or after the last day
    pub fn grid(&self) -> Vec<NaiveDate> {
        // `new` guarantees six days either side are in range
        let lead = self.first.weekday().num_days_from_sunday();
        let trail = 6 - self.last.weekday().num_days_from_sunday();
        let start = self.first - Duration::days(i64::from(lead));
        let end = self.last + Duration::days(i64::from(trail));

        start.iter_days().take_while(|d| *d <= end).collect()
    }
}

impl FromStr for MonthCursor {
    type Err = Error;

    /// Parses `YYYY-MM`
    fn from_str(s: &str) -> Result<Self> {
        let bad = || Error::Parse(format!("invalid month {:?}, expected YYYY-MM", s));
        let (year, month) = s.trim().split_once('-').ok_or_else(bad)?;
        let year: i32 = year.parse().map_err(|_| bad())?;
        let month: u32 = month.parse().map_err(|_| bad())?;
        MonthCursor::new(year, month)
    }
}

impl fmt::Display for MonthCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first_day().format("%B %Y"))
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Classify a single date.
///
/// The active program is resolved for `date` itself, so months spanning a
/// program change are split at the new program's start date.
pub fn classify_day(
    date: NaiveDate,
    month: MonthCursor,
    today: NaiveDate,
    programs: &[TrainingProgram],
    workout_dates: &HashSet<NaiveDate>,
    today_style: TodayStyle,
) -> CalendarCell {
    let in_month = month.contains(date);
    let is_today = date == today;

    let category = if date > today {
        if in_month {
            DayCategory::Future
        } else {
            DayCategory::Regular
        }
    } else {
        match active_program(programs, date) {
            None => DayCategory::Regular,
            Some(program) => {
                let status = if workout_dates.contains(&date) {
                    DayCategory::Completed
                } else if program.is_workout_day(DayName::of(date)) {
                    DayCategory::Missed
                } else {
                    DayCategory::Rest
                };
                if in_month {
                    status
                } else {
                    status.old()
                }
            }
        }
    };

    let category = if is_today && today_style == TodayStyle::Override {
        DayCategory::Today
    } else {
        category
    };

    CalendarCell {
        date,
        category,
        is_today,
    }
}

/// Classify every cell in the month's grid, in display order
pub fn classify_month(
    month: MonthCursor,
    today: NaiveDate,
    programs: &[TrainingProgram],
    workout_dates: &[NaiveDate],
    today_style: TodayStyle,
) -> Vec<CalendarCell> {
    let done: HashSet<NaiveDate> = workout_dates.iter().copied().collect();

    if let Some(start) = first_program_date(programs) {
        tracing::debug!("Classifying {} (programs start {})", month, start);
    }

    month
        .grid()
        .into_iter()
        .map(|date| classify_day(date, month, today, programs, &done, today_style))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Session;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn program(on: NaiveDate, days: &[DayName]) -> TrainingProgram {
        TrainingProgram {
            date: on,
            sessions: days
                .iter()
                .map(|day| Session {
                    day: *day,
                    lifts: Vec::new(),
                })
                .collect(),
        }
    }

    fn category_of(cells: &[CalendarCell], on: NaiveDate) -> DayCategory {
        cells
            .iter()
            .find(|c| c.date == on)
            .map(|c| c.category)
            .expect("date in grid")
    }

    #[test]
    fn test_grid_spans_full_weeks() {
        let september = MonthCursor::new(2025, 9).unwrap();
        let grid = september.grid();

        assert_eq!(grid.first(), Some(&date(2025, 8, 31)));
        assert_eq!(grid.last(), Some(&date(2025, 10, 4)));
        assert_eq!(grid.len() % 7, 0);
        assert_eq!(grid.len(), 35);
    }

    #[test]
    fn test_grid_month_starting_on_sunday() {
        // June 2025 starts on a Sunday and ends on a Monday
        let june = MonthCursor::new(2025, 6).unwrap();
        let grid = june.grid();
        assert_eq!(grid.first(), Some(&date(2025, 6, 1)));
        assert_eq!(grid.last(), Some(&date(2025, 7, 5)));
    }

    #[test]
    fn test_cursor_navigation_and_parsing() {
        let december = MonthCursor::new(2025, 12).unwrap();
        assert_eq!(december.next(), Some(MonthCursor::new(2026, 1).unwrap()));
        assert_eq!(december.next().and_then(|m| m.prev()), Some(december));
        assert_eq!(december.last_day(), date(2025, 12, 31));
        assert_eq!(MonthCursor::new(2024, 2).unwrap().last_day(), date(2024, 2, 29));

        assert_eq!("2025-09".parse::<MonthCursor>().unwrap(), MonthCursor::new(2025, 9).unwrap());
        assert!("2025-13".parse::<MonthCursor>().is_err());
        assert!("September".parse::<MonthCursor>().is_err());
        assert_eq!(MonthCursor::containing(date(2025, 9, 10)).unwrap().to_string(), "September 2025");
    }

    #[test]
    fn test_cursor_rejects_months_at_date_limits() {
        let max_year = NaiveDate::MAX.year();
        let min_year = NaiveDate::MIN.year();

        assert!(MonthCursor::new(max_year, 12).is_err());
        assert!(MonthCursor::new(min_year, 1).is_err());
        assert!(MonthCursor::containing(NaiveDate::MAX).is_err());

        let november = MonthCursor::new(max_year, 11).unwrap();
        assert_eq!(november.next(), None);
        assert_eq!(november.last_day(), NaiveDate::from_ymd_opt(max_year, 11, 30).unwrap());
        assert!(november.grid().len() <= 42);

        let february = MonthCursor::new(min_year, 2).unwrap();
        assert_eq!(february.prev(), None);
        assert!(february.grid().len() >= 28);
    }

    #[test]
    fn test_september_example() {
        let programs = vec![program(date(2025, 9, 1), &[DayName::Mon])];
        let workouts = vec![date(2025, 9, 8)];
        let today = date(2025, 9, 10);
        let month = MonthCursor::new(2025, 9).unwrap();

        let cells = classify_month(month, today, &programs, &workouts, TodayStyle::Override);

        assert_eq!(category_of(&cells, date(2025, 9, 1)), DayCategory::Missed);
        assert_eq!(category_of(&cells, date(2025, 9, 2)), DayCategory::Rest);
        assert_eq!(category_of(&cells, date(2025, 9, 8)), DayCategory::Completed);
        assert_eq!(category_of(&cells, date(2025, 9, 10)), DayCategory::Today);
        assert_eq!(category_of(&cells, date(2025, 9, 15)), DayCategory::Future);
        // Before the program started
        assert_eq!(category_of(&cells, date(2025, 8, 31)), DayCategory::Regular);
        // Future days of the next month are not "future"
        assert_eq!(category_of(&cells, date(2025, 10, 1)), DayCategory::Regular);
    }

    #[test]
    fn test_out_of_month_days_use_old_variants() {
        let programs = vec![program(date(2025, 8, 1), &[DayName::Fri])];
        let workouts = vec![date(2025, 8, 29)];
        let today = date(2025, 9, 10);
        let month = MonthCursor::new(2025, 9).unwrap();

        let cells = classify_month(month, today, &programs, &workouts, TodayStyle::Ring);

        // Sunday 2025-08-31, rest day in the previous month
        assert_eq!(category_of(&cells, date(2025, 8, 31)), DayCategory::OldRest);

        let august = MonthCursor::new(2025, 8).unwrap();
        let cells = classify_month(august, today, &programs, &workouts, TodayStyle::Ring);
        assert_eq!(category_of(&cells, date(2025, 8, 29)), DayCategory::Completed);
        assert_eq!(category_of(&cells, date(2025, 8, 22)), DayCategory::Missed);
        // September days shown in August's grid
        assert_eq!(category_of(&cells, date(2025, 9, 5)), DayCategory::OldMissed);
        assert_eq!(category_of(&cells, date(2025, 9, 6)), DayCategory::OldRest);
        assert_eq!(category_of(&cells, date(2025, 7, 27)), DayCategory::Regular);

        let october = MonthCursor::new(2025, 10).unwrap();
        let workouts = vec![date(2025, 9, 30)];
        let cells = classify_month(october, date(2025, 10, 2), &programs, &workouts, TodayStyle::Ring);
        assert_eq!(category_of(&cells, date(2025, 9, 30)), DayCategory::OldCompleted);
    }

    #[test]
    fn test_ring_style_keeps_today_status() {
        let programs = vec![program(date(2025, 9, 1), &[DayName::Mon, DayName::Wed])];
        let today = date(2025, 9, 10);
        let month = MonthCursor::new(2025, 9).unwrap();

        let cells = classify_month(month, today, &programs, &[], TodayStyle::Ring);
        let cell = cells.iter().find(|c| c.date == today).unwrap();
        assert!(cell.is_today);
        assert_eq!(cell.category, DayCategory::Missed);
        assert_eq!(cells.iter().filter(|c| c.is_today).count(), 1);

        let cells = classify_month(month, today, &programs, &[today], TodayStyle::Ring);
        assert_eq!(category_of(&cells, today), DayCategory::Completed);
    }

    #[test]
    fn test_before_first_program_is_regular() {
        let programs = vec![program(date(2025, 9, 20), &[DayName::Mon])];
        let workouts = vec![date(2025, 9, 15)];
        let month = MonthCursor::new(2025, 9).unwrap();

        let cells = classify_month(month, date(2025, 9, 25), &programs, &workouts, TodayStyle::Ring);
        for cell in cells.iter().filter(|c| c.date < date(2025, 9, 20)) {
            assert_eq!(cell.category, DayCategory::Regular, "{}", cell.date);
        }
        assert_eq!(category_of(&cells, date(2025, 9, 22)), DayCategory::Missed);
    }

    #[test]
    fn test_no_programs_everything_past_is_regular() {
        let month = MonthCursor::new(2025, 9).unwrap();
        let cells = classify_month(month, date(2025, 9, 10), &[], &[], TodayStyle::Ring);
        assert!(cells
            .iter()
            .filter(|c| c.date <= date(2025, 9, 10))
            .all(|c| c.category == DayCategory::Regular));
    }

    #[test]
    fn test_program_change_mid_month() {
        // Mondays until the 15th, then Tuesdays; stored newest first
        let programs = vec![
            program(date(2025, 9, 15), &[DayName::Tue]),
            program(date(2025, 9, 1), &[DayName::Mon]),
        ];
        let month = MonthCursor::new(2025, 9).unwrap();
        let cells = classify_month(month, date(2025, 9, 30), &programs, &[], TodayStyle::Ring);

        assert_eq!(category_of(&cells, date(2025, 9, 8)), DayCategory::Missed);
        assert_eq!(category_of(&cells, date(2025, 9, 9)), DayCategory::Rest);
        assert_eq!(category_of(&cells, date(2025, 9, 15)), DayCategory::Rest);
        assert_eq!(category_of(&cells, date(2025, 9, 16)), DayCategory::Missed);
    }

    #[test]
    fn test_completed_regardless_of_schedule() {
        let programs = vec![program(date(2025, 9, 1), &[DayName::Mon])];
        let month = MonthCursor::new(2025, 9).unwrap();
        // Saturday is a rest day but a workout was logged
        let cells = classify_month(
            month,
            date(2025, 9, 10),
            &programs,
            &[date(2025, 9, 6)],
            TodayStyle::Ring,
        );
        assert_eq!(category_of(&cells, date(2025, 9, 6)), DayCategory::Completed);
    }
}
