//! Core domain types for the Palester workout tracker.
//!
//! This module defines the persisted document and everything inside it:
//! - Lifts, their quantities and weights
//! - Sessions and weekly training programs
//! - Logged workouts
//! - The gym location and the `AppData` root

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Dates
// ============================================================================

/// Serde adapter for calendar dates.
///
/// Dates are written as `YYYY-MM-DD`. Reading also accepts the full timestamps
/// written by older app versions, which decode to their local calendar day.
pub mod iso_date {
    use chrono::{DateTime, Local, NaiveDate, TimeZone};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    /// Parse a stored date string in the local timezone.
    pub fn parse(raw: &str) -> Result<NaiveDate, String> {
        parse_in(raw, &Local)
    }

    /// Parse a stored date string.
    ///
    /// Full RFC 3339 timestamps (local midnight written as UTC by older
    /// versions) are converted to `tz` before taking the calendar day.
    /// Anything else is cut to its first ten characters.
    pub fn parse_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> Result<NaiveDate, String> {
        let raw = raw.trim();
        if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
            return Ok(stamp.with_timezone(tz).date_naive());
        }
        let head = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(head, FORMAT)
            .map_err(|e| format!("invalid date {:?}: {}", raw, e))
    }
}

// ============================================================================
// Lift Types
// ============================================================================

/// How a lift is measured: repetitions or seconds under load
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiftQuantity {
    Reps { reps: u32 },
    Time { seconds: u32 },
}

impl LiftQuantity {
    /// The numeric amount regardless of kind
    pub fn amount(&self) -> u32 {
        match self {
            LiftQuantity::Reps { reps } => *reps,
            LiftQuantity::Time { seconds } => *seconds,
        }
    }
}

impl fmt::Display for LiftQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiftQuantity::Reps { reps } => write!(f, "{}", reps),
            LiftQuantity::Time { seconds } => write!(f, "{}s", seconds),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Kg,
    Lbs,
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightUnit::Kg => f.write_str("kg"),
            WeightUnit::Lbs => f.write_str("lbs"),
        }
    }
}

/// Load used for a lift
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Weight {
    pub weight: f64,
    pub unit: WeightUnit,
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.weight, self.unit)
    }
}

/// A single exercise within a session or workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Lift {
    /// Unique within the owning session, assigned in increasing order
    pub id: u32,
    pub name: String,
    pub sets: u32,
    pub quantity: LiftQuantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Weight>,
}

impl Lift {
    /// A blank lift as offered by a fresh session form: one set of one rep.
    pub fn empty(id: u32) -> Self {
        Self {
            id,
            name: String::new(),
            sets: 1,
            quantity: LiftQuantity::Reps { reps: 1 },
            weight: None,
        }
    }
}

impl fmt::Display for Lift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}x{}", self.name, self.sets, self.quantity)?;
        if let Some(weight) = &self.weight {
            write!(f, " @ {}", weight)?;
        }
        Ok(())
    }
}

// ============================================================================
// Program Types
// ============================================================================

/// Day of the week a session is scheduled on
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DayName {
    #[serde(rename = "mon", alias = "MON", alias = "Mon")]
    Mon,
    #[serde(rename = "tue", alias = "TUE", alias = "Tue")]
    Tue,
    #[serde(rename = "wed", alias = "WED", alias = "Wed")]
    Wed,
    #[serde(rename = "thu", alias = "THU", alias = "Thu")]
    Thu,
    #[serde(rename = "fri", alias = "FRI", alias = "Fri")]
    Fri,
    #[serde(rename = "sat", alias = "SAT", alias = "Sat")]
    Sat,
    #[serde(rename = "sun", alias = "SUN", alias = "Sun")]
    Sun,
}

impl DayName {
    pub const ALL: [DayName; 7] = [
        DayName::Mon,
        DayName::Tue,
        DayName::Wed,
        DayName::Thu,
        DayName::Fri,
        DayName::Sat,
        DayName::Sun,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayName::Mon => "mon",
            DayName::Tue => "tue",
            DayName::Wed => "wed",
            DayName::Thu => "thu",
            DayName::Fri => "fri",
            DayName::Sat => "sat",
            DayName::Sun => "sun",
        }
    }

    /// Day name of a calendar date
    pub fn of(date: NaiveDate) -> Self {
        use chrono::Datelike;
        date.weekday().into()
    }
}

impl From<Weekday> for DayName {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayName::Mon,
            Weekday::Tue => DayName::Tue,
            Weekday::Wed => DayName::Wed,
            Weekday::Thu => DayName::Thu,
            Weekday::Fri => DayName::Fri,
            Weekday::Sat => DayName::Sat,
            Weekday::Sun => DayName::Sun,
        }
    }
}

impl FromStr for DayName {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let lower = s.trim().to_lowercase();
        DayName::ALL
            .into_iter()
            .find(|d| d.as_str() == lower)
            .ok_or_else(|| crate::Error::Parse(format!("unknown day {:?}", s)))
    }
}

impl fmt::Display for DayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifts planned for one weekday
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub day: DayName,
    #[serde(default)]
    pub lifts: Vec<Lift>,
}

/// A weekly plan, effective from `date` until a later program supersedes it
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrainingProgram {
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    pub sessions: Vec<Session>,
}

impl TrainingProgram {
    /// Session scheduled for the given weekday, if any
    pub fn session_on(&self, day: DayName) -> Option<&Session> {
        self.sessions.iter().find(|s| s.day == day)
    }

    /// Whether the weekday is a workout day under this program
    pub fn is_workout_day(&self, day: DayName) -> bool {
        self.session_on(day).is_some()
    }

    /// Scheduled weekdays in Monday-first order
    pub fn workout_days(&self) -> Vec<DayName> {
        DayName::ALL
            .into_iter()
            .filter(|d| self.is_workout_day(*d))
            .collect()
    }
}

// ============================================================================
// Workout and Document Types
// ============================================================================

/// A logged workout; at most one per calendar date
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub lifts: Vec<Lift>,
}

/// Fixed coordinates of the user's gym
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct GymLocation {
    pub lat: f64,
    pub lng: f64,
}

/// The single persisted document
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    #[serde(default)]
    pub programs: Vec<TrainingProgram>,
    #[serde(default)]
    pub workouts: Vec<Workout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gym_location: Option<GymLocation>,
}

impl AppData {
    /// Fresh document as produced by setup: one program, no workouts
    pub fn new(program: TrainingProgram, gym_location: Option<GymLocation>) -> Self {
        Self {
            programs: vec![program],
            workouts: Vec::new(),
            gym_location,
        }
    }

    /// Dates of all logged workouts
    pub fn workout_dates(&self) -> Vec<NaiveDate> {
        self.workouts.iter().map(|w| w.date).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_lift_wire_format() {
        let lift = Lift {
            id: 3,
            name: "Squat".into(),
            sets: 5,
            quantity: LiftQuantity::Reps { reps: 5 },
            weight: Some(Weight {
                weight: 100.0,
                unit: WeightUnit::Kg,
            }),
        };
        let json = serde_json::to_value(&lift).unwrap();
        assert_eq!(json["quantity"]["type"], "reps");
        assert_eq!(json["quantity"]["reps"], 5);
        assert_eq!(json["weight"]["unit"], "kg");

        let plank: Lift = serde_json::from_str(
            r#"{"id":1,"name":"Plank","sets":3,"quantity":{"type":"time","seconds":60}}"#,
        )
        .unwrap();
        assert_eq!(plank.quantity, LiftQuantity::Time { seconds: 60 });
        assert!(plank.weight.is_none());
    }

    #[test]
    fn test_date_accepts_iso_timestamp() {
        let workout: Workout =
            serde_json::from_str(r#"{"date":"2025-09-08T12:00:00.000Z","lifts":[]}"#).unwrap();
        assert_eq!(workout.date, NaiveDate::from_ymd_opt(2025, 9, 8).unwrap());

        let written = serde_json::to_string(&workout).unwrap();
        assert!(written.contains(r#""date":"2025-09-08""#));
    }

    #[test]
    fn test_timestamp_converted_to_local_day() {
        // Local midnight of 09-08 at UTC+3, as stored by older versions
        let tehran = FixedOffset::east_opt(3 * 3600).unwrap();
        assert_eq!(
            iso_date::parse_in("2025-09-07T21:00:00.000Z", &tehran).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 8).unwrap()
        );

        let new_york = FixedOffset::west_opt(4 * 3600).unwrap();
        assert_eq!(
            iso_date::parse_in("2025-09-08T04:00:00.000Z", &new_york).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 8).unwrap()
        );

        // Plain dates and date-prefixed strings ignore the timezone
        assert_eq!(
            iso_date::parse_in("2025-09-08", &tehran).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 8).unwrap()
        );
        assert_eq!(
            iso_date::parse_in("2025-09-08 garbage", &new_york).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 8).unwrap()
        );
        assert!(iso_date::parse_in("08/09/2025", &tehran).is_err());
    }

    #[test]
    fn test_day_name_parsing() {
        assert_eq!("Mon".parse::<DayName>().unwrap(), DayName::Mon);
        assert_eq!(" sun ".parse::<DayName>().unwrap(), DayName::Sun);
        assert!("monday".parse::<DayName>().is_err());

        let day: DayName = serde_json::from_str(r#""THU""#).unwrap();
        assert_eq!(day, DayName::Thu);
        assert_eq!(serde_json::to_string(&day).unwrap(), r#""thu""#);
    }

    #[test]
    fn test_day_name_of_date() {
        // 2025-09-01 was a Monday
        let date = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        assert_eq!(DayName::of(date), DayName::Mon);
    }

    #[test]
    fn test_app_data_gym_location_key() {
        let data = AppData {
            gym_location: Some(GymLocation { lat: 1.5, lng: 2.5 }),
            ..Default::default()
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["gymLocation"]["lat"], 1.5);
    }
}
