//! Tolerant decoding of stored columns and backup documents.
//!
//! Older app versions wrote workouts as bare date strings and programs as a
//! plain list of workout days. Those shapes are converted to the current
//! model when read; the next write persists them in the current shape.

use crate::types::iso_date;
use crate::{AppData, DayName, Error, GymLocation, Result, Session, TrainingProgram, Workout};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredProgram {
    Current(TrainingProgram),
    DayList {
        #[serde(with = "iso_date")]
        date: NaiveDate,
        #[serde(rename = "workoutDays")]
        workout_days: Vec<DayName>,
    },
}

impl From<StoredProgram> for TrainingProgram {
    fn from(stored: StoredProgram) -> Self {
        match stored {
            StoredProgram::Current(program) => program,
            StoredProgram::DayList { date, workout_days } => TrainingProgram {
                date,
                sessions: workout_days
                    .into_iter()
                    .map(|day| Session {
                        day,
                        lifts: Vec::new(),
                    })
                    .collect(),
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredWorkout {
    Current(Workout),
    Bare(#[serde(deserialize_with = "iso_date::deserialize")] NaiveDate),
}

impl From<StoredWorkout> for Workout {
    fn from(stored: StoredWorkout) -> Self {
        match stored {
            StoredWorkout::Current(workout) => workout,
            StoredWorkout::Bare(date) => Workout {
                date,
                lifts: Vec::new(),
            },
        }
    }
}

/// Decode each array element on its own, skipping the ones that don't fit.
fn decode_list<S, T>(value: &Value, what: &str) -> Vec<T>
where
    S: for<'de> Deserialize<'de>,
    T: From<S>,
{
    let Some(items) = value.as_array() else {
        if !value.is_null() {
            tracing::warn!("Expected a list of {}, found {}. Treating as empty.", what, value);
        }
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match S::deserialize(item) {
            Ok(stored) => Some(T::from(stored)),
            Err(e) => {
                tracing::warn!("Skipping unreadable {} entry {}: {}", what, item, e);
                None
            }
        })
        .collect()
}

/// Decode a programs column or field
pub fn decode_programs(value: &Value) -> Vec<TrainingProgram> {
    decode_list::<StoredProgram, TrainingProgram>(value, "program")
}

/// Decode a workouts column or field
pub fn decode_workouts(value: &Value) -> Vec<Workout> {
    decode_list::<StoredWorkout, Workout>(value, "workout")
}

/// Decode a gym location; anything unreadable counts as unset
pub fn decode_gym_location(value: &Value) -> Option<GymLocation> {
    if value.is_null() {
        return None;
    }
    match GymLocation::deserialize(value) {
        Ok(location) => Some(location),
        Err(e) => {
            tracing::warn!("Ignoring unreadable gym location {}: {}", value, e);
            None
        }
    }
}

/// Parse a raw TEXT column. NULL, blank and malformed JSON all yield `Null`.
pub fn parse_column(raw: Option<&str>, column: &str) -> Value {
    match raw.map(str::trim) {
        None | Some("") => Value::Null,
        Some(text) => serde_json::from_str(text).unwrap_or_else(|e| {
            tracing::warn!("Column {} holds malformed JSON: {}. Treating as empty.", column, e);
            Value::Null
        }),
    }
}

/// Decode a whole document, e.g. an imported backup.
///
/// The top level must be a JSON object; fields inside it are decoded with
/// the same leniency as stored columns.
pub fn decode_document(value: &Value) -> Result<AppData> {
    let object = value
        .as_object()
        .ok_or_else(|| Error::Backup("backup must be a JSON object".into()))?;

    Ok(AppData {
        programs: object
            .get("programs")
            .map(decode_programs)
            .unwrap_or_default(),
        workouts: object
            .get("workouts")
            .map(decode_workouts)
            .unwrap_or_default(),
        gym_location: object.get("gymLocation").and_then(decode_gym_location),
    })
}
