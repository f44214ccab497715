//! Workout logging rules.

use crate::program::active_program;
use crate::{AppData, DayName, Error, Result, Session, TrainingProgram, Weight, WeightUnit, Workout};
use chrono::NaiveDate;

impl AppData {
    /// Program in effect on the given date
    pub fn active_program(&self, date: NaiveDate) -> Option<&TrainingProgram> {
        active_program(&self.programs, date)
    }

    /// Session scheduled on the given date under the program active then
    pub fn session_for(&self, date: NaiveDate) -> Option<&Session> {
        self.active_program(date)?.session_on(DayName::of(date))
    }

    /// Workout already logged on the given date
    pub fn workout_on(&self, date: NaiveDate) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.date == date)
    }
}

impl Workout {
    /// Start a log for `date` from the planned session's lifts
    pub fn from_session(date: NaiveDate, session: &Session) -> Self {
        Self {
            date,
            lifts: session.lifts.clone(),
        }
    }

    /// Record the weight used for a lift; returns false if no such lift
    pub fn set_weight(&mut self, lift_id: u32, weight: Weight) -> bool {
        match self.lifts.iter_mut().find(|l| l.id == lift_id) {
            Some(lift) => {
                lift.weight = Some(weight);
                true
            }
            None => false,
        }
    }

    /// Give every lift without a recorded weight an explicit zero (bodyweight)
    pub fn fill_missing_weights(&mut self, unit: WeightUnit) {
        for lift in self.lifts.iter_mut().filter(|l| l.weight.is_none()) {
            lift.weight = Some(Weight { weight: 0.0, unit });
        }
    }

    /// Every lift must carry a non-negative weight before the log is saved
    pub fn validate(&self) -> Result<()> {
        for lift in &self.lifts {
            match lift.weight {
                None => {
                    return Err(Error::Validation(format!(
                        "no weight recorded for {}",
                        lift.name
                    )))
                }
                Some(w) if w.weight.is_nan() || w.weight < 0.0 => {
                    return Err(Error::Validation(format!(
                        "weight for {} must not be negative",
                        lift.name
                    )))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
