//! Training program editing.
//!
//! A program is edited in memory as a draft and persisted as one unit once
//! it is finished. Sessions inside the draft can be saved (upsert by day) or
//! deleted freely; lifts inside a session draft get increasing ids.

use crate::{
    DayName, Error, Lift, LiftQuantity, Result, Session, TrainingProgram, Weight, WeightUnit,
};
use chrono::NaiveDate;
use std::str::FromStr;

/// Program in effect on `date`: the one with the latest start on or before it.
///
/// Programs need not be sorted. Among programs starting on the same day the
/// one stored last wins.
pub fn active_program(programs: &[TrainingProgram], date: NaiveDate) -> Option<&TrainingProgram> {
    programs
        .iter()
        .filter(|p| p.date <= date)
        .fold(None, |best: Option<&TrainingProgram>, p| match best {
            Some(b) if b.date > p.date => Some(b),
            _ => Some(p),
        })
}

/// Earliest start date across all programs
pub fn first_program_date(programs: &[TrainingProgram]) -> Option<NaiveDate> {
    programs.iter().map(|p| p.date).min()
}

// ============================================================================
// Session Drafts
// ============================================================================

/// A session being edited before it is saved into a program draft
#[derive(Clone, Debug)]
pub struct SessionDraft {
    day: DayName,
    lifts: Vec<Lift>,
    next_id: u32,
}

impl SessionDraft {
    /// New session with a single blank lift
    pub fn new(day: DayName) -> Self {
        Self {
            day,
            lifts: vec![Lift::empty(1)],
            next_id: 2,
        }
    }

    /// Continue editing a saved session
    pub fn edit(session: &Session) -> Self {
        let next_id = session.lifts.iter().map(|l| l.id).max().unwrap_or(0) + 1;
        Self {
            day: session.day,
            lifts: session.lifts.clone(),
            next_id,
        }
    }

    pub fn day(&self) -> DayName {
        self.day
    }

    pub fn lifts(&self) -> &[Lift] {
        &self.lifts
    }

    fn take_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Append a blank lift and return its id
    pub fn add_lift(&mut self) -> u32 {
        let id = self.take_id();
        self.lifts.push(Lift::empty(id));
        id
    }

    /// Append a filled-in lift, reassigning its id
    pub fn push_lift(&mut self, mut lift: Lift) -> u32 {
        lift.id = self.take_id();
        let id = lift.id;
        self.lifts.push(lift);
        id
    }

    /// Remove a lift. A session always keeps at least one (possibly blank) lift.
    pub fn remove_lift(&mut self, id: u32) {
        if self.lifts.len() == 1 {
            let fresh = self.take_id();
            self.lifts = vec![Lift::empty(fresh)];
        } else {
            self.lifts.retain(|l| l.id != id);
        }
    }

    /// Apply an edit to the lift with the given id; returns false if absent
    pub fn update_lift<F>(&mut self, id: u32, f: F) -> bool
    where
        F: FnOnce(&mut Lift),
    {
        match self.lifts.iter_mut().find(|l| l.id == id) {
            Some(lift) => {
                f(lift);
                lift.id = id;
                true
            }
            None => false,
        }
    }

    /// Validate and produce the session
    pub fn finish(self) -> Result<Session> {
        for lift in &self.lifts {
            validate_lift(lift).map_err(|reason| {
                Error::Validation(format!("{} session: {}", self.day, reason))
            })?;
        }
        Ok(Session {
            day: self.day,
            lifts: self.lifts,
        })
    }
}

fn validate_lift(lift: &Lift) -> std::result::Result<(), String> {
    if lift.name.trim().is_empty() {
        return Err(format!("lift {} has no name", lift.id));
    }
    if lift.sets == 0 {
        return Err(format!("{} needs at least one set", lift.name));
    }
    if lift.quantity.amount() == 0 {
        return Err(format!("{} needs a positive rep count or duration", lift.name));
    }
    Ok(())
}

// ============================================================================
// Program Drafts
// ============================================================================

/// A weekly program being assembled before it is stored
#[derive(Clone, Debug)]
pub struct ProgramDraft {
    date: NaiveDate,
    sessions: Vec<Session>,
}

impl ProgramDraft {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            sessions: Vec::new(),
        }
    }

    /// Start a new draft from an existing program's sessions
    pub fn based_on(program: &TrainingProgram, date: NaiveDate) -> Self {
        Self {
            date,
            sessions: program.sessions.clone(),
        }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn session_on(&self, day: DayName) -> Option<&Session> {
        self.sessions.iter().find(|s| s.day == day)
    }

    /// Insert the session, replacing any session already on its day
    pub fn save_session(&mut self, session: Session) {
        match self.sessions.iter_mut().find(|s| s.day == session.day) {
            Some(existing) => *existing = session,
            None => self.sessions.push(session),
        }
    }

    pub fn delete_session(&mut self, day: DayName) {
        self.sessions.retain(|s| s.day != day);
    }

    /// Validate and produce the program
    pub fn finish(self) -> Result<TrainingProgram> {
        if self.sessions.is_empty() {
            return Err(Error::Validation(
                "choose at least one workout day".into(),
            ));
        }
        Ok(TrainingProgram {
            date: self.date,
            sessions: self.sessions,
        })
    }
}

// ============================================================================
// Text Form
// ============================================================================

/// Parses `Name:SETSxREPS`, `Name:SETSxSECSs`, optionally followed by
/// `@WEIGHTkg` or `@WEIGHTlbs`, e.g. `Squat:5x5@100kg` or `Plank:3x60s`.
/// The id is left at 0; drafts assign real ids.
impl FromStr for Lift {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bad = |why: &str| Error::Parse(format!("lift {:?}: {}", s, why));

        let (name, rest) = s.rsplit_once(':').ok_or_else(|| bad("expected NAME:SETSxREPS"))?;
        let (volume, weight) = match rest.split_once('@') {
            Some((volume, weight)) => (volume, Some(weight)),
            None => (rest, None),
        };
        let (sets, amount) = volume
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| bad("expected SETSxREPS"))?;

        let sets: u32 = sets.trim().parse().map_err(|_| bad("invalid set count"))?;
        let amount = amount.trim();
        let quantity = match amount.strip_suffix('s') {
            Some(seconds) => LiftQuantity::Time {
                seconds: seconds.parse().map_err(|_| bad("invalid duration"))?,
            },
            None => LiftQuantity::Reps {
                reps: amount.parse().map_err(|_| bad("invalid rep count"))?,
            },
        };

        let weight = weight
            .map(|w| parse_weight(w).ok_or_else(|| bad("invalid weight")))
            .transpose()?;

        Ok(Lift {
            id: 0,
            name: name.trim().to_string(),
            sets,
            quantity,
            weight,
        })
    }
}

/// Parse `100kg`, `225lbs` or a bare number (kilograms)
pub fn parse_weight(raw: &str) -> Option<Weight> {
    let raw = raw.trim().to_lowercase();
    let (value, unit) = if let Some(v) = raw.strip_suffix("lbs") {
        (v, WeightUnit::Lbs)
    } else if let Some(v) = raw.strip_suffix("kg") {
        (v, WeightUnit::Kg)
    } else {
        (raw.as_str(), WeightUnit::Kg)
    };
    let weight: f64 = value.trim().parse().ok()?;
    weight.is_finite().then_some(Weight { weight, unit })
}
