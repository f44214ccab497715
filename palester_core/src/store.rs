//! SQLite-backed storage for the single app document.
//!
//! The whole document lives in one row of `app_data` (id 1) with each part
//! JSON-encoded in its own TEXT column. Mutations read the row, change it in
//! memory and write the affected columns back inside one immediate
//! transaction, so concurrent writers serialize instead of losing updates.

use crate::legacy;
use crate::{AppData, Error, GymLocation, Result, TrainingProgram, Workout};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

/// Primary key of the only document row
const APP_DATA_ID: i64 = 1;

/// Latest `PRAGMA user_version` understood by this build
const SCHEMA_VERSION: i64 = 2;

/// How long a writer waits for another process holding the write lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct DataStore {
    conn: Connection,
}

impl DataStore {
    /// Open (creating if needed) the database file and bring its schema up to date
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mut store = DataStore { conn };
        store.migrate()?;
        tracing::debug!("Opened data store at {:?}", path);
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut store = DataStore { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&mut self) -> Result<()> {
        if schema_version(&self.conn)? >= SCHEMA_VERSION {
            return Ok(());
        }

        // Another process may have migrated while we waited for the lock
        let tx = self.begin()?;
        let version = schema_version(&tx)?;

        if version < 1 {
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS app_data (
                    id INTEGER PRIMARY KEY,
                    programs TEXT,
                    workouts TEXT
                );

                PRAGMA user_version = 1;",
            )?;
        }

        if version < 2 {
            tx.execute_batch(
                "ALTER TABLE app_data ADD COLUMN gym_location TEXT;
                 PRAGMA user_version = 2;",
            )?;
        }

        tx.commit()?;
        tracing::info!("Migrated schema from version {} to {}", version, SCHEMA_VERSION);
        Ok(())
    }

    /// Create the document. Fails if one already exists.
    pub fn initialize(&mut self, data: &AppData) -> Result<()> {
        let tx = self.begin()?;
        if read_row(&tx)?.is_some() {
            return Err(Error::AlreadyInitialized);
        }
        insert_row(&tx, data)?;
        tx.commit()?;

        tracing::info!(
            "Initialized app data with {} program(s) and {} workout(s)",
            data.programs.len(),
            data.workouts.len()
        );
        Ok(())
    }

    /// Load the document; `None` means setup has not happened yet.
    pub fn load(&self) -> Result<Option<AppData>> {
        read_row(&self.conn)
    }

    /// Load the document, treating its absence as an error
    pub fn load_required(&self) -> Result<AppData> {
        self.load()?.ok_or(Error::NotInitialized)
    }

    /// Replace the workout logged on the same date, or append a new one.
    ///
    /// Returns `true` when an existing entry was replaced.
    pub fn upsert_workout(&mut self, workout: Workout) -> Result<bool> {
        let tx = self.begin()?;
        let mut data = read_row(&tx)?.ok_or(Error::NotInitialized)?;

        let replaced = match data.workouts.iter().position(|w| w.date == workout.date) {
            Some(index) => {
                data.workouts[index] = workout;
                true
            }
            None => {
                data.workouts.push(workout);
                false
            }
        };

        write_workouts(&tx, &data.workouts)?;
        tx.commit()?;

        tracing::debug!(
            "{} workout, {} stored",
            if replaced { "Updated" } else { "Appended" },
            data.workouts.len()
        );
        Ok(replaced)
    }

    /// Append a program after all existing ones
    pub fn append_program(&mut self, program: TrainingProgram) -> Result<()> {
        let tx = self.begin()?;
        let mut data = read_row(&tx)?.ok_or(Error::NotInitialized)?;

        data.programs.push(program);
        write_programs(&tx, &data.programs)?;
        tx.commit()?;

        tracing::debug!("Appended program, {} stored", data.programs.len());
        Ok(())
    }

    /// Merge an imported document into the stored one.
    ///
    /// With nothing stored the import becomes the document verbatim.
    /// Otherwise imported programs and workouts are placed ahead of the
    /// existing ones; no deduplication happens and the stored gym location
    /// is left as it is.
    pub fn merge_backup(&mut self, imported: AppData) -> Result<()> {
        let tx = self.begin()?;

        let Some(existing) = read_row(&tx)? else {
            insert_row(&tx, &imported)?;
            tx.commit()?;
            tracing::info!("No existing data, backup imported as-is");
            return Ok(());
        };

        let programs: Vec<TrainingProgram> = imported
            .programs
            .into_iter()
            .chain(existing.programs)
            .collect();
        let workouts: Vec<Workout> = imported
            .workouts
            .into_iter()
            .chain(existing.workouts)
            .collect();

        tx.execute(
            "UPDATE app_data SET programs = ?1, workouts = ?2 WHERE id = ?3",
            params![
                serde_json::to_string(&programs)?,
                serde_json::to_string(&workouts)?,
                APP_DATA_ID
            ],
        )?;
        tx.commit()?;

        tracing::info!(
            "Merged backup: {} program(s), {} workout(s) total",
            programs.len(),
            workouts.len()
        );
        Ok(())
    }

    /// Overwrite the stored gym location
    pub fn set_gym_location(&mut self, location: GymLocation) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE app_data SET gym_location = ?1 WHERE id = ?2",
            params![serde_json::to_string(&location)?, APP_DATA_ID],
        )?;
        if updated == 0 {
            return Err(Error::NotInitialized);
        }

        tracing::info!("Gym location set to {}, {}", location.lat, location.lng);
        Ok(())
    }

    fn begin(&mut self) -> Result<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}

// --- Row helpers ---

fn schema_version(conn: &Connection) -> Result<i64> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

fn text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Text(bytes) => std::str::from_utf8(bytes).ok().map(str::to_owned),
        _ => None,
    }
}

fn read_row(conn: &Connection) -> Result<Option<AppData>> {
    let row = conn
        .query_row(
            "SELECT programs, workouts, gym_location FROM app_data WHERE id = ?1",
            params![APP_DATA_ID],
            |row| {
                Ok((
                    text(row.get_ref(0)?),
                    text(row.get_ref(1)?),
                    text(row.get_ref(2)?),
                ))
            },
        )
        .optional()?;

    Ok(row.map(|(programs, workouts, gym_location)| AppData {
        programs: legacy::decode_programs(&legacy::parse_column(programs.as_deref(), "programs")),
        workouts: legacy::decode_workouts(&legacy::parse_column(workouts.as_deref(), "workouts")),
        gym_location: legacy::decode_gym_location(&legacy::parse_column(
            gym_location.as_deref(),
            "gym_location",
        )),
    }))
}

fn insert_row(conn: &Connection, data: &AppData) -> Result<()> {
    let gym_location = data
        .gym_location
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    conn.execute(
        "INSERT INTO app_data (id, programs, workouts, gym_location) VALUES (?1, ?2, ?3, ?4)",
        params![
            APP_DATA_ID,
            serde_json::to_string(&data.programs)?,
            serde_json::to_string(&data.workouts)?,
            gym_location
        ],
    )?;
    Ok(())
}

fn write_programs(conn: &Connection, programs: &[TrainingProgram]) -> Result<()> {
    conn.execute(
        "UPDATE app_data SET programs = ?1 WHERE id = ?2",
        params![serde_json::to_string(programs)?, APP_DATA_ID],
    )?;
    Ok(())
}

fn write_workouts(conn: &Connection, workouts: &[Workout]) -> Result<()> {
    conn.execute(
        "UPDATE app_data SET workouts = ?1 WHERE id = ?2",
        params![serde_json::to_string(workouts)?, APP_DATA_ID],
    )?;
    Ok(())
}
