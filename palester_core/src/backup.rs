//! Backup export and import.
//!
//! Exports are pretty-printed JSON documents written atomically into a
//! user-chosen directory. Imports are parsed completely before anything is
//! written, so a malformed file never touches the store.

use crate::legacy;
use crate::store::DataStore;
use crate::{AppData, Error, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File name used for an export taken at `now`
pub fn backup_file_name(now: DateTime<Utc>) -> String {
    format!("palester_backup_{}.json", now.timestamp_millis())
}

/// Write the document into `dir` and return the new file's path
///
/// Atomically writes by:
/// 1. Writing to a temp file in the same directory
/// 2. Syncing to disk
/// 3. Renaming to the final name
pub fn export_to_dir(data: &AppData, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(Error::Backup(format!(
            "export directory {:?} does not exist",
            dir
        )));
    }

    let path = dir.join(backup_file_name(now));
    let temp = NamedTempFile::new_in(dir)?;

    // Held until the file is complete
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        let contents = serde_json::to_string_pretty(data)?;
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(&path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Exported backup to {:?}", path);
    Ok(path)
}

/// Parse a backup file without touching the store
pub fn read_backup(path: &Path) -> Result<AppData> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::Backup(format!("cannot read {:?}: {}", path, e)))?;
    parse_backup(&contents)
}

/// Parse backup contents
pub fn parse_backup(contents: &str) -> Result<AppData> {
    let value: serde_json::Value = serde_json::from_str(contents)
        .map_err(|e| Error::Backup(format!("malformed backup JSON: {}", e)))?;
    legacy::decode_document(&value)
}

/// Read a backup file and merge it into the store
pub fn import_file(store: &mut DataStore, path: &Path) -> Result<AppData> {
    let imported = read_backup(path)?;
    tracing::info!(
        "Importing {} program(s) and {} workout(s) from {:?}",
        imported.programs.len(),
        imported.workouts.len(),
        path
    );
    store.merge_backup(imported.clone())?;
    Ok(imported)
}
