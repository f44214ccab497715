//! Error types for the palester_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for palester_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite storage error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// User input rejected before any write
    #[error("Validation error: {0}")]
    Validation(String),

    /// No document has been created yet (setup not run)
    #[error("No app data found - run setup first")]
    NotInitialized,

    /// Setup was attempted on a store that already holds a document
    #[error("App data already exists")]
    AlreadyInitialized,

    /// Backup file could not be read or decoded
    #[error("Backup error: {0}")]
    Backup(String),

    /// Malformed textual input (dates, months, lifts)
    #[error("Parse error: {0}")]
    Parse(String),
}
