pub mod repository;
pub mod sqlite;

pub use repository::*;
pub use sqlite::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Unique constraint violated on {table}.{column}")]
    UniqueViolation { table: String, column: String },
}

impl DatabaseError {
    /// Turn a raw SQLite error into `UniqueViolation` when it is one.
    ///
    /// SQLite reports these as `UNIQUE constraint failed: table.column`.
    pub fn classify(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, Some(message)) = &err {
            if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
                if let Some((table, column)) = message
                    .strip_prefix("UNIQUE constraint failed: ")
                    .and_then(|rest| rest.split(',').next())
                    .and_then(|first| first.trim().split_once('.'))
                {
                    return DatabaseError::UniqueViolation {
                        table: table.to_string(),
                        column: column.to_string(),
                    };
                }
            }
        }
        DatabaseError::Sqlite(err)
    }
}
