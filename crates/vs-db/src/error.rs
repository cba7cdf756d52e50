//! Mapping of SQLite failures onto [`vs_core::Error`].
//!
//! Classification uses the extended result code, not the message text. The
//! message is only consulted to recover the offending column for conflicts.

use rusqlite::ffi;
use vs_core::Error;

/// Classify a rusqlite error.
pub fn classify(err: rusqlite::Error) -> Error {
    match err {
        rusqlite::Error::QueryReturnedNoRows => Error::not_found("record", "query"),
        rusqlite::Error::SqliteFailure(code, message) => {
            let message = message.unwrap_or_default();
            match code.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    Error::conflict(conflict_field(&message))
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Error::ForeignKey(message),
                ffi::SQLITE_CONSTRAINT_NOTNULL | ffi::SQLITE_CONSTRAINT_CHECK => {
                    Error::Validation(message)
                }
                _ => Error::database(format!("{code}: {message}")),
            }
        }
        other => Error::database(other.to_string()),
    }
}

/// Column names from a message such as
/// `UNIQUE constraint failed: users.username, users.email`.
fn conflict_field(message: &str) -> String {
    let Some((_, columns)) = message.split_once(": ") else {
        return "unknown".to_string();
    };
    columns
        .split(',')
        .map(|col| {
            let col = col.trim();
            col.rsplit_once('.').map_or(col, |(_, name)| name)
        })
        .collect::<Vec<_>>()
        .join(",")
}
