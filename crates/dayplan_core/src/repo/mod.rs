//! Repository adapters over the record store.
//!
//! # Responsibility
//! - Define the data-access contracts the engine consumes.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Template writes must pass `TaskTemplate::validate()` before
//!   persistence.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - Entry creation is conditional on the idempotency key; a collision
//!   surfaces as `StoreError::DuplicateEntry`, never as silent success.

use crate::db::{migrations, DbError};
use crate::model::entry::IdempotencyKey;
use crate::model::template::ConfigurationError;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod registry_repo;
pub mod retry;
pub mod template_repo;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error taxonomy for repository operations.
#[derive(Debug)]
pub enum StoreError {
    /// Template rejected at ingestion for a bad recurrence definition.
    Config(ConfigurationError),
    /// Transport-level failure. The only variant worth retrying.
    Db(DbError),
    /// Idempotency key collision at write time. Success-equivalent for the
    /// orchestrator.
    DuplicateEntry {
        date: NaiveDate,
        key: IdempotencyKey,
    },
    /// Corrupt persisted state on read, or a malformed record on write.
    InvalidData(String),
    /// Connection has not been migrated to the version this binary needs.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// A table required by this repository is missing.
    MissingRequiredTable(&'static str),
}

impl StoreError {
    /// Whether a retry of the same call could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Db(_))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateEntry { date, key } => {
                write!(f, "entry already exists for {date} with key {key}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match required {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::DuplicateEntry { .. } => None,
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<ConfigurationError> for StoreError {
    fn from(value: ConfigurationError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Verifies the connection has been migrated and carries `table`.
///
/// Both SQLite stores call this from their constructors, so a raw
/// un-migrated connection is rejected before the first query.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    table: &'static str,
) -> StoreResult<()> {
    let actual_version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    let expected_version = migrations::latest_version();
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1;",
        [table],
        |row| row.get(0),
    )?;
    if table_count == 0 {
        return Err(StoreError::MissingRequiredTable(table));
    }

    Ok(())
}

pub(crate) fn date_to_db(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn parse_date_text(text: &str, column: &str) -> StoreResult<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| StoreError::InvalidData(format!("invalid date `{text}` in {column}")))
}

pub(crate) fn time_to_db(time: chrono::NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

/// Accepts both `HH:MM:SS` (written by this crate) and `HH:MM`
/// (hand-seeded rows).
pub(crate) fn parse_time_text(text: &str, column: &str) -> StoreResult<chrono::NaiveTime> {
    chrono::NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| chrono::NaiveTime::parse_from_str(text, "%H:%M"))
        .map_err(|_| StoreError::InvalidData(format!("invalid time `{text}` in {column}")))
}
