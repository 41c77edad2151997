//! Registry repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide day-scoped reads and conditional creation of registry
//!   entries.
//! - Map the store's unique-key rejection onto the typed duplicate error.
//!
//! # Invariants
//! - Creation is conditional on the idempotency key via partial UNIQUE
//!   indexes; a collision surfaces as `StoreError::DuplicateEntry`.
//! - Existing rows are never updated or deleted through this repository.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::model::entry::{EntryId, EntryStatus, RegistryEntry};
use crate::repo::{
    date_to_db, ensure_connection_ready, parse_date_text, parse_time_text, time_to_db,
    StoreError, StoreResult,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, ErrorCode, Row};
use uuid::Uuid;

const ENTRY_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    day,
    completed,
    original_time,
    planned_time,
    planned_end_time,
    template_uuid,
    status
FROM registry_entries";

/// Engine-facing contract for the registry store.
pub trait RegistryRepository {
    /// Fetches every entry belonging to `date`.
    fn fetch_entries(&self, date: NaiveDate) -> StoreResult<Vec<RegistryEntry>>;

    /// Creates one entry, conditional on its idempotency key being absent
    /// for its day.
    fn create_entry(&self, entry: &RegistryEntry) -> StoreResult<EntryId>;
}

/// SQLite-backed registry store.
pub struct SqliteRegistryStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRegistryStore<'conn> {
    /// Constructs a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn, "registry_entries")?;
        Ok(Self { conn })
    }
}

impl RegistryRepository for SqliteRegistryStore<'_> {
    fn fetch_entries(&self, date: NaiveDate) -> StoreResult<Vec<RegistryEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ENTRY_SELECT_SQL} WHERE day = ?1 ORDER BY planned_time ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([date_to_db(date)])?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }

        Ok(entries)
    }

    fn create_entry(&self, entry: &RegistryEntry) -> StoreResult<EntryId> {
        let result = self.conn.execute(
            "INSERT INTO registry_entries (
                uuid,
                name,
                day,
                completed,
                original_time,
                planned_time,
                planned_end_time,
                template_uuid,
                status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                entry.id.to_string(),
                entry.name.as_str(),
                date_to_db(entry.date),
                i64::from(entry.completed),
                time_to_db(entry.original_time),
                time_to_db(entry.planned_time),
                entry.planned_end_time.map(time_to_db),
                entry.template_ref.map(|id| id.to_string()),
                status_to_db(entry.status),
            ],
        );

        match result {
            Ok(_) => Ok(entry.id),
            Err(rusqlite::Error::SqliteFailure(sqlite_err, _))
                if sqlite_err.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::DuplicateEntry {
                    date: entry.date,
                    key: entry.idempotency_key(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn parse_entry_row(row: &Row<'_>) -> StoreResult<RegistryEntry> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid `{uuid_text}` in registry_entries.uuid"))
    })?;

    let template_ref = match row.get::<_, Option<String>>("template_uuid")? {
        Some(text) => Some(Uuid::parse_str(&text).map_err(|_| {
            StoreError::InvalidData(format!(
                "invalid uuid `{text}` in registry_entries.template_uuid"
            ))
        })?),
        None => None,
    };

    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid status `{status_text}` in registry_entries.status"
        ))
    })?;

    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid completed value `{other}` in registry_entries.completed"
            )));
        }
    };

    Ok(RegistryEntry {
        id,
        name: row.get("name")?,
        date: parse_date_text(&row.get::<_, String>("day")?, "registry_entries.day")?,
        completed,
        original_time: parse_time_text(
            &row.get::<_, String>("original_time")?,
            "registry_entries.original_time",
        )?,
        planned_time: parse_time_text(
            &row.get::<_, String>("planned_time")?,
            "registry_entries.planned_time",
        )?,
        planned_end_time: row
            .get::<_, Option<String>>("planned_end_time")?
            .map(|text| parse_time_text(&text, "registry_entries.planned_end_time"))
            .transpose()?,
        template_ref,
        status,
    })
}

fn status_to_db(status: EntryStatus) -> &'static str {
    match status {
        EntryStatus::Pending => "pending",
        EntryStatus::InProgress => "in_progress",
        EntryStatus::Done => "done",
        EntryStatus::Cancelled => "cancelled",
    }
}

fn parse_status(value: &str) -> Option<EntryStatus> {
    match value {
        "pending" => Some(EntryStatus::Pending),
        "in_progress" => Some(EntryStatus::InProgress),
        "done" => Some(EntryStatus::Done),
        "cancelled" => Some(EntryStatus::Cancelled),
        _ => None,
    }
}
