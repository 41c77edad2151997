use dayplan_core::db::migrations::{apply_migrations, latest_version};
use dayplan_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn latest_version_is_positive() {
    assert!(latest_version() >= 1);
}

#[test]
fn open_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());

    for table in ["task_templates", "registry_entries"] {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1;",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1, "table `{table}` should exist");
    }
}

#[test]
fn apply_migrations_is_idempotent() {
    let mut conn = Connection::open_in_memory().unwrap();
    apply_migrations(&mut conn).unwrap();
    apply_migrations(&mut conn).unwrap();

    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}

#[test]
fn newer_schema_version_is_rejected() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();

    let err = apply_migrations(&mut conn).unwrap_err();
    assert!(matches!(
        err,
        DbError::UnsupportedSchemaVersion {
            db_version: 999,
            ..
        }
    ));
}

#[test]
fn file_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dayplan.db");

    {
        let conn = open_db(&path).unwrap();
        conn.execute(
            "INSERT INTO registry_entries (uuid, name, day, original_time, planned_time)
             VALUES ('00000000-0000-4000-8000-000000000001', 'persisted', '2026-03-09',
                     '09:00:00', '09:00:00');",
            [],
        )
        .unwrap();
    }

    let conn = open_db(&path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM registry_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}
