use chrono::{NaiveDate, NaiveTime};
use dayplan_core::db::open_db_in_memory;
use dayplan_core::{
    EntryStatus, RegistryEntry, RegistryRepository, SqliteRegistryStore, StoreError,
};
use rusqlite::Connection;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn create_and_fetch_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRegistryStore::try_new(&conn).unwrap();

    let mut entry = RegistryEntry::new("write report", date(2026, 3, 9), time(14, 30));
    entry.planned_end_time = Some(time(15, 30));
    entry.template_ref = Some(Uuid::new_v4());
    entry.status = EntryStatus::InProgress;

    store.create_entry(&entry).unwrap();

    let loaded = store.fetch_entries(date(2026, 3, 9)).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0], entry);
}

#[test]
fn fetch_is_scoped_to_the_requested_day() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRegistryStore::try_new(&conn).unwrap();

    store
        .create_entry(&RegistryEntry::new("monday", date(2026, 3, 9), time(9, 0)))
        .unwrap();
    store
        .create_entry(&RegistryEntry::new("tuesday", date(2026, 3, 10), time(9, 0)))
        .unwrap();

    let loaded = store.fetch_entries(date(2026, 3, 10)).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "tuesday");
}

#[test]
fn entries_come_back_ordered_by_planned_time() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRegistryStore::try_new(&conn).unwrap();

    let day = date(2026, 3, 9);
    store
        .create_entry(&RegistryEntry::new("late", day, time(18, 0)))
        .unwrap();
    store
        .create_entry(&RegistryEntry::new("early", day, time(7, 0)))
        .unwrap();

    let names: Vec<String> = store
        .fetch_entries(day)
        .unwrap()
        .into_iter()
        .map(|entry| entry.name)
        .collect();
    assert_eq!(names, ["early", "late"]);
}

#[test]
fn same_template_key_is_rejected_as_duplicate() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRegistryStore::try_new(&conn).unwrap();

    let day = date(2026, 3, 9);
    let template_id = Uuid::new_v4();

    let mut first = RegistryEntry::new("standup", day, time(9, 0));
    first.template_ref = Some(template_id);
    store.create_entry(&first).unwrap();

    // Different uuid and even a different time: the (day, template) key is
    // what counts.
    let mut second = RegistryEntry::new("standup", day, time(10, 0));
    second.template_ref = Some(template_id);

    let err = store.create_entry(&second).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateEntry { .. }));

    // The same template on another day is fine.
    let mut next_day = RegistryEntry::new("standup", date(2026, 3, 10), time(9, 0));
    next_day.template_ref = Some(template_id);
    store.create_entry(&next_day).unwrap();
}

#[test]
fn ad_hoc_key_is_name_plus_original_time() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRegistryStore::try_new(&conn).unwrap();

    let day = date(2026, 3, 9);
    store
        .create_entry(&RegistryEntry::new("call mom", day, time(9, 0)))
        .unwrap();

    let err = store
        .create_entry(&RegistryEntry::new("call mom", day, time(9, 0)))
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateEntry { .. }));

    // A different original time is a different logical task.
    store
        .create_entry(&RegistryEntry::new("call mom", day, time(18, 0)))
        .unwrap();
}

#[test]
fn corrupt_persisted_status_is_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRegistryStore::try_new(&conn).unwrap();

    store
        .create_entry(&RegistryEntry::new("ok", date(2026, 3, 9), time(9, 0)))
        .unwrap();
    conn.execute("UPDATE registry_entries SET status = 'paused';", [])
        .unwrap();

    let err = store.fetch_entries(date(2026, 3, 9)).unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn corrupt_persisted_time_is_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRegistryStore::try_new(&conn).unwrap();

    store
        .create_entry(&RegistryEntry::new("ok", date(2026, 3, 9), time(9, 0)))
        .unwrap();
    conn.execute("UPDATE registry_entries SET planned_time = 'noonish';", [])
        .unwrap();

    let err = store.fetch_entries(date(2026, 3, 9)).unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn hand_seeded_minute_precision_times_are_accepted() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRegistryStore::try_new(&conn).unwrap();

    conn.execute(
        "INSERT INTO registry_entries (uuid, name, day, original_time, planned_time)
         VALUES (?1, 'seeded', '2026-03-09', '08:30', '08:30');",
        [Uuid::new_v4().to_string()],
    )
    .unwrap();

    let loaded = store.fetch_entries(date(2026, 3, 9)).unwrap();
    assert_eq!(loaded[0].planned_time, time(8, 30));
}

#[test]
fn store_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteRegistryStore::try_new(&conn);
    assert!(matches!(
        result,
        Err(StoreError::UninitializedConnection {
            actual_version: 0,
            ..
        })
    ));
}
