use chrono::{NaiveDate, NaiveTime};
use dayplan_core::service::carry_over;
use dayplan_core::{EntryStatus, RegistryEntry};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn entry(name: &str, day: NaiveDate, at: NaiveTime, status: EntryStatus) -> RegistryEntry {
    let mut entry = RegistryEntry::new(name, day, at);
    entry.status = status;
    entry
}

#[test]
fn done_entries_produce_no_candidate() {
    let yesterday = date(2026, 3, 9);
    let today = date(2026, 3, 10);
    let entries = vec![
        entry("a", yesterday, time(9, 0), EntryStatus::Done),
        entry("b", yesterday, time(14, 30), EntryStatus::Pending),
    ];

    let carried = carry_over::resolve(&entries, today);

    assert_eq!(carried.len(), 1);
    assert_eq!(carried[0].name, "b");
    assert_eq!(carried[0].date, today);
    assert_eq!(carried[0].planned_time, time(14, 30));
}

#[test]
fn every_not_done_status_carries_over() {
    let yesterday = date(2026, 3, 9);
    let entries = vec![
        entry("pending", yesterday, time(8, 0), EntryStatus::Pending),
        entry("started", yesterday, time(9, 0), EntryStatus::InProgress),
        entry("cancelled", yesterday, time(10, 0), EntryStatus::Cancelled),
        entry("finished", yesterday, time(11, 0), EntryStatus::Done),
    ];

    let carried = carry_over::resolve(&entries, date(2026, 3, 10));

    let names: Vec<&str> = carried.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["pending", "started", "cancelled"]);
}

#[test]
fn original_time_survives_redating_verbatim() {
    let yesterday = date(2026, 3, 9);
    let mut source = entry("b", yesterday, time(14, 30), EntryStatus::Pending);
    // Simulate an entry that was itself carried before: planned moved, the
    // original stayed.
    source.planned_time = time(16, 0);

    let carried = carry_over::resolve(std::slice::from_ref(&source), date(2026, 3, 10));

    assert_eq!(carried[0].original_time, time(14, 30));
    assert_eq!(carried[0].planned_time, time(14, 30));
}

#[test]
fn carry_over_is_additive_and_leaves_sources_untouched() {
    let yesterday = date(2026, 3, 9);
    let source = entry("b", yesterday, time(14, 30), EntryStatus::InProgress);
    let before = source.clone();

    let carried = carry_over::resolve(std::slice::from_ref(&source), date(2026, 3, 10));

    assert_eq!(source, before);
    assert_ne!(carried[0].id, source.id);
    assert_eq!(carried[0].status, EntryStatus::Pending);
    assert!(!carried[0].completed);
}

#[test]
fn template_ref_and_end_time_are_copied() {
    let yesterday = date(2026, 3, 9);
    let template_id = Uuid::new_v4();
    let mut source = entry("standup", yesterday, time(9, 0), EntryStatus::Pending);
    source.template_ref = Some(template_id);
    source.planned_end_time = Some(time(9, 15));

    let carried = carry_over::resolve(std::slice::from_ref(&source), date(2026, 3, 10));

    assert_eq!(carried[0].template_ref, Some(template_id));
    assert_eq!(carried[0].planned_end_time, Some(time(9, 15)));
}

#[test]
fn empty_yesterday_produces_no_candidates() {
    assert!(carry_over::resolve(&[], date(2026, 3, 10)).is_empty());
}
