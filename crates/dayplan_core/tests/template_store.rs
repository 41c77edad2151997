use chrono::{NaiveDate, NaiveTime};
use dayplan_core::db::open_db_in_memory;
use dayplan_core::{
    ConfigurationError, Periodicity, SqliteTemplateStore, StoreError, TaskTemplate,
    TemplateKind, TemplateRepository, TemplateStatus, WeekOfMonth,
};

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn sample_template() -> TaskTemplate {
    let mut template = TaskTemplate::new(TemplateKind::Periodic, "review", time(10, 0));
    template.periodicities.extend([Periodicity::Weekly, Periodicity::Monthly]);
    template.weekdays.extend([2, 4]);
    template.days_of_month.insert(15);
    template.weeks_of_month.insert(WeekOfMonth::Last);
    template.months.extend([3, 9]);
    template.template_end_time = Some(time(11, 0));
    template.alert_date = NaiveDate::from_ymd_opt(2026, 9, 1);
    template
}

#[test]
fn create_and_fetch_roundtrip_preserves_all_sets() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTemplateStore::try_new(&conn).unwrap();

    let template = sample_template();
    store.create_template(&template).unwrap();

    let loaded = store.fetch_active_templates().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0], template);
}

#[test]
fn fetch_returns_only_active_templates() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTemplateStore::try_new(&conn).unwrap();

    let mut active = TaskTemplate::new(TemplateKind::Periodic, "active", time(9, 0));
    active.periodicities.insert(Periodicity::Daily);
    store.create_template(&active).unwrap();

    let mut paused = TaskTemplate::new(TemplateKind::Periodic, "paused", time(9, 0));
    paused.periodicities.insert(Periodicity::Daily);
    paused.status = TemplateStatus::Paused;
    store.create_template(&paused).unwrap();

    let mut archived = TaskTemplate::new(TemplateKind::OneOff, "archived", time(9, 0));
    archived.status = TemplateStatus::Archived;
    store.create_template(&archived).unwrap();

    let loaded = store.fetch_active_templates().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "active");
}

#[test]
fn create_rejects_out_of_range_weekday() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTemplateStore::try_new(&conn).unwrap();

    let mut template = TaskTemplate::new(TemplateKind::Periodic, "bad", time(9, 0));
    template.periodicities.insert(Periodicity::Weekly);
    template.weekdays.insert(8);

    let err = store.create_template(&template).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Config(ConfigurationError::WeekdayOutOfRange(8))
    ));
}

#[test]
fn create_rejects_monthly_without_any_usable_mode() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTemplateStore::try_new(&conn).unwrap();

    let mut template = TaskTemplate::new(TemplateKind::Periodic, "bad", time(9, 0));
    template.periodicities.insert(Periodicity::Monthly);

    let err = store.create_template(&template).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Config(ConfigurationError::NoUsableRecurrence)
    ));
}

#[test]
fn unknown_persisted_token_is_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTemplateStore::try_new(&conn).unwrap();

    let mut template = TaskTemplate::new(TemplateKind::Periodic, "ok", time(9, 0));
    template.periodicities.insert(Periodicity::Daily);
    store.create_template(&template).unwrap();

    conn.execute(
        "UPDATE task_templates SET periodicities = 'daily,fortnightly';",
        [],
    )
    .unwrap();

    let err = store.fetch_active_templates().unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn out_of_range_persisted_weekday_is_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTemplateStore::try_new(&conn).unwrap();

    let mut template = TaskTemplate::new(TemplateKind::Periodic, "ok", time(9, 0));
    template.periodicities.insert(Periodicity::Weekly);
    template.weekdays.insert(2);
    store.create_template(&template).unwrap();

    conn.execute("UPDATE task_templates SET weekdays = '2,9';", [])
        .unwrap();

    let err = store.fetch_active_templates().unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn pre_validation_rows_without_usable_recurrence_still_load() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTemplateStore::try_new(&conn).unwrap();

    let mut template = TaskTemplate::new(TemplateKind::Periodic, "legacy", time(9, 0));
    template.periodicities.insert(Periodicity::Daily);
    store.create_template(&template).unwrap();

    // Rows written before ingestion validation may declare monthly with no
    // usable mode; they load fine and simply never fire.
    conn.execute("UPDATE task_templates SET periodicities = 'monthly';", [])
        .unwrap();

    let loaded = store.fetch_active_templates().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(
        loaded[0].validate(),
        Err(ConfigurationError::NoUsableRecurrence)
    );
}
