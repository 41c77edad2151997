//! Template repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the engine's read-only view of active task templates.
//! - Own the token mapping between recurrence sets and their persisted
//!   comma-separated form.
//!
//! # Invariants
//! - `fetch_active_templates` returns only `status = active` rows.
//! - `create_template` rejects templates failing `validate()`.
//! - Read paths reject unknown or out-of-range persisted tokens.

use crate::model::template::{
    ConfigurationError, Periodicity, TaskTemplate, TemplateId, TemplateKind, TemplateStatus,
    WeekOfMonth,
};
use crate::repo::{
    date_to_db, ensure_connection_ready, parse_date_text, parse_time_text, time_to_db,
    StoreError, StoreResult,
};
use rusqlite::{params, Connection, Row};
use std::collections::BTreeSet;
use uuid::Uuid;

const TEMPLATE_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    kind,
    periodicities,
    weekdays,
    days_of_month,
    weeks_of_month,
    months,
    template_time,
    template_end_time,
    alert_date,
    status
FROM task_templates";

/// Engine-facing read contract for the template store.
pub trait TemplateRepository {
    /// Fetches every template with an `Active` lifecycle status.
    fn fetch_active_templates(&self) -> StoreResult<Vec<TaskTemplate>>;
}

/// SQLite-backed template store.
pub struct SqliteTemplateStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTemplateStore<'conn> {
    /// Constructs a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn, "task_templates")?;
        Ok(Self { conn })
    }

    /// Persists one template. Collaborator/seeding API, deliberately not
    /// part of the engine-facing trait: the engine never writes templates.
    pub fn create_template(&self, template: &TaskTemplate) -> StoreResult<TemplateId> {
        template.validate()?;

        self.conn.execute(
            "INSERT INTO task_templates (
                uuid,
                name,
                kind,
                periodicities,
                weekdays,
                days_of_month,
                weeks_of_month,
                months,
                template_time,
                template_end_time,
                alert_date,
                status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            params![
                template.id.to_string(),
                template.name.as_str(),
                kind_to_db(template.kind),
                join_tokens(template.periodicities.iter().map(|p| periodicity_to_db(*p))),
                join_tokens(template.weekdays.iter().map(u8::to_string)),
                join_tokens(template.days_of_month.iter().map(u8::to_string)),
                join_tokens(template.weeks_of_month.iter().map(|w| week_to_db(*w))),
                join_tokens(template.months.iter().map(u8::to_string)),
                time_to_db(template.template_time),
                template.template_end_time.map(time_to_db),
                template.alert_date.map(date_to_db),
                status_to_db(template.status),
            ],
        )?;

        Ok(template.id)
    }
}

impl TemplateRepository for SqliteTemplateStore<'_> {
    fn fetch_active_templates(&self) -> StoreResult<Vec<TaskTemplate>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TEMPLATE_SELECT_SQL} WHERE status = ?1 ORDER BY name ASC;"))?;
        let mut rows = stmt.query([status_to_db(TemplateStatus::Active)])?;

        let mut templates = Vec::new();
        while let Some(row) = rows.next()? {
            templates.push(parse_template_row(row)?);
        }

        Ok(templates)
    }
}

fn parse_template_row(row: &Row<'_>) -> StoreResult<TaskTemplate> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid `{uuid_text}` in task_templates.uuid"))
    })?;

    let kind_text: String = row.get("kind")?;
    let kind = parse_kind(&kind_text).ok_or_else(|| {
        StoreError::InvalidData(format!("invalid kind `{kind_text}` in task_templates.kind"))
    })?;

    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid status `{status_text}` in task_templates.status"
        ))
    })?;

    let template_time =
        parse_time_text(&row.get::<_, String>("template_time")?, "task_templates.template_time")?;
    let template_end_time = row
        .get::<_, Option<String>>("template_end_time")?
        .map(|text| parse_time_text(&text, "task_templates.template_end_time"))
        .transpose()?;
    let alert_date = row
        .get::<_, Option<String>>("alert_date")?
        .map(|text| parse_date_text(&text, "task_templates.alert_date"))
        .transpose()?;

    let template = TaskTemplate {
        id,
        name: row.get("name")?,
        kind,
        periodicities: parse_token_set(
            &row.get::<_, String>("periodicities")?,
            "task_templates.periodicities",
            parse_periodicity,
        )?,
        weekdays: parse_u8_set(&row.get::<_, String>("weekdays")?, "task_templates.weekdays")?,
        days_of_month: parse_u8_set(
            &row.get::<_, String>("days_of_month")?,
            "task_templates.days_of_month",
        )?,
        weeks_of_month: parse_token_set(
            &row.get::<_, String>("weeks_of_month")?,
            "task_templates.weeks_of_month",
            parse_week,
        )?,
        months: parse_u8_set(&row.get::<_, String>("months")?, "task_templates.months")?,
        template_time,
        template_end_time,
        alert_date,
        status,
    };

    // Range violations in persisted sets are corruption, not a silently
    // never-firing template.
    match template.validate() {
        Ok(()) => Ok(template),
        Err(ConfigurationError::NoUsableRecurrence) => Ok(template),
        Err(err) => Err(StoreError::InvalidData(format!(
            "template `{id}` has invalid persisted recurrence: {err}"
        ))),
    }
}

fn join_tokens<S: AsRef<str>>(tokens: impl Iterator<Item = S>) -> String {
    tokens
        .map(|token| token.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_u8_set(text: &str, column: &str) -> StoreResult<BTreeSet<u8>> {
    parse_token_set(text, column, |token| token.parse::<u8>().ok())
}

fn parse_token_set<T: Ord>(
    text: &str,
    column: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> StoreResult<BTreeSet<T>> {
    let mut set = BTreeSet::new();
    for token in text.split(',').map(str::trim).filter(|token| !token.is_empty()) {
        let value = parse(token).ok_or_else(|| {
            StoreError::InvalidData(format!("invalid token `{token}` in {column}"))
        })?;
        set.insert(value);
    }
    Ok(set)
}

fn kind_to_db(kind: TemplateKind) -> &'static str {
    match kind {
        TemplateKind::Periodic => "periodic",
        TemplateKind::Objective => "objective",
        TemplateKind::OneOff => "one_off",
    }
}

fn parse_kind(value: &str) -> Option<TemplateKind> {
    match value {
        "periodic" => Some(TemplateKind::Periodic),
        "objective" => Some(TemplateKind::Objective),
        "one_off" => Some(TemplateKind::OneOff),
        _ => None,
    }
}

fn periodicity_to_db(periodicity: Periodicity) -> &'static str {
    match periodicity {
        Periodicity::Daily => "daily",
        Periodicity::Weekly => "weekly",
        Periodicity::Monthly => "monthly",
        Periodicity::Yearly => "yearly",
    }
}

fn parse_periodicity(value: &str) -> Option<Periodicity> {
    match value {
        "daily" => Some(Periodicity::Daily),
        "weekly" => Some(Periodicity::Weekly),
        "monthly" => Some(Periodicity::Monthly),
        "yearly" => Some(Periodicity::Yearly),
        _ => None,
    }
}

fn week_to_db(week: WeekOfMonth) -> &'static str {
    match week {
        WeekOfMonth::First => "first",
        WeekOfMonth::Second => "second",
        WeekOfMonth::Third => "third",
        WeekOfMonth::Fourth => "fourth",
        WeekOfMonth::Last => "last",
    }
}

fn parse_week(value: &str) -> Option<WeekOfMonth> {
    match value {
        "first" => Some(WeekOfMonth::First),
        "second" => Some(WeekOfMonth::Second),
        "third" => Some(WeekOfMonth::Third),
        "fourth" => Some(WeekOfMonth::Fourth),
        "last" => Some(WeekOfMonth::Last),
        _ => None,
    }
}

fn status_to_db(status: TemplateStatus) -> &'static str {
    match status {
        TemplateStatus::Active => "active",
        TemplateStatus::Paused => "paused",
        TemplateStatus::Archived => "archived",
    }
}

fn parse_status(value: &str) -> Option<TemplateStatus> {
    match value {
        "active" => Some(TemplateStatus::Active),
        "paused" => Some(TemplateStatus::Paused),
        "archived" => Some(TemplateStatus::Archived),
        _ => None,
    }
}
