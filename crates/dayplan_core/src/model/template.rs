//! Task template domain model.
//!
//! # Responsibility
//! - Define the master recurring-task definition read by the engine.
//! - Validate recurrence set fields at the ingestion boundary.
//!
//! # Invariants
//! - `id` is stable and never reused for another template.
//! - Once `validate()` has passed, every set field holds only in-range
//!   values and at least one declared periodicity can match some date.
//! - Templates are only ever read by the engine; writes happen in
//!   collaborator code (store seeding, external editors).

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task template.
pub type TemplateId = Uuid;

/// Firing mechanism of a template.
///
/// Only `Periodic` templates are evaluated by the recurrence rule;
/// `Objective` and `OneOff` fire on their explicit `alert_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    /// Recurs according to the periodicity sets.
    Periodic,
    /// Long-running goal surfaced on a single alert date.
    Objective,
    /// Single-fire task surfaced on a single alert date.
    OneOff,
}

/// One recurrence cadence. A template may declare several; they are OR'ed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Periodicity {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Ordinal week selector for monthly "relative" mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekOfMonth {
    First,
    Second,
    Third,
    Fourth,
    /// The final occurrence of the weekday within its month.
    Last,
}

impl WeekOfMonth {
    /// Numeric ordinal for the fixed weeks; `None` for `Last`, which is
    /// defined by position from the end of the month instead.
    pub fn ordinal(self) -> Option<u8> {
        match self {
            Self::First => Some(1),
            Self::Second => Some(2),
            Self::Third => Some(3),
            Self::Fourth => Some(4),
            Self::Last => None,
        }
    }
}

/// Template lifecycle marker. Not consulted by the engine; the template
/// adapter filters on it when fetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateStatus {
    Active,
    Paused,
    Archived,
}

/// Configuration problems in a template's recurrence definition.
///
/// Raised at ingestion time; a template that slipped past ingestion with
/// one of these never fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationError {
    /// ISO weekday outside 1..=7.
    WeekdayOutOfRange(u8),
    /// Day of month outside 1..=31.
    DayOfMonthOutOfRange(u8),
    /// Month outside 1..=12.
    MonthOutOfRange(u8),
    /// Every declared periodicity is missing the set values it needs, so
    /// no date can ever match.
    NoUsableRecurrence,
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WeekdayOutOfRange(value) => {
                write!(f, "weekday {value} is outside ISO range 1-7")
            }
            Self::DayOfMonthOutOfRange(value) => {
                write!(f, "day of month {value} is outside range 1-31")
            }
            Self::MonthOutOfRange(value) => write!(f, "month {value} is outside range 1-12"),
            Self::NoUsableRecurrence => {
                write!(f, "no declared periodicity has the set values it needs to ever match")
            }
        }
    }
}

impl Error for ConfigurationError {}

/// Master definition of a task that may recur.
///
/// The multi-valued recurrence fields are explicit sets rather than a
/// parsed expression, so membership checks stay trivial and validation can
/// reject out-of-range values up front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTemplate {
    /// Stable global ID referenced by generated registry entries.
    pub id: TemplateId,
    /// Display text copied onto generated entries.
    pub name: String,
    pub kind: TemplateKind,
    /// Declared cadences; empty means the template never auto-fires.
    pub periodicities: BTreeSet<Periodicity>,
    /// ISO weekday numbers (Monday = 1). Weekly and monthly-relative mode.
    pub weekdays: BTreeSet<u8>,
    /// Calendar days 1-31. Monthly-absolute mode and yearly.
    pub days_of_month: BTreeSet<u8>,
    /// Ordinal weeks for monthly-relative mode, paired with `weekdays`.
    pub weeks_of_month: BTreeSet<WeekOfMonth>,
    /// Calendar months 1-12. Yearly only.
    pub months: BTreeSet<u8>,
    /// Time-of-day stamped onto generated instances.
    pub template_time: NaiveTime,
    /// Optional end of the scheduled span.
    pub template_end_time: Option<NaiveTime>,
    /// Explicit fire date for `Objective`/`OneOff` kinds.
    pub alert_date: Option<NaiveDate>,
    pub status: TemplateStatus,
}

impl TaskTemplate {
    /// Creates an active template with empty recurrence sets.
    pub fn new(kind: TemplateKind, name: impl Into<String>, template_time: NaiveTime) -> Self {
        Self::with_id(Uuid::new_v4(), kind, name, template_time)
    }

    /// Creates a template with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(
        id: TemplateId,
        kind: TemplateKind,
        name: impl Into<String>,
        template_time: NaiveTime,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            periodicities: BTreeSet::new(),
            weekdays: BTreeSet::new(),
            days_of_month: BTreeSet::new(),
            weeks_of_month: BTreeSet::new(),
            months: BTreeSet::new(),
            template_time,
            template_end_time: None,
            alert_date: None,
            status: TemplateStatus::Active,
        }
    }

    /// Fallback time-of-day for collaborators ingesting raw data with a
    /// missing or unparsable time. Noon, matching the registry convention.
    pub fn default_time() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Checks set-field ranges and that at least one declared periodicity
    /// can match some date.
    ///
    /// An empty `periodicities` set is valid: it is the deliberate
    /// never-auto-fire configuration, not a misconfiguration.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if let Some(&weekday) = self.weekdays.iter().find(|value| !(1..=7).contains(*value)) {
            return Err(ConfigurationError::WeekdayOutOfRange(weekday));
        }
        if let Some(&day) = self
            .days_of_month
            .iter()
            .find(|value| !(1..=31).contains(*value))
        {
            return Err(ConfigurationError::DayOfMonthOutOfRange(day));
        }
        if let Some(&month) = self.months.iter().find(|value| !(1..=12).contains(*value)) {
            return Err(ConfigurationError::MonthOutOfRange(month));
        }

        if self.kind == TemplateKind::Periodic
            && !self.periodicities.is_empty()
            && !self
                .periodicities
                .iter()
                .any(|periodicity| self.periodicity_is_usable(*periodicity))
        {
            return Err(ConfigurationError::NoUsableRecurrence);
        }

        Ok(())
    }

    fn periodicity_is_usable(&self, periodicity: Periodicity) -> bool {
        match periodicity {
            Periodicity::Daily => true,
            Periodicity::Weekly => !self.weekdays.is_empty(),
            Periodicity::Monthly => {
                !self.days_of_month.is_empty()
                    || (!self.weeks_of_month.is_empty() && !self.weekdays.is_empty())
            }
            Periodicity::Yearly => !self.months.is_empty(),
        }
    }
}
