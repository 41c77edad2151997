//! Registry entry domain model.
//!
//! # Responsibility
//! - Define one concrete task instance scheduled for one specific day.
//! - Provide the construction helpers used by materialization and
//!   carry-over, and the idempotency key derivation.
//!
//! # Invariants
//! - `original_time` is immutable once set and copied verbatim across
//!   carry-overs.
//! - Exactly `EntryStatus::Done` counts as "done"; every other status
//!   carries over to the next day.
//! - The engine creates entries and never mutates existing ones.

use crate::model::template::TemplateId;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a registry entry.
pub type EntryId = Uuid;

/// Workflow marker for a registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Created but not started.
    Pending,
    /// Work is in progress.
    InProgress,
    /// Completed. The only status the engine treats as done.
    Done,
    /// No longer actionable, but still unfinished from the engine's view.
    Cancelled,
}

/// Key preventing duplicate creation of the same logical task on one day.
///
/// Scoped to a single date: the orchestrator compares keys only within
/// today's entry set, and the store enforces them per day.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdempotencyKey {
    /// Template-generated or template-linked carry-over entries.
    Template(TemplateId),
    /// Ad-hoc entries with no template back-reference.
    AdHoc {
        name: String,
        original_time: NaiveTime,
    },
}

impl Display for IdempotencyKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Template(id) => write!(f, "template:{id}"),
            Self::AdHoc {
                name,
                original_time,
            } => write!(f, "adhoc:{name}@{}", original_time.format("%H:%M")),
        }
    }
}

/// One task instance scheduled for one specific day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub id: EntryId,
    /// Display text, copied from the template or the previous entry.
    pub name: String,
    /// The calendar day this entry belongs to.
    pub date: NaiveDate,
    /// False at creation; flipped externally by the end user.
    pub completed: bool,
    /// Time-of-day this task was first scheduled at.
    pub original_time: NaiveTime,
    /// Time-of-day this instance is scheduled for on its own day.
    pub planned_time: NaiveTime,
    /// Optional end of the scheduled span.
    pub planned_end_time: Option<NaiveTime>,
    /// Back-reference to the originating template, absent for ad-hoc
    /// entries.
    pub template_ref: Option<TemplateId>,
    pub status: EntryStatus,
}

impl RegistryEntry {
    /// Creates a fresh pending entry scheduled at `time` on `date`.
    pub fn new(name: impl Into<String>, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            date,
            completed: false,
            original_time: time,
            planned_time: time,
            planned_end_time: None,
            template_ref: None,
            status: EntryStatus::Pending,
        }
    }

    /// Builds the carry-over candidate for this entry on a later day.
    ///
    /// `original_time` is copied verbatim; `planned_time` is the same
    /// time-of-day reprojected onto `today`. The source entry itself is
    /// left untouched.
    pub fn carried_to(&self, today: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: self.name.clone(),
            date: today,
            completed: false,
            original_time: self.original_time,
            planned_time: self.original_time,
            planned_end_time: self.planned_end_time,
            template_ref: self.template_ref,
            status: EntryStatus::Pending,
        }
    }

    /// Whether the engine considers this entry finished.
    pub fn is_done(&self) -> bool {
        self.status == EntryStatus::Done
    }

    /// Derives the key used to deduplicate creation within one day.
    pub fn idempotency_key(&self) -> IdempotencyKey {
        match self.template_ref {
            Some(template_id) => IdempotencyKey::Template(template_id),
            None => IdempotencyKey::AdHoc {
                name: self.name.clone(),
                original_time: self.original_time,
            },
        }
    }
}
