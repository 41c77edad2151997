//! Daily plan orchestration.
//!
//! # Responsibility
//! - Compose carry-over and materialization into one run for one date.
//! - Enforce the idempotency key and per-candidate failure isolation.
//!
//! # Invariants
//! - The idempotency snapshot is fetched once per run and held as local
//!   state, never cached across runs.
//! - Carry-over candidates are processed before generated ones, so they
//!   win when both map to the same key.
//! - A duplicate-key write outcome counts as skipped, never as failed.
//! - Only prerequisite-read failures abort the run.

use crate::model::entry::{IdempotencyKey, RegistryEntry};
use crate::model::template::TaskTemplate;
use crate::repo::registry_repo::RegistryRepository;
use crate::repo::template_repo::TemplateRepository;
use crate::repo::StoreError;
use crate::service::{carry_over, materializer};
use chrono::NaiveDate;
use log::{error, info};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One candidate whose write was rejected, with the rejection.
#[derive(Debug)]
pub struct FailedCandidate {
    pub entry: RegistryEntry,
    pub error: StoreError,
}

/// Summary of one daily-plan run. The sole observable outcome.
#[derive(Debug, Default)]
pub struct RunResult {
    /// Entries written this run.
    pub created: usize,
    /// Candidates whose idempotency key already existed.
    pub skipped: usize,
    /// Candidates whose write failed; the run continued past each.
    pub failed: Vec<FailedCandidate>,
}

/// Abort causes: a prerequisite read failed, so no candidate can be
/// computed or safely deduplicated.
#[derive(Debug)]
pub enum RunError {
    TemplateFetch(StoreError),
    RegistryFetch {
        date: NaiveDate,
        source: StoreError,
    },
    /// `date` has no predecessor in the supported calendar range.
    DateOutOfRange(NaiveDate),
}

impl Display for RunError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TemplateFetch(err) => write!(f, "failed to fetch templates: {err}"),
            Self::RegistryFetch { date, source } => {
                write!(f, "failed to fetch registry entries for {date}: {source}")
            }
            Self::DateOutOfRange(date) => {
                write!(f, "date {date} has no previous day to carry over from")
            }
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::TemplateFetch(err) => Some(err),
            Self::RegistryFetch { source, .. } => Some(source),
            Self::DateOutOfRange(_) => None,
        }
    }
}

/// Orchestrates one materialization run per invocation.
///
/// Generic over the adapter traits so collaborators can wire the SQLite
/// stores, retry decorators, or test doubles without touching run logic.
pub struct DailyPlanner<T: TemplateRepository, R: RegistryRepository> {
    templates: T,
    registry: R,
}

impl<T: TemplateRepository, R: RegistryRepository> DailyPlanner<T, R> {
    pub fn new(templates: T, registry: R) -> Self {
        Self { templates, registry }
    }

    /// Runs the daily plan for `today`.
    ///
    /// Fetches the three prerequisite reads (templates, yesterday's
    /// entries, today's idempotency snapshot), then processes every
    /// candidate exactly once. Re-running for the same date is safe: the
    /// snapshot makes previously created candidates skip.
    ///
    /// # Errors
    /// - `RunError` when any prerequisite read fails; per-candidate write
    ///   failures are reported inside `RunResult` instead.
    pub fn run(&self, today: NaiveDate) -> Result<RunResult, RunError> {
        info!("event=plan_run module=daily_plan status=start date={today}");

        let yesterday = today.pred_opt().ok_or(RunError::DateOutOfRange(today))?;

        let templates = self
            .templates
            .fetch_active_templates()
            .map_err(RunError::TemplateFetch)?;
        let yesterday_entries = self
            .registry
            .fetch_entries(yesterday)
            .map_err(|source| RunError::RegistryFetch {
                date: yesterday,
                source,
            })?;
        let existing = self
            .registry
            .fetch_entries(today)
            .map_err(|source| RunError::RegistryFetch {
                date: today,
                source,
            })?;

        let result = self.execute(today, &templates, &yesterday_entries, &existing);

        info!(
            "event=plan_run module=daily_plan status=ok date={today} created={} skipped={} failed={}",
            result.created,
            result.skipped,
            result.failed.len()
        );

        Ok(result)
    }

    /// Processes candidates against an explicit idempotency snapshot.
    ///
    /// Exposed separately so repeated runs are explicit and testable
    /// without hidden state; `run` is the fetch-then-execute composition.
    pub fn execute(
        &self,
        today: NaiveDate,
        templates: &[TaskTemplate],
        yesterday_entries: &[RegistryEntry],
        existing: &[RegistryEntry],
    ) -> RunResult {
        let mut seen: HashSet<IdempotencyKey> =
            existing.iter().map(RegistryEntry::idempotency_key).collect();

        // Carry-over first: when an unfinished entry and its template both
        // produce a candidate for the same key, the carry-over wins.
        let mut candidates = carry_over::resolve(yesterday_entries, today);
        candidates.extend(materializer::generate(templates, today));

        let mut result = RunResult::default();

        for candidate in candidates {
            let key = candidate.idempotency_key();
            if seen.contains(&key) {
                info!(
                    "event=entry_skip module=daily_plan status=skip date={today} key={key}"
                );
                result.skipped += 1;
                continue;
            }

            match self.registry.create_entry(&candidate) {
                Ok(_) => {
                    info!(
                        "event=entry_create module=daily_plan status=ok date={today} key={key}"
                    );
                    seen.insert(key);
                    result.created += 1;
                }
                Err(StoreError::DuplicateEntry { .. }) => {
                    // A concurrent run won the race for this key; the entry
                    // exists, which is all this run wanted.
                    info!(
                        "event=entry_create module=daily_plan status=skip date={today} key={key} reason=duplicate_key"
                    );
                    seen.insert(key);
                    result.skipped += 1;
                }
                Err(err) => {
                    error!(
                        "event=entry_create module=daily_plan status=error date={today} key={key} error={err}"
                    );
                    result.failed.push(FailedCandidate {
                        entry: candidate,
                        error: err,
                    });
                }
            }
        }

        result
    }
}
