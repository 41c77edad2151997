//! Bounded fixed-wait retry decorator for repository adapters.
//!
//! # Responsibility
//! - Re-issue transient store failures around individual repository
//!   calls, outside the engine's control flow.
//! - Read retry limits from environment configuration.
//!
//! # Invariants
//! - Only `StoreError::is_transient()` failures are retried.
//! - Attempts are bounded by the policy; the final error propagates
//!   unchanged.

use crate::model::entry::{EntryId, RegistryEntry};
use crate::model::template::TaskTemplate;
use crate::repo::registry_repo::RegistryRepository;
use crate::repo::template_repo::TemplateRepository;
use crate::repo::StoreResult;
use chrono::NaiveDate;
use log::warn;
use std::time::Duration;

const ATTEMPTS_ENV_VAR: &str = "DAYPLAN_RETRY_ATTEMPTS";
const WAIT_ENV_VAR: &str = "DAYPLAN_RETRY_WAIT_SECONDS";
const DEFAULT_ATTEMPTS: u32 = 3;
const DEFAULT_WAIT_SECONDS: u64 = 5;

/// Retry limits applied around each repository call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total tries per call, including the first. Minimum 1.
    pub attempts: u32,
    /// Fixed wait between consecutive tries.
    pub wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            wait: Duration::from_secs(DEFAULT_WAIT_SECONDS),
        }
    }
}

impl RetryPolicy {
    /// Builds a policy from `DAYPLAN_RETRY_ATTEMPTS` and
    /// `DAYPLAN_RETRY_WAIT_SECONDS`, keeping the defaults for unset or
    /// unparsable values.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let attempts = read_env_number(ATTEMPTS_ENV_VAR)
            .unwrap_or(defaults.attempts)
            .max(1);
        let wait = read_env_number::<u64>(WAIT_ENV_VAR)
            .map(Duration::from_secs)
            .unwrap_or(defaults.wait);
        Self { attempts, wait }
    }

    /// A policy that never waits, for tests and tight local loops.
    pub fn immediate(attempts: u32) -> Self {
        Self {
            attempts: attempts.max(1),
            wait: Duration::ZERO,
        }
    }
}

fn read_env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.trim().parse().ok()
}

/// Decorator applying a `RetryPolicy` to a wrapped repository.
pub struct Retrying<R> {
    inner: R,
    policy: RetryPolicy,
}

impl<R> Retrying<R> {
    pub fn new(inner: R, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    fn call<T>(&self, op: &str, mut body: impl FnMut() -> StoreResult<T>) -> StoreResult<T> {
        let mut attempt = 1;
        loop {
            match body() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.policy.attempts => {
                    warn!(
                        "event=store_retry module=repo status=retry op={op} attempt={attempt} max_attempts={} error={err}",
                        self.policy.attempts
                    );
                    std::thread::sleep(self.policy.wait);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl<R: TemplateRepository> TemplateRepository for Retrying<R> {
    fn fetch_active_templates(&self) -> StoreResult<Vec<TaskTemplate>> {
        self.call("fetch_active_templates", || {
            self.inner.fetch_active_templates()
        })
    }
}

impl<R: RegistryRepository> RegistryRepository for Retrying<R> {
    fn fetch_entries(&self, date: NaiveDate) -> StoreResult<Vec<RegistryEntry>> {
        self.call("fetch_entries", || self.inner.fetch_entries(date))
    }

    fn create_entry(&self, entry: &RegistryEntry) -> StoreResult<EntryId> {
        self.call("create_entry", || self.inner.create_entry(entry))
    }
}
