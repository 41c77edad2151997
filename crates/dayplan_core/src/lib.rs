//! Core daily-materialization engine for DayPlan.
//! This crate is the single source of truth for planning invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod recurrence;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entry::{EntryId, EntryStatus, IdempotencyKey, RegistryEntry};
pub use model::template::{
    ConfigurationError, Periodicity, TaskTemplate, TemplateId, TemplateKind, TemplateStatus,
    WeekOfMonth,
};
pub use repo::registry_repo::{RegistryRepository, SqliteRegistryStore};
pub use repo::retry::{RetryPolicy, Retrying};
pub use repo::template_repo::{SqliteTemplateStore, TemplateRepository};
pub use repo::{StoreError, StoreResult};
pub use service::daily_plan::{DailyPlanner, FailedCandidate, RunError, RunResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
