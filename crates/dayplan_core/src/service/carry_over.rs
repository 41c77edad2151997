//! Carry-over of unfinished prior-day entries.
//!
//! # Responsibility
//! - Select yesterday's unfinished entries and produce today's
//!   carry-over candidates.
//!
//! # Invariants
//! - Source entries are never mutated or deleted; carry-over is additive.
//! - `original_time` survives re-dating verbatim.

use crate::model::entry::RegistryEntry;
use chrono::NaiveDate;
use log::debug;

/// Produces carry-over candidates for every entry in `yesterday_entries`
/// that is not done.
///
/// Pure over its inputs; the caller owns all repository access.
pub fn resolve(yesterday_entries: &[RegistryEntry], today: NaiveDate) -> Vec<RegistryEntry> {
    let candidates: Vec<RegistryEntry> = yesterday_entries
        .iter()
        .filter(|entry| !entry.is_done())
        .map(|entry| entry.carried_to(today))
        .collect();

    debug!(
        "event=carry_over module=carry_over status=ok source_count={} carried_count={} date={today}",
        yesterday_entries.len(),
        candidates.len()
    );

    candidates
}
