//! Candidate generation from task templates.
//!
//! # Responsibility
//! - Evaluate each periodic template's recurrence rule for one date.
//! - Surface alerted objective/one-off templates on their alert date.
//!
//! # Invariants
//! - At most one candidate per template per date, regardless of how many
//!   periodicities matched.
//! - Misconfigured templates produce a warning, never an error or a
//!   candidate.

use crate::model::entry::RegistryEntry;
use crate::model::template::{TaskTemplate, TemplateKind};
use crate::recurrence::rule;
use chrono::NaiveDate;
use log::{debug, warn};

/// Produces the candidate entries `templates` generate on `date`.
///
/// Pure over its inputs; the caller owns all repository access.
pub fn generate(templates: &[TaskTemplate], date: NaiveDate) -> Vec<RegistryEntry> {
    let mut candidates = Vec::new();

    for template in templates {
        match template.kind {
            TemplateKind::Periodic => {
                if let Err(err) = template.validate() {
                    warn!(
                        "event=template_skipped module=materializer status=skip template_id={} error={err}",
                        template.id
                    );
                    continue;
                }
                if rule::fires_on(template, date) {
                    debug!(
                        "event=template_fired module=materializer status=ok template_id={} date={date}",
                        template.id
                    );
                    candidates.push(candidate_from(template, date));
                }
            }
            TemplateKind::Objective | TemplateKind::OneOff => {
                if template.alert_date == Some(date) {
                    debug!(
                        "event=template_alerted module=materializer status=ok template_id={} date={date}",
                        template.id
                    );
                    candidates.push(candidate_from(template, date));
                }
            }
        }
    }

    candidates
}

fn candidate_from(template: &TaskTemplate, date: NaiveDate) -> RegistryEntry {
    let mut entry = RegistryEntry::new(
        template.name.clone(),
        date,
        rule::scheduled_time(template, date),
    );
    entry.planned_end_time = rule::scheduled_end_time(template, date);
    entry.template_ref = Some(template.id);
    entry
}
