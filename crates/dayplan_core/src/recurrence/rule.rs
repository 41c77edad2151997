//! Recurrence rule predicate and time derivation.
//!
//! # Responsibility
//! - Evaluate daily/weekly/monthly/yearly cadences against one date.
//! - Keep week-of-month arithmetic in one place.
//!
//! # Invariants
//! - Weekday numbering is ISO (Monday = 1), matching the template model.
//! - Monthly absolute and relative modes are independent; either one
//!   matching fires the template.
//! - `Last` means no further occurrence of the weekday remains in the
//!   month, not "the fourth".

use crate::model::template::{Periodicity, TaskTemplate, WeekOfMonth};
use chrono::{Datelike, NaiveDate, NaiveTime};

/// Returns whether `template` fires on `date`.
///
/// Only the periodicity sets are consulted; callers decide separately
/// whether the template kind is rule-evaluated at all.
pub fn fires_on(template: &TaskTemplate, date: NaiveDate) -> bool {
    template
        .periodicities
        .iter()
        .any(|periodicity| periodicity_matches(*periodicity, template, date))
}

/// Time-of-day a firing template schedules its instance at.
///
/// Always the template's own time; the cadence never shifts it.
pub fn scheduled_time(template: &TaskTemplate, _date: NaiveDate) -> NaiveTime {
    template.template_time
}

/// Optional end of the scheduled span, when the template defines one.
pub fn scheduled_end_time(template: &TaskTemplate, _date: NaiveDate) -> Option<NaiveTime> {
    template.template_end_time
}

fn periodicity_matches(periodicity: Periodicity, template: &TaskTemplate, date: NaiveDate) -> bool {
    match periodicity {
        Periodicity::Daily => true,
        Periodicity::Weekly => template.weekdays.contains(&iso_weekday(date)),
        Periodicity::Monthly => monthly_matches(template, date),
        Periodicity::Yearly => {
            template.months.contains(&month_of(date))
                && (template.days_of_month.is_empty()
                    || template.days_of_month.contains(&day_of_month(date)))
        }
    }
}

fn monthly_matches(template: &TaskTemplate, date: NaiveDate) -> bool {
    // Absolute mode: a plain day-of-month hit.
    if template.days_of_month.contains(&day_of_month(date)) {
        return true;
    }

    // Relative mode needs both halves of the (week, weekday) pair.
    if template.weeks_of_month.is_empty() || !template.weekdays.contains(&iso_weekday(date)) {
        return false;
    }

    if template.weeks_of_month.contains(&WeekOfMonth::Last) && is_last_occurrence_in_month(date) {
        return true;
    }

    let ordinal = weekday_ordinal_in_month(date);
    template
        .weeks_of_month
        .iter()
        .any(|week| week.ordinal() == Some(ordinal))
}

/// Ordinal occurrence of `date`'s weekday within its month (1-based).
///
/// The 1st-7th are the first occurrence, the 8th-14th the second, and so
/// on; independent of which weekday the month started on.
pub(crate) fn weekday_ordinal_in_month(date: NaiveDate) -> u8 {
    ((date.day() - 1) / 7 + 1) as u8
}

/// Whether no further occurrence of `date`'s weekday remains in its month.
pub(crate) fn is_last_occurrence_in_month(date: NaiveDate) -> bool {
    date.day() + 7 > days_in_month(date)
}

fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = (date.year(), date.month());
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}

fn iso_weekday(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

fn day_of_month(date: NaiveDate) -> u8 {
    date.day() as u8
}

fn month_of(date: NaiveDate) -> u8 {
    date.month() as u8
}
