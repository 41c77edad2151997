//! Recurrence evaluation for periodic templates.
//!
//! # Responsibility
//! - Decide whether a template fires on a given calendar date.
//! - Derive the scheduled time span for a firing template.
//!
//! # Invariants
//! - Evaluation is pure: no I/O, no clock reads.
//! - Declared periodicities are OR'ed; any single match fires the
//!   template.

pub mod rule;

pub use rule::{fires_on, scheduled_end_time, scheduled_time};
