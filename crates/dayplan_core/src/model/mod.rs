//! Domain model for templates and registry entries.
//!
//! # Responsibility
//! - Define the canonical data structures consumed by the materialization
//!   engine.
//! - Keep recurrence definitions as explicit sets of small enumerations.
//!
//! # Invariants
//! - Every domain object is identified by a stable UUID.
//! - Registry entries are append-only from the engine's perspective; the
//!   engine never mutates an existing entry.

pub mod entry;
pub mod template;
