//! Daily-plan services.
//!
//! # Responsibility
//! - Turn templates and prior-day entries into today's candidates.
//! - Orchestrate one materialization run over the repository adapters.
//!
//! # Invariants
//! - Candidate production is pure; all I/O stays in the orchestrator.
//! - The orchestrator never mutates existing entries, only creates new
//!   ones or leaves them untouched.

pub mod carry_over;
pub mod daily_plan;
pub mod materializer;
