//! Reminder engine.
//!
//! # Responsibility
//! - Decide which people are due an alert on a given day (`evaluation`).
//! - Hand alerts to the host alert facility (`alert`).
//! - Run the once-per-day evaluation loop (`scheduler`).
//!
//! # Invariants
//! - Unknown birth dates never produce alerts.
//! - At most one timer chain is armed per scheduler.

pub mod alert;
pub mod clock;
pub mod evaluation;
pub mod scheduler;
