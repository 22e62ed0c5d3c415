//! Recurrence engine for yearly birthday occurrences.
//!
//! # Responsibility
//! - Compute next occurrences, offsets and ages (`calculator`).
//! - Classify and rank people by upcoming occurrence (`classifier`).
//! - Render dates for people-facing output (`format`).
//!
//! # Invariants
//! - All computations take an explicit `today`; nothing here reads a clock.

pub mod calculator;
pub mod classifier;
pub mod format;
