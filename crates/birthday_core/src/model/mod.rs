//! Domain model for tracked people and reminder settings.
//!
//! # Responsibility
//! - Define the canonical records persisted by the store.
//! - Keep validation next to the data it guards.
//!
//! # Invariants
//! - Every person is identified by a stable, never-reused `PersonId`.
//! - Wire field names match the stored client JSON (`camelCase`).

pub mod person;
pub mod settings;
