//! Persistence layer.
//!
//! # Responsibility
//! - Key/value storage contract and its SQLite implementation
//!   (`storage_repo`).
//! - Typed, fail-soft people/settings store on top of it (`people_store`).
//!
//! # Invariants
//! - The repository layer reports typed errors.
//! - The store layer never propagates storage errors; it logs them.

pub mod people_store;
pub mod storage_repo;
