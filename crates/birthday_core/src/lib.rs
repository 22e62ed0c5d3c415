//! Core domain logic for the birthday tracker.
//! This crate is the single source of truth for recurrence and reminder rules.

pub mod db;
pub mod logging;
pub mod model;
pub mod occurrence;
pub mod reminder;
pub mod repo;
pub mod service;
pub mod transfer;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::person::{Person, PersonDraft, PersonId, PersonValidationError};
pub use model::settings::{NotificationSettings, SettingsValidationError};
pub use occurrence::calculator::{age, days_until, next_occurrence, BirthDate, Resolved};
pub use occurrence::classifier::{Dashboard, PeopleFilter, SortOrder};
pub use reminder::alert::{Alert, AlertError, AlertFacility, AlertKind, Permission};
pub use reminder::clock::{Clock, LocalClock};
pub use reminder::scheduler::{ReminderScheduler, ReminderSource, SchedulerError};
pub use repo::people_store::PeopleStore;
pub use repo::storage_repo::{RepoError, RepoResult, SqliteStorageRepository, StorageRepository};
pub use service::people_service::{PeopleService, PersonServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
