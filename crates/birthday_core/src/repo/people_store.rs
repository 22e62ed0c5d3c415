//! Typed people/settings store.
//!
//! # Responsibility
//! - Read and write the people list and settings as JSON documents.
//! - Serve as the live `ReminderSource` for the scheduler.
//!
//! # Invariants
//! - Loads never fail: missing or corrupt data yields an empty list or
//!   default settings.
//! - Saves are fire-and-forget; failures are logged and reported as `false`.
//! - Stored records that fail to decode are skipped one by one, the rest
//!   still load.
//! - Read-modify-write goes through `load_for_update`, which fails instead of
//!   degrading and keeps undecodable records verbatim.

use crate::model::person::Person;
use crate::model::settings::NotificationSettings;
use crate::reminder::scheduler::ReminderSource;
use crate::repo::storage_repo::{RepoError, RepoResult, StorageRepository};
use log::{debug, error, warn};
use serde::Serialize;
use serde_json::Value;

pub const PEOPLE_KEY: &str = "birthday-tracker-people";
pub const SETTINGS_KEY: &str = "birthday-tracker-settings";

/// One stored people record, as loaded for an update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StoredRecord {
    Person(Person),
    /// A record that no longer decodes; written back unchanged.
    Raw(Value),
}

impl StoredRecord {
    pub fn person(&self) -> Option<&Person> {
        match self {
            Self::Person(person) => Some(person),
            Self::Raw(_) => None,
        }
    }

    pub fn person_mut(&mut self) -> Option<&mut Person> {
        match self {
            Self::Person(person) => Some(person),
            Self::Raw(_) => None,
        }
    }
}

pub struct PeopleStore<R: StorageRepository> {
    repo: R,
}

impl<R: StorageRepository> PeopleStore<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// The backing storage.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn load_people(&self) -> Vec<Person> {
        let raw = match self.repo.get_item(PEOPLE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                error!("event=store_load module=store status=error key={PEOPLE_KEY} error={err}");
                return Vec::new();
            }
        };

        let records = match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    "event=store_load module=store status=corrupt key={PEOPLE_KEY} error={err}"
                );
                return Vec::new();
            }
        };

        let total = records.len();
        let people: Vec<Person> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value::<Person>(record) {
                Ok(person) => Some(person),
                Err(err) => {
                    warn!(
                        "event=store_load module=store status=skipped key={PEOPLE_KEY} index={index} error={err}"
                    );
                    None
                }
            })
            .collect();
        debug!(
            "event=store_load module=store status=ok key={PEOPLE_KEY} loaded={} skipped={}",
            people.len(),
            total - people.len()
        );
        people
    }

    /// Strict read for read-modify-write callers.
    ///
    /// # Errors
    /// - Storage read failures.
    /// - `InvalidData` when the document is not a JSON array.
    pub fn load_for_update(&self) -> RepoResult<Vec<StoredRecord>> {
        let Some(raw) = self.repo.get_item(PEOPLE_KEY)? else {
            return Ok(Vec::new());
        };
        let records = serde_json::from_str::<Vec<Value>>(&raw).map_err(|err| {
            RepoError::InvalidData(format!("`{PEOPLE_KEY}` is not a JSON array: {err}"))
        })?;

        Ok(records
            .into_iter()
            .map(|record| match serde_json::from_value::<Person>(record.clone()) {
                Ok(person) => StoredRecord::Person(person),
                Err(_) => StoredRecord::Raw(record),
            })
            .collect())
    }

    /// Writes records loaded by `load_for_update`, raw ones untouched.
    pub fn save_records(&self, records: &[StoredRecord]) -> bool {
        match serde_json::to_string(records) {
            Ok(raw) => self.write(PEOPLE_KEY, &raw),
            Err(err) => {
                error!("event=store_save module=store status=error key={PEOPLE_KEY} error={err}");
                false
            }
        }
    }

    /// Replaces the stored people list.
    pub fn save_people(&self, people: &[Person]) -> bool {
        match serde_json::to_string(people) {
            Ok(raw) => self.write(PEOPLE_KEY, &raw),
            Err(err) => {
                error!("event=store_save module=store status=error key={PEOPLE_KEY} error={err}");
                false
            }
        }
    }

    pub fn load_settings(&self) -> NotificationSettings {
        let raw = match self.repo.get_item(SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return NotificationSettings::default(),
            Err(err) => {
                error!(
                    "event=store_load module=store status=error key={SETTINGS_KEY} error={err}"
                );
                return NotificationSettings::default();
            }
        };

        match serde_json::from_str::<NotificationSettings>(&raw) {
            Ok(settings) if settings.validate().is_ok() => settings,
            Ok(settings) => {
                warn!(
                    "event=store_load module=store status=invalid key={SETTINGS_KEY} days_before={}",
                    settings.days_before
                );
                NotificationSettings::default()
            }
            Err(err) => {
                warn!(
                    "event=store_load module=store status=corrupt key={SETTINGS_KEY} error={err}"
                );
                NotificationSettings::default()
            }
        }
    }

    pub fn save_settings(&self, settings: &NotificationSettings) -> bool {
        match serde_json::to_string(settings) {
            Ok(raw) => self.write(SETTINGS_KEY, &raw),
            Err(err) => {
                error!(
                    "event=store_save module=store status=error key={SETTINGS_KEY} error={err}"
                );
                false
            }
        }
    }

    /// Removes both documents.
    pub fn clear_all(&self) -> bool {
        let mut cleared = true;
        for key in [PEOPLE_KEY, SETTINGS_KEY] {
            if let Err(err) = self.repo.remove_item(key) {
                error!("event=store_clear module=store status=error key={key} error={err}");
                cleared = false;
            }
        }
        cleared
    }

    fn write(&self, key: &str, raw: &str) -> bool {
        match self.repo.set_item(key, raw) {
            Ok(()) => {
                debug!(
                    "event=store_save module=store status=ok key={key} bytes={}",
                    raw.len()
                );
                true
            }
            Err(err) => {
                error!("event=store_save module=store status=error key={key} error={err}");
                false
            }
        }
    }
}

impl<R> ReminderSource for PeopleStore<R>
where
    R: StorageRepository + Send + Sync,
{
    fn people(&self) -> Vec<Person> {
        self.load_people()
    }

    fn settings(&self) -> NotificationSettings {
        self.load_settings()
    }
}
