//! People use-case service.
//!
//! # Responsibility
//! - Provide add/edit/delete/import/celebrate entry points for core callers.
//! - Validate drafts and settings before they reach the store.
//!
//! # Invariants
//! - Every mutation reads the current list, applies one change and writes the
//!   whole list back.
//! - A failed or corrupt read aborts the mutation; nothing is written.
//! - Stored records that no longer decode are carried through unchanged.
//! - Edits keep the person id; all other fields are replaced.
//! - Imports append and never merge or dedupe.

use crate::model::person::{Person, PersonDraft, PersonId, PersonValidationError};
use crate::model::settings::{NotificationSettings, SettingsValidationError};
use crate::repo::people_store::{PeopleStore, StoredRecord};
use crate::repo::storage_repo::{RepoError, StorageRepository};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type ServiceResult<T> = Result<T, PersonServiceError>;

#[derive(Debug)]
pub enum PersonServiceError {
    Validation(PersonValidationError),
    Settings(SettingsValidationError),
    NotFound(PersonId),
    /// Stored people could not be read; nothing was changed.
    Storage(RepoError),
    /// The change was applied but could not be written to storage.
    NotPersisted,
}

impl Display for PersonServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Settings(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "person not found: {id}"),
            Self::Storage(err) => write!(f, "stored people could not be read: {err}"),
            Self::NotPersisted => write!(f, "changes could not be saved"),
        }
    }
}

impl Error for PersonServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Settings(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NotFound(_) | Self::NotPersisted => None,
        }
    }
}

impl From<PersonValidationError> for PersonServiceError {
    fn from(value: PersonValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<SettingsValidationError> for PersonServiceError {
    fn from(value: SettingsValidationError) -> Self {
        Self::Settings(value)
    }
}

/// Use-case service over a shared people store.
pub struct PeopleService<R: StorageRepository> {
    store: Arc<PeopleStore<R>>,
}

impl<R: StorageRepository> PeopleService<R> {
    pub fn new(store: Arc<PeopleStore<R>>) -> Self {
        Self { store }
    }

    /// The underlying store, for sharing with the reminder scheduler.
    pub fn store(&self) -> Arc<PeopleStore<R>> {
        Arc::clone(&self.store)
    }

    pub fn people(&self) -> Vec<Person> {
        self.store.load_people()
    }

    pub fn settings(&self) -> NotificationSettings {
        self.store.load_settings()
    }

    pub fn find(&self, id: &PersonId) -> Option<Person> {
        self.people().into_iter().find(|person| &person.id == id)
    }

    /// Validates `draft` and appends it under a fresh id.
    pub fn add_person(&self, draft: PersonDraft) -> ServiceResult<Person> {
        let person = Person::new(draft)?;
        let mut records = self.records()?;
        records.push(StoredRecord::Person(person.clone()));
        self.save(&records)?;
        info!(
            "event=person_add module=service status=ok id={}",
            person.id
        );
        Ok(person)
    }

    /// Replaces every field of `id` except the id itself.
    pub fn update_person(&self, id: &PersonId, draft: PersonDraft) -> ServiceResult<Person> {
        let updated = Person::with_id(id.clone(), draft)?;
        let mut records = self.records()?;
        let slot = find_mut(&mut records, id)?;
        *slot = updated.clone();
        self.save(&records)?;
        info!("event=person_update module=service status=ok id={id}");
        Ok(updated)
    }

    pub fn delete_person(&self, id: &PersonId) -> ServiceResult<()> {
        let mut records = self.records()?;
        let before = records.len();
        records.retain(|record| record.person().map_or(true, |person| &person.id != id));
        if records.len() == before {
            return Err(PersonServiceError::NotFound(id.clone()));
        }
        self.save(&records)?;
        info!("event=person_delete module=service status=ok id={id}");
        Ok(())
    }

    /// Appends already-built people; returns how many were added.
    pub fn import_people(&self, imported: Vec<Person>) -> ServiceResult<usize> {
        let count = imported.len();
        let mut records = self.records()?;
        records.extend(imported.into_iter().map(StoredRecord::Person));
        self.save(&records)?;
        info!("event=people_import module=service status=ok count={count}");
        Ok(count)
    }

    pub fn mark_celebrated(&self, id: &PersonId, celebrated: bool) -> ServiceResult<Person> {
        let mut records = self.records()?;
        let person = find_mut(&mut records, id)?;
        person.celebrated = Some(celebrated);
        let marked = person.clone();
        self.save(&records)?;
        Ok(marked)
    }

    pub fn update_settings(&self, settings: NotificationSettings) -> ServiceResult<()> {
        settings.validate()?;
        if !self.store.save_settings(&settings) {
            return Err(PersonServiceError::NotPersisted);
        }
        info!(
            "event=settings_update module=service status=ok enabled={} days_before={}",
            settings.enabled, settings.days_before
        );
        Ok(())
    }

    /// Removes all people and resets settings to defaults.
    pub fn clear_all(&self) -> ServiceResult<()> {
        if !self.store.clear_all() {
            return Err(PersonServiceError::NotPersisted);
        }
        info!("event=store_cleared module=service status=ok");
        Ok(())
    }

    fn records(&self) -> ServiceResult<Vec<StoredRecord>> {
        self.store.load_for_update().map_err(|err| {
            warn!("event=store_load module=service status=error error={err}");
            PersonServiceError::Storage(err)
        })
    }

    fn save(&self, records: &[StoredRecord]) -> ServiceResult<()> {
        if self.store.save_records(records) {
            Ok(())
        } else {
            Err(PersonServiceError::NotPersisted)
        }
    }
}

fn find_mut<'a>(records: &'a mut [StoredRecord], id: &PersonId) -> ServiceResult<&'a mut Person> {
    records
        .iter_mut()
        .filter_map(StoredRecord::person_mut)
        .find(|person| &person.id == id)
        .ok_or_else(|| PersonServiceError::NotFound(id.clone()))
}
