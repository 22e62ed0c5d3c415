use birthday_core::model::person::DEFAULT_ROLE_OR_GROUP;
use birthday_core::model::settings::SettingsValidationError;
use birthday_core::repo::people_store::PEOPLE_KEY;
use birthday_core::repo::storage_repo::RepoError;
use birthday_core::{
    NotificationSettings, PeopleService, PeopleStore, Person, PersonDraft, PersonId,
    PersonServiceError, PersonValidationError, RepoResult, SqliteStorageRepository,
    StorageRepository,
};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Storage whose next read can be made to fail once.
struct FlakyRepo {
    inner: SqliteStorageRepository,
    fail_next_read: AtomicBool,
}

impl StorageRepository for FlakyRepo {
    fn get_item(&self, key: &str) -> RepoResult<Option<String>> {
        if self.fail_next_read.swap(false, Ordering::SeqCst) {
            return Err(RepoError::InvalidData("disk unavailable".to_string()));
        }
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> RepoResult<()> {
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> RepoResult<()> {
        self.inner.remove_item(key)
    }
}

fn raw_people<R: StorageRepository>(service: &PeopleService<R>) -> String {
    service
        .store()
        .repo()
        .get_item(PEOPLE_KEY)
        .unwrap()
        .unwrap()
}

fn service() -> PeopleService<SqliteStorageRepository> {
    let repo = SqliteStorageRepository::open_in_memory().unwrap();
    PeopleService::new(Arc::new(PeopleStore::new(repo)))
}

fn draft(name: &str, date: &str) -> PersonDraft {
    PersonDraft {
        full_name: name.to_string(),
        date_of_birth: date.to_string(),
        phone_number: Some("  ".to_string()),
        role_or_group: "Family".to_string(),
        ..PersonDraft::default()
    }
}

#[test]
fn add_person_assigns_id_and_persists() {
    let service = service();
    let added = service.add_person(draft(" Ada Lovelace ", "1815-12-10")).unwrap();

    assert!(!added.id.as_str().is_empty());
    assert_eq!(added.full_name, "Ada Lovelace");
    assert_eq!(added.phone_number, None);
    assert_eq!(service.people(), vec![added.clone()]);
    assert_eq!(service.find(&added.id), Some(added));
}

#[test]
fn add_person_rejects_invalid_drafts() {
    let service = service();

    let err = service.add_person(draft("", "1815-12-10")).unwrap_err();
    assert!(matches!(
        err,
        PersonServiceError::Validation(PersonValidationError::MissingFullName)
    ));

    let err = service.add_person(draft("Ada", "1815-13-40")).unwrap_err();
    assert!(matches!(
        err,
        PersonServiceError::Validation(PersonValidationError::InvalidDateOfBirth(_))
    ));

    let mut no_role = draft("Ada", "1815-12-10");
    no_role.role_or_group = String::new();
    assert!(matches!(
        service.add_person(no_role).unwrap_err(),
        PersonServiceError::Validation(PersonValidationError::MissingRoleOrGroup)
    ));

    let mut bad_photo = draft("Ada", "1815-12-10");
    bad_photo.photo = Some("https://example.com/ada.png".to_string());
    assert!(matches!(
        service.add_person(bad_photo).unwrap_err(),
        PersonServiceError::Validation(PersonValidationError::InvalidPhoto)
    ));

    assert!(service.people().is_empty());
}

#[test]
fn update_person_keeps_id_and_replaces_fields() {
    let service = service();
    let added = service.add_person(draft("Ada", "1815-12-10")).unwrap();

    let mut edit = added.to_draft();
    edit.full_name = "Ada King".to_string();
    edit.role_or_group = "Friends".to_string();
    let updated = service.update_person(&added.id, edit).unwrap();

    assert_eq!(updated.id, added.id);
    assert_eq!(service.people(), vec![updated]);
    assert_eq!(service.people()[0].full_name, "Ada King");
}

#[test]
fn unknown_ids_are_reported() {
    let service = service();
    service.add_person(draft("Ada", "1815-12-10")).unwrap();
    let missing = PersonId::from("missing");

    assert!(matches!(
        service.update_person(&missing, draft("X", "2000-01-01")),
        Err(PersonServiceError::NotFound(_))
    ));
    assert!(matches!(
        service.delete_person(&missing),
        Err(PersonServiceError::NotFound(_))
    ));
    assert!(matches!(
        service.mark_celebrated(&missing, true),
        Err(PersonServiceError::NotFound(_))
    ));
    assert_eq!(service.people().len(), 1);
}

#[test]
fn delete_and_celebrate() {
    let service = service();
    let ada = service.add_person(draft("Ada", "1815-12-10")).unwrap();
    let alan = service.add_person(draft("Alan", "1912-06-23")).unwrap();

    let marked = service.mark_celebrated(&alan.id, true).unwrap();
    assert!(marked.is_celebrated());
    assert!(service.find(&alan.id).unwrap().is_celebrated());

    service.mark_celebrated(&alan.id, false).unwrap();
    assert_eq!(service.find(&alan.id).unwrap().celebrated, Some(false));

    service.delete_person(&ada.id).unwrap();
    let ids: Vec<PersonId> = service.people().into_iter().map(|person| person.id).collect();
    assert_eq!(ids, vec![alan.id]);
}

#[test]
fn import_appends_without_dedupe() {
    let service = service();
    let existing = service.add_person(draft("Ada", "1815-12-10")).unwrap();

    let imported = vec![
        Person::new(draft("Ada", "1815-12-10")).unwrap(),
        Person::new(PersonDraft {
            full_name: "Jane Doe".to_string(),
            date_of_birth: "1985-06-22".to_string(),
            role_or_group: DEFAULT_ROLE_OR_GROUP.to_string(),
            ..PersonDraft::default()
        })
        .unwrap(),
    ];
    assert_eq!(service.import_people(imported).unwrap(), 2);

    let people = service.people();
    assert_eq!(people.len(), 3);
    assert_eq!(people[0], existing);
    assert_eq!(people[1].full_name, "Ada");
    assert_eq!(people[2].role_or_group, "General");
}

#[test]
fn settings_are_validated_before_saving() {
    let service = service();
    assert_eq!(service.settings(), NotificationSettings::default());

    let err = service
        .update_settings(NotificationSettings {
            enabled: true,
            days_before: 0,
        })
        .unwrap_err();
    assert!(matches!(
        err,
        PersonServiceError::Settings(SettingsValidationError::DaysBeforeOutOfRange(0))
    ));
    assert_eq!(service.settings(), NotificationSettings::default());

    let week = NotificationSettings {
        enabled: false,
        days_before: 7,
    };
    service.update_settings(week).unwrap();
    assert_eq!(service.settings(), week);
}

#[test]
fn clear_all_resets_people_and_settings() {
    let service = service();
    service.add_person(draft("Ada", "1815-12-10")).unwrap();
    service
        .update_settings(NotificationSettings {
            enabled: false,
            days_before: 5,
        })
        .unwrap();

    service.clear_all().unwrap();
    assert!(service.people().is_empty());
    assert_eq!(service.settings(), NotificationSettings::default());
}

#[test]
fn undecodable_stored_records_survive_mutations() {
    let repo = SqliteStorageRepository::open_in_memory().unwrap();
    repo.set_item(
        PEOPLE_KEY,
        r#"[
            {"id":"a","fullName":"Ada","dateOfBirth":"1815-12-10","roleOrGroup":"F"},
            {"id":"b","fullName":"Legacy","dateOfBirth":"1990-06-15"}
        ]"#,
    )
    .unwrap();
    let service = PeopleService::new(Arc::new(PeopleStore::new(repo)));

    let added = service.add_person(draft("New", "2001-01-01")).unwrap();
    service.mark_celebrated(&PersonId::from("a"), true).unwrap();
    service.delete_person(&added.id).unwrap();

    let raw: Vec<Value> = serde_json::from_str(&raw_people(&service)).unwrap();
    assert_eq!(raw.len(), 2);
    assert_eq!(raw[0]["celebrated"], Value::Bool(true));
    assert_eq!(
        raw[1],
        serde_json::json!({"id":"b","fullName":"Legacy","dateOfBirth":"1990-06-15"})
    );
    assert_eq!(service.people().len(), 1);
}

#[test]
fn failed_read_aborts_the_change_without_writing() {
    let store = Arc::new(PeopleStore::new(FlakyRepo {
        inner: SqliteStorageRepository::open_in_memory().unwrap(),
        fail_next_read: AtomicBool::new(false),
    }));
    let service = PeopleService::new(Arc::clone(&store));
    for name in ["Ada", "Alan", "Grace"] {
        service.add_person(draft(name, "1900-01-01")).unwrap();
    }

    store.repo().fail_next_read.store(true, Ordering::SeqCst);
    let err = service.add_person(draft("New", "2001-01-01")).unwrap_err();
    assert!(matches!(err, PersonServiceError::Storage(_)));
    assert_eq!(service.people().len(), 3);
}

#[test]
fn corrupt_people_document_is_not_overwritten() {
    let repo = SqliteStorageRepository::open_in_memory().unwrap();
    repo.set_item(PEOPLE_KEY, "{not json").unwrap();
    let service = PeopleService::new(Arc::new(PeopleStore::new(repo)));

    let err = service.add_person(draft("New", "2001-01-01")).unwrap_err();
    assert!(matches!(
        err,
        PersonServiceError::Storage(RepoError::InvalidData(_))
    ));
    assert_eq!(raw_people(&service), "{not json");
}
