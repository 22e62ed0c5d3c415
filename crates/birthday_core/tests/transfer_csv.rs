use birthday_core::transfer::export::{write_csv, write_template};
use birthday_core::transfer::import::{import_csv, import_file, ImportError};
use birthday_core::{Person, PersonDraft};

fn person(name: &str, date: &str, phone: Option<&str>, celebrated: bool) -> Person {
    Person::new(PersonDraft {
        full_name: name.to_string(),
        date_of_birth: date.to_string(),
        phone_number: phone.map(str::to_string),
        role_or_group: "Friends".to_string(),
        photo: None,
        celebrated: Some(celebrated),
    })
    .unwrap()
}

#[test]
fn template_imports_as_three_people() {
    let mut buffer = Vec::new();
    write_template(&mut buffer).unwrap();

    let people = import_csv(buffer.as_slice()).unwrap();
    let names: Vec<&str> = people.iter().map(|p| p.full_name.as_str()).collect();
    assert_eq!(names, ["John Doe", "Jane Smith", "Bob Johnson"]);
    assert_eq!(people[0].phone_number.as_deref(), Some("+1234567890"));
    assert_eq!(people[2].phone_number, None);
    assert_eq!(people[2].role_or_group, "Colleagues");
}

#[test]
fn exported_file_reimports_with_fresh_ids() {
    let original = vec![
        person(r#"Ann "Annie" Lee"#, "1990-06-15", Some("+1 555 0100"), true),
        person("Bo, Jr.", "2000-02-29", None, false),
    ];
    let mut buffer = Vec::new();
    write_csv(&original, &mut buffer).unwrap();

    let imported = import_csv(buffer.as_slice()).unwrap();
    assert_eq!(imported.len(), 2);
    for (before, after) in original.iter().zip(&imported) {
        assert_ne!(before.id, after.id);
        assert_eq!(before.full_name, after.full_name);
        assert_eq!(before.date_of_birth, after.date_of_birth);
        assert_eq!(before.phone_number, after.phone_number);
        assert_eq!(before.role_or_group, after.role_or_group);
        assert_eq!(after.celebrated, Some(false));
    }
}

#[test]
fn single_celebrated_person_row_ends_in_yes() {
    let mut buffer = Vec::new();
    write_csv(&[person("Ann", "1990-06-15", None, true)], &mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    assert!(text.lines().nth(1).unwrap().ends_with(r#","Yes""#));
}

#[test]
fn hand_written_csv_with_mixed_date_styles() {
    let csv = "Full Name,Date of Birth,Phone Number,Role or Group\n\
               Jane Doe,1985-06-22,,\n\
               ,1990-01-01,,Family\n\
               Serial Sam,31220,,Work\n\
               Text Tina,\"June 22, 1985\",555,Work\n";
    let people = import_csv(csv.as_bytes()).unwrap();

    assert_eq!(people.len(), 3);
    assert_eq!(people[0].role_or_group, "General");
    assert_eq!(people[0].phone_number, None);
    assert_eq!(people[1].date_of_birth, "1985-06-22");
    assert_eq!(people[2].date_of_birth, "1985-06-22");
    assert_eq!(people[2].phone_number.as_deref(), Some("555"));
}

#[test]
fn empty_and_header_only_files_are_rejected() {
    assert!(matches!(import_csv("".as_bytes()), Err(ImportError::Empty)));
    assert!(matches!(
        import_csv("Full Name,Date of Birth\n".as_bytes()),
        Err(ImportError::Empty)
    ));
}

#[test]
fn import_file_picks_reader_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("People.CSV");
    std::fs::write(
        &csv_path,
        "Full Name,Date of Birth,Phone Number,Role or Group\nAda,1985,,\n",
    )
    .unwrap();

    let people = import_file(&csv_path).unwrap();
    assert_eq!(people.len(), 1);
    assert_eq!(people[0].date_of_birth, "1985-01-01");

    let txt_path = dir.path().join("people.txt");
    std::fs::write(&txt_path, "anything").unwrap();
    assert!(matches!(
        import_file(&txt_path).unwrap_err(),
        ImportError::UnsupportedFormat(extension) if extension == "txt"
    ));

    assert!(matches!(
        import_file(&dir.path().join("missing.xlsx")).unwrap_err(),
        ImportError::Workbook(_)
    ));
}
