use phonebook_core::db::open_db_in_memory;
use phonebook_core::{
    Person, PersonEditable, PersonRepository, PhoneNumber, PhoneNumberRepository,
    PhoneNumberType, RepoError, SqlitePersonRepository, SqlitePhoneNumberRepository,
    ValidationError,
};
use rusqlite::Connection;

fn person(name: &str, address: &str, email: &str) -> Person {
    let mut person = Person::new(name);
    person.address = Some(address.to_string());
    person.email_address = Some(email.to_string());
    person
}

fn phone_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM phone_numbers;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn insert_and_get_roundtrip_with_phone_numbers() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let mut alice = person("Alice", "1 Main St", "a@x.com");
    alice.phone_numbers = Some(vec![
        PhoneNumber::new(0, "555-0100", PhoneNumberType::Home),
        PhoneNumber::new(0, "555-0101", PhoneNumberType::Mobile),
    ]);
    let stored = repo.insert_person(&alice).unwrap();

    assert!(stored.id > 0);
    assert!(stored.created_at > 0);
    let loaded = repo.get_person(stored.id).unwrap().unwrap();
    assert_eq!(loaded, stored);
    assert_eq!(loaded.name, "Alice");
    assert_eq!(loaded.address.as_deref(), Some("1 Main St"));
    assert_eq!(loaded.email_address.as_deref(), Some("a@x.com"));

    let phones = loaded.phones();
    assert_eq!(phones.len(), 2);
    assert!(phones[0].id < phones[1].id);
    assert!(phones.iter().all(|phone| phone.person_id == stored.id));
    assert_eq!(phones[0].number, "555-0100");
    assert_eq!(phones[0].kind, PhoneNumberType::Home);
}

#[test]
fn inserted_ids_are_unique_and_never_reused() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let first = repo.insert_person(&Person::new("First")).unwrap();
    repo.delete_person(first.id).unwrap();
    let second = repo.insert_person(&Person::new("Second")).unwrap();

    assert_ne!(first.id, second.id);
    assert!(second.id > first.id);
}

#[test]
fn get_missing_person_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    assert!(repo.get_person(42).unwrap().is_none());
    assert!(repo.find_person(42).unwrap().is_none());
}

#[test]
fn find_person_leaves_phones_unloaded_until_ensured() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let mut alice = Person::new("Alice");
    alice.phone_numbers = Some(vec![PhoneNumber::new(0, "555", PhoneNumberType::Mobile)]);
    let stored = repo.insert_person(&alice).unwrap();

    let mut shallow = repo.find_person(stored.id).unwrap().unwrap();
    assert!(!shallow.phone_numbers_loaded());

    repo.ensure_phone_numbers_loaded(&mut shallow).unwrap();
    assert_eq!(shallow.phones().len(), 1);

    // Already-loaded collections are left untouched.
    shallow.phone_numbers = Some(Vec::new());
    repo.ensure_phone_numbers_loaded(&mut shallow).unwrap();
    assert!(shallow.phones().is_empty());
}

#[test]
fn insert_rejects_invalid_person_and_phone_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let err = repo.insert_person(&Person::new("  ")).unwrap_err();
    assert!(matches!(err, RepoError::Validation(ValidationError::EmptyName)));

    let mut bad_phone = Person::new("Alice");
    bad_phone.phone_numbers = Some(vec![PhoneNumber::new(0, " ", PhoneNumberType::Home)]);
    let err = repo.insert_person(&bad_phone).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::EmptyPhoneNumber)
    ));

    let persons: i64 = conn
        .query_row("SELECT COUNT(*) FROM persons;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(persons, 0);
}

#[test]
fn update_overlays_only_present_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();
    let stored = repo
        .insert_person(&person("Alice", "1 Main St", "a@x.com"))
        .unwrap();

    let patch = PersonEditable {
        id: Some(stored.id),
        name: Some("Alicia".to_string()),
        ..PersonEditable::default()
    };
    let updated = repo.update_person(stored.id, &patch).unwrap();

    assert_eq!(updated.id, stored.id);
    assert_eq!(updated.name, "Alicia");
    assert_eq!(updated.address.as_deref(), Some("1 Main St"));
    assert_eq!(updated.email_address.as_deref(), Some("a@x.com"));
    assert!(updated.updated_at >= stored.updated_at);
}

#[test]
fn update_missing_person_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let patch = PersonEditable {
        name: Some("Ghost".to_string()),
        ..PersonEditable::default()
    };
    let err = repo.update_person(7, &patch).unwrap_err();
    assert!(matches!(err, RepoError::PersonNotFound(7)));
}

#[test]
fn update_validation_failure_keeps_stored_values() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();
    let stored = repo
        .insert_person(&person("Alice", "1 Main St", "a@x.com"))
        .unwrap();

    let patch = PersonEditable {
        email_address: Some("broken".to_string()),
        ..PersonEditable::default()
    };
    let err = repo.update_person(stored.id, &patch).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::InvalidEmailAddress)
    ));

    let loaded = repo.get_person(stored.id).unwrap().unwrap();
    assert_eq!(loaded.email_address.as_deref(), Some("a@x.com"));
}

#[test]
fn delete_cascades_to_phone_numbers_and_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let mut alice = Person::new("Alice");
    alice.phone_numbers = Some(vec![PhoneNumber::new(0, "555", PhoneNumberType::Mobile)]);
    let alice = repo.insert_person(&alice).unwrap();
    let mut bob = Person::new("Bob");
    bob.phone_numbers = Some(vec![PhoneNumber::new(0, "556", PhoneNumberType::Mobile)]);
    let bob = repo.insert_person(&bob).unwrap();

    assert!(repo.delete_person(alice.id).unwrap());
    assert!(!repo.delete_person(alice.id).unwrap());

    assert!(repo.get_person(alice.id).unwrap().is_none());
    assert_eq!(phone_count(&conn), 1);
    assert_eq!(repo.get_person(bob.id).unwrap().unwrap().phones().len(), 1);
}

#[test]
fn batch_delete_removes_listed_persons_and_ignores_missing_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let mut ids = Vec::new();
    for name in ["A", "B", "C"] {
        let mut person = Person::new(name);
        person.phone_numbers = Some(vec![PhoneNumber::new(0, "555", PhoneNumberType::Home)]);
        ids.push(repo.insert_person(&person).unwrap().id);
    }
    repo.delete_person(ids[1]).unwrap();

    let removed = repo
        .batch_delete_persons(&[ids[0], ids[1], ids[0], 9999])
        .unwrap();
    assert_eq!(removed, 1);
    assert!(repo.get_person(ids[0]).unwrap().is_none());
    assert!(repo.get_person(ids[1]).unwrap().is_none());
    assert!(repo.get_person(ids[2]).unwrap().is_some());
    assert_eq!(phone_count(&conn), 1);

    assert_eq!(repo.batch_delete_persons(&[]).unwrap(), 0);
}

#[test]
fn batch_delete_handles_more_ids_than_one_statement_chunk() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let ids = (0..1200)
        .map(|index| repo.insert_person(&Person::new(format!("P{index}"))).unwrap().id)
        .collect::<Vec<_>>();
    let removed = repo.batch_delete_persons(&ids).unwrap();

    assert_eq!(removed, 1200);
    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM persons;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
}

#[test]
fn batch_delete_rolls_back_every_chunk_when_one_row_fails() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let mut ids = Vec::new();
    for index in 0..600 {
        let mut person = Person::new(format!("P{index}"));
        person.phone_numbers = Some(vec![PhoneNumber::new(0, "555", PhoneNumberType::Home)]);
        ids.push(repo.insert_person(&person).unwrap().id);
    }
    // The last id lands in the second statement chunk, after the first
    // chunk has already been deleted inside the transaction.
    let blocked = *ids.last().unwrap();
    conn.execute_batch(&format!(
        "CREATE TRIGGER block_person_delete BEFORE DELETE ON persons
         WHEN OLD.id = {blocked}
         BEGIN SELECT RAISE(ABORT, 'delete blocked'); END;"
    ))
    .unwrap();

    let err = repo.batch_delete_persons(&ids).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));

    let persons: i64 = conn
        .query_row("SELECT COUNT(*) FROM persons;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(persons, 600);
    assert_eq!(phone_count(&conn), 600);
    assert_eq!(repo.get_person(ids[0]).unwrap().unwrap().phones().len(), 1);
}

#[test]
fn update_refreshes_updated_at_with_millisecond_precision() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();
    let stored = repo.insert_person(&Person::new("Alice")).unwrap();
    assert_eq!(stored.created_at, stored.updated_at);

    std::thread::sleep(std::time::Duration::from_millis(25));
    let patch = PersonEditable {
        name: Some("Alicia".to_string()),
        ..PersonEditable::default()
    };
    let first = repo.update_person(stored.id, &patch).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(25));
    let second = repo.update_person(stored.id, &patch).unwrap();

    assert!(first.updated_at > stored.updated_at);
    assert!(second.updated_at > first.updated_at);
    assert_eq!(second.created_at, stored.created_at);
}

#[test]
fn insert_phone_number_returns_generated_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();
    let alice = repo.insert_person(&Person::new("Alice")).unwrap();

    let first = repo
        .insert_phone_number(&PhoneNumber::new(alice.id, "555", PhoneNumberType::Mobile))
        .unwrap();
    let second = repo
        .insert_phone_number(&PhoneNumber::new(alice.id, "556", PhoneNumberType::Company))
        .unwrap();

    assert!(first.id > 0);
    assert!(second.id > first.id);
    assert_eq!(second.kind, PhoneNumberType::Company);
    let loaded = repo.get_person(alice.id).unwrap().unwrap();
    assert_eq!(loaded.phones(), &[first, second]);
}

#[test]
fn insert_phone_number_requires_existing_owner() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let err = repo
        .insert_phone_number(&PhoneNumber::new(31, "555", PhoneNumberType::Mobile))
        .unwrap_err();
    assert!(matches!(err, RepoError::PersonNotFound(31)));

    let err = repo
        .insert_phone_number(&PhoneNumber::new(0, "555", PhoneNumberType::Mobile))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::MissingOwner)
    ));
}

#[test]
fn phone_repository_deletes_single_number_idempotently() {
    let conn = open_db_in_memory().unwrap();
    let persons = SqlitePersonRepository::try_new(&conn).unwrap();
    let phones = SqlitePhoneNumberRepository::try_new(&conn).unwrap();

    let mut alice = Person::new("Alice");
    alice.phone_numbers = Some(vec![
        PhoneNumber::new(0, "555", PhoneNumberType::Mobile),
        PhoneNumber::new(0, "556", PhoneNumberType::Home),
    ]);
    let alice = persons.insert_person(&alice).unwrap();
    let target = alice.phones()[0].id;

    assert_eq!(
        phones.get_phone_number(target).unwrap().unwrap().number,
        "555"
    );
    assert!(phones.delete_phone_number(target).unwrap());
    assert!(!phones.delete_phone_number(target).unwrap());
    assert!(phones.get_phone_number(target).unwrap().is_none());

    let remaining = persons.get_person(alice.id).unwrap().unwrap();
    assert_eq!(remaining.phones().len(), 1);
    assert_eq!(remaining.phones()[0].number, "556");
}

#[test]
fn primary_key_collisions_surface_as_conflict() {
    let conn = open_db_in_memory().unwrap();
    conn.execute("INSERT INTO persons (id, name) VALUES (1, 'A');", [])
        .unwrap();
    let raw = conn
        .execute("INSERT INTO persons (id, name) VALUES (1, 'B');", [])
        .unwrap_err();

    assert!(matches!(RepoError::from(raw), RepoError::Conflict(_)));
}

#[test]
fn corrupted_phone_type_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();
    let alice = repo.insert_person(&Person::new("Alice")).unwrap();

    // Bypass the CHECK constraint to simulate a row written by a newer build.
    conn.execute_batch("PRAGMA ignore_check_constraints = ON;")
        .unwrap();
    conn.execute(
        "INSERT INTO phone_numbers (person_id, number, type) VALUES (?1, '555', 'pager');",
        [alice.id],
    )
    .unwrap();

    let err = repo.get_person(alice.id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
