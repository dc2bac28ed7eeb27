//! Person repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist person aggregates together with their owned phone numbers.
//! - Expose explicit collection hydration and two-phase child inserts.
//!
//! # Invariants
//! - Person and phone identities are generated by SQLite, never by callers.
//! - Deleting a person deletes its phone numbers in the same transaction.
//! - Deletes of absent persons are no-ops; updates of absent persons fail.

use crate::model::dto::PersonEditable;
use crate::model::mapping::apply_patch;
use crate::model::person::{Person, PersonId};
use crate::model::phone_number::PhoneNumber;
use crate::query::person_query::{query_persons_paged, PersonPage, PersonPageQuery};
use crate::repo::rows::{
    load_person, load_phone_number, load_phone_numbers, person_exists, person_id_from_db,
    placeholders,
};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Transaction, TransactionBehavior};
use std::collections::BTreeSet;

/// Upper bound of ids bound into one `IN (...)` statement.
const BATCH_DELETE_CHUNK: usize = 500;

/// Repository interface for person aggregates.
pub trait PersonRepository {
    /// Loads one person with its phone numbers.
    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
    /// Loads one person without touching its phone numbers.
    fn find_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
    /// Lists one filtered/sorted page of persons with phone numbers.
    fn list_persons(&self, query: &PersonPageQuery) -> RepoResult<PersonPage>;
    /// Inserts a person and any phone numbers it carries.
    fn insert_person(&self, person: &Person) -> RepoResult<Person>;
    /// Overlays `patch` onto the stored person and persists it.
    fn update_person(&self, id: PersonId, patch: &PersonEditable) -> RepoResult<Person>;
    /// Deletes one person and its phone numbers. Returns whether a row existed.
    fn delete_person(&self, id: PersonId) -> RepoResult<bool>;
    /// Deletes every listed person atomically. Returns the removed count.
    fn batch_delete_persons(&self, ids: &[PersonId]) -> RepoResult<usize>;
    /// Loads the phone collection when it is not hydrated yet.
    fn ensure_phone_numbers_loaded(&self, person: &mut Person) -> RepoResult<()>;
    /// Inserts one phone number for an existing person and returns it with
    /// its generated id.
    fn insert_phone_number(&self, phone: &PhoneNumber) -> RepoResult<PhoneNumber>;
}

/// SQLite-backed person repository.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let Some(mut person) = load_person(self.conn, id)? else {
            return Ok(None);
        };
        self.ensure_phone_numbers_loaded(&mut person)?;
        Ok(Some(person))
    }

    fn find_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        load_person(self.conn, id)
    }

    fn list_persons(&self, query: &PersonPageQuery) -> RepoResult<PersonPage> {
        query_persons_paged(self.conn, query)
    }

    fn insert_person(&self, person: &Person) -> RepoResult<Person> {
        person.validate()?;
        for phone in person.phones() {
            phone.validate()?;
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO persons (name, email_address, address) VALUES (?1, ?2, ?3);",
            params![
                person.name.as_str(),
                person.email_address.as_deref(),
                person.address.as_deref(),
            ],
        )?;
        let person_id = person_id_from_db(tx.last_insert_rowid())?;

        for phone in person.phones() {
            insert_phone_row(&tx, person_id, phone)?;
        }
        tx.commit()?;

        self.get_person(person_id)?
            .ok_or_else(|| RepoError::InvalidData(format!("person {person_id} missing after insert")))
    }

    fn update_person(&self, id: PersonId, patch: &PersonEditable) -> RepoResult<Person> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let existing = load_person(&tx, id)?.ok_or(RepoError::PersonNotFound(id))?;
        let patched = apply_patch(patch, existing);
        patched.validate()?;

        tx.execute(
            "UPDATE persons
             SET
                name = ?2,
                email_address = ?3,
                address = ?4,
                updated_at = (CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER))
             WHERE id = ?1;",
            params![
                id,
                patched.name.as_str(),
                patched.email_address.as_deref(),
                patched.address.as_deref(),
            ],
        )?;
        tx.commit()?;

        self.get_person(id)?.ok_or(RepoError::PersonNotFound(id))
    }

    fn delete_person(&self, id: PersonId) -> RepoResult<bool> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM phone_numbers WHERE person_id = ?1;", [id])?;
        let changed = tx.execute("DELETE FROM persons WHERE id = ?1;", [id])?;
        tx.commit()?;
        Ok(changed > 0)
    }

    fn batch_delete_persons(&self, ids: &[PersonId]) -> RepoResult<usize> {
        let unique = ids.iter().copied().collect::<BTreeSet<_>>();
        if unique.is_empty() {
            return Ok(0);
        }

        let unique = unique.into_iter().collect::<Vec<_>>();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut removed = 0;
        for chunk in unique.chunks(BATCH_DELETE_CHUNK) {
            let in_list = placeholders(chunk.len());
            let bind_values = chunk
                .iter()
                .map(|id| Value::Integer(i64::from(*id)))
                .collect::<Vec<_>>();
            tx.execute(
                &format!("DELETE FROM phone_numbers WHERE person_id IN ({in_list});"),
                params_from_iter(bind_values.iter()),
            )?;
            removed += tx.execute(
                &format!("DELETE FROM persons WHERE id IN ({in_list});"),
                params_from_iter(bind_values.iter()),
            )?;
        }
        tx.commit()?;
        Ok(removed)
    }

    fn ensure_phone_numbers_loaded(&self, person: &mut Person) -> RepoResult<()> {
        if person.phone_numbers.is_none() {
            person.phone_numbers = Some(load_phone_numbers(self.conn, person.id)?);
        }
        Ok(())
    }

    fn insert_phone_number(&self, phone: &PhoneNumber) -> RepoResult<PhoneNumber> {
        phone.validate_owned()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !person_exists(&tx, phone.person_id)? {
            return Err(RepoError::PersonNotFound(phone.person_id));
        }
        let phone_id = insert_phone_row(&tx, phone.person_id, phone)?;
        tx.commit()?;

        load_phone_number(self.conn, phone_id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("phone number {phone_id} missing after insert"))
        })
    }
}

fn insert_phone_row(conn: &Connection, person_id: PersonId, phone: &PhoneNumber) -> RepoResult<i64> {
    conn.execute(
        "INSERT INTO phone_numbers (person_id, number, type) VALUES (?1, ?2, ?3);",
        params![person_id, phone.number.as_str(), phone.kind.as_str()],
    )?;
    Ok(conn.last_insert_rowid())
}
