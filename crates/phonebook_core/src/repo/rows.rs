//! Shared row decoding and child-collection loaders.

use crate::model::person::{Person, PersonId};
use crate::model::phone_number::{parse_phone_number_type, PhoneNumber, PhoneNumberId};
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::collections::BTreeMap;

pub(crate) const PERSON_SELECT_SQL: &str = "SELECT
    id,
    name,
    email_address,
    address,
    created_at,
    updated_at
FROM persons";

pub(crate) const PHONE_NUMBER_SELECT_SQL: &str = "SELECT
    id,
    person_id,
    number,
    type,
    created_at
FROM phone_numbers";

/// Decodes one `persons` row. The phone collection is left unloaded.
pub(crate) fn parse_person_row(row: &Row<'_>) -> RepoResult<Person> {
    let raw_id: i64 = row.get("id")?;
    let person = Person {
        id: person_id_from_db(raw_id)?,
        name: row.get("name")?,
        email_address: row.get("email_address")?,
        address: row.get("address")?,
        phone_numbers: None,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    person.validate().map_err(|err| {
        RepoError::InvalidData(format!("person {} failed validation: {err}", person.id))
    })?;
    Ok(person)
}

pub(crate) fn parse_phone_number_row(row: &Row<'_>) -> RepoResult<PhoneNumber> {
    let id: PhoneNumberId = row.get("id")?;
    let raw_person_id: i64 = row.get("person_id")?;
    let type_text: String = row.get("type")?;
    let kind = parse_phone_number_type(&type_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid phone number type `{type_text}` in phone_numbers.type"
        ))
    })?;

    Ok(PhoneNumber {
        id,
        person_id: person_id_from_db(raw_person_id)?,
        number: row.get("number")?,
        kind,
        created_at: row.get("created_at")?,
    })
}

pub(crate) fn person_id_from_db(value: i64) -> RepoResult<PersonId> {
    PersonId::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("person id `{value}` out of range")))
}

/// Loads one person row without children.
pub(crate) fn load_person(conn: &Connection, id: PersonId) -> RepoResult<Option<Person>> {
    let mut stmt = conn.prepare(&format!("{PERSON_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_person_row(row)?));
    }
    Ok(None)
}

pub(crate) fn person_exists(conn: &Connection, id: PersonId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM persons WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn load_phone_number(
    conn: &Connection,
    id: PhoneNumberId,
) -> RepoResult<Option<PhoneNumber>> {
    let mut stmt = conn.prepare(&format!("{PHONE_NUMBER_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_phone_number_row(row)?));
    }
    Ok(None)
}

/// Loads the phone collection of one person, ordered by phone id.
pub(crate) fn load_phone_numbers(
    conn: &Connection,
    person_id: PersonId,
) -> RepoResult<Vec<PhoneNumber>> {
    let mut stmt = conn.prepare(&format!(
        "{PHONE_NUMBER_SELECT_SQL} WHERE person_id = ?1 ORDER BY id ASC;"
    ))?;
    let mut rows = stmt.query([person_id])?;
    let mut phones = Vec::new();
    while let Some(row) = rows.next()? {
        phones.push(parse_phone_number_row(row)?);
    }
    Ok(phones)
}

/// Loads phone collections for a page of persons in one query.
///
/// Every requested id gets an entry, empty when the person has no phones.
pub(crate) fn load_phone_numbers_for(
    conn: &Connection,
    person_ids: &[PersonId],
) -> RepoResult<BTreeMap<PersonId, Vec<PhoneNumber>>> {
    let mut grouped: BTreeMap<PersonId, Vec<PhoneNumber>> = person_ids
        .iter()
        .map(|id| (*id, Vec::new()))
        .collect();
    if person_ids.is_empty() {
        return Ok(grouped);
    }

    let sql = format!(
        "{PHONE_NUMBER_SELECT_SQL} WHERE person_id IN ({}) ORDER BY person_id ASC, id ASC;",
        placeholders(person_ids.len())
    );
    let bind_values = person_ids
        .iter()
        .map(|id| Value::Integer(i64::from(*id)))
        .collect::<Vec<_>>();

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    while let Some(row) = rows.next()? {
        let phone = parse_phone_number_row(row)?;
        grouped.entry(phone.person_id).or_default().push(phone);
    }
    Ok(grouped)
}

/// Builds `?, ?, ?` for an `IN (...)` list of `count` items.
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
