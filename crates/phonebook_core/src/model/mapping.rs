//! Pure transforms between the person aggregate and its DTO shapes.
//!
//! # Invariants
//! - Transforms never touch storage and never change identities.
//! - Text inputs are trimmed; blank optional fields map to `None`.

use crate::model::dto::{PersonEditable, PersonSummary, PhoneEditable, PhoneSummary};
use crate::model::person::{Person, UNSAVED_PERSON_ID};
use crate::model::phone_number::PhoneNumber;

/// Maps a person to its list/detail read model.
///
/// An unloaded phone collection maps to an empty list.
pub fn to_summary(person: &Person) -> PersonSummary {
    PersonSummary {
        id: person.id,
        name: person.name.clone(),
        email_address: person.email_address.clone(),
        address: person.address.clone(),
        phone_numbers: person.phones().iter().map(to_phone_summary).collect(),
        created_at: person.created_at,
        updated_at: person.updated_at,
    }
}

pub fn to_phone_summary(phone: &PhoneNumber) -> PhoneSummary {
    PhoneSummary {
        id: phone.id,
        person_id: phone.person_id,
        number: phone.number.clone(),
        kind: phone.kind,
        created_at: phone.created_at,
    }
}

/// Maps a stored person to the editable shape, carrying its identity.
pub fn to_editable(person: &Person) -> PersonEditable {
    PersonEditable {
        id: Some(person.id),
        name: Some(person.name.clone()),
        email_address: person.email_address.clone(),
        address: person.address.clone(),
        phone_numbers: person
            .phones()
            .iter()
            .map(|phone| PhoneEditable {
                id: Some(phone.id),
                person_id: phone.person_id,
                number: phone.number.clone(),
                kind: phone.kind,
            })
            .collect(),
    }
}

/// Builds an unsaved person from create input.
///
/// Any `id` on the input or its phones is ignored; the store assigns them.
pub fn new_person_from(input: &PersonEditable) -> Person {
    let mut person = Person::new(input.name.as_deref().map(str::trim).unwrap_or_default());
    person.email_address = normalize_optional(input.email_address.as_deref());
    person.address = normalize_optional(input.address.as_deref());
    person.phone_numbers = Some(
        input
            .phone_numbers
            .iter()
            .map(|phone| {
                let mut phone = new_phone_from(phone);
                phone.person_id = UNSAVED_PERSON_ID;
                phone
            })
            .collect(),
    );
    person
}

/// Builds an unsaved phone number owned by `input.person_id`.
pub fn new_phone_from(input: &PhoneEditable) -> PhoneNumber {
    PhoneNumber::new(input.person_id, input.number.trim(), input.kind)
}

/// Overlays the fields present in `patch` onto `person`.
///
/// `Some` overwrites and `None` keeps the stored value. For the optional
/// email/address fields a blank `Some` clears the value. Identity,
/// timestamps and the phone collection are left as loaded.
pub fn apply_patch(patch: &PersonEditable, mut person: Person) -> Person {
    if let Some(name) = patch.name.as_deref() {
        person.name = name.trim().to_string();
    }
    if let Some(email) = patch.email_address.as_deref() {
        person.email_address = normalize_optional(Some(email));
    }
    if let Some(address) = patch.address.as_deref() {
        person.address = normalize_optional(Some(address));
    }
    person
}

fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
