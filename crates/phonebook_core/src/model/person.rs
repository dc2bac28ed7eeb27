//! Person aggregate.
//!
//! # Responsibility
//! - Define the canonical person record and its owned phone collection.
//! - Enforce field rules before any write reaches storage.
//!
//! # Invariants
//! - `id` is assigned by the store and never changes afterwards.
//! - `phone_numbers == None` means the collection was not loaded, not that
//!   the person has no phones.

use crate::model::phone_number::PhoneNumber;
use crate::model::{check_max_chars, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Store-generated person identity.
pub type PersonId = i32;

/// Identity carried by a person that has not been inserted yet.
pub const UNSAVED_PERSON_ID: PersonId = 0;

pub const NAME_MAX_CHARS: usize = 50;
pub const EMAIL_ADDRESS_MAX_CHARS: usize = 80;
pub const ADDRESS_MAX_CHARS: usize = 200;

static EMAIL_ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("valid email regex"));

/// Directory entry owning zero or more phone numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub email_address: Option<String>,
    pub address: Option<String>,
    /// Owned children ordered by phone id. `None` until hydrated.
    pub phone_numbers: Option<Vec<PhoneNumber>>,
    /// Epoch milliseconds, maintained by the store.
    pub created_at: i64,
    /// Epoch milliseconds, refreshed by the store on every update.
    pub updated_at: i64,
}

impl Person {
    /// Creates an unsaved person with an empty, loaded phone collection.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: UNSAVED_PERSON_ID,
            name: name.into(),
            email_address: None,
            address: None,
            phone_numbers: Some(Vec::new()),
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Returns whether the store has not assigned an identity yet.
    pub fn is_transient(&self) -> bool {
        self.id == UNSAVED_PERSON_ID
    }

    /// Returns whether the owned phone collection has been hydrated.
    pub fn phone_numbers_loaded(&self) -> bool {
        self.phone_numbers.is_some()
    }

    /// Loaded phone numbers, or an empty slice when not hydrated.
    pub fn phones(&self) -> &[PhoneNumber] {
        self.phone_numbers.as_deref().unwrap_or(&[])
    }

    /// Validates person fields.
    ///
    /// Owned phone numbers are validated separately by the write path that
    /// persists them.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        check_max_chars("name", name, NAME_MAX_CHARS)?;

        if let Some(email) = self.email_address.as_deref() {
            check_max_chars("email_address", email, EMAIL_ADDRESS_MAX_CHARS)?;
            if !EMAIL_ADDRESS_RE.is_match(email) {
                return Err(ValidationError::InvalidEmailAddress);
            }
        }

        if let Some(address) = self.address.as_deref() {
            check_max_chars("address", address, ADDRESS_MAX_CHARS)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Person, NAME_MAX_CHARS};
    use crate::model::ValidationError;

    #[test]
    fn new_person_is_transient_with_loaded_empty_phones() {
        let person = Person::new("Alice");
        assert!(person.is_transient());
        assert!(person.phone_numbers_loaded());
        assert!(person.phones().is_empty());
    }

    #[test]
    fn validate_rejects_blank_name() {
        let person = Person::new("   ");
        assert_eq!(person.validate(), Err(ValidationError::EmptyName));
    }

    #[test]
    fn validate_rejects_long_name() {
        let person = Person::new("x".repeat(NAME_MAX_CHARS + 1));
        assert!(matches!(
            person.validate(),
            Err(ValidationError::TooLong { field: "name", .. })
        ));
    }

    #[test]
    fn validate_checks_email_shape() {
        let mut person = Person::new("Alice");
        person.email_address = Some("not-an-email".to_string());
        assert_eq!(person.validate(), Err(ValidationError::InvalidEmailAddress));

        person.email_address = Some("a@x.com".to_string());
        assert!(person.validate().is_ok());
    }
}
