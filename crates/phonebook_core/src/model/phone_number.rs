//! Phone number entity owned by a person.

use crate::model::person::{PersonId, UNSAVED_PERSON_ID};
use crate::model::{check_max_chars, ValidationError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-generated phone number identity.
pub type PhoneNumberId = i64;

/// Identity carried by a phone number that has not been inserted yet.
pub const UNSAVED_PHONE_NUMBER_ID: PhoneNumberId = 0;

pub const NUMBER_MAX_CHARS: usize = 20;


/// Kind of line a phone number belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneNumberType {
    #[default]
    Mobile,
    Home,
    Company,
}

/// Stored string value for mobile numbers.
pub const PHONE_NUMBER_TYPE_MOBILE: &str = "mobile";
/// Stored string value for home numbers.
pub const PHONE_NUMBER_TYPE_HOME: &str = "home";
/// Stored string value for company numbers.
pub const PHONE_NUMBER_TYPE_COMPANY: &str = "company";

impl PhoneNumberType {
    /// Stable string id used in storage and wire formats.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mobile => PHONE_NUMBER_TYPE_MOBILE,
            Self::Home => PHONE_NUMBER_TYPE_HOME,
            Self::Company => PHONE_NUMBER_TYPE_COMPANY,
        }
    }

    /// All known kinds, in display order.
    pub fn all() -> [Self; 3] {
        [Self::Mobile, Self::Home, Self::Company]
    }
}

/// Parses one phone number type from its stable string id.
pub fn parse_phone_number_type(value: &str) -> Result<PhoneNumberType, PhoneNumberTypeError> {
    match value.trim() {
        PHONE_NUMBER_TYPE_MOBILE => Ok(PhoneNumberType::Mobile),
        PHONE_NUMBER_TYPE_HOME => Ok(PhoneNumberType::Home),
        PHONE_NUMBER_TYPE_COMPANY => Ok(PhoneNumberType::Company),
        other => Err(PhoneNumberTypeError(other.to_string())),
    }
}

/// Unknown phone number type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumberTypeError(pub String);

impl Display for PhoneNumberTypeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unsupported phone number type: `{}`", self.0)
    }
}

impl Error for PhoneNumberTypeError {}

/// One phone number belonging to a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumber {
    pub id: PhoneNumberId,
    pub person_id: PersonId,
    pub number: String,
    #[serde(rename = "type")]
    pub kind: PhoneNumberType,
    /// Epoch milliseconds, maintained by the store.
    pub created_at: i64,
}

impl PhoneNumber {
    /// Creates an unsaved phone number owned by `person_id`.
    pub fn new(person_id: PersonId, number: impl Into<String>, kind: PhoneNumberType) -> Self {
        Self {
            id: UNSAVED_PHONE_NUMBER_ID,
            person_id,
            number: number.into(),
            kind,
            created_at: 0,
        }
    }

    /// Validates the number: non-blank and at most [`NUMBER_MAX_CHARS`].
    /// Formatting characters and extensions are stored as entered.
    ///
    /// Owner presence is checked by [`PhoneNumber::validate_owned`], since
    /// children of an unsaved person legitimately carry no owner yet.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let number = self.number.trim();
        if number.is_empty() {
            return Err(ValidationError::EmptyPhoneNumber);
        }
        check_max_chars("number", number, NUMBER_MAX_CHARS)
    }

    /// Validates the number and requires a persisted owner.
    pub fn validate_owned(&self) -> Result<(), ValidationError> {
        if self.person_id == UNSAVED_PERSON_ID {
            return Err(ValidationError::MissingOwner);
        }
        self.validate()
    }
}
