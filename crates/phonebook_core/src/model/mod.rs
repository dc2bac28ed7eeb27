//! Phonebook domain model.
//!
//! # Responsibility
//! - Define the `Person` aggregate and its owned `PhoneNumber` children.
//! - Define request/response shapes exchanged with service callers.
//!
//! # Invariants
//! - Identities are store-generated; `0` marks an unsaved record.
//! - A phone number always belongs to exactly one person.

pub mod dto;
pub mod mapping;
pub mod person;
pub mod phone_number;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field-level validation failure for persons and phone numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Person name is empty after trimming.
    EmptyName,
    /// A text field exceeds its maximum length (in chars).
    TooLong {
        field: &'static str,
        max_chars: usize,
        actual_chars: usize,
    },
    /// Email address is not of the `local@domain` shape.
    InvalidEmailAddress,
    /// Phone number is empty after trimming.
    EmptyPhoneNumber,
    /// Phone number is not bound to a persisted person.
    MissingOwner,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "person name must not be empty"),
            Self::TooLong {
                field,
                max_chars,
                actual_chars,
            } => write!(
                f,
                "`{field}` exceeds {max_chars} chars (got {actual_chars})"
            ),
            Self::InvalidEmailAddress => write!(f, "email address is malformed"),
            Self::EmptyPhoneNumber => write!(f, "phone number must not be empty"),
            Self::MissingOwner => write!(f, "phone number has no owning person"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn check_max_chars(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    let actual_chars = value.chars().count();
    if actual_chars > max_chars {
        return Err(ValidationError::TooLong {
            field,
            max_chars,
            actual_chars,
        });
    }
    Ok(())
}
