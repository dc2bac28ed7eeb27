//! Request/response shapes for person service callers.
//!
//! All shapes serialize with camelCase field names so transports can pass
//! them through unchanged.

use crate::model::person::PersonId;
use crate::model::phone_number::{PhoneNumberId, PhoneNumberType};
use serde::{Deserialize, Serialize};

/// Read model for list/detail views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    pub id: PersonId,
    pub name: String,
    pub email_address: Option<String>,
    pub address: Option<String>,
    /// Phone numbers ordered by id.
    pub phone_numbers: Vec<PhoneSummary>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Read model for one phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneSummary {
    pub id: PhoneNumberId,
    pub person_id: PersonId,
    pub number: String,
    #[serde(rename = "type")]
    pub kind: PhoneNumberType,
    pub created_at: i64,
}

/// Editable person shape used by create/update.
///
/// `id == None` requests a create. On update, `None` fields keep the stored
/// value and `Some` fields overwrite it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonEditable {
    pub id: Option<PersonId>,
    pub name: Option<String>,
    pub email_address: Option<String>,
    pub address: Option<String>,
    /// Initial phone numbers on create. Ignored on update.
    pub phone_numbers: Vec<PhoneEditable>,
}

/// Editable phone number shape used by add-phone and person create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhoneEditable {
    pub id: Option<PhoneNumberId>,
    /// Owning person. Ignored when nested inside a person create.
    pub person_id: PersonId,
    pub number: String,
    #[serde(rename = "type")]
    pub kind: PhoneNumberType,
}

/// Paged list request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetPersonsInput {
    /// Case-sensitive substring matched against name, address and email.
    pub filter: Option<String>,
    /// Sort spec such as `name desc`. Defaults to `id asc`.
    pub sorting: Option<String>,
    /// Zero-based page index.
    pub page_index: u32,
    /// Requested page size. `0` selects the default.
    pub page_size: u32,
}

/// Paged list envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    /// Matching rows before pagination.
    pub total_count: u64,
    pub items: Vec<T>,
    /// Effective page size after normalization.
    pub applied_page_size: u32,
}

/// Upsert request envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrUpdatePersonInput {
    pub person: PersonEditable,
}

/// Load-for-edit response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPersonForEditOutput {
    pub person: PersonEditable,
    /// Selectable phone number kinds for the editor.
    pub phone_number_types: Vec<PhoneNumberType>,
}
