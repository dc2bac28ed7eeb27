//! Person use-case service.
//!
//! # Responsibility
//! - Gate every operation on the caller's permissions before store access.
//! - Route upserts to create or update based on the presence of an id.
//! - Manage the owned phone collection of a person.
//!
//! # Invariants
//! - Every operation requires the type-level `Person` grant; mutations
//!   additionally require their operation-specific grant.
//! - List/get degrade to empty results; update and add-phone on a missing
//!   person fail with `PersonNotFound`; deletes of missing rows are no-ops.
//! - Logs carry ids and counts only, never person field values.

use crate::auth::{Permission, PermissionChecker};
use crate::model::dto::{
    CreateOrUpdatePersonInput, GetPersonForEditOutput, GetPersonsInput, PagedResult,
    PersonEditable, PersonSummary, PhoneEditable, PhoneSummary,
};
use crate::model::mapping::{
    new_person_from, new_phone_from, to_editable, to_phone_summary, to_summary,
};
use crate::model::person::PersonId;
use crate::model::phone_number::{PhoneNumberId, PhoneNumberType};
use crate::model::ValidationError;
use crate::query::person_query::{parse_sort_spec, PageLimits, PersonPageQuery};
use crate::repo::person_repo::PersonRepository;
use crate::repo::phone_repo::PhoneNumberRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Service error for person use-cases.
#[derive(Debug)]
pub enum PersonServiceError {
    /// Permission gate denied the call.
    Unauthorized {
        subject: String,
        permission: Permission,
    },
    /// Target person does not exist.
    PersonNotFound(PersonId),
    /// Caller input is malformed (sort spec, paging).
    InvalidArgument(String),
    /// Identity collision reported by the store.
    Conflict(String),
    /// Field validation failed.
    Validation(ValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for PersonServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized {
                subject,
                permission,
            } => write!(f, "`{subject}` is not granted `{permission}`"),
            Self::PersonNotFound(id) => write!(f, "person not found: {id}"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PersonServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PersonServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::PersonNotFound(id) => Self::PersonNotFound(id),
            RepoError::InvalidArgument(message) => Self::InvalidArgument(message),
            RepoError::Conflict(message) => Self::Conflict(message),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

pub type PersonServiceResult<T> = Result<T, PersonServiceError>;

/// Person service facade over repository and permission implementations.
pub struct PersonService<R, N, G>
where
    R: PersonRepository,
    N: PhoneNumberRepository,
    G: PermissionChecker,
{
    persons: R,
    phones: N,
    permissions: G,
    subject: String,
    page_limits: PageLimits,
}

impl<R, N, G> PersonService<R, N, G>
where
    R: PersonRepository,
    N: PhoneNumberRepository,
    G: PermissionChecker,
{
    /// Creates a service acting on behalf of `subject`.
    pub fn new(persons: R, phones: N, permissions: G, subject: impl Into<String>) -> Self {
        Self {
            persons,
            phones,
            permissions,
            subject: subject.into(),
            page_limits: PageLimits::default(),
        }
    }

    /// Overrides the default/maximum page sizes.
    pub fn with_page_limits(mut self, page_limits: PageLimits) -> Self {
        self.page_limits = page_limits;
        self
    }

    /// Lists one page of persons matching the filter.
    pub fn list_paged(
        &self,
        input: &GetPersonsInput,
    ) -> PersonServiceResult<PagedResult<PersonSummary>> {
        self.authorize(&[Permission::Person])?;

        let sort = parse_sort_spec(input.sorting.as_deref().unwrap_or_default())?;
        let page_size = self.page_limits.normalize(input.page_size);
        let query = PersonPageQuery {
            filter: input.filter.clone(),
            sort,
            page_index: input.page_index,
            page_size,
        };
        let page = self.persons.list_persons(&query)?;

        Ok(PagedResult {
            total_count: page.total_count,
            items: page.persons.iter().map(to_summary).collect(),
            applied_page_size: page_size,
        })
    }

    /// Gets one person with phone numbers. Missing ids yield `None`.
    pub fn get_by_id(&self, id: PersonId) -> PersonServiceResult<Option<PersonSummary>> {
        self.authorize(&[Permission::Person])?;
        Ok(self.persons.get_person(id)?.as_ref().map(to_summary))
    }

    /// Loads the editable shape of a person, or a blank template for `None`.
    pub fn get_for_edit(&self, id: Option<PersonId>) -> PersonServiceResult<GetPersonForEditOutput> {
        self.authorize(&[Permission::Person])?;

        let person = match id {
            Some(id) => {
                let stored = self
                    .persons
                    .get_person(id)?
                    .ok_or(PersonServiceError::PersonNotFound(id))?;
                to_editable(&stored)
            }
            None => PersonEditable::default(),
        };

        Ok(GetPersonForEditOutput {
            person,
            phone_number_types: PhoneNumberType::all().to_vec(),
        })
    }

    /// Creates when `input.person.id` is `None`, updates otherwise.
    pub fn upsert(&self, input: &CreateOrUpdatePersonInput) -> PersonServiceResult<PersonEditable> {
        match input.person.id {
            Some(id) => self.update(id, &input.person),
            None => self.create(&input.person),
        }
    }

    /// Inserts a new person with any phone numbers carried by `input`.
    pub fn create(&self, input: &PersonEditable) -> PersonServiceResult<PersonEditable> {
        self.authorize(&[Permission::Person, Permission::CreatePerson])?;

        let started_at = Instant::now();
        let stored = self.persons.insert_person(&new_person_from(input))?;
        info!(
            "event=person_create module=service status=ok person_id={} phone_count={} duration_ms={}",
            stored.id,
            stored.phones().len(),
            started_at.elapsed().as_millis()
        );
        Ok(to_editable(&stored))
    }

    /// Overlays the fields present in `patch` onto stored person `id`.
    pub fn update(&self, id: PersonId, patch: &PersonEditable) -> PersonServiceResult<PersonEditable> {
        self.authorize(&[Permission::Person, Permission::EditPerson])?;

        let started_at = Instant::now();
        let stored = self.persons.update_person(id, patch)?;
        info!(
            "event=person_update module=service status=ok person_id={} duration_ms={}",
            stored.id,
            started_at.elapsed().as_millis()
        );
        Ok(to_editable(&stored))
    }

    /// Deletes one person and its phone numbers. Missing ids are a no-op.
    pub fn delete(&self, id: PersonId) -> PersonServiceResult<()> {
        self.authorize(&[Permission::Person, Permission::DeletePerson])?;

        let removed = self.persons.delete_person(id)?;
        info!("event=person_delete module=service status=ok person_id={id} removed={removed}");
        Ok(())
    }

    /// Deletes every listed person in one transaction.
    pub fn batch_delete(&self, ids: &[PersonId]) -> PersonServiceResult<()> {
        self.authorize(&[Permission::Person, Permission::BatchDeletePersons])?;

        let removed = self.persons.batch_delete_persons(ids)?;
        info!(
            "event=person_batch_delete module=service status=ok requested={} removed={}",
            ids.len(),
            removed
        );
        Ok(())
    }

    /// Deletes one phone number without loading its owner.
    pub fn delete_phone(&self, id: PhoneNumberId) -> PersonServiceResult<()> {
        self.authorize(&[Permission::Person])?;

        let removed = self.phones.delete_phone_number(id)?;
        info!("event=phone_delete module=service status=ok phone_id={id} removed={removed}");
        Ok(())
    }

    /// Adds one phone number to an existing person and returns it with its
    /// generated id.
    pub fn add_phone(&self, input: &PhoneEditable) -> PersonServiceResult<PhoneSummary> {
        self.authorize(&[Permission::Person])?;

        let mut person = self
            .persons
            .find_person(input.person_id)?
            .ok_or(PersonServiceError::PersonNotFound(input.person_id))?;
        self.persons.ensure_phone_numbers_loaded(&mut person)?;

        let stored = self.persons.insert_phone_number(&new_phone_from(input))?;
        let summary = to_phone_summary(&stored);
        person.phone_numbers.get_or_insert_with(Vec::new).push(stored);

        info!(
            "event=phone_add module=service status=ok person_id={} phone_id={} phone_count={}",
            person.id,
            summary.id,
            person.phones().len()
        );
        Ok(summary)
    }

    fn authorize(&self, required: &[Permission]) -> PersonServiceResult<()> {
        for permission in required {
            if !self.permissions.is_granted(&self.subject, *permission) {
                warn!(
                    "event=permission_denied module=service status=denied permission={}",
                    permission
                );
                return Err(PersonServiceError::Unauthorized {
                    subject: self.subject.clone(),
                    permission: *permission,
                });
            }
        }
        Ok(())
    }
}
