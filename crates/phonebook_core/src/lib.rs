//! Core domain logic for the phonebook.
//! This crate owns person/phone persistence, paged queries and the
//! permission-gated person service.

pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use auth::{AllowAll, GrantTable, Permission, PermissionChecker};
pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::dto::{
    CreateOrUpdatePersonInput, GetPersonForEditOutput, GetPersonsInput, PagedResult,
    PersonEditable, PersonSummary, PhoneEditable, PhoneSummary,
};
pub use model::person::{Person, PersonId};
pub use model::phone_number::{PhoneNumber, PhoneNumberId, PhoneNumberType};
pub use model::ValidationError;
pub use query::person_query::{PageLimits, PersonPageQuery, SortDirection, SortField, SortSpec};
pub use repo::person_repo::{PersonRepository, SqlitePersonRepository};
pub use repo::phone_repo::{PhoneNumberRepository, SqlitePhoneNumberRepository};
pub use repo::{RepoError, RepoResult};
pub use service::person_service::{PersonService, PersonServiceError, PersonServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
