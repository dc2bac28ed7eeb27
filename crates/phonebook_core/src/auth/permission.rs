//! Permission names and grant checks.

use std::collections::{BTreeSet, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Permission guarding one class of person operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Permission {
    /// Type-level grant required by every person operation.
    Person,
    CreatePerson,
    EditPerson,
    DeletePerson,
    BatchDeletePersons,
}

/// Permission string for read access to persons.
pub const PERMISSION_PERSON: &str = "Person";
/// Permission string for creating persons.
pub const PERMISSION_PERSON_CREATE: &str = "Person.Create";
/// Permission string for editing persons.
pub const PERMISSION_PERSON_EDIT: &str = "Person.Edit";
/// Permission string for deleting one person.
pub const PERMISSION_PERSON_DELETE: &str = "Person.Delete";
/// Permission string for batch deletion.
pub const PERMISSION_PERSON_BATCH_DELETE: &str = "Person.BatchDelete";

impl Permission {
    /// Stable string id used in grant declarations.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Person => PERMISSION_PERSON,
            Self::CreatePerson => PERMISSION_PERSON_CREATE,
            Self::EditPerson => PERMISSION_PERSON_EDIT,
            Self::DeletePerson => PERMISSION_PERSON_DELETE,
            Self::BatchDeletePersons => PERMISSION_PERSON_BATCH_DELETE,
        }
    }

    pub fn all() -> [Self; 5] {
        [
            Self::Person,
            Self::CreatePerson,
            Self::EditPerson,
            Self::DeletePerson,
            Self::BatchDeletePersons,
        ]
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses one permission from its stable string id. Matching is exact.
pub fn parse_permission(value: &str) -> Result<Permission, PermissionError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(PermissionError::EmptyPermission);
    }

    match normalized {
        PERMISSION_PERSON => Ok(Permission::Person),
        PERMISSION_PERSON_CREATE => Ok(Permission::CreatePerson),
        PERMISSION_PERSON_EDIT => Ok(Permission::EditPerson),
        PERMISSION_PERSON_DELETE => Ok(Permission::DeletePerson),
        PERMISSION_PERSON_BATCH_DELETE => Ok(Permission::BatchDeletePersons),
        other => Err(PermissionError::UnsupportedPermission(other.to_string())),
    }
}

/// Permission parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    EmptyPermission,
    UnsupportedPermission(String),
}

impl Display for PermissionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPermission => write!(f, "permission value must not be empty"),
            Self::UnsupportedPermission(value) => write!(f, "permission is unsupported: {value}"),
        }
    }
}

impl Error for PermissionError {}

/// Allow/deny decision for one subject and permission.
pub trait PermissionChecker {
    fn is_granted(&self, subject: &str, permission: Permission) -> bool;
}

/// Grants every permission. For trusted in-process callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PermissionChecker for AllowAll {
    fn is_granted(&self, _subject: &str, _permission: Permission) -> bool {
        true
    }
}

/// Explicit per-subject grants. Anything not granted is denied.
#[derive(Debug, Clone, Default)]
pub struct GrantTable {
    grants: HashMap<String, BTreeSet<Permission>>,
}

impl GrantTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants `permissions` to `subject`, keeping existing grants.
    pub fn grant(
        &mut self,
        subject: impl Into<String>,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> &mut Self {
        self.grants
            .entry(subject.into())
            .or_default()
            .extend(permissions);
        self
    }

    /// Grants permissions declared as strings, e.g. from configuration.
    pub fn grant_named<'a>(
        &mut self,
        subject: impl Into<String>,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<&mut Self, PermissionError> {
        let parsed = names
            .into_iter()
            .map(parse_permission)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.grant(subject, parsed))
    }

    pub fn revoke(&mut self, subject: &str, permission: Permission) {
        if let Some(granted) = self.grants.get_mut(subject) {
            granted.remove(&permission);
        }
    }
}

impl PermissionChecker for GrantTable {
    fn is_granted(&self, subject: &str, permission: Permission) -> bool {
        self.grants
            .get(subject)
            .is_some_and(|granted| granted.contains(&permission))
    }
}

impl<T: PermissionChecker + ?Sized> PermissionChecker for &T {
    fn is_granted(&self, subject: &str, permission: Permission) -> bool {
        (**self).is_granted(subject, permission)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        parse_permission, AllowAll, GrantTable, Permission, PermissionChecker, PermissionError,
    };

    #[test]
    fn parses_all_permissions_round_trip() {
        for permission in Permission::all() {
            assert_eq!(
                parse_permission(permission.as_str()).expect("known permission"),
                permission
            );
        }
    }

    #[test]
    fn rejects_empty_and_unknown_permissions() {
        assert_eq!(
            parse_permission("  ").expect_err("empty must fail"),
            PermissionError::EmptyPermission
        );
        assert_eq!(
            parse_permission("person.create").expect_err("case must match"),
            PermissionError::UnsupportedPermission("person.create".to_string())
        );
    }

    #[test]
    fn grant_table_denies_by_default() {
        let table = GrantTable::new();
        for permission in Permission::all() {
            assert!(!table.is_granted("alice", permission));
        }
    }

    #[test]
    fn grant_table_is_per_subject_and_revocable() {
        let mut table = GrantTable::new();
        table
            .grant_named("alice", ["Person", "Person.Edit"])
            .expect("valid names");

        assert!(table.is_granted("alice", Permission::Person));
        assert!(table.is_granted("alice", Permission::EditPerson));
        assert!(!table.is_granted("alice", Permission::DeletePerson));
        assert!(!table.is_granted("bob", Permission::Person));

        table.revoke("alice", Permission::EditPerson);
        assert!(!table.is_granted("alice", Permission::EditPerson));
    }

    #[test]
    fn grant_named_rejects_unknown_names_without_partial_grant() {
        let mut table = GrantTable::new();
        assert!(table.grant_named("alice", ["Person", "Person.Export"]).is_err());
        assert!(!table.is_granted("alice", Permission::Person));
    }

    #[test]
    fn allow_all_grants_everything() {
        assert!(AllowAll.is_granted("anyone", Permission::BatchDeletePersons));
    }
}
