//! Permission gate for person service operations.
//!
//! # Responsibility
//! - Name the permissions guarding phonebook operations.
//! - Decide allow/deny for a subject before any store access.
//!
//! # Invariants
//! - Unknown subjects are denied by default.

pub mod permission;

pub use permission::{
    parse_permission, AllowAll, GrantTable, Permission, PermissionChecker, PermissionError,
};
