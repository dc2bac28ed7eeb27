//! Phone number repository for direct child access.
//!
//! # Responsibility
//! - Read and delete single phone numbers without loading their owner.
//!
//! # Invariants
//! - Deleting an absent phone number is a no-op.

use crate::model::phone_number::{PhoneNumber, PhoneNumberId};
use crate::repo::rows::load_phone_number;
use crate::repo::{ensure_connection_ready, RepoResult};
use rusqlite::Connection;

/// Repository interface for phone number records.
pub trait PhoneNumberRepository {
    /// Loads one phone number by its own identity.
    fn get_phone_number(&self, id: PhoneNumberId) -> RepoResult<Option<PhoneNumber>>;
    /// Deletes one phone number. Returns whether a row existed.
    fn delete_phone_number(&self, id: PhoneNumberId) -> RepoResult<bool>;
}

/// SQLite-backed phone number repository.
pub struct SqlitePhoneNumberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePhoneNumberRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PhoneNumberRepository for SqlitePhoneNumberRepository<'_> {
    fn get_phone_number(&self, id: PhoneNumberId) -> RepoResult<Option<PhoneNumber>> {
        load_phone_number(self.conn, id)
    }

    fn delete_phone_number(&self, id: PhoneNumberId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM phone_numbers WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}
