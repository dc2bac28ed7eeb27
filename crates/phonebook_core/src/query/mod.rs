//! Read-side query engines.
//!
//! # Responsibility
//! - Build filtered, sorted, paginated views over stored persons.
//!
//! # Invariants
//! - Queries are read-only and run against one consistent snapshot.

pub mod person_query;
