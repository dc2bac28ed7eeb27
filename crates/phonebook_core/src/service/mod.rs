//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate permission checks and repository calls into use-case APIs.
//! - Keep transport layers decoupled from storage details.

pub mod person_service;
