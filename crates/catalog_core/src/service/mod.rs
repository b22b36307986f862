//! Catalog use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Normalize user input before it reaches repositories.
//! - Assemble read models that follow relations (book detail, author detail).

pub mod catalog_service;
pub mod loan_service;
