//! Catalog domain model.
//!
//! # Responsibility
//! - Define the four catalog records and their input shapes.
//! - Enforce declared column sizes before anything reaches storage.
//!
//! # Invariants
//! - Integer ids (`AuthorId`, `GenreId`, `BookId`) are assigned by storage.
//! - `BookInstanceId` is a client-generated UUID and never nil.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;

/// Validation failure for catalog records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Required text field is empty or whitespace-only.
    BlankField(&'static str),
    /// Text field exceeds its declared column size.
    FieldTooLong {
        field: &'static str,
        max_chars: usize,
        actual_chars: usize,
    },
    /// Copy id must not be the nil UUID.
    NilInstanceId,
    /// Status text is neither a known code nor a known name.
    UnknownLoanStatus(String),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::FieldTooLong {
                field,
                max_chars,
                actual_chars,
            } => write!(
                f,
                "{field} is {actual_chars} chars, at most {max_chars} allowed"
            ),
            Self::NilInstanceId => write!(f, "book instance id must not be nil"),
            Self::UnknownLoanStatus(value) => write!(
                f,
                "unknown loan status `{value}`; expected m|o|a|r or maintenance|on_loan|available|reserved"
            ),
        }
    }
}

impl Error for ModelValidationError {}

pub(crate) fn require_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ModelValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ModelValidationError::BlankField(field));
    }
    limit_text(field, trimmed, max_chars)
}

pub(crate) fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

pub(crate) fn limit_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ModelValidationError> {
    let actual_chars = value.chars().count();
    if actual_chars > max_chars {
        return Err(ModelValidationError::FieldTooLong {
            field,
            max_chars,
            actual_chars,
        });
    }
    Ok(())
}
