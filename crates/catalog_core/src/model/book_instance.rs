//! Loanable copy of a book.
//!
//! # Invariants
//! - `id` is stable, unique across the whole library and never nil.
//! - `status` is exactly one of the four `LoanStatus` values.
//! - Storage refuses to delete a book while any copy references it.

use super::book::BookId;
use super::{require_text, trim_in_place, ModelValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

pub type BookInstanceId = Uuid;

pub const IMPRINT_MAX_CHARS: usize = 100;

/// Availability of one copy. Stored as a single-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[default]
    Maintenance,
    OnLoan,
    Available,
    Reserved,
}

impl LoanStatus {
    pub const ALL: [LoanStatus; 4] = [
        LoanStatus::Maintenance,
        LoanStatus::OnLoan,
        LoanStatus::Available,
        LoanStatus::Reserved,
    ];

    /// Storage code (`m`, `o`, `a`, `r`).
    pub fn code(self) -> &'static str {
        match self {
            Self::Maintenance => "m",
            Self::OnLoan => "o",
            Self::Available => "a",
            Self::Reserved => "r",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "m" => Some(Self::Maintenance),
            "o" => Some(Self::OnLoan),
            "a" => Some(Self::Available),
            "r" => Some(Self::Reserved),
            _ => None,
        }
    }

    /// Human-readable label, e.g. `On loan`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Maintenance => "Maintenance",
            Self::OnLoan => "On loan",
            Self::Available => "Available",
            Self::Reserved => "Reserved",
        }
    }
}

impl Display for LoanStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LoanStatus {
    type Err = ModelValidationError;

    /// Accepts a storage code or a snake_case / label name, case-insensitive.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(' ', "_");
        if let Some(status) = Self::from_code(&normalized) {
            return Ok(status);
        }
        match normalized.as_str() {
            "maintenance" => Ok(Self::Maintenance),
            "on_loan" => Ok(Self::OnLoan),
            "available" => Ok(Self::Available),
            "reserved" => Ok(Self::Reserved),
            _ => Err(ModelValidationError::UnknownLoanStatus(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInstance {
    pub id: BookInstanceId,
    pub book_id: Option<BookId>,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
}

impl BookInstance {
    /// New copy of `book_id` with a fresh UUID, in maintenance.
    pub fn new(book_id: BookId, imprint: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id: Some(book_id),
            imprint: imprint.into(),
            due_back: None,
            status: LoanStatus::default(),
        }
    }

    /// Builds a copy whose id already exists elsewhere (imports, fixtures).
    pub fn with_id(
        id: BookInstanceId,
        book_id: BookId,
        imprint: impl Into<String>,
    ) -> Result<Self, ModelValidationError> {
        if id.is_nil() {
            return Err(ModelValidationError::NilInstanceId);
        }
        Ok(Self {
            id,
            ..Self::new(book_id, imprint)
        })
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.id.is_nil() {
            return Err(ModelValidationError::NilInstanceId);
        }
        require_text("imprint", &self.imprint, IMPRINT_MAX_CHARS)
    }

    pub fn normalized(mut self) -> Self {
        trim_in_place(&mut self.imprint);
        self
    }

    /// On loan with a due date strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == LoanStatus::OnLoan && self.due_back.is_some_and(|due| due < today)
    }

    /// `"{id} {book title}"`, or the bare id for a copy without a book.
    pub fn label(&self, book_title: Option<&str>) -> String {
        match book_title {
            Some(title) => format!("{} {}", self.id, title),
            None => self.id.to_string(),
        }
    }
}
