//! Book catalog entry (not a physical copy).
//!
//! # Invariants
//! - `isbn` is unique across all books; storage enforces it.
//! - `author_id` becomes `None` when the author is deleted.
//! - `genre_ids` is sorted ascending without duplicates once read back.

use super::author::AuthorId;
use super::genre::GenreId;
use super::{limit_text, require_text, trim_in_place, ModelValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type BookId = i64;

pub const BOOK_TITLE_MAX_CHARS: usize = 200;
pub const BOOK_SUMMARY_MAX_CHARS: usize = 1000;
pub const ISBN_MAX_CHARS: usize = 13;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author_id: Option<AuthorId>,
    pub summary: String,
    pub isbn: String,
    pub genre_ids: Vec<GenreId>,
}

/// Input for creating a book.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author_id: Option<AuthorId>,
    pub summary: String,
    pub isbn: String,
    pub genre_ids: Vec<GenreId>,
}

impl NewBook {
    pub fn new(title: impl Into<String>, isbn: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            isbn: isbn.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_fields(&self.title, &self.summary, &self.isbn)
    }

    /// Trims title and ISBN. The summary is stored as given.
    pub fn normalized(mut self) -> Self {
        trim_in_place(&mut self.title);
        trim_in_place(&mut self.isbn);
        self
    }

    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            author_id: self.author_id,
            summary: self.summary,
            isbn: self.isbn,
            genre_ids: self.genre_ids,
        }
    }
}

impl Book {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_fields(&self.title, &self.summary, &self.isbn)
    }

    pub fn normalized(mut self) -> Self {
        trim_in_place(&mut self.title);
        trim_in_place(&mut self.isbn);
        self
    }

    /// Detail-page path, e.g. `/catalog/book/3`.
    pub fn absolute_url(&self) -> String {
        format!("/catalog/book/{}", self.id)
    }
}

impl Display for Book {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

/// Trims surrounding whitespace; an ISBN is compared as stored.
pub fn normalize_isbn(isbn: &str) -> String {
    isbn.trim().to_string()
}

fn validate_fields(title: &str, summary: &str, isbn: &str) -> Result<(), ModelValidationError> {
    require_text("title", title, BOOK_TITLE_MAX_CHARS)?;
    limit_text("summary", summary, BOOK_SUMMARY_MAX_CHARS)?;
    require_text("isbn", isbn, ISBN_MAX_CHARS)
}

#[cfg(test)]
mod tests {
    use super::{normalize_isbn, NewBook};
    use crate::model::ModelValidationError;

    #[test]
    fn isbn_longer_than_13_chars_is_rejected() {
        let book = NewBook::new("The Alchemist", "97800623150071");
        assert!(matches!(
            book.validate(),
            Err(ModelValidationError::FieldTooLong { field: "isbn", .. })
        ));
    }

    #[test]
    fn empty_summary_is_allowed() {
        assert!(NewBook::new("The Alchemist", "9780062315007")
            .validate()
            .is_ok());
    }

    #[test]
    fn isbn_limit_ignores_surrounding_whitespace() {
        let book = NewBook::new("Dune", "9780441013593 ");
        assert!(book.validate().is_ok());
        assert_eq!(book.normalized().isbn, "9780441013593");
    }

    #[test]
    fn url_and_display() {
        let book = NewBook::new("The Alchemist", "9780062315007").into_book(3);
        assert_eq!(book.to_string(), "The Alchemist");
        assert_eq!(book.absolute_url(), "/catalog/book/3");
        assert_eq!(normalize_isbn(" 9780062315007\n"), "9780062315007");
    }
}
