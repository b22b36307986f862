//! Author record.

use super::{require_text, trim_in_place, ModelValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type AuthorId = i64;

pub const AUTHOR_NAME_MAX_CHARS: usize = 100;

/// Persisted author. Listed by `(first_name, last_name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Input for creating an author.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewAuthor {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl NewAuthor {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth: None,
            date_of_death: None,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_names(&self.first_name, &self.last_name)
    }

    /// Strips surrounding whitespace from both names.
    pub fn normalized(mut self) -> Self {
        trim_in_place(&mut self.first_name);
        trim_in_place(&mut self.last_name);
        self
    }

    /// Attaches the storage-assigned id.
    pub fn into_author(self, id: AuthorId) -> Author {
        Author {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: self.date_of_birth,
            date_of_death: self.date_of_death,
        }
    }
}

impl Author {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_names(&self.first_name, &self.last_name)
    }

    pub fn normalized(mut self) -> Self {
        trim_in_place(&mut self.first_name);
        trim_in_place(&mut self.last_name);
        self
    }

    /// Detail-page path, e.g. `/catalog/author/7`.
    pub fn absolute_url(&self) -> String {
        format!("/catalog/author/{}", self.id)
    }
}

impl Display for Author {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

fn validate_names(first_name: &str, last_name: &str) -> Result<(), ModelValidationError> {
    require_text("first_name", first_name, AUTHOR_NAME_MAX_CHARS)?;
    require_text("last_name", last_name, AUTHOR_NAME_MAX_CHARS)
}

#[cfg(test)]
mod tests {
    use super::NewAuthor;

    #[test]
    fn display_and_url_use_name_and_id() {
        let author = NewAuthor::new("Paulo", "Coelho").into_author(7);
        assert_eq!(author.to_string(), "Paulo Coelho");
        assert_eq!(author.absolute_url(), "/catalog/author/7");
    }

    #[test]
    fn blank_last_name_is_rejected() {
        assert!(NewAuthor::new("Paulo", " ").validate().is_err());
    }

    #[test]
    fn normalized_trims_names() {
        let author = NewAuthor::new(" Paulo", "Coelho\n").normalized();
        assert_eq!(author.first_name, "Paulo");
        assert_eq!(author.last_name, "Coelho");
    }
}
