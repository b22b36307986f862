//! Genre record.

use super::{require_text, trim_in_place, ModelValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type GenreId = i64;

pub const GENRE_NAME_MAX_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGenre {
    pub name: String,
}

impl NewGenre {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("name", &self.name, GENRE_NAME_MAX_CHARS)
    }

    pub fn normalized(mut self) -> Self {
        trim_in_place(&mut self.name);
        self
    }
}

impl Genre {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("name", &self.name, GENRE_NAME_MAX_CHARS)
    }

    pub fn normalized(mut self) -> Self {
        trim_in_place(&mut self.name);
        self
    }
}

impl Display for Genre {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
