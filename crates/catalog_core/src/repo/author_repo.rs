//! Author repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Listing order is `first_name, last_name, id`.
//! - Deleting an author never fails because of books; their `author_id`
//!   is set to NULL by the foreign key.

use super::{date_to_db, ensure_connection_ready, parse_date, RepoError, RepoResult};
use crate::model::author::{Author, AuthorId, NewAuthor};
use rusqlite::{params, Connection, Row};

const AUTHOR_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name,
    date_of_birth,
    date_of_death
FROM authors";

const AUTHOR_COLUMNS: &[&str] = &[
    "id",
    "first_name",
    "last_name",
    "date_of_birth",
    "date_of_death",
];

/// Repository interface for author CRUD.
pub trait AuthorRepository {
    fn create_author(&self, author: &NewAuthor) -> RepoResult<Author>;
    fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>>;
    fn list_authors(&self) -> RepoResult<Vec<Author>>;
    fn count_authors(&self) -> RepoResult<i64>;
    fn update_author(&self, author: &Author) -> RepoResult<()>;
    fn delete_author(&self, id: AuthorId) -> RepoResult<()>;
}

/// SQLite-backed author repository.
pub struct SqliteAuthorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuthorRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[("authors", AUTHOR_COLUMNS)])?;
        Ok(Self { conn })
    }
}

impl AuthorRepository for SqliteAuthorRepository<'_> {
    fn create_author(&self, author: &NewAuthor) -> RepoResult<Author> {
        let author = author.clone().normalized();
        author.validate()?;

        self.conn.execute(
            "INSERT INTO authors (
                first_name,
                last_name,
                date_of_birth,
                date_of_death
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                author.first_name.as_str(),
                author.last_name.as_str(),
                date_to_db(author.date_of_birth),
                date_to_db(author.date_of_death),
            ],
        )?;

        Ok(author.into_author(self.conn.last_insert_rowid()))
    }

    fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{AUTHOR_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_author_row(row)?));
        }
        Ok(None)
    }

    fn list_authors(&self) -> RepoResult<Vec<Author>> {
        let mut stmt = self.conn.prepare(&format!(
            "{AUTHOR_SELECT_SQL} ORDER BY first_name ASC, last_name ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut authors = Vec::new();
        while let Some(row) = rows.next()? {
            authors.push(parse_author_row(row)?);
        }
        Ok(authors)
    }

    fn count_authors(&self) -> RepoResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM authors;", [], |row| row.get(0))?;
        Ok(count)
    }

    fn update_author(&self, author: &Author) -> RepoResult<()> {
        let author = author.clone().normalized();
        author.validate()?;

        let changed = self.conn.execute(
            "UPDATE authors
             SET
                first_name = ?1,
                last_name = ?2,
                date_of_birth = ?3,
                date_of_death = ?4
             WHERE id = ?5;",
            params![
                author.first_name.as_str(),
                author.last_name.as_str(),
                date_to_db(author.date_of_birth),
                date_to_db(author.date_of_death),
                author.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("author", author.id));
        }
        Ok(())
    }

    fn delete_author(&self, id: AuthorId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM authors WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::not_found("author", id));
        }
        Ok(())
    }
}

fn parse_author_row(row: &Row<'_>) -> RepoResult<Author> {
    let author = Author {
        id: row.get("id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        date_of_birth: parse_date(row.get("date_of_birth")?, "authors.date_of_birth")?,
        date_of_death: parse_date(row.get("date_of_death")?, "authors.date_of_death")?,
    };
    Ok(author)
}
