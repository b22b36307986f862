//! Genre repository contracts and SQLite implementation.

use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::model::genre::{Genre, GenreId, NewGenre};
use rusqlite::{params, Connection, Row};

/// Repository interface for genre CRUD.
pub trait GenreRepository {
    fn create_genre(&self, genre: &NewGenre) -> RepoResult<Genre>;
    fn get_genre(&self, id: GenreId) -> RepoResult<Option<Genre>>;
    /// Sorted by `name, id`.
    fn list_genres(&self) -> RepoResult<Vec<Genre>>;
    fn count_genres(&self) -> RepoResult<i64>;
    fn update_genre(&self, genre: &Genre) -> RepoResult<()>;
    /// Removes the genre and every book link to it.
    fn delete_genre(&self, id: GenreId) -> RepoResult<()>;
}

pub struct SqliteGenreRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGenreRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                ("genres", &["id", "name"]),
                ("book_genres", &["book_id", "genre_id"]),
            ],
        )?;
        Ok(Self { conn })
    }
}

impl GenreRepository for SqliteGenreRepository<'_> {
    fn create_genre(&self, genre: &NewGenre) -> RepoResult<Genre> {
        let genre = genre.clone().normalized();
        genre.validate()?;
        self.conn.execute(
            "INSERT INTO genres (name) VALUES (?1);",
            [genre.name.as_str()],
        )?;
        Ok(Genre {
            id: self.conn.last_insert_rowid(),
            name: genre.name,
        })
    }

    fn get_genre(&self, id: GenreId) -> RepoResult<Option<Genre>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM genres WHERE id = ?1;")?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_genre_row(row)?));
        }
        Ok(None)
    }

    fn list_genres(&self) -> RepoResult<Vec<Genre>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM genres ORDER BY name ASC, id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut genres = Vec::new();
        while let Some(row) = rows.next()? {
            genres.push(parse_genre_row(row)?);
        }
        Ok(genres)
    }

    fn count_genres(&self) -> RepoResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM genres;", [], |row| row.get(0))?;
        Ok(count)
    }

    fn update_genre(&self, genre: &Genre) -> RepoResult<()> {
        let genre = genre.clone().normalized();
        genre.validate()?;
        let changed = self.conn.execute(
            "UPDATE genres SET name = ?1 WHERE id = ?2;",
            params![genre.name.as_str(), genre.id],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("genre", genre.id));
        }
        Ok(())
    }

    fn delete_genre(&self, id: GenreId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM genres WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::not_found("genre", id));
        }
        Ok(())
    }
}

fn parse_genre_row(row: &Row<'_>) -> RepoResult<Genre> {
    Ok(Genre {
        id: row.get("id")?,
        name: row.get("name")?,
    })
}

/// Loads the genres linked to one book, sorted by `name, id`.
pub(crate) fn load_genres_for_book(conn: &Connection, book_id: i64) -> RepoResult<Vec<Genre>> {
    let mut stmt = conn.prepare(
        "SELECT g.id, g.name
         FROM book_genres bg
         INNER JOIN genres g ON g.id = bg.genre_id
         WHERE bg.book_id = ?1
         ORDER BY g.name ASC, g.id ASC;",
    )?;
    let mut rows = stmt.query([book_id])?;
    let mut genres = Vec::new();
    while let Some(row) = rows.next()? {
        genres.push(parse_genre_row(row)?);
    }
    Ok(genres)
}
