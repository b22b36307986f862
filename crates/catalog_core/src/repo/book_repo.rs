//! Book repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist books together with their genre links.
//! - Enforce the delete restriction from `book_instances`.
//!
//! # Invariants
//! - Book row and genre links are written in one immediate transaction.
//! - Title and ISBN are trimmed before validation, writes and ISBN lookups.
//! - A duplicate ISBN surfaces as `RepoError::DuplicateIsbn`.
//! - A book with copies is never deleted; the call fails with
//!   `RepoError::DeleteRestricted` and nothing changes.

use super::genre_repo::load_genres_for_book;
use super::{ensure_connection_ready, is_unique_violation, row_exists, RepoError, RepoResult};
use crate::model::author::AuthorId;
use crate::model::book::{normalize_isbn, Book, BookId, NewBook};
use crate::model::genre::{Genre, GenreId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::collections::BTreeSet;

const BOOK_SELECT_SQL: &str = "SELECT
    id,
    title,
    author_id,
    summary,
    isbn
FROM books";

const AUTHOR_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM authors WHERE id = ?1);";
const GENRE_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM genres WHERE id = ?1);";

/// Filter and pagination for book listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookListQuery {
    pub author_id: Option<AuthorId>,
    pub genre_id: Option<GenreId>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for book CRUD and genre links.
pub trait BookRepository {
    /// Inserts the book and links its genres.
    fn create_book(&self, book: &NewBook) -> RepoResult<Book>;
    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>>;
    fn find_book_by_isbn(&self, isbn: &str) -> RepoResult<Option<Book>>;
    /// Sorted by `title, id`.
    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<Book>>;
    fn count_books(&self) -> RepoResult<i64>;
    /// Replaces scalar fields and the full genre set.
    fn update_book(&self, book: &Book) -> RepoResult<()>;
    fn delete_book(&self, id: BookId) -> RepoResult<()>;
    fn genres_for_book(&self, id: BookId) -> RepoResult<Vec<Genre>>;
}

pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                ("books", &["id", "title", "author_id", "summary", "isbn"]),
                ("book_genres", &["book_id", "genre_id"]),
                ("book_instances", &["book_id"]),
            ],
        )?;
        Ok(Self { conn })
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn create_book(&self, book: &NewBook) -> RepoResult<Book> {
        let book = book.clone().normalized();
        book.validate()?;
        let genre_ids = unique_genre_ids(&book.genre_ids);

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_references_exist(&tx, book.author_id, &genre_ids)?;

        tx.execute(
            "INSERT INTO books (
                title,
                author_id,
                summary,
                isbn
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                book.title.as_str(),
                book.author_id,
                book.summary.as_str(),
                book.isbn.as_str(),
            ],
        )
        .map_err(|err| map_isbn_conflict(err, &book.isbn))?;
        let id = tx.last_insert_rowid();

        replace_genre_links(&tx, id, &genre_ids)?;
        tx.commit()?;

        let mut created = book.into_book(id);
        created.genre_ids = genre_ids;
        Ok(created)
    }

    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        self.query_one(&format!("{BOOK_SELECT_SQL} WHERE id = ?1;"), Value::Integer(id))
    }

    fn find_book_by_isbn(&self, isbn: &str) -> RepoResult<Option<Book>> {
        self.query_one(
            &format!("{BOOK_SELECT_SQL} WHERE isbn = ?1;"),
            Value::Text(normalize_isbn(isbn)),
        )
    }

    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<Book>> {
        let mut sql = format!("{BOOK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(author_id) = query.author_id {
            sql.push_str(" AND author_id = ?");
            bind_values.push(Value::Integer(author_id));
        }

        if let Some(genre_id) = query.genre_id {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM book_genres bg
                    WHERE bg.book_id = books.id
                      AND bg.genre_id = ?
                )",
            );
            bind_values.push(Value::Integer(genre_id));
        }

        sql.push_str(" ORDER BY title ASC, id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(parse_book_row(self.conn, row)?);
        }
        Ok(books)
    }

    fn count_books(&self) -> RepoResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM books;", [], |row| row.get(0))?;
        Ok(count)
    }

    fn update_book(&self, book: &Book) -> RepoResult<()> {
        let book = book.clone().normalized();
        book.validate()?;
        let genre_ids = unique_genre_ids(&book.genre_ids);

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_references_exist(&tx, book.author_id, &genre_ids)?;

        let changed = tx
            .execute(
                "UPDATE books
                 SET
                    title = ?1,
                    author_id = ?2,
                    summary = ?3,
                    isbn = ?4
                 WHERE id = ?5;",
                params![
                    book.title.as_str(),
                    book.author_id,
                    book.summary.as_str(),
                    book.isbn.as_str(),
                    book.id,
                ],
            )
            .map_err(|err| map_isbn_conflict(err, &book.isbn))?;
        if changed == 0 {
            return Err(RepoError::not_found("book", book.id));
        }

        replace_genre_links(&tx, book.id, &genre_ids)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_book(&self, id: BookId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let copies: i64 = tx.query_row(
            "SELECT COUNT(*) FROM book_instances WHERE book_id = ?1;",
            [id],
            |row| row.get(0),
        )?;
        if copies > 0 {
            return Err(RepoError::DeleteRestricted {
                entity: "book",
                id: id.to_string(),
                referenced_by: "book_instances",
                count: copies,
            });
        }

        let changed = tx.execute("DELETE FROM books WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::not_found("book", id));
        }

        tx.commit()?;
        Ok(())
    }

    fn genres_for_book(&self, id: BookId) -> RepoResult<Vec<Genre>> {
        load_genres_for_book(self.conn, id)
    }
}

impl SqliteBookRepository<'_> {
    fn query_one(&self, sql: &str, key: Value) -> RepoResult<Option<Book>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([key])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_book_row(self.conn, row)?));
        }
        Ok(None)
    }
}

fn parse_book_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Book> {
    let id: BookId = row.get("id")?;
    Ok(Book {
        id,
        title: row.get("title")?,
        author_id: row.get("author_id")?,
        summary: row.get("summary")?,
        isbn: row.get("isbn")?,
        genre_ids: load_genre_ids(conn, id)?,
    })
}

fn load_genre_ids(conn: &Connection, book_id: BookId) -> RepoResult<Vec<GenreId>> {
    let mut stmt = conn.prepare(
        "SELECT genre_id
         FROM book_genres
         WHERE book_id = ?1
         ORDER BY genre_id ASC;",
    )?;
    let mut rows = stmt.query([book_id])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        ids.push(row.get(0)?);
    }
    Ok(ids)
}

fn unique_genre_ids(genre_ids: &[GenreId]) -> Vec<GenreId> {
    genre_ids
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn ensure_references_exist(
    conn: &Connection,
    author_id: Option<AuthorId>,
    genre_ids: &[GenreId],
) -> RepoResult<()> {
    if let Some(author_id) = author_id {
        if !row_exists(conn, AUTHOR_EXISTS_SQL, author_id)? {
            return Err(RepoError::not_found("author", author_id));
        }
    }
    for &genre_id in genre_ids {
        if !row_exists(conn, GENRE_EXISTS_SQL, genre_id)? {
            return Err(RepoError::not_found("genre", genre_id));
        }
    }
    Ok(())
}

fn replace_genre_links(
    conn: &Connection,
    book_id: BookId,
    genre_ids: &[GenreId],
) -> RepoResult<()> {
    conn.execute("DELETE FROM book_genres WHERE book_id = ?1;", [book_id])?;
    for &genre_id in genre_ids {
        conn.execute(
            "INSERT INTO book_genres (book_id, genre_id) VALUES (?1, ?2);",
            params![book_id, genre_id],
        )?;
    }
    Ok(())
}

fn map_isbn_conflict(err: rusqlite::Error, isbn: &str) -> RepoError {
    if is_unique_violation(&err, "books.isbn") {
        RepoError::DuplicateIsbn(isbn.to_string())
    } else {
        err.into()
    }
}
